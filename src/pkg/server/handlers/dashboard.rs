use std::sync::Arc;

use axum::{Extension, Json, extract::State};
use serde::Serialize;

use crate::{
    pkg::{
        internal::{
            adaptors::{
                applications::{selectors::ApplicationSelector, spec::ApplicationEntry},
                jobs::{selectors::JobSelector, spec::JobEntry},
                users::spec::Role,
            },
            auth::AuthUser,
        },
        server::state::{AppState, GetTxn},
    },
    prelude::Result,
};

/// Role-partitioned view: an employer sees only their own listings, a
/// seeker only their own applications. No record appears in both.
#[derive(Serialize, Debug)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Dashboard {
    Employer { jobs: Vec<JobEntry> },
    Seeker { applications: Vec<ApplicationEntry> },
}

pub async fn dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<AuthUser>>,
) -> Result<Json<Dashboard>> {
    let mut tx = state.db_pool.begin_txn().await?;
    let dashboard = match user.role {
        Role::Employer => Dashboard::Employer {
            jobs: JobSelector::new(&mut tx).get_by_owner(user.user_id).await?,
        },
        Role::Seeker => Dashboard::Seeker {
            applications: ApplicationSelector::new(&mut tx)
                .get_by_applicant(user.user_id)
                .await?,
        },
    };
    Ok(Json(dashboard))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::pkg::internal::adaptors::applications::spec::ApplicationStatus;

    #[test]
    fn employer_payload_carries_jobs_only() {
        let payload = Dashboard::Employer {
            jobs: vec![JobEntry {
                id: 1,
                title: "Engineer".into(),
                description: "build things".into(),
                company: "Acme".into(),
                location: "Remote".into(),
                salary: Some("100k".into()),
                requirements: "rust".into(),
                date_posted: Utc::now(),
                user_id: 1,
            }],
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["role"], "employer");
        assert_eq!(json["jobs"].as_array().unwrap().len(), 1);
        assert!(json.get("applications").is_none());
    }

    #[test]
    fn seeker_payload_carries_applications_only() {
        let payload = Dashboard::Seeker {
            applications: vec![ApplicationEntry {
                id: 1,
                user_id: 2,
                job_id: 1,
                resume: "my resume".into(),
                cover_letter: "dear team".into(),
                status: ApplicationStatus::Pending,
                date_applied: Utc::now(),
            }],
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["role"], "seeker");
        assert_eq!(json["applications"][0]["status"], "pending");
        assert!(json.get("jobs").is_none());
    }
}
