use std::sync::Arc;

use axum::{
    Extension, Form, Json,
    extract::{Path as AxumPath, State},
    response::Response,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    pkg::{
        internal::{
            adaptors::{
                applications::{
                    mutators::ApplicationMutator,
                    selectors::ApplicationSelector,
                    spec::{ApplicationEntry, ApplicationStatus},
                },
                jobs::{selectors::JobSelector, spec::JobEntry},
                users::spec::Role,
            },
            auth::{self, AuthUser},
        },
        server::state::{AppState, GetTxn},
    },
    prelude::{Error, Result, flash_redirect},
};

#[derive(Deserialize, Validate)]
pub struct ApplyInput {
    #[validate(length(min = 1))]
    pub resume: String,
    #[validate(length(min = 1))]
    pub cover_letter: String,
}

fn require_seeker(user: &AuthUser) -> Result<()> {
    match user.role {
        Role::Seeker => Ok(()),
        Role::Employer => Err(Error::Forbidden {
            notice: "Employers cannot apply for jobs",
            back: "/",
        }),
    }
}

fn require_owner(user: &AuthUser, job: &JobEntry, notice: &'static str) -> Result<()> {
    if auth::is_owner(user, job) {
        Ok(())
    } else {
        Err(Error::Forbidden {
            notice,
            back: "/dashboard",
        })
    }
}

/// The application form needs the job it targets; a missing job is a 404
/// even before anything is submitted.
pub async fn apply_page(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<AuthUser>>,
    AxumPath(job_id): AxumPath<i32>,
) -> Result<Json<JobEntry>> {
    require_seeker(&user)?;
    let mut tx = state.db_pool.begin_txn().await?;
    let job = JobSelector::new(&mut tx)
        .get_by_id(job_id)
        .await?
        .ok_or(Error::NotFound)?;
    Ok(Json(job))
}

pub async fn apply(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<AuthUser>>,
    AxumPath(job_id): AxumPath<i32>,
    Form(input): Form<ApplyInput>,
) -> Result<Response> {
    require_seeker(&user)?;
    let mut tx = state.db_pool.begin_txn().await?;
    let job = JobSelector::new(&mut tx)
        .get_by_id(job_id)
        .await?
        .ok_or(Error::NotFound)?;
    input
        .validate()
        .map_err(|e| Error::validation(e, format!("/apply/{job_id}")))?;
    // idempotence guard; the unique index covers the race between the
    // check and the insert, both inside this transaction
    if ApplicationSelector::new(&mut tx)
        .exists_for(user.user_id, job.id)
        .await?
    {
        return Err(Error::DuplicateApplication { job_id: job.id });
    }
    let application = ApplicationMutator::new(&mut tx)
        .create(user.user_id, job.id, input)
        .await?;
    tx.commit().await?;
    tracing::info!(
        "application {} submitted by {} for job {}",
        application.id,
        &user.username,
        job.id
    );
    Ok(flash_redirect(
        "Your application has been submitted!",
        "/dashboard",
    ))
}

pub async fn list_for_job(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<AuthUser>>,
    AxumPath(job_id): AxumPath<i32>,
) -> Result<Json<Vec<ApplicationEntry>>> {
    let mut tx = state.db_pool.begin_txn().await?;
    let job = JobSelector::new(&mut tx)
        .get_by_id(job_id)
        .await?
        .ok_or(Error::NotFound)?;
    require_owner(
        &user,
        &job,
        "You can only view applications for your own job listings",
    )?;
    let applications = ApplicationSelector::new(&mut tx).get_for_job(job.id).await?;
    Ok(Json(applications))
}

pub async fn update_status(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<AuthUser>>,
    AxumPath((application_id, status)): AxumPath<(i32, String)>,
) -> Result<Response> {
    let mut tx = state.db_pool.begin_txn().await?;
    let application = ApplicationSelector::new(&mut tx)
        .get_by_id(application_id)
        .await?
        .ok_or(Error::NotFound)?;
    let job = JobSelector::new(&mut tx)
        .get_by_id(application.job_id)
        .await?
        .ok_or(Error::NotFound)?;
    require_owner(
        &user,
        &job,
        "You can only update applications for your own job listings",
    )?;
    let status: ApplicationStatus = status
        .parse()
        .map_err(|_| Error::InvalidStatus { job_id: job.id })?;
    let application = ApplicationMutator::new(&mut tx)
        .update_status(application.id, status)
        .await?;
    tx.commit().await?;
    tracing::info!(
        "application {} marked {} by {}",
        application.id,
        application.status,
        &user.username
    );
    Ok(flash_redirect(
        &format!("Application status updated to {}", application.status),
        &format!("/applications/{}", job.id),
    ))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn user(user_id: i32, role: Role) -> AuthUser {
        AuthUser {
            user_id,
            username: "carol".into(),
            role,
        }
    }

    fn job_owned_by(user_id: i32) -> JobEntry {
        JobEntry {
            id: 1,
            title: "Engineer".into(),
            description: "build things".into(),
            company: "Acme".into(),
            location: "Remote".into(),
            salary: None,
            requirements: "rust".into(),
            date_posted: Utc::now(),
            user_id,
        }
    }

    #[test]
    fn employers_cannot_apply() {
        assert!(require_seeker(&user(1, Role::Seeker)).is_ok());
        let err = require_seeker(&user(1, Role::Employer)).unwrap_err();
        assert!(matches!(err, Error::Forbidden { back: "/", .. }));
    }

    #[test]
    fn review_is_scoped_to_the_owner() {
        let job = job_owned_by(1);
        assert!(require_owner(&user(1, Role::Employer), &job, "nope").is_ok());
        let err = require_owner(&user(2, Role::Employer), &job, "nope").unwrap_err();
        assert!(matches!(
            err,
            Error::Forbidden {
                back: "/dashboard",
                ..
            }
        ));
    }

    #[test]
    fn apply_input_requires_both_texts() {
        let input = ApplyInput {
            resume: "my resume".into(),
            cover_letter: "".into(),
        };
        assert!(input.validate().is_err());

        let input = ApplyInput {
            resume: "my resume".into(),
            cover_letter: "dear team".into(),
        };
        assert!(input.validate().is_ok());
    }
}
