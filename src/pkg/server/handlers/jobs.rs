use std::sync::Arc;

use axum::{
    Extension, Form, Json,
    extract::{Path as AxumPath, State},
    http::StatusCode,
    response::Response,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    pkg::{
        internal::{
            adaptors::{
                jobs::{mutators::JobMutator, selectors::JobSelector, spec::JobEntry},
                users::spec::Role,
            },
            auth::AuthUser,
        },
        server::state::{AppState, GetTxn},
    },
    prelude::{Error, Result, flash_redirect},
};

#[derive(Deserialize, Validate)]
pub struct PostJobInput {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub company: String,
    #[validate(length(min = 1))]
    pub location: String,
    pub salary: Option<String>,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(min = 1))]
    pub requirements: String,
}

fn require_employer(user: &AuthUser) -> Result<()> {
    match user.role {
        Role::Employer => Ok(()),
        Role::Seeker => Err(Error::Forbidden {
            notice: "Only employers can post jobs",
            back: "/",
        }),
    }
}

/// Public index: every listing, newest first.
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<JobEntry>>> {
    let mut tx = state.db_pool.begin_txn().await?;
    let jobs = JobSelector::new(&mut tx).get_all().await?;
    Ok(Json(jobs))
}

pub async fn detail(
    State(state): State<AppState>,
    AxumPath(job_id): AxumPath<i32>,
) -> Result<Json<JobEntry>> {
    let mut tx = state.db_pool.begin_txn().await?;
    let job = JobSelector::new(&mut tx)
        .get_by_id(job_id)
        .await?
        .ok_or(Error::NotFound)?;
    Ok(Json(job))
}

pub async fn post_job_page(Extension(user): Extension<Arc<AuthUser>>) -> Result<StatusCode> {
    require_employer(&user)?;
    Ok(StatusCode::OK)
}

pub async fn post_job(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<AuthUser>>,
    Form(mut input): Form<PostJobInput>,
) -> Result<Response> {
    require_employer(&user)?;
    input
        .validate()
        .map_err(|e| Error::validation(e, "/post_job"))?;
    input.salary = input.salary.filter(|s| !s.trim().is_empty());
    let mut tx = state.db_pool.begin_txn().await?;
    let job = JobMutator::new(&mut tx).create(input, user.user_id).await?;
    tx.commit().await?;
    tracing::info!("job {} posted by {}", job.id, &user.username);
    Ok(flash_redirect("Your job has been posted!", "/dashboard"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> AuthUser {
        AuthUser {
            user_id: 1,
            username: "bob".into(),
            role,
        }
    }

    #[test]
    fn only_employers_may_post() {
        assert!(require_employer(&user(Role::Employer)).is_ok());
        let err = require_employer(&user(Role::Seeker)).unwrap_err();
        assert!(matches!(err, Error::Forbidden { back: "/", .. }));
    }

    #[test]
    fn job_input_requires_all_fields_but_salary() {
        let input = PostJobInput {
            title: "Engineer".into(),
            company: "Acme".into(),
            location: "Remote".into(),
            salary: None,
            description: "build things".into(),
            requirements: "rust".into(),
        };
        assert!(input.validate().is_ok());

        let input = PostJobInput {
            title: "".into(),
            company: "Acme".into(),
            location: "Remote".into(),
            salary: Some("100k-120k".into()),
            description: "build things".into(),
            requirements: "rust".into(),
        };
        assert!(input.validate().is_err());
    }
}
