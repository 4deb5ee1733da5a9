use sqlx::PgConnection;

use crate::pkg::internal::adaptors::applications::spec::{ApplicationEntry, ApplicationStatus};
use crate::pkg::server::handlers::applications::ApplyInput;
use crate::prelude::{Error, Result};

pub struct ApplicationMutator<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> ApplicationMutator<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        ApplicationMutator { pool }
    }

    /// Status always starts out pending, whatever the caller sent.
    pub async fn create(
        &mut self,
        user_id: i32,
        job_id: i32,
        input: ApplyInput,
    ) -> Result<ApplicationEntry> {
        let row = sqlx::query_as::<_, ApplicationEntry>(
            r#"
            INSERT INTO applications (user_id, job_id, resume, cover_letter, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, job_id, resume, cover_letter, status, date_applied
            "#,
        )
        .bind(user_id)
        .bind(job_id)
        .bind(&input.resume)
        .bind(&input.cover_letter)
        .bind(ApplicationStatus::Pending)
        .fetch_one(&mut *self.pool)
        .await
        .map_err(|err| map_unique_violation(err, job_id))?;

        Ok(row)
    }

    /// Unconditional overwrite: any status may move to any other, including
    /// itself. No history is kept.
    pub async fn update_status(
        &mut self,
        id: i32,
        status: ApplicationStatus,
    ) -> Result<ApplicationEntry> {
        let row = sqlx::query_as::<_, ApplicationEntry>(
            r#"
            UPDATE applications SET status = $2
            WHERE id = $1
            RETURNING id, user_id, job_id, resume, cover_letter, status, date_applied
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_one(&mut *self.pool)
        .await?;

        Ok(row)
    }
}

// the unique index serializes concurrent submissions from the same user
// against the same job, so the check-then-insert stays race-free
fn map_unique_violation(err: sqlx::Error, job_id: i32) -> Error {
    if let sqlx::Error::Database(ref db) = err {
        if db.constraint() == Some("applications_user_id_job_id_key") {
            return Error::DuplicateApplication { job_id };
        }
    }
    Error::Database(err)
}
