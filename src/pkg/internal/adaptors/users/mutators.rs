use sqlx::PgConnection;

use crate::{
    pkg::internal::adaptors::users::spec::{Role, UserEntry},
    prelude::{Error, Result},
};

pub struct UserMutator<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> UserMutator<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        UserMutator { pool }
    }

    pub async fn create(
        &mut self,
        username: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<UserEntry> {
        let row = sqlx::query_as::<_, UserEntry>(
            r#"
            INSERT INTO users (username, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password_hash, role
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .fetch_one(&mut *self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(row)
    }
}

// the unique constraints back up the pre-insert existence checks, so a
// concurrent duplicate registration still surfaces as the right error
fn map_unique_violation(err: sqlx::Error) -> Error {
    if let sqlx::Error::Database(ref db) = err {
        match db.constraint() {
            Some("users_username_key") => return Error::DuplicateUsername,
            Some("users_email_key") => return Error::DuplicateEmail,
            _ => {}
        }
    }
    Error::Database(err)
}
