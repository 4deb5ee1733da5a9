use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Duration, Utc};
use sqlx::{PgConnection, prelude::FromRow};
use uuid::Uuid;

use crate::{
    conf::settings,
    pkg::internal::adaptors::{jobs::spec::JobEntry, users::spec::Role},
    prelude::{Error, Result},
};

/// Authenticated identity attached to each request by the authn middleware.
#[derive(FromRow, Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
    pub role: Role,
}

#[derive(FromRow, Debug)]
pub struct Session {
    pub token: Uuid,
    pub user_id: i32,
    pub expiry: DateTime<Utc>,
}

/// Hash a password with Argon2id, returning a PHC-format string. The
/// plaintext never reaches the store.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Check a plaintext against a stored PHC hash. A malformed stored hash
/// counts as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// The record's creator reference is the sole authorization basis for
/// viewing or mutating data scoped to a job.
pub fn is_owner(user: &AuthUser, job: &JobEntry) -> bool {
    job.user_id == user.user_id
}

impl Session {
    pub async fn start(conn: &mut PgConnection, user_id: i32, remember: bool) -> Result<Session> {
        let ttl = if remember {
            settings.remember_ttl_minutes
        } else {
            settings.session_ttl_minutes
        };
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (token, user_id, expiry)
            VALUES ($1, $2, $3)
            RETURNING token, user_id, expiry
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(Utc::now() + Duration::minutes(ttl))
        .fetch_one(conn)
        .await?;
        Ok(session)
    }

    pub async fn resolve(conn: &mut PgConnection, token: &str) -> Result<Option<AuthUser>> {
        let Ok(token) = token.parse::<Uuid>() else {
            return Ok(None);
        };
        let user = sqlx::query_as::<_, AuthUser>(
            r#"
            SELECT u.id AS user_id, u.username, u.role
            FROM sessions s JOIN users u ON u.id = s.user_id
            WHERE s.token = $1 AND s.expiry > now()
            "#,
        )
        .bind(token)
        .fetch_optional(conn)
        .await?;
        Ok(user)
    }

    pub async fn end(conn: &mut PgConnection, token: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(conn)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn user(user_id: i32, role: Role) -> AuthUser {
        AuthUser {
            user_id,
            username: "bob".into(),
            role,
        }
    }

    #[test]
    fn password_round_trips() {
        let hash = hash_password("pw1").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("pw1", &hash));
        assert!(!verify_password("pw2", &hash));
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!verify_password("pw1", "not-a-phc-string"));
        assert!(!verify_password("pw1", ""));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("pw1").unwrap();
        let b = hash_password("pw1").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn ownership_compares_creator_references() {
        let job = job_owned_by(42);
        assert!(is_owner(&user(42, Role::Employer), &job));
        assert!(!is_owner(&user(43, Role::Employer), &job));
        // role alone never grants access to someone else's listing
        assert!(!is_owner(&user(43, Role::Seeker), &job));
    }
}
