use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Fixed at registration, partitions behavior for every downstream
/// operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Employer,
    Seeker,
}

impl Role {
    pub fn from_flag(is_employer: bool) -> Role {
        if is_employer {
            Role::Employer
        } else {
            Role::Seeker
        }
    }
}

#[derive(FromRow, Serialize, Debug, Clone)]
pub struct UserEntry {
    pub id: i32,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
}
