use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Closed set of application states. Parsing at the boundary means an
/// invalid status never reaches the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "application_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "accepted" => Ok(ApplicationStatus::Accepted),
            "rejected" => Ok(ApplicationStatus::Rejected),
            other => Err(format!("unknown status: {other}")),
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// One seeker's submission against one listing. At most one per
/// (user, job) pair, enforced by the store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationEntry {
    pub id: i32,
    pub user_id: i32,
    pub job_id: i32,
    pub resume: String,
    pub cover_letter: String,
    pub status: ApplicationStatus,
    pub date_applied: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_three_statuses_parse() {
        assert_eq!("pending".parse(), Ok(ApplicationStatus::Pending));
        assert_eq!("accepted".parse(), Ok(ApplicationStatus::Accepted));
        assert_eq!("rejected".parse(), Ok(ApplicationStatus::Rejected));
    }

    #[test]
    fn anything_else_is_rejected() {
        assert!("approved".parse::<ApplicationStatus>().is_err());
        assert!("PENDING".parse::<ApplicationStatus>().is_err());
        assert!("".parse::<ApplicationStatus>().is_err());
        assert!(" pending".parse::<ApplicationStatus>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for status in [
            ApplicationStatus::Pending,
            ApplicationStatus::Accepted,
            ApplicationStatus::Rejected,
        ] {
            assert_eq!(status.to_string().parse(), Ok(status));
        }
    }
}
