use axum::{
    http::{HeaderValue, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

pub const FLASH_COOKIE: &str = "_Host_flash";

/// Everything that can go wrong at the request boundary. None of these are
/// fatal to the process: each one maps to a redirect with a flash notice,
/// a plain 404, or an opaque 500.
#[derive(Debug, Error)]
pub enum Error {
    #[error("username already taken")]
    DuplicateUsername,
    #[error("email already registered")]
    DuplicateEmail,
    // deliberately undifferentiated, never reveals which part was wrong
    #[error("invalid username or password")]
    InvalidCredential,
    #[error("login required")]
    Unauthorized { next: String },
    #[error("{notice}")]
    Forbidden {
        notice: &'static str,
        back: &'static str,
    },
    #[error("not found")]
    NotFound,
    #[error("already applied for this job")]
    DuplicateApplication { job_id: i32 },
    #[error("invalid status")]
    InvalidStatus { job_id: i32 },
    #[error("{notice}")]
    Validation { notice: String, back: String },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("password hash error: {0}")]
    Hash(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid header value: {0}")]
    Header(#[from] axum::http::header::InvalidHeaderValue),
}

impl Error {
    pub fn validation(errors: validator::ValidationErrors, back: impl Into<String>) -> Self {
        Error::Validation {
            notice: errors.to_string().replace('\n', "; "),
            back: back.into(),
        }
    }
}

fn flash_cookie(notice: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{}={}; Path=/; Max-Age=30",
        FLASH_COOKIE,
        urlencoding::encode(notice)
    ))
    .ok()
}

/// See-other redirect carrying a short-lived flash cookie for the next page
/// to display. The presentation layer owns rendering the notice.
pub fn flash_redirect(notice: &str, to: &str) -> Response {
    match flash_cookie(notice) {
        Some(cookie) => ([(SET_COOKIE, cookie)], Redirect::to(to)).into_response(),
        None => Redirect::to(to).into_response(),
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::DuplicateUsername => {
                flash_redirect("Please use a different username", "/register")
            }
            Error::DuplicateEmail => {
                flash_redirect("Please use a different email address", "/register")
            }
            Error::InvalidCredential => flash_redirect("Invalid username or password", "/login"),
            Error::Unauthorized { next } => flash_redirect(
                "Please log in to access this page",
                &format!("/login?next={}", urlencoding::encode(&next)),
            ),
            Error::Forbidden { notice, back } => flash_redirect(notice, back),
            Error::NotFound => StatusCode::NOT_FOUND.into_response(),
            Error::DuplicateApplication { job_id } => flash_redirect(
                "You have already applied for this job",
                &format!("/job/{job_id}"),
            ),
            Error::InvalidStatus { job_id } => {
                flash_redirect("Invalid status", &format!("/applications/{job_id}"))
            }
            Error::Validation { notice, back } => flash_redirect(&notice, &back),
            Error::Database(ref err) => {
                tracing::error!("database failure: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
            Error::Migrate(ref err) => {
                tracing::error!("migration failure: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
            Error::Hash(ref err) => {
                tracing::error!("password hashing failure: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
            Error::Io(ref err) => {
                tracing::error!("io failure: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
            Error::Header(ref err) => {
                tracing::error!("header encoding failure: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::header::LOCATION;

    use super::*;

    #[test]
    fn not_found_is_a_plain_404() {
        let res = Error::NotFound.into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert!(res.headers().get(LOCATION).is_none());
        assert!(res.headers().get(SET_COOKIE).is_none());
    }

    #[test]
    fn duplicate_username_redirects_back_to_register() {
        let res = Error::DuplicateUsername.into_response();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers().get(LOCATION).unwrap(), "/register");
        let cookie = res.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("_Host_flash="));
    }

    #[test]
    fn invalid_credential_bounces_to_login() {
        let res = Error::InvalidCredential.into_response();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers().get(LOCATION).unwrap(), "/login");
    }

    #[test]
    fn unauthorized_preserves_the_next_page() {
        let res = Error::Unauthorized {
            next: "/dashboard".into(),
        }
        .into_response();
        assert_eq!(
            res.headers().get(LOCATION).unwrap(),
            "/login?next=%2Fdashboard"
        );
    }

    #[test]
    fn duplicate_application_bounces_to_the_job_page() {
        let res = Error::DuplicateApplication { job_id: 7 }.into_response();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers().get(LOCATION).unwrap(), "/job/7");
    }

    #[test]
    fn invalid_status_bounces_to_the_review_page() {
        let res = Error::InvalidStatus { job_id: 3 }.into_response();
        assert_eq!(res.headers().get(LOCATION).unwrap(), "/applications/3");
    }

    #[test]
    fn forbidden_redirects_where_it_was_told_to() {
        let res = Error::Forbidden {
            notice: "Only employers can post jobs",
            back: "/",
        }
        .into_response();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers().get(LOCATION).unwrap(), "/");
    }

    #[test]
    fn internal_faults_stay_opaque() {
        let res = Error::Hash("salt went missing".into()).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(res.headers().get(LOCATION).is_none());
        assert!(res.headers().get(SET_COOKIE).is_none());
    }
}
