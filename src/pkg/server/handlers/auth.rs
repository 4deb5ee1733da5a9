use std::sync::Arc;

use axum::{
    Extension, Form,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    conf::settings,
    pkg::{
        internal::{
            adaptors::users::{mutators::UserMutator, selectors::UserSelector, spec::Role},
            auth::{self, AuthUser, Session},
        },
        server::{
            middlewares::authn::SESSION_COOKIE,
            state::{AppState, GetTxn},
        },
    },
    prelude::{Error, Result, flash_redirect},
};

#[derive(Deserialize, Validate)]
pub struct LoginInput {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
    // checkbox: present when ticked, absent otherwise
    pub remember_me: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    #[validate(must_match(other = "password", message = "passwords do not match"))]
    pub password2: String,
    pub is_employer: Option<String>,
}

#[derive(Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

const NEXT_PAGES: [&str; 3] = ["/", "/dashboard", "/post_job"];
const NEXT_PREFIXES: [&str; 3] = ["/job/", "/apply/", "/applications/"];

/// Allow-list for the post-login redirect target. Anything outside the
/// known pages of this site falls back to the index, which closes the
/// open-redirect hole instead of merely checking for an empty host.
pub fn safe_next(next: Option<&str>) -> String {
    match next {
        Some(n) if NEXT_PAGES.contains(&n) => n.to_string(),
        Some(n) if NEXT_PREFIXES.iter().any(|p| n.starts_with(p)) && !n.contains("//") => {
            n.to_string()
        }
        _ => "/".to_string(),
    }
}

async fn current_user(state: &AppState, headers: &HeaderMap) -> Result<Option<AuthUser>> {
    let jar = CookieJar::from_headers(headers);
    let Some(cookie) = jar.get(SESSION_COOKIE).filter(|c| !c.value().is_empty()) else {
        return Ok(None);
    };
    let mut tx = state.db_pool.begin_txn().await?;
    Session::resolve(&mut tx, cookie.value()).await
}

fn session_cookie(session: &Session, remember: bool) -> Result<HeaderValue> {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        SESSION_COOKIE, session.token
    );
    if remember {
        cookie.push_str(&format!("; Max-Age={}", settings.remember_ttl_minutes * 60));
    }
    Ok(HeaderValue::from_str(&cookie)?)
}

pub async fn login_page(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    if current_user(&state, &headers).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    // the form itself is rendered by the presentation layer
    Ok(StatusCode::OK.into_response())
}

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<NextQuery>,
    Form(input): Form<LoginInput>,
) -> Result<Response> {
    if current_user(&state, &headers).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    input
        .validate()
        .map_err(|e| Error::validation(e, "/login"))?;
    let mut tx = state.db_pool.begin_txn().await?;
    let user = UserSelector::new(&mut tx)
        .get_by_username(&input.username)
        .await?;
    let user = match user {
        Some(user) if auth::verify_password(&input.password, &user.password_hash) => user,
        _ => return Err(Error::InvalidCredential),
    };
    let remember = input.remember_me.is_some();
    let session = Session::start(&mut tx, user.id, remember).await?;
    tx.commit().await?;
    tracing::info!("user {} logged in", &user.username);
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, session_cookie(&session, remember)?);
    Ok((headers, Redirect::to(&safe_next(query.next.as_deref()))).into_response())
}

pub async fn register_page(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    if current_user(&state, &headers).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    Ok(StatusCode::OK.into_response())
}

pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(input): Form<RegisterInput>,
) -> Result<Response> {
    if current_user(&state, &headers).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    input
        .validate()
        .map_err(|e| Error::validation(e, "/register"))?;
    let mut tx = state.db_pool.begin_txn().await?;
    if UserSelector::new(&mut tx)
        .get_by_username(&input.username)
        .await?
        .is_some()
    {
        return Err(Error::DuplicateUsername);
    }
    if UserSelector::new(&mut tx)
        .get_by_email(&input.email)
        .await?
        .is_some()
    {
        return Err(Error::DuplicateEmail);
    }
    let role = Role::from_flag(input.is_employer.is_some());
    let password_hash = auth::hash_password(&input.password)?;
    let user = UserMutator::new(&mut tx)
        .create(&input.username, &input.email, &password_hash, role)
        .await?;
    tx.commit().await?;
    tracing::info!("registered user {} as {:?}", &user.username, &user.role);
    Ok(flash_redirect(
        "Congratulations, you are now a registered user!",
        "/login",
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<AuthUser>>,
    headers: HeaderMap,
) -> Result<Response> {
    let jar = CookieJar::from_headers(&headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Ok(token) = cookie.value().parse::<Uuid>() {
            let mut tx = state.db_pool.begin_txn().await?;
            Session::end(&mut tx, token).await?;
            tx.commit().await?;
        }
    }
    tracing::info!("user {} logged out", &user.username);
    let mut headers = HeaderMap::new();
    headers.insert(
        SET_COOKIE,
        HeaderValue::from_str(&format!("{}=; Path=/; Max-Age=0", SESSION_COOKIE))?,
    );
    Ok((headers, Redirect::to("/")).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_falls_back_to_index_for_external_targets() {
        assert_eq!(safe_next(Some("https://evil.example/")), "/");
        assert_eq!(safe_next(Some("//evil.example/")), "/");
        assert_eq!(safe_next(Some("/job//evil.example")), "/");
        assert_eq!(safe_next(Some("javascript:alert(1)")), "/");
        assert_eq!(safe_next(None), "/");
    }

    #[test]
    fn next_accepts_known_internal_pages() {
        assert_eq!(safe_next(Some("/dashboard")), "/dashboard");
        assert_eq!(safe_next(Some("/post_job")), "/post_job");
        assert_eq!(safe_next(Some("/job/12")), "/job/12");
        assert_eq!(safe_next(Some("/apply/3")), "/apply/3");
        assert_eq!(safe_next(Some("/applications/4")), "/applications/4");
    }

    #[test]
    fn next_rejects_unknown_internal_pages() {
        assert_eq!(safe_next(Some("/admin")), "/");
        assert_eq!(safe_next(Some("/dashboard?x=1")), "/");
    }

    #[test]
    fn register_input_requires_matching_passwords() {
        let input = RegisterInput {
            username: "alice".into(),
            email: "a@x.com".into(),
            password: "pw1".into(),
            password2: "pw2".into(),
            is_employer: None,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn register_input_requires_a_real_email() {
        let input = RegisterInput {
            username: "alice".into(),
            email: "not-an-email".into(),
            password: "pw1".into(),
            password2: "pw1".into(),
            is_employer: None,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn register_input_accepts_a_complete_form() {
        let input = RegisterInput {
            username: "bob".into(),
            email: "bob@corp.com".into(),
            password: "pw1".into(),
            password2: "pw1".into(),
            is_employer: Some("on".into()),
        };
        assert!(input.validate().is_ok());
    }

    #[test]
    fn login_input_rejects_blank_fields() {
        let input = LoginInput {
            username: "".into(),
            password: "pw1".into(),
            remember_me: None,
        };
        assert!(input.validate().is_err());
    }
}
