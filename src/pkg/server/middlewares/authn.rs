use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::{
    pkg::{
        internal::auth::Session,
        server::state::{AppState, GetTxn},
    },
    prelude::{Error, Result},
};

pub const SESSION_COOKIE: &str = "_Host_session";

/// Resolves the session cookie to a user and attaches it to the request.
/// Anything without a live session is bounced to the login page, with the
/// original target preserved as the `next` parameter.
pub async fn authenticate(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let jar = CookieJar::from_headers(&headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE).filter(|c| !c.value().is_empty()) {
        let mut tx = state.db_pool.begin_txn().await?;
        if let Some(user) = Session::resolve(&mut tx, cookie.value()).await? {
            request.extensions_mut().insert(Arc::new(user));
            return Ok(next.run(request).await);
        }
    }
    tracing::warn!("session missing or expired, authentication denied");
    let next_page = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".into());
    Err(Error::Unauthorized { next: next_page })
}
