use axum::middleware::from_fn_with_state;
use axum::{Router, routing::get};

use super::handlers::{applications, auth, dashboard, jobs, probes};
use super::middlewares::authn;
use super::state::AppState;
use crate::prelude::Result;

pub fn build_routes() -> Result<Router> {
    let state = AppState::new()?;
    let app = Router::new()
        .route("/logout", get(auth::logout))
        .route("/dashboard", get(dashboard::dashboard))
        .route("/post_job", get(jobs::post_job_page).post(jobs::post_job))
        .route(
            "/apply/{job_id}",
            get(applications::apply_page).post(applications::apply),
        )
        .route("/applications/{job_id}", get(applications::list_for_job))
        .route(
            "/update_status/{application_id}/{status}",
            get(applications::update_status),
        )
        .layer(from_fn_with_state(state.clone(), authn::authenticate))
        .route("/", get(jobs::index))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/job/{job_id}", get(jobs::detail))
        .route("/healthz", get(probes::healthz))
        .route("/livez", get(probes::livez))
        .with_state(state);

    Ok(app)
}
