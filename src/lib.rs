pub mod config;
pub mod csrf;
pub mod db;
pub mod entities;
pub mod error;
pub mod forms;
pub mod models;
pub mod ranking;
pub mod routes;
pub mod store;
pub mod templates;
pub mod tmdb;

use std::sync::Arc;

use axum::{Router, extract::FromRef, routing::get};
use axum_extra::extract::cookie::SignedCookieJar;
use cookie::Key;
use tower_http::trace::TraceLayer;

use crate::{config::Config, error::AppResult, store::MovieStore, tmdb::MetadataProvider};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: MovieStore,
    pub metadata: Arc<dyn MetadataProvider>,
    pub cookie_key: Key,
}

impl AppState {
    pub fn check_csrf(&self, jar: &SignedCookieJar, submitted: &str) -> AppResult<()> {
        if !self.config.csrf_enabled {
            return Ok(());
        }
        csrf::verify(jar, submitted)
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/add", get(routes::add_form).post(routes::search))
        .route("/add/{segment}", get(routes::select).post(routes::add_review))
        .route("/edit/{segment}", get(routes::edit_form).post(routes::edit))
        .route("/delete/{segment}", get(routes::delete))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
