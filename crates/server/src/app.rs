use std::path::Path;
use std::sync::Arc;

use axum::http::{header, Method};
use axum::routing::post;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use compass_agent::Strategist;
use compass_db::{ContactRepository, DbPool, LeadRepository};

use crate::{contact, health, strategy};

/// Shared endpoint dependencies. `strategist` is `None` when no oracle is
/// configured; the endpoints degrade per their contracts instead of failing
/// at startup.
#[derive(Clone)]
pub struct ApiState {
    pub strategist: Option<Arc<Strategist>>,
    pub leads: Arc<dyn LeadRepository>,
    pub contacts: Arc<dyn ContactRepository>,
}

/// Assemble the site router: JSON API, health, permissive CORS for the
/// marketing pages, and optionally the prebuilt static site as the fallback.
pub fn router(state: ApiState, db_pool: DbPool, static_dir: Option<&Path>) -> Router {
    let api = Router::new()
        .route("/api/strategy", post(strategy::generate).options(strategy::preflight))
        .route("/api/contact", post(contact::submit).options(contact::preflight))
        .with_state(state);

    let mut app = api.merge(health::router(db_pool)).layer(cors_layer());
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }
    app
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
