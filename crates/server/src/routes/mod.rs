use axum::Router;
use tower_http::trace::TraceLayer;

use crate::DeploymentImpl;

pub mod assets;
pub mod health;
pub mod orders;
pub mod pages;
pub mod report;

/// Full application: HTML pages at the root, JSON API under `/api`.
pub fn router(deployment: DeploymentImpl) -> Router {
    let api = Router::new()
        .merge(orders::router(&deployment))
        .merge(report::api_router(&deployment))
        .merge(health::router(&deployment));

    Router::new()
        .merge(pages::router(&deployment))
        .merge(report::router(&deployment))
        .merge(assets::router())
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(deployment)
}
