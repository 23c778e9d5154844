mod handlers;

pub use handlers::ErrorDetail;

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::catalog::Catalog;

pub fn create_router(catalog: Catalog) -> Router {
    let api = Router::new()
        .route("/trajectories", get(handlers::list_trajectories))
        .route("/mvsx/{id}", get(handlers::get_mvsx));

    Router::new()
        .route("/", get(handlers::index))
        .route("/static/app.js", get(handlers::app_js))
        .route("/health", get(handlers::health))
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(catalog)
}
