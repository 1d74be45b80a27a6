use axum::{http::Method, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod cargo;
pub mod deliveries;
pub mod error;
pub mod middleware;
pub mod relay;
pub mod routes;
pub mod shipments;
pub mod state;
pub mod stream;
pub mod vendors;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    Router::new()
        .merge(auth::routes())
        .merge(shipments::routes())
        .merge(deliveries::routes())
        .merge(deliveries::maintenance_routes(state.clone()))
        .merge(routes::routes())
        .merge(cargo::routes())
        .merge(vendors::routes())
        .merge(stream::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
