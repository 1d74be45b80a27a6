use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use consign_core::repository::RouteRepository;
use consign_shared::models::{Route, RouteStatus};
use consign_shared::topics;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    pub origin_port: String,
    pub destination_port: String,
    pub duration_hours: i32,
    pub distance_km: Option<f64>,
    pub transportation_mode: Option<String>,
    pub cost: Option<f64>,
    pub status: Option<RouteStatus>,
}

impl RouteRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.origin_port.trim().is_empty() || self.destination_port.trim().is_empty() {
            return Err(AppError::ValidationError(
                "origin port and destination port are required".to_string(),
            ));
        }
        if self.origin_port.len() > 100 || self.destination_port.len() > 100 {
            return Err(AppError::ValidationError(
                "ports cannot exceed 100 characters".to_string(),
            ));
        }
        if self.duration_hours < 1 {
            return Err(AppError::ValidationError(
                "duration must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/routes", get(list_routes).post(create_route))
        .route(
            "/v1/routes/{id}",
            get(get_route).put(update_route).delete(delete_route),
        )
}

/// GET /v1/routes
async fn list_routes(State(state): State<AppState>) -> Result<Json<Vec<Route>>, AppError> {
    let routes = state.routes.find_all().await?;
    Ok(Json(routes))
}

/// GET /v1/routes/:id
async fn get_route(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Route>, AppError> {
    let route = state
        .routes
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("route {}", id)))?;
    Ok(Json(route))
}

/// POST /v1/routes
async fn create_route(
    State(state): State<AppState>,
    Json(req): Json<RouteRequest>,
) -> Result<(StatusCode, Json<Route>), AppError> {
    req.validate()?;

    let mut route = Route::new(req.origin_port, req.destination_port, req.duration_hours);
    route.distance_km = req.distance_km;
    route.transportation_mode = req.transportation_mode;
    route.cost = req.cost;
    if let Some(status) = req.status {
        route.status = status;
    }

    let saved = state.routes.save(&route).await?;
    state.events.publish(
        topics::ROUTE_EVENTS,
        &format!(
            "Route created: ID={}, From={} to {}",
            saved.id, saved.origin_port, saved.destination_port
        ),
    );
    Ok((StatusCode::CREATED, Json(saved)))
}

/// PUT /v1/routes/:id
async fn update_route(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<RouteRequest>,
) -> Result<Json<Route>, AppError> {
    req.validate()?;

    let mut route = state
        .routes
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("route {}", id)))?;

    route.origin_port = req.origin_port;
    route.destination_port = req.destination_port;
    route.duration_hours = req.duration_hours;
    route.distance_km = req.distance_km;
    route.transportation_mode = req.transportation_mode;
    route.cost = req.cost;
    if let Some(status) = req.status {
        route.status = status;
    }

    let saved = state.routes.save(&route).await?;
    state.events.publish(
        topics::ROUTE_EVENTS,
        &format!(
            "Route updated: ID={}, From={} to {}",
            id, saved.origin_port, saved.destination_port
        ),
    );
    Ok(Json(saved))
}

/// DELETE /v1/routes/:id
async fn delete_route(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !state.routes.exists_by_id(id).await? {
        return Err(AppError::NotFoundError(format!("route {}", id)));
    }

    state.routes.delete_by_id(id).await?;
    state
        .events
        .publish(topics::ROUTE_EVENTS, &format!("Route deleted: ID={}", id));

    Ok(Json(json!({
        "success": true,
        "message": "Route deleted successfully",
        "route_id": id,
    })))
}
