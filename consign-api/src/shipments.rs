use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use consign_core::repository::{CargoRepository, ShipmentRepository};
use consign_shared::models::{Cargo, Shipment};
use consign_tracking::{NewShipment, ShipmentUpdate};
use uuid::Uuid;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/shipments", get(list_shipments).post(create_shipment))
        .route(
            "/v1/shipments/{id}",
            get(get_shipment)
                .put(update_shipment)
                .delete(delete_shipment),
        )
        .route("/v1/shipments/{id}/cargo", get(list_shipment_cargo))
}

/// GET /v1/shipments
async fn list_shipments(
    State(state): State<AppState>,
) -> Result<Json<Vec<Shipment>>, AppError> {
    let shipments = state.shipments.find_all().await?;
    Ok(Json(shipments))
}

/// GET /v1/shipments/:id
async fn get_shipment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Shipment>, AppError> {
    let shipment = state
        .shipments
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("shipment {}", id)))?;
    Ok(Json(shipment))
}

/// GET /v1/shipments/:id/cargo
/// Cargo items owned by a shipment
async fn list_shipment_cargo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Cargo>>, AppError> {
    if !state.shipments.exists_by_id(id).await? {
        return Err(AppError::NotFoundError(format!("shipment {}", id)));
    }
    let items = state.cargo.find_by_shipment(id).await?;
    Ok(Json(items))
}

/// POST /v1/shipments
async fn create_shipment(
    State(state): State<AppState>,
    Json(req): Json<NewShipment>,
) -> Result<(StatusCode, Json<Shipment>), AppError> {
    let shipment = state.tracker.create_shipment(req).await?;
    Ok((StatusCode::CREATED, Json(shipment)))
}

/// PUT /v1/shipments/:id
/// The status-triggering update: entering Delivered materializes the
/// delivery record; leaving it defers deletion to the cleanup sweep.
async fn update_shipment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ShipmentUpdate>,
) -> Result<Json<Shipment>, AppError> {
    let shipment = state.tracker.update_shipment(id, req).await?;
    Ok(Json(shipment))
}

/// DELETE /v1/shipments/:id
/// Cascades to owned cargo and the associated delivery record
async fn delete_shipment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.tracker.delete_shipment(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
