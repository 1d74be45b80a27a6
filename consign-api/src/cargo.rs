use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use consign_core::repository::{CargoRepository, ShipmentRepository};
use consign_shared::models::Cargo;
use consign_shared::topics;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CargoRequest {
    pub shipment_id: Option<Uuid>,
    pub kind: String,
    pub description: Option<String>,
    pub value: Option<f64>,
    pub weight: Option<f64>,
    pub weight_unit: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/cargo", get(list_cargo).post(create_cargo))
        .route(
            "/v1/cargo/{id}",
            get(get_cargo).put(update_cargo).delete(delete_cargo),
        )
}

/// GET /v1/cargo
async fn list_cargo(State(state): State<AppState>) -> Result<Json<Vec<Cargo>>, AppError> {
    let items = state.cargo.find_all().await?;
    Ok(Json(items))
}

/// GET /v1/cargo/:id
async fn get_cargo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Cargo>, AppError> {
    let cargo = state
        .cargo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("cargo {}", id)))?;
    Ok(Json(cargo))
}

/// POST /v1/cargo
async fn create_cargo(
    State(state): State<AppState>,
    Json(req): Json<CargoRequest>,
) -> Result<(StatusCode, Json<Cargo>), AppError> {
    if req.kind.trim().is_empty() {
        return Err(AppError::ValidationError("kind is required".to_string()));
    }
    // An owning shipment is optional, but when given it must exist.
    if let Some(shipment_id) = req.shipment_id {
        if !state.shipments.exists_by_id(shipment_id).await? {
            return Err(AppError::NotFoundError(format!("shipment {}", shipment_id)));
        }
    }

    let mut cargo = Cargo::new(req.kind);
    cargo.shipment_id = req.shipment_id;
    cargo.description = req.description;
    cargo.value = req.value;
    cargo.weight = req.weight;
    cargo.weight_unit = req.weight_unit;

    let saved = state.cargo.save(&cargo).await?;
    state.events.publish(
        topics::CARGO_EVENTS,
        &format!("Cargo created: ID={}, Kind={}", saved.id, saved.kind),
    );
    Ok((StatusCode::CREATED, Json(saved)))
}

/// PUT /v1/cargo/:id
async fn update_cargo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CargoRequest>,
) -> Result<Json<Cargo>, AppError> {
    if req.kind.trim().is_empty() {
        return Err(AppError::ValidationError("kind is required".to_string()));
    }
    if let Some(shipment_id) = req.shipment_id {
        if !state.shipments.exists_by_id(shipment_id).await? {
            return Err(AppError::NotFoundError(format!("shipment {}", shipment_id)));
        }
    }

    let mut cargo = state
        .cargo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("cargo {}", id)))?;

    cargo.shipment_id = req.shipment_id;
    cargo.kind = req.kind;
    cargo.description = req.description;
    cargo.value = req.value;
    cargo.weight = req.weight;
    cargo.weight_unit = req.weight_unit;

    let saved = state.cargo.save(&cargo).await?;
    state.events.publish(
        topics::CARGO_EVENTS,
        &format!("Cargo updated: ID={}, Kind={}", id, saved.kind),
    );
    Ok(Json(saved))
}

/// DELETE /v1/cargo/:id
async fn delete_cargo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !state.cargo.exists_by_id(id).await? {
        return Err(AppError::NotFoundError(format!("cargo {}", id)));
    }

    state.cargo.delete_by_id(id).await?;
    state
        .events
        .publish(topics::CARGO_EVENTS, &format!("Cargo deleted: ID={}", id));

    Ok(Json(json!({
        "success": true,
        "message": "Cargo deleted successfully",
        "cargo_id": id,
    })))
}
