use crate::error::AppError;
use crate::middleware;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use consign_core::repository::{DeliveryRepository, ShipmentRepository};
use consign_shared::models::{Delivery, DeliveryStatus};
use consign_shared::topics;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct DeliveryRequest {
    pub shipment_id: Uuid,
    pub actual_delivery_date: Option<DateTime<Utc>>,
    pub recipient: String,
    pub status: Option<DeliveryStatus>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/deliveries", get(list_deliveries).post(create_delivery))
        .route(
            "/v1/deliveries/{id}",
            get(get_delivery)
                .put(update_delivery)
                .delete(delete_delivery),
        )
}

/// Maintenance operations, bearer-token protected
pub fn maintenance_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/v1/maintenance/deliveries/cleanup",
            post(cleanup_deliveries),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_bearer,
        ))
}

/// GET /v1/deliveries
/// Applies the consistency predicate instead of trusting raw rows: a
/// delivery only shows up while its shipment is actually Delivered.
async fn list_deliveries(
    State(state): State<AppState>,
) -> Result<Json<Vec<Delivery>>, AppError> {
    let deliveries = state.delivery_manager.list_consistent().await?;
    Ok(Json(deliveries))
}

/// GET /v1/deliveries/:id
async fn get_delivery(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Delivery>, AppError> {
    let delivery = state
        .deliveries
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("delivery {}", id)))?;
    Ok(Json(delivery))
}

/// POST /v1/deliveries
async fn create_delivery(
    State(state): State<AppState>,
    Json(req): Json<DeliveryRequest>,
) -> Result<(StatusCode, Json<Delivery>), AppError> {
    if req.recipient.trim().is_empty() {
        return Err(AppError::ValidationError("recipient is required".to_string()));
    }
    if !state.shipments.exists_by_id(req.shipment_id).await? {
        return Err(AppError::NotFoundError(format!(
            "shipment {}",
            req.shipment_id
        )));
    }

    let mut delivery = Delivery::new(
        req.shipment_id,
        req.actual_delivery_date.unwrap_or_else(Utc::now),
        req.recipient,
    );
    if let Some(status) = req.status {
        delivery.status = status;
    }

    let saved = state.deliveries.save(&delivery).await?;
    state.events.publish(
        topics::DELIVERY_EVENTS,
        &format!(
            "Delivery created: ID={}, Recipient={}",
            saved.id, saved.recipient
        ),
    );
    Ok((StatusCode::CREATED, Json(saved)))
}

/// PUT /v1/deliveries/:id
async fn update_delivery(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<DeliveryRequest>,
) -> Result<Json<Delivery>, AppError> {
    if req.recipient.trim().is_empty() {
        return Err(AppError::ValidationError("recipient is required".to_string()));
    }

    let mut delivery = state
        .deliveries
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("delivery {}", id)))?;

    delivery.shipment_id = req.shipment_id;
    if let Some(date) = req.actual_delivery_date {
        delivery.actual_delivery_date = date;
    }
    delivery.recipient = req.recipient;
    if let Some(status) = req.status {
        delivery.status = status;
    }

    let saved = state.deliveries.save(&delivery).await?;
    state.events.publish(
        topics::DELIVERY_EVENTS,
        &format!("Delivery updated: ID={}, Recipient={}", id, saved.recipient),
    );
    Ok(Json(saved))
}

/// DELETE /v1/deliveries/:id
async fn delete_delivery(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !state.deliveries.exists_by_id(id).await? {
        return Err(AppError::NotFoundError(format!("delivery {}", id)));
    }

    state.deliveries.delete_by_id(id).await?;
    state.events.publish(
        topics::DELIVERY_EVENTS,
        &format!("Delivery deleted: ID={}", id),
    );

    Ok(Json(json!({
        "success": true,
        "message": "Delivery deleted successfully",
        "delivery_id": id,
    })))
}

/// POST /v1/maintenance/deliveries/cleanup
/// The cleanup sweep as an explicitly named operation, invocable on a
/// schedule or on demand
async fn cleanup_deliveries(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let deleted = state.delivery_manager.cleanup_inconsistent().await?;
    Ok(Json(json!({ "deleted": deleted })))
}
