use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use consign_core::repository::VendorRepository;
use consign_shared::models::Vendor;
use consign_shared::topics;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

const SERVICE_TYPES: [&str; 2] = ["Logistics", "Shipping Line"];

#[derive(Debug, Deserialize)]
pub struct VendorRequest {
    pub name: String,
    pub contact_info: String,
    pub service_type: String,
    pub is_active: Option<bool>,
}

impl VendorRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() || self.name.len() > 100 {
            return Err(AppError::ValidationError(
                "name must be 1-100 characters".to_string(),
            ));
        }
        if self.contact_info.trim().is_empty() || self.contact_info.len() > 200 {
            return Err(AppError::ValidationError(
                "contact info must be 1-200 characters".to_string(),
            ));
        }
        if !SERVICE_TYPES.contains(&self.service_type.as_str()) {
            return Err(AppError::ValidationError(
                "service type must be Logistics or Shipping Line".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/vendors", get(list_vendors).post(create_vendor))
        .route(
            "/v1/vendors/{id}",
            get(get_vendor).put(update_vendor).delete(delete_vendor),
        )
}

/// GET /v1/vendors
async fn list_vendors(State(state): State<AppState>) -> Result<Json<Vec<Vendor>>, AppError> {
    let vendors = state.vendors.find_all().await?;
    Ok(Json(vendors))
}

/// GET /v1/vendors/:id
async fn get_vendor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vendor>, AppError> {
    let vendor = state
        .vendors
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("vendor {}", id)))?;
    Ok(Json(vendor))
}

/// POST /v1/vendors
async fn create_vendor(
    State(state): State<AppState>,
    Json(req): Json<VendorRequest>,
) -> Result<(StatusCode, Json<Vendor>), AppError> {
    req.validate()?;

    let mut vendor = Vendor::new(req.name, req.contact_info, req.service_type);
    if let Some(is_active) = req.is_active {
        vendor.is_active = is_active;
    }

    let saved = state.vendors.save(&vendor).await?;
    state.events.publish(
        topics::VENDOR_EVENTS,
        &format!("Vendor created: ID={}, Name={}", saved.id, saved.name),
    );
    Ok((StatusCode::CREATED, Json(saved)))
}

/// PUT /v1/vendors/:id
async fn update_vendor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<VendorRequest>,
) -> Result<Json<Vendor>, AppError> {
    req.validate()?;

    let mut vendor = state
        .vendors
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("vendor {}", id)))?;

    vendor.name = req.name;
    vendor.contact_info = req.contact_info;
    vendor.service_type = req.service_type;
    if let Some(is_active) = req.is_active {
        vendor.is_active = is_active;
    }

    let saved = state.vendors.save(&vendor).await?;
    state.events.publish(
        topics::VENDOR_EVENTS,
        &format!("Vendor updated: ID={}, Name={}", id, saved.name),
    );
    Ok(Json(saved))
}

/// DELETE /v1/vendors/:id
async fn delete_vendor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !state.vendors.exists_by_id(id).await? {
        return Err(AppError::NotFoundError(format!("vendor {}", id)));
    }

    state.vendors.delete_by_id(id).await?;
    state
        .events
        .publish(topics::VENDOR_EVENTS, &format!("Vendor deleted: ID={}", id));

    Ok(Json(json!({
        "success": true,
        "message": "Vendor deleted successfully",
        "vendor_id": id,
    })))
}
