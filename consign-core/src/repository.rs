use crate::error::StoreError;
use async_trait::async_trait;
use consign_shared::models::{Cargo, Delivery, Route, Shipment, Vendor};
use uuid::Uuid;

/// Repository trait for shipment data access.
/// `delete_by_id` also removes the cargo items the shipment owns.
#[async_trait]
pub trait ShipmentRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Shipment>, StoreError>;
    async fn find_all(&self) -> Result<Vec<Shipment>, StoreError>;
    async fn exists_by_id(&self, id: Uuid) -> Result<bool, StoreError>;
    async fn save(&self, shipment: &Shipment) -> Result<Shipment, StoreError>;
    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError>;
}

/// Repository trait for cargo data access
#[async_trait]
pub trait CargoRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Cargo>, StoreError>;
    async fn find_all(&self) -> Result<Vec<Cargo>, StoreError>;
    async fn find_by_shipment(&self, shipment_id: Uuid) -> Result<Vec<Cargo>, StoreError>;
    async fn exists_by_id(&self, id: Uuid) -> Result<bool, StoreError>;
    async fn save(&self, cargo: &Cargo) -> Result<Cargo, StoreError>;
    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError>;
}

/// Repository trait for route data access
#[async_trait]
pub trait RouteRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Route>, StoreError>;
    async fn find_all(&self) -> Result<Vec<Route>, StoreError>;
    async fn exists_by_id(&self, id: Uuid) -> Result<bool, StoreError>;
    async fn save(&self, route: &Route) -> Result<Route, StoreError>;
    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError>;
}

/// Repository trait for vendor data access
#[async_trait]
pub trait VendorRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Vendor>, StoreError>;
    async fn find_all(&self) -> Result<Vec<Vendor>, StoreError>;
    async fn exists_by_id(&self, id: Uuid) -> Result<bool, StoreError>;
    async fn save(&self, vendor: &Vendor) -> Result<Vendor, StoreError>;
    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError>;
}

/// Repository trait for delivery data access.
/// `save` of a new record must reject a second delivery for the same
/// shipment with `StoreError::Conflict`.
#[async_trait]
pub trait DeliveryRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Delivery>, StoreError>;
    async fn find_all(&self) -> Result<Vec<Delivery>, StoreError>;
    async fn find_by_shipment(&self, shipment_id: Uuid) -> Result<Option<Delivery>, StoreError>;
    async fn exists_by_id(&self, id: Uuid) -> Result<bool, StoreError>;
    async fn exists_by_shipment(&self, shipment_id: Uuid) -> Result<bool, StoreError>;
    async fn save(&self, delivery: &Delivery) -> Result<Delivery, StoreError>;
    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError>;
    async fn delete_all(&self, ids: &[Uuid]) -> Result<(), StoreError>;
}
