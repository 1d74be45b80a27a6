//! In-memory store used by tests and local development. Mirrors the
//! Postgres schema semantics that the core relies on: owned cargo is
//! dropped with its shipment, and a second delivery for the same
//! shipment is a uniqueness conflict.

use async_trait::async_trait;
use consign_core::repository::{
    CargoRepository, DeliveryRepository, RouteRepository, ShipmentRepository, VendorRepository,
};
use consign_core::{EventSink, StoreError};
use consign_shared::models::{Cargo, Delivery, Route, Shipment, Vendor};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    shipments: HashMap<Uuid, Shipment>,
    cargo: HashMap<Uuid, Cargo>,
    routes: HashMap<Uuid, Route>,
    vendors: HashMap<Uuid, Vendor>,
    deliveries: HashMap<Uuid, Delivery>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shipments(&self) -> MemoryShipmentRepo {
        MemoryShipmentRepo {
            tables: self.tables.clone(),
        }
    }

    pub fn cargo(&self) -> MemoryCargoRepo {
        MemoryCargoRepo {
            tables: self.tables.clone(),
        }
    }

    pub fn routes(&self) -> MemoryRouteRepo {
        MemoryRouteRepo {
            tables: self.tables.clone(),
        }
    }

    pub fn vendors(&self) -> MemoryVendorRepo {
        MemoryVendorRepo {
            tables: self.tables.clone(),
        }
    }

    pub fn deliveries(&self) -> MemoryDeliveryRepo {
        MemoryDeliveryRepo {
            tables: self.tables.clone(),
        }
    }
}

pub struct MemoryShipmentRepo {
    tables: Arc<RwLock<Tables>>,
}

#[async_trait]
impl ShipmentRepository for MemoryShipmentRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Shipment>, StoreError> {
        Ok(self.tables.read().await.shipments.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Shipment>, StoreError> {
        let mut all: Vec<Shipment> = self.tables.read().await.shipments.values().cloned().collect();
        all.sort_by_key(|s| s.created_at);
        Ok(all)
    }

    async fn exists_by_id(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.tables.read().await.shipments.contains_key(&id))
    }

    async fn save(&self, shipment: &Shipment) -> Result<Shipment, StoreError> {
        self.tables
            .write()
            .await
            .shipments
            .insert(shipment.id, shipment.clone());
        Ok(shipment.clone())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables.shipments.remove(&id);
        // Ownership cascade: cargo goes with its shipment.
        tables.cargo.retain(|_, c| c.shipment_id != Some(id));
        Ok(())
    }
}

pub struct MemoryCargoRepo {
    tables: Arc<RwLock<Tables>>,
}

#[async_trait]
impl CargoRepository for MemoryCargoRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Cargo>, StoreError> {
        Ok(self.tables.read().await.cargo.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Cargo>, StoreError> {
        let mut all: Vec<Cargo> = self.tables.read().await.cargo.values().cloned().collect();
        all.sort_by_key(|c| c.created_at);
        Ok(all)
    }

    async fn find_by_shipment(&self, shipment_id: Uuid) -> Result<Vec<Cargo>, StoreError> {
        let mut owned: Vec<Cargo> = self
            .tables
            .read()
            .await
            .cargo
            .values()
            .filter(|c| c.shipment_id == Some(shipment_id))
            .cloned()
            .collect();
        owned.sort_by_key(|c| c.created_at);
        Ok(owned)
    }

    async fn exists_by_id(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.tables.read().await.cargo.contains_key(&id))
    }

    async fn save(&self, cargo: &Cargo) -> Result<Cargo, StoreError> {
        self.tables
            .write()
            .await
            .cargo
            .insert(cargo.id, cargo.clone());
        Ok(cargo.clone())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError> {
        self.tables.write().await.cargo.remove(&id);
        Ok(())
    }
}

pub struct MemoryRouteRepo {
    tables: Arc<RwLock<Tables>>,
}

#[async_trait]
impl RouteRepository for MemoryRouteRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Route>, StoreError> {
        Ok(self.tables.read().await.routes.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Route>, StoreError> {
        let mut all: Vec<Route> = self.tables.read().await.routes.values().cloned().collect();
        all.sort_by_key(|r| r.created_at);
        Ok(all)
    }

    async fn exists_by_id(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.tables.read().await.routes.contains_key(&id))
    }

    async fn save(&self, route: &Route) -> Result<Route, StoreError> {
        self.tables
            .write()
            .await
            .routes
            .insert(route.id, route.clone());
        Ok(route.clone())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError> {
        self.tables.write().await.routes.remove(&id);
        Ok(())
    }
}

pub struct MemoryVendorRepo {
    tables: Arc<RwLock<Tables>>,
}

#[async_trait]
impl VendorRepository for MemoryVendorRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Vendor>, StoreError> {
        Ok(self.tables.read().await.vendors.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Vendor>, StoreError> {
        let mut all: Vec<Vendor> = self.tables.read().await.vendors.values().cloned().collect();
        all.sort_by_key(|v| v.created_at);
        Ok(all)
    }

    async fn exists_by_id(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.tables.read().await.vendors.contains_key(&id))
    }

    async fn save(&self, vendor: &Vendor) -> Result<Vendor, StoreError> {
        self.tables
            .write()
            .await
            .vendors
            .insert(vendor.id, vendor.clone());
        Ok(vendor.clone())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError> {
        self.tables.write().await.vendors.remove(&id);
        Ok(())
    }
}

pub struct MemoryDeliveryRepo {
    tables: Arc<RwLock<Tables>>,
}

#[async_trait]
impl DeliveryRepository for MemoryDeliveryRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Delivery>, StoreError> {
        Ok(self.tables.read().await.deliveries.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Delivery>, StoreError> {
        let mut all: Vec<Delivery> = self
            .tables
            .read()
            .await
            .deliveries
            .values()
            .cloned()
            .collect();
        all.sort_by_key(|d| d.created_at);
        Ok(all)
    }

    async fn find_by_shipment(&self, shipment_id: Uuid) -> Result<Option<Delivery>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .deliveries
            .values()
            .find(|d| d.shipment_id == shipment_id)
            .cloned())
    }

    async fn exists_by_id(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.tables.read().await.deliveries.contains_key(&id))
    }

    async fn exists_by_shipment(&self, shipment_id: Uuid) -> Result<bool, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .deliveries
            .values()
            .any(|d| d.shipment_id == shipment_id))
    }

    async fn save(&self, delivery: &Delivery) -> Result<Delivery, StoreError> {
        let mut tables = self.tables.write().await;

        // Uniqueness constraint on the shipment reference column.
        let duplicate = tables
            .deliveries
            .values()
            .any(|d| d.shipment_id == delivery.shipment_id && d.id != delivery.id);
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "delivery already exists for shipment {}",
                delivery.shipment_id
            )));
        }

        tables.deliveries.insert(delivery.id, delivery.clone());
        Ok(delivery.clone())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError> {
        self.tables.write().await.deliveries.remove(&id);
        Ok(())
    }

    async fn delete_all(&self, ids: &[Uuid]) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        for id in ids {
            tables.deliveries.remove(id);
        }
        Ok(())
    }
}

/// Event sink that records published envelopes for assertions
#[derive(Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<(String, String)>>,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<(String, String)> {
        self.messages.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn publish(&self, topic: &str, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((topic.to_string(), message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn second_delivery_for_a_shipment_is_a_conflict() {
        let store = MemoryStore::new();
        let shipment_id = Uuid::new_v4();

        let first = Delivery::new(shipment_id, Utc::now(), "Customer at LA".to_string());
        let second = Delivery::new(shipment_id, Utc::now(), "Customer at LA".to_string());

        store.deliveries().save(&first).await.unwrap();
        let err = store.deliveries().save(&second).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        // Updating the existing row in place is not a conflict.
        let mut updated = first.clone();
        updated.recipient = "Warehouse B".to_string();
        store.deliveries().save(&updated).await.unwrap();
        assert_eq!(store.deliveries().find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn deleting_a_shipment_drops_its_cargo() {
        let store = MemoryStore::new();
        let shipment = Shipment::new("NYC".to_string(), "LA".to_string());
        store.shipments().save(&shipment).await.unwrap();

        let mut owned = Cargo::new("Electronics".to_string());
        owned.shipment_id = Some(shipment.id);
        let loose = Cargo::new("Textiles".to_string());
        store.cargo().save(&owned).await.unwrap();
        store.cargo().save(&loose).await.unwrap();

        store.shipments().delete_by_id(shipment.id).await.unwrap();

        let remaining = store.cargo().find_all().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, loose.id);
    }
}
