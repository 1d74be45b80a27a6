use crate::consistency::DeliveryManager;
use crate::error::TrackingError;
use chrono::{NaiveDate, Utc};
use consign_core::repository::ShipmentRepository;
use consign_core::EventSink;
use consign_shared::models::{Shipment, ShipmentStatus};
use consign_shared::topics;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// Fields accepted when creating a shipment
#[derive(Debug, Clone, Deserialize)]
pub struct NewShipment {
    pub origin: String,
    pub destination: String,
    pub status: Option<ShipmentStatus>,
    pub estimated_delivery: Option<NaiveDate>,
    pub route_id: Option<Uuid>,
    pub vendor_id: Option<Uuid>,
}

/// Full field update applied to an existing shipment
#[derive(Debug, Clone, Deserialize)]
pub struct ShipmentUpdate {
    pub origin: String,
    pub destination: String,
    pub status: ShipmentStatus,
    pub estimated_delivery: Option<NaiveDate>,
    pub route_id: Option<Uuid>,
    pub vendor_id: Option<Uuid>,
}

/// Manages shipment lifecycle and the status-triggered side effects:
/// materializing the delivery record on the transition into `Delivered`
/// and announcing every successful mutation on the shipment topic.
pub struct ShipmentManager {
    shipments: Arc<dyn ShipmentRepository>,
    deliveries: Arc<DeliveryManager>,
    events: Arc<dyn EventSink>,
}

impl ShipmentManager {
    pub fn new(
        shipments: Arc<dyn ShipmentRepository>,
        deliveries: Arc<DeliveryManager>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            shipments,
            deliveries,
            events,
        }
    }

    /// Create a new shipment, defaulting to status `Created`
    pub async fn create_shipment(&self, new: NewShipment) -> Result<Shipment, TrackingError> {
        validate_leg(&new.origin, &new.destination)?;

        let mut shipment = Shipment::new(new.origin, new.destination);
        if let Some(status) = new.status {
            shipment.status = status;
        }
        shipment.estimated_delivery = new.estimated_delivery;
        shipment.route_id = new.route_id;
        shipment.vendor_id = new.vendor_id;

        let saved = self.shipments.save(&shipment).await?;
        self.events.publish(
            topics::SHIPMENT_EVENTS,
            &format!("Shipment created with ID: {}", saved.id),
        );
        Ok(saved)
    }

    /// Apply a full field update to a shipment. The status observed
    /// before the write decides the side effect:
    /// entering `Delivered` materializes the delivery record; leaving it
    /// deletes nothing inline (the cleanup sweep reconciles later, so a
    /// status flap cannot destroy delivery history).
    pub async fn update_shipment(
        &self,
        id: Uuid,
        update: ShipmentUpdate,
    ) -> Result<Shipment, TrackingError> {
        validate_leg(&update.origin, &update.destination)?;

        let mut shipment = self
            .shipments
            .find_by_id(id)
            .await?
            .ok_or_else(|| TrackingError::NotFound(format!("shipment {}", id)))?;

        let old_status = shipment.status;

        shipment.origin = update.origin;
        shipment.destination = update.destination;
        shipment.status = update.status;
        shipment.estimated_delivery = update.estimated_delivery;
        shipment.route_id = update.route_id;
        shipment.vendor_id = update.vendor_id;
        shipment.updated_at = Utc::now();

        let saved = self.shipments.save(&shipment).await?;

        if saved.status == ShipmentStatus::Delivered && old_status != ShipmentStatus::Delivered {
            self.deliveries.ensure_delivery_for(&saved).await?;
        }

        self.events.publish(
            topics::SHIPMENT_EVENTS,
            &format!("Shipment {} updated. New status: {}", id, saved.status),
        );
        Ok(saved)
    }

    /// Delete a shipment. Delivery rows referencing it are removed first,
    /// then the shipment row; owned cargo goes with the shipment via the
    /// store's ownership cascade.
    pub async fn delete_shipment(&self, id: Uuid) -> Result<(), TrackingError> {
        if !self.shipments.exists_by_id(id).await? {
            return Err(TrackingError::NotFound(format!("shipment {}", id)));
        }

        self.deliveries.cascade_delete_for(id).await?;
        self.shipments.delete_by_id(id).await?;

        self.events.publish(
            topics::SHIPMENT_EVENTS,
            &format!("Shipment deleted with ID: {}", id),
        );
        Ok(())
    }
}

fn validate_leg(origin: &str, destination: &str) -> Result<(), TrackingError> {
    if origin.trim().is_empty() {
        return Err(TrackingError::Validation("origin is required".to_string()));
    }
    if destination.trim().is_empty() {
        return Err(TrackingError::Validation(
            "destination is required".to_string(),
        ));
    }
    if origin.len() > 100 || destination.len() > 100 {
        return Err(TrackingError::Validation(
            "origin and destination cannot exceed 100 characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use consign_core::repository::DeliveryRepository;
    use consign_store::memory::{MemoryStore, RecordingSink};

    fn update(status: ShipmentStatus) -> ShipmentUpdate {
        ShipmentUpdate {
            origin: "NYC".to_string(),
            destination: "LA".to_string(),
            status,
            estimated_delivery: NaiveDate::from_ymd_opt(2024, 1, 10),
            route_id: None,
            vendor_id: None,
        }
    }

    fn setup() -> (MemoryStore, ShipmentManager, Arc<RecordingSink>) {
        let store = MemoryStore::new();
        let sink = Arc::new(RecordingSink::default());
        let deliveries = Arc::new(DeliveryManager::new(
            Arc::new(store.deliveries()),
            Arc::new(store.shipments()),
        ));
        let manager = ShipmentManager::new(Arc::new(store.shipments()), deliveries, sink.clone());
        (store, manager, sink)
    }

    async fn create(manager: &ShipmentManager) -> Shipment {
        manager
            .create_shipment(NewShipment {
                origin: "NYC".to_string(),
                destination: "LA".to_string(),
                status: None,
                estimated_delivery: None,
                route_id: None,
                vendor_id: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn delivered_transition_creates_exactly_one_delivery() {
        let (store, manager, _) = setup();
        let shipment = create(&manager).await;
        assert_eq!(shipment.status, ShipmentStatus::Created);

        manager
            .update_shipment(shipment.id, update(ShipmentStatus::Delivered))
            .await
            .unwrap();

        let deliveries = store.deliveries().find_all().await.unwrap();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].shipment_id, shipment.id);
        assert_eq!(deliveries[0].recipient, "Customer at LA");
        assert_eq!(
            deliveries[0].actual_delivery_date.to_rfc3339(),
            "2024-01-10T00:00:00+00:00"
        );

        // Repeating the same update leaves exactly one delivery.
        manager
            .update_shipment(shipment.id, update(ShipmentStatus::Delivered))
            .await
            .unwrap();
        assert_eq!(store.deliveries().find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn leaving_delivered_keeps_the_record_until_cleanup() {
        let (store, manager, _) = setup();
        let shipment = create(&manager).await;

        manager
            .update_shipment(shipment.id, update(ShipmentStatus::Delivered))
            .await
            .unwrap();
        manager
            .update_shipment(shipment.id, update(ShipmentStatus::InTransit))
            .await
            .unwrap();

        // No inline deletion on the way out of Delivered.
        assert_eq!(store.deliveries().find_all().await.unwrap().len(), 1);

        let deliveries = DeliveryManager::new(
            Arc::new(store.deliveries()),
            Arc::new(store.shipments()),
        );
        assert_eq!(deliveries.cleanup_inconsistent().await.unwrap(), 1);
        assert!(store.deliveries().find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_shipment_reports_not_found_and_emits_nothing() {
        let (_, manager, sink) = setup();

        let result = manager
            .update_shipment(Uuid::new_v4(), update(ShipmentStatus::Delivered))
            .await;

        assert!(matches!(result, Err(TrackingError::NotFound(_))));
        assert!(sink.messages().is_empty());
    }

    #[tokio::test]
    async fn validation_rejects_blank_origin_before_any_write() {
        let (store, manager, sink) = setup();

        let result = manager
            .create_shipment(NewShipment {
                origin: "  ".to_string(),
                destination: "LA".to_string(),
                status: None,
                estimated_delivery: None,
                route_id: None,
                vendor_id: None,
            })
            .await;

        assert!(matches!(result, Err(TrackingError::Validation(_))));
        assert!(store.shipments().find_all().await.unwrap().is_empty());
        assert!(sink.messages().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_deliveries_before_the_shipment() {
        let (store, manager, _) = setup();
        let shipment = create(&manager).await;

        manager
            .update_shipment(shipment.id, update(ShipmentStatus::Delivered))
            .await
            .unwrap();
        manager.delete_shipment(shipment.id).await.unwrap();

        assert!(store.shipments().find_all().await.unwrap().is_empty());
        assert!(store.deliveries().find_all().await.unwrap().is_empty());

        let deliveries = DeliveryManager::new(
            Arc::new(store.deliveries()),
            Arc::new(store.shipments()),
        );
        assert!(deliveries.list_consistent().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn mutations_announce_on_the_shipment_topic() {
        let (_, manager, sink) = setup();
        let shipment = create(&manager).await;
        manager
            .update_shipment(shipment.id, update(ShipmentStatus::InTransit))
            .await
            .unwrap();
        manager.delete_shipment(shipment.id).await.unwrap();

        let messages = sink.messages();
        assert_eq!(messages.len(), 3);
        assert!(messages
            .iter()
            .all(|(topic, _)| topic == topics::SHIPMENT_EVENTS));
        assert!(messages[1].1.contains("New status: InTransit"));
    }

    /// Sink standing in for a transport that is down: accepts and drops.
    struct DeadTransport;

    impl EventSink for DeadTransport {
        fn publish(&self, _topic: &str, _message: &str) {}
    }

    #[tokio::test]
    async fn transport_failure_never_fails_the_operation() {
        let store = MemoryStore::new();
        let deliveries = Arc::new(DeliveryManager::new(
            Arc::new(store.deliveries()),
            Arc::new(store.shipments()),
        ));
        let manager = ShipmentManager::new(
            Arc::new(store.shipments()),
            deliveries,
            Arc::new(DeadTransport),
        );

        let shipment = create(&manager).await;
        let updated = manager
            .update_shipment(shipment.id, update(ShipmentStatus::Delivered))
            .await
            .unwrap();
        assert_eq!(updated.status, ShipmentStatus::Delivered);
    }
}
