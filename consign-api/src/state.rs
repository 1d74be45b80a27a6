use crate::relay::NotifyChannels;
use consign_core::repository::{
    CargoRepository, DeliveryRepository, RouteRepository, ShipmentRepository, VendorRepository,
};
use consign_core::EventSink;
use consign_tracking::{DeliveryManager, ShipmentManager};
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub shipments: Arc<dyn ShipmentRepository>,
    pub cargo: Arc<dyn CargoRepository>,
    pub routes: Arc<dyn RouteRepository>,
    pub vendors: Arc<dyn VendorRepository>,
    pub deliveries: Arc<dyn DeliveryRepository>,
    pub tracker: Arc<ShipmentManager>,
    pub delivery_manager: Arc<DeliveryManager>,
    pub events: Arc<dyn EventSink>,
    pub notify: NotifyChannels,
    pub auth: AuthConfig,
}
