pub mod consistency;
pub mod error;
pub mod manager;

pub use consistency::DeliveryManager;
pub use error::TrackingError;
pub use manager::{NewShipment, ShipmentManager, ShipmentUpdate};
