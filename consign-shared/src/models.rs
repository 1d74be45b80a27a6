use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Shipment status in the tracking lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ShipmentStatus {
    Created,
    InTransit,
    Delayed,
    Delivered,
    Failed,
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShipmentStatus::Created => "Created",
            ShipmentStatus::InTransit => "InTransit",
            ShipmentStatus::Delayed => "Delayed",
            ShipmentStatus::Delivered => "Delivered",
            ShipmentStatus::Failed => "Failed",
        })
    }
}

impl FromStr for ShipmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Created" => Ok(ShipmentStatus::Created),
            "InTransit" => Ok(ShipmentStatus::InTransit),
            "Delayed" => Ok(ShipmentStatus::Delayed),
            "Delivered" => Ok(ShipmentStatus::Delivered),
            "Failed" => Ok(ShipmentStatus::Failed),
            other => Err(format!("unknown shipment status: {}", other)),
        }
    }
}

/// Status of a delivery record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DeliveryStatus {
    Pending,
    Delivered,
    Failed,
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeliveryStatus::Pending => "Pending",
            DeliveryStatus::Delivered => "Delivered",
            DeliveryStatus::Failed => "Failed",
        })
    }
}

impl FromStr for DeliveryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(DeliveryStatus::Pending),
            "Delivered" => Ok(DeliveryStatus::Delivered),
            "Failed" => Ok(DeliveryStatus::Failed),
            other => Err(format!("unknown delivery status: {}", other)),
        }
    }
}

/// Route status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RouteStatus {
    Active,
    Delayed,
    Closed,
}

impl fmt::Display for RouteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RouteStatus::Active => "Active",
            RouteStatus::Delayed => "Delayed",
            RouteStatus::Closed => "Closed",
        })
    }
}

impl FromStr for RouteStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(RouteStatus::Active),
            "Delayed" => Ok(RouteStatus::Delayed),
            "Closed" => Ok(RouteStatus::Closed),
            other => Err(format!("unknown route status: {}", other)),
        }
    }
}

/// A tracked movement of cargo from origin to destination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shipment {
    pub id: Uuid,
    pub origin: String,
    pub destination: String,
    pub status: ShipmentStatus,
    pub estimated_delivery: Option<NaiveDate>,
    pub route_id: Option<Uuid>,
    pub vendor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shipment {
    pub fn new(origin: String, destination: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            origin,
            destination,
            status: ShipmentStatus::Created,
            estimated_delivery: None,
            route_id: None,
            vendor_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Update shipment status
    pub fn update_status(&mut self, new_status: ShipmentStatus) {
        self.status = new_status;
        self.updated_at = Utc::now();
    }
}

/// An individual cargo item, optionally owned by a shipment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cargo {
    pub id: Uuid,
    pub shipment_id: Option<Uuid>,
    pub kind: String,
    pub description: Option<String>,
    pub value: Option<f64>,
    pub weight: Option<f64>,
    pub weight_unit: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Cargo {
    pub fn new(kind: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            shipment_id: None,
            kind,
            description: None,
            value: None,
            weight: None,
            weight_unit: None,
            created_at: Utc::now(),
        }
    }
}

/// A lane between two ports that shipments can be assigned to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub id: Uuid,
    pub origin_port: String,
    pub destination_port: String,
    pub duration_hours: i32,
    pub distance_km: Option<f64>,
    pub transportation_mode: Option<String>,
    pub cost: Option<f64>,
    pub status: RouteStatus,
    pub created_at: DateTime<Utc>,
}

impl Route {
    pub fn new(origin_port: String, destination_port: String, duration_hours: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            origin_port,
            destination_port,
            duration_hours,
            distance_km: None,
            transportation_mode: None,
            cost: None,
            status: RouteStatus::Active,
            created_at: Utc::now(),
        }
    }
}

/// A logistics provider that shipments can be assigned to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vendor {
    pub id: Uuid,
    pub name: String,
    pub contact_info: String,
    pub service_type: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Vendor {
    pub fn new(name: String, contact_info: String, service_type: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            contact_info,
            service_type,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

/// The record confirming a shipment reached its recipient.
/// At most one delivery exists per shipment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    pub id: Uuid,
    pub shipment_id: Uuid,
    pub actual_delivery_date: DateTime<Utc>,
    pub recipient: String,
    pub status: DeliveryStatus,
    pub created_at: DateTime<Utc>,
}

impl Delivery {
    pub fn new(shipment_id: Uuid, actual_delivery_date: DateTime<Utc>, recipient: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            shipment_id,
            actual_delivery_date,
            recipient,
            status: DeliveryStatus::Pending,
            created_at: Utc::now(),
        }
    }
}
