use crate::database::map_sqlx_err;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use consign_core::repository::ShipmentRepository;
use consign_core::StoreError;
use consign_shared::models::{Shipment, ShipmentStatus};
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgShipmentRepository {
    pool: PgPool,
}

impl PgShipmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ShipmentRow {
    id: Uuid,
    origin: String,
    destination: String,
    status: String,
    estimated_delivery: Option<NaiveDate>,
    route_id: Option<Uuid>,
    vendor_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ShipmentRow {
    fn into_model(self) -> Result<Shipment, StoreError> {
        let status: ShipmentStatus = self.status.parse().map_err(StoreError::backend)?;
        Ok(Shipment {
            id: self.id,
            origin: self.origin,
            destination: self.destination,
            status,
            estimated_delivery: self.estimated_delivery,
            route_id: self.route_id,
            vendor_id: self.vendor_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT: &str = "SELECT id, origin, destination, status, estimated_delivery, route_id, vendor_id, created_at, updated_at FROM shipment";

#[async_trait]
impl ShipmentRepository for PgShipmentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Shipment>, StoreError> {
        let row = sqlx::query_as::<_, ShipmentRow>(&format!("{} WHERE id = $1", SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        row.map(ShipmentRow::into_model).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Shipment>, StoreError> {
        let rows =
            sqlx::query_as::<_, ShipmentRow>(&format!("{} ORDER BY created_at", SELECT))
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_err)?;
        rows.into_iter().map(ShipmentRow::into_model).collect()
    }

    async fn exists_by_id(&self, id: Uuid) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM shipment WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_err)
    }

    async fn save(&self, shipment: &Shipment) -> Result<Shipment, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO shipment (id, origin, destination, status, estimated_delivery, route_id, vendor_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE SET
                origin = EXCLUDED.origin,
                destination = EXCLUDED.destination,
                status = EXCLUDED.status,
                estimated_delivery = EXCLUDED.estimated_delivery,
                route_id = EXCLUDED.route_id,
                vendor_id = EXCLUDED.vendor_id,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(shipment.id)
        .bind(&shipment.origin)
        .bind(&shipment.destination)
        .bind(shipment.status.to_string())
        .bind(shipment.estimated_delivery)
        .bind(shipment.route_id)
        .bind(shipment.vendor_id)
        .bind(shipment.created_at)
        .bind(shipment.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(shipment.clone())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError> {
        // Owned cargo rows follow via ON DELETE CASCADE.
        sqlx::query("DELETE FROM shipment WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(())
    }
}
