use crate::database::map_sqlx_err;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use consign_core::repository::DeliveryRepository;
use consign_core::StoreError;
use consign_shared::models::{Delivery, DeliveryStatus};
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgDeliveryRepository {
    pool: PgPool,
}

impl PgDeliveryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct DeliveryRow {
    id: Uuid,
    shipment_id: Uuid,
    actual_delivery_date: DateTime<Utc>,
    recipient: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl DeliveryRow {
    fn into_model(self) -> Result<Delivery, StoreError> {
        let status: DeliveryStatus = self.status.parse().map_err(StoreError::backend)?;
        Ok(Delivery {
            id: self.id,
            shipment_id: self.shipment_id,
            actual_delivery_date: self.actual_delivery_date,
            recipient: self.recipient,
            status,
            created_at: self.created_at,
        })
    }
}

const SELECT: &str =
    "SELECT id, shipment_id, actual_delivery_date, recipient, status, created_at FROM deliveries";

#[async_trait]
impl DeliveryRepository for PgDeliveryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Delivery>, StoreError> {
        let row = sqlx::query_as::<_, DeliveryRow>(&format!("{} WHERE id = $1", SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        row.map(DeliveryRow::into_model).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Delivery>, StoreError> {
        let rows = sqlx::query_as::<_, DeliveryRow>(&format!("{} ORDER BY created_at", SELECT))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        rows.into_iter().map(DeliveryRow::into_model).collect()
    }

    async fn find_by_shipment(&self, shipment_id: Uuid) -> Result<Option<Delivery>, StoreError> {
        let row = sqlx::query_as::<_, DeliveryRow>(&format!("{} WHERE shipment_id = $1", SELECT))
            .bind(shipment_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        row.map(DeliveryRow::into_model).transpose()
    }

    async fn exists_by_id(&self, id: Uuid) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM deliveries WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_err)
    }

    async fn exists_by_shipment(&self, shipment_id: Uuid) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM deliveries WHERE shipment_id = $1)",
        )
        .bind(shipment_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)
    }

    /// Insert or update. The unique index on `shipment_id` turns a
    /// concurrent duplicate insert into `StoreError::Conflict`.
    async fn save(&self, delivery: &Delivery) -> Result<Delivery, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO deliveries (id, shipment_id, actual_delivery_date, recipient, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                shipment_id = EXCLUDED.shipment_id,
                actual_delivery_date = EXCLUDED.actual_delivery_date,
                recipient = EXCLUDED.recipient,
                status = EXCLUDED.status
            "#,
        )
        .bind(delivery.id)
        .bind(delivery.shipment_id)
        .bind(delivery.actual_delivery_date)
        .bind(&delivery.recipient)
        .bind(delivery.status.to_string())
        .bind(delivery.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(delivery.clone())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM deliveries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn delete_all(&self, ids: &[Uuid]) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM deliveries WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(())
    }
}
