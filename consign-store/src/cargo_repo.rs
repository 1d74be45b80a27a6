use crate::database::map_sqlx_err;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use consign_core::repository::CargoRepository;
use consign_core::StoreError;
use consign_shared::models::Cargo;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgCargoRepository {
    pool: PgPool,
}

impl PgCargoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CargoRow {
    id: Uuid,
    shipment_id: Option<Uuid>,
    kind: String,
    description: Option<String>,
    value: Option<f64>,
    weight: Option<f64>,
    weight_unit: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<CargoRow> for Cargo {
    fn from(row: CargoRow) -> Self {
        Cargo {
            id: row.id,
            shipment_id: row.shipment_id,
            kind: row.kind,
            description: row.description,
            value: row.value,
            weight: row.weight,
            weight_unit: row.weight_unit,
            created_at: row.created_at,
        }
    }
}

const SELECT: &str =
    "SELECT id, shipment_id, kind, description, value, weight, weight_unit, created_at FROM cargo";

#[async_trait]
impl CargoRepository for PgCargoRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Cargo>, StoreError> {
        let row = sqlx::query_as::<_, CargoRow>(&format!("{} WHERE id = $1", SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(row.map(Cargo::from))
    }

    async fn find_all(&self) -> Result<Vec<Cargo>, StoreError> {
        let rows = sqlx::query_as::<_, CargoRow>(&format!("{} ORDER BY created_at", SELECT))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(rows.into_iter().map(Cargo::from).collect())
    }

    async fn find_by_shipment(&self, shipment_id: Uuid) -> Result<Vec<Cargo>, StoreError> {
        let rows = sqlx::query_as::<_, CargoRow>(&format!(
            "{} WHERE shipment_id = $1 ORDER BY created_at",
            SELECT
        ))
        .bind(shipment_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        Ok(rows.into_iter().map(Cargo::from).collect())
    }

    async fn exists_by_id(&self, id: Uuid) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM cargo WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_err)
    }

    async fn save(&self, cargo: &Cargo) -> Result<Cargo, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO cargo (id, shipment_id, kind, description, value, weight, weight_unit, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                shipment_id = EXCLUDED.shipment_id,
                kind = EXCLUDED.kind,
                description = EXCLUDED.description,
                value = EXCLUDED.value,
                weight = EXCLUDED.weight,
                weight_unit = EXCLUDED.weight_unit
            "#,
        )
        .bind(cargo.id)
        .bind(cargo.shipment_id)
        .bind(&cargo.kind)
        .bind(&cargo.description)
        .bind(cargo.value)
        .bind(cargo.weight)
        .bind(&cargo.weight_unit)
        .bind(cargo.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(cargo.clone())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM cargo WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(())
    }
}
