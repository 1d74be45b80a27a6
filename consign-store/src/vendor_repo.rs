use crate::database::map_sqlx_err;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use consign_core::repository::VendorRepository;
use consign_core::StoreError;
use consign_shared::models::Vendor;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgVendorRepository {
    pool: PgPool,
}

impl PgVendorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct VendorRow {
    id: Uuid,
    name: String,
    contact_info: String,
    service_type: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl From<VendorRow> for Vendor {
    fn from(row: VendorRow) -> Self {
        Vendor {
            id: row.id,
            name: row.name,
            contact_info: row.contact_info,
            service_type: row.service_type,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

const SELECT: &str =
    "SELECT id, name, contact_info, service_type, is_active, created_at FROM vendor";

#[async_trait]
impl VendorRepository for PgVendorRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Vendor>, StoreError> {
        let row = sqlx::query_as::<_, VendorRow>(&format!("{} WHERE id = $1", SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(row.map(Vendor::from))
    }

    async fn find_all(&self) -> Result<Vec<Vendor>, StoreError> {
        let rows = sqlx::query_as::<_, VendorRow>(&format!("{} ORDER BY created_at", SELECT))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(rows.into_iter().map(Vendor::from).collect())
    }

    async fn exists_by_id(&self, id: Uuid) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM vendor WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_err)
    }

    async fn save(&self, vendor: &Vendor) -> Result<Vendor, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO vendor (id, name, contact_info, service_type, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                contact_info = EXCLUDED.contact_info,
                service_type = EXCLUDED.service_type,
                is_active = EXCLUDED.is_active
            "#,
        )
        .bind(vendor.id)
        .bind(&vendor.name)
        .bind(&vendor.contact_info)
        .bind(&vendor.service_type)
        .bind(vendor.is_active)
        .bind(vendor.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(vendor.clone())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM vendor WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(())
    }
}
