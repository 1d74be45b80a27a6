use crate::database::map_sqlx_err;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use consign_core::repository::RouteRepository;
use consign_core::StoreError;
use consign_shared::models::{Route, RouteStatus};
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgRouteRepository {
    pool: PgPool,
}

impl PgRouteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RouteRow {
    id: Uuid,
    origin_port: String,
    destination_port: String,
    duration_hours: i32,
    distance_km: Option<f64>,
    transportation_mode: Option<String>,
    cost: Option<f64>,
    status: String,
    created_at: DateTime<Utc>,
}

impl RouteRow {
    fn into_model(self) -> Result<Route, StoreError> {
        let status: RouteStatus = self.status.parse().map_err(StoreError::backend)?;
        Ok(Route {
            id: self.id,
            origin_port: self.origin_port,
            destination_port: self.destination_port,
            duration_hours: self.duration_hours,
            distance_km: self.distance_km,
            transportation_mode: self.transportation_mode,
            cost: self.cost,
            status,
            created_at: self.created_at,
        })
    }
}

const SELECT: &str = "SELECT id, origin_port, destination_port, duration_hours, distance_km, transportation_mode, cost, status, created_at FROM route";

#[async_trait]
impl RouteRepository for PgRouteRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Route>, StoreError> {
        let row = sqlx::query_as::<_, RouteRow>(&format!("{} WHERE id = $1", SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        row.map(RouteRow::into_model).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Route>, StoreError> {
        let rows = sqlx::query_as::<_, RouteRow>(&format!("{} ORDER BY created_at", SELECT))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        rows.into_iter().map(RouteRow::into_model).collect()
    }

    async fn exists_by_id(&self, id: Uuid) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM route WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_err)
    }

    async fn save(&self, route: &Route) -> Result<Route, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO route (id, origin_port, destination_port, duration_hours, distance_km, transportation_mode, cost, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE SET
                origin_port = EXCLUDED.origin_port,
                destination_port = EXCLUDED.destination_port,
                duration_hours = EXCLUDED.duration_hours,
                distance_km = EXCLUDED.distance_km,
                transportation_mode = EXCLUDED.transportation_mode,
                cost = EXCLUDED.cost,
                status = EXCLUDED.status
            "#,
        )
        .bind(route.id)
        .bind(&route.origin_port)
        .bind(&route.destination_port)
        .bind(route.duration_hours)
        .bind(route.distance_km)
        .bind(&route.transportation_mode)
        .bind(route.cost)
        .bind(route.status.to_string())
        .bind(route.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(route.clone())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM route WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(())
    }
}
