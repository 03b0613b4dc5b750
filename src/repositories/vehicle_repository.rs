//! Repositorio de vehículos
//!
//! Define el trait `VehicleStore` y su implementación PostgreSQL. Los filtros
//! del listado se construyen dinámicamente con `QueryBuilder`, siempre con
//! valores enlazados y columnas tomadas de enums cerrados.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::dto::vehicle_query::{SortOrder, VehicleFilter, VehicleQuery};
use crate::models::activity::{
    LeadRecord, LeadRef, LeadStatus, NewLead, NewSale, NewTestDrive, SaleRecord, TestDriveRecord,
    VehicleActivity,
};
use crate::models::user::UserRef;
use crate::models::vehicle::{NewVehicle, Vehicle, VehicleChanges, VehiclePhoto};
use crate::utils::errors::{map_constraint_violation, map_missing_parent, AppResult};
use crate::utils::validation::escape_like;

pub const VEHICLE_HAS_SALES: &str = "Vehicle has registered sales and cannot be removed";

/// Persistencia de vehículos, fotos y registros comerciales asociados
#[async_trait]
pub trait VehicleStore: Send + Sync {
    /// Total de vehículos que cumplen el filtro, sin paginar
    async fn count(&self, filter: &VehicleFilter) -> AppResult<u64>;
    /// Página de vehículos ordenada según la consulta
    async fn find_page(&self, query: &VehicleQuery) -> AppResult<Vec<Vehicle>>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Vehicle>>;
    async fn insert(&self, vehicle: NewVehicle) -> AppResult<Vehicle>;
    /// Aplica los cambios presentes; `None` si el vehículo no existe
    async fn update(&self, id: Uuid, changes: VehicleChanges) -> AppResult<Option<Vehicle>>;
    /// Borra el vehículo devolviendo su último estado; `Conflict` si tiene ventas
    async fn delete(&self, id: Uuid) -> AppResult<Option<Vehicle>>;

    /// Fotos de los vehículos dados, en orden de inserción
    async fn photos_for(&self, vehicle_ids: &[Uuid]) -> AppResult<Vec<VehiclePhoto>>;
    async fn add_photo(&self, vehicle_id: Uuid, url: String) -> AppResult<VehiclePhoto>;
    async fn delete_photo(&self, photo_id: Uuid) -> AppResult<Option<VehiclePhoto>>;

    /// Leads, ventas y test drives de los vehículos dados
    async fn activity_for(&self, vehicle_ids: &[Uuid]) -> AppResult<VehicleActivity>;
    async fn insert_lead(&self, lead: NewLead) -> AppResult<LeadRecord>;
    async fn insert_test_drive(&self, test_drive: NewTestDrive) -> AppResult<TestDriveRecord>;
    async fn insert_sale(&self, sale: NewSale) -> AppResult<SaleRecord>;
}

pub struct PgVehicleRepository {
    pool: PgPool,
}

impl PgVehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const VEHICLE_COLUMNS: &str =
    "id, brand, model, year, color, mileage, price, status, created_at, updated_at, seq";

/// Agrega el predicado del filtro; todas las condiciones se combinan con AND
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &VehicleFilter) {
    builder.push(" WHERE TRUE");

    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status);
    }

    for (column, value) in [
        ("brand", &filter.brand),
        ("model", &filter.model),
        ("color", &filter.color),
    ] {
        if let Some(value) = value {
            builder
                .push(format!(" AND {} ILIKE '%' || ", column))
                .push_bind(escape_like(value))
                .push(" || '%' ESCAPE '\\'");
        }
    }

    if let Some(year) = filter.year_from {
        builder.push(" AND year >= ").push_bind(year);
    }
    if let Some(year) = filter.year_to {
        builder.push(" AND year <= ").push_bind(year);
    }
    if let Some(price) = filter.price_from {
        builder.push(" AND price >= ").push_bind(price);
    }
    if let Some(price) = filter.price_to {
        builder.push(" AND price <= ").push_bind(price);
    }
}

#[derive(FromRow)]
struct LeadRow {
    id: Uuid,
    vehicle_id: Option<Uuid>,
    name: String,
    email: String,
    phone: Option<String>,
    status: LeadStatus,
    created_at: DateTime<Utc>,
    seller_id: Option<Uuid>,
    seller_name: Option<String>,
    seller_email: Option<String>,
}

impl From<LeadRow> for LeadRecord {
    fn from(row: LeadRow) -> Self {
        let seller = match (row.seller_id, row.seller_name, row.seller_email) {
            (Some(id), Some(name), Some(email)) => Some(UserRef { id, name, email }),
            _ => None,
        };
        Self {
            id: row.id,
            vehicle_id: row.vehicle_id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            status: row.status,
            created_at: row.created_at,
            seller,
        }
    }
}

#[derive(FromRow)]
struct SaleRow {
    id: Uuid,
    vehicle_id: Uuid,
    amount: Decimal,
    created_at: DateTime<Utc>,
    seller_id: Uuid,
    seller_name: String,
    seller_email: String,
    lead_id: Option<Uuid>,
    lead_name: Option<String>,
    lead_email: Option<String>,
    lead_phone: Option<String>,
}

impl From<SaleRow> for SaleRecord {
    fn from(row: SaleRow) -> Self {
        let lead = match (row.lead_id, row.lead_name, row.lead_email) {
            (Some(id), Some(name), Some(email)) => Some(LeadRef {
                id,
                name,
                email,
                phone: row.lead_phone,
            }),
            _ => None,
        };
        Self {
            id: row.id,
            vehicle_id: row.vehicle_id,
            amount: row.amount,
            created_at: row.created_at,
            seller: UserRef {
                id: row.seller_id,
                name: row.seller_name,
                email: row.seller_email,
            },
            lead,
        }
    }
}

#[derive(FromRow)]
struct TestDriveRow {
    id: Uuid,
    vehicle_id: Uuid,
    date: DateTime<Utc>,
    lead_id: Uuid,
    lead_name: String,
    lead_email: String,
    lead_phone: Option<String>,
    seller_id: Uuid,
    seller_name: String,
    seller_email: String,
}

impl From<TestDriveRow> for TestDriveRecord {
    fn from(row: TestDriveRow) -> Self {
        Self {
            id: row.id,
            vehicle_id: row.vehicle_id,
            date: row.date,
            lead: LeadRef {
                id: row.lead_id,
                name: row.lead_name,
                email: row.lead_email,
                phone: row.lead_phone,
            },
            seller: UserRef {
                id: row.seller_id,
                name: row.seller_name,
                email: row.seller_email,
            },
        }
    }
}

const LEAD_SELECT: &str = r#"
    SELECT l.id, l.vehicle_id, l.name, l.email, l.phone, l.status, l.created_at,
           u.id AS seller_id, u.name AS seller_name, u.email AS seller_email
    FROM leads l
    LEFT JOIN users u ON u.id = l.seller_id
"#;

const SALE_SELECT: &str = r#"
    SELECT s.id, s.vehicle_id, s.amount, s.created_at,
           u.id AS seller_id, u.name AS seller_name, u.email AS seller_email,
           l.id AS lead_id, l.name AS lead_name, l.email AS lead_email, l.phone AS lead_phone
    FROM sales s
    JOIN users u ON u.id = s.seller_id
    LEFT JOIN leads l ON l.id = s.lead_id
"#;

const TEST_DRIVE_SELECT: &str = r#"
    SELECT t.id, t.vehicle_id, t.date,
           l.id AS lead_id, l.name AS lead_name, l.email AS lead_email, l.phone AS lead_phone,
           u.id AS seller_id, u.name AS seller_name, u.email AS seller_email
    FROM test_drives t
    JOIN leads l ON l.id = t.lead_id
    JOIN users u ON u.id = t.seller_id
"#;

#[async_trait]
impl VehicleStore for PgVehicleRepository {
    async fn count(&self, filter: &VehicleFilter) -> AppResult<u64> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM vehicles");
        push_filters(&mut builder, filter);

        let total = builder.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(total.max(0) as u64)
    }

    async fn find_page(&self, query: &VehicleQuery) -> AppResult<Vec<Vehicle>> {
        let mut builder =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM vehicles", VEHICLE_COLUMNS));
        push_filters(&mut builder, &query.filter);

        let nulls = match query.sort_order {
            SortOrder::Asc => "NULLS LAST",
            SortOrder::Desc => "NULLS FIRST",
        };
        builder.push(format!(
            " ORDER BY {} {} {}, seq ASC",
            query.sort_by.column(),
            query.sort_order.sql(),
            nulls
        ));
        builder
            .push(" LIMIT ")
            .push_bind(i64::from(query.limit))
            .push(" OFFSET ")
            .push_bind(query.offset() as i64);

        let vehicles = builder
            .build_query_as::<Vehicle>()
            .fetch_all(&self.pool)
            .await?;

        Ok(vehicles)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let vehicle = sqlx::query_as::<_, Vehicle>(&format!(
            "SELECT {} FROM vehicles WHERE id = $1",
            VEHICLE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(vehicle)
    }

    async fn insert(&self, vehicle: NewVehicle) -> AppResult<Vehicle> {
        let created = sqlx::query_as::<_, Vehicle>(&format!(
            r#"
            INSERT INTO vehicles (id, brand, model, year, color, mileage, price, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            VEHICLE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(vehicle.brand)
        .bind(vehicle.model)
        .bind(vehicle.year)
        .bind(vehicle.color)
        .bind(vehicle.mileage)
        .bind(vehicle.price)
        .bind(vehicle.status)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn update(&self, id: Uuid, changes: VehicleChanges) -> AppResult<Option<Vehicle>> {
        let updated = sqlx::query_as::<_, Vehicle>(&format!(
            r#"
            UPDATE vehicles
            SET brand = COALESCE($2, brand),
                model = COALESCE($3, model),
                year = COALESCE($4, year),
                color = COALESCE($5, color),
                mileage = COALESCE($6, mileage),
                price = COALESCE($7, price),
                status = COALESCE($8, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            VEHICLE_COLUMNS
        ))
        .bind(id)
        .bind(changes.brand)
        .bind(changes.model)
        .bind(changes.year)
        .bind(changes.color)
        .bind(changes.mileage)
        .bind(changes.price)
        .bind(changes.status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let deleted = sqlx::query_as::<_, Vehicle>(&format!(
            "DELETE FROM vehicles WHERE id = $1 RETURNING {}",
            VEHICLE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_constraint_violation(e, VEHICLE_HAS_SALES))?;

        Ok(deleted)
    }

    async fn photos_for(&self, vehicle_ids: &[Uuid]) -> AppResult<Vec<VehiclePhoto>> {
        if vehicle_ids.is_empty() {
            return Ok(Vec::new());
        }
        let photos = sqlx::query_as::<_, VehiclePhoto>(
            "SELECT id, url, vehicle_id, seq FROM vehicle_photos WHERE vehicle_id = ANY($1) ORDER BY seq",
        )
        .bind(vehicle_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(photos)
    }

    async fn add_photo(&self, vehicle_id: Uuid, url: String) -> AppResult<VehiclePhoto> {
        let photo = sqlx::query_as::<_, VehiclePhoto>(
            r#"
            INSERT INTO vehicle_photos (id, url, vehicle_id)
            VALUES ($1, $2, $3)
            RETURNING id, url, vehicle_id, seq
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(url)
        .bind(vehicle_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_missing_parent(e, "Vehicle"))?;

        Ok(photo)
    }

    async fn delete_photo(&self, photo_id: Uuid) -> AppResult<Option<VehiclePhoto>> {
        let photo = sqlx::query_as::<_, VehiclePhoto>(
            "DELETE FROM vehicle_photos WHERE id = $1 RETURNING id, url, vehicle_id, seq",
        )
        .bind(photo_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(photo)
    }

    async fn activity_for(&self, vehicle_ids: &[Uuid]) -> AppResult<VehicleActivity> {
        if vehicle_ids.is_empty() {
            return Ok(VehicleActivity::default());
        }

        let lead_sql = format!("{} WHERE l.vehicle_id = ANY($1) ORDER BY l.created_at, l.id", LEAD_SELECT);
        let sale_sql = format!("{} WHERE s.vehicle_id = ANY($1) ORDER BY s.created_at, s.id", SALE_SELECT);
        let test_drive_sql = format!("{} WHERE t.vehicle_id = ANY($1) ORDER BY t.date, t.id", TEST_DRIVE_SELECT);

        let leads = sqlx::query_as::<_, LeadRow>(&lead_sql)
            .bind(vehicle_ids)
            .fetch_all(&self.pool);
        let sales = sqlx::query_as::<_, SaleRow>(&sale_sql)
            .bind(vehicle_ids)
            .fetch_all(&self.pool);
        let test_drives = sqlx::query_as::<_, TestDriveRow>(&test_drive_sql)
            .bind(vehicle_ids)
            .fetch_all(&self.pool);

        let (leads, sales, test_drives) = futures::try_join!(leads, sales, test_drives)?;

        Ok(VehicleActivity {
            leads: leads.into_iter().map(LeadRecord::from).collect(),
            sales: sales.into_iter().map(SaleRecord::from).collect(),
            test_drives: test_drives.into_iter().map(TestDriveRecord::from).collect(),
        })
    }

    async fn insert_lead(&self, lead: NewLead) -> AppResult<LeadRecord> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO leads (id, vehicle_id, seller_id, name, email, phone, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(id)
        .bind(lead.vehicle_id)
        .bind(lead.seller.as_ref().map(|seller| seller.id))
        .bind(&lead.name)
        .bind(&lead.email)
        .bind(&lead.phone)
        .bind(lead.status)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, LeadRow>(&format!("{} WHERE l.id = $1", LEAD_SELECT))
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn insert_test_drive(&self, test_drive: NewTestDrive) -> AppResult<TestDriveRecord> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO test_drives (id, vehicle_id, lead_id, seller_id, date) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(test_drive.vehicle_id)
        .bind(test_drive.lead.id)
        .bind(test_drive.seller.id)
        .bind(test_drive.date)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, TestDriveRow>(&format!("{} WHERE t.id = $1", TEST_DRIVE_SELECT))
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn insert_sale(&self, sale: NewSale) -> AppResult<SaleRecord> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO sales (id, vehicle_id, seller_id, lead_id, amount) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(sale.vehicle_id)
        .bind(sale.seller.id)
        .bind(sale.lead.as_ref().map(|lead| lead.id))
        .bind(sale.amount)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, SaleRow>(&format!("{} WHERE s.id = $1", SALE_SELECT))
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }
}
