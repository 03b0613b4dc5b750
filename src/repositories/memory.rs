//! Almacén en memoria
//!
//! Implementa `UserStore` y `VehicleStore` sobre un `RwLock` de tokio con las
//! mismas reglas de filtrado, ordenación y borrado que el repositorio
//! PostgreSQL. Se usa en los tests y con `STORAGE_BACKEND=memory`.

use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Ordering;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::dto::vehicle_query::{SortBy, SortOrder, VehicleFilter, VehicleQuery};
use crate::models::activity::{
    LeadRecord, NewLead, NewSale, NewTestDrive, SaleRecord, TestDriveRecord, VehicleActivity,
};
use crate::models::user::{NewUser, User};
use crate::models::vehicle::{NewVehicle, Vehicle, VehicleChanges, VehiclePhoto};
use crate::repositories::user_repository::{UserStore, EMAIL_IN_USE};
use crate::repositories::vehicle_repository::{VehicleStore, VEHICLE_HAS_SALES};
use crate::utils::errors::{not_found_error, AppError, AppResult};

#[derive(Default)]
struct MemoryData {
    users: Vec<User>,
    vehicles: Vec<Vehicle>,
    photos: Vec<VehiclePhoto>,
    leads: Vec<LeadRecord>,
    test_drives: Vec<TestDriveRecord>,
    sales: Vec<SaleRecord>,
    next_seq: i64,
}

impl MemoryData {
    fn next_seq(&mut self) -> i64 {
        self.next_seq += 1;
        self.next_seq
    }
}

#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<MemoryData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Substring sin distinguir mayúsculas; los metacaracteres no tienen significado
fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

pub(crate) fn matches_filter(vehicle: &Vehicle, filter: &VehicleFilter) -> bool {
    if filter.status.is_some_and(|status| vehicle.status != status) {
        return false;
    }
    if let Some(brand) = &filter.brand {
        if !contains_ci(&vehicle.brand, brand) {
            return false;
        }
    }
    if let Some(model) = &filter.model {
        if !contains_ci(&vehicle.model, model) {
            return false;
        }
    }
    if let Some(color) = &filter.color {
        match &vehicle.color {
            Some(vehicle_color) if contains_ci(vehicle_color, color) => {}
            _ => return false,
        }
    }
    if filter.year_from.is_some_and(|year| vehicle.year < year) {
        return false;
    }
    if filter.year_to.is_some_and(|year| vehicle.year > year) {
        return false;
    }
    if filter.price_from.is_some_and(|price| vehicle.price < price) {
        return false;
    }
    if filter.price_to.is_some_and(|price| vehicle.price > price) {
        return false;
    }
    true
}

/// `None` se ordena después de cualquier valor
fn cmp_nullable<T: Ord>(a: &Option<T>, b: &Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
    }
}

/// Orden del listado: columna pedida y, a igualdad, orden de inserción
pub(crate) fn compare_vehicles(a: &Vehicle, b: &Vehicle, sort_by: SortBy, order: SortOrder) -> Ordering {
    let primary = match sort_by {
        SortBy::Brand => a.brand.to_lowercase().cmp(&b.brand.to_lowercase()),
        SortBy::Model => a.model.to_lowercase().cmp(&b.model.to_lowercase()),
        SortBy::Year => a.year.cmp(&b.year),
        SortBy::Price => a.price.cmp(&b.price),
        SortBy::Mileage => cmp_nullable(&a.mileage, &b.mileage),
        SortBy::CreatedAt => a.created_at.cmp(&b.created_at),
    };
    let primary = match order {
        SortOrder::Asc => primary,
        SortOrder::Desc => primary.reverse(),
    };
    primary.then(a.seq.cmp(&b.seq))
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let data = self.data.read().await;
        Ok(data
            .users
            .iter()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let data = self.data.read().await;
        Ok(data.users.iter().find(|user| user.id == id).cloned())
    }

    async fn insert(&self, user: NewUser) -> AppResult<User> {
        let mut data = self.data.write().await;
        if data.users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(AppError::Conflict(EMAIL_IN_USE.to_string()));
        }
        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            phone: user.phone,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        data.users.push(created.clone());
        Ok(created)
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.data.read().await.users.len() as u64)
    }
}

#[async_trait]
impl VehicleStore for MemoryStore {
    async fn count(&self, filter: &VehicleFilter) -> AppResult<u64> {
        let data = self.data.read().await;
        Ok(data.vehicles.iter().filter(|v| matches_filter(v, filter)).count() as u64)
    }

    async fn find_page(&self, query: &VehicleQuery) -> AppResult<Vec<Vehicle>> {
        let data = self.data.read().await;
        let mut matching: Vec<&Vehicle> = data
            .vehicles
            .iter()
            .filter(|v| matches_filter(v, &query.filter))
            .collect();
        matching.sort_by(|a, b| compare_vehicles(a, b, query.sort_by, query.sort_order));

        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        Ok(matching
            .into_iter()
            .skip(offset)
            .take(query.limit as usize)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let data = self.data.read().await;
        Ok(data.vehicles.iter().find(|v| v.id == id).cloned())
    }

    async fn insert(&self, vehicle: NewVehicle) -> AppResult<Vehicle> {
        let mut data = self.data.write().await;
        let now = Utc::now();
        let created = Vehicle {
            id: Uuid::new_v4(),
            brand: vehicle.brand,
            model: vehicle.model,
            year: vehicle.year,
            color: vehicle.color,
            mileage: vehicle.mileage,
            price: vehicle.price,
            status: vehicle.status,
            created_at: now,
            updated_at: now,
            seq: data.next_seq(),
        };
        data.vehicles.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: Uuid, changes: VehicleChanges) -> AppResult<Option<Vehicle>> {
        let mut data = self.data.write().await;
        let Some(vehicle) = data.vehicles.iter_mut().find(|v| v.id == id) else {
            return Ok(None);
        };
        changes.apply_to(vehicle);
        vehicle.updated_at = Utc::now();
        Ok(Some(vehicle.clone()))
    }

    async fn delete(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let mut data = self.data.write().await;
        let Some(position) = data.vehicles.iter().position(|v| v.id == id) else {
            return Ok(None);
        };
        if data.sales.iter().any(|sale| sale.vehicle_id == id) {
            return Err(AppError::Conflict(VEHICLE_HAS_SALES.to_string()));
        }

        let removed = data.vehicles.remove(position);
        data.photos.retain(|photo| photo.vehicle_id != id);
        data.test_drives.retain(|test_drive| test_drive.vehicle_id != id);
        for lead in data.leads.iter_mut().filter(|lead| lead.vehicle_id == Some(id)) {
            lead.vehicle_id = None;
        }
        Ok(Some(removed))
    }

    async fn photos_for(&self, vehicle_ids: &[Uuid]) -> AppResult<Vec<VehiclePhoto>> {
        let data = self.data.read().await;
        Ok(data
            .photos
            .iter()
            .filter(|photo| vehicle_ids.contains(&photo.vehicle_id))
            .cloned()
            .collect())
    }

    async fn add_photo(&self, vehicle_id: Uuid, url: String) -> AppResult<VehiclePhoto> {
        let mut data = self.data.write().await;
        if !data.vehicles.iter().any(|v| v.id == vehicle_id) {
            return Err(not_found_error("Vehicle"));
        }
        let photo = VehiclePhoto {
            id: Uuid::new_v4(),
            url,
            vehicle_id,
            seq: data.next_seq(),
        };
        data.photos.push(photo.clone());
        Ok(photo)
    }

    async fn delete_photo(&self, photo_id: Uuid) -> AppResult<Option<VehiclePhoto>> {
        let mut data = self.data.write().await;
        let position = data.photos.iter().position(|photo| photo.id == photo_id);
        Ok(position.map(|position| data.photos.remove(position)))
    }

    async fn activity_for(&self, vehicle_ids: &[Uuid]) -> AppResult<VehicleActivity> {
        let data = self.data.read().await;
        Ok(VehicleActivity {
            leads: data
                .leads
                .iter()
                .filter(|lead| lead.vehicle_id.is_some_and(|id| vehicle_ids.contains(&id)))
                .cloned()
                .collect(),
            sales: data
                .sales
                .iter()
                .filter(|sale| vehicle_ids.contains(&sale.vehicle_id))
                .cloned()
                .collect(),
            test_drives: data
                .test_drives
                .iter()
                .filter(|test_drive| vehicle_ids.contains(&test_drive.vehicle_id))
                .cloned()
                .collect(),
        })
    }

    async fn insert_lead(&self, lead: NewLead) -> AppResult<LeadRecord> {
        let mut data = self.data.write().await;
        let record = LeadRecord {
            id: Uuid::new_v4(),
            vehicle_id: lead.vehicle_id,
            name: lead.name,
            email: lead.email,
            phone: lead.phone,
            status: lead.status,
            created_at: Utc::now(),
            seller: lead.seller,
        };
        data.leads.push(record.clone());
        Ok(record)
    }

    async fn insert_test_drive(&self, test_drive: NewTestDrive) -> AppResult<TestDriveRecord> {
        let mut data = self.data.write().await;
        let record = TestDriveRecord {
            id: Uuid::new_v4(),
            vehicle_id: test_drive.vehicle_id,
            date: test_drive.date,
            lead: test_drive.lead,
            seller: test_drive.seller,
        };
        data.test_drives.push(record.clone());
        Ok(record)
    }

    async fn insert_sale(&self, sale: NewSale) -> AppResult<SaleRecord> {
        let mut data = self.data.write().await;
        let record = SaleRecord {
            id: Uuid::new_v4(),
            vehicle_id: sale.vehicle_id,
            amount: sale.amount,
            created_at: Utc::now(),
            seller: sale.seller,
            lead: sale.lead,
        };
        data.sales.push(record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::{Role, UserRef};
    use crate::models::vehicle::VehicleStatus;
    use rust_decimal::Decimal;

    fn new_vehicle(brand: &str, model: &str, year: i32, mileage: Option<i32>, price: i64) -> NewVehicle {
        NewVehicle {
            brand: brand.into(),
            model: model.into(),
            year,
            color: Some("Branco".into()),
            mileage,
            price: Decimal::from(price),
            status: VehicleStatus::Available,
        }
    }

    async fn store_with(vehicles: Vec<NewVehicle>) -> MemoryStore {
        let store = MemoryStore::new();
        for vehicle in vehicles {
            VehicleStore::insert(&store, vehicle).await.unwrap();
        }
        store
    }

    fn query(sort_by: SortBy, sort_order: SortOrder) -> VehicleQuery {
        VehicleQuery {
            sort_by,
            sort_order,
            ..VehicleQuery::default()
        }
    }

    #[tokio::test]
    async fn test_filter_is_case_insensitive_substring_and_literal() {
        let store = store_with(vec![
            new_vehicle("Toyota", "Corolla", 2023, Some(15000), 95000),
            new_vehicle("Honda", "Civic", 2022, Some(25000), 110000),
            new_vehicle("Mercedes-Benz", "C180", 2022, Some(18000), 220000),
        ])
        .await;

        let filter = VehicleFilter {
            brand: Some("toyo".into()),
            ..Default::default()
        };
        assert_eq!(VehicleStore::count(&store, &filter).await.unwrap(), 1);

        let filter = VehicleFilter {
            brand: Some("%".into()),
            ..Default::default()
        };
        assert_eq!(VehicleStore::count(&store, &filter).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_filters_combine_with_and() {
        let store = store_with(vec![
            new_vehicle("Toyota", "Corolla", 2023, Some(15000), 95000),
            new_vehicle("Toyota", "Etios", 2019, Some(70000), 45000),
        ])
        .await;

        let filter = VehicleFilter {
            brand: Some("toyota".into()),
            year_from: Some(2022),
            year_to: Some(2023),
            ..Default::default()
        };
        let page = store
            .find_page(&VehicleQuery {
                filter: filter.clone(),
                ..VehicleQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].model, "Corolla");
    }

    #[tokio::test]
    async fn test_mileage_nulls_last_ascending_first_descending() {
        let store = store_with(vec![
            new_vehicle("Fiat", "Cronos", 2021, None, 55000),
            new_vehicle("Audi", "A3", 2021, Some(28000), 180000),
            new_vehicle("BMW", "320i", 2023, Some(12000), 200000),
        ])
        .await;

        let asc = store.find_page(&query(SortBy::Mileage, SortOrder::Asc)).await.unwrap();
        let mileages: Vec<_> = asc.iter().map(|v| v.mileage).collect();
        assert_eq!(mileages, vec![Some(12000), Some(28000), None]);

        let desc = store.find_page(&query(SortBy::Mileage, SortOrder::Desc)).await.unwrap();
        let mileages: Vec<_> = desc.iter().map(|v| v.mileage).collect();
        assert_eq!(mileages, vec![None, Some(28000), Some(12000)]);
    }

    #[tokio::test]
    async fn test_ties_keep_insertion_order() {
        let store = store_with(vec![
            new_vehicle("Nissan", "Sentra", 2022, Some(20000), 80000),
            new_vehicle("Honda", "Civic", 2022, Some(25000), 110000),
            new_vehicle("Jeep", "Compass", 2022, Some(10000), 160000),
        ])
        .await;

        for order in [SortOrder::Asc, SortOrder::Desc] {
            let page = store.find_page(&query(SortBy::Year, order)).await.unwrap();
            let models: Vec<_> = page.iter().map(|v| v.model.as_str()).collect();
            assert_eq!(models, vec!["Sentra", "Civic", "Compass"]);
        }
    }

    #[tokio::test]
    async fn test_pagination_skips_and_takes() {
        let vehicles = (0..15)
            .map(|i| new_vehicle("Brand", &format!("Model {:02}", i), 2020, Some(i), 1000 + i64::from(i)))
            .collect();
        let store = store_with(vehicles).await;

        let mut q = query(SortBy::Price, SortOrder::Asc);
        q.page = 2;
        let page = store.find_page(&q).await.unwrap();
        assert_eq!(page.len(), 5);
        assert_eq!(page[0].model, "Model 10");

        q.page = 99;
        assert!(store.find_page(&q).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_cascades_and_blocks_sold_vehicles() {
        let store = store_with(vec![
            new_vehicle("Toyota", "Corolla", 2023, Some(15000), 95000),
            new_vehicle("Chevrolet", "Cruze", 2020, Some(60000), 65000),
        ])
        .await;
        let page = store.find_page(&query(SortBy::Brand, SortOrder::Desc)).await.unwrap();
        let (corolla, cruze) = (page[0].id, page[1].id);

        let seller = UserStore::insert(
            &store,
            NewUser {
                name: "João Silva".into(),
                email: "joao@autoconnect.com".into(),
                phone: None,
                password_hash: "hash".into(),
                role: Role::Seller,
            },
        )
        .await
        .unwrap();

        store.add_photo(corolla, "https://example.com/photos/corolla-1.jpg".into()).await.unwrap();
        let lead = store
            .insert_lead(NewLead {
                vehicle_id: Some(corolla),
                name: "Carlos Oliveira".into(),
                email: "carlos@email.com".into(),
                phone: None,
                status: crate::models::activity::LeadStatus::New,
                seller: Some(UserRef::from(&seller)),
            })
            .await
            .unwrap();
        store
            .insert_sale(NewSale {
                vehicle_id: cruze,
                amount: Decimal::from(65000),
                seller: UserRef::from(&seller),
                lead: None,
            })
            .await
            .unwrap();

        let removed = VehicleStore::delete(&store, corolla).await.unwrap().unwrap();
        assert_eq!(removed.model, "Corolla");
        assert!(store.photos_for(&[corolla]).await.unwrap().is_empty());
        let data = store.data.read().await;
        assert_eq!(data.leads.iter().find(|l| l.id == lead.id).unwrap().vehicle_id, None);
        drop(data);

        let blocked = VehicleStore::delete(&store, cruze).await;
        assert!(matches!(blocked, Err(AppError::Conflict(_))));
        assert!(VehicleStore::delete(&store, Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_text_sort_ignores_case() {
        let store = store_with(vec![
            new_vehicle("BMW", "x1", 2021, None, 180000),
            new_vehicle("audi", "A3", 2020, None, 150000),
            new_vehicle("Chevrolet", "onix", 2022, None, 70000),
        ])
        .await;

        let page = store.find_page(&query(SortBy::Brand, SortOrder::Asc)).await.unwrap();
        let brands: Vec<&str> = page.iter().map(|v| v.brand.as_str()).collect();
        assert_eq!(brands, vec!["audi", "BMW", "Chevrolet"]);

        let page = store.find_page(&query(SortBy::Model, SortOrder::Desc)).await.unwrap();
        let models: Vec<&str> = page.iter().map(|v| v.model.as_str()).collect();
        assert_eq!(models, vec!["x1", "onix", "A3"]);
    }

    #[tokio::test]
    async fn test_photo_for_missing_vehicle_is_not_found() {
        let store = MemoryStore::new();
        let result = store
            .add_photo(Uuid::new_v4(), "https://example.com/photos/x.jpg".into())
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(result.unwrap_err().to_string(), "Not found: Vehicle not found");
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        let user = NewUser {
            name: "Admin".into(),
            email: "admin@autoconnect.com".into(),
            phone: None,
            password_hash: "hash".into(),
            role: Role::Admin,
        };
        UserStore::insert(&store, user.clone()).await.unwrap();
        let mut duplicate = user;
        duplicate.email = "ADMIN@autoconnect.com".into();
        assert!(matches!(
            UserStore::insert(&store, duplicate).await,
            Err(AppError::Conflict(_))
        ));
        assert_eq!(UserStore::count(&store).await.unwrap(), 1);
    }
}
