//! Datos iniciales del concesionario
//!
//! Usuarios de ejemplo, inventario de 15 vehículos con fotos y algunos
//! registros comerciales. Sirve para cualquiera de los dos backends.

use bcrypt::hash;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::info;

use crate::models::activity::{LeadRef, LeadStatus, NewLead, NewSale, NewTestDrive};
use crate::models::user::{NewUser, Role, User, UserRef};
use crate::models::vehicle::{normalize_price, NewVehicle, Vehicle, VehicleStatus};
use crate::repositories::{UserStore, VehicleStore};
use crate::utils::errors::{AppError, AppResult};

/// Resumen de lo insertado
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub vehicles: usize,
    pub photos: usize,
    pub leads: usize,
    pub test_drives: usize,
    pub sales: usize,
}

const USERS: [(&str, &str, &str, &str, Role); 3] = [
    ("Admin User", "admin@autoconnect.com", "(11) 99999-9999", "Admin123!", Role::Admin),
    ("João Silva", "joao@autoconnect.com", "(11) 98888-8888", "Joao123!", Role::Seller),
    ("Maria Santos", "maria@autoconnect.com", "(11) 97777-7777", "Maria123!", Role::Seller),
];

// brand, model, year, color, mileage, price, status
const VEHICLES: [(&str, &str, i32, &str, i32, i64, VehicleStatus); 15] = [
    ("Toyota", "Corolla", 2023, "Branco", 15000, 95000, VehicleStatus::Available),
    ("Honda", "Civic", 2022, "Prata", 25000, 110000, VehicleStatus::Available),
    ("Volkswagen", "Jetta", 2024, "Preto", 5000, 125000, VehicleStatus::Available),
    ("Ford", "Focus", 2021, "Azul", 45000, 75000, VehicleStatus::Reserved),
    ("Chevrolet", "Cruze", 2020, "Vermelho", 60000, 65000, VehicleStatus::Sold),
    ("Hyundai", "Elantra", 2023, "Cinza", 8000, 85000, VehicleStatus::Available),
    ("Nissan", "Sentra", 2022, "Branco", 20000, 80000, VehicleStatus::Available),
    ("Renault", "Fluence", 2019, "Prata", 80000, 45000, VehicleStatus::Available),
    ("Fiat", "Cronos", 2021, "Branco", 35000, 55000, VehicleStatus::Available),
    ("Peugeot", "408", 2020, "Preto", 50000, 70000, VehicleStatus::Available),
    ("BMW", "320i", 2023, "Azul", 12000, 200000, VehicleStatus::Available),
    ("Mercedes-Benz", "C180", 2022, "Preto", 18000, 220000, VehicleStatus::Reserved),
    ("Audi", "A3", 2021, "Branco", 28000, 180000, VehicleStatus::Available),
    ("Jeep", "Compass", 2023, "Vermelho", 10000, 160000, VehicleStatus::Available),
    ("Mitsubishi", "Lancer", 2019, "Prata", 55000, 60000, VehicleStatus::Available),
];

// url, índice del vehículo
const PHOTOS: [(&str, usize); 11] = [
    ("https://example.com/photos/corolla-1.jpg", 0),
    ("https://example.com/photos/corolla-2.jpg", 1),
    ("https://example.com/photos/civic-1.jpg", 2),
    ("https://example.com/photos/civic-2.jpg", 3),
    ("https://example.com/photos/jetta-1.jpg", 4),
    ("https://example.com/photos/focus-1.jpg", 5),
    ("https://example.com/photos/cruze-1.jpg", 6),
    ("https://example.com/photos/elantra-1.jpg", 7),
    ("https://example.com/photos/sentra-1.jpg", 8),
    ("https://example.com/photos/fluence-1.jpg", 9),
    ("https://example.com/photos/corolla-3.jpg", 0),
];

// name, email, phone, vehículo, vendedor (1 = João, 2 = Maria), status
const LEADS: [(&str, &str, &str, usize, usize, LeadStatus); 8] = [
    ("Carlos Oliveira", "carlos@email.com", "(11) 91234-5678", 0, 1, LeadStatus::New),
    ("Ana Paula", "ana@email.com", "(11) 92345-6789", 1, 1, LeadStatus::Contacted),
    ("Roberto Lima", "roberto@email.com", "(11) 93456-7890", 2, 2, LeadStatus::TestDrive),
    ("Fernanda Costa", "fernanda@email.com", "(11) 94567-8901", 3, 2, LeadStatus::Proposal),
    ("Bruno Alves", "bruno@email.com", "(11) 95678-9012", 4, 1, LeadStatus::Closed),
    ("Juliana Rocha", "juliana@email.com", "(11) 96789-0123", 5, 1, LeadStatus::New),
    ("Pedro Martins", "pedro@email.com", "(11) 97890-1234", 10, 2, LeadStatus::Contacted),
    ("Camila Ferreira", "camila@email.com", "(11) 98901-2345", 11, 2, LeadStatus::Lost),
];

// fecha, lead, vehículo, vendedor
const TEST_DRIVES: [(&str, usize, usize, usize); 3] = [
    ("2024-01-15T10:00:00Z", 2, 2, 2),
    ("2024-01-20T14:30:00Z", 3, 3, 2),
    ("2024-01-25T16:00:00Z", 6, 10, 2),
];

fn parse_date(raw: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|e| AppError::Internal(format!("Invalid seed date {}: {}", raw, e)))
}

/// Carga los datos iniciales si todavía no hay usuarios
pub async fn seed_if_empty(
    users: &dyn UserStore,
    vehicles: &dyn VehicleStore,
    bcrypt_cost: u32,
) -> AppResult<Option<SeedSummary>> {
    if users.count().await? > 0 {
        info!("🌱 Base de datos con datos, se omite el seed");
        return Ok(None);
    }
    seed(users, vehicles, bcrypt_cost).await.map(Some)
}

pub async fn seed(
    user_store: &dyn UserStore,
    vehicle_store: &dyn VehicleStore,
    bcrypt_cost: u32,
) -> AppResult<SeedSummary> {
    let mut summary = SeedSummary::default();

    let mut users: Vec<User> = Vec::with_capacity(USERS.len());
    for (name, email, phone, password, role) in USERS {
        let password_hash = hash(password, bcrypt_cost).map_err(|e| AppError::Hash(e.to_string()))?;
        let user = user_store
            .insert(NewUser {
                name: name.to_string(),
                email: email.to_string(),
                phone: Some(phone.to_string()),
                password_hash,
                role,
            })
            .await?;
        users.push(user);
    }
    summary.users = users.len();
    info!("👥 Usuarios creados");

    let mut vehicles: Vec<Vehicle> = Vec::with_capacity(VEHICLES.len());
    for (brand, model, year, color, mileage, price, status) in VEHICLES {
        let vehicle = vehicle_store
            .insert(NewVehicle {
                brand: brand.to_string(),
                model: model.to_string(),
                year,
                color: Some(color.to_string()),
                mileage: Some(mileage),
                price: normalize_price(Decimal::from(price)),
                status,
            })
            .await?;
        vehicles.push(vehicle);
    }
    summary.vehicles = vehicles.len();
    info!("🚗 Vehículos creados");

    for (url, vehicle_index) in PHOTOS {
        vehicle_store
            .add_photo(vehicles[vehicle_index].id, url.to_string())
            .await?;
        summary.photos += 1;
    }
    info!("📸 Fotos creadas");

    let mut leads: Vec<LeadRef> = Vec::with_capacity(LEADS.len());
    for (name, email, phone, vehicle_index, seller_index, status) in LEADS {
        let lead = vehicle_store
            .insert_lead(NewLead {
                vehicle_id: Some(vehicles[vehicle_index].id),
                name: name.to_string(),
                email: email.to_string(),
                phone: Some(phone.to_string()),
                status,
                seller: Some(UserRef::from(&users[seller_index])),
            })
            .await?;
        leads.push(lead.to_ref());
    }
    summary.leads = leads.len();
    info!("🎯 Leads creados");

    for (date, lead_index, vehicle_index, seller_index) in TEST_DRIVES {
        vehicle_store
            .insert_test_drive(NewTestDrive {
                vehicle_id: vehicles[vehicle_index].id,
                date: parse_date(date)?,
                lead: leads[lead_index].clone(),
                seller: UserRef::from(&users[seller_index]),
            })
            .await?;
        summary.test_drives += 1;
    }
    info!("🚙 Test drives creados");

    // Chevrolet Cruze vendido por João a Bruno Alves
    vehicle_store
        .insert_sale(NewSale {
            vehicle_id: vehicles[4].id,
            amount: normalize_price(Decimal::from(65000)),
            seller: UserRef::from(&users[1]),
            lead: Some(leads[4].clone()),
        })
        .await?;
    summary.sales = 1;
    info!("💰 Ventas creadas");

    info!(
        "🎉 Seed completado: {} usuarios, {} vehículos, {} fotos, {} leads, {} test drives, {} ventas",
        summary.users,
        summary.vehicles,
        summary.photos,
        summary.leads,
        summary.test_drives,
        summary.sales
    );
    Ok(summary)
}
