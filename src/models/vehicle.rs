//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle, sus fotos y las variantes usadas
//! para crear y actualizar registros. Mapea al schema PostgreSQL con
//! primary key `id`.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::models::activity::{LeadRecord, SaleRecord, TestDriveRecord};

/// Escala con la que se guardan los precios (NUMERIC(12,2))
pub const PRICE_SCALE: u32 = 2;

/// Mayor precio representable en NUMERIC(12,2)
pub const MAX_PRICE: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Estado del vehículo - mapea al ENUM vehicle_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash, Default)]
#[sqlx(type_name = "vehicle_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleStatus {
    #[default]
    Available,
    Reserved,
    Sold,
}

impl VehicleStatus {
    pub const ALL: [VehicleStatus; 3] = [
        VehicleStatus::Available,
        VehicleStatus::Reserved,
        VehicleStatus::Sold,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Available => "AVAILABLE",
            VehicleStatus::Reserved => "RESERVED",
            VehicleStatus::Sold => "SOLD",
        }
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VehicleStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("status must be one of AVAILABLE, RESERVED, SOLD (got '{}')", s))
    }
}

/// Vehicle principal - mapea exactamente a la tabla vehicles
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: Uuid,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub color: Option<String>,
    pub mileage: Option<i32>,
    pub price: Decimal,
    pub status: VehicleStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Orden de inserción, sólo para desempatar ordenaciones
    #[serde(skip)]
    pub seq: i64,
}

/// Foto de un vehículo - tabla vehicle_photos
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VehiclePhoto {
    pub id: Uuid,
    pub url: String,
    pub vehicle_id: Uuid,
    #[serde(skip)]
    pub seq: i64,
}

/// Datos validados para insertar un vehículo
#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub color: Option<String>,
    pub mileage: Option<i32>,
    pub price: Decimal,
    pub status: VehicleStatus,
}

/// Cambios parciales: `None` significa "no tocar"
#[derive(Debug, Clone, Default)]
pub struct VehicleChanges {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub mileage: Option<i32>,
    pub price: Option<Decimal>,
    pub status: Option<VehicleStatus>,
}

impl VehicleChanges {
    /// Aplicar los cambios presentes sobre un vehículo existente
    pub fn apply_to(self, vehicle: &mut Vehicle) {
        if let Some(brand) = self.brand {
            vehicle.brand = brand;
        }
        if let Some(model) = self.model {
            vehicle.model = model;
        }
        if let Some(year) = self.year {
            vehicle.year = year;
        }
        if let Some(color) = self.color {
            vehicle.color = Some(color);
        }
        if let Some(mileage) = self.mileage {
            vehicle.mileage = Some(mileage);
        }
        if let Some(price) = self.price {
            vehicle.price = normalize_price(price);
        }
        if let Some(status) = self.status {
            vehicle.status = status;
        }
    }
}

/// Vehículo con fotos y registros comerciales asociados
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VehicleWithRelations {
    #[serde(flatten)]
    pub vehicle: Vehicle,
    pub photos: Vec<VehiclePhoto>,
    pub leads: Vec<LeadRecord>,
    pub sales: Vec<SaleRecord>,
    pub test_drive: Vec<TestDriveRecord>,
}

/// Normaliza un precio a la escala de la columna NUMERIC(12,2), redondeando como PostgreSQL
pub fn normalize_price(price: Decimal) -> Decimal {
    let mut normalized = price.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero);
    normalized.rescale(PRICE_SCALE);
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_and_display() {
        assert_eq!("available".parse::<VehicleStatus>().unwrap(), VehicleStatus::Available);
        assert_eq!("SOLD".parse::<VehicleStatus>().unwrap(), VehicleStatus::Sold);
        assert!("BROKEN".parse::<VehicleStatus>().is_err());
        assert_eq!(VehicleStatus::Reserved.to_string(), "RESERVED");
    }

    #[test]
    fn test_normalize_price_keeps_two_decimals() {
        let price = normalize_price(Decimal::from(95000));
        assert_eq!(price.to_string(), "95000.00");
        let price = normalize_price(Decimal::from_str("25000.999").unwrap());
        assert_eq!(price.to_string(), "25001.00");
        let price = normalize_price(Decimal::from_str("0.125").unwrap());
        assert_eq!(price.to_string(), "0.13");
        assert_eq!(MAX_PRICE.to_string(), "9999999999.99");
    }

    #[test]
    fn test_changes_merge_only_supplied_fields() {
        let now = Utc::now();
        let mut vehicle = Vehicle {
            id: Uuid::new_v4(),
            brand: "Toyota".into(),
            model: "Corolla".into(),
            year: 2023,
            color: Some("Branco".into()),
            mileage: Some(15000),
            price: normalize_price(Decimal::from(95000)),
            status: VehicleStatus::Available,
            created_at: now,
            updated_at: now,
            seq: 1,
        };
        VehicleChanges {
            status: Some(VehicleStatus::Reserved),
            ..Default::default()
        }
        .apply_to(&mut vehicle);

        assert_eq!(vehicle.status, VehicleStatus::Reserved);
        assert_eq!(vehicle.color.as_deref(), Some("Branco"));
        assert_eq!(vehicle.mileage, Some(15000));
        assert_eq!(vehicle.brand, "Toyota");
    }

    #[test]
    fn test_vehicle_serializes_camel_case_without_seq() {
        let now = Utc::now();
        let vehicle = Vehicle {
            id: Uuid::new_v4(),
            brand: "Honda".into(),
            model: "Civic".into(),
            year: 2022,
            color: None,
            mileage: None,
            price: normalize_price(Decimal::from(110000)),
            status: VehicleStatus::Available,
            created_at: now,
            updated_at: now,
            seq: 7,
        };
        let json = serde_json::to_value(&vehicle).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("seq").is_none());
        assert_eq!(json["price"], "110000.00");
        assert_eq!(json["status"], "AVAILABLE");
    }
}
