use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::vehicle::{NewVehicle, VehicleChanges, VehicleStatus, normalize_price};
use crate::utils::validation::validate_positive_price;

// Request para crear un vehículo
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 2, max = 50, message = "brand must have between 2 and 50 characters"))]
    pub brand: String,

    #[validate(length(min = 2, max = 50, message = "model must have between 2 and 50 characters"))]
    pub model: String,

    #[validate(range(min = 1900, message = "year must be 1900 or later"))]
    pub year: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 30, message = "color must have at most 30 characters"))]
    pub color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, message = "mileage must not be negative"))]
    pub mileage: Option<i32>,

    #[validate(custom = "validate_positive_price")]
    pub price: Decimal,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<VehicleStatus>,
}

impl From<CreateVehicleRequest> for NewVehicle {
    fn from(request: CreateVehicleRequest) -> Self {
        Self {
            brand: request.brand,
            model: request.model,
            year: request.year,
            color: request.color,
            mileage: request.mileage,
            price: normalize_price(request.price),
            status: request.status.unwrap_or_default(),
        }
    }
}

// Request para actualizar un vehículo, sólo los campos presentes se aplican
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, max = 50, message = "brand must have between 2 and 50 characters"))]
    pub brand: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, max = 50, message = "model must have between 2 and 50 characters"))]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1900, message = "year must be 1900 or later"))]
    pub year: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 30, message = "color must have at most 30 characters"))]
    pub color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, message = "mileage must not be negative"))]
    pub mileage: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom = "validate_positive_price")]
    pub price: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<VehicleStatus>,
}

impl From<UpdateVehicleRequest> for VehicleChanges {
    fn from(request: UpdateVehicleRequest) -> Self {
        Self {
            brand: request.brand,
            model: request.model,
            year: request.year,
            color: request.color,
            mileage: request.mileage,
            price: request.price.map(normalize_price),
            status: request.status,
        }
    }
}

// Request para agregar una foto
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddPhotoRequest {
    #[validate(url(message = "url must be a valid URL"))]
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn corolla(price: &str) -> CreateVehicleRequest {
        CreateVehicleRequest {
            brand: "Toyota".into(),
            model: "Corolla".into(),
            year: 2023,
            color: Some("Branco".into()),
            mileage: Some(15000),
            price: Decimal::from_str(price).unwrap(),
            status: None,
        }
    }

    #[test]
    fn test_create_rejects_non_positive_price() {
        assert!(corolla("95000.00").validate().is_ok());
        assert!(corolla("0").validate().is_err());
        assert!(corolla("-10").validate().is_err());
    }

    #[test]
    fn test_create_rejects_old_year_and_negative_mileage() {
        let mut request = corolla("95000");
        request.year = 1899;
        request.mileage = Some(-1);
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("year"));
        assert!(fields.contains_key("mileage"));
    }

    #[test]
    fn test_create_defaults_status_and_normalizes_price() {
        let vehicle = NewVehicle::from(corolla("95000"));
        assert_eq!(vehicle.status, VehicleStatus::Available);
        assert_eq!(vehicle.price.to_string(), "95000.00");
    }

    #[test]
    fn test_update_accepts_partial_body() {
        let request: UpdateVehicleRequest = serde_json::from_str(r#"{"status":"RESERVED"}"#).unwrap();
        assert!(request.validate().is_ok());
        let changes = VehicleChanges::from(request);
        assert_eq!(changes.status, Some(VehicleStatus::Reserved));
        assert!(changes.brand.is_none());

        let invalid: UpdateVehicleRequest = serde_json::from_str(r#"{"brand":"X"}"#).unwrap();
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_photo_url_validation() {
        assert!(AddPhotoRequest { url: "https://example.com/photos/a.jpg".into() }.validate().is_ok());
        assert!(AddPhotoRequest { url: "not a url".into() }.validate().is_err());
    }
}
