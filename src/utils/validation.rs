//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos,
//! validadores custom usados por los DTOs y el extractor `ValidatedJson`.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::vehicle::{normalize_price, MAX_PRICE};
use crate::utils::errors::{validation_error, AppError, AppResult};

lazy_static! {
    /// Teléfonos: dígitos, espacios, paréntesis, `+` y `-`
    pub static ref PHONE_RE: Regex = Regex::new(r"^[0-9()+\-\s]{8,20}$").unwrap();
}

/// Longitud mínima y máxima aceptada para contraseñas
pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 64;

/// Body JSON deserializado y validado con `validator`.
///
/// Un body mal formado se reporta como 400 (no el 422 por defecto de axum)
/// y las reglas de validación fallidas como 400 con detalle por campo.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Validar y convertir string a UUID
pub fn parse_uuid(field: &'static str, value: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value).map_err(|_| validation_error(field, format!("'{}' is not a valid id", value)))
}

/// Precio positivo y representable una vez redondeado a centavos
pub fn validate_positive_price(value: &Decimal) -> Result<(), ValidationError> {
    let rounded = normalize_price(*value);
    if rounded <= Decimal::ZERO {
        let mut error = ValidationError::new("positive");
        error.message = Some("price must be a positive number".into());
        return Err(error);
    }
    if rounded > MAX_PRICE {
        let mut error = ValidationError::new("max_price");
        error.add_param("max".into(), &MAX_PRICE.to_string());
        error.message = Some(format!("price must be at most {}", MAX_PRICE).into());
        return Err(error);
    }
    Ok(())
}

/// Contraseña fuerte: minúscula, mayúscula, dígito y símbolo
pub fn validate_password_strength(value: &str) -> Result<(), ValidationError> {
    let len = value.chars().count();
    let strong = (PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&len)
        && value.chars().any(|c| c.is_ascii_lowercase())
        && value.chars().any(|c| c.is_ascii_uppercase())
        && value.chars().any(|c| c.is_ascii_digit())
        && value.chars().any(|c| !c.is_alphanumeric());

    if !strong {
        let mut error = ValidationError::new("password_strength");
        error.add_param("min".into(), &PASSWORD_MIN_LEN);
        error.add_param("max".into(), &PASSWORD_MAX_LEN);
        error.message = Some(
            "password must contain lowercase, uppercase, digit and symbol characters".into(),
        );
        return Err(error);
    }
    Ok(())
}

/// Escapar metacaracteres de LIKE para búsquedas por substring
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_positive_price() {
        assert!(validate_positive_price(&Decimal::from_str("95000.00").unwrap()).is_ok());
        assert!(validate_positive_price(&Decimal::ZERO).is_err());
        assert!(validate_positive_price(&Decimal::from_str("-1").unwrap()).is_err());
        // se redondea a 0.00 antes de guardar
        assert!(validate_positive_price(&Decimal::from_str("0.001").unwrap()).is_err());
        assert!(validate_positive_price(&Decimal::from_str("0.005").unwrap()).is_ok());
        assert!(validate_positive_price(&MAX_PRICE).is_ok());
        assert!(validate_positive_price(&Decimal::from_str("9999999999.995").unwrap()).is_err());
        assert!(validate_positive_price(&Decimal::from_str("10000000000").unwrap()).is_err());
    }

    #[test]
    fn test_password_strength() {
        assert!(validate_password_strength("Admin123!").is_ok());
        assert!(validate_password_strength("admin123!").is_err());
        assert!(validate_password_strength("Admin1234").is_err());
        assert!(validate_password_strength("Ab1!").is_err());
    }

    #[test]
    fn test_phone_regex() {
        assert!(PHONE_RE.is_match("(11) 99999-9999"));
        assert!(PHONE_RE.is_match("+55 11 99999 9999"));
        assert!(!PHONE_RE.is_match("call me maybe"));
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%_a\\b"), "100\\%\\_a\\\\b");
        assert_eq!(escape_like("Civic"), "Civic");
    }

    #[test]
    fn test_parse_uuid() {
        assert!(parse_uuid("id", "not-a-uuid").is_err());
        let id = Uuid::new_v4();
        assert_eq!(parse_uuid("id", &id.to_string()).unwrap(), id);
    }
}
