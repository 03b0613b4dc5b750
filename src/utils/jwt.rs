//! Utilidades JWT
//!
//! Helpers para extraer el bearer token del header Authorization.

use crate::utils::errors::AppError;

/// Validar formato de token (básico)
pub fn validate_token_format(token: &str) -> Result<(), AppError> {
    if token.is_empty() {
        return Err(AppError::Unauthorized("Token cannot be empty".to_string()));
    }

    if token.split('.').count() != 3 {
        return Err(AppError::Unauthorized("Malformed token".to_string()));
    }

    Ok(())
}

/// Extraer token del header Authorization
pub fn extract_token_from_header(auth_header: &str) -> Result<&str, AppError> {
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| {
            AppError::Unauthorized("Authorization header must start with 'Bearer '".to_string())
        })?
        .trim();

    validate_token_format(token)?;
    Ok(token)
}
