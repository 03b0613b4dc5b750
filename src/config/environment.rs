//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.

use anyhow::{anyhow, Context, Result};
use std::env;
use std::str::FromStr;

/// Backend de persistencia
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(anyhow!("unknown STORAGE_BACKEND '{}'", other)),
        }
    }
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub cors_origins: Vec<String>,
    pub rate_limit_requests: u32,
    pub rate_limit_window: u64,
    pub bcrypt_cost: u32,
    pub request_timeout_secs: u64,
    pub storage_backend: StorageBackend,
    pub seed_database: bool,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 3333,
            host: "0.0.0.0".to_string(),
            jwt_secret: "development-secret-change-me".to_string(),
            jwt_expiration: 86_400,
            cors_origins: vec!["http://localhost:3000".to_string()],
            rate_limit_requests: 100,
            rate_limit_window: 60,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            request_timeout_secs: 30,
            storage_backend: StorageBackend::Postgres,
            seed_database: false,
        }
    }
}

/// Entornos que pueden arrancar con el secreto JWT por defecto
const INSECURE_ENVIRONMENTS: [&str; 2] = ["development", "test"];

/// Sin ENVIRONMENT explícito se asume producción
fn resolve_environment(raw: Option<String>) -> String {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "production".to_string())
}

fn resolve_jwt_secret(environment: &str, secret: Option<String>, fallback: String) -> Result<String> {
    match secret {
        Some(secret) if !secret.trim().is_empty() => Ok(secret),
        _ if INSECURE_ENVIRONMENTS.contains(&environment) => Ok(fallback),
        _ => Err(anyhow!(
            "JWT_SECRET must be set when ENVIRONMENT is '{}'",
            environment
        )),
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{} must be a valid value: {}", name, e)),
        Err(_) => Ok(default),
    }
}

impl EnvironmentConfig {
    /// Cargar la configuración desde variables de entorno
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let environment = resolve_environment(env::var("ENVIRONMENT").ok());
        let jwt_secret =
            resolve_jwt_secret(&environment, env::var("JWT_SECRET").ok(), defaults.jwt_secret)?;

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.cors_origins);

        Ok(Self {
            port: parse_var("PORT", defaults.port)?,
            host: env::var("HOST").unwrap_or(defaults.host),
            jwt_secret,
            jwt_expiration: parse_var("JWT_EXPIRATION", defaults.jwt_expiration)?,
            cors_origins,
            rate_limit_requests: parse_var("RATE_LIMIT_REQUESTS", defaults.rate_limit_requests)?,
            rate_limit_window: parse_var("RATE_LIMIT_WINDOW", defaults.rate_limit_window)?,
            bcrypt_cost: parse_var("BCRYPT_COST", defaults.bcrypt_cost)?,
            request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs)?,
            storage_backend: parse_var("STORAGE_BACKEND", defaults.storage_backend)
                .context("invalid STORAGE_BACKEND")?,
            seed_database: parse_var("SEED_DATABASE", defaults.seed_database)?,
            environment,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Obtener la dirección del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_backend_from_str() {
        assert_eq!("memory".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert_eq!("Postgres".parse::<StorageBackend>().unwrap(), StorageBackend::Postgres);
        assert!("sqlite".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = EnvironmentConfig::default();
        assert!(config.is_development());
        assert_eq!(config.server_url(), "0.0.0.0:3333");
    }

    #[test]
    fn test_missing_environment_requires_jwt_secret() {
        let environment = resolve_environment(None);
        assert_eq!(environment, "production");
        assert!(resolve_jwt_secret(&environment, None, "fallback".into()).is_err());
        assert!(resolve_jwt_secret(&environment, Some("  ".into()), "fallback".into()).is_err());
        assert_eq!(
            resolve_jwt_secret(&environment, Some("s3cret".into()), "fallback".into()).unwrap(),
            "s3cret"
        );

        assert_eq!(resolve_environment(Some(" ".into())), "production");
        assert!(resolve_jwt_secret("staging", None, "fallback".into()).is_err());
    }

    #[test]
    fn test_development_falls_back_to_default_secret() {
        let environment = resolve_environment(Some("development".into()));
        assert_eq!(
            resolve_jwt_secret(&environment, None, "fallback".into()).unwrap(),
            "fallback"
        );
        assert_eq!(resolve_jwt_secret("test", None, "fallback".into()).unwrap(), "fallback");
    }
}
