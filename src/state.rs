//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use sqlx::PgPool;
use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::middleware::rate_limit::RateLimitState;
use crate::repositories::{MemoryStore, PgUserRepository, PgVehicleRepository, UserStore, VehicleStore};
use crate::services::{AuthService, JwtService, VehicleService};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EnvironmentConfig>,
    pub users: Arc<dyn UserStore>,
    pub vehicles: Arc<dyn VehicleStore>,
    pub jwt: JwtService,
    pub auth_service: AuthService,
    pub vehicle_service: VehicleService,
    pub rate_limit: RateLimitState,
}

impl AppState {
    pub fn new(
        config: EnvironmentConfig,
        users: Arc<dyn UserStore>,
        vehicles: Arc<dyn VehicleStore>,
    ) -> Self {
        let jwt = JwtService::from_config(&config);
        Self {
            auth_service: AuthService::new(users.clone(), jwt.clone(), config.bcrypt_cost),
            vehicle_service: VehicleService::new(vehicles.clone()),
            rate_limit: RateLimitState::from_config(&config),
            config: Arc::new(config),
            users,
            vehicles,
            jwt,
        }
    }

    /// Estado respaldado por PostgreSQL
    pub fn with_pool(config: EnvironmentConfig, pool: PgPool) -> Self {
        Self::new(
            config,
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgVehicleRepository::new(pool)),
        )
    }

    /// Estado respaldado por el almacén en memoria
    pub fn in_memory(config: EnvironmentConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(config, store.clone(), store)
    }
}
