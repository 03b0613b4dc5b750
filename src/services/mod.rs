//! Services module
//!
//! Este módulo contiene la lógica de negocio de la aplicación. Los servicios
//! encapsulan las operaciones sobre los repositorios.

pub mod auth_service;
pub mod jwt_service;
pub mod vehicle_service;

pub use auth_service::AuthService;
pub use jwt_service::JwtService;
pub use vehicle_service::VehicleService;
