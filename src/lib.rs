//! AutoConnect API
//!
//! API REST del concesionario: autenticación con JWT, inventario de
//! vehículos con fotos y el cliente que usa el dashboard.

pub mod client;
pub mod config;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
