//! Módulo de base de datos
//!
//! Maneja la conexión, las migraciones y el seed de PostgreSQL

pub mod connection;
pub mod seed;

pub use connection::connect;
pub use seed::{seed, seed_if_empty, SeedSummary};
