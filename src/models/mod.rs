//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean
//! al schema PostgreSQL.

pub mod activity;
pub mod auth;
pub mod user;
pub mod vehicle;
