pub mod auth_dto;
pub mod envelope;
pub mod vehicle_dto;
pub mod vehicle_query;
