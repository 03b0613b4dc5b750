pub mod memory;
pub mod user_repository;
pub mod vehicle_repository;

pub use memory::MemoryStore;
pub use user_repository::{PgUserRepository, UserStore};
pub use vehicle_repository::{PgVehicleRepository, VehicleStore};
