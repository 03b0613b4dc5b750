//! Cliente de la API para el dashboard
//!
//! Sesión con el token, llamadas HTTP tipadas, estado del listado con
//! debounce y caché, y su reflejo en el query string.

pub mod api;
pub mod debounce;
pub mod errors;
pub mod list_state;
pub mod query_state;
pub mod session;

pub use api::{ApiClient, PhotoUpload, VehicleCreation};
pub use errors::{ClientError, Operation};
pub use list_state::{Effect, ListStatus, TextFilter, VehicleListState};
pub use session::Session;
