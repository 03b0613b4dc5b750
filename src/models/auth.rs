use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::Role;

/// Claims del JWT de sesión. No contiene material de contraseña.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: Uuid, // user_id
    pub role: Role,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Usuario autenticado que se inyecta en las requests
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub role: Role,
    pub email: String,
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
            email: claims.email,
        }
    }
}
