//! Servicio de autenticación
//!
//! Registro, login y perfil de usuarios sobre un `UserStore`.

use bcrypt::{hash, verify};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::dto::auth_dto::{LoginRequest, LoginResponse, RegisterRequest};
use crate::models::user::{NewUser, PublicUser};
use crate::repositories::user_repository::{UserStore, EMAIL_IN_USE};
use crate::services::jwt_service::JwtService;
use crate::utils::errors::{AppError, AppResult};

pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt_service: JwtService,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, jwt_service: JwtService, bcrypt_cost: u32) -> Self {
        Self {
            users,
            jwt_service,
            bcrypt_cost,
        }
    }

    /// Registra un usuario nuevo guardando sólo el hash de la contraseña
    pub async fn register(&self, request: RegisterRequest) -> AppResult<PublicUser> {
        let email = request.email.trim().to_lowercase();
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict(EMAIL_IN_USE.to_string()));
        }

        let password_hash = hash(&request.password, self.bcrypt_cost)
            .map_err(|e| AppError::Hash(e.to_string()))?;

        let user = self
            .users
            .insert(NewUser {
                name: request.name.trim().to_string(),
                email,
                phone: request.phone,
                password_hash,
                role: request.role.unwrap_or_default(),
            })
            .await?;

        info!("👤 Usuario registrado: {} ({})", user.email, user.role.as_str());
        Ok(user.into())
    }

    /// Login; email desconocido y contraseña incorrecta dan el mismo error
    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        let user = self
            .users
            .find_by_email(request.email.trim())
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        let valid = verify(&request.password, &user.password_hash)
            .map_err(|e| AppError::Hash(e.to_string()))?;
        if !valid {
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let access_token = self.jwt_service.generate_access_token(&user)?;
        info!("🔐 Login exitoso: {}", user.email);
        Ok(LoginResponse { access_token })
    }

    /// Perfil del usuario del token; si ya no existe el token deja de valer
    pub async fn profile(&self, user_id: Uuid) -> AppResult<PublicUser> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(PublicUser::from)
            .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;
    use crate::repositories::MemoryStore;

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(MemoryStore::new()),
            JwtService::new("test-secret", 3600),
            4,
        )
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Maria Santos".into(),
            email: email.into(),
            password: "Maria123!".into(),
            phone: Some("(11) 98888-8888".into()),
            role: None,
        }
    }

    #[tokio::test]
    async fn test_register_defaults_to_seller_and_rejects_duplicates() {
        let service = service();
        let user = service.register(register_request("maria@autoconnect.com")).await.unwrap();
        assert_eq!(user.role, Role::Seller);

        let duplicate = service.register(register_request("Maria@AutoConnect.com")).await;
        assert!(matches!(duplicate, Err(AppError::Conflict(msg)) if msg == EMAIL_IN_USE));
    }

    #[tokio::test]
    async fn test_login_and_profile() {
        let service = service();
        let user = service.register(register_request("maria@autoconnect.com")).await.unwrap();

        let wrong = service
            .login(LoginRequest {
                email: "maria@autoconnect.com".into(),
                password: "Wrong123!".into(),
            })
            .await;
        assert!(matches!(wrong, Err(AppError::Unauthorized(msg)) if msg == INVALID_CREDENTIALS));

        let unknown = service
            .login(LoginRequest {
                email: "nobody@autoconnect.com".into(),
                password: "Maria123!".into(),
            })
            .await;
        assert!(matches!(unknown, Err(AppError::Unauthorized(msg)) if msg == INVALID_CREDENTIALS));

        let response = service
            .login(LoginRequest {
                email: "maria@autoconnect.com".into(),
                password: "Maria123!".into(),
            })
            .await
            .unwrap();
        let claims = service.jwt_service.validate_token(&response.access_token).unwrap();
        assert_eq!(claims.sub, user.id);

        assert_eq!(service.profile(user.id).await.unwrap().email, "maria@autoconnect.com");
        assert!(matches!(
            service.profile(Uuid::new_v4()).await,
            Err(AppError::Unauthorized(_))
        ));
    }
}
