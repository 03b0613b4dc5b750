use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::config::EnvironmentConfig;
use crate::models::auth::Claims;
use crate::models::user::User;
use crate::utils::errors::{AppError, AppResult};

/// Servicio JWT (HS256)
#[derive(Clone)]
pub struct JwtService {
    algorithm: Algorithm,
    access_token_duration: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(secret: &str, expiration_secs: u64) -> Self {
        Self {
            algorithm: Algorithm::HS256,
            access_token_duration: Duration::seconds(i64::try_from(expiration_secs).unwrap_or(i64::MAX / 1000)),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn from_config(config: &EnvironmentConfig) -> Self {
        Self::new(&config.jwt_secret, config.jwt_expiration)
    }

    /// Genera un token de acceso para el usuario
    pub fn generate_access_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            role: user.role,
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + self.access_token_duration).timestamp(),
        };
        self.encode_claims(&claims)
    }

    fn encode_claims(&self, claims: &Claims) -> AppResult<String> {
        encode(&Header::new(self.algorithm), claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Error generating access token: {}", e)))
    }

    /// Valida firma y expiración, y decodifica los claims
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::Jwt(format!("Invalid token: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;
    use uuid::Uuid;

    fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Admin User".into(),
            email: "admin@autoconnect.com".into(),
            phone: None,
            password_hash: "$2b$04$hash".into(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_generate_and_validate_token() {
        let jwt_service = JwtService::new("test-secret", 3600);
        let user = user(Role::Admin);

        let token = jwt_service.generate_access_token(&user).unwrap();
        let claims = jwt_service.validate_token(&token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.email, "admin@autoconnect.com");
        assert!(claims.exp > claims.iat);
        assert!(!token.contains("hash"));
    }

    #[test]
    fn test_rejects_expired_and_foreign_tokens() {
        let jwt_service = JwtService::new("test-secret", 3600);
        let now = Utc::now().timestamp();
        let expired = jwt_service
            .encode_claims(&Claims {
                sub: Uuid::new_v4(),
                role: Role::Seller,
                email: "joao@autoconnect.com".into(),
                iat: now - 7200,
                exp: now - 3600,
            })
            .unwrap();
        assert!(matches!(jwt_service.validate_token(&expired), Err(AppError::Jwt(_))));

        let other = JwtService::new("other-secret", 3600);
        let token = other.generate_access_token(&user(Role::Seller)).unwrap();
        assert!(jwt_service.validate_token(&token).is_err());
    }
}
