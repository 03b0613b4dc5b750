//! Sesión del cliente
//!
//! Contexto explícito con el bearer token y sus claims. Los claims se
//! decodifican sin verificar la firma: sólo sirven para la UI, el servidor
//! sigue siendo quien valida el token.

use chrono::Utc;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::client::errors::ClientError;
use crate::models::auth::Claims;
use crate::models::user::Role;

#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Option<String>,
    claims: Option<Claims>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Guarda el token y sus claims; un token ilegible no modifica la sesión
    pub fn set_token(&mut self, token: String) -> Result<(), ClientError> {
        let claims = decode_unverified(&token)?;
        self.token = Some(token);
        self.claims = Some(claims);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.token = None;
        self.claims = None;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn claims(&self) -> Option<&Claims> {
        self.claims.as_ref()
    }

    /// Hay token y todavía no expiró según su `exp`
    pub fn is_authenticated(&self) -> bool {
        self.claims
            .as_ref()
            .is_some_and(|claims| claims.exp > Utc::now().timestamp())
    }

    pub fn is_admin(&self) -> bool {
        self.is_authenticated() && self.claims.as_ref().is_some_and(|c| c.role == Role::Admin)
    }

    /// Valor del header Authorization
    pub fn bearer(&self) -> Option<String> {
        self.token.as_ref().map(|token| format!("Bearer {}", token))
    }
}

fn decode_unverified(token: &str) -> Result<Claims, ClientError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| ClientError::Decode(format!("token inválido: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::User;
    use crate::services::jwt_service::JwtService;
    use uuid::Uuid;

    fn token_for(role: Role) -> (Uuid, String) {
        let user = User {
            id: Uuid::new_v4(),
            name: "Admin User".into(),
            email: "admin@autoconnect.com".into(),
            phone: None,
            password_hash: "hash".into(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let token = JwtService::new("server-secret", 3600)
            .generate_access_token(&user)
            .unwrap();
        (user.id, token)
    }

    #[test]
    fn test_session_decodes_claims_without_secret() {
        let (user_id, token) = token_for(Role::Admin);
        let mut session = Session::new();
        session.set_token(token.clone()).unwrap();

        assert!(session.is_authenticated());
        assert!(session.is_admin());
        assert_eq!(session.claims().unwrap().sub, user_id);
        assert_eq!(session.bearer(), Some(format!("Bearer {}", token)));

        session.clear();
        assert!(!session.is_authenticated());
        assert!(session.bearer().is_none());
    }

    #[test]
    fn test_garbage_token_leaves_session_untouched() {
        let (_, token) = token_for(Role::Seller);
        let mut session = Session::new();
        session.set_token(token).unwrap();
        assert!(!session.is_admin());

        assert!(session.set_token("not-a-token".into()).is_err());
        assert!(session.is_authenticated());
    }
}
