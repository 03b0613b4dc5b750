//! Middleware de autenticación JWT
//!
//! Este módulo maneja la extracción del bearer token, la verificación de los
//! claims y los guards por rol que se aplican a cada ruta.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
    Extension,
};

use crate::{
    models::{auth::AuthenticatedUser, user::Role},
    state::AppState,
    utils::{errors::AppError, jwt::extract_token_from_header},
};

/// Middleware de autenticación JWT
///
/// Inyecta `AuthenticatedUser` en las extensions; sin token válido la request
/// termina en 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Extraer token del header Authorization
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Authorization token required".to_string()))?;

    let token = extract_token_from_header(auth_header)?;
    let claims = state.jwt.validate_token(token)?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser::from(claims));

    Ok(next.run(request).await)
}

/// Verifica que el usuario tenga uno de los roles permitidos
pub fn ensure_role(user: &AuthenticatedUser, allowed: &[Role]) -> Result<(), AppError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "Role {} is not allowed to perform this action",
            user.role.as_str()
        )))
    }
}

/// Middleware para verificar permisos de admin; va siempre después de `auth_middleware`
pub async fn admin_only_middleware(
    user: Option<Extension<AuthenticatedUser>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(Extension(user)) = user else {
        return Err(AppError::Unauthorized("Authorization token required".to_string()));
    };
    ensure_role(&user, &[Role::Admin])?;

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_ensure_role() {
        let seller = AuthenticatedUser {
            user_id: Uuid::new_v4(),
            role: Role::Seller,
            email: "joao@autoconnect.com".into(),
        };
        assert!(matches!(ensure_role(&seller, &[Role::Admin]), Err(AppError::Forbidden(_))));
        assert!(ensure_role(&seller, &[Role::Admin, Role::Seller]).is_ok());
    }
}
