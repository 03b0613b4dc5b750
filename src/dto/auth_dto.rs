use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::Role;
use crate::utils::validation::{validate_password_strength, PHONE_RE};

// Request para registrar un usuario
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 100, message = "name must have between 2 and 100 characters"))]
    pub name: String,

    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,

    #[validate(custom = "validate_password_strength")]
    pub password: String,

    #[validate(regex(path = "PHONE_RE", message = "phone must contain only digits, spaces and ()+-"))]
    pub phone: Option<String>,

    pub role: Option<Role>,
}

// Login request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

// Login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(password: &str, phone: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            name: "Maria Santos".into(),
            email: "maria@autoconnect.com".into(),
            password: password.into(),
            phone: phone.map(String::from),
            role: None,
        }
    }

    #[test]
    fn test_register_validation() {
        assert!(register("Maria123!", Some("(11) 98888-8888")).validate().is_ok());
        assert!(register("maria123", None).validate().is_err());
        assert!(register("Maria123!", Some("not a phone")).validate().is_err());

        let mut short_name = register("Maria123!", None);
        short_name.name = "M".into();
        let errors = short_name.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn test_login_requires_valid_email() {
        let request = LoginRequest {
            email: "admin".into(),
            password: "Admin123!".into(),
        };
        assert!(request.validate().is_err());
    }
}
