use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{dto::auth::Claims, error::AppError};

pub const ROLE_CUSTOMER: &str = "customer";
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_CASHIER: &str = "cashier";
pub const ROLE_COURIER: &str = "courier";
pub const ROLE_KITCHEN: &str = "kitchen";

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: String,
}

pub fn ensure_role(user: &AuthUser, role: &str) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_any_role(user: &AuthUser, roles: &[&str]) -> Result<(), AppError> {
    if !roles.contains(&user.role.as_str()) {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, ROLE_ADMIN)
}

pub fn ensure_cashier(user: &AuthUser) -> Result<(), AppError> {
    ensure_any_role(user, &[ROLE_CASHIER, ROLE_ADMIN])
}

pub fn ensure_courier(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, ROLE_COURIER)
}

/// Back-office staff: everyone who works the order board.
pub fn ensure_staff(user: &AuthUser) -> Result<(), AppError> {
    ensure_any_role(user, &[ROLE_ADMIN, ROLE_CASHIER, ROLE_KITCHEN])
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AppError::Unauthorized)?;

        let auth_str = auth_header.to_str().map_err(|_| AppError::Unauthorized)?;

        if !auth_str.starts_with("Bearer ") {
            return Err(AppError::Unauthorized);
        }
        let token = auth_str.trim_start_matches("Bearer ").trim();

        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::Unauthorized)?;

        let user_id = Uuid::parse_str(&decoded.claims.sub)
            .map_err(|_| AppError::Unauthorized)?;

        Ok(AuthUser {
            user_id,
            role: decoded.claims.role.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: &str) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            role: role.to_string(),
        }
    }

    #[test]
    fn admin_passes_cashier_guard() {
        assert!(ensure_cashier(&user(ROLE_ADMIN)).is_ok());
        assert!(ensure_cashier(&user(ROLE_CASHIER)).is_ok());
        assert!(ensure_cashier(&user(ROLE_CUSTOMER)).is_err());
    }

    #[test]
    fn staff_guard_rejects_customers_and_couriers() {
        assert!(ensure_staff(&user(ROLE_KITCHEN)).is_ok());
        assert!(ensure_staff(&user(ROLE_CUSTOMER)).is_err());
        assert!(ensure_staff(&user(ROLE_COURIER)).is_err());
    }
}
