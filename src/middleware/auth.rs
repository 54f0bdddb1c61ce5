use axum::extract::FromRequestParts;

use crate::{
    error::AppError,
    models::{Role, User},
    state::AppState,
};

/// The user recorded under `current_user`.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

pub fn ensure_role(user: &AuthUser, role: Role) -> Result<(), AppError> {
    if user.0.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, Role::Admin)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        _parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        state
            .auth
            .current_user()
            .map(AuthUser)
            .ok_or(AppError::Forbidden)
    }
}
