//! Axum route handlers for account registration and login.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::password::{hash_password_blocking, verify_password_blocking, MIN_PASSWORD_LEN};
use crate::auth::store;
use crate::auth::token::{issue_token, AuthUser};
use crate::errors::AppError;
use crate::models::user::UserProfile;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub success: bool,
    pub user: UserProfile,
}

/// Emails are compared case-insensitively.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Checks a registration body and returns the normalized email and name.
fn validate_registration(request: &RegisterRequest) -> Result<(String, String), AppError> {
    let email = normalize_email(&request.email);
    let well_formed = email
        .split_once('@')
        .map(|(local, domain)| !local.is_empty() && domain.contains('.'))
        .unwrap_or(false);
    if !well_formed {
        return Err(AppError::Validation("email is not a valid address".to_string()));
    }
    if request.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }
    Ok((email, name.to_string()))
}

/// POST /api/v1/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let (email, name) = validate_registration(&request)?;

    if store::find_by_email(&state.db, &email).await?.is_some() {
        return Err(AppError::Conflict(format!("{email} is already registered")));
    }

    let password_hash = hash_password_blocking(request.password).await?;
    let id = match store::create_user(&state.db, &email, &name, &password_hash).await {
        Ok(id) => id,
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Err(AppError::Conflict(format!("{email} is already registered")));
        }
        Err(e) => return Err(e.into()),
    };

    let token = issue_token(id, &email, &state.config.jwt_secret, state.config.jwt_ttl_hours)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            token,
            user: UserProfile { id, email, name },
        }),
    ))
}

/// POST /api/v1/auth/login
///
/// Unknown email and wrong password produce the same error.
pub async fn handle_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let email = normalize_email(&request.email);
    let user = store::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password_blocking(request.password, user.password_hash.clone()).await? {
        return Err(invalid());
    }

    info!("User {} logged in", user.id);
    let token = issue_token(
        user.id,
        &user.email,
        &state.config.jwt_secret,
        state.config.jwt_ttl_hours,
    )?;
    Ok(Json(AuthResponse {
        success: true,
        token,
        user: UserProfile::from(&user),
    }))
}

/// GET /api/v1/auth/me
pub async fn handle_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<MeResponse>, AppError> {
    let row = store::find_by_id(&state.db, user.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))?;
    Ok(Json(MeResponse {
        success: true,
        user: UserProfile::from(&row),
    }))
}
