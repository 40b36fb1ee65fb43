use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::{jwt, password, AuthUser};
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::{User, UserRole, UserUpdate};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub full_name: String,
    pub phone: String,
    pub password: String,
}

impl RegisterRequest {
    fn validate(&self) -> AppResult<()> {
        if !self.email.contains('@') {
            return Err(AppError::invalid("a valid email is required"));
        }
        if self.full_name.trim().is_empty() {
            return Err(AppError::invalid("full_name is required"));
        }
        if self.phone.trim().is_empty() {
            return Err(AppError::invalid("phone is required"));
        }
        password::validate_password_strength(&self.password)
    }
}

// POST /api/auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<User>> {
    req.validate()?;
    let hash = password::hash_password_async(req.password.clone(), state.config.bcrypt_cost).await?;
    let user = User::new(&req.email, &req.full_name, &req.phone, UserRole::Client, hash);

    {
        let db = state.db()?;
        if queries::get_user_by_email(&db, &user.email)?.is_some() {
            return Err(AppError::conflict("Email already registered"));
        }
        if queries::get_user_by_phone(&db, &user.phone)?.is_some() {
            return Err(AppError::conflict("Phone number already registered"));
        }
        queries::insert_user(&db, &user)?;
    }

    tracing::info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(Json(user))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let user = {
        let db = state.db()?;
        queries::get_user_by_email(&db, &req.email)?
    };

    let verified = match &user {
        Some(u) => {
            password::verify_password_async(req.password.clone(), u.password_hash.clone()).await?
        }
        None => false,
    };
    let user = match user {
        Some(u) if verified => u,
        _ => {
            tracing::info!(email = %req.email.trim().to_lowercase(), "failed login");
            return Err(AppError::Unauthorized("Incorrect email or password".to_string()));
        }
    };
    if !user.is_active {
        return Err(AppError::forbidden("Inactive user account"));
    }

    let access_token = jwt::issue_token(
        &user,
        &state.config.jwt_secret,
        state.config.token_ttl_minutes,
    )?;
    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}

// GET /api/auth/me
pub async fn me(AuthUser(user): AuthUser) -> Json<User> {
    Json(user)
}

// PUT /api/auth/me
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    AuthUser(mut user): AuthUser,
    Json(update): Json<UserUpdate>,
) -> AppResult<Json<User>> {
    if let Some(name) = &update.full_name {
        if name.trim().is_empty() {
            return Err(AppError::invalid("full_name cannot be empty"));
        }
    }
    if let Some(phone) = &update.phone {
        if phone.trim().is_empty() {
            return Err(AppError::invalid("phone cannot be empty"));
        }
    }

    let db = state.db()?;
    if let Some(phone) = &update.phone {
        if let Some(holder) = queries::get_user_by_phone(&db, phone)? {
            if holder.id != user.id {
                return Err(AppError::conflict("Phone number already registered"));
            }
        }
    }

    if user.apply(update) {
        queries::save_user_profile(&db, &user)?;
        tracing::info!(user_id = %user.id, "profile updated");
    }
    Ok(Json(user))
}
