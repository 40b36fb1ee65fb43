use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{password, AdminUser};
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::application::split_list;
use crate::models::{
    ApplicationStatus, Therapist, TherapistApplication, TherapistStatus, User, UserRole,
};
use crate::state::AppState;

/// Starting hourly rate for a newly approved therapist.
const DEFAULT_HOURLY_RATE: f64 = 120.0;

#[derive(Deserialize)]
pub struct ApplicationsQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

// GET /api/admin/applications
pub async fn list(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(query): Query<ApplicationsQuery>,
) -> AppResult<Json<Vec<TherapistApplication>>> {
    let status = match query.status.as_deref() {
        Some(s) => Some(
            ApplicationStatus::parse(s)
                .ok_or_else(|| AppError::invalid(format!("unknown application status: {s}")))?,
        ),
        None => None,
    };
    let (limit, skip) = super::page(query.limit, query.skip, 20, 100);

    let db = state.db()?;
    Ok(Json(queries::list_applications(&db, status, limit, skip)?))
}

fn therapist_from_application(user_id: &str, app: &TherapistApplication) -> Therapist {
    let now = chrono::Utc::now().naive_utc();
    let d = &app.details;
    Therapist {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        specialties: split_list(&d.specialties),
        certifications: split_list(&d.certifications),
        languages: split_list(&d.languages),
        service_areas: split_list(&d.service_areas),
        experience_years: d.experience_years,
        bio: None,
        hourly_rate: DEFAULT_HOURLY_RATE,
        status: TherapistStatus::Approved,
        rating: 0.0,
        reviews_count: 0,
        total_bookings: 0,
        profile_image: None,
        gallery_images: vec![],
        is_available: true,
        admin_notes: None,
        created_at: now,
        updated_at: now,
    }
}

// PUT /api/admin/applications/:id/approve
pub async fn approve(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let temp_password = password::temporary_password();
    let hash =
        password::hash_password_async(temp_password.clone(), state.config.bcrypt_cost).await?;

    let db = state.db()?;
    let app = queries::get_application(&db, &id)?
        .ok_or_else(|| AppError::not_found("Application not found"))?;
    if app.status != ApplicationStatus::Pending {
        return Err(AppError::conflict(format!(
            "Application already {}",
            app.status.as_str()
        )));
    }
    if queries::get_user_by_email(&db, &app.details.email)?.is_some() {
        return Err(AppError::conflict("A user with this email already exists"));
    }
    if queries::get_user_by_phone(&db, &app.details.phone)?.is_some() {
        return Err(AppError::conflict("A user with this phone already exists"));
    }

    let d = &app.details;
    let user = User {
        address: Some(d.address.clone()),
        city: Some(d.city.clone()),
        state: Some(d.state.clone()),
        zip_code: Some(d.zip_code.clone()),
        ..User::new(&d.email, &d.full_name, &d.phone, UserRole::Therapist, hash)
    };
    queries::insert_user(&db, &user)?;

    let therapist = therapist_from_application(&user.id, &app);
    queries::insert_therapist(&db, &therapist)?;
    queries::review_application(
        &db,
        &app.id,
        ApplicationStatus::Approved,
        &admin.id,
        "Application approved and therapist account created",
    )?;

    tracing::info!(
        application_id = %app.id,
        therapist_id = %therapist.id,
        admin_id = %admin.id,
        "therapist application approved"
    );

    Ok(Json(json!({
        "message": "Application approved successfully",
        "temp_password": temp_password,
        "user_id": user.id,
        "therapist_id": therapist.id,
    })))
}

#[derive(Deserialize)]
pub struct RejectQuery {
    pub reason: Option<String>,
}

// PUT /api/admin/applications/:id/reject?reason=
pub async fn reject(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    Query(query): Query<RejectQuery>,
) -> AppResult<Json<Value>> {
    let db = state.db()?;
    let app = queries::get_application(&db, &id)?
        .ok_or_else(|| AppError::not_found("Application not found"))?;
    if app.status != ApplicationStatus::Pending {
        return Err(AppError::conflict(format!(
            "Application already {}",
            app.status.as_str()
        )));
    }

    let reason = query.reason.unwrap_or_default();
    queries::review_application(&db, &app.id, ApplicationStatus::Rejected, &admin.id, &reason)?;
    tracing::info!(application_id = %app.id, admin_id = %admin.id, "therapist application rejected");

    Ok(super::message("Application rejected successfully"))
}
