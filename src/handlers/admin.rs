use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::auth::AdminUser;
use crate::db::analytics::{self, DashboardStats, PopularService};
use crate::db::queries::{self, BookingFilter, BookingOrder};
use crate::errors::{AppError, AppResult};
use crate::models::availability::parse_date;
use crate::models::{
    BookingStatus, BookingView, PaymentStatus, TherapistAdminView, TherapistStatus, User,
    UserRole,
};
use crate::services::analytics::{self as revenue, RevenuePeriod, RevenueReport};
use crate::state::AppState;

// GET /api/admin/stats
pub async fn stats(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> AppResult<Json<DashboardStats>> {
    let db = state.db()?;
    Ok(Json(analytics::dashboard_stats(&db)?))
}

#[derive(Deserialize)]
pub struct UsersQuery {
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

// GET /api/admin/users
pub async fn users(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(query): Query<UsersQuery>,
) -> AppResult<Json<Vec<User>>> {
    let (limit, skip) = super::page(query.limit, query.skip, 50, 200);
    let db = state.db()?;
    Ok(Json(queries::list_users(&db, query.role, query.is_active, limit, skip)?))
}

#[derive(Deserialize)]
pub struct AdminBookingsQuery {
    pub status: Option<BookingStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

// GET /api/admin/bookings
pub async fn bookings(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(query): Query<AdminBookingsQuery>,
) -> AppResult<Json<Vec<BookingView>>> {
    let date_from = query.date_from.as_deref().map(parse_date).transpose()?;
    let date_to = query.date_to.as_deref().map(parse_date).transpose()?;
    let (limit, skip) = super::page(query.limit, query.skip, 50, 200);

    let db = state.db()?;
    let bookings = queries::list_bookings(
        &db,
        &BookingFilter {
            status: query.status,
            payment_status: query.payment_status,
            date_from,
            date_to,
            order: BookingOrder::CreatedDesc,
            limit,
            skip,
            ..Default::default()
        },
    )?;
    Ok(Json(bookings))
}

#[derive(Deserialize)]
pub struct TherapistsQuery {
    pub status: Option<TherapistStatus>,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

// GET /api/admin/therapists
pub async fn therapists(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(query): Query<TherapistsQuery>,
) -> AppResult<Json<Vec<TherapistAdminView>>> {
    let (limit, skip) = super::page(query.limit, query.skip, 50, 200);
    let db = state.db()?;
    Ok(Json(queries::list_therapists_admin(&db, query.status, limit, skip)?))
}

fn set_active(state: &AppState, admin: &User, id: &str, active: bool) -> AppResult<()> {
    let db = state.db()?;
    if !queries::set_user_active(&db, id, active)? {
        return Err(AppError::not_found("User not found"));
    }
    tracing::info!(user_id = id, admin_id = %admin.id, active, "user activation changed");
    Ok(())
}

// PUT /api/admin/users/:id/activate
pub async fn activate_user(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    set_active(&state, &admin, &id, true)?;
    Ok(super::message("User activated successfully"))
}

// PUT /api/admin/users/:id/deactivate
pub async fn deactivate_user(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    set_active(&state, &admin, &id, false)?;
    Ok(super::message("User deactivated successfully"))
}

#[derive(Deserialize)]
pub struct TherapistStatusRequest {
    pub status: TherapistStatus,
    pub notes: Option<String>,
}

// PUT /api/admin/therapists/:id/status
pub async fn update_therapist_status(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    Json(req): Json<TherapistStatusRequest>,
) -> AppResult<Json<Value>> {
    let db = state.db()?;
    if !queries::update_therapist_status(&db, &id, req.status, req.notes.as_deref())? {
        return Err(AppError::not_found("Therapist not found"));
    }
    tracing::info!(
        therapist_id = %id,
        status = req.status.as_str(),
        admin_id = %admin.id,
        "therapist status updated"
    );
    Ok(super::message("Therapist status updated successfully"))
}

#[derive(Deserialize)]
pub struct RevenueQuery {
    pub period: Option<String>,
}

// GET /api/admin/analytics/revenue?period=month
pub async fn revenue_analytics(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(query): Query<RevenueQuery>,
) -> AppResult<Json<RevenueReport>> {
    let period = RevenuePeriod::parse(query.period.as_deref().unwrap_or("month"))?;
    let db = state.db()?;
    let report = revenue::revenue_report(&db, period, chrono::Utc::now().naive_utc())?;
    Ok(Json(report))
}

#[derive(Deserialize)]
pub struct PopularQuery {
    pub limit: Option<i64>,
}

// GET /api/admin/analytics/popular-services
pub async fn popular_services(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(query): Query<PopularQuery>,
) -> AppResult<Json<Vec<PopularService>>> {
    let (limit, _) = super::page(query.limit, None, 10, 50);
    let db = state.db()?;
    Ok(Json(analytics::popular_services(&db, limit)?))
}
