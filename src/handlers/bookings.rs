use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::Value;

use crate::auth::AuthUser;
use crate::db::queries::{self, BookingFilter, BookingOrder};
use crate::errors::{AppError, AppResult};
use crate::models::availability::{parse_date, parse_time};
use crate::models::review::average_rating;
use crate::models::{
    Booking, BookingStatus, BookingView, NewReview, PaymentStatus, Review, Therapist, User,
    UserRole,
};
use crate::services::notifications::{self, BookingNotice};
use crate::services::scheduling;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub therapist_id: String,
    pub service_id: String,
    pub appointment_date: String,
    pub appointment_time: String,
    pub duration_minutes: i32,
    pub location_address: String,
    pub location_city: String,
    pub location_state: String,
    pub location_zip: String,
    pub special_requests: Option<String>,
}

// POST /api/bookings
pub async fn create(
    State(state): State<Arc<AppState>>,
    AuthUser(client): AuthUser,
    Json(req): Json<CreateBookingRequest>,
) -> AppResult<Json<BookingView>> {
    let date = parse_date(&req.appointment_date)?;
    let time = parse_time(&req.appointment_time)?;
    if req.duration_minutes <= 0 {
        return Err(AppError::invalid("duration_minutes must be positive"));
    }

    let (view, notice) = {
        let db = state.db()?;
        let therapist = queries::get_therapist(&db, &req.therapist_id)?
            .filter(Therapist::is_bookable)
            .ok_or_else(|| AppError::not_found("Therapist not found or unavailable"))?;
        let service = queries::get_service(&db, &req.service_id)?
            .ok_or_else(|| AppError::not_found("Service not found"))?;

        scheduling::check_slot_free(&db, &therapist.id, &date, &time, None)?;

        let now = chrono::Utc::now().naive_utc();
        let booking = Booking {
            id: uuid::Uuid::new_v4().to_string(),
            client_id: client.id.clone(),
            therapist_id: therapist.id.clone(),
            service_id: service.id.clone(),
            appointment_date: date,
            appointment_time: time,
            duration_minutes: req.duration_minutes,
            location_address: req.location_address,
            location_city: req.location_city,
            location_state: req.location_state,
            location_zip: req.location_zip,
            special_requests: req.special_requests,
            status: BookingStatus::Pending,
            total_amount: scheduling::booking_amount(service.base_price, req.duration_minutes),
            payment_status: PaymentStatus::Pending,
            payment_intent_id: None,
            cancellation_reason: None,
            completed_at: None,
            therapist_notes: None,
            created_at: now,
            updated_at: now,
        };
        queries::insert_booking(&db, &booking)?;

        let therapist_user = queries::get_user(&db, &therapist.user_id)?;
        let view = BookingView {
            booking: booking.clone(),
            therapist_name: therapist_user.as_ref().map(|u| u.full_name.clone()),
            service_name: Some(service.name.clone()),
            client_name: Some(client.full_name.clone()),
            client_email: Some(client.email.clone()),
        };
        let notice = BookingNotice {
            booking,
            client,
            therapist: therapist_user,
            service_name: service.name,
        };
        (view, notice)
    };

    tracing::info!(
        booking_id = %view.booking.id,
        therapist_id = %view.booking.therapist_id,
        date = %view.booking.appointment_date,
        "booking created"
    );
    notifications::notify_booking_created(&state, &notice).await;

    Ok(Json(view))
}

#[derive(Deserialize)]
pub struct BookingListQuery {
    pub status: Option<BookingStatus>,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

// GET /api/bookings/my-bookings
pub async fn my_bookings(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(query): Query<BookingListQuery>,
) -> AppResult<Json<Vec<BookingView>>> {
    let (limit, skip) = super::page(query.limit, query.skip, 20, 100);
    let db = state.db()?;
    let bookings = queries::list_bookings(
        &db,
        &BookingFilter {
            client_id: Some(user.id),
            status: query.status,
            order: BookingOrder::AppointmentDesc,
            limit,
            skip,
            ..Default::default()
        },
    )?;
    Ok(Json(bookings))
}

/// The caller's therapist profile; callers without the therapist role are refused.
fn own_profile(conn: &Connection, user: &User) -> AppResult<Therapist> {
    if user.role != UserRole::Therapist {
        return Err(AppError::forbidden("therapist access required"));
    }
    queries::get_therapist_by_user(conn, &user.id)?
        .ok_or_else(|| AppError::not_found("Therapist profile not found"))
}

// GET /api/bookings/therapist-bookings
pub async fn therapist_bookings(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(query): Query<BookingListQuery>,
) -> AppResult<Json<Vec<BookingView>>> {
    let (limit, skip) = super::page(query.limit, query.skip, 20, 100);
    let db = state.db()?;
    let therapist = own_profile(&db, &user)?;
    let bookings = queries::list_bookings(
        &db,
        &BookingFilter {
            therapist_id: Some(therapist.id),
            status: query.status,
            order: BookingOrder::AppointmentDesc,
            limit,
            skip,
            ..Default::default()
        },
    )?;
    Ok(Json(bookings))
}

fn is_assigned_therapist(conn: &Connection, user: &User, booking: &Booking) -> AppResult<bool> {
    if user.role != UserRole::Therapist {
        return Ok(false);
    }
    Ok(queries::get_therapist_by_user(conn, &user.id)?
        .is_some_and(|t| t.id == booking.therapist_id))
}

// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<BookingView>> {
    let db = state.db()?;
    let view = queries::get_booking_view(&db, &id)?
        .ok_or_else(|| AppError::not_found("Booking not found"))?;

    let allowed = view.booking.client_id == user.id
        || user.is_admin()
        || is_assigned_therapist(&db, &user, &view.booking)?;
    if !allowed {
        return Err(AppError::forbidden("Not authorized to view this booking"));
    }
    Ok(Json(view))
}

/// A booking assigned to the calling therapist; anything else is not found.
fn own_assigned_booking(conn: &Connection, user: &User, id: &str) -> AppResult<Booking> {
    let therapist = own_profile(conn, user)?;
    queries::get_booking(conn, id)?
        .filter(|b| b.therapist_id == therapist.id)
        .ok_or_else(|| AppError::not_found("Booking not found"))
}

// PUT /api/bookings/:id/confirm
pub async fn confirm(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let db = state.db()?;
    let booking = own_assigned_booking(&db, &user, &id)?;
    if !booking.status.can_confirm() {
        return Err(AppError::conflict(format!(
            "Booking cannot be confirmed from status {}",
            booking.status.as_str()
        )));
    }
    scheduling::check_slot_free(
        &db,
        &booking.therapist_id,
        &booking.appointment_date,
        &booking.appointment_time,
        Some(&booking.id),
    )?;

    queries::update_booking_status(&db, &booking.id, BookingStatus::Confirmed)?;
    tracing::info!(booking_id = %booking.id, "booking confirmed");
    Ok(super::message("Booking confirmed successfully"))
}

#[derive(Deserialize)]
pub struct CancelQuery {
    pub reason: Option<String>,
}

// PUT /api/bookings/:id/cancel?reason=
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Query(query): Query<CancelQuery>,
) -> AppResult<Json<Value>> {
    let db = state.db()?;
    let booking = queries::get_booking(&db, &id)?
        .ok_or_else(|| AppError::not_found("Booking not found"))?;

    let allowed = booking.client_id == user.id
        || user.is_admin()
        || is_assigned_therapist(&db, &user, &booking)?;
    if !allowed {
        return Err(AppError::forbidden("Not authorized to cancel this booking"));
    }
    if !booking.status.can_cancel() {
        return Err(AppError::conflict(format!(
            "Booking cannot be cancelled from status {}",
            booking.status.as_str()
        )));
    }

    queries::cancel_booking(&db, &booking.id, query.reason.as_deref())?;
    tracing::info!(booking_id = %booking.id, cancelled_by = %user.id, "booking cancelled");
    Ok(super::message("Booking cancelled successfully"))
}

#[derive(Deserialize)]
pub struct CompleteQuery {
    pub notes: Option<String>,
}

// PUT /api/bookings/:id/complete?notes=
pub async fn complete(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Query(query): Query<CompleteQuery>,
) -> AppResult<Json<Value>> {
    let db = state.db()?;
    let booking = own_assigned_booking(&db, &user, &id)?;
    if !booking.status.can_complete() {
        return Err(AppError::conflict(
            "Booking must be confirmed before completion",
        ));
    }

    let notes = query.notes.as_deref().filter(|n| !n.trim().is_empty());
    queries::complete_booking(&db, &booking.id, notes)?;
    queries::increment_therapist_bookings(&db, &booking.therapist_id)?;

    tracing::info!(booking_id = %booking.id, "booking completed");
    Ok(super::message("Booking marked as completed"))
}

// POST /api/bookings/:id/review
pub async fn review(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(new): Json<NewReview>,
) -> AppResult<Json<Review>> {
    new.validate()?;

    let db = state.db()?;
    let booking = queries::get_booking(&db, &id)?
        .filter(|b| b.client_id == user.id)
        .ok_or_else(|| AppError::not_found("Booking not found"))?;
    if booking.status != BookingStatus::Completed {
        return Err(AppError::conflict("Can only review completed bookings"));
    }
    if queries::review_exists_for_booking(&db, &booking.id)? {
        return Err(AppError::conflict("Review already exists for this booking"));
    }

    let review = Review {
        id: uuid::Uuid::new_v4().to_string(),
        booking_id: booking.id.clone(),
        client_id: user.id.clone(),
        therapist_id: booking.therapist_id.clone(),
        rating: new.rating,
        comment: new.comment,
        is_verified: true,
        helpful_count: 0,
        created_at: chrono::Utc::now().naive_utc(),
    };
    queries::insert_review(&db, &review)?;

    let ratings = queries::ratings_for_therapist(&db, &booking.therapist_id)?;
    let rating = average_rating(&ratings);
    queries::update_therapist_rating(&db, &booking.therapist_id, rating, ratings.len() as i64)?;

    tracing::info!(
        booking_id = %booking.id,
        therapist_id = %booking.therapist_id,
        rating,
        "review recorded"
    );
    Ok(Json(review))
}
