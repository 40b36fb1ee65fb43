use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::AuthUser;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::{BookingStatus, PaymentStatus};
use crate::services::payments::webhook::{self, WebhookEvent};
use crate::services::payments::{to_minor_units, IntentRequest};
use crate::services::scheduling::{self, SchedulingError};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateIntentRequest {
    pub booking_id: String,
    pub currency: Option<String>,
}

// POST /api/payments/create-payment-intent
pub async fn create_payment_intent(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(req): Json<CreateIntentRequest>,
) -> AppResult<Json<Value>> {
    let booking = {
        let db = state.db()?;
        queries::get_booking(&db, &req.booking_id)?
    }
    .filter(|b| b.client_id == user.id)
    .ok_or_else(|| AppError::not_found("Booking not found"))?;

    if booking.payment_status == PaymentStatus::Paid {
        return Err(AppError::conflict("Booking already paid"));
    }
    if booking.status == BookingStatus::Cancelled {
        return Err(AppError::conflict("Booking is cancelled"));
    }

    let currency = req
        .currency
        .unwrap_or_else(|| state.config.default_currency.clone())
        .to_lowercase();
    let intent_req = IntentRequest {
        amount_minor: to_minor_units(booking.total_amount, &currency),
        currency,
        metadata: vec![
            ("booking_id".to_string(), booking.id.clone()),
            ("client_id".to_string(), user.id.clone()),
            ("client_email".to_string(), user.email.clone()),
        ],
    };

    let intent = state.payments.create_payment_intent(&intent_req).await?;

    {
        let db = state.db()?;
        queries::set_payment_intent(&db, &booking.id, &intent.id)?;
    }
    tracing::info!(booking_id = %booking.id, payment_intent_id = %intent.id, "payment intent attached");

    Ok(Json(json!({
        "client_secret": intent.client_secret,
        "payment_intent_id": intent.id,
    })))
}

// POST /api/payments/webhook
pub async fn webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<Value>> {
    let secret = &state.config.stripe_webhook_secret;
    if !secret.is_empty() {
        let signature = headers
            .get("stripe-signature")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if let Err(e) = webhook::verify_signature(secret, &body, signature, chrono::Utc::now().timestamp()) {
            tracing::warn!("invalid Stripe webhook signature");
            return Err(e);
        }
    }

    let event = webhook::parse_event(&body).map_err(|e| {
        tracing::warn!(error = %e, "invalid Stripe webhook payload");
        e
    })?;

    let db = state.db()?;
    match event {
        WebhookEvent::PaymentSucceeded { intent_id, booking_id } => {
            let Some(booking) = queries::get_booking(&db, &booking_id)? else {
                tracing::warn!(%booking_id, %intent_id, "payment succeeded for unknown booking");
                return Ok(Json(json!({ "status": "success" })));
            };
            queries::update_payment_status(&db, &booking.id, PaymentStatus::Paid)?;

            if booking.status == BookingStatus::Pending {
                match scheduling::check_slot_free(
                    &db,
                    &booking.therapist_id,
                    &booking.appointment_date,
                    &booking.appointment_time,
                    Some(&booking.id),
                ) {
                    Ok(()) => {
                        queries::update_booking_status(&db, &booking.id, BookingStatus::Confirmed)?;
                    }
                    Err(SchedulingError::SlotTaken { .. }) => {
                        tracing::warn!(
                            %booking_id,
                            "paid booking left pending, slot already held"
                        );
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            tracing::info!(%booking_id, %intent_id, "payment succeeded");
        }
        WebhookEvent::PaymentFailed { intent_id, booking_id } => {
            queries::update_payment_status(&db, &booking_id, PaymentStatus::Failed)?;
            tracing::info!(%booking_id, %intent_id, "payment failed");
        }
        WebhookEvent::Ignored(kind) => {
            tracing::debug!(event = %kind, "ignoring Stripe event");
        }
    }

    Ok(Json(json!({ "status": "success" })))
}

// GET /api/payments/booking/:id/status
pub async fn payment_status(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let db = state.db()?;
    let booking = queries::get_booking(&db, &id)?
        .filter(|b| b.client_id == user.id)
        .ok_or_else(|| AppError::not_found("Booking not found"))?;

    Ok(Json(json!({
        "booking_id": booking.id,
        "payment_status": booking.payment_status,
        "total_amount": booking.total_amount,
        "payment_intent_id": booking.payment_intent_id,
    })))
}

#[derive(Deserialize)]
pub struct RefundQuery {
    pub reason: Option<String>,
}

// POST /api/payments/refund/:id?reason=
pub async fn refund(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Query(query): Query<RefundQuery>,
) -> AppResult<Json<Value>> {
    let booking = {
        let db = state.db()?;
        queries::get_booking(&db, &id)?
    }
    .ok_or_else(|| AppError::not_found("Booking not found"))?;

    if booking.client_id != user.id && !user.is_admin() {
        return Err(AppError::forbidden("Not authorized to process refund"));
    }
    if booking.payment_status != PaymentStatus::Paid {
        return Err(AppError::conflict("Booking is not paid"));
    }
    if !booking.status.can_cancel() {
        return Err(AppError::conflict(format!(
            "Booking cannot be refunded from status {}",
            booking.status.as_str()
        )));
    }
    let intent_id = booking
        .payment_intent_id
        .as_deref()
        .ok_or_else(|| AppError::conflict("No payment intent found for this booking"))?;

    let refund = state.payments.refund(intent_id).await?;

    {
        let db = state.db()?;
        queries::mark_refunded(&db, &booking.id, query.reason.as_deref())?;
    }
    tracing::info!(booking_id = %booking.id, refund_id = %refund.id, "refund processed");

    Ok(Json(json!({
        "message": "Refund processed successfully",
        "refund_id": refund.id,
        "amount": booking.total_amount,
    })))
}
