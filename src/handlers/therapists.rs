use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::Page;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::availability::parse_date;
use crate::models::{
    ApplicationDetails, Availability, ReviewView, TherapistApplication, TherapistPublic,
    TherapistSearch,
};
use crate::services::{notifications, scheduling};
use crate::state::AppState;

// GET /api/therapists
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(search): Query<TherapistSearch>,
) -> AppResult<Json<Vec<TherapistPublic>>> {
    let (limit, skip) = super::page(search.limit, search.skip, 20, 100);
    let db = state.db()?;
    let therapists = queries::search_therapists(&db, &search, limit, skip)?;
    Ok(Json(therapists))
}

// GET /api/therapists/:id
pub async fn get_therapist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<TherapistPublic>> {
    let db = state.db()?;
    queries::get_therapist_public(&db, &id)?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Therapist not found"))
}

// GET /api/therapists/:id/reviews
pub async fn reviews(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(page): Query<Page>,
) -> AppResult<Json<Vec<ReviewView>>> {
    let (limit, skip) = page.resolve(10, 50);
    let db = state.db()?;
    Ok(Json(queries::list_reviews_for_therapist(&db, &id, limit, skip)?))
}

#[derive(Deserialize)]
pub struct AvailabilityQuery {
    pub date: String,
}

// GET /api/therapists/:id/availability?date=YYYY-MM-DD
pub async fn availability(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<Availability>> {
    let date = parse_date(&query.date)?;
    let db = state.db()?;
    Ok(Json(scheduling::therapist_availability(&db, &id, date)?))
}

// POST /api/therapists/apply
pub async fn apply(
    State(state): State<Arc<AppState>>,
    Json(mut details): Json<ApplicationDetails>,
) -> AppResult<Json<Value>> {
    details.validate()?;

    let application = TherapistApplication::submit(details);
    {
        let db = state.db()?;
        if queries::application_exists_for_email(&db, &application.details.email)? {
            return Err(AppError::conflict("Application already exists for this email"));
        }
        queries::insert_application(&db, &application)?;
    }

    tracing::info!(
        application_id = %application.id,
        email = %application.details.email,
        "therapist application submitted"
    );
    notifications::notify_application_received(
        &state,
        &application.details.email,
        &application.details.full_name,
    )
    .await;

    Ok(Json(json!({
        "message": "Application submitted successfully",
        "application_id": application.id,
    })))
}
