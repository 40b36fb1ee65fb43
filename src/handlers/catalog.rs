use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::auth::AdminUser;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::service::slugify;
use crate::models::{NewService, Service, ServiceUpdate};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ServicesQuery {
    pub category: Option<String>,
    pub is_active: Option<bool>,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

// GET /api/services
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ServicesQuery>,
) -> AppResult<Json<Vec<Service>>> {
    let (limit, skip) = super::page(query.limit, query.skip, 50, 100);
    let db = state.db()?;
    let services = queries::list_services(
        &db,
        query.category.as_deref(),
        query.is_active.unwrap_or(true),
        limit,
        skip,
    )?;
    Ok(Json(services))
}

// GET /api/services/:id
pub async fn get_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<Service>> {
    let db = state.db()?;
    queries::get_service(&db, &id)?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Service not found"))
}

// POST /api/services
pub async fn create(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Json(new): Json<NewService>,
) -> AppResult<Json<Service>> {
    let db = state.db()?;

    let mut id = slugify(&new.name);
    if id.is_empty() || queries::get_service(&db, &id)?.is_some() {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        id = format!("{id}-{}", &suffix[..8]).trim_start_matches('-').to_string();
    }

    let service = Service::create(id, new);
    service.validate()?;
    queries::insert_service(&db, &service)?;

    tracing::info!(service_id = %service.id, admin_id = %admin.id, "service created");
    Ok(Json(service))
}

// PUT /api/services/:id
pub async fn update(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    Json(update): Json<ServiceUpdate>,
) -> AppResult<Json<Service>> {
    let db = state.db()?;
    let mut service = queries::get_service(&db, &id)?
        .ok_or_else(|| AppError::not_found("Service not found"))?;

    if service.apply(update) {
        service.validate()?;
        queries::save_service(&db, &service)?;
        tracing::info!(service_id = %service.id, admin_id = %admin.id, "service updated");
    }
    Ok(Json(service))
}

// DELETE /api/services/:id
pub async fn delete(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let db = state.db()?;
    let mut service = queries::get_service(&db, &id)?
        .ok_or_else(|| AppError::not_found("Service not found"))?;

    service.apply(ServiceUpdate {
        is_active: Some(false),
        ..Default::default()
    });
    queries::save_service(&db, &service)?;

    tracing::info!(service_id = %service.id, admin_id = %admin.id, "service deactivated");
    Ok(super::message("Service deleted successfully"))
}
