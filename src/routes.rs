use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health))
        // auth
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route(
            "/auth/me",
            get(handlers::auth::me).put(handlers::auth::update_me),
        )
        // therapist directory
        .route("/therapists", get(handlers::therapists::search))
        .route("/therapists/apply", post(handlers::therapists::apply))
        .route("/therapists/:id", get(handlers::therapists::get_therapist))
        .route("/therapists/:id/reviews", get(handlers::therapists::reviews))
        .route(
            "/therapists/:id/availability",
            get(handlers::therapists::availability),
        )
        // bookings
        .route("/bookings", post(handlers::bookings::create))
        .route("/bookings/my-bookings", get(handlers::bookings::my_bookings))
        .route(
            "/bookings/therapist-bookings",
            get(handlers::bookings::therapist_bookings),
        )
        .route("/bookings/:id", get(handlers::bookings::get_booking))
        .route("/bookings/:id/confirm", put(handlers::bookings::confirm))
        .route("/bookings/:id/cancel", put(handlers::bookings::cancel))
        .route("/bookings/:id/complete", put(handlers::bookings::complete))
        .route("/bookings/:id/review", post(handlers::bookings::review))
        // payments
        .route(
            "/payments/create-payment-intent",
            post(handlers::payments::create_payment_intent),
        )
        .route("/payments/webhook", post(handlers::payments::webhook))
        .route(
            "/payments/booking/:id/status",
            get(handlers::payments::payment_status),
        )
        .route("/payments/refund/:id", post(handlers::payments::refund))
        // service catalog
        .route(
            "/services",
            get(handlers::catalog::list).post(handlers::catalog::create),
        )
        .route(
            "/services/:id",
            get(handlers::catalog::get_service)
                .put(handlers::catalog::update)
                .delete(handlers::catalog::delete),
        )
        // admin
        .route("/admin/stats", get(handlers::admin::stats))
        .route("/admin/users", get(handlers::admin::users))
        .route(
            "/admin/users/:id/activate",
            put(handlers::admin::activate_user),
        )
        .route(
            "/admin/users/:id/deactivate",
            put(handlers::admin::deactivate_user),
        )
        .route("/admin/bookings", get(handlers::admin::bookings))
        .route("/admin/therapists", get(handlers::admin::therapists))
        .route(
            "/admin/therapists/:id/status",
            put(handlers::admin::update_therapist_status),
        )
        .route("/admin/applications", get(handlers::applications::list))
        .route(
            "/admin/applications/:id/approve",
            put(handlers::applications::approve),
        )
        .route(
            "/admin/applications/:id/reject",
            put(handlers::applications::reject),
        )
        .route(
            "/admin/analytics/revenue",
            get(handlers::admin::revenue_analytics),
        )
        .route(
            "/admin/analytics/popular-services",
            get(handlers::admin::popular_services),
        );

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
