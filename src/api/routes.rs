use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::require_session;

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    let session_gate = from_fn_with_state(state.clone(), require_session);

    Router::new()
        .route("/health", get(handlers::health_check))
        // Access gate
        .route("/auth/login", post(handlers::login))
        .route(
            "/auth/logout",
            post(handlers::logout).route_layer(session_gate.clone()),
        )
        .nest("/api/v1", api_routes().route_layer(session_gate))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Routes under /api/v1, all behind an admitted session
fn api_routes() -> Router<AppState> {
    Router::new()
        // Search
        .route("/recommendations", post(handlers::recommend))
        .route("/listings/:id", get(handlers::get_listing))
        .route("/chat", post(handlers::chat))
        // Reservations
        .route(
            "/reservations",
            get(handlers::my_reservations).post(handlers::create_reservation),
        )
        // Admin
        .route("/admin/listings/reload", post(handlers::reload_listings))
        .route("/admin/stats", get(handlers::listing_stats))
        .route(
            "/admin/reservations",
            get(handlers::all_reservations).delete(handlers::reset_reservations),
        )
}
