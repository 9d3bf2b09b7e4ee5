use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        // Outermost so the trace span can see the id
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Profiles
        .route(
            "/profiles",
            get(handlers::list_profiles).post(handlers::create_profile),
        )
        .route(
            "/profiles/:id",
            put(handlers::update_profile).delete(handlers::delete_profile),
        )
        // Session
        .route(
            "/session",
            get(handlers::get_session).delete(handlers::sign_out),
        )
        .route("/session/select", post(handlers::select_profile))
        .route("/session/confirm", post(handlers::confirm_profile))
        .route(
            "/session/keypad",
            post(handlers::key_in).delete(handlers::clear_keypad),
        )
        .route("/session/keypad/backspace", post(handlers::keypad_backspace))
        .route("/session/cancel", post(handlers::cancel_selection))
        .route("/session/manage", post(handlers::sign_out))
        // Catalog
        .route("/browse", get(handlers::browse))
        .route("/search", get(handlers::search))
        .route("/genres", get(handlers::genres))
        .route("/titles/:id", get(handlers::title_details))
        .route("/titles/:id/trailer", get(handlers::title_trailer))
        .route("/watch/:id", get(handlers::watch))
        // Watchlist
        .route(
            "/watchlist",
            get(handlers::get_watchlist).post(handlers::add_to_watchlist),
        )
        .route(
            "/watchlist/:item_id",
            get(handlers::watchlist_entry).delete(handlers::remove_from_watchlist),
        )
}
