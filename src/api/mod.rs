//! API handlers for Libris REST endpoints

pub mod books;
pub mod borrowings;
pub mod health;
pub mod openapi;
pub mod users;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Books
        .route("/book", post(books::create_book))
        .route("/book", put(books::update_book))
        .route("/book/:id", get(books::get_book))
        .route("/book/:id", delete(books::delete_book))
        // Users
        .route("/user", post(users::create_user))
        .route("/user", put(users::update_user))
        .route("/user/:id", get(users::get_user))
        .route("/user/:id", delete(users::delete_user))
        // Borrowings
        .route("/borrowing/borrow", post(borrowings::borrow))
        .route("/borrowing/return/:id", delete(borrowings::return_book))
        .with_state(state);

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    Router::new()
        .nest("/api", api)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
