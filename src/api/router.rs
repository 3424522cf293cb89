use axum::{
    Router,
    routing::{get, put},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers::{
    AppState, create_book, create_loan, create_member, delete_book, delete_member, get_book,
    get_loan, get_member, get_stats, health_check, list_books, list_loans, list_members,
    return_loan, update_book, update_member,
};

/// Creates the API router; every endpoint lives under `/api`
///
/// - /health
/// - /books, /books/:id
/// - /members, /members/:id
/// - /loans, /loans/:id, /loans/:id/return
/// - /stats
pub fn create_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/health", get(health_check))
        .route("/books", get(list_books).post(create_book))
        .route(
            "/books/:id",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route("/members", get(list_members).post(create_member))
        .route(
            "/members/:id",
            get(get_member).put(update_member).delete(delete_member),
        )
        .route("/loans", get(list_loans).post(create_loan))
        .route("/loans/:id", get(get_loan))
        .route("/loans/:id/return", put(return_loan))
        .route("/stats", get(get_stats));

    Router::new()
        .nest("/api", api)
        // ブラウザのクライアントから直接呼ばれる
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
