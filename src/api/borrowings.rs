//! Borrowing lifecycle endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{BorrowRequest, Borrowing},
};

/// Borrow a book
#[utoipa::path(
    post,
    path = "/borrowing/borrow",
    tag = "borrowings",
    request_body = BorrowRequest,
    responses(
        (status = 200, description = "Borrowing created", body = Borrowing),
        (status = 400, description = "Invalid input or book unavailable", body = crate::error::ErrorResponse),
        (status = 409, description = "Concurrent modification, retry", body = crate::error::ErrorResponse)
    )
)]
pub async fn borrow(
    State(state): State<crate::AppState>,
    Json(request): Json<BorrowRequest>,
) -> AppResult<Json<Borrowing>> {
    let borrowing = state.services.borrowings.borrow(request).await?;
    Ok(Json(borrowing))
}

/// Return a borrowed book
#[utoipa::path(
    delete,
    path = "/borrowing/return/{id}",
    tag = "borrowings",
    params(
        ("id" = Uuid, Path, description = "Borrowing ID")
    ),
    responses(
        (status = 200, description = "Book returned"),
        (status = 400, description = "Empty id", body = crate::error::ErrorResponse),
        (status = 404, description = "Borrowing not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Book deleted while borrowed", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<()> {
    state.services.borrowings.return_book(id).await
}
