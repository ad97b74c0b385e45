//! Borrowing model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Active borrowing record.
///
/// Existence of this record is the source of truth for "is the book
/// borrowed"; returning a book deletes it (there is no returned state).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Borrowing {
    pub id: Uuid,
    pub book_id: Uuid,
    pub user_id: Uuid,
    pub borrow_date: DateTime<Utc>,
    /// Due date by which the book must be returned.
    pub return_date: DateTime<Utc>,
}

/// Borrow book request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRequest {
    pub user_id: Uuid,
    pub book_id: Uuid,
    pub borrow_date: DateTime<Utc>,
    pub return_date: DateTime<Utc>,
}
