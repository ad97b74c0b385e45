//! Book model and related types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Catalog book
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    /// Availability flag, cached from the set of active borrowings.
    /// Written only by the borrowing lifecycle.
    pub borrowed: bool,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBook {
    #[validate(length(min = 1, message = "The title field must not be empty."))]
    pub title: String,
    #[validate(length(min = 1, message = "The author field must not be empty."))]
    pub author: String,
}

/// Update book request. The availability flag is deliberately absent:
/// only the borrowing lifecycle may write it.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBook {
    pub id: Uuid,
    pub title: String,
    pub author: String,
}
