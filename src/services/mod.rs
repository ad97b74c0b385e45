//! Business logic services

pub mod books;
pub mod borrowings;
pub mod email;
pub mod reminder;
pub mod users;

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    config::AppConfig,
    error::{AppError, AppResult},
    store::Store,
};

/// Reject the nil identifier before touching the store.
fn ensure_id(id: Uuid, field: &str) -> AppResult<()> {
    if id.is_nil() {
        return Err(AppError::validation(
            field,
            format!("The {} field must not be empty.", field),
        ));
    }
    Ok(())
}

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BooksService,
    pub users: users::UsersService,
    pub borrowings: borrowings::BorrowingsService,
    pub reminder: reminder::ReminderService,
}

impl Services {
    /// Create all services over the given store and notifier
    pub fn new(store: Store, notifier: Arc<dyn email::Notifier>, config: &AppConfig) -> Self {
        Self {
            books: books::BooksService::new(store.clone()),
            users: users::UsersService::new(store.clone()),
            borrowings: borrowings::BorrowingsService::new(store.clone()),
            reminder: reminder::ReminderService::new(store, notifier, config.reminder.clone()),
        }
    }
}
