//! Borrowing lifecycle service.
//!
//! Owns every write of the book availability flag. Both operations follow
//! the same canonical order: the borrowing record (the source of truth for
//! "is borrowed") is written or deleted first, the cached flag second. The
//! flag write is conditional on the book version observed during
//! validation, so two racing borrows of one book cannot both succeed; the
//! loser compensates by removing its record and surfaces a retryable
//! conflict.

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{BorrowRequest, Borrowing},
    store::{Store, UpdateOutcome},
};

use super::ensure_id;

const FLAG_CLEAR_RETRIES: usize = 3;

#[derive(Clone)]
pub struct BorrowingsService {
    store: Store,
}

impl BorrowingsService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Borrow a book for a user.
    ///
    /// Validates preconditions and referential integrity before any write,
    /// then persists the borrowing and flips the availability flag.
    pub async fn borrow(&self, request: BorrowRequest) -> AppResult<Borrowing> {
        if request.user_id.is_nil() {
            return Err(AppError::validation(
                "userId",
                "The userId field must not be empty.",
            ));
        }
        if request.book_id.is_nil() {
            return Err(AppError::validation(
                "bookId",
                "The bookId field must not be empty.",
            ));
        }
        if request.return_date <= request.borrow_date {
            return Err(AppError::validation(
                "returnDate",
                "The returnDate value must be greater than the borrowDate value.",
            ));
        }

        let Some(book) = self.store.books.get(request.book_id).await? else {
            return Err(AppError::validation(
                "bookId",
                format!("Book with ID {} does not exist.", request.book_id),
            ));
        };
        if self.store.users.get(request.user_id).await?.is_none() {
            return Err(AppError::validation(
                "userId",
                format!("User with ID {} does not exist.", request.user_id),
            ));
        }
        if book.value.borrowed {
            return Err(AppError::validation(
                "bookId",
                format!("Book with ID {} is already borrowed.", request.book_id),
            ));
        }

        let borrowing = Borrowing {
            id: Uuid::new_v4(),
            book_id: request.book_id,
            user_id: request.user_id,
            borrow_date: request.borrow_date,
            return_date: request.return_date,
        };
        self.store.borrowings.create(borrowing.clone()).await?;

        let mut claimed = book.value.clone();
        claimed.borrowed = true;
        match self.store.books.update(claimed, book.version).await? {
            UpdateOutcome::Updated(_) => {
                tracing::info!(
                    borrowing_id = %borrowing.id,
                    book_id = %borrowing.book_id,
                    user_id = %borrowing.user_id,
                    "book borrowed"
                );
                Ok(borrowing)
            }
            UpdateOutcome::Missing | UpdateOutcome::Conflict => {
                // Lost the race for the availability flag; withdraw the
                // record so the winner's state stands.
                if let Err(err) = self.store.borrowings.delete(borrowing.id).await {
                    tracing::error!(
                        borrowing_id = %borrowing.id,
                        error = %err,
                        "failed to withdraw borrowing after flag conflict"
                    );
                }
                Err(AppError::Conflict(format!(
                    "Book with ID {} was modified concurrently; retry the borrow.",
                    request.book_id
                )))
            }
        }
    }

    /// Return a borrowed book, deleting its borrowing record.
    ///
    /// Not idempotent: a second call for the same id reports not found.
    pub async fn return_book(&self, borrowing_id: Uuid) -> AppResult<()> {
        ensure_id(borrowing_id, "id")?;

        let Some(borrowing) = self.store.borrowings.get(borrowing_id).await? else {
            return Err(AppError::NotFound(format!(
                "Borrowing with ID {} does not exist.",
                borrowing_id
            )));
        };

        // The book must still be present before anything is torn down; a
        // book deleted underneath an active borrowing is a conflict, not a
        // silent success.
        if self.store.books.get(borrowing.book_id).await?.is_none() {
            return Err(AppError::Conflict(format!(
                "Book with ID {} was deleted while borrowed.",
                borrowing.book_id
            )));
        }

        if !self.store.borrowings.delete(borrowing_id).await? {
            // A concurrent return got there first.
            return Err(AppError::NotFound(format!(
                "Borrowing with ID {} does not exist.",
                borrowing_id
            )));
        }

        self.clear_flag(borrowing.book_id).await?;

        tracing::info!(
            borrowing_id = %borrowing_id,
            book_id = %borrowing.book_id,
            "book returned"
        );
        Ok(())
    }

    /// Clear the availability flag after its borrowing is gone.
    ///
    /// Retries on version conflicts (title edits racing the return). If the
    /// book disappears, or the retries run out, the return still stands:
    /// the record is authoritative and the flag is recomputable from it, so
    /// residual drift is logged rather than surfaced.
    async fn clear_flag(&self, book_id: Uuid) -> AppResult<()> {
        for _ in 0..FLAG_CLEAR_RETRIES {
            let Some(book) = self.store.books.get(book_id).await? else {
                tracing::warn!(%book_id, "book deleted before its availability flag was cleared");
                return Ok(());
            };
            if !book.value.borrowed {
                return Ok(());
            }

            let mut cleared = book.value.clone();
            cleared.borrowed = false;
            match self.store.books.update(cleared, book.version).await? {
                UpdateOutcome::Updated(_) => return Ok(()),
                UpdateOutcome::Missing => {
                    tracing::warn!(%book_id, "book deleted before its availability flag was cleared");
                    return Ok(());
                }
                UpdateOutcome::Conflict => continue,
            }
        }

        tracing::error!(%book_id, "availability flag left stale after repeated conflicts");
        Ok(())
    }
}
