//! Book catalog service

use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{Book, CreateBook, UpdateBook},
    store::{Store, UpdateOutcome},
};

use super::ensure_id;

const UPDATE_RETRIES: usize = 3;

#[derive(Clone)]
pub struct BooksService {
    store: Store,
}

impl BooksService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Add a book to the catalog; new books are always available.
    pub async fn create_book(&self, request: CreateBook) -> AppResult<Book> {
        request.validate()?;

        let book = Book {
            id: Uuid::new_v4(),
            title: request.title,
            author: request.author,
            borrowed: false,
        };
        self.store.books.create(book.clone()).await?;

        Ok(book)
    }

    pub async fn get_book(&self, id: Uuid) -> AppResult<Book> {
        ensure_id(id, "id")?;

        self.store
            .books
            .get(id)
            .await?
            .map(|versioned| versioned.value)
            .ok_or_else(|| AppError::NotFound(format!("Book with ID {} does not exist.", id)))
    }

    /// Update title and author. The availability flag is owned by the
    /// borrowing lifecycle and carried over from the stored document.
    pub async fn update_book(&self, request: UpdateBook) -> AppResult<Book> {
        ensure_id(request.id, "id")?;

        for _ in 0..UPDATE_RETRIES {
            let Some(current) = self.store.books.get(request.id).await? else {
                return Err(AppError::NotFound(format!(
                    "Book with ID {} does not exist.",
                    request.id
                )));
            };

            let book = Book {
                id: request.id,
                title: request.title.clone(),
                author: request.author.clone(),
                borrowed: current.value.borrowed,
            };

            match self.store.books.update(book, current.version).await? {
                UpdateOutcome::Updated(versioned) => return Ok(versioned.value),
                UpdateOutcome::Missing => {
                    return Err(AppError::NotFound(format!(
                        "Book with ID {} does not exist.",
                        request.id
                    )))
                }
                UpdateOutcome::Conflict => continue,
            }
        }

        Err(AppError::Conflict(format!(
            "Book with ID {} is being modified concurrently.",
            request.id
        )))
    }

    /// Remove a book. Deleting a borrowed book is allowed; the return
    /// path copes with the missing document.
    pub async fn delete_book(&self, id: Uuid) -> AppResult<()> {
        ensure_id(id, "id")?;

        if !self.store.books.delete(id).await? {
            return Err(AppError::NotFound(format!(
                "Book with ID {} does not exist.",
                id
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> BooksService {
        BooksService::new(Store::in_memory())
    }

    #[tokio::test]
    async fn create_assigns_id_and_unborrowed() {
        let books = service();
        let created = books
            .create_book(CreateBook {
                title: "Dune".to_string(),
                author: "Frank Herbert".to_string(),
            })
            .await
            .unwrap();

        assert!(!created.id.is_nil());
        assert!(!created.borrowed);
        assert_eq!(books.get_book(created.id).await.unwrap().title, "Dune");
    }

    #[tokio::test]
    async fn create_rejects_blank_title() {
        let books = service();
        let err = books
            .create_book(CreateBook {
                title: String::new(),
                author: "Frank Herbert".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "title"));
    }

    #[tokio::test]
    async fn update_preserves_borrowed_flag() {
        let books = service();
        let store = books.store.clone();
        let created = books
            .create_book(CreateBook {
                title: "Dune".to_string(),
                author: "Frank Herbert".to_string(),
            })
            .await
            .unwrap();

        // Flip the flag the way the lifecycle does
        let read = store.books.get(created.id).await.unwrap().unwrap();
        let mut borrowed = read.value.clone();
        borrowed.borrowed = true;
        store.books.update(borrowed, read.version).await.unwrap();

        let updated = books
            .update_book(UpdateBook {
                id: created.id,
                title: "Dune Messiah".to_string(),
                author: "Frank Herbert".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(updated.title, "Dune Messiah");
        assert!(updated.borrowed);
    }

    #[tokio::test]
    async fn get_unknown_id_is_not_found() {
        let err = service().get_book(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn nil_id_is_rejected() {
        let err = service().get_book(Uuid::nil()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn delete_twice_reports_not_found() {
        let books = service();
        let created = books
            .create_book(CreateBook {
                title: "Dune".to_string(),
                author: "Frank Herbert".to_string(),
            })
            .await
            .unwrap();

        books.delete_book(created.id).await.unwrap();
        let err = books.delete_book(created.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
