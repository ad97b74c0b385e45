//! In-memory document store.
//!
//! One map per collection, each guarded by its own lock. Every operation
//! touches a single document under a single lock acquisition, which is the
//! full extent of the atomicity this backend provides.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Book, Borrowing, User};

use super::{
    BookStore, BorrowingStore, StoreResult, UpdateOutcome, UserStore, Versioned,
};

#[derive(Default)]
pub struct MemoryStore {
    books: RwLock<HashMap<Uuid, Versioned<Book>>>,
    users: RwLock<HashMap<Uuid, User>>,
    borrowings: RwLock<HashMap<Uuid, Borrowing>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn create(&self, book: Book) -> StoreResult<()> {
        let mut books = self.books.write().await;
        books.insert(
            book.id,
            Versioned {
                value: book,
                version: 1,
            },
        );
        Ok(())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Versioned<Book>>> {
        Ok(self.books.read().await.get(&id).cloned())
    }

    async fn update(&self, book: Book, expected_version: u64) -> StoreResult<UpdateOutcome> {
        let mut books = self.books.write().await;
        match books.get_mut(&book.id) {
            None => Ok(UpdateOutcome::Missing),
            Some(stored) if stored.version != expected_version => Ok(UpdateOutcome::Conflict),
            Some(stored) => {
                stored.value = book;
                stored.version += 1;
                Ok(UpdateOutcome::Updated(stored.clone()))
            }
        }
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.books.write().await.remove(&id).is_some())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, user: User) -> StoreResult<()> {
        self.users.write().await.insert(user.id, user);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn update(&self, user: User) -> StoreResult<Option<User>> {
        let mut users = self.users.write().await;
        match users.get_mut(&user.id) {
            None => Ok(None),
            Some(stored) => {
                *stored = user.clone();
                Ok(Some(user))
            }
        }
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.users.write().await.remove(&id).is_some())
    }
}

#[async_trait]
impl BorrowingStore for MemoryStore {
    async fn create(&self, borrowing: Borrowing) -> StoreResult<()> {
        self.borrowings.write().await.insert(borrowing.id, borrowing);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Borrowing>> {
        Ok(self.borrowings.read().await.get(&id).cloned())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.borrowings.write().await.remove(&id).is_some())
    }

    async fn list_all(&self) -> StoreResult<Vec<Borrowing>> {
        Ok(self.borrowings.read().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::store::Store;

    fn sample_book() -> Book {
        Book {
            id: Uuid::new_v4(),
            title: "The Master and Margarita".to_string(),
            author: "Mikhail Bulgakov".to_string(),
            borrowed: false,
        }
    }

    #[tokio::test]
    async fn book_update_bumps_version() {
        let store = Store::in_memory();
        let book = sample_book();
        store.books.create(book.clone()).await.unwrap();

        let read = store.books.get(book.id).await.unwrap().unwrap();
        assert_eq!(read.version, 1);

        let mut changed = read.value.clone();
        changed.title = "Heart of a Dog".to_string();
        let outcome = store.books.update(changed, read.version).await.unwrap();
        let updated = match outcome {
            UpdateOutcome::Updated(v) => v,
            other => panic!("unexpected outcome: {:?}", other),
        };
        assert_eq!(updated.version, 2);
        assert_eq!(updated.value.title, "Heart of a Dog");
    }

    #[tokio::test]
    async fn book_update_rejects_stale_version() {
        let store = Store::in_memory();
        let book = sample_book();
        store.books.create(book.clone()).await.unwrap();

        let read = store.books.get(book.id).await.unwrap().unwrap();
        let mut first = read.value.clone();
        first.borrowed = true;
        assert!(matches!(
            store.books.update(first, read.version).await.unwrap(),
            UpdateOutcome::Updated(_)
        ));

        // Second writer still holds version 1
        let mut second = read.value.clone();
        second.borrowed = true;
        assert!(matches!(
            store.books.update(second, read.version).await.unwrap(),
            UpdateOutcome::Conflict
        ));
    }

    #[tokio::test]
    async fn book_update_missing_document() {
        let store = Store::in_memory();
        let book = sample_book();
        assert!(matches!(
            store.books.update(book, 1).await.unwrap(),
            UpdateOutcome::Missing
        ));
    }

    #[tokio::test]
    async fn borrowings_list_all_returns_every_record() {
        let store = Store::in_memory();
        let now = Utc::now();
        for _ in 0..3 {
            store
                .borrowings
                .create(Borrowing {
                    id: Uuid::new_v4(),
                    book_id: Uuid::new_v4(),
                    user_id: Uuid::new_v4(),
                    borrow_date: now,
                    return_date: now + Duration::days(14),
                })
                .await
                .unwrap();
        }
        assert_eq!(store.borrowings.list_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn delete_is_idempotent_signal() {
        let store = Store::in_memory();
        let book = sample_book();
        store.books.create(book.clone()).await.unwrap();
        assert!(store.books.delete(book.id).await.unwrap());
        assert!(!store.books.delete(book.id).await.unwrap());
    }
}
