//! Entity store abstraction.
//!
//! Every operation is atomic for a single document only; no multi-document
//! transaction is available from any backend. Book reads carry a storage
//! version and book writes are conditional on it, which is the only
//! concurrency primitive the borrowing lifecycle relies on.

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Book, Borrowing, User};

/// Errors surfaced by a store backend
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A document together with the storage version it was read at
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub value: T,
    pub version: u64,
}

/// Outcome of a conditional book write
#[derive(Debug)]
pub enum UpdateOutcome {
    /// The expected version matched and the write was applied.
    Updated(Versioned<Book>),
    /// No document with this id exists.
    Missing,
    /// The stored version moved on since the read.
    Conflict,
}

#[async_trait]
pub trait BookStore: Send + Sync {
    async fn create(&self, book: Book) -> StoreResult<()>;
    async fn get(&self, id: Uuid) -> StoreResult<Option<Versioned<Book>>>;
    /// Conditional write: applied only while the stored version still
    /// equals `expected_version`.
    async fn update(&self, book: Book, expected_version: u64) -> StoreResult<UpdateOutcome>;
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: User) -> StoreResult<()>;
    async fn get(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn update(&self, user: User) -> StoreResult<Option<User>>;
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait BorrowingStore: Send + Sync {
    async fn create(&self, borrowing: Borrowing) -> StoreResult<()>;
    async fn get(&self, id: Uuid) -> StoreResult<Option<Borrowing>>;
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
    async fn list_all(&self) -> StoreResult<Vec<Borrowing>>;
}

/// Aggregate handle to the per-entity stores
#[derive(Clone)]
pub struct Store {
    pub books: Arc<dyn BookStore>,
    pub users: Arc<dyn UserStore>,
    pub borrowings: Arc<dyn BorrowingStore>,
}

impl Store {
    /// Create a store backed by the in-memory document backend
    pub fn in_memory() -> Self {
        let backend = Arc::new(memory::MemoryStore::new());
        Self {
            books: backend.clone(),
            users: backend.clone(),
            borrowings: backend,
        }
    }
}
