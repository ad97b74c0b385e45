//! User management service

use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{CreateUser, UpdateUser, User},
    store::Store,
};

use super::ensure_id;

#[derive(Clone)]
pub struct UsersService {
    store: Store,
}

impl UsersService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn create_user(&self, request: CreateUser) -> AppResult<User> {
        request.validate()?;

        let user = User {
            id: Uuid::new_v4(),
            name: request.name,
            email: request.email,
        };
        self.store.users.create(user.clone()).await?;

        Ok(user)
    }

    pub async fn get_user(&self, id: Uuid) -> AppResult<User> {
        ensure_id(id, "id")?;

        self.store
            .users
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with ID {} does not exist.", id)))
    }

    pub async fn update_user(&self, request: UpdateUser) -> AppResult<User> {
        ensure_id(request.id, "id")?;

        let user = User {
            id: request.id,
            name: request.name,
            email: request.email,
        };

        self.store
            .users
            .update(user)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("User with ID {} does not exist.", request.id))
            })
    }

    /// Remove a user. Borrowings referencing the user are left in place;
    /// the reminder scanner skips records whose user is gone.
    pub async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        ensure_id(id, "id")?;

        if !self.store.users.delete(id).await? {
            return Err(AppError::NotFound(format!(
                "User with ID {} does not exist.",
                id
            )));
        }

        Ok(())
    }
}
