//! The persistence boundary the API depends on.
//!
//! Stores assign ids in increasing insertion order, stamp `created_at` and
//! `updated_at` on every write, keep emails unique, refuse posts whose author
//! does not exist and cascade user deletion to the user's posts.

use async_trait::async_trait;
use postboard_common::model::{
    Id, ModelValidationError,
    post::{NewPost, Post, PostChanges, PostMarker},
    user::{Email, NewUser, User, UserChanges, UserMarker},
};
use std::fmt::Debug;
use thiserror::Error;

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("An object in the store was invalid: {0}")]
    Data(#[from] ModelValidationError),
    #[error("A user with email {} already exists", .0.get())]
    DuplicateEmail(Email),
    #[error("Author with id {0} does not exist")]
    MissingAuthor(Id<UserMarker>),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

#[async_trait]
pub trait EntityStore: Debug + Send + Sync {
    /// All users, in insertion order.
    async fn list_users(&self) -> Result<Vec<User>>;

    async fn fetch_user(&self, user_id: Id<UserMarker>) -> Result<Option<User>>;

    async fn create_user(&self, user: &NewUser) -> Result<User>;

    /// Applies `changes` and refreshes `updated_at`. `None` if there is no such user.
    async fn update_user(
        &self,
        user_id: Id<UserMarker>,
        changes: &UserChanges,
    ) -> Result<Option<User>>;

    /// Deletes the user together with their posts. `false` if there was no such user.
    async fn delete_user(&self, user_id: Id<UserMarker>) -> Result<bool>;

    /// All posts, in insertion order.
    async fn list_posts(&self) -> Result<Vec<Post>>;

    async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<Post>>;

    /// The posts authored by a user, in insertion order. `None` if there is no such user.
    async fn fetch_user_posts(&self, user_id: Id<UserMarker>) -> Result<Option<Vec<Post>>>;

    async fn create_post(&self, post: &NewPost) -> Result<Post>;

    async fn update_post(
        &self,
        post_id: Id<PostMarker>,
        changes: &PostChanges,
    ) -> Result<Option<Post>>;

    async fn delete_post(&self, post_id: Id<PostMarker>) -> Result<bool>;
}
