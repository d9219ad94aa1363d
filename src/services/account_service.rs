//! Domain service for user accounts.
//!
//! Handles signup, login, profile edits and account deletion.

use serde::Serialize;
use thiserror::Error;

use crate::db::{ProfileChanges, User};

/// Errors specific to account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{0}")]
    Validation(String),

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Email already exists")]
    EmailTaken,

    /// Same message for unknown email and wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Requesting user not found")]
    RequesterNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("You are not allowed to delete this user")]
    Forbidden,

    #[error("Default role {0} is not configured")]
    MissingDefaultRole(i32),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AccountError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AccountError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

/// Validated signup data. Optional profile fields default to empty strings.
#[derive(Debug, Clone)]
pub struct SignupData {
    pub username: String,
    pub password: String,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub bio: String,
    pub location: String,
    pub phone: String,
}

/// Returned by a successful login. No token is issued.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LoginResult {
    pub user_id: i32,
    pub username: String,
    pub email: String,
}

/// Public profile fields.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: i32,
    pub username: String,
    pub name: String,
    pub surname: String,
    pub bio: String,
    pub location: String,
    pub email: String,
    pub phone: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
            surname: user.surname,
            bio: user.bio,
            location: user.location,
            email: user.email,
            phone: user.phone,
        }
    }
}

/// Domain service trait for accounts.
#[async_trait::async_trait]
pub trait AccountService: Send + Sync {
    /// Creates an account and returns the new user id.
    async fn signup(&self, data: SignupData) -> Result<i32, AccountError>;

    /// Checks email and password.
    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AccountError>;

    async fn get_profile(&self, user_id: i32) -> Result<UserProfile, AccountError>;

    /// Applies whitelisted profile changes and returns the updated profile.
    async fn update_profile(
        &self,
        user_id: i32,
        changes: ProfileChanges,
    ) -> Result<UserProfile, AccountError>;

    /// Deletes `target_user_id` if the requester is that user or an admin.
    async fn delete_user(&self, requester_id: i32, target_user_id: i32)
    -> Result<(), AccountError>;

    async fn list_profiles(&self) -> Result<Vec<UserProfile>, AccountError>;
}
