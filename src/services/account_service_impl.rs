//! `SeaORM` implementation of the `AccountService` trait.

use async_trait::async_trait;
use rand::Rng;
use tracing::{info, warn};

use crate::config::{AccountsConfig, SecurityConfig};
use crate::db::repositories::user::{hash_password_blocking, verify_password_blocking};
use crate::db::{NewUser, ProfileChanges, ProfileUpdate, Registration, Store};
use crate::services::account_service::{
    AccountError, AccountService, LoginResult, SignupData, UserProfile,
};

pub struct SeaOrmAccountService {
    store: Store,
    accounts: AccountsConfig,
    security: SecurityConfig,
}

impl SeaOrmAccountService {
    #[must_use]
    pub const fn new(store: Store, accounts: AccountsConfig, security: SecurityConfig) -> Self {
        Self {
            store,
            accounts,
            security,
        }
    }

    fn pick_avatar_id(&self) -> i32 {
        rand::rng().random_range(1..=self.accounts.avatar_pool_size.max(1))
    }
}

#[async_trait]
impl AccountService for SeaOrmAccountService {
    async fn signup(&self, data: SignupData) -> Result<i32, AccountError> {
        if data.password.chars().count() < self.accounts.min_password_length {
            return Err(AccountError::Validation(format!(
                "Password must be at least {} characters long",
                self.accounts.min_password_length
            )));
        }

        let password_hash = hash_password_blocking(&data.password, &self.security).await?;

        let new_user = NewUser {
            username: data.username,
            password_hash,
            name: data.name,
            surname: data.surname,
            email: data.email,
            bio: data.bio,
            location: data.location,
            phone: data.phone,
            role_id: self.accounts.default_role_id,
            avatar_id: Some(self.pick_avatar_id()),
        };

        match self.store.register_user(new_user).await? {
            Registration::Created(id) => Ok(id),
            Registration::UsernameTaken => Err(AccountError::UsernameTaken),
            Registration::EmailTaken => Err(AccountError::EmailTaken),
            Registration::MissingRole => {
                Err(AccountError::MissingDefaultRole(self.accounts.default_role_id))
            }
        }
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AccountError> {
        let Some((user, password_hash)) = self.store.get_user_by_email_with_password(email).await?
        else {
            return Err(AccountError::InvalidCredentials);
        };

        if !verify_password_blocking(password, &password_hash).await? {
            warn!(user_id = user.id, "Failed login attempt");
            return Err(AccountError::InvalidCredentials);
        }

        info!(user_id = user.id, "User logged in");
        Ok(LoginResult {
            user_id: user.id,
            username: user.username,
            email: user.email,
        })
    }

    async fn get_profile(&self, user_id: i32) -> Result<UserProfile, AccountError> {
        self.store
            .get_user(user_id)
            .await?
            .map(UserProfile::from)
            .ok_or(AccountError::UserNotFound)
    }

    async fn update_profile(
        &self,
        user_id: i32,
        changes: ProfileChanges,
    ) -> Result<UserProfile, AccountError> {
        match self.store.update_user_profile(user_id, changes).await? {
            ProfileUpdate::Updated(user) => {
                info!(user_id, "Updated user profile");
                Ok(UserProfile::from(user))
            }
            ProfileUpdate::NotFound => Err(AccountError::UserNotFound),
            ProfileUpdate::UsernameTaken => Err(AccountError::UsernameTaken),
            ProfileUpdate::EmailTaken => Err(AccountError::EmailTaken),
        }
    }

    async fn delete_user(
        &self,
        requester_id: i32,
        target_user_id: i32,
    ) -> Result<(), AccountError> {
        let requester = self
            .store
            .get_user(requester_id)
            .await?
            .ok_or(AccountError::RequesterNotFound)?;

        let target = self
            .store
            .get_user(target_user_id)
            .await?
            .ok_or(AccountError::UserNotFound)?;

        let is_self = requester.id == target.id;
        let is_admin = requester.role_id == self.accounts.admin_role_id;
        if !is_self && !is_admin {
            warn!(
                requester_id,
                target_user_id, "Rejected delete of another user by non-admin"
            );
            return Err(AccountError::Forbidden);
        }

        if !self.store.delete_user(target.id).await? {
            // Removed between lookup and delete.
            return Err(AccountError::UserNotFound);
        }

        info!(requester_id, target_user_id, "Deleted user");
        Ok(())
    }

    async fn list_profiles(&self) -> Result<Vec<UserProfile>, AccountError> {
        let users = self.store.list_users().await?;
        Ok(users.into_iter().map(UserProfile::from).collect())
    }
}
