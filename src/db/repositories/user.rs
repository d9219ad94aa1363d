use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionTrait,
};
use tokio::task;
use tracing::info;

use crate::config::SecurityConfig;
use crate::entities::{prelude::*, user_data, users};

/// User data returned from repository (without the password hash)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub name: String,
    pub surname: String,
    pub bio: String,
    pub location: String,
    pub email: String,
    pub phone: String,
    pub role_id: i32,
    pub image_id: Option<i32>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            name: model.name,
            surname: model.surname,
            bio: model.bio,
            location: model.location,
            email: model.email,
            phone: model.phone,
            role_id: model.role_id,
            image_id: model.image_id,
        }
    }
}

/// Everything needed to insert a new account. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub bio: String,
    pub location: String,
    pub phone: String,
    pub role_id: i32,
    /// Image id to use as avatar if such an image exists.
    pub avatar_id: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Created(i32),
    UsernameTaken,
    EmailTaken,
    MissingRole,
}

/// Profile fields that may be changed after signup. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl ProfileChanges {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.name.is_none()
            && self.surname.is_none()
            && self.bio.is_none()
            && self.location.is_none()
            && self.email.is_none()
            && self.phone.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileUpdate {
    Updated(User),
    NotFound,
    UsernameTaken,
    EmailTaken,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    /// Get user by email together with the stored password hash
    pub async fn get_by_email_with_password(&self, email: &str) -> Result<Option<(User, String)>> {
        let user = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.map(|u| {
            let password_hash = u.password.clone();
            (User::from(u), password_hash)
        }))
    }

    pub async fn list_all(&self) -> Result<Vec<User>> {
        let rows = Users::find()
            .order_by_asc(users::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list users")?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Insert a new user after checking username, email and role.
    ///
    /// Statements run in autocommit so concurrent writers queue on the SQLite
    /// busy timeout. A signup that wins the race past the checks is still
    /// stopped by the unique indexes and reported as taken.
    pub async fn register(&self, new_user: NewUser) -> Result<Registration> {
        let username_taken = Users::find()
            .filter(users::Column::Username.eq(&new_user.username))
            .one(&self.conn)
            .await
            .context("Failed to check username")?
            .is_some();
        if username_taken {
            return Ok(Registration::UsernameTaken);
        }

        let email_taken = Users::find()
            .filter(users::Column::Email.eq(&new_user.email))
            .one(&self.conn)
            .await
            .context("Failed to check email")?
            .is_some();
        if email_taken {
            return Ok(Registration::EmailTaken);
        }

        let role = Roles::find_by_id(new_user.role_id)
            .one(&self.conn)
            .await
            .context("Failed to query role")?;
        if role.is_none() {
            return Ok(Registration::MissingRole);
        }

        let image_id = match new_user.avatar_id {
            Some(id) => Images::find_by_id(id)
                .one(&self.conn)
                .await
                .context("Failed to query avatar image")?
                .map(|image| image.id),
            None => None,
        };

        let active = users::ActiveModel {
            username: Set(new_user.username.clone()),
            password: Set(new_user.password_hash),
            name: Set(new_user.name),
            surname: Set(new_user.surname),
            bio: Set(new_user.bio),
            location: Set(new_user.location),
            email: Set(new_user.email),
            phone: Set(new_user.phone),
            role_id: Set(new_user.role_id),
            image_id: Set(image_id),
            ..Default::default()
        };

        let inserted = match Users::insert(active).exec(&self.conn).await {
            Ok(res) => res.last_insert_id,
            Err(err) => {
                return unique_violation(&err)
                    .map(|column| match column {
                        UniqueColumn::Username => Registration::UsernameTaken,
                        UniqueColumn::Email => Registration::EmailTaken,
                    })
                    .ok_or_else(|| anyhow::Error::new(err).context("Failed to insert user"));
            }
        };

        info!(user_id = inserted, username = %new_user.username, "Registered user");
        Ok(Registration::Created(inserted))
    }

    /// Apply whitelisted profile changes. Username and email must stay unique.
    pub async fn update_profile(&self, id: i32, changes: ProfileChanges) -> Result<ProfileUpdate> {
        let Some(user) = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for update")?
        else {
            return Ok(ProfileUpdate::NotFound);
        };

        if let Some(username) = &changes.username {
            let taken = Users::find()
                .filter(users::Column::Username.eq(username))
                .filter(users::Column::Id.ne(id))
                .one(&self.conn)
                .await
                .context("Failed to check username")?
                .is_some();
            if taken {
                return Ok(ProfileUpdate::UsernameTaken);
            }
        }

        if let Some(email) = &changes.email {
            let taken = Users::find()
                .filter(users::Column::Email.eq(email))
                .filter(users::Column::Id.ne(id))
                .one(&self.conn)
                .await
                .context("Failed to check email")?
                .is_some();
            if taken {
                return Ok(ProfileUpdate::EmailTaken);
            }
        }

        if changes.is_empty() {
            return Ok(ProfileUpdate::Updated(User::from(user)));
        }

        let mut active: users::ActiveModel = user.into();
        if let Some(username) = changes.username {
            active.username = Set(username);
        }
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(surname) = changes.surname {
            active.surname = Set(surname);
        }
        if let Some(bio) = changes.bio {
            active.bio = Set(bio);
        }
        if let Some(location) = changes.location {
            active.location = Set(location);
        }
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(phone) = changes.phone {
            active.phone = Set(phone);
        }

        let updated = match active.update(&self.conn).await {
            Ok(model) => model,
            Err(err) => {
                return unique_violation(&err)
                    .map(|column| match column {
                        UniqueColumn::Username => ProfileUpdate::UsernameTaken,
                        UniqueColumn::Email => ProfileUpdate::EmailTaken,
                    })
                    .ok_or_else(|| anyhow::Error::new(err).context("Failed to update user"));
            }
        };

        Ok(ProfileUpdate::Updated(User::from(updated)))
    }

    /// Delete a user and its log entries. Returns false if the user did not exist.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to start delete transaction")?;

        UserData::delete_many()
            .filter(user_data::Column::UserId.eq(id))
            .exec(&txn)
            .await
            .context("Failed to delete user data")?;

        let result = Users::delete_by_id(id)
            .exec(&txn)
            .await
            .context("Failed to delete user")?;

        txn.commit()
            .await
            .context("Failed to commit delete transaction")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn set_role(&self, id: i32, role_id: i32) -> Result<bool> {
        let result = Users::update_many()
            .col_expr(
                users::Column::RoleId,
                sea_orm::sea_query::Expr::value(role_id),
            )
            .filter(users::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("Failed to update user role")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn add_data(&self, user_id: i32, description: &str) -> Result<i32> {
        let active = user_data::ActiveModel {
            user_id: Set(user_id),
            ts_ins: Set(Some(chrono::Utc::now().to_rfc3339())),
            description: Set(description.to_string()),
            ..Default::default()
        };

        let res = UserData::insert(active)
            .exec(&self.conn)
            .await
            .context("Failed to insert user data")?;
        Ok(res.last_insert_id)
    }

    pub async fn list_data(&self, user_id: i32) -> Result<Vec<user_data::Model>> {
        UserData::find()
            .filter(user_data::Column::UserId.eq(user_id))
            .order_by_asc(user_data::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list user data")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UniqueColumn {
    Username,
    Email,
}

/// Recognise a unique-index violation on `users`, e.g. from a concurrent signup.
fn unique_violation(err: &DbErr) -> Option<UniqueColumn> {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) => {
            if message.contains("email") {
                Some(UniqueColumn::Email)
            } else if message.contains("username") {
                Some(UniqueColumn::Username)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Hash a password using Argon2id with the configured params.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Check a password against a stored PHC hash string. Parameters come from the hash itself.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Hash on the blocking pool; Argon2 is CPU-bound.
pub async fn hash_password_blocking(password: &str, config: &SecurityConfig) -> Result<String> {
    let password = password.to_string();
    let config = config.clone();
    task::spawn_blocking(move || hash_password(&password, &config))
        .await
        .context("Password hashing task panicked")?
}

pub async fn verify_password_blocking(password: &str, password_hash: &str) -> Result<bool> {
    let password = password.to_string();
    let password_hash = password_hash.to_string();
    task::spawn_blocking(move || verify_password(&password, &password_hash))
        .await
        .context("Password verification task panicked")?
}
