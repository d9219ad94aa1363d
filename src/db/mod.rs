use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::{roles, user_data};

pub mod migrator;
pub mod repositories;

pub use repositories::city::City;
pub use repositories::parking_spot::{ParkingSpot, ParkingSpotInput};
pub use repositories::street::Street;
pub use repositories::user::{NewUser, ProfileChanges, ProfileUpdate, Registration, User};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn role_repo(&self) -> repositories::role::RoleRepository {
        repositories::role::RoleRepository::new(self.conn.clone())
    }

    fn image_repo(&self) -> repositories::images::ImageRepository {
        repositories::images::ImageRepository::new(self.conn.clone())
    }

    fn city_repo(&self) -> repositories::city::CityRepository {
        repositories::city::CityRepository::new(self.conn.clone())
    }

    fn street_repo(&self) -> repositories::street::StreetRepository {
        repositories::street::StreetRepository::new(self.conn.clone())
    }

    fn parking_spot_repo(&self) -> repositories::parking_spot::ParkingSpotRepository {
        repositories::parking_spot::ParkingSpotRepository::new(self.conn.clone())
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_email_with_password(
        &self,
        email: &str,
    ) -> Result<Option<(User, String)>> {
        self.user_repo().get_by_email_with_password(email).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo().list_all().await
    }

    pub async fn register_user(&self, new_user: NewUser) -> Result<Registration> {
        self.user_repo().register(new_user).await
    }

    pub async fn update_user_profile(
        &self,
        id: i32,
        changes: ProfileChanges,
    ) -> Result<ProfileUpdate> {
        self.user_repo().update_profile(id, changes).await
    }

    pub async fn delete_user(&self, id: i32) -> Result<bool> {
        self.user_repo().delete(id).await
    }

    pub async fn set_user_role(&self, id: i32, role_id: i32) -> Result<bool> {
        self.user_repo().set_role(id, role_id).await
    }

    pub async fn add_user_data(&self, user_id: i32, description: &str) -> Result<i32> {
        self.user_repo().add_data(user_id, description).await
    }

    pub async fn list_user_data(&self, user_id: i32) -> Result<Vec<user_data::Model>> {
        self.user_repo().list_data(user_id).await
    }

    // ========================================================================
    // Roles & images
    // ========================================================================

    pub async fn get_role(&self, id: i32) -> Result<Option<roles::Model>> {
        self.role_repo().get(id).await
    }

    pub async fn list_roles(&self) -> Result<Vec<roles::Model>> {
        self.role_repo().list().await
    }

    pub async fn remove_role(&self, id: i32) -> Result<bool> {
        self.role_repo().remove(id).await
    }

    pub async fn add_image(&self, url: &str) -> Result<i32> {
        self.image_repo().add(url).await
    }

    // ========================================================================
    // Reference data
    // ========================================================================

    pub async fn list_cities(&self) -> Result<Vec<City>> {
        self.city_repo().list().await
    }

    pub async fn get_city(&self, id: i32) -> Result<Option<City>> {
        self.city_repo().get(id).await
    }

    pub async fn add_city(&self, name: &str) -> Result<City> {
        self.city_repo().add(name).await
    }

    pub async fn update_city(&self, id: i32, name: &str) -> Result<Option<City>> {
        self.city_repo().update(id, name).await
    }

    pub async fn remove_city(&self, id: i32) -> Result<bool> {
        self.city_repo().remove(id).await
    }

    pub async fn list_streets(&self) -> Result<Vec<Street>> {
        self.street_repo().list().await
    }

    pub async fn get_street(&self, id: i32) -> Result<Option<Street>> {
        self.street_repo().get(id).await
    }

    pub async fn add_street(&self, name: &str) -> Result<Street> {
        self.street_repo().add(name).await
    }

    pub async fn update_street(&self, id: i32, name: &str) -> Result<Option<Street>> {
        self.street_repo().update(id, name).await
    }

    pub async fn remove_street(&self, id: i32) -> Result<bool> {
        self.street_repo().remove(id).await
    }

    pub async fn list_parking_spots(&self) -> Result<Vec<ParkingSpot>> {
        self.parking_spot_repo().list().await
    }

    pub async fn get_parking_spot(&self, id: i32) -> Result<Option<ParkingSpot>> {
        self.parking_spot_repo().get(id).await
    }

    pub async fn add_parking_spot(&self, input: &ParkingSpotInput) -> Result<ParkingSpot> {
        self.parking_spot_repo().add(input).await
    }

    pub async fn update_parking_spot(
        &self,
        id: i32,
        input: &ParkingSpotInput,
    ) -> Result<Option<ParkingSpot>> {
        self.parking_spot_repo().update(id, input).await
    }

    pub async fn remove_parking_spot(&self, id: i32) -> Result<bool> {
        self.parking_spot_repo().remove(id).await
    }
}
