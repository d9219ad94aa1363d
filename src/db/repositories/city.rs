use crate::entities::{prelude::*, slovenska_mesta};
use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use tracing::info;

pub type City = slovenska_mesta::Model;

/// Repository for `slovenska_mesta`
pub struct CityRepository {
    conn: DatabaseConnection,
}

impl CityRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<City>> {
        SlovenskaMesta::find()
            .order_by_asc(slovenska_mesta::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list cities")
    }

    pub async fn get(&self, id: i32) -> Result<Option<City>> {
        SlovenskaMesta::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query city")
    }

    pub async fn add(&self, name: &str) -> Result<City> {
        let active = slovenska_mesta::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        };

        let city = active
            .insert(&self.conn)
            .await
            .context("Failed to insert city")?;
        info!(city_id = city.id, "Added city {}", city.name);
        Ok(city)
    }

    pub async fn update(&self, id: i32, name: &str) -> Result<Option<City>> {
        let Some(city) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: slovenska_mesta::ActiveModel = city.into();
        active.name = Set(name.to_string());
        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update city")?;
        Ok(Some(updated))
    }

    pub async fn remove(&self, id: i32) -> Result<bool> {
        let result = SlovenskaMesta::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete city")?;
        Ok(result.rows_affected > 0)
    }
}
