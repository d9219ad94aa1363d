use crate::entities::{prelude::*, slovenske_ulice};
use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use tracing::info;

pub type Street = slovenske_ulice::Model;

/// Repository for `slovenske_ulice`
pub struct StreetRepository {
    conn: DatabaseConnection,
}

impl StreetRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<Street>> {
        SlovenskeUlice::find()
            .order_by_asc(slovenske_ulice::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list streets")
    }

    pub async fn get(&self, id: i32) -> Result<Option<Street>> {
        SlovenskeUlice::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query street")
    }

    pub async fn add(&self, name: &str) -> Result<Street> {
        let active = slovenske_ulice::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        };

        let street = active
            .insert(&self.conn)
            .await
            .context("Failed to insert street")?;
        info!(street_id = street.id, "Added street {}", street.name);
        Ok(street)
    }

    pub async fn update(&self, id: i32, name: &str) -> Result<Option<Street>> {
        let Some(street) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: slovenske_ulice::ActiveModel = street.into();
        active.name = Set(name.to_string());
        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update street")?;
        Ok(Some(updated))
    }

    pub async fn remove(&self, id: i32) -> Result<bool> {
        let result = SlovenskeUlice::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete street")?;
        Ok(result.rows_affected > 0)
    }
}
