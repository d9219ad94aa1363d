use crate::entities::{images, prelude::*};
use anyhow::{Context, Result};
use sea_orm::{DatabaseConnection, EntityTrait, Set};

/// Repository for avatar images
pub struct ImageRepository {
    conn: DatabaseConnection,
}

impl ImageRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(&self, url: &str) -> Result<i32> {
        let active = images::ActiveModel {
            url: Set(url.to_string()),
            ..Default::default()
        };

        let res = Images::insert(active)
            .exec(&self.conn)
            .await
            .context("Failed to insert image")?;
        Ok(res.last_insert_id)
    }
}
