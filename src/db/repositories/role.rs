use crate::entities::{prelude::*, roles};
use anyhow::{Context, Result};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};

pub struct RoleRepository {
    conn: DatabaseConnection,
}

impl RoleRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<roles::Model>> {
        Roles::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query role")
    }

    pub async fn list(&self) -> Result<Vec<roles::Model>> {
        Roles::find()
            .order_by_asc(roles::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list roles")
    }

    pub async fn remove(&self, id: i32) -> Result<bool> {
        let result = Roles::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete role")?;
        Ok(result.rows_affected > 0)
    }
}
