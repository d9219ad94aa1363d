use crate::entities::{parkirna_mesta, prelude::*};
use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use tracing::info;

use crate::constants::coordinates::DECIMAL_PLACES;

pub type ParkingSpot = parkirna_mesta::Model;

#[derive(Debug, Clone, PartialEq)]
pub struct ParkingSpotInput {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Repository for `parkirna_mesta`
pub struct ParkingSpotRepository {
    conn: DatabaseConnection,
}

impl ParkingSpotRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<ParkingSpot>> {
        ParkirnaMesta::find()
            .order_by_asc(parkirna_mesta::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list parking spots")
    }

    pub async fn get(&self, id: i32) -> Result<Option<ParkingSpot>> {
        ParkirnaMesta::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query parking spot")
    }

    pub async fn add(&self, input: &ParkingSpotInput) -> Result<ParkingSpot> {
        let active = parkirna_mesta::ActiveModel {
            name: Set(input.name.clone()),
            latitude: Set(round_coordinate(input.latitude)),
            longitude: Set(round_coordinate(input.longitude)),
            ..Default::default()
        };

        let spot = active
            .insert(&self.conn)
            .await
            .context("Failed to insert parking spot")?;
        info!(
            parking_spot_id = spot.id,
            "Added parking spot {} ({}, {})", spot.name, spot.latitude, spot.longitude
        );
        Ok(spot)
    }

    pub async fn update(&self, id: i32, input: &ParkingSpotInput) -> Result<Option<ParkingSpot>> {
        let Some(spot) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: parkirna_mesta::ActiveModel = spot.into();
        active.name = Set(input.name.clone());
        active.latitude = Set(round_coordinate(input.latitude));
        active.longitude = Set(round_coordinate(input.longitude));
        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update parking spot")?;
        Ok(Some(updated))
    }

    pub async fn remove(&self, id: i32) -> Result<bool> {
        let result = ParkirnaMesta::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete parking spot")?;
        Ok(result.rows_affected > 0)
    }
}

/// Round to the column's six fractional digits.
#[must_use]
pub fn round_coordinate(value: f64) -> f64 {
    let scale = 10_f64.powi(DECIMAL_PLACES);
    (value * scale).round() / scale
}
