use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::validation::{require_coordinate, require_id, require_text};
use super::{ApiError, ApiResponse, AppState, Data, Empty, IdQuery, JsonBody, OneOrMany};
use crate::db::ParkingSpotInput;

#[derive(Debug, Serialize)]
pub struct ParkingSpotDto {
    pub id: i32,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<crate::db::ParkingSpot> for ParkingSpotDto {
    fn from(spot: crate::db::ParkingSpot) -> Self {
        Self {
            id: spot.id,
            name: spot.name,
            latitude: spot.latitude,
            longitude: spot.longitude,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ParkingSpotRequest {
    pub id: Option<i32>,
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl ParkingSpotRequest {
    fn into_input(self) -> Result<ParkingSpotInput, ApiError> {
        Ok(ParkingSpotInput {
            name: require_text(self.name, "name")?,
            latitude: require_coordinate(self.latitude, "latitude")?,
            longitude: require_coordinate(self.longitude, "longitude")?,
        })
    }
}

/// GET /api/parkirna-mesta/
pub async fn get_parking_spots(
    State(state): State<Arc<AppState>>,
    query: Result<Query<IdQuery>, QueryRejection>,
    JsonBody(payload): JsonBody<ParkingSpotRequest>,
) -> Result<Json<ApiResponse<Data<OneOrMany<ParkingSpotDto>>>>, ApiError> {
    let data = match super::lookup_id(query, payload.id)? {
        Some(id) => {
            let spot = state
                .store()
                .get_parking_spot(id)
                .await?
                .ok_or_else(|| ApiError::not_found("Parking spot", id))?;
            OneOrMany::One(ParkingSpotDto::from(spot))
        }
        None => {
            let spots = state.store().list_parking_spots().await?;
            OneOrMany::Many(spots.into_iter().map(ParkingSpotDto::from).collect())
        }
    };

    Ok(Json(ApiResponse::success(Data { data })))
}

pub async fn create_parking_spot(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<ParkingSpotRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Data<ParkingSpotDto>>>), ApiError> {
    let input = payload.into_input()?;
    let spot = state.store().add_parking_spot(&input).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Parking spot created",
            Data {
                data: ParkingSpotDto::from(spot),
            },
        )),
    ))
}

pub async fn update_parking_spot(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<ParkingSpotRequest>,
) -> Result<Json<ApiResponse<Data<ParkingSpotDto>>>, ApiError> {
    let id = require_id(payload.id, "id")?;
    let input = payload.into_input()?;

    let spot = state
        .store()
        .update_parking_spot(id, &input)
        .await?
        .ok_or_else(|| ApiError::not_found("Parking spot", id))?;

    Ok(Json(ApiResponse::with_message(
        "Parking spot updated",
        Data {
            data: ParkingSpotDto::from(spot),
        },
    )))
}

pub async fn delete_parking_spot(
    State(state): State<Arc<AppState>>,
    query: Result<Query<IdQuery>, QueryRejection>,
    JsonBody(payload): JsonBody<ParkingSpotRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    let id = super::lookup_id(query, payload.id)?
        .ok_or_else(|| ApiError::validation("id is required"))?;

    if state.store().remove_parking_spot(id).await? {
        Ok(Json(ApiResponse::message("Parking spot deleted")))
    } else {
        Err(ApiError::not_found("Parking spot", id))
    }
}
