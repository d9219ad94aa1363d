use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::validation::{require_id, require_text};
use super::{ApiError, ApiResponse, AppState, Data, Empty, IdQuery, JsonBody, OneOrMany};

#[derive(Debug, Serialize)]
pub struct CityDto {
    pub id: i32,
    pub name: String,
}

impl From<crate::db::City> for CityDto {
    fn from(city: crate::db::City) -> Self {
        Self {
            id: city.id,
            name: city.name,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CityRequest {
    pub id: Option<i32>,
    pub name: Option<String>,
}

/// GET /api/slovenska-mesta/: one city when an id is given, otherwise all.
pub async fn get_cities(
    State(state): State<Arc<AppState>>,
    query: Result<Query<IdQuery>, QueryRejection>,
    JsonBody(payload): JsonBody<CityRequest>,
) -> Result<Json<ApiResponse<Data<OneOrMany<CityDto>>>>, ApiError> {
    let data = match super::lookup_id(query, payload.id)? {
        Some(id) => {
            let city = state
                .store()
                .get_city(id)
                .await?
                .ok_or_else(|| ApiError::not_found("City", id))?;
            OneOrMany::One(CityDto::from(city))
        }
        None => {
            let cities = state.store().list_cities().await?;
            OneOrMany::Many(cities.into_iter().map(CityDto::from).collect())
        }
    };

    Ok(Json(ApiResponse::success(Data { data })))
}

pub async fn create_city(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<CityRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Data<CityDto>>>), ApiError> {
    let name = require_text(payload.name, "name")?;
    let city = state.store().add_city(&name).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "City created",
            Data {
                data: CityDto::from(city),
            },
        )),
    ))
}

pub async fn update_city(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<CityRequest>,
) -> Result<Json<ApiResponse<Data<CityDto>>>, ApiError> {
    let id = require_id(payload.id, "id")?;
    let name = require_text(payload.name, "name")?;

    let city = state
        .store()
        .update_city(id, &name)
        .await?
        .ok_or_else(|| ApiError::not_found("City", id))?;

    Ok(Json(ApiResponse::with_message(
        "City updated",
        Data {
            data: CityDto::from(city),
        },
    )))
}

pub async fn delete_city(
    State(state): State<Arc<AppState>>,
    query: Result<Query<IdQuery>, QueryRejection>,
    JsonBody(payload): JsonBody<CityRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    let id = super::lookup_id(query, payload.id)?
        .ok_or_else(|| ApiError::validation("id is required"))?;

    if state.store().remove_city(id).await? {
        Ok(Json(ApiResponse::message("City deleted")))
    } else {
        Err(ApiError::not_found("City", id))
    }
}
