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
pub struct StreetDto {
    pub id: i32,
    pub name: String,
}

impl From<crate::db::Street> for StreetDto {
    fn from(street: crate::db::Street) -> Self {
        Self {
            id: street.id,
            name: street.name,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StreetRequest {
    pub id: Option<i32>,
    pub name: Option<String>,
}

/// GET /api/slovenske-ulice/: one street when an id is given, otherwise all.
pub async fn get_streets(
    State(state): State<Arc<AppState>>,
    query: Result<Query<IdQuery>, QueryRejection>,
    JsonBody(payload): JsonBody<StreetRequest>,
) -> Result<Json<ApiResponse<Data<OneOrMany<StreetDto>>>>, ApiError> {
    let data = match super::lookup_id(query, payload.id)? {
        Some(id) => {
            let street = state
                .store()
                .get_street(id)
                .await?
                .ok_or_else(|| ApiError::not_found("Street", id))?;
            OneOrMany::One(StreetDto::from(street))
        }
        None => {
            let streets = state.store().list_streets().await?;
            OneOrMany::Many(streets.into_iter().map(StreetDto::from).collect())
        }
    };

    Ok(Json(ApiResponse::success(Data { data })))
}

pub async fn create_street(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<StreetRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Data<StreetDto>>>), ApiError> {
    let name = require_text(payload.name, "name")?;
    let street = state.store().add_street(&name).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Street created",
            Data {
                data: StreetDto::from(street),
            },
        )),
    ))
}

pub async fn update_street(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<StreetRequest>,
) -> Result<Json<ApiResponse<Data<StreetDto>>>, ApiError> {
    let id = require_id(payload.id, "id")?;
    let name = require_text(payload.name, "name")?;

    let street = state
        .store()
        .update_street(id, &name)
        .await?
        .ok_or_else(|| ApiError::not_found("Street", id))?;

    Ok(Json(ApiResponse::with_message(
        "Street updated",
        Data {
            data: StreetDto::from(street),
        },
    )))
}

pub async fn delete_street(
    State(state): State<Arc<AppState>>,
    query: Result<Query<IdQuery>, QueryRejection>,
    JsonBody(payload): JsonBody<StreetRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    let id = super::lookup_id(query, payload.id)?
        .ok_or_else(|| ApiError::validation("id is required"))?;

    if state.store().remove_street(id).await? {
        Ok(Json(ApiResponse::message("Street deleted")))
    } else {
        Err(ApiError::not_found("Street", id))
    }
}
