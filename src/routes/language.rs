use axum::{Json, Router, extract::State, routing::get};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult, models::Language, response::ApiResponse, services::language_service,
    state::AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetLanguageRequest {
    pub language: Language,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_language).put(set_language))
}

#[utoipa::path(
    get,
    path = "/api/language",
    responses(
        (status = 200, description = "Current UI language", body = ApiResponse<Language>)
    ),
    tag = "Language"
)]
pub async fn get_language(State(state): State<AppState>) -> AppResult<Json<ApiResponse<Language>>> {
    let resp = language_service::get_language(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/language",
    request_body = SetLanguageRequest,
    responses(
        (status = 200, description = "Language switched", body = ApiResponse<Language>)
    ),
    tag = "Language"
)]
pub async fn set_language(
    State(state): State<AppState>,
    Json(payload): Json<SetLanguageRequest>,
) -> AppResult<Json<ApiResponse<Language>>> {
    let resp = language_service::set_language(&state, payload.language).await?;
    Ok(Json(resp))
}
