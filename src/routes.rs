use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde_json::{Value, json};

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{MovieDto, MovieSearchInput, PagedResult},
    validation::SearchMoviesRequest,
};

pub async fn health(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    state.catalog.db().ping().await?;
    Ok(Json(json!({ "status": "ok" })))
}

pub async fn search_movies(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SearchMoviesRequest>, JsonRejection>,
) -> AppResult<Json<PagedResult<MovieDto>>> {
    let Json(request) = body?;
    let input = MovieSearchInput::try_from(request).map_err(AppError::InvalidArgument)?;
    let page = state.catalog.search(&input, &state.shutdown).await?;
    Ok(Json(page))
}
