//! Collection metadata handlers

use axum::{extract::State, Json};
use serde::Serialize;
use std::time::Instant;

use crate::AppState;
use lexforge_common::errors::Result;
use lexforge_retrieval::search::{CollectionStats, FilterOptions};

/// Filter options response
#[derive(Serialize)]
pub struct FiltersResponse {
    #[serde(flatten)]
    pub options: FilterOptions,
    pub processing_time_ms: u64,
}

/// Distinct filter values present in the collection
pub async fn filters(State(state): State<AppState>) -> Result<Json<FiltersResponse>> {
    let start = Instant::now();

    let options = state.search.available_filters().await?;

    Ok(Json(FiltersResponse {
        options,
        processing_time_ms: start.elapsed().as_millis() as u64,
    }))
}

/// Collection statistics
pub async fn stats(State(state): State<AppState>) -> Result<Json<CollectionStats>> {
    state.search.stats().await.map(Json)
}
