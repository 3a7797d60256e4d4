use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::bag_format;
use crate::core::services::OrderService;
use crate::domain::OrderDraft;
use crate::http::params::{self, path_id, ReportQuery};
use crate::http::response::{created, ok, ApiError, ApiResult};
use crate::http::AppState;

#[derive(Debug, Deserialize)]
pub struct BagRequest {
    pub bag_format: String,
}

/// Lists orders for `date`, or for an inclusive `start`..`end` range.
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> ApiResult {
    let Query(query) = query?;
    let mut errors = Vec::new();
    if query.date.is_some() {
        let date = params::parse_date("date", query.date.as_deref(), &mut errors);
        let date = params::require(errors, date)?;
        return ok(state.run(move |store| OrderService::list_on(store, date)).await?);
    }
    if query.start.is_none() && query.end.is_none() {
        return Err(ApiError::invalid("provide either `date` or `start` and `end`"));
    }
    let range = params::parse_range(query.start.as_deref(), query.end.as_deref(), &mut errors);
    let range = params::require(errors, range)?;
    ok(state.run(move |store| OrderService::list_between(store, range)).await?)
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<OrderDraft>, JsonRejection>,
) -> ApiResult {
    let Json(draft) = payload?;
    created(state.run(move |store| OrderService::create(store, draft)).await?)
}

pub async fn fetch(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let id = path_id(&id)?;
    ok(state.run(move |store| OrderService::get(store, id)).await?)
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<OrderDraft>, JsonRejection>,
) -> ApiResult {
    let id = path_id(&id)?;
    let Json(draft) = payload?;
    ok(state.run(move |store| OrderService::update(store, id, draft)).await?)
}

pub async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let id = path_id(&id)?;
    state.run(move |store| OrderService::remove(store, id)).await?;
    ok(json!({ "id": id }))
}

/// Reports the parsed counts; an invalid format is a normal answer, not a failed request.
pub async fn validate_bag(payload: Result<Json<BagRequest>, JsonRejection>) -> ApiResult {
    let Json(request) = payload?;
    ok(bag_format::validate(&request.bag_format))
}
