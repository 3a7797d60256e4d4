//! CRUD handlers shared by drivers, customers, companies and food categories.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::json;

use crate::core::services::{EntityService, ManagedEntity};
use crate::http::params::path_id;
use crate::http::response::{created, ok, ApiResult};
use crate::http::AppState;

pub async fn list<T: ManagedEntity>(State(state): State<AppState>) -> ApiResult {
    ok(state.run(|store| EntityService::list::<T>(store)).await?)
}

pub async fn fetch<T: ManagedEntity>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult {
    let id = path_id(&id)?;
    ok(state.run(move |store| EntityService::get::<T>(store, id)).await?)
}

pub async fn create<T: ManagedEntity>(
    State(state): State<AppState>,
    payload: Result<Json<T>, JsonRejection>,
) -> ApiResult {
    let Json(entity) = payload?;
    created(state.run(move |store| EntityService::add(store, entity)).await?)
}

pub async fn update<T: ManagedEntity>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<T>, JsonRejection>,
) -> ApiResult {
    let id = path_id(&id)?;
    let Json(changes) = payload?;
    ok(state.run(move |store| EntityService::edit(store, id, changes)).await?)
}

pub async fn remove<T: ManagedEntity>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult {
    let id = path_id(&id)?;
    state.run(move |store| EntityService::remove::<T>(store, id)).await?;
    ok(json!({ "id": id }))
}
