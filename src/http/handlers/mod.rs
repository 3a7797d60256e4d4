pub mod billing;
pub mod calculations;
pub mod entities;
pub mod orders;

use serde_json::json;

use crate::utils::build_info;

use super::response::{ok, ApiError, ApiResult};

pub async fn health() -> ApiResult {
    ok(json!({
        "status": "ok",
        "build": build_info::current(),
    }))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound("Route not found".into())
}
