//! Invoices, payments and customer statements.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::core::services::{InvoiceService, PaymentService};
use crate::domain::{DateRange, Payment};
use crate::http::params::{optional_uuid, path_id, ReportQuery};
use crate::http::response::{created, ok, ApiError, ApiResult};
use crate::http::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateInvoice {
    pub customer_id: Uuid,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default)]
    pub tax_rate: Option<f64>,
    #[serde(default)]
    pub issued_on: Option<NaiveDate>,
}

pub async fn list_invoices(
    State(state): State<AppState>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> ApiResult {
    let Query(query) = query?;
    let customer = optional_uuid("customer_id", query.customer_id.as_deref())?;
    ok(state.run(move |store| InvoiceService::list(store, customer)).await?)
}

pub async fn generate_invoice(
    State(state): State<AppState>,
    payload: Result<Json<GenerateInvoice>, JsonRejection>,
) -> ApiResult {
    let Json(request) = payload?;
    let period =
        DateRange::new(request.start, request.end).map_err(|err| ApiError::invalid(err.to_string()))?;
    let customer_id = request.customer_id;
    let tax_rate = request.tax_rate.unwrap_or(state.defaults.tax_rate);
    let issued_on = request
        .issued_on
        .unwrap_or_else(|| Utc::now().date_naive());
    created(
        state
            .run(move |store| {
                InvoiceService::generate(store, customer_id, period, tax_rate, issued_on)
            })
            .await?,
    )
}

pub async fn fetch_invoice(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let id = path_id(&id)?;
    ok(state.run(move |store| InvoiceService::get(store, id)).await?)
}

pub async fn remove_invoice(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let id = path_id(&id)?;
    state.run(move |store| InvoiceService::remove(store, id)).await?;
    ok(json!({ "id": id }))
}

pub async fn list_payments(
    State(state): State<AppState>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> ApiResult {
    let Query(query) = query?;
    let customer = optional_uuid("customer_id", query.customer_id.as_deref())?;
    ok(state.run(move |store| PaymentService::list(store, customer)).await?)
}

pub async fn record_payment(
    State(state): State<AppState>,
    payload: Result<Json<Payment>, JsonRejection>,
) -> ApiResult {
    let Json(payment) = payload?;
    created(state.run(move |store| PaymentService::record(store, payment)).await?)
}

pub async fn remove_payment(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let id = path_id(&id)?;
    state.run(move |store| PaymentService::remove(store, id)).await?;
    ok(json!({ "id": id }))
}

pub async fn statement(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let id = path_id(&id)?;
    ok(state.run(move |store| PaymentService::statement(store, id)).await?)
}
