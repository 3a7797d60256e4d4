//! Report endpoints. Each answers 404 when no order falls in the requested window.

use axum::extract::{rejection::QueryRejection, Query, State};

use crate::core::services::CalculationService;
use crate::http::params::{self, ReportQuery};
use crate::http::response::{found, ApiResult};
use crate::http::AppState;

type ReportParams = Result<Query<ReportQuery>, QueryRejection>;

pub async fn daily(State(state): State<AppState>, query: ReportParams) -> ApiResult {
    let Query(query) = query?;
    let mut errors = Vec::new();
    let date = params::parse_date("date", query.date.as_deref(), &mut errors);
    let date = params::require(errors, date)?;
    let totals = state
        .run(move |store| CalculationService::daily_totals(store, date))
        .await?;
    found(totals, || format!("No orders found for {date}"))
}

pub async fn range(State(state): State<AppState>, query: ReportParams) -> ApiResult {
    let Query(query) = query?;
    let mut errors = Vec::new();
    let range = params::parse_range(query.start.as_deref(), query.end.as_deref(), &mut errors);
    let range = params::require(errors, range)?;
    let totals = state
        .run(move |store| CalculationService::range_totals(store, range))
        .await?;
    found(totals, || format!("No orders found between {} and {}", range.start, range.end))
}

pub async fn monthly(State(state): State<AppState>, query: ReportParams) -> ApiResult {
    let Query(query) = query?;
    let mut errors = Vec::new();
    let customer = params::parse_uuid("customer_id", query.customer_id.as_deref(), &mut errors);
    let range = params::parse_range(query.start.as_deref(), query.end.as_deref(), &mut errors);
    let (customer_id, range) = params::require(errors, customer.zip(range))?;
    let tax_rate = params::number_or(query.tax_rate.as_deref(), state.defaults.tax_rate);

    let bill = state
        .run(move |store| CalculationService::customer_monthly(store, customer_id, range, tax_rate))
        .await?;
    found(bill, || {
        format!(
            "No orders found for customer {customer_id} between {} and {}",
            range.start, range.end
        )
    })
}

pub async fn profit(State(state): State<AppState>, query: ReportParams) -> ApiResult {
    let Query(query) = query?;
    let mut errors = Vec::new();
    let range = params::parse_range(query.start.as_deref(), query.end.as_deref(), &mut errors);
    let range = params::require(errors, range)?;
    let cost_per_meal =
        params::number_or(query.cost_per_meal.as_deref(), state.defaults.cost_per_meal);

    let analysis = state
        .run(move |store| CalculationService::profit_analysis(store, range, cost_per_meal))
        .await?;
    found(analysis, || format!("No orders found between {} and {}", range.start, range.end))
}
