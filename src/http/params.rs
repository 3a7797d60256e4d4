//! Query-string parsing with error collection and numeric fallbacks.

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::DateRange;

use super::response::ApiError;

/// Every query parameter the report and listing endpoints understand.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub date: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub customer_id: Option<String>,
    pub tax_rate: Option<String>,
    pub cost_per_meal: Option<String>,
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp, keeping its date part.
pub fn parse_date(field: &str, raw: Option<&str>, errors: &mut Vec<String>) -> Option<NaiveDate> {
    let Some(value) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        errors.push(format!("{field} is required"));
        return None;
    };
    let parsed = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|ts| ts.date_naive()));
    if parsed.is_none() {
        errors.push(format!("{field} must be an ISO date (YYYY-MM-DD), got `{value}`"));
    }
    parsed
}

pub fn parse_range(
    start: Option<&str>,
    end: Option<&str>,
    errors: &mut Vec<String>,
) -> Option<DateRange> {
    let start = parse_date("start", start, errors);
    let end = parse_date("end", end, errors);
    match DateRange::new(start?, end?) {
        Ok(range) => Some(range),
        Err(err) => {
            errors.push(err.to_string());
            None
        }
    }
}

pub fn parse_uuid(field: &str, raw: Option<&str>, errors: &mut Vec<String>) -> Option<Uuid> {
    let Some(value) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        errors.push(format!("{field} is required"));
        return None;
    };
    match Uuid::parse_str(value) {
        Ok(id) => Some(id),
        Err(_) => {
            errors.push(format!("{field} must be a UUID, got `{value}`"));
            None
        }
    }
}

/// Parses an optional UUID filter; absent or blank values mean "no filter".
pub fn optional_uuid(field: &str, raw: Option<&str>) -> Result<Option<Uuid>, ApiError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(value) => Uuid::parse_str(value)
            .map(Some)
            .map_err(|_| ApiError::invalid(format!("{field} must be a UUID, got `{value}`"))),
    }
}

/// Parses a numeric override, falling back when it is absent or unparseable.
pub fn number_or(raw: Option<&str>, fallback: f64) -> f64 {
    raw.and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(fallback)
}

/// Turns collected errors into a 400, or yields the parsed value.
pub fn require<T>(errors: Vec<String>, value: Option<T>) -> Result<T, ApiError> {
    match value {
        Some(value) if errors.is_empty() => Ok(value),
        _ => Err(ApiError::Validation(errors)),
    }
}

pub fn path_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::invalid(format!("`{raw}` is not a valid id")))
}
