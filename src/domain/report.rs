//! Aggregate report shapes produced by the calculation engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{common::*, invoice::Invoice, payment::Payment};

/// Orders, meals, and revenue attributed to one driver.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DriverTotals {
    pub driver_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_name: Option<String>,
    pub order_count: usize,
    #[serde(flatten)]
    pub counts: MealCounts,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyTotals {
    pub date: NaiveDate,
    pub order_count: usize,
    pub item_count: usize,
    pub customer_count: usize,
    #[serde(flatten)]
    pub counts: MealCounts,
    pub amount: f64,
    pub drivers: Vec<DriverTotals>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RangeTotals {
    pub range: DateRange,
    pub order_count: usize,
    pub item_count: usize,
    pub customer_count: usize,
    pub active_days: usize,
    pub average_meals_per_day: f64,
    #[serde(flatten)]
    pub counts: MealCounts,
    pub amount: f64,
    pub drivers: Vec<DriverTotals>,
}

/// One itemized bill line: a category at a single unit price.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryLine {
    pub category_id: Uuid,
    pub category_name: String,
    #[serde(flatten)]
    pub counts: MealCounts,
    pub unit_price: f64,
    pub amount: f64,
}

/// A customer's itemized bill for a date range.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyCalculation {
    pub customer_id: Uuid,
    pub customer_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_name: Option<String>,
    pub range: DateRange,
    pub lines: Vec<CategoryLine>,
    #[serde(flatten)]
    pub counts: MealCounts,
    pub delivery_days: usize,
    pub subtotal: f64,
    pub tax_rate: f64,
    pub tax: f64,
    pub grand_total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfitAnalysis {
    pub range: DateRange,
    pub order_count: usize,
    #[serde(flatten)]
    pub counts: MealCounts,
    pub revenue: f64,
    pub cost_per_meal: f64,
    pub cost: f64,
    pub profit: f64,
    pub margin_percent: f64,
    pub revenue_per_meal: f64,
    pub cost_per_order: f64,
}

/// Invoiced, paid, and outstanding figures for one customer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerStatement {
    pub customer_id: Uuid,
    pub customer_name: String,
    pub invoiced: f64,
    pub paid: f64,
    pub outstanding: f64,
    pub invoices: Vec<Invoice>,
    pub payments: Vec<Payment>,
}
