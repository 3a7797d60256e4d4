use std::collections::HashMap;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::core::calculation::{self, check_cost_per_meal, check_tax_rate};
use crate::domain::{
    Customer, DailyTotals, DateRange, Driver, FoodCategory, MonthlyCalculation, ProfitAnalysis,
    RangeTotals,
};
use crate::storage::{DocumentStore, StoreExt};

use super::{EntityService, ServiceError, ServiceResult};

/// Loads orders from the store and runs the report reducers over them.
///
/// `Ok(None)` means no order matched; it is not an error.
pub struct CalculationService;

impl CalculationService {
    pub fn daily_totals(
        store: &dyn DocumentStore,
        date: NaiveDate,
    ) -> ServiceResult<Option<DailyTotals>> {
        let orders = store.orders_on(date)?;
        let drivers = EntityService::names::<Driver>(store)?;
        let totals = calculation::summarize_day(date, &orders, &drivers);
        tracing::debug!(%date, found = totals.is_some(), "daily totals");
        Ok(totals)
    }

    pub fn range_totals(
        store: &dyn DocumentStore,
        range: DateRange,
    ) -> ServiceResult<Option<RangeTotals>> {
        let orders = store.orders_between(&range)?;
        let drivers = EntityService::names::<Driver>(store)?;
        let totals = calculation::summarize_range(range, &orders, &drivers);
        tracing::debug!(%range, found = totals.is_some(), "range totals");
        Ok(totals)
    }

    pub fn customer_monthly(
        store: &dyn DocumentStore,
        customer_id: Uuid,
        range: DateRange,
        tax_rate: f64,
    ) -> ServiceResult<Option<MonthlyCalculation>> {
        if let Some(problem) = check_tax_rate(tax_rate) {
            return Err(ServiceError::invalid(problem));
        }
        let customer = EntityService::get::<Customer>(store, customer_id)?;
        let orders = store.orders_between(&range)?;
        let categories: HashMap<Uuid, FoodCategory> = store
            .all::<FoodCategory>()?
            .into_iter()
            .map(|category| (category.id, category))
            .collect();
        let drivers = EntityService::names::<Driver>(store)?;
        let bill =
            calculation::bill_customer(&customer, range, &orders, &categories, &drivers, tax_rate);
        tracing::debug!(customer = %customer_id, %range, found = bill.is_some(), "customer monthly");
        Ok(bill)
    }

    pub fn profit_analysis(
        store: &dyn DocumentStore,
        range: DateRange,
        cost_per_meal: f64,
    ) -> ServiceResult<Option<ProfitAnalysis>> {
        if let Some(problem) = check_cost_per_meal(cost_per_meal) {
            return Err(ServiceError::invalid(problem));
        }
        let orders = store.orders_between(&range)?;
        Ok(calculation::analyze_profit(range, &orders, cost_per_meal))
    }
}
