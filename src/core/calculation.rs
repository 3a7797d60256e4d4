//! Pure reducers turning fetched orders into report aggregates.
//!
//! Every reducer returns `None` when no order matches its date filter. Totals are
//! always sums of the stored per-item counts and amounts.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{
    round_currency, CategoryLine, Customer, DailyOrder, DailyTotals, DateRange, DriverTotals,
    FoodCategory, MealCounts, MonthlyCalculation, ProfitAnalysis, RangeTotals,
};

/// Display names keyed by entity id.
pub type NameBook = HashMap<Uuid, String>;

#[derive(Default)]
struct Tally {
    order_count: usize,
    item_count: usize,
    customers: BTreeSet<Uuid>,
    days: BTreeSet<NaiveDate>,
    counts: MealCounts,
    amount: f64,
}

impl Tally {
    fn absorb(&mut self, order: &DailyOrder) {
        self.order_count += 1;
        self.item_count += order.items.len();
        self.customers.extend(order.customer_ids());
        self.days.insert(order.date);
        for item in &order.items {
            self.counts += item.counts();
            self.amount += item.amount;
        }
    }
}

/// Totals for a single date, with a per-driver breakdown.
pub fn summarize_day(
    date: NaiveDate,
    orders: &[DailyOrder],
    driver_names: &NameBook,
) -> Option<DailyTotals> {
    let matching: Vec<&DailyOrder> = orders.iter().filter(|order| order.date == date).collect();
    if matching.is_empty() {
        return None;
    }
    let mut tally = Tally::default();
    for order in &matching {
        tally.absorb(order);
    }
    Some(DailyTotals {
        date,
        order_count: tally.order_count,
        item_count: tally.item_count,
        customer_count: tally.customers.len(),
        counts: tally.counts,
        amount: tally.amount,
        drivers: driver_breakdown(&matching, driver_names),
    })
}

/// Totals across an inclusive date range, grouped by driver.
pub fn summarize_range(
    range: DateRange,
    orders: &[DailyOrder],
    driver_names: &NameBook,
) -> Option<RangeTotals> {
    let matching: Vec<&DailyOrder> = orders
        .iter()
        .filter(|order| range.contains(order.date))
        .collect();
    if matching.is_empty() {
        return None;
    }
    let mut tally = Tally::default();
    for order in &matching {
        tally.absorb(order);
    }
    let active_days = tally.days.len();
    Some(RangeTotals {
        range,
        order_count: tally.order_count,
        item_count: tally.item_count,
        customer_count: tally.customers.len(),
        active_days,
        average_meals_per_day: round_currency(tally.counts.total as f64 / active_days as f64),
        counts: tally.counts,
        amount: tally.amount,
        drivers: driver_breakdown(&matching, driver_names),
    })
}

fn driver_breakdown(orders: &[&DailyOrder], driver_names: &NameBook) -> Vec<DriverTotals> {
    let mut grouped: BTreeMap<Uuid, DriverTotals> = BTreeMap::new();
    for order in orders {
        let entry = grouped
            .entry(order.driver_id)
            .or_insert_with(|| DriverTotals {
                driver_id: order.driver_id,
                driver_name: driver_names.get(&order.driver_id).cloned(),
                order_count: 0,
                counts: MealCounts::zero(),
                amount: 0.0,
            });
        entry.order_count += 1;
        entry.counts += order.counts();
        entry.amount += order.amount();
    }
    let mut rows: Vec<DriverTotals> = grouped.into_values().collect();
    rows.sort_by(|a, b| {
        a.driver_name
            .cmp(&b.driver_name)
            .then(a.driver_id.cmp(&b.driver_id))
    });
    rows
}

/// Builds a customer's itemized bill over `range`.
///
/// Lines are grouped by category and unit price so a mid-period price change
/// shows up as two lines instead of a blended rate.
pub fn bill_customer(
    customer: &Customer,
    range: DateRange,
    orders: &[DailyOrder],
    categories: &HashMap<Uuid, FoodCategory>,
    driver_names: &NameBook,
    tax_rate: f64,
) -> Option<MonthlyCalculation> {
    let mut lines: BTreeMap<(Uuid, u64), CategoryLine> = BTreeMap::new();
    let mut deliveries_by_driver: BTreeMap<Uuid, usize> = BTreeMap::new();
    let mut delivery_days = BTreeSet::new();
    let mut counts = MealCounts::zero();
    let mut subtotal = 0.0;

    for order in orders.iter().filter(|order| range.contains(order.date)) {
        for item in order.items_for(customer.id) {
            let line = lines
                .entry((item.category_id, item.unit_price.to_bits()))
                .or_insert_with(|| CategoryLine {
                    category_id: item.category_id,
                    category_name: categories
                        .get(&item.category_id)
                        .map(|category| category.name.clone())
                        .unwrap_or_else(|| "Unknown category".into()),
                    counts: MealCounts::zero(),
                    unit_price: item.unit_price,
                    amount: 0.0,
                });
            line.counts += item.counts();
            line.amount += item.amount;
            counts += item.counts();
            subtotal += item.amount;
            delivery_days.insert(order.date);
            *deliveries_by_driver.entry(order.driver_id).or_default() += 1;
        }
    }

    if lines.is_empty() {
        return None;
    }

    let driver_id = customer
        .driver_id
        .or_else(|| busiest_driver(&deliveries_by_driver));
    let mut lines: Vec<CategoryLine> = lines.into_values().collect();
    lines.sort_by(|a, b| {
        a.category_name
            .cmp(&b.category_name)
            .then(a.unit_price.total_cmp(&b.unit_price))
    });
    let tax = round_currency(subtotal * tax_rate);

    Some(MonthlyCalculation {
        customer_id: customer.id,
        customer_name: customer.name.clone(),
        driver_id,
        driver_name: driver_id.and_then(|id| driver_names.get(&id).cloned()),
        range,
        lines,
        counts,
        delivery_days: delivery_days.len(),
        subtotal,
        tax_rate,
        tax,
        grand_total: round_currency(subtotal + tax),
    })
}

/// Driver with the most deliveries; ties go to the lowest id.
fn busiest_driver(deliveries: &BTreeMap<Uuid, usize>) -> Option<Uuid> {
    let mut best: Option<(Uuid, usize)> = None;
    for (&driver, &count) in deliveries {
        match best {
            Some((_, top)) if top >= count => {}
            _ => best = Some((driver, count)),
        }
    }
    best.map(|(driver, _)| driver)
}

/// Revenue against an assumed flat cost per meal.
pub fn analyze_profit(
    range: DateRange,
    orders: &[DailyOrder],
    cost_per_meal: f64,
) -> Option<ProfitAnalysis> {
    let mut tally = Tally::default();
    for order in orders.iter().filter(|order| range.contains(order.date)) {
        tally.absorb(order);
    }
    if tally.order_count == 0 {
        return None;
    }

    let revenue = tally.amount;
    let cost = round_currency(tally.counts.total as f64 * cost_per_meal);
    let profit = round_currency(revenue - cost);
    let margin_percent = if revenue > 0.0 {
        round_currency(profit / revenue * 100.0)
    } else {
        0.0
    };
    let revenue_per_meal = if tally.counts.total > 0 {
        round_currency(revenue / tally.counts.total as f64)
    } else {
        0.0
    };

    Some(ProfitAnalysis {
        range,
        order_count: tally.order_count,
        counts: tally.counts,
        revenue,
        cost_per_meal,
        cost,
        profit,
        margin_percent,
        revenue_per_meal,
        cost_per_order: round_currency(cost / tally.order_count as f64),
    })
}

/// Returns a message when `rate` is not a usable tax rate.
pub fn check_tax_rate(rate: f64) -> Option<String> {
    if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
        Some(format!("tax rate must be between 0 and 1 (got {rate})"))
    } else {
        None
    }
}

pub fn check_cost_per_meal(cost: f64) -> Option<String> {
    if !cost.is_finite() || cost < 0.0 {
        Some(format!("cost per meal must be zero or positive (got {cost})"))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrderItem;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    struct Fixture {
        customer: Customer,
        other: Customer,
        lunch: FoodCategory,
        driver_a: Uuid,
        driver_b: Uuid,
        orders: Vec<DailyOrder>,
    }

    fn fixture() -> Fixture {
        let customer = Customer::new("Acme Canteen");
        let other = Customer::new("Beta Office");
        let lunch = FoodCategory::new("Lunch", 50.0);
        let driver_a = Uuid::new_v4();
        let driver_b = Uuid::new_v4();
        let item = |who: &Customer, non_veg, veg| {
            OrderItem::new(
                who.id,
                lunch.id,
                format!("{non_veg}+{veg}"),
                MealCounts::new(non_veg, veg),
                lunch.price_per_meal,
            )
        };
        let orders = vec![
            DailyOrder::new(date(1), driver_a, vec![item(&customer, 10, 7), item(&other, 2, 0)]),
            DailyOrder::new(date(1), driver_b, vec![item(&other, 1, 1)]),
            DailyOrder::new(date(3), driver_a, vec![item(&customer, 4, 0)]),
        ];
        Fixture {
            customer,
            other,
            lunch,
            driver_a,
            driver_b,
            orders,
        }
    }

    #[test]
    fn day_totals_sum_items_and_split_by_driver() {
        let fx = fixture();
        let names = NameBook::from([(fx.driver_a, "Anil".to_string())]);
        let totals = summarize_day(date(1), &fx.orders, &names).expect("orders on day");
        assert_eq!(totals.order_count, 2);
        assert_eq!(totals.item_count, 3);
        assert_eq!(totals.customer_count, 2);
        assert_eq!(totals.counts, MealCounts::new(13, 8));
        assert_eq!(totals.amount, 21.0 * 50.0);
        assert_eq!(totals.drivers.len(), 2);
        let anil = totals
            .drivers
            .iter()
            .find(|row| row.driver_id == fx.driver_a)
            .unwrap();
        assert_eq!(anil.driver_name.as_deref(), Some("Anil"));
        assert_eq!(anil.counts.total, 19);
        let driver_sum: u64 = totals.drivers.iter().map(|row| row.counts.total).sum();
        assert_eq!(driver_sum, totals.counts.total);
    }

    #[test]
    fn empty_day_is_not_found() {
        let fx = fixture();
        assert!(summarize_day(date(2), &fx.orders, &NameBook::new()).is_none());
    }

    #[test]
    fn range_totals_track_active_days() {
        let fx = fixture();
        let range = DateRange::new(date(1), date(5)).unwrap();
        let totals = summarize_range(range, &fx.orders, &NameBook::new()).unwrap();
        assert_eq!(totals.order_count, 3);
        assert_eq!(totals.active_days, 2);
        assert_eq!(totals.counts.total, 25);
        assert_eq!(totals.average_meals_per_day, 12.5);
        let outside = DateRange::new(date(10), date(20)).unwrap();
        assert!(summarize_range(outside, &fx.orders, &NameBook::new()).is_none());
    }

    #[test]
    fn customer_bill_applies_tax_to_subtotal() {
        let fx = fixture();
        let range = DateRange::month_of(date(1));
        let categories = HashMap::from([(fx.lunch.id, fx.lunch.clone())]);
        let bill = bill_customer(
            &fx.customer,
            range,
            &fx.orders,
            &categories,
            &NameBook::new(),
            0.18,
        )
        .expect("customer has orders");
        assert_eq!(bill.counts, MealCounts::new(14, 7));
        assert_eq!(bill.lines.len(), 1);
        assert_eq!(bill.lines[0].category_name, "Lunch");
        assert_eq!(bill.subtotal, 1050.0);
        assert_eq!(bill.tax, 189.0);
        assert_eq!(bill.grand_total, 1239.0);
        assert_eq!(bill.delivery_days, 2);
        assert_eq!(bill.driver_id, Some(fx.driver_a));
    }

    #[test]
    fn bill_splits_lines_on_price_change() {
        let fx = fixture();
        let mut orders = fx.orders.clone();
        orders.push(DailyOrder::new(
            date(4),
            fx.driver_b,
            vec![OrderItem::new(
                fx.other.id,
                fx.lunch.id,
                "3",
                MealCounts::new(3, 0),
                55.0,
            )],
        ));
        let bill = bill_customer(
            &fx.other,
            DateRange::month_of(date(1)),
            &orders,
            &HashMap::new(),
            &NameBook::new(),
            0.0,
        )
        .unwrap();
        assert_eq!(bill.lines.len(), 2);
        assert_eq!(bill.subtotal, 4.0 * 50.0 + 3.0 * 55.0);
        assert_eq!(bill.grand_total, 365.0);
    }

    #[test]
    fn bill_without_items_is_not_found() {
        let fx = fixture();
        let stranger = Customer::new("Nobody");
        assert!(bill_customer(
            &stranger,
            DateRange::month_of(date(1)),
            &fx.orders,
            &HashMap::new(),
            &NameBook::new(),
            0.18
        )
        .is_none());
    }

    #[test]
    fn profit_uses_flat_meal_cost() {
        let fx = fixture();
        let range = DateRange::new(date(1), date(31)).unwrap();
        let profit = analyze_profit(range, &fx.orders, 25.0).unwrap();
        assert_eq!(profit.revenue, 1250.0);
        assert_eq!(profit.cost, 625.0);
        assert_eq!(profit.profit, 625.0);
        assert_eq!(profit.margin_percent, 50.0);
        assert_eq!(profit.revenue_per_meal, 50.0);
        assert_eq!(profit.cost_per_order, 208.33);
    }

    #[test]
    fn busiest_driver_prefers_lowest_id_on_tie() {
        let low = Uuid::from_u128(1);
        let high = Uuid::from_u128(2);
        let deliveries = BTreeMap::from([(low, 2), (high, 2)]);
        assert_eq!(busiest_driver(&deliveries), Some(low));
        let deliveries = BTreeMap::from([(low, 1), (high, 3)]);
        assert_eq!(busiest_driver(&deliveries), Some(high));
    }

    #[test]
    fn parameter_checks() {
        assert!(check_tax_rate(0.18).is_none());
        assert!(check_tax_rate(1.5).is_some());
        assert!(check_tax_rate(f64::NAN).is_some());
        assert!(check_cost_per_meal(0.0).is_none());
        assert!(check_cost_per_meal(-1.0).is_some());
    }
}
