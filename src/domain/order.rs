//! Daily orders and their line items.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// One customer's delivery within a daily order.
///
/// Counts are derived from `bag_format` when the item is created and the amount is
/// fixed at the category price in effect at that time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub customer_id: Uuid,
    pub category_id: Uuid,
    pub bag_format: String,
    pub non_veg_count: u64,
    pub veg_count: u64,
    pub total_count: u64,
    pub unit_price: f64,
    pub amount: f64,
}

impl OrderItem {
    pub fn new(
        customer_id: Uuid,
        category_id: Uuid,
        bag_format: impl Into<String>,
        counts: MealCounts,
        unit_price: f64,
    ) -> Self {
        Self {
            customer_id,
            category_id,
            bag_format: bag_format.into(),
            non_veg_count: counts.non_veg,
            veg_count: counts.veg,
            total_count: counts.total,
            unit_price,
            amount: counts.total as f64 * unit_price,
        }
    }

    pub fn counts(&self) -> MealCounts {
        MealCounts {
            non_veg: self.non_veg_count,
            veg: self.veg_count,
            total: self.total_count,
        }
    }
}

/// All deliveries made by one driver on one date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyOrder {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub date: NaiveDate,
    pub driver_id: Uuid,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl DailyOrder {
    pub fn new(date: NaiveDate, driver_id: Uuid, items: Vec<OrderItem>) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            driver_id,
            items,
            notes: None,
            created_at: Utc::now(),
        }
    }

    pub fn counts(&self) -> MealCounts {
        self.items.iter().fold(MealCounts::zero(), |mut acc, item| {
            acc += item.counts();
            acc
        })
    }

    pub fn amount(&self) -> f64 {
        self.items.iter().map(|item| item.amount).sum()
    }

    pub fn customer_ids(&self) -> BTreeSet<Uuid> {
        self.items.iter().map(|item| item.customer_id).collect()
    }

    pub fn items_for(&self, customer_id: Uuid) -> impl Iterator<Item = &OrderItem> {
        self.items
            .iter()
            .filter(move |item| item.customer_id == customer_id)
    }
}

impl Identifiable for DailyOrder {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for DailyOrder {
    fn display_label(&self) -> String {
        format!("{} order {} ({})", self.date, self.id, self.counts())
    }
}

impl Record for DailyOrder {
    const COLLECTION: &'static str = "daily_orders";
}

/// Caller-supplied order contents before bag formats are parsed and priced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderDraft {
    pub date: NaiveDate,
    pub driver_id: Uuid,
    #[serde(default)]
    pub items: Vec<OrderItemDraft>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItemDraft {
    pub customer_id: Uuid,
    pub category_id: Uuid,
    pub bag_format: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_amount_follows_total_count() {
        let item = OrderItem::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "5,5+7",
            MealCounts::new(10, 7),
            12.5,
        );
        assert_eq!(item.total_count, 17);
        assert_eq!(item.amount, 212.5);
    }

    #[test]
    fn order_counts_sum_items() {
        let customer = Uuid::new_v4();
        let category = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let order = DailyOrder::new(
            date,
            Uuid::new_v4(),
            vec![
                OrderItem::new(customer, category, "3+1", MealCounts::new(3, 1), 10.0),
                OrderItem::new(customer, category, "2", MealCounts::new(2, 0), 10.0),
            ],
        );
        assert_eq!(order.counts(), MealCounts::new(5, 1));
        assert_eq!(order.amount(), 60.0);
        assert_eq!(order.customer_ids().len(), 1);
        assert_eq!(order.items_for(customer).count(), 2);
    }
}
