//! Invoices (bills) issued to customers from monthly calculations.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{common::*, report::CategoryLine};

/// Payments within half a cent of the grand total settle the invoice.
const SETTLEMENT_TOLERANCE: f64 = 0.005;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[default]
    Unpaid,
    PartiallyPaid,
    Paid,
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InvoiceStatus::Unpaid => "Unpaid",
            InvoiceStatus::PartiallyPaid => "Partially paid",
            InvoiceStatus::Paid => "Paid",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Invoice {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub number: String,
    pub customer_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<Uuid>,
    pub period: DateRange,
    pub lines: Vec<CategoryLine>,
    #[serde(flatten)]
    pub counts: MealCounts,
    pub subtotal: f64,
    pub tax_rate: f64,
    pub tax: f64,
    pub grand_total: f64,
    #[serde(default)]
    pub amount_paid: f64,
    #[serde(default)]
    pub status: InvoiceStatus,
    pub issued_on: NaiveDate,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    pub fn balance_due(&self) -> f64 {
        round_currency((self.grand_total - self.amount_paid).max(0.0))
    }

    /// Records the total paid against this invoice and refreshes its status.
    pub fn apply_payments(&mut self, total_paid: f64) {
        self.amount_paid = round_currency(total_paid.max(0.0));
        self.status = if self.amount_paid <= 0.0 {
            InvoiceStatus::Unpaid
        } else if self.amount_paid + SETTLEMENT_TOLERANCE >= self.grand_total {
            InvoiceStatus::Paid
        } else {
            InvoiceStatus::PartiallyPaid
        };
    }
}

impl Identifiable for Invoice {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for Invoice {
    fn display_label(&self) -> String {
        format!("{} ({}, {:.2})", self.number, self.status, self.grand_total)
    }
}

impl Record for Invoice {
    const COLLECTION: &'static str = "invoices";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoice(grand_total: f64) -> Invoice {
        let day = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        Invoice {
            id: Uuid::new_v4(),
            number: "INV-202401-0001".into(),
            customer_id: Uuid::new_v4(),
            driver_id: None,
            period: DateRange::month_of(day),
            lines: Vec::new(),
            counts: MealCounts::zero(),
            subtotal: grand_total,
            tax_rate: 0.0,
            tax: 0.0,
            grand_total,
            amount_paid: 0.0,
            status: InvoiceStatus::Unpaid,
            issued_on: day,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn status_tracks_payments() {
        let mut inv = invoice(118.0);
        inv.apply_payments(50.0);
        assert_eq!(inv.status, InvoiceStatus::PartiallyPaid);
        assert_eq!(inv.balance_due(), 68.0);

        inv.apply_payments(118.0);
        assert_eq!(inv.status, InvoiceStatus::Paid);
        assert_eq!(inv.balance_due(), 0.0);

        inv.apply_payments(0.0);
        assert_eq!(inv.status, InvoiceStatus::Unpaid);
    }
}
