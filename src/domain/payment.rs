use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    BankTransfer,
    Upi,
    Cheque,
    Other,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::BankTransfer => "Bank transfer",
            PaymentMethod::Upi => "UPI",
            PaymentMethod::Cheque => "Cheque",
            PaymentMethod::Other => "Other",
        };
        f.write_str(label)
    }
}

/// Money received from a customer, optionally settling a specific invoice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub customer_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<Uuid>,
    pub amount: f64,
    #[serde(default)]
    pub method: PaymentMethod,
    pub paid_on: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(customer_id: Uuid, amount: f64, paid_on: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id,
            invoice_id: None,
            amount,
            method: PaymentMethod::default(),
            paid_on,
            reference: None,
            created_at: Utc::now(),
        }
    }

    pub fn for_invoice(mut self, invoice_id: Uuid) -> Self {
        self.invoice_id = Some(invoice_id);
        self
    }
}

impl Identifiable for Payment {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for Payment {
    fn display_label(&self) -> String {
        format!("{:.2} via {} on {}", self.amount, self.method, self.paid_on)
    }
}

impl Record for Payment {
    const COLLECTION: &'static str = "payments";
}
