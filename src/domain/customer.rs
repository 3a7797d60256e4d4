//! Customers receiving daily meal deliveries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// A customer, optionally attached to a company and an assigned driver.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<Uuid>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            phone: None,
            address: None,
            company_id: None,
            driver_id: None,
            active: true,
            created_at: Utc::now(),
        }
    }

    pub fn with_driver(mut self, driver_id: Uuid) -> Self {
        self.driver_id = Some(driver_id);
        self
    }

    pub fn with_company(mut self, company_id: Uuid) -> Self {
        self.company_id = Some(company_id);
        self
    }
}

impl Identifiable for Customer {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Customer {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Customer {
    fn display_label(&self) -> String {
        if self.active {
            self.name.clone()
        } else {
            format!("{} (inactive)", self.name)
        }
    }
}

impl Record for Customer {
    const COLLECTION: &'static str = "customers";
}
