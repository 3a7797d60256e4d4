use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// A company whose employees are catering customers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Company {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Company {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            address: None,
            contact_phone: None,
            tax_id: None,
            created_at: Utc::now(),
        }
    }
}

impl Identifiable for Company {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Company {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Company {
    fn display_label(&self) -> String {
        self.name.clone()
    }
}

impl Record for Company {
    const COLLECTION: &'static str = "companies";
}
