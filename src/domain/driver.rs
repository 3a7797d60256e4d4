//! Delivery drivers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// A driver who delivers daily orders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Driver {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_number: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Driver {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            phone: None,
            vehicle_number: None,
            active: true,
            notes: None,
            created_at: Utc::now(),
        }
    }
}

impl Identifiable for Driver {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Driver {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Driver {
    fn display_label(&self) -> String {
        match &self.vehicle_number {
            Some(vehicle) => format!("{} [{}]", self.name, vehicle),
            None => self.name.clone(),
        }
    }
}

impl Record for Driver {
    const COLLECTION: &'static str = "drivers";
}
