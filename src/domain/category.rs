//! Domain types representing priced food categories.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// A meal type billed at a flat price per meal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FoodCategory {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    pub price_per_meal: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl FoodCategory {
    pub fn new(name: impl Into<String>, price_per_meal: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            price_per_meal,
            description: None,
            created_at: Utc::now(),
        }
    }
}

impl Identifiable for FoodCategory {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for FoodCategory {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for FoodCategory {
    fn display_label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FoodCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {:.2}", self.name, self.price_per_meal)
    }
}

impl Record for FoodCategory {
    const COLLECTION: &'static str = "food_categories";
}
