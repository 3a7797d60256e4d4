//! Shared traits, meal counts, and date ranges used across the catering domain.

use std::{fmt, ops::AddAssign};

use chrono::{Datelike, Duration, NaiveDate};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Identifies entities that expose a stable unique identifier.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Provides access to a human-friendly entity name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Supplies a presentation-ready label for logs and reports.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Entities persisted as documents in a named store collection.
pub trait Record:
    Identifiable + Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
    const COLLECTION: &'static str;
}

pub(crate) fn default_true() -> bool {
    true
}

/// Non-veg, veg, and total meal counts. `total` is always `non_veg + veg`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MealCounts {
    pub non_veg: u64,
    pub veg: u64,
    pub total: u64,
}

impl MealCounts {
    pub fn new(non_veg: u64, veg: u64) -> Self {
        Self {
            non_veg,
            veg,
            total: non_veg + veg,
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }
}

impl AddAssign for MealCounts {
    fn add_assign(&mut self, other: Self) {
        self.non_veg += other.non_veg;
        self.veg += other.veg;
        self.total += other.total;
    }
}

impl fmt::Display for MealCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} meals ({} non-veg, {} veg)",
            self.total, self.non_veg, self.veg
        )
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("range end {end} is before start {start}")]
pub struct InvalidDateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Inclusive span of calendar days.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, InvalidDateRange> {
        if end < start {
            return Err(InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Calendar month containing `date`.
    pub fn month_of(date: NaiveDate) -> Self {
        let start = date - Duration::days(i64::from(date.day0()));
        let next_month = if start.month() == 12 {
            NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
        };
        let end = next_month
            .and_then(|first| first.pred_opt())
            .unwrap_or(start);
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// True when the two inclusive ranges share at least one day.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Rounds a monetary value to two decimal places.
pub fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn range_rejects_reversed_bounds() {
        let err = DateRange::new(date(2024, 3, 2), date(2024, 3, 1)).unwrap_err();
        assert_eq!(err.start, date(2024, 3, 2));
        assert!(DateRange::new(date(2024, 3, 1), date(2024, 3, 1)).is_ok());
    }

    #[test]
    fn month_of_handles_leap_february_and_december() {
        let feb = DateRange::month_of(date(2024, 2, 17));
        assert_eq!(feb.start, date(2024, 2, 1));
        assert_eq!(feb.end, date(2024, 2, 29));

        let dec = DateRange::month_of(date(2023, 12, 31));
        assert_eq!(dec.start, date(2023, 12, 1));
        assert_eq!(dec.end, date(2023, 12, 31));
    }

    #[test]
    fn overlap_includes_shared_boundary_days() {
        let march = DateRange::month_of(date(2024, 3, 1));
        let straddling = DateRange::new(date(2024, 3, 15), date(2024, 4, 14)).unwrap();
        let april = DateRange::month_of(date(2024, 4, 1));
        assert!(march.overlaps(&straddling));
        assert!(straddling.overlaps(&march));
        assert!(!march.overlaps(&april));
        assert!(march.overlaps(&DateRange::single(date(2024, 3, 31))));
    }

    #[test]
    fn meal_counts_accumulate_component_wise() {
        let mut counts = MealCounts::new(10, 7);
        counts += MealCounts::new(2, 0);
        assert_eq!(counts, MealCounts::new(12, 7));
        assert_eq!(counts.total, counts.veg + counts.non_veg);
    }

    #[test]
    fn currency_rounding_uses_two_decimals() {
        assert_eq!(round_currency(10.005_1), 10.01);
        assert_eq!(round_currency(99.994), 99.99);
    }
}
