//! Parser for the compact bag-format meal encoding.
//!
//! A bag format lists the meals packed for one delivery. Comma-separated counts
//! before an optional `+` are non-veg meals; comma-separated counts after it are
//! veg meals. `"5,5+7"` is therefore ten non-veg and seven veg meals.

use std::num::IntErrorKind;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::MealCounts;

const SECTION_SEPARATOR: char = '+';
const COUNT_SEPARATOR: char = ',';

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BagFormatError {
    #[error("bag format is empty")]
    Empty,
    #[error("bag format may contain at most one '+' (found {0})")]
    TooManySections(usize),
    #[error("empty {section} count at position {position}")]
    EmptySegment {
        section: &'static str,
        position: usize,
    },
    #[error("`{segment}` is not a valid {section} count")]
    NotANumber {
        section: &'static str,
        segment: String,
    },
    #[error("{section} count `{segment}` is too large")]
    CountTooLarge {
        section: &'static str,
        segment: String,
    },
}

/// Parses a bag format into non-veg, veg, and total meal counts.
pub fn parse(input: &str) -> Result<MealCounts, BagFormatError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(BagFormatError::Empty);
    }

    let separators = trimmed.matches(SECTION_SEPARATOR).count();
    if separators > 1 {
        return Err(BagFormatError::TooManySections(separators));
    }

    let (non_veg_section, veg_section) = match trimmed.split_once(SECTION_SEPARATOR) {
        Some((non_veg, veg)) => (non_veg, Some(veg)),
        None => (trimmed, None),
    };

    let non_veg = sum_section(non_veg_section, "non-veg")?;
    let veg = match veg_section {
        Some(section) => sum_section(section, "veg")?,
        None => 0,
    };
    Ok(MealCounts::new(non_veg, veg))
}

fn sum_section(section: &str, label: &'static str) -> Result<u64, BagFormatError> {
    let mut sum = 0u64;
    for (idx, raw) in section.split(COUNT_SEPARATOR).enumerate() {
        let segment = raw.trim();
        if segment.is_empty() {
            return Err(BagFormatError::EmptySegment {
                section: label,
                position: idx + 1,
            });
        }
        // `u32::from_str` accepts a leading '+', which is reserved as the separator.
        if !segment.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(BagFormatError::NotANumber {
                section: label,
                segment: segment.to_string(),
            });
        }
        let count = segment.parse::<u32>().map_err(|err| match err.kind() {
            IntErrorKind::PosOverflow => BagFormatError::CountTooLarge {
                section: label,
                segment: segment.to_string(),
            },
            _ => BagFormatError::NotANumber {
                section: label,
                segment: segment.to_string(),
            },
        })?;
        sum += u64::from(count);
    }
    Ok(sum)
}

/// Outcome of validating a bag format. Counts are zero when `valid` is false.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BagValidation {
    pub valid: bool,
    #[serde(flatten)]
    pub counts: MealCounts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub fn validate(input: &str) -> BagValidation {
    match parse(input) {
        Ok(counts) => BagValidation {
            valid: true,
            counts,
            message: None,
        },
        Err(err) => BagValidation {
            valid: false,
            counts: MealCounts::zero(),
            message: Some(err.to_string()),
        },
    }
}
