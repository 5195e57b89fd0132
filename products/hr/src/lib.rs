//! HR vertical slice.

pub mod fake;
pub mod salary;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use fake::{Contact, FAKE_CONTACT_COUNT, fake_contacts, fake_contacts_json};
pub use salary::{describe, is_above_threshold, with_bonus};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HrError {
    #[error("salary must be a non-negative amount with at most two decimals: {0}")]
    InvalidSalary(String),
}

/// Payroll row shown on the management screens.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Employee {
    pub id: i32,
    pub full_name: String,
    pub salary_cents: i64,
}

impl Employee {
    pub fn salary(&self) -> f64 {
        cents_to_amount(self.salary_cents)
    }

    pub fn summary(&self) -> String {
        describe(&self.full_name, self.salary())
    }
}

/// Parses a form amount such as `"1000.00"`, `"1000,5"` or `"4500"` into cents.
pub fn parse_salary_cents(raw: &str) -> Result<i64, HrError> {
    let invalid = || HrError::InvalidSalary(raw.to_string());
    let value = raw.trim().replace(',', ".");
    let (whole, fraction) = match value.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (value.as_str(), ""),
    };
    if whole.is_empty()
        || fraction.len() > 2
        || !whole.bytes().all(|b| b.is_ascii_digit())
        || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }
    let whole: i64 = whole.parse().map_err(|_| invalid())?;
    let fraction: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
        _ => fraction.parse().map_err(|_| invalid())?,
    };
    whole
        .checked_mul(100)
        .and_then(|cents| cents.checked_add(fraction))
        .ok_or_else(invalid)
}

pub fn cents_to_amount(cents: i64) -> f64 {
    cents as f64 / 100.0
}
