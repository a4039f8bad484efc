//! Form input for opportunities and accounts.
//!
//! Numeric fields arrive as text; blank text means "no value".

use chrono::NaiveDate;
use serde::Deserialize;

use crate::validation::{ErrorCode, Field, ValidationErrors};
use entity::Access;

/// Submitted opportunity fields. `None` leaves a field untouched on update.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct OpportunityParams {
    pub name: Option<String>,
    pub user_id: Option<i32>,
    pub assigned_to: Option<i32>,
    pub campaign_id: Option<i32>,
    pub access: Option<String>,
    pub source: Option<String>,
    pub stage: Option<String>,
    pub probability: Option<String>,
    pub amount: Option<String>,
    pub discount: Option<String>,
    pub closes_on: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl OpportunityParams {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Account reference submitted alongside an opportunity: either an existing
/// account id or the fields of a new account.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AccountParams {
    pub id: Option<i32>,
    pub name: Option<String>,
    pub user_id: Option<i32>,
    pub assigned_to: Option<i32>,
    pub access: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
}

impl AccountParams {
    pub fn existing(id: i32) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn new_named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// The full "create opportunity" form: the opportunity, its account and the
/// users it is shared with.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct OpportunityForm {
    pub opportunity: OpportunityParams,
    pub account: AccountParams,
    pub users: Vec<i32>,
}

/// Blank strings collapse to `None`.
pub(crate) fn optional_text(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Largest amount the money columns hold, in cents (`decimal(12,2)`).
pub(crate) const MAX_CENTS: i64 = 999_999_999_999;

fn parse_number(raw: &str) -> Result<Option<f64>, ErrorCode> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(ErrorCode::NotANumber),
    }
}

/// Whole-percent probability; fractional input is truncated.
pub(crate) fn parse_probability(raw: &str) -> Result<Option<i32>, ErrorCode> {
    let Some(value) = parse_number(raw)? else {
        return Ok(None);
    };
    let whole = value.trunc();
    if whole < f64::from(i32::MIN) || whole > f64::from(i32::MAX) {
        return Err(ErrorCode::OutOfRange);
    }
    Ok(Some(whole as i32))
}

/// Currency amount to integer cents, rounded half away from zero.
pub(crate) fn parse_cents(raw: &str) -> Result<Option<i64>, ErrorCode> {
    let Some(value) = parse_number(raw)? else {
        return Ok(None);
    };
    let cents = (value * 100.0).round();
    if cents.abs() > MAX_CENTS as f64 {
        return Err(ErrorCode::OutOfRange);
    }
    Ok(Some(cents as i64))
}

/// Parses an access value, recording an inclusion error when unknown.
pub(crate) fn parse_access(raw: &str, errors: &mut ValidationErrors) -> Option<Access> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(Access::default());
    }
    let parsed = Access::parse(trimmed);
    if parsed.is_none() {
        errors.add(Field::Access, ErrorCode::Inclusion);
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_numbers_are_absent() {
        assert_eq!(parse_probability(""), Ok(None));
        assert_eq!(parse_cents("   "), Ok(None));
    }

    #[test]
    fn amounts_become_cents() {
        assert_eq!(parse_cents("1000"), Ok(Some(100_000)));
        assert_eq!(parse_cents("19.99"), Ok(Some(1_999)));
        assert_eq!(parse_cents("-2.5"), Ok(Some(-250)));
    }

    #[test]
    fn probability_truncates_fractions() {
        assert_eq!(parse_probability("50"), Ok(Some(50)));
        assert_eq!(parse_probability("33.9"), Ok(Some(33)));
    }

    #[test]
    fn non_numeric_text_is_rejected() {
        assert_eq!(parse_cents("lots"), Err(ErrorCode::NotANumber));
        assert_eq!(parse_probability("NaN"), Err(ErrorCode::NotANumber));
        assert_eq!(parse_cents("inf"), Err(ErrorCode::NotANumber));
    }

    #[test]
    fn values_beyond_the_column_range_are_rejected() {
        assert_eq!(parse_cents("1e30"), Err(ErrorCode::OutOfRange));
        assert_eq!(parse_cents("-10000000000"), Err(ErrorCode::OutOfRange));
        assert_eq!(parse_cents("9999999999.99"), Ok(Some(MAX_CENTS)));
        assert_eq!(parse_probability("1e12"), Err(ErrorCode::OutOfRange));
        assert_eq!(parse_probability("-3000000000"), Err(ErrorCode::OutOfRange));
        assert_eq!(parse_probability("2147483647"), Ok(Some(i32::MAX)));
    }

    #[test]
    fn unknown_access_records_inclusion_error() {
        let mut errors = ValidationErrors::new();
        assert_eq!(parse_access("Secret", &mut errors), None);
        assert!(errors.has(Field::Access, ErrorCode::Inclusion));

        let mut errors = ValidationErrors::new();
        assert_eq!(parse_access("", &mut errors), Some(Access::Private));
        assert_eq!(parse_access("Shared", &mut errors), Some(Access::Shared));
        assert!(errors.is_empty());
    }

    #[test]
    fn form_deserializes_from_json() {
        let form: OpportunityForm = serde_json::from_value(serde_json::json!({
            "opportunity": { "name": "Renewal", "probability": "40", "closes_on": "2024-06-30" },
            "account": { "id": 7 },
            "users": [1, 2]
        }))
        .unwrap();
        assert_eq!(form.opportunity.name.as_deref(), Some("Renewal"));
        assert_eq!(form.opportunity.closes_on, NaiveDate::from_ymd_opt(2024, 6, 30));
        assert_eq!(form.account.id, Some(7));
        assert_eq!(form.users, vec![1, 2]);
    }
}
