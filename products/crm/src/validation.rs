//! Field-level validation results.
//!
//! Validation never fails a call: problems are collected here and attached
//! to the record, and the caller inspects them after a save attempt.

use std::fmt;

use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Access,
    Probability,
    Amount,
    Discount,
    Account,
    #[serde(rename = "user_id")]
    Owner,
    AssignedTo,
    #[serde(rename = "campaign_id")]
    Campaign,
    Users,
    Base,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Access => "access",
            Field::Probability => "probability",
            Field::Amount => "amount",
            Field::Discount => "discount",
            Field::Account => "account",
            Field::Owner => "user_id",
            Field::AssignedTo => "assigned_to",
            Field::Campaign => "campaign_id",
            Field::Users => "users",
            Field::Base => "base",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Access => "Access",
            Field::Probability => "Probability",
            Field::Amount => "Amount",
            Field::Discount => "Discount",
            Field::Account => "Account",
            Field::Owner => "User",
            Field::AssignedTo => "Assigned to",
            Field::Campaign => "Campaign",
            Field::Users => "Users",
            Field::Base => "Linked record",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Blank,
    Taken,
    NotANumber,
    OutOfRange,
    Inclusion,
    SharedWithoutUsers,
    NotFound,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Blank => "blank",
            ErrorCode::Taken => "taken",
            ErrorCode::NotANumber => "not_a_number",
            ErrorCode::OutOfRange => "out_of_range",
            ErrorCode::Inclusion => "inclusion",
            ErrorCode::SharedWithoutUsers => "shared_without_users",
            ErrorCode::NotFound => "not_found",
        }
    }

    fn default_message(self, field: Field) -> String {
        let label = field.label();
        match self {
            ErrorCode::Blank => format!("{label} can't be blank"),
            ErrorCode::Taken => format!("{label} has already been taken"),
            ErrorCode::NotANumber => format!("{label} is not a number"),
            ErrorCode::OutOfRange => format!("{label} is out of range"),
            ErrorCode::Inclusion => format!("{label} is not included in the list"),
            ErrorCode::SharedWithoutUsers => {
                "Please specify users to share the record with.".to_string()
            }
            ErrorCode::NotFound => format!("{label} could not be found"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct FieldError {
    pub field: Field,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error with the stock message for its code.
    pub fn add(&mut self, field: Field, code: ErrorCode) {
        let message = code.default_message(field);
        self.add_with_message(field, code, message);
    }

    pub fn add_with_message(&mut self, field: Field, code: ErrorCode, message: impl Into<String>) {
        let error = FieldError {
            field,
            code,
            message: message.into(),
        };
        if !self.0.contains(&error) {
            self.0.push(error);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn on(&self, field: Field) -> impl Iterator<Item = &FieldError> {
        self.0.iter().filter(move |err| err.field == field)
    }

    pub fn has(&self, field: Field, code: ErrorCode) -> bool {
        self.on(field).any(|err| err.code == code)
    }

    pub fn full_messages(&self) -> Vec<&str> {
        self.0.iter().map(|err| err.message.as_str()).collect()
    }

    pub fn clear_field(&mut self, field: Field) {
        self.0.retain(|err| err.field != field);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn merge(&mut self, other: &ValidationErrors) {
        for err in other.iter() {
            self.add_with_message(err.field, err.code, err.message.clone());
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_messages().join("; "))
    }
}
