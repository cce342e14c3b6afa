use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::age::DateInput;

pub const REQUIRED_MESSAGE: &str = "This field is required";
pub const FORMAT_MESSAGE: &str = "Please enter a number";
pub const MAX_MESSAGE: &str = "Not valid date";
pub const MIN_MESSAGE: &str = "Minimal date can be 1";

pub const DEFAULT_MAX_YEAR: u32 = 2023;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Day,
    Month,
    Year,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Day, Field::Month, Field::Year];

    pub fn name(self) -> &'static str {
        match self {
            Field::Day => "day",
            Field::Month => "month",
            Field::Year => "year",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldErrorKind {
    Required,
    Format,
    Range,
    InvalidDate,
    FutureDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: Field,
    pub kind: FieldErrorKind,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: Field, kind: FieldErrorKind, message: &str) -> Self {
        Self {
            field,
            kind,
            message: message.to_string(),
        }
    }
}

/// At most one error per field; empty when every field passed.
pub type FieldErrors = BTreeMap<Field, ValidationError>;

/// Highest year chrono can build a date for on every 0.4 release.
pub const MAX_SUPPORTED_YEAR: u32 = 262_142;

/// Messages shown for each failing rule.
#[derive(Debug, Clone, Copy)]
pub struct RuleMessages {
    pub required: &'static str,
    pub format: &'static str,
    pub max: &'static str,
    pub min: &'static str,
}

const MESSAGES: RuleMessages = RuleMessages {
    required: REQUIRED_MESSAGE,
    format: FORMAT_MESSAGE,
    max: MAX_MESSAGE,
    min: MIN_MESSAGE,
};

/// One row of the rule table. Every field is required.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: Field,
    pub label: &'static str,
    pub placeholder: &'static str,
    pub pattern: fn(&str) -> bool,
    pub min: u32,
    pub max: u32,
    pub messages: RuleMessages,
}

/// The three form fields in display order. The year ceiling is capped at
/// `MAX_SUPPORTED_YEAR`.
pub fn rules(max_year: u32) -> [FieldRule; 3] {
    [
        FieldRule {
            field: Field::Day,
            label: "Day",
            placeholder: "DD",
            pattern: is_digits,
            min: 1,
            max: 31,
            messages: MESSAGES,
        },
        FieldRule {
            field: Field::Month,
            label: "Month",
            placeholder: "MM",
            pattern: is_digits,
            min: 1,
            max: 12,
            messages: MESSAGES,
        },
        FieldRule {
            field: Field::Year,
            label: "Year",
            placeholder: "YYYY",
            pattern: is_digits,
            min: 1,
            max: max_year.min(MAX_SUPPORTED_YEAR),
            messages: MESSAGES,
        },
    ]
}

/// One or more ASCII decimal digits.
fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

impl FieldRule {
    fn error(&self, kind: FieldErrorKind, message: &str) -> ValidationError {
        ValidationError::new(self.field, kind, message)
    }

    /// Checks in order required, format, max, min; the first failure wins.
    pub fn check(&self, value: &str) -> Result<u32, ValidationError> {
        if value.is_empty() {
            return Err(self.error(FieldErrorKind::Required, self.messages.required));
        }

        if !(self.pattern)(value) {
            return Err(self.error(FieldErrorKind::Format, self.messages.format));
        }

        // Matches the pattern, so a parse failure can only be an overflow.
        let number = match value.parse::<u32>() {
            Ok(n) if n <= self.max => n,
            _ => return Err(self.error(FieldErrorKind::Range, self.messages.max)),
        };

        if number < self.min {
            return Err(self.error(FieldErrorKind::Range, self.messages.min));
        }

        Ok(number)
    }
}

/// Raw text of the three inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawInput {
    pub day: String,
    pub month: String,
    pub year: String,
}

impl RawInput {
    pub fn new(day: impl Into<String>, month: impl Into<String>, year: impl Into<String>) -> Self {
        Self {
            day: day.into(),
            month: month.into(),
            year: year.into(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Day => &self.day,
            Field::Month => &self.month,
            Field::Year => &self.year,
        }
    }
}

/// Run every rule; the map is empty when all fields pass.
pub fn validate(input: &RawInput, max_year: u32) -> FieldErrors {
    rules(max_year)
        .into_iter()
        .filter_map(|rule| rule.check(input.get(rule.field)).err())
        .map(|e| (e.field, e))
        .collect()
}

pub fn parse_input(input: &RawInput, max_year: u32) -> Result<DateInput, FieldErrors> {
    let errors = validate(input, max_year);
    if !errors.is_empty() {
        return Err(errors);
    }

    let [day, month, year] =
        rules(max_year).map(|rule| rule.check(input.get(rule.field)).unwrap_or_default());
    let year = i32::try_from(year).map_err(|_| {
        let rule = rules(max_year)[2];
        FieldErrors::from([(
            Field::Year,
            rule.error(FieldErrorKind::Range, rule.messages.max),
        )])
    })?;

    Ok(DateInput { day, month, year })
}
