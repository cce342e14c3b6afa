use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::age::{self, AgeError, AgeResult};
use crate::form::{self, Field, FieldErrorKind, FieldErrors, RawInput, ValidationError};

pub const INVALID_DATE_MESSAGE: &str = "Must be a valid date";
pub const FUTURE_DATE_MESSAGE: &str = "Must be in the past";

const PLACEHOLDER: &str = "--";

/// Form state. Only `submit` mutates it.
#[derive(Debug, Default)]
pub struct AppState {
    input: RawInput,
    errors: FieldErrors,
    result: Option<AgeResult>,
    max_year: u32,
}

/// What a submission produced, for `--json` output.
#[derive(Debug, Serialize)]
pub struct Outcome<'a> {
    pub result: Option<&'a AgeResult>,
    pub errors: Vec<&'a ValidationError>,
}

impl AppState {
    pub fn new(max_year: u32) -> Self {
        Self {
            max_year,
            ..Self::default()
        }
    }

    pub fn result(&self) -> Option<&AgeResult> {
        self.result.as_ref()
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn input(&self) -> &RawInput {
        &self.input
    }

    pub fn max_year(&self) -> u32 {
        self.max_year
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.result.is_some()
    }

    /// Validate, then calculate. A failed submission keeps the previous result.
    pub fn submit(&mut self, input: RawInput, today: NaiveDate) {
        let outcome = form::parse_input(&input, self.max_year)
            .and_then(|date| age::calculate(date, today).map_err(field_error));
        self.input = input;

        match outcome {
            Ok(age) => {
                debug!(?age, "submission accepted");
                self.errors.clear();
                self.result = Some(age);
            }
            Err(errors) => {
                debug!(count = errors.len(), "submission rejected");
                self.errors = errors;
            }
        }
    }

    pub fn outcome(&self) -> Outcome<'_> {
        Outcome {
            result: if self.errors.is_empty() {
                self.result.as_ref()
            } else {
                None
            },
            errors: self.errors.values().collect(),
        }
    }

    /// Number strings for years, months and days, or "--" when nothing valid yet.
    pub fn display_values(&self) -> [String; 3] {
        match &self.result {
            Some(r) => [r.years, r.months, r.days].map(|n| n.to_string()),
            None => [PLACEHOLDER; 3].map(str::to_string),
        }
    }

    /// Plain text view: fields with inline errors, then the result lines.
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        for rule in form::rules(self.max_year) {
            let value = self.input.get(rule.field);
            let shown = if value.is_empty() { rule.placeholder } else { value };
            out.push_str(&format!("{:<6} {shown}\n", rule.label.to_uppercase()));
            if let Some(e) = self.errors.get(&rule.field) {
                out.push_str(&format!("       ! {}\n", e.message));
            }
        }

        out.push('\n');
        let [years, months, days] = self.display_values();
        out.push_str(&format!("{years} years\n{months} months\n{days} days\n"));
        out
    }
}

/// Calculator failures are shown inline like any other field error.
fn field_error(err: AgeError) -> FieldErrors {
    let e = match err {
        AgeError::InvalidDate { .. } => ValidationError::new(
            Field::Day,
            FieldErrorKind::InvalidDate,
            INVALID_DATE_MESSAGE,
        ),
        AgeError::FutureDate { .. } => ValidationError::new(
            Field::Year,
            FieldErrorKind::FutureDate,
            FUTURE_DATE_MESSAGE,
        ),
    };
    FieldErrors::from([(e.field, e)])
}
