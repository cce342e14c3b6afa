//! age.rs
//!
//! Calendar-aware age calculation between a birth date and "today":
//!     X years, Y months, Z days
//!
//! Chrono does not provide a built-in year/month/day diff, so the borrowing
//! rules are implemented manually:
//!   • month underflow (borrowing from years)
//!   • day underflow (borrowing from the month before today's month)
//!   • birth days past the end of the borrowed month (31st vs. February)
//!   • leap years

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use thiserror::Error;

/// A (day, month, year) triple that passed field validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateInput {
    pub day: u32,
    pub month: u32,
    pub year: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgeResult {
    pub years: u32,
    pub months: u32,
    pub days: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AgeError {
    #[error("{year:04}-{month:02}-{day:02} is not a calendar date")]
    InvalidDate { day: u32, month: u32, year: i32 },

    #[error("birth date {birth} is after {today}")]
    FutureDate { birth: NaiveDate, today: NaiveDate },
}

impl DateInput {
    /// Build the calendar date, rejecting combinations chrono would refuse
    /// (31 February, 29 February outside leap years, 31 April, ...).
    pub fn to_date(self) -> Result<NaiveDate, AgeError> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day).ok_or(AgeError::InvalidDate {
            day: self.day,
            month: self.month,
            year: self.year,
        })
    }
}

/// Age of `input` on `today`.
pub fn calculate(input: DateInput, today: NaiveDate) -> Result<AgeResult, AgeError> {
    let birthdate = input.to_date()?;
    if birthdate > today {
        return Err(AgeError::FutureDate {
            birth: birthdate,
            today,
        });
    }
    Ok(age_between(birthdate, today))
}

/// Years, months and days from `birthdate` to `today`. Requires `birthdate <= today`.
pub fn age_between(birthdate: NaiveDate, today: NaiveDate) -> AgeResult {
    let mut years = today.year() - birthdate.year();
    let mut months = today.month() as i32 - birthdate.month() as i32;
    let mut days = today.day() as i32 - birthdate.day() as i32;

    // Fix day underflow
    if days < 0 {
        months -= 1;

        // Determine the previous month relative to `today`.
        let (prev_year, prev_month) = if today.month() == 1 {
            (today.year() - 1, 12)
        } else {
            (today.year(), today.month() - 1)
        };

        // Count from the birth day inside the previous month, clamped to its length
        let days_in_prev_month = days_in_month(prev_year, prev_month);
        let anchor = birthdate.day().min(days_in_prev_month);
        days = (days_in_prev_month - anchor + today.day()) as i32;
    }

    // Fix month underflow
    if months < 0 {
        years -= 1;
        months += 12;
    }

    AgeResult {
        years: years.max(0) as u32,
        months: months as u32,
        days: days as u32,
    }
}

impl AgeResult {
    /// "24 years, 5 months, 14 days"
    pub fn age_string(&self) -> String {
        format!(
            "{} year{}, {} month{}, {} day{}",
            self.years,
            plural(self.years),
            self.months,
            plural(self.months),
            self.days,
            plural(self.days)
        )
    }
}

fn plural(n: u32) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Returns number of days in a given year/month (handles leap years)
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 30, // should never occur but keeps function total
    }
}

/// Leap-year rule (Gregorian):
///   - divisible by 4 → leap year
///   - except divisible by 100 → not leap year
///   - except divisible by 400 → leap year
fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
