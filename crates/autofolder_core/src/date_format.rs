//! Host-compatible date formatting.
//!
//! # Responsibility
//! - Render folder aliases and titles from the working date using the
//!   single-character format codes the host CMS uses for its properties
//!   (`Y`, `m`, `F`, `d`, ...).
//!
//! # Invariants
//! - Unknown characters are copied through literally.
//! - A backslash escapes the next character.
//! - Working dates carry no zone; zone codes render as UTC.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use std::error::Error;
use std::fmt::{Display, Formatter, Write};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Format string rejected by [`validate_format`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateFormatError {
    /// Format is blank and would render an empty alias/title.
    Empty,
    /// Format ends with an escape that has nothing to escape.
    DanglingEscape(String),
}

impl Display for DateFormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "date format must not be empty"),
            Self::DanglingEscape(format) => {
                write!(f, "date format `{format}` ends with a dangling escape")
            }
        }
    }
}

impl Error for DateFormatError {}

/// Checks that a format string can produce non-empty output.
pub fn validate_format(format: &str) -> Result<(), DateFormatError> {
    if format.trim().is_empty() {
        return Err(DateFormatError::Empty);
    }

    let mut chars = format.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' && chars.next().is_none() {
            return Err(DateFormatError::DanglingEscape(format.to_string()));
        }
    }
    Ok(())
}

/// Renders `value` using host date format codes.
///
/// ```
/// # use chrono::NaiveDate;
/// # use autofolder_core::date_format::format_date;
/// let date = NaiveDate::from_ymd_opt(2023, 6, 15)
///     .unwrap()
///     .and_hms_opt(9, 5, 0)
///     .unwrap();
/// assert_eq!(format_date(&date, "Y/m"), "2023/06");
/// assert_eq!(format_date(&date, "F jS"), "June 15th");
/// ```
pub fn format_date(value: &NaiveDateTime, format: &str) -> String {
    let mut out = String::with_capacity(format.len() * 2);
    let mut chars = format.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
            continue;
        }
        push_code(&mut out, value, ch);
    }
    out
}

fn push_code(out: &mut String, value: &NaiveDateTime, code: char) {
    let date = value.date();
    // `write!` into a String cannot fail.
    let _ = match code {
        'd' => write!(out, "{:02}", date.day()),
        'D' => out.write_str(&WEEKDAY_NAMES[weekday_index(date)][..3]),
        'j' => write!(out, "{}", date.day()),
        'l' => out.write_str(WEEKDAY_NAMES[weekday_index(date)]),
        'N' => write!(out, "{}", date.weekday().number_from_monday()),
        'S' => out.write_str(ordinal_suffix(date.day())),
        'w' => write!(out, "{}", date.weekday().num_days_from_sunday()),
        'z' => write!(out, "{}", date.ordinal0()),
        'W' => write!(out, "{:02}", date.iso_week().week()),
        'F' => out.write_str(MONTH_NAMES[date.month0() as usize]),
        'm' => write!(out, "{:02}", date.month()),
        'M' => out.write_str(&MONTH_NAMES[date.month0() as usize][..3]),
        'n' => write!(out, "{}", date.month()),
        't' => write!(out, "{}", days_in_month(date)),
        'L' => out.write_str(if date.leap_year() { "1" } else { "0" }),
        'o' => write!(out, "{}", date.iso_week().year()),
        'Y' => write!(out, "{:04}", date.year()),
        'y' => write!(out, "{:02}", date.year().rem_euclid(100)),
        'a' => out.write_str(if value.hour() < 12 { "am" } else { "pm" }),
        'A' => out.write_str(if value.hour() < 12 { "AM" } else { "PM" }),
        'g' => write!(out, "{}", twelve_hour(value.hour())),
        'G' => write!(out, "{}", value.hour()),
        'h' => write!(out, "{:02}", twelve_hour(value.hour())),
        'H' => write!(out, "{:02}", value.hour()),
        'i' => write!(out, "{:02}", value.minute()),
        's' => write!(out, "{:02}", value.second()),
        'u' => write!(out, "{:06}", value.nanosecond() / 1_000),
        'v' => write!(out, "{:03}", value.nanosecond() / 1_000_000),
        'U' => write!(out, "{}", value.and_utc().timestamp()),
        'e' | 'T' => out.write_str("UTC"),
        'P' => out.write_str("+00:00"),
        'O' => out.write_str("+0000"),
        'c' => out.write_str(&format_date(value, "Y-m-d\\TH:i:sP")),
        'r' => out.write_str(&format_date(value, "D, d M Y H:i:s O")),
        other => {
            out.push(other);
            Ok(())
        }
    };
}

fn weekday_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_monday() as usize
}

fn twelve_hour(hour: u32) -> u32 {
    match hour % 12 {
        0 => 12,
        other => other,
    }
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .map_or(31, |last| last.day())
}
