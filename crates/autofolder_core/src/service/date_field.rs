//! Working-date resolution for a saved resource.
//!
//! # Responsibility
//! - Pick which field supplies the date for a given parent template.
//! - Read that field from resource columns or extended attributes.
//! - Parse stored values into a zone-less working date.
//!
//! # Invariants
//! - Date fields map to parent templates by position; unmatched positions
//!   fall back to the first configured field.
//! - Unset or unparsable values are errors, never silently replaced.

use crate::model::resource::{BuiltinDateField, Resource, TemplateId};
use crate::repo::resource_repo::{ResourceStore, StoreError};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static UNIX_TIMESTAMP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\d+$").expect("valid timestamp regex"));

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%Y/%m/%d"];

// Eight digits read as a compact calendar date, not seconds since 1970.
const COMPACT_DATE_FORMAT: &str = "%Y%m%d";

/// Errors while resolving the working date.
#[derive(Debug)]
pub enum DateFieldError {
    /// No date field is configured at all.
    NoDateField,
    /// The field holds no value.
    Unset { field: String },
    /// The field value is not a recognizable date.
    Unparsable { field: String, value: String },
    /// Extended attribute lookup failed.
    Store(StoreError),
}

impl Display for DateFieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoDateField => write!(f, "no date field configured"),
            Self::Unset { field } => write!(f, "unable to parse date from {field}: value is unset"),
            Self::Unparsable { field, value } => {
                write!(f, "unable to parse date from {field}: `{value}`")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DateFieldError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for DateFieldError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Where a date field is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateSource {
    /// Built-in resource column.
    Builtin(BuiltinDateField),
    /// Extended attribute by name.
    Extended(String),
}

impl DateSource {
    /// Classifies a configured field name.
    pub fn for_field(name: &str) -> Self {
        match BuiltinDateField::from_name(name) {
            Some(field) => Self::Builtin(field),
            None => Self::Extended(name.to_string()),
        }
    }
}

/// Selects the date field for a parent template.
///
/// With parent templates `[2, 4, 6]` and fields `[publishedon, pub_date]`,
/// template 4 uses `pub_date` while 2 and 6 use `publishedon`.
pub fn resolve_field_name<'a>(
    parent_template: TemplateId,
    parent_templates: &[TemplateId],
    date_fields: &'a [String],
) -> Option<&'a str> {
    parent_templates
        .iter()
        .position(|template| *template == parent_template)
        .and_then(|offset| date_fields.get(offset))
        .or_else(|| date_fields.first())
        .map(String::as_str)
}

/// Reads and parses the working date of `item` from `field`.
pub fn read_working_date<S: ResourceStore + ?Sized>(
    store: &S,
    item: &Resource,
    field: &str,
) -> Result<NaiveDateTime, DateFieldError> {
    match DateSource::for_field(field) {
        DateSource::Builtin(column) => {
            let seconds = item.timestamp(column).ok_or_else(|| DateFieldError::Unset {
                field: field.to_string(),
            })?;
            timestamp_to_naive(seconds).ok_or_else(|| DateFieldError::Unparsable {
                field: field.to_string(),
                value: seconds.to_string(),
            })
        }
        DateSource::Extended(name) => {
            let value = store
                .get_extended_value(item.id, &name)?
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| DateFieldError::Unset {
                    field: field.to_string(),
                })?;
            parse_date_value(&value).ok_or(DateFieldError::Unparsable {
                field: field.to_string(),
                value,
            })
        }
    }
}

/// Parses a stored date value.
///
/// Accepts compact `YYYYMMDD` dates, Unix timestamps, RFC 3339 and common
/// ISO-like layouts. Offsets are kept as wall-clock time in that offset.
pub fn parse_date_value(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if UNIX_TIMESTAMP_RE.is_match(trimmed) {
        if trimmed.len() == 8 {
            if let Some(date) = NaiveDate::parse_from_str(trimmed, COMPACT_DATE_FORMAT)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
            {
                return Some(date);
            }
        }
        return trimmed.parse::<i64>().ok().and_then(timestamp_to_naive);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.naive_local());
    }

    for format in DATE_TIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed);
        }
    }

    DATE_FORMATS.iter().find_map(|format| {
        NaiveDate::parse_from_str(trimmed, format)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
    })
}

fn timestamp_to_naive(seconds: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(seconds, 0).map(|value| value.naive_utc())
}
