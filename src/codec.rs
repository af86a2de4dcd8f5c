//! String codec for `Task::text_values`.
//!
//! Storage stays string-only. Each column type owns one parse/format pair here
//! so editors and aggregates can work with native values.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate};
use regex::Regex;

use crate::board_utils::normalize_status;
use crate::types::{ColumnType, ConnectionConfig, Priority, Status};

static NUMBER_INPUT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9.,]*$").expect("valid number input regex"));
static MONEY_STRIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9.]").expect("valid money strip regex"));

pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Status(Status),
    Priority(Priority),
    Person(String),
    Date(NaiveDate),
    Number(f64),
    Checkbox(bool),
    Rating(u8),
    Percent(u8),
    Choice(String),
    Connection(ConnectionConfig),
}

/// Parses a stored string for a column of `column_type`.
///
/// `None` means "no usable value": callers render a placeholder.
pub fn decode(column_type: ColumnType, raw: Option<&str>) -> Option<CellValue> {
    let raw = raw?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return match column_type {
            ColumnType::Checkbox => Some(CellValue::Checkbox(false)),
            _ => None,
        };
    }

    match column_type {
        ColumnType::Name | ColumnType::Text | ColumnType::LongText | ColumnType::Button => {
            Some(CellValue::Text(raw.to_string()))
        }
        ColumnType::Status => Some(CellValue::Status(normalize_status(Some(trimmed)))),
        ColumnType::Priority => trimmed.parse::<Priority>().ok().map(CellValue::Priority),
        ColumnType::Person => Some(CellValue::Person(trimmed.to_string())),
        ColumnType::Date => parse_date(trimmed).map(CellValue::Date),
        ColumnType::Number | ColumnType::Money => parse_loose_number(trimmed).map(CellValue::Number),
        ColumnType::Checkbox => Some(CellValue::Checkbox(trimmed == "true")),
        ColumnType::Rating => trimmed
            .parse::<u8>()
            .ok()
            .filter(|stars| (1..=MAX_RATING).contains(stars))
            .map(CellValue::Rating),
        ColumnType::ProgressManual => {
            parse_loose_number(trimmed).map(|value| CellValue::Percent(clamp_percent(value)))
        }
        ColumnType::Dropdown => Some(CellValue::Choice(trimmed.to_string())),
        ColumnType::Connection => serde_json::from_str::<ConnectionConfig>(trimmed)
            .ok()
            .map(CellValue::Connection),
    }
}

/// Formats a native value for storage.
pub fn encode(value: &CellValue) -> String {
    match value {
        CellValue::Text(text) | CellValue::Person(text) | CellValue::Choice(text) => text.clone(),
        CellValue::Status(status) => status.as_str().to_string(),
        CellValue::Priority(priority) => priority.as_str().to_string(),
        CellValue::Date(date) => date.format("%Y-%m-%d").to_string(),
        CellValue::Number(number) => format_thousands(*number),
        CellValue::Checkbox(checked) => checked.to_string(),
        CellValue::Rating(stars) => stars.min(&MAX_RATING).to_string(),
        CellValue::Percent(percent) => percent.min(&100).to_string(),
        CellValue::Connection(config) => serde_json::to_string(config).unwrap_or_default(),
    }
}

/// Accepts `YYYY-MM-DD` and full RFC 3339 timestamps.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|stamp| stamp.date_naive())
        })
        .or_else(|| {
            trimmed
                .get(..10)
                .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        })
}

/// Short label used by date cells, e.g. `Mar 7`.
pub fn format_date_label(raw: Option<&str>) -> Option<String> {
    raw.and_then(parse_date)
        .map(|date| date.format("%b %-d").to_string())
}

/// Parses numbers that may carry thousands separators.
pub fn parse_loose_number(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn clamp_percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

/// `1234567.5` -> `1,234,567.5`; at most three fraction digits.
pub fn format_thousands(value: f64) -> String {
    format_grouped(value, 0, 3)
}

/// Fixed two-decimal money amount with separators, e.g. `1,200.00`.
pub fn format_money(value: f64) -> String {
    format_grouped(value, 2, 2)
}

fn format_grouped(value: f64, min_fraction: usize, max_fraction: usize) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let negative = value < 0.0;
    let fixed = format!("{:.*}", max_fraction, value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut fraction = frac_part.to_string();
    while fraction.len() > min_fraction && fraction.ends_with('0') {
        fraction.pop();
    }

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, digit) in digits.iter().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*digit);
    }

    let mut out = String::new();
    if negative && (grouped != "0" || !fraction.chars().all(|ch| ch == '0')) {
        out.push('-');
    }
    out.push_str(&grouped);
    if !fraction.is_empty() {
        out.push('.');
        out.push_str(&fraction);
    }
    out
}

/// Keystroke filter for number cells: only digits, `.` and `,` get through.
pub fn accept_number_input(raw: &str) -> Option<String> {
    NUMBER_INPUT_RE.is_match(raw).then(|| raw.to_string())
}

/// Reformat applied when a number cell loses focus. Unparseable text is kept.
pub fn format_number_on_blur(raw: &str) -> String {
    match parse_loose_number(raw) {
        Some(value) => format_thousands(value),
        None => raw.to_string(),
    }
}

/// Money cells drop every character except digits and `.`.
pub fn sanitize_money_input(raw: &str) -> String {
    MONEY_STRIP_RE.replace_all(raw, "").into_owned()
}
