//! In-place editors: text, numbers, money, dates, checkbox, rating, progress
//! slider and connection links. None of them open a flyout.

use crate::codec::{
    CellValue, MAX_RATING, accept_number_input, decode, format_number_on_blur, parse_date,
    sanitize_money_input,
};
use crate::types::{ColumnType, ConnectionConfig};

pub const SET_DATE: &str = "Set Date";
pub const CONNECT: &str = "Connect";
pub const BUTTON_LABEL: &str = "Click Me";

#[derive(Debug, Clone, PartialEq)]
pub enum InlineEdit {
    /// Keystroke-level replacement of the whole text.
    Text(String),
    /// Focus left a number cell.
    Blur,
    ToggleCheckbox,
    Rate(u8),
    Slide(f64),
    /// `None` clears the date.
    PickDate(Option<String>),
    Connect(ConnectionConfig),
}

#[derive(Debug, Clone, PartialEq)]
pub enum InlineOutcome {
    /// Input is not valid for this column; nothing is written.
    Rejected,
    /// Value to store; `None` clears it.
    Write(Option<CellValue>),
}

/// Turns an edit on a `column_type` cell holding `current` into a write.
pub fn apply_inline(column_type: ColumnType, current: Option<&str>, edit: &InlineEdit) -> InlineOutcome {
    use InlineOutcome::{Rejected, Write};

    match (column_type, edit) {
        (ColumnType::Name | ColumnType::Text | ColumnType::LongText, InlineEdit::Text(raw)) => {
            Write(Some(CellValue::Text(raw.clone())))
        }
        (ColumnType::Number, InlineEdit::Text(raw)) => match accept_number_input(raw) {
            Some(accepted) => Write(Some(CellValue::Text(accepted))),
            None => Rejected,
        },
        (ColumnType::Number, InlineEdit::Blur) => match current {
            Some(raw) if !raw.trim().is_empty() => {
                let formatted = format_number_on_blur(raw);
                if formatted == raw {
                    Rejected
                } else {
                    Write(Some(CellValue::Text(formatted)))
                }
            }
            _ => Rejected,
        },
        (ColumnType::Money, InlineEdit::Text(raw)) => {
            Write(Some(CellValue::Text(sanitize_money_input(raw))))
        }
        (ColumnType::Checkbox, InlineEdit::ToggleCheckbox) => {
            let checked = current == Some("true");
            Write(Some(CellValue::Checkbox(!checked)))
        }
        (ColumnType::Rating, InlineEdit::Rate(stars)) if (1..=MAX_RATING).contains(stars) => {
            Write(Some(CellValue::Rating(*stars)))
        }
        (ColumnType::ProgressManual, InlineEdit::Slide(value)) if value.is_finite() => {
            Write(Some(CellValue::Percent(value.round().clamp(0.0, 100.0) as u8)))
        }
        (ColumnType::Date, InlineEdit::PickDate(None)) => Write(None),
        (ColumnType::Date, InlineEdit::PickDate(Some(raw))) => match parse_date(raw) {
            Some(date) => Write(Some(CellValue::Date(date))),
            None => Rejected,
        },
        (ColumnType::Connection, InlineEdit::Connect(config)) => {
            Write(Some(CellValue::Connection(config.clone())))
        }
        _ => Rejected,
    }
}

pub fn rating_value(raw: Option<&str>) -> u8 {
    match decode(ColumnType::Rating, raw) {
        Some(CellValue::Rating(stars)) => stars,
        _ => 0,
    }
}

pub fn progress_value(raw: Option<&str>) -> u8 {
    match decode(ColumnType::ProgressManual, raw) {
        Some(CellValue::Percent(percent)) => percent,
        _ => 0,
    }
}

pub fn connection_config(raw: Option<&str>) -> Option<ConnectionConfig> {
    match decode(ColumnType::Connection, raw) {
        Some(CellValue::Connection(config)) => Some(config),
        _ => None,
    }
}

/// "Go to <name>" once a target is configured, otherwise "Connect".
pub fn connection_label(raw: Option<&str>) -> String {
    connection_config(raw)
        .and_then(|config| config.target_name)
        .filter(|name| !name.trim().is_empty())
        .map(|name| format!("Go to {name}"))
        .unwrap_or_else(|| CONNECT.to_string())
}

/// Where activating a connection cell navigates, if anywhere.
pub fn connection_target(raw: Option<&str>) -> Option<String> {
    connection_config(raw)
        .and_then(|config| config.target_path)
        .filter(|path| !path.trim().is_empty())
}
