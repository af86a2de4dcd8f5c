//! Per-column aggregates under a group. Always computed from every task in
//! the group, never from the filtered rows.

use serde::Serialize;

use crate::board_utils::resolve_task_status;
use crate::cells::read_raw;
use crate::codec::{format_money, format_thousands, parse_loose_number};
use crate::theme::Theme;
use crate::types::{Column, Group, Priority, Status};

pub const DEFAULT_CURRENCY: &str = "$";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSegment {
    pub label: &'static str,
    pub count: usize,
    /// Share of the group's tasks, `count / total * 100`.
    pub percent: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FooterStat {
    /// Nothing to show.
    None,
    Distribution { segments: Vec<BarSegment> },
    Sum { value: String, caption: &'static str },
    Count { count: usize, caption: &'static str },
}

impl FooterStat {
    pub fn label(&self) -> String {
        match self {
            Self::None => String::new(),
            Self::Distribution { segments } => segments
                .iter()
                .map(|segment| format!("{} {}", segment.label, segment.count))
                .collect::<Vec<_>>()
                .join(" / "),
            Self::Sum { value, caption } => format!("{value} {caption}"),
            Self::Count { count, caption } => format!("{count} {caption}"),
        }
    }
}

/// Zero counts render nothing.
pub fn count(count: usize) -> FooterStat {
    counted(count, "count")
}

fn counted(count: usize, caption: &'static str) -> FooterStat {
    if count == 0 {
        FooterStat::None
    } else {
        FooterStat::Count { count, caption }
    }
}

fn segments<T: Copy>(
    total: usize,
    values: impl IntoIterator<Item = T>,
    counts: impl Fn(T) -> usize,
    describe: impl Fn(T) -> (&'static str, &'static str),
) -> FooterStat {
    if total == 0 {
        return FooterStat::None;
    }
    let segments: Vec<BarSegment> = values
        .into_iter()
        .filter_map(|value| {
            let count = counts(value);
            if count == 0 {
                return None;
            }
            let (label, color) = describe(value);
            Some(BarSegment {
                label,
                count,
                percent: count as f64 / total as f64 * 100.0,
                color,
            })
        })
        .collect();
    FooterStat::Distribution { segments }
}

/// Stacked bar over resolved statuses.
pub fn status_distribution(group: &Group, _column: &Column, theme: &Theme) -> FooterStat {
    let resolved: Vec<Status> = group
        .tasks
        .iter()
        .map(|task| resolve_task_status(group, task))
        .collect();
    segments(
        group.tasks.len(),
        Status::ALL,
        |status| resolved.iter().filter(|value| **value == status).count(),
        |status| (status.as_str(), theme.status(status).background),
    )
}

/// Stacked bar over this column's priorities; unset secondary values are
/// not counted.
pub fn priority_distribution(group: &Group, column: &Column, theme: &Theme) -> FooterStat {
    let values: Vec<Option<Priority>> = group
        .tasks
        .iter()
        .map(|task| read_raw(task, column).and_then(|raw| raw.parse::<Priority>().ok()))
        .collect();
    segments(
        group.tasks.len(),
        Priority::ALL,
        |priority| values.iter().filter(|value| **value == Some(priority)).count(),
        |priority| (priority.as_str(), theme.priority(priority).background),
    )
}

pub fn assigned_count(group: &Group, column: &Column) -> FooterStat {
    counted(non_empty(group, column), "owners")
}

pub fn non_empty_count(group: &Group, column: &Column) -> FooterStat {
    count(non_empty(group, column))
}

fn non_empty(group: &Group, column: &Column) -> usize {
    group
        .tasks
        .iter()
        .filter(|task| {
            read_raw(task, column)
                .map(|raw| !raw.trim().is_empty())
                .unwrap_or(false)
        })
        .count()
}

pub fn checked_count(group: &Group, column: &Column) -> FooterStat {
    let checked = group
        .tasks
        .iter()
        .filter(|task| read_raw(task, column).as_deref() == Some("true"))
        .count();
    counted(checked, "checked")
}

/// Sum of parseable values; anything else counts as zero.
pub fn column_sum(group: &Group, column: &Column) -> f64 {
    group
        .tasks
        .iter()
        .filter_map(|task| read_raw(task, column))
        .filter_map(|raw| parse_loose_number(&raw))
        .sum()
}

pub fn number_sum(group: &Group, column: &Column) -> FooterStat {
    FooterStat::Sum {
        value: format_thousands(column_sum(group, column)),
        caption: "sum",
    }
}

pub fn money_sum(group: &Group, column: &Column) -> FooterStat {
    FooterStat::Sum {
        value: format!("{} {}", currency(column), format_money(column_sum(group, column))),
        caption: "sum",
    }
}

pub fn currency(column: &Column) -> &str {
    column
        .config
        .currency
        .as_deref()
        .filter(|currency| !currency.trim().is_empty())
        .unwrap_or(DEFAULT_CURRENCY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemePreset;
    use crate::types::{COL_PERSON, COL_PRIORITY, COL_STATUS, ColumnType, Task, default_columns};

    fn group(tasks: Vec<Task>) -> Group {
        let mut columns = default_columns();
        columns.push(Column::new("col_cost", "Cost", ColumnType::Money, 140));
        columns.push(Column::new("col_pts", "Points", ColumnType::Number, 140));
        columns.push(Column::new("col_ok", "OK", ColumnType::Checkbox, 80));
        columns.push(Column::new("col_notes", "Notes", ColumnType::Text, 140));
        Group {
            id: "g1".to_string(),
            title: "Sprint".to_string(),
            color: "#579bfc".to_string(),
            columns,
            tasks,
            is_pinned: false,
        }
    }

    fn task(id: &str, status: Status, values: &[(&str, &str)]) -> Task {
        let mut task = Task::new(id, id);
        task.status = status;
        for (column, value) in values {
            task.text_values
                .insert(column.to_string(), value.to_string());
        }
        task
    }

    #[test]
    fn status_bar_hides_zero_segments_and_uses_all_tasks() {
        let theme = Theme::from_preset(ThemePreset::Light);
        let group = group(vec![
            task("a", Status::Done, &[]),
            task("b", Status::Done, &[]),
            task("c", Status::Stuck, &[]),
            task("d", Status::New, &[]),
        ]);
        let column = group.column(COL_STATUS).unwrap().clone();
        let FooterStat::Distribution { segments } = status_distribution(&group, &column, &theme)
        else {
            panic!("status footer is a distribution");
        };
        let summary: Vec<(&str, usize, f64)> = segments
            .iter()
            .map(|segment| (segment.label, segment.count, segment.percent))
            .collect();
        assert_eq!(
            summary,
            vec![("New", 1, 25.0), ("Stuck", 1, 25.0), ("Done", 2, 50.0)]
        );
    }

    #[test]
    fn empty_group_has_no_distribution() {
        let theme = Theme::from_preset(ThemePreset::Dark);
        let group = group(Vec::new());
        let column = group.column(COL_PRIORITY).unwrap().clone();
        assert_eq!(priority_distribution(&group, &column, &theme), FooterStat::None);
    }

    #[test]
    fn sums_strip_commas_and_ignore_garbage() {
        let group = group(vec![
            task("a", Status::New, &[("col_cost", "1,200.5"), ("col_pts", "3")]),
            task("b", Status::New, &[("col_cost", "abc"), ("col_pts", "1,000")]),
            task("c", Status::New, &[]),
        ]);
        let cost = group.column("col_cost").unwrap().clone();
        let points = group.column("col_pts").unwrap().clone();
        assert_eq!(money_sum(&group, &cost).label(), "$ 1,200.50 sum");
        assert_eq!(number_sum(&group, &points).label(), "1,003 sum");
    }

    #[test]
    fn counts_for_checkbox_person_text_and_name() {
        let mut assigned = task("a", Status::New, &[("col_ok", "true"), ("col_notes", "x")]);
        assigned.person_id = Some("p1".to_string());
        let group = group(vec![
            assigned,
            task("b", Status::New, &[("col_ok", "false"), ("col_notes", "  ")]),
        ]);
        let ok = group.column("col_ok").unwrap().clone();
        let owner = group.column(COL_PERSON).unwrap().clone();
        let notes = group.column("col_notes").unwrap().clone();

        assert_eq!(checked_count(&group, &ok).label(), "1 checked");
        assert_eq!(assigned_count(&group, &owner).label(), "1 owners");
        assert_eq!(non_empty_count(&group, &notes).label(), "1 count");
        assert_eq!(count(group.tasks.len()).label(), "2 count");
        assert_eq!(count(0), FooterStat::None);
    }

    #[test]
    fn currency_defaults_to_dollar() {
        let mut column = Column::new("col_cost", "Cost", ColumnType::Money, 140);
        assert_eq!(currency(&column), "$");
        column.config.currency = Some("€".to_string());
        assert_eq!(currency(&column), "€");
    }
}
