//! `ColumnType -> CellRenderer` dispatch table, built once.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::codec::{CellValue, decode, format_date_label, format_thousands, parse_loose_number};
use crate::theme::Theme;
use crate::types::{Column, ColumnType, Group, Person, Task};
use crate::ui::footer::{self, FooterStat};

use super::inline::{BUTTON_LABEL, SET_DATE, connection_label, connection_target, progress_value, rating_value};
use super::person::{Avatar, person_avatar};
use super::priority::priority_chip;
use super::status::status_chip;
use super::{Chip, PLACEHOLDER, read_raw};

pub const UNTITLED: &str = "Untitled";

/// Name cell view; blank names show `UNTITLED` instead of an empty label.
pub fn name_view(name: &str) -> CellView {
    if name.trim().is_empty() {
        CellView::Placeholder(UNTITLED)
    } else {
        CellView::Name(name.to_string())
    }
}

/// Everything a renderer may look at for one parent-row cell.
#[derive(Debug, Clone, Copy)]
pub struct CellContext<'a> {
    pub group: &'a Group,
    pub task: &'a Task,
    pub column: &'a Column,
    pub theme: &'a Theme,
    pub people: &'a [Person],
}

impl CellContext<'_> {
    pub fn raw(&self) -> Option<String> {
        read_raw(self.task, self.column)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellView {
    Name(String),
    Chip(Chip),
    Avatar(Avatar),
    Text(String),
    /// Prefixed amount, e.g. `$` + `12.50`.
    Money { currency: String, amount: Option<String> },
    Checkbox(bool),
    Rating { filled: u8, max: u8 },
    Progress(u8),
    Link { label: String, target: Option<String> },
    Button(&'static str),
    Placeholder(&'static str),
}

impl CellView {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }

    /// Plain-text rendering for tables and logs.
    pub fn label(&self) -> String {
        match self {
            Self::Name(text) | Self::Text(text) => text.clone(),
            Self::Chip(chip) => chip.label.clone(),
            Self::Avatar(Avatar::Assigned { name, .. }) => name.clone(),
            Self::Avatar(Avatar::Unassigned { .. }) => PLACEHOLDER.to_string(),
            Self::Money { currency, amount } => match amount {
                Some(amount) => format!("{currency}{amount}"),
                None => PLACEHOLDER.to_string(),
            },
            Self::Checkbox(true) => "[x]".to_string(),
            Self::Checkbox(false) => "[ ]".to_string(),
            Self::Rating { filled, max } => format!(
                "{}{}",
                "*".repeat(*filled as usize),
                ".".repeat(max.saturating_sub(*filled) as usize)
            ),
            Self::Progress(percent) => format!("{percent}%"),
            Self::Link { label, .. } => label.clone(),
            Self::Button(label) | Self::Placeholder(label) => label.to_string(),
        }
    }
}

/// How a cell reacts to activation (click, Enter, Space).
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Interaction {
    Popover,
    Inline,
    Toggle,
    Navigate,
    Action,
}

pub trait CellRenderer: Send + Sync {
    fn render(&self, ctx: &CellContext<'_>) -> CellView;

    fn interaction(&self) -> Interaction;

    /// Aggregate shown under this column.
    fn footer(&self, _group: &Group, _column: &Column, _theme: &Theme) -> FooterStat {
        FooterStat::None
    }
}

struct NameRenderer;
struct StatusRenderer;
struct PriorityRenderer;
struct PersonRenderer;
struct DateRenderer;
struct TextRenderer;
struct NumberRenderer;
struct MoneyRenderer;
struct CheckboxRenderer;
struct DropdownRenderer;
struct RatingRenderer;
struct ProgressRenderer;
struct ButtonRenderer;
struct ConnectionRenderer;

impl CellRenderer for NameRenderer {
    fn render(&self, ctx: &CellContext<'_>) -> CellView {
        name_view(&ctx.task.name)
    }

    fn interaction(&self) -> Interaction {
        Interaction::Inline
    }

    fn footer(&self, group: &Group, _column: &Column, _theme: &Theme) -> FooterStat {
        footer::count(group.tasks.len())
    }
}

impl CellRenderer for StatusRenderer {
    fn render(&self, ctx: &CellContext<'_>) -> CellView {
        let status = match decode(ColumnType::Status, ctx.raw().as_deref()) {
            Some(CellValue::Status(status)) => Some(status),
            _ => None,
        };
        CellView::Chip(status_chip(status, ctx.theme))
    }

    fn interaction(&self) -> Interaction {
        Interaction::Popover
    }

    fn footer(&self, group: &Group, column: &Column, theme: &Theme) -> FooterStat {
        footer::status_distribution(group, column, theme)
    }
}

impl CellRenderer for PriorityRenderer {
    fn render(&self, ctx: &CellContext<'_>) -> CellView {
        let priority = match decode(ColumnType::Priority, ctx.raw().as_deref()) {
            Some(CellValue::Priority(priority)) => Some(priority),
            _ => None,
        };
        CellView::Chip(priority_chip(priority, ctx.theme))
    }

    fn interaction(&self) -> Interaction {
        Interaction::Popover
    }

    fn footer(&self, group: &Group, column: &Column, theme: &Theme) -> FooterStat {
        footer::priority_distribution(group, column, theme)
    }
}

impl CellRenderer for PersonRenderer {
    fn render(&self, ctx: &CellContext<'_>) -> CellView {
        CellView::Avatar(person_avatar(ctx.raw().as_deref(), ctx.people, ctx.theme))
    }

    fn interaction(&self) -> Interaction {
        Interaction::Popover
    }

    fn footer(&self, group: &Group, column: &Column, _theme: &Theme) -> FooterStat {
        footer::assigned_count(group, column)
    }
}

impl CellRenderer for DateRenderer {
    fn render(&self, ctx: &CellContext<'_>) -> CellView {
        match format_date_label(ctx.raw().as_deref()) {
            Some(label) => CellView::Text(label),
            None => CellView::Placeholder(SET_DATE),
        }
    }

    fn interaction(&self) -> Interaction {
        Interaction::Inline
    }

    fn footer(&self, group: &Group, column: &Column, _theme: &Theme) -> FooterStat {
        footer::non_empty_count(group, column)
    }
}

impl CellRenderer for TextRenderer {
    fn render(&self, ctx: &CellContext<'_>) -> CellView {
        match ctx.raw() {
            Some(text) if !text.trim().is_empty() => CellView::Text(text),
            _ => CellView::Placeholder(PLACEHOLDER),
        }
    }

    fn interaction(&self) -> Interaction {
        Interaction::Inline
    }

    fn footer(&self, group: &Group, column: &Column, _theme: &Theme) -> FooterStat {
        footer::non_empty_count(group, column)
    }
}

impl CellRenderer for NumberRenderer {
    fn render(&self, ctx: &CellContext<'_>) -> CellView {
        match ctx.raw() {
            Some(raw) => CellView::Text(
                parse_loose_number(&raw)
                    .map(format_thousands)
                    .unwrap_or(raw),
            ),
            None => CellView::Placeholder(PLACEHOLDER),
        }
    }

    fn interaction(&self) -> Interaction {
        Interaction::Inline
    }

    fn footer(&self, group: &Group, column: &Column, _theme: &Theme) -> FooterStat {
        footer::number_sum(group, column)
    }
}

impl CellRenderer for MoneyRenderer {
    fn render(&self, ctx: &CellContext<'_>) -> CellView {
        CellView::Money {
            currency: footer::currency(ctx.column).to_string(),
            amount: ctx.raw(),
        }
    }

    fn interaction(&self) -> Interaction {
        Interaction::Inline
    }

    fn footer(&self, group: &Group, column: &Column, _theme: &Theme) -> FooterStat {
        footer::money_sum(group, column)
    }
}

impl CellRenderer for CheckboxRenderer {
    fn render(&self, ctx: &CellContext<'_>) -> CellView {
        CellView::Checkbox(ctx.raw().as_deref() == Some("true"))
    }

    fn interaction(&self) -> Interaction {
        Interaction::Toggle
    }

    fn footer(&self, group: &Group, column: &Column, _theme: &Theme) -> FooterStat {
        footer::checked_count(group, column)
    }
}

impl CellRenderer for DropdownRenderer {
    fn render(&self, ctx: &CellContext<'_>) -> CellView {
        let selected = ctx.raw().and_then(|id| {
            ctx.column
                .config
                .options
                .iter()
                .find(|option| option.id == id)
        });
        match selected {
            Some(option) => CellView::Chip(Chip {
                label: option.label.clone(),
                swatch: crate::theme::Swatch {
                    background: ctx.theme.empty.background,
                    foreground: ctx.theme.text,
                },
                is_placeholder: false,
            }),
            None => CellView::Placeholder(PLACEHOLDER),
        }
    }

    fn interaction(&self) -> Interaction {
        Interaction::Popover
    }

    fn footer(&self, group: &Group, column: &Column, _theme: &Theme) -> FooterStat {
        footer::non_empty_count(group, column)
    }
}

impl CellRenderer for RatingRenderer {
    fn render(&self, ctx: &CellContext<'_>) -> CellView {
        CellView::Rating {
            filled: rating_value(ctx.raw().as_deref()),
            max: crate::codec::MAX_RATING,
        }
    }

    fn interaction(&self) -> Interaction {
        Interaction::Inline
    }
}

impl CellRenderer for ProgressRenderer {
    fn render(&self, ctx: &CellContext<'_>) -> CellView {
        CellView::Progress(progress_value(ctx.raw().as_deref()))
    }

    fn interaction(&self) -> Interaction {
        Interaction::Inline
    }
}

impl CellRenderer for ButtonRenderer {
    fn render(&self, _ctx: &CellContext<'_>) -> CellView {
        CellView::Button(BUTTON_LABEL)
    }

    fn interaction(&self) -> Interaction {
        Interaction::Action
    }
}

impl CellRenderer for ConnectionRenderer {
    fn render(&self, ctx: &CellContext<'_>) -> CellView {
        let raw = ctx.raw();
        CellView::Link {
            label: connection_label(raw.as_deref()),
            target: connection_target(raw.as_deref()),
        }
    }

    fn interaction(&self) -> Interaction {
        Interaction::Navigate
    }
}

fn renderer_for(column_type: ColumnType) -> Box<dyn CellRenderer> {
    match column_type {
        ColumnType::Name => Box::new(NameRenderer),
        ColumnType::Status => Box::new(StatusRenderer),
        ColumnType::Priority => Box::new(PriorityRenderer),
        ColumnType::Person => Box::new(PersonRenderer),
        ColumnType::Date => Box::new(DateRenderer),
        ColumnType::Text | ColumnType::LongText => Box::new(TextRenderer),
        ColumnType::Number => Box::new(NumberRenderer),
        ColumnType::Money => Box::new(MoneyRenderer),
        ColumnType::Checkbox => Box::new(CheckboxRenderer),
        ColumnType::Dropdown => Box::new(DropdownRenderer),
        ColumnType::Rating => Box::new(RatingRenderer),
        ColumnType::ProgressManual => Box::new(ProgressRenderer),
        ColumnType::Button => Box::new(ButtonRenderer),
        ColumnType::Connection => Box::new(ConnectionRenderer),
    }
}

static REGISTRY: LazyLock<HashMap<ColumnType, Box<dyn CellRenderer>>> = LazyLock::new(|| {
    ColumnType::ALL
        .into_iter()
        .map(|column_type| (column_type, renderer_for(column_type)))
        .collect()
});

/// Covers every [`ColumnType`]; text rendering backs any gap.
pub fn renderer(column_type: ColumnType) -> &'static dyn CellRenderer {
    static FALLBACK: TextRenderer = TextRenderer;
    REGISTRY
        .get(&column_type)
        .map(|renderer| &**renderer)
        .unwrap_or(&FALLBACK)
}

pub fn render_cell(ctx: &CellContext<'_>) -> CellView {
    renderer(ctx.column.column_type).render(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemePreset;
    use crate::types::{COL_STATUS, DropdownOption, Status, default_people};

    fn group_with(columns: Vec<Column>, tasks: Vec<Task>) -> Group {
        Group {
            id: "g1".to_string(),
            title: "Sprint".to_string(),
            color: "#579bfc".to_string(),
            columns,
            tasks,
            is_pinned: false,
        }
    }

    #[test]
    fn every_column_type_renders_something_for_an_empty_task() {
        let people = default_people();
        let task = Task::new("t1", "");
        for preset in ThemePreset::ALL {
            let theme = Theme::from_preset(preset);
            for column_type in ColumnType::ALL {
                let column = Column::new(format!("col_{}", column_type.as_str()), "C", column_type, 140);
                let group = group_with(vec![column.clone()], vec![task.clone()]);
                let ctx = CellContext {
                    group: &group,
                    task: &task,
                    column: &column,
                    theme: &theme,
                    people: &people,
                };
                let view = render_cell(&ctx);
                assert!(!view.label().is_empty(), "{column_type:?} rendered nothing");
            }
        }
    }

    #[test]
    fn blank_names_render_untitled() {
        assert_eq!(name_view("  "), CellView::Placeholder(UNTITLED));
        assert!(name_view("").is_placeholder());
        assert_eq!(name_view("Ship"), CellView::Name("Ship".to_string()));
    }

    #[test]
    fn secondary_status_renders_set_status_until_filled() {
        let people = default_people();
        let theme = Theme::from_preset(ThemePreset::Light);
        let column = Column::new("col_review", "Review", ColumnType::Status, 128);
        let empty = Task::new("t1", "Ship");
        let mut filled = empty.clone();
        filled
            .text_values
            .insert("col_review".to_string(), "Done".to_string());
        let group = group_with(vec![column.clone()], vec![empty.clone()]);
        let ctx = CellContext {
            group: &group,
            task: &empty,
            column: &column,
            theme: &theme,
            people: &people,
        };
        assert_eq!(render_cell(&ctx).label(), "Set Status");

        let ctx = CellContext {
            task: &filled,
            ..ctx
        };
        assert_eq!(render_cell(&ctx).label(), "Done");
    }

    #[test]
    fn primary_status_reads_structured_field() {
        let people = default_people();
        let theme = Theme::from_preset(ThemePreset::Dark);
        let column = Column::new(COL_STATUS, "Status", ColumnType::Status, 128);
        let mut task = Task::new("t1", "Ship");
        task.status = Status::Stuck;
        let group = group_with(vec![column.clone()], vec![task.clone()]);
        let view = render_cell(&CellContext {
            group: &group,
            task: &task,
            column: &column,
            theme: &theme,
            people: &people,
        });
        let CellView::Chip(chip) = view else {
            panic!("status renders a chip");
        };
        assert_eq!(chip.swatch, theme.status(Status::Stuck));
    }

    #[test]
    fn dropdown_and_number_rendering() {
        let people = default_people();
        let theme = Theme::from_preset(ThemePreset::Light);
        let mut dropdown = Column::new("col_team", "Team", ColumnType::Dropdown, 140);
        dropdown.config.options = vec![DropdownOption {
            id: "o1".to_string(),
            label: "Backend".to_string(),
            color: String::new(),
        }];
        let number = Column::new("col_pts", "Points", ColumnType::Number, 140);
        let mut task = Task::new("t1", "Ship");
        task.text_values.insert("col_team".to_string(), "o1".to_string());
        task.text_values.insert("col_pts".to_string(), "12000".to_string());
        let group = group_with(vec![dropdown.clone(), number.clone()], vec![task.clone()]);

        let ctx = CellContext {
            group: &group,
            task: &task,
            column: &dropdown,
            theme: &theme,
            people: &people,
        };
        assert_eq!(render_cell(&ctx).label(), "Backend");
        let ctx = CellContext { column: &number, ..ctx };
        assert_eq!(render_cell(&ctx).label(), "12,000");
    }

    #[test]
    fn interactions_by_type() {
        assert_eq!(renderer(ColumnType::Status).interaction(), Interaction::Popover);
        assert_eq!(renderer(ColumnType::Checkbox).interaction(), Interaction::Toggle);
        assert_eq!(renderer(ColumnType::Connection).interaction(), Interaction::Navigate);
        assert_eq!(renderer(ColumnType::Button).interaction(), Interaction::Action);
    }
}
