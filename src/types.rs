use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

pub const COL_NAME: &str = "col_name";
pub const COL_STATUS: &str = "col_status";
pub const COL_PRIORITY: &str = "col_priority";
pub const COL_OWNER: &str = "col_owner";
pub const COL_PERSON: &str = "col_person";
pub const COL_DATE: &str = "col_date";

pub const DEFAULT_COLUMN_WIDTH: u32 = 140;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash, Default)]
pub enum Status {
    #[default]
    New,
    Pending,
    #[serde(rename = "Working on it")]
    Working,
    Stuck,
    #[serde(rename = "Almost Finish")]
    AlmostFinish,
    Done,
}

impl Status {
    /// Menu order.
    pub const ALL: [Self; 6] = [
        Self::New,
        Self::Pending,
        Self::Working,
        Self::Stuck,
        Self::AlmostFinish,
        Self::Done,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Pending => "Pending",
            Self::Working => "Working on it",
            Self::Stuck => "Stuck",
            Self::AlmostFinish => "Almost Finish",
            Self::Done => "Done",
        }
    }

    /// Fixed contribution of one item in this status to weighted progress.
    pub const fn weight(self) -> f64 {
        match self {
            Self::Done => 1.0,
            Self::AlmostFinish => 0.75,
            Self::Working => 0.5,
            Self::Pending => 0.25,
            Self::New => 0.1,
            Self::Stuck => 0.0,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash, Default)]
pub enum Priority {
    #[default]
    Normal,
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Self; 5] = [
        Self::Normal,
        Self::Low,
        Self::Medium,
        Self::High,
        Self::Urgent,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Urgent => "Urgent",
        }
    }

    /// Rank used when sorting by priority, most urgent first.
    pub const fn sort_rank(self) -> u8 {
        match self {
            Self::Urgent => 1,
            Self::High => 2,
            Self::Medium => 3,
            Self::Normal => 4,
            Self::Low => 5,
        }
    }
}

impl FromStr for Priority {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|priority| priority.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or(())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Name,
    Status,
    Priority,
    Person,
    Date,
    Text,
    LongText,
    Number,
    Money,
    Checkbox,
    Dropdown,
    Rating,
    ProgressManual,
    Button,
    Connection,
}

impl ColumnType {
    pub const ALL: [Self; 15] = [
        Self::Name,
        Self::Status,
        Self::Priority,
        Self::Person,
        Self::Date,
        Self::Text,
        Self::LongText,
        Self::Number,
        Self::Money,
        Self::Checkbox,
        Self::Dropdown,
        Self::Rating,
        Self::ProgressManual,
        Self::Button,
        Self::Connection,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Status => "status",
            Self::Priority => "priority",
            Self::Person => "person",
            Self::Date => "date",
            Self::Text => "text",
            Self::LongText => "long_text",
            Self::Number => "number",
            Self::Money => "money",
            Self::Checkbox => "checkbox",
            Self::Dropdown => "dropdown",
            Self::Rating => "rating",
            Self::ProgressManual => "progress_manual",
            Self::Button => "button",
            Self::Connection => "connection",
        }
    }
}

impl FromStr for ColumnType {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or(())
    }
}

/// Structured task field backing a primary column.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PrimaryField {
    Status,
    Priority,
    Person,
    DueDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct DropdownOption {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ColumnConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<DropdownOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Column {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(deserialize_with = "deserialize_width")]
    pub width: u32,
    #[serde(default)]
    pub config: ColumnConfig,
}

impl Column {
    pub fn new(id: impl Into<String>, title: impl Into<String>, column_type: ColumnType, width: u32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            column_type,
            width,
            config: ColumnConfig::default(),
        }
    }

    /// The structured field this column reads and writes, if it is primary.
    ///
    /// A column is primary only when both its type and its reserved id agree;
    /// every other column stores its value in `Task::text_values`.
    pub fn primary_field(&self) -> Option<PrimaryField> {
        match (self.column_type, self.id.as_str()) {
            (ColumnType::Status, COL_STATUS) => Some(PrimaryField::Status),
            (ColumnType::Priority, COL_PRIORITY) => Some(PrimaryField::Priority),
            (ColumnType::Person, COL_OWNER | COL_PERSON) => Some(PrimaryField::Person),
            (ColumnType::Date, COL_DATE) => Some(PrimaryField::DueDate),
            _ => None,
        }
    }

    pub fn is_primary(&self) -> bool {
        self.primary_field().is_some()
    }
}

fn deserialize_width<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawWidth {
        Number(f64),
        Text(String),
    }

    Ok(match RawWidth::deserialize(deserializer)? {
        RawWidth::Number(value) if value.is_finite() && value > 0.0 => value.round() as u32,
        RawWidth::Number(_) => DEFAULT_COLUMN_WIDTH,
        RawWidth::Text(raw) => parse_width(&raw).unwrap_or(DEFAULT_COLUMN_WIDTH),
    })
}

/// Parses `"300px"` / `"300"` style widths.
pub fn parse_width(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_suffix("px").unwrap_or(trimmed).trim();
    digits
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value > 0.0)
        .map(|value| value.round() as u32)
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Person {
    pub id: String,
    pub name: String,
    pub initials: String,
    pub color: String,
}

impl Person {
    pub fn new(id: &str, name: &str, initials: &str, color: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            initials: initials.to_string(),
            color: color.to_string(),
        }
    }
}

pub fn default_people() -> Vec<Person> {
    vec![
        Person::new("p1", "Max", "MA", "#3b82f6"),
        Person::new("p2", "Hasan", "HA", "#10b981"),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Subtask {
    pub id: String,
    pub name: String,
    /// Carried for progress only; subtask rows never edit it.
    #[serde(default)]
    pub status: Status,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub person_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub due_date: Option<String>,
    #[serde(default)]
    pub text_values: BTreeMap<String, String>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

impl Task {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            order: 0,
            selected: false,
            status: Status::New,
            priority: Priority::Normal,
            person_id: None,
            due_date: None,
            text_values: BTreeMap::new(),
            subtasks: Vec::new(),
        }
    }

    pub fn text_value(&self, column_id: &str) -> Option<&str> {
        self.text_values.get(column_id).map(String::as_str)
    }
}

/// Empty strings from older saves mean "unset".
fn deserialize_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|value| !value.trim().is_empty()))
}

/// Merge patch over a task (`Partial<Task>`). `None` leaves a field alone.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_id: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_values: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtasks: Option<Vec<Subtask>>,
}

impl TaskPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn priority(priority: Priority) -> Self {
        Self {
            priority: Some(priority),
            ..Self::default()
        }
    }

    pub fn person(person_id: Option<String>) -> Self {
        Self {
            person_id: Some(person_id),
            ..Self::default()
        }
    }

    pub fn due_date(due_date: Option<String>) -> Self {
        Self {
            due_date: Some(due_date),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Later fields win; `text_values` is replaced wholesale like a spread.
    pub fn merge(&mut self, other: TaskPatch) {
        if other.name.is_some() {
            self.name = other.name;
        }
        if other.selected.is_some() {
            self.selected = other.selected;
        }
        if other.status.is_some() {
            self.status = other.status;
        }
        if other.priority.is_some() {
            self.priority = other.priority;
        }
        if other.person_id.is_some() {
            self.person_id = other.person_id;
        }
        if other.due_date.is_some() {
            self.due_date = other.due_date;
        }
        if other.text_values.is_some() {
            self.text_values = other.text_values;
        }
        if other.subtasks.is_some() {
            self.subtasks = other.subtasks;
        }
    }

    pub fn apply_to(&self, task: &Task) -> Task {
        let mut next = task.clone();
        if let Some(name) = &self.name {
            next.name = name.clone();
        }
        if let Some(selected) = self.selected {
            next.selected = selected;
        }
        if let Some(status) = self.status {
            next.status = status;
        }
        if let Some(priority) = self.priority {
            next.priority = priority;
        }
        if let Some(person_id) = &self.person_id {
            next.person_id = person_id.clone();
        }
        if let Some(due_date) = &self.due_date {
            next.due_date = due_date.clone();
        }
        if let Some(text_values) = &self.text_values {
            next.text_values = text_values.clone();
        }
        if let Some(subtasks) = &self.subtasks {
            next.subtasks = subtasks.clone();
        }
        next
    }
}

/// Uncommitted values typed into a group's "add task" row.
pub type Draft = TaskPatch;

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub title: String,
    pub color: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub is_pinned: bool,
}

impl Group {
    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.id == column_id)
    }

    /// First status-typed column in array order.
    pub fn status_column(&self) -> Option<&Column> {
        self.columns
            .iter()
            .find(|column| column.column_type == ColumnType::Status)
    }

    pub fn all_selected(&self) -> bool {
        !self.tasks.is_empty() && self.tasks.iter().all(|task| task.selected)
    }

    pub fn some_selected(&self) -> bool {
        self.tasks.iter().any(|task| task.selected)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Board {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub groups: Vec<Group>,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            id: "board-1".to_string(),
            name: "Task Board".to_string(),
            groups: Vec::new(),
        }
    }
}

impl Board {
    pub fn group(&self, group_id: &str) -> Option<&Group> {
        self.groups.iter().find(|group| group.id == group_id)
    }

    /// Pinned groups first, otherwise stored order.
    pub fn groups_in_display_order(&self) -> Vec<&Group> {
        let mut groups: Vec<&Group> = self.groups.iter().collect();
        groups.sort_by_key(|group| !group.is_pinned);
        groups
    }
}

pub fn default_columns() -> Vec<Column> {
    vec![
        Column::new(COL_NAME, "Item", ColumnType::Name, 300),
        Column::new(COL_PERSON, "Owner", ColumnType::Person, 96),
        Column::new(COL_STATUS, "Status", ColumnType::Status, 128),
        Column::new(COL_PRIORITY, "Priority", ColumnType::Priority, 128),
        Column::new(COL_DATE, "Due Date", ColumnType::Date, 110),
    ]
}
