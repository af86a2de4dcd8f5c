use crate::theme::Theme;
use crate::types::Person;

use super::QuickCell;
use super::overlay::FlyoutSpec;
use super::popover::{MenuItem, PopoverEvent};

pub const CLEAR_SELECTION: &str = "Clear Selection";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonChoice {
    Person(String),
    Clear,
}

pub type PersonCell = QuickCell<PersonChoice>;

/// Directory entries followed by "Clear Selection".
pub fn person_items(people: &[Person]) -> Vec<MenuItem<PersonChoice>> {
    people
        .iter()
        .map(|person| MenuItem::new(PersonChoice::Person(person.id.clone()), person.name.clone()))
        .chain(std::iter::once(MenuItem::new(PersonChoice::Clear, CLEAR_SELECTION)))
        .collect()
}

pub fn person_cell(person_id: Option<&str>, people: &[Person]) -> PersonCell {
    QuickCell::new(
        person_id.map(|id| PersonChoice::Person(id.to_string())),
        person_items(people),
        FlyoutSpec::PERSON,
    )
}

/// `Some(None)` means the selection was cleared.
pub fn committed_person(event: PopoverEvent<PersonChoice>) -> Option<Option<String>> {
    match event.committed()? {
        PersonChoice::Person(id) => Some(Some(id)),
        PersonChoice::Clear => Some(None),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Avatar {
    Assigned {
        initials: String,
        name: String,
        color: String,
    },
    /// Dashed empty circle.
    Unassigned { background: &'static str },
}

/// Unknown ids render like an empty assignment.
pub fn person_avatar(person_id: Option<&str>, people: &[Person], theme: &Theme) -> Avatar {
    match person_id.and_then(|id| people.iter().find(|person| person.id == id)) {
        Some(person) => Avatar::Assigned {
            initials: person.initials.clone(),
            name: person.name.clone(),
            color: person.color.clone(),
        },
        None => Avatar::Unassigned {
            background: theme.empty.background,
        },
    }
}
