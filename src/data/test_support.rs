//! Minimal entity used by the framework's unit tests

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::field::{FieldDef, FieldKind, FieldValue};
use super::item::DataItem;
use super::list::DataList;
use super::validation::ValidationErrors;
use super::values::DataValues;
use crate::error::DataErrorKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub text: String,
    pub tag: Option<u32>,
    pub comment: String,
}

impl Note {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            tag: None,
            comment: String::new(),
        }
    }
}

const NOTE_FIELDS: &[FieldDef] = &[
    FieldDef::new("Text", FieldKind::Text),
    FieldDef::new("Tag", FieldKind::Link("Note")),
    FieldDef::ignored("Comment", FieldKind::Text),
];

impl DataValues for Note {
    const ITEM_TYPE: &'static str = "Note";
    const LIST_NAME: &'static str = "Notes";

    fn fields() -> &'static [FieldDef] {
        NOTE_FIELDS
    }

    fn field_value(&self, index: usize) -> FieldValue {
        match index {
            0 => FieldValue::Text(self.text.clone()),
            1 => self.tag.map_or(FieldValue::None, FieldValue::link),
            2 => FieldValue::Text(self.comment.clone()),
            _ => FieldValue::None,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.text.cmp(&other.text)
    }

    fn validate(item: &DataItem<Self>, _list: &DataList<Self>, errors: &mut ValidationErrors) {
        if item.values().text.is_empty() {
            errors.add_error("Text", DataErrorKind::Missing, "Text is required");
        }
    }

    fn apply_changes(&mut self, other: &Self) -> bool {
        if self.text != other.text {
            self.text = other.text.clone();
        }
        if self.tag != other.tag {
            self.tag = other.tag;
        }
        true
    }
}
