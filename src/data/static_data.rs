//! Enumerated reference data
//!
//! A static list holds one item per variant of a closed enumeration
//! (currencies, account categories, info types). The item id is the
//! variant's class id, and the user may rename, reorder or disable entries.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;

use super::field::{FieldDef, FieldKind, FieldValue};
use super::item::DataItem;
use super::list::DataList;
use super::validation::ValidationErrors;
use super::values::DataValues;
use crate::error::{DataErrorKind, MoneyWiseResult};

pub const NAME_LEN: usize = 30;
pub const DESC_LEN: usize = 50;

/// A closed enumeration backing a static list
pub trait StaticClass:
    Copy + Eq + Ord + Hash + fmt::Debug + Serialize + DeserializeOwned + 'static
{
    const ITEM_TYPE: &'static str;
    const LIST_NAME: &'static str;

    /// Every variant, in declaration order
    fn all() -> &'static [Self];

    /// Stable id of the variant, used as the item id
    fn class_id(self) -> u32;

    /// Default display name
    fn name(self) -> &'static str;

    /// Default sort order
    fn order(self) -> i32 {
        self.class_id() as i32 - 1
    }

    fn from_id(id: u32) -> Option<Self> {
        Self::all().iter().copied().find(|c| c.class_id() == id)
    }

    /// Look up a variant by its default name, ignoring case and separators
    fn parse(name: &str) -> Option<Self> {
        let wanted = name.replace(['_', '-'], " ");
        Self::all()
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(wanted.trim()))
    }
}

/// Values of one static data item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticValues<E> {
    pub class: E,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub order: i32,
    pub enabled: bool,
}

impl<E: StaticClass> StaticValues<E> {
    /// Default values for a variant
    pub fn from_class(class: E) -> Self {
        Self {
            class,
            name: class.name().to_string(),
            description: None,
            order: class.order(),
            enabled: true,
        }
    }
}

const STATIC_FIELDS: &[FieldDef] = &[
    FieldDef::new("Class", FieldKind::Integer),
    FieldDef::new("Name", FieldKind::Text),
    FieldDef::new("Description", FieldKind::Text),
    FieldDef::new("Order", FieldKind::Integer),
    FieldDef::new("Enabled", FieldKind::Flag),
];

impl<E: StaticClass> DataValues for StaticValues<E> {
    const ITEM_TYPE: &'static str = E::ITEM_TYPE;
    const LIST_NAME: &'static str = E::LIST_NAME;

    fn fields() -> &'static [FieldDef] {
        STATIC_FIELDS
    }

    fn field_value(&self, index: usize) -> FieldValue {
        match index {
            0 => FieldValue::Integer(i64::from(self.class.class_id())),
            1 => FieldValue::Text(self.name.clone()),
            2 => FieldValue::text(self.description.as_deref()),
            3 => FieldValue::Integer(i64::from(self.order)),
            4 => FieldValue::Flag(self.enabled),
            _ => FieldValue::None,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.order.cmp(&other.order)
    }

    fn validate(item: &DataItem<Self>, list: &DataList<Self>, errors: &mut ValidationErrors) {
        let values = item.values();

        if values.name.is_empty() {
            errors.add_error("Name", DataErrorKind::Missing, "Name is required");
        } else if values.name.chars().count() > NAME_LEN {
            errors.add_error(
                "Name",
                DataErrorKind::LengthExceeded,
                format!("Name exceeds {} characters", NAME_LEN),
            );
        } else if list.count_instances_of_name(&values.name) > 1 {
            errors.add_error(
                "Name",
                DataErrorKind::DuplicateValue,
                format!("Duplicate name '{}'", values.name),
            );
        }

        if let Some(description) = &values.description {
            if description.chars().count() > DESC_LEN {
                errors.add_error(
                    "Description",
                    DataErrorKind::LengthExceeded,
                    format!("Description exceeds {} characters", DESC_LEN),
                );
            }
        }

        if values.order < 0 {
            errors.add_error("Order", DataErrorKind::InvalidValue, "Order must not be negative");
        } else if list.count_instances_of_order(values.order) > 1 {
            errors.add_error(
                "Order",
                DataErrorKind::DuplicateValue,
                format!("Duplicate order {}", values.order),
            );
        }

        if item.id() != values.class.class_id() {
            errors.add_error(
                "Class",
                DataErrorKind::InvalidValue,
                format!("Id {} does not match class {:?}", item.id(), values.class),
            );
        }
    }

    fn apply_changes(&mut self, other: &Self) -> bool {
        if self.class != other.class {
            return false;
        }
        self.name.clone_from(&other.name);
        self.description.clone_from(&other.description);
        self.order = other.order;
        self.enabled = other.enabled;
        true
    }
}

impl<E: StaticClass> DataList<StaticValues<E>> {
    pub fn find_item_by_class(&self, class: E) -> Option<&DataItem<StaticValues<E>>> {
        self.live_items().find(|item| item.values().class == class)
    }

    pub fn find_item_by_name(&self, name: &str) -> Option<&DataItem<StaticValues<E>>> {
        self.live_items().find(|item| item.values().name == name)
    }

    pub fn count_instances_of_name(&self, name: &str) -> usize {
        self.live_items()
            .filter(|item| item.values().name == name)
            .count()
    }

    pub fn count_instances_of_order(&self, order: i32) -> usize {
        self.live_items()
            .filter(|item| item.values().order == order)
            .count()
    }

    /// Add the default item for a class, keyed by the class id
    pub fn add_basic_item(&mut self, class: E) -> MoneyWiseResult<u32> {
        self.add_values_item(class.class_id(), StaticValues::from_class(class))
    }

    /// Add default items for every class not yet present
    pub fn populate_defaults(&mut self) -> MoneyWiseResult<usize> {
        let mut added = 0;
        for &class in E::all() {
            if self.is_id_unique(class.class_id()) {
                self.add_basic_item(class)?;
                added += 1;
            }
        }
        self.sort();
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{EditState, ListStyle};
    use crate::models::CurrencyClass;

    type Currencies = DataList<StaticValues<CurrencyClass>>;

    fn populated() -> Currencies {
        let mut list = Currencies::new(ListStyle::Core);
        list.populate_defaults().unwrap();
        list
    }

    #[test]
    fn test_populate_defaults_is_valid() {
        let mut list = populated();
        assert_eq!(list.len(), CurrencyClass::all().len());
        assert_eq!(list.validate(), EditState::Clean);
        assert_eq!(list.populate_defaults().unwrap(), 0);
    }

    #[test]
    fn test_parse_class_names() {
        assert_eq!(CurrencyClass::parse("usd"), Some(CurrencyClass::Usd));
        assert_eq!(CurrencyClass::parse("doubloon"), None);
    }

    #[test]
    fn test_find_by_class_and_name() {
        let list = populated();
        let item = list.find_item_by_class(CurrencyClass::Usd).unwrap();
        assert_eq!(item.id(), CurrencyClass::Usd.class_id());
        assert_eq!(
            list.find_item_by_name(CurrencyClass::Usd.name()).unwrap().id(),
            item.id()
        );
        assert!(list.find_item_by_name("Doubloon").is_none());
    }

    #[test]
    fn test_duplicate_name_and_order_flag_both_items() {
        let mut list = populated();
        let gbp = CurrencyClass::Gbp.class_id();
        let usd = CurrencyClass::Usd.class_id();
        let usd_values = list.item(usd).unwrap().values().clone();

        list.push_history(gbp).unwrap();
        let item = list.item_mut(gbp).unwrap();
        item.values_mut().name = usd_values.name.clone();
        item.values_mut().order = usd_values.order;

        assert_eq!(list.validate(), EditState::Error);
        for id in [gbp, usd] {
            let errors = list.item(id).unwrap().errors();
            assert_eq!(errors.field_error_kind("Name"), Some(DataErrorKind::DuplicateValue));
            assert_eq!(errors.field_error_kind("Order"), Some(DataErrorKind::DuplicateValue));
        }
    }

    #[test]
    fn test_field_rules() {
        let mut list = populated();
        let id = CurrencyClass::Eur.class_id();
        list.push_history(id).unwrap();
        let item = list.item_mut(id).unwrap();
        item.values_mut().name = "x".repeat(NAME_LEN + 1);
        item.values_mut().description = Some("y".repeat(DESC_LEN + 1));
        item.values_mut().order = -1;

        list.validate();
        let errors = list.item(id).unwrap().errors();
        assert_eq!(errors.field_error_kind("Name"), Some(DataErrorKind::LengthExceeded));
        assert_eq!(
            errors.field_error_kind("Description"),
            Some(DataErrorKind::LengthExceeded)
        );
        assert_eq!(errors.field_error_kind("Order"), Some(DataErrorKind::InvalidValue));

        list.push_history(id).unwrap();
        list.item_mut(id).unwrap().values_mut().name.clear();
        list.validate();
        let errors = list.item(id).unwrap().errors();
        assert_eq!(errors.field_error_kind("Name"), Some(DataErrorKind::Missing));
    }

    #[test]
    fn test_deleted_items_do_not_count() {
        let mut list = populated();
        let gbp = CurrencyClass::Gbp.class_id();
        let name = list.item(gbp).unwrap().values().name.clone();
        list.delete_item(gbp).unwrap();
        assert_eq!(list.count_instances_of_name(&name), 0);
        assert!(list.find_item_by_class(CurrencyClass::Gbp).is_none());
    }
}
