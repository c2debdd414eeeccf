//! Singleton control record

use serde::{Deserialize, Serialize};

use crate::data::{DataItem, DataList, DataValues, FieldDef, FieldKind, FieldValue, ValidationErrors};
use crate::error::{DataErrorKind, MoneyWiseError, MoneyWiseResult};

/// Format version written into new control records
pub const DATA_VERSION: u32 = 1;

/// Data-set wide control values: format version and the current control key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlData {
    pub data_version: u32,
    pub control_key: u32,
}

impl ControlData {
    pub fn new(control_key: u32) -> Self {
        Self {
            data_version: DATA_VERSION,
            control_key,
        }
    }
}

const CONTROL_DATA_FIELDS: &[FieldDef] = &[
    FieldDef::new("DataVersion", FieldKind::Integer),
    FieldDef::new("ControlKey", FieldKind::Link("ControlKey")),
];

impl DataValues for ControlData {
    const ITEM_TYPE: &'static str = "ControlData";
    const LIST_NAME: &'static str = "ControlData";

    fn fields() -> &'static [FieldDef] {
        CONTROL_DATA_FIELDS
    }

    fn field_value(&self, index: usize) -> FieldValue {
        match index {
            0 => FieldValue::Integer(i64::from(self.data_version)),
            1 => FieldValue::link(self.control_key),
            _ => FieldValue::None,
        }
    }

    fn validate(item: &DataItem<Self>, _list: &DataList<Self>, errors: &mut ValidationErrors) {
        if item.values().control_key == 0 {
            errors.add_error("ControlKey", DataErrorKind::Missing, "Control key is required");
        }
    }
}

impl DataList<ControlData> {
    /// Add the control record read from storage
    ///
    /// At most one live control record may exist.
    pub fn add_open_item(&mut self, id: u32, values: ControlData) -> MoneyWiseResult<u32> {
        if self.live_items().next().is_some() {
            return Err(MoneyWiseError::data(
                DataErrorKind::ControlRecordExists,
                ControlData::ITEM_TYPE,
                "Control record already exists",
            ));
        }
        self.add_values_item(id, values)
    }

    /// The current control record: the newest live one
    pub fn control(&self) -> Option<&DataItem<ControlData>> {
        self.live_items().max_by_key(|item| item.id())
    }
}
