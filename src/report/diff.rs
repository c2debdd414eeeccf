//! Human-readable change descriptions
//!
//! Turns the (field, before, after) triples of a changed item into a single
//! line suitable for a table cell.

use crate::data::FieldValue;

const MAX_VALUE_LEN: usize = 40;

/// Describe field changes as `Field: before -> after`, comma separated
///
/// Returns `None` when nothing changed.
pub fn generate_diff(changes: &[(&'static str, FieldValue, FieldValue)]) -> Option<String> {
    if changes.is_empty() {
        return None;
    }
    let parts: Vec<String> = changes
        .iter()
        .map(|(field, before, after)| match (before.is_none(), after.is_none()) {
            (true, false) => format!("{}: (added) -> {}", field, format_value(after)),
            (false, true) => format!("{}: {} -> (removed)", field, format_value(before)),
            _ => format!("{}: {} -> {}", field, format_value(before), format_value(after)),
        })
        .collect();
    Some(parts.join(", "))
}

/// Describe the populated fields of a new item
pub fn describe_values(values: &[(&'static str, FieldValue)]) -> String {
    values
        .iter()
        .filter(|(_, value)| !value.is_none())
        .map(|(field, value)| format!("{}={}", field, format_value(value)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Display a value, truncating long text
fn format_value(value: &FieldValue) -> String {
    let text = value.to_string();
    if text.chars().count() > MAX_VALUE_LEN {
        let head: String = text.chars().take(MAX_VALUE_LEN - 3).collect();
        format!("{}...", head)
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_changes() {
        assert_eq!(generate_diff(&[]), None);
    }

    #[test]
    fn test_changed_added_removed() {
        let changes = vec![
            ("Name", FieldValue::Text("Old".into()), FieldValue::Text("New".into())),
            ("Amount", FieldValue::None, FieldValue::Money(-1050)),
            ("Category", FieldValue::Link(3), FieldValue::None),
        ];
        assert_eq!(
            generate_diff(&changes).unwrap(),
            "Name: \"Old\" -> \"New\", Amount: (added) -> -10.50, Category: #3 -> (removed)"
        );
    }

    #[test]
    fn test_long_values_truncated() {
        let long = "x".repeat(100);
        let diff = generate_diff(&[(
            "Notes",
            FieldValue::Text(long),
            FieldValue::Text("short".into()),
        )])
        .unwrap();
        assert!(diff.contains("..."));
        assert!(diff.len() < 80);
    }

    #[test]
    fn test_describe_values_skips_empty() {
        let values = vec![
            ("Name", FieldValue::Text("Cash".into())),
            ("Notes", FieldValue::None),
            ("Closed", FieldValue::Flag(false)),
        ];
        assert_eq!(describe_values(&values), "Name=\"Cash\", Closed=false");
    }
}
