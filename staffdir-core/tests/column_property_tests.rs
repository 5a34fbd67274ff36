//! Property-based tests for the dynamic-column vocabulary.
//!
//! The identifier rules are the crate's main injection defense, so they get
//! adversarial coverage: anything the validator accepts must be safe to
//! quote into a statement, and anything outside the pattern must be
//! rejected no matter how it was constructed.

use proptest::prelude::*;
use staffdir_core::{
    is_protected_column, validate_column_name, ColumnName, DataType, FieldValue, Record,
    PROTECTED_COLUMNS,
};

// ============================================================================
// IDENTIFIER VALIDATION
// ============================================================================

proptest! {
    /// Names drawn from the legal pattern always validate.
    #[test]
    fn valid_pattern_always_accepted(name in "[a-z_][a-z0-9_]{0,30}") {
        prop_assert!(validate_column_name(&name).is_ok());
        let column = ColumnName::new(&name).unwrap();
        prop_assert_eq!(column.as_str(), name.as_str());
    }

    /// A validated name quotes to exactly the name wrapped in double quotes,
    /// with no escaping ever needed.
    #[test]
    fn quoting_is_plain_wrapping(name in "[a-z_][a-z0-9_]{0,30}") {
        let column = ColumnName::new(&name).unwrap();
        prop_assert_eq!(column.quoted(), format!("\"{}\"", name));
        prop_assert!(!column.quoted().contains("\"\""));
    }

    /// Any string containing a character outside the legal set is rejected.
    #[test]
    fn foreign_characters_rejected(
        prefix in "[a-z_][a-z0-9_]{0,10}",
        bad in "[^a-z0-9_]",
        suffix in "[a-z0-9_]{0,10}",
    ) {
        let name = format!("{}{}{}", prefix, bad, suffix);
        prop_assert!(validate_column_name(&name).is_err(), "{:?} slipped through", name);
    }

    /// Names starting with a digit are rejected even when the rest is legal.
    #[test]
    fn leading_digit_rejected(digit in "[0-9]", rest in "[a-z0-9_]{0,20}") {
        let name = format!("{}{}", digit, rest);
        prop_assert!(validate_column_name(&name).is_err(), "{:?} slipped through", name);
    }
}

#[test]
fn protected_columns_are_themselves_valid_names() {
    // The protected set must pass validation so it can appear in statements
    for name in PROTECTED_COLUMNS {
        assert!(validate_column_name(name).is_ok());
        assert!(is_protected_column(name));
    }
}

// ============================================================================
// VALUE COERCION
// ============================================================================

proptest! {
    /// Integer columns accept both JSON numbers and their decimal string
    /// form, producing the same value.
    #[test]
    fn integer_coercion_number_string_agree(n in any::<i64>()) {
        let from_number =
            FieldValue::from_json(DataType::Integer, &serde_json::json!(n)).unwrap();
        let from_string =
            FieldValue::from_json(DataType::Integer, &serde_json::json!(n.to_string())).unwrap();
        prop_assert_eq!(from_number, FieldValue::Int(n));
        prop_assert_eq!(from_string, FieldValue::Int(n));
    }

    /// Whitespace-only strings in numeric columns always mean "cleared".
    #[test]
    fn blank_strings_clear_numeric_columns(blank in "[ \\t]{0,5}") {
        let value = serde_json::json!(blank);
        prop_assert_eq!(
            FieldValue::from_json(DataType::Integer, &value).unwrap(),
            FieldValue::Null
        );
        prop_assert_eq!(
            FieldValue::from_json(DataType::Decimal, &value).unwrap(),
            FieldValue::Null
        );
    }

    /// Text columns never reject scalar input.
    #[test]
    fn text_columns_accept_any_scalar(s in ".{0,40}") {
        let value = serde_json::json!(s);
        let coerced = FieldValue::from_json(DataType::ShortText, &value).unwrap();
        prop_assert_eq!(coerced, FieldValue::Text(s));
    }
}

// ============================================================================
// RECORD SHAPE
// ============================================================================

proptest! {
    /// A record serializes its fields in insertion order, regardless of the
    /// names involved.
    #[test]
    fn record_serialization_preserves_order(names in proptest::collection::vec("[a-z_][a-z0-9_]{0,10}", 1..8)) {
        let mut unique = names;
        unique.sort();
        unique.dedup();

        let mut record = Record::new();
        for (i, name) in unique.iter().enumerate() {
            record.push(name.clone(), FieldValue::Int(i as i64));
        }

        let json = serde_json::to_string(&record).unwrap();
        let mut last = 0;
        for name in &unique {
            let pos = json.find(&format!("\"{}\"", name)).unwrap();
            prop_assert!(pos >= last, "field {} out of order", name);
            last = pos;
        }
    }
}
