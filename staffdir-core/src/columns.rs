//! Dynamic-column vocabulary: identifier validation and the protected set.
//!
//! Every identifier that ends up inside DDL or a dynamically-built statement
//! must pass [`validate_column_name`] first. The pattern is deliberately
//! narrow (`[a-z_][a-z0-9_]*`) so a validated name can be interpolated into
//! SQL, quoted, without any escaping concerns.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::DomainError;

/// The physical table holding employee records.
pub const RECORD_TABLE: &str = "employees";

/// Columns that are always present and never managed through the registry:
/// the primary identifier, the person's full name, and the two bookkeeping
/// timestamps. They cannot be added, dropped, or reconfigured.
pub const PROTECTED_COLUMNS: [&str; 4] = ["id", "full_name", "created_at", "updated_at"];

/// Sort order assigned to physical columns that have no metadata row yet.
pub const DEFAULT_SORT_ORDER: i32 = 999;

static COLUMN_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("column name regex is valid"));

/// A column identifier that has passed validation.
///
/// Construction goes through [`ColumnName::new`], so holding one is proof the
/// identifier is safe to quote into a statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnName(String);

impl ColumnName {
    /// Validate and wrap a column identifier.
    pub fn new(name: &str) -> Result<Self, DomainError> {
        validate_column_name(name)?;
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identifier wrapped in double quotes for statement interpolation.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }

    pub fn is_protected(&self) -> bool {
        is_protected_column(&self.0)
    }
}

impl std::fmt::Display for ColumnName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ColumnName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Check whether a column identifier matches `^[a-z_][a-z0-9_]*$`.
pub fn validate_column_name(name: &str) -> Result<(), DomainError> {
    if name.is_empty() {
        return Err(DomainError::InvalidValue {
            field: "column_name".to_string(),
            reason: "column name must not be empty".to_string(),
        });
    }
    if !COLUMN_NAME_RE.is_match(name) {
        return Err(DomainError::InvalidValue {
            field: "column_name".to_string(),
            reason: "must be lowercase letters, digits, underscore, starting with \
                     letter/underscore"
                .to_string(),
        });
    }
    Ok(())
}

/// Check whether a name belongs to the protected, always-present set.
pub fn is_protected_column(name: &str) -> bool {
    PROTECTED_COLUMNS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_column_names() {
        for name in ["department", "office_number", "_internal", "x", "a1_b2"] {
            assert!(validate_column_name(name).is_ok(), "{} should be valid", name);
        }
    }

    #[test]
    fn test_invalid_column_names() {
        for name in [
            "",
            "Department",
            "1st_floor",
            "office number",
            "office-number",
            "naïve",
            "drop table; --",
            "имя",
        ] {
            assert!(validate_column_name(name).is_err(), "{:?} should be rejected", name);
        }
    }

    #[test]
    fn test_protected_set() {
        for name in PROTECTED_COLUMNS {
            assert!(is_protected_column(name));
        }
        assert!(!is_protected_column("department"));
    }

    #[test]
    fn test_column_name_quoting() {
        let name = ColumnName::new("office_number").unwrap();
        assert_eq!(name.quoted(), "\"office_number\"");
        assert_eq!(name.as_str(), "office_number");
        assert!(!name.is_protected());
        assert!(ColumnName::new("id").unwrap().is_protected());
    }
}
