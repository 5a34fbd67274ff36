//! Request field validation shared across services.
//!
//! Two rules recur everywhere: required text fields must carry something
//! besides whitespace, and a PATCH body must name at least one field. Both
//! live here so every service reports them the same way.

use crate::error::{ApiError, ApiResult};

/// Required text fields: whitespace does not count as a value.
pub trait ValidateNonEmpty {
    /// Fails with a missing-field error naming `field_name` when the value
    /// is absent, empty, or whitespace-only.
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()>;
}

impl ValidateNonEmpty for str {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        if self.trim().is_empty() {
            return Err(ApiError::missing_field(field_name));
        }
        Ok(())
    }
}

impl ValidateNonEmpty for &str {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        (*self).validate_non_empty(field_name)
    }
}

impl ValidateNonEmpty for String {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        self.as_str().validate_non_empty(field_name)
    }
}

impl<T: ValidateNonEmpty> ValidateNonEmpty for Option<T> {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        match self {
            Some(value) => value.validate_non_empty(field_name),
            None => Err(ApiError::missing_field(field_name)),
        }
    }
}

/// Update requests with all-`Option` fields implement this so handlers can
/// bounce a body that names nothing before any SQL is built.
pub trait HasUpdates {
    fn has_any_updates(&self) -> bool;

    fn validate_has_updates(&self) -> ApiResult<()> {
        if !self.has_any_updates() {
            return Err(ApiError::no_updates());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_required_text_rejects_blank() {
        assert!("Jane Doe".validate_non_empty("full_name").is_ok());
        assert!("  j  ".validate_non_empty("username").is_ok());

        let err = "".validate_non_empty("username").unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingField);
        assert!(err.message.contains("username"));

        let err = " \t ".validate_non_empty("display_name").unwrap_err();
        assert!(err.message.contains("display_name"));
    }

    #[test]
    fn test_absent_optional_counts_as_missing() {
        let department: Option<String> = None;
        assert!(department.validate_non_empty("department").is_err());

        assert!(Some("Engineering").validate_non_empty("department").is_ok());
        assert!(Some("   ").validate_non_empty("department").is_err());
    }

    #[test]
    fn test_empty_patch_body_rejected() {
        #[derive(Default)]
        struct Patch {
            display_name: Option<String>,
            sort_order: Option<i32>,
        }
        impl HasUpdates for Patch {
            fn has_any_updates(&self) -> bool {
                self.display_name.is_some() || self.sort_order.is_some()
            }
        }

        let err = Patch::default().validate_has_updates().unwrap_err();
        assert_eq!(err.code, ErrorCode::NoUpdates);

        let patch = Patch {
            sort_order: Some(5),
            ..Default::default()
        };
        assert!(patch.validate_has_updates().is_ok());
    }
}
