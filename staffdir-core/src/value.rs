//! Tagged field values and the open-shaped record type.
//!
//! Employee records have no fixed struct: the legal key set is whatever the
//! column registry says it is. Instead of threading `serde_json::Value`
//! everywhere, values are carried as a small tagged enum and records as an
//! ordered field list that serializes to a JSON object in column order.

use chrono::{DateTime, NaiveDate, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::enums::DataType;
use crate::error::DomainError;

// ============================================================================
// FIELD VALUE
// ============================================================================

/// One cell of an employee record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Coerce a JSON value supplied by a caller into the declared column
    /// type. Strings are parsed for date/timestamp columns; anything that
    /// does not fit the declared type is rejected.
    pub fn from_json(declared: DataType, value: &serde_json::Value) -> Result<Self, DomainError> {
        use serde_json::Value as J;

        if value.is_null() {
            return Ok(FieldValue::Null);
        }

        let mismatch = |field: &str, reason: &str| DomainError::InvalidValue {
            field: field.to_string(),
            reason: reason.to_string(),
        };

        match declared {
            DataType::ShortText | DataType::LongText => match value {
                J::String(s) => Ok(FieldValue::Text(s.clone())),
                // Tolerate scalar input in text columns the way a form would
                J::Number(n) => Ok(FieldValue::Text(n.to_string())),
                J::Bool(b) => Ok(FieldValue::Text(b.to_string())),
                _ => Err(mismatch("value", "expected a string")),
            },
            DataType::Integer => match value {
                J::Number(n) => n
                    .as_i64()
                    .map(FieldValue::Int)
                    .ok_or_else(|| mismatch("value", "expected an integer")),
                J::String(s) if s.trim().is_empty() => Ok(FieldValue::Null),
                J::String(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(FieldValue::Int)
                    .map_err(|_| mismatch("value", "expected an integer")),
                _ => Err(mismatch("value", "expected an integer")),
            },
            DataType::Decimal => match value {
                J::Number(n) => n
                    .as_f64()
                    .map(FieldValue::Float)
                    .ok_or_else(|| mismatch("value", "expected a number")),
                J::String(s) if s.trim().is_empty() => Ok(FieldValue::Null),
                J::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .map(FieldValue::Float)
                    .map_err(|_| mismatch("value", "expected a number")),
                _ => Err(mismatch("value", "expected a number")),
            },
            DataType::Date => match value {
                J::String(s) if s.trim().is_empty() => Ok(FieldValue::Null),
                J::String(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                    .map(FieldValue::Date)
                    .map_err(|_| mismatch("value", "expected a date (YYYY-MM-DD)")),
                _ => Err(mismatch("value", "expected a date string")),
            },
            DataType::Timestamp => match value {
                J::String(s) if s.trim().is_empty() => Ok(FieldValue::Null),
                J::String(s) => DateTime::parse_from_rfc3339(s.trim())
                    .map(|dt| FieldValue::Timestamp(dt.with_timezone(&Utc)))
                    .map_err(|_| mismatch("value", "expected an RFC 3339 timestamp")),
                _ => Err(mismatch("value", "expected a timestamp string")),
            },
            DataType::Boolean => match value {
                J::Bool(b) => Ok(FieldValue::Bool(*b)),
                J::String(s) => match s.as_str() {
                    "true" => Ok(FieldValue::Bool(true)),
                    "false" => Ok(FieldValue::Bool(false)),
                    _ => Err(mismatch("value", "expected a boolean")),
                },
                _ => Err(mismatch("value", "expected a boolean")),
            },
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Null => serializer.serialize_none(),
            FieldValue::Bool(b) => serializer.serialize_bool(*b),
            FieldValue::Int(i) => serializer.serialize_i64(*i),
            FieldValue::Float(f) => serializer.serialize_f64(*f),
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::Date(d) => serializer.serialize_str(&d.format("%Y-%m-%d").to_string()),
            FieldValue::Timestamp(ts) => serializer.serialize_str(&ts.to_rfc3339()),
        }
    }
}

// ============================================================================
// RECORD
// ============================================================================

/// One employee record: an ordered mapping from column name to value.
///
/// Field order follows the physical column order of the row the record was
/// built from, so JSON output is stable across requests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.push((name.into(), value));
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Drop every field whose name fails the predicate. Used for the
    /// admin-only read filter.
    pub fn retain<F: FnMut(&str) -> bool>(&mut self, mut keep: F) {
        self.fields.retain(|(n, _)| keep(n));
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// The record's primary identifier, when present.
    pub fn id(&self) -> Option<i64> {
        match self.get("id") {
            Some(FieldValue::Int(id)) => Some(*id),
            _ => None,
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(feature = "openapi")]
impl utoipa::PartialSchema for Record {
    fn schema() -> utoipa::openapi::RefOr<utoipa::openapi::schema::Schema> {
        utoipa::openapi::ObjectBuilder::new()
            .description(Some("Employee record keyed by column name"))
            .into()
    }
}

#[cfg(feature = "openapi")]
impl utoipa::ToSchema for Record {
    fn name() -> std::borrow::Cow<'static, str> {
        std::borrow::Cow::Borrowed("Record")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_respects_declared_type() {
        assert_eq!(
            FieldValue::from_json(DataType::ShortText, &json!("hello")).unwrap(),
            FieldValue::Text("hello".to_string())
        );
        assert_eq!(
            FieldValue::from_json(DataType::Integer, &json!(42)).unwrap(),
            FieldValue::Int(42)
        );
        assert_eq!(
            FieldValue::from_json(DataType::Integer, &json!("17")).unwrap(),
            FieldValue::Int(17)
        );
        assert_eq!(
            FieldValue::from_json(DataType::Boolean, &json!(true)).unwrap(),
            FieldValue::Bool(true)
        );
        assert!(FieldValue::from_json(DataType::Integer, &json!("abc")).is_err());
        assert!(FieldValue::from_json(DataType::Date, &json!("not-a-date")).is_err());
    }

    #[test]
    fn test_null_and_blank_handling() {
        assert_eq!(
            FieldValue::from_json(DataType::Integer, &serde_json::Value::Null).unwrap(),
            FieldValue::Null
        );
        // Blank strings in numeric columns mean "cleared" when a form submits them
        assert_eq!(
            FieldValue::from_json(DataType::Decimal, &json!("")).unwrap(),
            FieldValue::Null
        );
    }

    #[test]
    fn test_date_parsing() {
        assert_eq!(
            FieldValue::from_json(DataType::Date, &json!("2024-03-01")).unwrap(),
            FieldValue::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
    }

    #[test]
    fn test_record_preserves_order() {
        let mut record = Record::new();
        record.push("id", FieldValue::Int(1));
        record.push("full_name", FieldValue::Text("Jane Doe".to_string()));
        record.push("department", FieldValue::Null);

        let json = serde_json::to_string(&record).unwrap();
        let id_pos = json.find("\"id\"").unwrap();
        let name_pos = json.find("\"full_name\"").unwrap();
        let dept_pos = json.find("\"department\"").unwrap();
        assert!(id_pos < name_pos && name_pos < dept_pos);
        assert!(json.contains("\"department\":null"));
    }

    #[test]
    fn test_record_retain() {
        let mut record = Record::new();
        record.push("full_name", FieldValue::Text("Jane".to_string()));
        record.push("salary", FieldValue::Int(1000));
        record.retain(|name| name != "salary");

        assert_eq!(record.len(), 1);
        assert!(record.get("salary").is_none());
        assert!(record.get("full_name").is_some());
    }

    #[test]
    fn test_record_id_helper() {
        let mut record = Record::new();
        record.push("id", FieldValue::Int(7));
        assert_eq!(record.id(), Some(7));
        assert_eq!(Record::new().id(), None);
    }
}
