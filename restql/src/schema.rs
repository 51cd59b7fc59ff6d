//! Per-table field whitelist.
//!
//! A [`Schema`] is the strict counterpart of [`ValidationConfig`]: it names
//! the table a request may read and the exact set of columns it may touch.
//! An empty schema allows nothing.
//!
//! ```
//! use restql::{Schema, parse_filter};
//!
//! let schema = Schema::new("users").allow_fields(["id", "name", "email"]);
//!
//! let filter = parse_filter("name LIKE '%ann%' || (id > 10 && password = 'x')")
//!     .unwrap()
//!     .unwrap();
//! let err = schema.validate_filter(&filter).unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     "field 'password' is not allowed. Allowed fields: [email, id, name]"
//! );
//! ```
//!
//! [`ValidationConfig`]: crate::ValidationConfig

use std::collections::BTreeSet;

use crate::ast::{Filter, walk_fields};
use crate::error::ValidationError;

/// Table name plus the columns clients may reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    table: String,
    allowed_fields: BTreeSet<String>,
}

impl Schema {
    /// Schema for `table` with no allowed fields yet.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            allowed_fields: BTreeSet::new(),
        }
    }

    /// Add fields to the whitelist.
    #[must_use]
    pub fn allow_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Whether `field` is whitelisted.
    pub fn is_field_allowed(&self, field: &str) -> bool {
        self.allowed_fields.contains(field)
    }

    /// Whitelisted fields, sorted.
    pub fn allowed_fields(&self) -> Vec<String> {
        self.allowed_fields.iter().cloned().collect()
    }

    fn check_field(&self, field: &str) -> Result<(), ValidationError> {
        if self.is_field_allowed(field) {
            Ok(())
        } else {
            Err(ValidationError::FieldNotAllowed {
                field: field.to_string(),
                allowed: self.allowed_fields(),
            })
        }
    }

    /// Check a SELECT list. Fails on the first field not whitelisted.
    pub fn validate_fields<S: AsRef<str>>(&self, fields: &[S]) -> Result<(), ValidationError> {
        fields.iter().try_for_each(|f| self.check_field(f.as_ref()))
    }

    /// Check every field a filter references, descending into groups.
    pub fn validate_filter(&self, filter: &Filter) -> Result<(), ValidationError> {
        match &filter.expression {
            Some(expr) => walk_fields(expr, &mut |field| self.check_field(field)),
            None => Ok(()),
        }
    }

    /// Check sort entries. A leading `-` is a direction marker, not part of
    /// the field name.
    pub fn validate_sort<S: AsRef<str>>(&self, entries: &[S]) -> Result<(), ValidationError> {
        entries.iter().try_for_each(|entry| {
            let entry = entry.as_ref();
            self.check_field(entry.strip_prefix('-').unwrap_or(entry))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_filter;

    fn users() -> Schema {
        Schema::new("users").allow_fields(["name", "id", "age"])
    }

    fn filter(input: &str) -> Filter {
        parse_filter(input).unwrap().unwrap()
    }

    #[test]
    fn test_table_and_sorted_fields() {
        let schema = users();
        assert_eq!(schema.table(), "users");
        assert_eq!(schema.allowed_fields(), vec!["age", "id", "name"]);
    }

    #[test]
    fn test_empty_schema_allows_nothing() {
        let schema = Schema::new("t");
        assert!(!schema.is_field_allowed("id"));
        assert!(schema.validate_fields(&["id"]).is_err());
        assert!(schema.validate_fields::<&str>(&[]).is_ok());
    }

    #[test]
    fn test_allow_fields_accumulates() {
        let schema = Schema::new("t").allow_fields(["a"]).allow_fields(vec![String::from("b")]);
        assert!(schema.is_field_allowed("a"));
        assert!(schema.is_field_allowed("b"));
        assert!(!schema.is_field_allowed("c"));
    }

    #[test]
    fn test_validate_fields_reports_first_offender() {
        let err = users().validate_fields(&["id", "secret", "other"]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::FieldNotAllowed {
                field: "secret".into(),
                allowed: vec!["age".into(), "id".into(), "name".into()],
            }
        );
    }

    #[test]
    fn test_validate_filter_recurses() {
        let schema = users();
        let nested = filter("(age > 1 || (id = 2)) && name IS NOT NULL");
        assert!(schema.validate_filter(&nested).is_ok());

        match schema.validate_filter(&filter("age > 1 || (id = 2 && (token = 'x'))")) {
            Err(ValidationError::FieldNotAllowed { field, .. }) => assert_eq!(field, "token"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_validate_filter_without_expression() {
        assert!(users().validate_filter(&Filter { expression: None }).is_ok());
    }

    #[test]
    fn test_validate_sort_strips_direction() {
        let schema = users();
        assert!(schema.validate_sort(&["-age", "name"]).is_ok());
        match schema.validate_sort(&["-created_at"]) {
            Err(ValidationError::FieldNotAllowed { field, .. }) => assert_eq!(field, "created_at"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
