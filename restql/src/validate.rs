//! Whitelist and pagination-ceiling validation.
//!
//! Validation runs as a separate pass over a [`QueryBuilder`]'s state before
//! any SQL is emitted. The first violation fails the whole build: no SQL and
//! no partial parameter list are produced.
//!
//! # Example
//!
//! ```
//! use restql::{QueryBuilder, ValidationConfig, ValidationError, parse_filter};
//!
//! let config = ValidationConfig::new()
//!     .allow_fields(["id", "name", "price"])
//!     .max_limit(100);
//!
//! let filter = parse_filter("price > 10 && secret = 'x'").unwrap().unwrap();
//! let builder = QueryBuilder::new("products").filter(filter).limit(20);
//!
//! let err = builder.validate(&config).build().unwrap_err();
//! assert!(matches!(err, ValidationError::FieldNotAllowed { ref field, .. } if field == "secret"));
//! ```

use std::collections::BTreeSet;

use miniserde::Deserialize;

use crate::ast::{Filter, walk_fields};
use crate::builder::{QueryBuilder, QueryResult};
use crate::error::{Error, ValidationError};

/// Validation rules.
///
/// An empty `allowed_fields` set disables field checks. `None` ceilings
/// disable the corresponding limit/offset check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationConfig {
    /// Fields permitted in SELECT, WHERE and ORDER BY.
    pub allowed_fields: BTreeSet<String>,
    /// Largest accepted limit.
    pub max_limit: Option<i64>,
    /// Largest accepted offset.
    pub max_offset: Option<i64>,
}

/// On-disk shape of [`ValidationConfig`]; every key is optional.
#[derive(Deserialize)]
struct RawValidationConfig {
    allowed_fields: Option<Vec<String>>,
    max_limit: Option<i64>,
    max_offset: Option<i64>,
}

impl ValidationConfig {
    /// No whitelist and no ceilings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
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

    /// Set the maximum accepted limit.
    #[must_use]
    pub fn max_limit(mut self, max: i64) -> Self {
        self.max_limit = Some(max);
        self
    }

    /// Set the maximum accepted offset.
    #[must_use]
    pub fn max_offset(mut self, max: i64) -> Self {
        self.max_offset = Some(max);
        self
    }

    /// Load rules from a JSON document.
    ///
    /// ```
    /// use restql::ValidationConfig;
    ///
    /// let config = ValidationConfig::from_json(
    ///     r#"{"allowed_fields": ["id", "name"], "max_limit": 100}"#,
    /// ).unwrap();
    /// assert!(config.is_field_allowed("name"));
    /// assert_eq!(config.max_limit, Some(100));
    /// assert_eq!(config.max_offset, None);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let raw: RawValidationConfig = miniserde::json::from_str(json).map_err(|_| {
            Error::Config(
                "expected an object with optional allowed_fields, max_limit, max_offset".into(),
            )
        })?;
        Ok(Self {
            allowed_fields: raw.allowed_fields.unwrap_or_default().into_iter().collect(),
            max_limit: raw.max_limit,
            max_offset: raw.max_offset,
        })
    }

    /// Whether `field` passes the whitelist. Everything passes an empty whitelist.
    pub fn is_field_allowed(&self, field: &str) -> bool {
        self.allowed_fields.is_empty() || self.allowed_fields.contains(field)
    }

    fn check_field(&self, field: &str) -> Result<(), ValidationError> {
        if self.is_field_allowed(field) {
            Ok(())
        } else {
            Err(ValidationError::FieldNotAllowed {
                field: field.to_string(),
                allowed: self.allowed_fields.iter().cloned().collect(),
            })
        }
    }

    /// Check every field referenced by a filter, recursing into groups.
    pub fn validate_filter(&self, filter: &Filter) -> Result<(), ValidationError> {
        match &filter.expression {
            Some(expr) if !self.allowed_fields.is_empty() => {
                walk_fields(expr, &mut |field| self.check_field(field))
            },
            _ => Ok(()),
        }
    }

    /// Check limit and offset against the configured ceilings.
    pub fn validate_limit_offset(&self, limit: i64, offset: i64) -> Result<(), ValidationError> {
        if let Some(max) = self.max_limit
            && limit > max
        {
            return Err(ValidationError::LimitExceeded { limit, max });
        }
        if let Some(max) = self.max_offset
            && offset > max
        {
            return Err(ValidationError::OffsetExceeded { offset, max });
        }
        Ok(())
    }
}

/// A builder paired with the rules it must satisfy.
#[derive(Debug, Clone)]
pub struct Validator<'a> {
    builder: &'a QueryBuilder,
    config: &'a ValidationConfig,
}

impl QueryBuilder {
    /// Pair this builder with validation rules.
    pub const fn validate<'a>(&'a self, config: &'a ValidationConfig) -> Validator<'a> {
        Validator {
            builder: self,
            config,
        }
    }
}

impl Validator<'_> {
    /// Run every check: select fields, filter fields, sort fields, then
    /// limit and offset. Returns the first violation.
    pub fn check(&self) -> Result<(), ValidationError> {
        let qb = self.builder;

        for field in &qb.fields {
            self.config.check_field(field)?;
        }
        if let Some(filter) = &qb.filter {
            self.config.validate_filter(filter)?;
        }
        for sort in &qb.sorts {
            self.config.check_field(&sort.field)?;
        }
        self.config.validate_limit_offset(qb.limit, qb.offset)
    }

    /// Validate, then build the full SELECT.
    pub fn build(&self) -> Result<QueryResult, ValidationError> {
        self.check()?;
        Ok(self.builder.build())
    }

    /// Validate, then build only the WHERE condition.
    pub fn where_only(&self) -> Result<QueryResult, ValidationError> {
        self.check()?;
        Ok(self.builder.where_only())
    }
}
