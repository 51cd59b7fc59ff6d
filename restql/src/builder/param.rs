//! Bound parameter values.

use crate::ast::Value;

/// A scalar bound to one placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    /// Text with its source quotes removed.
    String(String),
    /// Integer.
    Int(i64),
    /// Floating point.
    Float(f64),
    /// Boolean.
    Bool(bool),
}

impl Param {
    /// Convert a scalar literal. Returns `None` for arrays, which expand to
    /// one parameter per element instead.
    pub fn from_scalar(value: &Value) -> Option<Self> {
        match value {
            Value::String(_) => value.unquoted().map(|s| Self::String(s.to_string())),
            Value::Int(v) => Some(Self::Int(*v)),
            Value::Float(v) => Some(Self::Float(*v)),
            Value::Boolean(v) => Some(Self::Bool(*v)),
            Value::Array(_) => None,
        }
    }
}

impl From<i64> for Param {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Param {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Param {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for Param {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Param {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<bool> for Param {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_from_conversions() {
        assert_eq!(Param::from(42i64), Param::Int(42));
        assert_eq!(Param::from(42i32), Param::Int(42));
        assert_eq!(Param::from(1.5f64), Param::Float(1.5));
        assert_eq!(Param::from("hello"), Param::String("hello".into()));
        assert_eq!(Param::from(String::from("world")), Param::String("world".into()));
        assert_eq!(Param::from(true), Param::Bool(true));
    }

    #[test]
    fn test_from_scalar_strips_quotes() {
        assert_eq!(
            Param::from_scalar(&Value::String("'%phone%'".into())),
            Some(Param::String("%phone%".into()))
        );
        assert_eq!(
            Param::from_scalar(&Value::String("\"US\"".into())),
            Some(Param::String("US".into()))
        );
    }

    #[test]
    fn test_from_scalar_keeps_native_types() {
        assert_eq!(Param::from_scalar(&Value::Int(-7)), Some(Param::Int(-7)));
        assert_eq!(Param::from_scalar(&Value::Float(2.5)), Some(Param::Float(2.5)));
        assert_eq!(Param::from_scalar(&Value::Boolean(false)), Some(Param::Bool(false)));
        assert_eq!(Param::from_scalar(&Value::Array(vec![Value::Int(1)])), None);
    }
}
