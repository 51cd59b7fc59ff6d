//! Filter expression tree.
//!
//! The parser produces these nodes once per input string and never mutates
//! them afterwards. They own their children outright (no cycles, no shared
//! nodes), so a parsed [`Filter`] is `Send + Sync` and can be read by any
//! number of builders at once.
//!
//! ```text
//! Filter      := OrExpr
//! OrExpr      := AndExpr ( "||" AndExpr )*
//! AndExpr     := Comparison ( "&&" Comparison )*
//! Comparison  := Primary ( Operator (Value | NullSuffix) )?
//! Primary     := Identifier | "(" OrExpr ")"
//! ```

use std::fmt;

/// Root of a parsed filter.
///
/// `expression` is `None` only for hand-built trees; [`parse_filter`]
/// signals "no filter" by returning `Ok(None)` instead.
///
/// [`parse_filter`]: crate::parse_filter
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Top-level OR group.
    pub expression: Option<OrExpr>,
}

impl Filter {
    /// Wrap an OR group as a filter root.
    #[must_use]
    pub const fn new(expression: OrExpr) -> Self {
        Self {
            expression: Some(expression),
        }
    }
}

/// OR-joined sequence of AND groups (lowest precedence).
#[derive(Debug, Clone, PartialEq)]
pub struct OrExpr {
    /// AND groups, in source order.
    pub and: Vec<AndExpr>,
}

impl OrExpr {
    /// Create an OR group.
    #[must_use]
    pub const fn new(and: Vec<AndExpr>) -> Self {
        Self { and }
    }
}

/// AND-joined sequence of comparisons.
#[derive(Debug, Clone, PartialEq)]
pub struct AndExpr {
    /// Comparisons, in source order.
    pub comparisons: Vec<Comparison>,
}

impl AndExpr {
    /// Create an AND group.
    #[must_use]
    pub const fn new(comparisons: Vec<Comparison>) -> Self {
        Self { comparisons }
    }
}

/// Left side of a comparison: a field name or a parenthesized group.
#[derive(Debug, Clone, PartialEq)]
pub enum Primary {
    /// Bare identifier.
    Field(String),
    /// `( OrExpr )`.
    SubExpr(Box<OrExpr>),
}

/// Right side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `<op> <value>`.
    Compare {
        /// Comparison operator.
        op: Operator,
        /// Right operand.
        value: Value,
    },
    /// `IS NULL` / `IS NOT NULL`.
    Null(NullCheck),
}

/// Leaf predicate.
///
/// `predicate` is `None` for a bare parenthesized group such as `(a=1 || b=2)`
/// and for a bare identifier, which renders to nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// Field or sub-expression.
    pub left: Primary,
    /// Operator and operand, or a null check.
    pub predicate: Option<Predicate>,
}

impl Comparison {
    /// `<field> <op> <value>`.
    pub fn compare(field: impl Into<String>, op: Operator, value: Value) -> Self {
        Self {
            left: Primary::Field(field.into()),
            predicate: Some(Predicate::Compare { op, value }),
        }
    }

    /// `<field> IS [NOT] NULL`.
    pub fn null_check(field: impl Into<String>, check: NullCheck) -> Self {
        Self {
            left: Primary::Field(field.into()),
            predicate: Some(Predicate::Null(check)),
        }
    }

    /// `( <expr> )`.
    #[must_use]
    pub fn group(expr: OrExpr) -> Self {
        Self {
            left: Primary::SubExpr(Box::new(expr)),
            predicate: None,
        }
    }

    /// The field name, if the left side is not a sub-expression.
    pub fn field(&self) -> Option<&str> {
        match &self.left {
            Primary::Field(f) => Some(f),
            Primary::SubExpr(_) => None,
        }
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `=`
    Equal,
    /// `!=` (also spelled `<>`)
    NotEqual,
    /// `>=`
    GreaterOrEqual,
    /// `<=`
    LessOrEqual,
    /// `>`
    Greater,
    /// `<`
    Less,
    /// `LIKE`
    Like,
    /// `ILIKE`
    ILike,
    /// `NOT LIKE`
    NotLike,
    /// `IN`
    In,
    /// `NOT IN`
    NotIn,
    /// `IS`
    Is,
}

impl Operator {
    /// Canonical SQL text, independent of how the input spelled it.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::GreaterOrEqual => ">=",
            Self::LessOrEqual => "<=",
            Self::Greater => ">",
            Self::Less => "<",
            Self::Like => "LIKE",
            Self::ILike => "ILIKE",
            Self::NotLike => "NOT LIKE",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::Is => "IS",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Null test after `IS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NullCheck {
    /// `IS NULL`
    IsNull,
    /// `IS NOT NULL`
    IsNotNull,
}

impl NullCheck {
    /// SQL suffix appended after the field name.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
        }
    }
}

/// Literal operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Quoted string, including its surrounding quote characters.
    String(String),
    /// Signed integer literal.
    Int(i64),
    /// Signed decimal literal.
    Float(f64),
    /// `true`/`TRUE`/`false`/`FALSE`.
    Boolean(bool),
    /// `( v, v, ... )`, never empty when parsed.
    Array(Vec<Value>),
}

impl Value {
    /// String contents with one leading and one trailing quote removed.
    ///
    /// Returns `None` for non-string variants. Text that is not wrapped in
    /// quotes (hand-built trees) is returned unchanged.
    pub fn unquoted(&self) -> Option<&str> {
        let Self::String(raw) = self else {
            return None;
        };
        let is_quoted = raw.len() >= 2 && (raw.starts_with('\'') || raw.starts_with('"'));
        if is_quoted {
            Some(raw.get(1..raw.len() - 1).unwrap_or(raw))
        } else {
            Some(raw)
        }
    }
}

/// Visit every field name referenced by `expr`, depth first, in source order.
///
/// Stops at the first error returned by `visit`. Both the schema checks and
/// the validator walk the tree through this function, so their coverage
/// always matches what the SQL renderer touches.
pub fn walk_fields<E>(
    expr: &OrExpr,
    visit: &mut impl FnMut(&str) -> Result<(), E>,
) -> Result<(), E> {
    for and in &expr.and {
        for comparison in &and.comparisons {
            match &comparison.left {
                Primary::Field(field) => visit(field.trim())?,
                Primary::SubExpr(sub) => walk_fields(sub, visit)?,
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_canonical_text() {
        assert_eq!(Operator::NotEqual.as_sql(), "!=");
        assert_eq!(Operator::NotLike.to_string(), "NOT LIKE");
        assert_eq!(Operator::NotIn.to_string(), "NOT IN");
        assert_eq!(Operator::ILike.as_sql(), "ILIKE");
    }

    #[test]
    fn test_null_check_text() {
        assert_eq!(NullCheck::IsNull.as_sql(), "IS NULL");
        assert_eq!(NullCheck::IsNotNull.as_sql(), "IS NOT NULL");
    }

    #[test]
    fn test_unquoted_strips_one_pair() {
        assert_eq!(Value::String("'abc'".into()).unquoted(), Some("abc"));
        assert_eq!(Value::String("\"abc\"".into()).unquoted(), Some("abc"));
        assert_eq!(Value::String("''".into()).unquoted(), Some(""));
        assert_eq!(Value::String("'%a'b%'".into()).unquoted(), Some("%a'b%"));
    }

    #[test]
    fn test_unquoted_leaves_bare_text() {
        assert_eq!(Value::String("abc".into()).unquoted(), Some("abc"));
        assert_eq!(Value::String("'".into()).unquoted(), Some("'"));
        assert_eq!(Value::Int(1).unquoted(), None);
    }

    #[test]
    fn test_comparison_field() {
        let cmp = Comparison::compare("age", Operator::Greater, Value::Int(18));
        assert_eq!(cmp.field(), Some("age"));

        let group = Comparison::group(OrExpr::new(vec![]));
        assert_eq!(group.field(), None);
    }

    #[test]
    fn test_walk_fields_visits_nested_in_order() {
        let inner = OrExpr::new(vec![
            AndExpr::new(vec![Comparison::compare("b", Operator::Equal, Value::Int(1))]),
            AndExpr::new(vec![Comparison::null_check("c", NullCheck::IsNull)]),
        ]);
        let expr = OrExpr::new(vec![AndExpr::new(vec![
            Comparison::compare("a", Operator::Equal, Value::Int(1)),
            Comparison::group(inner),
            Comparison::compare("d", Operator::Less, Value::Float(2.5)),
        ])]);

        let mut seen = Vec::new();
        let result: Result<(), ()> = walk_fields(&expr, &mut |f| {
            seen.push(f.to_string());
            Ok(())
        });
        assert!(result.is_ok());
        assert_eq!(seen, ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_walk_fields_stops_at_first_error() {
        let expr = OrExpr::new(vec![AndExpr::new(vec![
            Comparison::compare("ok", Operator::Equal, Value::Int(1)),
            Comparison::compare("bad", Operator::Equal, Value::Int(2)),
            Comparison::compare("never", Operator::Equal, Value::Int(3)),
        ])]);

        let mut seen = Vec::new();
        let result = walk_fields(&expr, &mut |f| {
            seen.push(f.to_string());
            if f == "bad" { Err(f.to_string()) } else { Ok(()) }
        });
        assert_eq!(result, Err("bad".to_string()));
        assert_eq!(seen, ["ok", "bad"]);
    }
}
