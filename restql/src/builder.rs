//! Query builder for SQL generation with parameterization.
//!
//! ```
//! use restql::{QueryBuilder, parse_filter};
//!
//! let filter = parse_filter("price>100").unwrap().unwrap();
//! let result = QueryBuilder::new("products")
//!     .fields(["id", "name", "price"])
//!     .filter(filter)
//!     .build();
//!
//! assert_eq!(result.sql, "SELECT id, name, price FROM products WHERE price > ?");
//! assert_eq!(result.params, vec![restql::Param::Int(100)]);
//! ```

mod param;

pub use param::Param;

use std::sync::Arc;

use crate::ast::{AndExpr, Comparison, Filter, OrExpr, Predicate, Primary, Value};
use crate::placeholder::Placeholder;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    /// `ASC`
    Asc,
    /// `DESC`
    Desc,
}

impl SortDir {
    const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Sort field with direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    /// Column name, without any direction prefix.
    pub field: String,
    /// Direction.
    pub dir: SortDir,
}

impl SortField {
    /// Create a new sort field.
    pub fn new(field: impl Into<String>, dir: SortDir) -> Self {
        Self {
            field: field.into(),
            dir,
        }
    }

    /// Parse one sort entry: `-created_at` sorts descending, `name` ascending.
    #[must_use]
    pub fn parse(entry: &str) -> Self {
        match entry.strip_prefix('-') {
            Some(field) => Self::new(field, SortDir::Desc),
            None => Self::new(entry, SortDir::Asc),
        }
    }
}

/// Query result with SQL string and parameters.
///
/// `params[n]` binds the `n`-th placeholder in `sql`, counting left to right.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "QueryResult must be used to execute the query"]
pub struct QueryResult {
    /// SQL text with placeholders.
    pub sql: String,
    /// Bound arguments in placeholder order.
    pub params: Vec<Param>,
}

// ═══════════════════════════════════════════════════════════════════════════
// FILTER RENDERING
// ═══════════════════════════════════════════════════════════════════════════
//
// Each function takes the index of the next placeholder and returns the SQL
// fragment, the parameters it bound, and the next free index. Threading the
// index through return values keeps rendering free of shared state.

/// Render an OR group.
pub(crate) fn build_or_expr_impl(
    style: Placeholder,
    expr: &OrExpr,
    start_idx: usize,
) -> (String, Vec<Param>, usize) {
    let mut idx = start_idx;
    let mut all_params = Vec::new();
    let mut parts = Vec::with_capacity(expr.and.len());

    for and in &expr.and {
        let (sql, params, new_idx) = build_and_expr_impl(style, and, idx);
        if !sql.is_empty() {
            parts.push(sql);
            all_params.extend(params);
            idx = new_idx;
        }
    }

    (join_group(parts, " OR "), all_params, idx)
}

/// Render an AND group.
fn build_and_expr_impl(
    style: Placeholder,
    expr: &AndExpr,
    start_idx: usize,
) -> (String, Vec<Param>, usize) {
    let mut idx = start_idx;
    let mut all_params = Vec::new();
    let mut parts = Vec::with_capacity(expr.comparisons.len());

    for comparison in &expr.comparisons {
        let (sql, params, new_idx) = build_comparison_impl(style, comparison, idx);
        if !sql.is_empty() {
            parts.push(sql);
            all_params.extend(params);
            idx = new_idx;
        }
    }

    (join_group(parts, " AND "), all_params, idx)
}

/// Zero parts render empty, one part renders bare, more are parenthesized.
fn join_group(mut parts: Vec<String>, separator: &str) -> String {
    match parts.len() {
        0 => String::new(),
        1 => parts.pop().unwrap_or_default(),
        _ => format!("({})", parts.join(separator)),
    }
}

/// Render a single comparison.
fn build_comparison_impl(
    style: Placeholder,
    comparison: &Comparison,
    start_idx: usize,
) -> (String, Vec<Param>, usize) {
    let field = match &comparison.left {
        // The group's own joining supplies any parentheses it needs.
        Primary::SubExpr(sub) => return build_or_expr_impl(style, sub, start_idx),
        Primary::Field(field) if field.is_empty() => return (String::new(), vec![], start_idx),
        Primary::Field(field) => field,
    };

    match &comparison.predicate {
        None => (String::new(), vec![], start_idx),
        Some(Predicate::Null(check)) => (format!("{field} {}", check.as_sql()), vec![], start_idx),
        Some(Predicate::Compare { op, value }) => {
            let (bound, params, idx) = bind_value_impl(style, value, start_idx);
            (format!("{field} {op} {bound}"), params, idx)
        },
    }
}

/// Render the placeholder(s) for a value.
///
/// Scalars bind one placeholder. Arrays render `(p, p, ...)` with one
/// placeholder per element, recursing into nested arrays.
fn bind_value_impl(
    style: Placeholder,
    value: &Value,
    start_idx: usize,
) -> (String, Vec<Param>, usize) {
    let Value::Array(values) = value else {
        let params = Param::from_scalar(value).into_iter().collect();
        return (style.param(start_idx), params, start_idx + 1);
    };

    let mut idx = start_idx;
    let mut all_params = Vec::with_capacity(values.len());
    let mut placeholders = Vec::with_capacity(values.len());
    for v in values {
        let (sql, params, new_idx) = bind_value_impl(style, v, idx);
        placeholders.push(sql);
        all_params.extend(params);
        idx = new_idx;
    }
    (format!("({})", placeholders.join(", ")), all_params, idx)
}

// ═══════════════════════════════════════════════════════════════════════════
// SELECT BUILDER
// ═══════════════════════════════════════════════════════════════════════════

/// SQL SELECT builder.
///
/// Setters consume and return the builder. [`build`](Self::build) and
/// [`where_only`](Self::where_only) only read it, so calling them repeatedly
/// yields identical output and a shared builder can render from many threads.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    pub(crate) table: String,
    pub(crate) fields: Vec<String>,
    pub(crate) filter: Option<Arc<Filter>>,
    pub(crate) sorts: Vec<SortField>,
    pub(crate) limit: i64,
    pub(crate) offset: i64,
    placeholder: Placeholder,
}

impl QueryBuilder {
    /// Create a new query builder for the given table.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            fields: Vec::new(),
            filter: None,
            sorts: Vec::new(),
            limit: 0,
            offset: 0,
            placeholder: Placeholder::default(),
        }
    }

    /// The table this builder selects from.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Set the fields to SELECT. An empty list selects `*`.
    #[must_use]
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Set the parsed filter. Accepts an owned [`Filter`] or a shared `Arc<Filter>`.
    #[must_use]
    pub fn filter(mut self, filter: impl Into<Arc<Filter>>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Set sort entries; a leading `-` sorts that field descending.
    #[must_use]
    pub fn sort<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.sorts = entries
            .into_iter()
            .map(|e| SortField::parse(e.as_ref()))
            .collect();
        self
    }

    /// Set already-parsed sort fields.
    #[must_use]
    pub fn sorts(mut self, sorts: &[SortField]) -> Self {
        self.sorts = sorts.to_vec();
        self
    }

    /// Set the limit. Zero or negative means no LIMIT clause.
    #[must_use]
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    /// Set the offset. Zero or negative means no OFFSET clause.
    #[must_use]
    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    /// Set the placeholder style (default `?`).
    #[must_use]
    pub fn placeholder(mut self, style: Placeholder) -> Self {
        self.placeholder = style;
        self
    }

    /// Render the WHERE condition (without the keyword). Empty when there is
    /// no filter or the filter renders to nothing.
    fn render_where(&self) -> (String, Vec<Param>) {
        let Some(expr) = self.filter.as_ref().and_then(|f| f.expression.as_ref()) else {
            return (String::new(), Vec::new());
        };
        let (sql, params, _next_idx) = build_or_expr_impl(self.placeholder, expr, 1);
        (sql, params)
    }

    /// Build the SQL query and parameters.
    pub fn build(&self) -> QueryResult {
        let mut sql = String::from("SELECT ");

        if self.fields.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.fields.join(", "));
        }
        sql.push_str(" FROM ");
        sql.push_str(&self.table);

        let (condition, params) = self.render_where();
        if !condition.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&condition);
        }

        if !self.sorts.is_empty() {
            let sort_parts: Vec<String> = self
                .sorts
                .iter()
                .map(|s| format!("{} {}", s.field, s.dir.as_sql()))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&sort_parts.join(", "));
        }

        if self.limit > 0 {
            sql.push_str(&format!(" LIMIT {}", self.limit));
        }
        if self.offset > 0 {
            sql.push_str(&format!(" OFFSET {}", self.offset));
        }

        tracing::debug!(
            table = %self.table,
            params = params.len(),
            sql_len = sql.len(),
            "built select query"
        );
        QueryResult { sql, params }
    }

    /// Build only the WHERE condition, for embedding in a hand-written statement.
    ///
    /// The `WHERE` keyword is not included. Placeholders are numbered from 1.
    pub fn where_only(&self) -> QueryResult {
        let (sql, params) = self.render_where();
        tracing::debug!(
            table = %self.table,
            params = params.len(),
            "built where clause"
        );
        QueryResult { sql, params }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{NullCheck, Operator};
    use crate::parse_filter;

    fn filter(input: &str) -> Filter {
        parse_filter(input).unwrap().unwrap()
    }

    fn where_of(input: &str) -> QueryResult {
        QueryBuilder::new("t").filter(filter(input)).where_only()
    }

    #[test]
    fn test_select_star_without_fields() {
        let result = QueryBuilder::new("users").build();
        assert_eq!(result.sql, "SELECT * FROM users");
        assert!(result.params.is_empty());
    }

    #[test]
    fn test_products_scenario() {
        let result = QueryBuilder::new("products")
            .fields(["id", "name", "price"])
            .filter(filter("price>100"))
            .build();
        assert_eq!(
            result.sql,
            "SELECT id, name, price FROM products WHERE price > ?"
        );
        assert_eq!(result.params, vec![Param::Int(100)]);
    }

    #[test]
    fn test_like_strips_quotes_from_param_only() {
        let result = where_of("name LIKE '%phone%'");
        assert_eq!(result.sql, "name LIKE ?");
        assert_eq!(result.params, vec![Param::String("%phone%".into())]);
    }

    #[test]
    fn test_in_expands_placeholders() {
        let result = where_of("category IN ('electronics','books')");
        assert_eq!(result.sql, "category IN (?, ?)");
        assert_eq!(
            result.params,
            vec![
                Param::String("electronics".into()),
                Param::String("books".into())
            ]
        );
    }

    #[test]
    fn test_not_in_numbered() {
        let result = QueryBuilder::new("t")
            .filter(filter("id NOT IN (1, 2, 3) && active = true"))
            .placeholder(Placeholder::DOLLAR)
            .where_only();
        assert_eq!(result.sql, "(id NOT IN ($1, $2, $3) AND active = $4)");
        assert_eq!(
            result.params,
            vec![
                Param::Int(1),
                Param::Int(2),
                Param::Int(3),
                Param::Bool(true)
            ]
        );
    }

    #[test]
    fn test_null_checks_bind_nothing() {
        let result = where_of("stock IS NULL");
        assert_eq!(result.sql, "stock IS NULL");
        assert!(result.params.is_empty());

        let result = where_of("stock is not null");
        assert_eq!(result.sql, "stock IS NOT NULL");
        assert!(result.params.is_empty());
    }

    #[test]
    fn test_grouped_or_of_ands() {
        let result = where_of("(age>=18 && country='US') || (age>=21 && country='UK')");
        assert_eq!(
            result.sql,
            "((age >= ? AND country = ?) OR (age >= ? AND country = ?))"
        );
        assert_eq!(
            result.params,
            vec![
                Param::Int(18),
                Param::String("US".into()),
                Param::Int(21),
                Param::String("UK".into())
            ]
        );
    }

    #[test]
    fn test_sub_expression_not_double_wrapped() {
        assert_eq!(where_of("(a = 1)").sql, "a = ?");
        assert_eq!(where_of("((a = 1 || b = 2))").sql, "(a = ? OR b = ?)");
        assert_eq!(where_of("c = 3 && (a = 1 || b = 2)").sql, "(c = ? AND (a = ? OR b = ?))");
    }

    #[test]
    fn test_not_equal_spellings_render_the_same() {
        assert_eq!(where_of("a != 1").sql, "a != ?");
        assert_eq!(where_of("a <> 1").sql, "a != ?");
    }

    #[test]
    fn test_numbered_placeholders_follow_text_order() {
        let result = QueryBuilder::new("t")
            .filter(filter("a = 1 || (b IN (2, 3) && c = 'x') || d > 4.5"))
            .placeholder(Placeholder::COLON)
            .where_only();
        assert_eq!(result.sql, "(a = :1 OR (b IN (:2, :3) AND c = :4) OR d > :5)");
        assert_eq!(result.params.len(), 5);
        assert_eq!(result.params[4], Param::Float(4.5));
    }

    #[test]
    fn test_order_by_and_pagination() {
        let result = QueryBuilder::new("posts")
            .fields(["id", "title"])
            .sort(["-created_at", "id"])
            .limit(20)
            .offset(40)
            .build();
        assert_eq!(
            result.sql,
            "SELECT id, title FROM posts ORDER BY created_at DESC, id ASC LIMIT 20 OFFSET 40"
        );
    }

    #[test]
    fn test_non_positive_limit_offset_omitted() {
        for (limit, offset) in [(0, 0), (-1, -5), (0, -1)] {
            let result = QueryBuilder::new("t").limit(limit).offset(offset).build();
            assert_eq!(result.sql, "SELECT * FROM t");
        }
        let result = QueryBuilder::new("t").limit(0).offset(10).build();
        assert_eq!(result.sql, "SELECT * FROM t OFFSET 10");
    }

    #[test]
    fn test_build_is_idempotent() {
        let builder = QueryBuilder::new("t")
            .filter(filter("a = 1 && b IN (2, 3)"))
            .placeholder(Placeholder::DOLLAR);
        let first = builder.build();
        let second = builder.build();
        assert_eq!(first, second);
        assert_eq!(first.params.len(), 3);
        assert!(second.sql.contains("$3"));
        assert!(!second.sql.contains("$4"));
    }

    #[test]
    fn test_where_only_without_filter() {
        let result = QueryBuilder::new("t").where_only();
        assert_eq!(result.sql, "");
        assert!(result.params.is_empty());
    }

    #[test]
    fn test_empty_groups_render_nothing() {
        let empty = Filter::new(OrExpr::new(vec![AndExpr::new(vec![])]));
        let result = QueryBuilder::new("t").filter(empty).build();
        assert_eq!(result.sql, "SELECT * FROM t");

        let none = Filter { expression: None };
        assert_eq!(QueryBuilder::new("t").filter(none).build().sql, "SELECT * FROM t");
    }

    #[test]
    fn test_empty_parts_are_dropped_from_join() {
        let expr = OrExpr::new(vec![
            AndExpr::new(vec![]),
            AndExpr::new(vec![
                Comparison::group(OrExpr::new(vec![])),
                Comparison::compare("a", Operator::Equal, Value::Int(1)),
            ]),
        ]);
        let result = QueryBuilder::new("t").filter(Filter::new(expr)).where_only();
        assert_eq!(result.sql, "a = ?");
        assert_eq!(result.params, vec![Param::Int(1)]);
    }

    #[test]
    fn test_bare_field_renders_nothing() {
        assert_eq!(where_of("active").sql, "");
        assert_eq!(where_of("active && a = 1").sql, "a = ?");
    }

    #[test]
    fn test_hand_built_null_check() {
        let expr = OrExpr::new(vec![AndExpr::new(vec![Comparison::null_check(
            "deleted_at",
            NullCheck::IsNull,
        )])]);
        let result = QueryBuilder::new("t").filter(Filter::new(expr)).where_only();
        assert_eq!(result.sql, "deleted_at IS NULL");
    }

    #[test]
    fn test_array_with_scalar_operator_and_nesting() {
        let result = QueryBuilder::new("t")
            .filter(filter("a = (1, (2, 3))"))
            .placeholder(Placeholder::DOLLAR)
            .where_only();
        assert_eq!(result.sql, "a = ($1, ($2, $3))");
        assert_eq!(
            result.params,
            vec![Param::Int(1), Param::Int(2), Param::Int(3)]
        );
    }

    #[test]
    fn test_shared_filter_across_builders() {
        let shared = Arc::new(filter("a = 1"));
        let q1 = QueryBuilder::new("one").filter(Arc::clone(&shared)).build();
        let q2 = QueryBuilder::new("two")
            .filter(shared)
            .placeholder(Placeholder::DOLLAR)
            .build();
        assert_eq!(q1.sql, "SELECT * FROM one WHERE a = ?");
        assert_eq!(q2.sql, "SELECT * FROM two WHERE a = $1");
    }

    #[test]
    fn test_sort_field_parse() {
        assert_eq!(SortField::parse("-name"), SortField::new("name", SortDir::Desc));
        assert_eq!(SortField::parse("name"), SortField::new("name", SortDir::Asc));
    }
}
