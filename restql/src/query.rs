//! URL query-string entry point.
//!
//! Recognised keys: `fields`, `filter`, `sort`, `limit`, `offset`. Anything
//! else is ignored, and only the first occurrence of a key counts.
//!
//! ```
//! use restql::{QueryParams, Schema, query};
//!
//! let schema = Schema::new("products").allow_fields(["id", "name", "price"]);
//! let params = QueryParams::from_query_string(
//!     "fields=id,name&filter=price%3E100&sort=-price&limit=10",
//! );
//!
//! let result = query::parse(&params, &schema).unwrap().build();
//! assert_eq!(
//!     result.sql,
//!     "SELECT id, name FROM products WHERE price > ? ORDER BY price DESC LIMIT 10"
//! );
//! ```

use crate::builder::QueryBuilder;
use crate::error::Error;
use crate::parser::parse_filter;
use crate::schema::Schema;

/// Decomposed query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    /// Columns to select; empty selects `*`.
    pub fields: Vec<String>,
    /// Raw filter expression; empty means no filter.
    pub filter: String,
    /// Sort entries, `-` prefix for descending.
    pub sort: Vec<String>,
    /// Row limit; zero when missing or unparseable.
    pub limit: i64,
    /// Row offset; zero when missing or unparseable.
    pub offset: i64,
}

/// First raw value seen for each recognised key.
#[derive(Default)]
struct RawParams {
    fields: Option<String>,
    filter: Option<String>,
    sort: Option<String>,
    limit: Option<String>,
    offset: Option<String>,
}

impl RawParams {
    fn slot(&mut self, key: &str) -> Option<&mut Option<String>> {
        match key {
            "fields" => Some(&mut self.fields),
            "filter" => Some(&mut self.filter),
            "sort" => Some(&mut self.sort),
            "limit" => Some(&mut self.limit),
            "offset" => Some(&mut self.offset),
            _ => None,
        }
    }
}

impl QueryParams {
    /// Build from already-decoded key/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut raw = RawParams::default();
        for (key, value) in pairs {
            if let Some(slot) = raw.slot(key.as_ref())
                && slot.is_none()
            {
                *slot = Some(value.into());
            }
        }

        Self {
            fields: split_list(raw.fields.as_deref()),
            filter: raw.filter.unwrap_or_default(),
            sort: split_list(raw.sort.as_deref()),
            limit: parse_int(raw.limit.as_deref()),
            offset: parse_int(raw.offset.as_deref()),
        }
    }

    /// Build from a raw `a=b&c=d` query string (a leading `?` is allowed).
    ///
    /// Keys and values are percent-decoded and `+` decodes to a space.
    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_pairs(
            query
                .split('&')
                .filter(|segment| !segment.is_empty())
                .map(|segment| {
                    let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
                    (url_decode(key), url_decode(value))
                }),
        )
    }
}

/// Comma-separated list, entries trimmed. Missing or empty yields no entries.
fn split_list(raw: Option<&str>) -> Vec<String> {
    match raw {
        None | Some("") => Vec::new(),
        Some(list) => list.split(',').map(|s| s.trim().to_string()).collect(),
    }
}

fn parse_int(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.parse().ok()).unwrap_or(0)
}

/// Best-effort percent-decoding. Malformed escapes are kept verbatim and
/// invalid UTF-8 is replaced rather than rejected.
fn url_decode(input: &str) -> String {
    let mut out = Vec::with_capacity(input.len());
    let mut bytes = input.as_bytes().iter();

    while let Some(&b) = bytes.next() {
        match b {
            b'+' => out.push(b' '),
            b'%' => match hex_pair(bytes.as_slice()) {
                Some(decoded) => {
                    out.push(decoded);
                    bytes.nth(1);
                },
                None => out.push(b'%'),
            },
            _ => out.push(b),
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn hex_pair(bytes: &[u8]) -> Option<u8> {
    let [hi, lo, ..] = bytes else {
        return None;
    };
    let hi = char::from(*hi).to_digit(16)?;
    let lo = char::from(*lo).to_digit(16)?;
    u8::try_from(hi * 16 + lo).ok()
}

/// Turn decomposed parameters into a builder for `schema`'s table.
///
/// The filter is parsed and every referenced field is checked against the
/// schema, then the select list, then the sort entries. Limit and offset are
/// applied only when positive.
pub fn parse(params: &QueryParams, schema: &Schema) -> Result<QueryBuilder, Error> {
    let mut qb = QueryBuilder::new(schema.table());

    if !params.filter.is_empty()
        && let Some(filter) = parse_filter(&params.filter)?
    {
        schema.validate_filter(&filter)?;
        qb = qb.filter(filter);
    }

    if !params.fields.is_empty() {
        schema.validate_fields(params.fields.as_slice())?;
        qb = qb.fields(params.fields.iter().cloned());
    }

    if !params.sort.is_empty() {
        schema.validate_sort(params.sort.as_slice())?;
        qb = qb.sort(&params.sort);
    }

    if params.limit > 0 {
        qb = qb.limit(params.limit);
    }
    if params.offset > 0 {
        qb = qb.offset(params.offset);
    }

    tracing::debug!(
        table = %schema.table(),
        has_filter = qb.filter.is_some(),
        fields = params.fields.len(),
        sorts = params.sort.len(),
        limit = qb.limit,
        offset = qb.offset,
        "parsed query parameters"
    );
    Ok(qb)
}
