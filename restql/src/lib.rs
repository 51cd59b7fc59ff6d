//! Safe SQL from REST query parameters.
//!
//! `restql` turns a compact filter language such as
//! `price>100 && category IN ('electronics','books')` into a parameterized
//! `SELECT` statement. User-supplied values never appear in the SQL text:
//! every literal becomes a placeholder with its value in the parameter list.
//!
//! # Filter language
//!
//! | Syntax                                   | Meaning                       |
//! |------------------------------------------|-------------------------------|
//! | `=` `!=` `<>` `>` `>=` `<` `<=`          | comparison                    |
//! | `LIKE` `NOT LIKE` `ILIKE`                | pattern match                 |
//! | `IN (..)` `NOT IN (..)`                  | membership                    |
//! | `IS NULL` `IS NOT NULL`                  | null checks, bind nothing     |
//! | `&&` `\|\|` `( .. )`                     | AND, OR, grouping             |
//!
//! `&&` binds tighter than `||`. Keywords are accepted in all-upper or
//! all-lower case. Strings use single or double quotes.
//!
//! # Quick start
//!
//! ```
//! use restql::{Param, Placeholder, QueryBuilder, parse_filter};
//!
//! let filter = parse_filter("(age>=18 && country='US') || vip = true")
//!     .unwrap()
//!     .unwrap();
//!
//! let result = QueryBuilder::new("users")
//!     .fields(["id", "name"])
//!     .filter(filter)
//!     .sort(["-created_at"])
//!     .limit(20)
//!     .placeholder(Placeholder::DOLLAR)
//!     .build();
//!
//! assert_eq!(
//!     result.sql,
//!     "SELECT id, name FROM users WHERE ((age >= $1 AND country = $2) OR vip = $3) \
//!      ORDER BY created_at DESC LIMIT 20"
//! );
//! assert_eq!(
//!     result.params,
//!     vec![Param::Int(18), Param::String("US".into()), Param::Bool(true)]
//! );
//! ```
//!
//! # Guarding untrusted input
//!
//! Field names and sort columns are emitted verbatim, so requests from
//! clients should go through a whitelist: either a [`Schema`] with
//! [`query::parse`], or a [`ValidationConfig`] with [`QueryBuilder::validate`].
//!
//! ```
//! use restql::{QueryParams, Schema, query};
//!
//! let schema = Schema::new("users").allow_fields(["id", "name"]);
//! let params = QueryParams::from_query_string("filter=password%3D'x'");
//! assert!(query::parse(&params, &schema).is_err());
//! ```

pub mod ast;
mod builder;
mod error;
mod parser;
mod placeholder;
pub mod query;
mod schema;
mod validate;

pub use ast::{
    AndExpr, Comparison, Filter, NullCheck, Operator, OrExpr, Predicate, Primary, Value,
    walk_fields,
};
pub use builder::{Param, QueryBuilder, QueryResult, SortDir, SortField};
pub use error::{Error, INVALID_FILTER_SYNTAX, SyntaxError, ValidationError};
pub use parser::{MAX_NESTING_DEPTH, parse_filter};
pub use placeholder::Placeholder;
pub use query::QueryParams;
pub use schema::Schema;
pub use validate::{ValidationConfig, Validator};
