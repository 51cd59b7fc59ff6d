//! Recursive-descent parser for filter expressions.
//!
//! # Grammar
//!
//! ```text
//! Filter      := OrExpr
//! OrExpr      := AndExpr ( "||" AndExpr )*
//! AndExpr     := Comparison ( "&&" Comparison )*
//! Comparison  := Primary ( Operator (Value | NullSuffix) )?
//! Primary     := Identifier | "(" OrExpr ")"
//! Operator    := "=" | "!=" | "<>" | ">=" | "<=" | ">" | "<"
//!              | LIKE | ILIKE | NOT LIKE | IN | NOT IN | IS
//! NullSuffix  := NULL | NOT NULL                     (only after IS)
//! Value       := String | Float | Int | Boolean | Array
//! Boolean     := true | TRUE | false | FALSE
//! Array       := "(" Value ( "," Value )* ")"
//! ```
//!
//! Keywords are matched in all-upper or all-lower case only, and only where
//! the grammar expects them, so a field may be called `like` or `in`.
//!
//! # Example
//!
//! ```
//! use restql::parse_filter;
//!
//! let filter = parse_filter("a=1 && b=2 || c=3").unwrap().unwrap();
//! let groups = &filter.expression.as_ref().unwrap().and;
//! assert_eq!(groups.len(), 2);
//! assert_eq!(groups[0].comparisons.len(), 2);
//! assert_eq!(groups[1].comparisons.len(), 1);
//!
//! assert!(parse_filter("").unwrap().is_none());
//! assert!(parse_filter("age >> 18").is_err());
//! ```

mod lexer;

use crate::ast::{
    AndExpr, Comparison, Filter, NullCheck, Operator, OrExpr, Predicate, Primary, Value,
};
use crate::error::SyntaxError;
use lexer::{Token, TokenKind, tokenize};

/// Deepest accepted nesting of parenthesized groups and arrays, counted
/// together.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Parse a filter string into an expression tree.
///
/// Returns `Ok(None)` when the input contains no tokens at all (empty or
/// whitespace only), which callers treat as "no filter". Any other input must
/// match the grammar in full; the first failure is reported and no partial
/// tree is returned. Input nested deeper than [`MAX_NESTING_DEPTH`] is a
/// syntax error.
pub fn parse_filter(input: &str) -> Result<Option<Filter>, SyntaxError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Ok(None);
    }

    let token_count = tokens.len();
    let mut parser = Parser {
        input,
        tokens,
        pos: 0,
        depth: 0,
    };
    let expression = parser.parse_or()?;
    if let Some(tok) = parser.peek(0) {
        return Err(parser.unexpected(tok, "expected \"&&\", \"||\" or end of input"));
    }

    tracing::trace!(input_len = input.len(), token_count, "parsed filter");
    Ok(Some(Filter::new(expression)))
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token<'a>>,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self, ahead: usize) -> Option<Token<'a>> {
        self.tokens.get(self.pos + ahead).copied()
    }

    fn advance(&mut self, n: usize) {
        self.pos += n;
    }

    /// Consume the next token if it is `symbol`.
    fn eat_symbol(&mut self, symbol: &str) -> bool {
        if self.peek(0).is_some_and(|t| t.is_symbol(symbol)) {
            self.advance(1);
            true
        } else {
            false
        }
    }

    fn expect_symbol(&mut self, symbol: &str) -> Result<(), SyntaxError> {
        if self.eat_symbol(symbol) {
            Ok(())
        } else {
            Err(self.unexpected_here(&format!("expected {symbol:?}")))
        }
    }

    fn unexpected(&self, tok: Token<'_>, expected: &str) -> SyntaxError {
        SyntaxError::new(
            self.input,
            tok.offset,
            format!(
                "unexpected token {:?} at offset {}, {expected}",
                tok.text, tok.offset
            ),
        )
    }

    fn unexpected_here(&self, expected: &str) -> SyntaxError {
        match self.peek(0) {
            Some(tok) => self.unexpected(tok, expected),
            None => SyntaxError::new(
                self.input,
                self.input.len(),
                format!("unexpected end of input, {expected}"),
            ),
        }
    }

    /// Open a nesting level at `open`, failing past [`MAX_NESTING_DEPTH`].
    fn enter(&mut self, open: Token<'_>) -> Result<(), SyntaxError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(SyntaxError::new(
                self.input,
                open.offset,
                format!(
                    "nesting too deep at offset {}, at most {MAX_NESTING_DEPTH} levels allowed",
                    open.offset
                ),
            ));
        }
        self.depth += 1;
        self.advance(1);
        Ok(())
    }

    fn leave(&mut self) -> Result<(), SyntaxError> {
        self.expect_symbol(")")?;
        self.depth -= 1;
        Ok(())
    }

    fn parse_or(&mut self) -> Result<OrExpr, SyntaxError> {
        let mut and = vec![self.parse_and()?];
        while self.eat_symbol("||") {
            and.push(self.parse_and()?);
        }
        Ok(OrExpr::new(and))
    }

    fn parse_and(&mut self) -> Result<AndExpr, SyntaxError> {
        let mut comparisons = vec![self.parse_comparison()?];
        while self.eat_symbol("&&") {
            comparisons.push(self.parse_comparison()?);
        }
        Ok(AndExpr::new(comparisons))
    }

    fn parse_comparison(&mut self) -> Result<Comparison, SyntaxError> {
        let left = self.parse_primary()?;

        let Some(op) = self.parse_operator() else {
            return Ok(Comparison {
                left,
                predicate: None,
            });
        };

        let predicate = if op == Operator::Is {
            match self.parse_null_suffix() {
                Some(check) => Predicate::Null(check),
                None => Predicate::Compare {
                    op,
                    value: self.parse_value()?,
                },
            }
        } else {
            Predicate::Compare {
                op,
                value: self.parse_value()?,
            }
        };

        Ok(Comparison {
            left,
            predicate: Some(predicate),
        })
    }

    fn parse_primary(&mut self) -> Result<Primary, SyntaxError> {
        match self.peek(0) {
            Some(tok) if tok.kind == TokenKind::Ident => {
                self.advance(1);
                Ok(Primary::Field(tok.text.to_string()))
            },
            Some(tok) if tok.is_symbol("(") => {
                self.enter(tok)?;
                let inner = self.parse_or()?;
                self.leave()?;
                Ok(Primary::SubExpr(Box::new(inner)))
            },
            _ => Err(self.unexpected_here("expected a field name or \"(\"")),
        }
    }

    /// Match an operator at the cursor, consuming it on success.
    ///
    /// `NOT` needs the second token of lookahead to tell `NOT LIKE` and
    /// `NOT IN` apart; both words must share the same casing.
    fn parse_operator(&mut self) -> Option<Operator> {
        let tok = self.peek(0)?;
        let (op, width) = match tok.kind {
            TokenKind::Operator => (
                match tok.text {
                    "=" => Operator::Equal,
                    "!=" | "<>" => Operator::NotEqual,
                    ">=" => Operator::GreaterOrEqual,
                    "<=" => Operator::LessOrEqual,
                    ">" => Operator::Greater,
                    "<" => Operator::Less,
                    _ => return None,
                },
                1,
            ),
            TokenKind::Ident => match tok.text {
                "LIKE" | "like" => (Operator::Like, 1),
                "ILIKE" | "ilike" => (Operator::ILike, 1),
                "IN" | "in" => (Operator::In, 1),
                "IS" | "is" => (Operator::Is, 1),
                "NOT" | "not" => {
                    let next = self.peek(1)?;
                    match (tok.text, next.text) {
                        ("NOT", "LIKE") | ("not", "like") => (Operator::NotLike, 2),
                        ("NOT", "IN") | ("not", "in") => (Operator::NotIn, 2),
                        _ => return None,
                    }
                },
                _ => return None,
            },
            _ => return None,
        };
        self.advance(width);
        Some(op)
    }

    fn parse_null_suffix(&mut self) -> Option<NullCheck> {
        let tok = self.peek(0)?;
        if tok.is_keyword("NULL") {
            self.advance(1);
            return Some(NullCheck::IsNull);
        }
        let next = self.peek(1)?;
        match (tok.text, next.text) {
            ("NOT", "NULL") | ("not", "null") if tok.kind == TokenKind::Ident => {
                self.advance(2);
                Some(NullCheck::IsNotNull)
            },
            _ => None,
        }
    }

    fn parse_value(&mut self) -> Result<Value, SyntaxError> {
        let Some(tok) = self.peek(0) else {
            return Err(self.unexpected_here("expected a value"));
        };

        let value = match tok.kind {
            TokenKind::String => Value::String(tok.text.to_string()),
            TokenKind::Float => Value::Float(
                tok.text
                    .parse()
                    .map_err(|_| self.unexpected(tok, "expected a number"))?,
            ),
            TokenKind::Int => Value::Int(
                tok.text
                    .parse()
                    .map_err(|_| self.unexpected(tok, "integer out of range"))?,
            ),
            TokenKind::Ident if tok.is_keyword("TRUE") => Value::Boolean(true),
            TokenKind::Ident if tok.is_keyword("FALSE") => Value::Boolean(false),
            TokenKind::Punct if tok.text == "(" => return self.parse_array(tok),
            _ => return Err(self.unexpected(tok, "expected a value")),
        };
        self.advance(1);
        Ok(value)
    }

    fn parse_array(&mut self, open: Token<'_>) -> Result<Value, SyntaxError> {
        self.enter(open)?;
        let mut values = vec![self.parse_value()?];
        while self.eat_symbol(",") {
            values.push(self.parse_value()?);
        }
        self.leave()?;
        Ok(Value::Array(values))
    }
}
