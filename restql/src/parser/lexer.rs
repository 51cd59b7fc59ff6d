//! Tokenizer for filter expressions.
//!
//! Rules are tried in a fixed order at every position, first match wins:
//! whitespace (skipped), float, integer, string, identifier, operator,
//! punctuation. Multi-character operators are tried before their
//! single-character prefixes.

use crate::error::SyntaxError;

/// Token categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Float,
    Int,
    String,
    Ident,
    Operator,
    Punct,
}

/// A token borrowed from the input, with its byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub offset: usize,
}

impl Token<'_> {
    /// Whether this is an identifier spelled exactly `upper` or its lowercase form.
    pub fn is_keyword(&self, upper: &str) -> bool {
        self.kind == TokenKind::Ident
            && (self.text == upper || self.text == upper.to_ascii_lowercase())
    }

    /// Whether this is the operator or punctuation `symbol`.
    pub fn is_symbol(&self, symbol: &str) -> bool {
        matches!(self.kind, TokenKind::Operator | TokenKind::Punct) && self.text == symbol
    }
}

const OPERATORS: [&str; 9] = [">=", "<=", "!=", "<>", "&&", "||", "=", ">", "<"];

/// Split `input` into tokens.
pub(crate) fn tokenize(input: &str) -> Result<Vec<Token<'_>>, SyntaxError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while let Some(&b) = bytes.get(pos) {
        if b.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        let (kind, len) = if let Some(len) = match_float(&bytes[pos..]) {
            (TokenKind::Float, len)
        } else if let Some(len) = match_int(&bytes[pos..]) {
            (TokenKind::Int, len)
        } else if b == b'\'' || b == b'"' {
            let close = bytes[pos + 1..]
                .iter()
                .position(|&c| c == b)
                .ok_or_else(|| SyntaxError::new(input, pos, "unterminated string literal"))?;
            (TokenKind::String, close + 2)
        } else if b.is_ascii_alphabetic() || b == b'_' {
            let len = bytes[pos..]
                .iter()
                .take_while(|c| c.is_ascii_alphanumeric() || **c == b'_')
                .count();
            (TokenKind::Ident, len)
        } else if let Some(op) = OPERATORS
            .iter()
            .find(|op| bytes[pos..].starts_with(op.as_bytes()))
        {
            (TokenKind::Operator, op.len())
        } else if matches!(b, b'(' | b')' | b',') {
            (TokenKind::Punct, 1)
        } else {
            let ch = input[pos..].chars().next().unwrap_or_default();
            return Err(SyntaxError::new(
                input,
                pos,
                format!("invalid input text {ch:?} at offset {pos}"),
            ));
        };

        tokens.push(Token {
            kind,
            text: &input[pos..pos + len],
            offset: pos,
        });
        pos += len;
    }

    Ok(tokens)
}

/// Length of an optional sign followed by at least one ASCII digit.
fn sign_and_digits(bytes: &[u8]) -> Option<usize> {
    let sign = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let digits = bytes[sign..].iter().take_while(|c| c.is_ascii_digit()).count();
    (digits > 0).then_some(sign + digits)
}

/// `[-+]?\d+`
fn match_int(bytes: &[u8]) -> Option<usize> {
    sign_and_digits(bytes)
}

/// `[-+]?\d+\.\d+`
fn match_float(bytes: &[u8]) -> Option<usize> {
    let int_len = sign_and_digits(bytes)?;
    if bytes.get(int_len) != Some(&b'.') {
        return None;
    }
    let frac = bytes[int_len + 1..]
        .iter()
        .take_while(|c| c.is_ascii_digit())
        .count();
    (frac > 0).then_some(int_len + 1 + frac)
}
