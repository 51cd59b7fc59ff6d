//! Placeholder styles for bound parameters.
//!
//! The builder emits one placeholder per bound argument, left to right.
//! [`Placeholder::Question`] renders every slot as `?` (MySQL, `SQLite`);
//! [`Placeholder::Numbered`] renders `<lead><N>` with a 1-based index that
//! restarts on every build (`$1, $2` for Postgres, `:1, :2` for Oracle).

/// Placeholder style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placeholder {
    /// Literal `?` for every parameter.
    #[default]
    Question,
    /// Lead character followed by the 1-based parameter index.
    Numbered(char),
}

impl Placeholder {
    /// Postgres style: `$1`, `$2`, ...
    pub const DOLLAR: Self = Self::Numbered('$');
    /// Oracle style: `:1`, `:2`, ...
    pub const COLON: Self = Self::Numbered(':');

    /// Pick a style from a sample token.
    ///
    /// `"?"` (or an empty string) selects [`Placeholder::Question`]; anything
    /// else selects [`Placeholder::Numbered`] with the sample's first character
    /// as lead, so `"$1"` and `"$"` both mean Postgres style.
    ///
    /// ```
    /// use restql::Placeholder;
    ///
    /// assert_eq!(Placeholder::from_style("?"), Placeholder::Question);
    /// assert_eq!(Placeholder::from_style("$1"), Placeholder::DOLLAR);
    /// assert_eq!(Placeholder::from_style(":1"), Placeholder::COLON);
    /// ```
    #[must_use]
    pub fn from_style(style: &str) -> Self {
        match style.chars().next() {
            None | Some('?') => Self::Question,
            Some(lead) => Self::Numbered(lead),
        }
    }

    /// Format the placeholder for the `idx`-th parameter (1-based).
    #[inline]
    #[must_use]
    pub fn param(&self, idx: usize) -> String {
        match self {
            Self::Question => "?".to_string(),
            Self::Numbered(lead) => format!("{lead}{idx}"),
        }
    }
}
