//! `Pattern`: matching one host value against one condition value
//!
//! Condition values are written as plain strings with an optional prefix:
//!
//! | Written   | Pattern                | Meaning                                   |
//! |-----------|------------------------|-------------------------------------------|
//! | `null`    | [`Pattern::Null`]      | value is null                             |
//! | `text`    | [`Pattern::Literal`]   | value equals `text`                       |
//! | `~re`     | [`Pattern::Regex`]     | `re` matches at the start of the value    |
//! | `!text`   | [`Pattern::NotLiteral`]| value must not equal `text`               |
//! | `!~re`    | [`Pattern::NotRegex`]  | `re` must not match at the start          |
//!
//! Regexes are searched from the start of the value but are not required to
//! consume all of it: `~^win` and `~win` both match `windows8Server64Guest`,
//! `~Server` does not.
//!
//! A comparison yields a [`MatchVerdict`]. Besides the plain match flag it
//! says whether the comparison hit a forbidden value, which is what negative
//! patterns aggregate over (see [`ConditionItem`](crate::ConditionItem)).

use crate::{Value, MAX_REGEX_PATTERN_LENGTH};
use regex::Regex;
use std::fmt;

/// Outcome of comparing one host value with one pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchVerdict {
    /// The value satisfies the pattern.
    pub matched: bool,
    /// The value is forbidden by the pattern (or is a null/non-null
    /// mismatch), which fails a key in negative mode.
    pub cancels: bool,
}

impl MatchVerdict {
    /// Positive match.
    pub const MATCH: Self = Self {
        matched: true,
        cancels: false,
    };
    /// Plain mismatch; a pending negative check stays satisfied.
    pub const MISMATCH: Self = Self {
        matched: false,
        cancels: false,
    };
    /// Hard mismatch that also fails a pending negative check.
    pub const CANCEL: Self = Self {
        matched: false,
        cancels: true,
    };
}

/// A compiled regex together with the source it was written as.
#[derive(Debug, Clone)]
pub struct PrefixRegex {
    source: String,
    regex: Regex,
}

impl PrefixRegex {
    /// Compile `source`.
    ///
    /// # Errors
    ///
    /// Returns the regex error message if `source` does not compile or is
    /// longer than [`MAX_REGEX_PATTERN_LENGTH`].
    pub fn new(source: &str) -> Result<Self, String> {
        if source.len() > MAX_REGEX_PATTERN_LENGTH {
            return Err(format!(
                "regex length is {}, but maximum allowed is {MAX_REGEX_PATTERN_LENGTH}",
                source.len()
            ));
        }
        // A stray `)` in the bare source must not close the anchoring group.
        Regex::new(source).map_err(|e| e.to_string())?;
        let regex = Regex::new(&format!(r"\A(?:{source})")).map_err(|e| e.to_string())?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns `true` if the regex matches starting at position 0.
    #[must_use]
    pub fn matches_prefix(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// One compiled condition value.
///
/// # Example
///
/// ```
/// use yamlist::{MatchVerdict, Pattern, Value};
///
/// let p = Pattern::parse("~^win");
/// assert_eq!(p.compare(&Value::from("windows8Server64Guest")), MatchVerdict::MATCH);
///
/// let p = Pattern::parse("!bbb");
/// assert!(p.is_negative());
/// assert_eq!(p.compare(&Value::from("bbb")), MatchVerdict::CANCEL);
/// assert_eq!(p.compare(&Value::from("aaa")), MatchVerdict::MISMATCH);
/// ```
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Matches only null.
    Null,
    /// Literal equality.
    Literal(String),
    /// Forbidden literal.
    NotLiteral(String),
    /// Prefix-anchored regex.
    Regex(PrefixRegex),
    /// Forbidden prefix-anchored regex.
    NotRegex(PrefixRegex),
    /// A regex that failed to compile. Every comparison is a mismatch.
    InvalidRegex {
        source: String,
        negated: bool,
        error: String,
    },
}

impl Pattern {
    /// Parse a pattern string, honoring the `!~`, `~` and `!` prefixes.
    ///
    /// Never fails: a regex that does not compile becomes
    /// [`Pattern::InvalidRegex`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if let Some(source) = raw.strip_prefix("!~") {
            Self::regex(source, true)
        } else if let Some(source) = raw.strip_prefix('~') {
            Self::regex(source, false)
        } else if let Some(literal) = raw.strip_prefix('!') {
            Self::NotLiteral(literal.to_string())
        } else {
            Self::Literal(raw.to_string())
        }
    }

    fn regex(source: &str, negated: bool) -> Self {
        match PrefixRegex::new(source) {
            Ok(re) if negated => Self::NotRegex(re),
            Ok(re) => Self::Regex(re),
            Err(error) => Self::InvalidRegex {
                source: source.to_string(),
                negated,
                error,
            },
        }
    }

    /// Compile a single condition value.
    ///
    /// Strings are parsed with [`Pattern::parse`]; other scalars are literal
    /// patterns over their canonical text.
    ///
    /// # Errors
    ///
    /// Returns a message when the value is a list or mapping.
    pub fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Null => Ok(Self::Null),
            Value::String(s) => Ok(Self::parse(s)),
            Value::List(_) | Value::Map(_) => Err(format!(
                "a pattern must be null or a scalar, found a {}",
                value.type_name()
            )),
            scalar => Ok(Self::Literal(
                scalar
                    .scalar_text()
                    .map(std::borrow::Cow::into_owned)
                    .unwrap_or_default(),
            )),
        }
    }

    /// Returns `true` for `!` and `!~` patterns.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        match self {
            Self::NotLiteral(_) | Self::NotRegex(_) => true,
            Self::InvalidRegex { negated, .. } => *negated,
            Self::Null | Self::Literal(_) | Self::Regex(_) => false,
        }
    }

    /// The compile error of an invalid regex pattern.
    #[must_use]
    pub fn regex_error(&self) -> Option<&str> {
        match self {
            Self::InvalidRegex { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Compare one host value (never a list; callers normalize first).
    #[must_use]
    pub fn compare(&self, host: &Value) -> MatchVerdict {
        match (self, host) {
            (Self::Null, Value::Null) => return MatchVerdict::MATCH,
            (Self::Null, _) | (_, Value::Null) => return MatchVerdict::CANCEL,
            _ => {}
        }

        let text = host.scalar_text();
        let text = text.as_deref();

        match self {
            Self::NotRegex(re) => {
                if text.is_some_and(|t| re.matches_prefix(t)) {
                    MatchVerdict::CANCEL
                } else {
                    MatchVerdict::MISMATCH
                }
            }
            Self::Regex(re) => {
                if text.is_some_and(|t| re.matches_prefix(t)) {
                    MatchVerdict::MATCH
                } else {
                    MatchVerdict::MISMATCH
                }
            }
            Self::NotLiteral(literal) => {
                if text == Some(literal.as_str()) {
                    MatchVerdict::CANCEL
                } else {
                    MatchVerdict::MISMATCH
                }
            }
            Self::Literal(literal) => {
                if text == Some(literal.as_str()) {
                    MatchVerdict::MATCH
                } else {
                    MatchVerdict::MISMATCH
                }
            }
            Self::InvalidRegex { source, error, .. } => {
                tracing::warn!(pattern = %source, %error, "invalid regex treated as mismatch");
                MatchVerdict::MISMATCH
            }
            Self::Null => MatchVerdict::CANCEL,
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Literal(s) => f.write_str(s),
            Self::NotLiteral(s) => write!(f, "!{s}"),
            Self::Regex(re) => write!(f, "~{}", re.source()),
            Self::NotRegex(re) => write!(f, "!~{}", re.source()),
            Self::InvalidRegex {
                source, negated, ..
            } => {
                if *negated {
                    write!(f, "!~{source}")
                } else {
                    write!(f, "~{source}")
                }
            }
        }
    }
}
