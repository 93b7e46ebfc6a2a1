//! `KeyPath`: dotted paths into nested record data
//!
//! A path is a `.`-separated list of segments. Each segment is a mapping key,
//! optionally followed by a list index: `vcenter.nics[0].name`.
//!
//! Resolution never fails loudly. A missing key, an index on a non-list or an
//! index past the end all mean the same thing: the path does not exist.

use crate::Value;
use std::fmt;

/// One segment of a [`KeyPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    key: String,
    index: Option<usize>,
}

impl Segment {
    /// Parse a single segment.
    ///
    /// A trailing `[N]` (N all ASCII digits) is an index; everything before
    /// the last `[` is the key. Anything else is a plain key, brackets
    /// included. An index too large for `usize` saturates and can never be
    /// in range.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let indexed = raw.strip_suffix(']').and_then(|head| {
            let open = head.rfind('[')?;
            let digits = &head[open + 1..];
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let index = digits.parse::<usize>().unwrap_or(usize::MAX);
            Some((&head[..open], index))
        });

        match indexed {
            Some((key, index)) => Self {
                key: key.to_string(),
                index: Some(index),
            },
            None => Self {
                key: raw.to_string(),
                index: None,
            },
        }
    }

    /// The mapping key, without any index suffix.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The list index, if the segment had one.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.index
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}[{index}]", self.key),
            None => f.write_str(&self.key),
        }
    }
}

/// A parsed dotted path, e.g. `ansible.group` or `vcenter.nics[1].mac`.
///
/// # Example
///
/// ```
/// use yamlist::{KeyPath, Value};
///
/// let host: Value = serde_yaml::from_str("vcenter:\n  nics:\n    - name: eth0").unwrap();
///
/// let path = KeyPath::parse("vcenter.nics[0].name");
/// assert_eq!(path.resolve(&host), Some(&Value::from("eth0")));
///
/// let missing = KeyPath::parse("vcenter.nics[4].name");
/// assert_eq!(missing.resolve(&host), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath {
    raw: String,
    segments: Vec<Segment>,
}

impl KeyPath {
    /// Parse a dotted path. Parsing is total: every string is a path.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            segments: raw.split('.').map(Segment::parse).collect(),
        }
    }

    /// The path as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Resolve this path against a record.
    ///
    /// Returns `Some(value)` only when every segment resolves; a present
    /// null is `Some(&Value::Null)`.
    #[must_use]
    pub fn resolve<'v>(&self, record: &'v Value) -> Option<&'v Value> {
        self.segments.iter().try_fold(record, |current, segment| {
            let child = current.as_map()?.get(segment.key())?;
            match segment.index() {
                Some(index) => child.as_list()?.get(index),
                None => Some(child),
            }
        })
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for KeyPath {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}
