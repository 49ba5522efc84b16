//! Partial-precision timestamps.
//!
//! Reference: ID3 tag version 2.4.0 - Main Structure §4 (the subset of
//! ISO 8601 used by timestamp frames).

use std::cmp::Ordering;
use std::fmt;
use std::fmt::Write as _;
use std::hash::{Hash, Hasher};

/// A timestamp of the form `YYYY-MM-DD HH:MM:SS`, or any leading prefix
/// of it (`YYYY`, `YYYY-MM`, ...).
///
/// The canonical rendered text is the identity of the value: equality,
/// ordering and hashing all use it and nothing else, so `2005` and a
/// year-only timestamp built from parts compare equal, and chronological
/// order falls out of plain string order. The parsed components are a
/// cached decomposition of that text.
///
/// # Example
///
/// ```
/// use tagcodec_id3::Id3Timestamp;
///
/// let ts = Id3Timestamp::new("2005-06-07T08:09:10");
/// assert_eq!(ts.text(), "2005-06-07 08:09:10");
/// assert_eq!(ts.month(), Some(6));
/// assert!(Id3Timestamp::new("2004") < ts);
/// ```
#[derive(Debug, Clone)]
pub struct Id3Timestamp {
    text: String,
    year: Option<u32>,
    month: Option<u32>,
    day: Option<u32>,
    hour: Option<u32>,
    minute: Option<u32>,
    second: Option<u32>,
}

impl Id3Timestamp {
    /// Parses `text` into components and canonicalises it.
    ///
    /// Tokens are split on single `-`, `T`, `:`, `/` or `.` characters
    /// and on runs of whitespace. Tokens are assigned to components in
    /// order; the first token that is not an unsigned number stops the
    /// assignment, leaving that component and everything after it unset.
    /// Unparseable input therefore yields an empty timestamp rather than
    /// an error.
    pub fn new(text: &str) -> Self {
        let mut parts = [None::<u32>; 6];
        for (slot, token) in parts.iter_mut().zip(split_tokens(text)) {
            match token.parse::<u32>() {
                Ok(n) => *slot = Some(n),
                Err(_) => break,
            }
        }
        Self::from_parts(parts[0], parts[1], parts[2], parts[3], parts[4], parts[5])
    }

    /// Builds a timestamp from already-parsed components.
    ///
    /// Components after the first `None` are ignored, since the rendered
    /// form cannot express a gap.
    pub fn from_parts(
        year: Option<u32>,
        month: Option<u32>,
        day: Option<u32>,
        hour: Option<u32>,
        minute: Option<u32>,
        second: Option<u32>,
    ) -> Self {
        let mut ts = Id3Timestamp {
            text: String::new(),
            year,
            month,
            day,
            hour,
            minute,
            second,
        };
        ts.canonicalise();
        ts
    }

    /// The canonical text, e.g. `2005-06-07 08:09:10` or `2005-06`.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// True when no component parsed.
    pub fn is_empty(&self) -> bool {
        self.year.is_none()
    }

    pub fn year(&self) -> Option<u32> {
        self.year
    }

    pub fn month(&self) -> Option<u32> {
        self.month
    }

    pub fn day(&self) -> Option<u32> {
        self.day
    }

    pub fn hour(&self) -> Option<u32> {
        self.hour
    }

    pub fn minute(&self) -> Option<u32> {
        self.minute
    }

    pub fn second(&self) -> Option<u32> {
        self.second
    }

    /// Renders the components into `text`, zero-padding the year to four
    /// digits and everything else to two, stopping at the first unset
    /// component.
    fn canonicalise(&mut self) {
        // Components past the first unset one cannot be expressed in the
        // rendered form; drop them so the decomposition matches the text.
        let mut gap = false;
        for slot in [
            &mut self.year,
            &mut self.month,
            &mut self.day,
            &mut self.hour,
            &mut self.minute,
            &mut self.second,
        ] {
            if slot.is_none() {
                gap = true;
            } else if gap {
                *slot = None;
            }
        }
        let fields = [
            (self.year, 4usize, '-'),
            (self.month, 2, '-'),
            (self.day, 2, ' '),
            (self.hour, 2, ':'),
            (self.minute, 2, ':'),
            (self.second, 2, ' '),
        ];
        let mut out = String::new();
        for (value, width, sep) in fields {
            match value {
                Some(v) => {
                    let _ = write!(out, "{v:0width$}");
                    out.push(sep);
                }
                None => break,
            }
        }
        out.pop();
        self.text = out;
    }
}

impl PartialEq for Id3Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for Id3Timestamp {}

impl PartialOrd for Id3Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Id3Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.text.cmp(&other.text)
    }
}

impl Hash for Id3Timestamp {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl fmt::Display for Id3Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for Id3Timestamp {
    fn from(text: &str) -> Self {
        Id3Timestamp::new(text)
    }
}

/// Splits on the single-character separators and on whitespace runs.
/// Adjacent separators yield empty tokens, as do leading separators.
fn split_tokens(text: &str) -> Vec<String> {
    let mut tokens = vec![String::new()];
    let mut in_whitespace = false;
    for c in text.chars() {
        if matches!(c, '-' | 'T' | ':' | '/' | '.') {
            tokens.push(String::new());
            in_whitespace = false;
        } else if c.is_whitespace() {
            if !in_whitespace {
                tokens.push(String::new());
                in_whitespace = true;
            }
        } else {
            if let Some(last) = tokens.last_mut() {
                last.push(c);
            }
            in_whitespace = false;
        }
    }
    tokens
}
