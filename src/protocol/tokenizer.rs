//! Command Line Tokenizer
//!
//! Commands are single lines of whitespace-separated tokens:
//!
//! ```text
//! SET user:1 {"name": "Ariz", "age": 30} 60000
//! ─┬─ ───┬── ──────────────┬────────────── ──┬──
//!  │     │                 │                 └─ optional TTL (ms)
//!  │     │                 └─ JSON payload, may contain spaces
//!  │     └─ key
//!  └─ verb (case-insensitive)
//! ```
//!
//! Splitting happens on runs of whitespace, so a JSON payload with spaces
//! arrives as several tokens. [`payload_span`] puts it back together.

use crate::protocol::coerce::parse_number;

/// A tokenized, non-empty command line.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandLine<'a> {
    tokens: Vec<&'a str>,
}

impl<'a> CommandLine<'a> {
    /// Splits a raw line into tokens.
    ///
    /// Returns `None` when the line is blank, in which case the caller
    /// should do nothing at all.
    ///
    /// # Example
    ///
    /// ```
    /// use indexkv::protocol::CommandLine;
    ///
    /// let line = CommandLine::parse("  get   user:1 ").unwrap();
    /// assert_eq!(line.verb(), "GET");
    /// assert_eq!(line.args(), &["user:1"]);
    ///
    /// assert!(CommandLine::parse("   ").is_none());
    /// ```
    pub fn parse(line: &'a str) -> Option<Self> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            None
        } else {
            Some(Self { tokens })
        }
    }

    /// The command verb, uppercased for table lookup.
    pub fn verb(&self) -> String {
        self.tokens[0].to_uppercase()
    }

    /// All tokens after the verb, verbatim.
    pub fn args(&self) -> &[&'a str] {
        &self.tokens[1..]
    }

    /// All tokens including the verb.
    pub fn tokens(&self) -> &[&'a str] {
        &self.tokens
    }
}

/// The JSON text and optional TTL recovered from a `SET` argument list.
#[derive(Debug, Clone, PartialEq)]
pub struct PayloadSpan {
    /// Tokens of the payload rejoined with single spaces
    pub json: String,
    /// Trailing numeric token, if present
    pub ttl: Option<f64>,
}

/// Locates the JSON payload in `tokens`.
///
/// The payload starts at the first token beginning with `{`. When the last
/// token is a number it is taken as the TTL and left out of the payload.
/// Returns `None` when no token opens an object.
pub fn payload_span(tokens: &[&str]) -> Option<PayloadSpan> {
    let start = tokens.iter().position(|t| t.starts_with('{'))?;

    let mut end = tokens.len();
    let ttl = tokens.last().and_then(|last| parse_number(last));
    if ttl.is_some() {
        end -= 1;
    }

    Some(PayloadSpan {
        json: tokens[start..end].join(" "),
        ttl,
    })
}
