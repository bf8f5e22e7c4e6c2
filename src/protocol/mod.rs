//! Command Language Front End
//!
//! This module turns raw command lines into tokens and provides the explicit
//! coercions the command handlers use to compare text with JSON values.
//!
//! ## Modules
//!
//! - `tokenizer`: Whitespace tokenizer and `SET` payload/TTL extraction
//! - `coerce`: Total string/number/JSON conversions
//!
//! ## Example
//!
//! ```
//! use indexkv::protocol::{payload_span, CommandLine};
//!
//! let line = CommandLine::parse(r#"SET user:1 {"age": 30} 1000"#).unwrap();
//! assert_eq!(line.verb(), "SET");
//!
//! let span = payload_span(&line.args()[1..]).unwrap();
//! assert_eq!(span.json, r#"{"age": 30}"#);
//! assert_eq!(span.ttl, Some(1000.0));
//! ```

pub mod coerce;
pub mod tokenizer;

// Re-export commonly used items for convenience
pub use coerce::{canonical_string, format_number, numeric_value, parse_number};
pub use tokenizer::{payload_span, CommandLine, PayloadSpan};
