//! `hypermedia-json` — minimal JSON parse tree for hypermedia documents.
//!
//! The tree distinguishes integer from decimal literals so that scalar
//! converters can reject a value of the wrong primitive kind instead of
//! coercing it.
//!
//! # Example
//!
//! ```
//! use hypermedia_json::{parse, to_string, JsonValue};
//!
//! let value = parse(r#"{"id":"1","count":3,"ratio":0.5}"#).unwrap();
//! assert_eq!(value.get("count"), Some(&JsonValue::Integer(3)));
//! assert_eq!(value.get("ratio"), Some(&JsonValue::Decimal(0.5)));
//! assert_eq!(to_string(&value), r#"{"id":"1","count":3,"ratio":0.5}"#);
//! ```

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod value;

pub use decoder::JsonDecoder;
pub use encoder::JsonEncoder;
pub use error::JsonError;
pub use value::JsonValue;

/// Parses a complete JSON text into a [`JsonValue`].
///
/// Fails if anything other than whitespace follows the top-level value.
pub fn parse(text: &str) -> Result<JsonValue, JsonError> {
    JsonDecoder::new().decode(text.as_bytes())
}

/// Parses a complete JSON text from raw bytes.
pub fn parse_bytes(input: &[u8]) -> Result<JsonValue, JsonError> {
    JsonDecoder::new().decode(input)
}

/// Writes a [`JsonValue`] as compact JSON text.
pub fn to_string(value: &JsonValue) -> String {
    JsonEncoder::new().encode(value)
}
