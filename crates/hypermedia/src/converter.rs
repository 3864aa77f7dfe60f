//! Per-kind codecs between [`JsonValue`] and [`Scalar`].

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use hypermedia_json::JsonValue;

use crate::error::ConversionError;
use crate::scalar::{Scalar, ScalarKind};

/// Wire format for date-times. Always UTC on output.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A codec for one scalar kind.
///
/// Converters never see `null`; the registry maps it to [`Scalar::Null`] and
/// back before dispatching.
pub trait ValueConverter: Send + Sync {
    fn serialize(&self, value: &Scalar) -> Result<JsonValue, ConversionError>;
    fn deserialize(&self, value: &JsonValue, target: ScalarKind) -> Result<Scalar, ConversionError>;
}

fn shape(expected: ScalarKind, found: &JsonValue) -> ConversionError {
    ConversionError::UnexpectedShape {
        expected: expected.as_str(),
        found: found.kind(),
    }
}

fn wrong_scalar(expected: ScalarKind, found: &Scalar) -> ConversionError {
    ConversionError::UnexpectedShape {
        expected: expected.as_str(),
        found: found.kind().map_or("null", ScalarKind::as_str),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BoolConverter;

impl ValueConverter for BoolConverter {
    fn serialize(&self, value: &Scalar) -> Result<JsonValue, ConversionError> {
        match value {
            Scalar::Bool(b) => Ok(JsonValue::Bool(*b)),
            other => Err(wrong_scalar(ScalarKind::Bool, other)),
        }
    }

    fn deserialize(&self, value: &JsonValue, target: ScalarKind) -> Result<Scalar, ConversionError> {
        value.as_bool().map(Scalar::Bool).ok_or_else(|| shape(target, value))
    }
}

/// Exact integer conversion. Decimal literals are rejected even when
/// integral.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerConverter;

impl ValueConverter for IntegerConverter {
    fn serialize(&self, value: &Scalar) -> Result<JsonValue, ConversionError> {
        match value {
            Scalar::Int32(i) => Ok(JsonValue::Integer(i64::from(*i))),
            Scalar::Int64(i) => Ok(JsonValue::Integer(*i)),
            other => Err(wrong_scalar(ScalarKind::Int64, other)),
        }
    }

    fn deserialize(&self, value: &JsonValue, target: ScalarKind) -> Result<Scalar, ConversionError> {
        let i = value.as_i64().ok_or_else(|| shape(target, value))?;
        match target {
            ScalarKind::Int32 => i32::try_from(i)
                .map(Scalar::Int32)
                .map_err(|_| ConversionError::OutOfRange {
                    kind: target,
                    value: i.to_string(),
                }),
            _ => Ok(Scalar::Int64(i)),
        }
    }
}

/// Floats are written as decimal literals; integer literals are accepted on
/// input.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatConverter;

impl ValueConverter for FloatConverter {
    fn serialize(&self, value: &Scalar) -> Result<JsonValue, ConversionError> {
        match value {
            Scalar::Float(f) if !f.is_finite() => Err(ConversionError::NonFinite),
            Scalar::Float(f) => Ok(JsonValue::Decimal(*f)),
            other => Err(wrong_scalar(ScalarKind::Float, other)),
        }
    }

    fn deserialize(&self, value: &JsonValue, target: ScalarKind) -> Result<Scalar, ConversionError> {
        value.as_f64().map(Scalar::Float).ok_or_else(|| shape(target, value))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StringConverter;

impl ValueConverter for StringConverter {
    fn serialize(&self, value: &Scalar) -> Result<JsonValue, ConversionError> {
        match value {
            Scalar::Str(s) => Ok(JsonValue::Str(s.clone())),
            other => Err(wrong_scalar(ScalarKind::Str, other)),
        }
    }

    fn deserialize(&self, value: &JsonValue, target: ScalarKind) -> Result<Scalar, ConversionError> {
        value
            .as_str()
            .map(|s| Scalar::Str(s.to_owned()))
            .ok_or_else(|| shape(target, value))
    }
}

/// ISO-8601 date-times, normalized to UTC with second precision on output and
/// accepting any offset on input.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeConverter;

impl ValueConverter for DateTimeConverter {
    fn serialize(&self, value: &Scalar) -> Result<JsonValue, ConversionError> {
        match value {
            Scalar::DateTime(dt) => Ok(JsonValue::Str(format_date_time(dt))),
            other => Err(wrong_scalar(ScalarKind::DateTime, other)),
        }
    }

    fn deserialize(&self, value: &JsonValue, target: ScalarKind) -> Result<Scalar, ConversionError> {
        let text = value.as_str().ok_or_else(|| shape(target, value))?;
        parse_date_time(text).map(Scalar::DateTime)
    }
}

pub fn format_date_time(dt: &DateTime<Utc>) -> String {
    dt.format(DATE_TIME_FORMAT).to_string()
}

/// Parses an ISO-8601 date-time with any offset, or none (taken as UTC).
pub fn parse_date_time(text: &str) -> Result<DateTime<Utc>, ConversionError> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%dT%H:%M:%S%.f%z"] {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    Err(ConversionError::InvalidDateTime(text.to_owned()))
}

/// Default converter per scalar kind, with optional overrides.
///
/// Mutable only while a [`crate::ContractBuilder`] owns it; the built
/// resolver holds it behind an `Arc` and never mutates it again.
#[derive(Clone)]
pub struct ConverterRegistry {
    converters: HashMap<ScalarKind, Arc<dyn ValueConverter>>,
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        let mut converters: HashMap<ScalarKind, Arc<dyn ValueConverter>> = HashMap::new();
        converters.insert(ScalarKind::Bool, Arc::new(BoolConverter));
        converters.insert(ScalarKind::Int32, Arc::new(IntegerConverter));
        converters.insert(ScalarKind::Int64, Arc::new(IntegerConverter));
        converters.insert(ScalarKind::Float, Arc::new(FloatConverter));
        converters.insert(ScalarKind::Str, Arc::new(StringConverter));
        converters.insert(ScalarKind::DateTime, Arc::new(DateTimeConverter));
        Self { converters }
    }
}

impl std::fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<&str> = self.converters.keys().map(|k| k.as_str()).collect();
        kinds.sort_unstable();
        f.debug_struct("ConverterRegistry").field("kinds", &kinds).finish()
    }
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the default converter for `kind`.
    pub fn register(&mut self, kind: ScalarKind, converter: Arc<dyn ValueConverter>) -> &mut Self {
        self.converters.insert(kind, converter);
        self
    }

    pub fn get(&self, kind: ScalarKind) -> Option<&Arc<dyn ValueConverter>> {
        self.converters.get(&kind)
    }

    /// Serializes `value` with `field_override` if present, else the
    /// registered converter for `kind`.
    pub fn encode(
        &self,
        kind: ScalarKind,
        field_override: Option<&Arc<dyn ValueConverter>>,
        value: &Scalar,
    ) -> Result<JsonValue, ConversionError> {
        if value.is_null() {
            return Ok(JsonValue::Null);
        }
        match field_override.or_else(|| self.get(kind)) {
            Some(converter) => converter.serialize(value),
            None => Err(wrong_scalar(kind, value)),
        }
    }

    pub fn decode(
        &self,
        kind: ScalarKind,
        field_override: Option<&Arc<dyn ValueConverter>>,
        value: &JsonValue,
    ) -> Result<Scalar, ConversionError> {
        if value.is_null() {
            return Ok(Scalar::Null);
        }
        match field_override.or_else(|| self.get(kind)) {
            Some(converter) => converter.deserialize(value, kind),
            None => Err(shape(kind, value)),
        }
    }
}
