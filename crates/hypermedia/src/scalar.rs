//! Scalar values carried by attribute and backing-field accessors.

use chrono::{DateTime, Utc};

use crate::error::ConversionError;

/// The primitive kind a field stores. Converters are registered per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Int32,
    Int64,
    Float,
    Str,
    DateTime,
}

impl ScalarKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Float => "float",
            Self::Str => "string",
            Self::DateTime => "date-time",
        }
    }
}

impl std::fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A type-erased field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float(f64),
    Str(String),
    DateTime(DateTime<Utc>),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    pub fn kind(&self) -> Option<ScalarKind> {
        match self {
            Scalar::Null => None,
            Scalar::Bool(_) => Some(ScalarKind::Bool),
            Scalar::Int32(_) => Some(ScalarKind::Int32),
            Scalar::Int64(_) => Some(ScalarKind::Int64),
            Scalar::Float(_) => Some(ScalarKind::Float),
            Scalar::Str(_) => Some(ScalarKind::Str),
            Scalar::DateTime(_) => Some(ScalarKind::DateTime),
        }
    }

    /// Renders the value the way it appears in resource ids and link
    /// templates. `Null` has no text form.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Scalar::Null => None,
            Scalar::Bool(b) => Some(b.to_string()),
            Scalar::Int32(i) => Some(i.to_string()),
            Scalar::Int64(i) => Some(i.to_string()),
            Scalar::Float(f) => Some(f.to_string()),
            Scalar::Str(s) => Some(s.clone()),
            Scalar::DateTime(dt) => Some(crate::converter::format_date_time(dt)),
        }
    }

    /// Parses a resource id (always text on the wire) into `kind`.
    pub fn parse_id(kind: ScalarKind, text: &str) -> Result<Scalar, ConversionError> {
        let invalid = || ConversionError::OutOfRange {
            kind,
            value: text.to_owned(),
        };
        match kind {
            ScalarKind::Str => Ok(Scalar::Str(text.to_owned())),
            ScalarKind::Int32 => text.parse().map(Scalar::Int32).map_err(|_| invalid()),
            ScalarKind::Int64 => text.parse().map(Scalar::Int64).map_err(|_| invalid()),
            ScalarKind::Float => text.parse().map(Scalar::Float).map_err(|_| invalid()),
            ScalarKind::Bool => text.parse().map(Scalar::Bool).map_err(|_| invalid()),
            ScalarKind::DateTime => crate::converter::parse_date_time(text).map(Scalar::DateTime),
        }
    }
}

/// Rust types that can back a field.
///
/// `from_absent` is what a backing field receives when a relationship is
/// explicitly `null`: `None` for optional types and `Default` otherwise.
pub trait ScalarType: Sized + 'static {
    const KIND: ScalarKind;
    const NULLABLE: bool = false;

    fn into_scalar(self) -> Scalar;
    fn from_scalar(value: Scalar) -> Result<Self, ConversionError>;
    fn from_absent() -> Self;
}

fn mismatch(kind: ScalarKind, found: &Scalar) -> ConversionError {
    match found {
        Scalar::Null => ConversionError::UnexpectedNull { kind },
        other => ConversionError::UnexpectedShape {
            expected: kind.as_str(),
            found: other.kind().map_or("null", ScalarKind::as_str),
        },
    }
}

impl ScalarType for bool {
    const KIND: ScalarKind = ScalarKind::Bool;
    fn into_scalar(self) -> Scalar {
        Scalar::Bool(self)
    }
    fn from_scalar(value: Scalar) -> Result<Self, ConversionError> {
        match value {
            Scalar::Bool(b) => Ok(b),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }
    fn from_absent() -> Self {
        false
    }
}

impl ScalarType for i32 {
    const KIND: ScalarKind = ScalarKind::Int32;
    fn into_scalar(self) -> Scalar {
        Scalar::Int32(self)
    }
    fn from_scalar(value: Scalar) -> Result<Self, ConversionError> {
        match value {
            Scalar::Int32(i) => Ok(i),
            Scalar::Int64(i) => i32::try_from(i).map_err(|_| ConversionError::OutOfRange {
                kind: Self::KIND,
                value: i.to_string(),
            }),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }
    fn from_absent() -> Self {
        0
    }
}

impl ScalarType for i64 {
    const KIND: ScalarKind = ScalarKind::Int64;
    fn into_scalar(self) -> Scalar {
        Scalar::Int64(self)
    }
    fn from_scalar(value: Scalar) -> Result<Self, ConversionError> {
        match value {
            Scalar::Int64(i) => Ok(i),
            Scalar::Int32(i) => Ok(i64::from(i)),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }
    fn from_absent() -> Self {
        0
    }
}

impl ScalarType for f64 {
    const KIND: ScalarKind = ScalarKind::Float;
    fn into_scalar(self) -> Scalar {
        Scalar::Float(self)
    }
    fn from_scalar(value: Scalar) -> Result<Self, ConversionError> {
        match value {
            Scalar::Float(f) => Ok(f),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }
    fn from_absent() -> Self {
        0.0
    }
}

impl ScalarType for f32 {
    const KIND: ScalarKind = ScalarKind::Float;
    fn into_scalar(self) -> Scalar {
        Scalar::Float(f64::from(self))
    }
    fn from_scalar(value: Scalar) -> Result<Self, ConversionError> {
        match value {
            Scalar::Float(f) if f.is_finite() && f.abs() > f64::from(f32::MAX) => {
                Err(ConversionError::OutOfRange {
                    kind: Self::KIND,
                    value: f.to_string(),
                })
            }
            Scalar::Float(f) => Ok(f as f32),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }
    fn from_absent() -> Self {
        0.0
    }
}

impl ScalarType for String {
    const KIND: ScalarKind = ScalarKind::Str;
    fn into_scalar(self) -> Scalar {
        Scalar::Str(self)
    }
    fn from_scalar(value: Scalar) -> Result<Self, ConversionError> {
        match value {
            Scalar::Str(s) => Ok(s),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }
    fn from_absent() -> Self {
        String::new()
    }
}

impl ScalarType for DateTime<Utc> {
    const KIND: ScalarKind = ScalarKind::DateTime;
    fn into_scalar(self) -> Scalar {
        Scalar::DateTime(self)
    }
    fn from_scalar(value: Scalar) -> Result<Self, ConversionError> {
        match value {
            Scalar::DateTime(dt) => Ok(dt),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }
    fn from_absent() -> Self {
        DateTime::<Utc>::default()
    }
}

impl<T: ScalarType> ScalarType for Option<T> {
    const KIND: ScalarKind = T::KIND;
    const NULLABLE: bool = true;

    fn into_scalar(self) -> Scalar {
        self.map_or(Scalar::Null, T::into_scalar)
    }
    fn from_scalar(value: Scalar) -> Result<Self, ConversionError> {
        match value {
            Scalar::Null => Ok(None),
            other => T::from_scalar(other).map(Some),
        }
    }
    fn from_absent() -> Self {
        None
    }
}
