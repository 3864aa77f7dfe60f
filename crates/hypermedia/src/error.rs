use hypermedia_json::JsonError;
use thiserror::Error;

use crate::scalar::ScalarKind;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A scalar value could not be converted between its wire and typed forms.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("expected {expected}, found {found}")]
    UnexpectedShape {
        expected: &'static str,
        found: &'static str,
    },

    #[error("value {value} is out of range for {kind}")]
    OutOfRange { kind: ScalarKind, value: String },

    #[error("null is not allowed for non-nullable {kind}")]
    UnexpectedNull { kind: ScalarKind },

    #[error("invalid date-time: {0}")]
    InvalidDateTime(String),

    #[error("non-finite float has no JSON representation")]
    NonFinite,
}

/// A declaration rejected by [`crate::ContractBuilder::build`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractValidationError {
    #[error("resource type `{resource_type}` has no id field")]
    MissingId { resource_type: String },

    #[error("relationship `{resource_type}.{relationship}` names backing field `{field}`, which is not declared")]
    MissingBackingField {
        resource_type: String,
        relationship: String,
        field: String,
    },

    #[error("relationship `{resource_type}.{relationship}` names inverse `{inverse}`, which `{related_type}` does not declare")]
    MissingInverse {
        resource_type: String,
        relationship: String,
        related_type: String,
        inverse: String,
    },

    #[error("relationship `{resource_type}.{relationship}` declares an inverse but its related type `{type_name}` has no contract")]
    UnknownRelatedType {
        resource_type: String,
        relationship: String,
        type_name: &'static str,
    },

    #[error("resource type `{resource_type}` is declared for both `{first}` and `{second}`")]
    DuplicateResourceType {
        resource_type: String,
        first: &'static str,
        second: &'static str,
    },

    #[error("type `{type_name}` is declared more than once")]
    DuplicateType { type_name: &'static str },

    #[error("member `{member}` is declared more than once on `{resource_type}`")]
    DuplicateMember {
        resource_type: String,
        member: String,
    },
}

/// The wire document does not have the JSON:API shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("document must be a JSON object")]
    NotAnObject,

    #[error("document has no `data` member")]
    MissingData,

    #[error("`{0}` must be a JSON object")]
    ExpectedObject(String),

    #[error("`{0}` must be a JSON array")]
    ExpectedArray(String),

    #[error("resource object at `{0}` has no string `type`")]
    MissingType(String),

    #[error("resource object at `{0}` has an id that is neither a string nor an integer")]
    InvalidId(String),

    #[error("linkage at `{0}` must be null, a resource identifier or an array of them")]
    InvalidLinkage(String),

    #[error("relationship `{0}` has the wrong cardinality for its declaration")]
    CardinalityMismatch(String),

    #[error("link `{0}` must be a string or an object with `href`")]
    InvalidLink(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    ContractValidation(#[from] ContractValidationError),

    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),

    #[error("unknown resource type `{0}`")]
    UnknownResourceType(String),

    #[error("no contract is registered for `{0}`")]
    UnresolvedContract(&'static str),

    #[error("field `{field}`: {source}")]
    Conversion {
        field: String,
        #[source]
        source: ConversionError,
    },

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Json(#[from] JsonError),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl Error {
    pub(crate) fn conversion(field: impl Into<String>, source: ConversionError) -> Self {
        Error::Conversion {
            field: field.into(),
            source,
        }
    }
}
