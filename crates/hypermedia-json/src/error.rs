use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum JsonError {
    #[error("Invalid JSON at position {0}")]
    Invalid(usize),

    #[error("Invalid UTF-8")]
    InvalidUtf8,

    #[error("Invalid object key")]
    InvalidKey,

    #[error("Unexpected trailing characters at position {0}")]
    TrailingCharacters(usize),

    #[error("Nesting too deep at position {0}")]
    TooDeep(usize),

    #[error("Invalid string escape: {0}")]
    Escape(String),
}

impl From<serde_json::Error> for JsonError {
    fn from(err: serde_json::Error) -> Self {
        JsonError::Escape(err.to_string())
    }
}
