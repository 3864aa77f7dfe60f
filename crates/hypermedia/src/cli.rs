//! Command-line tools for JSON:API documents.
//!
//! - `jsonapi-recase` — rewrite a document's member names to another naming
//!   strategy

use crate::document::Document;
use crate::error::Error;
use crate::naming::FieldNaming;

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum CliError {
    Document(Error),
    UnknownNaming(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Document(e)      => write!(f, "{e}"),
            CliError::UnknownNaming(n) => write!(f, "Unknown naming strategy: {n} (expected none, camel, dash or snake)"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<Error> for CliError {
    fn from(e: Error) -> Self { CliError::Document(e) }
}

// ── jsonapi-recase ────────────────────────────────────────────────────────

/// Re-cases every attribute and relationship key of the document in `json`.
pub fn recase(json: &str, naming: &str) -> Result<String, CliError> {
    let naming = FieldNaming::parse(naming).ok_or_else(|| CliError::UnknownNaming(naming.to_string()))?;
    let mut document = Document::parse(json)?;
    document.recase(naming);
    Ok(document.to_string())
}
