pub mod components;
pub mod media_type;
pub mod operation;
pub mod parameter;
pub mod request_body;
pub mod response;
pub mod schema;
pub mod security;
pub mod server;
pub mod spec;

use crate::error::ParseError;
use spec::OpenApiDocument;

/// Parse an OpenAPI document from YAML.
pub fn from_yaml(input: &str) -> Result<OpenApiDocument, ParseError> {
    let document: OpenApiDocument = serde_yaml_ng::from_str(input)?;
    validate_version(&document)?;
    Ok(document)
}

/// Parse an OpenAPI document from JSON.
pub fn from_json(input: &str) -> Result<OpenApiDocument, ParseError> {
    let document: OpenApiDocument = serde_json::from_str(input)?;
    validate_version(&document)?;
    Ok(document)
}

/// Parse a document, picking the format from the first non-blank character.
pub fn from_str(input: &str) -> Result<OpenApiDocument, ParseError> {
    if input.trim_start().starts_with('{') {
        from_json(input)
    } else {
        from_yaml(input)
    }
}

fn validate_version(document: &OpenApiDocument) -> Result<(), ParseError> {
    if !document.openapi.starts_with("3.") {
        return Err(ParseError::UnsupportedVersion(document.openapi.clone()));
    }
    Ok(())
}
