use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("circular reference detected: {0}")]
    CircularRef(String),

    #[error("invalid reference format: {0}")]
    InvalidRefFormat(String),

    #[error("reference target not found: {0}")]
    RefTargetNotFound(String),
}

/// Failure while turning a model into source text.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

#[derive(Debug, Error)]
pub enum GenerateError {
    /// The document violates a rule the generated client relies on.
    #[error("invalid operation {operation}: {rule}")]
    Configuration { operation: String, rule: String },

    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),
}

impl GenerateError {
    pub fn configuration(operation: impl Into<String>, rule: impl Into<String>) -> Self {
        Self::Configuration {
            operation: operation.into(),
            rule: rule.into(),
        }
    }
}
