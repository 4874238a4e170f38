pub mod artifact;
pub mod config;
pub mod error;
pub mod generator;
pub mod ingest;
pub mod language;
pub mod model;
pub mod naming;
pub mod parse;
pub mod schema;

pub use artifact::{ArtifactKind, ArtifactRenderer, CodeArtifact, UtilityModel};
pub use generator::{ClientGenerator, GenerationModels};
pub use language::{TargetLanguage, TypeUsage};

/// A generated file with path and content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}

/// Trait for code generators that produce files from an OpenAPI document.
pub trait CodeGenerator {
    type Config;
    type Error: std::error::Error;
    fn generate(
        &self,
        document: &parse::spec::OpenApiDocument,
        config: &Self::Config,
    ) -> Result<Vec<GeneratedFile>, Self::Error>;
}
