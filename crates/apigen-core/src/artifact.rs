use serde::Serialize;

use crate::error::RenderError;
use crate::model::{ClientModel, DtoModel};

/// What an artifact declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ArtifactKind {
    /// Client implementation.
    Class,
    /// Client interface.
    Interface,
    /// Schema type.
    Contract,
    /// Support type the clients depend on.
    Utility,
}

/// One named, rendered unit of generated code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeArtifact {
    pub type_name: String,
    pub kind: ArtifactKind,
    pub language: &'static str,
    pub source: String,
}

/// Support types emitted only when something uses them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UtilityModel {
    FileParameter { name: String },
    FileResponse { name: String },
    ResponseEnvelope { name: String },
    Exception { name: String },
}

impl UtilityModel {
    pub fn name(&self) -> &str {
        match self {
            Self::FileParameter { name }
            | Self::FileResponse { name }
            | Self::ResponseEnvelope { name }
            | Self::Exception { name } => name,
        }
    }
}

/// Turns models into source text for one target language.
pub trait ArtifactRenderer {
    fn render_client_interface(&self, client: &ClientModel) -> Result<String, RenderError>;
    fn render_client(&self, client: &ClientModel) -> Result<String, RenderError>;
    fn render_dto(&self, dto: &DtoModel) -> Result<String, RenderError>;
    fn render_utility(&self, utility: &UtilityModel) -> Result<String, RenderError>;
}
