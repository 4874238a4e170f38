pub mod generator;
pub mod language;
pub mod renderer;

pub use generator::TypeScriptGenerator;
pub use language::TypeScriptLanguage;
pub use renderer::TypeScriptRenderer;
