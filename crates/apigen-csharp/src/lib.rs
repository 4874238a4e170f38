pub mod generator;
pub mod language;
pub mod renderer;

pub use generator::CSharpGenerator;
pub use language::CSharpLanguage;
pub use renderer::CSharpRenderer;
