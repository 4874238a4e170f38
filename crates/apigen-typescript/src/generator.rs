use apigen_core::config::ApigenConfig;
use apigen_core::error::GenerateError;
use apigen_core::parse::spec::OpenApiDocument;
use apigen_core::{ClientGenerator, CodeGenerator, GeneratedFile};
use log::debug;

use crate::language::TypeScriptLanguage;
use crate::renderer::TypeScriptRenderer;

/// TypeScript client code generator. Emits a single module.
pub struct TypeScriptGenerator;

impl CodeGenerator for TypeScriptGenerator {
    type Config = ApigenConfig;
    type Error = GenerateError;

    fn generate(
        &self,
        document: &OpenApiDocument,
        config: &ApigenConfig,
    ) -> Result<Vec<GeneratedFile>, GenerateError> {
        let options = &config.typescript;
        let language = TypeScriptLanguage::from_options(options);
        let renderer = TypeScriptRenderer::new(&config.settings.type_naming, options.template)?;
        let artifacts =
            ClientGenerator::new(&config.settings, &language, &renderer).generate(document)?;

        let sources: Vec<&str> = artifacts.iter().map(|a| a.source.as_str()).collect();
        let content = renderer.render_file(&document.info.title, &document.info.version, &sources)?;
        debug!("typescript: {} artifacts in {}", artifacts.len(), options.file_name);

        Ok(vec![GeneratedFile {
            path: options.file_name.clone(),
            content,
        }])
    }
}
