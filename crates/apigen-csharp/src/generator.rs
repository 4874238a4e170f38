use apigen_core::config::{ApigenConfig, OutputLayout};
use apigen_core::error::GenerateError;
use apigen_core::parse::spec::OpenApiDocument;
use apigen_core::{ClientGenerator, CodeGenerator, GeneratedFile};
use log::debug;

use crate::language::CSharpLanguage;
use crate::renderer::{CSharpRenderer, FileHeader};

/// C# client code generator.
pub struct CSharpGenerator;

impl CodeGenerator for CSharpGenerator {
    type Config = ApigenConfig;
    type Error = GenerateError;

    fn generate(
        &self,
        document: &OpenApiDocument,
        config: &ApigenConfig,
    ) -> Result<Vec<GeneratedFile>, GenerateError> {
        let options = &config.csharp;
        let language = CSharpLanguage::from_options(options);
        let renderer = CSharpRenderer::new(&config.settings.type_naming)?;
        let artifacts =
            ClientGenerator::new(&config.settings, &language, &renderer).generate(document)?;

        let header = FileHeader {
            title: &document.info.title,
            version: &document.info.version,
            namespace: &options.namespace,
            nullable_reference_types: options.use_nullable_reference_types,
        };

        let files = match options.output {
            OutputLayout::Single => {
                let sources: Vec<&str> = artifacts.iter().map(|a| a.source.as_str()).collect();
                vec![GeneratedFile {
                    path: options.file_name.clone(),
                    content: renderer.render_file(&header, &sources)?,
                }]
            }
            OutputLayout::Multiple => {
                let mut files = Vec::with_capacity(artifacts.len());
                for artifact in &artifacts {
                    files.push(GeneratedFile {
                        path: format!("{}.cs", artifact.type_name),
                        content: renderer.render_file(&header, &[artifact.source.as_str()])?,
                    });
                }
                files
            }
        };
        debug!("csharp: {} files", files.len());
        Ok(files)
    }
}
