use std::collections::BTreeSet;

use log::{debug, info};

use crate::artifact::{ArtifactKind, ArtifactRenderer, CodeArtifact, UtilityModel};
use crate::config::{ClientNaming, GeneratorSettings};
use crate::error::GenerateError;
use crate::ingest::collect_operations;
use crate::language::TargetLanguage;
use crate::model::client::{client_class_name, exception_class_name, group_operations};
use crate::model::dto::build_dto_models;
use crate::model::{ClientModel, DtoModel, OperationContext, OperationModel};
use crate::naming::normalize_name;
use crate::parse::spec::OpenApiDocument;
use crate::schema::{SchemaRegistry, TypeResolver};

/// Everything one run decided, before rendering.
#[derive(Debug, Clone)]
pub struct GenerationModels {
    pub clients: Vec<ClientModel>,
    pub dtos: Vec<DtoModel>,
    pub utilities: Vec<UtilityModel>,
}

/// State owned by a single `generate` call.
struct GenerationRun<'doc, 'run> {
    document: &'doc OpenApiDocument,
    settings: &'run GeneratorSettings,
    resolver: TypeResolver<'doc, 'run>,
}

impl<'doc, 'run> GenerationRun<'doc, 'run> {
    fn build(mut self) -> Result<GenerationModels, GenerateError> {
        let sources = collect_operations(self.resolver.registry())?;
        let client_options = &self.settings.client;
        let groups = group_operations(sources, client_options.client_naming, &self.settings.common);

        let base_url = client_options
            .base_url
            .clone()
            .or_else(|| self.document.base_url().map(str::to_string));

        let mut clients = Vec::with_capacity(groups.len());
        for group in &groups {
            let class_name = client_class_name(client_options, &group.controller);
            let exception_class = exception_class_name(client_options, &group.controller);
            let ctx = OperationContext {
                client_class: &class_name,
                exception_class: &exception_class,
                common: &self.settings.common,
                client: client_options,
            };

            let mut operations = Vec::with_capacity(group.operations.len());
            for (name, source) in &group.operations {
                operations.push(OperationModel::build(source, name, &ctx, &mut self.resolver)?);
            }

            let description = match client_options.client_naming {
                ClientNaming::PerTag => self
                    .document
                    .tag_description(&group.controller)
                    .map(str::to_string),
                _ => None,
            };
            let controller_name = if group.controller.is_empty() {
                String::new()
            } else {
                normalize_name(&group.controller).pascal_case
            };
            let mut client = ClientModel {
                controller_name,
                interface_name: format!("I{class_name}"),
                class_name,
                uses_exception_class: operations.iter().any(|op| op.throws_exception),
                dispatches_on_payload: operations
                    .iter()
                    .flat_map(|op| &op.responses)
                    .any(|r| r.dispatches_on_payload),
                exception_class,
                description,
                base_url: base_url.clone(),
                operations,
                generate_interface: false,
            };
            client.generate_interface =
                client_options.generate_client_interfaces && client.has_public_operations();
            debug!(
                "client {} with {} operations",
                client.class_name,
                client.operations.len()
            );
            clients.push(client);
        }

        let dtos = build_dto_models(&mut self.resolver)?;
        let utilities = self.utilities(&clients);

        Ok(GenerationModels {
            clients,
            dtos,
            utilities,
        })
    }

    fn utilities(&self, clients: &[ClientModel]) -> Vec<UtilityModel> {
        let naming = &self.settings.type_naming;
        let operations = || clients.iter().flat_map(|c| c.operations.iter());

        let mut utilities = Vec::new();
        if operations().any(|op| op.parameters.iter().any(|p| p.is_file)) {
            utilities.push(UtilityModel::FileParameter {
                name: naming.file_parameter_type.clone(),
            });
        }
        if operations().any(|op| op.responses.iter().any(|r| r.is_file)) {
            utilities.push(UtilityModel::FileResponse {
                name: naming.file_response_type.clone(),
            });
        }
        if self.settings.common.wrap_responses && operations().next().is_some() {
            utilities.push(UtilityModel::ResponseEnvelope {
                name: naming.response_envelope_type.clone(),
            });
        }
        let exceptions: BTreeSet<&str> = clients
            .iter()
            .filter(|c| c.uses_exception_class)
            .map(|c| c.exception_class.as_str())
            .collect();
        utilities.extend(exceptions.into_iter().map(|name| UtilityModel::Exception {
            name: name.to_string(),
        }));
        utilities
    }
}

/// Walks a document and emits one ordered artifact list per target.
pub struct ClientGenerator<'a> {
    settings: &'a GeneratorSettings,
    language: &'a dyn TargetLanguage,
    renderer: &'a dyn ArtifactRenderer,
}

impl<'a> ClientGenerator<'a> {
    pub fn new(
        settings: &'a GeneratorSettings,
        language: &'a dyn TargetLanguage,
        renderer: &'a dyn ArtifactRenderer,
    ) -> Self {
        Self {
            settings,
            language,
            renderer,
        }
    }

    /// Build the models of a run without rendering them.
    ///
    /// The document is validated first, so a dangling reference fails the
    /// run before any model exists.
    pub fn build_models(
        &self,
        document: &OpenApiDocument,
    ) -> Result<GenerationModels, GenerateError> {
        let registry = SchemaRegistry::new(document);
        registry.validate()?;
        let run = GenerationRun {
            document,
            settings: self.settings,
            resolver: TypeResolver::new(registry, self.language, &self.settings.type_naming),
        };
        run.build()
    }

    /// Artifacts in emission order: per client the interface then the
    /// implementation, then schema types bases first, then utilities.
    pub fn generate(
        &self,
        document: &OpenApiDocument,
    ) -> Result<Vec<CodeArtifact>, GenerateError> {
        let models = self.build_models(document)?;
        let language = self.language.tag();
        let mut artifacts = Vec::new();

        for client in &models.clients {
            if client.generate_interface {
                artifacts.push(CodeArtifact {
                    type_name: client.interface_name.clone(),
                    kind: ArtifactKind::Interface,
                    language,
                    source: self.renderer.render_client_interface(client)?,
                });
            }
            artifacts.push(CodeArtifact {
                type_name: client.class_name.clone(),
                kind: ArtifactKind::Class,
                language,
                source: self.renderer.render_client(client)?,
            });
        }
        for dto in &models.dtos {
            artifacts.push(CodeArtifact {
                type_name: dto.name.clone(),
                kind: ArtifactKind::Contract,
                language,
                source: self.renderer.render_dto(dto)?,
            });
        }
        for utility in &models.utilities {
            artifacts.push(CodeArtifact {
                type_name: utility.name().to_string(),
                kind: ArtifactKind::Utility,
                language,
                source: self.renderer.render_utility(utility)?,
            });
        }

        info!(
            "{language}: {} clients, {} types, {} artifacts",
            models.clients.len(),
            models.dtos.len(),
            artifacts.len()
        );
        Ok(artifacts)
    }
}
