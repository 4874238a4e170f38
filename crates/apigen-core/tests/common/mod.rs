#![allow(dead_code)]

use apigen_core::config::{GeneratorSettings, TypeNamingOptions};
use apigen_core::error::{GenerateError, RenderError};
use apigen_core::language::apply_template;
use apigen_core::model::{ClientModel, DtoModel};
use apigen_core::parse;
use apigen_core::schema::{Primitive, TypeRef};
use apigen_core::{ArtifactRenderer, ClientGenerator, CodeArtifact, GenerationModels};
use apigen_core::{TargetLanguage, TypeUsage};

/// Small target with readable type names, so tests can assert on them.
#[derive(Default)]
pub struct Sketch {
    pub leaf_types: bool,
}

impl TargetLanguage for Sketch {
    fn tag(&self) -> &'static str {
        "sketch"
    }

    fn render_type(&self, ty: &TypeRef, usage: TypeUsage, naming: &TypeNamingOptions) -> String {
        match ty {
            TypeRef::Primitive(p) => match p {
                Primitive::Int32 | Primitive::Int64 => "int",
                Primitive::Double | Primitive::Float | Primitive::Decimal => "float",
                Primitive::Boolean => "bool",
                Primitive::Date | Primitive::DateTime => "date",
                _ => "string",
            }
            .to_string(),
            TypeRef::Array(inner) => {
                let element = self.render_type(inner, usage, naming);
                let template = match usage {
                    TypeUsage::Response => naming.response_array_type.as_deref().unwrap_or("Seq<%T%>"),
                    TypeUsage::Parameter => naming.parameter_array_type.as_deref().unwrap_or("Iter<%T%>"),
                    TypeUsage::Property => naming.array_type.as_deref().unwrap_or("List<%T%>"),
                };
                apply_template(template, &element)
            }
            TypeRef::Map(inner) => format!("Map<{}>", self.render_type(inner, usage, naming)),
            TypeRef::Class(name) | TypeRef::Enum(name) => name.clone(),
            TypeRef::Union(members) => members
                .iter()
                .map(|m| self.render_type(m, usage, naming))
                .collect::<Vec<_>>()
                .join(" | "),
            TypeRef::Nullable(inner) => format!("{}?", self.render_type(inner, usage, naming)),
            TypeRef::Binary => match usage {
                TypeUsage::Parameter => naming.file_parameter_type.clone(),
                TypeUsage::Response => naming.file_response_type.clone(),
                TypeUsage::Property => "bytes".to_string(),
            },
            TypeRef::Any => "any".to_string(),
        }
    }

    fn supports_union_syntax(&self) -> bool {
        true
    }

    fn use_leaf_types(&self) -> bool {
        self.leaf_types
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["class", "default"]
    }

    fn keyword_escape(&self) -> &'static str {
        "@"
    }

    fn property_identifier(&self, name: &str) -> String {
        name.to_string()
    }

    fn method_name(&self, operation: &str) -> String {
        operation.to_string()
    }

    fn async_type(&self, result: Option<&str>) -> String {
        format!("Async<{}>", result.unwrap_or("void"))
    }

    fn envelope_type(&self, envelope: &str, result: Option<&str>) -> String {
        format!("{envelope}<{}>", result.unwrap_or("void"))
    }

    fn universal_type(&self) -> &'static str {
        "any"
    }

    fn universal_exception_type(&self) -> &'static str {
        "Failure"
    }

    fn format_default(&self, value: &serde_json::Value, _: &TypeRef) -> Option<String> {
        Some(value.to_string())
    }

    fn declare_parameter(
        &self,
        type_name: &str,
        variable_name: &str,
        optional: bool,
        default_literal: Option<&str>,
    ) -> String {
        match (optional, default_literal) {
            (true, Some(default)) => format!("{variable_name}: {type_name} = {default}"),
            (true, None) => format!("{variable_name}?: {type_name}"),
            (false, _) => format!("{variable_name}: {type_name}"),
        }
    }
}

/// Renders one line per member, enough to tell artifacts apart.
pub struct Outline;

impl ArtifactRenderer for Outline {
    fn render_client_interface(&self, client: &ClientModel) -> Result<String, RenderError> {
        let mut out = format!("interface {}\n", client.interface_name);
        for op in client.public_operations() {
            out.push_str(&format!("  {}\n", op.method_name));
        }
        Ok(out)
    }

    fn render_client(&self, client: &ClientModel) -> Result<String, RenderError> {
        let mut out = format!("class {}\n", client.class_name);
        for op in &client.operations {
            let params: Vec<&str> = op.parameters.iter().map(|p| p.declaration.as_str()).collect();
            out.push_str(&format!(
                "  {}({}) -> {} throws {}\n",
                op.method_name,
                params.join(", "),
                op.async_result_type,
                op.exception_type
            ));
        }
        Ok(out)
    }

    fn render_dto(&self, dto: &DtoModel) -> Result<String, RenderError> {
        let mut out = match &dto.base {
            Some(base) => format!("type {} : {base}\n", dto.name),
            None => format!("type {}\n", dto.name),
        };
        for prop in &dto.properties {
            out.push_str(&format!("  {}: {}\n", prop.name, prop.type_name));
        }
        for value in &dto.enum_values {
            out.push_str(&format!("  {} = {}\n", value.name, value.literal));
        }
        Ok(out)
    }

    fn render_utility(&self, utility: &apigen_core::UtilityModel) -> Result<String, RenderError> {
        Ok(format!("utility {}\n", utility.name()))
    }
}

pub fn generate(
    yaml: &str,
    settings: &GeneratorSettings,
) -> Result<Vec<CodeArtifact>, GenerateError> {
    let doc = parse::from_yaml(yaml).unwrap();
    let language = Sketch::default();
    ClientGenerator::new(settings, &language, &Outline).generate(&doc)
}

pub fn models(yaml: &str, settings: &GeneratorSettings) -> GenerationModels {
    models_with(yaml, settings, &Sketch::default())
}

pub fn models_with(
    yaml: &str,
    settings: &GeneratorSettings,
    language: &Sketch,
) -> GenerationModels {
    let doc = parse::from_yaml(yaml).unwrap();
    ClientGenerator::new(settings, language, &Outline)
        .build_models(&doc)
        .unwrap()
}
