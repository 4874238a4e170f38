//! Flattens OpenAPI operations into plain descriptors.
//!
//! Everything downstream of this module sees parameters and responses as
//! [`ParameterDescriptor`] and [`ResponseDescriptor`] values, whatever
//! shape they had in the document.

use crate::error::ResolveError;
use crate::model::parameter::ParameterKind;
use crate::parse::media_type::is_form_content_type;
use crate::parse::operation::{HttpMethod, Operation, PathItem};
use crate::parse::parameter::{Parameter, ParameterLocation};
use crate::parse::schema::SchemaOrRef;
use crate::parse::security::SecurityRequirement;
use crate::schema::SchemaRegistry;

/// Raw metadata of one parameter.
#[derive(Debug, Clone, Default)]
pub struct ParameterDescriptor<'doc> {
    pub name: String,
    /// Location declared in the document, if any.
    pub explicit_kind: Option<ParameterKind>,
    pub is_body: bool,
    pub schema: Option<&'doc SchemaOrRef>,
    pub required: bool,
    pub nullable: bool,
    pub default_value: Option<serde_json::Value>,
    pub description: Option<String>,
    pub content_type: Option<String>,
}

/// One payload declaration for a status code. A code may appear more than once.
#[derive(Debug, Clone, Default)]
pub struct ResponseDescriptor<'doc> {
    pub status_code: String,
    pub schema: Option<&'doc SchemaOrRef>,
    /// Description of this payload declaration.
    pub description: Option<String>,
    /// Description of the response object the declaration belongs to.
    pub response_description: Option<String>,
    pub content_type: Option<String>,
    pub nullable: bool,
}

/// An operation with its descriptors, ready for model construction.
#[derive(Debug, Clone)]
pub struct OperationSource<'doc> {
    pub method: HttpMethod,
    pub path: &'doc str,
    pub operation: &'doc Operation,
    pub parameters: Vec<ParameterDescriptor<'doc>>,
    pub responses: Vec<ResponseDescriptor<'doc>>,
    /// Effective requirements: the operation's, else the document's.
    pub security: &'doc [SecurityRequirement],
}

impl OperationSource<'_> {
    /// `operationId (METHOD /path)`, used in error messages.
    pub fn label(&self) -> String {
        match &self.operation.operation_id {
            Some(id) => format!("{id} ({} {})", self.method, self.path),
            None => format!("{} {}", self.method, self.path),
        }
    }
}

/// Every operation of the document, in path then method order.
pub fn collect_operations<'doc>(
    registry: &SchemaRegistry<'doc>,
) -> Result<Vec<OperationSource<'doc>>, ResolveError> {
    let document = registry.document();
    let mut sources = Vec::new();
    for (path, item) in &document.paths {
        for (method, operation) in item.operations() {
            sources.push(OperationSource {
                method,
                path,
                operation,
                parameters: parameter_descriptors(registry, item, operation)?,
                responses: response_descriptors(registry, operation)?,
                security: operation
                    .security
                    .as_deref()
                    .unwrap_or(document.security.as_slice()),
            });
        }
    }
    Ok(sources)
}

/// Path-item parameters merged with the operation's, which override them
/// by name and location. The request body follows the parameters.
pub fn parameter_descriptors<'doc>(
    registry: &SchemaRegistry<'doc>,
    item: &'doc PathItem,
    operation: &'doc Operation,
) -> Result<Vec<ParameterDescriptor<'doc>>, ResolveError> {
    let mut merged: Vec<&'doc Parameter> = Vec::new();
    for param in item.parameters.iter().chain(&operation.parameters) {
        let param = registry.parameter(param)?;
        match merged
            .iter_mut()
            .find(|p| p.name == param.name && p.location == param.location)
        {
            Some(existing) => *existing = param,
            None => merged.push(param),
        }
    }

    let mut descriptors = Vec::with_capacity(merged.len() + 1);
    for param in merged {
        descriptors.push(from_parameter(registry, param)?);
    }

    if let Some(body) = &operation.request_body {
        let body = registry.request_body(body)?;
        if let Some((content_type, media)) = body.preferred_content() {
            let form_fields = match &media.schema {
                Some(schema) if is_form_content_type(content_type) => {
                    let resolved = registry.resolve(schema)?.schema;
                    (!resolved.properties.is_empty()).then_some(resolved)
                }
                _ => None,
            };
            match form_fields {
                Some(object) => {
                    for (name, schema) in &object.properties {
                        descriptors.push(ParameterDescriptor {
                            name: name.clone(),
                            explicit_kind: Some(ParameterKind::FormData),
                            schema: Some(schema),
                            required: object.required.contains(name),
                            default_value: default_of(registry, schema)?,
                            description: description_of(registry, schema)?,
                            content_type: Some(content_type.to_string()),
                            ..Default::default()
                        });
                    }
                }
                None => {
                    let is_file = match &media.schema {
                        Some(schema) => registry.resolve(schema)?.schema.is_binary(),
                        None => false,
                    };
                    descriptors.push(ParameterDescriptor {
                        name: body.x_name.clone().unwrap_or_else(|| "body".to_string()),
                        explicit_kind: None,
                        // Raw files are uploaded as multipart form data.
                        is_body: !is_file,
                        schema: media.schema.as_ref(),
                        required: body.required,
                        nullable: false,
                        default_value: None,
                        description: body.description.clone(),
                        content_type: Some(if is_file {
                            "multipart/form-data".to_string()
                        } else {
                            content_type.to_string()
                        }),
                    });
                }
            }
        }
    }

    Ok(descriptors)
}

fn from_parameter<'doc>(
    registry: &SchemaRegistry<'doc>,
    param: &'doc Parameter,
) -> Result<ParameterDescriptor<'doc>, ResolveError> {
    let (explicit_kind, is_body) = match param.location {
        ParameterLocation::Path => (Some(ParameterKind::Path), false),
        ParameterLocation::Query => (Some(ParameterKind::Query), false),
        ParameterLocation::Header => (Some(ParameterKind::Header), false),
        ParameterLocation::Cookie => (Some(ParameterKind::Cookie), false),
        ParameterLocation::FormData => (Some(ParameterKind::FormData), false),
        ParameterLocation::Body => (None, true),
    };
    let (default_value, schema_description) = match &param.schema {
        Some(schema) => (
            default_of(registry, schema)?,
            description_of(registry, schema)?,
        ),
        None => (None, None),
    };
    Ok(ParameterDescriptor {
        name: param.name.clone(),
        explicit_kind,
        is_body,
        schema: param.schema.as_ref(),
        required: param.required || param.location == ParameterLocation::Path,
        nullable: param.x_nullable.unwrap_or(false),
        default_value,
        description: param.description.clone().or(schema_description),
        content_type: None,
    })
}

fn default_of<'doc>(
    registry: &SchemaRegistry<'doc>,
    schema: &'doc SchemaOrRef,
) -> Result<Option<serde_json::Value>, ResolveError> {
    Ok(registry.resolve(schema)?.schema.default_value.clone())
}

fn description_of<'doc>(
    registry: &SchemaRegistry<'doc>,
    schema: &'doc SchemaOrRef,
) -> Result<Option<String>, ResolveError> {
    Ok(registry.resolve(schema)?.schema.description.clone())
}

/// One descriptor per declared payload. `x-expectedSchemas` entries expand
/// into several descriptors sharing a status code.
pub fn response_descriptors<'doc>(
    registry: &SchemaRegistry<'doc>,
    operation: &'doc Operation,
) -> Result<Vec<ResponseDescriptor<'doc>>, ResolveError> {
    let mut descriptors = Vec::new();
    for (status_code, response) in &operation.responses {
        let response = registry.response(response)?;
        let (content_type, schema) = match response.preferred_content() {
            Some((ct, media)) => (Some(ct.to_string()), media.schema.as_ref()),
            None => (None, None),
        };
        let description = (!response.description.is_empty()).then(|| response.description.clone());
        let nullable = response.x_nullable.unwrap_or(false);

        if response.x_expected_schemas.is_empty() {
            descriptors.push(ResponseDescriptor {
                status_code: status_code.clone(),
                schema,
                description: description.clone(),
                response_description: description,
                content_type,
                nullable,
            });
        } else {
            for expected in &response.x_expected_schemas {
                descriptors.push(ResponseDescriptor {
                    status_code: status_code.clone(),
                    schema: Some(&expected.schema),
                    description: expected.description.clone().or_else(|| description.clone()),
                    response_description: description.clone(),
                    content_type: content_type.clone(),
                    nullable,
                });
            }
        }
    }
    Ok(descriptors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    const DOC: &str = r##"
openapi: "3.0.3"
info: { title: Ingest, version: "1" }
paths:
  /pets/{petId}:
    parameters:
      - { name: petId, in: path, schema: { type: string } }
      - { name: trace, in: header, schema: { type: string } }
    put:
      operationId: updatePet
      parameters:
        - { name: trace, in: header, required: true, schema: { type: string } }
        - { name: limit, in: query, schema: { $ref: "#/components/schemas/Limit" } }
      requestBody:
        x-name: pet
        required: true
        content:
          application/json:
            schema: { $ref: "#/components/schemas/Pet" }
      responses:
        "200": { description: ok }
        "404":
          description: not found
          x-expectedSchemas:
            - schema: { $ref: "#/components/schemas/Pet" }
            - description: other
              schema: { type: string }
  /upload:
    post:
      requestBody:
        content:
          multipart/form-data:
            schema:
              type: object
              required: [file]
              properties:
                file: { type: string, format: binary }
                note: { type: string }
      responses:
        "204": { description: done }
  /raw:
    post:
      requestBody:
        content:
          application/octet-stream:
            schema: { type: string, format: binary }
      responses:
        "204": { description: done }
security:
  - apiKey: []
components:
  schemas:
    Pet: { type: object, properties: { name: { type: string } } }
    Limit: { type: integer, default: 20, description: page size }
"##;

    fn sources() -> (parse::spec::OpenApiDocument, usize) {
        let doc = parse::from_yaml(DOC).unwrap();
        let count = doc.paths.len();
        (doc, count)
    }

    #[test]
    fn operation_parameters_override_path_item() {
        let (doc, _) = sources();
        let registry = SchemaRegistry::new(&doc);
        let ops = collect_operations(&registry).unwrap();
        let params = &ops[0].parameters;
        let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["petId", "trace", "limit", "pet"]);
        assert!(params[1].required, "operation-level header wins");
        assert!(params[0].required, "path parameters are always required");
        assert!(params[3].is_body);
    }

    #[test]
    fn referenced_schema_defaults_are_read() {
        let (doc, _) = sources();
        let registry = SchemaRegistry::new(&doc);
        let ops = collect_operations(&registry).unwrap();
        let limit = &ops[0].parameters[2];
        assert_eq!(limit.default_value, Some(serde_json::json!(20)));
        assert_eq!(limit.description.as_deref(), Some("page size"));
    }

    #[test]
    fn expected_schemas_expand_to_repeated_codes() {
        let (doc, _) = sources();
        let registry = SchemaRegistry::new(&doc);
        let ops = collect_operations(&registry).unwrap();
        let codes: Vec<&str> = ops[0]
            .responses
            .iter()
            .map(|r| r.status_code.as_str())
            .collect();
        assert_eq!(codes, vec!["200", "404", "404"]);
        assert_eq!(ops[0].responses[2].description.as_deref(), Some("other"));
        assert_eq!(ops[0].responses[1].description.as_deref(), Some("not found"));
    }

    #[test]
    fn multipart_bodies_become_form_fields() {
        let (doc, _) = sources();
        let registry = SchemaRegistry::new(&doc);
        let ops = collect_operations(&registry).unwrap();
        let upload = &ops[1].parameters;
        assert_eq!(upload.len(), 2);
        assert!(upload.iter().all(|p| p.explicit_kind == Some(ParameterKind::FormData)));
        assert!(upload[0].required);
        assert!(!upload[1].required);
    }

    #[test]
    fn raw_binary_body_is_not_a_json_body() {
        let (doc, _) = sources();
        let registry = SchemaRegistry::new(&doc);
        let ops = collect_operations(&registry).unwrap();
        let raw = &ops[2].parameters[0];
        assert_eq!(raw.name, "body");
        assert!(!raw.is_body);
        assert_eq!(raw.content_type.as_deref(), Some("multipart/form-data"));
    }

    #[test]
    fn document_security_is_inherited() {
        let (doc, count) = sources();
        assert_eq!(count, 3);
        let registry = SchemaRegistry::new(&doc);
        let ops = collect_operations(&registry).unwrap();
        assert_eq!(ops[0].security.len(), 1);
        assert!(ops[0].security[0].contains_key("apiKey"));
        assert_eq!(ops[0].label(), "updatePet (PUT /pets/{petId})");
        assert_eq!(ops[1].label(), "POST /upload");
    }
}
