use indexmap::IndexMap;
use log::debug;
use serde::Serialize;

use crate::config::{ClientOptions, CommonOptions};
use crate::error::GenerateError;
use crate::ingest::{OperationSource, ResponseDescriptor};
use crate::naming::{normalize_name, path_placeholders};
use crate::parse::operation::HttpMethod;
use crate::schema::TypeResolver;

use super::parameter::{ParameterKind, ParameterModel, order_parameters};
use super::response::{ResponseModel, primary_success_code};

/// Piece of a path template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PathPart {
    Literal { text: String },
    Parameter { name: String, variable_name: String },
}

/// Split a path template into literals and bound parameters.
pub fn path_parts(path: &str, parameters: &[ParameterModel]) -> Vec<PathPart> {
    let mut parts = Vec::new();
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        if start > 0 {
            parts.push(PathPart::Literal {
                text: rest[..start].to_string(),
            });
        }
        let name = &rest[start + 1..start + len];
        let variable_name = parameters
            .iter()
            .find(|p| p.kind == ParameterKind::Path && p.name.eq_ignore_ascii_case(name))
            .map(|p| p.variable_name.clone())
            .unwrap_or_else(|| name.to_string());
        parts.push(PathPart::Parameter {
            name: name.to_string(),
            variable_name,
        });
        rest = &rest[start + len + 1..];
    }
    if !rest.is_empty() {
        parts.push(PathPart::Literal {
            text: rest.to_string(),
        });
    }
    parts
}

/// One security requirement entry, as declared.
#[derive(Debug, Clone, Serialize)]
pub struct SecurityModel {
    pub scheme: String,
    pub scopes: Vec<String>,
    /// `apiKey`, `http`, `oauth2`, ... when the scheme is declared.
    pub scheme_type: Option<&'static str>,
}

/// Where an operation lives and which settings shape it.
#[derive(Debug, Clone, Copy)]
pub struct OperationContext<'a> {
    pub client_class: &'a str,
    pub exception_class: &'a str,
    pub common: &'a CommonOptions,
    pub client: &'a ClientOptions,
}

/// Generation-facing view of one HTTP operation.
#[derive(Debug, Clone, Serialize)]
pub struct OperationModel {
    pub operation_id: String,
    /// PascalCase name, with the `Core` suffix for protected operations.
    pub name: String,
    pub method_name: String,
    pub sync_method_name: Option<String>,
    pub http_method: HttpMethod,
    pub path: String,
    pub path_parts: Vec<PathPart>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub deprecated: bool,
    pub is_protected: bool,
    pub parameters: Vec<ParameterModel>,
    pub responses: Vec<ResponseModel>,
    pub has_result: bool,
    /// Success payload type. `None` for no content.
    pub unwrapped_result_type: Option<String>,
    /// Payload type after the optional envelope.
    pub result_type: Option<String>,
    pub async_result_type: String,
    pub sync_result_type: Option<String>,
    pub wraps_response: bool,
    pub exception_type: String,
    pub exception_class: String,
    pub throws_exception: bool,
    pub response_is_file: bool,
    pub request_content_type: Option<String>,
    pub security: Vec<SecurityModel>,
}

impl OperationModel {
    /// `name` is the operation's name inside its client, before casing.
    pub fn build<'doc>(
        source: &OperationSource<'doc>,
        name: &str,
        ctx: &OperationContext<'_>,
        resolver: &mut TypeResolver<'doc, '_>,
    ) -> Result<Self, GenerateError> {
        let label = source.label();
        let body_count = source.parameters.iter().filter(|p| p.is_body).count();
        if body_count > 1 {
            return Err(GenerateError::configuration(
                label,
                format!("declares {body_count} body parameters, at most one is allowed"),
            ));
        }

        let placeholders = path_placeholders(source.path);
        let mut parameters = Vec::with_capacity(source.parameters.len());
        for position in 0..source.parameters.len() {
            parameters.push(ParameterModel::build(
                &source.parameters,
                position,
                &placeholders,
                resolver,
            )?);
        }
        check_path_parameters(&label, &placeholders, source, &parameters)?;

        let language = resolver.language();
        let mut parameters =
            order_parameters(parameters, ctx.common.generate_optional_parameters);
        for param in &mut parameters {
            param.declaration = language.declare_parameter(
                &param.type_name,
                &param.variable_name,
                param.is_optional,
                param.default_literal.as_deref(),
            );
        }

        let pascal = normalize_name(name).pascal_case;
        let responses = build_responses(&source.responses, &pascal, resolver)?;

        let success_types: Vec<&str> = responses
            .iter()
            .filter(|r| r.is_success)
            .filter_map(|r| r.type_name.as_deref())
            .collect();
        let unwrapped_result_type = match success_types.split_first() {
            None => None,
            Some((first, rest)) if rest.iter().all(|t| t == first) => Some(first.to_string()),
            Some(_) => Some(language.universal_type().to_string()),
        };

        let wraps_response = ctx.common.wrap_responses;
        let result_type = if wraps_response {
            Some(language.envelope_type(
                &resolver.naming().response_envelope_type,
                unwrapped_result_type.as_deref(),
            ))
        } else {
            unwrapped_result_type.clone()
        };
        let async_result_type = language.async_type(result_type.as_deref());
        let sync_result_type = language.sync_type(result_type.as_deref());

        let failures: Vec<&ResponseModel> = responses.iter().filter(|r| !r.is_success).collect();
        let exception_type = match failures.as_slice() {
            [only] => only
                .type_name
                .clone()
                .unwrap_or_else(|| language.universal_exception_type().to_string()),
            _ => language.universal_exception_type().to_string(),
        };

        let key = format!("{}.{pascal}", ctx.client_class);
        let is_protected = ctx.client.protected_methods.iter().any(|m| *m == key);
        let name = if is_protected {
            format!("{pascal}Core")
        } else {
            pascal
        };

        let request_content_type = parameters
            .iter()
            .filter(|p| matches!(p.kind, ParameterKind::Body | ParameterKind::FormData))
            .find_map(|p| p.content_type.clone())
            .or_else(|| {
                parameters
                    .iter()
                    .any(|p| p.kind == ParameterKind::FormData)
                    .then(|| "multipart/form-data".to_string())
            });

        debug!("built operation {label} as {}.{name}", ctx.client_class);

        Ok(Self {
            operation_id: source
                .operation
                .operation_id
                .clone()
                .unwrap_or_else(|| name.clone()),
            method_name: language.method_name(&name),
            sync_method_name: language.sync_method_name(&name),
            http_method: source.method,
            path: source.path.to_string(),
            path_parts: path_parts(source.path, &parameters),
            summary: source.operation.summary.clone(),
            description: source.operation.description.clone(),
            deprecated: source.operation.deprecated.unwrap_or(false),
            is_protected,
            has_result: unwrapped_result_type.is_some(),
            response_is_file: responses.iter().any(|r| r.is_success && r.is_file),
            throws_exception: responses.iter().any(|r| r.throws_exception),
            security: security_models(source, resolver),
            parameters,
            responses,
            unwrapped_result_type,
            result_type,
            async_result_type,
            sync_result_type,
            wraps_response,
            exception_type,
            exception_class: ctx.exception_class.to_string(),
            request_content_type,
            name,
        })
    }

    pub fn parameters_of(&self, kind: ParameterKind) -> impl Iterator<Item = &ParameterModel> {
        self.parameters.iter().filter(move |p| p.kind == kind)
    }

    pub fn body_parameter(&self) -> Option<&ParameterModel> {
        self.parameters_of(ParameterKind::Body).next()
    }
}

/// Every Path parameter has a placeholder, and every placeholder a parameter.
fn check_path_parameters(
    label: &str,
    placeholders: &[&str],
    source: &OperationSource<'_>,
    parameters: &[ParameterModel],
) -> Result<(), GenerateError> {
    for param in parameters.iter().filter(|p| p.kind == ParameterKind::Path) {
        let declared = &source.parameters[param.position];
        if !placeholders
            .iter()
            .any(|p| p.eq_ignore_ascii_case(&declared.name))
        {
            return Err(GenerateError::configuration(
                label,
                format!(
                    "path parameter `{}` does not appear in the path template",
                    declared.name
                ),
            ));
        }
    }
    for placeholder in placeholders {
        let bound = parameters.iter().any(|p| {
            p.kind == ParameterKind::Path && p.name.eq_ignore_ascii_case(placeholder)
        });
        if !bound {
            return Err(GenerateError::configuration(
                label,
                format!("path placeholder `{{{placeholder}}}` has no parameter"),
            ));
        }
    }
    Ok(())
}

/// One model per status code, in declaration order.
fn build_responses<'doc>(
    descriptors: &[ResponseDescriptor<'doc>],
    operation_name: &str,
    resolver: &mut TypeResolver<'doc, '_>,
) -> Result<Vec<ResponseModel>, GenerateError> {
    let mut by_code: IndexMap<&str, Vec<&ResponseDescriptor<'doc>>> = IndexMap::new();
    for descriptor in descriptors {
        by_code
            .entry(descriptor.status_code.as_str())
            .or_default()
            .push(descriptor);
    }
    let primary = primary_success_code(by_code.keys().copied());

    let mut responses = Vec::with_capacity(by_code.len());
    for (code, declarations) in &by_code {
        let hint = if primary == Some(*code) {
            format!("{operation_name}Response")
        } else {
            format!("{operation_name}{}Response", normalize_name(code).pascal_case)
        };
        responses.push(ResponseModel::build(
            code,
            declarations,
            primary,
            &hint,
            resolver,
        )?);
    }
    Ok(responses)
}

fn security_models(
    source: &OperationSource<'_>,
    resolver: &TypeResolver<'_, '_>,
) -> Vec<SecurityModel> {
    let components = resolver.registry().document().components.as_ref();
    source
        .security
        .iter()
        .flat_map(|requirement| requirement.iter())
        .map(|(scheme, scopes)| SecurityModel {
            scheme: scheme.clone(),
            scopes: scopes.clone(),
            scheme_type: components.and_then(|c| c.scheme_type(scheme)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Primitive, TypeRef};

    fn path_param(name: &str, variable_name: &str) -> ParameterModel {
        ParameterModel {
            name: name.to_string(),
            identifier: variable_name.to_string(),
            variable_name: variable_name.to_string(),
            kind: ParameterKind::Path,
            type_name: "string".to_string(),
            type_ref: TypeRef::Primitive(Primitive::String),
            required: true,
            nullable: false,
            default_value: None,
            default_literal: None,
            position: 0,
            description: None,
            content_type: None,
            is_file: false,
            is_array: false,
            is_date: false,
            is_object: false,
            is_optional: false,
            declaration: String::new(),
        }
    }

    #[test]
    fn path_template_splits_into_parts() {
        let params = vec![path_param("pet_id", "petId"), path_param("Format", "format")];
        let parts = path_parts("/pets/{pet_id}/photos.{format}", &params);
        assert_eq!(
            parts,
            vec![
                PathPart::Literal { text: "/pets/".into() },
                PathPart::Parameter { name: "pet_id".into(), variable_name: "petId".into() },
                PathPart::Literal { text: "/photos.".into() },
                PathPart::Parameter { name: "format".into(), variable_name: "format".into() },
            ]
        );
    }

    #[test]
    fn plain_path_is_one_literal() {
        assert_eq!(
            path_parts("/health", &[]),
            vec![PathPart::Literal { text: "/health".into() }]
        );
    }
}
