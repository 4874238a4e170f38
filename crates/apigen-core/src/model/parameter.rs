use serde::Serialize;

use crate::error::ResolveError;
use crate::ingest::ParameterDescriptor;
use crate::language::TypeUsage;
use crate::schema::{TypeRef, TypeResolver};

/// Where an argument travels in the HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ParameterKind {
    Path,
    Query,
    Header,
    Cookie,
    Body,
    FormData,
}

impl ParameterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Path => "Path",
            Self::Query => "Query",
            Self::Header => "Header",
            Self::Cookie => "Cookie",
            Self::Body => "Body",
            Self::FormData => "FormData",
        }
    }
}

/// Decide how a parameter is bound.
///
/// A body marker wins, then a matching path placeholder, then a file
/// payload, then the declared location. Anything left is a query argument.
pub fn binding_kind(
    descriptor: &ParameterDescriptor<'_>,
    placeholders: &[&str],
    is_file: bool,
) -> ParameterKind {
    if descriptor.is_body {
        return ParameterKind::Body;
    }
    if placeholders
        .iter()
        .any(|p| p.eq_ignore_ascii_case(&descriptor.name))
    {
        return ParameterKind::Path;
    }
    if is_file {
        return ParameterKind::FormData;
    }
    descriptor.explicit_kind.unwrap_or(ParameterKind::Query)
}

/// One argument of a generated method.
#[derive(Debug, Clone, Serialize)]
pub struct ParameterModel {
    /// Wire name, as declared in the document.
    pub name: String,
    /// Language identifier before keyword escaping.
    pub identifier: String,
    /// Escaped identifier used in generated code.
    pub variable_name: String,
    pub kind: ParameterKind,
    pub type_name: String,
    #[serde(skip)]
    pub type_ref: TypeRef,
    pub required: bool,
    pub nullable: bool,
    pub default_value: Option<serde_json::Value>,
    pub default_literal: Option<String>,
    /// Index in the declared parameter list.
    pub position: usize,
    pub description: Option<String>,
    pub content_type: Option<String>,
    pub is_file: bool,
    pub is_array: bool,
    pub is_date: bool,
    pub is_object: bool,
    /// Whether the argument may be omitted at the call site.
    pub is_optional: bool,
    /// Full entry of the method signature.
    pub declaration: String,
}

impl ParameterModel {
    /// Build the model for `siblings[position]`.
    pub fn build<'doc>(
        siblings: &[ParameterDescriptor<'doc>],
        position: usize,
        placeholders: &[&str],
        resolver: &mut TypeResolver<'doc, '_>,
    ) -> Result<Self, ResolveError> {
        let descriptor = &siblings[position];
        let language = resolver.language();

        let nullable = descriptor.nullable || !descriptor.required;
        let type_ref = match descriptor.schema {
            Some(schema) => resolver.resolve_type(schema, nullable, Some(&descriptor.name))?,
            None => TypeRef::Any,
        };
        let is_file = type_ref.is_file();
        let kind = binding_kind(descriptor, placeholders, is_file);
        let required = descriptor.required || kind == ParameterKind::Path;
        let type_ref = if required && !descriptor.required && !descriptor.nullable {
            type_ref.non_null().clone()
        } else {
            type_ref
        };

        let mut identifier = language.parameter_identifier(&descriptor.name);
        let collides = siblings.iter().enumerate().any(|(i, other)| {
            i != position && language.parameter_identifier(&other.name) == identifier
        });
        if collides {
            identifier.push_str(kind.as_str());
        }
        let variable_name = language.escape_identifier(&identifier);

        let surface = resolver.for_usage(type_ref.clone(), TypeUsage::Parameter);
        let type_name = resolver.render(&surface, TypeUsage::Parameter);
        let default_literal = descriptor
            .default_value
            .as_ref()
            .and_then(|value| language.format_default(value, &type_ref));

        Ok(Self {
            name: descriptor.name.clone(),
            identifier,
            variable_name,
            kind,
            type_name,
            required,
            nullable: type_ref.is_nullable(),
            default_value: descriptor.default_value.clone(),
            default_literal,
            position,
            description: descriptor.description.clone(),
            content_type: descriptor.content_type.clone(),
            is_file,
            is_array: type_ref.is_array(),
            is_date: type_ref.is_date(),
            is_object: type_ref.is_object(),
            is_optional: false,
            declaration: String::new(),
            type_ref,
        })
    }

    fn tier(&self) -> u8 {
        match (self.required, self.default_value.is_some()) {
            (true, _) => 0,
            (false, false) => 1,
            (false, true) => 2,
        }
    }
}

/// Signature order.
///
/// With `reorder` set, required parameters come first, then optional ones
/// without a default, then optional ones with a default. The sort is stable
/// so declaration order survives inside each tier, and only the trailing
/// tiers are marked optional at the call site.
pub fn order_parameters(mut params: Vec<ParameterModel>, reorder: bool) -> Vec<ParameterModel> {
    if reorder {
        params.sort_by_key(ParameterModel::tier);
        for param in &mut params {
            param.is_optional = !param.required;
        }
    }
    params
}
