use std::collections::HashSet;

use serde::Serialize;

use crate::error::ResolveError;
use crate::language::TypeUsage;
use crate::naming::{normalize_name, unique_name};
use crate::parse::schema::{AdditionalProperties, Schema, SchemaOrRef};
use crate::schema::{NamedKind, NamedType, Primitive, TypeRef, TypeResolver};

/// A generated schema type.
#[derive(Debug, Clone, Serialize)]
pub struct DtoModel {
    pub name: String,
    pub kind: NamedKind,
    pub description: Option<String>,
    pub deprecated: bool,
    /// Generated base type name.
    pub base: Option<String>,
    pub is_abstract: bool,
    pub discriminator: Option<DiscriminatorModel>,
    pub properties: Vec<PropertyModel>,
    /// Value type of extra properties, for open objects.
    pub additional_properties: Option<String>,
    pub enum_values: Vec<EnumValueModel>,
    pub is_integer_enum: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertyModel {
    /// JSON name.
    pub name: String,
    pub identifier: String,
    pub type_name: String,
    pub required: bool,
    pub nullable: bool,
    pub read_only: bool,
    pub description: Option<String>,
    pub is_date: bool,
    pub is_array: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscriminatorModel {
    pub property_name: String,
    pub mappings: Vec<DiscriminatorMapping>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscriminatorMapping {
    pub value: String,
    pub type_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnumValueModel {
    pub name: String,
    pub value: serde_json::Value,
    /// Source literal of the value.
    pub literal: String,
}

/// Models for every generated type, bases before derived types.
///
/// Building a model can reach inline schemas nobody has named yet, so
/// the resolver's type list is walked as a worklist until it stops growing.
pub fn build_dto_models(
    resolver: &mut TypeResolver<'_, '_>,
) -> Result<Vec<DtoModel>, ResolveError> {
    let mut models = Vec::new();
    let mut index = 0;
    while let Some(named) = resolver.named_type(index) {
        models.push(build_dto(&named, resolver)?);
        index += 1;
    }
    Ok(topological_order(models))
}

fn build_dto<'doc>(
    named: &NamedType<'doc>,
    resolver: &mut TypeResolver<'doc, '_>,
) -> Result<DtoModel, ResolveError> {
    let schema = named.schema;
    let mut model = DtoModel {
        name: named.name.clone(),
        kind: named.kind,
        description: schema.description.clone(),
        deprecated: schema.deprecated.unwrap_or(false),
        base: None,
        is_abstract: false,
        discriminator: None,
        properties: Vec::new(),
        additional_properties: None,
        enum_values: Vec::new(),
        is_integer_enum: false,
    };

    if named.kind == NamedKind::Enum {
        build_enum(&mut model, schema, resolver);
        return Ok(model);
    }

    let base_key = named.component.and_then(|key| resolver.registry().base_of(key));
    if let Some(base_key) = base_key {
        resolver.resolve_component(base_key)?;
        model.base = resolver.component_type_name(base_key).map(str::to_string);
    }

    // Properties declared on an ancestor are inherited, not redeclared.
    let mut inherited: HashSet<String> = HashSet::new();
    if let Some(key) = named.component {
        for ancestor in resolver.registry().ancestors(key) {
            let resolved = resolver.registry().resolve_named(ancestor)?;
            let mut visited = HashSet::new();
            for (name, _, _) in collect_properties(resolver, resolved.schema, None, &mut visited)? {
                inherited.insert(name.to_string());
            }
            if let Some(d) = &resolved.schema.discriminator {
                inherited.insert(d.property_name.clone());
            }
        }
    }

    let skip_ref = model.base.is_some().then(|| schema.inherited_ref()).flatten();
    let mut visited = HashSet::new();
    let properties = collect_properties(resolver, schema, skip_ref, &mut visited)?;
    for (name, property, required) in properties {
        if inherited.contains(name) {
            continue;
        }
        model
            .properties
            .push(build_property(&named.name, name, property, required, resolver)?);
    }

    if let Some(discriminator) = &schema.discriminator {
        let property_name = discriminator.property_name.clone();
        if !model.properties.iter().any(|p| p.name == property_name) {
            model.properties.insert(
                0,
                PropertyModel {
                    identifier: resolver.language().property_identifier(&property_name),
                    type_name: resolver.render(
                        &TypeRef::Primitive(Primitive::String),
                        TypeUsage::Property,
                    ),
                    name: property_name.clone(),
                    required: true,
                    nullable: false,
                    read_only: false,
                    description: None,
                    is_date: false,
                    is_array: false,
                },
            );
        }
        model.is_abstract = schema.properties.is_empty()
            && (!schema.one_of.is_empty() || !schema.any_of.is_empty());
        model.discriminator = Some(DiscriminatorModel {
            property_name,
            mappings: discriminator_mappings(named, discriminator, resolver)?,
        });
    }

    if let Some(AdditionalProperties::Schema(value)) = &schema.additional_properties {
        let ty = resolver.resolve_type(value, false, Some(&format!("{}Value", named.name)))?;
        model.additional_properties = Some(resolver.render(&ty, TypeUsage::Property));
    } else if matches!(schema.additional_properties, Some(AdditionalProperties::Bool(true))) {
        model.additional_properties = Some(resolver.render(&TypeRef::Any, TypeUsage::Property));
    }

    Ok(model)
}

/// Own properties plus those mixed in through `allOf`, skipping the
/// inherited base reference.
fn collect_properties<'doc>(
    resolver: &TypeResolver<'doc, '_>,
    schema: &'doc Schema,
    skip_ref: Option<&str>,
    visited: &mut HashSet<*const Schema>,
) -> Result<Vec<(&'doc str, &'doc SchemaOrRef, bool)>, ResolveError> {
    let mut out: Vec<(&'doc str, &'doc SchemaOrRef, bool)> = Vec::new();
    if !visited.insert(schema as *const Schema) {
        return Ok(out);
    }
    for part in &schema.all_of {
        if skip_ref.is_some() && part.ref_path() == skip_ref {
            continue;
        }
        let resolved = resolver.registry().resolve(part)?;
        for entry in collect_properties(resolver, resolved.schema, None, visited)? {
            merge_property(&mut out, entry);
        }
    }
    for (name, property) in &schema.properties {
        let required = schema.required.contains(name);
        merge_property(&mut out, (name.as_str(), property, required));
    }
    // A `required` list may name properties that came from an `allOf` part.
    for entry in &mut out {
        if schema.required.iter().any(|r| r == entry.0) {
            entry.2 = true;
        }
    }
    Ok(out)
}

fn merge_property<'doc>(
    out: &mut Vec<(&'doc str, &'doc SchemaOrRef, bool)>,
    entry: (&'doc str, &'doc SchemaOrRef, bool),
) {
    match out.iter_mut().find(|(name, _, _)| *name == entry.0) {
        Some(existing) => {
            existing.1 = entry.1;
            existing.2 |= entry.2;
        }
        None => out.push(entry),
    }
}

fn build_property<'doc>(
    owner: &str,
    name: &str,
    property: &'doc SchemaOrRef,
    required: bool,
    resolver: &mut TypeResolver<'doc, '_>,
) -> Result<PropertyModel, ResolveError> {
    let resolved = resolver.registry().resolve(property)?.schema;
    let hint = format!("{owner}{}", normalize_name(name).pascal_case);
    let hint = if property.ref_path().is_some() { name } else { hint.as_str() };
    let nullable = resolver
        .language()
        .property_is_nullable(required, resolved.is_nullable());
    let ty = resolver.resolve_type(property, nullable, Some(hint))?;
    Ok(PropertyModel {
        name: name.to_string(),
        identifier: resolver.language().property_identifier(name),
        type_name: resolver.render(&ty, TypeUsage::Property),
        required,
        nullable: ty.is_nullable(),
        read_only: resolved.read_only.unwrap_or(false),
        description: resolved.description.clone(),
        is_date: ty.is_date(),
        is_array: ty.is_array(),
    })
}

fn discriminator_mappings<'doc>(
    named: &NamedType<'doc>,
    discriminator: &'doc crate::parse::schema::Discriminator,
    resolver: &mut TypeResolver<'doc, '_>,
) -> Result<Vec<DiscriminatorMapping>, ResolveError> {
    let mut mappings = Vec::new();
    if discriminator.mapping.is_empty() {
        let Some(key) = named.component else {
            return Ok(mappings);
        };
        for derived in resolver.registry().derived_of(key) {
            resolver.resolve_component(derived)?;
            if let Some(type_name) = resolver.component_type_name(derived) {
                mappings.push(DiscriminatorMapping {
                    value: derived.to_string(),
                    type_name: type_name.to_string(),
                });
            }
        }
        return Ok(mappings);
    }
    for (value, target) in &discriminator.mapping {
        let key = target.rsplit('/').next().unwrap_or(target);
        resolver.resolve_component(key)?;
        if let Some(type_name) = resolver.component_type_name(key) {
            mappings.push(DiscriminatorMapping {
                value: value.clone(),
                type_name: type_name.to_string(),
            });
        }
    }
    Ok(mappings)
}

fn build_enum(model: &mut DtoModel, schema: &Schema, resolver: &TypeResolver<'_, '_>) {
    let values: Vec<&serde_json::Value> =
        schema.enum_values.iter().filter(|v| !v.is_null()).collect();
    model.is_integer_enum = !values.is_empty() && values.iter().all(|v| v.is_i64() || v.is_u64());
    let literal_type = if model.is_integer_enum {
        TypeRef::Primitive(Primitive::Int64)
    } else {
        TypeRef::Primitive(Primitive::String)
    };

    let mut taken: HashSet<String> = HashSet::new();
    for (i, value) in values.into_iter().enumerate() {
        let base = schema
            .x_enum_names
            .get(i)
            .map(|n| normalize_name(n).pascal_case)
            .unwrap_or_else(|| enum_member_name(value));
        let name = unique_name(&base, |candidate| taken.contains(candidate));
        taken.insert(name.clone());
        let literal = resolver
            .language()
            .format_default(value, &literal_type)
            .unwrap_or_else(|| value.to_string());
        model.enum_values.push(EnumValueModel {
            name,
            value: value.clone(),
            literal,
        });
    }
}

fn enum_member_name(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) if s.trim().is_empty() => "Empty".to_string(),
        serde_json::Value::String(s) => normalize_name(s).pascal_case,
        serde_json::Value::Number(n) => {
            let text = n.to_string();
            match text.strip_prefix('-') {
                Some(abs) => format!("_minus_{}", abs.replace('.', "_")),
                None => format!("_{}", text.replace('.', "_")),
            }
        }
        serde_json::Value::Bool(b) => normalize_name(&b.to_string()).pascal_case,
        other => normalize_name(&other.to_string()).pascal_case,
    }
}

/// Bases first. Otherwise discovery order is kept.
fn topological_order(models: Vec<DtoModel>) -> Vec<DtoModel> {
    let index_of = |name: &str| models.iter().position(|m| m.name == name);
    let mut order: Vec<usize> = Vec::with_capacity(models.len());
    let mut visited = vec![false; models.len()];

    fn visit(
        i: usize,
        models: &[DtoModel],
        index_of: &dyn Fn(&str) -> Option<usize>,
        visited: &mut [bool],
        order: &mut Vec<usize>,
    ) {
        if visited[i] {
            return;
        }
        visited[i] = true;
        if let Some(base) = models[i].base.as_deref().and_then(index_of) {
            visit(base, models, index_of, visited, order);
        }
        order.push(i);
    }

    for i in 0..models.len() {
        visit(i, &models, &index_of, &mut visited, &mut order);
    }

    let mut slots: Vec<Option<DtoModel>> = models.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect()
}
