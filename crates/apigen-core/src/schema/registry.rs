use std::collections::HashSet;

use indexmap::IndexMap;

use crate::error::ResolveError;
use crate::parse::components::Components;
use crate::parse::parameter::{Parameter, ParameterOrRef};
use crate::parse::request_body::{RequestBody, RequestBodyOrRef};
use crate::parse::response::{Response, ResponseOrRef};
use crate::parse::schema::{AdditionalProperties, Schema, SchemaOrRef};
use crate::parse::spec::OpenApiDocument;

/// A schema node with `$ref`s followed, plus the component it came from.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedSchema<'doc> {
    pub name: Option<&'doc str>,
    pub schema: &'doc Schema,
}

/// Borrowed view over a document that follows `$ref` pointers lazily and
/// answers questions about the inheritance hierarchy of component schemas.
///
/// Nothing is cloned: every lookup hands back a reference into the
/// document, so node addresses stay stable for the registry's lifetime.
pub struct SchemaRegistry<'doc> {
    document: &'doc OpenApiDocument,
    components: Option<&'doc Components>,
    bases: IndexMap<&'doc str, &'doc str>,
}

impl<'doc> SchemaRegistry<'doc> {
    pub fn new(document: &'doc OpenApiDocument) -> Self {
        let components = document.components.as_ref();
        let bases = components.map(collect_bases).unwrap_or_default();
        Self {
            document,
            components,
            bases,
        }
    }

    pub fn document(&self) -> &'doc OpenApiDocument {
        self.document
    }

    /// Component schemas in definition order.
    pub fn component_schemas(&self) -> impl Iterator<Item = (&'doc str, &'doc SchemaOrRef)> {
        self.components
            .into_iter()
            .flat_map(|c| c.schemas.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// Follow `$ref` chains until an inline schema is reached.
    pub fn resolve(
        &self,
        schema_or_ref: &'doc SchemaOrRef,
    ) -> Result<ResolvedSchema<'doc>, ResolveError> {
        let mut current = schema_or_ref;
        let mut name = None;
        let mut visited = HashSet::new();
        loop {
            match current {
                SchemaOrRef::Schema(schema) => return Ok(ResolvedSchema { name, schema }),
                SchemaOrRef::Ref { ref_path } => {
                    if !visited.insert(ref_path.as_str()) {
                        return Err(ResolveError::CircularRef(ref_path.clone()));
                    }
                    let (target_name, target) = self.lookup_schema(ref_path)?;
                    name = Some(target_name);
                    current = target;
                }
            }
        }
    }

    /// Resolve a component schema by its name.
    pub fn resolve_named(&self, name: &str) -> Result<ResolvedSchema<'doc>, ResolveError> {
        let (key, schema) = self
            .components
            .and_then(|c| c.schema_entry(name))
            .ok_or_else(|| ResolveError::RefTargetNotFound(name.to_string()))?;
        let mut resolved = self.resolve(schema)?;
        resolved.name.get_or_insert(key);
        Ok(resolved)
    }

    /// Component name a schema points at, without following alias chains.
    pub fn ref_target_name(&self, schema_or_ref: &SchemaOrRef) -> Option<&'doc str> {
        let ref_path = schema_or_ref.ref_path()?;
        self.lookup_schema(ref_path).ok().map(|(name, _)| name)
    }

    pub fn parameter(&self, param: &'doc ParameterOrRef) -> Result<&'doc Parameter, ResolveError> {
        let mut current = param;
        let mut visited = HashSet::new();
        loop {
            match current {
                ParameterOrRef::Parameter(p) => return Ok(p),
                ParameterOrRef::Ref { ref_path } => {
                    if !visited.insert(ref_path.as_str()) {
                        return Err(ResolveError::CircularRef(ref_path.clone()));
                    }
                    let name = parse_ref_name(ref_path, "parameters")?;
                    current = self
                        .components
                        .and_then(|c| c.parameters.get(name))
                        .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.clone()))?;
                }
            }
        }
    }

    pub fn request_body(
        &self,
        body: &'doc RequestBodyOrRef,
    ) -> Result<&'doc RequestBody, ResolveError> {
        let mut current = body;
        let mut visited = HashSet::new();
        loop {
            match current {
                RequestBodyOrRef::RequestBody(rb) => return Ok(rb),
                RequestBodyOrRef::Ref { ref_path } => {
                    if !visited.insert(ref_path.as_str()) {
                        return Err(ResolveError::CircularRef(ref_path.clone()));
                    }
                    let name = parse_ref_name(ref_path, "requestBodies")?;
                    current = self
                        .components
                        .and_then(|c| c.request_bodies.get(name))
                        .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.clone()))?;
                }
            }
        }
    }

    pub fn response(&self, response: &'doc ResponseOrRef) -> Result<&'doc Response, ResolveError> {
        let mut current = response;
        let mut visited = HashSet::new();
        loop {
            match current {
                ResponseOrRef::Response(r) => return Ok(r),
                ResponseOrRef::Ref { ref_path } => {
                    if !visited.insert(ref_path.as_str()) {
                        return Err(ResolveError::CircularRef(ref_path.clone()));
                    }
                    let name = parse_ref_name(ref_path, "responses")?;
                    current = self
                        .components
                        .and_then(|c| c.responses.get(name))
                        .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.clone()))?;
                }
            }
        }
    }

    /// Check that every `$ref` in the document points at something.
    pub fn validate(&self) -> Result<(), ResolveError> {
        for item in self.document.paths.values() {
            for param in &item.parameters {
                self.validate_parameter(param)?;
            }
            for (_, op) in item.operations() {
                for param in &op.parameters {
                    self.validate_parameter(param)?;
                }
                if let Some(body) = &op.request_body {
                    for mt in self.request_body(body)?.content.values() {
                        if let Some(schema) = &mt.schema {
                            self.validate_schema(schema)?;
                        }
                    }
                }
                for response in op.responses.values() {
                    let response = self.response(response)?;
                    for mt in response.content.values() {
                        if let Some(schema) = &mt.schema {
                            self.validate_schema(schema)?;
                        }
                    }
                    for expected in &response.x_expected_schemas {
                        self.validate_schema(&expected.schema)?;
                    }
                }
            }
        }
        for (_, schema) in self.component_schemas() {
            self.validate_schema(schema)?;
        }
        Ok(())
    }

    fn validate_parameter(&self, param: &'doc ParameterOrRef) -> Result<(), ResolveError> {
        match &self.parameter(param)?.schema {
            Some(schema) => self.validate_schema(schema),
            None => Ok(()),
        }
    }

    fn validate_schema(&self, schema_or_ref: &'doc SchemaOrRef) -> Result<(), ResolveError> {
        let schema = match schema_or_ref {
            SchemaOrRef::Ref { .. } => {
                self.resolve(schema_or_ref)?;
                return Ok(());
            }
            SchemaOrRef::Schema(schema) => schema,
        };
        for prop in schema.properties.values() {
            self.validate_schema(prop)?;
        }
        if let Some(items) = &schema.items {
            self.validate_schema(items)?;
        }
        if let Some(AdditionalProperties::Schema(value)) = &schema.additional_properties {
            self.validate_schema(value)?;
        }
        for part in schema
            .all_of
            .iter()
            .chain(&schema.one_of)
            .chain(&schema.any_of)
        {
            self.validate_schema(part)?;
        }
        if let Some(discriminator) = &schema.discriminator {
            for target in discriminator.mapping.values() {
                if target.starts_with('#') {
                    self.lookup_schema(target)?;
                }
            }
        }
        Ok(())
    }

    // Hierarchy

    /// Direct base of a component schema.
    pub fn base_of(&self, name: &str) -> Option<&'doc str> {
        self.bases.get(name).copied()
    }

    /// Bases from nearest to root. Stops at a cycle.
    pub fn ancestors(&self, name: &str) -> Vec<&'doc str> {
        let mut chain = Vec::new();
        let mut seen: HashSet<&str> = HashSet::from([name]);
        let mut current = self.base_of(name);
        while let Some(base) = current {
            if !seen.insert(base) {
                break;
            }
            chain.push(base);
            current = self.base_of(base);
        }
        chain
    }

    /// Direct subtypes in definition order.
    pub fn derived_of(&self, name: &str) -> Vec<&'doc str> {
        self.bases
            .iter()
            .filter(|(_, base)| **base == name)
            .map(|(derived, _)| *derived)
            .collect()
    }

    /// Transitive subtypes that have no subtypes themselves.
    pub fn leaf_types(&self, name: &str) -> Vec<&'doc str> {
        let mut leaves = Vec::new();
        let mut seen: HashSet<&str> = HashSet::from([name]);
        let mut stack: Vec<&'doc str> = self.derived_of(name).into_iter().rev().collect();
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            let children = self.derived_of(current);
            if children.is_empty() {
                leaves.push(current);
            } else {
                stack.extend(children.into_iter().rev());
            }
        }
        leaves
    }

    /// Narrowest type every name is, or derives from.
    pub fn common_ancestor(&self, names: &[&str]) -> Option<&'doc str> {
        let (first, rest) = names.split_first()?;
        let first_key = self.component_key(first)?;
        std::iter::once(first_key)
            .chain(self.ancestors(first_key))
            .find(|candidate| {
                rest.iter().all(|other| {
                    *other == *candidate || self.ancestors(other).contains(candidate)
                })
            })
    }

    /// Whether subtypes are selected through a discriminator.
    pub fn is_polymorphic(&self, name: &str) -> bool {
        let has_discriminator = self
            .resolve_named(name)
            .map(|r| r.schema.discriminator.is_some())
            .unwrap_or(false);
        has_discriminator && !self.derived_of(name).is_empty()
    }

    fn component_key(&self, name: &str) -> Option<&'doc str> {
        self.components
            .and_then(|c| c.schema_entry(name))
            .map(|(k, _)| k)
    }

    fn lookup_schema(
        &self,
        ref_path: &str,
    ) -> Result<(&'doc str, &'doc SchemaOrRef), ResolveError> {
        let name = parse_ref_name(ref_path, "schemas")?;
        self.components
            .and_then(|c| c.schema_entry(name))
            .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.to_string()))
    }
}

/// `allOf` with a single `$ref` names the base. Discriminated `oneOf`
/// members that have no base of their own derive from the union schema.
fn collect_bases(components: &Components) -> IndexMap<&str, &str> {
    let mut bases = IndexMap::new();

    for (name, schema) in &components.schemas {
        let Some(schema) = schema.as_schema() else {
            continue;
        };
        if let Some(base) = schema
            .inherited_ref()
            .and_then(|target| component_key(components, target))
        {
            if base != name.as_str() {
                bases.insert(name.as_str(), base);
            }
        }
    }

    for (name, schema) in &components.schemas {
        let Some(schema) = schema.as_schema() else {
            continue;
        };
        let Some(discriminator) = &schema.discriminator else {
            continue;
        };
        let members = schema
            .one_of
            .iter()
            .chain(&schema.any_of)
            .filter_map(SchemaOrRef::ref_path)
            .chain(discriminator.mapping.values().map(String::as_str));
        for member in members.filter_map(|target| component_key(components, target)) {
            if member != name.as_str() && !bases.contains_key(member) {
                bases.insert(member, name.as_str());
            }
        }
    }

    bases
}

/// Component key for a `$ref` path or a bare schema name.
fn component_key<'c>(components: &'c Components, target: &str) -> Option<&'c str> {
    let name = if target.starts_with('#') {
        parse_ref_name(target, "schemas").ok()?
    } else {
        target
    };
    components.schema_entry(name).map(|(k, _)| k)
}

/// Parse a `$ref` path like `#/components/schemas/Foo` and extract the name.
pub(crate) fn parse_ref_name<'a>(
    ref_path: &'a str,
    expected_section: &str,
) -> Result<&'a str, ResolveError> {
    let stripped = ref_path
        .strip_prefix("#/components/")
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    let (section, name) = stripped
        .split_once('/')
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    if section != expected_section {
        return Err(ResolveError::InvalidRefFormat(format!(
            "expected section '{}', got '{}' in {}",
            expected_section, section, ref_path
        )));
    }
    Ok(name)
}
