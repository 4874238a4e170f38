use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use log::debug;

use crate::config::TypeNamingOptions;
use crate::error::ResolveError;
use crate::language::{TargetLanguage, TypeUsage};
use crate::naming::{TypeNameRegistry, normalize_name};
use crate::parse::schema::{AdditionalProperties, Schema, SchemaOrRef, SchemaType};

use super::registry::SchemaRegistry;
use super::type_ref::{NamedKind, Primitive, TypeRef};

/// Stable identity of a schema node for one run: its address in the document.
type SchemaKey = *const Schema;

/// A generated type discovered during resolution.
#[derive(Debug, Clone)]
pub struct NamedType<'doc> {
    pub name: String,
    pub kind: NamedKind,
    pub schema: &'doc Schema,
    /// Component key, for types declared under `components/schemas`.
    pub component: Option<&'doc str>,
}

/// Maps schema nodes to target-language type names.
///
/// Results are memoized by node identity, so a schema reached twice gets
/// the same name, and a `$ref` cycle stops at the first named type instead
/// of being walked again.
pub struct TypeResolver<'doc, 'run> {
    registry: SchemaRegistry<'doc>,
    language: &'run dyn TargetLanguage,
    naming: &'run TypeNamingOptions,
    names: TypeNameRegistry,
    cache: HashMap<SchemaKey, TypeRef>,
    in_progress: HashSet<SchemaKey>,
    types: IndexMap<String, NamedType<'doc>>,
}

impl<'doc, 'run> TypeResolver<'doc, 'run> {
    /// Component types claim their names before any inline type is named.
    pub fn new(
        registry: SchemaRegistry<'doc>,
        language: &'run dyn TargetLanguage,
        naming: &'run TypeNamingOptions,
    ) -> Self {
        let mut resolver = Self {
            registry,
            language,
            naming,
            names: TypeNameRegistry::new(),
            cache: HashMap::new(),
            in_progress: HashSet::new(),
            types: IndexMap::new(),
        };
        let components: Vec<_> = resolver.registry.component_schemas().collect();
        for (key, schema_or_ref) in components {
            let Some(schema) = schema_or_ref.as_schema() else {
                continue;
            };
            let Some(kind) = NamedKind::classify(schema) else {
                continue;
            };
            let name = resolver.names.claim(&normalize_name(key).pascal_case);
            resolver
                .cache
                .insert(schema as SchemaKey, kind.type_ref(name.clone()));
            resolver.types.insert(
                name.clone(),
                NamedType {
                    name,
                    kind,
                    schema,
                    component: Some(key),
                },
            );
        }
        resolver
    }

    pub fn registry(&self) -> &SchemaRegistry<'doc> {
        &self.registry
    }

    pub fn language(&self) -> &'run dyn TargetLanguage {
        self.language
    }

    pub fn naming(&self) -> &'run TypeNamingOptions {
        self.naming
    }

    /// Resolve a schema to its surface type name at a use site.
    pub fn resolve(
        &mut self,
        schema: &'doc SchemaOrRef,
        is_nullable: bool,
        hint: Option<&str>,
        usage: TypeUsage,
    ) -> Result<String, ResolveError> {
        let ty = self.resolve_type(schema, is_nullable, hint)?;
        let ty = self.for_usage(ty, usage);
        Ok(self.render(&ty, usage))
    }

    /// Language-neutral resolution, with nullability applied.
    pub fn resolve_type(
        &mut self,
        schema: &'doc SchemaOrRef,
        is_nullable: bool,
        hint: Option<&str>,
    ) -> Result<TypeRef, ResolveError> {
        let resolved = self.registry.resolve(schema)?;
        let ty = self.resolve_node(resolved.schema, hint)?;
        if is_nullable || resolved.schema.is_nullable() {
            Ok(ty.nullable())
        } else {
            Ok(ty)
        }
    }

    /// Type of a component schema by its key.
    pub fn resolve_component(&mut self, key: &str) -> Result<TypeRef, ResolveError> {
        let resolved = self.registry.resolve_named(key)?;
        self.resolve_node(resolved.schema, Some(key))
    }

    /// Apply use-site rewrites: polymorphic parameters become a union of
    /// their leaf types where the language allows it.
    pub fn for_usage(&self, ty: TypeRef, usage: TypeUsage) -> TypeRef {
        if usage == TypeUsage::Parameter
            && self.language.supports_union_syntax()
            && self.language.use_leaf_types()
        {
            self.expand_leaf_types(ty)
        } else {
            ty
        }
    }

    pub fn render(&self, ty: &TypeRef, usage: TypeUsage) -> String {
        self.language.render_type(ty, usage, self.naming)
    }

    /// Number of generated types found so far.
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Generated type by discovery index. Components come first, in
    /// definition order, then inline types in the order they were reached.
    pub fn named_type(&self, index: usize) -> Option<NamedType<'doc>> {
        self.types.get_index(index).map(|(_, t)| t.clone())
    }

    pub fn named_type_by_name(&self, name: &str) -> Option<&NamedType<'doc>> {
        self.types.get(name)
    }

    /// Generated type name of a component key.
    pub fn component_type_name(&self, key: &str) -> Option<&str> {
        self.types
            .values()
            .find(|t| t.component == Some(key))
            .map(|t| t.name.as_str())
    }

    fn expand_leaf_types(&self, ty: TypeRef) -> TypeRef {
        match ty {
            TypeRef::Class(name) => {
                let Some(key) = self.types.get(&name).and_then(|t| t.component) else {
                    return TypeRef::Class(name);
                };
                if !self.registry.is_polymorphic(key) {
                    return TypeRef::Class(name);
                }
                let leaves: Vec<TypeRef> = self
                    .registry
                    .leaf_types(key)
                    .into_iter()
                    .filter_map(|leaf| self.component_type_name(leaf))
                    .map(|leaf| TypeRef::Class(leaf.to_string()))
                    .collect();
                match leaves.len() {
                    0 => TypeRef::Class(name),
                    1 => leaves.into_iter().next().unwrap_or(TypeRef::Class(name)),
                    _ => TypeRef::Union(leaves),
                }
            }
            TypeRef::Nullable(inner) => self.expand_leaf_types(*inner).nullable(),
            TypeRef::Array(inner) => TypeRef::Array(Box::new(self.expand_leaf_types(*inner))),
            other => other,
        }
    }

    fn resolve_node(
        &mut self,
        schema: &'doc Schema,
        hint: Option<&str>,
    ) -> Result<TypeRef, ResolveError> {
        let key = schema as SchemaKey;
        if let Some(ty) = self.cache.get(&key) {
            return Ok(ty.clone());
        }
        if !self.in_progress.insert(key) {
            debug!("recursive structural schema degraded to the top type");
            return Ok(TypeRef::Any);
        }
        let result = self.compute(schema, hint);
        self.in_progress.remove(&key);
        let ty = result?;
        self.cache.insert(key, ty.clone());
        Ok(ty)
    }

    fn compute(
        &mut self,
        schema: &'doc Schema,
        hint: Option<&str>,
    ) -> Result<TypeRef, ResolveError> {
        if schema.is_binary() {
            return Ok(TypeRef::Binary);
        }

        // `allOf: [$ref]` with nothing else is a wrapper, often used to
        // attach `nullable` to a reference.
        if schema.properties.is_empty() && schema.discriminator.is_none() {
            if let [only] = schema.all_of.as_slice() {
                return self.resolve_type(only, false, hint);
            }
        }

        if (!schema.one_of.is_empty() || !schema.any_of.is_empty())
            && schema.discriminator.is_none()
            && schema.properties.is_empty()
        {
            return self.resolve_union(schema, hint);
        }

        if let Some(kind) = NamedKind::classify(schema) {
            let name = self.synthesize_name(schema, hint);
            debug!("synthesized type {name}");
            self.types.insert(
                name.clone(),
                NamedType {
                    name: name.clone(),
                    kind,
                    schema,
                    component: None,
                },
            );
            return Ok(kind.type_ref(name));
        }

        let ty = match schema.primary_type() {
            Some(SchemaType::Array) => self.resolve_items(schema, hint)?,
            Some(SchemaType::Object) => self.resolve_dictionary(schema, hint)?,
            Some(SchemaType::Null) => TypeRef::Any,
            Some(other) => Primitive::from_schema(other, schema.format.as_deref())
                .map(TypeRef::Primitive)
                .unwrap_or(TypeRef::Any),
            None if schema.items.is_some() => self.resolve_items(schema, hint)?,
            None if schema.additional_properties.is_some() => {
                self.resolve_dictionary(schema, hint)?
            }
            None => TypeRef::Any,
        };
        Ok(ty)
    }

    fn resolve_items(
        &mut self,
        schema: &'doc Schema,
        hint: Option<&str>,
    ) -> Result<TypeRef, ResolveError> {
        let element = match &schema.items {
            Some(items) => self.resolve_type(items, false, hint)?,
            None => TypeRef::Any,
        };
        Ok(TypeRef::Array(Box::new(element)))
    }

    fn resolve_dictionary(
        &mut self,
        schema: &'doc Schema,
        hint: Option<&str>,
    ) -> Result<TypeRef, ResolveError> {
        let value = match &schema.additional_properties {
            Some(AdditionalProperties::Schema(value)) => self.resolve_type(value, false, hint)?,
            _ => TypeRef::Any,
        };
        Ok(TypeRef::Map(Box::new(value)))
    }

    fn resolve_union(
        &mut self,
        schema: &'doc Schema,
        hint: Option<&str>,
    ) -> Result<TypeRef, ResolveError> {
        let mut members: Vec<TypeRef> = Vec::new();
        let mut nullable = false;
        for member in schema.one_of.iter().chain(&schema.any_of) {
            let resolved = self.registry.resolve(member)?;
            if resolved.schema.primary_type() == Some(SchemaType::Null) {
                nullable = true;
                continue;
            }
            let ty = self.resolve_type(member, false, hint)?;
            if !members.contains(&ty) {
                members.push(ty);
            }
        }
        let ty = match members.len() {
            0 => TypeRef::Any,
            1 => members.into_iter().next().unwrap_or(TypeRef::Any),
            _ => TypeRef::Union(members),
        };
        Ok(if nullable { ty.nullable() } else { ty })
    }

    /// Hint first, then the schema title, then `Anonymous`.
    fn synthesize_name(&mut self, schema: &Schema, hint: Option<&str>) -> String {
        let base = hint
            .filter(|h| !h.trim().is_empty())
            .or(schema.title.as_deref().filter(|t| !t.trim().is_empty()))
            .map(|h| normalize_name(h).pascal_case)
            .unwrap_or_else(|| "Anonymous".to_string());
        self.names.claim(&base)
    }
}
