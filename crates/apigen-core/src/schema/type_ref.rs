use serde::Serialize;

use crate::parse::schema::{Schema, SchemaType};

/// Scalar types, one per format the targets distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Primitive {
    String,
    Int32,
    Int64,
    Double,
    Float,
    Decimal,
    Boolean,
    Date,
    DateTime,
    Time,
    Duration,
    Uuid,
    Uri,
    /// Base64-encoded bytes (`format: byte`).
    Byte,
}

impl Primitive {
    /// Map a `type` + `format` pair. Unknown formats fall back to the plain type.
    pub fn from_schema(schema_type: SchemaType, format: Option<&str>) -> Option<Self> {
        let primitive = match schema_type {
            SchemaType::Integer => match format {
                Some("int64" | "long") => Self::Int64,
                _ => Self::Int32,
            },
            SchemaType::Number => match format {
                Some("float") => Self::Float,
                Some("decimal") => Self::Decimal,
                _ => Self::Double,
            },
            SchemaType::Boolean => Self::Boolean,
            SchemaType::String => match format {
                Some("date") => Self::Date,
                Some("date-time") => Self::DateTime,
                Some("time") => Self::Time,
                Some("duration" | "time-span") => Self::Duration,
                Some("uuid" | "guid") => Self::Uuid,
                Some("uri" | "url") => Self::Uri,
                Some("byte") => Self::Byte,
                _ => Self::String,
            },
            SchemaType::Array | SchemaType::Object | SchemaType::Null => return None,
        };
        Some(primitive)
    }

    pub fn is_date(&self) -> bool {
        matches!(self, Self::Date | Self::DateTime)
    }
}

/// Language-neutral resolved type. Targets turn it into surface syntax.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum TypeRef {
    Primitive(Primitive),
    Array(Box<TypeRef>),
    /// String-keyed dictionary of the inner type.
    Map(Box<TypeRef>),
    /// Generated class or interface.
    Class(String),
    /// Generated enum.
    Enum(String),
    Union(Vec<TypeRef>),
    Nullable(Box<TypeRef>),
    /// File payload.
    Binary,
    /// The universal top type.
    Any,
}

impl TypeRef {
    /// Wrap in `Nullable` unless already nullable or `Any`.
    pub fn nullable(self) -> Self {
        match self {
            Self::Nullable(_) | Self::Any => self,
            other => Self::Nullable(Box::new(other)),
        }
    }

    pub fn non_null(&self) -> &TypeRef {
        match self {
            Self::Nullable(inner) => inner,
            other => other,
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, Self::Nullable(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.non_null(), Self::Array(_))
    }

    /// A file, or an array of files.
    pub fn is_file(&self) -> bool {
        match self.non_null() {
            Self::Binary => true,
            Self::Array(inner) => matches!(inner.non_null(), Self::Binary),
            _ => false,
        }
    }

    pub fn is_date(&self) -> bool {
        matches!(self.non_null(), Self::Primitive(p) if p.is_date())
    }

    /// Classes, maps and top types, which travel as JSON objects.
    pub fn is_object(&self) -> bool {
        matches!(self.non_null(), Self::Class(_) | Self::Map(_) | Self::Any)
    }

    /// Name of the generated type this refers to directly.
    pub fn generated_name(&self) -> Option<&str> {
        match self.non_null() {
            Self::Class(name) | Self::Enum(name) => Some(name),
            _ => None,
        }
    }

    /// Whether any generated type name appears in this type.
    pub fn mentions(&self, type_name: &str) -> bool {
        match self {
            Self::Class(name) | Self::Enum(name) => name == type_name,
            Self::Array(inner) | Self::Map(inner) | Self::Nullable(inner) => {
                inner.mentions(type_name)
            }
            Self::Union(members) => members.iter().any(|m| m.mentions(type_name)),
            Self::Primitive(_) | Self::Binary | Self::Any => false,
        }
    }
}

/// Kind of generated type a schema becomes, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NamedKind {
    Class,
    Enum,
}

impl NamedKind {
    /// Schemas that become generated types rather than structural ones.
    pub fn classify(schema: &Schema) -> Option<Self> {
        if !schema.enum_values.is_empty() {
            return Some(Self::Enum);
        }
        if !schema.properties.is_empty()
            || !schema.all_of.is_empty()
            || schema.discriminator.is_some()
        {
            return Some(Self::Class);
        }
        let is_dictionary = matches!(
            schema.additional_properties,
            Some(crate::parse::schema::AdditionalProperties::Schema(_))
                | Some(crate::parse::schema::AdditionalProperties::Bool(true))
        );
        if schema.primary_type() == Some(SchemaType::Object) && !is_dictionary {
            return Some(Self::Class);
        }
        None
    }

    pub fn type_ref(&self, name: String) -> TypeRef {
        match self {
            Self::Class => TypeRef::Class(name),
            Self::Enum => TypeRef::Enum(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(yaml: &str) -> Schema {
        serde_yaml_ng::from_str(yaml).unwrap()
    }

    #[test]
    fn formats_pick_primitives() {
        assert_eq!(
            Primitive::from_schema(SchemaType::Integer, Some("int64")),
            Some(Primitive::Int64)
        );
        assert_eq!(
            Primitive::from_schema(SchemaType::String, Some("date-time")),
            Some(Primitive::DateTime)
        );
        assert_eq!(
            Primitive::from_schema(SchemaType::String, Some("hostname")),
            Some(Primitive::String)
        );
        assert_eq!(Primitive::from_schema(SchemaType::Array, None), None);
    }

    #[test]
    fn nullable_does_not_stack() {
        let ty = TypeRef::Primitive(Primitive::Int32).nullable().nullable();
        assert_eq!(
            ty,
            TypeRef::Nullable(Box::new(TypeRef::Primitive(Primitive::Int32)))
        );
        assert_eq!(TypeRef::Any.nullable(), TypeRef::Any);
    }

    #[test]
    fn file_detection_covers_arrays() {
        assert!(TypeRef::Binary.is_file());
        assert!(TypeRef::Array(Box::new(TypeRef::Binary)).is_file());
        assert!(!TypeRef::Array(Box::new(TypeRef::Primitive(Primitive::Byte))).is_file());
    }

    #[test]
    fn classify_schemas() {
        assert_eq!(
            NamedKind::classify(&schema("{type: string, enum: [a, b]}")),
            Some(NamedKind::Enum)
        );
        assert_eq!(
            NamedKind::classify(&schema("{type: object, properties: {a: {type: string}}}")),
            Some(NamedKind::Class)
        );
        assert_eq!(NamedKind::classify(&schema("{type: object}")), Some(NamedKind::Class));
        assert_eq!(
            NamedKind::classify(&schema("{type: object, additionalProperties: {type: integer}}")),
            None
        );
        assert_eq!(NamedKind::classify(&schema("{type: array, items: {type: string}}")), None);
    }

    #[test]
    fn mentions_walks_containers() {
        let ty = TypeRef::Map(Box::new(TypeRef::Array(Box::new(TypeRef::Class(
            "Pet".into(),
        )))));
        assert!(ty.mentions("Pet"));
        assert!(!ty.mentions("Owner"));
    }
}
