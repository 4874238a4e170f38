use apigen_core::config::{TypeNamingOptions, TypeScriptOptions};
use apigen_core::language::apply_template;
use apigen_core::naming::normalize_name;
use apigen_core::schema::{Primitive, TypeRef};
use apigen_core::{TargetLanguage, TypeUsage};

const ARRAY: &str = "%T%[]";
const DICTIONARY: &str = "{ [key: string]: %T%; }";
pub(crate) const UNIVERSAL_EXCEPTION: &str = "Error";

const KEYWORDS: &[&str] = &[
    "any", "as", "await", "boolean", "break", "case", "catch", "class", "const", "continue",
    "debugger", "default", "delete", "do", "else", "enum", "export", "extends", "false",
    "finally", "for", "function", "if", "implements", "import", "in", "instanceof",
    "interface", "let", "new", "null", "number", "package", "private", "protected", "public",
    "return", "static", "string", "super", "switch", "this", "throw", "true", "try", "typeof",
    "var", "void", "while", "with", "yield",
];

/// TypeScript surface syntax.
#[derive(Debug, Clone)]
pub struct TypeScriptLanguage {
    pub strict_null_checks: bool,
    pub use_leaf_types: bool,
    pub date_time_type: String,
}

impl Default for TypeScriptLanguage {
    fn default() -> Self {
        Self::from_options(&TypeScriptOptions::default())
    }
}

impl TypeScriptLanguage {
    pub fn from_options(options: &TypeScriptOptions) -> Self {
        Self {
            strict_null_checks: options.strict_null_checks,
            use_leaf_types: options.use_leaf_types,
            date_time_type: options.date_time_type.clone(),
        }
    }

    fn primitive(&self, primitive: Primitive) -> &str {
        match primitive {
            Primitive::Int32
            | Primitive::Int64
            | Primitive::Double
            | Primitive::Float
            | Primitive::Decimal => "number",
            Primitive::Boolean => "boolean",
            Primitive::Date | Primitive::DateTime => &self.date_time_type,
            Primitive::String
            | Primitive::Time
            | Primitive::Duration
            | Primitive::Uuid
            | Primitive::Uri
            | Primitive::Byte => "string",
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Quoted TypeScript string literal.
pub(crate) fn string_literal(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

impl TargetLanguage for TypeScriptLanguage {
    fn tag(&self) -> &'static str {
        "typescript"
    }

    fn render_type(&self, ty: &TypeRef, usage: TypeUsage, naming: &TypeNamingOptions) -> String {
        match ty {
            TypeRef::Primitive(p) => self.primitive(*p).to_string(),
            TypeRef::Array(inner) => {
                let mut element = self.render_type(inner, usage, naming);
                if element.contains(" | ") {
                    element = format!("({element})");
                }
                let template = match usage {
                    TypeUsage::Response => naming.response_array_type.as_deref(),
                    TypeUsage::Parameter => naming.parameter_array_type.as_deref(),
                    TypeUsage::Property => naming.array_type.as_deref(),
                };
                apply_template(template.unwrap_or(ARRAY), &element)
            }
            TypeRef::Map(inner) => {
                let element = self.render_type(inner, usage, naming);
                apply_template(naming.dictionary_type.as_deref().unwrap_or(DICTIONARY), &element)
            }
            TypeRef::Class(name) | TypeRef::Enum(name) => name.clone(),
            TypeRef::Union(members) => members
                .iter()
                .map(|m| self.render_type(m, usage, naming))
                .collect::<Vec<_>>()
                .join(" | "),
            TypeRef::Nullable(inner) => {
                let rendered = self.render_type(inner, usage, naming);
                if self.strict_null_checks {
                    format!("{rendered} | null")
                } else {
                    rendered
                }
            }
            TypeRef::Binary => match usage {
                TypeUsage::Parameter => naming.file_parameter_type.clone(),
                TypeUsage::Response => naming.file_response_type.clone(),
                TypeUsage::Property => "Blob".to_string(),
            },
            TypeRef::Any => "any".to_string(),
        }
    }

    fn supports_union_syntax(&self) -> bool {
        true
    }

    fn use_leaf_types(&self) -> bool {
        self.use_leaf_types
    }

    fn keywords(&self) -> &'static [&'static str] {
        KEYWORDS
    }

    fn keyword_escape(&self) -> &'static str {
        "_"
    }

    /// JSON names are kept, quoted when they are not identifiers.
    fn property_identifier(&self, name: &str) -> String {
        if is_identifier(name) {
            name.to_string()
        } else {
            string_literal(name)
        }
    }

    /// Optional properties are marked with `?`, so only the schema decides.
    fn property_is_nullable(&self, _required: bool, schema_nullable: bool) -> bool {
        schema_nullable
    }

    fn method_name(&self, operation: &str) -> String {
        normalize_name(operation).camel_case
    }

    fn async_type(&self, result: Option<&str>) -> String {
        format!("Promise<{}>", result.unwrap_or("void"))
    }

    fn envelope_type(&self, envelope: &str, result: Option<&str>) -> String {
        format!("{envelope}<{}>", result.unwrap_or("void"))
    }

    fn universal_type(&self) -> &'static str {
        "any"
    }

    fn universal_exception_type(&self) -> &'static str {
        UNIVERSAL_EXCEPTION
    }

    fn format_default(&self, value: &serde_json::Value, ty: &TypeRef) -> Option<String> {
        use serde_json::Value;

        match (value, ty.non_null()) {
            (Value::String(s), TypeRef::Enum(name)) => {
                let member = if s.trim().is_empty() {
                    "Empty".to_string()
                } else {
                    normalize_name(s).pascal_case
                };
                Some(format!("{name}.{member}"))
            }
            (Value::String(s), _) => Some(string_literal(s)),
            (Value::Null | Value::Bool(_) | Value::Number(_), _) => Some(value.to_string()),
            (Value::Array(_) | Value::Object(_), _) => None,
        }
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

#[cfg(test)]
mod tests {
    use super::*;

    fn naming() -> TypeNamingOptions {
        TypeNamingOptions::default()
    }

    #[test]
    fn unions_are_parenthesized_inside_arrays() {
        let lang = TypeScriptLanguage::default();
        let union = TypeRef::Union(vec![
            TypeRef::Class("Dog".into()),
            TypeRef::Class("Cat".into()),
        ]);
        assert_eq!(lang.render_type(&union, TypeUsage::Parameter, &naming()), "Dog | Cat");
        assert_eq!(
            lang.render_type(&TypeRef::Array(Box::new(union)), TypeUsage::Parameter, &naming()),
            "(Dog | Cat)[]"
        );
    }

    #[test]
    fn strict_null_checks_control_null_unions() {
        let pet = TypeRef::Class("Pet".into()).nullable();
        assert_eq!(
            TypeScriptLanguage::default().render_type(&pet, TypeUsage::Response, &naming()),
            "Pet | null"
        );
        let loose = TypeScriptLanguage {
            strict_null_checks: false,
            ..TypeScriptLanguage::default()
        };
        assert_eq!(loose.render_type(&pet, TypeUsage::Response, &naming()), "Pet");
    }

    #[test]
    fn scalars_and_maps() {
        let lang = TypeScriptLanguage::default();
        let map = TypeRef::Map(Box::new(TypeRef::Primitive(Primitive::Int32)));
        assert_eq!(
            lang.render_type(&map, TypeUsage::Response, &naming()),
            "{ [key: string]: number; }"
        );
        assert_eq!(
            lang.render_type(&TypeRef::Primitive(Primitive::Uuid), TypeUsage::Property, &naming()),
            "string"
        );
        assert_eq!(lang.render_type(&TypeRef::Binary, TypeUsage::Property, &naming()), "Blob");
        let dates = TypeScriptLanguage {
            date_time_type: "Date".to_string(),
            ..TypeScriptLanguage::default()
        };
        assert_eq!(
            dates.render_type(
                &TypeRef::Primitive(Primitive::DateTime),
                TypeUsage::Property,
                &naming()
            ),
            "Date"
        );
    }

    #[test]
    fn properties_keep_json_names() {
        let lang = TypeScriptLanguage::default();
        assert_eq!(lang.property_identifier("petId"), "petId");
        assert_eq!(lang.property_identifier("x-rate-limit"), "\"x-rate-limit\"");
        assert!(!lang.property_is_nullable(false, false));
        assert!(lang.property_is_nullable(true, true));
    }

    #[test]
    fn methods_and_results() {
        let lang = TypeScriptLanguage::default();
        assert_eq!(lang.method_name("GetPet"), "getPet");
        assert_eq!(lang.sync_method_name("GetPet"), None);
        assert_eq!(lang.async_type(None), "Promise<void>");
        assert_eq!(lang.envelope_type("SwaggerResponse", Some("Pet")), "SwaggerResponse<Pet>");
        assert_eq!(lang.escape_identifier("delete"), "_delete");
    }

    #[test]
    fn parameter_declarations() {
        let lang = TypeScriptLanguage::default();
        assert_eq!(
            lang.declare_parameter("number | null", "limit", true, Some("20")),
            "limit: number | null = 20"
        );
        assert_eq!(
            lang.declare_parameter("string[] | null", "tag", true, None),
            "tag?: string[] | null"
        );
        let kind = TypeRef::Enum("Kind".into());
        assert_eq!(
            lang.format_default(&serde_json::json!("dog"), &kind).as_deref(),
            Some("Kind.Dog")
        );
        let string = TypeRef::Primitive(Primitive::String);
        assert_eq!(
            lang.format_default(&serde_json::json!("a\"b"), &string).as_deref(),
            Some(r#""a\"b""#)
        );
    }
}
