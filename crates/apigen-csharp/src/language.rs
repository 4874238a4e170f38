use apigen_core::config::{CSharpOptions, TypeNamingOptions};
use apigen_core::language::apply_template;
use apigen_core::naming::normalize_name;
use apigen_core::schema::{Primitive, TypeRef};
use apigen_core::{TargetLanguage, TypeUsage};

const RESPONSE_ARRAY: &str = "System.Collections.Generic.ICollection<%T%>";
const PARAMETER_ARRAY: &str = "System.Collections.Generic.IEnumerable<%T%>";
const PROPERTY_ARRAY: &str = "System.Collections.Generic.ICollection<%T%>";
const DICTIONARY: &str = "System.Collections.Generic.IDictionary<string, %T%>";
pub(crate) const UNIVERSAL_EXCEPTION: &str = "System.Exception";

const KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

/// C# surface syntax.
#[derive(Debug, Clone)]
pub struct CSharpLanguage {
    pub nullable_reference_types: bool,
    pub generate_sync_methods: bool,
    pub date_time_type: String,
}

impl Default for CSharpLanguage {
    fn default() -> Self {
        Self::from_options(&CSharpOptions::default())
    }
}

impl CSharpLanguage {
    pub fn from_options(options: &CSharpOptions) -> Self {
        Self {
            nullable_reference_types: options.use_nullable_reference_types,
            generate_sync_methods: options.generate_sync_methods,
            date_time_type: options.date_time_type.clone(),
        }
    }

    fn primitive(&self, primitive: Primitive) -> &str {
        match primitive {
            Primitive::String => "string",
            Primitive::Int32 => "int",
            Primitive::Int64 => "long",
            Primitive::Double => "double",
            Primitive::Float => "float",
            Primitive::Decimal => "decimal",
            Primitive::Boolean => "bool",
            Primitive::Date | Primitive::DateTime => &self.date_time_type,
            Primitive::Time | Primitive::Duration => "System.TimeSpan",
            Primitive::Uuid => "System.Guid",
            Primitive::Uri => "System.Uri",
            Primitive::Byte => "byte[]",
        }
    }

    /// Whether `?` on this type makes a `Nullable<T>` rather than an annotation.
    fn is_value_type(&self, ty: &TypeRef) -> bool {
        match ty {
            TypeRef::Primitive(Primitive::String | Primitive::Uri | Primitive::Byte) => false,
            TypeRef::Primitive(Primitive::Date | Primitive::DateTime) => {
                self.date_time_type != "string"
            }
            TypeRef::Primitive(_) | TypeRef::Enum(_) => true,
            _ => false,
        }
    }
}

/// Quoted C# string literal.
pub(crate) fn string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

impl TargetLanguage for CSharpLanguage {
    fn tag(&self) -> &'static str {
        "csharp"
    }

    fn render_type(&self, ty: &TypeRef, usage: TypeUsage, naming: &TypeNamingOptions) -> String {
        match ty {
            TypeRef::Primitive(p) => self.primitive(*p).to_string(),
            TypeRef::Array(inner) => {
                let element = self.render_type(inner, usage, naming);
                let template = match usage {
                    TypeUsage::Response => {
                        naming.response_array_type.as_deref().unwrap_or(RESPONSE_ARRAY)
                    }
                    TypeUsage::Parameter => {
                        naming.parameter_array_type.as_deref().unwrap_or(PARAMETER_ARRAY)
                    }
                    TypeUsage::Property => naming.array_type.as_deref().unwrap_or(PROPERTY_ARRAY),
                };
                apply_template(template, &element)
            }
            TypeRef::Map(inner) => {
                let element = self.render_type(inner, usage, naming);
                apply_template(naming.dictionary_type.as_deref().unwrap_or(DICTIONARY), &element)
            }
            TypeRef::Class(name) | TypeRef::Enum(name) => name.clone(),
            TypeRef::Union(_) | TypeRef::Any => "object".to_string(),
            TypeRef::Nullable(inner) => {
                let rendered = self.render_type(inner, usage, naming);
                if self.is_value_type(inner) || self.nullable_reference_types {
                    format!("{rendered}?")
                } else {
                    rendered
                }
            }
            TypeRef::Binary => match usage {
                TypeUsage::Parameter => naming.file_parameter_type.clone(),
                TypeUsage::Response => naming.file_response_type.clone(),
                TypeUsage::Property => "byte[]".to_string(),
            },
        }
    }

    fn supports_union_syntax(&self) -> bool {
        false
    }

    fn keywords(&self) -> &'static [&'static str] {
        KEYWORDS
    }

    fn keyword_escape(&self) -> &'static str {
        "@"
    }

    fn property_identifier(&self, name: &str) -> String {
        normalize_name(name).pascal_case
    }

    fn method_name(&self, operation: &str) -> String {
        format!("{operation}Async")
    }

    fn sync_method_name(&self, operation: &str) -> Option<String> {
        self.generate_sync_methods.then(|| operation.to_string())
    }

    fn async_type(&self, result: Option<&str>) -> String {
        match result {
            Some(t) => format!("System.Threading.Tasks.Task<{t}>"),
            None => "System.Threading.Tasks.Task".to_string(),
        }
    }

    fn sync_type(&self, result: Option<&str>) -> Option<String> {
        self.generate_sync_methods
            .then(|| result.unwrap_or("void").to_string())
    }

    fn envelope_type(&self, envelope: &str, result: Option<&str>) -> String {
        match result {
            Some(t) => format!("{envelope}<{t}>"),
            None => envelope.to_string(),
        }
    }

    fn universal_type(&self) -> &'static str {
        "object"
    }

    fn universal_exception_type(&self) -> &'static str {
        UNIVERSAL_EXCEPTION
    }

    fn format_default(&self, value: &serde_json::Value, ty: &TypeRef) -> Option<String> {
        use serde_json::Value;

        match (value, ty.non_null()) {
            (Value::Null, _) => Some("null".to_string()),
            (Value::Bool(b), _) => Some(b.to_string()),
            (Value::String(s), TypeRef::Enum(name)) => {
                let member = if s.trim().is_empty() {
                    "Empty".to_string()
                } else {
                    normalize_name(s).pascal_case
                };
                Some(format!("{name}.{member}"))
            }
            (Value::String(s), TypeRef::Primitive(Primitive::String)) => Some(string_literal(s)),
            (Value::Number(n), TypeRef::Primitive(p)) => match p {
                Primitive::Decimal => Some(format!("{n}m")),
                Primitive::Float => Some(format!("{n}f")),
                Primitive::Int32 | Primitive::Int64 if n.is_f64() => None,
                Primitive::Int32 | Primitive::Int64 | Primitive::Double => Some(n.to_string()),
                _ => None,
            },
            _ => None,
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
            (true, Some(default)) => format!("{type_name} {variable_name} = {default}"),
            (true, None) => format!("{type_name} {variable_name} = null"),
            (false, _) => format!("{type_name} {variable_name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naming() -> TypeNamingOptions {
        TypeNamingOptions::default()
    }

    fn array_of_strings() -> TypeRef {
        TypeRef::Array(Box::new(TypeRef::Primitive(Primitive::String)))
    }

    #[test]
    fn arrays_differ_between_responses_and_parameters() {
        let lang = CSharpLanguage::default();
        assert_eq!(
            lang.render_type(&array_of_strings(), TypeUsage::Response, &naming()),
            "System.Collections.Generic.ICollection<string>"
        );
        assert_eq!(
            lang.render_type(&array_of_strings(), TypeUsage::Parameter, &naming()),
            "System.Collections.Generic.IEnumerable<string>"
        );
    }

    #[test]
    fn configured_array_template_wins() {
        let lang = CSharpLanguage::default();
        let naming = TypeNamingOptions {
            parameter_array_type: Some("System.Collections.Generic.List<%T%>".to_string()),
            ..TypeNamingOptions::default()
        };
        assert_eq!(
            lang.render_type(&array_of_strings(), TypeUsage::Parameter, &naming),
            "System.Collections.Generic.List<string>"
        );
    }

    #[test]
    fn nullable_value_types_always_get_a_marker() {
        let lang = CSharpLanguage::default();
        let int = TypeRef::Primitive(Primitive::Int32).nullable();
        let string = TypeRef::Primitive(Primitive::String).nullable();
        assert_eq!(lang.render_type(&int, TypeUsage::Property, &naming()), "int?");
        assert_eq!(lang.render_type(&string, TypeUsage::Property, &naming()), "string");
        assert_eq!(
            lang.render_type(
                &TypeRef::Enum("Kind".into()).nullable(),
                TypeUsage::Property,
                &naming()
            ),
            "Kind?"
        );
    }

    #[test]
    fn reference_types_are_annotated_with_nullable_reference_types() {
        let lang = CSharpLanguage {
            nullable_reference_types: true,
            ..CSharpLanguage::default()
        };
        let pet = TypeRef::Class("Pet".into()).nullable();
        assert_eq!(lang.render_type(&pet, TypeUsage::Response, &naming()), "Pet?");
    }

    #[test]
    fn files_depend_on_usage() {
        let lang = CSharpLanguage::default();
        assert_eq!(
            lang.render_type(&TypeRef::Binary, TypeUsage::Parameter, &naming()),
            "FileParameter"
        );
        assert_eq!(
            lang.render_type(&TypeRef::Binary, TypeUsage::Response, &naming()),
            "FileResponse"
        );
        assert_eq!(lang.render_type(&TypeRef::Binary, TypeUsage::Property, &naming()), "byte[]");
    }

    #[test]
    fn dates_use_configured_type() {
        let lang = CSharpLanguage {
            date_time_type: "System.DateTime".to_string(),
            ..CSharpLanguage::default()
        };
        let date = TypeRef::Primitive(Primitive::DateTime);
        assert_eq!(lang.render_type(&date, TypeUsage::Property, &naming()), "System.DateTime");
        assert_eq!(
            lang.render_type(&date.nullable(), TypeUsage::Property, &naming()),
            "System.DateTime?"
        );
    }

    #[test]
    fn maps_and_unions() {
        let lang = CSharpLanguage::default();
        let map = TypeRef::Map(Box::new(TypeRef::Primitive(Primitive::Int64)));
        assert_eq!(
            lang.render_type(&map, TypeUsage::Property, &naming()),
            "System.Collections.Generic.IDictionary<string, long>"
        );
        let union = TypeRef::Union(vec![
            TypeRef::Class("Dog".into()),
            TypeRef::Class("Cat".into()),
        ]);
        assert_eq!(lang.render_type(&union, TypeUsage::Parameter, &naming()), "object");
    }

    #[test]
    fn method_and_result_types() {
        let lang = CSharpLanguage {
            generate_sync_methods: true,
            ..CSharpLanguage::default()
        };
        assert_eq!(lang.method_name("GetPet"), "GetPetAsync");
        assert_eq!(lang.sync_method_name("GetPet").as_deref(), Some("GetPet"));
        assert_eq!(lang.async_type(Some("Pet")), "System.Threading.Tasks.Task<Pet>");
        assert_eq!(lang.async_type(None), "System.Threading.Tasks.Task");
        assert_eq!(lang.sync_type(None).as_deref(), Some("void"));
        assert_eq!(CSharpLanguage::default().sync_method_name("GetPet"), None);
    }

    #[test]
    fn default_literals() {
        let lang = CSharpLanguage::default();
        let string = TypeRef::Primitive(Primitive::String);
        assert_eq!(
            lang.format_default(&serde_json::json!("say \"hi\""), &string).as_deref(),
            Some(r#""say \"hi\"""#)
        );
        let int = TypeRef::Primitive(Primitive::Int32);
        assert_eq!(lang.format_default(&serde_json::json!(20), &int).as_deref(), Some("20"));
        let decimal = TypeRef::Primitive(Primitive::Decimal);
        assert_eq!(
            lang.format_default(&serde_json::json!(1.5), &decimal).as_deref(),
            Some("1.5m")
        );
        let status = TypeRef::Enum("Status".into()).nullable();
        assert_eq!(
            lang.format_default(&serde_json::json!("sold_out"), &status).as_deref(),
            Some("Status.SoldOut")
        );
        assert_eq!(lang.format_default(&serde_json::json!([1]), &string), None);
    }

    #[test]
    fn keywords_are_escaped() {
        let lang = CSharpLanguage::default();
        assert_eq!(lang.escape_identifier("namespace"), "@namespace");
        assert_eq!(lang.escape_identifier("petId"), "petId");
    }

    #[test]
    fn optional_parameters_default_to_null() {
        let lang = CSharpLanguage::default();
        assert_eq!(lang.declare_parameter("int?", "limit", true, Some("20")), "int? limit = 20");
        assert_eq!(lang.declare_parameter("string", "tag", true, None), "string tag = null");
        assert_eq!(lang.declare_parameter("long", "petId", false, None), "long petId");
    }
}
