use serde::Serialize;

use crate::config::TypeNamingOptions;
use crate::naming::normalize_name;
use crate::schema::type_ref::TypeRef;

/// Where a resolved type is used. Arrays render differently per site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TypeUsage {
    Response,
    Parameter,
    Property,
}

/// Placeholder for the element type in array and dictionary templates.
pub const ELEMENT_PLACEHOLDER: &str = "%T%";

/// Substitute the element type into a `%T%` template.
pub fn apply_template(template: &str, element: &str) -> String {
    template.replace(ELEMENT_PLACEHOLDER, element)
}

/// Surface syntax of one generated language.
///
/// Everything the language-neutral models need to know about a target
/// goes through this trait: type names, identifiers and the wrappers
/// around operation results.
pub trait TargetLanguage {
    /// Tag stamped on every artifact, e.g. `csharp`.
    fn tag(&self) -> &'static str;

    fn render_type(&self, ty: &TypeRef, usage: TypeUsage, naming: &TypeNamingOptions) -> String;

    /// Whether a parameter can be typed as `A | B` at the call site.
    fn supports_union_syntax(&self) -> bool;

    /// Whether polymorphic parameters expand to their leaf types.
    fn use_leaf_types(&self) -> bool {
        false
    }

    fn keywords(&self) -> &'static [&'static str];

    /// Prefix put in front of identifiers that collide with a keyword.
    fn keyword_escape(&self) -> &'static str;

    fn escape_identifier(&self, ident: &str) -> String {
        if self.keywords().contains(&ident) {
            format!("{}{ident}", self.keyword_escape())
        } else {
            ident.to_string()
        }
    }

    /// Identifier for a parameter, before keyword escaping.
    fn parameter_identifier(&self, name: &str) -> String {
        normalize_name(name).camel_case
    }

    /// Identifier for a DTO property.
    fn property_identifier(&self, name: &str) -> String;

    /// Whether a DTO property's type is nullable. Optional properties are
    /// nullable unless the language marks optionality another way.
    fn property_is_nullable(&self, required: bool, schema_nullable: bool) -> bool {
        !required || schema_nullable
    }

    /// Name of the asynchronous method generated for an operation.
    fn method_name(&self, operation: &str) -> String;

    /// Name of the synchronous sibling method, for languages that have one.
    fn sync_method_name(&self, _operation: &str) -> Option<String> {
        None
    }

    /// Wrap a result type (`None` for no content) in the async type.
    fn async_type(&self, result: Option<&str>) -> String;

    /// Result type of the synchronous sibling method.
    fn sync_type(&self, _result: Option<&str>) -> Option<String> {
        None
    }

    /// Wrap a result type in the generic response envelope.
    fn envelope_type(&self, envelope: &str, result: Option<&str>) -> String;

    /// The top type, used when nothing narrower is known.
    fn universal_type(&self) -> &'static str;

    /// Thrown when no single payload type describes the failure.
    fn universal_exception_type(&self) -> &'static str;

    /// Source literal for a default value, if the language can express it.
    fn format_default(&self, value: &serde_json::Value, ty: &TypeRef) -> Option<String>;

    /// One entry of a method's parameter list.
    fn declare_parameter(
        &self,
        type_name: &str,
        variable_name: &str,
        optional: bool,
        default_literal: Option<&str>,
    ) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;

    impl TargetLanguage for Plain {
        fn tag(&self) -> &'static str {
            "plain"
        }
        fn render_type(&self, _: &TypeRef, _: TypeUsage, _: &TypeNamingOptions) -> String {
            String::new()
        }
        fn supports_union_syntax(&self) -> bool {
            false
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
            result.unwrap_or("void").to_string()
        }
        fn envelope_type(&self, envelope: &str, _: Option<&str>) -> String {
            envelope.to_string()
        }
        fn universal_type(&self) -> &'static str {
            "object"
        }
        fn universal_exception_type(&self) -> &'static str {
            "Exception"
        }
        fn format_default(&self, _: &serde_json::Value, _: &TypeRef) -> Option<String> {
            None
        }
        fn declare_parameter(&self, t: &str, v: &str, _: bool, _: Option<&str>) -> String {
            format!("{t} {v}")
        }
    }

    #[test]
    fn keywords_get_escaped() {
        assert_eq!(Plain.escape_identifier("class"), "@class");
        assert_eq!(Plain.escape_identifier("petId"), "petId");
    }

    #[test]
    fn parameter_identifier_is_camel_case() {
        assert_eq!(Plain.parameter_identifier("X-Request-Id"), "xRequestId");
        assert_eq!(Plain.parameter_identifier("pet_id"), "petId");
    }

    #[test]
    fn template_substitution() {
        assert_eq!(apply_template("List<%T%>", "string"), "List<string>");
        assert_eq!(
            apply_template("{ [key: string]: %T%; }", "number"),
            "{ [key: string]: number; }"
        );
    }
}
