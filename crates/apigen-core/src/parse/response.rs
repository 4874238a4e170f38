use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::media_type::MediaType;
use super::schema::SchemaOrRef;

/// One alternative payload declared for a status code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedSchema {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub schema: SchemaOrRef,
}

/// A response definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, serde_json::Value>,

    /// Several payload schemas declared for the same status code.
    #[serde(
        rename = "x-expectedSchemas",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub x_expected_schemas: Vec<ExpectedSchema>,

    #[serde(rename = "x-nullable", skip_serializing_if = "Option::is_none")]
    pub x_nullable: Option<bool>,
}

impl Response {
    /// The media type whose schema describes the payload, JSON first.
    pub fn preferred_content(&self) -> Option<(&str, &MediaType)> {
        self.content
            .get_key_value("application/json")
            .or_else(|| self.content.iter().find(|(ct, _)| ct.ends_with("+json")))
            .or_else(|| self.content.first())
            .map(|(ct, mt)| (ct.as_str(), mt))
    }
}

/// A reference or inline response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Response(Response),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_expected_schemas_extension() {
        let response: Response = serde_yaml_ng::from_str(
            r##"
description: Not found
x-expectedSchemas:
  - description: missing pet
    schema: { $ref: "#/components/schemas/PetMissing" }
  - schema: { $ref: "#/components/schemas/OwnerMissing" }
"##,
        )
        .unwrap();
        assert_eq!(response.x_expected_schemas.len(), 2);
        assert_eq!(
            response.x_expected_schemas[0].description.as_deref(),
            Some("missing pet")
        );
    }

    #[test]
    fn vendor_json_counts_as_json() {
        let response: Response = serde_yaml_ng::from_str(
            r#"
description: ok
content:
  text/plain: {}
  application/problem+json: {}
"#,
        )
        .unwrap();
        assert_eq!(
            response.preferred_content().unwrap().0,
            "application/problem+json"
        );
    }
}
