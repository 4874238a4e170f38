use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::media_type::MediaType;

/// Content types tried, in order, when picking the media type of a body.
pub const PREFERRED_BODY_CONTENT_TYPES: &[&str] = &[
    "application/json",
    "multipart/form-data",
    "application/x-www-form-urlencoded",
    "application/octet-stream",
];

/// A request body definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub content: IndexMap<String, MediaType>,

    #[serde(default)]
    pub required: bool,

    /// Name of the generated body parameter.
    #[serde(rename = "x-name", skip_serializing_if = "Option::is_none")]
    pub x_name: Option<String>,
}

impl RequestBody {
    /// The media type the generated client sends.
    pub fn preferred_content(&self) -> Option<(&str, &MediaType)> {
        PREFERRED_BODY_CONTENT_TYPES
            .iter()
            .find_map(|ct| self.content.get_key_value(*ct))
            .or_else(|| self.content.first())
            .map(|(ct, mt)| (ct.as_str(), mt))
    }
}

/// A reference or inline request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestBodyOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    RequestBody(RequestBody),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_json_over_declaration_order() {
        let body: RequestBody = serde_yaml_ng::from_str(
            r#"
content:
  text/plain: {}
  application/json: {}
"#,
        )
        .unwrap();
        assert_eq!(body.preferred_content().unwrap().0, "application/json");
    }

    #[test]
    fn falls_back_to_first_declared() {
        let body: RequestBody = serde_yaml_ng::from_str(
            r#"
content:
  text/csv: {}
  text/plain: {}
"#,
        )
        .unwrap();
        assert_eq!(body.preferred_content().unwrap().0, "text/csv");
    }
}
