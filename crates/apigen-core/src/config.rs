use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Top-level project configuration loaded from `.apigen.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApigenConfig {
    pub input: String,
    pub output: String,
    pub targets: Vec<TargetKind>,
    pub settings: GeneratorSettings,
    pub csharp: CSharpOptions,
    pub typescript: TypeScriptOptions,
}

impl Default for ApigenConfig {
    fn default() -> Self {
        Self {
            input: "openapi.yaml".to_string(),
            output: "generated".to_string(),
            targets: vec![TargetKind::Csharp, TargetKind::Typescript],
            settings: GeneratorSettings::default(),
            csharp: CSharpOptions::default(),
            typescript: TypeScriptOptions::default(),
        }
    }
}

/// Which generators to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Csharp,
    Typescript,
}

impl TargetKind {
    /// Subdirectory of the output directory the target writes into.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Csharp => "csharp",
            Self::Typescript => "typescript",
        }
    }
}

/// Language-independent generator settings, split by the component that reads them.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    pub common: CommonOptions,
    pub type_naming: TypeNamingOptions,
    pub client: ClientOptions,
}

/// Options read while building operation models.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CommonOptions {
    /// Reorder parameters so optional ones can carry defaults.
    pub generate_optional_parameters: bool,
    /// Wrap every result in the response envelope type.
    pub wrap_responses: bool,
    pub naming_strategy: NamingStrategy,
    /// Map from resolved operation name (operationId or route-derived) to custom alias.
    pub aliases: IndexMap<String, String>,
}

impl Default for CommonOptions {
    fn default() -> Self {
        Self {
            generate_optional_parameters: true,
            wrap_responses: false,
            naming_strategy: NamingStrategy::UseOperationId,
            aliases: IndexMap::new(),
        }
    }
}

/// How operation names are derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingStrategy {
    #[default]
    UseOperationId,
    UseRouteBased,
}

/// Type-name templates. `%T%` stands for the element type. Unset
/// templates fall back to the target language's defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TypeNamingOptions {
    pub response_array_type: Option<String>,
    pub parameter_array_type: Option<String>,
    /// Arrays in DTO properties.
    pub array_type: Option<String>,
    pub dictionary_type: Option<String>,
    pub file_parameter_type: String,
    pub file_response_type: String,
    /// Generic envelope used when `wrap_responses` is on.
    pub response_envelope_type: String,
}

impl Default for TypeNamingOptions {
    fn default() -> Self {
        Self {
            response_array_type: None,
            parameter_array_type: None,
            array_type: None,
            dictionary_type: None,
            file_parameter_type: "FileParameter".to_string(),
            file_response_type: "FileResponse".to_string(),
            response_envelope_type: "SwaggerResponse".to_string(),
        }
    }
}

/// Options read while grouping operations into clients.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    pub client_naming: ClientNaming,
    /// `{controller}` is replaced by the group name.
    pub class_name_template: String,
    pub generate_client_interfaces: bool,
    /// `ClientName.OperationName` entries generated as protected methods.
    pub protected_methods: Vec<String>,
    /// `{controller}` is replaced by the group name.
    pub exception_class_name_template: String,
    pub base_url: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            client_naming: ClientNaming::PerTag,
            class_name_template: "{controller}Client".to_string(),
            generate_client_interfaces: false,
            protected_methods: Vec::new(),
            exception_class_name_template: "ApiException".to_string(),
            base_url: None,
        }
    }
}

/// How operations are grouped into client classes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientNaming {
    /// One client per first tag.
    #[default]
    PerTag,
    /// Everything in one client.
    Single,
    /// One client per first non-parameter path segment.
    PerPathSegment,
    /// `Pets_GetPet` goes to client `Pets` as `GetPet`.
    OperationIdPrefix,
}

/// Output options for the C# target.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CSharpOptions {
    pub namespace: String,
    pub use_nullable_reference_types: bool,
    pub generate_sync_methods: bool,
    pub date_time_type: String,
    pub output: OutputLayout,
    /// File name used by the single-file layout.
    pub file_name: String,
}

impl Default for CSharpOptions {
    fn default() -> Self {
        Self {
            namespace: "ApiClient".to_string(),
            use_nullable_reference_types: false,
            generate_sync_methods: false,
            date_time_type: "System.DateTimeOffset".to_string(),
            output: OutputLayout::Single,
            file_name: "Client.g.cs".to_string(),
        }
    }
}

/// How artifacts are laid out on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputLayout {
    /// All artifacts concatenated into one file.
    #[default]
    Single,
    /// One file per artifact.
    Multiple,
}

/// Output options for the TypeScript target.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TypeScriptOptions {
    pub template: TypeScriptTemplate,
    pub strict_null_checks: bool,
    /// Expand polymorphic parameters into a union of their leaf types.
    pub use_leaf_types: bool,
    pub date_time_type: String,
    pub file_name: String,
}

impl Default for TypeScriptOptions {
    fn default() -> Self {
        Self {
            template: TypeScriptTemplate::Fetch,
            strict_null_checks: true,
            use_leaf_types: false,
            date_time_type: "string".to_string(),
            file_name: "client.ts".to_string(),
        }
    }
}

/// HTTP client the generated TypeScript uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeScriptTemplate {
    #[default]
    Fetch,
    Axios,
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".apigen.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<ApigenConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
    let config: ApigenConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# apigen configuration
input: openapi.yaml
output: generated
targets: [csharp, typescript]

settings:
  common:
    generate_optional_parameters: true
    wrap_responses: false
    naming_strategy: use_operation_id  # use_operation_id | use_route_based
    aliases: {}
      # createChatCompletion: chat     # operationId → custom name
  type_naming:
    # response_array_type: "System.Collections.Generic.ICollection<%T%>"
    # parameter_array_type: "System.Collections.Generic.IEnumerable<%T%>"
    file_parameter_type: FileParameter
    file_response_type: FileResponse
    response_envelope_type: SwaggerResponse
  client:
    client_naming: per_tag  # per_tag | single | per_path_segment | operation_id_prefix
    class_name_template: "{controller}Client"
    generate_client_interfaces: false
    protected_methods: []
      # - PetsClient.DeletePet
    exception_class_name_template: ApiException
    # base_url: https://api.example.com

csharp:
  namespace: ApiClient
  use_nullable_reference_types: false
  generate_sync_methods: false
  date_time_type: System.DateTimeOffset
  output: single        # single | multiple
  file_name: Client.g.cs

typescript:
  template: fetch       # fetch | axios
  strict_null_checks: true
  use_leaf_types: false
  date_time_type: string
  file_name: client.ts
"#
}
