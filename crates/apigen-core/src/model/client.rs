use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::{ClientNaming, ClientOptions, CommonOptions, NamingStrategy};
use crate::ingest::OperationSource;
use crate::naming::{normalize_name, route_to_name, unique_name};

use super::operation::OperationModel;

/// Operations that share one generated client.
#[derive(Debug, Clone)]
pub struct ClientGroup<'doc> {
    /// Group name before casing. Empty for the unnamed group.
    pub controller: String,
    /// Operation names, unique within the group, paired with their source.
    pub operations: Vec<(String, OperationSource<'doc>)>,
}

/// Name of an operation before any grouping prefix is removed, with
/// aliases applied.
pub fn operation_base_name(source: &OperationSource<'_>, common: &CommonOptions) -> String {
    let raw = match common.naming_strategy {
        NamingStrategy::UseOperationId => source
            .operation
            .operation_id
            .clone()
            .unwrap_or_else(|| route_to_name(source.method.as_str(), source.path)),
        NamingStrategy::UseRouteBased => route_to_name(source.method.as_str(), source.path),
    };
    common.aliases.get(&raw).cloned().unwrap_or(raw)
}

/// First path segment that is not a placeholder.
fn first_path_segment(path: &str) -> &str {
    path.split('/')
        .find(|s| !s.is_empty() && !s.starts_with('{'))
        .unwrap_or_default()
}

/// Client an operation belongs to, and its name inside that client.
fn assign(
    source: &OperationSource<'_>,
    strategy: ClientNaming,
    common: &CommonOptions,
) -> (String, String) {
    let name = operation_base_name(source, common);
    match strategy {
        ClientNaming::PerTag => (
            source.operation.tags.first().cloned().unwrap_or_default(),
            name,
        ),
        ClientNaming::Single => (String::new(), name),
        ClientNaming::PerPathSegment => (first_path_segment(source.path).to_string(), name),
        ClientNaming::OperationIdPrefix => match name.split_once('_') {
            Some((prefix, rest)) if !prefix.is_empty() && !rest.is_empty() => {
                (prefix.to_string(), rest.to_string())
            }
            _ => (String::new(), name),
        },
    }
}

/// Group operations into clients, in order of first appearance. Names
/// that collide inside a client get a numeric suffix.
pub fn group_operations<'doc>(
    sources: Vec<OperationSource<'doc>>,
    strategy: ClientNaming,
    common: &CommonOptions,
) -> Vec<ClientGroup<'doc>> {
    let mut groups: IndexMap<String, ClientGroup<'doc>> = IndexMap::new();
    let mut taken: IndexMap<String, HashSet<String>> = IndexMap::new();

    for source in sources {
        let (controller, name) = assign(&source, strategy, common);
        let key = normalize_name(&controller).pascal_case;
        let key = if controller.is_empty() { String::new() } else { key };

        let names = taken.entry(key.clone()).or_default();
        let pascal = normalize_name(&name).pascal_case;
        let unique = unique_name(&pascal, |candidate| names.contains(candidate));
        let name = if unique == pascal {
            name
        } else {
            // Keep the suffix stable under later casing.
            format!("{name}{}", &unique[pascal.len()..])
        };
        names.insert(unique);

        groups
            .entry(key)
            .or_insert_with(|| ClientGroup {
                controller,
                operations: Vec::new(),
            })
            .operations
            .push((name, source));
    }
    groups.into_values().collect()
}

/// Replace `{controller}` in a naming template.
pub fn apply_controller(template: &str, controller: &str) -> String {
    template.replace("{controller}", &normalize_name(controller).pascal_case)
}

/// Class name of a generated client.
pub fn client_class_name(options: &ClientOptions, controller: &str) -> String {
    if controller.is_empty() {
        options.class_name_template.replace("{controller}", "")
    } else {
        apply_controller(&options.class_name_template, controller)
    }
}

/// Exception class thrown by a client's operations.
pub fn exception_class_name(options: &ClientOptions, controller: &str) -> String {
    if controller.is_empty() {
        options.exception_class_name_template.replace("{controller}", "")
    } else {
        apply_controller(&options.exception_class_name_template, controller)
    }
}

/// One generated client.
#[derive(Debug, Clone, Serialize)]
pub struct ClientModel {
    /// PascalCase group name. Empty for the unnamed group.
    pub controller_name: String,
    pub class_name: String,
    pub interface_name: String,
    pub exception_class: String,
    pub description: Option<String>,
    pub base_url: Option<String>,
    pub operations: Vec<OperationModel>,
    pub generate_interface: bool,
    pub uses_exception_class: bool,
    /// Some failure response needs its payload type checked at runtime.
    pub dispatches_on_payload: bool,
}

impl ClientModel {
    pub fn public_operations(&self) -> impl Iterator<Item = &OperationModel> {
        self.operations.iter().filter(|op| !op.is_protected)
    }

    pub fn has_public_operations(&self) -> bool {
        self.public_operations().next().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use crate::schema::SchemaRegistry;

    const DOC: &str = r##"
openapi: "3.0.3"
info: { title: Groups, version: "1" }
paths:
  /pets:
    get:
      operationId: Pets_List
      tags: [pets]
      responses: { "200": { description: ok } }
    post:
      tags: [pets]
      responses: { "201": { description: ok } }
  /pets/{id}:
    get:
      operationId: Pets_Get
      tags: [pets]
      parameters: [{ name: id, in: path, required: true, schema: { type: string } }]
      responses: { "200": { description: ok } }
  /store/orders:
    get:
      operationId: listOrders
      responses: { "200": { description: ok } }
  /store/orders/all:
    get:
      operationId: listOrders
      tags: [store]
      responses: { "200": { description: ok } }
"##;

    fn grouped(strategy: ClientNaming, common: &CommonOptions) -> Vec<(String, Vec<String>)> {
        let doc = parse::from_yaml(DOC).unwrap();
        let registry = SchemaRegistry::new(&doc);
        let sources = crate::ingest::collect_operations(&registry).unwrap();
        group_operations(sources, strategy, common)
            .into_iter()
            .map(|g| {
                (
                    g.controller,
                    g.operations.into_iter().map(|(n, _)| n).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn per_tag_uses_first_tag() {
        let groups = grouped(ClientNaming::PerTag, &CommonOptions::default());
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].0, "pets");
        assert_eq!(groups[0].1, vec!["Pets_List", "createPets", "Pets_Get"]);
        assert_eq!(groups[1].0, "");
        assert_eq!(groups[2].0, "store");
    }

    #[test]
    fn single_client_dedupes_names() {
        let groups = grouped(ClientNaming::Single, &CommonOptions::default());
        assert_eq!(groups.len(), 1);
        assert_eq!(
            groups[0].1,
            vec!["Pets_List", "createPets", "Pets_Get", "listOrders", "listOrders2"]
        );
    }

    #[test]
    fn path_segment_grouping() {
        let groups = grouped(ClientNaming::PerPathSegment, &CommonOptions::default());
        let controllers: Vec<&str> = groups.iter().map(|g| g.0.as_str()).collect();
        assert_eq!(controllers, vec!["pets", "store"]);
    }

    #[test]
    fn operation_id_prefix_splits_names() {
        let groups = grouped(ClientNaming::OperationIdPrefix, &CommonOptions::default());
        assert_eq!(groups[0].0, "Pets");
        assert_eq!(groups[0].1, vec!["List", "Get"]);
        assert_eq!(groups[1].0, "");
        assert_eq!(groups[1].1, vec!["createPets", "listOrders", "listOrders2"]);
    }

    #[test]
    fn aliases_rename_operations() {
        let mut common = CommonOptions::default();
        common.aliases.insert("listOrders".into(), "orders".into());
        let groups = grouped(ClientNaming::Single, &common);
        assert_eq!(groups[0].1[3], "orders");
        assert_eq!(groups[0].1[4], "orders2");
    }

    #[test]
    fn class_name_templates() {
        let options = ClientOptions::default();
        assert_eq!(client_class_name(&options, "pet-store"), "PetStoreClient");
        assert_eq!(client_class_name(&options, ""), "Client");
        assert_eq!(exception_class_name(&options, "pets"), "ApiException");
        let options = ClientOptions {
            exception_class_name_template: "{controller}Exception".into(),
            ..ClientOptions::default()
        };
        assert_eq!(exception_class_name(&options, "pets"), "PetsException");
    }
}
