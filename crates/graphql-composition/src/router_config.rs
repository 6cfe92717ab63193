//! Per-subgraph configuration consumed by the router to route fields to subgraphs.

use async_graphql_parser::types::ServiceDocument;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Composition metadata for one object or interface type of one subgraph.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationData {
    pub type_name: String,
    /// Fields the subgraph resolves. `@external` fields are left out unless they are part of a key.
    pub field_names: BTreeSet<String>,
    /// Root operation types and entities.
    pub is_root_node: bool,
    pub is_interface_object: bool,
    /// Only populated for interface objects.
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub entity_interface_concrete_type_names: BTreeSet<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<RequiredFieldConfiguration>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub provides: Vec<RequiredFieldConfiguration>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<RequiredFieldConfiguration>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub external_field_names: BTreeSet<String>,
}

impl ConfigurationData {
    pub(crate) fn new(type_name: impl Into<String>) -> Self {
        ConfigurationData {
            type_name: type_name.into(),
            ..Default::default()
        }
    }

    /// Add keys, skipping selection sets that are already present.
    pub(crate) fn merge_keys<'a>(&mut self, keys: impl IntoIterator<Item = &'a RequiredFieldConfiguration>) {
        for key in keys {
            if !self.keys.iter().any(|existing| existing.selection_set == key.selection_set) {
                self.keys.push(key.clone());
            }
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.field_names.is_empty() && self.keys.is_empty()
    }
}

/// A field set attached to a type (`@key`, with an empty field name) or to a field (`@provides`,
/// `@requires`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredFieldConfiguration {
    pub field_name: String,
    pub selection_set: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub disable_entity_resolver: bool,
}

/// Authorization the router enforces on one field of the federated graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfiguration {
    pub type_name: String,
    pub field_name: String,
    pub argument_names: Vec<String>,
    pub requires_authentication: bool,
    /// Any one inner list grants access. Each inner list is sorted.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required_scopes: Vec<Vec<String>>,
}

/// What the router needs to know about one subgraph of a federated graph.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubgraphConfig {
    pub url: String,
    pub configuration_data_by_type_name: BTreeMap<String, ConfigurationData>,
    /// The normalized schema of the subgraph.
    #[serde(skip)]
    pub schema: ServiceDocument,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keys_deduplicates() {
        let key = |selection_set: &str| RequiredFieldConfiguration {
            field_name: String::new(),
            selection_set: selection_set.to_owned(),
            disable_entity_resolver: false,
        };

        let mut data = ConfigurationData::new("User");
        data.merge_keys(&[key("id"), key("id"), key("email")]);

        assert_eq!(
            data.keys.iter().map(|key| key.selection_set.as_str()).collect::<Vec<_>>(),
            ["id", "email"]
        );
        assert!(!data.is_empty());
    }
}
