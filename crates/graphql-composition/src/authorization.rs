//! Field authorization declared with `@authenticated` and `@requiresScopes`.
//!
//! Scopes are kept in disjunctive form: a request is authorized by any one of the sets, and a set
//! requires every scope it contains. Combining two requirements is a logical AND, which takes the
//! product of both lists of sets.

use crate::{
    diagnostics::Diagnostics, federated_graph::FederatedGraph, router_config::FieldConfiguration,
    CompositionError,
};
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet};

/// The most alternative scope sets a single field can require.
pub const MAX_OR_SCOPES: usize = 16;

/// Authentication and scopes required at one type or field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizationRequirements {
    pub requires_authentication: bool,
    pub required_scopes: Vec<BTreeSet<String>>,
}

/// The requirements one subgraph, or the merge of all of them, declares on a type and its fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizationData {
    pub type_name: String,
    /// Declared on the type itself. Fields returning the type inherit these.
    pub requirements: AuthorizationRequirements,
    pub fields: BTreeMap<String, AuthorizationRequirements>,
}

impl AuthorizationRequirements {
    pub fn is_empty(&self) -> bool {
        !self.requires_authentication && self.required_scopes.is_empty()
    }

    /// Add one alternative set of scopes. Empty and repeated sets are skipped.
    pub(crate) fn push_scopes(&mut self, scopes: BTreeSet<String>) {
        if !scopes.is_empty() && !self.required_scopes.contains(&scopes) {
            self.required_scopes.push(scopes);
        }
    }

    /// Require both `self` and `other`. Returns `false` when the merged scopes would exceed
    /// [MAX_OR_SCOPES], in which case the scopes of `self` are left as they were.
    pub(crate) fn merge_by_and(&mut self, other: &AuthorizationRequirements) -> bool {
        self.requires_authentication |= other.requires_authentication;

        if other.required_scopes.is_empty() {
            return true;
        }

        if self.required_scopes.is_empty() {
            if other.required_scopes.len() > MAX_OR_SCOPES {
                return false;
            }

            self.required_scopes = other.required_scopes.clone();
            return true;
        }

        if self.required_scopes.len() * other.required_scopes.len() > MAX_OR_SCOPES {
            return false;
        }

        let product = self
            .required_scopes
            .iter()
            .cartesian_product(&other.required_scopes)
            .map(|(left, right)| left.union(right).cloned().collect::<BTreeSet<_>>())
            .collect::<Vec<_>>();

        self.required_scopes.clear();

        for scopes in product {
            self.push_scopes(scopes);
        }

        true
    }
}

impl AuthorizationData {
    pub(crate) fn new(type_name: impl Into<String>) -> Self {
        AuthorizationData {
            type_name: type_name.into(),
            ..Default::default()
        }
    }
}

/// Merge the authorization data of every subgraph. A type or field protected in one subgraph is
/// protected in the federated graph.
pub(crate) fn merge_subgraphs<'a>(
    subgraphs: impl IntoIterator<Item = &'a BTreeMap<String, AuthorizationData>>,
    diagnostics: &mut Diagnostics,
) -> BTreeMap<String, AuthorizationData> {
    let mut merged: BTreeMap<String, AuthorizationData> = BTreeMap::new();
    let mut invalid_coordinates = BTreeSet::new();

    for (type_name, incoming) in subgraphs.into_iter().flatten() {
        let existing = merged
            .entry(type_name.clone())
            .or_insert_with(|| AuthorizationData::new(type_name.as_str()));

        if !existing.requirements.merge_by_and(&incoming.requirements) {
            invalid_coordinates.insert(type_name.clone());
        }

        for (field_name, requirements) in &incoming.fields {
            if !existing.fields.entry(field_name.clone()).or_default().merge_by_and(requirements) {
                invalid_coordinates.insert(format!("{type_name}.{field_name}"));
            }
        }
    }

    push_limit_error(invalid_coordinates, diagnostics);

    merged
}

/// The authorization configuration of every protected field of the graph. Fields inherit the
/// requirements of the type they return.
pub(crate) fn field_configurations(
    graph: &FederatedGraph,
    authorization: &BTreeMap<String, AuthorizationData>,
    diagnostics: &mut Diagnostics,
) -> Vec<FieldConfiguration> {
    let mut configurations = Vec::new();
    let mut invalid_coordinates = BTreeSet::new();

    for definition in graph.definitions.values() {
        let Some(fields) = definition.fields() else {
            continue;
        };

        let type_name = definition.name();
        let declared = authorization.get(type_name);

        for field in fields.values() {
            let mut requirements = declared
                .and_then(|data| data.fields.get(&field.name))
                .cloned()
                .unwrap_or_default();

            let named_type = crate::utils::named_type(&field.ty);

            if let Some(inherited) = authorization.get(named_type) {
                if !requirements.merge_by_and(&inherited.requirements) {
                    invalid_coordinates.insert(format!("{type_name}.{}", field.name));
                    continue;
                }
            }

            if requirements.is_empty() {
                continue;
            }

            configurations.push(FieldConfiguration {
                type_name: type_name.to_owned(),
                field_name: field.name.clone(),
                argument_names: field.arguments.iter().map(|argument| argument.name.clone()).collect(),
                requires_authentication: requirements.requires_authentication,
                required_scopes: requirements
                    .required_scopes
                    .into_iter()
                    .map(|scopes| scopes.into_iter().collect())
                    .collect(),
            });
        }
    }

    push_limit_error(invalid_coordinates, diagnostics);

    configurations
}

fn push_limit_error(coordinates: BTreeSet<String>, diagnostics: &mut Diagnostics) {
    if coordinates.is_empty() {
        return;
    }

    diagnostics.push_fatal(CompositionError::OrScopesLimit {
        max_or_scopes: MAX_OR_SCOPES,
        coordinates: coordinates.into_iter().collect(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scopes(sets: &[&[&str]]) -> AuthorizationRequirements {
        AuthorizationRequirements {
            requires_authentication: false,
            required_scopes: sets
                .iter()
                .map(|set| set.iter().map(|scope| (*scope).to_owned()).collect())
                .collect(),
        }
    }

    #[test]
    fn and_merge_takes_the_product_of_alternatives() {
        let mut requirements = scopes(&[&["a"], &["b"]]);
        assert!(requirements.merge_by_and(&scopes(&[&["c"], &["a", "d"]])));

        assert_eq!(requirements, scopes(&[&["a", "c"], &["a", "d"], &["b", "c"], &["a", "b", "d"]]));
    }

    #[test]
    fn and_merge_deduplicates_sets() {
        let mut requirements = scopes(&[&["a"], &["a", "b"]]);
        assert!(requirements.merge_by_and(&scopes(&[&["b"]])));

        assert_eq!(requirements, scopes(&[&["a", "b"]]));
    }

    #[test]
    fn and_merge_into_empty_requirements() {
        let mut requirements = AuthorizationRequirements {
            requires_authentication: true,
            required_scopes: Vec::new(),
        };
        assert!(requirements.merge_by_and(&scopes(&[&["a"]])));

        assert!(requirements.requires_authentication);
        assert_eq!(requirements.required_scopes, scopes(&[&["a"]]).required_scopes);
    }

    #[test]
    fn and_merge_over_the_limit_keeps_the_existing_scopes() {
        let five: Vec<String> = (0..5).map(|idx| format!("s{idx}")).collect();
        let five = AuthorizationRequirements {
            requires_authentication: false,
            required_scopes: five.iter().map(|scope| BTreeSet::from([scope.clone()])).collect(),
        };

        let mut requirements = five.clone();
        assert!(!requirements.merge_by_and(&five));
        assert_eq!(requirements, five);
    }
}
