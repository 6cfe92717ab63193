//! Reachability analysis over the federated graph.
//!
//! Starting from every root field, the walk tracks the set of subgraphs a selection can be
//! planned in. Entering an entity extends that set with every subgraph reachable through a key
//! whose fields are already available. A field that none of the subgraphs in the set can resolve
//! is reported with the path that reaches it.

use crate::{
    federated_graph::{Definition, FederatedGraph, Field, Object},
    normalization::{parse_field_set, FieldSetSelection},
    utils::named_type,
    CompositionError, Diagnostics,
};
use std::collections::{BTreeMap, BTreeSet};

const ROOT_TYPES: [(&str, &str); 3] = [
    ("Query", "query"),
    ("Mutation", "mutation"),
    ("Subscription", "subscription"),
];

type SubgraphSet<'a> = BTreeSet<&'a str>;

/// A field set selection made available by `@provides`, with the subgraph that provides it.
type Provided<'a> = Vec<(&'a str, FieldSetSelection)>;

pub(crate) fn validate_resolvability(graph: &FederatedGraph, diagnostics: &mut Diagnostics) {
    let mut walker = Walker {
        graph,
        visited: BTreeSet::new(),
        stack: Vec::new(),
        errors: BTreeMap::new(),
    };

    for (root_type_name, operation) in ROOT_TYPES {
        let Some(root) = graph.object(root_type_name) else {
            continue;
        };

        for field in root.fields.values() {
            let subgraphs: SubgraphSet<'_> = field.resolvable_in.iter().map(String::as_str).collect();
            let root_field = RootField {
                coordinates: format!("{root_type_name}.{}", field.name),
                subgraphs: &field.resolvable_in,
            };
            let mut path = vec![operation.to_owned(), field.name.clone()];
            let provided = provided_by(field, &subgraphs);

            walker.walk_composite(&root_field, named_type(&field.ty), subgraphs, &mut path, provided);
        }
    }

    tracing::debug!(unresolvable_fields = walker.errors.len(), "resolvability validation done");

    for error in walker.errors.into_values() {
        diagnostics.push_fatal(error);
    }
}

struct RootField<'a> {
    coordinates: String,
    subgraphs: &'a [String],
}

struct Walker<'a> {
    graph: &'a FederatedGraph,
    /// (type name, subgraph set) pairs already walked without any provided fields.
    visited: BTreeSet<(&'a str, Vec<&'a str>)>,
    /// The nodes on the current path.
    stack: Vec<(&'a str, Vec<&'a str>)>,
    /// The first error for each unresolvable field, keyed by field coordinates.
    errors: BTreeMap<String, CompositionError>,
}

impl<'a> Walker<'a> {
    fn walk_composite(
        &mut self,
        root_field: &RootField<'_>,
        type_name: &str,
        subgraphs: SubgraphSet<'a>,
        path: &mut Vec<String>,
        provided: Provided<'a>,
    ) {
        let graph = self.graph;

        match graph.definition(type_name) {
            Some(Definition::Object(object)) => self.walk_object(root_field, object, subgraphs, path, provided),
            Some(Definition::Interface(_) | Definition::Union(_)) => {
                for member in graph.possible_types(type_name) {
                    let Some(object) = graph.object(member) else {
                        continue;
                    };

                    // Abstract types only lead to the members known to the same subgraphs.
                    let member_subgraphs: SubgraphSet<'a> = subgraphs
                        .iter()
                        .copied()
                        .filter(|subgraph| defines_object(object, subgraph))
                        .collect();

                    if member_subgraphs.is_empty() {
                        continue;
                    }

                    let member_provided = provided
                        .iter()
                        .flat_map(|(subgraph, selection)| match selection {
                            FieldSetSelection::InlineFragment {
                                type_condition: Some(condition),
                                selection_set,
                            } if condition == member => selection_set
                                .iter()
                                .map(|selection| (*subgraph, selection.clone()))
                                .collect::<Vec<_>>(),
                            FieldSetSelection::Field { .. } => vec![(*subgraph, selection.clone())],
                            _ => Vec::new(),
                        })
                        .collect();

                    path.push(format!("... on {member}"));
                    self.walk_object(root_field, object, member_subgraphs, path, member_provided);
                    path.pop();
                }
            }
            _ => (),
        }
    }

    fn walk_object(
        &mut self,
        root_field: &RootField<'_>,
        object: &'a Object,
        subgraphs: SubgraphSet<'a>,
        path: &mut Vec<String>,
        provided: Provided<'a>,
    ) {
        let node = (object.name.as_str(), subgraphs.iter().copied().collect::<Vec<_>>());

        // Provided fields make a walk path-specific: those are only cut on cycles.
        if self.stack.contains(&node) || (provided.is_empty() && !self.visited.insert(node.clone())) {
            return;
        }

        self.stack.push(node);

        let reachable = key_closure(object, &subgraphs, &provided);

        for field in object.fields.values() {
            let resolvers: SubgraphSet<'a> = reachable
                .iter()
                .copied()
                .filter(|subgraph| is_available(object, subgraph, &field.name))
                .collect();

            let provided_here: Vec<&(&'a str, FieldSetSelection)> = provided
                .iter()
                .filter(|(_, selection)| selection.field_name() == Some(field.name.as_str()))
                .collect();

            if resolvers.is_empty() && provided_here.is_empty() {
                let coordinates = format!("{}.{}", object.name, field.name);

                self.errors.entry(coordinates.clone()).or_insert_with(|| {
                    unresolvable_path_error(root_field, object, field, &reachable, path, coordinates)
                });

                continue;
            }

            if !self.graph.is_composite(named_type(&field.ty)) {
                continue;
            }

            let mut next = resolvers.clone();
            next.extend(provided_here.iter().map(|(subgraph, _)| *subgraph));

            let mut child_provided: Provided<'a> = provided_here
                .iter()
                .flat_map(|(subgraph, selection)| {
                    selection
                        .selection_set()
                        .iter()
                        .map(|selection| (*subgraph, selection.clone()))
                })
                .collect();
            child_provided.extend(provided_by(field, &resolvers));

            path.push(field.name.clone());
            self.walk_composite(root_field, named_type(&field.ty), next, path, child_provided);
            path.pop();
        }

        self.stack.pop();
    }
}

/// Extend the set with every subgraph reachable through a resolvable key.
fn key_closure<'a>(object: &'a Object, subgraphs: &SubgraphSet<'a>, provided: &Provided<'a>) -> SubgraphSet<'a> {
    let mut reachable = subgraphs.clone();

    loop {
        let mut grew = false;

        for key in object.keys.iter().filter(|key| key.resolvable) {
            if reachable.contains(key.subgraph_name.as_str()) {
                continue;
            }

            let Ok(selections) = parse_field_set(&key.selection_set) else {
                continue;
            };

            let satisfied = selections.iter().filter_map(FieldSetSelection::field_name).all(|field_name| {
                reachable.iter().any(|subgraph| is_available(object, subgraph, field_name))
                    || provided
                        .iter()
                        .any(|(_, selection)| selection.field_name() == Some(field_name))
            });

            if satisfied {
                reachable.insert(key.subgraph_name.as_str());
                grew = true;
            }
        }

        if !grew {
            return reachable;
        }
    }
}

/// Can the subgraph resolve the field? Key fields are always available in the subgraphs that
/// declare the key.
fn is_available(object: &Object, subgraph: &str, field_name: &str) -> bool {
    let resolvable = object
        .fields
        .get(field_name)
        .is_some_and(|field| field.resolvable_in.iter().any(|name| name == subgraph));

    resolvable
        || object
            .keys
            .iter()
            .filter(|key| key.subgraph_name == subgraph)
            .filter_map(|key| parse_field_set(&key.selection_set).ok())
            .any(|selections| selections.iter().any(|selection| selection.field_name() == Some(field_name)))
}

fn defines_object(object: &Object, subgraph: &str) -> bool {
    object.subgraphs.iter().any(|name| name == subgraph) || object.keys.iter().any(|key| key.subgraph_name == subgraph)
}

fn provided_by<'a>(field: &'a Field, subgraphs: &SubgraphSet<'_>) -> Provided<'a> {
    field
        .provides
        .iter()
        .filter(|(subgraph, _)| subgraphs.contains(subgraph.as_str()))
        .filter_map(|(subgraph, field_set)| Some((subgraph.as_str(), parse_field_set(field_set).ok()?)))
        .flat_map(|(subgraph, selections)| selections.into_iter().map(move |selection| (subgraph, selection)))
        .collect()
}

fn unresolvable_path_error(
    root_field: &RootField<'_>,
    object: &Object,
    field: &Field,
    reachable: &SubgraphSet<'_>,
    path: &[String],
    field_coordinates: String,
) -> CompositionError {
    let mut reasons = vec![format!(
        "The root type field \"{}\" is defined in the following subgraph{}: \"{}\".",
        root_field.coordinates,
        plural(root_field.subgraphs.len()),
        root_field.subgraphs.join("\", \"")
    )];

    if field.resolvable_in.is_empty() {
        reasons.push(format!("The field \"{field_coordinates}\" is not resolvable in any subgraph."));
    } else {
        reasons.push(format!(
            "The field \"{field_coordinates}\" is defined in the following subgraph{}: \"{}\".",
            plural(field.resolvable_in.len()),
            field.resolvable_in.join("\", \"")
        ));
    }

    let reachable = reachable.iter().copied().collect::<Vec<_>>().join("\", \"");

    if object.keys.iter().any(|key| key.resolvable) {
        reasons.push(format!(
            "However, no key of the entity \"{}\" can be satisfied from the subgraphs \"{reachable}\" to access a subgraph that defines \"{}\".",
            object.name, field.name
        ));
    } else {
        reasons.push(format!(
            "However, \"{}\" is not an entity, so the subgraphs \"{reachable}\" cannot jump to a subgraph that defines \"{}\".",
            object.name, field.name
        ));
    }

    CompositionError::UnresolvablePath {
        field_coordinates,
        field_name: field.name.clone(),
        selection_set: render_selection_path(path, &field.name),
        reasons,
    }
}

fn plural(count: usize) -> &'static str {
    if count > 1 {
        "s"
    } else {
        ""
    }
}

/// `["query", "a", "b"]` and `"c"` render as a nested selection set reaching `c`.
fn render_selection_path(path: &[String], field_name: &str) -> String {
    let mut out = String::new();

    for (depth, segment) in path.iter().enumerate() {
        out.push_str(&"  ".repeat(depth));
        out.push_str(segment);
        out.push_str(" {\n");
    }

    out.push_str(&"  ".repeat(path.len()));
    out.push_str(field_name);
    out.push('\n');

    for depth in (0..path.len()).rev() {
        out.push_str(&"  ".repeat(depth));
        out.push('}');

        if depth > 0 {
            out.push('\n');
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_path_rendering() {
        let path = ["query".to_owned(), "users".to_owned(), "friends".to_owned()];

        insta::assert_snapshot!(render_selection_path(&path, "age"), @r"
        query {
          users {
            friends {
              age
            }
          }
        }
        ");
    }
}
