//! Validations of the federated graph as a whole, once every definition is composed.

use super::*;
use crate::{
    federated_graph::{Definition, FederatedGraph},
    normalization::parse_field_set,
    utils::named_type,
};

pub(super) fn validate_federated_graph(ctx: &mut Context<'_>) {
    // A type that failed to merge can be missing from the graph.
    let any_fatal = ctx.diagnostics.any_fatal();
    let graph = ctx.graph();
    let mut errors = Vec::new();

    for definition in graph.definitions.values() {
        validate_interface_implementations(graph, definition, &mut errors);
        validate_keys(definition, &mut errors);
    }

    validate_inaccessible_references(graph, &mut errors);

    if !any_fatal && !has_accessible_query_field(graph) {
        errors.push(CompositionError::NoQueryRootType { is_router_schema: true });
    }

    for error in errors {
        ctx.diagnostics.push_fatal(error);
    }
}

/// The client schema needs at least one accessible field on an accessible `Query` type.
pub(crate) fn has_accessible_query_field(graph: &FederatedGraph) -> bool {
    graph
        .object("Query")
        .filter(|query| !query.directives.inaccessible)
        .is_some_and(|query| query.fields.values().any(|field| !field.directives.inaccessible))
}

fn validate_interface_implementations(graph: &FederatedGraph, definition: &Definition, errors: &mut Vec<CompositionError>) {
    let (type_name, implements, fields) = match definition {
        Definition::Object(object) => (&object.name, &object.implements, &object.fields),
        Definition::Interface(interface) => (&interface.name, &interface.implements, &interface.fields),
        _ => return,
    };

    for interface_name in implements {
        let Some(interface) = graph.interface(interface_name) else {
            continue;
        };

        let unimplemented_fields: Vec<String> = interface
            .fields
            .keys()
            .filter(|field_name| !fields.contains_key(*field_name))
            .cloned()
            .collect();

        if !unimplemented_fields.is_empty() {
            errors.push(CompositionError::InvalidInterfaceImplementation {
                type_name: type_name.clone(),
                interface_name: interface_name.clone(),
                unimplemented_fields,
            });
        }
    }
}

/// Every top-level field of a key must still exist, and be accessible.
fn validate_keys(definition: &Definition, errors: &mut Vec<CompositionError>) {
    let Some(fields) = definition.fields() else {
        return;
    };

    let mut seen = Vec::new();

    for key in definition.keys() {
        if seen.contains(&key.selection_set.as_str()) {
            continue;
        }
        seen.push(key.selection_set.as_str());

        let Ok(selections) = parse_field_set(&key.selection_set) else {
            continue;
        };

        let unresolvable = selections
            .iter()
            .filter_map(|selection| selection.field_name())
            .find(|field_name| !fields.get(*field_name).is_some_and(|field| !field.directives.inaccessible));

        if let Some(field_name) = unresolvable {
            errors.push(CompositionError::UnresolvableKey {
                type_name: definition.name().to_owned(),
                field_set: key.selection_set.clone(),
                field_name: field_name.to_owned(),
            });
        }
    }
}

/// An inaccessible type must only be referenced from inaccessible places.
fn validate_inaccessible_references(graph: &FederatedGraph, errors: &mut Vec<CompositionError>) {
    let mut paths_by_type: BTreeMap<&str, Vec<String>> = BTreeMap::new();

    let mut check = |ty: &ast::Type, path: String| {
        let referenced = graph.definition(named_type(ty));

        if let Some(definition) = referenced.filter(|definition| definition.is_inaccessible()) {
            paths_by_type.entry(definition.name()).or_default().push(path);
        }
    };

    for definition in graph.definitions.values().filter(|definition| !definition.is_inaccessible()) {
        let type_name = definition.name();

        match definition {
            Definition::Object(_) | Definition::Interface(_) => {
                for field in definition.fields().into_iter().flat_map(|fields| fields.values()) {
                    if field.directives.inaccessible {
                        continue;
                    }

                    check(&field.ty, format!("{type_name}.{}", field.name));

                    for argument in field.arguments.iter().filter(|argument| !argument.directives.inaccessible) {
                        check(&argument.ty, format!("{type_name}.{}({}: ...)", field.name, argument.name));
                    }
                }
            }
            Definition::InputObject(input_object) => {
                for field in input_object.fields.values().filter(|field| !field.directives.inaccessible) {
                    check(&field.ty, format!("{type_name}.{}", field.name));
                }
            }
            Definition::Union(_) | Definition::Enum(_) | Definition::Scalar(_) => (),
        }
    }

    for (type_name, paths) in paths_by_type {
        let Some(definition) = graph.definition(type_name) else {
            continue;
        };

        errors.push(CompositionError::InvalidReferencesOfInaccessibleType {
            type_string: definition.kind_str().to_owned(),
            type_name: type_name.to_owned(),
            paths,
        });
    }
}
