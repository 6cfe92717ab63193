//! Contract graphs: a filtered view of a federated graph, selected by tags. Filtered items are not
//! removed, they become `@inaccessible` so the router keeps the full graph.

use crate::{
    compose::has_accessible_query_field,
    federated_graph::{Definition, Directives, FederatedGraph},
    utils::named_type,
    CompositionError, ContractTagOptions,
};
use std::collections::BTreeSet;

/// Derive the contract graph. Fails if the client schema is left without a query root field.
pub(crate) fn build_contract_graph(
    graph: &FederatedGraph,
    options: &ContractTagOptions,
) -> Result<FederatedGraph, CompositionError> {
    let mut contract = graph.clone();

    if options.is_include_mode() {
        apply_include_filter(&mut contract, &options.tag_names_to_include);
    } else {
        apply_exclude_filter(&mut contract, &options.tag_names_to_exclude);
    }

    propagate_inaccessibility(&mut contract);

    let inaccessible_definitions = contract
        .definitions
        .values()
        .filter(|definition| definition.is_inaccessible())
        .count();

    tracing::debug!(inaccessible_definitions, "applied contract tags");

    if !has_accessible_query_field(&contract) {
        return Err(CompositionError::NoQueryRootType { is_router_schema: false });
    }

    Ok(contract)
}

fn is_tagged_with(directives: &Directives, tags: &BTreeSet<String>) -> bool {
    !directives.tags.is_disjoint(tags)
}

fn hide_if_tagged(directives: &mut Directives, tags: &BTreeSet<String>) {
    if is_tagged_with(directives, tags) {
        directives.inaccessible = true;
    }
}

fn apply_exclude_filter(graph: &mut FederatedGraph, excluded: &BTreeSet<String>) {
    for definition in graph.definitions.values_mut() {
        hide_if_tagged(definition.directives_mut(), excluded);

        match definition {
            Definition::Object(_) | Definition::Interface(_) => {
                for field in definition.fields_mut().into_iter().flat_map(|fields| fields.values_mut()) {
                    hide_if_tagged(&mut field.directives, excluded);

                    for argument in &mut field.arguments {
                        hide_if_tagged(&mut argument.directives, excluded);
                    }
                }
            }
            Definition::Enum(r#enum) => {
                for value in r#enum.values.values_mut() {
                    hide_if_tagged(&mut value.directives, excluded);
                }
            }
            Definition::InputObject(input_object) => {
                for field in input_object.fields.values_mut() {
                    hide_if_tagged(&mut field.directives, excluded);
                }
            }
            Definition::Union(_) | Definition::Scalar(_) => (),
        }
    }
}

fn apply_include_filter(graph: &mut FederatedGraph, included: &BTreeSet<String>) {
    for definition in graph.definitions.values_mut() {
        let directives = definition.directives();

        // Included types are kept whole.
        if is_tagged_with(directives, included) {
            continue;
        }

        match definition {
            Definition::Object(_) | Definition::Interface(_) => {
                for field in definition.fields_mut().into_iter().flat_map(|fields| fields.values_mut()) {
                    if !is_tagged_with(&field.directives, included) {
                        field.directives.inaccessible = true;
                    }
                }
            }
            // Untagged leaf and input types follow the fields that reference them.
            Definition::Union(_) | Definition::Enum(_) | Definition::Scalar(_) | Definition::InputObject(_) => {
                let directives = definition.directives_mut();

                if !directives.tags.is_empty() {
                    directives.inaccessible = true;
                }
            }
        }
    }
}

/// Hide what can no longer be used: fields, arguments and input fields of inaccessible types, and
/// composite types left without any accessible field. Runs to a fixed point.
fn propagate_inaccessibility(graph: &mut FederatedGraph) {
    loop {
        let inaccessible_types: BTreeSet<String> = graph
            .definitions
            .values()
            .filter(|definition| definition.is_inaccessible())
            .map(|definition| definition.name().to_owned())
            .collect();

        let mut changed = false;
        let mut hide = |directives: &mut Directives, ty: &async_graphql_parser::types::Type| {
            if !directives.inaccessible && inaccessible_types.contains(named_type(ty)) {
                directives.inaccessible = true;
                changed = true;
            }
        };

        for definition in graph.definitions.values_mut() {
            match definition {
                Definition::InputObject(input_object) => {
                    for field in input_object.fields.values_mut() {
                        hide(&mut field.directives, &field.ty);
                    }
                }
                _ => {
                    for field in definition.fields_mut().into_iter().flat_map(|fields| fields.values_mut()) {
                        hide(&mut field.directives, &field.ty);

                        for argument in &mut field.arguments {
                            hide(&mut argument.directives, &argument.ty);
                        }
                    }
                }
            }
        }

        for definition in graph.definitions.values_mut() {
            let has_accessible_field = match definition.fields() {
                Some(fields) => fields.values().any(|field| !field.directives.inaccessible),
                None => continue,
            };

            if !has_accessible_field && !definition.is_inaccessible() {
                definition.directives_mut().inaccessible = true;
                changed = true;
            }
        }

        if !changed {
            return;
        }
    }
}
