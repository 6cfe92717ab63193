//! Entity interfaces: interfaces with a `@key`, that other subgraphs can contribute fields to
//! through an `@interfaceObject` object of the same name.

use super::*;
use crate::{
    errors::EntityInterfaceDisparity,
    federated_graph::{Definition, Key},
    router_config::ConfigurationData,
    subgraphs::SubgraphWalker,
    utils::render_type,
};
use std::collections::BTreeSet;

/// The objects implementing the interface in the subgraphs that define it as an interface.
fn concrete_type_names<'a>(definitions: &[DefinitionWalker<'a>]) -> BTreeSet<&'a str> {
    definitions
        .iter()
        .filter(|definition| definition.kind() == DefinitionKind::Interface)
        .flat_map(|definition| implementers(definition.subgraph(), definition.name()))
        .collect()
}

fn implementers<'a>(subgraph: SubgraphWalker<'a>, interface_name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    subgraph
        .definitions()
        .filter(move |definition| {
            definition.kind() == DefinitionKind::Object && definition.implements_interface(interface_name)
        })
        .map(|definition| definition.name())
}

/// Runs before composition: the checks here decide which subgraph owns which field.
pub(super) fn validate_entity_interfaces(ctx: &mut Context<'_>) {
    let subgraphs = ctx.subgraphs;
    let mut disparities = Vec::new();

    subgraphs.iter_definition_groups(|interface_name, definitions| {
        let is_entity_interface = definitions
            .iter()
            .any(|definition| definition.kind() == DefinitionKind::Interface && definition.is_entity());

        if !is_entity_interface {
            let interface_object_subgraphs: Vec<String> = definitions
                .iter()
                .filter(|definition| definition.is_interface_object())
                .map(|definition| definition.subgraph().name().to_owned())
                .collect();

            // Without any interface definition, composing the object reports it instead.
            let has_interface = definitions
                .iter()
                .any(|definition| definition.kind() == DefinitionKind::Interface);

            if has_interface && !interface_object_subgraphs.is_empty() {
                ctx.diagnostics.push_fatal(CompositionError::NonEntityInterfaceObject {
                    interface_name: interface_name.to_owned(),
                    subgraph_names: interface_object_subgraphs,
                });
            }

            return;
        }

        let concrete_type_names = concrete_type_names(definitions);

        for interface_object in definitions.iter().filter(|definition| definition.is_interface_object()) {
            let subgraph = interface_object.subgraph();

            // The interface object stands in for the implementations: it must not define them.
            let implementation_names: Vec<String> = concrete_type_names
                .iter()
                .filter(|name| subgraph.definition_by_name(name).is_some())
                .map(|name| (*name).to_owned())
                .collect();

            if !implementation_names.is_empty() {
                ctx.diagnostics
                    .push_fatal(CompositionError::InvalidInterfaceObjectImplementationDefinitions {
                        interface_name: interface_name.to_owned(),
                        subgraph_name: subgraph.name().to_owned(),
                        implementation_names,
                    });
            }
        }

        let missing_implementations: Vec<(String, Vec<String>)> = definitions
            .iter()
            .filter(|definition| {
                definition.kind() == DefinitionKind::Interface && definition.keys().any(|key| key.is_resolvable())
            })
            .filter_map(|definition| {
                let subgraph = definition.subgraph();
                let defined: BTreeSet<&str> = implementers(subgraph, interface_name).collect();
                let missing: Vec<String> = concrete_type_names
                    .difference(&defined)
                    .map(|name| (*name).to_owned())
                    .collect();

                (!missing.is_empty()).then(|| (subgraph.name().to_owned(), missing))
            })
            .collect();

        if !missing_implementations.is_empty() {
            disparities.push(EntityInterfaceDisparity {
                interface_name: interface_name.to_owned(),
                concrete_type_names: concrete_type_names.iter().map(|name| (*name).to_owned()).collect(),
                missing_implementations,
            });
        }
    });

    if !disparities.is_empty() {
        ctx.diagnostics
            .push_fatal(CompositionError::UndefinedEntityInterfaceImplementations { interfaces: disparities });
    }
}

/// Runs after composition. The fields contributed by interface objects become fields of every
/// implementation, resolvable from the interface object subgraph.
pub(super) fn merge_entity_interfaces(ctx: &mut Context<'_>) {
    let subgraphs = ctx.subgraphs;

    let entity_interfaces: Vec<String> = ctx
        .graph()
        .definitions
        .values()
        .filter_map(|definition| match definition {
            Definition::Interface(interface) if !interface.interface_object_subgraphs.is_empty() => {
                Some(interface.name.clone())
            }
            _ => None,
        })
        .collect();

    for interface_name in entity_interfaces {
        let definitions: Vec<DefinitionWalker<'_>> = subgraphs.definitions_by_name(&interface_name).collect();
        let concrete_type_names = concrete_type_names(&definitions);

        for interface_object in definitions.iter().filter(|definition| definition.is_interface_object()) {
            merge_interface_object(ctx, *interface_object, &concrete_type_names);
        }
    }
}

fn merge_interface_object(
    ctx: &mut Context<'_>,
    interface_object: DefinitionWalker<'_>,
    concrete_type_names: &BTreeSet<&str>,
) {
    let subgraph = interface_object.subgraph();
    let interface_name = interface_object.name();

    tracing::debug!(
        interface_name,
        subgraph_name = subgraph.name(),
        implementations = concrete_type_names.len(),
        "merging interface object"
    );

    let keys: Vec<Key> = object::compose_keys(&[interface_object]);

    for concrete_type_name in concrete_type_names {
        let Some(Definition::Object(object)) = ctx.graph_mut().definitions.get_mut(*concrete_type_name) else {
            continue;
        };

        for key in &keys {
            if !object
                .keys
                .iter()
                .any(|existing| existing.subgraph_name == key.subgraph_name && existing.selection_set == key.selection_set)
            {
                object.keys.push(key.clone());
            }
        }

        let mut type_mismatches = Vec::new();

        for field in interface_object.fields().filter(|field| !field.is_external()) {
            match object.fields.get_mut(field.name()) {
                None => {
                    object
                        .fields
                        .insert(field.name().to_owned(), fields::field_from_instance(field));
                }
                Some(existing) => match merge_types(&existing.ty, field.ty(), Position::Output) {
                    Some(ty) => {
                        existing.ty = ty;

                        if !existing.resolvable_in.iter().any(|name| name == subgraph.name()) {
                            existing.resolvable_in.push(subgraph.name().to_owned());
                        }
                    }
                    None => type_mismatches.push(CompositionError::IncompatibleMergedTypes {
                        coordinates: format!("{concrete_type_name}.{}", field.name()),
                        is_argument: false,
                        expected_type: render_type(&existing.ty),
                        actual_type: render_type(field.ty()),
                        expected_subgraph: existing.resolvable_in.first().cloned().unwrap_or_default(),
                        actual_subgraph: subgraph.name().to_owned(),
                    }),
                },
            }
        }

        for error in type_mismatches {
            ctx.diagnostics.push_fatal(error);
        }
    }

    let configuration_data = ctx.configuration_data_mut(subgraph.id);

    let Some(interface_data) = configuration_data.get_mut(interface_name) else {
        return;
    };

    interface_data.entity_interface_concrete_type_names =
        concrete_type_names.iter().map(|name| (*name).to_owned()).collect();
    let interface_data = interface_data.clone();

    for concrete_type_name in concrete_type_names {
        let data = configuration_data
            .entry((*concrete_type_name).to_owned())
            .or_insert_with(|| ConfigurationData {
                is_root_node: true,
                ..ConfigurationData::new(*concrete_type_name)
            });

        data.field_names.extend(interface_data.field_names.iter().cloned());
        data.merge_keys(&interface_data.keys);
    }
}
