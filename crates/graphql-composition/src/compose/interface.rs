use super::*;
use crate::federated_graph::{Definition, Interface};

/// Compose an interface. Some of its definitions may be `@interfaceObject` objects: their fields
/// are added to the interface, and later to its implementations.
pub(super) fn compose_interface(ctx: &mut Context<'_>, definitions: &[DefinitionWalker<'_>]) {
    let Some(first) = definitions.first() else {
        return;
    };

    let subgraph_names = |interface_objects: bool| {
        definitions
            .iter()
            .filter(|definition| definition.is_interface_object() == interface_objects)
            .map(|definition| definition.subgraph().name().to_owned())
            .collect::<Vec<_>>()
    };

    let interface = Interface {
        name: first.name().to_owned(),
        description: first_description(definitions.iter().map(|definition| definition.description())),
        directives: merge_directives(definitions.iter().map(|definition| definition.directives())),
        // Interface objects are objects: they cannot declare what the interface implements.
        implements: definitions
            .iter()
            .filter(|definition| definition.kind() == DefinitionKind::Interface)
            .flat_map(|definition| definition.implements())
            .map(str::to_owned)
            .collect(),
        keys: object::compose_keys(definitions),
        fields: fields::compose_output_fields(ctx, definitions),
        subgraphs: subgraph_names(false),
        interface_object_subgraphs: subgraph_names(true),
    };

    ctx.insert_definition(Definition::Interface(interface));
}
