use super::*;
use crate::federated_graph::{Definition, Key, Object};

const ROOT_TYPE_NAMES: [&str; 3] = ["Query", "Mutation", "Subscription"];

pub(super) fn compose_object(ctx: &mut Context<'_>, definitions: &[DefinitionWalker<'_>]) {
    let Some(first) = definitions.first() else {
        return;
    };

    let object_name = first.name();

    if definitions.iter().all(|definition| definition.is_interface_object()) {
        ctx.diagnostics.push_fatal(CompositionError::EntityInterfaceNotDefined {
            interface_name: object_name.to_owned(),
        });
        return;
    }

    // An extension must extend something: an entity can be resolved from any subgraph, and root
    // types are always defined.
    if definitions.iter().all(|definition| definition.is_extension())
        && !definitions.iter().any(|definition| definition.is_entity())
        && !ROOT_TYPE_NAMES.contains(&object_name)
    {
        ctx.diagnostics.push_fatal(CompositionError::NoBaseDefinitionForExtension {
            type_string: first.kind().as_str().to_owned(),
            type_name: object_name.to_owned(),
        });
    }

    let fields = fields::compose_output_fields(ctx, definitions);

    let object = Object {
        name: object_name.to_owned(),
        description: first_description(definitions.iter().map(|definition| definition.description())),
        directives: merge_directives(definitions.iter().map(|definition| definition.directives())),
        implements: definitions
            .iter()
            .flat_map(|definition| definition.implements())
            .map(str::to_owned)
            .collect(),
        keys: compose_keys(definitions),
        fields,
        subgraphs: definitions
            .iter()
            .map(|definition| definition.subgraph().name().to_owned())
            .collect(),
    };

    ctx.insert_definition(Definition::Object(object));
}

pub(super) fn compose_keys(definitions: &[DefinitionWalker<'_>]) -> Vec<Key> {
    definitions
        .iter()
        .flat_map(|definition| definition.keys())
        .map(|key| Key {
            subgraph_name: key.parent_definition().subgraph().name().to_owned(),
            selection_set: key.selection_set().to_owned(),
            resolvable: key.is_resolvable(),
        })
        .collect()
}
