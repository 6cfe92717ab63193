use super::*;
use crate::federated_graph::{Definition, Union};

/// Union members accumulate across subgraphs.
pub(super) fn compose_union(ctx: &mut Context<'_>, definitions: &[DefinitionWalker<'_>]) {
    let Some(first) = definitions.first() else {
        return;
    };

    ctx.insert_definition(Definition::Union(Union {
        name: first.name().to_owned(),
        description: first_description(definitions.iter().map(|definition| definition.description())),
        directives: merge_directives(definitions.iter().map(|definition| definition.directives())),
        members: definitions
            .iter()
            .flat_map(|definition| definition.union_members())
            .map(str::to_owned)
            .collect(),
    }));
}
