use super::*;
use crate::federated_graph::{Definition, Scalar};

pub(super) fn compose_scalar(ctx: &mut Context<'_>, definitions: &[DefinitionWalker<'_>]) {
    let Some(first) = definitions.first() else {
        return;
    };

    ctx.insert_definition(Definition::Scalar(Scalar {
        name: first.name().to_owned(),
        description: first_description(definitions.iter().map(|definition| definition.description())),
        directives: merge_directives(definitions.iter().map(|definition| definition.directives())),
    }));
}
