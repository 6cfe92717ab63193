mod context;
mod directives;
mod entity_interface;
mod enums;
mod field_types;
mod fields;
mod input_object;
mod interface;
mod object;
mod scalar;
mod union;
mod validate;

pub(crate) use self::{context::Context, validate::has_accessible_query_field};

use self::{
    directives::{first_description, merge_directives},
    field_types::{merge_types, Position},
};
use crate::{
    subgraphs::{DefinitionKind, DefinitionWalker},
    CompositionError, CompositionWarning,
};
use async_graphql_parser::types as ast;
use async_graphql_value::ConstValue;
use std::collections::BTreeMap;

/// Merge every definition of every subgraph into the federated graph.
pub(crate) fn compose_subgraphs(ctx: &mut Context<'_>) {
    entity_interface::validate_entity_interfaces(ctx);

    // Entity interface errors invalidate the field ownership the rest of composition relies on.
    if ctx.diagnostics.any_fatal() {
        return;
    }

    let enum_usage = enums::collect_enum_usage(ctx.subgraphs);
    let subgraphs = ctx.subgraphs;

    subgraphs.iter_definition_groups(|name, definitions| {
        compose_definition_group(ctx, name, definitions, &enum_usage);
    });

    let duplicate_overrides = ctx.take_duplicate_overrides();

    if !duplicate_overrides.is_empty() {
        ctx.diagnostics.push_fatal(CompositionError::DuplicateOverriddenFields {
            field_paths: duplicate_overrides,
        });
    }

    entity_interface::merge_entity_interfaces(ctx);

    tracing::debug!(definitions = ctx.graph().definitions.len(), "composed definitions");

    validate::validate_federated_graph(ctx);
}

fn compose_definition_group(
    ctx: &mut Context<'_>,
    name: &str,
    definitions: &[DefinitionWalker<'_>],
    enum_usage: &BTreeMap<String, enums::EnumUsage>,
) {
    let Some(first) = definitions.first() else {
        return;
    };

    let is_interface_group = definitions.iter().any(|definition| definition.kind() == DefinitionKind::Interface);

    for definition in definitions {
        let compatible = definition.kind() == first.kind()
            || (is_interface_group
                && matches!(definition.kind(), DefinitionKind::Interface | DefinitionKind::Object)
                && (definition.kind() == DefinitionKind::Interface || definition.is_interface_object())
                && (first.kind() == DefinitionKind::Interface || first.is_interface_object()));

        if !compatible {
            ctx.diagnostics.push_fatal(CompositionError::IncompatibleParentKindMerge {
                type_name: name.to_owned(),
                expected_kind: first.kind().as_str().to_owned(),
                actual_kind: definition.kind().as_str().to_owned(),
            });
            return;
        }
    }

    if is_interface_group {
        interface::compose_interface(ctx, definitions);
        return;
    }

    match first.kind() {
        DefinitionKind::Object => object::compose_object(ctx, definitions),
        DefinitionKind::Interface => interface::compose_interface(ctx, definitions),
        DefinitionKind::Union => union::compose_union(ctx, definitions),
        DefinitionKind::Enum => enums::compose_enum(ctx, definitions, enum_usage.get(name).copied()),
        DefinitionKind::Scalar => scalar::compose_scalar(ctx, definitions),
        DefinitionKind::InputObject => input_object::compose_input_object(ctx, definitions),
    }
}
