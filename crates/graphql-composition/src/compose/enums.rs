use super::*;
use crate::{
    federated_graph::{Definition, Enum, EnumValue},
    subgraphs::Subgraphs,
    utils::named_type,
};
use std::collections::BTreeSet;

/// Where an enum is referenced, across all subgraphs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(super) struct EnumUsage {
    pub(super) input: bool,
    pub(super) output: bool,
}

/// Usage of every named type referenced by a field, an argument or an input field. Only the
/// entries of enums are ever looked at.
pub(super) fn collect_enum_usage(subgraphs: &Subgraphs) -> BTreeMap<String, EnumUsage> {
    let mut usage: BTreeMap<String, EnumUsage> = BTreeMap::new();

    for definition in subgraphs.iter_subgraphs().flat_map(|subgraph| subgraph.definitions()) {
        let is_input_object = definition.kind() == DefinitionKind::InputObject;

        for field in definition.fields() {
            let entry = usage.entry(named_type(field.ty()).to_owned()).or_default();

            if is_input_object {
                entry.input = true;
            } else {
                entry.output = true;
            }

            for argument in field.arguments() {
                usage.entry(named_type(&argument.ty).to_owned()).or_default().input = true;
            }
        }
    }

    usage
}

/// Output-only enums take the union of their values, input-only enums the intersection. Enums used
/// in both positions must agree everywhere.
pub(super) fn compose_enum(ctx: &mut Context<'_>, definitions: &[DefinitionWalker<'_>], usage: Option<EnumUsage>) {
    let Some(first) = definitions.first() else {
        return;
    };

    let enum_name = first.name();
    let usage = usage.unwrap_or_default();

    let value_sets: Vec<BTreeSet<&str>> = definitions
        .iter()
        .map(|definition| definition.enum_values().map(|value| value.name()).collect())
        .collect();

    let all_values: BTreeSet<&str> = value_sets.iter().flatten().copied().collect();

    let value_names: BTreeSet<&str> = match (usage.input, usage.output) {
        (true, true) => {
            if value_sets.iter().any(|values| values != &all_values) {
                ctx.diagnostics.push_fatal(CompositionError::IncompatibleSharedEnum {
                    enum_name: enum_name.to_owned(),
                });
                return;
            }

            all_values
        }
        (true, false) => all_values
            .into_iter()
            .filter(|value| value_sets.iter().all(|values| values.contains(value)))
            .collect(),
        (false, _) => all_values,
    };

    let values = value_names
        .into_iter()
        .map(|value_name| {
            let instances: Vec<_> = definitions
                .iter()
                .flat_map(|definition| definition.enum_values())
                .filter(|value| value.name() == value_name)
                .collect();

            let value = EnumValue {
                name: value_name.to_owned(),
                description: first_description(instances.iter().map(|value| value.description())),
                directives: merge_directives(instances.iter().filter_map(|value| value.directives())),
            };

            (value.name.clone(), value)
        })
        .collect();

    tracing::trace!(enum_name, ?usage, "composed enum");

    ctx.insert_definition(Definition::Enum(Enum {
        name: enum_name.to_owned(),
        description: first_description(definitions.iter().map(|definition| definition.description())),
        directives: merge_directives(definitions.iter().map(|definition| definition.directives())),
        values,
    }));
}
