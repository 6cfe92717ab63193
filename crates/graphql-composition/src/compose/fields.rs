use super::*;
use crate::{
    errors::{RequiredInputValueViolation, ShareabilityViolation},
    federated_graph::{Field, InputValue, Override},
    subgraphs::{FieldWalker, InputValueRecord},
    utils::render_type,
};

/// Compose the fields of an object or interface type. `definitions` are all the definitions of
/// the type, in subgraph order.
pub(super) fn compose_output_fields(ctx: &mut Context<'_>, definitions: &[DefinitionWalker<'_>]) -> BTreeMap<String, Field> {
    let Some(first) = definitions.first() else {
        return BTreeMap::new();
    };
    let type_name = first.name();

    let mut fields_by_name: BTreeMap<&str, Vec<FieldWalker<'_>>> = BTreeMap::new();

    for definition in definitions {
        for field in definition.fields() {
            fields_by_name.entry(field.name()).or_default().push(field);
        }
    }

    let mut shareability_violations = Vec::new();
    let mut all_external_fields = Vec::new();
    // (subgraph declaring the override, target) -> field names
    let mut invalid_override_targets: BTreeMap<(&str, &str), Vec<String>> = BTreeMap::new();
    let mut fields = BTreeMap::new();

    for (field_name, instances) in &fields_by_name {
        if instances.iter().all(|field| field.is_external()) {
            all_external_fields.push((
                (*field_name).to_owned(),
                instances.iter().map(|field| subgraph_name(*field)).collect(),
            ));
            continue;
        }

        let r#override = resolve_override(ctx, type_name, instances, &mut invalid_override_targets);
        let is_overridden = |field: &FieldWalker<'_>| {
            r#override
                .as_ref()
                .is_some_and(|r#override| r#override.from == field.parent_definition().subgraph().name())
        };

        let resolving: Vec<FieldWalker<'_>> = instances
            .iter()
            .filter(|field| !field.is_external() && !is_overridden(field))
            .copied()
            .collect();

        if let Some(violation) = shareability_violation(field_name, &resolving) {
            shareability_violations.push(violation);
        }

        let Some((first_instance, other_instances)) = instances.split_first() else {
            continue;
        };
        let ty = merge_instance_types(ctx, type_name, *first_instance, other_instances);

        let argument_instances: Vec<FieldWalker<'_>> = instances.iter().filter(|field| !field.is_external()).copied().collect();

        let field = Field {
            name: (*field_name).to_owned(),
            description: first_description(instances.iter().map(|field| field.description())),
            ty,
            arguments: compose_arguments(ctx, type_name, field_name, &argument_instances),
            directives: merge_directives(instances.iter().map(|field| field.directives())),
            resolvable_in: resolving.iter().map(|field| subgraph_name(*field)).collect(),
            provides: resolving
                .iter()
                .filter_map(|field| Some((subgraph_name(*field), field.provides()?.to_owned())))
                .collect(),
            requires: resolving
                .iter()
                .filter_map(|field| Some((subgraph_name(*field), field.requires()?.to_owned())))
                .collect(),
            r#override,
        };

        fields.insert(field.name.clone(), field);
    }

    if !all_external_fields.is_empty() {
        ctx.diagnostics.push_fatal(CompositionError::AllExternalFieldInstances {
            type_name: type_name.to_owned(),
            fields: all_external_fields,
        });
    }

    if !shareability_violations.is_empty() {
        ctx.diagnostics.push_fatal(CompositionError::InvalidFieldShareability {
            type_name: type_name.to_owned(),
            fields: shareability_violations,
        });
    }

    for ((subgraph_name, target_subgraph_name), field_names) in invalid_override_targets {
        ctx.diagnostics.push_warning(CompositionWarning::InvalidOverrideTargetSubgraphName {
            subgraph_name: subgraph_name.to_owned(),
            type_name: type_name.to_owned(),
            target_subgraph_name: target_subgraph_name.to_owned(),
            field_names,
        });
    }

    fields
}

pub(super) fn subgraph_name(field: FieldWalker<'_>) -> String {
    field.parent_definition().subgraph().name().to_owned()
}

/// Work out which subgraph owns a field with `@override`. The overridden instance leaves the
/// configuration of its subgraph.
fn resolve_override<'a>(
    ctx: &mut Context<'_>,
    type_name: &str,
    instances: &[FieldWalker<'a>],
    invalid_override_targets: &mut BTreeMap<(&'a str, &'a str), Vec<String>>,
) -> Option<Override> {
    let overriding: Vec<&FieldWalker<'a>> = instances.iter().filter(|field| field.override_from().is_some()).collect();

    let field = match overriding.as_slice() {
        [] => return None,
        [field] => **field,
        [field, ..] => {
            ctx.push_duplicate_override(format!("{type_name}.{}", field.name()));
            return None;
        }
    };

    let from = field.override_from()?;
    let to = field.parent_definition().subgraph();

    let Some(source) = ctx.subgraphs.subgraph_by_name(from) else {
        invalid_override_targets
            .entry((to.name(), from))
            .or_default()
            .push(field.name().to_owned());
        return None;
    };

    let source_instance = instances
        .iter()
        .find(|instance| instance.parent_definition().subgraph().id == source.id);

    // Key fields stay: the source subgraph still needs them to resolve the entity.
    if let Some(source_instance) = source_instance.filter(|instance| !instance.is_part_of_key()) {
        let configuration_data = ctx.configuration_data_mut(source.id);

        if let Some(data) = configuration_data.get_mut(type_name) {
            data.field_names.remove(source_instance.name());

            if data.is_empty() {
                configuration_data.remove(type_name);
            }
        }
    }

    Some(Override {
        to: to.name().to_owned(),
        from: from.to_owned(),
    })
}

/// Only object instances are checked: interface fields are resolved by their implementations.
fn shareability_violation(field_name: &str, resolving: &[FieldWalker<'_>]) -> Option<ShareabilityViolation> {
    let object_instances: Vec<FieldWalker<'_>> = resolving
        .iter()
        .filter(|field| field.parent_definition().kind() == DefinitionKind::Object)
        .copied()
        .collect();

    if object_instances.len() < 2 || object_instances.iter().all(|field| field.is_shareable()) {
        return None;
    }

    let (shareable, non_shareable): (Vec<_>, Vec<_>) =
        object_instances.into_iter().partition(|field| field.is_shareable());

    Some(ShareabilityViolation {
        field_name: field_name.to_owned(),
        shareable_subgraphs: shareable.into_iter().map(subgraph_name).collect(),
        non_shareable_subgraphs: non_shareable.into_iter().map(subgraph_name).collect(),
    })
}

/// The "expected" type is always the one of the first subgraph. After a mismatch the field keeps
/// that type, so the rest of the graph is still checked against it.
fn merge_instance_types(
    ctx: &mut Context<'_>,
    type_name: &str,
    first: FieldWalker<'_>,
    rest: &[FieldWalker<'_>],
) -> ast::Type {
    let mut ty = first.ty().clone();

    for other in rest {
        match merge_types(&ty, other.ty(), Position::Output) {
            Some(merged) => ty = merged,
            None => {
                ctx.diagnostics.push_fatal(CompositionError::IncompatibleMergedTypes {
                    coordinates: format!("{type_name}.{}", first.name()),
                    is_argument: false,
                    expected_type: render_type(first.ty()),
                    actual_type: render_type(other.ty()),
                    expected_subgraph: subgraph_name(first),
                    actual_subgraph: subgraph_name(*other),
                });
                return first.ty().clone();
            }
        }
    }

    ty
}

/// Arguments are intersected. An argument that is required somewhere must be defined everywhere.
fn compose_arguments(
    ctx: &mut Context<'_>,
    type_name: &str,
    field_name: &str,
    instances: &[FieldWalker<'_>],
) -> Vec<InputValue> {
    let mut argument_names: Vec<&str> = Vec::new();

    for field in instances {
        for argument in field.arguments() {
            if !argument_names.contains(&argument.name.as_str()) {
                argument_names.push(&argument.name);
            }
        }
    }

    let mut violations = Vec::new();
    let mut arguments = Vec::new();

    for argument_name in argument_names {
        let present: Vec<(String, &InputValueRecord)> = instances
            .iter()
            .filter_map(|field| {
                let argument = field.arguments().iter().find(|argument| argument.name == argument_name)?;
                Some((subgraph_name(*field), argument))
            })
            .collect();

        if present.len() < instances.len() {
            let required_subgraphs: Vec<String> = present
                .iter()
                .filter(|(_, argument)| is_required(argument))
                .map(|(subgraph_name, _)| subgraph_name.clone())
                .collect();

            if !required_subgraphs.is_empty() {
                violations.push(RequiredInputValueViolation {
                    input_value_name: argument_name.to_owned(),
                    required_subgraphs,
                    missing_subgraphs: instances
                        .iter()
                        .map(|field| subgraph_name(*field))
                        .filter(|name| present.iter().all(|(present_name, _)| present_name != name))
                        .collect(),
                });
            }

            continue;
        }

        let coordinates = format!("{type_name}.{field_name}({argument_name}: ...)");

        if let Some(argument) = compose_input_value(ctx, &coordinates, true, &present) {
            arguments.push(argument);
        }
    }

    if !violations.is_empty() {
        ctx.diagnostics.push_fatal(CompositionError::InvalidRequiredInputValue {
            type_string: "field".to_owned(),
            path: format!("{type_name}.{field_name}"),
            errors: violations,
            is_argument: true,
        });
    }

    arguments
}

pub(super) fn is_required(input_value: &InputValueRecord) -> bool {
    !input_value.ty.nullable && input_value.default_value.is_none()
}

/// Merge the instances of one argument or input field, given as (subgraph name, record).
pub(super) fn compose_input_value(
    ctx: &mut Context<'_>,
    coordinates: &str,
    is_argument: bool,
    instances: &[(String, &InputValueRecord)],
) -> Option<InputValue> {
    let ((first_subgraph, first), rest) = instances.split_first()?;
    let mut ty = first.ty.clone();
    let mut is_valid = true;

    for (subgraph, other) in rest {
        match merge_types(&ty, &other.ty, Position::Input) {
            Some(merged) => ty = merged,
            None => {
                ctx.diagnostics.push_fatal(CompositionError::IncompatibleMergedTypes {
                    coordinates: coordinates.to_owned(),
                    is_argument,
                    expected_type: render_type(&first.ty),
                    actual_type: render_type(&other.ty),
                    expected_subgraph: first_subgraph.clone(),
                    actual_subgraph: subgraph.clone(),
                });
                is_valid = false;
                break;
            }
        }
    }

    let mut default_value: Option<(&str, &ConstValue)> = None;

    for (subgraph, instance) in instances {
        let Some(value) = &instance.default_value else {
            continue;
        };

        match default_value {
            None => default_value = Some((subgraph.as_str(), value)),
            Some((_, existing)) if existing == value => (),
            Some((existing_subgraph, _)) => {
                ctx.diagnostics.push_fatal(CompositionError::IncompatibleDefaultValues {
                    coordinates: coordinates.to_owned(),
                    is_argument,
                    first_subgraph: existing_subgraph.to_owned(),
                    second_subgraph: subgraph.clone(),
                });
                is_valid = false;
                break;
            }
        }
    }

    if !is_valid {
        return None;
    }

    Some(InputValue {
        name: first.name.clone(),
        description: first_description(instances.iter().map(|(_, instance)| instance.description.as_deref())),
        ty,
        default_value: default_value.map(|(_, value)| value.clone()),
        directives: merge_directives(instances.iter().map(|(_, instance)| &instance.directives)),
    })
}

/// Build a composed field out of a single subgraph instance.
pub(super) fn field_from_instance(field: FieldWalker<'_>) -> Field {
    Field {
        name: field.name().to_owned(),
        description: field.description().map(str::to_owned),
        ty: field.ty().clone(),
        arguments: field
            .arguments()
            .iter()
            .map(|argument| InputValue {
                name: argument.name.clone(),
                description: argument.description.clone(),
                ty: argument.ty.clone(),
                default_value: argument.default_value.clone(),
                directives: merge_directives([&argument.directives]),
            })
            .collect(),
        directives: merge_directives([field.directives()]),
        resolvable_in: vec![subgraph_name(field)],
        provides: field
            .provides()
            .map(|provides| vec![(subgraph_name(field), provides.to_owned())])
            .unwrap_or_default(),
        requires: field
            .requires()
            .map(|requires| vec![(subgraph_name(field), requires.to_owned())])
            .unwrap_or_default(),
        r#override: None,
    }
}
