use super::*;
use crate::{
    errors::RequiredInputValueViolation,
    federated_graph::{Definition, InputObject},
    subgraphs::InputValueRecord,
};

/// Input fields are intersected, like field arguments: a field that is absent from one subgraph
/// is dropped, unless it is required somewhere.
pub(super) fn compose_input_object(ctx: &mut Context<'_>, definitions: &[DefinitionWalker<'_>]) {
    let Some(first) = definitions.first() else {
        return;
    };

    let type_name = first.name();
    let mut field_names: Vec<&str> = definitions
        .iter()
        .flat_map(|definition| definition.fields())
        .map(|field| field.name())
        .collect();
    field_names.sort_unstable();
    field_names.dedup();

    let mut violations = Vec::new();
    let mut input_fields = BTreeMap::new();

    for field_name in field_names {
        let present: Vec<(String, InputValueRecord)> = definitions
            .iter()
            .filter_map(|definition| {
                let field = definition.field_by_name(field_name)?;
                Some((fields::subgraph_name(field), as_input_value(field)))
            })
            .collect();

        if present.len() < definitions.len() {
            let required_subgraphs: Vec<String> = present
                .iter()
                .filter(|(_, field)| fields::is_required(field))
                .map(|(subgraph_name, _)| subgraph_name.clone())
                .collect();

            if !required_subgraphs.is_empty() {
                violations.push(RequiredInputValueViolation {
                    input_value_name: field_name.to_owned(),
                    required_subgraphs,
                    missing_subgraphs: definitions
                        .iter()
                        .filter(|definition| definition.field_by_name(field_name).is_none())
                        .map(|definition| definition.subgraph().name().to_owned())
                        .collect(),
                });
            }

            continue;
        }

        let instances: Vec<(String, &InputValueRecord)> =
            present.iter().map(|(subgraph_name, field)| (subgraph_name.clone(), field)).collect();
        let coordinates = format!("{type_name}.{field_name}");

        if let Some(field) = fields::compose_input_value(ctx, &coordinates, false, &instances) {
            input_fields.insert(field.name.clone(), field);
        }
    }

    if !violations.is_empty() {
        ctx.diagnostics.push_fatal(CompositionError::InvalidRequiredInputValue {
            type_string: first.kind().as_str().to_owned(),
            path: type_name.to_owned(),
            errors: violations,
            is_argument: false,
        });
    }

    ctx.insert_definition(Definition::InputObject(InputObject {
        name: type_name.to_owned(),
        description: first_description(definitions.iter().map(|definition| definition.description())),
        directives: merge_directives(definitions.iter().map(|definition| definition.directives())),
        fields: input_fields,
    }));
}

fn as_input_value(field: crate::subgraphs::FieldWalker<'_>) -> InputValueRecord {
    InputValueRecord {
        name: field.name().to_owned(),
        ty: field.ty().clone(),
        default_value: field.default_value().cloned(),
        description: field.description().map(str::to_owned),
        directives: field.directives().clone(),
    }
}
