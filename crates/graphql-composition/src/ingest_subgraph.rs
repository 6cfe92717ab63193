//! This is a separate module because we want to use only the public API of [Subgraphs] and avoid
//! mixing GraphQL parser logic and types with our internals.

use crate::{
    normalization::{self, NormalizationSuccess},
    subgraphs::{
        DefinitionFlags, DefinitionId, DefinitionKind, DirectiveSite, FieldRecord, InputValueRecord, SubgraphId,
        Subgraphs,
    },
    utils,
};
use async_graphql_parser::{types as ast, Positioned};

struct Context<'a> {
    subgraph_id: SubgraphId,
    subgraphs: &'a mut Subgraphs,
}

/// Register a normalized subgraph in the arena.
pub(crate) fn ingest_subgraph(name: &str, url: &str, normalized: NormalizationSuccess, subgraphs: &mut Subgraphs) {
    let NormalizationSuccess {
        schema,
        configuration_data_by_type_name,
        ..
    } = normalized;

    let subgraph_id = subgraphs.push_subgraph(name, url, schema.clone(), configuration_data_by_type_name);

    let mut ctx = Context { subgraph_id, subgraphs };

    for definition in &schema.definitions {
        if let ast::TypeSystemDefinition::Type(definition) = definition {
            ingest_definition(&mut ctx, &definition.node);
        }
    }
}

fn ingest_definition(ctx: &mut Context<'_>, definition: &ast::TypeDefinition) {
    let directives = &definition.directives;
    let has = |name: &str| utils::has_directive(directives, name);

    let kind = match &definition.kind {
        ast::TypeKind::Object(_) => DefinitionKind::Object,
        ast::TypeKind::Interface(_) => DefinitionKind::Interface,
        ast::TypeKind::Union(_) => DefinitionKind::Union,
        ast::TypeKind::Enum(_) => DefinitionKind::Enum,
        ast::TypeKind::InputObject(_) => DefinitionKind::InputObject,
        ast::TypeKind::Scalar => DefinitionKind::Scalar,
    };

    let flags = DefinitionFlags {
        is_shareable: has(normalization::SHAREABLE),
        is_external: has(normalization::EXTERNAL),
        is_interface_object: kind == DefinitionKind::Object && has(normalization::INTERFACE_OBJECT),
        is_extension: definition.extend,
    };

    let definition_id = ctx.subgraphs.push_definition(
        ctx.subgraph_id,
        definition.name.node.as_str(),
        kind,
        description(definition.description.as_ref()),
        DirectiveSite::from_ast(directives),
        flags,
    );

    ingest_keys(ctx, definition_id, directives);

    match &definition.kind {
        ast::TypeKind::Object(ast::ObjectType { implements, fields })
        | ast::TypeKind::Interface(ast::InterfaceType { implements, fields }) => {
            for implemented in implements {
                ctx.subgraphs.push_interface_impl(definition_id, implemented.node.as_str());
            }

            for field in fields {
                ingest_output_field(ctx, definition_id, &field.node);
            }
        }
        ast::TypeKind::Union(union) => {
            for member in &union.members {
                ctx.subgraphs.push_union_member(definition_id, member.node.as_str());
            }
        }
        ast::TypeKind::Enum(enum_type) => {
            for value in &enum_type.values {
                ctx.subgraphs.push_enum_value(
                    definition_id,
                    value.node.value.node.as_str(),
                    description(value.node.description.as_ref()),
                    DirectiveSite::from_ast(&value.node.directives),
                );
            }
        }
        ast::TypeKind::InputObject(input_object) => {
            for field in &input_object.fields {
                let input_value = input_value(&field.node);

                ctx.subgraphs.push_field(FieldRecord {
                    parent_definition_id: definition_id,
                    name: input_value.name,
                    ty: input_value.ty,
                    arguments: Vec::new(),
                    default_value: input_value.default_value,
                    description: input_value.description,
                    directives: input_value.directives,
                    is_shareable: false,
                    is_external: false,
                    override_from: None,
                    provides: None,
                    requires: None,
                });
            }
        }
        ast::TypeKind::Scalar => (),
    }
}

fn ingest_keys(ctx: &mut Context<'_>, definition_id: DefinitionId, directives: &[Positioned<ast::ConstDirective>]) {
    for directive in directives {
        let directive = &directive.node;

        if directive.name.node != normalization::KEY {
            continue;
        }

        let Some(selection_set) = utils::string_argument(directive, "fields") else {
            continue;
        };

        // Field sets were validated during normalization.
        let Ok(fields) = normalization::parse_field_set(selection_set) else {
            continue;
        };

        let resolvable = !matches!(
            directive.get_argument("resolvable").map(|value| &value.node),
            Some(async_graphql_value::ConstValue::Boolean(false))
        );

        ctx.subgraphs.push_key(definition_id, selection_set, fields, resolvable);
    }
}

fn ingest_output_field(ctx: &mut Context<'_>, parent_definition_id: DefinitionId, field: &ast::FieldDefinition) {
    let directives = &field.directives;
    let string_argument = |directive_name: &str, argument_name: &str| {
        directives
            .iter()
            .find(|directive| directive.node.name.node == directive_name)
            .and_then(|directive| utils::string_argument(&directive.node, argument_name))
            .map(str::to_owned)
    };

    let record = FieldRecord {
        parent_definition_id,
        name: field.name.node.to_string(),
        ty: field.ty.node.clone(),
        arguments: field.arguments.iter().map(|argument| input_value(&argument.node)).collect(),
        default_value: None,
        description: description(field.description.as_ref()),
        directives: DirectiveSite::from_ast(directives),
        is_shareable: utils::has_directive(directives, normalization::SHAREABLE),
        is_external: utils::has_directive(directives, normalization::EXTERNAL),
        override_from: string_argument(normalization::OVERRIDE, "from"),
        provides: string_argument(normalization::PROVIDES, "fields"),
        requires: string_argument(normalization::REQUIRES, "fields"),
    };

    ctx.subgraphs.push_field(record);
}

fn input_value(input_value: &ast::InputValueDefinition) -> InputValueRecord {
    InputValueRecord {
        name: input_value.name.node.to_string(),
        ty: input_value.ty.node.clone(),
        default_value: input_value.default_value.as_ref().map(|value| value.node.clone()),
        description: description(input_value.description.as_ref()),
        directives: DirectiveSite::from_ast(&input_value.directives),
    }
}

fn description(description: Option<&Positioned<String>>) -> Option<String> {
    description.map(|description| description.node.clone())
}
