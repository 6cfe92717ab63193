//! The structural walk over both schemas. Every definition present on either side is matched by
//! name, then compared member by member.

use crate::{
    change::{ChangeType, Changes},
    schema::DiffSchema,
};
use async_graphql_parser::{types as ast, Positioned};
use itertools::{EitherOrBoth, Itertools};
use std::collections::BTreeMap;

/// Directive usages on fields that are reported. Other directives are metadata for the router.
const TRACKED_FIELD_DIRECTIVES: [&str; 2] = ["inaccessible", "tag"];

pub(crate) fn diff_schemas(old: &DiffSchema, new: &DiffSchema, changes: &mut Changes) {
    diff_root_types(old, new, changes);

    for pair in old.directives.keys().merge_join_by(new.directives.keys(), |a, b| a.cmp(b)) {
        match pair {
            EitherOrBoth::Left(name) => changes.breaking(
                ChangeType::DirectiveRemoved,
                format!("@{name}"),
                format!("Directive '{name}' was removed"),
            ),
            EitherOrBoth::Right(name) => changes.non_breaking(
                ChangeType::DirectiveAdded,
                format!("@{name}"),
                format!("Directive '{name}' was added"),
            ),
            EitherOrBoth::Both(_, _) => (),
        }
    }

    for pair in old.types.iter().merge_join_by(new.types.iter(), |a, b| a.0.cmp(b.0)) {
        match pair {
            EitherOrBoth::Left((name, _)) => changes.breaking(
                ChangeType::TypeRemoved,
                name.as_str(),
                format!("Type '{name}' was removed"),
            ),
            EitherOrBoth::Right((name, _)) => changes.non_breaking(
                ChangeType::TypeAdded,
                name.as_str(),
                format!("Type '{name}' was added"),
            ),
            EitherOrBoth::Both((name, old), (_, new)) => diff_type(name, old, new, changes),
        }
    }
}

fn diff_root_types(old: &DiffSchema, new: &DiffSchema, changes: &mut Changes) {
    let roots = [
        ("query", ChangeType::SchemaQueryTypeChanged, &old.query_type, &new.query_type),
        (
            "mutation",
            ChangeType::SchemaMutationTypeChanged,
            &old.mutation_type,
            &new.mutation_type,
        ),
        (
            "subscription",
            ChangeType::SchemaSubscriptionTypeChanged,
            &old.subscription_type,
            &new.subscription_type,
        ),
    ];

    for (operation, change_type, old, new) in roots {
        if old == new {
            continue;
        }

        let message = format!(
            "Schema {operation} root type changed from '{}' to '{}'",
            old.as_deref().unwrap_or("unknown"),
            new.as_deref().unwrap_or("unknown"),
        );

        // A new root type is an addition: nothing could depend on it yet.
        changes.push(change_type, old.is_some(), operation, message);
    }
}

fn kind_name(kind: &ast::TypeKind) -> &'static str {
    match kind {
        ast::TypeKind::Scalar => "Scalar",
        ast::TypeKind::Object(_) => "Object",
        ast::TypeKind::Interface(_) => "Interface",
        ast::TypeKind::Union(_) => "Union",
        ast::TypeKind::Enum(_) => "Enum",
        ast::TypeKind::InputObject(_) => "InputObject",
    }
}

fn diff_type(name: &str, old: &ast::TypeDefinition, new: &ast::TypeDefinition, changes: &mut Changes) {
    if description(&old.description) != description(&new.description) {
        changes.non_breaking(
            ChangeType::TypeDescriptionChanged,
            name,
            format!("Description of type '{name}' changed"),
        );
    }

    match (&old.kind, &new.kind) {
        (ast::TypeKind::Object(old), ast::TypeKind::Object(new)) => {
            diff_implements(name, &old.implements, &new.implements, changes);
            diff_fields(name, "object type", &old.fields, &new.fields, changes);
        }
        (ast::TypeKind::Interface(old), ast::TypeKind::Interface(new)) => {
            diff_implements(name, &old.implements, &new.implements, changes);
            diff_fields(name, "interface", &old.fields, &new.fields, changes);
        }
        (ast::TypeKind::Union(old), ast::TypeKind::Union(new)) => {
            diff_names(&old.members, &new.members, |member, removed| {
                if removed {
                    changes.breaking(
                        ChangeType::UnionMemberRemoved,
                        name,
                        format!("Member '{member}' was removed from union type '{name}'"),
                    );
                } else {
                    changes.non_breaking(
                        ChangeType::UnionMemberAdded,
                        name,
                        format!("Member '{member}' was added to union type '{name}'"),
                    );
                }
            });
        }
        (ast::TypeKind::Enum(old), ast::TypeKind::Enum(new)) => {
            let old_values = old.values.iter().map(|value| &value.node.value);
            let new_values = new.values.iter().map(|value| &value.node.value);

            diff_names(old_values, new_values, |value, removed| {
                let path = format!("{name}.{value}");

                if removed {
                    changes.breaking(
                        ChangeType::EnumValueRemoved,
                        path,
                        format!("Enum value '{value}' was removed from enum '{name}'"),
                    );
                } else {
                    changes.non_breaking(
                        ChangeType::EnumValueAdded,
                        path,
                        format!("Enum value '{value}' was added to enum '{name}'"),
                    );
                }
            });
        }
        (ast::TypeKind::InputObject(old), ast::TypeKind::InputObject(new)) => {
            diff_input_fields(name, &old.fields, &new.fields, changes);
        }
        (ast::TypeKind::Scalar, ast::TypeKind::Scalar) => (),
        (old, new) => changes.breaking(
            ChangeType::TypeKindChanged,
            name,
            format!(
                "'{name}' kind changed from '{}' to '{}'",
                kind_name(old),
                kind_name(new)
            ),
        ),
    }
}

fn diff_implements(
    name: &str,
    old: &[Positioned<async_graphql_value::Name>],
    new: &[Positioned<async_graphql_value::Name>],
    changes: &mut Changes,
) {
    diff_names(old, new, |interface, removed| {
        if removed {
            changes.breaking(
                ChangeType::ObjectTypeInterfaceRemoved,
                name,
                format!("'{name}' no longer implements interface '{interface}'"),
            );
        } else {
            changes.non_breaking(
                ChangeType::ObjectTypeInterfaceAdded,
                name,
                format!("'{name}' object implements '{interface}' interface"),
            );
        }
    });
}

/// Call `on_change(name, removed)` for every name present on one side only, in name order.
fn diff_names<'a, T: std::fmt::Display + 'a>(
    old: impl IntoIterator<Item = &'a Positioned<T>>,
    new: impl IntoIterator<Item = &'a Positioned<T>>,
    mut on_change: impl FnMut(&str, bool),
) {
    let old: std::collections::BTreeSet<String> = old.into_iter().map(|name| name.node.to_string()).collect();
    let new: std::collections::BTreeSet<String> = new.into_iter().map(|name| name.node.to_string()).collect();

    for removed in old.difference(&new) {
        on_change(removed, true);
    }

    for added in new.difference(&old) {
        on_change(added, false);
    }
}

/// `kind` names the parent type in messages.
fn diff_fields(
    type_name: &str,
    kind: &str,
    old: &[Positioned<ast::FieldDefinition>],
    new: &[Positioned<ast::FieldDefinition>],
    changes: &mut Changes,
) {
    let old = by_name(old, |field| &field.name.node);
    let new = by_name(new, |field| &field.name.node);

    for pair in old.into_iter().merge_join_by(new, |a, b| a.0.cmp(b.0)) {
        match pair {
            EitherOrBoth::Left((field_name, _)) => changes.breaking(
                ChangeType::FieldRemoved,
                format!("{type_name}.{field_name}"),
                format!("Field '{field_name}' was removed from {kind} '{type_name}'"),
            ),
            EitherOrBoth::Right((field_name, _)) => changes.non_breaking(
                ChangeType::FieldAdded,
                format!("{type_name}.{field_name}"),
                format!("Field '{field_name}' was added to {kind} '{type_name}'"),
            ),
            EitherOrBoth::Both((field_name, old), (_, new)) => {
                diff_field(&format!("{type_name}.{field_name}"), old, new, changes);
            }
        }
    }
}

fn diff_field(path: &str, old: &ast::FieldDefinition, new: &ast::FieldDefinition, changes: &mut Changes) {
    let (old_type, new_type) = (&old.ty.node, &new.ty.node);

    if old_type != new_type {
        changes.push(
            ChangeType::FieldTypeChanged,
            !is_nullability_relaxation(old_type, new_type),
            path,
            format!("Field '{path}' changed type from '{old_type}' to '{new_type}'"),
        );
    }

    match (is_deprecated(&old.directives), is_deprecated(&new.directives)) {
        (false, true) => changes.non_breaking(
            ChangeType::FieldDeprecationAdded,
            path,
            format!("Field '{path}' is deprecated"),
        ),
        (true, false) => changes.non_breaking(
            ChangeType::FieldDeprecationRemoved,
            path,
            format!("Field '{path}' is no longer deprecated"),
        ),
        _ => (),
    }

    let old_usages = tracked_usages(&old.directives);
    let new_usages = tracked_usages(&new.directives);

    for usage in old_usages.iter().filter(|usage| !new_usages.contains(*usage)) {
        changes.non_breaking(
            ChangeType::DirectiveUsageFieldDefinitionRemoved,
            path,
            format!("Directive '{usage}' was removed from field '{path}'"),
        );
    }

    for usage in new_usages.iter().filter(|usage| !old_usages.contains(*usage)) {
        changes.push(
            ChangeType::DirectiveUsageFieldDefinitionAdded,
            usage == "@inaccessible",
            path,
            format!("Directive '{usage}' was added to field '{path}'"),
        );
    }

    diff_arguments(path, &old.arguments, &new.arguments, changes);
}

fn diff_arguments(
    field_path: &str,
    old: &[Positioned<ast::InputValueDefinition>],
    new: &[Positioned<ast::InputValueDefinition>],
    changes: &mut Changes,
) {
    let old = by_name(old, |argument| &argument.name.node);
    let new = by_name(new, |argument| &argument.name.node);

    for pair in old.into_iter().merge_join_by(new, |a, b| a.0.cmp(b.0)) {
        match pair {
            EitherOrBoth::Left((name, _)) => changes.breaking(
                ChangeType::FieldArgumentRemoved,
                format!("{field_path}.{name}"),
                format!("Argument '{name}' was removed from field '{field_path}'"),
            ),
            EitherOrBoth::Right((name, argument)) => {
                let required = is_required(argument);
                let qualifier = if required { "Required" } else { "Optional" };

                changes.push(
                    ChangeType::FieldArgumentAdded,
                    required,
                    format!("{field_path}.{name}"),
                    format!("{qualifier} argument '{name}' was added to field '{field_path}'"),
                );
            }
            EitherOrBoth::Both((name, old), (_, new)) => {
                let path = format!("{field_path}.{name}");

                if old.ty.node != new.ty.node {
                    changes.push(
                        ChangeType::FieldArgumentTypeChanged,
                        !is_nullability_relaxation(&old.ty.node, &new.ty.node),
                        path.as_str(),
                        format!(
                            "Type for argument '{name}' on field '{field_path}' changed from '{}' to '{}'",
                            old.ty.node, new.ty.node
                        ),
                    );
                }

                if default_value(old) != default_value(new) {
                    changes.non_breaking(
                        ChangeType::FieldArgumentDefaultChanged,
                        path,
                        format!(
                            "Default value for argument '{name}' on field '{field_path}' changed from '{}' to '{}'",
                            default_value(old).unwrap_or_else(|| "undefined".to_owned()),
                            default_value(new).unwrap_or_else(|| "undefined".to_owned()),
                        ),
                    );
                }
            }
        }
    }
}

fn diff_input_fields(
    type_name: &str,
    old: &[Positioned<ast::InputValueDefinition>],
    new: &[Positioned<ast::InputValueDefinition>],
    changes: &mut Changes,
) {
    let old = by_name(old, |field| &field.name.node);
    let new = by_name(new, |field| &field.name.node);

    for pair in old.into_iter().merge_join_by(new, |a, b| a.0.cmp(b.0)) {
        match pair {
            EitherOrBoth::Left((name, _)) => changes.breaking(
                ChangeType::InputFieldRemoved,
                format!("{type_name}.{name}"),
                format!("Input field '{name}' was removed from input object type '{type_name}'"),
            ),
            EitherOrBoth::Right((name, field)) => {
                let required = is_required(field);
                let qualifier = if required { "Required" } else { "Optional" };

                changes.push(
                    ChangeType::InputFieldAdded,
                    required,
                    format!("{type_name}.{name}"),
                    format!("{qualifier} input field '{name}' was added to input object type '{type_name}'"),
                );
            }
            EitherOrBoth::Both((name, old), (_, new)) => {
                let path = format!("{type_name}.{name}");

                if old.ty.node != new.ty.node {
                    changes.push(
                        ChangeType::InputFieldTypeChanged,
                        !is_nullability_relaxation(&old.ty.node, &new.ty.node),
                        path.as_str(),
                        format!(
                            "Input field '{path}' changed type from '{}' to '{}'",
                            old.ty.node, new.ty.node
                        ),
                    );
                }

                if default_value(old) != default_value(new) {
                    changes.non_breaking(
                        ChangeType::InputFieldDefaultValueChanged,
                        path.as_str(),
                        format!("Input field '{path}' default value changed"),
                    );
                }
            }
        }
    }
}

/// Only dropping the outermost non-null wrapper keeps every existing client working.
fn is_nullability_relaxation(old: &ast::Type, new: &ast::Type) -> bool {
    !old.nullable && new.nullable && old.base == new.base
}

fn is_required(input_value: &ast::InputValueDefinition) -> bool {
    !input_value.ty.node.nullable && input_value.default_value.is_none()
}

fn default_value(input_value: &ast::InputValueDefinition) -> Option<String> {
    input_value.default_value.as_ref().map(|value| value.node.to_string())
}

fn description(description: &Option<Positioned<String>>) -> Option<&str> {
    description.as_ref().map(|description| description.node.as_str())
}

fn is_deprecated(directives: &[Positioned<ast::ConstDirective>]) -> bool {
    directives
        .iter()
        .any(|directive| directive.node.name.node == "deprecated")
}

/// `@inaccessible` and every distinct `@tag(name: ...)`, rendered as written in SDL.
fn tracked_usages(directives: &[Positioned<ast::ConstDirective>]) -> Vec<String> {
    directives
        .iter()
        .map(|directive| &directive.node)
        .filter(|directive| TRACKED_FIELD_DIRECTIVES.contains(&directive.name.node.as_str()))
        .map(|directive| {
            let arguments = directive
                .arguments
                .iter()
                .map(|(name, value)| format!("{}: {}", name.node, value.node))
                .join(", ");

            if arguments.is_empty() {
                format!("@{}", directive.name.node)
            } else {
                format!("@{}({arguments})", directive.name.node)
            }
        })
        .collect()
}

fn by_name<'a, T>(items: &'a [Positioned<T>], name: impl Fn(&'a T) -> &'a async_graphql_value::Name) -> BTreeMap<&'a str, &'a T> {
    items
        .iter()
        .map(|item| (name(&item.node).as_str(), &item.node))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse_type(ty: &str) -> ast::Type {
        ast::Type::new(ty).unwrap()
    }

    #[rstest]
    #[case("String!", "String", true)]
    #[case("String", "String!", false)]
    #[case("[String!]!", "[String!]", true)]
    #[case("[String!]", "[String]", false)]
    #[case("[String!]!", "[String]", false)]
    #[case("Int!", "String", false)]
    fn nullability_relaxation(#[case] old: &str, #[case] new: &str, #[case] expected: bool) {
        assert_eq!(is_nullability_relaxation(&parse_type(old), &parse_type(new)), expected);
    }
}
