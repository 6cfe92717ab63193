//! Field sets: the `fields` argument of `@key`, `@provides` and `@requires`.

use super::{builtins, definitions::MergedSchema, Normalizer};
use crate::{errors::messages, utils, CompositionError};
use async_graphql_parser::{types as ast, Positioned};
use async_graphql_value::ConstValue;
use indexmap::IndexMap;
use std::{
    collections::BTreeSet,
    fmt::{self, Write as _},
};

/// One selection in a parsed field set.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FieldSetSelection {
    Field {
        name: String,
        arguments: Vec<(String, ConstValue)>,
        selection_set: Vec<FieldSetSelection>,
    },
    InlineFragment {
        type_condition: Option<String>,
        selection_set: Vec<FieldSetSelection>,
    },
    FragmentSpread(String),
}

impl FieldSetSelection {
    pub(crate) fn field_name(&self) -> Option<&str> {
        match self {
            FieldSetSelection::Field { name, .. } => Some(name),
            _ => None,
        }
    }

    pub(crate) fn selection_set(&self) -> &[FieldSetSelection] {
        match self {
            FieldSetSelection::Field { selection_set, .. } | FieldSetSelection::InlineFragment { selection_set, .. } => {
                selection_set
            }
            FieldSetSelection::FragmentSpread(_) => &[],
        }
    }
}

/// Parse a field set as the selection set `{ <field set> }`.
pub(crate) fn parse_field_set(field_set: &str) -> Result<Vec<FieldSetSelection>, String> {
    let document = async_graphql_parser::parse_query(format!("{{{field_set}}}")).map_err(|err| err.to_string())?;

    let Some((_, operation)) = document.operations.iter().next() else {
        return Err("The field set is empty.".to_owned());
    };

    convert_selection_set(&operation.node.selection_set.node)
}

fn convert_selection_set(selection_set: &ast::SelectionSet) -> Result<Vec<FieldSetSelection>, String> {
    selection_set
        .items
        .iter()
        .map(|selection| match &selection.node {
            ast::Selection::Field(field) => {
                let arguments = field
                    .node
                    .arguments
                    .iter()
                    .map(|(name, value)| {
                        value
                            .node
                            .clone()
                            .into_const()
                            .map(|value| (name.node.to_string(), value))
                            .ok_or_else(|| "Field sets cannot contain variables.".to_owned())
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(FieldSetSelection::Field {
                    name: field.node.name.node.to_string(),
                    arguments,
                    selection_set: convert_selection_set(&field.node.selection_set.node)?,
                })
            }
            ast::Selection::InlineFragment(fragment) => Ok(FieldSetSelection::InlineFragment {
                type_condition: fragment
                    .node
                    .type_condition
                    .as_ref()
                    .map(|condition| condition.node.on.node.to_string()),
                selection_set: convert_selection_set(&fragment.node.selection_set.node)?,
            }),
            ast::Selection::FragmentSpread(spread) => {
                Ok(FieldSetSelection::FragmentSpread(spread.node.fragment_name.node.to_string()))
            }
        })
        .collect()
}

/// Render a selection set the way it appears in configuration data: `id organization { id }`.
pub(crate) fn render_field_set(selections: &[FieldSetSelection]) -> String {
    let mut out = String::new();
    write_selections(&mut out, selections).ok();
    out
}

fn write_selections(out: &mut String, selections: &[FieldSetSelection]) -> fmt::Result {
    for (idx, selection) in selections.iter().enumerate() {
        if idx > 0 {
            out.write_char(' ')?;
        }

        match selection {
            FieldSetSelection::Field {
                name,
                arguments,
                selection_set,
            } => {
                out.write_str(name)?;

                if !arguments.is_empty() {
                    out.write_char('(')?;
                    for (idx, (name, value)) in arguments.iter().enumerate() {
                        if idx > 0 {
                            out.write_str(", ")?;
                        }
                        write!(out, "{name}: ")?;
                        utils::write_value(out, value)?;
                    }
                    out.write_char(')')?;
                }

                write_subselection(out, selection_set)?;
            }
            FieldSetSelection::InlineFragment {
                type_condition,
                selection_set,
            } => {
                out.write_str("...")?;
                if let Some(condition) = type_condition {
                    write!(out, " on {condition}")?;
                }
                write_subselection(out, selection_set)?;
            }
            FieldSetSelection::FragmentSpread(name) => write!(out, "...{name}")?,
        }
    }

    Ok(())
}

fn write_subselection(out: &mut String, selections: &[FieldSetSelection]) -> fmt::Result {
    if selections.is_empty() {
        return Ok(());
    }

    out.write_str(" { ")?;
    write_selections(out, selections)?;
    out.write_str(" }")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldSetKind {
    Key,
    Provides,
    Requires,
}

impl FieldSetKind {
    fn directive_name(self) -> &'static str {
        match self {
            FieldSetKind::Key => builtins::KEY,
            FieldSetKind::Provides => builtins::PROVIDES,
            FieldSetKind::Requires => builtins::REQUIRES,
        }
    }
}

struct FieldSetValidator<'a> {
    types: &'a IndexMap<String, Positioned<ast::TypeDefinition>>,
    field_set: &'a str,
    kind: FieldSetKind,
    errors: Vec<String>,
}

fn fields_of(definition: &ast::TypeDefinition) -> &[Positioned<ast::FieldDefinition>] {
    match &definition.kind {
        ast::TypeKind::Object(ast::ObjectType { fields, .. })
        | ast::TypeKind::Interface(ast::InterfaceType { fields, .. }) => fields,
        _ => &[],
    }
}

impl FieldSetValidator<'_> {
    fn validate(&mut self, parent_type_name: &str, selections: &[FieldSetSelection], depth: usize) {
        let Some(parent) = self.types.get(parent_type_name) else {
            return;
        };

        let mut seen = BTreeSet::new();

        for selection in selections {
            match selection {
                FieldSetSelection::Field {
                    name,
                    arguments: _,
                    selection_set,
                } => {
                    if name == "__typename" {
                        continue;
                    }

                    let field_path = format!("{parent_type_name}.{name}");

                    if !seen.insert(name.as_str()) {
                        self.errors
                            .push(messages::duplicate_field_in_field_set(self.field_set, &field_path));
                        continue;
                    }

                    let Some(field) = fields_of(&parent.node)
                        .iter()
                        .find(|field| field.node.name.node == name.as_str())
                    else {
                        self.errors.push(messages::undefined_field_in_field_set(
                            self.field_set,
                            parent_type_name,
                            name,
                        ));
                        continue;
                    };

                    if self.kind == FieldSetKind::Key && !field.node.arguments.is_empty() {
                        self.errors
                            .push(messages::arguments_in_key_field_set(self.field_set, &field_path));
                        continue;
                    }

                    if self.kind == FieldSetKind::Requires
                        && depth == 0
                        && !utils::has_directive(&field.node.directives, builtins::EXTERNAL)
                        && !utils::has_directive(&parent.node.directives, builtins::EXTERNAL)
                    {
                        self.errors
                            .push(messages::non_external_required_field(self.field_set, &field_path));
                        continue;
                    }

                    let field_type_name = utils::named_type(&field.node.ty.node);
                    let field_kind = self.types.get(field_type_name).map(|definition| &definition.node.kind);

                    match field_kind {
                        Some(ast::TypeKind::Interface(_) | ast::TypeKind::Union(_))
                            if self.kind == FieldSetKind::Key =>
                        {
                            self.errors.push(messages::abstract_type_in_key_field_set(
                                self.field_set,
                                &field_path,
                                field_type_name,
                            ));
                        }
                        Some(ast::TypeKind::Object(_) | ast::TypeKind::Interface(_) | ast::TypeKind::Union(_)) => {
                            if selection_set.is_empty() {
                                self.errors.push(messages::invalid_selection_set(
                                    self.field_set,
                                    &field_path,
                                    field_type_name,
                                ));
                            } else {
                                self.validate(field_type_name, selection_set, depth + 1);
                            }
                        }
                        _ if !selection_set.is_empty() => {
                            self.errors.push(messages::invalid_selection_set_definition(
                                self.field_set,
                                &field_path,
                                field_type_name,
                            ));
                        }
                        _ => (),
                    }
                }
                FieldSetSelection::InlineFragment { .. } | FieldSetSelection::FragmentSpread(_)
                    if self.kind == FieldSetKind::Key =>
                {
                    self.errors.push(messages::fragment_in_key_field_set(self.field_set));
                }
                FieldSetSelection::InlineFragment {
                    type_condition,
                    selection_set,
                } => {
                    let condition = type_condition.as_deref().unwrap_or(parent_type_name);

                    if !self.is_possible_type(parent_type_name, condition) {
                        self.errors.push(messages::invalid_inline_fragment_type_condition(
                            self.field_set,
                            parent_type_name,
                            condition,
                        ));
                        continue;
                    }

                    self.validate(condition, selection_set, depth);
                }
                FieldSetSelection::FragmentSpread(_) => {
                    self.errors.push(messages::unparsable_field_set(
                        self.field_set,
                        Some("Named fragments cannot be used in field sets."),
                    ));
                }
            }
        }
    }

    fn is_possible_type(&self, parent_type_name: &str, type_name: &str) -> bool {
        if parent_type_name == type_name {
            return true;
        }

        let Some(parent) = self.types.get(parent_type_name) else {
            return false;
        };

        match &parent.node.kind {
            ast::TypeKind::Union(union) => union.members.iter().any(|member| member.node == type_name),
            ast::TypeKind::Interface(_) => match self.types.get(type_name).map(|definition| &definition.node.kind) {
                Some(
                    ast::TypeKind::Object(ast::ObjectType { implements, .. })
                    | ast::TypeKind::Interface(ast::InterfaceType { implements, .. }),
                ) => implements.iter().any(|implemented| implemented.node == parent_type_name),
                _ => false,
            },
            _ => false,
        }
    }
}

impl Normalizer<'_> {
    /// Validate every field set and replace it with its normalized rendering.
    pub(super) fn validate_field_sets(&mut self, merged: &mut MergedSchema) {
        let types = merged.types.clone();

        for definition in merged.types.values_mut() {
            let type_name = definition.node.name.node.to_string();

            let fields = match &mut definition.node.kind {
                ast::TypeKind::Object(ast::ObjectType { fields, .. })
                | ast::TypeKind::Interface(ast::InterfaceType { fields, .. }) => fields,
                _ => continue,
            };

            self.validate_field_set_directives(
                &types,
                &mut definition.node.directives,
                FieldSetKind::Key,
                &type_name,
                &type_name,
            );

            for field in fields {
                let coordinates = format!("{type_name}.{}", field.node.name.node);
                let return_type = utils::named_type(&field.node.ty.node).to_owned();

                self.validate_field_set_directives(
                    &types,
                    &mut field.node.directives,
                    FieldSetKind::Provides,
                    &return_type,
                    &coordinates,
                );

                self.validate_field_set_directives(
                    &types,
                    &mut field.node.directives,
                    FieldSetKind::Requires,
                    &type_name,
                    &coordinates,
                );
            }
        }
    }

    fn validate_field_set_directives(
        &mut self,
        types: &IndexMap<String, Positioned<ast::TypeDefinition>>,
        directives: &mut [Positioned<ast::ConstDirective>],
        kind: FieldSetKind,
        parent_type_name: &str,
        coordinates: &str,
    ) {
        let directive_name = kind.directive_name();

        let instances = directives
            .iter_mut()
            .filter(|directive| directive.node.name.node == directive_name);

        for (idx, directive) in instances.enumerate() {
            let Some((_, value)) = directive
                .node
                .arguments
                .iter_mut()
                .find(|(name, _)| name.node == "fields")
            else {
                continue;
            };

            let ConstValue::String(field_set) = &value.node else {
                continue;
            };

            let field_set = field_set.clone();
            let mut validator = FieldSetValidator {
                types,
                field_set: &field_set,
                kind,
                errors: Vec::new(),
            };

            match parse_field_set(&field_set) {
                Ok(selections) => {
                    let is_composite = matches!(
                        types.get(parent_type_name).map(|definition| &definition.node.kind),
                        Some(ast::TypeKind::Object(_) | ast::TypeKind::Interface(_) | ast::TypeKind::Union(_))
                    );

                    if is_composite {
                        validator.validate(parent_type_name, &selections, 0);
                    } else {
                        validator.errors.push(messages::invalid_selection_set_definition(
                            &field_set,
                            coordinates,
                            parent_type_name,
                        ));
                    }

                    if validator.errors.is_empty() {
                        value.node = ConstValue::String(render_field_set(&selections));
                        continue;
                    }
                }
                Err(reason) => validator
                    .errors
                    .push(messages::unparsable_field_set(&field_set, Some(&reason))),
            }

            self.errors.push(CompositionError::InvalidDirective {
                directive_name: directive_name.to_owned(),
                coordinates: coordinates.to_owned(),
                ordinal: utils::ordinal(idx + 1),
                messages: validator.errors,
            });
        }
    }
}

pub(super) fn key_field_names(directives: &[Positioned<ast::ConstDirective>]) -> BTreeSet<String> {
    directives
        .iter()
        .filter(|directive| directive.node.name.node == builtins::KEY)
        .filter_map(|directive| utils::string_argument(&directive.node, "fields"))
        .filter_map(|field_set| parse_field_set(field_set).ok())
        .flatten()
        .filter_map(|selection| selection.field_name().map(str::to_owned))
        .collect()
}
