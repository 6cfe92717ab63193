//! Merging of schema definitions, type definitions and their extensions within one subgraph.

use super::{builtins, Normalizer};
use crate::{utils, CompositionError};
use async_graphql_parser::{types as ast, Positioned};
use async_graphql_value::Name;
use indexmap::{IndexMap, IndexSet};
use std::collections::BTreeSet;

/// One subgraph with every extension folded into its definition.
#[derive(Debug, Clone, Default)]
pub(crate) struct MergedSchema {
    pub(crate) schema: Option<Positioned<ast::SchemaDefinition>>,
    /// User-defined directives, in declaration order.
    pub(crate) directive_definitions: IndexMap<String, Positioned<ast::DirectiveDefinition>>,
    /// Types in order of first appearance.
    pub(crate) types: IndexMap<String, Positioned<ast::TypeDefinition>>,
    /// Types that only appear as extensions (`extend type` or `@extends`).
    pub(crate) extension_types: BTreeSet<String>,
}

pub(crate) const ROOT_OPERATION_TYPES: [(&str, &str); 3] =
    [("query", "Query"), ("mutation", "Mutation"), ("subscription", "Subscription")];

pub(crate) fn kind_str(kind: &ast::TypeKind) -> &'static str {
    match kind {
        ast::TypeKind::Scalar => "Scalar",
        ast::TypeKind::Object(_) => "Object",
        ast::TypeKind::Interface(_) => "Interface",
        ast::TypeKind::Union(_) => "Union",
        ast::TypeKind::Enum(_) => "Enum",
        ast::TypeKind::InputObject(_) => "Input Object",
    }
}

fn empty_kind(kind: &ast::TypeKind) -> ast::TypeKind {
    match kind {
        ast::TypeKind::Scalar => ast::TypeKind::Scalar,
        ast::TypeKind::Object(_) => ast::TypeKind::Object(ast::ObjectType {
            implements: Vec::new(),
            fields: Vec::new(),
        }),
        ast::TypeKind::Interface(_) => ast::TypeKind::Interface(ast::InterfaceType {
            implements: Vec::new(),
            fields: Vec::new(),
        }),
        ast::TypeKind::Union(_) => ast::TypeKind::Union(ast::UnionType { members: Vec::new() }),
        ast::TypeKind::Enum(_) => ast::TypeKind::Enum(ast::EnumType { values: Vec::new() }),
        ast::TypeKind::InputObject(_) => ast::TypeKind::InputObject(ast::InputObjectType { fields: Vec::new() }),
    }
}

impl Normalizer<'_> {
    pub(super) fn merge_definitions(&mut self, document: &ast::ServiceDocument) -> MergedSchema {
        let mut merged = MergedSchema::default();

        for definition in &document.definitions {
            match definition {
                ast::TypeSystemDefinition::Schema(schema) => self.merge_schema_definition(&mut merged, schema),
                ast::TypeSystemDefinition::Directive(directive) => {
                    let name = directive.node.name.node.as_str();

                    if self.directive_definitions.is_builtin(name) {
                        continue;
                    }

                    if merged.directive_definitions.contains_key(name) {
                        self.errors.push(CompositionError::DuplicateDirectiveDefinition {
                            directive_name: name.to_owned(),
                        });
                        continue;
                    }

                    merged
                        .directive_definitions
                        .insert(name.to_owned(), directive.clone());
                }
                ast::TypeSystemDefinition::Type(type_definition) => {
                    if builtins::FEDERATION_TYPES.contains(&type_definition.node.name.node.as_str()) {
                        continue;
                    }

                    self.merge_type_definition(&mut merged, type_definition);
                }
            }
        }

        self.rename_root_types(&mut merged);

        merged
    }

    fn merge_schema_definition(&mut self, merged: &mut MergedSchema, schema: &Positioned<ast::SchemaDefinition>) {
        let Some(existing) = &mut merged.schema else {
            let mut schema = schema.clone();
            schema.node.extend = false;
            merged.schema = Some(schema);
            return;
        };

        existing.node.directives.extend(schema.node.directives.iter().cloned());

        let operations = [
            (&mut existing.node.query, &schema.node.query, "query"),
            (&mut existing.node.mutation, &schema.node.mutation, "mutation"),
            (&mut existing.node.subscription, &schema.node.subscription, "subscription"),
        ];

        for (existing, new, operation) in operations {
            match (existing.as_ref(), new) {
                (_, None) => (),
                (None, Some(new)) => *existing = Some(new.clone()),
                (Some(old), Some(new)) if old.node == new.node => (),
                (Some(old), Some(new)) => self.errors.push(CompositionError::DuplicateOperationTypeDefinition {
                    operation: operation.to_owned(),
                    new_type_name: new.node.to_string(),
                    existing_type_name: old.node.to_string(),
                }),
            }
        }
    }

    fn merge_type_definition(&mut self, merged: &mut MergedSchema, definition: &Positioned<ast::TypeDefinition>) {
        let name = definition.node.name.node.as_str();
        let is_extension =
            definition.node.extend || utils::has_directive(&definition.node.directives, builtins::EXTENDS);

        let Some(existing) = merged.types.get_mut(name) else {
            let mut base = definition.clone();
            base.node.extend = false;
            base.node.kind = empty_kind(&definition.node.kind);
            base.node.directives = Vec::new();

            if is_extension {
                merged.extension_types.insert(name.to_owned());
            }

            self.merge_type_body(&mut base.node, &definition.node);
            merged.types.insert(name.to_owned(), base);
            return;
        };

        let existing_kind = kind_str(&existing.node.kind);
        let new_kind = kind_str(&definition.node.kind);

        if existing_kind != new_kind {
            let error = if is_extension || merged.extension_types.contains(name) {
                CompositionError::IncompatibleExtensionKinds {
                    type_name: name.to_owned(),
                    existing_kind: existing_kind.to_owned(),
                    extension_kind: new_kind.to_owned(),
                }
            } else {
                CompositionError::DuplicateTypeDefinition {
                    type_string: existing_kind.to_owned(),
                    type_name: name.to_owned(),
                }
            };
            self.errors.push(error);
            return;
        }

        if !is_extension {
            if !merged.extension_types.remove(name) {
                self.errors.push(CompositionError::DuplicateTypeDefinition {
                    type_string: existing_kind.to_owned(),
                    type_name: name.to_owned(),
                });
                return;
            }

            if definition.node.description.is_some() {
                existing.node.description = definition.node.description.clone();
            }
        }

        self.merge_type_body(&mut existing.node, &definition.node);
    }

    fn merge_type_body(&mut self, target: &mut ast::TypeDefinition, source: &ast::TypeDefinition) {
        let type_name = target.name.node.to_string();

        if target.description.is_none() {
            target.description = source.description.clone();
        }

        target.directives.extend(source.directives.iter().cloned());

        match (&mut target.kind, &source.kind) {
            (ast::TypeKind::Object(target), ast::TypeKind::Object(source)) => {
                merge_implements(&mut target.implements, &source.implements);
                self.merge_fields(&type_name, "Object", &mut target.fields, &source.fields);
            }
            (ast::TypeKind::Interface(target), ast::TypeKind::Interface(source)) => {
                merge_implements(&mut target.implements, &source.implements);
                self.merge_fields(&type_name, "Interface", &mut target.fields, &source.fields);
            }
            (ast::TypeKind::Union(target), ast::TypeKind::Union(source)) => {
                let mut seen: IndexSet<Name> = target.members.iter().map(|member| member.node.clone()).collect();
                for member in &source.members {
                    if seen.insert(member.node.clone()) {
                        target.members.push(member.clone());
                    }
                }
            }
            (ast::TypeKind::Enum(target), ast::TypeKind::Enum(source)) => {
                for value in &source.values {
                    if target.values.iter().any(|existing| existing.node.value.node == value.node.value.node) {
                        self.errors.push(CompositionError::DuplicateEnumValueDefinition {
                            enum_name: type_name.clone(),
                            value_name: value.node.value.node.to_string(),
                        });
                        continue;
                    }
                    target.values.push(value.clone());
                }
            }
            (ast::TypeKind::InputObject(target), ast::TypeKind::InputObject(source)) => {
                for field in &source.fields {
                    if target.fields.iter().any(|existing| existing.node.name.node == field.node.name.node) {
                        self.errors.push(CompositionError::DuplicateFieldDefinition {
                            type_string: "Input Object".to_owned(),
                            type_name: type_name.clone(),
                            field_name: field.node.name.node.to_string(),
                        });
                        continue;
                    }
                    target.fields.push(field.clone());
                }
            }
            _ => (),
        }
    }

    fn merge_fields(
        &mut self,
        type_name: &str,
        type_string: &str,
        target: &mut Vec<Positioned<ast::FieldDefinition>>,
        source: &[Positioned<ast::FieldDefinition>],
    ) {
        for field in source {
            if target.iter().any(|existing| existing.node.name.node == field.node.name.node) {
                self.errors.push(CompositionError::DuplicateFieldDefinition {
                    type_string: type_string.to_owned(),
                    type_name: type_name.to_owned(),
                    field_name: field.node.name.node.to_string(),
                });
                continue;
            }
            target.push(field.clone());
        }
    }

    /// `schema { query: MyQuery }` renames `MyQuery` to `Query` everywhere.
    fn rename_root_types(&mut self, merged: &mut MergedSchema) {
        let Some(schema) = &mut merged.schema else {
            return;
        };

        let mut renames: Vec<(String, &'static str)> = Vec::new();

        for (operation, default_name) in ROOT_OPERATION_TYPES {
            let slot = match operation {
                "query" => &mut schema.node.query,
                "mutation" => &mut schema.node.mutation,
                _ => &mut schema.node.subscription,
            };

            let Some(name) = slot else { continue };

            if name.node != default_name {
                renames.push((name.node.to_string(), default_name));
                name.node = Name::new(default_name);
            }
        }

        for (original, default_name) in renames {
            if merged.types.contains_key(default_name) {
                self.errors.push(CompositionError::DuplicateTypeDefinition {
                    type_string: "Object".to_owned(),
                    type_name: default_name.to_owned(),
                });
                continue;
            }

            let Some(index) = merged.types.get_index_of(original.as_str()) else {
                continue;
            };

            if let Some((_, mut definition)) = merged.types.shift_remove_index(index) {
                definition.node.name.node = Name::new(default_name);
                let (new_index, _) = merged.types.insert_full(default_name.to_owned(), definition);
                merged.types.move_index(new_index, index);
            }

            if merged.extension_types.remove(original.as_str()) {
                merged.extension_types.insert(default_name.to_owned());
            }

            for definition in merged.types.values_mut() {
                rename_type_references(&mut definition.node, &original, default_name);
            }
        }
    }
}

fn merge_implements(target: &mut Vec<Positioned<Name>>, source: &[Positioned<Name>]) {
    for implemented in source {
        if !target.iter().any(|existing| existing.node == implemented.node) {
            target.push(implemented.clone());
        }
    }
}

fn rename_type_references(definition: &mut ast::TypeDefinition, from: &str, to: &str) {
    let rename = |ty: &mut ast::Type| {
        let name = utils::named_type_mut(ty);
        if name.as_str() == from {
            *name = Name::new(to);
        }
    };

    match &mut definition.kind {
        ast::TypeKind::Object(ast::ObjectType { fields, .. }) | ast::TypeKind::Interface(ast::InterfaceType { fields, .. }) => {
            for field in fields {
                rename(&mut field.node.ty.node);
                for argument in &mut field.node.arguments {
                    rename(&mut argument.node.ty.node);
                }
            }
        }
        ast::TypeKind::Union(union) => {
            for member in &mut union.members {
                if member.node.as_str() == from {
                    member.node = Name::new(to);
                }
            }
        }
        ast::TypeKind::InputObject(input_object) => {
            for field in &mut input_object.fields {
                rename(&mut field.node.ty.node);
            }
        }
        ast::TypeKind::Scalar | ast::TypeKind::Enum(_) => (),
    }
}
