use super::{builtins, definitions::MergedSchema, kind_str, Normalizer};
use crate::{utils, CompositionError};
use async_graphql_parser::types as ast;
use indexmap::IndexSet;

impl Normalizer<'_> {
    /// Every referenced type must be defined, and every composite type must have members.
    pub(super) fn check_references(&mut self, merged: &MergedSchema) {
        let mut undefined: IndexSet<&str> = IndexSet::new();
        let is_defined = |name: &str| builtins::is_implicit_type(name) || merged.types.contains_key(name);

        for directive in merged.directive_definitions.values() {
            for argument in &directive.node.arguments {
                let name = utils::named_type(&argument.node.ty.node);
                if !is_defined(name) {
                    undefined.insert(name);
                }
            }
        }

        for definition in merged.types.values() {
            let type_name = definition.node.name.node.as_str();

            match &definition.node.kind {
                ast::TypeKind::Object(ast::ObjectType { implements, fields })
                | ast::TypeKind::Interface(ast::InterfaceType { implements, fields }) => {
                    for field in fields {
                        let name = utils::named_type(&field.node.ty.node);
                        if !is_defined(name) {
                            undefined.insert(name);
                        }

                        for argument in &field.node.arguments {
                            let name = utils::named_type(&argument.node.ty.node);
                            if !is_defined(name) {
                                undefined.insert(name);
                            }
                        }
                    }

                    if fields.is_empty() {
                        self.errors.push(CompositionError::NoFieldDefinitions {
                            type_string: kind_str(&definition.node.kind).to_owned(),
                            type_name: type_name.to_owned(),
                        });
                    }

                    let invalid_implemented: Vec<String> = implements
                        .iter()
                        .map(|implemented| implemented.node.as_str())
                        .filter(|implemented| {
                            !matches!(
                                merged.types.get(*implemented).map(|definition| &definition.node.kind),
                                Some(ast::TypeKind::Interface(_))
                            )
                        })
                        .map(str::to_owned)
                        .collect();

                    if !invalid_implemented.is_empty() {
                        self.errors.push(CompositionError::InvalidImplementedType {
                            type_name: type_name.to_owned(),
                            implemented_names: invalid_implemented,
                        });
                    }
                }
                ast::TypeKind::Union(union) => {
                    if union.members.is_empty() {
                        self.errors.push(CompositionError::NoDefinedUnionMembers {
                            union_name: type_name.to_owned(),
                        });
                        continue;
                    }

                    let mut invalid_members = Vec::new();

                    for member in &union.members {
                        match merged.types.get(member.node.as_str()).map(|definition| &definition.node.kind) {
                            Some(ast::TypeKind::Object(_)) => (),
                            Some(_) => invalid_members.push(member.node.to_string()),
                            None => {
                                undefined.insert(member.node.as_str());
                            }
                        }
                    }

                    if !invalid_members.is_empty() {
                        self.errors.push(CompositionError::InvalidUnionMemberType {
                            union_name: type_name.to_owned(),
                            member_names: invalid_members,
                        });
                    }
                }
                ast::TypeKind::InputObject(input_object) => {
                    if input_object.fields.is_empty() {
                        self.errors.push(CompositionError::NoFieldDefinitions {
                            type_string: kind_str(&definition.node.kind).to_owned(),
                            type_name: type_name.to_owned(),
                        });
                    }

                    for field in &input_object.fields {
                        let name = utils::named_type(&field.node.ty.node);
                        if !is_defined(name) {
                            undefined.insert(name);
                        }
                    }
                }
                ast::TypeKind::Scalar | ast::TypeKind::Enum(_) => (),
            }
        }

        self.errors.extend(undefined.into_iter().map(|type_name| CompositionError::UndefinedType {
            type_name: type_name.to_owned(),
        }));
    }
}
