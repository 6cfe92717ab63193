//! Validation of directive applications against their definitions.

use super::{builtins, coercion::Coercer, definitions::MergedSchema, Normalizer};
use crate::{errors::messages, utils, CompositionError};
use async_graphql_parser::{
    types::{self as ast, DirectiveLocation},
    Positioned,
};
use indexmap::IndexMap;
use std::collections::BTreeSet;

impl Normalizer<'_> {
    pub(super) fn validate_directive_applications(&mut self, merged: &mut MergedSchema) {
        let types = merged.types.clone();
        let coercer = Coercer { types: &types };

        if let Some(schema) = &mut merged.schema {
            self.validate_directives(&coercer, &mut schema.node.directives, DirectiveLocation::Schema, "schema");
        }

        for definition in merged.types.values_mut() {
            let type_name = definition.node.name.node.to_string();
            let location = match &definition.node.kind {
                ast::TypeKind::Scalar => DirectiveLocation::Scalar,
                ast::TypeKind::Object(_) => DirectiveLocation::Object,
                ast::TypeKind::Interface(_) => DirectiveLocation::Interface,
                ast::TypeKind::Union(_) => DirectiveLocation::Union,
                ast::TypeKind::Enum(_) => DirectiveLocation::Enum,
                ast::TypeKind::InputObject(_) => DirectiveLocation::InputObject,
            };

            self.validate_directives(&coercer, &mut definition.node.directives, location, &type_name);

            match &mut definition.node.kind {
                ast::TypeKind::Object(ast::ObjectType { fields, .. })
                | ast::TypeKind::Interface(ast::InterfaceType { fields, .. }) => {
                    for field in fields {
                        let coordinates = format!("{type_name}.{}", field.node.name.node);
                        self.validate_directives(
                            &coercer,
                            &mut field.node.directives,
                            DirectiveLocation::FieldDefinition,
                            &coordinates,
                        );

                        for argument in &mut field.node.arguments {
                            let coordinates = format!("{coordinates}({}: ...)", argument.node.name.node);
                            self.validate_directives(
                                &coercer,
                                &mut argument.node.directives,
                                DirectiveLocation::ArgumentDefinition,
                                &coordinates,
                            );
                        }
                    }
                }
                ast::TypeKind::Enum(enum_type) => {
                    for value in &mut enum_type.values {
                        let coordinates = format!("{type_name}.{}", value.node.value.node);
                        self.validate_directives(
                            &coercer,
                            &mut value.node.directives,
                            DirectiveLocation::EnumValue,
                            &coordinates,
                        );
                    }
                }
                ast::TypeKind::InputObject(input_object) => {
                    for field in &mut input_object.fields {
                        let coordinates = format!("{type_name}.{}", field.node.name.node);
                        self.validate_directives(
                            &coercer,
                            &mut field.node.directives,
                            DirectiveLocation::InputFieldDefinition,
                            &coordinates,
                        );
                    }
                }
                ast::TypeKind::Scalar | ast::TypeKind::Union(_) => (),
            }
        }
    }

    /// Validate the directives applied at one site. Valid argument values are replaced by their
    /// coerced form.
    fn validate_directives(
        &mut self,
        coercer: &Coercer<'_>,
        directives: &mut [Positioned<ast::ConstDirective>],
        location: DirectiveLocation,
        coordinates: &str,
    ) {
        let mut groups: IndexMap<String, Vec<usize>> = IndexMap::new();

        for (idx, directive) in directives.iter().enumerate() {
            groups
                .entry(directive.node.name.node.to_string())
                .or_default()
                .push(idx);
        }

        for (directive_name, indexes) in groups {
            let Some(definition) = self.directive_definitions.get(&directive_name) else {
                self.errors.push(CompositionError::UndefinedDirective {
                    directive_name,
                    coordinates: coordinates.to_owned(),
                });
                continue;
            };

            let mut errors = Vec::new();

            for (ordinal, idx) in indexes.iter().enumerate() {
                let mut reasons = Vec::new();

                if ordinal == 0 {
                    if !definition.locations.contains(&location) {
                        reasons.push(messages::invalid_directive_location(
                            &directive_name,
                            builtins::location_str(location),
                        ));
                    }

                    if indexes.len() > 1 && !definition.is_repeatable {
                        reasons.push(messages::invalid_repeated_directive(&directive_name));
                    }
                }

                let directive = &mut directives[*idx].node;
                let host_name = format!("@{directive_name}");
                let mut seen = BTreeSet::new();
                let mut duplicated = Vec::new();
                let mut unexpected = Vec::new();

                for (argument_name, value) in &mut directive.arguments {
                    let argument_name = argument_name.node.as_str();

                    if !seen.insert(argument_name.to_owned()) {
                        if !duplicated.iter().any(|name| name == argument_name) {
                            duplicated.push(argument_name.to_owned());
                        }
                        continue;
                    }

                    let Some(argument) = definition.argument(argument_name) else {
                        unexpected.push(argument_name.to_owned());
                        continue;
                    };

                    match coercer.coerce(&value.node, &argument.ty) {
                        Some(coerced) => value.node = coerced,
                        None => reasons.push(messages::invalid_argument_value(
                            &utils::print_value(&value.node),
                            &host_name,
                            argument_name,
                            &utils::render_type(&argument.ty),
                        )),
                    }
                }

                if !duplicated.is_empty() {
                    reasons.push(messages::duplicate_directive_arguments(&duplicated));
                }

                if !unexpected.is_empty() {
                    reasons.push(messages::unexpected_directive_arguments(&directive_name, &unexpected));
                }

                let required: Vec<String> = definition
                    .arguments
                    .iter()
                    .filter(|argument| argument.is_required())
                    .map(|argument| argument.name.clone())
                    .collect();

                let missing: Vec<String> = required
                    .iter()
                    .filter(|name| !seen.contains(name.as_str()))
                    .cloned()
                    .collect();

                if !missing.is_empty() {
                    reasons.push(messages::undefined_required_arguments(&directive_name, &required, &missing));
                }

                if !reasons.is_empty() {
                    errors.push(CompositionError::InvalidDirective {
                        directive_name: directive_name.clone(),
                        coordinates: coordinates.to_owned(),
                        ordinal: utils::ordinal(ordinal + 1),
                        messages: reasons,
                    });
                }
            }

            self.errors.extend(errors);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        errors::messages, normalize_subgraph, CompositionError, NormalizationOptions, NormalizationResult,
    };

    fn normalize(sdl: &str) -> NormalizationResult {
        let document = crate::parse_schema(sdl).unwrap();
        normalize_subgraph(&document, &NormalizationOptions::default())
    }

    #[test]
    fn bare_value_coerces_into_nested_list() {
        let success = normalize(
            r#"
            directive @z(list: [[String!]!]!) on FIELD_DEFINITION
            type Query { dummy: String! @z(list: "test") }
            "#,
        )
        .into_result()
        .unwrap();

        assert!(
            success.sdl().contains(r#"dummy: String! @z(list: [["test"]])"#),
            "{}",
            success.sdl()
        );
    }

    #[test]
    fn inaccessible_enum_value_argument() {
        let result = normalize(
            r#"
            directive @z(enum: Enum!) on FIELD_DEFINITION
            enum Enum { A B @inaccessible }
            type Query { dummy: String! @z(enum: B) }
            "#,
        );

        assert_eq!(
            result.errors(),
            [CompositionError::InvalidDirective {
                directive_name: "z".to_owned(),
                coordinates: "Query.dummy".to_owned(),
                ordinal: "1st".to_owned(),
                messages: vec![messages::invalid_argument_value("B", "@z", "enum", "Enum!")],
            }]
        );
    }

    #[test]
    fn ordinals_follow_declaration_order() {
        let result = normalize(
            r#"
            directive @z(a: Int!) repeatable on FIELD_DEFINITION
            type Query { dummy: String! @z(a: 1) @z(a: "x") @z }
            "#,
        );

        assert_eq!(
            result.errors(),
            [
                CompositionError::InvalidDirective {
                    directive_name: "z".to_owned(),
                    coordinates: "Query.dummy".to_owned(),
                    ordinal: "2nd".to_owned(),
                    messages: vec![messages::invalid_argument_value("\"x\"", "@z", "a", "Int!")],
                },
                CompositionError::InvalidDirective {
                    directive_name: "z".to_owned(),
                    coordinates: "Query.dummy".to_owned(),
                    ordinal: "3rd".to_owned(),
                    messages: vec![messages::undefined_required_arguments(
                        "z",
                        &["a".to_owned()],
                        &["a".to_owned()]
                    )],
                },
            ]
        );
    }

    #[test]
    fn location_and_repetition_are_reported_on_the_first_instance() {
        let result = normalize(
            r#"
            directive @z on OBJECT
            type Query { dummy: String! @z @z }
            "#,
        );

        assert_eq!(
            result.errors(),
            [CompositionError::InvalidDirective {
                directive_name: "z".to_owned(),
                coordinates: "Query.dummy".to_owned(),
                ordinal: "1st".to_owned(),
                messages: vec![
                    messages::invalid_directive_location("z", "FIELD_DEFINITION"),
                    messages::invalid_repeated_directive("z"),
                ],
            }]
        );
    }

    #[test]
    fn non_repeatable_directive_declared_twice() {
        let result = normalize(
            r#"
            directive @z on FIELD_DEFINITION
            type Query { dummy: String! @z @z }
            "#,
        );

        assert_eq!(
            result.errors(),
            [CompositionError::InvalidDirective {
                directive_name: "z".to_owned(),
                coordinates: "Query.dummy".to_owned(),
                ordinal: "1st".to_owned(),
                messages: vec![messages::invalid_repeated_directive("z")],
            }]
        );
    }

    #[test]
    fn repeatability_survives_normalization() {
        let success = normalize(
            r#"
            directive @once on FIELD_DEFINITION
            directive @many repeatable on FIELD_DEFINITION
            type Query { dummy: String! @once @many @many }
            "#,
        )
        .into_result()
        .unwrap();

        let sdl = success.sdl();
        assert!(sdl.contains("directive @once on FIELD_DEFINITION\n"), "{sdl}");
        assert!(sdl.contains("directive @many repeatable on FIELD_DEFINITION\n"), "{sdl}");
    }

    #[test]
    fn undefined_and_unexpected_arguments() {
        let result = normalize(
            r#"
            type Query {
              a: String @unknown @unknown
              b(arg: Int @deprecated(because: "x", reason: "y", reason: "z")): String
            }
            "#,
        );

        assert_eq!(
            result.errors(),
            [
                CompositionError::UndefinedDirective {
                    directive_name: "unknown".to_owned(),
                    coordinates: "Query.a".to_owned(),
                },
                CompositionError::InvalidDirective {
                    directive_name: "deprecated".to_owned(),
                    coordinates: "Query.b(arg: ...)".to_owned(),
                    ordinal: "1st".to_owned(),
                    messages: vec![
                        messages::duplicate_directive_arguments(&["reason".to_owned()]),
                        messages::unexpected_directive_arguments("deprecated", &["because".to_owned()]),
                    ],
                },
            ]
        );
    }
}
