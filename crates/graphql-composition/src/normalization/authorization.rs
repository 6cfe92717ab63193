//! `@authenticated` and `@requiresScopes` in one subgraph.

use super::{builtins, definitions::MergedSchema, Normalizer};
use crate::{
    authorization::{AuthorizationData, AuthorizationRequirements, MAX_OR_SCOPES},
    CompositionError,
};
use async_graphql_parser::{types as ast, Positioned};
use async_graphql_value::ConstValue;
use std::collections::{BTreeMap, BTreeSet};

impl Normalizer<'_> {
    /// Requirements declared on an object or interface apply to each of its fields. On enums and
    /// scalars they are kept on the type, for the fields returning it.
    pub(super) fn collect_authorization(&mut self, merged: &MergedSchema) -> BTreeMap<String, AuthorizationData> {
        let mut collected = BTreeMap::new();
        let mut invalid_coordinates = BTreeSet::new();

        for definition in merged.types.values() {
            let fields: &[Positioned<ast::FieldDefinition>] = match &definition.node.kind {
                ast::TypeKind::Object(ast::ObjectType { fields, .. })
                | ast::TypeKind::Interface(ast::InterfaceType { fields, .. }) => fields,
                ast::TypeKind::Enum(_) | ast::TypeKind::Scalar => &[],
                ast::TypeKind::Union(_) | ast::TypeKind::InputObject(_) => continue,
            };

            let type_name = definition.node.name.node.as_str();
            let mut data = AuthorizationData::new(type_name);

            if !read_requirements(&definition.node.directives, &mut data.requirements) {
                invalid_coordinates.insert(type_name.to_owned());
            }

            for field in fields {
                let field_name = field.node.name.node.to_string();
                let mut requirements = AuthorizationRequirements::default();

                if !read_requirements(&field.node.directives, &mut requirements)
                    || !requirements.merge_by_and(&data.requirements)
                {
                    invalid_coordinates.insert(format!("{type_name}.{field_name}"));
                    continue;
                }

                if !requirements.is_empty() {
                    data.fields.insert(field_name, requirements);
                }
            }

            if !data.requirements.is_empty() || !data.fields.is_empty() {
                collected.insert(type_name.to_owned(), data);
            }
        }

        if !invalid_coordinates.is_empty() {
            self.errors.push(CompositionError::OrScopesLimit {
                max_or_scopes: MAX_OR_SCOPES,
                coordinates: invalid_coordinates.into_iter().collect(),
            });
        }

        collected
    }
}

/// Returns `false` if `@requiresScopes` lists more than [MAX_OR_SCOPES] alternatives.
fn read_requirements(
    directives: &[Positioned<ast::ConstDirective>],
    requirements: &mut AuthorizationRequirements,
) -> bool {
    let mut within_limit = true;

    for directive in directives {
        match directive.node.name.node.as_str() {
            builtins::AUTHENTICATED => requirements.requires_authentication = true,
            builtins::REQUIRES_SCOPES => {
                let Some(ConstValue::List(alternatives)) = directive.node.get_argument("scopes").map(|value| &value.node)
                else {
                    continue;
                };

                if alternatives.len() > MAX_OR_SCOPES {
                    within_limit = false;
                    continue;
                }

                for alternative in alternatives {
                    let ConstValue::List(scopes) = alternative else {
                        continue;
                    };

                    requirements.push_scopes(
                        scopes
                            .iter()
                            .filter_map(|scope| match scope {
                                ConstValue::String(scope) => Some(scope.clone()),
                                _ => None,
                            })
                            .collect(),
                    );
                }
            }
            _ => (),
        }
    }

    within_limit
}

#[cfg(test)]
mod tests {
    use crate::{normalize_subgraph, CompositionError, NormalizationOptions, MAX_OR_SCOPES};

    fn normalize(sdl: &str) -> crate::NormalizationResult {
        let document = crate::parse_schema(sdl).unwrap();
        normalize_subgraph(&document, &NormalizationOptions::default())
    }

    #[test]
    fn type_requirements_apply_to_each_field() {
        let success = normalize(
            r#"
            type Query { me: User }
            type User @authenticated {
              id: ID!
              email: String @requiresScopes(scopes: [["read:email"], ["admin"]])
            }
            enum Role @requiresScopes(scopes: "read:role") { ADMIN }
            "#,
        )
        .into_result()
        .unwrap();

        insta::assert_debug_snapshot!(success.authorization_data_by_type_name, @r###"
        {
            "Role": AuthorizationData {
                type_name: "Role",
                requirements: AuthorizationRequirements {
                    requires_authentication: false,
                    required_scopes: [
                        {
                            "read:role",
                        },
                    ],
                },
                fields: {},
            },
            "User": AuthorizationData {
                type_name: "User",
                requirements: AuthorizationRequirements {
                    requires_authentication: true,
                    required_scopes: [],
                },
                fields: {
                    "email": AuthorizationRequirements {
                        requires_authentication: true,
                        required_scopes: [
                            {
                                "read:email",
                            },
                            {
                                "admin",
                            },
                        ],
                    },
                    "id": AuthorizationRequirements {
                        requires_authentication: true,
                        required_scopes: [],
                    },
                },
            },
        }
        "###);
    }

    #[test]
    fn too_many_alternative_scopes() {
        let alternatives = (0..=MAX_OR_SCOPES)
            .map(|idx| format!("[\"s{idx}\"]"))
            .collect::<Vec<_>>()
            .join(", ");

        let result = normalize(&format!(
            "type Query {{ a: String @requiresScopes(scopes: [{alternatives}]) b: String }}"
        ));

        assert_eq!(
            result.errors(),
            [CompositionError::OrScopesLimit {
                max_or_scopes: MAX_OR_SCOPES,
                coordinates: vec!["Query.a".to_owned()],
            }]
        );
        assert_eq!(
            result.errors()[0].to_string(),
            "The maximum number of OR scopes that can be defined by @requiresScopes on a single field is 16. However, the following coordinates attempt to define more:\n \"Query.a\"\nIf you require more, please contact support."
        );
    }

    #[test]
    fn type_and_field_scopes_over_the_limit() {
        let sdl = r#"
            type Query @requiresScopes(scopes: [["a"], ["b"], ["c"], ["d"], ["e"]]) {
              ok: String
              tooMany: String @requiresScopes(scopes: [["f"], ["g"], ["h"], ["i"]])
            }
        "#;

        assert_eq!(
            normalize(sdl).errors(),
            [CompositionError::OrScopesLimit {
                max_or_scopes: MAX_OR_SCOPES,
                coordinates: vec!["Query.tooMany".to_owned()],
            }]
        );
    }

    #[test]
    fn authorization_directives_are_not_repeatable() {
        let result = normalize("type Query { a: String @authenticated @authenticated }");

        assert_eq!(
            result.errors(),
            [CompositionError::InvalidDirective {
                directive_name: "authenticated".to_owned(),
                coordinates: "Query.a".to_owned(),
                ordinal: "1st".to_owned(),
                messages: vec![crate::errors::messages::invalid_repeated_directive("authenticated")],
            }]
        );
    }
}
