use super::{builtins, definitions::MergedSchema, field_sets::key_field_names};
use crate::{
    router_config::{ConfigurationData, RequiredFieldConfiguration},
    utils,
};
use async_graphql_parser::{types as ast, Positioned};
use async_graphql_value::ConstValue;
use std::collections::BTreeMap;

const ROOT_TYPE_NAMES: [&str; 3] = ["Query", "Mutation", "Subscription"];

/// Configuration data for every object and interface of a normalized subgraph.
pub(super) fn build(merged: &MergedSchema) -> BTreeMap<String, ConfigurationData> {
    merged
        .types
        .values()
        .filter_map(|definition| {
            let fields = match &definition.node.kind {
                ast::TypeKind::Object(ast::ObjectType { fields, .. })
                | ast::TypeKind::Interface(ast::InterfaceType { fields, .. }) => fields,
                _ => return None,
            };

            let data = configuration_data(&definition.node, fields);
            Some((data.type_name.clone(), data))
        })
        .collect()
}

fn configuration_data(definition: &ast::TypeDefinition, fields: &[Positioned<ast::FieldDefinition>]) -> ConfigurationData {
    let type_name = definition.name.node.to_string();
    let keys = keys(&definition.directives);
    let key_fields = key_field_names(&definition.directives);
    let type_is_external = utils::has_directive(&definition.directives, builtins::EXTERNAL);

    let mut data = ConfigurationData {
        is_root_node: !keys.is_empty() || ROOT_TYPE_NAMES.contains(&type_name.as_str()),
        is_interface_object: matches!(definition.kind, ast::TypeKind::Object(_))
            && utils::has_directive(&definition.directives, builtins::INTERFACE_OBJECT),
        keys,
        type_name,
        ..Default::default()
    };

    for field in fields {
        let field_name = field.node.name.node.to_string();
        let is_external = type_is_external || utils::has_directive(&field.node.directives, builtins::EXTERNAL);

        for (directive_name, target) in [
            (builtins::PROVIDES, &mut data.provides),
            (builtins::REQUIRES, &mut data.requires),
        ] {
            let field_sets = field
                .node
                .directives
                .iter()
                .filter(|directive| directive.node.name.node == directive_name)
                .filter_map(|directive| utils::string_argument(&directive.node, "fields"));

            for field_set in field_sets {
                target.push(RequiredFieldConfiguration {
                    field_name: field_name.clone(),
                    selection_set: field_set.to_owned(),
                    disable_entity_resolver: false,
                });
            }
        }

        if is_external && !key_fields.contains(&field_name) {
            data.external_field_names.insert(field_name);
        } else {
            data.field_names.insert(field_name);
        }
    }

    data
}

/// Keys in declaration order, deduplicated by their normalized selection set.
fn keys(directives: &[Positioned<ast::ConstDirective>]) -> Vec<RequiredFieldConfiguration> {
    let mut keys: Vec<RequiredFieldConfiguration> = Vec::new();

    for directive in directives.iter().filter(|directive| directive.node.name.node == builtins::KEY) {
        let Some(selection_set) = utils::string_argument(&directive.node, "fields") else {
            continue;
        };

        if keys.iter().any(|key| key.selection_set == selection_set) {
            continue;
        }

        let resolvable = directive
            .node
            .get_argument("resolvable")
            .map(|value| !matches!(value.node, ConstValue::Boolean(false)))
            .unwrap_or(true);

        keys.push(RequiredFieldConfiguration {
            field_name: String::new(),
            selection_set: selection_set.to_owned(),
            disable_entity_resolver: !resolvable,
        });
    }

    keys
}

#[cfg(test)]
mod tests {
    use crate::{normalize_subgraph, NormalizationOptions};

    #[test]
    fn configuration_data_snapshot() {
        let document = crate::parse_schema(
            r#"
            type Query { users: [User!]! @provides(fields: "name") }

            type User @key(fields: "id") @key(fields: "id") @key(fields: "email", resolvable: false) {
              id: ID! @external
              email: String!
              name: String @external
              age: Int @external
              isAdult: Boolean @requires(fields: "age")
            }

            type Product @interfaceObject @key(fields: "upc") {
              upc: String!
            }

            type Plain { a: String }
            "#,
        )
        .unwrap();

        let success = normalize_subgraph(&document, &NormalizationOptions::default())
            .into_result()
            .unwrap();

        insta::assert_json_snapshot!(success.configuration_data_by_type_name, @r###"
        {
          "Plain": {
            "typeName": "Plain",
            "fieldNames": [
              "a"
            ],
            "isRootNode": false,
            "isInterfaceObject": false
          },
          "Product": {
            "typeName": "Product",
            "fieldNames": [
              "upc"
            ],
            "isRootNode": true,
            "isInterfaceObject": true,
            "keys": [
              {
                "fieldName": "",
                "selectionSet": "upc"
              }
            ]
          },
          "Query": {
            "typeName": "Query",
            "fieldNames": [
              "users"
            ],
            "isRootNode": true,
            "isInterfaceObject": false,
            "provides": [
              {
                "fieldName": "users",
                "selectionSet": "name"
              }
            ]
          },
          "User": {
            "typeName": "User",
            "fieldNames": [
              "email",
              "id",
              "isAdult"
            ],
            "isRootNode": true,
            "isInterfaceObject": false,
            "keys": [
              {
                "fieldName": "",
                "selectionSet": "id"
              },
              {
                "fieldName": "",
                "selectionSet": "email",
                "disableEntityResolver": true
              }
            ],
            "requires": [
              {
                "fieldName": "isAdult",
                "selectionSet": "age"
              }
            ],
            "externalFieldNames": [
              "age",
              "name"
            ]
          }
        }
        "###);
    }
}
