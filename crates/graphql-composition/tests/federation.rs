#![allow(unused_crate_dependencies)]

use graphql_composition::{
    federate_subgraphs, CompositionError, CompositionOptions, CompositionWarning, FederationResult, Override,
    RequiredInputValueViolation, RouterCompatibilityVersion, ShareabilityViolation, Subgraph,
};
use rstest::rstest;

fn subgraph(name: &str, sdl: &str) -> Subgraph {
    Subgraph::from_sdl(name, format!("http://{name}.example.com/graphql"), sdl).unwrap()
}

fn federate(subgraphs: &[Subgraph]) -> FederationResult {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    federate_subgraphs(subgraphs, RouterCompatibilityVersion::One, &CompositionOptions::default())
}

const INTERFACE_OBJECT_IMPLEMENTATIONS: &str = r#"
    interface InterfaceA @key(fields: "id") {
      id: ID!
    }

    interface InterfaceB @key(fields: "id") {
      id: ID!
    }

    type EntityA implements InterfaceA @key(fields: "id") {
      id: ID!
      name: String!
    }

    type EntityB implements InterfaceB @key(fields: "id") {
      id: ID!
      name: String!
    }

    type Query {
      a: EntityA!
      b: EntityB!
    }
"#;

const INTERFACE_OBJECTS: &str = r#"
    type InterfaceA @key(fields: "id") @interfaceObject {
      id: ID!
      object: ObjectA!
    }

    type InterfaceB @key(fields: "id") @interfaceObject {
      id: ID!
      entity: EntityC!
    }

    type EntityC @key(fields: "id") {
      id: ID!
      name: String!
    }

    type ObjectA {
      name: String!
    }

    type Query {
      interfaceAs: [InterfaceA!]!
      interfaceBs: [InterfaceB!]!
    }
"#;

#[test]
fn interface_object_fields_are_added_to_the_implementations() {
    let success = federate(&[
        subgraph("implementations", INTERFACE_OBJECT_IMPLEMENTATIONS),
        subgraph("interface-objects", INTERFACE_OBJECTS),
    ])
    .into_result()
    .unwrap();

    let graph = &success.federated_graph;

    let entity_a_fields: Vec<&str> = graph.object("EntityA").unwrap().fields.keys().map(String::as_str).collect();
    assert_eq!(entity_a_fields, ["id", "name", "object"]);

    let entity_b_fields: Vec<&str> = graph.object("EntityB").unwrap().fields.keys().map(String::as_str).collect();
    assert_eq!(entity_b_fields, ["entity", "id", "name"]);

    let id = graph.field("EntityA", "id").unwrap();
    assert_eq!(id.resolvable_in, ["implementations", "interface-objects"]);

    let object = graph.field("EntityA", "object").unwrap();
    assert_eq!(object.resolvable_in, ["interface-objects"]);

    let config = &success.subgraph_config_by_subgraph_name["interface-objects"].configuration_data_by_type_name;

    insta::assert_json_snapshot!(config["InterfaceA"], @r###"
    {
      "typeName": "InterfaceA",
      "fieldNames": [
        "id",
        "object"
      ],
      "isRootNode": true,
      "isInterfaceObject": true,
      "entityInterfaceConcreteTypeNames": [
        "EntityA"
      ],
      "keys": [
        {
          "fieldName": "",
          "selectionSet": "id"
        }
      ]
    }
    "###);

    insta::assert_json_snapshot!(config["EntityB"], @r###"
    {
      "typeName": "EntityB",
      "fieldNames": [
        "entity",
        "id"
      ],
      "isRootNode": true,
      "isInterfaceObject": false,
      "keys": [
        {
          "fieldName": "",
          "selectionSet": "id"
        }
      ]
    }
    "###);

    assert!(!config["ObjectA"].is_root_node);
    assert!(config["ObjectA"].entity_interface_concrete_type_names.is_empty());
}

#[test]
fn interface_object_next_to_concrete_implementations() {
    let interface_object = subgraph(
        "faa",
        r#"
        type Query {
          entities: [Interface!]!
        }

        type Interface @key(fields: "id") @interfaceObject {
          id: ID!
          name: String!
        }

        type EntityOne @key(fields: "id") {
          id: ID!
        }

        type EntityTwo @key(fields: "id") {
          id: ID!
        }
        "#,
    );

    let entity_interface = subgraph(
        "fab",
        r#"
        interface Interface @key(fields: "id") {
          id: ID!
        }

        type EntityOne implements Interface @key(fields: "id") {
          id: ID!
        }

        type EntityTwo implements Interface @key(fields: "id") {
          id: ID!
        }
        "#,
    );

    let result = federate(&[interface_object, entity_interface]);

    assert_eq!(
        result.errors(),
        [CompositionError::InvalidInterfaceObjectImplementationDefinitions {
            interface_name: "Interface".to_owned(),
            subgraph_name: "faa".to_owned(),
            implementation_names: vec!["EntityOne".to_owned(), "EntityTwo".to_owned()],
        }]
    );
}

#[rstest]
#[case::int_first(["ints", "strings"])]
#[case::string_first(["strings", "ints"])]
fn incompatible_types_name_the_first_subgraph_as_expected(#[case] order: [&str; 2]) {
    let ints = subgraph(
        "ints",
        r#"
        type Query { thing: Thing }
        type Thing @shareable { value: Int }
        "#,
    );
    let strings = subgraph(
        "strings",
        r#"
        type Query { otherThing: Thing }
        type Thing @shareable { value: String }
        "#,
    );

    let subgraphs = match order {
        ["ints", _] => [ints, strings],
        _ => [strings, ints],
    };

    let result = federate(&subgraphs);

    let type_of = |subgraph_name: &str| if subgraph_name == "ints" { "Int" } else { "String" };

    let expected = CompositionError::IncompatibleMergedTypes {
        coordinates: "Thing.value".to_owned(),
        is_argument: false,
        expected_type: type_of(order[0]).to_owned(),
        actual_type: type_of(order[1]).to_owned(),
        expected_subgraph: order[0].to_owned(),
        actual_subgraph: order[1].to_owned(),
    };

    assert!(result.errors().contains(&expected), "{:#?}", result.errors());
}

#[test]
fn non_shareable_fields_in_several_subgraphs() {
    let result = federate(&[
        subgraph("a", "type Query { shared: String @shareable }"),
        subgraph("b", "type Query { shared: String }"),
        subgraph("c", "type Query { shared: String }"),
    ]);

    assert_eq!(
        result.errors(),
        [CompositionError::InvalidFieldShareability {
            type_name: "Query".to_owned(),
            fields: vec![ShareabilityViolation {
                field_name: "shared".to_owned(),
                shareable_subgraphs: vec!["a".to_owned()],
                non_shareable_subgraphs: vec!["b".to_owned(), "c".to_owned()],
            }],
        }]
    );
}

#[test]
fn key_fields_are_implicitly_shareable() {
    let result = federate(&[
        subgraph(
            "users",
            r#"
            type Query { me: User }
            type User @key(fields: "id") { id: ID! name: String }
            "#,
        ),
        subgraph(
            "reviews",
            r#"
            type User @key(fields: "id") { id: ID! reviewCount: Int }
            "#,
        ),
    ]);

    assert!(result.is_success(), "{:#?}", result.errors());
}

#[test]
fn output_enums_are_merged_as_a_union() {
    let success = federate(&[
        subgraph("a", "type Query { a: Color } enum Color { RED GREEN }"),
        subgraph("b", "type Query { b: Color } enum Color { RED BLUE }"),
    ])
    .into_result()
    .unwrap();

    let graphql_composition::Definition::Enum(color) = &success.federated_graph.definitions["Color"] else {
        unreachable!()
    };

    let values: Vec<&str> = color.values.keys().map(String::as_str).collect();
    assert_eq!(values, ["BLUE", "GREEN", "RED"]);
}

#[test]
fn input_enums_are_merged_as_an_intersection() {
    let success = federate(&[
        subgraph("a", "type Query { a(color: Color): String } enum Color { RED GREEN }"),
        subgraph("b", "type Query { b(color: Color): String } enum Color { RED BLUE }"),
    ])
    .into_result()
    .unwrap();

    let graphql_composition::Definition::Enum(color) = &success.federated_graph.definitions["Color"] else {
        unreachable!()
    };

    let values: Vec<&str> = color.values.keys().map(String::as_str).collect();
    assert_eq!(values, ["RED"]);
}

#[test]
fn enums_used_as_input_and_output_must_be_consistent() {
    let result = federate(&[
        subgraph("a", "type Query { color: Color } enum Color { RED GREEN }"),
        subgraph("b", "type Query { paint(color: Color): String } enum Color { RED BLUE }"),
    ]);

    assert_eq!(
        result.errors(),
        [CompositionError::IncompatibleSharedEnum {
            enum_name: "Color".to_owned()
        }]
    );
}

#[test]
fn required_input_fields_must_be_defined_everywhere() {
    let result = federate(&[
        subgraph(
            "a",
            r#"
            type Query { search(filter: Filter): String }
            input Filter { name: String limit: Int! }
            "#,
        ),
        subgraph(
            "b",
            r#"
            type Query { find(filter: Filter): String }
            input Filter { name: String }
            "#,
        ),
    ]);

    assert_eq!(
        result.errors(),
        [CompositionError::InvalidRequiredInputValue {
            type_string: "Input Object".to_owned(),
            path: "Filter".to_owned(),
            errors: vec![RequiredInputValueViolation {
                input_value_name: "limit".to_owned(),
                required_subgraphs: vec!["a".to_owned()],
                missing_subgraphs: vec!["b".to_owned()],
            }],
            is_argument: false,
        }]
    );
}

#[test]
fn optional_input_fields_are_intersected() {
    let success = federate(&[
        subgraph(
            "a",
            r#"
            type Query { search(filter: Filter): String }
            input Filter { name: String limit: Int }
            "#,
        ),
        subgraph(
            "b",
            r#"
            type Query { find(filter: Filter): String }
            input Filter { name: String }
            "#,
        ),
    ])
    .into_result()
    .unwrap();

    insta::assert_snapshot!(success.federated_graph.render_api_sdl(), @r###"
    input Filter {
      name: String
    }

    type Query {
      find(filter: Filter): String
      search(filter: Filter): String
    }
    "###);
}

#[test]
fn subgraph_names_must_be_unique_and_non_empty() {
    let sdl = "type Query { a: String }";
    let result = federate(&[subgraph("a", sdl), subgraph("", sdl), subgraph("a", sdl)]);

    assert_eq!(
        result.errors(),
        [CompositionError::InvalidSubgraphNames {
            duplicate_names: vec!["a".to_owned()],
            empty_name_indexes: vec![1],
        }]
    );
}

#[test]
fn at_least_one_subgraph_is_required() {
    assert_eq!(federate(&[]).errors(), [CompositionError::MinimumSubgraphRequirement]);
}

#[test]
fn normalization_errors_are_reported_per_subgraph() {
    let result = federate(&[
        subgraph("valid", "type Query { a: String }"),
        subgraph("invalid", "type Query { b: Missing }"),
    ]);

    let [CompositionError::SubgraphValidation { subgraph_name, errors }] = result.errors() else {
        unreachable!("{:#?}", result.errors())
    };

    assert_eq!(subgraph_name, "invalid");
    assert_eq!(
        errors,
        &[CompositionError::UndefinedType {
            type_name: "Missing".to_owned()
        }]
    );
}

#[test]
fn composition_is_deterministic() {
    let subgraphs = [
        subgraph("implementations", INTERFACE_OBJECT_IMPLEMENTATIONS),
        subgraph("interface-objects", INTERFACE_OBJECTS),
    ];

    let first = federate(&subgraphs).into_result().unwrap();
    let second = federate(&subgraphs).into_result().unwrap();

    assert_eq!(
        first.federated_graph.render_federated_sdl(),
        second.federated_graph.render_federated_sdl()
    );
    assert_eq!(first.federated_graph, second.federated_graph);

    let reversed = federate(&[subgraphs[1].clone(), subgraphs[0].clone()])
        .into_result()
        .unwrap();

    assert_eq!(
        first.federated_graph.render_api_sdl(),
        reversed.federated_graph.render_api_sdl()
    );
}

#[test]
fn a_field_with_incompatible_types_is_reported_once() {
    let result = federate(&[
        subgraph("a", "type Query { x: [String] @shareable }"),
        subgraph("b", "type Query { x: String @shareable }"),
    ]);

    assert_eq!(
        result.errors(),
        [CompositionError::IncompatibleMergedTypes {
            coordinates: "Query.x".to_owned(),
            is_argument: false,
            expected_type: "[String]".to_owned(),
            actual_type: "String".to_owned(),
            expected_subgraph: "a".to_owned(),
            actual_subgraph: "b".to_owned(),
        }]
    );

    assert_eq!(
        result.errors()[0].to_string(),
        "Incompatible types when merging two instances of field \"Query.x\":\n Expected type \"[String]\" (subgraph \"a\") but received \"String\" (subgraph \"b\")."
    );
}

#[test]
fn overridden_fields_leave_the_source_subgraph() {
    let success = federate(&[
        subgraph(
            "a",
            r#"
            type Query { me: User }
            type User @key(fields: "id") { id: ID! name: String }
            "#,
        ),
        subgraph(
            "b",
            r#"
            type User @key(fields: "id") { id: ID! name: String @override(from: "a") }
            "#,
        ),
    ])
    .into_result()
    .unwrap();

    let name = success.federated_graph.field("User", "name").unwrap();
    assert_eq!(name.resolvable_in, ["b"]);
    assert_eq!(
        name.r#override,
        Some(Override {
            to: "b".to_owned(),
            from: "a".to_owned(),
        })
    );

    let user_in_a = &success.subgraph_config_by_subgraph_name["a"].configuration_data_by_type_name["User"];
    assert_eq!(user_in_a.field_names.iter().collect::<Vec<_>>(), ["id"]);

    let user_in_b = &success.subgraph_config_by_subgraph_name["b"].configuration_data_by_type_name["User"];
    assert_eq!(user_in_b.field_names.iter().collect::<Vec<_>>(), ["id", "name"]);
}

#[test]
fn a_field_overridden_from_two_subgraphs() {
    let result = federate(&[
        subgraph("a", r#"type Query { shared: String @shareable @override(from: "b") }"#),
        subgraph("b", r#"type Query { shared: String @shareable @override(from: "a") }"#),
    ]);

    assert_eq!(
        result.errors(),
        [CompositionError::DuplicateOverriddenFields {
            field_paths: vec!["Query.shared".to_owned()],
        }]
    );

    assert_eq!(
        result.errors()[0].to_string(),
        "The \"@override\" directive must only be declared on one single instance of a field. However, an \"@override\" directive was declared on more than one instance of the following field: \"Query.shared\".\n"
    );
}

#[test]
fn override_from_an_unknown_subgraph_is_a_warning() {
    let result = federate(&[subgraph(
        "a",
        r#"type Query { a: String @override(from: "gone") }"#,
    )]);

    assert!(result.is_success(), "{:#?}", result.errors());
    assert_eq!(
        result.warnings(),
        [CompositionWarning::InvalidOverrideTargetSubgraphName {
            subgraph_name: "a".to_owned(),
            type_name: "Query".to_owned(),
            target_subgraph_name: "gone".to_owned(),
            field_names: vec!["a".to_owned()],
        }]
    );

    assert_eq!(
        result.warnings()[0].to_string(),
        "The Object type \"Query\" defines the directive \"@override(from: \"gone\")\" on the following field: \"a\".\nThe required \"from\" argument of type \"String!\" must be provided with an existing subgraph name.\nHowever, a subgraph by the name of \"gone\" does not exist.\nIf this subgraph has been recently deleted, remember to clean up unused \"@override\" directives that reference this subgraph."
    );
}

#[test]
fn every_instance_of_a_field_is_external() {
    let result = federate(&[
        subgraph(
            "a",
            r#"
            type Query { me: User }
            type User @key(fields: "id") { id: ID! name: String @external }
            "#,
        ),
        subgraph(
            "b",
            r#"
            type User @key(fields: "id") { id: ID! name: String @external }
            "#,
        ),
    ]);

    assert_eq!(
        result.errors(),
        [CompositionError::AllExternalFieldInstances {
            type_name: "User".to_owned(),
            fields: vec![("name".to_owned(), vec!["a".to_owned(), "b".to_owned()])],
        }]
    );

    assert_eq!(
        result.errors()[0].to_string(),
        "The Object \"User\" is invalid because the following field definition is declared \"@external\" on all instances of that field:\n \"name\" in subgraphs \"a\", \"b\"\nAt least one instance of a field definition must always be resolvable (and therefore not declared \"@external\")."
    );
}

#[test]
fn same_name_with_different_kinds() {
    let result = federate(&[
        subgraph("a", "type Query { a: Thing } type Thing { id: ID }"),
        subgraph("b", "type Query { b: String } scalar Thing"),
    ]);

    assert_eq!(
        result.errors(),
        [CompositionError::IncompatibleParentKindMerge {
            type_name: "Thing".to_owned(),
            expected_kind: "Object".to_owned(),
            actual_kind: "Scalar".to_owned(),
        }]
    );

    assert_eq!(
        result.errors()[0].to_string(),
        " When merging types, expected \"Thing\" to be type \"Object\" but received \"Scalar\"."
    );
}

#[test]
fn arguments_with_different_default_values() {
    let result = federate(&[
        subgraph("a", "type Query { list(first: Int = 10): [String] @shareable }"),
        subgraph("b", "type Query { list(first: Int = 20): [String] @shareable }"),
    ]);

    assert_eq!(
        result.errors(),
        [CompositionError::IncompatibleDefaultValues {
            coordinates: "Query.list(first: ...)".to_owned(),
            is_argument: true,
            first_subgraph: "a".to_owned(),
            second_subgraph: "b".to_owned(),
        }]
    );

    assert_eq!(
        result.errors()[0].to_string(),
        "The argument \"Query.list(first: ...)\" has incompatible default values in subgraphs \"a\" and \"b\"."
    );
}

#[test]
fn implementations_must_define_the_merged_interface_fields() {
    let result = federate(&[
        subgraph(
            "a",
            r#"
            type Query { users: [User] }
            interface Node { id: ID! }
            type User implements Node { id: ID! }
            "#,
        ),
        subgraph(
            "b",
            r#"
            type Query { node: Node }
            interface Node { id: ID! name: String }
            "#,
        ),
    ]);

    assert_eq!(
        result.errors(),
        [CompositionError::InvalidInterfaceImplementation {
            type_name: "User".to_owned(),
            interface_name: "Node".to_owned(),
            unimplemented_fields: vec!["name".to_owned()],
        }]
    );

    assert_eq!(
        result.errors()[0].to_string(),
        "The Object \"User\" has the following Interface implementation error:\n The implementation of Interface \"Node\" by \"User\" is invalid because:\n  The following field is not implemented: \"name\"\n"
    );
}

#[test]
fn extension_without_a_base_definition() {
    let result = federate(&[
        subgraph("a", "type Query { thing: Thing } extend type Thing { id: ID }"),
        subgraph("b", "extend type Query { b: String }"),
    ]);

    assert_eq!(
        result.errors(),
        [CompositionError::NoBaseDefinitionForExtension {
            type_string: "Object".to_owned(),
            type_name: "Thing".to_owned(),
        }]
    );

    assert_eq!(
        result.errors()[0].to_string(),
        "The Object \"Thing\" is an extension, but no base Object definition of \"Thing\" is defined in any subgraph."
    );
}

#[test]
fn interface_object_of_an_interface_without_keys() {
    let result = federate(&[
        subgraph(
            "implementations",
            r#"
            type Query { nodes: [Node!]! }
            interface Node { id: ID! }
            type User implements Node @key(fields: "id") { id: ID! }
            "#,
        ),
        subgraph(
            "interface-objects",
            r#"
            type Node @key(fields: "id") @interfaceObject { id: ID! createdAt: String }
            "#,
        ),
    ]);

    assert_eq!(
        result.errors(),
        [CompositionError::NonEntityInterfaceObject {
            interface_name: "Node".to_owned(),
            subgraph_names: vec!["interface-objects".to_owned()],
        }]
    );

    assert_eq!(
        result.errors()[0].to_string(),
        "The Interface \"Node\" is declared as an Interface Object (using \"@interfaceObject\") in the following subgraph: \"interface-objects\".\n However, no subgraph defines \"Node\" as an entity Interface: at least one Interface definition must declare a \"@key\" directive."
    );
}
