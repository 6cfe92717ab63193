#![allow(unused_crate_dependencies)]

use graphql_composition::{
    federate_subgraphs, CompositionError, CompositionOptions, FederationResult, RouterCompatibilityVersion, Subgraph,
    MAX_OR_SCOPES,
};

fn subgraph(name: &str, sdl: &str) -> Subgraph {
    Subgraph::from_sdl(name, format!("http://{name}.example.com/graphql"), sdl).unwrap()
}

fn federate(subgraphs: &[Subgraph]) -> FederationResult {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    federate_subgraphs(subgraphs, RouterCompatibilityVersion::One, &CompositionOptions::default())
}

#[test]
fn field_configurations_merge_subgraphs_and_named_types() {
    let accounts = subgraph(
        "accounts",
        r#"
        type Query {
          me: User @authenticated
          users(first: Int): [User!]! @requiresScopes(scopes: "read:users")
        }

        type User @key(fields: "id") {
          id: ID!
          name: String @shareable @requiresScopes(scopes: [["read:name"], ["admin"]])
          role: Role
        }

        enum Role @requiresScopes(scopes: [["read:role"]]) {
          ADMIN
          USER
        }
        "#,
    );

    let profiles = subgraph(
        "profiles",
        r#"
        type User @key(fields: "id") {
          id: ID!
          name: String @shareable @requiresScopes(scopes: [["read:user"]])
          email: String @authenticated
        }
        "#,
    );

    let success = federate(&[accounts, profiles]).into_result().unwrap();

    insta::assert_json_snapshot!(success.field_configurations, @r###"
    [
      {
        "typeName": "Query",
        "fieldName": "me",
        "argumentNames": [],
        "requiresAuthentication": true
      },
      {
        "typeName": "Query",
        "fieldName": "users",
        "argumentNames": [
          "first"
        ],
        "requiresAuthentication": false,
        "requiredScopes": [
          [
            "read:users"
          ]
        ]
      },
      {
        "typeName": "User",
        "fieldName": "email",
        "argumentNames": [],
        "requiresAuthentication": true
      },
      {
        "typeName": "User",
        "fieldName": "name",
        "argumentNames": [],
        "requiresAuthentication": false,
        "requiredScopes": [
          [
            "read:name",
            "read:user"
          ],
          [
            "admin",
            "read:user"
          ]
        ]
      },
      {
        "typeName": "User",
        "fieldName": "role",
        "argumentNames": [],
        "requiresAuthentication": false,
        "requiredScopes": [
          [
            "read:role"
          ]
        ]
      }
    ]
    "###);
}

#[test]
fn no_authorization_directives() {
    let success = federate(&[subgraph("a", "type Query { a: String }")]).into_result().unwrap();
    assert!(success.field_configurations.is_empty());
}

#[test]
fn merged_scopes_over_the_limit() {
    let a = subgraph(
        "a",
        r#"type Query { shared: String @shareable @requiresScopes(scopes: [["a"], ["b"], ["c"], ["d"], ["e"]]) }"#,
    );
    let b = subgraph(
        "b",
        r#"type Query { shared: String @shareable @requiresScopes(scopes: [["f"], ["g"], ["h"], ["i"]]) }"#,
    );

    assert_eq!(
        federate(&[a, b]).errors(),
        [CompositionError::OrScopesLimit {
            max_or_scopes: MAX_OR_SCOPES,
            coordinates: vec!["Query.shared".to_owned()],
        }]
    );
}

#[test]
fn inherited_scopes_over_the_limit() {
    let a = subgraph(
        "a",
        r#"
        scalar Secret @requiresScopes(scopes: [["a"], ["b"], ["c"], ["d"], ["e"]])

        type Query {
          secret: Secret @requiresScopes(scopes: [["f"], ["g"], ["h"], ["i"]])
          open: String
        }
        "#,
    );

    let result = federate(&[a]);

    assert_eq!(
        result.errors(),
        [CompositionError::OrScopesLimit {
            max_or_scopes: MAX_OR_SCOPES,
            coordinates: vec!["Query.secret".to_owned()],
        }]
    );
    assert!(result.errors()[0].to_string().contains("\n \"Query.secret\"\n"));
}

#[test]
fn renamed_authorization_directives() {
    let a = subgraph(
        "a",
        r#"
        extend schema @link(url: "https://specs.apollo.dev/federation/v2.5", import: [{ name: "@authenticated", as: "@loggedIn" }])

        type Query { me: String @loggedIn }
        "#,
    );

    let success = federate(&[a]).into_result().unwrap();

    assert_eq!(success.field_configurations.len(), 1);
    assert!(success.field_configurations[0].requires_authentication);
}
