use async_graphql_parser::types as ast;
use graphql_composition::{normalize_subgraph, NormalizationOptions, NormalizationResult, RouterCompatibilityVersion};
use std::collections::BTreeMap;

#[derive(Debug, thiserror::Error)]
pub(crate) enum SchemaError {
    #[error("Failed to parse the schema: {0}")]
    Parse(#[from] async_graphql_parser::Error),
    #[error("The schema is invalid:\n{}", .0.join("\n"))]
    Normalization(Vec<String>),
}

/// The parts of a normalized schema that changes are computed on.
#[derive(Debug, Default)]
pub(crate) struct DiffSchema {
    pub(crate) query_type: Option<String>,
    pub(crate) mutation_type: Option<String>,
    pub(crate) subscription_type: Option<String>,
    pub(crate) types: BTreeMap<String, ast::TypeDefinition>,
    pub(crate) directives: BTreeMap<String, ast::DirectiveDefinition>,
}

impl DiffSchema {
    /// Parse and normalize. Blank SDL is an empty schema.
    pub(crate) fn from_sdl(sdl: &str, router_compatibility_version: RouterCompatibilityVersion) -> Result<Self, SchemaError> {
        if sdl.trim().is_empty() {
            return Ok(DiffSchema::default());
        }

        let document = graphql_composition::parse_schema(sdl)?;

        let options = NormalizationOptions {
            router_compatibility_version,
            ..Default::default()
        };

        let normalized = match normalize_subgraph(&document, &options) {
            NormalizationResult::Success(success) => success.schema,
            NormalizationResult::Failure { errors, .. } => {
                return Err(SchemaError::Normalization(
                    errors.iter().map(|error| error.to_string()).collect(),
                ));
            }
        };

        let mut schema = DiffSchema::default();

        // Root types are renamed by normalization: their declared names come from the source.
        for definition in &document.definitions {
            if let ast::TypeSystemDefinition::Schema(definition) = definition {
                let definition = &definition.node;

                if let Some(name) = &definition.query {
                    schema.query_type = Some(name.node.to_string());
                }

                if let Some(name) = &definition.mutation {
                    schema.mutation_type = Some(name.node.to_string());
                }

                if let Some(name) = &definition.subscription {
                    schema.subscription_type = Some(name.node.to_string());
                }
            }
        }

        for definition in normalized.definitions {
            match definition {
                ast::TypeSystemDefinition::Type(definition) => {
                    let definition = definition.node;
                    schema.types.insert(definition.name.node.to_string(), definition);
                }
                ast::TypeSystemDefinition::Directive(definition) => {
                    let definition = definition.node;
                    schema.directives.insert(definition.name.node.to_string(), definition);
                }
                ast::TypeSystemDefinition::Schema(_) => (),
            }
        }

        for (root, default_name) in [
            (&mut schema.query_type, "Query"),
            (&mut schema.mutation_type, "Mutation"),
            (&mut schema.subscription_type, "Subscription"),
        ] {
            if root.is_none() && schema.types.contains_key(default_name) {
                *root = Some(default_name.to_owned());
            }
        }

        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_root_type_names() {
        let schema = DiffSchema::from_sdl(
            r#"
            schema { query: RootQuery }
            type RootQuery { a: String }
            type Mutation { b: String }
            "#,
            RouterCompatibilityVersion::One,
        )
        .unwrap();

        assert_eq!(schema.query_type.as_deref(), Some("RootQuery"));
        assert_eq!(schema.mutation_type.as_deref(), Some("Mutation"));
        assert_eq!(schema.subscription_type, None);
        assert!(schema.types.contains_key("Query"));
    }

    #[test]
    fn blank_sdl_is_an_empty_schema() {
        let schema = DiffSchema::from_sdl("  \n", RouterCompatibilityVersion::One).unwrap();

        assert!(schema.types.is_empty());
        assert!(schema.query_type.is_none());
    }

    #[test]
    fn normalization_errors_are_collected() {
        let error = DiffSchema::from_sdl("type Query { a: Missing }", RouterCompatibilityVersion::One).unwrap_err();

        assert!(matches!(error, SchemaError::Normalization(ref errors) if errors.len() == 1));
        assert!(error.to_string().starts_with("The schema is invalid:\n"));
    }
}
