//! Normalization of one subgraph: merging of extensions, validation of directive applications
//! and field sets, and computation of the router configuration data.

mod authorization;
mod builtins;
mod coercion;
mod configuration_data;
mod definitions;
mod directive_matcher;
mod directives;
mod field_sets;
mod print;
mod references;

pub(crate) use self::{
    builtins::{
        BUILTIN_SCALARS, DEFAULT_DEPRECATION_REASON, DEPRECATED, EXTENDS, EXTERNAL, INACCESSIBLE, INTERFACE_OBJECT,
        KEY, OVERRIDE, PROVIDES, REQUIRES, SHAREABLE, TAG,
    },
    definitions::kind_str,
    field_sets::{parse_field_set, FieldSetSelection},
    print::write_service_document,
};

use self::{builtins::DirectiveDefinitionRecord, definitions::MergedSchema, directive_matcher::DirectiveMatcher};
use crate::{
    authorization::AuthorizationData, router_config::ConfigurationData, CompositionError, CompositionWarning,
    NormalizationOptions,
};
use async_graphql_parser::{types as ast, Positioned};
use async_graphql_value::Name;
use indexmap::IndexMap;
use std::collections::BTreeMap;

/// The outcome of [normalize_subgraph].
#[derive(Debug, Clone)]
pub enum NormalizationResult {
    Success(NormalizationSuccess),
    Failure {
        errors: Vec<CompositionError>,
        warnings: Vec<CompositionWarning>,
    },
}

impl NormalizationResult {
    pub fn warnings(&self) -> &[CompositionWarning] {
        match self {
            NormalizationResult::Success(success) => &success.warnings,
            NormalizationResult::Failure { warnings, .. } => warnings,
        }
    }

    /// The errors of a failed normalization, or an empty slice.
    pub fn errors(&self) -> &[CompositionError] {
        match self {
            NormalizationResult::Success(_) => &[],
            NormalizationResult::Failure { errors, .. } => errors,
        }
    }

    pub fn into_result(self) -> Result<NormalizationSuccess, Vec<CompositionError>> {
        match self {
            NormalizationResult::Success(success) => Ok(success),
            NormalizationResult::Failure { errors, .. } => Err(errors),
        }
    }
}

/// A subgraph in its canonical form.
#[derive(Debug, Clone)]
pub struct NormalizationSuccess {
    /// Extensions are folded into their definitions, federation directives use their canonical names
    /// and root types are named `Query`, `Mutation` and `Subscription`.
    pub schema: ast::ServiceDocument,
    pub configuration_data_by_type_name: BTreeMap<String, ConfigurationData>,
    /// `@authenticated` and `@requiresScopes` requirements, keyed by type name.
    pub authorization_data_by_type_name: BTreeMap<String, AuthorizationData>,
    pub warnings: Vec<CompositionWarning>,
}

impl NormalizationSuccess {
    /// Print the normalized schema. Normalizing the printed text again yields the same text.
    pub fn sdl(&self) -> String {
        let mut out = String::new();
        write_service_document(&mut out, &self.schema).ok();
        out
    }
}

/// Normalize the definitions of one subgraph.
///
/// Every independent violation is reported: the normalizer does not stop at the first error.
pub fn normalize_subgraph(document: &ast::ServiceDocument, options: &NormalizationOptions) -> NormalizationResult {
    let subgraph_name = options.subgraph_name.as_deref().unwrap_or_default();
    let _span = tracing::info_span!("normalize_subgraph", subgraph = subgraph_name).entered();

    let matcher = DirectiveMatcher::new(document, options.override_directive_name.as_deref());
    let mut document = document.clone();
    canonicalize_directive_names(&mut document, &matcher);

    let mut normalizer = Normalizer {
        subgraph_name,
        directive_definitions: DirectiveDefinitions::builtin(),
        errors: Vec::new(),
        warnings: Vec::new(),
    };

    let mut merged = normalizer.merge_definitions(&document);
    normalizer.directive_definitions.extend(merged.directive_definitions.values());

    normalizer.check_references(&merged);
    normalizer.validate_directive_applications(&mut merged);
    normalizer.validate_field_sets(&mut merged);
    normalizer.validate_overrides(&merged);
    let authorization_data_by_type_name = normalizer.collect_authorization(&merged);
    normalizer.collect_warnings(&merged);

    let Normalizer { errors, warnings, .. } = normalizer;

    if !errors.is_empty() {
        tracing::debug!(errors = errors.len(), "subgraph normalization failed");
        return NormalizationResult::Failure { errors, warnings };
    }

    let configuration_data_by_type_name = configuration_data::build(&merged);

    tracing::debug!(types = merged.types.len(), "normalized subgraph");

    NormalizationResult::Success(NormalizationSuccess {
        schema: merged.into_document(),
        configuration_data_by_type_name,
        authorization_data_by_type_name,
        warnings,
    })
}

pub(crate) struct Normalizer<'a> {
    subgraph_name: &'a str,
    directive_definitions: DirectiveDefinitions,
    errors: Vec<CompositionError>,
    warnings: Vec<CompositionWarning>,
}

/// Built-in directive definitions first, then the ones declared in the subgraph.
#[derive(Debug)]
pub(crate) struct DirectiveDefinitions {
    records: IndexMap<String, DirectiveDefinitionRecord>,
    builtin_count: usize,
}

impl DirectiveDefinitions {
    fn builtin() -> Self {
        let records: IndexMap<_, _> = builtins::builtin_directive_definitions()
            .into_iter()
            .map(|record| (record.name.clone(), record))
            .collect();

        DirectiveDefinitions {
            builtin_count: records.len(),
            records,
        }
    }

    fn extend<'a>(&mut self, definitions: impl Iterator<Item = &'a Positioned<ast::DirectiveDefinition>>) {
        for definition in definitions {
            let record = DirectiveDefinitionRecord::from_ast(&definition.node);
            self.records.entry(record.name.clone()).or_insert(record);
        }
    }

    pub(crate) fn is_builtin(&self, name: &str) -> bool {
        self.records
            .get_index_of(name)
            .map(|index| index < self.builtin_count)
            .unwrap_or_default()
    }

    pub(crate) fn get(&self, name: &str) -> Option<&DirectiveDefinitionRecord> {
        self.records.get(name)
    }
}

impl MergedSchema {
    fn into_document(self) -> ast::ServiceDocument {
        let mut definitions = Vec::with_capacity(self.types.len() + self.directive_definitions.len() + 1);

        if let Some(schema) = self.schema {
            definitions.push(ast::TypeSystemDefinition::Schema(schema));
        }

        definitions.extend(
            self.directive_definitions
                .into_values()
                .map(ast::TypeSystemDefinition::Directive),
        );

        let extension_types = self.extension_types;
        definitions.extend(self.types.into_iter().map(|(name, mut definition)| {
            definition.node.extend = extension_types.contains(&name);
            ast::TypeSystemDefinition::Type(definition)
        }));

        ast::ServiceDocument { definitions }
    }
}

fn canonicalize_directive_names(document: &mut ast::ServiceDocument, matcher: &DirectiveMatcher<'_>) {
    let rename = |directives: &mut Vec<Positioned<ast::ConstDirective>>| {
        for directive in directives {
            let canonical = matcher.canonical_name(directive.node.name.node.as_str()).to_owned();
            if canonical != directive.node.name.node.as_str() {
                directive.node.name.node = Name::new(canonical);
            }
        }
    };

    for definition in &mut document.definitions {
        match definition {
            ast::TypeSystemDefinition::Schema(schema) => rename(&mut schema.node.directives),
            ast::TypeSystemDefinition::Directive(directive) => {
                let canonical = matcher.canonical_name(directive.node.name.node.as_str()).to_owned();
                directive.node.name.node = Name::new(canonical);

                for argument in &mut directive.node.arguments {
                    rename(&mut argument.node.directives);
                }
            }
            ast::TypeSystemDefinition::Type(definition) => {
                rename(&mut definition.node.directives);

                match &mut definition.node.kind {
                    ast::TypeKind::Object(ast::ObjectType { fields, .. })
                    | ast::TypeKind::Interface(ast::InterfaceType { fields, .. }) => {
                        for field in fields {
                            rename(&mut field.node.directives);
                            for argument in &mut field.node.arguments {
                                rename(&mut argument.node.directives);
                            }
                        }
                    }
                    ast::TypeKind::Enum(enum_type) => {
                        for value in &mut enum_type.values {
                            rename(&mut value.node.directives);
                        }
                    }
                    ast::TypeKind::InputObject(input_object) => {
                        for field in &mut input_object.fields {
                            rename(&mut field.node.directives);
                        }
                    }
                    ast::TypeKind::Scalar | ast::TypeKind::Union(_) => (),
                }
            }
        }
    }
}

impl Normalizer<'_> {
    fn collect_warnings(&mut self, merged: &MergedSchema) {
        for definition in merged.types.values() {
            let type_name = definition.node.name.node.as_str();

            if crate::utils::has_directive(&definition.node.directives, EXTENDS) {
                self.warnings.push(CompositionWarning::ExtendsDirectiveUsage {
                    subgraph_name: self.subgraph_name.to_owned(),
                    type_name: type_name.to_owned(),
                });
            }

            let ast::TypeKind::Interface(interface) = &definition.node.kind else {
                continue;
            };

            if interface.fields.is_empty() {
                continue;
            }

            let is_implemented = merged.types.values().any(|other| match &other.node.kind {
                ast::TypeKind::Object(ast::ObjectType { implements, .. })
                | ast::TypeKind::Interface(ast::InterfaceType { implements, .. }) => {
                    implements.iter().any(|implemented| implemented.node == type_name)
                }
                _ => false,
            });

            if !is_implemented {
                self.warnings.push(CompositionWarning::UnimplementedInterface {
                    subgraph_name: self.subgraph_name.to_owned(),
                    interface_name: type_name.to_owned(),
                });
            }
        }
    }

    fn validate_overrides(&mut self, merged: &MergedSchema) {
        if self.subgraph_name.is_empty() {
            return;
        }

        for definition in merged.types.values() {
            let ast::TypeKind::Object(object) = &definition.node.kind else {
                continue;
            };

            for field in &object.fields {
                let overrides = field
                    .node
                    .directives
                    .iter()
                    .filter(|directive| directive.node.name.node == OVERRIDE);

                for (idx, directive) in overrides.enumerate() {
                    if crate::utils::string_argument(&directive.node, "from") != Some(self.subgraph_name) {
                        continue;
                    }

                    let coordinates = format!("{}.{}", definition.node.name.node, field.node.name.node);

                    self.errors.push(CompositionError::InvalidDirective {
                        directive_name: OVERRIDE.to_owned(),
                        messages: vec![crate::errors::messages::equivalent_source_and_target_override(
                            self.subgraph_name,
                            &coordinates,
                        )],
                        coordinates,
                        ordinal: crate::utils::ordinal(idx + 1),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RouterCompatibilityVersion;

    fn normalize(sdl: &str) -> NormalizationResult {
        let document = crate::parse_schema(sdl).unwrap();
        normalize_subgraph(&document, &NormalizationOptions::new("a", RouterCompatibilityVersion::One))
    }

    #[test]
    fn extensions_merge_into_their_definition() {
        let result = normalize(
            r#"
            type Query { a: String }
            extend type Query { b: Int }
            "#,
        )
        .into_result()
        .unwrap();

        assert_eq!(result.sdl(), "type Query {\n  a: String\n  b: Int\n}\n");
    }

    #[test]
    fn duplicate_fields_across_extensions() {
        let result = normalize(
            r#"
            type Query { a: String }
            extend type Query { a: String }
            "#,
        );

        assert_eq!(
            result.errors(),
            [CompositionError::DuplicateFieldDefinition {
                type_string: "Object".to_owned(),
                type_name: "Query".to_owned(),
                field_name: "a".to_owned(),
            }]
        );
    }

    #[test]
    fn root_types_are_renamed() {
        let result = normalize(
            r#"
            schema { query: MyQuery }
            type MyQuery { me: User }
            type User { id: ID! }
            "#,
        )
        .into_result()
        .unwrap();

        let sdl = result.sdl();
        assert!(sdl.contains("type Query {"), "{sdl}");
        assert!(!sdl.contains("MyQuery"), "{sdl}");
        assert!(result.configuration_data_by_type_name["Query"].is_root_node);
    }

    #[test]
    fn duplicate_operation_types() {
        let result = normalize(
            r#"
            schema { query: A }
            extend schema { query: B }
            type A { a: String }
            type B { b: String }
            "#,
        );

        assert_eq!(
            result.errors()[0].to_string(),
            "The operation type \"query\" cannot be defined as \"B\" because it has already been defined as \"A\"."
        );
    }

    #[test]
    fn builtin_directive_redefinitions_are_ignored() {
        let result = normalize(
            r#"
            directive @key(fields: String!) repeatable on OBJECT
            type Query { a: String }
            "#,
        );

        assert!(matches!(result, NormalizationResult::Success(_)));
    }

    #[test]
    fn user_directive_duplicates() {
        let result = normalize(
            r#"
            directive @a on OBJECT
            directive @a on OBJECT
            type Query { a: String }
            "#,
        );

        assert_eq!(
            result.errors(),
            [CompositionError::DuplicateDirectiveDefinition {
                directive_name: "a".to_owned()
            }]
        );
    }

    #[test]
    fn override_of_self() {
        let result = normalize(r#"type Query { a: String @override(from: "a") }"#);

        assert_eq!(
            result.errors()[0].to_string(),
            "The 1st instance of the directive \"@override\" declared on coordinates \"Query.a\" is invalid for the following reason:\nCannot override field \"Query.a\" because the source and target subgraph names are both \"a\""
        );
    }

    #[test]
    fn warnings_do_not_fail() {
        let success = normalize(
            r#"
            type Query { a: Node }
            interface Node { id: ID! }
            type User @extends @key(fields: "id") { id: ID! }
            "#,
        )
        .into_result()
        .unwrap();

        assert_eq!(
            success.warnings,
            [
                CompositionWarning::UnimplementedInterface {
                    subgraph_name: "a".to_owned(),
                    interface_name: "Node".to_owned(),
                },
                CompositionWarning::ExtendsDirectiveUsage {
                    subgraph_name: "a".to_owned(),
                    type_name: "User".to_owned(),
                },
            ]
        );
    }

    #[test]
    fn renamed_federation_directives_are_canonicalized() {
        let result = normalize(
            r#"
            extend schema @link(url: "https://specs.apollo.dev/federation/v2.3", import: [{ name: "@key", as: "@primaryKey" }])
            type Query { user: User }
            type User @primaryKey(fields: "id") { id: ID! }
            "#,
        )
        .into_result()
        .unwrap();

        assert!(result.sdl().contains("type User @key(fields: \"id\") {"));
        assert_eq!(result.configuration_data_by_type_name["User"].keys.len(), 1);
    }
}
