//! Directive definitions every subgraph gets for free.

use async_graphql_parser::types::{self as ast, DirectiveLocation};
use async_graphql_value::{ConstValue, Name};

pub(crate) const KEY: &str = "key";
pub(crate) const EXTERNAL: &str = "external";
pub(crate) const SHAREABLE: &str = "shareable";
pub(crate) const PROVIDES: &str = "provides";
pub(crate) const REQUIRES: &str = "requires";
pub(crate) const OVERRIDE: &str = "override";
pub(crate) const INTERFACE_OBJECT: &str = "interfaceObject";
pub(crate) const EXTENDS: &str = "extends";
pub(crate) const INACCESSIBLE: &str = "inaccessible";
pub(crate) const TAG: &str = "tag";
pub(crate) const LINK: &str = "link";
pub(crate) const COMPOSE_DIRECTIVE: &str = "composeDirective";
pub(crate) const DEPRECATED: &str = "deprecated";
pub(crate) const SPECIFIED_BY: &str = "specifiedBy";
pub(crate) const AUTHENTICATED: &str = "authenticated";
pub(crate) const REQUIRES_SCOPES: &str = "requiresScopes";

pub(crate) const SCOPE_SCALAR: &str = "openfed__Scope";

pub(crate) const DEFAULT_DEPRECATION_REASON: &str = "No longer supported";

/// Directives subject to `@link` renaming.
pub(crate) const FEDERATION_DIRECTIVES: &[&str] = &[
    KEY,
    EXTERNAL,
    SHAREABLE,
    PROVIDES,
    REQUIRES,
    OVERRIDE,
    INTERFACE_OBJECT,
    EXTENDS,
    INACCESSIBLE,
    TAG,
    COMPOSE_DIRECTIVE,
    AUTHENTICATED,
    REQUIRES_SCOPES,
];

/// Scalars and enums that only exist to type federation directive arguments. User definitions
/// of these are dropped during normalization.
pub(crate) const FEDERATION_TYPES: &[&str] = &[
    "FieldSet",
    "_FieldSet",
    "federation__FieldSet",
    "openfed__FieldSet",
    "link__Import",
    "link__Purpose",
    SCOPE_SCALAR,
    "_Any",
    "_Entity",
    "_Service",
];

pub(crate) const BUILTIN_SCALARS: &[&str] = &["Boolean", "Float", "ID", "Int", "String"];

const AUTHORIZATION_LOCATIONS: &[DirectiveLocation] = &[
    DirectiveLocation::Enum,
    DirectiveLocation::FieldDefinition,
    DirectiveLocation::Interface,
    DirectiveLocation::Object,
    DirectiveLocation::Scalar,
];

const TYPE_SYSTEM_LOCATIONS: &[DirectiveLocation] = &[
    DirectiveLocation::ArgumentDefinition,
    DirectiveLocation::Enum,
    DirectiveLocation::EnumValue,
    DirectiveLocation::FieldDefinition,
    DirectiveLocation::InputFieldDefinition,
    DirectiveLocation::InputObject,
    DirectiveLocation::Interface,
    DirectiveLocation::Object,
    DirectiveLocation::Scalar,
    DirectiveLocation::Union,
];

#[derive(Debug, Clone)]
pub(crate) struct DirectiveDefinitionRecord {
    pub(crate) name: String,
    pub(crate) arguments: Vec<ArgumentDefinitionRecord>,
    pub(crate) locations: Vec<DirectiveLocation>,
    pub(crate) is_repeatable: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct ArgumentDefinitionRecord {
    pub(crate) name: String,
    pub(crate) ty: ast::Type,
    pub(crate) default_value: Option<ConstValue>,
}

impl ArgumentDefinitionRecord {
    pub(crate) fn is_required(&self) -> bool {
        !self.ty.nullable && self.default_value.is_none()
    }
}

impl DirectiveDefinitionRecord {
    pub(crate) fn from_ast(definition: &ast::DirectiveDefinition) -> Self {
        DirectiveDefinitionRecord {
            name: definition.name.node.to_string(),
            arguments: definition
                .arguments
                .iter()
                .map(|argument| ArgumentDefinitionRecord {
                    name: argument.node.name.node.to_string(),
                    ty: argument.node.ty.node.clone(),
                    default_value: argument.node.default_value.as_ref().map(|value| value.node.clone()),
                })
                .collect(),
            locations: definition.locations.iter().map(|location| location.node).collect(),
            is_repeatable: definition.is_repeatable,
        }
    }

    pub(crate) fn argument(&self, name: &str) -> Option<&ArgumentDefinitionRecord> {
        self.arguments.iter().find(|argument| argument.name == name)
    }
}

fn named(name: &str, nullable: bool) -> ast::Type {
    ast::Type {
        base: ast::BaseType::Named(Name::new(name)),
        nullable,
    }
}

fn list(inner: ast::Type, nullable: bool) -> ast::Type {
    ast::Type {
        base: ast::BaseType::List(Box::new(inner)),
        nullable,
    }
}

fn argument(name: &str, ty: ast::Type, default_value: Option<ConstValue>) -> ArgumentDefinitionRecord {
    ArgumentDefinitionRecord {
        name: name.to_owned(),
        ty,
        default_value,
    }
}

fn directive(
    name: &str,
    arguments: Vec<ArgumentDefinitionRecord>,
    locations: &[DirectiveLocation],
    is_repeatable: bool,
) -> DirectiveDefinitionRecord {
    DirectiveDefinitionRecord {
        name: name.to_owned(),
        arguments,
        locations: locations.to_vec(),
        is_repeatable,
    }
}

/// The built-in directive definitions, in a stable order.
pub(crate) fn builtin_directive_definitions() -> Vec<DirectiveDefinitionRecord> {
    use DirectiveLocation::*;

    vec![
        directive(
            DEPRECATED,
            vec![argument(
                "reason",
                named("String", true),
                Some(ConstValue::String(DEFAULT_DEPRECATION_REASON.to_owned())),
            )],
            &[FieldDefinition, ArgumentDefinition, InputFieldDefinition, EnumValue],
            false,
        ),
        directive(SPECIFIED_BY, vec![argument("url", named("String", false), None)], &[Scalar], false),
        directive(
            KEY,
            vec![
                argument("fields", named("FieldSet", false), None),
                argument("resolvable", named("Boolean", true), Some(ConstValue::Boolean(true))),
            ],
            &[Object, Interface],
            true,
        ),
        directive(EXTERNAL, Vec::new(), &[FieldDefinition, Object], false),
        directive(SHAREABLE, Vec::new(), &[FieldDefinition, Object], true),
        directive(
            PROVIDES,
            vec![argument("fields", named("FieldSet", false), None)],
            &[FieldDefinition],
            false,
        ),
        directive(
            REQUIRES,
            vec![argument("fields", named("FieldSet", false), None)],
            &[FieldDefinition],
            false,
        ),
        directive(
            OVERRIDE,
            vec![argument("from", named("String", false), None)],
            &[FieldDefinition],
            false,
        ),
        directive(INTERFACE_OBJECT, Vec::new(), &[Object], false),
        directive(EXTENDS, Vec::new(), &[Object, Interface], false),
        directive(INACCESSIBLE, Vec::new(), TYPE_SYSTEM_LOCATIONS, false),
        directive(
            TAG,
            vec![argument("name", named("String", false), None)],
            &[TYPE_SYSTEM_LOCATIONS, &[Schema]].concat(),
            true,
        ),
        directive(
            LINK,
            vec![
                argument("url", named("String", false), None),
                argument("as", named("String", true), None),
                argument("for", named("link__Purpose", true), None),
                argument("import", list(named("link__Import", true), true), None),
            ],
            &[Schema],
            true,
        ),
        directive(
            COMPOSE_DIRECTIVE,
            vec![argument("name", named("String", false), None)],
            &[Schema],
            true,
        ),
        directive(AUTHENTICATED, Vec::new(), AUTHORIZATION_LOCATIONS, false),
        directive(
            REQUIRES_SCOPES,
            vec![argument(
                "scopes",
                list(list(named(SCOPE_SCALAR, false), false), false),
                None,
            )],
            AUTHORIZATION_LOCATIONS,
            false,
        ),
    ]
}

/// Whether a type name is defined without any declaration in the subgraph.
pub(crate) fn is_implicit_type(name: &str) -> bool {
    BUILTIN_SCALARS.contains(&name) || FEDERATION_TYPES.contains(&name)
}

/// The SDL spelling of a directive location.
pub(crate) fn location_str(location: DirectiveLocation) -> &'static str {
    match location {
        DirectiveLocation::Query => "QUERY",
        DirectiveLocation::Mutation => "MUTATION",
        DirectiveLocation::Subscription => "SUBSCRIPTION",
        DirectiveLocation::Field => "FIELD",
        DirectiveLocation::FragmentDefinition => "FRAGMENT_DEFINITION",
        DirectiveLocation::FragmentSpread => "FRAGMENT_SPREAD",
        DirectiveLocation::InlineFragment => "INLINE_FRAGMENT",
        DirectiveLocation::VariableDefinition => "VARIABLE_DEFINITION",
        DirectiveLocation::Schema => "SCHEMA",
        DirectiveLocation::Scalar => "SCALAR",
        DirectiveLocation::Object => "OBJECT",
        DirectiveLocation::FieldDefinition => "FIELD_DEFINITION",
        DirectiveLocation::ArgumentDefinition => "ARGUMENT_DEFINITION",
        DirectiveLocation::Interface => "INTERFACE",
        DirectiveLocation::Union => "UNION",
        DirectiveLocation::Enum => "ENUM",
        DirectiveLocation::EnumValue => "ENUM_VALUE",
        DirectiveLocation::InputObject => "INPUT_OBJECT",
        DirectiveLocation::InputFieldDefinition => "INPUT_FIELD_DEFINITION",
    }
}
