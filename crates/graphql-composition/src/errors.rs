//! Canonical composition errors and warnings.
//!
//! The `Display` text of every variant is part of the public contract: callers snapshot the exact
//! messages.

use std::fmt::Write as _;

const QUOTATION_JOIN: &str = "\", \"";

/// A fatal diagnostic produced by normalization or federation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompositionError {
    #[error("At least one subgraph is required for federation.")]
    MinimumSubgraphRequirement,

    #[error("{}", invalid_subgraph_names_message(.duplicate_names, .empty_name_indexes))]
    InvalidSubgraphNames {
        duplicate_names: Vec<String>,
        empty_name_indexes: Vec<usize>,
    },

    #[error("{}", subgraph_validation_message(.subgraph_name, .errors))]
    SubgraphValidation {
        subgraph_name: String,
        errors: Vec<CompositionError>,
    },

    #[error("The directive \"@{directive_name}\" declared on coordinates \"{coordinates}\" is not defined in the schema.")]
    UndefinedDirective {
        directive_name: String,
        coordinates: String,
    },

    #[error("{}", invalid_directive_message(.directive_name, .coordinates, .ordinal, .messages))]
    InvalidDirective {
        directive_name: String,
        coordinates: String,
        ordinal: String,
        messages: Vec<String>,
    },

    #[error("The directive \"{directive_name}\" must only be defined once.")]
    DuplicateDirectiveDefinition { directive_name: String },

    #[error("The {type_string} \"{type_name}\" must only be defined once.")]
    DuplicateTypeDefinition { type_string: String, type_name: String },

    #[error("The {type_string} \"{type_name}\" must only define the field definition \"{field_name}\" once.")]
    DuplicateFieldDefinition {
        type_string: String,
        type_name: String,
        field_name: String,
    },

    #[error("The Enum \"{enum_name}\" must only define the Enum Value definition \"{value_name}\" once.")]
    DuplicateEnumValueDefinition { enum_name: String, value_name: String },

    #[error("The operation type \"{operation}\" cannot be defined as \"{new_type_name}\" because it has already been defined as \"{existing_type_name}\".")]
    DuplicateOperationTypeDefinition {
        operation: String,
        new_type_name: String,
        existing_type_name: String,
    },

    #[error("Expected extension \"{type_name}\" to be type {existing_kind} but received {extension_kind}.")]
    IncompatibleExtensionKinds {
        type_name: String,
        existing_kind: String,
        extension_kind: String,
    },

    #[error(" The type \"{type_name}\" was referenced in the schema, but it was never defined.")]
    UndefinedType { type_name: String },

    #[error("The Union \"{union_name}\" must define at least one Union member.")]
    NoDefinedUnionMembers { union_name: String },

    #[error("{}", invalid_union_member_type_message(.union_name, .member_names))]
    InvalidUnionMemberType {
        union_name: String,
        member_names: Vec<String>,
    },

    #[error("The {type_string} \"{type_name}\" is invalid because it does not define any fields.")]
    NoFieldDefinitions { type_string: String, type_name: String },

    #[error("{}", invalid_implemented_type_message(.type_name, .implemented_names))]
    InvalidImplementedType {
        type_name: String,
        implemented_names: Vec<String>,
    },

    #[error(" When merging types, expected \"{type_name}\" to be type \"{expected_kind}\" but received \"{actual_kind}\".")]
    IncompatibleParentKindMerge {
        type_name: String,
        expected_kind: String,
        actual_kind: String,
    },

    #[error(
        "Incompatible types when merging two instances of {} \"{coordinates}\":\n Expected type \"{expected_type}\" (subgraph \"{expected_subgraph}\") but received \"{actual_type}\" (subgraph \"{actual_subgraph}\").",
        merged_value_string(.is_argument)
    )]
    IncompatibleMergedTypes {
        coordinates: String,
        is_argument: bool,
        expected_type: String,
        actual_type: String,
        expected_subgraph: String,
        actual_subgraph: String,
    },

    #[error("{}", invalid_field_shareability_message(.type_name, .fields))]
    InvalidFieldShareability {
        type_name: String,
        fields: Vec<ShareabilityViolation>,
    },

    #[error("{}", all_external_field_instances_message(.type_name, .fields))]
    AllExternalFieldInstances {
        type_name: String,
        /// (field name, subgraph names)
        fields: Vec<(String, Vec<String>)>,
    },

    #[error("{}", invalid_required_input_value_message(.type_string, .path, .errors, .is_argument))]
    InvalidRequiredInputValue {
        type_string: String,
        path: String,
        errors: Vec<RequiredInputValueViolation>,
        is_argument: bool,
    },

    #[error("The {} \"{coordinates}\" has incompatible default values in subgraphs \"{first_subgraph}\" and \"{second_subgraph}\".", default_value_host_string(.is_argument))]
    IncompatibleDefaultValues {
        coordinates: String,
        is_argument: bool,
        first_subgraph: String,
        second_subgraph: String,
    },

    #[error("Enum \"{enum_name}\" was used as both an input and output but was inconsistently defined across inclusive subgraphs.")]
    IncompatibleSharedEnum { enum_name: String },

    #[error("{}", duplicate_overridden_fields_message(.field_paths))]
    DuplicateOverriddenFields { field_paths: Vec<String> },

    #[error("{}", invalid_interface_object_implementation_definitions_message(.interface_name, .subgraph_name, .implementation_names))]
    InvalidInterfaceObjectImplementationDefinitions {
        interface_name: String,
        subgraph_name: String,
        implementation_names: Vec<String>,
    },

    #[error("{}", undefined_entity_interface_implementations_message(.interfaces))]
    UndefinedEntityInterfaceImplementations { interfaces: Vec<EntityInterfaceDisparity> },

    #[error("The entity interface `{interface_name}` is not defined as an interface in any subgraph.")]
    EntityInterfaceNotDefined { interface_name: String },

    #[error("{}", non_entity_interface_object_message(.interface_name, .subgraph_names))]
    NonEntityInterfaceObject {
        interface_name: String,
        subgraph_names: Vec<String>,
    },

    #[error("{}", invalid_interface_implementation_message(.type_name, .interface_name, .unimplemented_fields))]
    InvalidInterfaceImplementation {
        type_name: String,
        interface_name: String,
        unimplemented_fields: Vec<String>,
    },

    #[error("The {type_string} \"{type_name}\" is an extension, but no base {type_string} definition of \"{type_name}\" is defined in any subgraph.")]
    NoBaseDefinitionForExtension { type_string: String, type_name: String },

    #[error("{}", invalid_references_of_inaccessible_type_message(.type_string, .type_name, .paths))]
    InvalidReferencesOfInaccessibleType {
        type_string: String,
        type_name: String,
        paths: Vec<String>,
    },

    #[error("{}", unresolvable_key_message(.type_name, .field_set, .field_name))]
    UnresolvableKey {
        type_name: String,
        field_set: String,
        field_name: String,
    },

    #[error("{}", no_query_root_type_message(.is_router_schema))]
    NoQueryRootType { is_router_schema: bool },

    #[error("{}", or_scopes_limit_message(.max_or_scopes, .coordinates))]
    OrScopesLimit {
        max_or_scopes: usize,
        coordinates: Vec<String>,
    },

    #[error("{}", unresolvable_path_message(.field_name, .selection_set, .reasons))]
    UnresolvablePath {
        /// Schema coordinates of the unresolvable field, e.g. `Friend.age`.
        field_coordinates: String,
        field_name: String,
        selection_set: String,
        reasons: Vec<String>,
    },
}

/// One field listed in [CompositionError::InvalidFieldShareability].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareabilityViolation {
    pub field_name: String,
    pub shareable_subgraphs: Vec<String>,
    pub non_shareable_subgraphs: Vec<String>,
}

/// One argument or input field listed in [CompositionError::InvalidRequiredInputValue].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredInputValueViolation {
    pub input_value_name: String,
    pub required_subgraphs: Vec<String>,
    pub missing_subgraphs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityInterfaceDisparity {
    pub interface_name: String,
    pub concrete_type_names: Vec<String>,
    /// (subgraph name, implementations missing in that subgraph)
    pub missing_implementations: Vec<(String, Vec<String>)>,
}

/// A non-fatal diagnostic. Warnings never make a result a failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompositionWarning {
    #[error("The Interface \"{interface_name}\" is defined but not implemented by any Object types in subgraph \"{subgraph_name}\".")]
    UnimplementedInterface {
        subgraph_name: String,
        interface_name: String,
    },

    #[error("{}", invalid_override_target_message(.type_name, .target_subgraph_name, .field_names))]
    InvalidOverrideTargetSubgraphName {
        subgraph_name: String,
        type_name: String,
        target_subgraph_name: String,
        field_names: Vec<String>,
    },

    #[error("The \"@extends\" directive is declared on \"{type_name}\" in subgraph \"{subgraph_name}\". Prefer the \"extend\" keyword or a plain definition.")]
    ExtendsDirectiveUsage {
        subgraph_name: String,
        type_name: String,
    },
}

impl CompositionWarning {
    /// The subgraph the warning originates from.
    pub fn subgraph_name(&self) -> &str {
        match self {
            CompositionWarning::UnimplementedInterface { subgraph_name, .. }
            | CompositionWarning::InvalidOverrideTargetSubgraphName { subgraph_name, .. }
            | CompositionWarning::ExtendsDirectiveUsage { subgraph_name, .. } => subgraph_name,
        }
    }
}

fn plural<'a>(count: usize, many: &'a str, one: &'a str) -> &'a str {
    if count > 1 {
        many
    } else {
        one
    }
}

fn merged_value_string(is_argument: &bool) -> &'static str {
    if *is_argument {
        "field argument"
    } else {
        "field"
    }
}

fn default_value_host_string(is_argument: &bool) -> &'static str {
    if *is_argument {
        "argument"
    } else {
        "input field"
    }
}

fn invalid_subgraph_names_message(duplicate_names: &[String], empty_name_indexes: &[usize]) -> String {
    let mut message = String::from("Subgraphs to be federated must each have a unique, non-empty name.");

    if !duplicate_names.is_empty() {
        message.push_str("\n The following subgraph names are not unique:\n  \"");
        message.push_str(&duplicate_names.join(QUOTATION_JOIN));
        message.push('"');
    }

    for index in empty_name_indexes {
        let _ = write!(message, "\n The subgraph at index {index} does not define a name.");
    }

    message
}

fn subgraph_validation_message(subgraph_name: &str, errors: &[CompositionError]) -> String {
    let mut message = format!(
        "The subgraph \"{subgraph_name}\" could not be federated for the following reason{}:\n",
        plural(errors.len(), "s", "")
    );
    let rendered: Vec<String> = errors.iter().map(ToString::to_string).collect();
    message.push_str(&rendered.join("\n"));
    message
}

fn invalid_directive_message(directive_name: &str, coordinates: &str, ordinal: &str, messages: &[String]) -> String {
    format!(
        "The {ordinal} instance of the directive \"@{directive_name}\" declared on coordinates \"{coordinates}\" is invalid for the following reason{}{}",
        plural(messages.len(), "s:\n", ":\n"),
        messages.join("\n")
    )
}

fn invalid_union_member_type_message(union_name: &str, member_names: &[String]) -> String {
    format!(
        " The union \"{union_name}\" defines the following member{}:\n  {}",
        plural(
            member_names.len(),
            "s that are not object types",
            " that is not an object type"
        ),
        member_names.join("\n  ")
    )
}

fn invalid_implemented_type_message(type_name: &str, implemented_names: &[String]) -> String {
    format!(
        "The type \"{type_name}\" declares the following implemented type{} that {} not an Interface:\n  \"{}\"",
        plural(implemented_names.len(), "s", ""),
        plural(implemented_names.len(), "are", "is"),
        implemented_names.join(QUOTATION_JOIN)
    )
}

fn invalid_field_shareability_message(type_name: &str, fields: &[ShareabilityViolation]) -> String {
    let messages: Vec<String> = fields
        .iter()
        .map(|field| {
            if field.shareable_subgraphs.is_empty() {
                format!(
                    "\n The field \"{}\" is defined in the following subgraphs: \"{}\".\n However, it is not declared \"@shareable\" in any of them.",
                    field.field_name,
                    field.non_shareable_subgraphs.join(QUOTATION_JOIN)
                )
            } else {
                format!(
                    "\n The field \"{}\" is defined and declared \"@shareable\" in the following subgraph{}: \"{}\".\n However, it is not declared \"@shareable\" in the following subgraph{}: \"{}\".",
                    field.field_name,
                    plural(field.shareable_subgraphs.len(), "s", ""),
                    field.shareable_subgraphs.join(QUOTATION_JOIN),
                    plural(field.non_shareable_subgraphs.len(), "s", ""),
                    field.non_shareable_subgraphs.join(QUOTATION_JOIN),
                )
            }
        })
        .collect();

    format!(
        "The Object \"{type_name}\" defines the same fields in multiple subgraphs without the \"@shareable\" directive:{}",
        messages.join("\n")
    )
}

fn all_external_field_instances_message(type_name: &str, fields: &[(String, Vec<String>)]) -> String {
    let mut message = format!(
        "The Object \"{type_name}\" is invalid because the following field definition{} declared \"@external\" on all instances of that field:\n",
        plural(fields.len(), "s are", " is")
    );

    for (field_name, subgraph_names) in fields {
        let _ = writeln!(
            message,
            " \"{field_name}\" in subgraph{} \"{}\"",
            plural(subgraph_names.len(), "s", ""),
            subgraph_names.join(QUOTATION_JOIN)
        );
    }

    message.push_str("At least one instance of a field definition must always be resolvable (and therefore not declared \"@external\").");
    message
}

fn invalid_required_input_value_message(
    type_string: &str,
    path: &str,
    errors: &[RequiredInputValueViolation],
    is_argument: &bool,
) -> String {
    let input_value_string = if *is_argument { "argument" } else { "Input field" };
    let mut message = format!("The {type_string} \"{path}\" could not be federated because:\n");

    for error in errors {
        let _ = write!(
            message,
            " The {input_value_string} \"{name}\" is required in the following subgraph{}: \"{}\"\n However, the {input_value_string} \"{name}\" is not defined in the following subgraph{}: \"{}\"\n If an {input_value_string} is required on a {type_string} in any one subgraph, it must be at least defined as optional on all other definitions of that {type_string} in all other subgraphs.\n",
            plural(error.required_subgraphs.len(), "s", ""),
            error.required_subgraphs.join(QUOTATION_JOIN),
            plural(error.missing_subgraphs.len(), "s", ""),
            error.missing_subgraphs.join(QUOTATION_JOIN),
            name = error.input_value_name,
        );
    }

    message
}

fn duplicate_overridden_fields_message(field_paths: &[String]) -> String {
    format!(
        "The \"@override\" directive must only be declared on one single instance of a field. However, an \"@override\" directive was declared on more than one instance of the following field{}: \"{}\".\n",
        plural(field_paths.len(), "s", ""),
        field_paths.join(QUOTATION_JOIN)
    )
}

fn invalid_interface_object_implementation_definitions_message(
    interface_name: &str,
    subgraph_name: &str,
    implementation_names: &[String],
) -> String {
    format!(
        "The subgraph that defines an entity Interface Object (using \"@interfaceObject\") must not define any  implementation types of that interface. However, the subgraph \"{subgraph_name}\" defines the entity Interface \"{interface_name}\" as an Interface Object alongside the following implementation type(s) of \"{interface_name}\":\n \"{}\"",
        implementation_names.join(QUOTATION_JOIN)
    )
}

fn non_entity_interface_object_message(interface_name: &str, subgraph_names: &[String]) -> String {
    format!(
        "The Interface \"{interface_name}\" is declared as an Interface Object (using \"@interfaceObject\") in the following subgraph{}: \"{}\".\n However, no subgraph defines \"{interface_name}\" as an entity Interface: at least one Interface definition must declare a \"@key\" directive.",
        plural(subgraph_names.len(), "s", ""),
        subgraph_names.join(QUOTATION_JOIN)
    )
}

fn or_scopes_limit_message(max_or_scopes: &usize, coordinates: &[String]) -> String {
    format!(
        "The maximum number of OR scopes that can be defined by @requiresScopes on a single field is {max_or_scopes}. However, the following coordinates attempt to define more:\n \"{}\"\nIf you require more, please contact support.",
        coordinates.join(QUOTATION_JOIN)
    )
}

fn undefined_entity_interface_implementations_message(interfaces: &[EntityInterfaceDisparity]) -> String {
    let mut message = String::from(
        "Federation was unsuccessful because any one subgraph that defines a specific entity Interface must also define each and every entity Object that implements that entity Interface.\nEach entity Object must also explicitly define its implementation of the entity Interface.\n",
    );

    for disparity in interfaces {
        let _ = write!(
            message,
            " Across all subgraphs, the entity interface \"{}\" is implemented by the following entit{}:\n  \"{}\"\n However, the definition of at least one of these implementations is missing in a subgraph that defines the entity interface \"{}\":\n",
            disparity.interface_name,
            plural(disparity.concrete_type_names.len(), "ies", "y"),
            disparity.concrete_type_names.join(QUOTATION_JOIN),
            disparity.interface_name,
        );

        for (subgraph_name, missing) in &disparity.missing_implementations {
            let _ = writeln!(
                message,
                "  Subgraph \"{subgraph_name}\" does not define the following implementations: \"{}\"",
                missing.join(QUOTATION_JOIN)
            );
        }
    }

    message
}

fn invalid_interface_implementation_message(
    type_name: &str,
    interface_name: &str,
    unimplemented_fields: &[String],
) -> String {
    format!(
        "The Object \"{type_name}\" has the following Interface implementation error:\n The implementation of Interface \"{interface_name}\" by \"{type_name}\" is invalid because:\n  The following field{} not implemented: \"{}\"\n",
        plural(unimplemented_fields.len(), "s are", " is"),
        unimplemented_fields.join(QUOTATION_JOIN)
    )
}

fn invalid_references_of_inaccessible_type_message(type_string: &str, type_name: &str, paths: &[String]) -> String {
    format!(
        "The {type_string} \"{type_name}\" is declared \"@inaccessible\"; however, the following path{} that {} not declared \"@inaccessible\" reference{} it:\n \"{}\"",
        plural(paths.len(), "s", ""),
        plural(paths.len(), "are", "is"),
        plural(paths.len(), "", "s"),
        paths.join(QUOTATION_JOIN)
    )
}

fn unresolvable_key_message(type_name: &str, field_set: &str, field_name: &str) -> String {
    format!(
        "The entity \"{type_name}\" defines a key that cannot be resolved after federation:\n The following field set is invalid:\n  \"{field_set}\"\n The type \"{type_name}\" does not define an accessible field named \"{field_name}\"."
    )
}

fn no_query_root_type_message(is_router_schema: &bool) -> String {
    format!(
        "The {} schema does not define at least one accessible query root type field after federation was completed, which is necessary for a federated graph to be valid.\n For example:\n  type Query {{\n    dummy: String\n  }}",
        if *is_router_schema { "router" } else { "client" }
    )
}

fn unresolvable_path_message(field_name: &str, selection_set: &str, reasons: &[String]) -> String {
    format!(
        "The field \"{field_name}\" is unresolvable at the following path:\n{selection_set}\nThis is because:\n - {}",
        reasons.join("\n - ")
    )
}

fn invalid_override_target_message(type_name: &str, target_subgraph_name: &str, field_names: &[String]) -> String {
    format!(
        "The Object type \"{type_name}\" defines the directive \"@override(from: \"{target_subgraph_name}\")\" on the following field{}: \"{}\".\nThe required \"from\" argument of type \"String!\" must be provided with an existing subgraph name.\nHowever, a subgraph by the name of \"{target_subgraph_name}\" does not exist.\nIf this subgraph has been recently deleted, remember to clean up unused \"@override\" directives that reference this subgraph.",
        plural(field_names.len(), "s", ""),
        field_names.join(QUOTATION_JOIN)
    )
}

/// Messages nested inside [CompositionError::InvalidDirective].
pub(crate) mod messages {
    use super::{plural, QUOTATION_JOIN};

    pub(crate) fn invalid_argument_value(value: &str, host_name: &str, argument_name: &str, expected_type: &str) -> String {
        format!(
            " The value \"{value}\" provided to argument \"{host_name}({argument_name}: ...)\" is not a valid \"{expected_type}\" type."
        )
    }

    pub(crate) fn invalid_directive_location(directive_name: &str, location: &str) -> String {
        format!(" The definition for \"@{directive_name}\" does not define \"{location}\" as a valid location.")
    }

    pub(crate) fn invalid_repeated_directive(directive_name: &str) -> String {
        format!(
            "The definition for the directive \"@{directive_name}\" does not define it as repeatable, but it is declared more than once on these coordinates."
        )
    }

    pub(crate) fn undefined_required_arguments(
        directive_name: &str,
        required_arguments: &[String],
        missing_arguments: &[String],
    ) -> String {
        let mut message = format!(
            " The definition for \"@{directive_name}\" defines the following {} required argument{}\"{}\".\n However,",
            required_arguments.len(),
            plural(required_arguments.len(), "s: ", ": "),
            required_arguments.join(QUOTATION_JOIN),
        );

        if missing_arguments.len() == required_arguments.len() {
            message.push_str(" no arguments are defined on this instance.");
        } else {
            message.push_str(&format!(
                " the following required argument{} not defined on this instance: \"{}\".",
                plural(missing_arguments.len(), "s are", " is"),
                missing_arguments.join(QUOTATION_JOIN)
            ));
        }

        message
    }

    pub(crate) fn unexpected_directive_arguments(directive_name: &str, argument_names: &[String]) -> String {
        format!(
            " The definition for \"@{directive_name}\" does not define the following argument{} provided: \"{}\".",
            plural(argument_names.len(), "s that are", " that is"),
            argument_names.join(QUOTATION_JOIN)
        )
    }

    pub(crate) fn duplicate_directive_arguments(argument_names: &[String]) -> String {
        format!(
            " The following argument{} defined more than once: \"{}\"",
            plural(argument_names.len(), "s are", " is"),
            argument_names.join(QUOTATION_JOIN)
        )
    }

    pub(crate) fn equivalent_source_and_target_override(subgraph_name: &str, field_path: &str) -> String {
        format!(
            "Cannot override field \"{field_path}\" because the source and target subgraph names are both \"{subgraph_name}\""
        )
    }

    fn field_set_header(field_set: &str) -> String {
        format!(" The following field set is invalid:\n  \"{field_set}\"\n")
    }

    pub(crate) fn unparsable_field_set(field_set: &str, reason: Option<&str>) -> String {
        let mut message = field_set_header(field_set);
        message.push_str(" The field set could not be parsed.");
        if let Some(reason) = reason {
            message.push_str("\n The reason provided was: ");
            message.push_str(reason);
        }
        message
    }

    pub(crate) fn undefined_field_in_field_set(field_set: &str, parent_type_name: &str, field_name: &str) -> String {
        format!(
            "{} This is because of the selection set corresponding to the field coordinates \"{parent_type_name}.{field_name}\".\n The type \"{parent_type_name}\" does not define a field named \"{field_name}\".",
            field_set_header(field_set)
        )
    }

    pub(crate) fn arguments_in_key_field_set(field_set: &str, field_path: &str) -> String {
        format!(
            "{} This is because \"{field_path}\" defines arguments.\n Fields that define arguments cannot be included in the field set of @key directives.",
            field_set_header(field_set)
        )
    }

    pub(crate) fn duplicate_field_in_field_set(field_set: &str, field_path: &str) -> String {
        format!(
            "{} This is because \"{field_path}\" was included in the field set more than once.",
            field_set_header(field_set)
        )
    }

    pub(crate) fn invalid_selection_set(field_set: &str, field_path: &str, field_type_name: &str) -> String {
        format!(
            "{} This is because of the selection set corresponding to the field coordinates \"{field_path}\", which returns \"{field_type_name}\".\n Composite types such as \"{field_type_name}\" must define a selection set with at least one field selection.",
            field_set_header(field_set)
        )
    }

    pub(crate) fn invalid_selection_set_definition(field_set: &str, field_path: &str, field_type_name: &str) -> String {
        format!(
            "{} This is because of the selection set corresponding to the field coordinates \"{field_path}\", which returns \"{field_type_name}\".\n Non-composite types such as \"{field_type_name}\" cannot define a selection set.",
            field_set_header(field_set)
        )
    }

    pub(crate) fn abstract_type_in_key_field_set(field_set: &str, field_path: &str, abstract_type_name: &str) -> String {
        format!(
            "{} This is because \"{field_path}\" returns \"{abstract_type_name}\", which is an abstract type.\n Fields that return abstract types (interfaces and unions) cannot be included in the field set of \"@key\" directives.",
            field_set_header(field_set)
        )
    }

    pub(crate) fn fragment_in_key_field_set(field_set: &str) -> String {
        format!(
            "{} This is because the field set of a \"@key\" directive cannot contain fragments.",
            field_set_header(field_set)
        )
    }

    pub(crate) fn invalid_inline_fragment_type_condition(field_set: &str, parent_type_name: &str, type_condition: &str) -> String {
        format!(
            "{} This is because an inline fragment with the type condition \"{type_condition}\" is defined on the selection set of \"{parent_type_name}\", but \"{type_condition}\" is not a possible type of \"{parent_type_name}\".",
            field_set_header(field_set)
        )
    }

    pub(crate) fn non_external_required_field(field_set: &str, field_path: &str) -> String {
        format!(
            "{} This is because \"{field_path}\" is not declared \"@external\".\n Fields selected by \"@requires\" must be declared \"@external\" in the same subgraph.",
            field_set_header(field_set)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_directive_pluralizes_reasons() {
        let single = CompositionError::InvalidDirective {
            directive_name: "z".to_owned(),
            coordinates: "Query.dummy".to_owned(),
            ordinal: "1st".to_owned(),
            messages: vec![messages::invalid_argument_value("B", "@z", "enum", "Enum!")],
        };

        assert_eq!(
            single.to_string(),
            "The 1st instance of the directive \"@z\" declared on coordinates \"Query.dummy\" is invalid for the following reason:\n The value \"B\" provided to argument \"@z(enum: ...)\" is not a valid \"Enum!\" type."
        );

        let double = CompositionError::InvalidDirective {
            directive_name: "z".to_owned(),
            coordinates: "Query.dummy".to_owned(),
            ordinal: "2nd".to_owned(),
            messages: vec!["a".to_owned(), "b".to_owned()],
        };

        assert!(double.to_string().ends_with("for the following reasons:\na\nb"));
    }

    #[test]
    fn required_arguments_message_variants() {
        let required = ["a".to_owned(), "b".to_owned()];

        assert_eq!(
            messages::undefined_required_arguments("x", &required, &required),
            " The definition for \"@x\" defines the following 2 required arguments: \"a\", \"b\".\n However, no arguments are defined on this instance."
        );

        assert_eq!(
            messages::undefined_required_arguments("x", &required, &required[1..]),
            " The definition for \"@x\" defines the following 2 required arguments: \"a\", \"b\".\n However, the following required argument is not defined on this instance: \"b\"."
        );
    }

    #[test]
    fn interface_object_implementation_message_keeps_double_space() {
        let error = CompositionError::InvalidInterfaceObjectImplementationDefinitions {
            interface_name: "Interface".to_owned(),
            subgraph_name: "faa".to_owned(),
            implementation_names: vec!["EntityOne".to_owned(), "EntityTwo".to_owned()],
        };

        let message = error.to_string();
        assert!(message.contains("must not define any  implementation types"));
        assert!(message.ends_with("\n \"EntityOne\", \"EntityTwo\""));
    }

    #[test]
    fn warning_subgraph_name() {
        let warning = CompositionWarning::UnimplementedInterface {
            subgraph_name: "a".to_owned(),
            interface_name: "Node".to_owned(),
        };

        assert_eq!(warning.subgraph_name(), "a");
    }
}
