//! The composed graph. It is an owned, self-contained model: nothing in it points back to the
//! subgraphs it was composed from, except by name.

mod render_sdl;

use async_graphql_parser::types as ast;
use async_graphql_value::ConstValue;
use std::collections::{BTreeMap, BTreeSet};

/// The result of composing subgraphs, as consumed by the router.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FederatedGraph {
    /// In composition input order.
    pub subgraphs: Vec<SubgraphRecord>,
    /// Keyed by type name.
    pub definitions: BTreeMap<String, Definition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubgraphRecord {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Object(Object),
    Interface(Interface),
    Union(Union),
    Enum(Enum),
    Scalar(Scalar),
    InputObject(InputObject),
}

/// The composed directives of a type, field, argument, enum value or input field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directives {
    pub inaccessible: bool,
    pub tags: BTreeSet<String>,
    /// `Some` if deprecated, with the reason if one was given.
    pub deprecated: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Object {
    pub name: String,
    pub description: Option<String>,
    pub directives: Directives,
    pub implements: BTreeSet<String>,
    pub keys: Vec<Key>,
    pub fields: BTreeMap<String, Field>,
    /// The subgraphs defining the type.
    pub subgraphs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Interface {
    pub name: String,
    pub description: Option<String>,
    pub directives: Directives,
    pub implements: BTreeSet<String>,
    pub keys: Vec<Key>,
    pub fields: BTreeMap<String, Field>,
    /// The subgraphs defining the type as an interface.
    pub subgraphs: Vec<String>,
    /// The subgraphs defining the type as an `@interfaceObject`.
    pub interface_object_subgraphs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    pub subgraph_name: String,
    /// Normalized field set.
    pub selection_set: String,
    pub resolvable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub description: Option<String>,
    pub ty: ast::Type,
    pub arguments: Vec<InputValue>,
    pub directives: Directives,
    /// The subgraphs that can resolve this field, in input order.
    pub resolvable_in: Vec<String>,
    /// (subgraph name, field set)
    pub provides: Vec<(String, String)>,
    /// (subgraph name, field set)
    pub requires: Vec<(String, String)>,
    pub r#override: Option<Override>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Override {
    /// The subgraph that took over the field.
    pub to: String,
    pub from: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputValue {
    pub name: String,
    pub description: Option<String>,
    pub ty: ast::Type,
    pub default_value: Option<ConstValue>,
    pub directives: Directives,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Union {
    pub name: String,
    pub description: Option<String>,
    pub directives: Directives,
    pub members: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enum {
    pub name: String,
    pub description: Option<String>,
    pub directives: Directives,
    pub values: BTreeMap<String, EnumValue>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnumValue {
    pub name: String,
    pub description: Option<String>,
    pub directives: Directives,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scalar {
    pub name: String,
    pub description: Option<String>,
    pub directives: Directives,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputObject {
    pub name: String,
    pub description: Option<String>,
    pub directives: Directives,
    pub fields: BTreeMap<String, InputValue>,
}

impl FederatedGraph {
    /// The router schema, with the federation directives the router needs.
    pub fn render_federated_sdl(&self) -> String {
        render_sdl::render_federated_sdl(self)
    }

    /// The schema exposed to clients: no federation directives, and nothing `@inaccessible`.
    pub fn render_api_sdl(&self) -> String {
        render_sdl::render_api_sdl(self)
    }

    pub fn definition(&self, name: &str) -> Option<&Definition> {
        self.definitions.get(name)
    }

    pub fn object(&self, name: &str) -> Option<&Object> {
        match self.definitions.get(name)? {
            Definition::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn interface(&self, name: &str) -> Option<&Interface> {
        match self.definitions.get(name)? {
            Definition::Interface(interface) => Some(interface),
            _ => None,
        }
    }

    /// The field of an object or interface.
    pub fn field(&self, type_name: &str, field_name: &str) -> Option<&Field> {
        self.definitions.get(type_name)?.fields()?.get(field_name)
    }

    /// The objects implementing an interface, or the members of a union, in name order. An
    /// object is its own only possible type.
    pub fn possible_types<'a>(&'a self, type_name: &'a str) -> Vec<&'a str> {
        match self.definitions.get(type_name) {
            Some(Definition::Object(object)) => vec![object.name.as_str()],
            Some(Definition::Union(union)) => union.members.iter().map(String::as_str).collect(),
            Some(Definition::Interface(_)) => self
                .definitions
                .values()
                .filter_map(|definition| match definition {
                    Definition::Object(object) if object.implements.contains(type_name) => Some(object.name.as_str()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Is the type an object, interface or union?
    pub fn is_composite(&self, type_name: &str) -> bool {
        matches!(
            self.definitions.get(type_name),
            Some(Definition::Object(_) | Definition::Interface(_) | Definition::Union(_))
        )
    }
}

impl Definition {
    pub fn name(&self) -> &str {
        match self {
            Definition::Object(Object { name, .. })
            | Definition::Interface(Interface { name, .. })
            | Definition::Union(Union { name, .. })
            | Definition::Enum(Enum { name, .. })
            | Definition::Scalar(Scalar { name, .. })
            | Definition::InputObject(InputObject { name, .. }) => name,
        }
    }

    pub fn directives(&self) -> &Directives {
        match self {
            Definition::Object(Object { directives, .. })
            | Definition::Interface(Interface { directives, .. })
            | Definition::Union(Union { directives, .. })
            | Definition::Enum(Enum { directives, .. })
            | Definition::Scalar(Scalar { directives, .. })
            | Definition::InputObject(InputObject { directives, .. }) => directives,
        }
    }

    pub fn directives_mut(&mut self) -> &mut Directives {
        match self {
            Definition::Object(Object { directives, .. })
            | Definition::Interface(Interface { directives, .. })
            | Definition::Union(Union { directives, .. })
            | Definition::Enum(Enum { directives, .. })
            | Definition::Scalar(Scalar { directives, .. })
            | Definition::InputObject(InputObject { directives, .. }) => directives,
        }
    }

    pub fn is_inaccessible(&self) -> bool {
        self.directives().inaccessible
    }

    /// The kind as it appears in diagnostics.
    pub fn kind_str(&self) -> &'static str {
        match self {
            Definition::Object(_) => "Object",
            Definition::Interface(_) => "Interface",
            Definition::Union(_) => "Union",
            Definition::Enum(_) => "Enum",
            Definition::Scalar(_) => "Scalar",
            Definition::InputObject(_) => "Input Object",
        }
    }

    /// Output fields of objects and interfaces.
    pub fn fields(&self) -> Option<&BTreeMap<String, Field>> {
        match self {
            Definition::Object(Object { fields, .. }) | Definition::Interface(Interface { fields, .. }) => Some(fields),
            _ => None,
        }
    }

    pub fn fields_mut(&mut self) -> Option<&mut BTreeMap<String, Field>> {
        match self {
            Definition::Object(Object { fields, .. }) | Definition::Interface(Interface { fields, .. }) => Some(fields),
            _ => None,
        }
    }

    pub fn keys(&self) -> &[Key] {
        match self {
            Definition::Object(Object { keys, .. }) | Definition::Interface(Interface { keys, .. }) => keys,
            _ => &[],
        }
    }
}
