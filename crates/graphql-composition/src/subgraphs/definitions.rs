use super::*;
use std::collections::BTreeSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct DefinitionId(pub(super) usize);

// Invariant: `definitions` is sorted by `Definition::subgraph_id`. We rely on it for binary search.
#[derive(Default)]
pub(crate) struct Definitions {
    definitions: Vec<Definition>,
    // (implementer, implemented interface name)
    interface_impls: BTreeSet<(DefinitionId, String)>,
    // (union, member name)
    union_members: BTreeSet<(DefinitionId, String)>,
}

pub(crate) struct Definition {
    subgraph_id: SubgraphId,
    name: String,
    kind: DefinitionKind,
    description: Option<String>,
    directives: DirectiveSite,
    is_shareable: bool,
    is_external: bool,
    is_interface_object: bool,
    /// Only defined through `extend` or `@extends` in its subgraph.
    is_extension: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DefinitionKind {
    Object,
    Interface,
    Union,
    InputObject,
    Scalar,
    Enum,
}

impl DefinitionKind {
    /// The kind as it appears in diagnostics.
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            DefinitionKind::Object => "Object",
            DefinitionKind::Interface => "Interface",
            DefinitionKind::Union => "Union",
            DefinitionKind::InputObject => "Input Object",
            DefinitionKind::Scalar => "Scalar",
            DefinitionKind::Enum => "Enum",
        }
    }
}

/// The flags of a definition, read from its directives during ingestion.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct DefinitionFlags {
    pub(crate) is_shareable: bool,
    pub(crate) is_external: bool,
    pub(crate) is_interface_object: bool,
    pub(crate) is_extension: bool,
}

impl Subgraphs {
    pub(crate) fn push_definition(
        &mut self,
        subgraph_id: SubgraphId,
        name: &str,
        kind: DefinitionKind,
        description: Option<String>,
        directives: DirectiveSite,
        flags: DefinitionFlags,
    ) -> DefinitionId {
        let definition = Definition {
            subgraph_id,
            name: name.to_owned(),
            kind,
            description,
            directives,
            is_shareable: flags.is_shareable,
            is_external: flags.is_external,
            is_interface_object: flags.is_interface_object,
            is_extension: flags.is_extension,
        };
        let id = DefinitionId(self.definitions.definitions.push_return_idx(definition));
        self.definition_names.insert((name.to_owned(), subgraph_id), id);
        id
    }

    pub(crate) fn push_interface_impl(&mut self, implementer: DefinitionId, interface_name: &str) {
        self.definitions
            .interface_impls
            .insert((implementer, interface_name.to_owned()));
    }

    pub(crate) fn push_union_member(&mut self, union_id: DefinitionId, member_name: &str) {
        self.definitions.union_members.insert((union_id, member_name.to_owned()));
    }
}

pub(crate) type DefinitionWalker<'a> = Walker<'a, DefinitionId>;

impl<'a> DefinitionWalker<'a> {
    fn definition(self) -> &'a Definition {
        &self.subgraphs.definitions.definitions[self.id.0]
    }

    pub(crate) fn name(self) -> &'a str {
        &self.definition().name
    }

    pub(crate) fn kind(self) -> DefinitionKind {
        self.definition().kind
    }

    pub(crate) fn description(self) -> Option<&'a str> {
        self.definition().description.as_deref()
    }

    pub(crate) fn directives(self) -> &'a DirectiveSite {
        &self.definition().directives
    }

    pub(crate) fn is_shareable(self) -> bool {
        self.definition().is_shareable
    }

    pub(crate) fn is_external(self) -> bool {
        self.definition().is_external
    }

    pub(crate) fn is_interface_object(self) -> bool {
        self.definition().is_interface_object
    }

    pub(crate) fn is_extension(self) -> bool {
        self.definition().is_extension
    }

    pub(crate) fn is_entity(self) -> bool {
        self.keys().next().is_some()
    }

    pub(crate) fn subgraph(self) -> SubgraphWalker<'a> {
        self.walk(self.definition().subgraph_id)
    }

    /// Names of the interfaces this object or interface implements, sorted.
    pub(crate) fn implements(self) -> impl Iterator<Item = &'a str> {
        let id = self.id;
        self.subgraphs
            .definitions
            .interface_impls
            .range((id, String::new())..)
            .take_while(move |(implementer, _)| *implementer == id)
            .map(|(_, interface_name)| interface_name.as_str())
    }

    pub(crate) fn implements_interface(self, interface_name: &str) -> bool {
        self.subgraphs
            .definitions
            .interface_impls
            .contains(&(self.id, interface_name.to_owned()))
    }

    /// Member names of a union, sorted.
    pub(crate) fn union_members(self) -> impl Iterator<Item = &'a str> {
        let id = self.id;
        self.subgraphs
            .definitions
            .union_members
            .range((id, String::new())..)
            .take_while(move |(union_id, _)| *union_id == id)
            .map(|(_, member)| member.as_str())
    }
}

impl<'a> SubgraphWalker<'a> {
    pub(crate) fn definitions(self) -> impl Iterator<Item = DefinitionWalker<'a>> {
        let subgraph_id = self.id;
        let definitions = &self.subgraphs.definitions.definitions;
        let start = definitions.partition_point(|def| def.subgraph_id < subgraph_id);
        let subgraph_definitions = definitions[start..]
            .iter()
            .take_while(move |def| def.subgraph_id == subgraph_id);
        subgraph_definitions
            .enumerate()
            .map(move |(idx, _)| self.walk(DefinitionId(idx + start)))
    }
}
