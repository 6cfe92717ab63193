mod definitions;
mod directives;
mod enums;
mod fields;
mod keys;
mod walker;

pub(crate) use self::{
    definitions::{DefinitionFlags, DefinitionId, DefinitionKind, DefinitionWalker},
    directives::DirectiveSite,
    fields::{FieldRecord, FieldWalker, InputValueRecord},
    walker::Walker,
};

use crate::{router_config::ConfigurationData, VecExt};
use async_graphql_parser::types::ServiceDocument;
use itertools::Itertools;
use std::collections::BTreeMap;

/// A set of normalized subgraphs to be composed.
#[derive(Default)]
pub(crate) struct Subgraphs {
    subgraphs: Vec<Subgraph>,
    definitions: definitions::Definitions,
    enums: enums::Enums,
    fields: fields::Fields,
    keys: keys::Keys,

    // Secondary indexes.

    // We want a BTreeMap because we need range queries. The name comes first, then the subgraph,
    // because we want to know which definitions have the same name but live in different
    // subgraphs.
    //
    // (definition name, subgraph_id) -> definition id
    definition_names: BTreeMap<(String, SubgraphId), DefinitionId>,
}

impl Subgraphs {
    /// Iterate over groups of definitions to compose. The definitions are grouped by name, groups
    /// come in ascending name order and the definitions of a group in subgraph order.
    pub(crate) fn iter_definition_groups<'a>(&'a self, mut compose_fn: impl FnMut(&str, &[DefinitionWalker<'a>])) {
        let mut buf = Vec::new();

        for (name, group) in &self.definition_names.iter().chunk_by(|&(key, _)| key.0.as_str()) {
            buf.clear();
            buf.extend(group.map(|(_, definition_id)| self.walk(*definition_id)));
            compose_fn(name, &buf);
        }
    }

    /// All the definitions with this name, in subgraph order.
    pub(crate) fn definitions_by_name<'a>(&'a self, name: &str) -> impl Iterator<Item = DefinitionWalker<'a>> + 'a {
        self.definition_names
            .range((name.to_owned(), SubgraphId::MIN)..=(name.to_owned(), SubgraphId::MAX))
            .map(|(_, id)| self.walk(*id))
    }

    pub(crate) fn push_subgraph(
        &mut self,
        name: &str,
        url: &str,
        schema: ServiceDocument,
        configuration_data: BTreeMap<String, ConfigurationData>,
    ) -> SubgraphId {
        let subgraph = Subgraph {
            name: name.to_owned(),
            url: url.to_owned(),
            schema,
            configuration_data,
        };
        SubgraphId(self.subgraphs.push_return_idx(subgraph))
    }

    pub(crate) fn walk<Id>(&self, id: Id) -> Walker<'_, Id> {
        Walker { id, subgraphs: self }
    }

    pub(crate) fn iter_subgraphs(&self) -> impl ExactSizeIterator<Item = SubgraphWalker<'_>> {
        (0..self.subgraphs.len()).map(|idx| self.walk(SubgraphId(idx)))
    }

    pub(crate) fn subgraph_by_name(&self, name: &str) -> Option<SubgraphWalker<'_>> {
        self.iter_subgraphs().find(|subgraph| subgraph.name() == name)
    }
}

pub(crate) struct Subgraph {
    /// The name of the subgraph. It is not contained in the GraphQL schema of the subgraph, it
    /// only makes sense within a project.
    name: String,
    url: String,
    schema: ServiceDocument,
    configuration_data: BTreeMap<String, ConfigurationData>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct SubgraphId(usize);

impl SubgraphId {
    pub(crate) const MIN: SubgraphId = SubgraphId(usize::MIN);
    pub(crate) const MAX: SubgraphId = SubgraphId(usize::MAX);

    pub(crate) fn idx(self) -> usize {
        self.0
    }
}

pub(crate) type SubgraphWalker<'a> = Walker<'a, SubgraphId>;

impl<'a> SubgraphWalker<'a> {
    fn subgraph(self) -> &'a Subgraph {
        &self.subgraphs.subgraphs[self.id.0]
    }

    pub(crate) fn name(self) -> &'a str {
        &self.subgraph().name
    }

    pub(crate) fn url(self) -> &'a str {
        &self.subgraph().url
    }

    pub(crate) fn schema(self) -> &'a ServiceDocument {
        &self.subgraph().schema
    }

    pub(crate) fn configuration_data(self) -> &'a BTreeMap<String, ConfigurationData> {
        &self.subgraph().configuration_data
    }

    pub(crate) fn definition_by_name(self, name: &str) -> Option<DefinitionWalker<'a>> {
        self.subgraphs
            .definition_names
            .get(&(name.to_owned(), self.id))
            .map(|id| self.walk(*id))
    }
}
