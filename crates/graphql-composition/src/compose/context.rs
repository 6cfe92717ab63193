use crate::{
    federated_graph::{Definition, FederatedGraph, SubgraphRecord},
    router_config::ConfigurationData,
    subgraphs::{SubgraphId, Subgraphs},
    Diagnostics,
};
use std::collections::BTreeMap;

/// Context for [`compose_subgraphs`](super::compose_subgraphs).
pub(crate) struct Context<'a> {
    pub(crate) subgraphs: &'a Subgraphs,
    pub(crate) diagnostics: &'a mut Diagnostics,
    /// This should stay private, the graph remains write-only during composition: the subgraphs
    /// are the source of truth.
    graph: FederatedGraph,
    /// Router configuration of each subgraph, indexed by subgraph id. Starts as the normalized
    /// configuration and is amended during composition.
    configuration_data: Vec<BTreeMap<String, ConfigurationData>>,
    /// Paths (`Type.field`) of fields with more than one `@override`.
    duplicate_overrides: Vec<String>,
}

impl<'a> Context<'a> {
    pub(crate) fn new(subgraphs: &'a Subgraphs, diagnostics: &'a mut Diagnostics) -> Self {
        let graph = FederatedGraph {
            subgraphs: subgraphs
                .iter_subgraphs()
                .map(|subgraph| SubgraphRecord {
                    name: subgraph.name().to_owned(),
                    url: subgraph.url().to_owned(),
                })
                .collect(),
            definitions: BTreeMap::new(),
        };

        let configuration_data = subgraphs
            .iter_subgraphs()
            .map(|subgraph| subgraph.configuration_data().clone())
            .collect();

        Context {
            subgraphs,
            diagnostics,
            graph,
            configuration_data,
            duplicate_overrides: Vec::new(),
        }
    }

    pub(crate) fn insert_definition(&mut self, definition: Definition) {
        self.graph.definitions.insert(definition.name().to_owned(), definition);
    }

    /// Read access for the passes that run once every definition is composed.
    pub(crate) fn graph(&self) -> &FederatedGraph {
        &self.graph
    }

    pub(crate) fn graph_mut(&mut self) -> &mut FederatedGraph {
        &mut self.graph
    }

    pub(crate) fn configuration_data_mut(&mut self, subgraph_id: SubgraphId) -> &mut BTreeMap<String, ConfigurationData> {
        &mut self.configuration_data[subgraph_id.idx()]
    }

    pub(crate) fn push_duplicate_override(&mut self, field_path: String) {
        self.duplicate_overrides.push(field_path);
    }

    pub(crate) fn take_duplicate_overrides(&mut self) -> Vec<String> {
        std::mem::take(&mut self.duplicate_overrides)
    }

    pub(crate) fn into_parts(self) -> (FederatedGraph, Vec<BTreeMap<String, ConfigurationData>>) {
        (self.graph, self.configuration_data)
    }
}
