use crate::{
    federated_graph::FederatedGraph,
    router_config::{FieldConfiguration, SubgraphConfig},
    CompositionError, CompositionWarning, ContractTagOptions,
};
use std::collections::BTreeMap;

/// The result of a [`federate_subgraphs()`](crate::federate_subgraphs()) invocation.
#[derive(Debug, Clone)]
pub enum FederationResult {
    Success(FederationSuccess),
    Failure {
        errors: Vec<CompositionError>,
        warnings: Vec<CompositionWarning>,
    },
}

#[derive(Debug, Clone)]
pub struct FederationSuccess {
    pub federated_graph: FederatedGraph,
    pub subgraph_config_by_subgraph_name: BTreeMap<String, SubgraphConfig>,
    /// Fields protected by `@authenticated` or `@requiresScopes`, in type then field name order.
    pub field_configurations: Vec<FieldConfiguration>,
    pub warnings: Vec<CompositionWarning>,
    /// Set on contract graphs.
    pub contract_tag_options: Option<ContractTagOptions>,
}

impl FederationResult {
    /// Simplify the result data to a yes-no answer: did federation succeed?
    ///
    /// `Ok()` contains the [FederationSuccess].
    /// `Err()` contains all the errors.
    pub fn into_result(self) -> Result<FederationSuccess, Vec<CompositionError>> {
        match self {
            FederationResult::Success(success) => Ok(success),
            FederationResult::Failure { errors, .. } => Err(errors),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FederationResult::Success(_))
    }

    pub fn errors(&self) -> &[CompositionError] {
        match self {
            FederationResult::Success(_) => &[],
            FederationResult::Failure { errors, .. } => errors,
        }
    }

    pub fn warnings(&self) -> &[CompositionWarning] {
        match self {
            FederationResult::Success(FederationSuccess { warnings, .. }) | FederationResult::Failure { warnings, .. } => {
                warnings
            }
        }
    }
}

/// The base graph and every contract derived from it.
#[derive(Debug, Clone)]
pub enum FederationResultWithContracts {
    Success {
        base: FederationSuccess,
        /// Keyed by contract name. A contract can fail on its own while the base graph succeeds.
        contracts: BTreeMap<String, FederationResult>,
    },
    Failure {
        errors: Vec<CompositionError>,
        warnings: Vec<CompositionWarning>,
    },
}

impl FederationResultWithContracts {
    /// `Ok()` contains the base graph and the contract results, `Err()` the base errors.
    #[allow(clippy::type_complexity)]
    pub fn into_result(
        self,
    ) -> Result<(FederationSuccess, BTreeMap<String, FederationResult>), Vec<CompositionError>> {
        match self {
            FederationResultWithContracts::Success { base, contracts } => Ok((base, contracts)),
            FederationResultWithContracts::Failure { errors, .. } => Err(errors),
        }
    }
}
