//! Federation of GraphQL subgraphs: normalization of each subgraph, composition of all of them into
//! one federated graph, contracts derived from it, and the router configuration of each subgraph.
//!
//! The entry point is [federate_subgraphs()]. Every domain error is returned as data in the result
//! types: nothing in this crate panics on invalid schemas.

mod authorization;
mod compose;
mod contracts;
mod diagnostics;
mod errors;
mod federated_graph;
mod ingest_subgraph;
mod normalization;
mod options;
mod resolvability;
mod result;
mod router_config;
mod subgraph;
mod subgraphs;
mod utils;

pub use self::{
    authorization::{AuthorizationData, AuthorizationRequirements, MAX_OR_SCOPES},
    diagnostics::Diagnostics,
    errors::{
        CompositionError, CompositionWarning, EntityInterfaceDisparity, RequiredInputValueViolation,
        ShareabilityViolation,
    },
    federated_graph::{
        Definition, Directives, Enum, EnumValue, FederatedGraph, Field, InputObject, InputValue, Interface, Key,
        Object, Override, Scalar, SubgraphRecord, Union,
    },
    normalization::{normalize_subgraph, NormalizationResult, NormalizationSuccess},
    options::{
        CompositionOptions, ContractTagOptions, InvalidRouterCompatibilityVersion, NormalizationOptions,
        RouterCompatibilityVersion,
    },
    result::{FederationResult, FederationResultWithContracts, FederationSuccess},
    router_config::{ConfigurationData, FieldConfiguration, RequiredFieldConfiguration, SubgraphConfig},
    subgraph::{parse_schema, Subgraph},
};

pub use async_graphql_parser::{types::ServiceDocument, Error as ParseError};

#[cfg(test)]
use {serde_json as _, toml as _, tracing_subscriber as _};

use self::{ingest_subgraph::ingest_subgraph, subgraphs::Subgraphs};
use std::collections::{BTreeMap, BTreeSet};

/// Normalize and compose the subgraphs into a federated graph.
///
/// Subgraphs are merged in the order they are given: where two subgraphs disagree, the first one
/// is the reference in error messages.
pub fn federate_subgraphs(
    subgraphs: &[Subgraph],
    router_compatibility_version: RouterCompatibilityVersion,
    options: &CompositionOptions,
) -> FederationResult {
    let _span = tracing::info_span!("federate_subgraphs", subgraphs = subgraphs.len()).entered();

    let mut diagnostics = Diagnostics::default();

    let Some(normalized) = normalize_subgraphs(subgraphs, router_compatibility_version, &mut diagnostics) else {
        return failure(diagnostics);
    };

    let authorization = authorization::merge_subgraphs(
        normalized.iter().map(|success| &success.authorization_data_by_type_name),
        &mut diagnostics,
    );

    if diagnostics.any_fatal() {
        return failure(diagnostics);
    }

    let mut ingested = Subgraphs::default();

    for (subgraph, success) in subgraphs.iter().zip(normalized) {
        ingest_subgraph(&subgraph.name, &subgraph.url, success, &mut ingested);
    }

    let (federated_graph, configuration_data) = {
        let mut ctx = compose::Context::new(&ingested, &mut diagnostics);
        compose::compose_subgraphs(&mut ctx);
        ctx.into_parts()
    };

    if diagnostics.any_fatal() {
        return failure(diagnostics);
    }

    if options.disable_resolvability_validation {
        tracing::debug!("resolvability validation skipped");
    } else {
        resolvability::validate_resolvability(&federated_graph, &mut diagnostics);

        if diagnostics.any_fatal() {
            return failure(diagnostics);
        }
    }

    let field_configurations = authorization::field_configurations(&federated_graph, &authorization, &mut diagnostics);

    if diagnostics.any_fatal() {
        return failure(diagnostics);
    }

    let subgraph_config_by_subgraph_name = ingested
        .iter_subgraphs()
        .zip(configuration_data)
        .map(|(subgraph, configuration_data_by_type_name)| {
            let config = SubgraphConfig {
                url: subgraph.url().to_owned(),
                configuration_data_by_type_name,
                schema: subgraph.schema().clone(),
            };

            (subgraph.name().to_owned(), config)
        })
        .collect();

    let (_, warnings) = diagnostics.into_parts();

    FederationResult::Success(FederationSuccess {
        federated_graph,
        subgraph_config_by_subgraph_name,
        field_configurations,
        warnings,
        contract_tag_options: None,
    })
}

/// Compose the subgraphs, then derive the contract graph selected by the tag options.
pub fn federate_subgraphs_contract(
    subgraphs: &[Subgraph],
    contract_tag_options: &ContractTagOptions,
    router_compatibility_version: RouterCompatibilityVersion,
    options: &CompositionOptions,
) -> FederationResult {
    match federate_subgraphs(subgraphs, router_compatibility_version, options) {
        FederationResult::Success(base) => apply_contract(&base, contract_tag_options),
        failure @ FederationResult::Failure { .. } => failure,
    }
}

/// Compose the subgraphs once, and derive one contract graph per entry of `contracts`.
pub fn federate_subgraphs_with_contracts(
    subgraphs: &[Subgraph],
    contracts: &BTreeMap<String, ContractTagOptions>,
    router_compatibility_version: RouterCompatibilityVersion,
    options: &CompositionOptions,
) -> FederationResultWithContracts {
    let base = match federate_subgraphs(subgraphs, router_compatibility_version, options) {
        FederationResult::Success(base) => base,
        FederationResult::Failure { errors, warnings } => {
            return FederationResultWithContracts::Failure { errors, warnings };
        }
    };

    let contracts = contracts
        .iter()
        .map(|(contract_name, contract_tag_options)| {
            let _span = tracing::info_span!("contract", contract_name = contract_name.as_str()).entered();
            (contract_name.clone(), apply_contract(&base, contract_tag_options))
        })
        .collect();

    FederationResultWithContracts::Success { base, contracts }
}

fn apply_contract(base: &FederationSuccess, contract_tag_options: &ContractTagOptions) -> FederationResult {
    match contracts::build_contract_graph(&base.federated_graph, contract_tag_options) {
        Ok(federated_graph) => FederationResult::Success(FederationSuccess {
            federated_graph,
            subgraph_config_by_subgraph_name: base.subgraph_config_by_subgraph_name.clone(),
            field_configurations: base.field_configurations.clone(),
            warnings: base.warnings.clone(),
            contract_tag_options: Some(contract_tag_options.clone()),
        }),
        Err(error) => FederationResult::Failure {
            errors: vec![error],
            warnings: base.warnings.clone(),
        },
    }
}

/// Check the subgraph names and normalize every subgraph. Returns `None` if anything failed, with
/// the errors in `diagnostics`.
fn normalize_subgraphs(
    subgraphs: &[Subgraph],
    router_compatibility_version: RouterCompatibilityVersion,
    diagnostics: &mut Diagnostics,
) -> Option<Vec<NormalizationSuccess>> {
    if subgraphs.is_empty() {
        diagnostics.push_fatal(CompositionError::MinimumSubgraphRequirement);
        return None;
    }

    let mut seen_names = BTreeSet::new();
    let mut duplicate_names = Vec::new();
    let mut empty_name_indexes = Vec::new();

    for (idx, subgraph) in subgraphs.iter().enumerate() {
        if subgraph.name.is_empty() {
            empty_name_indexes.push(idx);
        } else if !seen_names.insert(subgraph.name.as_str()) && !duplicate_names.contains(&subgraph.name) {
            duplicate_names.push(subgraph.name.clone());
        }
    }

    if !duplicate_names.is_empty() || !empty_name_indexes.is_empty() {
        diagnostics.push_fatal(CompositionError::InvalidSubgraphNames {
            duplicate_names,
            empty_name_indexes,
        });
        return None;
    }

    let mut normalized = Vec::with_capacity(subgraphs.len());

    for subgraph in subgraphs {
        let options = NormalizationOptions::new(subgraph.name.as_str(), router_compatibility_version);

        match normalize_subgraph(&subgraph.definitions, &options) {
            NormalizationResult::Success(success) => {
                diagnostics.extend_warnings(success.warnings.iter().cloned());
                normalized.push(success);
            }
            NormalizationResult::Failure { errors, warnings } => {
                diagnostics.extend_warnings(warnings);
                diagnostics.push_fatal(CompositionError::SubgraphValidation {
                    subgraph_name: subgraph.name.clone(),
                    errors,
                });
            }
        }
    }

    if diagnostics.any_fatal() {
        return None;
    }

    Some(normalized)
}

fn failure(diagnostics: Diagnostics) -> FederationResult {
    let (errors, warnings) = diagnostics.into_parts();
    FederationResult::Failure { errors, warnings }
}

trait VecExt<T> {
    fn push_return_idx(&mut self, elem: T) -> usize;
}

impl<T> VecExt<T> for Vec<T> {
    fn push_return_idx(&mut self, elem: T) -> usize {
        let idx = self.len();
        self.push(elem);
        idx
    }
}
