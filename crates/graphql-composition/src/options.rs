use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The router ruleset a composition targets. Every entry point is parameterized by it.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::EnumString,
    strum::Display,
    strum::AsRefStr,
    strum::EnumIter,
    Serialize,
    Deserialize,
)]
pub enum RouterCompatibilityVersion {
    #[default]
    #[strum(serialize = "1")]
    #[serde(rename = "1")]
    One,
}

impl RouterCompatibilityVersion {
    /// Parse a version as received at a service boundary.
    pub fn parse(version: &str) -> Result<Self, InvalidRouterCompatibilityVersion> {
        version
            .parse()
            .map_err(|_| InvalidRouterCompatibilityVersion(version.to_owned()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid router compatibility version \"{0}\".")]
pub struct InvalidRouterCompatibilityVersion(pub String);

/// Knobs for [federate_subgraphs](crate::federate_subgraphs).
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompositionOptions {
    /// Skip the final reachability analysis over the composed graph.
    pub disable_resolvability_validation: bool,
}

/// Options for [normalize_subgraph](crate::normalize_subgraph).
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NormalizationOptions {
    /// The name of the subgraph, used in `@override` validation and in warnings.
    pub subgraph_name: Option<String>,
    /// An additional name under which `@override` is recognized.
    pub override_directive_name: Option<String>,
    pub router_compatibility_version: RouterCompatibilityVersion,
}

impl NormalizationOptions {
    pub fn new(subgraph_name: impl Into<String>, router_compatibility_version: RouterCompatibilityVersion) -> Self {
        NormalizationOptions {
            subgraph_name: Some(subgraph_name.into()),
            override_directive_name: None,
            router_compatibility_version,
        }
    }
}

/// The tag filter of a contract graph.
///
/// When `tag_names_to_include` is non-empty the contract is in include mode and
/// `tag_names_to_exclude` is ignored.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContractTagOptions {
    pub tag_names_to_exclude: BTreeSet<String>,
    pub tag_names_to_include: BTreeSet<String>,
}

impl ContractTagOptions {
    pub fn exclude<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ContractTagOptions {
            tag_names_to_exclude: tags.into_iter().map(Into::into).collect(),
            tag_names_to_include: BTreeSet::new(),
        }
    }

    pub fn include<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ContractTagOptions {
            tag_names_to_exclude: BTreeSet::new(),
            tag_names_to_include: tags.into_iter().map(Into::into).collect(),
        }
    }

    pub(crate) fn is_include_mode(&self) -> bool {
        !self.tag_names_to_include.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn router_compatibility_version_round_trips_through_strings() {
        for version in RouterCompatibilityVersion::iter() {
            assert_eq!(RouterCompatibilityVersion::parse(version.as_ref()), Ok(version));
        }

        assert_eq!(RouterCompatibilityVersion::One.to_string(), "1");
        assert_eq!(
            RouterCompatibilityVersion::parse("2").unwrap_err().to_string(),
            "Invalid router compatibility version \"2\"."
        );
    }

    #[test]
    fn contract_mode() {
        assert!(ContractTagOptions::include(["public"]).is_include_mode());
        assert!(!ContractTagOptions::exclude(["internal"]).is_include_mode());
    }
}
