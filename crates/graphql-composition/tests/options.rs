#![allow(unused_crate_dependencies)]

use graphql_composition::{CompositionOptions, ContractTagOptions, RouterCompatibilityVersion};

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompositionConfig {
    router_compatibility_version: RouterCompatibilityVersion,
    #[serde(default)]
    options: CompositionOptions,
    #[serde(default)]
    contracts: std::collections::BTreeMap<String, ContractTagOptions>,
}

#[test]
fn options_from_toml() {
    let config: CompositionConfig = toml::from_str(
        r#"
        routerCompatibilityVersion = "1"

        [options]
        disableResolvabilityValidation = true

        [contracts.public]
        tagNamesToInclude = ["public"]

        [contracts.no-internal]
        tagNamesToExclude = ["internal", "beta"]
        "#,
    )
    .unwrap();

    assert_eq!(config.router_compatibility_version, RouterCompatibilityVersion::One);
    assert!(config.options.disable_resolvability_validation);
    assert_eq!(config.contracts["public"], ContractTagOptions::include(["public"]));
    assert_eq!(
        config.contracts["no-internal"],
        ContractTagOptions::exclude(["beta", "internal"])
    );
}

#[test]
fn defaults_from_an_empty_table() {
    let options: CompositionOptions = toml::from_str("").unwrap();

    assert_eq!(options, CompositionOptions::default());
}

#[test]
fn unknown_router_compatibility_version() {
    let error = RouterCompatibilityVersion::parse("2").unwrap_err();

    assert_eq!(error.to_string(), "Invalid router compatibility version \"2\".");
}

#[test]
fn options_serialize_as_camel_case_json() {
    let options = ContractTagOptions::exclude(["internal"]);

    insta::assert_json_snapshot!(options, @r###"
    {
      "tagNamesToExclude": [
        "internal"
      ],
      "tagNamesToInclude": []
    }
    "###);
}
