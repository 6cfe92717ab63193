use async_graphql_parser::types as ast;
use async_graphql_value::ConstValue;
use std::{borrow::Cow, collections::BTreeMap};

use super::builtins::FEDERATION_DIRECTIVES;

const DEFAULT_FEDERATION_PREFIX: &str = "federation__";

/// This struct is the source of truth for matching federation directives by name when normalizing
/// a subgraph's GraphQL SDL.
///
/// The names of federation directives are influenced by `@link` directives on schema definitions
/// or extensions in two ways:
///
/// - Imports in link directives bring the directives in scope, with optional renaming.
///   Example: `@link(url: "...", import: [{ name: "@shareable", as: "@federationShareable"}])`
///   Example: `@link(url: "...", import: ["@key"])`
///
/// - The `as` argument: `@link(url: "...", as: "compositionDirectives")`
///   - In the absence of an `as` argument, all directives are in scope prefixed with
///     `@federation__`, for example `@federation__shareable`.
///   - With an `@link(as: "something")`, they are in scope under the `@something__` prefix.
///
/// The bare canonical names are always recognized.
#[derive(Debug, Default)]
pub(crate) struct DirectiveMatcher<'a> {
    /// used name -> canonical name
    aliases: BTreeMap<Cow<'a, str>, &'static str>,
}

impl<'a> DirectiveMatcher<'a> {
    pub(crate) fn new(document: &'a ast::ServiceDocument, override_directive_name: Option<&'a str>) -> Self {
        let mut matcher = DirectiveMatcher::default();

        let link = document
            .definitions
            .iter()
            .filter_map(|definition| match definition {
                ast::TypeSystemDefinition::Schema(schema) => Some(schema),
                _ => None,
            })
            .flat_map(|schema| schema.node.directives.iter())
            .map(|directive| &directive.node)
            .find(|directive| is_federation_link(directive));

        if let Some(link) = link {
            matcher.read_link(link);
        }

        if let Some(name) = override_directive_name {
            matcher
                .aliases
                .insert(Cow::Borrowed(name.trim_start_matches('@')), "override");
        }

        matcher
    }

    fn read_link(&mut self, directive: &'a ast::ConstDirective) {
        let mut r#as = None;
        let mut imported: Vec<(&str, &str)> = Vec::new();

        for (arg_name, arg_value) in &directive.arguments {
            match (arg_name.node.as_str(), &arg_value.node) {
                ("as", ConstValue::String(value)) => r#as = Some(value.as_str()),
                ("import", ConstValue::List(imports)) => read_imports(imports, &mut imported),
                _ => (),
            }
        }

        let federation_prefix = r#as
            .map(|prefix| Cow::Owned(format!("{prefix}__")))
            .unwrap_or(Cow::Borrowed(DEFAULT_FEDERATION_PREFIX));

        for canonical in FEDERATION_DIRECTIVES {
            match imported.iter().find(|(original, _)| *original == *canonical) {
                Some((_, alias)) => {
                    self.aliases.insert(Cow::Borrowed(*alias), *canonical);
                }
                None => {
                    self.aliases
                        .insert(Cow::Owned(format!("{federation_prefix}{canonical}")), *canonical);
                }
            }
        }
    }

    /// The canonical name of a directive as used in the subgraph. Directives that are not renamed
    /// are returned as is.
    pub(crate) fn canonical_name<'b>(&self, used_name: &'b str) -> &'b str {
        self.aliases.get(used_name).copied().unwrap_or(used_name)
    }
}

fn is_federation_link(directive: &ast::ConstDirective) -> bool {
    if directive.name.node != "link" {
        return false;
    }

    directive
        .get_argument("url")
        .map(|url| match &url.node {
            ConstValue::String(s) => s.contains("/federation/v2"),
            _ => false,
        })
        .unwrap_or_default()
}

fn read_imports<'a>(imports: &'a [ConstValue], out: &mut Vec<(&'a str, &'a str)>) {
    for import in imports {
        match import {
            ConstValue::String(import) => {
                let import = import.trim_start_matches('@');
                out.push((import, import));
            }
            ConstValue::Object(obj) => {
                let name = match obj.get("name") {
                    Some(ConstValue::String(s)) => s.trim_start_matches('@'),
                    _ => continue,
                };

                let r#as = match obj.get("as") {
                    Some(ConstValue::String(s)) => s.trim_start_matches('@'),
                    _ => name,
                };

                out.push((name, r#as));
            }
            _ => (),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher_for(sdl: &str, run: impl FnOnce(&DirectiveMatcher<'_>)) {
        let document = crate::parse_schema(sdl).unwrap();
        let matcher = DirectiveMatcher::new(&document, None);
        run(&matcher);
    }

    #[test]
    fn imports_with_renaming() {
        let sdl = r#"
            extend schema @link(url: "https://specs.apollo.dev/federation/v2.3", import: [{ name: "@shareable", as: "@federationShareable" }, "@key"])

            type Query { a: String }
        "#;

        matcher_for(sdl, |matcher| {
            assert_eq!(matcher.canonical_name("federationShareable"), "shareable");
            assert_eq!(matcher.canonical_name("key"), "key");
            assert_eq!(matcher.canonical_name("federation__external"), "external");
            assert_eq!(matcher.canonical_name("shareable"), "shareable");
        });
    }

    #[test]
    fn link_with_as_prefix() {
        let sdl = r#"
            extend schema @link(url: "https://specs.apollo.dev/federation/v2.3", as: "fed")

            type Query { a: String }
        "#;

        matcher_for(sdl, |matcher| {
            assert_eq!(matcher.canonical_name("fed__key"), "key");
            assert_eq!(matcher.canonical_name("federation__key"), "federation__key");
        });
    }

    #[test]
    fn override_alias() {
        let document = crate::parse_schema("type Query { a: String }").unwrap();
        let matcher = DirectiveMatcher::new(&document, Some("@takeOver"));
        assert_eq!(matcher.canonical_name("takeOver"), "override");
    }
}
