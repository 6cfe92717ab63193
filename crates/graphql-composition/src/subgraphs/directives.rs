use crate::{normalization, utils};
use async_graphql_parser::{types as ast, Positioned};

/// The directives the composer cares about on any site: a type, a field, an argument, an enum
/// value or an input field.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct DirectiveSite {
    pub(crate) inaccessible: bool,
    /// In declaration order, deduplicated.
    pub(crate) tags: Vec<String>,
    /// `Some` if `@deprecated` is applied, with the reason if provided.
    pub(crate) deprecated: Option<Option<String>>,
}

impl DirectiveSite {
    pub(crate) fn from_ast(directives: &[Positioned<ast::ConstDirective>]) -> Self {
        let mut site = DirectiveSite::default();

        for directive in directives {
            let directive = &directive.node;

            match directive.name.node.as_str() {
                normalization::INACCESSIBLE => site.inaccessible = true,
                normalization::TAG => {
                    if let Some(name) = utils::string_argument(directive, "name") {
                        if !site.tags.iter().any(|tag| tag == name) {
                            site.tags.push(name.to_owned());
                        }
                    }
                }
                normalization::DEPRECATED => {
                    site.deprecated = Some(utils::string_argument(directive, "reason").map(str::to_owned));
                }
                _ => (),
            }
        }

        site
    }
}
