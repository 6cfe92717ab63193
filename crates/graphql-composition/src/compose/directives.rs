use crate::{federated_graph::Directives, subgraphs::DirectiveSite};

/// Merge the directives of the instances of one site, in subgraph order.
///
/// `@inaccessible` anywhere makes the site inaccessible, tags accumulate and the first
/// deprecation reason wins.
pub(crate) fn merge_directives<'a>(sites: impl IntoIterator<Item = &'a DirectiveSite>) -> Directives {
    let mut directives = Directives::default();

    for site in sites {
        directives.inaccessible |= site.inaccessible;
        directives.tags.extend(site.tags.iter().cloned());

        if let Some(reason) = &site.deprecated {
            if !matches!(directives.deprecated, Some(Some(_))) {
                directives.deprecated = Some(reason.clone());
            }
        }
    }

    directives
}

/// The first description, in subgraph order.
pub(crate) fn first_description<'a>(descriptions: impl IntoIterator<Item = Option<&'a str>>) -> Option<String> {
    descriptions.into_iter().flatten().next().map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(inaccessible: bool, tags: &[&str], deprecated: Option<Option<&str>>) -> DirectiveSite {
        DirectiveSite {
            inaccessible,
            tags: tags.iter().map(|tag| (*tag).to_owned()).collect(),
            deprecated: deprecated.map(|reason| reason.map(str::to_owned)),
        }
    }

    #[test]
    fn inaccessible_anywhere_and_tag_union() {
        let merged = merge_directives(&[site(false, &["b", "a"], None), site(true, &["a", "c"], None)]);

        assert!(merged.inaccessible);
        assert_eq!(merged.tags.into_iter().collect::<Vec<_>>(), ["a", "b", "c"]);
        assert_eq!(merged.deprecated, None);
    }

    #[test]
    fn first_deprecation_reason_wins() {
        let merged = merge_directives(&[
            site(false, &[], None),
            site(false, &[], Some(None)),
            site(false, &[], Some(Some("first"))),
            site(false, &[], Some(Some("second"))),
        ]);

        assert_eq!(merged.deprecated, Some(Some("first".to_owned())));

        let merged = merge_directives(&[site(false, &[], Some(None))]);
        assert_eq!(merged.deprecated, Some(None));
    }

    #[test]
    fn descriptions() {
        assert_eq!(first_description([None, Some("b"), Some("c")]).as_deref(), Some("b"));
        assert_eq!(first_description([None, None]), None);
    }
}
