use async_graphql_parser::{
    types::{ServiceDocument, TypeSystemDefinition},
    Pos,
};

/// One subgraph to normalize and compose.
///
/// Parsing happens here, at the boundary: the normalizer and the composer only ever see parsed
/// documents.
#[derive(Debug, Clone)]
pub struct Subgraph {
    /// Unique within one composition run.
    pub name: String,
    pub url: String,
    pub definitions: ServiceDocument,
}

impl Subgraph {
    /// A subgraph from an already parsed document. Documents should come from [parse_schema()].
    pub fn new(name: impl Into<String>, url: impl Into<String>, definitions: ServiceDocument) -> Self {
        Subgraph {
            name: name.into(),
            url: url.into(),
            definitions,
        }
    }

    /// Parse the SDL of a subgraph.
    pub fn from_sdl(
        name: impl Into<String>,
        url: impl Into<String>,
        sdl: &str,
    ) -> Result<Self, async_graphql_parser::Error> {
        let definitions = parse_schema(sdl)?;
        Ok(Subgraph::new(name, url, definitions))
    }
}

/// Parse SDL into a document.
///
/// async-graphql-parser flags every directive definition as repeatable, so the flag is read back
/// from the source text between the directive name and its first location.
pub fn parse_schema(sdl: &str) -> Result<ServiceDocument, async_graphql_parser::Error> {
    let mut document = async_graphql_parser::parse_schema(sdl)?;

    for definition in &mut document.definitions {
        let TypeSystemDefinition::Directive(definition) = definition else {
            continue;
        };

        let definition = &mut definition.node;
        let start = byte_offset(sdl, definition.name.pos);
        let end = definition
            .locations
            .first()
            .and_then(|location| byte_offset(sdl, location.pos));

        definition.is_repeatable = match (start, end) {
            (Some(start), Some(end)) => sdl.get(start..end).is_some_and(declares_repeatable),
            _ => false,
        };
    }

    Ok(document)
}

/// `text` runs from the directive name up to its first location.
fn declares_repeatable(text: &str) -> bool {
    let text = text.trim_end();
    let text = text.strip_suffix('|').unwrap_or(text).trim_end();

    let Some(text) = text.strip_suffix("on") else {
        return false;
    };

    let Some(before) = text.trim_end().strip_suffix("repeatable") else {
        return false;
    };

    // An empty prefix means `repeatable` is the directive name itself.
    before.ends_with(|c: char| c.is_whitespace() || c == ')' || c == ',')
}

fn byte_offset(sdl: &str, pos: Pos) -> Option<usize> {
    let line_start = match pos.line.checked_sub(2) {
        None => 0,
        Some(newlines) => sdl.match_indices('\n').nth(newlines)?.0 + 1,
    };

    let column = sdl
        .get(line_start..)?
        .char_indices()
        .nth(pos.column.checked_sub(1)?)?
        .0;

    Some(line_start + column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_graphql_parser::types::DirectiveDefinition;

    fn directive_definitions(sdl: &str) -> Vec<(String, bool)> {
        parse_schema(sdl)
            .unwrap()
            .definitions
            .into_iter()
            .filter_map(|definition| match definition {
                TypeSystemDefinition::Directive(definition) => {
                    let DirectiveDefinition {
                        name, is_repeatable, ..
                    } = definition.node;
                    Some((name.node.to_string(), is_repeatable))
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn repeatable_is_read_from_the_source() {
        let definitions = directive_definitions(
            r#"
            directive @a on FIELD_DEFINITION
            directive @b repeatable on FIELD_DEFINITION
            directive @c(reason: String = "repeatable") on
              | OBJECT
              | INTERFACE
            directive @d(fields: String!)repeatable on OBJECT
            "A description mentioning repeatable"
            directive @repeatable on ENUM
            directive @e
              repeatable
              on SCALAR
            "#,
        );

        assert_eq!(
            definitions,
            [
                ("a".to_owned(), false),
                ("b".to_owned(), true),
                ("c".to_owned(), false),
                ("d".to_owned(), true),
                ("repeatable".to_owned(), false),
                ("e".to_owned(), true),
            ]
        );
    }

    #[test]
    fn positions_count_characters() {
        let definitions = directive_definitions(
            "\"Über\" directive @a repeatable on OBJECT\ndirective @b on OBJECT\n",
        );

        assert_eq!(definitions, [("a".to_owned(), true), ("b".to_owned(), false)]);
    }
}
