use super::*;
use crate::{
    normalization::{BUILTIN_SCALARS, DEFAULT_DEPRECATION_REASON},
    utils::{render_type, write_quoted, write_value},
};
use std::fmt::{self, Write as _};

const INDENT: &str = "  ";

const TYPE_SYSTEM_LOCATIONS: &str =
    "FIELD_DEFINITION | OBJECT | INTERFACE | UNION | ARGUMENT_DEFINITION | SCALAR | ENUM | ENUM_VALUE | INPUT_OBJECT | INPUT_FIELD_DEFINITION";

/// Render the router schema. It includes `@key`, `@tag`, `@inaccessible` and `@deprecated`.
pub(super) fn render_federated_sdl(graph: &FederatedGraph) -> String {
    Renderer { graph, api: false }.to_string()
}

/// Render a GraphQL SDL string for a federated graph. It does not include any
/// federation-specific directives, it only reflects the final API schema as visible
/// for consumers.
pub(super) fn render_api_sdl(graph: &FederatedGraph) -> String {
    Renderer { graph, api: true }.to_string()
}

struct Renderer<'a> {
    graph: &'a FederatedGraph,
    api: bool,
}

impl fmt::Display for Renderer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut write_leading_whitespace = {
            let mut first_block = true;
            move |f: &mut fmt::Formatter<'_>| {
                if first_block {
                    first_block = false;
                    Ok(())
                } else {
                    f.write_char('\n')
                }
            }
        };

        if !self.api {
            for definition in [
                "directive @key(fields: FieldSet!, resolvable: Boolean = true) repeatable on OBJECT | INTERFACE\n"
                    .to_owned(),
                format!("directive @tag(name: String!) repeatable on {TYPE_SYSTEM_LOCATIONS}\n"),
                format!("directive @inaccessible on {TYPE_SYSTEM_LOCATIONS}\n"),
                "scalar FieldSet\n".to_owned(),
            ] {
                write_leading_whitespace(f)?;
                f.write_str(&definition)?;
            }
        }

        for definition in self.graph.definitions.values() {
            if self.api && definition.is_inaccessible() {
                continue;
            }

            if let Definition::Scalar(scalar) = definition {
                if BUILTIN_SCALARS.contains(&scalar.name.as_str()) {
                    continue;
                }
            }

            write_leading_whitespace(f)?;
            self.write_definition(f, definition)?;
        }

        Ok(())
    }
}

impl Renderer<'_> {
    fn write_definition(&self, f: &mut fmt::Formatter<'_>, definition: &Definition) -> fmt::Result {
        match definition {
            Definition::Object(object) => {
                write_description(f, object.description.as_deref(), "")?;
                write!(f, "type {}", object.name)?;
                self.write_implements(f, &object.implements)?;
                self.write_keys(f, &object.keys)?;
                self.write_directives(f, &object.directives)?;
                self.write_fields(f, &object.fields)
            }
            Definition::Interface(interface) => {
                write_description(f, interface.description.as_deref(), "")?;
                write!(f, "interface {}", interface.name)?;
                self.write_implements(f, &interface.implements)?;
                self.write_keys(f, &interface.keys)?;
                self.write_directives(f, &interface.directives)?;
                self.write_fields(f, &interface.fields)
            }
            Definition::Union(union) => {
                write_description(f, union.description.as_deref(), "")?;
                write!(f, "union {}", union.name)?;
                self.write_directives(f, &union.directives)?;

                let members = union.members.iter().filter(|member| self.is_accessible_type(member));

                for (idx, member) in members.enumerate() {
                    f.write_str(if idx == 0 { " = " } else { " | " })?;
                    f.write_str(member)?;
                }

                f.write_char('\n')
            }
            Definition::Enum(r#enum) => {
                write_description(f, r#enum.description.as_deref(), "")?;
                write!(f, "enum {}", r#enum.name)?;
                self.write_directives(f, &r#enum.directives)?;

                write_block(f, |f| {
                    for value in r#enum.values.values() {
                        if self.api && value.directives.inaccessible {
                            continue;
                        }

                        write_description(f, value.description.as_deref(), INDENT)?;
                        write!(f, "{INDENT}{}", value.name)?;
                        self.write_directives(f, &value.directives)?;
                        f.write_char('\n')?;
                    }

                    Ok(())
                })
            }
            Definition::Scalar(scalar) => {
                write_description(f, scalar.description.as_deref(), "")?;
                write!(f, "scalar {}", scalar.name)?;
                self.write_directives(f, &scalar.directives)?;
                f.write_char('\n')
            }
            Definition::InputObject(input_object) => {
                write_description(f, input_object.description.as_deref(), "")?;
                write!(f, "input {}", input_object.name)?;
                self.write_directives(f, &input_object.directives)?;

                write_block(f, |f| {
                    for field in input_object.fields.values() {
                        if self.api && field.directives.inaccessible {
                            continue;
                        }

                        write_description(f, field.description.as_deref(), INDENT)?;
                        f.write_str(INDENT)?;
                        self.write_input_value(f, field)?;
                        f.write_char('\n')?;
                    }

                    Ok(())
                })
            }
        }
    }

    fn write_fields(&self, f: &mut fmt::Formatter<'_>, fields: &BTreeMap<String, Field>) -> fmt::Result {
        write_block(f, |f| {
            for field in fields.values() {
                if self.api && field.directives.inaccessible {
                    continue;
                }

                write_description(f, field.description.as_deref(), INDENT)?;
                write!(f, "{INDENT}{}", field.name)?;

                let arguments: Vec<_> = field
                    .arguments
                    .iter()
                    .filter(|argument| !(self.api && argument.directives.inaccessible))
                    .collect();

                if !arguments.is_empty() {
                    f.write_char('(')?;
                    for (idx, argument) in arguments.into_iter().enumerate() {
                        if idx > 0 {
                            f.write_str(", ")?;
                        }
                        self.write_input_value(f, argument)?;
                    }
                    f.write_char(')')?;
                }

                write!(f, ": {}", render_type(&field.ty))?;
                self.write_directives(f, &field.directives)?;
                f.write_char('\n')?;
            }

            Ok(())
        })
    }

    fn write_input_value(&self, f: &mut fmt::Formatter<'_>, input_value: &InputValue) -> fmt::Result {
        write!(f, "{}: {}", input_value.name, render_type(&input_value.ty))?;

        if let Some(default_value) = &input_value.default_value {
            f.write_str(" = ")?;
            write_value(f, default_value)?;
        }

        self.write_directives(f, &input_value.directives)
    }

    fn write_implements(&self, f: &mut fmt::Formatter<'_>, implements: &BTreeSet<String>) -> fmt::Result {
        let implements = implements.iter().filter(|interface| self.is_accessible_type(interface));

        for (idx, interface) in implements.enumerate() {
            f.write_str(if idx == 0 { " implements " } else { " & " })?;
            f.write_str(interface)?;
        }

        Ok(())
    }

    /// One `@key` per distinct selection set. It is only unresolvable if no subgraph resolves it.
    fn write_keys(&self, f: &mut fmt::Formatter<'_>, keys: &[Key]) -> fmt::Result {
        if self.api {
            return Ok(());
        }

        let mut selection_sets: Vec<(&str, bool)> = Vec::new();

        for key in keys {
            match selection_sets
                .iter_mut()
                .find(|(selection_set, _)| *selection_set == key.selection_set)
            {
                Some((_, resolvable)) => *resolvable |= key.resolvable,
                None => selection_sets.push((&key.selection_set, key.resolvable)),
            }
        }

        for (selection_set, resolvable) in selection_sets {
            f.write_str(" @key(fields: ")?;
            write_quoted(f, selection_set)?;
            if !resolvable {
                f.write_str(", resolvable: false")?;
            }
            f.write_char(')')?;
        }

        Ok(())
    }

    fn write_directives(&self, f: &mut fmt::Formatter<'_>, directives: &Directives) -> fmt::Result {
        if !self.api {
            for tag in &directives.tags {
                f.write_str(" @tag(name: ")?;
                write_quoted(f, tag)?;
                f.write_char(')')?;
            }

            if directives.inaccessible {
                f.write_str(" @inaccessible")?;
            }
        }

        match &directives.deprecated {
            None => Ok(()),
            Some(Some(reason)) if reason != DEFAULT_DEPRECATION_REASON => {
                f.write_str(" @deprecated(reason: ")?;
                write_quoted(f, reason)?;
                f.write_char(')')
            }
            Some(_) => f.write_str(" @deprecated"),
        }
    }

    fn is_accessible_type(&self, name: &str) -> bool {
        !self.api
            || !self
                .graph
                .definitions
                .get(name)
                .is_some_and(|definition| definition.is_inaccessible())
    }
}

fn write_block(
    f: &mut fmt::Formatter<'_>,
    inner: impl FnOnce(&mut fmt::Formatter<'_>) -> fmt::Result,
) -> fmt::Result {
    f.write_str(" {\n")?;
    inner(f)?;
    f.write_str("}\n")
}

fn write_description(f: &mut fmt::Formatter<'_>, description: Option<&str>, indent: &str) -> fmt::Result {
    let Some(description) = description else {
        return Ok(());
    };

    f.write_str(indent)?;
    write_quoted(f, description)?;
    f.write_char('\n')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_type(nullable: bool) -> ast::Type {
        ast::Type {
            base: ast::BaseType::Named(async_graphql_value::Name::new("String")),
            nullable,
        }
    }

    fn field(name: &str, directives: Directives) -> Field {
        Field {
            name: name.to_owned(),
            description: None,
            ty: string_type(true),
            arguments: Vec::new(),
            directives,
            resolvable_in: vec!["a".to_owned()],
            provides: Vec::new(),
            requires: Vec::new(),
            r#override: None,
        }
    }

    fn graph() -> FederatedGraph {
        let mut definitions = BTreeMap::new();

        let secret = Directives {
            inaccessible: true,
            ..Default::default()
        };
        let deprecated = Directives {
            tags: BTreeSet::from(["public".to_owned()]),
            deprecated: Some(Some("use b".to_owned())),
            ..Default::default()
        };

        definitions.insert(
            "Query".to_owned(),
            Definition::Object(Object {
                name: "Query".to_owned(),
                fields: BTreeMap::from([
                    ("a".to_owned(), field("a", deprecated)),
                    ("b".to_owned(), field("b", Directives::default())),
                    ("secret".to_owned(), field("secret", secret)),
                ]),
                subgraphs: vec!["a".to_owned()],
                ..Default::default()
            }),
        );

        definitions.insert(
            "User".to_owned(),
            Definition::Object(Object {
                name: "User".to_owned(),
                description: Some("A user".to_owned()),
                keys: vec![
                    Key {
                        subgraph_name: "a".to_owned(),
                        selection_set: "id".to_owned(),
                        resolvable: true,
                    },
                    Key {
                        subgraph_name: "b".to_owned(),
                        selection_set: "id".to_owned(),
                        resolvable: false,
                    },
                ],
                fields: BTreeMap::from([("id".to_owned(), field("id", Directives::default()))]),
                subgraphs: vec!["a".to_owned(), "b".to_owned()],
                ..Default::default()
            }),
        );

        definitions.insert(
            "String".to_owned(),
            Definition::Scalar(Scalar {
                name: "String".to_owned(),
                ..Default::default()
            }),
        );

        FederatedGraph {
            subgraphs: Vec::new(),
            definitions,
        }
    }

    #[test]
    fn federated_sdl() {
        insta::assert_snapshot!(graph().render_federated_sdl(), @r###"
        directive @key(fields: FieldSet!, resolvable: Boolean = true) repeatable on OBJECT | INTERFACE

        directive @tag(name: String!) repeatable on FIELD_DEFINITION | OBJECT | INTERFACE | UNION | ARGUMENT_DEFINITION | SCALAR | ENUM | ENUM_VALUE | INPUT_OBJECT | INPUT_FIELD_DEFINITION

        directive @inaccessible on FIELD_DEFINITION | OBJECT | INTERFACE | UNION | ARGUMENT_DEFINITION | SCALAR | ENUM | ENUM_VALUE | INPUT_OBJECT | INPUT_FIELD_DEFINITION

        scalar FieldSet

        type Query {
          a: String @tag(name: "public") @deprecated(reason: "use b")
          b: String
          secret: String @inaccessible
        }

        "A user"
        type User @key(fields: "id") {
          id: String
        }
        "###);
    }

    #[test]
    fn api_sdl() {
        insta::assert_snapshot!(graph().render_api_sdl(), @r###"
        type Query {
          a: String @deprecated(reason: "use b")
          b: String
        }

        "A user"
        type User {
          id: String
        }
        "###);
    }
}
