//! Deterministic SDL printing of a service document.

use super::builtins::location_str;
use crate::utils::{render_type, write_quoted, write_value};
use async_graphql_parser::{types as ast, Positioned};
use std::fmt::{self, Write};

const INDENT: &str = "  ";

pub(crate) fn write_service_document(out: &mut impl Write, document: &ast::ServiceDocument) -> fmt::Result {
    for (idx, definition) in document.definitions.iter().enumerate() {
        if idx > 0 {
            out.write_char('\n')?;
        }

        match definition {
            ast::TypeSystemDefinition::Schema(schema) => write_schema_definition(out, &schema.node)?,
            ast::TypeSystemDefinition::Directive(directive) => write_directive_definition(out, &directive.node)?,
            ast::TypeSystemDefinition::Type(definition) => write_type_definition(out, &definition.node)?,
        }
    }

    Ok(())
}

fn write_schema_definition(out: &mut impl Write, schema: &ast::SchemaDefinition) -> fmt::Result {
    let operations = [
        ("query", &schema.query),
        ("mutation", &schema.mutation),
        ("subscription", &schema.subscription),
    ];

    if operations.iter().all(|(_, name)| name.is_none()) {
        out.write_str("extend schema")?;
        write_directives(out, &schema.directives)?;
        return out.write_char('\n');
    }

    out.write_str("schema")?;
    write_directives(out, &schema.directives)?;
    out.write_str(" {\n")?;

    for (operation, name) in operations {
        if let Some(name) = name {
            writeln!(out, "{INDENT}{operation}: {}", name.node)?;
        }
    }

    out.write_str("}\n")
}

fn write_directive_definition(out: &mut impl Write, definition: &ast::DirectiveDefinition) -> fmt::Result {
    write_description(out, definition.description.as_ref(), "")?;
    write!(out, "directive @{}", definition.name.node)?;

    if !definition.arguments.is_empty() {
        out.write_char('(')?;
        for (idx, argument) in definition.arguments.iter().enumerate() {
            if idx > 0 {
                out.write_str(", ")?;
            }
            write_input_value(out, &argument.node)?;
        }
        out.write_char(')')?;
    }

    if definition.is_repeatable {
        out.write_str(" repeatable")?;
    }

    out.write_str(" on ")?;

    for (idx, location) in definition.locations.iter().enumerate() {
        if idx > 0 {
            out.write_str(" | ")?;
        }
        out.write_str(location_str(location.node))?;
    }

    out.write_char('\n')
}

fn write_type_definition(out: &mut impl Write, definition: &ast::TypeDefinition) -> fmt::Result {
    // Extensions cannot carry a description.
    if !definition.extend {
        write_description(out, definition.description.as_ref(), "")?;
    }

    let keyword = match &definition.kind {
        ast::TypeKind::Scalar => "scalar",
        ast::TypeKind::Object(_) => "type",
        ast::TypeKind::Interface(_) => "interface",
        ast::TypeKind::Union(_) => "union",
        ast::TypeKind::Enum(_) => "enum",
        ast::TypeKind::InputObject(_) => "input",
    };

    if definition.extend {
        out.write_str("extend ")?;
    }

    write!(out, "{keyword} {}", definition.name.node)?;

    match &definition.kind {
        ast::TypeKind::Scalar => {
            write_directives(out, &definition.directives)?;
            out.write_char('\n')
        }
        ast::TypeKind::Object(ast::ObjectType { implements, fields })
        | ast::TypeKind::Interface(ast::InterfaceType { implements, fields }) => {
            write_implements(out, implements)?;
            write_directives(out, &definition.directives)?;
            out.write_str(" {\n")?;

            for field in fields {
                write_description(out, field.node.description.as_ref(), INDENT)?;
                write!(out, "{INDENT}{}", field.node.name.node)?;

                if !field.node.arguments.is_empty() {
                    out.write_char('(')?;
                    for (idx, argument) in field.node.arguments.iter().enumerate() {
                        if idx > 0 {
                            out.write_str(", ")?;
                        }
                        write_input_value(out, &argument.node)?;
                    }
                    out.write_char(')')?;
                }

                write!(out, ": {}", render_type(&field.node.ty.node))?;
                write_directives(out, &field.node.directives)?;
                out.write_char('\n')?;
            }

            out.write_str("}\n")
        }
        ast::TypeKind::Union(union) => {
            write_directives(out, &definition.directives)?;

            for (idx, member) in union.members.iter().enumerate() {
                out.write_str(if idx == 0 { " = " } else { " | " })?;
                out.write_str(member.node.as_str())?;
            }

            out.write_char('\n')
        }
        ast::TypeKind::Enum(enum_type) => {
            write_directives(out, &definition.directives)?;
            out.write_str(" {\n")?;

            for value in &enum_type.values {
                write_description(out, value.node.description.as_ref(), INDENT)?;
                write!(out, "{INDENT}{}", value.node.value.node)?;
                write_directives(out, &value.node.directives)?;
                out.write_char('\n')?;
            }

            out.write_str("}\n")
        }
        ast::TypeKind::InputObject(input_object) => {
            write_directives(out, &definition.directives)?;
            out.write_str(" {\n")?;

            for field in &input_object.fields {
                write_description(out, field.node.description.as_ref(), INDENT)?;
                out.write_str(INDENT)?;
                write_input_value(out, &field.node)?;
                out.write_char('\n')?;
            }

            out.write_str("}\n")
        }
    }
}

fn write_implements(out: &mut impl Write, implements: &[Positioned<async_graphql_value::Name>]) -> fmt::Result {
    for (idx, implemented) in implements.iter().enumerate() {
        out.write_str(if idx == 0 { " implements " } else { " & " })?;
        out.write_str(implemented.node.as_str())?;
    }

    Ok(())
}

fn write_input_value(out: &mut impl Write, input_value: &ast::InputValueDefinition) -> fmt::Result {
    write!(out, "{}: {}", input_value.name.node, render_type(&input_value.ty.node))?;

    if let Some(default_value) = &input_value.default_value {
        out.write_str(" = ")?;
        write_value(out, &default_value.node)?;
    }

    write_directives(out, &input_value.directives)
}

fn write_description(out: &mut impl Write, description: Option<&Positioned<String>>, indent: &str) -> fmt::Result {
    let Some(description) = description else {
        return Ok(());
    };

    out.write_str(indent)?;
    write_quoted(out, &description.node)?;
    out.write_char('\n')
}

pub(crate) fn write_directives(out: &mut impl Write, directives: &[Positioned<ast::ConstDirective>]) -> fmt::Result {
    for directive in directives {
        write!(out, " @{}", directive.node.name.node)?;

        if directive.node.arguments.is_empty() {
            continue;
        }

        out.write_char('(')?;
        for (idx, (name, value)) in directive.node.arguments.iter().enumerate() {
            if idx > 0 {
                out.write_str(", ")?;
            }
            write!(out, "{}: ", name.node)?;
            write_value(out, &value.node)?;
        }
        out.write_char(')')?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{normalize_subgraph, NormalizationOptions};

    const SCHEMA: &str = r#"
        extend schema @link(url: "https://specs.apollo.dev/federation/v2.3", import: ["@key", "@shareable"])

        directive @custom(values: [String!]! = ["a"]) repeatable on FIELD_DEFINITION | OBJECT

        "The root"
        type Query {
          "Fetch a user"
          user(id: ID!, filter: Filter = { active: true }): User @custom(values: "x")
          search: [SearchResult!]!
        }

        extend type Query {
          status: Status @deprecated
        }

        type User @key(fields: "id") @shareable {
          id: ID!
          name: String
        }

        union SearchResult = User

        enum Status { ACTIVE INACTIVE @deprecated(reason: "gone") }

        input Filter { active: Boolean, name: String }

        scalar DateTime @specifiedBy(url: "https://example.com")
    "#;

    #[test]
    fn normalized_sdl_round_trips() {
        let options = NormalizationOptions::default();
        let document = crate::parse_schema(SCHEMA).unwrap();
        let first = normalize_subgraph(&document, &options).into_result().unwrap().sdl();

        insta::assert_snapshot!(first, @r###"
        extend schema @link(url: "https://specs.apollo.dev/federation/v2.3", import: ["@key", "@shareable"])

        directive @custom(values: [String!]! = ["a"]) repeatable on FIELD_DEFINITION | OBJECT

        "The root"
        type Query {
          "Fetch a user"
          user(id: ID!, filter: Filter = {active: true}): User @custom(values: ["x"])
          search: [SearchResult!]!
          status: Status @deprecated
        }

        type User @key(fields: "id") @shareable {
          id: ID!
          name: String
        }

        union SearchResult = User

        enum Status {
          ACTIVE
          INACTIVE @deprecated(reason: "gone")
        }

        input Filter {
          active: Boolean
          name: String
        }

        scalar DateTime @specifiedBy(url: "https://example.com")
        "###);

        let reparsed = crate::parse_schema(&first).unwrap();
        let second = normalize_subgraph(&reparsed, &options).into_result().unwrap().sdl();

        assert_eq!(first, second);
    }
}
