use async_graphql_parser::types as ast;
use async_graphql_value::ConstValue;
use std::fmt::{self, Write as _};

/// `1` -> `1st`, `2` -> `2nd`, `11` -> `11th`, `23` -> `23rd`.
pub(crate) fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };

    format!("{n}{suffix}")
}

/// Render a type reference the way it is written in SDL, e.g. `[[String!]!]!`.
pub(crate) fn render_type(ty: &ast::Type) -> String {
    let mut out = String::new();
    write_type(&mut out, ty).ok();
    out
}

fn write_type(out: &mut String, ty: &ast::Type) -> fmt::Result {
    match &ty.base {
        ast::BaseType::Named(name) => out.write_str(name.as_str())?,
        ast::BaseType::List(inner) => {
            out.write_char('[')?;
            write_type(out, inner)?;
            out.write_char(']')?;
        }
    }

    if !ty.nullable {
        out.write_char('!')?;
    }

    Ok(())
}

/// The innermost named type of a type reference.
pub(crate) fn named_type(ty: &ast::Type) -> &str {
    match &ty.base {
        ast::BaseType::Named(name) => name.as_str(),
        ast::BaseType::List(inner) => named_type(inner),
    }
}

pub(crate) fn named_type_mut(ty: &mut ast::Type) -> &mut async_graphql_value::Name {
    match &mut ty.base {
        ast::BaseType::Named(name) => name,
        ast::BaseType::List(inner) => named_type_mut(inner),
    }
}

/// Print a value in GraphQL syntax.
pub(crate) fn print_value(value: &ConstValue) -> String {
    let mut out = String::new();
    write_value(&mut out, value).ok();
    out
}

pub(crate) fn write_value(out: &mut impl fmt::Write, value: &ConstValue) -> fmt::Result {
    match value {
        ConstValue::Null => out.write_str("null"),
        ConstValue::Number(number) => write!(out, "{number}"),
        ConstValue::String(string) => write_quoted(out, string),
        ConstValue::Boolean(true) => out.write_str("true"),
        ConstValue::Boolean(false) => out.write_str("false"),
        ConstValue::Binary(bytes) => write_quoted(out, &String::from_utf8_lossy(bytes)),
        ConstValue::Enum(name) => out.write_str(name.as_str()),
        ConstValue::List(items) => {
            out.write_char('[')?;
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.write_str(", ")?;
                }
                write_value(out, item)?;
            }
            out.write_char(']')
        }
        ConstValue::Object(fields) => {
            out.write_char('{')?;
            for (idx, (name, item)) in fields.iter().enumerate() {
                if idx > 0 {
                    out.write_str(", ")?;
                }
                out.write_str(name.as_str())?;
                out.write_str(": ")?;
                write_value(out, item)?;
            }
            out.write_char('}')
        }
    }
}

pub(crate) fn write_quoted(out: &mut impl fmt::Write, s: &str) -> fmt::Result {
    out.write_char('"')?;
    for c in s.chars() {
        match c {
            '\r' => out.write_str("\\r"),
            '\n' => out.write_str("\\n"),
            '\t' => out.write_str("\\t"),
            '\\' => out.write_str("\\\\"),
            '"' => out.write_str("\\\""),
            c if c.is_control() => write!(out, "\\u{:04x}", c as u32),
            c => out.write_char(c),
        }?
    }
    out.write_char('"')
}

pub(crate) fn string_argument<'a>(directive: &'a ast::ConstDirective, name: &str) -> Option<&'a str> {
    match &directive.get_argument(name)?.node {
        ConstValue::String(value) => Some(value.as_str()),
        _ => None,
    }
}

pub(crate) fn has_directive(directives: &[async_graphql_parser::Positioned<ast::ConstDirective>], name: &str) -> bool {
    directives.iter().any(|directive| directive.node.name.node == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, "1st")]
    #[case(2, "2nd")]
    #[case(3, "3rd")]
    #[case(4, "4th")]
    #[case(11, "11th")]
    #[case(12, "12th")]
    #[case(13, "13th")]
    #[case(21, "21st")]
    #[case(102, "102nd")]
    #[case(111, "111th")]
    fn ordinals(#[case] n: usize, #[case] expected: &str) {
        assert_eq!(ordinal(n), expected);
    }

    #[test]
    fn type_rendering() {
        let ty = ast::Type::new("[[String!]!]!").unwrap();
        assert_eq!(render_type(&ty), "[[String!]!]!");
        assert_eq!(named_type(&ty), "String");
    }

    #[test]
    fn value_printing() {
        let value = ConstValue::List(vec![
            ConstValue::String("a\"b".to_owned()),
            ConstValue::Enum(async_graphql_value::Name::new("B")),
            ConstValue::Null,
        ]);

        assert_eq!(print_value(&value), r#"["a\"b", B, null]"#);
    }
}
