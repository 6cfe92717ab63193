//! Merging of the types of one field, argument or input field across subgraphs.
//!
//! The named type and the list structure must be identical. Only nullability may differ, at any
//! wrapping level.

use async_graphql_parser::types as ast;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Position {
    /// Field types: the merged type is nullable where any instance is.
    Output,
    /// Argument and input field types: the merged type is nullable only where all instances are.
    Input,
}

/// `None` if the types are incompatible.
pub(crate) fn merge_types(a: &ast::Type, b: &ast::Type, position: Position) -> Option<ast::Type> {
    let base = match (&a.base, &b.base) {
        (ast::BaseType::Named(a), ast::BaseType::Named(b)) if a == b => ast::BaseType::Named(a.clone()),
        (ast::BaseType::List(a), ast::BaseType::List(b)) => {
            ast::BaseType::List(Box::new(merge_types(a, b, position)?))
        }
        _ => return None,
    };

    let nullable = match position {
        Position::Output => a.nullable || b.nullable,
        Position::Input => a.nullable && b.nullable,
    };

    Some(ast::Type { base, nullable })
}
