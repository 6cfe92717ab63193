//! Input value coercion for directive arguments.

use super::builtins::{INACCESSIBLE, SCOPE_SCALAR};
use crate::utils;
use async_graphql_parser::{types as ast, Positioned};
use async_graphql_value::{ConstValue, Name};
use indexmap::IndexMap;

/// Values for these types are opaque to the normalizer.
const OPAQUE_TYPES: &[&str] = &["link__Import", "link__Purpose", "_Any"];

const FIELD_SET_TYPES: &[&str] = &["FieldSet", "_FieldSet", "federation__FieldSet", "openfed__FieldSet"];

pub(super) struct Coercer<'a> {
    pub(super) types: &'a IndexMap<String, Positioned<ast::TypeDefinition>>,
}

impl Coercer<'_> {
    /// Coerce a value into `ty`. A bare value where a list is expected becomes a single-item list,
    /// at every level of list nesting. Returns `None` if the value is not valid for the type.
    pub(super) fn coerce(&self, value: &ConstValue, ty: &ast::Type) -> Option<ConstValue> {
        if let ConstValue::Null = value {
            return ty.nullable.then_some(ConstValue::Null);
        }

        match &ty.base {
            ast::BaseType::List(inner) => match value {
                ConstValue::List(items) => items
                    .iter()
                    .map(|item| self.coerce(item, inner))
                    .collect::<Option<Vec<_>>>()
                    .map(ConstValue::List),
                value => self.coerce(value, inner).map(|item| ConstValue::List(vec![item])),
            },
            ast::BaseType::Named(name) => self.coerce_named(value, name.as_str()),
        }
    }

    fn coerce_named(&self, value: &ConstValue, type_name: &str) -> Option<ConstValue> {
        let is_valid = match (type_name, value) {
            ("Int", ConstValue::Number(number)) => number
                .as_i64()
                .map(|int| i32::try_from(int).is_ok())
                .unwrap_or_default(),
            ("Float", ConstValue::Number(_))
            | ("String", ConstValue::String(_))
            | ("Boolean", ConstValue::Boolean(_))
            | ("ID", ConstValue::String(_)) => true,
            ("ID", ConstValue::Number(number)) => number.is_i64() || number.is_u64(),
            ("Int" | "Float" | "String" | "Boolean" | "ID", _) => false,
            (name, ConstValue::String(_)) if FIELD_SET_TYPES.contains(&name) => true,
            (name, _) if FIELD_SET_TYPES.contains(&name) => false,
            (SCOPE_SCALAR, value) => matches!(value, ConstValue::String(_)),
            (name, _) if OPAQUE_TYPES.contains(&name) => true,
            (name, value) => return self.coerce_defined(value, name),
        };

        is_valid.then(|| value.clone())
    }

    fn coerce_defined(&self, value: &ConstValue, type_name: &str) -> Option<ConstValue> {
        // Undefined types are reported separately.
        let Some(definition) = self.types.get(type_name) else {
            return Some(value.clone());
        };

        match (&definition.node.kind, value) {
            (ast::TypeKind::Scalar, value) => Some(value.clone()),
            (ast::TypeKind::Enum(enum_type), ConstValue::Enum(variant)) => enum_type
                .values
                .iter()
                .find(|candidate| candidate.node.value.node == *variant)
                .filter(|candidate| !utils::has_directive(&candidate.node.directives, INACCESSIBLE))
                .map(|_| value.clone()),
            (ast::TypeKind::InputObject(input_object), ConstValue::Object(fields)) => {
                self.coerce_input_object(input_object, fields)
            }
            _ => None,
        }
    }

    fn coerce_input_object(
        &self,
        input_object: &ast::InputObjectType,
        fields: &IndexMap<Name, ConstValue>,
    ) -> Option<ConstValue> {
        let mut coerced = IndexMap::with_capacity(fields.len());

        for (name, value) in fields {
            let definition = input_object
                .fields
                .iter()
                .find(|field| field.node.name.node == *name)?;

            coerced.insert(name.clone(), self.coerce(value, &definition.node.ty.node)?);
        }

        let missing_required = input_object.fields.iter().any(|field| {
            !field.node.ty.node.nullable
                && field.node.default_value.is_none()
                && !fields.contains_key(&field.node.name.node)
        });

        if missing_required {
            return None;
        }

        Some(ConstValue::Object(coerced))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn types() -> IndexMap<String, Positioned<ast::TypeDefinition>> {
        let document = crate::parse_schema(
            r#"
            enum Enum { A B @inaccessible }
            input Input { name: String!, nested: [Input!], kind: Enum = A }
            scalar JSON
            "#,
        )
        .unwrap();

        document
            .definitions
            .into_iter()
            .filter_map(|definition| match definition {
                ast::TypeSystemDefinition::Type(definition) => {
                    Some((definition.node.name.node.to_string(), definition))
                }
                _ => None,
            })
            .collect()
    }

    fn coerce(value: &str, ty: &str) -> Option<String> {
        let types = types();
        let coercer = Coercer { types: &types };
        let value = async_graphql_parser::parse_query(format!("{{ f(arg: {value}) }}"))
            .unwrap()
            .operations
            .iter()
            .next()
            .map(|(_, operation)| match &operation.node.selection_set.node.items[0].node {
                async_graphql_parser::types::Selection::Field(field) => {
                    field.node.arguments[0].1.node.clone().into_const().unwrap()
                }
                _ => unreachable!(),
            })
            .unwrap();

        coercer
            .coerce(&value, &ast::Type::new(ty).unwrap())
            .map(|value| utils::print_value(&value))
    }

    #[rstest]
    #[case(r#""test""#, "[[String!]!]!", Some(r#"[["test"]]"#))]
    #[case(r#"["a", "b"]"#, "[[String]]", Some(r#"[["a"], ["b"]]"#))]
    #[case("[[1], 2]", "[[Int!]!]", Some("[[1], [2]]"))]
    #[case("null", "[String]", Some("null"))]
    #[case("null", "[String]!", None)]
    #[case("[null]", "[String!]", None)]
    #[case("[null]", "[String]!", Some("[null]"))]
    #[case("1", "Float", Some("1"))]
    #[case("1.5", "Int", None)]
    #[case("2147483648", "Int", None)]
    #[case("1", "ID", Some("1"))]
    #[case("true", "String", None)]
    #[case("A", "Enum!", Some("A"))]
    #[case("B", "Enum!", None)]
    #[case("[A, B]", "[Enum]", None)]
    #[case("C", "Enum", None)]
    #[case(r#""A""#, "Enum", None)]
    #[case(r#"{ name: "x" }"#, "Input", Some(r#"{name: "x"}"#))]
    #[case("{ kind: A }", "Input", None)]
    #[case(r#"{ name: "x", extra: 1 }"#, "Input", None)]
    #[case(r#"{ name: "x", nested: { name: "y", kind: B } }"#, "Input", None)]
    #[case(r#"{ name: "x", nested: { name: "y" } }"#, "Input", Some(r#"{name: "x", nested: [{name: "y"}]}"#))]
    #[case(r#"{ any: [1, "two"] }"#, "JSON", Some(r#"{any: [1, "two"]}"#))]
    #[case(r#""id organization { id }""#, "FieldSet!", Some(r#""id organization { id }""#))]
    #[case(r#""read:user""#, "[[openfed__Scope!]!]!", Some(r#"[["read:user"]]"#))]
    #[case("[[1]]", "[[openfed__Scope!]!]!", None)]
    fn coercion(#[case] value: &str, #[case] ty: &str, #[case] expected: Option<&str>) {
        assert_eq!(coerce(value, ty).as_deref(), expected);
    }
}
