use super::*;
use async_graphql_parser::types as ast;
use async_graphql_value::ConstValue;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct FieldId(usize);

/// Fields of objects, interfaces and input objects.
#[derive(Default)]
pub(crate) struct Fields {
    fields: Vec<FieldRecord>,
    // (parent definition, field name) -> field id
    fields_by_definition: BTreeMap<(DefinitionId, String), FieldId>,
}

/// A field in an object, interface or input object type.
#[derive(Debug, Clone)]
pub(crate) struct FieldRecord {
    pub(crate) parent_definition_id: DefinitionId,
    pub(crate) name: String,
    /// ```ignore,graphql
    /// type MyObject {
    ///   id: ID!
    ///   nested: [Nested!]!
    ///           ^^^^^^^^^^
    /// }
    /// ```
    pub(crate) ty: ast::Type,
    /// Output fields only, in declaration order.
    pub(crate) arguments: Vec<InputValueRecord>,
    /// Input object fields only.
    pub(crate) default_value: Option<ConstValue>,
    pub(crate) description: Option<String>,
    pub(crate) directives: DirectiveSite,
    pub(crate) is_shareable: bool,
    pub(crate) is_external: bool,
    /// `@override(from: ...)`
    pub(crate) override_from: Option<String>,
    /// `@provides(fields: ...)`, normalized.
    pub(crate) provides: Option<String>,
    /// `@requires(fields: ...)`, normalized.
    pub(crate) requires: Option<String>,
}

/// An argument on an output field.
#[derive(Debug, Clone)]
pub(crate) struct InputValueRecord {
    pub(crate) name: String,
    pub(crate) ty: ast::Type,
    pub(crate) default_value: Option<ConstValue>,
    pub(crate) description: Option<String>,
    pub(crate) directives: DirectiveSite,
}

impl Subgraphs {
    pub(crate) fn push_field(&mut self, field: FieldRecord) -> FieldId {
        let key = (field.parent_definition_id, field.name.clone());
        let id = FieldId(self.fields.fields.push_return_idx(field));
        self.fields.fields_by_definition.insert(key, id);
        id
    }
}

pub(crate) type FieldWalker<'a> = Walker<'a, FieldId>;

impl<'a> FieldWalker<'a> {
    fn field(self) -> &'a FieldRecord {
        &self.subgraphs.fields.fields[self.id.0]
    }

    pub(crate) fn name(self) -> &'a str {
        &self.field().name
    }

    pub(crate) fn ty(self) -> &'a ast::Type {
        &self.field().ty
    }

    pub(crate) fn arguments(self) -> &'a [InputValueRecord] {
        &self.field().arguments
    }

    pub(crate) fn default_value(self) -> Option<&'a ConstValue> {
        self.field().default_value.as_ref()
    }

    pub(crate) fn description(self) -> Option<&'a str> {
        self.field().description.as_deref()
    }

    pub(crate) fn directives(self) -> &'a DirectiveSite {
        &self.field().directives
    }

    pub(crate) fn parent_definition(self) -> DefinitionWalker<'a> {
        self.walk(self.field().parent_definition_id)
    }

    /// `@external` on the field or on its parent type.
    pub(crate) fn is_external(self) -> bool {
        self.field().is_external || self.parent_definition().is_external()
    }

    /// `@shareable` on the field or on its parent type. Key fields are implicitly shareable.
    pub(crate) fn is_shareable(self) -> bool {
        self.field().is_shareable || self.parent_definition().is_shareable() || self.is_part_of_key()
    }

    pub(crate) fn override_from(self) -> Option<&'a str> {
        self.field().override_from.as_deref()
    }

    pub(crate) fn provides(self) -> Option<&'a str> {
        self.field().provides.as_deref()
    }

    pub(crate) fn requires(self) -> Option<&'a str> {
        self.field().requires.as_deref()
    }

    /// Is the field selected at the top level of one of its parent's keys?
    pub(crate) fn is_part_of_key(self) -> bool {
        let name = self.name();
        self.parent_definition()
            .keys()
            .any(|key| key.fields().iter().any(|selection| selection.field_name() == Some(name)))
    }
}

impl<'a> DefinitionWalker<'a> {
    /// The fields of an object, interface or input object, in name order.
    pub(crate) fn fields(self) -> impl Iterator<Item = FieldWalker<'a>> {
        let id = self.id;
        let subgraphs = self.subgraphs;
        subgraphs
            .fields
            .fields_by_definition
            .range((id, String::new())..)
            .take_while(move |((parent_id, _), _)| *parent_id == id)
            .map(move |(_, field_id)| subgraphs.walk(*field_id))
    }

    pub(crate) fn field_by_name(self, name: &str) -> Option<FieldWalker<'a>> {
        self.subgraphs
            .fields
            .fields_by_definition
            .get(&(self.id, name.to_owned()))
            .map(|field_id| self.walk(*field_id))
    }
}
