/// A single difference between two schemas.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "camelCase"))]
pub struct SchemaChange {
    /// The schema coordinates of the changed item, e.g. `Query.users.filter` or `@myDirective`.
    pub path: String,
    pub change_type: ChangeType,
    pub is_breaking: bool,
    pub message: String,
}

/// The kind of a [SchemaChange]. Displayed and serialized in SCREAMING_SNAKE_CASE.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::AsRefStr,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ChangeType {
    TypeAdded,
    TypeRemoved,
    TypeKindChanged,
    TypeDescriptionChanged,

    FieldAdded,
    FieldRemoved,
    FieldTypeChanged,
    FieldDeprecationAdded,
    FieldDeprecationRemoved,

    FieldArgumentAdded,
    FieldArgumentRemoved,
    FieldArgumentTypeChanged,
    FieldArgumentDefaultChanged,

    InputFieldAdded,
    InputFieldRemoved,
    InputFieldTypeChanged,
    InputFieldDefaultValueChanged,

    EnumValueAdded,
    EnumValueRemoved,

    UnionMemberAdded,
    UnionMemberRemoved,

    ObjectTypeInterfaceAdded,
    ObjectTypeInterfaceRemoved,

    DirectiveAdded,
    DirectiveRemoved,

    DirectiveUsageFieldDefinitionAdded,
    DirectiveUsageFieldDefinitionRemoved,

    SchemaQueryTypeChanged,
    SchemaMutationTypeChanged,
    SchemaSubscriptionTypeChanged,
}

/// Accumulates changes while walking both schemas.
#[derive(Default)]
pub(crate) struct Changes(Vec<SchemaChange>);

impl Changes {
    pub(crate) fn push(&mut self, change_type: ChangeType, is_breaking: bool, path: impl Into<String>, message: String) {
        self.0.push(SchemaChange {
            path: path.into(),
            change_type,
            is_breaking,
            message,
        });
    }

    pub(crate) fn breaking(&mut self, change_type: ChangeType, path: impl Into<String>, message: String) {
        self.push(change_type, true, path, message);
    }

    pub(crate) fn non_breaking(&mut self, change_type: ChangeType, path: impl Into<String>, message: String) {
        self.push(change_type, false, path, message);
    }

    /// Sorted by path, then change type.
    pub(crate) fn into_sorted(self) -> Vec<SchemaChange> {
        let mut changes = self.0;
        changes.sort();
        changes.dedup();
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn change_types_are_screaming_snake_case() {
        assert_eq!(ChangeType::FieldTypeChanged.to_string(), "FIELD_TYPE_CHANGED");
        assert_eq!(
            ChangeType::DirectiveUsageFieldDefinitionAdded.as_ref(),
            "DIRECTIVE_USAGE_FIELD_DEFINITION_ADDED"
        );
        assert_eq!(ChangeType::from_str("TYPE_REMOVED").unwrap(), ChangeType::TypeRemoved);
    }

    #[test]
    fn sorting_by_path_then_change_type() {
        let mut changes = Changes::default();
        changes.non_breaking(ChangeType::FieldAdded, "User.name", String::new());
        changes.breaking(ChangeType::FieldRemoved, "Query.me", String::new());
        changes.non_breaking(ChangeType::FieldAdded, "Query.me", String::new());

        let sorted: Vec<(String, ChangeType)> = changes
            .into_sorted()
            .into_iter()
            .map(|change| (change.path, change.change_type))
            .collect();

        assert_eq!(
            sorted,
            [
                ("Query.me".to_owned(), ChangeType::FieldAdded),
                ("Query.me".to_owned(), ChangeType::FieldRemoved),
                ("User.name".to_owned(), ChangeType::FieldAdded),
            ]
        );
    }
}
