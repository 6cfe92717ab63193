use super::*;
use crate::normalization::FieldSetSelection;

/// All the keys (`@key(...)`) in all the subgraphs in one container.
#[derive(Default)]
pub(crate) struct Keys {
    // Invariant: sorted by definition id, keys are pushed right after their definition.
    keys: Vec<Key>,
}

pub(crate) struct Key {
    definition_id: DefinitionId,
    /// The normalized field set, e.g. `id organization { id }`.
    selection_set: String,
    fields: Vec<FieldSetSelection>,
    resolvable: bool,
}

impl Subgraphs {
    pub(crate) fn push_key(
        &mut self,
        definition_id: DefinitionId,
        selection_set: &str,
        fields: Vec<FieldSetSelection>,
        resolvable: bool,
    ) {
        self.keys.keys.push(Key {
            definition_id,
            selection_set: selection_set.to_owned(),
            fields,
            resolvable,
        });
    }
}

pub(crate) type KeyWalker<'a> = Walker<'a, usize>;

impl<'a> KeyWalker<'a> {
    fn key(self) -> &'a Key {
        &self.subgraphs.keys.keys[self.id]
    }

    pub(crate) fn parent_definition(self) -> DefinitionWalker<'a> {
        self.walk(self.key().definition_id)
    }

    pub(crate) fn selection_set(self) -> &'a str {
        &self.key().selection_set
    }

    pub(crate) fn fields(self) -> &'a [FieldSetSelection] {
        &self.key().fields
    }

    /// `false` for `@key(fields: ..., resolvable: false)`.
    pub(crate) fn is_resolvable(self) -> bool {
        self.key().resolvable
    }
}

impl<'a> DefinitionWalker<'a> {
    /// The keys of the definition, in declaration order.
    pub(crate) fn keys(self) -> impl Iterator<Item = KeyWalker<'a>> {
        let id = self.id;
        let keys = &self.subgraphs.keys.keys;
        let start = keys.partition_point(|key| key.definition_id < id);
        let end = start + keys[start..].iter().take_while(|key| key.definition_id == id).count();
        (start..end).map(move |idx| self.walk(idx))
    }
}
