use super::*;

#[derive(Default)]
pub(super) struct Enums {
    values: BTreeMap<(DefinitionId, String), EnumValueRecord>,
}

pub(crate) struct EnumValueRecord {
    description: Option<String>,
    directives: DirectiveSite,
}

impl Subgraphs {
    pub(crate) fn push_enum_value(
        &mut self,
        enum_id: DefinitionId,
        value: &str,
        description: Option<String>,
        directives: DirectiveSite,
    ) {
        self.enums
            .values
            .insert((enum_id, value.to_owned()), EnumValueRecord { description, directives });
    }
}

pub(crate) type EnumValueWalker<'a> = Walker<'a, (DefinitionId, &'a str)>;

impl<'a> EnumValueWalker<'a> {
    fn record(self) -> Option<&'a EnumValueRecord> {
        let (enum_id, name) = self.id;
        self.subgraphs.enums.values.get(&(enum_id, name.to_owned()))
    }

    pub(crate) fn name(self) -> &'a str {
        self.id.1
    }

    pub(crate) fn description(self) -> Option<&'a str> {
        self.record().and_then(|record| record.description.as_deref())
    }

    pub(crate) fn directives(self) -> Option<&'a DirectiveSite> {
        self.record().map(|record| &record.directives)
    }
}

impl<'a> DefinitionWalker<'a> {
    /// Values of an enum, in name order.
    pub(crate) fn enum_values(self) -> impl Iterator<Item = EnumValueWalker<'a>> + 'a {
        let id = self.id;
        let subgraphs = self.subgraphs;
        subgraphs
            .enums
            .values
            .range((id, String::new())..)
            .take_while(move |((enum_id, _), _)| *enum_id == id)
            .map(move |((enum_id, name), _)| subgraphs.walk((*enum_id, name.as_str())))
    }
}
