use crate::{CompositionError, CompositionWarning};

/// Warnings and errors produced by normalization and composition.
#[derive(Default, Debug, Clone)]
pub struct Diagnostics {
    errors: Vec<CompositionError>,
    warnings: Vec<CompositionWarning>,
}

impl Diagnostics {
    /// Is any of the diagnostics fatal, i.e. a hard error?
    pub fn any_fatal(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Is there any diagnostic warning or error
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    /// Iterate non-fatal diagnostics.
    pub fn iter_warnings(&self) -> impl Iterator<Item = &CompositionWarning> {
        self.warnings.iter()
    }

    /// Iterate fatal diagnostics.
    pub fn iter_errors(&self) -> impl Iterator<Item = &CompositionError> {
        self.errors.iter()
    }

    /// Iterate over all diagnostic messages, errors first.
    pub fn iter_messages(&self) -> impl Iterator<Item = String> + '_ {
        self.errors
            .iter()
            .map(ToString::to_string)
            .chain(self.warnings.iter().map(ToString::to_string))
    }

    pub(crate) fn push_fatal(&mut self, error: CompositionError) {
        self.errors.push(error);
    }

    pub(crate) fn push_warning(&mut self, warning: CompositionWarning) {
        self.warnings.push(warning);
    }

    pub(crate) fn extend_warnings(&mut self, warnings: impl IntoIterator<Item = CompositionWarning>) {
        self.warnings.extend(warnings);
    }

    pub(crate) fn into_parts(self) -> (Vec<CompositionError>, Vec<CompositionWarning>) {
        (self.errors, self.warnings)
    }
}
