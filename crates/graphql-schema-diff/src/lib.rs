//! Semantic diffing of GraphQL schemas, with every change classified as breaking or not.
//!
//! Both schemas are normalized before comparison, so extensions, directive aliases and renamed
//! root types never show up as changes.

mod change;
mod diff;
mod schema;

pub use self::change::{ChangeType, SchemaChange};
pub use graphql_composition::RouterCompatibilityVersion;

#[cfg(test)]
use {insta as _, serde_json as _};

use self::{change::Changes, schema::DiffSchema};

/// Why a diff could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum DiffErrorCode {
    InvalidOldSchema,
    InvalidNewSchema,
}

/// The result of a [get_diff_between_graphs()] invocation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")
)]
pub enum GetDiffBetweenGraphsResult {
    Success(DiffSuccess),
    Failure {
        error_code: DiffErrorCode,
        error_message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "camelCase"))]
pub struct DiffSuccess {
    /// Every change, sorted by path then change type.
    pub changes: Vec<SchemaChange>,
    pub breaking_changes: Vec<SchemaChange>,
    pub non_breaking_changes: Vec<SchemaChange>,
}

impl GetDiffBetweenGraphsResult {
    pub fn into_result(self) -> Result<DiffSuccess, (DiffErrorCode, String)> {
        match self {
            GetDiffBetweenGraphsResult::Success(success) => Ok(success),
            GetDiffBetweenGraphsResult::Failure {
                error_code,
                error_message,
            } => Err((error_code, error_message)),
        }
    }
}

/// Compare an old and a new schema. A blank old schema is accepted, for initial publishes.
///
/// Invalid SDL on either side is reported in the result, never by panicking.
pub fn get_diff_between_graphs(
    old_sdl: &str,
    new_sdl: &str,
    router_compatibility_version: RouterCompatibilityVersion,
) -> GetDiffBetweenGraphsResult {
    let _span = tracing::info_span!("get_diff_between_graphs").entered();

    let old = match DiffSchema::from_sdl(old_sdl, router_compatibility_version) {
        Ok(schema) => schema,
        Err(error) => return failure(DiffErrorCode::InvalidOldSchema, error),
    };

    let new = match DiffSchema::from_sdl(new_sdl, router_compatibility_version) {
        Ok(schema) => schema,
        Err(error) => return failure(DiffErrorCode::InvalidNewSchema, error),
    };

    let mut changes = Changes::default();
    diff::diff_schemas(&old, &new, &mut changes);
    let changes = changes.into_sorted();

    let (breaking_changes, non_breaking_changes): (Vec<_>, Vec<_>) =
        changes.iter().cloned().partition(|change| change.is_breaking);

    tracing::debug!(
        changes = changes.len(),
        breaking = breaking_changes.len(),
        "computed schema diff"
    );

    GetDiffBetweenGraphsResult::Success(DiffSuccess {
        changes,
        breaking_changes,
        non_breaking_changes,
    })
}

fn failure(error_code: DiffErrorCode, error: schema::SchemaError) -> GetDiffBetweenGraphsResult {
    tracing::debug!(%error_code, "schema diff failed");

    GetDiffBetweenGraphsResult::Failure {
        error_code,
        error_message: error.to_string(),
    }
}
