//! Reconciliation of the migration versions recorded in both schemas.
//!
//! Frameworks such as Rails keep the applied migration versions in a table
//! (`schema_migrations.version` by default). Two schemas can be structurally
//! equal while having run different migrations; [`reconcile`] reports which
//! versions each side is missing.

use crate::util::{Result, SchemaError};
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_MIGRATIONS_COLUMN: &str = "schema_migrations.version";

/// Anything able to list the values of a `table.column` pair in order.
pub trait VersionSource {
    /// Server address used in log messages and reports.
    fn address(&self) -> String;

    fn database(&self) -> &str;

    fn versions(
        &self,
        table: &str,
        column: &str,
    ) -> impl Future<Output = Result<Vec<String>>> + Send;
}

/// Versions missing on either side. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationsDiff {
    table: String,
    column: String,
    missing_in_source: Vec<String>,
    missing_in_target: Vec<String>,
}

impl MigrationsDiff {
    pub fn new(
        table: impl Into<String>,
        column: impl Into<String>,
        missing_in_source: Vec<String>,
        missing_in_target: Vec<String>,
    ) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            missing_in_source,
            missing_in_target,
        }
    }

    /// No reconciliation data: nothing missing on either side.
    pub fn empty(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::new(table, column, Vec::new(), Vec::new())
    }

    /// Compares the versions recorded in the source against the target.
    pub fn between(
        table: impl Into<String>,
        column: impl Into<String>,
        source: &[String],
        target: &[String],
    ) -> Self {
        Self::new(
            table,
            column,
            string_set_diff(target, source),
            string_set_diff(source, target),
        )
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    /// Versions recorded in the target but not in the source.
    pub fn missing_in_source(&self) -> &[String] {
        &self.missing_in_source
    }

    /// Versions recorded in the source but not in the target.
    pub fn missing_in_target(&self) -> &[String] {
        &self.missing_in_target
    }

    pub fn is_empty(&self) -> bool {
        self.missing_in_source.is_empty() && self.missing_in_target.is_empty()
    }
}

/// Elements of `a` that are not in `b`, in first-seen order of `a`.
///
/// Membership based: duplicates in `a` are reported once, and an element
/// present in `b` any number of times is never reported.
pub fn string_set_diff(a: &[String], b: &[String]) -> Vec<String> {
    let present: HashSet<&str> = b.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    a.iter()
        .filter(|s| !present.contains(s.as_str()) && seen.insert(s.as_str()))
        .cloned()
        .collect()
}

/// Splits `"table.column"`. Anything else yields empty names, which makes
/// the subsequent query fail instead of being rejected here.
pub fn parse_column_descriptor(descriptor: &str) -> (String, String) {
    let parts: Vec<&str> = descriptor.split('.').collect();
    match parts.as_slice() {
        [table, column] => (table.to_string(), column.to_string()),
        _ => (String::new(), String::new()),
    }
}

struct SideFailure {
    address: String,
    database: String,
    error: SchemaError,
}

async fn fetch_side<S: VersionSource>(
    side: &S,
    table: &str,
    column: &str,
    timeout: Duration,
) -> std::result::Result<Vec<String>, SideFailure> {
    let outcome = match tokio::time::timeout(timeout, side.versions(table, column)).await {
        Ok(outcome) => outcome,
        Err(_) => Err(SchemaError::Timeout(timeout)),
    };

    outcome.map_err(|error| SideFailure {
        address: side.address(),
        database: side.database().to_string(),
        error,
    })
}

/// Computes the [`MigrationsDiff`] between `source` and `target`.
///
/// Both sides are queried concurrently, each bounded by `timeout`. A failure
/// on either side cancels the other query and is reported as a warning; the
/// result is then empty rather than an error.
pub async fn reconcile<S: VersionSource>(
    descriptor: &str,
    source: &S,
    target: &S,
    timeout: Duration,
) -> MigrationsDiff {
    let (table, column) = parse_column_descriptor(descriptor);

    let fetched = tokio::try_join!(
        fetch_side(source, &table, &column, timeout),
        fetch_side(target, &table, &column, timeout),
    );

    match fetched {
        Ok((source_versions, target_versions)) => {
            debug!(
                table = %table,
                column = %column,
                source = source_versions.len(),
                target = target_versions.len(),
                "fetched migration versions"
            );
            MigrationsDiff::between(table, column, &source_versions, &target_versions)
        }
        Err(failure) => {
            warn!(
                address = %failure.address,
                database = %failure.database,
                table = %table,
                column = %column,
                error = %failure.error,
                "cannot retrieve migrations from {table}.{column} in {}/{}",
                failure.address,
                failure.database
            );
            MigrationsDiff::empty(table, column)
        }
    }
}
