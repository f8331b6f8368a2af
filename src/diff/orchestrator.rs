use super::{compute_diff, ObjectDiff};
use crate::dsn::Dsn;
use crate::migrations::{reconcile, VersionSource};
use crate::model::Schema;
use crate::mysql::MySqlConnection;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// An introspected schema together with the server it was read from.
#[derive(Debug, Clone)]
pub struct SchemaSnapshot {
    pub schema: Schema,
    pub dsn: Dsn,
}

impl SchemaSnapshot {
    pub fn new(schema: Schema, dsn: Dsn) -> Self {
        Self { schema, dsn }
    }

    pub fn side(&self) -> Side {
        Side::new(&self.schema.name, self.dsn.address())
    }
}

/// Identity of one side of a comparison, as shown in reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Side {
    pub schema: String,
    pub address: String,
}

impl Side {
    pub fn new(schema: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            address: address.into(),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.address)
    }
}

/// Result of a full comparison, ready to be formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDiff {
    pub from: Side,
    pub to: Side,
    pub objects: Vec<ObjectDiff>,
}

impl SchemaDiff {
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// A comparison request between two snapshots.
#[derive(Debug, Clone)]
pub struct Diff {
    from: SchemaSnapshot,
    to: SchemaSnapshot,
    migrations: Option<String>,
    timeout: Duration,
}

impl Diff {
    pub fn new(from: SchemaSnapshot, to: SchemaSnapshot) -> Self {
        Self {
            from,
            to,
            migrations: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Also reconciles the versions stored in `descriptor` (`table.column`).
    pub fn with_migrations(mut self, descriptor: impl Into<String>) -> Self {
        self.migrations = Some(descriptor.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Swaps the two sides: schema, server and address all move together.
    pub fn reversed(self) -> Self {
        Self {
            from: self.to,
            to: self.from,
            ..self
        }
    }

    /// Structural differences only.
    pub fn raw(&self) -> SchemaDiff {
        SchemaDiff {
            from: self.from.side(),
            to: self.to.side(),
            objects: compute_diff(&self.from.schema, &self.to.schema),
        }
    }

    /// Structural differences, followed by the migrations diff when
    /// reconciliation is enabled and finds something.
    pub async fn compute(&self) -> SchemaDiff {
        if self.migrations.is_none() {
            return self.raw();
        }

        let connect = |snapshot: &SchemaSnapshot| {
            MySqlConnection::lazy(
                &snapshot.dsn.with_database(snapshot.schema.name.clone()),
                self.timeout,
            )
        };

        match (connect(&self.from), connect(&self.to)) {
            (Ok(source), Ok(target)) => self.compute_with(&source, &target).await,
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "cannot open connections for migrations reconciliation");
                self.raw()
            }
        }
    }

    /// Like [`Diff::compute`], reading versions from the given sources.
    pub async fn compute_with<S: VersionSource>(&self, source: &S, target: &S) -> SchemaDiff {
        let mut diff = self.raw();

        let Some(descriptor) = &self.migrations else {
            return diff;
        };

        let migrations = reconcile(descriptor, source, target, self.timeout).await;
        if migrations.is_empty() {
            debug!(descriptor = %descriptor, "migrations are in sync");
        } else {
            diff.objects.push(ObjectDiff::Migrations(migrations));
        }
        diff
    }
}
