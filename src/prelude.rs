//! Convenient re-exports for common mydiff usage.

pub use crate::api::{diff, diff_blocking, diff_with, DiffOptions, DiffResult, Error};

pub use crate::diff::{compute_diff, AlterClause, ClauseKind, Diff, ObjectDiff, SchemaDiff};
pub use crate::dsn::Dsn;
pub use crate::format::{Formatter, Formatters, Rendered};
pub use crate::migrations::MigrationsDiff;
pub use crate::model::Schema;
