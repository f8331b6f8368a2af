//! Structural comparison of two schemas.
//!
//! [`compute_diff`] produces the ordered [`ObjectDiff`] sequence for two
//! [`Schema`]s. Table alterations carry an ordered list of [`AlterClause`]s,
//! reachable through [`TableDiff::clauses`]. The [`orchestrator`] adds the
//! migrations reconciliation result on top.

pub mod orchestrator;
mod table_elements;

pub use orchestrator::{Diff, SchemaDiff, SchemaSnapshot, Side};

use crate::migrations::MigrationsDiff;
use crate::model::{Column, ForeignKey, Index, Schema, Table};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectDiff {
    /// Table present only in the `to` schema.
    CreateTable(Table),
    /// Table present only in the `from` schema.
    DropTable(Table),
    AlterTable(TableDiff),
    Migrations(MigrationsDiff),
}

impl ObjectDiff {
    pub fn table_name(&self) -> &str {
        match self {
            ObjectDiff::CreateTable(table) | ObjectDiff::DropTable(table) => &table.name,
            ObjectDiff::AlterTable(diff) => diff.table_name(),
            ObjectDiff::Migrations(diff) => diff.table(),
        }
    }
}

/// Differences between two versions of the same table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDiff {
    table: String,
    clauses: Vec<AlterClause>,
}

impl TableDiff {
    pub fn new(table: impl Into<String>, clauses: Vec<AlterClause>) -> Self {
        Self {
            table: table.into(),
            clauses,
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn clauses(&self) -> &[AlterClause] {
        &self.clauses
    }
}

/// Where a column lands when added or modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnPosition {
    Last,
    First,
    After(String),
}

/// One atomic change inside a table alteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlterClause {
    AddColumn {
        column: Column,
        position: ColumnPosition,
    },
    DropColumn {
        column: Column,
    },
    AddIndex {
        index: Index,
    },
    DropIndex {
        index: Index,
    },
    AddForeignKey {
        foreign_key: ForeignKey,
    },
    DropForeignKey {
        foreign_key: ForeignKey,
    },
    ModifyColumn {
        old: Column,
        new: Column,
    },
    ChangeCharset {
        charset: String,
        collation: String,
    },
    ChangeAutoIncrement {
        old: Option<u64>,
        new: Option<u64>,
    },
    ChangeCreateOptions {
        old: String,
        new: String,
    },
    ChangeComment {
        comment: String,
    },
    ChangeStorageEngine {
        engine: String,
    },
    RenameColumn {
        old: Column,
        new: Column,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClauseKind {
    AddColumn,
    DropColumn,
    AddIndex,
    DropIndex,
    AddForeignKey,
    DropForeignKey,
    ModifyColumn,
    ChangeCharset,
    ChangeAutoIncrement,
    ChangeCreateOptions,
    ChangeComment,
    ChangeStorageEngine,
    RenameColumn,
}

impl AlterClause {
    pub fn kind(&self) -> ClauseKind {
        match self {
            AlterClause::AddColumn { .. } => ClauseKind::AddColumn,
            AlterClause::DropColumn { .. } => ClauseKind::DropColumn,
            AlterClause::AddIndex { .. } => ClauseKind::AddIndex,
            AlterClause::DropIndex { .. } => ClauseKind::DropIndex,
            AlterClause::AddForeignKey { .. } => ClauseKind::AddForeignKey,
            AlterClause::DropForeignKey { .. } => ClauseKind::DropForeignKey,
            AlterClause::ModifyColumn { .. } => ClauseKind::ModifyColumn,
            AlterClause::ChangeCharset { .. } => ClauseKind::ChangeCharset,
            AlterClause::ChangeAutoIncrement { .. } => ClauseKind::ChangeAutoIncrement,
            AlterClause::ChangeCreateOptions { .. } => ClauseKind::ChangeCreateOptions,
            AlterClause::ChangeComment { .. } => ClauseKind::ChangeComment,
            AlterClause::ChangeStorageEngine { .. } => ClauseKind::ChangeStorageEngine,
            AlterClause::RenameColumn { .. } => ClauseKind::RenameColumn,
        }
    }
}

impl fmt::Display for ClauseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Compares `from` against `to`.
///
/// Alterations and drops come first, in `from` table name order, followed by
/// creations in `to` table name order.
pub fn compute_diff(from: &Schema, to: &Schema) -> Vec<ObjectDiff> {
    let mut diffs = Vec::new();

    for (name, from_table) in &from.tables {
        match to.tables.get(name) {
            Some(to_table) => {
                let clauses = table_elements::diff_table(from_table, to_table);
                if !clauses.is_empty() {
                    diffs.push(ObjectDiff::AlterTable(TableDiff::new(name.clone(), clauses)));
                }
            }
            None => diffs.push(ObjectDiff::DropTable(from_table.clone())),
        }
    }

    for (name, to_table) in &to.tables {
        if !from.tables.contains_key(name) {
            diffs.push(ObjectDiff::CreateTable(to_table.clone()));
        }
    }

    diffs
}
