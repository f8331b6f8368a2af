use super::{Formatter, Rendered};
use crate::diff::{AlterClause, ClauseKind, ObjectDiff, SchemaDiff, Side, TableDiff};
use crate::migrations::MigrationsDiff;
use crate::model::{Column, ForeignKey, Index};
use crate::mysql::sqlgen::{charset_clause, column_definition, quote_ident};
use std::fmt::Write;
use tracing::error;

/// Human-readable summary: one line per logical difference.
pub struct CompactFormatter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Clause(ClauseKind),
    CreateTable,
    DropTable,
    Migrations,
}

#[derive(Debug)]
struct Line {
    text: String,
    origin: Origin,
}

impl Line {
    fn clause(kind: ClauseKind, text: String) -> Self {
        Self {
            text,
            origin: Origin::Clause(kind),
        }
    }
}

impl Formatter for CompactFormatter {
    fn format(&self, diff: &SchemaDiff) -> Rendered {
        let mut lines = Vec::new();
        for object in &diff.objects {
            match object {
                ObjectDiff::AlterTable(table_diff) => {
                    lines.extend(format_alter(table_diff, diff));
                }
                ObjectDiff::CreateTable(table) => lines.push(Line {
                    text: format!("Table {} is absent in {}", table.name, diff.from),
                    origin: Origin::CreateTable,
                }),
                ObjectDiff::DropTable(table) => lines.push(Line {
                    text: format!("Table {} is absent in {}", table.name, diff.to),
                    origin: Origin::DropTable,
                }),
                ObjectDiff::Migrations(migrations) => lines.push(Line {
                    text: format_migrations(migrations, diff),
                    origin: Origin::Migrations,
                }),
            }
        }
        Rendered::Text(summarize(combine(lines)))
    }
}

fn format_alter(table_diff: &TableDiff, context: &SchemaDiff) -> Vec<Line> {
    let table = table_diff.table_name();
    table_diff
        .clauses()
        .iter()
        .filter_map(|clause| format_clause(clause, table, context))
        .collect()
}

/// Line for one clause, or `None` when the clause is not reported.
fn format_clause(clause: &AlterClause, table: &str, context: &SchemaDiff) -> Option<Line> {
    let (from, to) = (&context.from, &context.to);
    let kind = clause.kind();

    let text = match clause {
        AlterClause::AddColumn { column, .. } => missing(table, &format!("column {}", column.name), from),
        AlterClause::DropColumn { column } => missing(table, &format!("column {}", column.name), to),
        AlterClause::AddIndex { index } => missing(table, &describe_index(index), from),
        AlterClause::DropIndex { index } => missing(table, &describe_index(index), to),
        AlterClause::AddForeignKey { foreign_key } => {
            missing(table, &describe_foreign_key(foreign_key), from)
        }
        AlterClause::DropForeignKey { foreign_key } => {
            missing(table, &describe_foreign_key(foreign_key), to)
        }
        AlterClause::ModifyColumn { old, new } => format_modify_column(table, old, new, from, to),
        AlterClause::ChangeCharset { charset, collation } => format!(
            "Table {table} differs: encoding changed to {} in {to}",
            charset_clause(charset, collation)
        ),
        // Already reported by the ModifyColumn clause that comes with it.
        AlterClause::ChangeAutoIncrement { .. } => return None,
        AlterClause::ChangeCreateOptions { .. }
        | AlterClause::ChangeComment { .. }
        | AlterClause::ChangeStorageEngine { .. }
        | AlterClause::RenameColumn { .. } => {
            error!(
                kind = %kind,
                table = %table,
                "unexpected table alter clause in compact formatter, ignoring"
            );
            return None;
        }
    };

    Some(Line::clause(kind, text))
}

fn missing(table: &str, what: &str, side: &Side) -> String {
    format!("Table {table} differs: missing {what} in {side}")
}

fn describe_index(index: &Index) -> String {
    let kind = if index.primary {
        "PRIMARY KEY"
    } else if index.unique {
        "UNIQUE KEY"
    } else {
        "KEY"
    };
    format!("{kind} {}({})", index.name, index.column_names().join(", "))
}

fn describe_foreign_key(fk: &ForeignKey) -> String {
    format!(
        "FOREIGN KEY {}({}) REFERENCES {}({})",
        fk.name,
        fk.columns.join(", "),
        fk.referenced_table,
        fk.referenced_columns.join(",")
    )
}

fn format_modify_column(table: &str, old: &Column, new: &Column, from: &Side, to: &Side) -> String {
    let old_def = type_definition(old);
    let new_def = type_definition(new);
    if old_def != new_def {
        format!(
            "Table {table} differs: column {} differs in column type: {old_def} in {from}, {new_def} in {to}",
            old.name
        )
    } else {
        format!(
            "Table {table} differs: column {} AUTO_INCREMENT value differs between {from} and {to}",
            old.name
        )
    }
}

/// Column definition without the leading column name.
fn type_definition(column: &Column) -> String {
    let definition = column_definition(column);
    let prefix = format!("{} ", quote_ident(&column.name));
    definition
        .strip_prefix(&prefix)
        .map(str::to_string)
        .unwrap_or(definition)
}

fn format_migrations(migrations: &MigrationsDiff, context: &SchemaDiff) -> String {
    let mut text = String::from("Some migrations are missing:");
    let sides = [
        (&context.from.address, migrations.missing_in_source()),
        (&context.to.address, migrations.missing_in_target()),
    ];
    for (address, missing) in sides {
        if missing.is_empty() {
            continue;
        }
        let _ = write!(text, "\n\t\t- {address}");
        for version in missing {
            let _ = write!(text, "\n\t\t\t- {version}");
        }
    }
    text
}

/// Collapses each foreign-key line with the index line emitted right before
/// it for the same constraint.
fn combine(lines: Vec<Line>) -> Vec<String> {
    let mut combined: Vec<(Origin, String)> = Vec::with_capacity(lines.len());
    for line in lines {
        let supporting_index = match line.origin {
            Origin::Clause(ClauseKind::AddForeignKey) => Some(ClauseKind::AddIndex),
            Origin::Clause(ClauseKind::DropForeignKey) => Some(ClauseKind::DropIndex),
            _ => None,
        };
        if let Some(kind) = supporting_index {
            // The comparator emits a bare key clause when its index is unchanged.
            if matches!(combined.last(), Some((Origin::Clause(k), _)) if *k == kind) {
                combined.pop();
            }
        }
        combined.push((line.origin, line.text));
    }
    combined.into_iter().map(|(_, text)| text).collect()
}

fn summarize(lines: Vec<String>) -> String {
    if lines.is_empty() {
        return "No differences found".to_string();
    }
    let mut out = format!("Differences found ({}):\n", lines.len());
    for line in lines {
        let _ = writeln!(out, "\t- {line}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(objects: Vec<ObjectDiff>) -> SchemaDiff {
        SchemaDiff {
            from: Side::new("schema1", "127.0.0.1:33060"),
            to: Side::new("schema2", "127.0.0.1:33062"),
            objects,
        }
    }

    fn line(kind: ClauseKind, text: &str) -> Line {
        Line::clause(kind, text.to_string())
    }

    #[test]
    fn combine_pops_the_supporting_index_line() {
        let lines = vec![
            line(ClauseKind::AddColumn, "column"),
            line(ClauseKind::AddIndex, "index"),
            line(ClauseKind::AddForeignKey, "fk"),
            line(ClauseKind::DropIndex, "old index"),
            line(ClauseKind::DropForeignKey, "old fk"),
        ];
        assert_eq!(combine(lines), vec!["column", "fk", "old fk"]);
    }

    #[test]
    fn combine_keeps_unrelated_preceding_lines() {
        let lines = vec![
            line(ClauseKind::AddColumn, "column"),
            line(ClauseKind::AddForeignKey, "fk"),
        ];
        assert_eq!(combine(lines), vec!["column", "fk"]);
    }

    #[test]
    fn auto_increment_clause_is_never_reported() {
        let clause = AlterClause::ChangeAutoIncrement {
            old: None,
            new: Some(5),
        };
        assert!(format_clause(&clause, "tasks", &context(vec![])).is_none());
    }

    #[test]
    fn unexpected_clause_kinds_are_skipped() {
        let clause = AlterClause::ChangeComment {
            comment: "x".to_string(),
        };
        assert!(format_clause(&clause, "tasks", &context(vec![])).is_none());
    }

    #[test]
    fn migrations_line_omits_sides_without_missing_versions() {
        let migrations = MigrationsDiff::new(
            "schema_migrations",
            "version",
            Vec::new(),
            vec!["20190817000000".to_string()],
        );
        assert_eq!(
            format_migrations(&migrations, &context(vec![])),
            "Some migrations are missing:\n\t\t- 127.0.0.1:33062\n\t\t\t- 20190817000000"
        );
    }

    #[test]
    fn summarize_counts_lines() {
        assert_eq!(summarize(Vec::new()), "No differences found");
        assert_eq!(
            summarize(vec!["a".to_string(), "b".to_string()]),
            "Differences found (2):\n\t- a\n\t- b\n"
        );
    }

    #[test]
    fn modify_column_with_same_definition_reports_auto_increment() {
        let clause = AlterClause::ModifyColumn {
            old: Column::new("id", "int(11)"),
            new: Column::new("id", "int(11)").default_value("NULL"),
        };
        let line = format_clause(&clause, "tasks", &context(vec![])).unwrap();
        assert_eq!(
            line.text,
            "Table tasks differs: column id AUTO_INCREMENT value differs between schema1.127.0.0.1:33060 and schema2.127.0.0.1:33062"
        );
        assert_eq!(line.origin, Origin::Clause(ClauseKind::ModifyColumn));
    }

    #[test]
    fn type_definition_strips_column_name() {
        let column = Column::new("parent_id", "int(11)").default_value("'0'");
        assert_eq!(type_definition(&column), "int(11) DEFAULT '0'");
    }
}
