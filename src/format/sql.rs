use super::{Formatter, Rendered};
use crate::diff::{ObjectDiff, SchemaDiff};
use crate::mysql::sqlgen::generate_statement;
use tracing::debug;

/// Renders the differences as `CREATE`, `DROP` and `ALTER TABLE` statements
/// turning the `from` schema into the `to` schema.
pub struct SqlFormatter;

impl Formatter for SqlFormatter {
    fn format(&self, diff: &SchemaDiff) -> Rendered {
        let mut out = String::new();
        for object in &diff.objects {
            if let ObjectDiff::Migrations(migrations) = object {
                debug!(
                    table = %migrations.table(),
                    "migrations differences have no SQL form, skipping"
                );
                continue;
            }
            if let Some(statement) = generate_statement(object) {
                out.push_str(&statement);
                out.push_str(";\n");
            }
        }
        Rendered::Text(out)
    }
}
