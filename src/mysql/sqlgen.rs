use crate::diff::{AlterClause, ColumnPosition, ObjectDiff, TableDiff};
use crate::model::{Column, ForeignKey, Index, Table};

pub fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

pub fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "''")
}

fn quote_list<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    names
        .into_iter()
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(",")
}

/// Column definition as it appears in `CREATE TABLE`, name included.
pub fn column_definition(column: &Column) -> String {
    let mut def = format!("{} {}", quote_ident(&column.name), column.column_type);

    if let Some(charset) = &column.charset {
        def.push_str(&format!(" CHARACTER SET {charset}"));
    }
    if let Some(collation) = &column.collation {
        def.push_str(&format!(" COLLATE {collation}"));
    }
    if !column.nullable {
        def.push_str(" NOT NULL");
    }
    match &column.default {
        Some(default) => def.push_str(&format!(" DEFAULT {default}")),
        None if column.nullable && column.allows_default() => def.push_str(" DEFAULT NULL"),
        None => {}
    }
    if let Some(on_update) = &column.on_update {
        def.push_str(&format!(" ON UPDATE {on_update}"));
    }
    if column.auto_increment {
        def.push_str(" AUTO_INCREMENT");
    }
    if !column.comment.is_empty() {
        def.push_str(&format!(" COMMENT '{}'", escape_string(&column.comment)));
    }

    def
}

pub fn index_definition(index: &Index) -> String {
    let columns = index
        .columns
        .iter()
        .map(|c| match c.sub_part {
            Some(len) => format!("{}({len})", quote_ident(&c.name)),
            None => quote_ident(&c.name),
        })
        .collect::<Vec<_>>()
        .join(",");

    let mut def = if index.primary {
        format!("PRIMARY KEY ({columns})")
    } else if index.unique {
        format!("UNIQUE KEY {} ({columns})", quote_ident(&index.name))
    } else {
        format!("KEY {} ({columns})", quote_ident(&index.name))
    };

    if !index.comment.is_empty() {
        def.push_str(&format!(" COMMENT '{}'", escape_string(&index.comment)));
    }
    def
}

pub fn foreign_key_definition(fk: &ForeignKey) -> String {
    let referenced = match &fk.referenced_schema {
        Some(schema) => format!(
            "{}.{}",
            quote_ident(schema),
            quote_ident(&fk.referenced_table)
        ),
        None => quote_ident(&fk.referenced_table),
    };

    let mut def = format!(
        "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
        quote_ident(&fk.name),
        quote_list(fk.columns.iter().map(String::as_str)),
        referenced,
        quote_list(fk.referenced_columns.iter().map(String::as_str)),
    );

    // RESTRICT and NO ACTION are the implicit defaults.
    for (event, rule) in [("DELETE", &fk.delete_rule), ("UPDATE", &fk.update_rule)] {
        if !matches!(rule.as_str(), "RESTRICT" | "NO ACTION" | "") {
            def.push_str(&format!(" ON {event} {rule}"));
        }
    }
    def
}

/// `DEFAULT CHARACTER SET = x COLLATE = y`
pub fn charset_clause(charset: &str, collation: &str) -> String {
    let mut clause = format!("DEFAULT CHARACTER SET = {charset}");
    if !collation.is_empty() {
        clause.push_str(&format!(" COLLATE = {collation}"));
    }
    clause
}

pub fn generate_create_table(table: &Table) -> String {
    let mut lines: Vec<String> = table
        .columns
        .iter()
        .map(|c| format!("  {}", column_definition(c)))
        .collect();

    if let Some(pk) = &table.primary_key {
        lines.push(format!("  {}", index_definition(pk)));
    }
    for index in &table.indexes {
        lines.push(format!("  {}", index_definition(index)));
    }
    for fk in &table.foreign_keys {
        lines.push(format!("  {}", foreign_key_definition(fk)));
    }

    let mut sql = format!(
        "CREATE TABLE {} (\n{}\n) ENGINE={}",
        quote_ident(&table.name),
        lines.join(",\n"),
        table.engine
    );
    if let Some(auto_increment) = table.auto_increment.filter(|n| *n > 1) {
        sql.push_str(&format!(" AUTO_INCREMENT={auto_increment}"));
    }
    sql.push_str(&format!(" DEFAULT CHARSET={}", table.charset));
    if !table.collation.is_empty() {
        sql.push_str(&format!(" COLLATE={}", table.collation));
    }
    if !table.create_options.is_empty() {
        sql.push_str(&format!(" {}", table.create_options.to_uppercase()));
    }
    if !table.comment.is_empty() {
        sql.push_str(&format!(" COMMENT='{}'", escape_string(&table.comment)));
    }
    sql
}

fn position_suffix(position: &ColumnPosition) -> String {
    match position {
        ColumnPosition::Last => String::new(),
        ColumnPosition::First => " FIRST".to_string(),
        ColumnPosition::After(column) => format!(" AFTER {}", quote_ident(column)),
    }
}

/// SQL fragment for one clause of an `ALTER TABLE`, if it has one.
pub fn generate_alter_clause(clause: &AlterClause) -> Option<String> {
    let sql = match clause {
        AlterClause::AddColumn { column, position } => format!(
            "ADD COLUMN {}{}",
            column_definition(column),
            position_suffix(position)
        ),
        AlterClause::DropColumn { column } => {
            format!("DROP COLUMN {}", quote_ident(&column.name))
        }
        AlterClause::AddIndex { index } => format!("ADD {}", index_definition(index)),
        AlterClause::DropIndex { index } if index.primary => "DROP PRIMARY KEY".to_string(),
        AlterClause::DropIndex { index } => format!("DROP KEY {}", quote_ident(&index.name)),
        AlterClause::AddForeignKey { foreign_key } => {
            format!("ADD {}", foreign_key_definition(foreign_key))
        }
        AlterClause::DropForeignKey { foreign_key } => {
            format!("DROP FOREIGN KEY {}", quote_ident(&foreign_key.name))
        }
        AlterClause::ModifyColumn { new, .. } => {
            format!("MODIFY COLUMN {}", column_definition(new))
        }
        AlterClause::RenameColumn { old, new } => format!(
            "CHANGE COLUMN {} {}",
            quote_ident(&old.name),
            column_definition(new)
        ),
        AlterClause::ChangeCharset { charset, collation } => charset_clause(charset, collation),
        // Counter drift between servers is expected; only a newly
        // introduced counter is worth a statement.
        AlterClause::ChangeAutoIncrement { old: None, new: Some(n) } if *n > 1 => {
            format!("AUTO_INCREMENT = {n}")
        }
        AlterClause::ChangeAutoIncrement { .. } => return None,
        AlterClause::ChangeCreateOptions { new, .. } if new.is_empty() => {
            "ROW_FORMAT=DEFAULT".to_string()
        }
        AlterClause::ChangeCreateOptions { new, .. } => new.to_uppercase(),
        AlterClause::ChangeComment { comment } => {
            format!("COMMENT '{}'", escape_string(comment))
        }
        AlterClause::ChangeStorageEngine { engine } => format!("ENGINE={engine}"),
    };
    Some(sql)
}

pub fn generate_alter_table(diff: &TableDiff) -> Option<String> {
    let clauses: Vec<String> = diff
        .clauses()
        .iter()
        .filter_map(generate_alter_clause)
        .collect();

    if clauses.is_empty() {
        return None;
    }
    Some(format!(
        "ALTER TABLE {} {}",
        quote_ident(diff.table_name()),
        clauses.join(", ")
    ))
}

/// Statement for a structural difference, without the trailing `;`.
/// Migrations differences have no statement form.
pub fn generate_statement(diff: &ObjectDiff) -> Option<String> {
    match diff {
        ObjectDiff::CreateTable(table) => Some(generate_create_table(table)),
        ObjectDiff::DropTable(table) => Some(format!("DROP TABLE {}", quote_ident(&table.name))),
        ObjectDiff::AlterTable(table_diff) => generate_alter_table(table_diff),
        ObjectDiff::Migrations(_) => None,
    }
}
