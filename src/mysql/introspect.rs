use crate::model::*;
use crate::mysql::connection::MySqlConnection;
use crate::util::{Result, SchemaError};
use regex::Regex;
use sqlx::mysql::MySqlRow;
use sqlx::Row;
use std::collections::BTreeMap;
use tracing::debug;

/// Reads the structure of `schema_name` from `information_schema`.
///
/// Fails with [`SchemaError::SchemaNotFound`] when the server has no such
/// schema.
pub async fn introspect_schema(connection: &MySqlConnection, schema_name: &str) -> Result<Schema> {
    let mut schema = introspect_schemata(connection, schema_name).await?;
    schema.tables = introspect_tables(connection, schema_name).await?;

    for (table_name, columns) in introspect_columns(connection, schema_name).await? {
        if let Some(table) = schema.tables.get_mut(&table_name) {
            table.columns = columns
                .into_iter()
                .map(|column| relative_to_table(column, table))
                .collect();
        }
    }

    for (table_name, mut indexes) in introspect_indexes(connection, schema_name).await? {
        if let Some(table) = schema.tables.get_mut(&table_name) {
            if let Some(pos) = indexes.iter().position(|i| i.primary) {
                table.primary_key = Some(indexes.remove(pos));
            }
            indexes.sort();
            table.indexes = indexes;
        }
    }

    for (table_name, mut foreign_keys) in introspect_foreign_keys(connection, schema_name).await? {
        if let Some(table) = schema.tables.get_mut(&table_name) {
            foreign_keys.sort();
            table.foreign_keys = foreign_keys;
        }
    }

    debug!(
        schema = %schema_name,
        address = %connection.dsn().address(),
        tables = schema.tables.len(),
        "introspected schema"
    );
    Ok(schema)
}

fn query_error(what: &str, e: sqlx::Error) -> SchemaError {
    SchemaError::DatabaseError(format!("Failed to fetch {what}: {e}"))
}

fn column<T>(row: &MySqlRow, name: &str) -> Result<T>
where
    T: for<'r> sqlx::Decode<'r, sqlx::MySql> + sqlx::Type<sqlx::MySql>,
{
    row.try_get(name)
        .map_err(|e| SchemaError::DatabaseError(format!("Failed to read {name}: {e}")))
}

async fn introspect_schemata(connection: &MySqlConnection, schema_name: &str) -> Result<Schema> {
    let row = sqlx::query(
        r#"
        SELECT
            CAST(SCHEMA_NAME AS CHAR) AS name,
            CAST(DEFAULT_CHARACTER_SET_NAME AS CHAR) AS charset,
            CAST(DEFAULT_COLLATION_NAME AS CHAR) AS collation
        FROM information_schema.SCHEMATA
        WHERE SCHEMA_NAME = ?
        "#,
    )
    .bind(schema_name)
    .fetch_optional(connection.pool())
    .await
    .map_err(|e| query_error("schemata", e))?
    .ok_or_else(|| SchemaError::SchemaNotFound(schema_name.to_string()))?;

    let mut schema = Schema::new(column::<String>(&row, "name")?);
    schema.charset = column(&row, "charset")?;
    schema.collation = column(&row, "collation")?;
    Ok(schema)
}

async fn introspect_tables(
    connection: &MySqlConnection,
    schema_name: &str,
) -> Result<BTreeMap<String, Table>> {
    let rows = sqlx::query(
        r#"
        SELECT
            CAST(t.TABLE_NAME AS CHAR) AS name,
            CAST(COALESCE(t.ENGINE, '') AS CHAR) AS engine,
            CAST(COALESCE(c.CHARACTER_SET_NAME, '') AS CHAR) AS charset,
            CAST(COALESCE(t.TABLE_COLLATION, '') AS CHAR) AS collation,
            CAST(t.AUTO_INCREMENT AS UNSIGNED) AS auto_increment,
            CAST(COALESCE(t.CREATE_OPTIONS, '') AS CHAR) AS create_options,
            CAST(COALESCE(t.TABLE_COMMENT, '') AS CHAR) AS comment
        FROM information_schema.TABLES t
        LEFT JOIN information_schema.COLLATIONS c
            ON c.COLLATION_NAME = t.TABLE_COLLATION
        WHERE t.TABLE_SCHEMA = ? AND t.TABLE_TYPE = 'BASE TABLE'
        ORDER BY t.TABLE_NAME
        "#,
    )
    .bind(schema_name)
    .fetch_all(connection.pool())
    .await
    .map_err(|e| query_error("tables", e))?;

    let mut tables = BTreeMap::new();
    for row in rows {
        let mut table = Table::new(column::<String>(&row, "name")?);
        table.engine = column(&row, "engine")?;
        table.charset = column(&row, "charset")?;
        table.collation = column(&row, "collation")?;
        table.auto_increment = column(&row, "auto_increment")?;
        table.create_options = normalize_create_options(&column::<String>(&row, "create_options")?);
        table.comment = column(&row, "comment")?;
        tables.insert(table.name.clone(), table);
    }

    Ok(tables)
}

/// Partitioning is reported in `CREATE_OPTIONS` but is not a table option.
fn normalize_create_options(raw: &str) -> String {
    raw.split_whitespace()
        .filter(|option| !option.eq_ignore_ascii_case("partitioned"))
        .collect::<Vec<_>>()
        .join(" ")
}

async fn introspect_columns(
    connection: &MySqlConnection,
    schema_name: &str,
) -> Result<BTreeMap<String, Vec<Column>>> {
    let rows = sqlx::query(
        r#"
        SELECT
            CAST(TABLE_NAME AS CHAR) AS table_name,
            CAST(COLUMN_NAME AS CHAR) AS name,
            CAST(COLUMN_TYPE AS CHAR) AS column_type,
            CAST(IS_NULLABLE AS CHAR) AS is_nullable,
            CAST(COLUMN_DEFAULT AS CHAR) AS column_default,
            CAST(EXTRA AS CHAR) AS extra,
            CAST(CHARACTER_SET_NAME AS CHAR) AS charset,
            CAST(COLLATION_NAME AS CHAR) AS collation,
            CAST(COALESCE(COLUMN_COMMENT, '') AS CHAR) AS comment
        FROM information_schema.COLUMNS
        WHERE TABLE_SCHEMA = ?
        ORDER BY TABLE_NAME, ORDINAL_POSITION
        "#,
    )
    .bind(schema_name)
    .fetch_all(connection.pool())
    .await
    .map_err(|e| query_error("columns", e))?;

    let mut columns: BTreeMap<String, Vec<Column>> = BTreeMap::new();
    for row in rows {
        let table_name: String = column(&row, "table_name")?;
        let extra: String = column::<Option<String>>(&row, "extra")?.unwrap_or_default();
        let raw_default: Option<String> = column(&row, "column_default")?;

        let mut col = Column::new(
            column::<String>(&row, "name")?,
            column::<String>(&row, "column_type")?,
        );
        col.nullable = column::<String>(&row, "is_nullable")? == "YES";
        col.default = render_default(raw_default.as_deref(), &col.column_type, &extra);
        col.auto_increment = extra.to_ascii_lowercase().contains("auto_increment");
        col.on_update = parse_on_update(&extra);
        col.charset = column(&row, "charset")?;
        col.collation = column(&row, "collation")?;
        col.comment = column(&row, "comment")?;

        columns.entry(table_name).or_default().push(col);
    }

    Ok(columns)
}

/// Drops column charset and collation when they match the table's.
fn relative_to_table(mut column: Column, table: &Table) -> Column {
    if column.charset.as_deref() == Some(table.charset.as_str()) {
        column.charset = None;
    }
    if column.collation.as_deref() == Some(table.collation.as_str()) {
        column.collation = None;
    }
    column
}

/// Renders an `information_schema` default as it would be written in DDL.
fn render_default(raw: Option<&str>, column_type: &str, extra: &str) -> Option<String> {
    let raw = raw?;
    if raw.eq_ignore_ascii_case("NULL") {
        return None;
    }

    let upper = raw.to_ascii_uppercase();
    if upper.starts_with("CURRENT_TIMESTAMP") || upper == "NOW()" {
        return Some(raw.to_string());
    }
    if extra.to_ascii_uppercase().contains("DEFAULT_GENERATED") {
        return Some(format!("({raw})"));
    }

    let base = column_type.to_ascii_lowercase();
    if base.starts_with("bit") && raw.starts_with("b'") {
        return Some(raw.to_string());
    }
    Some(format!("'{}'", raw.replace('\'', "''")))
}

fn parse_on_update(extra: &str) -> Option<String> {
    let re = Regex::new(r"(?i)on update ([a-z_]+(?:\(\d*\))?)").ok()?;
    re.captures(extra)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_uppercase())
}

async fn introspect_indexes(
    connection: &MySqlConnection,
    schema_name: &str,
) -> Result<BTreeMap<String, Vec<Index>>> {
    let rows = sqlx::query(
        r#"
        SELECT
            CAST(TABLE_NAME AS CHAR) AS table_name,
            CAST(INDEX_NAME AS CHAR) AS name,
            CAST(COLUMN_NAME AS CHAR) AS column_name,
            CAST(NON_UNIQUE AS SIGNED) AS non_unique,
            CAST(SUB_PART AS UNSIGNED) AS sub_part,
            CAST(COALESCE(INDEX_COMMENT, '') AS CHAR) AS comment
        FROM information_schema.STATISTICS
        WHERE TABLE_SCHEMA = ?
        ORDER BY TABLE_NAME, INDEX_NAME, SEQ_IN_INDEX
        "#,
    )
    .bind(schema_name)
    .fetch_all(connection.pool())
    .await
    .map_err(|e| query_error("indexes", e))?;

    let mut indexes: BTreeMap<String, Vec<Index>> = BTreeMap::new();
    for row in rows {
        let table_name: String = column(&row, "table_name")?;
        let name: String = column(&row, "name")?;
        // Functional index parts have no column name.
        let Some(column_name) = column::<Option<String>>(&row, "column_name")? else {
            continue;
        };
        let sub_part = column::<Option<u64>>(&row, "sub_part")?.and_then(|n| u32::try_from(n).ok());

        let table_indexes = indexes.entry(table_name).or_default();
        let pos = match table_indexes.iter().position(|i| i.name == name) {
            Some(pos) => pos,
            None => {
                let mut index = Index::new(name.clone(), Vec::<String>::new());
                index.primary = name == "PRIMARY";
                index.unique = column::<i64>(&row, "non_unique")? == 0;
                index.comment = column(&row, "comment")?;
                table_indexes.push(index);
                table_indexes.len() - 1
            }
        };
        table_indexes[pos].columns.push(IndexColumn {
            name: column_name,
            sub_part,
        });
    }

    Ok(indexes)
}

async fn introspect_foreign_keys(
    connection: &MySqlConnection,
    schema_name: &str,
) -> Result<BTreeMap<String, Vec<ForeignKey>>> {
    let rows = sqlx::query(
        r#"
        SELECT
            CAST(k.TABLE_NAME AS CHAR) AS table_name,
            CAST(k.CONSTRAINT_NAME AS CHAR) AS name,
            CAST(k.COLUMN_NAME AS CHAR) AS column_name,
            CAST(k.REFERENCED_TABLE_SCHEMA AS CHAR) AS referenced_schema,
            CAST(k.REFERENCED_TABLE_NAME AS CHAR) AS referenced_table,
            CAST(k.REFERENCED_COLUMN_NAME AS CHAR) AS referenced_column,
            CAST(r.UPDATE_RULE AS CHAR) AS update_rule,
            CAST(r.DELETE_RULE AS CHAR) AS delete_rule
        FROM information_schema.KEY_COLUMN_USAGE k
        JOIN information_schema.REFERENTIAL_CONSTRAINTS r
            ON r.CONSTRAINT_SCHEMA = k.CONSTRAINT_SCHEMA
            AND r.CONSTRAINT_NAME = k.CONSTRAINT_NAME
            AND r.TABLE_NAME = k.TABLE_NAME
        WHERE k.TABLE_SCHEMA = ? AND k.REFERENCED_TABLE_NAME IS NOT NULL
        ORDER BY k.TABLE_NAME, k.CONSTRAINT_NAME, k.ORDINAL_POSITION
        "#,
    )
    .bind(schema_name)
    .fetch_all(connection.pool())
    .await
    .map_err(|e| query_error("foreign keys", e))?;

    let mut foreign_keys: BTreeMap<String, Vec<ForeignKey>> = BTreeMap::new();
    for row in rows {
        let table_name: String = column(&row, "table_name")?;
        let name: String = column(&row, "name")?;
        let column_name: String = column(&row, "column_name")?;
        let referenced_column: String = column(&row, "referenced_column")?;

        let table_fks = foreign_keys.entry(table_name).or_default();
        match table_fks.iter_mut().find(|fk| fk.name == name) {
            Some(fk) => {
                fk.columns.push(column_name);
                fk.referenced_columns.push(referenced_column);
            }
            None => {
                let referenced_schema: String = column(&row, "referenced_schema")?;
                let mut fk = ForeignKey::new(
                    name,
                    &[column_name.as_str()],
                    column::<String>(&row, "referenced_table")?,
                    &[referenced_column.as_str()],
                );
                fk.referenced_schema =
                    (referenced_schema != schema_name).then_some(referenced_schema);
                fk.update_rule = column(&row, "update_rule")?;
                fk.delete_rule = column(&row, "delete_rule")?;
                table_fks.push(fk);
            }
        }
    }

    Ok(foreign_keys)
}
