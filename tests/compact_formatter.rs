mod common;
use common::*;

#[test]
fn add_column() {
    let mut target = tasks();
    target.columns.push(Column::new("owner_id", "int(11)"));

    let diff = schema_diff(
        schema("schema1", vec![tasks()]),
        schema("schema2", vec![target]),
    );

    assert_eq!(
        compact(&diff),
        "Differences found (1):\n\t- Table tasks differs: missing column owner_id in schema1.127.0.0.1:33060\n"
    );
}

#[test]
fn drop_column() {
    let mut source = tasks();
    source.columns.push(Column::new("owner_id", "int(11)"));

    let diff = schema_diff(
        schema("schema1", vec![source]),
        schema("schema2", vec![tasks()]),
    );

    assert_eq!(
        compact(&diff),
        "Differences found (1):\n\t- Table tasks differs: missing column owner_id in schema2.127.0.0.1:33062\n"
    );
}

#[test]
fn identical_schemas() {
    let diff = schema_diff(
        schema("schema1", vec![tasks()]),
        schema("schema2", vec![tasks()]),
    );

    assert!(diff.objects.is_empty());
    assert_eq!(compact(&diff), "No differences found");
}

#[test]
fn add_and_drop_index() {
    let mut indexed = tasks();
    indexed.indexes = vec![Index::new("title_index", ["title"])];

    let added = schema_diff(
        schema("schema1", vec![tasks()]),
        schema("schema2", vec![indexed.clone()]),
    );
    assert!(compact(&added)
        .contains("Table tasks differs: missing KEY title_index(title) in schema1.127.0.0.1:33060"));

    let dropped = schema_diff(
        schema("schema1", vec![indexed]),
        schema("schema2", vec![tasks()]),
    );
    assert!(compact(&dropped)
        .contains("Table tasks differs: missing KEY title_index(title) in schema2.127.0.0.1:33062"));
}

#[test]
fn changed_index_is_reported_on_both_sides() {
    let mut plain = tasks();
    plain.indexes = vec![Index::new("title_index", ["title", "id"])];
    let mut unique = tasks();
    unique.indexes = vec![Index::new("title_index", ["title", "id"]).unique()];

    let diff = schema_diff(schema("schema1", vec![plain]), schema("schema2", vec![unique]));

    assert_eq!(
        compact(&diff),
        "Differences found (2):\n\
         \t- Table tasks differs: missing KEY title_index(title, id) in schema2.127.0.0.1:33062\n\
         \t- Table tasks differs: missing UNIQUE KEY title_index(title, id) in schema1.127.0.0.1:33060\n"
    );
}

fn with_parent() -> Table {
    let mut table = tasks();
    table.columns.push(Column::new("parent_id", "bigint(20)").not_null());
    table
}

fn with_parent_fk() -> Table {
    let mut table = with_parent();
    table.indexes = vec![Index::new("tasks_ibfk_1", ["parent_id"])];
    let mut fk = ForeignKey::new("tasks_ibfk_1", &["parent_id"], "tasks", &["id"]);
    fk.update_rule = "CASCADE".to_string();
    table.foreign_keys = vec![fk];
    table
}

#[test]
fn add_foreign_key_collapses_with_its_index() {
    let diff = schema_diff(
        schema("schema1", vec![with_parent()]),
        schema("schema2", vec![with_parent_fk()]),
    );

    assert_eq!(
        compact(&diff),
        "Differences found (1):\n\t- Table tasks differs: missing FOREIGN KEY tasks_ibfk_1(parent_id) REFERENCES tasks(id) in schema1.127.0.0.1:33060\n"
    );
}

#[test]
fn drop_foreign_key_collapses_with_its_index() {
    let diff = schema_diff(
        schema("schema1", vec![with_parent_fk()]),
        schema("schema2", vec![with_parent()]),
    );

    assert_eq!(
        compact(&diff),
        "Differences found (1):\n\t- Table tasks differs: missing FOREIGN KEY tasks_ibfk_1(parent_id) REFERENCES tasks(id) in schema2.127.0.0.1:33062\n"
    );
}

#[test]
fn foreign_key_on_existing_index_keeps_preceding_line() {
    let mut source = with_parent();
    source.indexes = vec![Index::new("tasks_ibfk_1", ["parent_id"])];
    let mut target = with_parent_fk();
    target.columns[1] = Column::new("title", "varchar(100)").not_null();

    let report = compact(&schema_diff(
        schema("schema1", vec![source]),
        schema("schema2", vec![target]),
    ));

    assert!(report.starts_with("Differences found (2):\n"));
    assert!(report.contains("Table tasks differs: column title differs in column type"));
    assert!(report.contains(
        "Table tasks differs: missing FOREIGN KEY tasks_ibfk_1(parent_id) REFERENCES tasks(id) in schema1.127.0.0.1:33060"
    ));
}

#[test]
fn modified_column_type() {
    let source = with_parent();
    let mut target = with_parent();
    target.columns[2] = Column::new("parent_id", "int(11)").default_value("'0'");

    let diff = schema_diff(schema("schema1", vec![source]), schema("schema2", vec![target]));

    assert!(compact(&diff).contains(
        "Table tasks differs: column parent_id differs in column type: bigint(20) NOT NULL in schema1.127.0.0.1:33060, int(11) DEFAULT '0' in schema2.127.0.0.1:33062"
    ));
}

#[test]
fn auto_increment_change_is_reported_once() {
    let mut source = tasks();
    source.columns[0].auto_increment = false;
    let mut target = tasks();
    target.auto_increment = Some(1);

    let diff = schema_diff(schema("schema1", vec![source]), schema("schema2", vec![target]));

    assert_eq!(
        compact(&diff),
        "Differences found (1):\n\t- Table tasks differs: column id differs in column type: bigint(20) NOT NULL in schema1.127.0.0.1:33060, bigint(20) NOT NULL AUTO_INCREMENT in schema2.127.0.0.1:33062\n"
    );
}

#[test]
fn changed_charset() {
    let mut target = tasks();
    target.charset = "utf8mb4".to_string();
    target.collation = "utf8mb4_general_ci".to_string();

    let diff = schema_diff(schema("schema1", vec![tasks()]), schema("schema2", vec![target]));

    assert_eq!(
        compact(&diff),
        "Differences found (1):\n\t- Table tasks differs: encoding changed to DEFAULT CHARACTER SET = utf8mb4 COLLATE = utf8mb4_general_ci in schema2.127.0.0.1:33062\n"
    );
}

#[test]
fn unreported_clauses_do_not_stop_the_report() {
    let mut source = tasks();
    source.comment = "old".to_string();
    let mut target = tasks();
    target.comment = "new".to_string();
    target.columns.push(Column::new("owner_id", "int(11)"));

    let diff = schema_diff(
        schema("schema1", vec![source, Table::new("zombies")]),
        schema("schema2", vec![target]),
    );

    assert_eq!(
        compact(&diff),
        "Differences found (2):\n\
         \t- Table tasks differs: missing column owner_id in schema1.127.0.0.1:33060\n\
         \t- Table zombies is absent in schema2.127.0.0.1:33062\n"
    );
}

#[test]
fn created_and_dropped_tables() {
    let created = schema_diff(schema("schema1", vec![]), schema("schema2", vec![tasks()]));
    assert_eq!(
        compact(&created),
        "Differences found (1):\n\t- Table tasks is absent in schema1.127.0.0.1:33060\n"
    );

    let dropped = schema_diff(schema("schema1", vec![tasks()]), schema("schema2", vec![]));
    assert_eq!(
        compact(&dropped),
        "Differences found (1):\n\t- Table tasks is absent in schema2.127.0.0.1:33062\n"
    );
}

#[test]
fn missing_migrations_render_as_nested_list() {
    let mut diff = schema_diff(schema("schema1", vec![]), schema("schema2", vec![]));
    diff.objects.push(ObjectDiff::Migrations(MigrationsDiff::between(
        "schema_migrations",
        "version",
        &["20190815193300".to_string(), "20190817000000".to_string()],
        &["20190815193300".to_string(), "20190816000000".to_string()],
    )));

    assert_eq!(
        compact(&diff),
        "Differences found (1):\n\
         \t- Some migrations are missing:\n\
         \t\t- 127.0.0.1:33060\n\
         \t\t\t- 20190816000000\n\
         \t\t- 127.0.0.1:33062\n\
         \t\t\t- 20190817000000\n"
    );
}
