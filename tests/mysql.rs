//! Tests against a live MySQL server. They need Docker:
//! `cargo test --test mysql -- --ignored`

mod common;
use common::*;
use mydiff::api::{diff, DiffOptions, Error};

const TASKS: &str = "CREATE TABLE tasks (
    id BIGINT AUTO_INCREMENT,
    title VARCHAR(255) NOT NULL,
    PRIMARY KEY (id)
) ENGINE=INNODB";

const TASKS_WITH_OWNER: &str = "CREATE TABLE tasks (
    id BIGINT AUTO_INCREMENT,
    title VARCHAR(255) NOT NULL,
    owner_id INT,
    PRIMARY KEY (id)
) ENGINE=INNODB";

const MIGRATIONS: &str = "CREATE TABLE schema_migrations (
    version VARCHAR(255) NOT NULL,
    UNIQUE KEY version_key (version)
) ENGINE=INNODB";

#[tokio::test]
#[ignore]
async fn introspects_tables_columns_and_indexes() {
    let (_container, dsn) = setup_mysql().await;
    create_schema(
        &dsn,
        "acme",
        &[
            TASKS_WITH_OWNER,
            "CREATE INDEX title_index ON tasks (title(10), id)",
        ],
    )
    .await;

    let connection = MySqlConnection::new(
        &Dsn::parse(&dsn).unwrap().with_database("acme"),
        Duration::from_secs(30),
    )
    .await
    .unwrap();
    let schema = introspect_schema(&connection, "acme").await.unwrap();

    let tasks = &schema.tables["tasks"];
    let names: Vec<&str> = tasks.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["id", "title", "owner_id"]);
    assert!(tasks.columns[0].auto_increment);
    assert!(!tasks.columns[1].nullable);
    assert!(tasks.columns[2].nullable);
    assert_eq!(tasks.primary_key.as_ref().unwrap().column_names(), vec!["id"]);
    assert_eq!(tasks.indexes.len(), 1);
    assert_eq!(tasks.indexes[0].columns[0].sub_part, Some(10));
    assert_eq!(tasks.engine, "InnoDB");
}

#[tokio::test]
#[ignore]
async fn missing_schema_is_reported() {
    let (_container, dsn) = setup_mysql().await;

    let err = diff(DiffOptions::new(&dsn, &dsn, "nowhere")).await.unwrap_err();
    assert!(matches!(err, Error::MissingSchema { .. }));
    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
#[ignore]
async fn compact_diff_between_two_schemas() {
    let (_container, dsn) = setup_mysql().await;
    create_schema(&dsn, "schema1", &[TASKS]).await;
    create_schema(&dsn, "schema2", &[TASKS_WITH_OWNER]).await;

    let options = DiffOptions::new(&dsn, &dsn, "schema1")
        .with_schema2("schema2")
        .with_format("compact");
    let address = Dsn::parse(&dsn).unwrap().address();

    let result = diff(options.clone()).await.unwrap();
    assert_eq!(
        result.output.to_string(),
        format!(
            "Differences found (1):\n\t- Table tasks differs: missing column owner_id in schema1.{address}\n"
        )
    );

    let reversed = diff(options.with_reverse(true)).await.unwrap();
    assert_eq!(
        reversed.output.to_string(),
        format!(
            "Differences found (1):\n\t- Table tasks differs: missing column owner_id in schema1.{address}\n"
        )
    );
}

#[tokio::test]
#[ignore]
async fn sql_diff_alters_the_source_into_the_target() {
    let (_container, dsn) = setup_mysql().await;
    create_schema(&dsn, "schema1", &[TASKS]).await;
    create_schema(&dsn, "schema2", &[TASKS_WITH_OWNER]).await;

    let result = diff(DiffOptions::new(&dsn, &dsn, "schema1").with_schema2("schema2"))
        .await
        .unwrap();

    let sql = result.output.to_string();
    assert!(sql.starts_with("ALTER TABLE `tasks` ADD COLUMN `owner_id` int"), "{sql}");
    assert!(sql.ends_with(" DEFAULT NULL;\n"), "{sql}");
    assert_eq!(sql.lines().count(), 1);
}

#[tokio::test]
#[ignore]
async fn reconciles_migrations() {
    let (_container, dsn) = setup_mysql().await;
    create_schema(
        &dsn,
        "schema1",
        &[
            MIGRATIONS,
            "INSERT INTO schema_migrations VALUES ('20190815193300')",
            "INSERT INTO schema_migrations VALUES ('20190817000000')",
        ],
    )
    .await;
    create_schema(
        &dsn,
        "schema2",
        &[
            MIGRATIONS,
            "INSERT INTO schema_migrations VALUES ('20190815193300')",
            "INSERT INTO schema_migrations VALUES ('20190816000000')",
        ],
    )
    .await;

    let result = diff(
        DiffOptions::new(&dsn, &dsn, "schema1")
            .with_schema2("schema2")
            .with_format("compact")
            .with_migrations("schema_migrations.version"),
    )
    .await
    .unwrap();

    let migrations = match result.diff.objects.last() {
        Some(ObjectDiff::Migrations(migrations)) => migrations,
        other => panic!("expected a migrations difference, got {other:?}"),
    };
    assert_eq!(migrations.missing_in_source(), ["20190816000000".to_string()]);
    assert_eq!(migrations.missing_in_target(), ["20190817000000".to_string()]);
    assert!(result.output.to_string().contains("Some migrations are missing:"));
}

#[tokio::test]
#[ignore]
async fn missing_migrations_table_does_not_fail_the_diff() {
    let (_container, dsn) = setup_mysql().await;
    create_schema(&dsn, "schema1", &[TASKS]).await;
    create_schema(&dsn, "schema2", &[TASKS]).await;

    let result = diff(
        DiffOptions::new(&dsn, &dsn, "schema1")
            .with_schema2("schema2")
            .with_format("compact")
            .with_migrations("schema_migrations.version"),
    )
    .await
    .unwrap();

    assert!(result.is_empty());
    assert_eq!(result.output.to_string(), "No differences found");
}
