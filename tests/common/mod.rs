#![allow(unused_imports, dead_code)]

pub use mydiff::diff::{compute_diff, Diff, ObjectDiff, SchemaDiff, SchemaSnapshot, Side};
pub use mydiff::dsn::Dsn;
pub use mydiff::format::{Formatters, Rendered};
pub use mydiff::migrations::MigrationsDiff;
pub use mydiff::model::{Column, ForeignKey, Index, Schema, Table};
pub use mydiff::mysql::{introspect_schema, MySqlConnection};
pub use std::time::Duration;
pub use testcontainers::runners::AsyncRunner;
pub use testcontainers::ContainerAsync;
pub use testcontainers_modules::mysql::Mysql;

pub const FROM_ADDRESS: &str = "127.0.0.1:33060";
pub const TO_ADDRESS: &str = "127.0.0.1:33062";

pub fn schema(name: &str, tables: Vec<Table>) -> Schema {
    let mut schema = Schema::new(name);
    for table in tables {
        schema.tables.insert(table.name.clone(), table);
    }
    schema
}

/// `tasks(id BIGINT AUTO_INCREMENT, title VARCHAR(255) NOT NULL, PRIMARY KEY (id))`
pub fn tasks() -> Table {
    let mut table = Table::new("tasks");
    table.columns = vec![
        Column::new("id", "bigint(20)").not_null().auto_increment(),
        Column::new("title", "varchar(255)").not_null(),
    ];
    table.primary_key = Some(Index::primary(["id"]));
    table
}

pub fn schema_diff(from: Schema, to: Schema) -> SchemaDiff {
    SchemaDiff {
        from: Side::new(&from.name, FROM_ADDRESS),
        to: Side::new(&to.name, TO_ADDRESS),
        objects: compute_diff(&from, &to),
    }
}

pub fn compact(diff: &SchemaDiff) -> String {
    Formatters::standard()
        .lookup("compact")
        .unwrap()
        .format(diff)
        .to_string()
}

/// Starts a MySQL server and returns its driver DSN, without a database.
pub async fn setup_mysql() -> (ContainerAsync<Mysql>, String) {
    let container = Mysql::default().start().await.unwrap();
    let port = container.get_host_port_ipv4(3306).await.unwrap();
    let dsn = format!("root@tcp(127.0.0.1:{port})/");
    (container, dsn)
}

/// Creates `name` on the server behind `dsn` and runs `statements` in it.
pub async fn create_schema(dsn: &str, name: &str, statements: &[&str]) {
    let server = MySqlConnection::new(&Dsn::parse(dsn).unwrap(), Duration::from_secs(30))
        .await
        .unwrap();
    sqlx::query(&format!("CREATE DATABASE `{name}`"))
        .execute(server.pool())
        .await
        .unwrap();

    let dsn = Dsn::parse(dsn).unwrap().with_database(name);
    let connection = MySqlConnection::new(&dsn, Duration::from_secs(30))
        .await
        .unwrap();
    for statement in statements {
        sqlx::query(statement)
            .execute(connection.pool())
            .await
            .unwrap();
    }
}
