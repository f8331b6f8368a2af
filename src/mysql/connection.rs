use crate::dsn::Dsn;
use crate::migrations::VersionSource;
use crate::mysql::sqlgen::quote_ident;
use crate::util::{sanitize_error, Result, SchemaError};
use sqlx::mysql::{MySqlPoolOptions, MySqlRow};
use sqlx::{MySql, Pool, Row};
use std::future::Future;
use std::time::Duration;

pub struct MySqlConnection {
    pool: Pool<MySql>,
    dsn: Dsn,
}

impl MySqlConnection {
    /// Opens a pool and checks the server is reachable within `timeout`.
    pub async fn new(dsn: &Dsn, timeout: Duration) -> Result<Self> {
        let url = dsn.to_url()?;
        let pool = MySqlPoolOptions::new()
            .max_connections(2)
            .acquire_timeout(timeout)
            .connect(&url)
            .await
            .map_err(|e| connection_error(dsn, &e))?;

        Ok(MySqlConnection {
            pool,
            dsn: dsn.clone(),
        })
    }

    /// Builds a pool without connecting; the first query opens the connection.
    pub fn lazy(dsn: &Dsn, timeout: Duration) -> Result<Self> {
        let url = dsn.to_url()?;
        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(timeout)
            .connect_lazy(&url)
            .map_err(|e| connection_error(dsn, &e))?;

        Ok(MySqlConnection {
            pool,
            dsn: dsn.clone(),
        })
    }

    pub fn pool(&self) -> &Pool<MySql> {
        &self.pool
    }

    pub fn dsn(&self) -> &Dsn {
        &self.dsn
    }
}

fn connection_error(dsn: &Dsn, error: &sqlx::Error) -> SchemaError {
    SchemaError::DatabaseError(format!(
        "Failed to connect to {dsn}: {}",
        sanitize_error(&error.to_string(), dsn.password())
    ))
}

impl VersionSource for MySqlConnection {
    fn address(&self) -> String {
        self.dsn.address()
    }

    fn database(&self) -> &str {
        self.dsn.database().unwrap_or_default()
    }

    fn versions(
        &self,
        table: &str,
        column: &str,
    ) -> impl Future<Output = Result<Vec<String>>> + Send {
        let column = quote_ident(column);
        let sql = format!(
            "SELECT {column} FROM {} ORDER BY {column}",
            quote_ident(table)
        );

        async move {
            let rows = sqlx::query(&sql)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    SchemaError::DatabaseError(sanitize_error(&e.to_string(), self.dsn.password()))
                })?;

            rows.iter().map(value_as_string).collect()
        }
    }
}

/// Stringifies the first column of `row` whatever its SQL type.
fn value_as_string(row: &MySqlRow) -> Result<String> {
    if let Ok(value) = row.try_get::<Option<String>, _>(0) {
        return Ok(value.unwrap_or_default());
    }
    if let Ok(value) = row.try_get::<Option<i64>, _>(0) {
        return Ok(value.map(|v| v.to_string()).unwrap_or_default());
    }
    if let Ok(value) = row.try_get::<Option<u64>, _>(0) {
        return Ok(value.map(|v| v.to_string()).unwrap_or_default());
    }
    if let Ok(value) = row.try_get::<Option<f64>, _>(0) {
        return Ok(value.map(|v| v.to_string()).unwrap_or_default());
    }
    if let Ok(value) = row.try_get::<Option<Vec<u8>>, _>(0) {
        return Ok(value
            .map(|v| String::from_utf8_lossy(&v).into_owned())
            .unwrap_or_default());
    }
    Err(SchemaError::DatabaseError(
        "unsupported column type for migration versions".to_string(),
    ))
}
