//! High-level API for embedding mydiff in other applications.
//!
//! [`diff`] runs the same pipeline as the CLI with structured inputs and
//! outputs: validate the options, connect to both servers, introspect the
//! schemas, compare them and render the result.
//!
//! # Example
//!
//! ```no_run
//! use mydiff::api::{diff_blocking, DiffOptions};
//!
//! let result = diff_blocking(
//!     DiffOptions::new(
//!         "root@tcp(127.0.0.1:3306)/",
//!         "root@tcp(127.0.0.1:3307)/",
//!         "acme",
//!     )
//!     .with_format("compact"),
//! )
//! .unwrap();
//!
//! print!("{}", result.output);
//! ```
//!
//! # Async vs Blocking
//!
//! Use [`diff`] when you already have a tokio runtime. [`diff_blocking`]
//! creates a new runtime per call.

mod error;
mod options;
mod results;

pub use error::Error;
pub use options::DiffOptions;
pub use results::DiffResult;

use crate::diff::{Diff, SchemaSnapshot};
use crate::dsn::Dsn;
use crate::format::Formatters;
use crate::mysql::{introspect_schema, MySqlConnection};
use crate::util::{mask_password, SchemaError};
use std::time::Duration;
use tracing::{debug, info};

fn parse_server(server: &str, dsn: &str) -> Result<Dsn, Error> {
    debug!(server, dsn = %mask_password(dsn), "parsing server DSN");
    Dsn::parse(dsn).map_err(|e| Error::invalid_server(server, e.to_string()))
}

async fn connect_and_introspect(
    server: &str,
    dsn: &Dsn,
    schema_name: &str,
    timeout: Duration,
) -> Result<SchemaSnapshot, Error> {
    let connection = MySqlConnection::new(dsn, timeout)
        .await
        .map_err(|e| Error::connection(format!("{server}: {e}")))?;

    let schema = introspect_schema(&connection, schema_name)
        .await
        .map_err(|e| match e {
            SchemaError::SchemaNotFound(_) => {
                Error::missing_schema(server, schema_name, e.to_string())
            }
            other => Error::introspection(format!("{server}: {other}")),
        })?;

    Ok(SchemaSnapshot::new(schema, dsn.clone()))
}

/// Compare a schema on two servers and render the differences.
pub async fn diff(options: DiffOptions) -> Result<DiffResult, Error> {
    diff_with(options, &Formatters::standard()).await
}

/// Like [`diff`], picking the formatter from `formatters`.
pub async fn diff_with(options: DiffOptions, formatters: &Formatters) -> Result<DiffResult, Error> {
    if options.schema1.is_empty() {
        return Err(Error::SchemaNameNotProvided);
    }
    let schema1 = options.schema1.as_str();
    let schema2 = options.schema2_or_default();

    let dsn1 = parse_server("server1", &options.server1)?;
    let dsn2 = parse_server("server2", &options.server2)?;
    let formatter = formatters.lookup(&options.format)?;

    let (from, to) = tokio::try_join!(
        connect_and_introspect("server1", &dsn1, schema1, options.timeout),
        connect_and_introspect("server2", &dsn2, schema2, options.timeout),
    )?;

    info!(
        from = %from.side(),
        to = %to.side(),
        format = %options.format,
        reverse = options.reverse,
        "comparing schemas"
    );

    let mut request = Diff::new(from, to).with_timeout(options.timeout);
    if options.reverse {
        request = request.reversed();
    }
    if options.diff_migrations {
        request = request.with_migrations(options.migrations_column.clone());
    }

    let diff = request.compute().await;
    let output = formatter.format(&diff);

    Ok(DiffResult { diff, output })
}

fn create_runtime() -> Result<tokio::runtime::Runtime, Error> {
    tokio::runtime::Runtime::new().map_err(|e| Error::runtime(e.to_string()))
}

/// Blocking variant of [`diff`].
pub fn diff_blocking(options: DiffOptions) -> Result<DiffResult, Error> {
    create_runtime()?.block_on(diff(options))
}
