//! mydiff - Compute the differences between two MySQL schemas.
//!
//! Both schemas are read from live servers through `information_schema`,
//! compared table by table, and rendered by a named formatter: SQL
//! statements, a compact human-readable summary, or instructions for online
//! schema change tools. Optionally, the migration versions recorded by each
//! side are reconciled as well.
//!
//! # Quick Start
//!
//! ```no_run
//! use mydiff::prelude::*;
//!
//! let result = diff_blocking(
//!     DiffOptions::new("root@tcp(127.0.0.1:3306)/", "root@tcp(127.0.0.1:3307)/", "acme")
//!         .with_format("compact")
//!         .with_migrations("schema_migrations.version"),
//! )
//! .unwrap();
//!
//! print!("{}", result.output);
//! ```
//!
//! # Modules
//!
//! - [`api`] - High-level entry point mirroring the CLI
//! - [`diff`] - Structural comparison and the diff orchestrator
//! - [`migrations`] - Migration versions reconciliation
//! - [`format`] - Formatter registry and formatters
//! - [`model`] - Schema model types (Table, Column, Index, etc.)
//! - [`mysql`] - Connections, introspection and DDL generation

pub mod api;
pub mod diff;
pub mod dsn;
pub mod format;
pub mod migrations;
pub mod model;
pub mod mysql;
pub mod prelude;
pub mod util;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
