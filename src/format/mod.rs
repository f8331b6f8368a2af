//! Rendering of a [`SchemaDiff`] into user-facing output.
//!
//! Formatters are looked up by name in a [`Formatters`] registry built once
//! at startup and never mutated afterwards.

mod compact;
mod ghost;
mod sql;

pub use compact::CompactFormatter;
pub use ghost::GhostFormatter;
pub use sql::SqlFormatter;

use crate::diff::{AlterClause, SchemaDiff};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Output of a formatter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Text(String),
    /// Structured instructions for external renderers such as online schema
    /// change tools.
    Instructions(Vec<AlterClause>),
}

impl Rendered {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Rendered::Text(text) => Some(text),
            Rendered::Instructions(_) => None,
        }
    }
}

impl fmt::Display for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rendered::Text(text) => f.write_str(text),
            Rendered::Instructions(instructions) => {
                for instruction in instructions {
                    writeln!(f, "{instruction:?}")?;
                }
                Ok(())
            }
        }
    }
}

pub trait Formatter: Send + Sync {
    fn format(&self, diff: &SchemaDiff) -> Rendered;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown formatter {name}, only ({}) are allowed", .available.join(","))]
pub struct UnknownFormatter {
    pub name: String,
    pub available: Vec<String>,
}

/// Named formatters available to a run.
pub struct Formatters {
    registry: BTreeMap<String, Box<dyn Formatter>>,
}

impl Formatters {
    pub fn standard() -> Self {
        let mut registry: BTreeMap<String, Box<dyn Formatter>> = BTreeMap::new();
        registry.insert("compact".to_string(), Box::new(CompactFormatter));
        registry.insert("ghost".to_string(), Box::new(GhostFormatter));
        registry.insert("sql".to_string(), Box::new(SqlFormatter));
        Self { registry }
    }

    /// Case-insensitive lookup.
    pub fn lookup(&self, name: &str) -> Result<&dyn Formatter, UnknownFormatter> {
        self.registry
            .get(&name.to_lowercase())
            .map(|formatter| formatter.as_ref())
            .ok_or_else(|| UnknownFormatter {
                name: name.to_string(),
                available: self.names(),
            })
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.registry.keys().cloned().collect()
    }
}

impl Default for Formatters {
    fn default() -> Self {
        Self::standard()
    }
}
