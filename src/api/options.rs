use crate::diff::orchestrator::DEFAULT_TIMEOUT;
use crate::migrations::DEFAULT_MIGRATIONS_COLUMN;
use std::time::Duration;

/// Options for comparing a schema across two servers.
#[derive(Debug, Clone)]
pub struct DiffOptions {
    /// DSN of the first server
    pub server1: String,
    /// DSN of the second server
    pub server2: String,
    /// Schema to read from server1
    pub schema1: String,
    /// Schema to read from server2 (default: same as schema1)
    pub schema2: Option<String>,
    /// Formatter name, matched case-insensitively (default: "sql")
    pub format: String,
    /// Compare server2 against server1 instead
    pub reverse: bool,
    /// Reconcile the recorded migration versions too
    pub diff_migrations: bool,
    /// `table.column` holding the migration versions
    pub migrations_column: String,
    /// Bound for connecting and for each migrations query
    pub timeout: Duration,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            server1: String::new(),
            server2: String::new(),
            schema1: String::new(),
            schema2: None,
            format: "sql".into(),
            reverse: false,
            diff_migrations: false,
            migrations_column: DEFAULT_MIGRATIONS_COLUMN.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl DiffOptions {
    /// Create new diff options with required fields.
    pub fn new(
        server1: impl Into<String>,
        server2: impl Into<String>,
        schema1: impl Into<String>,
    ) -> Self {
        Self {
            server1: server1.into(),
            server2: server2.into(),
            schema1: schema1.into(),
            ..Default::default()
        }
    }

    pub fn with_schema2(mut self, schema2: impl Into<String>) -> Self {
        self.schema2 = Some(schema2.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// Enable migrations reconciliation on `table.column`.
    pub fn with_migrations(mut self, column: impl Into<String>) -> Self {
        self.diff_migrations = true;
        self.migrations_column = column.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Schema name on server2: the explicit one, or schema1 when absent or
    /// blank.
    pub fn schema2_or_default(&self) -> &str {
        match self.schema2.as_deref() {
            Some(schema2) if !schema2.is_empty() => schema2,
            _ => &self.schema1,
        }
    }
}
