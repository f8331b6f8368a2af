use crate::format::UnknownFormatter;
use thiserror::Error;

/// Structured error type for mydiff library operations.
///
/// Every variant is fatal to the run and maps to a distinct process exit
/// code through [`Error::exit_code`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("schema_name has to be provided")]
    SchemaNameNotProvided,

    #[error("{server} has to be a server DSN. Error: {message}")]
    InvalidServer { server: String, message: String },

    #[error("{server} doesn't contain schema {schema}. Error: {message}")]
    MissingSchema {
        server: String,
        schema: String,
        message: String,
    },

    #[error(transparent)]
    UnknownFormatter(#[from] UnknownFormatter),

    #[error("Database connection failed: {message}")]
    Connection { message: String },

    #[error("Introspection failed: {message}")]
    Introspection { message: String },

    #[error("Runtime error: {message}")]
    Runtime { message: String },
}

impl Error {
    pub fn invalid_server(server: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidServer {
            server: server.into(),
            message: message.into(),
        }
    }

    pub fn missing_schema(
        server: impl Into<String>,
        schema: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::MissingSchema {
            server: server.into(),
            schema: schema.into(),
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn introspection(message: impl Into<String>) -> Self {
        Self::Introspection {
            message: message.into(),
        }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Error::SchemaNameNotProvided => 1,
            Error::InvalidServer { .. } => 2,
            Error::MissingSchema { .. } => 3,
            Error::UnknownFormatter(_) => 4,
            Error::Connection { .. } => 5,
            Error::Introspection { .. } => 6,
            Error::Runtime { .. } => 7,
        }
    }
}
