pub mod connection;
pub mod introspect;
pub mod sqlgen;

pub use connection::MySqlConnection;
pub use introspect::introspect_schema;
