mod repository;

pub use repository::*;

/// SQL creating the entries table and its date index.
pub const MIGRATION_001_MOVIMIENTOS: &str = include_str!("migrations/001_movimientos.sql");

/// Version stamped into `PRAGMA user_version` once the schema is in place.
pub const SCHEMA_VERSION: i64 = 1;
