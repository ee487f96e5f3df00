// Application layer: the store boundary used by the CLI and the io module.
// Validation, typed errors and logging live here; SQL stays in storage.

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;
