//! Common types, protocol definitions, and errors shared across the temp-token crates.

pub mod error;
pub mod protocol;

pub use error::ServiceError;
