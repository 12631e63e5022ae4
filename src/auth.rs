//! Credential pair and redacted secret types.

pub mod credentials;
pub mod secret;

pub use credentials::*;
pub use secret::*;
