//! Scoped, time-boxed temporary tokens derived from a parent API token.
//!
//! # Token format
//!
//! ```text
//! <accountId> "i3" <last4(parent)> <sealed(parent, payload)>
//! ```
//!
//! The prefix is cleartext so a verifier can pick the right parent secret
//! before decrypting. See [`payload`] for the payload grammar and
//! [`crate::crypto`] for the sealing.

pub mod error;
pub mod inspect;
pub mod mint;
pub mod parent;
pub mod payload;

pub use error::TokenError;
pub use inspect::{open_temp_token, TokenRoute};
pub use mint::{create_temp_token, create_temp_token_with_rng, TempToken, FORMAT_MARKER};
pub use parent::ParentToken;
pub use payload::{expire_in_range, format_expire, Scope, ScopeTag, TokenPayload};
