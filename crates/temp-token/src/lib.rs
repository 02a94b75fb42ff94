//! Temporary media API tokens.
//!
//! A temporary token is minted from a long-lived parent token, carries an
//! expiry and optional scope restrictions, and is sealed so only holders of
//! the parent can read it.
//!
//! ```
//! use chrono::{Duration, Utc};
//! use temp_token::{create_temp_token, open_temp_token, Scope};
//!
//! let parent = "1234iABCsecrettoken";
//! let expire = Utc::now() + Duration::minutes(10);
//! let token = create_temp_token(parent, expire, &Scope::default().with_rid("R99")).unwrap();
//! assert!(token.as_str().starts_with("1234i3oken"));
//!
//! let payload = open_temp_token(parent, token.as_str()).unwrap();
//! assert_eq!(payload.scope.rid.as_deref(), Some("R99"));
//! ```

pub mod crypto;
pub mod token;

#[cfg(test)]
pub(crate) mod testing;

pub use crypto::CipherError;
pub use token::{
    create_temp_token, create_temp_token_with_rng, open_temp_token, ParentToken, Scope, TempToken,
    TokenError, TokenPayload,
};
