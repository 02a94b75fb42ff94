//! [`ParentToken`]: the long-lived account secret tokens are derived from.

use std::fmt;

use zeroize::Zeroizing;

use super::error::TokenError;

/// Separates the account id from the rest of the parent token.
pub const ACCOUNT_SEPARATOR: char = 'i';

/// Number of trailing parent-token characters surfaced in cleartext.
pub const LAST4_LEN: usize = 4;

/// A validated parent token of the form `<accountId>i<suffix>`.
///
/// The secret is zeroized on drop and never printed by `Debug`.
#[derive(Clone)]
pub struct ParentToken {
    secret: Zeroizing<String>,
    /// Byte offset of the first [`ACCOUNT_SEPARATOR`].
    separator: usize,
    /// Byte offset where the last [`LAST4_LEN`] characters begin.
    last4_start: usize,
}

impl ParentToken {
    /// Parse and validate a parent token.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidArgument`] if the token is empty, has no
    /// `i` separator, has an empty account id, or is shorter than
    /// [`LAST4_LEN`] characters.
    pub fn parse(raw: &str) -> Result<Self, TokenError> {
        if raw.is_empty() {
            return Err(TokenError::InvalidArgument("empty parent token not allowed"));
        }
        let separator = raw
            .find(ACCOUNT_SEPARATOR)
            .ok_or(TokenError::InvalidArgument("parent token has no account separator"))?;
        if separator == 0 {
            return Err(TokenError::InvalidArgument("parent token has an empty account id"));
        }
        let last4_start = raw
            .char_indices()
            .rev()
            .nth(LAST4_LEN - 1)
            .map(|(idx, _)| idx)
            .ok_or(TokenError::InvalidArgument("parent token is shorter than 4 characters"))?;

        Ok(Self {
            secret: Zeroizing::new(raw.to_owned()),
            separator,
            last4_start,
        })
    }

    /// Everything before the first `i`.
    pub fn account_id(&self) -> &str {
        &self.secret[..self.separator]
    }

    /// The last four characters of the full token.
    pub fn last4(&self) -> &str {
        &self.secret[self.last4_start..]
    }

    /// The full secret. Use only as key material.
    pub fn expose_secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for ParentToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParentToken")
            .field("account_id", &self.account_id())
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
