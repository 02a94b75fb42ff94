//! Temporary token construction.

use std::fmt;

use chrono::{DateTime, Utc};
use rand_core::{CryptoRng, OsRng, RngCore};

use super::error::TokenError;
use super::parent::ParentToken;
use super::payload::{expire_in_range, render_payload, Scope};
use crate::crypto;

/// Format-version marker placed between the account id and the last four
/// parent-token characters.
pub const FORMAT_MARKER: &str = "i3";

/// A minted temporary token and the instant it stops being valid.
#[derive(Clone, PartialEq, Eq)]
pub struct TempToken {
    token: String,
    expire: DateTime<Utc>,
}

impl TempToken {
    /// The bearer credential, `<accountId>i3<last4><sealed payload>`.
    pub fn as_str(&self) -> &str {
        &self.token
    }

    pub fn expire(&self) -> DateTime<Utc> {
        self.expire
    }

    pub fn into_parts(self) -> (String, DateTime<Utc>) {
        (self.token, self.expire)
    }
}

impl fmt::Display for TempToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token)
    }
}

impl fmt::Debug for TempToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TempToken")
            .field("token", &"[REDACTED]")
            .field("expire", &self.expire)
            .finish()
    }
}

impl ParentToken {
    /// Cleartext prefix of every token minted from this parent.
    pub fn routing_prefix(&self) -> String {
        format!("{}{FORMAT_MARKER}{}", self.account_id(), self.last4())
    }

    /// Mint a temporary token using OS randomness.
    ///
    /// # Errors
    ///
    /// See [`ParentToken::mint_with_rng`].
    pub fn mint(&self, expire: DateTime<Utc>, scope: &Scope) -> Result<TempToken, TokenError> {
        self.mint_with_rng(&mut OsRng, expire, scope)
    }

    /// [`ParentToken::mint`] over a caller-supplied CSPRNG.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidArgument`] if `expire` falls outside
    /// years 0 to 9999, before any randomness is drawn. Propagates
    /// [`TokenError::Cipher`] from the sealing step.
    pub fn mint_with_rng<R>(
        &self,
        rng: &mut R,
        expire: DateTime<Utc>,
        scope: &Scope,
    ) -> Result<TempToken, TokenError>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        if !expire_in_range(&expire) {
            return Err(TokenError::InvalidArgument("expire must fall within years 0 to 9999"));
        }
        let payload = render_payload(&expire, scope);
        let sealed = crypto::encrypt_with_rng(rng, self.expose_secret(), &payload)?;
        let mut token = self.routing_prefix();
        token.push_str(&sealed);
        Ok(TempToken { token, expire })
    }
}

/// Derive a scoped temporary token from `parent_token`, valid until `expire`.
///
/// # Errors
///
/// Returns [`TokenError::InvalidArgument`] for an empty or malformed parent
/// token or an out-of-range `expire`, before any randomness is drawn. Cipher failures propagate as
/// [`TokenError::Cipher`].
pub fn create_temp_token(
    parent_token: &str,
    expire: DateTime<Utc>,
    scope: &Scope,
) -> Result<TempToken, TokenError> {
    create_temp_token_with_rng(&mut OsRng, parent_token, expire, scope)
}

/// [`create_temp_token`] over a caller-supplied CSPRNG.
///
/// # Errors
///
/// See [`create_temp_token`].
pub fn create_temp_token_with_rng<R>(
    rng: &mut R,
    parent_token: &str,
    expire: DateTime<Utc>,
    scope: &Scope,
) -> Result<TempToken, TokenError>
where
    R: RngCore + CryptoRng + ?Sized,
{
    let parent = ParentToken::parse(parent_token)?;
    parent.mint_with_rng(rng, expire, scope)
}
