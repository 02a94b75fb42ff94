//! Verifier-side helpers: locate the parent for a temporary token and read
//! its payload back.
//!
//! Opening a token only decrypts and parses it. Expiry and scope are left to
//! the caller, see [`TokenPayload::is_expired_at`].

use super::error::TokenError;
use super::mint::FORMAT_MARKER;
use super::parent::{ParentToken, ACCOUNT_SEPARATOR, LAST4_LEN};
use super::payload::TokenPayload;
use crate::crypto;

/// The cleartext routing fields of a temporary token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenRoute<'a> {
    pub account_id: &'a str,
    pub last4: &'a str,
    /// Base64URL sealed payload.
    pub sealed: &'a str,
}

impl<'a> TokenRoute<'a> {
    /// Split a temporary token into its routing fields without any key.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::PrefixMismatch`] if the token lacks an account
    /// id, the `i3` marker, four routing characters, or a sealed payload.
    pub fn parse(temp_token: &'a str) -> Result<Self, TokenError> {
        let separator = temp_token
            .find(ACCOUNT_SEPARATOR)
            .filter(|&idx| idx > 0)
            .ok_or(TokenError::PrefixMismatch)?;
        let account_id = &temp_token[..separator];
        let rest = temp_token[separator..]
            .strip_prefix(FORMAT_MARKER)
            .ok_or(TokenError::PrefixMismatch)?;
        let split = rest
            .char_indices()
            .nth(LAST4_LEN)
            .map(|(idx, _)| idx)
            .ok_or(TokenError::PrefixMismatch)?;
        let (last4, sealed) = rest.split_at(split);

        Ok(Self {
            account_id,
            last4,
            sealed,
        })
    }

    /// Returns `true` if `parent` plausibly issued this token.
    pub fn matches(&self, parent: &ParentToken) -> bool {
        self.account_id == parent.account_id() && self.last4 == parent.last4()
    }
}

impl ParentToken {
    /// Decrypt and parse a temporary token minted from this parent.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::PrefixMismatch`] if the routing prefix belongs to
    /// another parent, [`TokenError::Cipher`] if the sealed part does not
    /// decrypt, and [`TokenError::MalformedPayload`] if the plaintext does
    /// not parse.
    pub fn open(&self, temp_token: &str) -> Result<TokenPayload, TokenError> {
        let route = TokenRoute::parse(temp_token)?;
        if !route.matches(self) {
            return Err(TokenError::PrefixMismatch);
        }
        let plaintext = crypto::decrypt(self.expose_secret(), route.sealed)?;
        TokenPayload::parse(&plaintext)
    }
}

/// Open `temp_token` with the raw `parent_token` secret.
///
/// # Errors
///
/// Returns [`TokenError::InvalidArgument`] for a malformed parent token, then
/// anything [`ParentToken::open`] returns.
pub fn open_temp_token(parent_token: &str, temp_token: &str) -> Result<TokenPayload, TokenError> {
    ParentToken::parse(parent_token)?.open(temp_token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::CipherError;
    use crate::token::{create_temp_token, Scope};
    use chrono::{DateTime, TimeZone, Utc};

    const PARENT: &str = "1234iABCsecrettoken";

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn route_splits_prefix() {
        let route = TokenRoute::parse("1234i3okenAAAA").unwrap();
        assert_eq!(route.account_id, "1234");
        assert_eq!(route.last4, "oken");
        assert_eq!(route.sealed, "AAAA");
    }

    #[test]
    fn route_rejects_missing_marker() {
        assert!(TokenRoute::parse("1234i2okenAAAA").is_err());
        assert!(TokenRoute::parse("1234okenAAAA").is_err());
        assert!(TokenRoute::parse("i3okenAAAA").is_err());
    }

    #[test]
    fn route_requires_sealed_part() {
        assert!(TokenRoute::parse("1234i3oken").is_err());
        assert!(TokenRoute::parse("1234i3ok").is_err());
    }

    #[test]
    fn open_round_trip() {
        let scope = Scope::default()
            .with_permissions("read")
            .with_source_ipv4("198.51.100.7");
        let token = create_temp_token(PARENT, noon(), &scope).unwrap();
        let payload = open_temp_token(PARENT, token.as_str()).unwrap();
        assert_eq!(payload.expire, noon());
        assert_eq!(payload.scope, scope);
    }

    #[test]
    fn open_rejects_other_parent() {
        let token = create_temp_token(PARENT, noon(), &Scope::default()).unwrap();
        let err = open_temp_token("5678iABCsecrettoken", token.as_str()).unwrap_err();
        assert!(matches!(err, TokenError::PrefixMismatch));
    }

    #[test]
    fn open_same_prefix_wrong_secret_fails() {
        let token = create_temp_token(PARENT, noon(), &Scope::default()).unwrap();
        let result = open_temp_token("1234iXYZsecrettoken", token.as_str());
        assert!(result.is_err());
    }

    #[test]
    fn open_rejects_garbage_payload() {
        let err = open_temp_token(PARENT, "1234i3oken!!!!").unwrap_err();
        assert!(matches!(err, TokenError::Cipher(CipherError::InvalidFormat)));
    }
}
