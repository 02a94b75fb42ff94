//! HKDF-SHA256 key derivation (RFC 5869, empty `info`).
//!
//! The extract and expand steps are spelled out over `hmac` rather than
//! delegated, so the exact byte flow that the downstream verifier relies on
//! is visible in one place.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroizing;

use super::cipher::CipherError;

type HmacSha256 = Hmac<Sha256>;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of the per-encryption random salt.
pub const SALT_LEN: usize = 16;

/// Derive a [`KEY_LEN`]-byte key from `password` and `salt`.
///
/// - Extract: `prk = HMAC-SHA256(key = salt, msg = password)`
/// - Expand: `T(i) = HMAC-SHA256(key = prk, msg = T(i-1) || i)` with `T(0)`
///   empty, concatenated and truncated to [`KEY_LEN`].
///
/// # Errors
///
/// Returns [`CipherError::CryptoBackend`] if the HMAC cannot be keyed. HMAC
/// accepts keys of any length, so this is unreachable in practice.
pub fn derive_key(password: &[u8], salt: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>, CipherError> {
    let mut extract = new_hmac(salt)?;
    extract.update(password);
    let prk = Zeroizing::new(extract.finalize().into_bytes().to_vec());

    let mut okm: Zeroizing<Vec<u8>> = Zeroizing::new(Vec::with_capacity(KEY_LEN * 2));
    let mut t: Zeroizing<Vec<u8>> = Zeroizing::new(Vec::new());
    let mut counter: u8 = 1;

    while okm.len() < KEY_LEN {
        let mut expand = new_hmac(&prk)?;
        expand.update(&t);
        expand.update(&[counter]);
        *t = expand.finalize().into_bytes().to_vec();
        okm.extend_from_slice(&t);
        counter = counter
            .checked_add(1)
            .ok_or_else(|| CipherError::CryptoBackend("hkdf expand counter overflow".into()))?;
    }

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    key.copy_from_slice(&okm[..KEY_LEN]);
    Ok(key)
}

fn new_hmac(key: &[u8]) -> Result<HmacSha256, CipherError> {
    HmacSha256::new_from_slice(key).map_err(|e| CipherError::CryptoBackend(e.to_string()))
}
