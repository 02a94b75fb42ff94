//! Password-keyed AES-256-CBC sealing used for temporary token payloads.
//!
//! This module has no I/O and no logging. Every call draws fresh randomness
//! for the salt and IV; there is no shared state between calls.
//!
//! # Sealed format
//!
//! ```text
//! base64url-no-pad( salt(16) || iv(16) || aes-256-cbc-pkcs7(key, iv, plaintext) )
//! key = HKDF-SHA256(ikm = password, salt = salt, info = "")[..32]
//! ```

pub mod cipher;
pub mod kdf;

pub use cipher::{decrypt, encrypt, encrypt_with_rng, CipherError, SealedBlob};
pub use kdf::{derive_key, KEY_LEN, SALT_LEN};
