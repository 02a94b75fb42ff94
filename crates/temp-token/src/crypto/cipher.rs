//! AES-256-CBC sealing of token payloads under a password-derived key.
//!
//! **No integrity tag.** The blob is `salt || iv || ciphertext` and nothing
//! else. The downstream verifier expects exactly this layout, so switching to
//! an AEAD mode here would break every token it validates.

use std::str::FromStr;

use aes::Aes256;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand_core::{CryptoRng, OsRng, RngCore};
use thiserror::Error;

use super::kdf::{derive_key, SALT_LEN};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Byte length of the CBC initialisation vector.
pub const IV_LEN: usize = 16;

/// AES block size; every ciphertext is a non-empty multiple of this.
pub const BLOCK_LEN: usize = 16;

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The OS CSPRNG could not supply salt or IV bytes.
    #[error("secure random source unavailable: {0}")]
    RandomnessUnavailable(#[from] rand_core::Error),

    /// Key derivation or the block cipher failed.
    #[error("crypto backend failure: {0}")]
    CryptoBackend(String),

    /// Ciphertext did not decrypt to validly padded plaintext.
    #[error("decryption failed")]
    Decryption,

    /// The sealed text is not a well-formed `salt || iv || ciphertext` blob,
    /// or its plaintext is not UTF-8.
    #[error("invalid sealed blob format")]
    InvalidFormat,
}

/// A parsed sealed blob.
///
/// The string representation is Base64URL without padding of
/// `salt(16) || iv(16) || ciphertext`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedBlob {
    /// Random salt fed to the key derivation.
    pub salt: [u8; SALT_LEN],
    /// Random CBC initialisation vector.
    pub iv: [u8; IV_LEN],
    /// PKCS#7-padded AES-256-CBC ciphertext.
    pub ciphertext: Vec<u8>,
}

impl SealedBlob {
    /// Encode this blob to its URL-safe string representation.
    pub fn to_string_repr(&self) -> String {
        let mut raw = Vec::with_capacity(SALT_LEN + IV_LEN + self.ciphertext.len());
        raw.extend_from_slice(&self.salt);
        raw.extend_from_slice(&self.iv);
        raw.extend_from_slice(&self.ciphertext);
        URL_SAFE_NO_PAD.encode(raw)
    }
}

impl FromStr for SealedBlob {
    type Err = CipherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = URL_SAFE_NO_PAD
            .decode(s)
            .map_err(|_| CipherError::InvalidFormat)?;
        if raw.len() < SALT_LEN + IV_LEN + BLOCK_LEN {
            return Err(CipherError::InvalidFormat);
        }
        let (salt_bytes, rest) = raw.split_at(SALT_LEN);
        let (iv_bytes, ciphertext) = rest.split_at(IV_LEN);
        if ciphertext.len() % BLOCK_LEN != 0 {
            return Err(CipherError::InvalidFormat);
        }

        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(salt_bytes);
        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(iv_bytes);

        Ok(Self {
            salt,
            iv,
            ciphertext: ciphertext.to_vec(),
        })
    }
}

/// Seal `plaintext` under a key derived from `password`, drawing the salt and
/// then the IV from `rng`.
///
/// # Errors
///
/// Returns [`CipherError::RandomnessUnavailable`] if `rng` cannot fill either
/// buffer; nothing is retried. Returns [`CipherError::CryptoBackend`] if the
/// cipher rejects the key or IV (unreachable with fixed-size buffers).
pub fn seal<R>(rng: &mut R, password: &[u8], plaintext: &[u8]) -> Result<SealedBlob, CipherError>
where
    R: RngCore + CryptoRng + ?Sized,
{
    let mut salt = [0u8; SALT_LEN];
    rng.try_fill_bytes(&mut salt)?;
    let key = derive_key(password, &salt)?;

    let mut iv = [0u8; IV_LEN];
    rng.try_fill_bytes(&mut iv)?;

    let ciphertext = Aes256CbcEnc::new_from_slices(&key[..], &iv)
        .map_err(|e| CipherError::CryptoBackend(e.to_string()))?
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    Ok(SealedBlob {
        salt,
        iv,
        ciphertext,
    })
}

/// Recover the plaintext bytes of `blob`.
///
/// # Errors
///
/// Returns [`CipherError::Decryption`] if the padding is invalid, which is the
/// usual outcome of a wrong password.
pub fn open(password: &[u8], blob: &SealedBlob) -> Result<Vec<u8>, CipherError> {
    let key = derive_key(password, &blob.salt)?;
    Aes256CbcDec::new_from_slices(&key[..], &blob.iv)
        .map_err(|e| CipherError::CryptoBackend(e.to_string()))?
        .decrypt_padded_vec_mut::<Pkcs7>(&blob.ciphertext)
        .map_err(|_| CipherError::Decryption)
}

/// Encrypt `plaintext` with fresh OS randomness and return the URL-safe text.
///
/// Two calls with identical arguments return different strings.
///
/// # Errors
///
/// See [`seal`].
pub fn encrypt(password: &str, plaintext: &str) -> Result<String, CipherError> {
    encrypt_with_rng(&mut OsRng, password, plaintext)
}

/// [`encrypt`] over a caller-supplied CSPRNG.
///
/// # Errors
///
/// See [`seal`].
pub fn encrypt_with_rng<R>(rng: &mut R, password: &str, plaintext: &str) -> Result<String, CipherError>
where
    R: RngCore + CryptoRng + ?Sized,
{
    seal(rng, password.as_bytes(), plaintext.as_bytes()).map(|blob| blob.to_string_repr())
}

/// Reverse [`encrypt`].
///
/// # Errors
///
/// Returns [`CipherError::InvalidFormat`] for malformed text or non-UTF-8
/// plaintext, and [`CipherError::Decryption`] for bad padding.
pub fn decrypt(password: &str, sealed: &str) -> Result<String, CipherError> {
    let blob: SealedBlob = sealed.parse()?;
    let plaintext = open(password.as_bytes(), &blob)?;
    String::from_utf8(plaintext).map_err(|_| CipherError::InvalidFormat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FailingRng, SequenceRng};

    const PASSWORD: &str = "1234iABCsecrettoken";

    #[test]
    fn known_answer_with_fixed_randomness() {
        let mut rng = SequenceRng::default();
        let out = encrypt_with_rng(&mut rng, PASSWORD, "2024-01-01T12:00:00.000Z").unwrap();
        assert_eq!(
            out,
            "AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh92z6SEAOMO2yeQHGYxTGQxq33HfHwYtI_aNCSq8lhZdA"
        );
    }

    #[test]
    fn known_answer_empty_plaintext() {
        let mut rng = SequenceRng::default();
        let out = encrypt_with_rng(&mut rng, PASSWORD, "").unwrap();
        assert_eq!(
            out,
            "AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh_NQv3ww25g5YrcdkxEgDKg"
        );
        assert_eq!(decrypt(PASSWORD, &out).unwrap(), "");
    }

    #[test]
    fn salt_is_drawn_before_iv() {
        let mut rng = SequenceRng::default();
        let blob = seal(&mut rng, b"pw", b"x").unwrap();
        assert_eq!(blob.salt[0], 0);
        assert_eq!(blob.iv[0], 16);
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        for plaintext in ["", "a", "exactly sixteen!", "2024-01-01T12:00:00.000Z!pread!h例え.jp"] {
            let sealed = encrypt(PASSWORD, plaintext).unwrap();
            assert_eq!(decrypt(PASSWORD, &sealed).unwrap(), plaintext);
        }
    }

    #[test]
    fn repeated_calls_differ() {
        let a = encrypt(PASSWORD, "same").unwrap();
        let b = encrypt(PASSWORD, "same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn output_is_url_safe() {
        for _ in 0..64 {
            let out = encrypt(PASSWORD, "some payload that spans blocks").unwrap();
            assert!(
                out.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
                "unexpected character in {out}"
            );
        }
    }

    #[test]
    fn ciphertext_is_padded_to_blocks() {
        let blob = seal(&mut OsRng, b"pw", b"exactly sixteen!").unwrap();
        assert_eq!(blob.ciphertext.len(), 2 * BLOCK_LEN);
    }

    #[test]
    fn wrong_password_does_not_recover_plaintext() {
        let sealed = encrypt(PASSWORD, "secret payload").unwrap();
        let result = decrypt("9999iOTHERtoken", &sealed);
        assert!(!matches!(result, Ok(ref s) if s == "secret payload"));
    }

    #[test]
    fn failing_rng_is_randomness_unavailable() {
        let err = encrypt_with_rng(&mut FailingRng, PASSWORD, "x").unwrap_err();
        assert!(matches!(err, CipherError::RandomnessUnavailable(_)));
    }

    #[test]
    fn iv_tampering_is_not_detected() {
        // CBC without a tag is malleable: flipping an IV bit flips the same
        // plaintext bit and decryption still succeeds.
        let mut rng = SequenceRng::default();
        let mut blob = seal(&mut rng, PASSWORD.as_bytes(), b"2024-01-01T12:00:00.000Z").unwrap();
        blob.iv[0] ^= 0x01;
        let opened = open(PASSWORD.as_bytes(), &blob).unwrap();
        assert_eq!(opened, b"3024-01-01T12:00:00.000Z");
    }

    #[test]
    fn string_repr_round_trip() {
        let blob = seal(&mut OsRng, b"pw", b"hello").unwrap();
        let parsed: SealedBlob = blob.to_string_repr().parse().unwrap();
        assert_eq!(parsed, blob);
    }

    #[test]
    fn from_str_rejects_bad_base64() {
        assert!(matches!(
            "!!!not-base64!!!".parse::<SealedBlob>(),
            Err(CipherError::InvalidFormat)
        ));
    }

    #[test]
    fn from_str_rejects_short_blob() {
        let short = URL_SAFE_NO_PAD.encode([0u8; SALT_LEN + IV_LEN]);
        assert!(short.parse::<SealedBlob>().is_err());
    }

    #[test]
    fn from_str_rejects_partial_block() {
        let ragged = URL_SAFE_NO_PAD.encode([0u8; SALT_LEN + IV_LEN + BLOCK_LEN + 3]);
        assert!(ragged.parse::<SealedBlob>().is_err());
    }
}
