//! The encrypted blob — the atom of authenticated encryption.
//!
//! Every stored value (and the sentinel) is a triple of IV, HMAC tag,
//! and ciphertext payload.  All three serialize as base64 strings so
//! the vault file stays human-readable and diff-friendly.

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::document::{base64_decode, base64_encode};
use crate::crypto::{self, KeyMaterial, SecureBuffer, IV_SIZE};
use crate::errors::{Error, Result};

/// One authenticated ciphertext: `hmac = HMAC-SHA1(mac_key, iv || payload)`.
///
/// The payload length is always a positive multiple of the AES block
/// size; even an empty plaintext pads to one full block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedBlob {
    /// The per-blob random IV (16 bytes), never reused within a vault.
    #[serde(
        serialize_with = "base64_encode",
        deserialize_with = "base64_decode",
        alias = "IV"
    )]
    pub iv: Vec<u8>,

    /// HMAC-SHA1 tag over `iv || payload` (20 bytes).
    #[serde(
        serialize_with = "base64_encode",
        deserialize_with = "base64_decode",
        alias = "HMAC",
        alias = "Hmac"
    )]
    pub hmac: Vec<u8>,

    /// AES-128-CBC ciphertext with PKCS#7 padding.
    #[serde(
        serialize_with = "base64_encode",
        deserialize_with = "base64_decode",
        alias = "Payload"
    )]
    pub payload: Vec<u8>,
}

impl EncryptedBlob {
    /// Encrypt `plaintext` under a fresh random IV and tag the result.
    pub fn seal(keys: &KeyMaterial, plaintext: &[u8]) -> Result<Self> {
        let mut iv = [0u8; IV_SIZE];
        OsRng.fill_bytes(&mut iv);

        let payload = crypto::encrypt(keys.encryption_key(), &iv, plaintext)?;
        let hmac = crypto::authenticate(keys.mac_key(), &iv, &payload)?;

        Ok(Self {
            iv: iv.to_vec(),
            hmac: hmac.to_vec(),
            payload,
        })
    }

    /// Verify the tag, then decrypt.
    ///
    /// The HMAC check runs first and in constant time; only a valid tag
    /// reaches the cipher.  A wrong key and flipped ciphertext bits are
    /// indistinguishable — both surface as tampered ciphertext.
    pub fn open(&self, keys: &KeyMaterial) -> Result<SecureBuffer> {
        crypto::verify(keys.mac_key(), &self.iv, &self.payload, &self.hmac)?;

        let iv: [u8; IV_SIZE] = self
            .iv
            .as_slice()
            .try_into()
            .map_err(|_| Error::TamperedCiphertext)?;

        let plaintext = crypto::decrypt(keys.encryption_key(), &iv, &self.payload)?;
        Ok(SecureBuffer::from_vec(plaintext))
    }
}
