//! AES-128-CBC encryption and HMAC-SHA1 authentication.
//!
//! SecureStore blobs use encrypt-then-MAC: the payload is AES-128-CBC
//! encrypted with PKCS#7 padding under a fresh random IV, then the tag
//! is computed as `HMAC-SHA1(mac_key, iv || payload)`.  Verification
//! recomputes the tag and compares in constant time before any
//! decryption work happens.

use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use subtle::ConstantTimeEq;

use crate::errors::{Error, Result};

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type HmacSha1 = Hmac<Sha1>;

/// AES block size in bytes; also the IV length.
pub const IV_SIZE: usize = 16;

/// Length of an AES-128 or HMAC-SHA1 key half in bytes.
pub const KEY_SIZE: usize = 16;

/// Length of the HMAC-SHA1 tag in bytes.
pub const TAG_SIZE: usize = 20;

/// Encrypt `plaintext` with AES-128-CBC under the given key and IV.
///
/// PKCS#7 padding always appends at least one byte, so an empty
/// plaintext still produces one full block of ciphertext.
pub fn encrypt(key: &[u8], iv: &[u8; IV_SIZE], plaintext: &[u8]) -> Result<Vec<u8>> {
    let enc = Aes128CbcEnc::new_from_slices(key, iv)
        .map_err(|e| Error::EncryptionFailed(format!("invalid key length: {e}")))?;
    Ok(enc.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

/// Decrypt an AES-128-CBC ciphertext and strip the PKCS#7 padding.
///
/// Callers must verify the HMAC first; by the time this runs, a padding
/// failure can only mean the key material itself is wrong, so the error
/// shape is the same as a tag mismatch.
pub fn decrypt(key: &[u8], iv: &[u8; IV_SIZE], ciphertext: &[u8]) -> Result<Vec<u8>> {
    let dec =
        Aes128CbcDec::new_from_slices(key, iv).map_err(|_| Error::TamperedCiphertext)?;
    dec.decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| Error::TamperedCiphertext)
}

/// Compute `HMAC-SHA1(mac_key, iv || payload)`.
pub fn authenticate(mac_key: &[u8], iv: &[u8], payload: &[u8]) -> Result<[u8; TAG_SIZE]> {
    let mut mac = HmacSha1::new_from_slice(mac_key)
        .map_err(|e| Error::EncryptionFailed(format!("invalid HMAC key: {e}")))?;
    mac.update(iv);
    mac.update(payload);

    let tag = mac.finalize().into_bytes();
    let mut out = [0u8; TAG_SIZE];
    out.copy_from_slice(&tag);
    Ok(out)
}

/// Verify a stored tag against `HMAC-SHA1(mac_key, iv || payload)`.
///
/// Requires byte-length equality and constant-time value equality over
/// the full tag length.  Any mismatch is reported as tampered
/// ciphertext.
pub fn verify(mac_key: &[u8], iv: &[u8], payload: &[u8], tag: &[u8]) -> Result<()> {
    if tag.len() != TAG_SIZE {
        return Err(Error::TamperedCiphertext);
    }

    let expected = authenticate(mac_key, iv, payload).map_err(|_| Error::TamperedCiphertext)?;
    if expected.as_slice().ct_eq(tag).into() {
        Ok(())
    } else {
        Err(Error::TamperedCiphertext)
    }
}
