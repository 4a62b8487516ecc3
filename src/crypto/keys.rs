//! The working key pair: one AES-128 half, one HMAC-SHA1 half.
//!
//! All 32-byte key material — freshly generated, PBKDF2-derived, or
//! read from a key file — is split down the middle: the first 16 bytes
//! encrypt, the last 16 authenticate.  The halves are distinct keys and
//! are never swapped between primitives.

use super::buffer::SecureBuffer;
use super::cipher::KEY_SIZE;
use super::kdf::KEY_MATERIAL_LEN;
use crate::errors::{Error, Result};

/// The pair of working keys held by a loaded store.
///
/// Both halves live in scrub-on-drop buffers and die with the store.
pub struct KeyMaterial {
    encryption: SecureBuffer,
    mac: SecureBuffer,
}

impl KeyMaterial {
    /// Generate both halves directly from the CSPRNG.
    pub fn generate() -> Self {
        Self {
            encryption: SecureBuffer::random(KEY_SIZE),
            mac: SecureBuffer::random(KEY_SIZE),
        }
    }

    /// Split a 32-byte source into the two halves.
    ///
    /// The source buffer is consumed and scrubbed when it drops at the
    /// end of this call.
    pub fn from_key_material(source: SecureBuffer) -> Result<Self> {
        if source.len() != KEY_MATERIAL_LEN {
            return Err(Error::InvalidKeyFile(format!(
                "key material must be {KEY_MATERIAL_LEN} bytes, got {}",
                source.len()
            )));
        }

        let bytes = source.as_bytes();
        Ok(Self {
            encryption: SecureBuffer::from_vec(bytes[..KEY_SIZE].to_vec()),
            mac: SecureBuffer::from_vec(bytes[KEY_SIZE..].to_vec()),
        })
    }

    /// The AES-128 encryption key.
    pub fn encryption_key(&self) -> &[u8] {
        self.encryption.as_bytes()
    }

    /// The HMAC-SHA1 authentication key.
    pub fn mac_key(&self) -> &[u8] {
        self.mac.as_bytes()
    }

    /// Re-assemble the 32-byte concatenation for export.
    pub fn export_bytes(&self) -> SecureBuffer {
        let mut out = Vec::with_capacity(KEY_MATERIAL_LEN);
        out.extend_from_slice(self.encryption.as_bytes());
        out.extend_from_slice(self.mac.as_bytes());
        SecureBuffer::from_vec(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_produces_distinct_halves() {
        let keys = KeyMaterial::generate();
        assert_eq!(keys.encryption_key().len(), KEY_SIZE);
        assert_eq!(keys.mac_key().len(), KEY_SIZE);
        assert_ne!(keys.encryption_key(), keys.mac_key());
    }

    #[test]
    fn split_assigns_first_half_to_encryption() {
        let mut source = Vec::new();
        source.extend_from_slice(&[0x11; KEY_SIZE]);
        source.extend_from_slice(&[0x22; KEY_SIZE]);

        let keys = KeyMaterial::from_key_material(SecureBuffer::from_vec(source)).unwrap();
        assert_eq!(keys.encryption_key(), &[0x11; KEY_SIZE]);
        assert_eq!(keys.mac_key(), &[0x22; KEY_SIZE]);
    }

    #[test]
    fn split_rejects_short_source() {
        let result = KeyMaterial::from_key_material(SecureBuffer::from_vec(vec![0u8; 16]));
        assert!(result.is_err());
    }

    #[test]
    fn export_roundtrips_through_split() {
        let keys = KeyMaterial::generate();
        let exported = keys.export_bytes();
        assert_eq!(exported.len(), KEY_MATERIAL_LEN);

        let reimported = KeyMaterial::from_key_material(exported).unwrap();
        assert_eq!(reimported.encryption_key(), keys.encryption_key());
        assert_eq!(reimported.mac_key(), keys.mac_key());
    }
}
