//! Cryptographic primitives for SecureStore.
//!
//! This module provides:
//! - AES-128-CBC with PKCS#7 padding and HMAC-SHA1 tags (`cipher`)
//! - PBKDF2-HMAC-SHA1 password-based key derivation (`kdf`)
//! - The split encryption/MAC working key pair (`keys`)
//! - Key file import/export with PEM armor (`keyfile`)
//! - The scrub-on-drop `SecureBuffer` (`buffer`)

pub mod buffer;
pub mod cipher;
pub mod kdf;
pub mod keyfile;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{SecureBuffer, KeyMaterial, derive_key_material, ...};
pub use buffer::SecureBuffer;
pub use cipher::{authenticate, decrypt, encrypt, verify, IV_SIZE, KEY_SIZE, TAG_SIZE};
pub use kdf::{
    derive_key_material, generate_salt, KEY_MATERIAL_LEN, LEGACY_PBKDF2_ROUNDS, LEGACY_SALT_LEN,
    PBKDF2_ROUNDS, SALT_LEN,
};
pub use keyfile::{load_key, pem_encode, read_key, write_key};
pub use keys::KeyMaterial;
