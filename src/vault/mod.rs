//! Vault module — the encrypted secrets container and its lifecycle.
//!
//! This module provides:
//! - `EncryptedBlob`, the authenticated ciphertext atom (`blob`)
//! - `VaultDocument` and the deterministic file format (`document`)
//! - Schema upgrades and the load policy (`upgrade`)
//! - `SecretsManager`, the library-level API (`manager`)

pub mod blob;
pub mod document;
pub mod manager;
pub mod upgrade;

/// Length of the random sentinel plaintext in bytes.
pub(crate) const SENTINEL_LEN: usize = 32;

// Re-export the most commonly used items.
pub use blob::EncryptedBlob;
pub use document::{SecretName, VaultDocument, SCHEMA_VERSION};
pub use manager::SecretsManager;
pub use upgrade::VaultVersionPolicy;
