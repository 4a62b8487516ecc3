use thiserror::Error;

/// All errors that can occur in SecureStore.
#[derive(Debug, Error)]
pub enum Error {
    // --- Lifecycle errors ---
    #[error("No vault loaded — load or create a store before this operation")]
    NoStoreLoaded,

    #[error("No key loaded — load or generate key material first")]
    NoKeyLoaded,

    #[error("Key material has already been loaded into this store")]
    KeyAlreadyLoaded,

    // --- Key file errors ---
    #[error("Invalid key file: {0}")]
    InvalidKeyFile(String),

    // --- Crypto errors ---
    #[error("Decryption failed — wrong key or tampered ciphertext")]
    TamperedCiphertext,

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    // --- Vault errors ---
    #[error("Secret '{0}' not found")]
    NotFound(String),

    #[error("Vault schema version {0} is not supported by this build")]
    UnsupportedVersion(u32),

    #[error("Vault schema version {0} is outdated and the load policy forbids upgrades")]
    PolicyViolation(u32),

    #[error("Upgrade from vault schema version {0} failed")]
    UpgradeFailure(u32),

    #[error("Invalid vault format: {0}")]
    MalformedVault(String),

    // --- Serializer surface ---
    #[error("Value serialization error: {0}")]
    Serialization(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for SecureStore results.
pub type Result<T> = std::result::Result<T, Error>;
