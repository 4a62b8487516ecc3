//! The secrets manager — the lifecycle state machine over one vault.
//!
//! A manager is created fresh (`new`) or from an existing document
//! (`load`), is given key material exactly once (generated, from a key
//! file, or derived from a password), and thereafter mediates every
//! `get`/`set`/`delete`/`save` through the crypto layer.
//!
//! A manager is not safe for concurrent mutation; callers serialize
//! access themselves.  Independent managers over different files are
//! independent.

use std::fs;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use super::blob::EncryptedBlob;
use super::document::{SecretName, VaultDocument, SCHEMA_VERSION};
use super::upgrade::{self, VaultVersionPolicy};
use super::SENTINEL_LEN;
use crate::crypto::{
    derive_key_material, keyfile, KeyMaterial, SecureBuffer, LEGACY_PBKDF2_ROUNDS, PBKDF2_ROUNDS,
};
use crate::errors::{Error, Result};
use crate::serial::ValueCodec;

/// The library-level entry point for working with a vault.
pub struct SecretsManager {
    vault: VaultDocument,
    key: Option<KeyMaterial>,
    pending_upgrade: bool,
    sentinel_verified: bool,
    disposed: bool,
}

impl std::fmt::Debug for SecretsManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretsManager")
            .field("vault", &self.vault)
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("pending_upgrade", &self.pending_upgrade)
            .field("sentinel_verified", &self.sentinel_verified)
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl SecretsManager {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// A fresh manager over a new, empty vault with a new 16-byte salt.
    ///
    /// No file is touched and no key is loaded.
    pub fn new() -> Self {
        Self {
            vault: VaultDocument::new(),
            key: None,
            pending_upgrade: false,
            sentinel_verified: false,
            disposed: false,
        }
    }

    /// Load an existing vault file.
    pub fn load(path: impl AsRef<Path>, policy: VaultVersionPolicy) -> Result<Self> {
        let file = fs::File::open(path)?;
        Self::load_from_reader(BufReader::new(file), policy)
    }

    /// Load a vault document from any byte source.
    ///
    /// A document newer than this build is refused outright.  An older
    /// one is refused under `Strict` policy; under `Upgrade` the schema
    /// upgrade is marked pending and runs once key material arrives.
    pub fn load_from_reader<R: Read>(reader: R, policy: VaultVersionPolicy) -> Result<Self> {
        let vault = VaultDocument::from_reader(reader)?;

        if vault.version > SCHEMA_VERSION {
            return Err(Error::UnsupportedVersion(vault.version));
        }

        let pending_upgrade = vault.version < SCHEMA_VERSION;
        if pending_upgrade && policy == VaultVersionPolicy::Strict {
            return Err(Error::PolicyViolation(vault.version));
        }

        Ok(Self {
            vault,
            key: None,
            pending_upgrade,
            sentinel_verified: false,
            disposed: false,
        })
    }

    // ------------------------------------------------------------------
    // Key material
    // ------------------------------------------------------------------

    /// Generate fresh key material from the CSPRNG.
    pub fn generate_key(&mut self) -> Result<()> {
        self.ensure_keyless()?;
        self.install_key(KeyMaterial::generate(), None)
    }

    /// Load key material from a key file (raw 32 bytes or PEM armor).
    pub fn load_key_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.ensure_keyless()?;
        let material = keyfile::load_key(path.as_ref())?;
        self.install_key(KeyMaterial::from_key_material(material)?, None)
    }

    /// Load key material from any byte source (2 KiB ceiling applies).
    pub fn load_key_from_reader<R: Read>(&mut self, reader: &mut R) -> Result<()> {
        self.ensure_keyless()?;
        let material = keyfile::read_key(reader)?;
        self.install_key(KeyMaterial::from_key_material(material)?, None)
    }

    /// Derive key material from a password and the vault's salt.
    ///
    /// For a pending-upgrade vault the derivation uses that schema's
    /// round count; the upgrade then re-derives at the current one.
    pub fn load_key_from_password(&mut self, password: &str) -> Result<()> {
        self.ensure_keyless()?;
        if self.vault.iv.is_empty() {
            return Err(Error::NoStoreLoaded);
        }

        let rounds = if self.vault.version < SCHEMA_VERSION {
            LEGACY_PBKDF2_ROUNDS
        } else {
            PBKDF2_ROUNDS
        };

        let material = derive_key_material(password.as_bytes(), &self.vault.iv, rounds);
        self.install_key(
            KeyMaterial::from_key_material(material)?,
            Some(password.as_bytes()),
        )
    }

    /// Export the loaded key material to a PEM-armored key file.
    pub fn export_key(&self, path: impl AsRef<Path>) -> Result<()> {
        let key = self.require_key()?;
        keyfile::write_key(path.as_ref(), key.export_bytes().as_bytes())
    }

    /// Export the loaded key material as PEM armor to any sink.
    pub fn export_key_to_writer<W: Write>(&self, mut writer: W) -> Result<()> {
        let key = self.require_key()?;
        writer.write_all(keyfile::pem_encode(key.export_bytes().as_bytes()).as_bytes())?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Secret operations
    // ------------------------------------------------------------------

    /// Decrypt a secret as UTF-8 text.
    pub fn get(&self, name: &str) -> Result<String> {
        let plaintext = self.get_bytes(name)?;
        match std::str::from_utf8(plaintext.as_bytes()) {
            Ok(s) => Ok(s.to_owned()),
            Err(_) => Err(Error::Serialization(
                "secret value is not valid UTF-8".into(),
            )),
        }
    }

    /// Decrypt a secret as raw bytes, delivered in a scrub-on-drop buffer.
    pub fn get_bytes(&self, name: &str) -> Result<SecureBuffer> {
        let key = self.require_key()?;
        let name = SecretName::new(name)?;
        let blob = self
            .vault
            .secrets
            .get(&name)
            .ok_or_else(|| Error::NotFound(name.as_str().to_owned()))?;
        blob.open(key)
    }

    /// Like [`get`](Self::get), but a missing name is `None` instead of
    /// an error.
    pub fn try_get(&self, name: &str) -> Result<Option<String>> {
        match self.get(name) {
            Ok(value) => Ok(Some(value)),
            Err(Error::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Like [`get_bytes`](Self::get_bytes), but a missing name is `None`.
    pub fn try_get_bytes(&self, name: &str) -> Result<Option<SecureBuffer>> {
        match self.get_bytes(name) {
            Ok(value) => Ok(Some(value)),
            Err(Error::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Decrypt a secret and decode it through an injected codec.
    pub fn get_with<T, C: ValueCodec<T>>(&self, name: &str, codec: &C) -> Result<T> {
        let plaintext = self.get_bytes(name)?;
        codec.from_bytes(plaintext.as_bytes())
    }

    /// Store a UTF-8 text secret (no byte-order mark is added).
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        self.set_bytes(name, value.as_bytes())
    }

    /// Store a binary secret.
    ///
    /// On the first mutation after a load, the sentinel is decrypted
    /// under the loaded key; a mistyped password is caught here before
    /// anything is written under the wrong key.  If no sentinel exists
    /// yet, one is created first.
    pub fn set_bytes(&mut self, name: &str, value: &[u8]) -> Result<()> {
        let name = SecretName::new(name)?;
        self.validate_sentinel_once()?;
        self.ensure_sentinel()?;

        let key = self.require_key()?;
        let blob = EncryptedBlob::seal(key, value)?;
        self.vault.secrets.insert(name, blob);
        Ok(())
    }

    /// Encode a value through an injected codec and store the bytes.
    pub fn set_with<T, C: ValueCodec<T>>(&mut self, name: &str, value: &T, codec: &C) -> Result<()> {
        let bytes = codec.to_bytes(value)?;
        self.set_bytes(name, &bytes)
    }

    /// Remove a secret.  Returns whether the name existed.
    pub fn delete(&mut self, name: &str) -> Result<bool> {
        if self.disposed {
            return Err(Error::NoKeyLoaded);
        }
        let name = SecretName::new(name)?;
        Ok(self.vault.secrets.remove(&name).is_some())
    }

    /// The secret names, in their on-disk (case-insensitive) order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.vault.secrets.keys().map(SecretName::as_str)
    }

    /// Read-only view of the underlying document.
    pub fn document(&self) -> &VaultDocument {
        &self.vault
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Write the vault to a file (truncate-and-write on the path).
    ///
    /// A sentinel is created first if none exists, which is why saving
    /// requires a loaded key.  Callers who need crash atomicity write
    /// to a temporary file and rename.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.require_key()?;
        self.ensure_sentinel()?;
        fs::write(path, self.vault.to_pretty_string()?)?;
        Ok(())
    }

    /// Write the vault's on-disk form to any sink.
    pub fn save_to_writer<W: Write>(&mut self, writer: W) -> Result<()> {
        self.require_key()?;
        self.ensure_sentinel()?;
        self.vault.write_to(writer)
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Zeroize and release the key material.
    ///
    /// Crypto operations fail afterwards; disposal is idempotent and
    /// absorbing.
    pub fn dispose(&mut self) {
        self.key = None;
        self.disposed = true;
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn ensure_keyless(&self) -> Result<()> {
        if self.key.is_some() || self.disposed {
            return Err(Error::KeyAlreadyLoaded);
        }
        Ok(())
    }

    fn require_key(&self) -> Result<&KeyMaterial> {
        self.key.as_ref().ok_or(Error::NoKeyLoaded)
    }

    /// Hand freshly constructed key material to the manager, running
    /// any pending schema upgrade now that a key exists.
    fn install_key(&mut self, key: KeyMaterial, password: Option<&[u8]>) -> Result<()> {
        let key = if self.pending_upgrade {
            let upgraded = upgrade::upgrade_to_current(&mut self.vault, key, password)?;
            self.pending_upgrade = false;
            upgraded
        } else {
            key
        };

        self.key = Some(key);
        Ok(())
    }

    /// Decrypt the sentinel under the loaded key, at most once per
    /// manager.  A fresh vault has no sentinel yet and passes trivially.
    fn validate_sentinel_once(&mut self) -> Result<()> {
        if self.sentinel_verified {
            return Ok(());
        }

        let key = self.key.as_ref().ok_or(Error::NoKeyLoaded)?;
        if let Some(sentinel) = &self.vault.sentinel {
            sentinel.open(key)?;
        }
        self.sentinel_verified = true;
        Ok(())
    }

    /// Create the sentinel if the vault does not have one yet.
    fn ensure_sentinel(&mut self) -> Result<()> {
        if self.vault.sentinel.is_some() {
            return Ok(());
        }

        let key = self.key.as_ref().ok_or(Error::NoKeyLoaded)?;
        let sentinel = EncryptedBlob::seal(key, SecureBuffer::random(SENTINEL_LEN).as_bytes())?;
        self.vault.sentinel = Some(sentinel);
        Ok(())
    }
}

impl Default for SecretsManager {
    fn default() -> Self {
        Self::new()
    }
}
