//! Schema upgrades across vault generations.
//!
//! Upgrades run as a chain of single-step records dispatched by the
//! document's current version, after key material has become
//! available.  Whatever goes wrong inside a step is flattened to a
//! bare upgrade failure so partial plaintext and step internals never
//! reach the caller.

use std::collections::BTreeMap;

use serde_json::Value;

use super::blob::EncryptedBlob;
use super::document::{VaultDocument, SCHEMA_VERSION};
use super::SENTINEL_LEN;
use crate::crypto::{derive_key_material, generate_salt, KeyMaterial, SecureBuffer, PBKDF2_ROUNDS};
use crate::errors::{Error, Result};

/// Whether an older-schema vault may be upgraded at load time.
///
/// The library defaults to `Strict`; the CLI opts into `Upgrade`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VaultVersionPolicy {
    /// Refuse to load vaults older than the current schema.
    #[default]
    Strict,
    /// Upgrade older vaults in memory once a key is available.
    Upgrade,
}

struct UpgradeStep {
    from: u32,
    apply: fn(&mut VaultDocument, KeyMaterial, Option<&[u8]>) -> Result<KeyMaterial>,
}

const STEPS: &[UpgradeStep] = &[
    UpgradeStep {
        from: 1,
        apply: v1_to_v2,
    },
    UpgradeStep {
        from: 2,
        apply: v2_to_v3,
    },
];

/// Advance `doc` to the current schema.
///
/// Steps run against a staged copy; the document is only replaced once
/// the whole chain has succeeded.  Returns the key material valid for
/// the upgraded document (the v2→v3 step re-derives it).
pub(crate) fn upgrade_to_current(
    doc: &mut VaultDocument,
    keys: KeyMaterial,
    password: Option<&[u8]>,
) -> Result<KeyMaterial> {
    let from = doc.version;
    let mut staged = doc.clone();
    let mut keys = keys;

    while staged.version < SCHEMA_VERSION {
        let step = STEPS
            .iter()
            .find(|s| s.from == staged.version)
            .ok_or(Error::UnsupportedVersion(staged.version))?;
        keys = (step.apply)(&mut staged, keys, password)
            .map_err(|_| Error::UpgradeFailure(from))?;
    }

    *doc = staged;
    Ok(keys)
}

/// v1 → v2: values stop being JSON-typed.
///
/// Each decrypted v1 value is a JSON document: a string becomes its raw
/// UTF-8, an array of byte-sized numbers becomes raw bytes, anything
/// else aborts the step.  A sentinel is created — v1 vaults had none.
fn v1_to_v2(
    doc: &mut VaultDocument,
    keys: KeyMaterial,
    _password: Option<&[u8]>,
) -> Result<KeyMaterial> {
    let mut upgraded = BTreeMap::new();

    for (name, blob) in std::mem::take(&mut doc.secrets) {
        let plaintext = blob.open(&keys)?;
        let value: Value = serde_json::from_slice(plaintext.as_bytes())
            .map_err(|e| Error::MalformedVault(e.to_string()))?;

        let raw = match value {
            Value::String(s) => s.into_bytes(),
            Value::Array(items) => {
                let mut bytes = Vec::with_capacity(items.len());
                for item in items {
                    let byte = item
                        .as_u64()
                        .filter(|&n| n <= u8::MAX as u64)
                        .ok_or_else(|| {
                            Error::MalformedVault("array value holds non-byte elements".into())
                        })?;
                    bytes.push(byte as u8);
                }
                bytes
            }
            _ => {
                return Err(Error::MalformedVault(
                    "value is neither a JSON string nor a byte array".into(),
                ))
            }
        };

        upgraded.insert(name, EncryptedBlob::seal(&keys, &raw)?);
    }

    doc.secrets = upgraded;
    doc.sentinel = Some(EncryptedBlob::seal(
        &keys,
        SecureBuffer::random(SENTINEL_LEN).as_bytes(),
    )?);
    doc.version = 2;
    Ok(keys)
}

/// v2 → v3: 16-byte salt and 256 000 PBKDF2 rounds.
///
/// Only possible in password mode — the stronger key must be re-derived
/// from the password itself.  Every secret is decrypted under the old
/// key and re-encrypted under the new one, and the sentinel is
/// replaced.
fn v2_to_v3(
    doc: &mut VaultDocument,
    keys: KeyMaterial,
    password: Option<&[u8]>,
) -> Result<KeyMaterial> {
    let password = password.ok_or(Error::NoKeyLoaded)?;

    // Prove the old key before touching anything; an empty vault would
    // otherwise re-encrypt nothing and accept a mistyped password.
    if let Some(sentinel) = &doc.sentinel {
        sentinel.open(&keys)?;
    }

    let mut plaintexts = Vec::new();
    for (name, blob) in std::mem::take(&mut doc.secrets) {
        plaintexts.push((name, blob.open(&keys)?));
    }

    doc.iv = generate_salt().to_vec();
    let new_keys =
        KeyMaterial::from_key_material(derive_key_material(password, &doc.iv, PBKDF2_ROUNDS))?;

    for (name, plaintext) in plaintexts {
        doc.secrets
            .insert(name, EncryptedBlob::seal(&new_keys, plaintext.as_bytes())?);
    }
    doc.sentinel = Some(EncryptedBlob::seal(
        &new_keys,
        SecureBuffer::random(SENTINEL_LEN).as_bytes(),
    )?);
    doc.version = 3;
    Ok(new_keys)
}
