//! The serializable vault container and its deterministic text form.
//!
//! A v3 vault file is a single pretty-printed JSON object with members
//! in fixed order:
//!
//! ```text
//! {
//!   "version": 3,
//!   "iv": "<base64 of the 16-byte PBKDF2 salt>",
//!   "sentinel": { "iv": "…", "hmac": "…", "payload": "…" },
//!   "secrets": {
//!     "<name>": { "iv": "…", "hmac": "…", "payload": "…" },
//!     …
//!   }
//! }
//! ```
//!
//! Secret names are ordered case-insensitively so that re-saving a
//! vault never reorders unrelated entries.  Output uses two-space
//! indentation and `\n` line terminators and ends in a single trailing
//! newline.
//!
//! Readers also accept the historical v1 PascalCase member names.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use super::blob::EncryptedBlob;
use crate::crypto::generate_salt;
use crate::errors::{Error, Result};

/// The schema version this build reads and writes natively.
pub const SCHEMA_VERSION: u32 = 3;

/// A non-empty secret name, ordered case-insensitively.
///
/// Comparison folds ASCII case byte-wise (ordinal); full Unicode case
/// folding is deliberately not applied.  Two names differing only in
/// ASCII case refer to the same secret, and the casing of the first
/// insertion is the one that persists.
#[derive(Debug, Clone, Serialize)]
pub struct SecretName(String);

impl SecretName {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::MalformedVault("secret names must be non-empty".into()));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Ord for SecretName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .bytes()
            .map(|b| b.to_ascii_lowercase())
            .cmp(other.0.bytes().map(|b| b.to_ascii_lowercase()))
    }
}

impl PartialOrd for SecretName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SecretName {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SecretName {}

impl<'de> Deserialize<'de> for SecretName {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        SecretName::new(name).map_err(serde::de::Error::custom)
    }
}

/// The vault document: schema version, key-derivation salt, sentinel,
/// and the sorted name → blob map.
///
/// The `iv` member is the PBKDF2 salt — distinct from the per-blob IVs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultDocument {
    #[serde(alias = "Version")]
    pub version: u32,

    #[serde(
        serialize_with = "base64_encode",
        deserialize_with = "base64_decode",
        alias = "IV"
    )]
    pub iv: Vec<u8>,

    #[serde(default, alias = "Sentinel")]
    pub sentinel: Option<EncryptedBlob>,

    #[serde(default, alias = "Secrets")]
    pub secrets: BTreeMap<SecretName, EncryptedBlob>,
}

impl VaultDocument {
    /// A fresh, empty document at the current schema with a new salt.
    pub fn new() -> Self {
        Self {
            version: SCHEMA_VERSION,
            iv: generate_salt().to_vec(),
            sentinel: None,
            secrets: BTreeMap::new(),
        }
    }

    /// Parse a document from a byte source.
    ///
    /// Accepts any schema version the file declares; the caller decides
    /// whether that version is loadable.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        serde_json::from_reader(reader).map_err(|e| Error::MalformedVault(e.to_string()))
    }

    /// Render the deterministic on-disk text form.
    pub fn to_pretty_string(&self) -> Result<String> {
        let mut out = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        out.push('\n');
        Ok(out)
    }

    /// Write the document to a sink in its on-disk form.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(self.to_pretty_string()?.as_bytes())?;
        Ok(())
    }
}

impl Default for VaultDocument {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

pub(crate) fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let encoded = BASE64.encode(data);
    serializer.serialize_str(&encoded)
}

pub(crate) fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{KeyMaterial, SALT_LEN};

    #[test]
    fn new_document_has_current_schema_and_salt() {
        let doc = VaultDocument::new();
        assert_eq!(doc.version, SCHEMA_VERSION);
        assert_eq!(doc.iv.len(), SALT_LEN);
        assert!(doc.sentinel.is_none());
        assert!(doc.secrets.is_empty());
    }

    #[test]
    fn names_sort_case_insensitively() {
        let mut doc = VaultDocument::new();
        let keys = KeyMaterial::generate();
        for name in ["zulu", "Alpha", "MIKE", "bravo"] {
            doc.secrets.insert(
                SecretName::new(name).unwrap(),
                EncryptedBlob::seal(&keys, b"x").unwrap(),
            );
        }

        let order: Vec<&str> = doc.secrets.keys().map(|k| k.as_str()).collect();
        assert_eq!(order, ["Alpha", "bravo", "MIKE", "zulu"]);
    }

    #[test]
    fn names_differing_only_in_case_collide() {
        let mut doc = VaultDocument::new();
        let keys = KeyMaterial::generate();
        doc.secrets.insert(
            SecretName::new("Token").unwrap(),
            EncryptedBlob::seal(&keys, b"one").unwrap(),
        );
        doc.secrets.insert(
            SecretName::new("TOKEN").unwrap(),
            EncryptedBlob::seal(&keys, b"two").unwrap(),
        );

        assert_eq!(doc.secrets.len(), 1);
        // The first insertion's casing persists.
        assert_eq!(doc.secrets.keys().next().unwrap().as_str(), "Token");
    }

    #[test]
    fn empty_name_is_rejected() {
        assert!(SecretName::new("").is_err());
    }

    #[test]
    fn pretty_output_is_stable_and_ordered() {
        let mut doc = VaultDocument::new();
        let keys = KeyMaterial::generate();
        doc.sentinel = Some(EncryptedBlob::seal(&keys, b"s").unwrap());
        doc.secrets.insert(
            SecretName::new("beta").unwrap(),
            EncryptedBlob::seal(&keys, b"2").unwrap(),
        );
        doc.secrets.insert(
            SecretName::new("alpha").unwrap(),
            EncryptedBlob::seal(&keys, b"1").unwrap(),
        );

        let text = doc.to_pretty_string().unwrap();
        assert!(text.ends_with("}\n"));
        assert!(text.contains("  \"version\": 3,\n"));

        // Fixed outer member order, sorted secrets.
        let version_at = text.find("\"version\"").unwrap();
        let iv_at = text.find("\"iv\"").unwrap();
        let sentinel_at = text.find("\"sentinel\"").unwrap();
        let secrets_at = text.find("\"secrets\"").unwrap();
        assert!(version_at < iv_at && iv_at < sentinel_at && sentinel_at < secrets_at);
        assert!(text.find("\"alpha\"").unwrap() < text.find("\"beta\"").unwrap());

        // Re-rendering the same document is byte-identical.
        assert_eq!(text, doc.to_pretty_string().unwrap());
    }

    #[test]
    fn roundtrip_through_reader() {
        let mut doc = VaultDocument::new();
        let keys = KeyMaterial::generate();
        doc.secrets.insert(
            SecretName::new("db-url").unwrap(),
            EncryptedBlob::seal(&keys, b"postgres://localhost").unwrap(),
        );

        let text = doc.to_pretty_string().unwrap();
        let parsed = VaultDocument::from_reader(text.as_bytes()).unwrap();
        assert_eq!(parsed.version, doc.version);
        assert_eq!(parsed.iv, doc.iv);
        assert_eq!(parsed.secrets.len(), 1);

        let blob = &parsed.secrets[&SecretName::new("db-url").unwrap()];
        assert_eq!(blob.open(&keys).unwrap().as_bytes(), b"postgres://localhost");
    }

    #[test]
    fn pascal_case_members_are_accepted() {
        let keys = KeyMaterial::generate();
        let blob = EncryptedBlob::seal(&keys, b"\"legacy\"").unwrap();
        let legacy = format!(
            r#"{{
  "Version": 1,
  "IV": "{}",
  "Secrets": {{
    "token": {{ "IV": "{}", "HMAC": "{}", "Payload": "{}" }}
  }}
}}"#,
            BASE64.encode([0u8; 8]),
            BASE64.encode(&blob.iv),
            BASE64.encode(&blob.hmac),
            BASE64.encode(&blob.payload),
        );

        let parsed = VaultDocument::from_reader(legacy.as_bytes()).unwrap();
        assert_eq!(parsed.version, 1);
        assert_eq!(parsed.iv.len(), 8);
        assert!(parsed.sentinel.is_none());
        assert_eq!(parsed.secrets.len(), 1);
    }
}
