//! The pluggable value serializer surface.
//!
//! The core only ever stores bytes.  Strings and raw byte values go
//! through [`DefaultCodec`] (UTF-8 without a byte-order mark, bytes
//! as-is); richer user types go through an injected [`ValueCodec`]
//! such as [`JsonCodec`].

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::{Error, Result};

/// Converts values of type `T` to and from the byte form stored in a
/// vault.  The manager never inspects `T` itself.
pub trait ValueCodec<T> {
    fn to_bytes(&self, value: &T) -> Result<Vec<u8>>;
    fn from_bytes(&self, bytes: &[u8]) -> Result<T>;
}

/// The mandatory default codec: strings as raw UTF-8, binary as raw
/// bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCodec;

impl ValueCodec<String> for DefaultCodec {
    fn to_bytes(&self, value: &String) -> Result<Vec<u8>> {
        Ok(value.as_bytes().to_vec())
    }

    fn from_bytes(&self, bytes: &[u8]) -> Result<String> {
        String::from_utf8(bytes.to_vec())
            .map_err(|_| Error::Serialization("value is not valid UTF-8".into()))
    }
}

impl ValueCodec<Vec<u8>> for DefaultCodec {
    fn to_bytes(&self, value: &Vec<u8>) -> Result<Vec<u8>> {
        Ok(value.clone())
    }

    fn from_bytes(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        Ok(bytes.to_vec())
    }
}

/// A codec for arbitrary serde types, stored as compact JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl<T> ValueCodec<T> for JsonCodec
where
    T: Serialize + DeserializeOwned,
{
    fn to_bytes(&self, value: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| Error::Serialization(e.to_string()))
    }

    fn from_bytes(&self, bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes).map_err(|e| Error::Serialization(e.to_string()))
    }
}
