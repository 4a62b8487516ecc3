pub mod cli;
pub mod crypto;
pub mod errors;
pub mod serial;
pub mod vault;

pub use errors::{Error, Result};
pub use serial::{DefaultCodec, JsonCodec, ValueCodec};
pub use vault::{EncryptedBlob, SecretsManager, VaultDocument, VaultVersionPolicy};
