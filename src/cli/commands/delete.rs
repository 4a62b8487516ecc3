//! `ssclient delete` — remove a secret from the store.

use crate::cli::{output, unlock, Cli};
use crate::errors::{Error, Result};
use crate::vault::{SecretsManager, VaultVersionPolicy};

/// Execute the `delete` command.
pub fn execute(cli: &Cli, key: &str) -> Result<()> {
    let mut manager = SecretsManager::load(&cli.store, VaultVersionPolicy::Upgrade)?;
    unlock(cli, &mut manager)?;

    if !manager.delete(key)? {
        return Err(Error::NotFound(key.to_string()));
    }

    manager.save(&cli.store)?;
    output::success(&format!("Deleted secret '{key}'"));
    Ok(())
}
