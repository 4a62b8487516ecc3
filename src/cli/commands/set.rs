//! `ssclient set` — add or update a secret in the store.

use std::io::{self, IsTerminal, Read};

use crate::cli::{output, split_key_value, unlock, Cli};
use crate::errors::{Error, Result};
use crate::vault::{SecretsManager, VaultVersionPolicy};

/// Execute the `set` command.
///
/// Accepts `set NAME VALUE` or `set NAME=VALUE`; with neither, the
/// value is read from piped stdin or prompted for with masking.
pub fn execute(cli: &Cli, key: &str, value: Option<&str>) -> Result<()> {
    let (name, inline_value) = match value {
        Some(v) => (key, Some(v)),
        None => split_key_value(key),
    };

    let secret_value = if let Some(v) = inline_value {
        output::warning("Value provided on command line — it may appear in shell history.");
        v.to_string()
    } else if !io::stdin().is_terminal() {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf.trim_end().to_string()
    } else {
        dialoguer::Password::new()
            .with_prompt(format!("Value for {name}"))
            .interact()
            .map_err(|e| Error::CommandFailed(format!("input prompt: {e}")))?
    };

    let mut manager = SecretsManager::load(&cli.store, VaultVersionPolicy::Upgrade)?;
    unlock(cli, &mut manager)?;

    manager.set(name, &secret_value)?;
    manager.save(&cli.store)?;

    output::success(&format!("Secret '{name}' saved"));
    Ok(())
}
