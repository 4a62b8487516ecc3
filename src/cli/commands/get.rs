//! `ssclient get` — decrypt and print secrets.

use crate::cli::{unlock, Cli, OutputFormat};
use crate::errors::{Error, Result};
use crate::vault::{SecretsManager, VaultVersionPolicy};

/// Execute the `get` command.
///
/// A single secret prints as the bare value followed by a newline; the
/// `--all` form prints every secret in the chosen output format.  Only
/// decrypted values touch stdout.
pub fn execute(cli: &Cli, key: Option<&str>, all: bool, format: OutputFormat) -> Result<()> {
    let mut manager = SecretsManager::load(&cli.store, VaultVersionPolicy::Upgrade)?;
    unlock(cli, &mut manager)?;

    if !all {
        // Clap guarantees the key is present when --all is absent.
        let key = key.ok_or_else(|| Error::CommandFailed("no secret name given".into()))?;
        let value = manager.get(key)?;
        println!("{value}");
        return Ok(());
    }

    // Decrypt in the store's canonical (case-insensitive) name order and
    // keep that order in the output.
    let names: Vec<String> = manager.keys().map(str::to_owned).collect();
    let mut decrypted = Vec::with_capacity(names.len());
    for name in names {
        let value = manager.get(&name)?;
        decrypted.push((name, value));
    }

    match format {
        OutputFormat::Json => {
            let mut object = serde_json::Map::new();
            for (name, value) in decrypted {
                object.insert(name, serde_json::Value::String(value));
            }
            let rendered = serde_json::to_string_pretty(&object)
                .map_err(|e| Error::Serialization(e.to_string()))?;
            println!("{rendered}");
        }
        OutputFormat::Text => {
            for (name, value) in &decrypted {
                println!("{name}={value}");
            }
        }
    }

    Ok(())
}
