//! `ssclient create` — create a new secrets store.

use crate::cli::{acquire_password, gitignore, output, Cli};
use crate::errors::{Error, Result};
use crate::vault::SecretsManager;

/// Execute the `create` command.
pub fn execute(cli: &Cli) -> Result<()> {
    if cli.store.exists() {
        return Err(Error::CommandFailed(format!(
            "store already exists at {}",
            cli.store.display()
        )));
    }

    let mut manager = SecretsManager::new();

    match &cli.keyfile {
        // Re-use an existing key file so several stores can share a key.
        Some(path) if path.exists() => {
            manager.load_key_from_file(path)?;
            output::info(&format!("Using existing key file {}", path.display()));
        }
        // Generate a fresh key and write it out.
        Some(path) => {
            manager.generate_key()?;
            manager.export_key(path)?;
            output::success(&format!("Generated key file {}", path.display()));
            gitignore::ignore_key_path(path);
        }
        // Password mode: prompt twice unless supplied inline.
        None => {
            let password = acquire_password(cli, true)?;
            manager.load_key_from_password(&password)?;
        }
    }

    manager.save(&cli.store)?;
    output::success(&format!("Created secrets store at {}", cli.store.display()));

    Ok(())
}
