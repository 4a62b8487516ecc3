//! CLI module — Clap argument parser, output helpers, and command
//! implementations.

pub mod commands;
pub mod gitignore;
pub mod output;

use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::errors::{Error, Result};
use crate::vault::SecretsManager;

/// Environment variable consulted before prompting for a password.
const PASSWORD_ENV_VAR: &str = "SECURESTORE_PASSWORD";

/// SecureStore client: manage an encrypted secrets file.
#[derive(Parser)]
#[command(
    name = "ssclient",
    about = "Manage an encrypted secrets file you can commit to version control",
    version,
    disable_version_flag = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Print version
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    version: Option<bool>,

    /// Path to the secrets store
    #[arg(short, long, default_value = "secrets.json", global = true)]
    pub store: PathBuf,

    /// Unlock with a password (prompts when no value is given)
    #[arg(short, long, global = true, num_args = 0..=1)]
    pub password: Option<Option<String>>,

    /// Unlock with a key file instead of a password
    #[arg(short, long, global = true)]
    pub keyfile: Option<PathBuf>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new secrets store
    Create,

    /// Add or update a secret
    Set {
        /// Secret name, or NAME=VALUE in one argument
        key: String,
        /// Secret value (omit to read from stdin or prompt)
        value: Option<String>,
    },

    /// Decrypt and print a secret's value
    Get {
        /// Secret name
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        key: Option<String>,

        /// Decrypt every secret in the store
        #[arg(short, long)]
        all: bool,

        /// Output format for --all
        #[arg(short = 't', long = "output-format", value_enum, default_value_t = OutputFormat::Json)]
        output_format: OutputFormat,
    },

    /// Remove a secret
    Delete {
        /// Secret name
        key: String,
    },
}

/// Output formats for `get --all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Get the vault password, trying in order:
/// 1. Inline `-p VALUE` on the command line
/// 2. `SECURESTORE_PASSWORD` env var (CI/CD)
/// 3. Interactive masked prompt on stderr
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on
/// drop.  `confirm` re-prompts for a match (used by `create`).
pub fn acquire_password(cli: &Cli, confirm: bool) -> Result<Zeroizing<String>> {
    if let Some(Some(pw)) = &cli.password {
        return Ok(Zeroizing::new(pw.clone()));
    }

    if let Ok(pw) = std::env::var(PASSWORD_ENV_VAR) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let mut prompt = dialoguer::Password::new().with_prompt("Vault password");
    if confirm {
        prompt = prompt.with_confirmation("Confirm vault password", "Passwords do not match");
    }
    let pw = prompt
        .interact()
        .map_err(|e| Error::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Load key material into `manager` from the source the flags select:
/// `--keyfile` wins, otherwise a password.
pub fn unlock(cli: &Cli, manager: &mut SecretsManager) -> Result<()> {
    match &cli.keyfile {
        Some(path) => manager.load_key_from_file(path),
        None => {
            let password = acquire_password(cli, false)?;
            manager.load_key_from_password(&password)
        }
    }
}

/// Split a `NAME=VALUE` argument into its parts, if it has any.
pub fn split_key_value(key: &str) -> (&str, Option<&str>) {
    match key.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (key, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_name_equals_value() {
        assert_eq!(split_key_value("db=postgres"), ("db", Some("postgres")));
    }

    #[test]
    fn keeps_equals_in_value() {
        assert_eq!(split_key_value("k=a=b"), ("k", Some("a=b")));
    }

    #[test]
    fn plain_name_has_no_value() {
        assert_eq!(split_key_value("token"), ("token", None));
    }

    #[test]
    fn empty_value_is_still_a_value() {
        assert_eq!(split_key_value("k="), ("k", Some("")));
    }
}
