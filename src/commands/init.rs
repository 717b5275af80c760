use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the ledger home directory and an initial `config.json` with default settings.
///
/// # Arguments
/// - `ledger_home` - The directory that will be the root of data directory, e.g.
///   `$HOME/pocket-ledger`
///
/// # Errors
/// - Returns an error if any file operations fail.
pub fn init(ledger_home: &Path) -> Result<Out<()>> {
    let config = Config::create(ledger_home)
        .context("Unable to create the ledger directory and config")?;
    Ok(format!(
        "The ledger is ready at {}",
        config.root().display()
    )
    .into())
}
