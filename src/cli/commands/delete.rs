//! `vaultlock delete` — remove a secret property.

use crate::cli::output;
use crate::cli::{confirm, Cli, Context};
use crate::errors::{Result, VaultLockError};

/// Execute the `delete` command.
pub fn execute(cli: &Cli, key: &str, force: bool) -> Result<()> {
    let ctx = Context::from_cli(cli)?;
    let mut authenticator = ctx.load_authenticator()?;

    if !authenticator.secret_property_ids().any(|id| id == key) {
        return Err(VaultLockError::CommandFailed(format!(
            "secret '{key}' not found"
        )));
    }

    if !confirm(&format!("Delete secret '{key}'?"), force)? {
        output::info("Cancelled.");
        return Ok(());
    }

    authenticator.remove_secret_property(key);
    ctx.save_authenticator(&authenticator)?;

    output::success(&format!("Deleted secret '{key}'"));
    Ok(())
}
