//! `vaultlock set` — add or update a secret property.

use crate::cli::output;
use crate::cli::{value_or_prompt, Cli, Context};
use crate::errors::{Result, VaultLockError};

/// Execute the `set` command.
pub fn execute(cli: &Cli, key: &str, value: Option<&str>) -> Result<()> {
    if key.is_empty() {
        return Err(VaultLockError::CommandFailed(
            "property name cannot be empty".into(),
        ));
    }

    let ctx = Context::from_cli(cli)?;
    let mut authenticator = ctx.load_authenticator()?;

    let value = value_or_prompt(value, &format!("Enter value for {key}"))?;
    let replaced = authenticator.secret_property_ids().any(|id| id == key);
    authenticator.update_secret_property(key, value.as_bytes())?;
    ctx.save_authenticator(&authenticator)?;

    if replaced {
        output::success(&format!("Updated secret '{key}'"));
    } else {
        output::success(&format!("Added secret '{key}'"));
    }
    Ok(())
}
