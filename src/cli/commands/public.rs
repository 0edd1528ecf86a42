//! `vaultlock public` — manage unencrypted properties.

use crate::cli::output;
use crate::cli::{Cli, Context, PublicAction};
use crate::errors::{Result, VaultLockError};

/// Execute a `public` subcommand.
pub fn execute(cli: &Cli, action: &PublicAction) -> Result<()> {
    let ctx = Context::from_cli(cli)?;
    let mut authenticator = ctx.load_authenticator()?;

    match action {
        PublicAction::Set { key, value } => {
            authenticator.update_public_property(key, value.as_str());
            ctx.save_authenticator(&authenticator)?;
            output::success(&format!("Set public property '{key}'"));
        }
        PublicAction::Get { key } => {
            let value = authenticator.public_property(key).ok_or_else(|| {
                VaultLockError::CommandFailed(format!("public property '{key}' not found"))
            })?;
            println!("{}", value.as_string()?);
        }
        PublicAction::Delete { key } => {
            if authenticator.public_property(key).is_none() {
                return Err(VaultLockError::CommandFailed(format!(
                    "public property '{key}' not found"
                )));
            }
            authenticator.remove_public_property(key);
            ctx.save_authenticator(&authenticator)?;
            output::success(&format!("Deleted public property '{key}'"));
        }
    }

    Ok(())
}
