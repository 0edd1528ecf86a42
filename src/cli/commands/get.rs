//! `vaultlock get` — print a single secret property.

use zeroize::Zeroizing;

use crate::cli::{Cli, Context};
use crate::errors::{Result, VaultLockError};

/// Execute the `get` command.
pub fn execute(cli: &Cli, key: &str) -> Result<()> {
    let ctx = Context::from_cli(cli)?;
    let mut authenticator = ctx.load_authenticator()?;

    if !authenticator.secret_property_ids().any(|id| id == key) {
        return Err(VaultLockError::CommandFailed(format!(
            "secret '{key}' not found"
        )));
    }

    let value = ctx.unlock(&mut authenticator, cli.lock, |session| {
        session.secret_property(key)
    })?;
    let value = Zeroizing::new(value.as_string()?);

    // Print the raw value (no decoration) so it can be piped.
    println!("{}", value.as_str());
    Ok(())
}
