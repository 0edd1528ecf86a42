//! `vaultlock list` — show property names and registered locks.

use crate::cli::output;
use crate::cli::{Cli, Context};
use crate::errors::Result;

/// Execute the `list` command.  Nothing is decrypted.
pub fn execute(cli: &Cli) -> Result<()> {
    let ctx = Context::from_cli(cli)?;
    let authenticator = ctx.load_authenticator()?;

    output::info(&format!(
        "Authenticator '{}' in {}",
        authenticator.id(),
        ctx.store_dir.display()
    ));
    output::print_properties_table(&authenticator);
    output::print_locks_table(&authenticator);
    Ok(())
}
