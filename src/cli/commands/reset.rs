//! `vaultlock reset` — delete the authenticator and its lock keys.

use crate::cli::output;
use crate::cli::{confirm, Cli, Context};
use crate::errors::Result;
use crate::store::DataStore;

use super::remove_lock_keys;

/// Execute the `reset` command.
pub fn execute(cli: &Cli, force: bool) -> Result<()> {
    let ctx = Context::from_cli(cli)?;
    let authenticator = ctx.load_authenticator()?;

    if !confirm(
        &format!(
            "Delete authenticator '{}' and every secret it holds?",
            ctx.authenticator_id
        ),
        force,
    )? {
        output::info("Cancelled.");
        return Ok(());
    }

    remove_lock_keys(&ctx, &authenticator)?;
    ctx.data_store.remove(&ctx.authenticator_id)?;

    output::success(&format!("Reset authenticator '{}'", ctx.authenticator_id));
    Ok(())
}
