//! `vaultlock init` — create an authenticator guarded by a password.

use crate::authenticator::Authenticator;
use crate::cli::output;
use crate::cli::{prompt_new_guard, Cli, Context};
use crate::errors::{Result, VaultLockError};

use super::remove_lock_keys;

/// Execute the `init` command.
pub fn execute(cli: &Cli, force: bool) -> Result<()> {
    let ctx = Context::from_cli(cli)?;
    let kind = cli.lock;

    let mut replaced = None;
    if ctx.authenticator_exists()? {
        if !force {
            return Err(VaultLockError::CommandFailed(format!(
                "authenticator '{}' already exists (use --force to replace it)",
                ctx.authenticator_id
            )));
        }
        replaced = ctx.load_authenticator().ok();
    }

    let guard = prompt_new_guard(kind, Some(kind.env_var()))?;
    let lock = ctx.password_lock(kind);

    let mut authenticator = Authenticator::with_id(ctx.authenticator_id.as_str());
    {
        let mut editor = authenticator.initialize(None, &[], &[])?;
        editor.register_lock(kind.lock_id(), lock.with_password(&guard))?;
    }
    ctx.save_authenticator(&authenticator)?;

    // The old authenticator's keys go only once its replacement is saved.
    if let Some(old) = replaced {
        output::warning(&format!("Replaced authenticator '{}'", ctx.authenticator_id));
        if let Err(e) = remove_lock_keys(&ctx, &old) {
            output::warning(&format!("Could not remove old lock keys: {e}"));
        }
    }

    output::success(&format!(
        "Created authenticator '{}' with a {} lock",
        ctx.authenticator_id,
        kind.label()
    ));
    output::tip("Store the main secret with `vaultlock secret <VALUE>`.");
    Ok(())
}
