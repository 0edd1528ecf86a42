//! `vaultlock passwd` — change the password (or PIN).
//!
//! Unlocks with the current value, then registers the lock again under
//! the new one with a fresh key-store key.  The old key is deleted once
//! the rotated authenticator is saved, which is when the old value stops
//! working.

use crate::cli::output;
use crate::cli::{prompt_new_guard, Cli, Context};
use crate::errors::Result;

use super::remove_replaced_key;

/// Execute the `passwd` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let ctx = Context::from_cli(cli)?;
    let mut authenticator = ctx.load_authenticator()?;
    let kind = cli.lock;
    let lock = ctx.password_lock(kind);
    let replaced = authenticator.lock_token(kind.lock_id()).ok();

    ctx.unlock(&mut authenticator, kind, |session| {
        let new_guard = prompt_new_guard(kind, Some(kind.new_env_var()))?;
        session
            .edit()
            .register_lock(kind.lock_id(), lock.with_password(&new_guard))
    })?;
    ctx.save_authenticator(&authenticator)?;
    remove_replaced_key(&ctx, replaced);

    output::success(&format!("Changed {}", kind.label()));
    Ok(())
}
