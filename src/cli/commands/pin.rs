//! `vaultlock pin` — add or remove the PIN lock.

use crate::cli::output;
use crate::cli::{prompt_new_guard, Cli, Context, LockKind, PinAction, PIN_LOCK_ID};
use crate::errors::{Result, VaultLockError};
use crate::lock;

use super::remove_replaced_key;

/// Execute a `pin` subcommand.
pub fn execute(cli: &Cli, action: &PinAction) -> Result<()> {
    let ctx = Context::from_cli(cli)?;
    let mut authenticator = ctx.load_authenticator()?;

    match action {
        PinAction::Add => {
            let pin_lock = ctx.password_lock(LockKind::Pin);
            let replaced = authenticator.lock_token(PIN_LOCK_ID).ok();
            ctx.unlock(&mut authenticator, LockKind::Password, |session| {
                let pin = prompt_new_guard(LockKind::Pin, Some(LockKind::Pin.new_env_var()))?;
                session
                    .edit()
                    .register_lock(PIN_LOCK_ID, pin_lock.with_password(&pin))
            })?;
            ctx.save_authenticator(&authenticator)?;
            remove_replaced_key(&ctx, replaced);
            output::success("PIN lock registered");
        }
        PinAction::Remove => {
            if !authenticator.lock_enabled(PIN_LOCK_ID) {
                return Err(VaultLockError::CommandFailed(
                    "no PIN lock is registered".into(),
                ));
            }
            let token = authenticator.lock_token(PIN_LOCK_ID)?;
            authenticator.unregister_lock(PIN_LOCK_ID);
            // Saving refuses an authenticator without locks, so the key is
            // only dropped once another lock is known to remain.
            ctx.save_authenticator(&authenticator)?;
            lock::remove_key(ctx.key_store.as_ref(), &token)?;
            output::success("PIN lock removed");
        }
    }

    Ok(())
}
