//! One module per subcommand.

pub mod completions;
pub mod delete;
pub mod get;
pub mod init;
pub mod list;
pub mod passwd;
pub mod pin;
pub mod public;
pub mod reset;
pub mod secret;
pub mod set;
pub mod version;

use crate::authenticator::Authenticator;
use crate::cli::{output, Context};
use crate::errors::Result;
use crate::lock::{self, Token};

/// Delete the key-store entries behind every lock of `authenticator`.
fn remove_lock_keys(ctx: &Context, authenticator: &Authenticator) -> Result<()> {
    for lock_id in authenticator.lock_ids() {
        let token = authenticator.lock_token(lock_id)?;
        lock::remove_key(ctx.key_store.as_ref(), &token)?;
    }
    Ok(())
}

/// Delete the key of a token that a saved rotation replaced.
///
/// The new state is already on disk, so a failure here only leaves an
/// orphaned key and is reported as a warning.
fn remove_replaced_key(ctx: &Context, replaced: Option<Token>) {
    let Some(token) = replaced else {
        return;
    };
    if let Err(e) = lock::remove_key(ctx.key_store.as_ref(), &token) {
        output::warning(&format!("Could not remove old key '{}': {e}", token.alias()));
    }
}
