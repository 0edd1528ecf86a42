//! `vaultlock version` — display version and format information.

use console::style;

use crate::authenticator::AUTHENTICATOR_FORMAT_VERSION;
use crate::errors::Result;
use crate::lock::TOKEN_FORMAT_VERSION;
use crate::vault::VAULT_FORMAT_VERSION;

/// Execute the `version` command.
pub fn execute() -> Result<()> {
    println!("vaultlock {}", env!("CARGO_PKG_VERSION"));
    println!(
        "{}",
        style(format!(
            "formats: authenticator v{AUTHENTICATOR_FORMAT_VERSION}, vault v{VAULT_FORMAT_VERSION}, token v{TOKEN_FORMAT_VERSION}"
        ))
        .dim()
    );
    Ok(())
}
