//! `vaultlock secret` — print or replace the main secret.

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{value_or_prompt, Cli, Context};
use crate::errors::Result;

/// Execute the `secret` command.
///
/// Replacing the secret needs no unlock: it is encrypted under the vault's
/// public key.
pub fn execute(cli: &Cli, value: Option<&str>, prompt: bool) -> Result<()> {
    let ctx = Context::from_cli(cli)?;
    let mut authenticator = ctx.load_authenticator()?;

    if value.is_some() || prompt {
        let value = value_or_prompt(value, "Secret value")?;
        authenticator.update_secret(value.as_bytes())?;
        ctx.save_authenticator(&authenticator)?;
        output::success("Main secret updated");
        return Ok(());
    }

    let secret = ctx.unlock(&mut authenticator, cli.lock, |session| session.secret())?;
    let secret = Zeroizing::new(secret.as_string()?);
    println!("{}", secret.as_str());
    Ok(())
}
