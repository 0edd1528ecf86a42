//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::authenticator::Authenticator;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of properties (Name, Kind, Value).  Secret values are
/// never shown.
pub fn print_properties_table(authenticator: &Authenticator) {
    let secret_ids: Vec<&str> = authenticator.secret_property_ids().collect();
    let public: Vec<_> = authenticator.public_properties().collect();

    if !authenticator.has_secret() && secret_ids.is_empty() && public.is_empty() {
        info("No secrets or properties stored yet.");
        tip("Run `vaultlock secret <VALUE>` or `vaultlock set <KEY>` to add one.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Kind", "Value"]);

    if authenticator.has_secret() {
        table.add_row(vec!["(main secret)", "secret", "********"]);
    }
    for id in secret_ids {
        table.add_row(vec![id, "secret", "********"]);
    }
    for (id, value) in public {
        let shown = value
            .as_string()
            .unwrap_or_else(|_| format!("<{} bytes>", value.as_bytes().len()));
        table.add_row(vec![id.to_string(), "public".to_string(), shown]);
    }

    println!("{table}");
}

/// Print the registered lock ids and their key-store aliases.
pub fn print_locks_table(authenticator: &Authenticator) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Lock", "Key alias"]);

    for lock_id in authenticator.lock_ids() {
        let alias = authenticator
            .lock_token(lock_id)
            .map(|token| token.alias().to_string())
            .unwrap_or_else(|_| style("<unreadable>").red().to_string());
        table.add_row(vec![lock_id.to_string(), alias]);
    }

    println!("{table}");
}
