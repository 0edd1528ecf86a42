use clap::Parser;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;
use vaultlock::cli::{commands, output, Cli, Commands};

fn main() {
    // Diagnostics go to stderr so stdout stays pipeable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .with_env_var("VAULTLOCK_LOG")
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { force } => commands::init::execute(&cli, force),
        Commands::Secret { ref value, prompt } => {
            commands::secret::execute(&cli, value.as_deref(), prompt)
        }
        Commands::Set { ref key, ref value } => {
            commands::set::execute(&cli, key, value.as_deref())
        }
        Commands::Get { ref key } => commands::get::execute(&cli, key),
        Commands::Delete { ref key, force } => commands::delete::execute(&cli, key, force),
        Commands::Public { ref action } => commands::public::execute(&cli, action),
        Commands::List => commands::list::execute(&cli),
        Commands::Passwd => commands::passwd::execute(&cli),
        Commands::Pin { ref action } => commands::pin::execute(&cli, action),
        Commands::Reset { force } => commands::reset::execute(&cli, force),
        Commands::Completions { ref shell } => commands::completions::execute(shell),
        Commands::Version => commands::version::execute(),
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
