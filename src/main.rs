mod child;
mod exit_code;
mod supervisor;

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Relaunch a command for as long as it exits cleanly.
///
/// Spawns the given program with the given arguments, waits for it to
/// terminate, and spawns it again whenever it exits with status 0. Any other
/// termination stops the loop; the supervisor's own exit code reports its
/// operational health, not the child's exit status.
#[derive(Parser, Debug)]
#[command(name = "respawn", version, about)]
struct Cli {
    /// Program to supervise, followed by its arguments (passed verbatim)
    #[arg(
        value_name = "PROGRAM",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    command: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(?cli, "parsed CLI arguments");

    let code = supervisor::supervise(&cli.command);
    std::process::exit(code.code());
}
