use clap::Parser;
use std::{io, path::PathBuf};

use sshwiz::{logging, process, Repl, SettingsStore, Shell, SystemToolchain};

/// Interactive shell for adding, listing and connecting to ssh hosts
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Settings file [default: <config dir>/sshwiz/settings]
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let path = match cli.settings {
        Some(path) => path,
        None => SettingsStore::default_path()?,
    };
    let store = SettingsStore::new(path);
    let settings = store.load()?;
    tracing::debug!(settings = ?settings, path = %store.path().display(), "starting");

    process::install_interrupt_handler();

    let mut shell = Shell::new(
        Repl::new()?,
        SystemToolchain,
        settings,
        io::stdout(),
        io::stderr(),
    )
    .with_store(store);
    shell.run()?;

    Ok(())
}
