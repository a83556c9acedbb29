//! Replace one Apple Mail signature with the content read from stdin.
//!
//! ```text
//! signature-updater [-w workdir] <signatureName> < signature.html
//! ```
//!
//! Logging goes to stderr; stdout is only used by `--list`.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use signature_updater::{SignatureUpdater, UpdaterConfig, create_automation};
use tracing_subscriber::EnvFilter;

/// Replace an Apple Mail signature with the content read from stdin.
#[derive(Parser)]
#[command(name = "signature-updater", version, about)]
struct Cli {
    /// Dir to temporarily store data. Will be created and removed afterwards.
    #[arg(short, long)]
    workdir: Option<PathBuf>,

    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the names of all signatures and exit.
    #[arg(long)]
    list: bool,

    /// Name of the signature to replace, as shown in Mail's settings.
    #[arg(required_unless_present = "list")]
    signature: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("signature_updater=info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("signature-updater failed: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = UpdaterConfig::load(cli.config.as_deref())
        .context("could not load configuration")?
        .with_workdir(cli.workdir);

    let automation = create_automation();
    let updater = SignatureUpdater::new(automation.as_ref(), config);

    if cli.list {
        for entry in updater.list_signatures()? {
            println!("{}", entry.name);
        }
        return Ok(());
    }

    let name = cli.signature.unwrap_or_default();
    updater.replace_named(&name, &mut std::io::stdin().lock())?;

    tracing::info!(signature = %name, "signature updated");
    Ok(())
}
