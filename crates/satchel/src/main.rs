use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{debug, error};

use satchel_core::kernel::bootstrap::{HostConfig, Kernel};
use satchel_core::Result;

/// Satchel: boot bundles and their dependencies
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Host configuration file (TOML, JSON or YAML)
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Additional directory scanned for library bundles (repeatable)
    #[arg(long = "library-dir", short = 'L', value_name = "DIR")]
    library_dirs: Vec<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Boot one or more bundles, dependencies first
    Boot {
        /// Bundle identifiers, e.g. app.shop or library.payments
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Boot the identifiers listed under `boot` in the host configuration
    Start,
    /// Report whether a bundle is realized or could be provided
    Exists {
        /// Bundle identifier
        id: String,
    },
    /// List realized bundles and registered providers
    List,
}

#[tokio::main]
async fn main() -> ExitCode {
    // RUST_LOG controls verbosity; a second logger is not an error
    if let Err(e) = env_logger::try_init() {
        eprintln!("Failed to initialize env_logger: {}", e);
    }

    let args = CliArgs::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_host_config(args: &CliArgs) -> Result<HostConfig> {
    let mut config = match &args.config {
        Some(path) => HostConfig::load(path)?,
        None => HostConfig::default(),
    };
    config.library_dirs.extend(args.library_dirs.iter().cloned());
    debug!("Host configuration: {:?}", config);
    Ok(config)
}

async fn run(args: CliArgs) -> Result<()> {
    let config = load_host_config(&args)?;
    let kernel = Kernel::from_config(&config).await?;
    let manager = kernel.manager();

    match args.command {
        Commands::Boot { ids } => {
            for id in &ids {
                if manager.boot(id).await? {
                    println!("Booted: {}", id);
                } else {
                    println!("Not found: {}", id);
                }
            }
            kernel.shutdown().await?;
        }
        Commands::Start => {
            for outcome in kernel.start().await? {
                if outcome.found {
                    println!("Booted: {}", outcome.identifier);
                } else {
                    println!("Not found: {}", outcome.identifier);
                }
            }
            kernel.shutdown().await?;
        }
        Commands::Exists { id } => {
            println!("{}", manager.exists(&id).await);
        }
        Commands::List => {
            let bundles = manager.bundle_ids().await;
            let providers = manager.provider_keys().await;

            println!("Bundles:");
            if bundles.is_empty() {
                println!("  (none)");
            }
            for id in &bundles {
                let status = if manager.is_booted(id).await { "booted" } else { "idle" };
                println!("  - {} [{}]", id, status);
            }

            println!("Providers:");
            if providers.is_empty() {
                println!("  (none)");
            }
            for key in &providers {
                println!("  - {}", key);
            }
        }
    }

    Ok(())
}
