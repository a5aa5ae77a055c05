//! CLI entry point for inkpress

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inkpress::commands;
use inkpress::Site;

#[derive(Parser)]
#[command(name = "inkpress")]
#[command(version)]
#[command(about = "A small static blog generator", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Defaults to `build`
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the site into the public directory
    #[command(alias = "b")]
    Build {
        /// Rebuild whenever a source, layout or the config changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Remove the public directory
    Clean,

    /// List the documents in the site index
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a new post
    New {
        /// Title of the new post
        title: String,
    },

    /// Initialize a new site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "inkpress=debug,info"
    } else {
        "inkpress=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command.unwrap_or(Commands::Build { watch: false }) {
        Commands::Build { watch } => {
            let site = Site::new(&base_dir)?;
            let report = commands::build::run(&site)?;
            if report.is_clean() {
                println!("Built {} pages", report.pages);
            } else {
                println!(
                    "Built {} pages, skipped {} documents (see warnings above)",
                    report.pages,
                    report.failures.len()
                );
            }

            if watch {
                commands::build::watch(&site).await?;
            }
        }

        Commands::Clean => {
            let site = Site::new(&base_dir)?;
            site.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { json } => {
            let site = Site::new(&base_dir)?;
            commands::list::run(&site, json)?;
        }

        Commands::New { title } => {
            let site = Site::new(&base_dir)?;
            let path = commands::new::create_post(&site, &title)?;
            println!("Created: {}", path.display());
        }

        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            commands::init::init_site(&target_dir)?;
            println!("Initialized empty site in {}", target_dir.display());
        }

        Commands::Version => {
            println!("inkpress version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
