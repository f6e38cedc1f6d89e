//! `stowbox` command-line entry point.
//!
//! # Responsibility
//! - Open the store, load configuration and run one request per call.
//! - Print exactly one JSON response to stdout for `exec`.

use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use stowbox_core::{
    default_log_level, init_logging, open_db, OrganizerConfig, OrganizerService,
    SqliteItemRepository, Tagger,
};

#[derive(Parser)]
#[command(name = "stowbox", about = "Voice and text driven storage box organizer", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// SQLite database file
    #[arg(long, global = true, default_value = "stowbox.db")]
    db: PathBuf,

    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Absolute directory for rolling log files; logging is off without it
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute one JSON request, e.g. {"command":"FindItem","data":"resistors"}
    Exec {
        /// Request document; read from stdin when omitted
        request: Option<String>,

        /// Indent the JSON response
        #[arg(long)]
        pretty: bool,
    },

    /// Print the core version
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)?;
    }

    match cli.command {
        Commands::Exec { request, pretty } => {
            let request = match request {
                Some(request) => request,
                None => {
                    let mut buffer = String::new();
                    std::io::stdin().read_to_string(&mut buffer)?;
                    buffer
                }
            };

            let config = match &cli.config {
                Some(path) => OrganizerConfig::load(path)?,
                None => OrganizerConfig::default(),
            };
            let mut conn = open_db(&cli.db)?;
            let repo = SqliteItemRepository::try_new(&mut conn)?;
            let mut service = OrganizerService::new(repo, Tagger::default(), config);

            let response = service.handle_request(&request);
            println!("{}", response.to_json_string(pretty)?);
        }
        Commands::Version => {
            println!("stowbox {}", stowbox_core::core_version());
        }
    }

    Ok(())
}
