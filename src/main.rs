//! listedit CLI application entry point
//!
//! Bulk maintenance for mailing list archives kept in Elasticsearch.
//!
//! # Usage
//!
//! ```bash
//! # Rename a list
//! listedit --source dev@old.example.org --rename dev@new.example.org
//!
//! # Make a list private and describe it
//! listedit --source board@example.org --private --desc "Board discussions"
//!
//! # See how many emails a delete would hit
//! listedit --source spam@example.org --delete --test
//!
//! # Remove an address from one email
//! listedit --mid '<abc@mail.example.org>' --obfuscate jane@example.org
//! ```
//!
//! # Configuration
//!
//! Store settings come from the `[elasticsearch]` section of `ponymail.cfg`
//! in the working directory (or `--config <FILE>`). Log verbosity follows
//! `RUST_LOG`, or `--debug` when it is unset.

use std::process::ExitCode;

use colored::Colorize;
use listedit::{
    ListEditError,
    cli::Cli,
    config::ArchiveConfig,
    mutate::{self, MutationSummary},
    output,
    request::MutationRequest,
    store::ElasticStore,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, ListEditError>;

fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug {
            EnvFilter::new("listedit=debug,info")
        } else {
            EnvFilter::new("listedit=info,warn")
        }
    });
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Validate the request, load configuration, connect, and apply it
///
/// # Errors
///
/// Returns `ListEditError` if the arguments are invalid, the configuration
/// cannot be loaded, the client cannot be built, or the store fails outside
/// a bulk submission.
fn run(cli: &Cli) -> Result<MutationSummary> {
    let request = MutationRequest::from_cli(cli)?;
    output::print_plan(&request);

    let config_path = ArchiveConfig::resolve_path(&cli.config);
    let config = ArchiveConfig::load(&config_path)?;
    let es = &config.elasticsearch;
    info!(config = %config_path.display(), index = %es.dbname, "Configuration loaded");

    let store = ElasticStore::new(es)?;
    println!("Updating docs...");
    Ok(mutate::run(&store, &es.indices(), &request)?)
}

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_tracing(cli.debug);

    match run(&cli) {
        Ok(summary) => {
            summary.print();
            ExitCode::SUCCESS
        }
        Err(e) if e.is_usage() => {
            println!("{e}");
            let _ = Cli::print_help();
            ExitCode::FAILURE
        }
        Err(e) => {
            println!("{} {e}", "Error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
