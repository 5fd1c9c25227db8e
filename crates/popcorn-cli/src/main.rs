use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::eyre;
use commands::{browse, config, details, search, watched};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "popcorn")]
#[command(about = "Popcorn - Search movies and keep a rated list of what you've watched")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Write logs to this file (rotated daily) instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search movies by title
    #[command(long_about = "Search OMDb for movies matching the query. Queries shorter than the configured minimum length (3 characters by default) are not sent.")]
    Search {
        /// Title to search for
        query: String,
    },
    /// Show the full record for one movie
    Details {
        /// IMDb id, e.g. tt1375666
        id: String,
    },
    /// Manage the watched list
    #[command(long_about = "Show, summarize or edit the watched list stored in the data directory. Running without a subcommand lists the entries.")]
    Watched {
        #[command(subcommand)]
        cmd: Option<WatchedCommands>,
    },
    /// Interactive search, rate and add session
    #[command(long_about = "Start an interactive session. Type a title to search, pick a result to see its details, rate it and add it to the watched list. Type :help for the list of commands.")]
    Browse,
    /// Show or change configuration
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
pub(crate) enum WatchedCommands {
    /// List watched movies
    List,
    /// Show average ratings and runtime
    Summary,
    /// Fetch a movie and add it with your rating
    Add {
        /// IMDb id
        id: String,

        /// Your rating, 1-10
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=10))]
        rating: u8,
    },
    /// Remove a movie from the list
    Remove {
        /// IMDb id
        id: String,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigCommands {
    /// Show current configuration (masks the API key)
    Show {
        /// Show the API key unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Set the OMDb API key
    #[command(long_about = "Store the OMDb API key in the configuration file. Get a free key at https://www.omdbapi.com/apikey.aspx. The OMDB_API_KEY environment variable overrides the stored key.")]
    Omdb {
        /// API key (if not provided, will prompt)
        #[arg(long)]
        api_key: Option<String>,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    logging::init_logging_with_file(cli.verbose, cli.quiet, cli.log_file)
        .map_err(|e| eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Search { query } => search::run_search(&query, &output).await,
        Commands::Details { id } => details::run_details(&id, &output).await,
        Commands::Watched { cmd } => {
            let cmd = cmd.unwrap_or(WatchedCommands::List);
            watched::run_watched(cmd, &output).await
        }
        Commands::Browse => browse::run_browse(&output).await,
        Commands::Config { cmd } => {
            let cmd = cmd.unwrap_or(ConfigCommands::Show { full: false });
            config::run_config(cmd, &output)
        }
    }
}
