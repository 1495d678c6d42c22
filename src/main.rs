//! # Scripture Search CLI (`verse`)
//!
//! Looks up passages by citation or searches every book for a keyword.
//!
//! ## Usage
//!
//! ```bash
//! verse --config ./config/verse.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `verse search "<query>"` | Citation lookup (`Mathiu 10:13-15`) or keyword search |
//! | `verse page <book> <n>` | Show page `n` of a book |
//! | `verse books` | List books, aliases and document ids |
//! | `verse completions <shell>` | Print shell completions |
//!
//! ## Examples
//!
//! ```bash
//! # A passage
//! verse search "Mathiu 10:13-15"
//!
//! # Every verse mentioning a word, as JSON
//! verse search "love" --json
//!
//! # The page a hit came from
//! verse page mathiu 4
//!
//! # Check that every book document is reachable
//! verse books --check
//! ```

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

use scripture_search::{books, config, page, search};

/// Scripture Search CLI: citation lookup and keyword search over a corpus of
/// scripture documents.
///
/// All commands except `completions` read a TOML configuration file. See
/// `config/verse.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "verse",
    about = "Scripture Search: citation lookup and keyword search over scripture documents",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/verse.toml`.
    #[arg(long, global = true, default_value = "./config/verse.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a citation or search for a keyword.
    ///
    /// Input shaped like `Book Chapter:Verse[-Verse]` with a known book name
    /// is a citation; anything else is searched for, case-insensitively, in
    /// every book.
    Search {
        /// Citation or keyword.
        query: String,

        /// Print the outcome as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show one page of a book.
    Page {
        /// Book alias or document id.
        book: String,

        /// Page number, starting at 1.
        page: usize,

        /// Print paragraph markup instead of text.
        #[arg(long)]
        raw: bool,
    },

    /// List the books in corpus order.
    Books {
        /// Load every document and report whether it is available.
        #[arg(long)]
        check: bool,
    },

    /// Print shell completions to stdout.
    Completions {
        shell: Shell,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "verse", &mut std::io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Search { query, json } => {
            if !search::run_search(&cfg, &query, json).await? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Page {
            book,
            page: number,
            raw,
        } => {
            page::run_page(&cfg, &book, number, raw).await?;
        }
        Commands::Books { check } => {
            books::run_books(&cfg, check).await?;
        }
        Commands::Completions { .. } => {}
    }

    Ok(ExitCode::SUCCESS)
}
