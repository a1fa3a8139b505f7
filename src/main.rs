//! # Inquiry Matcher CLI (`inq`)
//!
//! The `inq` binary is the primary interface for Inquiry Matcher. It submits
//! inquiries against named datasets, manages the dataset lifecycle, and
//! exposes the backend's monitoring endpoints.
//!
//! ## Usage
//!
//! ```bash
//! inq --config ./config/inq.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `inq compare "<inquiry>" --dataset <name>` | Submit an inquiry and print the top-ranked matches |
//! | `inq datasets list` | List datasets known to the backend |
//! | `inq datasets create <name> --csv <file>` | Create (or merge into) a dataset from a tabular upload |
//! | `inq datasets create <name> --pdf <file>` | Create (or merge into) a dataset from a document upload |
//! | `inq datasets delete <name>` | Delete a dataset (asks for confirmation) |
//! | `inq generate "<prompt>" --dataset <name>` | Generate test cases from a dataset's entries |
//! | `inq health` | Backend health check |
//! | `inq metrics` | Backend metrics |
//! | `inq admin clear-logs` | Clear backend log files (admin key required) |
//!
//! ## Exit codes
//!
//! `0` on success, `2` when a submission was blocked locally by validation
//! (nothing was sent), `1` for every other failure.
//!
//! ## Examples
//!
//! ```bash
//! # Compare against two existing datasets
//! inq compare "refund policy" --dataset support_2023 --dataset support_2024
//!
//! # Upload a file as a one-shot dataset and query it in the same action
//! inq compare "refund policy" --csv batch.csv --as support_adhoc
//!
//! # Show the drill-down view for the second-ranked match
//! inq compare "refund policy" --dataset support_2023 --detail 2
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use inquiry_matcher::progress::ProgressMode;
use inquiry_matcher::{config, generate, monitor, registry, session};

/// Inquiry Matcher CLI — submit inquiries against named datasets and get the
/// top-ranked prior entries back.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file with the backend location, polling budget, and issuer id.
#[derive(Parser)]
#[command(
    name = "inq",
    about = "Inquiry Matcher — a client for similarity-matching services",
    version,
    long_about = "Inquiry Matcher submits natural-language inquiries against named, \
    server-held datasets and renders the top-ranked prior entries, creating datasets \
    on demand from tabular or document uploads."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/inq.toml`. Backend location, polling budget,
    /// and issuer id are read from this file.
    #[arg(long, global = true, default_value = "./config/inq.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Submit an inquiry and print the top-ranked matches.
    ///
    /// The backend may answer right away or hand back a job; in the second
    /// case the command polls until the result is ready, within the
    /// configured budget. At most 5 matches are shown, in backend order.
    Compare {
        /// The inquiry text.
        query: String,

        /// Dataset to compare against; repeat for several.
        #[arg(long = "dataset")]
        datasets: Vec<String>,

        /// Build a one-shot dataset from this tabular file first.
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Build a one-shot dataset from this document file first.
        #[arg(long)]
        pdf: Option<PathBuf>,

        /// Name for the one-shot dataset (generated when omitted).
        #[arg(long = "as")]
        as_name: Option<String>,

        /// Also print the drill-down view for the match at this rank (1-5).
        #[arg(long)]
        detail: Option<usize>,

        /// Progress reporting on stderr: off, human, or json.
        /// Defaults to human when stderr is a terminal.
        #[arg(long)]
        progress: Option<String>,
    },

    /// Manage datasets.
    Datasets {
        #[command(subcommand)]
        action: DatasetAction,
    },

    /// Generate test cases from a dataset's entries.
    Generate {
        /// Description of the tests to generate.
        prompt: String,

        /// Dataset whose entries seed the generation.
        #[arg(long)]
        dataset: String,
    },

    /// Backend health check.
    Health,

    /// Backend system and application metrics.
    Metrics,

    /// Administrative operations.
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

/// Dataset management subcommands.
#[derive(Subcommand)]
enum DatasetAction {
    /// List datasets known to the backend.
    List,

    /// Create a dataset from an upload, or merge into an existing one.
    ///
    /// If the name already exists the backend appends the new items to it;
    /// this is reported as a note, not an error.
    Create {
        /// Dataset name (case-sensitive).
        name: String,

        /// Tabular source file.
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Document source file.
        #[arg(long)]
        pdf: Option<PathBuf>,
    },

    /// Delete a dataset. Irreversible; asks for confirmation unless --yes.
    Delete {
        /// Dataset name (case-sensitive).
        name: String,

        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

/// Administrative subcommands.
#[derive(Subcommand)]
enum AdminAction {
    /// Clear backend log files.
    ClearLogs {
        /// Admin key; falls back to backend.admin_key from the config.
        #[arg(long)]
        admin_key: Option<String>,
    },
}

// All network calls are cooperative tasks on a single thread; suspension
// happens only at network boundaries.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Monitoring commands work without a config file.
    let cfg = match &cli.command {
        Commands::Health | Commands::Metrics => {
            config::load_config(&cli.config).unwrap_or_else(|_| config::Config::minimal())
        }
        _ => config::load_config(&cli.config)?,
    };

    match cli.command {
        Commands::Compare {
            query,
            datasets,
            csv,
            pdf,
            as_name,
            detail,
            progress,
        } => {
            let mode = match progress.as_deref() {
                Some(value) => match ProgressMode::parse(value) {
                    Some(mode) => mode,
                    None => anyhow::bail!("unknown progress mode: {}. Use off, human, or json.", value),
                },
                None => ProgressMode::default_for_tty(),
            };
            session::run_compare(
                &cfg,
                &query,
                datasets,
                csv.as_deref(),
                pdf.as_deref(),
                as_name,
                detail,
                mode,
            )
            .await?;
        }
        Commands::Datasets { action } => match action {
            DatasetAction::List => {
                registry::run_list(&cfg).await?;
            }
            DatasetAction::Create { name, csv, pdf } => {
                registry::run_create(&cfg, &name, csv.as_deref(), pdf.as_deref()).await?;
            }
            DatasetAction::Delete { name, yes } => {
                registry::run_delete(&cfg, &name, yes).await?;
            }
        },
        Commands::Generate { prompt, dataset } => {
            generate::run_generate(&cfg, &prompt, &dataset).await?;
        }
        Commands::Health => {
            monitor::run_health(&cfg).await?;
        }
        Commands::Metrics => {
            monitor::run_metrics(&cfg).await?;
        }
        Commands::Admin { action } => match action {
            AdminAction::ClearLogs { admin_key } => {
                monitor::run_clear_logs(&cfg, admin_key).await?;
            }
        },
    }

    Ok(())
}
