use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "bmk")]
#[command(about = "Portfolio benchmark metrics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Equal capital per ticker, whole shares, held for the whole window
    BuyAndHold {
        /// Layered config paths in merge order
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        /// Write benchmark_report.json into this directory
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Whole-share allocation from externally optimised weights
    TargetWeights {
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        /// JSON object file: ticker -> weight
        #[arg(long)]
        weights: PathBuf,

        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Single index series, one unit held
    Index {
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        /// Close-price CSV of the index (date, close)
        #[arg(long)]
        prices: PathBuf,

        /// Label used for the series in the report
        #[arg(long, default_value = "INDEX")]
        ticker: String,

        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Convert Treasury 1-month CMT yields into daily risk-free rates
    RfRates {
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        output: PathBuf,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> overrides...)
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

fn main() -> Result<()> {
    // Silent if the file does not exist.
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::BuyAndHold {
            config_paths,
            out_dir,
        } => commands::benchmark::buy_and_hold(&config_paths, out_dir.as_deref())?,

        Commands::TargetWeights {
            config_paths,
            weights,
            out_dir,
        } => commands::benchmark::target_weights(&config_paths, &weights, out_dir.as_deref())?,

        Commands::Index {
            config_paths,
            prices,
            ticker,
            out_dir,
        } => commands::benchmark::index(&config_paths, &prices, &ticker, out_dir.as_deref())?,

        Commands::RfRates { input, output } => commands::rates::rf_rates(&input, &output)?,

        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = bmk_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }
    }

    Ok(())
}
