pub mod config;
pub mod init;
pub mod run;

use clap::{Args, Parser, Subcommand};

use crate::settings::{shellexpand_path, Settings};

#[derive(Parser)]
#[command(
    name = "sales-analytics",
    about = "Clean, analyze and enrich a pipe-delimited sales file, then write a text report."
)]
pub struct Cli {
    /// Settings file (default: ~/.config/sales-analytics/settings.json)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Log pipeline details to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline: read, validate, analyze, enrich, save, report.
    Run(RunArgs),
    /// Write the settings file and create the data/output directories.
    Init,
    /// Print the effective settings as JSON.
    Config,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Sales file to read
    #[arg(long)]
    pub input: Option<String>,
    /// Where to write the enriched transactions
    #[arg(long = "enriched-output")]
    pub enriched_output: Option<String>,
    /// Where to write the text report
    #[arg(long = "report-output")]
    pub report_output: Option<String>,
    /// Product catalog endpoint
    #[arg(long = "catalog-url")]
    pub catalog_url: Option<String>,
    /// Number of catalog products to request
    #[arg(long = "catalog-limit")]
    pub catalog_limit: Option<usize>,
    /// Keep only transactions from this region
    #[arg(long)]
    pub region: Option<String>,
    /// Minimum transaction amount (inclusive)
    #[arg(long = "min-amount")]
    pub min_amount: Option<f64>,
    /// Maximum transaction amount (inclusive)
    #[arg(long = "max-amount")]
    pub max_amount: Option<f64>,
    /// Never prompt for filters
    #[arg(long = "no-interactive")]
    pub no_interactive: bool,
    /// Skip the catalog fetch; every transaction is left unmatched
    #[arg(long)]
    pub offline: bool,
}

impl RunArgs {
    /// Overlay command-line values on the loaded settings.
    pub fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(p) = &self.input {
            settings.input_path = p.clone();
        }
        if let Some(p) = &self.enriched_output {
            settings.enriched_path = p.clone();
        }
        if let Some(p) = &self.report_output {
            settings.report_path = p.clone();
        }
        if let Some(url) = &self.catalog_url {
            settings.catalog_url = url.clone();
        }
        if let Some(limit) = self.catalog_limit {
            settings.catalog_limit = limit;
        }
        settings.input_path = shellexpand_path(&settings.input_path);
        settings.enriched_path = shellexpand_path(&settings.enriched_path);
        settings.report_path = shellexpand_path(&settings.report_path);
        settings
    }

    pub fn has_filter_flags(&self) -> bool {
        self.region.is_some() || self.min_amount.is_some() || self.max_amount.is_some()
    }
}
