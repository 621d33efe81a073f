use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "station-heatmap")]
#[command(about = "Builds weighted heatmap and marker views from a published station sheet")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Hide progress output")]
    pub quiet: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true, help = "Configuration file (TOML, YAML or JSON)")]
    pub config: Option<PathBuf>,
}

/// Where the sheet comes from
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    #[arg(long, conflicts_with = "input", help = "Published CSV URL [default: from config]")]
    pub url: Option<String>,

    #[arg(short, long, help = "Read the sheet from a local CSV file instead")]
    pub input: Option<PathBuf>,

    #[arg(long, default_value = ",", help = "Field delimiter")]
    pub delimiter: char,
}

/// Inclusive metric bounds, defaulting to the observed min/max
#[derive(Args, Debug, Clone, Copy)]
pub struct RangeArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub min: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    pub max: Option<f64>,
}

/// Overrides for the renderer settings
#[derive(Args, Debug, Clone, Copy)]
pub struct MapArgs {
    #[arg(long, help = "Hide clickable station markers")]
    pub no_markers: bool,

    #[arg(long, help = "Heatmap radius (10-80)")]
    pub heat_radius: Option<u32>,

    #[arg(long, help = "Heatmap blur (10-80)")]
    pub heat_blur: Option<u32>,

    #[arg(long, help = "Initial zoom (10-18)")]
    pub zoom: Option<u32>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the heatmap/marker document for a renderer
    Render {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        range: RangeArgs,

        #[command(flatten)]
        map: MapArgs,

        #[arg(
            short,
            long,
            help = "Output JSON path, '-' for stdout [default: station-heatmap-{YYMMDD}.json]"
        )]
        output_file: Option<PathBuf>,
    },

    /// Export filtered station records to Parquet
    Export {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        range: RangeArgs,

        #[arg(
            short,
            long,
            help = "Output Parquet file path [default: station-heatmap-{YYMMDD}.parquet]"
        )]
        output_file: Option<PathBuf>,

        #[arg(short, long, default_value = "snappy")]
        compression: String,

        #[arg(long, default_value = "0", help = "Print this many records read back from the file")]
        sample: usize,
    },

    /// Show columns, ingest statistics and the observed metric range
    Inspect {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Re-render periodically, reusing the fetch cache between passes
    Watch {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        range: RangeArgs,

        #[command(flatten)]
        map: MapArgs,

        #[arg(short, long, help = "Output JSON path, '-' for stdout")]
        output_file: Option<PathBuf>,

        #[arg(long, default_value = "30", help = "Seconds between passes")]
        interval: u64,

        #[arg(long, default_value = "0", help = "Number of passes (0 = until interrupted)")]
        iterations: usize,

        #[arg(long, help = "Clear the cache before every pass")]
        refresh: bool,
    },
}
