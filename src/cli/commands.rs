use crate::cli::args::{Cli, Commands, MapArgs, RangeArgs, SourceArgs};
use crate::config::{AppConfig, MapSettings, SourceConfig};
use crate::error::ProcessingError;
use crate::fetch::{FileSheetSource, HttpSheetSource, SheetCache, SheetSource};
use crate::models::Centroid;
use crate::processors::{MetricRange, PreparedDataset, StationPipeline};
use crate::readers::SheetReader;
use crate::utils::filename::{generate_default_output_filename, is_stdout};
use crate::utils::progress::ProgressReporter;
use crate::writers::{JsonWriter, MapDocument, ParquetWriter};
use anyhow::{bail, Context};
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{error, info, Level};
use validator::Validate;

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    info!(source = %config.source.url, "Configuration loaded");

    match cli.command {
        Commands::Render {
            source,
            range,
            map,
            output_file,
        } => {
            let session = Session::new(&config, &source)?;
            let settings = apply_map_args(&config.map, &map)?;
            let output_file =
                output_file.unwrap_or_else(|| generate_default_output_filename("json"));

            let progress = ProgressReporter::new_spinner("Fetching sheet...", cli.quiet);
            render_pass(&session, &range, &settings, &output_file, &progress).await?;
        }

        Commands::Export {
            source,
            range,
            output_file,
            compression,
            sample,
        } => {
            let session = Session::new(&config, &source)?;
            let writer = ParquetWriter::new().with_compression(&compression)?;
            let output_file =
                output_file.unwrap_or_else(|| generate_default_output_filename("parquet"));

            let progress = ProgressReporter::new_spinner("Fetching sheet...", cli.quiet);
            let dataset = session.load(&progress).await?;
            let range = resolve_range(&dataset, &range)?;
            let filtered = dataset.filter(range);

            progress.set_message("Writing Parquet file...");
            writer
                .write_records(&filtered, &output_file)
                .with_context(|| format!("Failed to write {}", output_file.display()))?;
            progress.finish_with_message(&format!("Exported {} records", filtered.len()));

            let file_info = writer.get_file_info(&output_file)?;
            println!("Output file: {}", output_file.display());
            println!("Range: [{}, {}]", range.min, range.max);
            println!("\n{}", file_info.summary());

            if sample > 0 {
                println!("\nSample Records (showing up to {}):", sample);
                for (i, record) in writer.read_records(&output_file, sample)?.iter().enumerate() {
                    println!(
                        "  {}. {} [{}] {}",
                        i + 1,
                        record.label,
                        record.display_coordinates(),
                        record.metric
                    );
                }
            }
        }

        Commands::Inspect { source } => {
            let session = Session::new(&config, &source)?;
            let progress = ProgressReporter::new_spinner("Fetching sheet...", cli.quiet);
            let dataset = session.load(&progress).await?;
            progress.finish_with_message("Sheet loaded");

            println!("Source: {}", session.source.id());
            println!("Cache TTL: {}s", session.cache.ttl().as_secs());
            println!("\n{}", dataset.report.summary());

            match dataset.observed_range() {
                Some(range) => println!("Observed metric range: [{}, {}]", range.min, range.max),
                None => println!("Observed metric range: n/a (no valid records)"),
            }
            if let Some(centroid) = Centroid::mean(&dataset.records) {
                println!("Centroid: {:.6},{:.6}", centroid.lat, centroid.lon);
            }
        }

        Commands::Watch {
            source,
            range,
            map,
            output_file,
            interval,
            iterations,
            refresh,
        } => {
            let session = Session::new(&config, &source)?;
            let settings = apply_map_args(&config.map, &map)?;
            let output_file =
                output_file.unwrap_or_else(|| generate_default_output_filename("json"));
            let interval = Duration::from_secs(interval.max(1));

            let mut pass = 0usize;
            loop {
                pass += 1;
                if refresh {
                    session.cache.clear();
                }

                let progress =
                    ProgressReporter::new_spinner(&format!("Pass {}: fetching sheet...", pass), cli.quiet);
                if let Err(e) = render_pass(&session, &range, &settings, &output_file, &progress).await
                {
                    // keep the last good output and try again next pass
                    error!(pass, error = %e, "Render pass failed");
                    progress.finish_with_message(&format!("Pass {} failed: {}", pass, e));
                }

                if iterations > 0 && pass >= iterations {
                    break;
                }

                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        info!("Interrupted, stopping watch");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {}
                }
            }
        }
    }

    Ok(())
}

/// Everything one command needs to turn a source into a dataset.
struct Session {
    source: Box<dyn SheetSource>,
    reader: SheetReader,
    pipeline: StationPipeline,
    cache: SheetCache,
}

impl Session {
    fn new(config: &AppConfig, args: &SourceArgs) -> anyhow::Result<Self> {
        if !args.delimiter.is_ascii() {
            bail!("Delimiter must be a single ASCII character, got '{}'", args.delimiter);
        }

        let source: Box<dyn SheetSource> = match (&args.input, &args.url) {
            (Some(path), _) => Box::new(FileSheetSource::new(path.clone())),
            (None, url) => {
                let source_config = SourceConfig {
                    url: url.clone().unwrap_or_else(|| config.source.url.clone()),
                    ..config.source.clone()
                };
                Box::new(HttpSheetSource::new(&source_config)?)
            }
        };

        Ok(Self {
            source,
            reader: SheetReader::with_delimiter(args.delimiter as u8),
            pipeline: StationPipeline::new(config.columns.clone()),
            cache: SheetCache::new(config.source.cache_ttl()),
        })
    }

    async fn load(&self, progress: &ProgressReporter) -> crate::error::Result<PreparedDataset> {
        let rows = self.cache.get_or_fetch(self.source.as_ref(), &self.reader).await?;

        progress.set_message("Normalizing station records...");
        self.pipeline.prepare(&rows)
    }
}

async fn render_pass(
    session: &Session,
    range_args: &RangeArgs,
    settings: &MapSettings,
    output_file: &Path,
    progress: &ProgressReporter,
) -> anyhow::Result<()> {
    let dataset = session.load(progress).await?;
    let range = resolve_range(&dataset, range_args)?;

    progress.set_message("Building heatmap views...");
    let (range, views) = dataset.render(Some(range))?;

    let document = MapDocument::new(
        session.source.id(),
        range,
        dataset.records.len(),
        views,
        settings.clone(),
    )
    .with_fetched_at(session.cache.fetched_at(session.source.id()));

    JsonWriter::new()
        .write_document(&document, output_file)
        .with_context(|| format!("Failed to write {}", output_file.display()))?;

    progress.finish_with_message(&format!(
        "{} of {} stations in range [{}, {}]",
        document.filtered_records, document.total_records, range.min, range.max
    ));

    if !is_stdout(output_file) {
        println!("Output file: {}", output_file.display());
        println!(
            "Center: {:.6},{:.6}  Heat points: {}  Markers: {}",
            document.centroid.lat,
            document.centroid.lon,
            document.heat_points.len(),
            document.markers.len()
        );
    }

    Ok(())
}

/// Caller bounds layered over the observed range.
fn resolve_range(dataset: &PreparedDataset, args: &RangeArgs) -> crate::error::Result<MetricRange> {
    let observed = dataset
        .observed_range()
        .ok_or(ProcessingError::EmptyDataset)?;
    observed.with_overrides(args.min, args.max)
}

fn apply_map_args(base: &MapSettings, args: &MapArgs) -> anyhow::Result<MapSettings> {
    let settings = MapSettings {
        heat_radius: args.heat_radius.unwrap_or(base.heat_radius),
        heat_blur: args.heat_blur.unwrap_or(base.heat_blur),
        initial_zoom: args.zoom.unwrap_or(base.initial_zoom),
        show_markers: base.show_markers && !args.no_markers,
        ..base.clone()
    };
    settings.validate().context("Invalid map settings")?;
    Ok(settings)
}

fn init_logging(verbose: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    let result = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}
