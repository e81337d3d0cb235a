//! CLI entry point for solar telemetry analytics.

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use solar_analytics::{
    AnalysisConfig, AnalysisKind, AnalysisOutput, Normalization, Site, SolarAnalyzer, load_csv,
    load_site,
};
use polars::prelude::*;
use std::path::PathBuf;
use tracing::{error, info};

/// CLI-compatible site enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliSite {
    /// Benin (Malanville)
    Benin,
    /// Sierra Leone (Bumbuna)
    SierraLeone,
    /// Togo (Dapaong)
    Togo,
}

impl From<CliSite> for Site {
    fn from(cli: CliSite) -> Self {
        match cli {
            CliSite::Benin => Site::BeninMalanville,
            CliSite::SierraLeone => Site::SierraLeoneBumbuna,
            CliSite::Togo => Site::TogoDapaong,
        }
    }
}

/// CLI-compatible normalization enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliNormalization {
    /// Raw observation counts
    Counts,
    /// Fractions summing to 1.0
    Fraction,
    /// Percentages summing to 100
    Percent,
}

impl From<CliNormalization> for Normalization {
    fn from(cli: CliNormalization) -> Self {
        match cli {
            CliNormalization::Counts => Normalization::Counts,
            CliNormalization::Fraction => Normalization::Fraction,
            CliNormalization::Percent => Normalization::Percent,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summary statistics and medians for every numeric column
    Summary,
    /// GHI, DNI, DHI and Tamb over time
    Timeseries,
    /// Module readings (ModA, ModB) over time
    Cleaning,
    /// Pearson correlation of irradiance, module temperature and wind
    Correlation,
    /// Wind direction/speed distribution by sector
    WindRose {
        /// Number of equal angular sectors
        #[arg(long, default_value = "16")]
        sectors: usize,

        /// Number of wind speed sub-bins per sector
        #[arg(long, default_value = "6")]
        speed_bins: usize,

        /// Disable wind speed sub-binning
        #[arg(long)]
        no_speed_bins: bool,

        /// Unit for sector frequencies
        #[arg(long, value_enum, default_value = "fraction")]
        normalization: CliNormalization,

        /// Fraction of the sector width a bar occupies
        #[arg(long, default_value = "0.8")]
        opening: f64,
    },
    /// Rows whose |z| exceeds the threshold on GHI, DNI, DHI or Tamb
    Zscore {
        #[arg(long, default_value = "3.0")]
        threshold: f64,
    },
    /// Equal-width histograms
    Histogram {
        #[arg(long, default_value = "10")]
        bins: usize,

        /// Columns to bin (defaults to GHI, DNI, DHI, WS)
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,
    },
    /// GHI vs Tamb, sized by RH and colored by WSgust
    Bubble {
        /// Scale applied to RH for the bubble size
        #[arg(long, default_value = "1.0")]
        scale: f64,
    },
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Solar irradiance and weather telemetry analytics",
    long_about = "Descriptive statistics, correlation, z-score outliers, wind roses, \
                  histograms and bubble projections for solar site telemetry.\n\n\
                  EXAMPLES:\n  \
                  solar-analytics --site benin summary\n  \
                  solar-analytics --input data/togo-dapaong_qc.csv zscore --threshold 2.5\n  \
                  solar-analytics --site sierra-leone --json wind-rose --sectors 8"
)]
struct Args {
    /// Path to a site CSV file
    #[arg(short, long, conflicts_with = "site")]
    input: Option<PathBuf>,

    /// Known site to load from the data directory
    #[arg(short, long, value_enum)]
    site: Option<CliSite>,

    /// Directory containing the site CSV files
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Print the result as JSON (disables logging)
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is disabled so stdout carries only
/// the JSON result.
fn init_logging(level: &str, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.json);

    let df = match (&args.input, args.site) {
        (Some(path), _) => load_csv(path)?,
        (None, Some(site)) => load_site(site.into(), &args.data_dir)?,
        (None, None) => return Err(anyhow!("Provide either --input <csv> or --site <site>")),
    };
    info!("Dataset loaded: {:?}", df.shape());

    let output = match run_command(&args.command, &df) {
        Ok(output) => output,
        Err(e) => {
            error!("Analysis failed: {}", e);
            return Err(e);
        }
    };

    if args.json {
        println!("{}", output.to_json()?);
    } else {
        print_human_readable(&output);
    }
    Ok(())
}

fn run_command(command: &Command, df: &DataFrame) -> Result<AnalysisOutput> {
    let (config, kind) = command_config(command)?;
    Ok(SolarAnalyzer::new(config)?.run(df, kind)?)
}

/// Translate a subcommand and its flags into a validated configuration.
fn command_config(command: &Command) -> Result<(AnalysisConfig, AnalysisKind)> {
    let builder = AnalysisConfig::builder();
    let (builder, kind) = match command {
        Command::Summary => (builder, AnalysisKind::Summary),
        Command::Timeseries => (builder, AnalysisKind::TimeSeries),
        Command::Cleaning => (builder, AnalysisKind::CleaningImpact),
        Command::Correlation => (builder, AnalysisKind::Correlation),
        Command::WindRose {
            sectors,
            speed_bins,
            no_speed_bins,
            normalization,
            opening,
        } => (
            builder
                .wind_sectors(*sectors)
                .wind_speed_bins((!no_speed_bins).then_some(*speed_bins))
                .wind_normalization((*normalization).into())
                .wind_opening(*opening),
            AnalysisKind::WindRose,
        ),
        Command::Zscore { threshold } => {
            (builder.zscore_threshold(*threshold), AnalysisKind::ZScore)
        }
        Command::Histogram { bins, columns } => {
            let builder = builder.histogram_bins(*bins);
            let builder = if columns.is_empty() {
                builder
            } else {
                builder.histogram_columns(columns.iter().cloned())
            };
            (builder, AnalysisKind::Histograms)
        }
        Command::Bubble { scale } => (builder.bubble_scale(*scale), AnalysisKind::Bubble),
    };
    Ok((builder.build()?, kind))
}

/// Print a result as plain-text tables.
///
/// Uses `println!` deliberately: this is the command's output, not logging.
fn print_human_readable(output: &AnalysisOutput) {
    let title = output.kind().display_name();
    println!("\n{}", "=".repeat(80));
    println!("{}", title.to_uppercase());
    println!("{}\n", "=".repeat(80));

    match output {
        AnalysisOutput::Summary(stats) => {
            println!(
                "{:<10} {:>8} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
                "Column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
            );
            println!("{}", "-".repeat(96));
            for c in &stats.columns {
                println!(
                    "{:<10} {:>8} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>10.3}",
                    truncate_str(&c.column, 10),
                    c.count,
                    c.mean,
                    c.std,
                    c.min,
                    c.q25,
                    c.q50,
                    c.q75,
                    c.max
                );
            }
            println!("\nMedian Values:");
            for (column, median) in &stats.medians {
                println!("  {:<10} {:.3}", column, median);
            }
        }
        AnalysisOutput::TimeSeries(ts) | AnalysisOutput::CleaningImpact(ts) => {
            print!("{:<20}", "Timestamp");
            for column in &ts.columns {
                print!(" {:>10}", column);
            }
            println!();
            for point in ts.points.iter().take(20) {
                print!("{:<20}", point.timestamp.format("%Y-%m-%d %H:%M"));
                for value in &point.values {
                    match value {
                        Some(v) => print!(" {:>10.2}", v),
                        None => print!(" {:>10}", "-"),
                    }
                }
                println!();
            }
            if ts.points.len() > 20 {
                println!("  ... and {} more points", ts.points.len() - 20);
            }
            println!("\nRows without timestamp: {}", ts.missing_timestamps);
        }
        AnalysisOutput::Correlation(matrix) => {
            print!("{:<8}", "");
            for column in &matrix.columns {
                print!(" {:>7}", truncate_str(column, 7));
            }
            println!();
            for (column, row) in matrix.columns.iter().zip(&matrix.values) {
                print!("{:<8}", truncate_str(column, 8));
                for value in row {
                    print!(" {:>7.2}", value);
                }
                println!();
            }
        }
        AnalysisOutput::WindRose(rose) => {
            println!(
                "{:>7} {:>7} {:>8} {:>10}",
                "start", "end", "count", "frequency"
            );
            for sector in &rose.sectors {
                println!(
                    "{:>7.1} {:>7.1} {:>8} {:>10.4}",
                    sector.start, sector.end, sector.count, sector.frequency
                );
            }
            println!("\nObservations: {}", rose.observations);
            println!(
                "Excluded: {} (missing direction {}, missing speed {}, negative speed {})",
                rose.excluded.total(),
                rose.excluded.missing_direction,
                rose.excluded.missing_speed,
                rose.excluded.negative_speed
            );
        }
        AnalysisOutput::ZScore(report) => {
            println!(
                "Outlier rows (|z| > {} on any of {}): {}",
                report.threshold,
                report.columns.join(", "),
                report.outlier_count()
            );
            println!("{}", report.outliers);
        }
        AnalysisOutput::Histograms(set) => {
            for h in &set.histograms {
                println!("{} ({} values, {} missing)", h.column, h.total, h.excluded);
                for (i, count) in h.counts.iter().enumerate() {
                    println!(
                        "  [{:>10.2}, {:>10.2}{} {:>8}",
                        h.edges[i],
                        h.edges[i + 1],
                        if i + 1 == h.counts.len() { "]" } else { ")" },
                        count
                    );
                }
                println!();
            }
        }
        AnalysisOutput::Bubble(chart) => {
            println!(
                "{} vs {} (size = {} x {}, color = {})",
                chart.x_column, chart.y_column, chart.size_column, chart.scale, chart.color_column
            );
            println!("Points: {}, excluded rows: {}", chart.points.len(), chart.excluded);
        }
    }

    for warning in output_warnings(output) {
        println!("  ! {:?}", warning);
    }
    println!("{}", "=".repeat(80));
}

fn output_warnings(output: &AnalysisOutput) -> &[solar_analytics::AnalysisWarning] {
    match output {
        AnalysisOutput::Summary(r) => &r.warnings,
        AnalysisOutput::TimeSeries(r) | AnalysisOutput::CleaningImpact(r) => &r.warnings,
        AnalysisOutput::Correlation(r) => &r.warnings,
        AnalysisOutput::WindRose(r) => &r.warnings,
        AnalysisOutput::ZScore(r) => &r.warnings,
        AnalysisOutput::Histograms(r) => &r.warnings,
        AnalysisOutput::Bubble(r) => &r.warnings,
    }
}

/// Truncate a string to max length (in characters) with ellipsis
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
