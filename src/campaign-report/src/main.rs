//! Campaign Report: summarise and export marketing campaign data.
//!
//! Loads a campaign CSV once, applies the channel selection and writes the
//! summary or the filtered rows as CSV, JSON or PDF.

use anyhow::Context;
use campaign_core::config::AppConfig;
use campaign_core::{Table, Value};
use campaign_reporting::aggregate::marketing_row_metrics;
use campaign_reporting::{
    append_missing_metrics, export, load_table, DocumentLayout, ExportFormat, ExportOptions,
    MetricsAggregator, ValueFilter,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "campaign-report")]
#[command(about = "Marketing campaign summaries and report exports")]
#[command(version)]
struct Cli {
    /// Config file (default: ./campaign-report.toml if present)
    #[arg(long, global = true, env = "CAMPAIGN_REPORT_CONFIG")]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the channels present in the data
    Channels {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Print the per-channel summary
    Summary {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Write the filtered rows or the summary to a file
    Export {
        #[command(flatten)]
        source: SourceArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: FormatArg,

        /// Export the filtered rows or the per-channel summary
        #[arg(long, value_enum, default_value = "raw")]
        view: ViewArg,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Document title (overrides config)
        #[arg(long)]
        title: Option<String>,
    },
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Campaign CSV (overrides config)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Channel to include; repeat for several (default: all)
    #[arg(short, long = "channel")]
    channels: Vec<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Csv,
    Json,
    Pdf,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Json => ExportFormat::Json,
            FormatArg::Pdf => ExportFormat::Pdf,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ViewArg {
    Raw,
    Summary,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = AppConfig::load_from(cli.config.as_deref()).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    match cli.command {
        Commands::Channels { source } => {
            let table = load(&config, source.input.as_deref())?;
            for channel in table.distinct(&config.report.group_by)? {
                println!("{channel}");
            }
        }
        Commands::Summary { source } => {
            let filtered = load_filtered(&config, &source)?;
            let summary = aggregator(&config).aggregate(&filtered)?;
            print!("{}", format_table(&summary));
        }
        Commands::Export {
            source,
            format,
            view,
            output,
            title,
        } => {
            let filtered = load_filtered(&config, &source)?;
            let table = match view {
                ViewArg::Raw => append_missing_metrics(&filtered, &marketing_row_metrics())?,
                ViewArg::Summary => aggregator(&config).aggregate(&filtered)?,
            };
            let options = ExportOptions {
                title: title.unwrap_or_else(|| config.report.title.clone()),
                layout: DocumentLayout::from(&config.document),
            };
            let format = ExportFormat::from(format);
            let bytes = export(&table, format, &options)
                .with_context(|| format!("failed to export {} report", format.extension()))?;
            std::fs::write(&output, &bytes)
                .with_context(|| format!("failed to write {}", output.display()))?;
            info!(
                path = %output.display(),
                format = format.extension(),
                rows = table.row_count(),
                bytes = bytes.len(),
                "Report exported"
            );
        }
    }

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "campaign_report=info,campaign_reporting=info".into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn aggregator(config: &AppConfig) -> MetricsAggregator {
    MetricsAggregator::marketing().with_group_by(config.report.group_by.clone())
}

fn load(config: &AppConfig, input: Option<&Path>) -> anyhow::Result<Table> {
    let path = input.map_or_else(|| PathBuf::from(&config.data.path), Path::to_path_buf);
    load_table(&path).with_context(|| format!("failed to load {}", path.display()))
}

fn load_filtered(config: &AppConfig, source: &SourceArgs) -> anyhow::Result<Table> {
    let table = load(config, source.input.as_deref())?;
    let column = &config.report.group_by;
    let filter = if source.channels.is_empty() {
        ValueFilter::all(&table, column)?
    } else {
        let allowed = source
            .channels
            .iter()
            .map(String::as_str)
            .map(Value::infer)
            .collect();
        ValueFilter::new(column.clone(), allowed)
    };
    Ok(filter.apply(&table)?)
}

/// Left-aligned text grid for terminal output.
fn format_table(table: &Table) -> String {
    let cells: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect();
    let widths: Vec<usize> = table
        .columns()
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_line(&mut out, &widths, table.columns().iter().map(String::as_str));
    for row in &cells {
        push_line(&mut out, &widths, row.iter().map(String::as_str));
    }
    out
}

fn push_line<'a>(out: &mut String, widths: &[usize], values: impl Iterator<Item = &'a str>) {
    let line: Vec<String> = values
        .zip(widths)
        .map(|(v, &w)| format!("{v:<w$}"))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}
