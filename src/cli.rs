use std::path::{Path, PathBuf};

use clap::Parser;

use crate::input::{DataLoadError, default_report_path};
use crate::pipeline::stage3_render::{ChartFormat, DEFAULT_SCALE, MAX_SCALE, MIN_SCALE};

/// Grouped bar chart of per-group test quality scores from report.csv
#[derive(Parser, Debug)]
#[command(name = "testqc-chart", version, about, long_about = None)]
pub struct Args {
    /// Report CSV (default: report.csv next to the executable)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Chart output path (default: the input path with the format's extension)
    #[arg(short, long, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Image format; inferred from --out when omitted
    #[arg(long, value_enum)]
    pub format: Option<ChartFormat>,

    /// Pixels per layout unit; the surface is 12x8 units
    #[arg(
        long,
        default_value_t = DEFAULT_SCALE,
        value_parser = clap::value_parser!(u32).range((MIN_SCALE as i64)..=(MAX_SCALE as i64))
    )]
    pub scale: u32,

    /// Also write the per-group means as JSON
    #[arg(long, value_name = "FILE")]
    pub summary_json: Option<PathBuf>,

    /// Verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print errors; skips the summary table
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub input: PathBuf,
    pub out: PathBuf,
    pub format: ChartFormat,
    pub scale: u32,
    pub summary_json: Option<PathBuf>,
    pub print_table: bool,
}

pub fn resolve_config(args: &Args) -> Result<RunConfig, DataLoadError> {
    let input = match &args.input {
        Some(path) => path.clone(),
        None => default_report_path()?,
    };
    let format = args
        .format
        .or_else(|| args.out.as_deref().and_then(ChartFormat::from_path))
        .unwrap_or(ChartFormat::Png);
    let out = args
        .out
        .clone()
        .unwrap_or_else(|| default_out_path(&input, format));

    Ok(RunConfig {
        input,
        out,
        format,
        scale: args.scale,
        summary_json: args.summary_json.clone(),
        print_table: !args.quiet,
    })
}

pub fn default_out_path(input: &Path, format: ChartFormat) -> PathBuf {
    input.with_extension(format.extension())
}

#[cfg(test)]
#[path = "../tests/src_inline/cli.rs"]
mod tests;
