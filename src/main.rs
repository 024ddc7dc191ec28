mod cli;
mod input;
mod logging;
mod model;
mod pipeline;
mod report;

use clap::Parser;
use thiserror::Error;
use tracing::{error, info};

use crate::cli::{Args, RunConfig, resolve_config};
use crate::input::DataLoadError;
use crate::pipeline::stage1_load::run_stage1;
use crate::pipeline::stage2_aggregate::aggregate;
use crate::pipeline::stage3_render::{RenderError, RenderOptions, render_chart};
use crate::pipeline::stage4_report::{ReportError, Stage4Input, write_reports};

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    DataLoad(#[from] DataLoadError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Report(#[from] ReportError),
}

fn main() {
    let args = Args::parse();
    logging::init(args.verbose, args.quiet);
    if let Err(err) = run(&args) {
        error!("{err}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), AppError> {
    let config = resolve_config(args)?;
    info!("{} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    execute(&config)
}

/// load -> aggregate -> render -> summaries. Nothing is written when the
/// load fails.
fn execute(config: &RunConfig) -> Result<(), AppError> {
    let stage1 = run_stage1(&config.input)?;
    let grouped = aggregate(&stage1.rows);
    debug_assert_eq!(grouped.len(), stage1.n_groups);

    render_chart(
        &grouped,
        &RenderOptions {
            out_path: config.out.clone(),
            format: config.format,
            scale: config.scale,
        },
    )?;

    let reports = write_reports(&Stage4Input {
        source: &stage1.source,
        aggregate: &grouped,
        summary_json: config.summary_json.as_deref(),
    })?;
    if config.print_table {
        print!("{}", reports.table);
    }
    if let Some(path) = &reports.json_path {
        info!("summary written to {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
