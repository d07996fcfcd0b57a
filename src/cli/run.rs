use crate::cli::args::{Cli, Commands, RunArgs};
use crate::core::engine::{self, ErrorPolicy, RunConfig, fmt_dur, log_stage, stats_enabled};
use crate::report::{self, REPORT_DIR, ReportContext};
use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub fn entry() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Commands::Run(args) => run(args).map(|_| ()),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Runs aggregation and writes every output; returns the report folder.
pub fn run(args: RunArgs) -> Result<PathBuf> {
    let stats = stats_enabled();
    let t0 = Instant::now();

    let config = RunConfig {
        inputs: args.inputs,
        pattern: args.pattern,
        ignore_samples: args.ignore_samples,
        error_policy: if args.strict {
            ErrorPolicy::Abort
        } else {
            ErrorPolicy::Skip
        },
        max_file_size: args.max_file_size,
    };

    let t_engine = Instant::now();
    let output = engine::run(&config)?;
    log_stage(stats, "engine", t_engine);

    let table = output.outcome.into_table()?;

    let report_dir = args.out.join(REPORT_DIR);
    fs::create_dir_all(&report_dir)
        .with_context(|| format!("failed to create output dir {}", report_dir.display()))?;

    let ctx = ReportContext {
        table: &table,
        sources: &output.sources,
        files_scanned: output.files.len(),
        files_skipped: output.skipped.len(),
    };

    let data_path = report_dir.join(report::DATA_FILE);
    let sources_path = report_dir.join(report::SOURCES_FILE);
    let general_path = report_dir.join(report::GENERAL_STATS_FILE);
    let html_path = report_dir.join(report::HTML_FILE);

    let t_data = Instant::now();
    report::data_file::write(&data_path, &table)
        .with_context(|| format!("failed to write {}", data_path.display()))?;
    report::data_file::write_sources(&sources_path, &output.sources)
        .with_context(|| format!("failed to write {}", sources_path.display()))?;
    log_stage(stats, "data_file", t_data);

    let t_general = Instant::now();
    report::general_stats::write(&general_path, &table)
        .with_context(|| format!("failed to write {}", general_path.display()))?;
    log_stage(stats, "general_stats", t_general);

    let t_html = Instant::now();
    report::html::write(&html_path, &ctx)
        .with_context(|| format!("failed to write {}", html_path.display()))?;
    log_stage(stats, "html", t_html);

    let mut written = vec![data_path, sources_path, general_path, html_path];

    if args.export_latex {
        let t_latex = Instant::now();
        let latex_files = report::latex::write(&report_dir, &ctx)
            .with_context(|| "failed to write LaTeX export")?;
        written.extend(latex_files);
        log_stage(stats, "latex", t_latex);
    }

    if !args.no_zip {
        let t_zip = Instant::now();
        report::zip::write_zip(&args.out, &written)
            .with_context(|| "failed to create zip output")?;
        log_stage(stats, "zip", t_zip);
    }

    info!(
        samples = table.len(),
        out = %report_dir.display(),
        "report written"
    );
    if stats {
        info!(target: "kira_stats", "KIRA_STATS total={}", fmt_dur(t0.elapsed()));
    }

    Ok(report_dir)
}
