use crate::core::discover::DEFAULT_PATTERN;
use crate::core::io::DEFAULT_MAX_FILE_SIZE;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "kira-mirtop",
    version,
    about = "Aggregate miRTop isomiR summary statistics into a report"
)]
pub struct Cli {
    /// Log debug detail (overridden by RUST_LOG).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    Run(RunArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Report files or directories to search.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    #[arg(long)]
    pub out: PathBuf,

    /// File name pattern used when searching directories.
    #[arg(long, default_value = DEFAULT_PATTERN)]
    pub pattern: String,

    /// Drop samples whose name matches this pattern (repeatable).
    #[arg(long = "ignore-samples", value_name = "GLOB")]
    pub ignore_samples: Vec<String>,

    /// Stop at the first report that fails to parse.
    #[arg(long, default_value_t = false)]
    pub strict: bool,

    #[arg(long, default_value_t = DEFAULT_MAX_FILE_SIZE)]
    pub max_file_size: u64,

    #[arg(long, default_value_t = false)]
    pub no_zip: bool,

    #[arg(long, default_value_t = false)]
    pub export_latex: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_flags() {
        let cli = Cli::try_parse_from([
            "kira-mirtop",
            "run",
            "a_mirtop_stats.log",
            "stats_dir",
            "--out",
            "out",
            "--ignore-samples",
            "ctrl_*",
            "--ignore-samples",
            "blank",
            "--strict",
        ])
        .unwrap();
        let Commands::Run(args) = cli.command;
        assert_eq!(args.inputs.len(), 2);
        assert_eq!(args.ignore_samples, vec!["ctrl_*", "blank"]);
        assert!(args.strict);
        assert!(!args.no_zip);
        assert_eq!(args.pattern, DEFAULT_PATTERN);
        assert_eq!(args.max_file_size, DEFAULT_MAX_FILE_SIZE);
    }

    #[test]
    fn inputs_are_required() {
        assert!(Cli::try_parse_from(["kira-mirtop", "run", "--out", "o"]).is_err());
    }
}
