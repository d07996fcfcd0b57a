use crate::core::discover;
use crate::core::error::{FileError, FileErrorKind, ReportError};
use crate::core::io;
use crate::core::model::{DataSource, ReportOutcome, ReportTable};
use crate::core::parse::ReportParser;
use anyhow::{Context, Result};
use glob::Pattern;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// What to do when one report cannot be read or parsed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ErrorPolicy {
    /// Log the failure and leave the file out.
    #[default]
    Skip,
    /// Stop at the first failing file.
    Abort,
}

pub struct RunConfig {
    pub inputs: Vec<PathBuf>,
    pub pattern: String,
    pub ignore_samples: Vec<String>,
    pub error_policy: ErrorPolicy,
    pub max_file_size: u64,
}

impl RunConfig {
    pub fn new(inputs: Vec<PathBuf>) -> Self {
        Self {
            inputs,
            pattern: discover::DEFAULT_PATTERN.to_string(),
            ignore_samples: Vec::new(),
            error_policy: ErrorPolicy::Skip,
            max_file_size: io::DEFAULT_MAX_FILE_SIZE,
        }
    }
}

pub struct RunOutput {
    pub outcome: ReportOutcome,
    pub sources: DataSources,
    pub files: Vec<PathBuf>,
    pub skipped: Vec<FileError>,
}

/// Receives the (file, sample) association for every emitted record.
pub trait DataSourceRegistry {
    fn add_data_source(&mut self, path: &Path, sample_name: &str);
}

/// Data sources keyed by sample name; a later file for the same sample
/// replaces the earlier one.
#[derive(Clone, Debug, Default)]
pub struct DataSources {
    by_sample: BTreeMap<String, PathBuf>,
}

impl DataSources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_sample.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_sample.is_empty()
    }

    pub fn get(&self, sample_name: &str) -> Option<&Path> {
        self.by_sample.get(sample_name).map(|p| p.as_path())
    }

    pub fn iter(&self) -> impl Iterator<Item = DataSource> + '_ {
        self.by_sample.iter().map(|(s, p)| DataSource {
            sample_name: s.clone(),
            path: p.clone(),
        })
    }
}

impl DataSourceRegistry for DataSources {
    fn add_data_source(&mut self, path: &Path, sample_name: &str) {
        self.by_sample
            .insert(sample_name.to_string(), path.to_path_buf());
    }
}

/// Sequential merge of parsed reports into one table.
pub struct Aggregator<'a, R: DataSourceRegistry> {
    parser: ReportParser,
    table: ReportTable,
    registry: &'a mut R,
}

impl<'a, R: DataSourceRegistry> Aggregator<'a, R> {
    pub fn new(registry: &'a mut R) -> Self {
        Self {
            parser: ReportParser::new(),
            table: ReportTable::new(),
            registry,
        }
    }

    /// Parses one report and stores its record, replacing any earlier record
    /// for the same sample. Returns the sample name when a record was kept.
    pub fn add_report(&mut self, path: &Path, content: &str) -> Result<Option<String>, ReportError> {
        let Some(parsed) = self.parser.parse(content)? else {
            debug!(path = %path.display(), "no data rows, skipping");
            return Ok(None);
        };
        self.registry.add_data_source(path, &parsed.sample_name);
        let sample = parsed.sample_name;
        if self.table.insert(sample.clone(), parsed.record).is_some() {
            warn!(
                sample = %sample,
                path = %path.display(),
                "duplicate sample name, overwriting earlier report"
            );
        }
        Ok(Some(sample))
    }

    pub fn table(&self) -> &ReportTable {
        &self.table
    }

    /// Drops ignored samples and classifies the result.
    pub fn finish(self, ignore: &[Pattern]) -> ReportOutcome {
        let mut table = self.table;
        if !ignore.is_empty() {
            table.retain(|sample, _| {
                let ignored = ignore.iter().any(|p| p.matches(sample));
                if ignored {
                    debug!(sample, "ignoring sample");
                }
                !ignored
            });
        }
        ReportOutcome::from_table(table)
    }
}

pub fn run(cfg: &RunConfig) -> Result<RunOutput> {
    let stats = stats_enabled();

    let t_discover = Instant::now();
    let pattern = discover::compile_pattern(&cfg.pattern)?;
    let ignore = cfg
        .ignore_samples
        .iter()
        .map(|p| {
            Pattern::new(p).with_context(|| format!("invalid sample pattern {:?}", p))
        })
        .collect::<Result<Vec<_>>>()?;
    let files = discover::find_reports(&cfg.inputs, &pattern)?;
    log_stage(stats, "engine.discover", t_discover);
    debug!(count = files.len(), "report files discovered");

    let t_parse = Instant::now();
    let mut sources = DataSources::new();
    let mut skipped = Vec::new();
    let mut agg = Aggregator::new(&mut sources);
    for path in &files {
        match process_file(&mut agg, path, cfg.max_file_size) {
            Ok(_) => {}
            Err(e) if cfg.error_policy == ErrorPolicy::Skip => {
                warn!(path = %e.path.display(), error = %e.source, "skipping report");
                skipped.push(e);
            }
            Err(e) => return Err(e.into()),
        }
    }
    let outcome = agg.finish(&ignore);
    log_stage(stats, "engine.parse", t_parse);

    if let ReportOutcome::Report(table) = &outcome {
        info!("Found {} reports", table.len());
    }

    Ok(RunOutput {
        outcome,
        sources,
        files,
        skipped,
    })
}

fn process_file<R: DataSourceRegistry>(
    agg: &mut Aggregator<'_, R>,
    path: &Path,
    max_file_size: u64,
) -> Result<Option<String>, FileError> {
    let wrap = |source: FileErrorKind| FileError {
        path: path.to_path_buf(),
        source,
    };
    let content = io::read_report(path, max_file_size).map_err(|e| wrap(FileErrorKind::Read(e)))?;
    agg.add_report(path, &content)
        .map_err(|e| wrap(FileErrorKind::Report(e)))
}

pub(crate) fn stats_enabled() -> bool {
    matches!(std::env::var("KIRA_STATS").as_deref(), Ok("1"))
}

pub(crate) fn log_stage(stats: bool, name: &str, t: Instant) {
    if stats {
        info!(target: "kira_stats", "KIRA_STATS stage={} time={}", name, fmt_dur(t.elapsed()));
    }
}

pub(crate) fn fmt_dur(d: Duration) -> String {
    if d.as_secs_f64() < 1.0 {
        format!("{}ms", d.as_millis())
    } else {
        format!("{:.3}s", d.as_secs_f64())
    }
}
