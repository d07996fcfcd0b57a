use std::collections::BTreeMap;
use std::path::PathBuf;

pub const ISOMIR_SUM: &str = "isomiR_sum";
pub const REF_MIRNA_SUM: &str = "ref_miRNA_sum";
pub const READ_COUNT: &str = "read_count";
pub const ISOMIR_PERC: &str = "isomiR_perc";

/// Header token in column 1 that marks a row to skip.
pub const HEADER_TOKEN: &str = "category";

/// Metric name to value for a single sample.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetricRecord {
    values: BTreeMap<String, f64>,
}

impl MetricRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl FromIterator<(String, f64)> for MetricRecord {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Sample name to its metrics. Iteration is in sample-name order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReportTable {
    samples: BTreeMap<String, MetricRecord>,
}

impl ReportTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set semantics: returns the record that was replaced, if any.
    pub fn insert(&mut self, sample: String, record: MetricRecord) -> Option<MetricRecord> {
        self.samples.insert(sample, record)
    }

    pub fn get(&self, sample: &str) -> Option<&MetricRecord> {
        self.samples.get(sample)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricRecord)> {
        self.samples.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn sample_names(&self) -> impl Iterator<Item = &str> {
        self.samples.keys().map(|k| k.as_str())
    }

    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str, &MetricRecord) -> bool,
    {
        self.samples.retain(|k, v| keep(k, v));
    }

    /// Union of metric names across all samples, sorted.
    pub fn metric_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .samples
            .values()
            .flat_map(|r| r.keys().map(|k| k.to_string()))
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DataSource {
    pub sample_name: String,
    pub path: PathBuf,
}

/// Result of aggregating every discovered report.
#[derive(Clone, Debug, PartialEq)]
pub enum ReportOutcome {
    Report(ReportTable),
    Empty,
}

impl ReportOutcome {
    pub fn from_table(table: ReportTable) -> Self {
        if table.is_empty() {
            ReportOutcome::Empty
        } else {
            ReportOutcome::Report(table)
        }
    }

    pub fn into_table(self) -> Result<ReportTable, crate::core::error::EmptyResultError> {
        match self {
            ReportOutcome::Report(table) => Ok(table),
            ReportOutcome::Empty => Err(crate::core::error::EmptyResultError),
        }
    }
}
