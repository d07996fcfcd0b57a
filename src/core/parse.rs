use crate::core::error::ReportError;
use crate::core::model::{
    HEADER_TOKEN, ISOMIR_PERC, ISOMIR_SUM, MetricRecord, READ_COUNT, REF_MIRNA_SUM,
};
use tracing::warn;

/// One sample's worth of metrics pulled out of a `mirtop stats` report.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedReport {
    pub sample_name: String,
    pub record: MetricRecord,
}

/// Parses the comma-separated summary written by `mirtop stats`.
///
/// Rows look like `<ignored>,<metric>,<sample>,<value>,...`. Rows with fewer
/// than two columns, or whose metric column is the `category` header, are
/// skipped. Every other row must carry a numeric value in column 3.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReportParser;

impl ReportParser {
    pub fn new() -> Self {
        Self
    }

    /// Returns `Ok(None)` when the content holds no data rows at all.
    pub fn parse(&self, content: &str) -> Result<Option<ParsedReport>, ReportError> {
        let mut record = MetricRecord::new();
        let mut sample_name: Option<&str> = None;

        for (idx, line) in content.lines().enumerate() {
            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() < 2 || fields[1] == HEADER_TOKEN {
                continue;
            }
            let line_no = idx + 1;
            let metric = fields[1];
            let (Some(&sample), Some(&raw)) = (fields.get(2), fields.get(3)) else {
                return Err(ReportError::MissingValue {
                    line: line_no,
                    metric: metric.to_string(),
                });
            };
            let value = parse_value(raw).ok_or_else(|| ReportError::Parse {
                line: line_no,
                metric: metric.to_string(),
                value: raw.to_string(),
            })?;

            if let Some(prev) = sample_name
                && prev != sample
            {
                warn!(
                    line = line_no,
                    previous = prev,
                    current = sample,
                    "report mixes sample names, keeping the last one"
                );
            }
            sample_name = Some(sample);
            record.insert(metric, value);
        }

        let Some(sample_name) = sample_name else {
            return Ok(None);
        };

        derive_metrics(&mut record, sample_name)?;

        if record.len() > 1 {
            Ok(Some(ParsedReport {
                sample_name: sample_name.to_string(),
                record,
            }))
        } else {
            Ok(None)
        }
    }
}

/// Adds `read_count` and `isomiR_perc`, overwriting any input values.
pub fn derive_metrics(record: &mut MetricRecord, sample_name: &str) -> Result<(), ReportError> {
    let isomir = record
        .get(ISOMIR_SUM)
        .ok_or(ReportError::MissingField(ISOMIR_SUM))?;
    let reference = record
        .get(REF_MIRNA_SUM)
        .ok_or(ReportError::MissingField(REF_MIRNA_SUM))?;

    let read_count = isomir + reference;
    if read_count == 0.0 {
        return Err(ReportError::Division {
            sample: sample_name.to_string(),
        });
    }
    record.insert(READ_COUNT, read_count);
    record.insert(ISOMIR_PERC, isomir / read_count * 100.0);
    Ok(())
}

fn parse_value(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok()
}
