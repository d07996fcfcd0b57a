use crate::core::model::{ISOMIR_PERC, ISOMIR_SUM, READ_COUNT, REF_MIRNA_SUM, ReportTable};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Display settings for one general statistics column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnHeader {
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub suffix: &'static str,
    pub scale: &'static str,
}

pub const HEADERS: [ColumnHeader; 4] = [
    ColumnHeader {
        key: ISOMIR_SUM,
        title: "IsomiR reads",
        description: "read count summed over all isomiRs in sample",
        min: None,
        max: None,
        suffix: "",
        scale: "PuBu",
    },
    ColumnHeader {
        key: REF_MIRNA_SUM,
        title: "Reference reads",
        description: "read count summed over all reads mapping to the reference form of a miRNA",
        min: None,
        max: None,
        suffix: "",
        scale: "PuBu",
    },
    ColumnHeader {
        key: READ_COUNT,
        title: "Total reads",
        description: "all aligned reads",
        min: None,
        max: None,
        suffix: "",
        scale: "PuBu",
    },
    ColumnHeader {
        key: ISOMIR_PERC,
        title: "IsomiR %",
        description: "percentage of reads mapping to non-canonical forms of a microRNA",
        min: Some(0.0),
        max: Some(100.0),
        suffix: "%",
        scale: "RdYlGn",
    },
];

impl ColumnHeader {
    pub fn format(&self, value: f64) -> String {
        format!("{:.1}{}", value, self.suffix)
    }

    /// Value range used to scale bars: the configured bounds where set,
    /// otherwise the range observed in `table`.
    pub fn range(&self, table: &ReportTable) -> (f64, f64) {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for (_, record) in table.iter() {
            if let Some(v) = record.get(self.key) {
                lo = lo.min(v);
                hi = hi.max(v);
            }
        }
        if !lo.is_finite() {
            lo = 0.0;
            hi = 0.0;
        }
        (self.min.unwrap_or(lo.min(0.0)), self.max.unwrap_or(hi))
    }

    /// Fraction of the column range covered by `value`, clamped to 0..=1.
    pub fn fraction(&self, value: f64, range: (f64, f64)) -> f64 {
        let (lo, hi) = range;
        if hi - lo <= 0.0 {
            return 0.0;
        }
        ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
    }
}

pub fn write(path: &Path, table: &ReportTable) -> Result<()> {
    let mut w = BufWriter::new(
        File::create(path).with_context(|| "create mirtop_general_stats.txt failed")?,
    );

    write!(w, "Sample")?;
    for h in &HEADERS {
        write!(w, "\t{}", h.title)?;
    }
    writeln!(w)?;

    for (sample, record) in table.iter() {
        write!(w, "{}", sample)?;
        for h in &HEADERS {
            match record.get(h.key) {
                Some(v) => write!(w, "\t{}", h.format(v))?,
                None => write!(w, "\t")?,
            }
        }
        writeln!(w)?;
    }
    w.flush()?;
    Ok(())
}
