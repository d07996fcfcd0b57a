use crate::core::engine::DataSources;
use crate::core::model::ReportTable;
use crate::report::MODULE;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Full per-sample table: `Sample` then every metric seen, sorted.
pub fn write(path: &Path, table: &ReportTable) -> Result<()> {
    let mut w =
        BufWriter::new(File::create(path).with_context(|| "create multiqc_mirtop.txt failed")?);
    let keys = table.metric_keys();

    write!(w, "Sample")?;
    for k in &keys {
        write!(w, "\t{}", k)?;
    }
    writeln!(w)?;

    for (sample, record) in table.iter() {
        write!(w, "{}", sample)?;
        for k in &keys {
            match record.get(k) {
                Some(v) => write!(w, "\t{}", v)?,
                None => write!(w, "\t")?,
            }
        }
        writeln!(w)?;
    }
    w.flush()?;
    Ok(())
}

pub fn write_sources(path: &Path, sources: &DataSources) -> Result<()> {
    let mut w =
        BufWriter::new(File::create(path).with_context(|| "create multiqc_sources.txt failed")?);
    writeln!(w, "Module\tSample Name\tSource")?;
    for src in sources.iter() {
        writeln!(
            w,
            "{}\t{}\t{}",
            MODULE.name,
            src.sample_name,
            src.path.display()
        )?;
    }
    w.flush()?;
    Ok(())
}
