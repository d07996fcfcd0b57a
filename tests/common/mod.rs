use std::fs;
use std::path::{Path, PathBuf};

/// Writes a `mirtop stats` style report and returns its path.
pub fn write_report(dir: &Path, file: &str, sample: &str, rows: &[(&str, &str)]) -> PathBuf {
    let mut text = String::from(",category,sample,counts\n");
    for (i, (metric, value)) in rows.iter().enumerate() {
        text.push_str(&format!("{},{},{},{}\n", i, metric, sample, value));
    }
    let path = dir.join(file);
    fs::write(&path, text).expect("write report fixture");
    path
}
