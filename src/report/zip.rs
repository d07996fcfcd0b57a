use crate::report::REPORT_DIR;
use anyhow::{Context, Result, anyhow};
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Bundles `files` into `out_dir/mirtop_report.zip`.
///
/// Entries keep their path relative to `out_dir`, so the report folder and
/// anything nested in it (such as `latex/`) unpack to the same layout. The
/// archive is built under a temporary name and only renamed once complete.
pub fn write_zip(out_dir: &Path, files: &[PathBuf]) -> Result<PathBuf> {
    let zip_name = format!("{}.zip", REPORT_DIR);
    let zip_path = out_dir.join(&zip_name);
    let tmp_path = out_dir.join(format!("{}.tmp", zip_name));

    let file = File::create(&tmp_path)
        .with_context(|| format!("failed to create {}", tmp_path.display()))?;
    let mut zip = ZipWriter::new(file);

    match add_entries(&mut zip, out_dir, files)
        .and_then(|_| zip.finish().with_context(|| "failed to finalize zip"))
    {
        Ok(_) => {
            fs::rename(&tmp_path, &zip_path)
                .with_context(|| format!("failed to move zip to {}", zip_path.display()))?;
            Ok(zip_path)
        }
        Err(e) => {
            let _ = fs::remove_file(&tmp_path);
            Err(e)
        }
    }
}

fn add_entries(zip: &mut ZipWriter<File>, out_dir: &Path, files: &[PathBuf]) -> Result<()> {
    let stamp = zip::DateTime::from_date_and_time(1980, 1, 1, 0, 0, 0)
        .map_err(|_| anyhow!("invalid zip timestamp"))?;
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(stamp);

    let mut dirs = BTreeSet::new();
    for path in files {
        let parts = entry_parts(out_dir, path)?;
        for depth in 1..parts.len() {
            let dir = format!("{}/", parts[..depth].join("/"));
            if dirs.insert(dir.clone()) {
                zip.add_directory(dir, options)
                    .with_context(|| "failed to add directory entry to zip")?;
            }
        }

        let mut src =
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        zip.start_file(parts.join("/"), options)
            .with_context(|| format!("failed to add {} to zip", path.display()))?;
        io::copy(&mut src, zip)
            .with_context(|| format!("failed to copy {} into zip", path.display()))?;
    }
    Ok(())
}

/// Path components of `path` below `out_dir`, as archive name segments.
fn entry_parts(out_dir: &Path, path: &Path) -> Result<Vec<String>> {
    let rel = path
        .strip_prefix(out_dir)
        .map_err(|_| anyhow!("{} is outside {}", path.display(), out_dir.display()))?;
    rel.components()
        .map(|c| match c {
            Component::Normal(s) => s
                .to_str()
                .map(str::to_string)
                .ok_or_else(|| anyhow!("non UTF-8 path {}", path.display())),
            _ => Err(anyhow!("unexpected path component in {}", path.display())),
        })
        .collect()
}
