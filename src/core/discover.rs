use anyhow::{Context, Result, bail};
use glob::Pattern;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// File name pattern written by `mirtop stats`.
pub const DEFAULT_PATTERN: &str = "*_mirtop_stats.log";

/// Expands inputs into the report files to parse.
///
/// Directories are searched recursively and only file names matching
/// `pattern` are taken; files named directly are always taken. The result is
/// sorted by path and free of duplicates, so argument order is not kept: when
/// two files report the same sample, the one with the later path wins.
pub fn find_reports(inputs: &[PathBuf], pattern: &Pattern) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for input in inputs {
        if input.is_file() {
            found.push(input.clone());
        } else if input.is_dir() {
            walk_dir(input, pattern, &mut found)?;
        } else {
            bail!("input not found: {}", input.display());
        }
    }
    found.sort();
    found.dedup();
    Ok(found)
}

fn walk_dir(dir: &Path, pattern: &Pattern, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry.with_context(|| format!("failed to walk {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if pattern.matches(name) {
            debug!(path = %entry.path().display(), "matched report file");
            out.push(entry.into_path());
        }
    }
    Ok(())
}

pub fn compile_pattern(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern).with_context(|| format!("invalid file pattern {:?}", pattern))
}
