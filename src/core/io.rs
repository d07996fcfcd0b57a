use anyhow::{Context, Result, bail};
use flate2::read::MultiGzDecoder;
use memmap2::Mmap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Default upper bound for a single report, matching the log size limit used
/// by report aggregators.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50_000_000;

const SNIFF_LEN: usize = 8 * 1024;

pub struct MmapSource {
    mmap: Mmap,
}

impl MmapSource {
    pub fn open(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        // SAFETY: read-only file mapping.
        let mmap = unsafe { Mmap::map(&file) }.with_context(|| "mmap failed")?;
        Ok(Self { mmap })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.mmap
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputKind {
    Plain,
    Gzip,
}

pub fn detect_input_kind(path: &Path) -> Result<InputKind> {
    if let Some(ext) = path.extension().and_then(|s| s.to_str()) {
        let ext = ext.to_ascii_lowercase();
        if ext == "gz" {
            return Ok(InputKind::Gzip);
        }
    }
    let mut file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut magic = [0u8; 2];
    let n = file
        .read(&mut magic)
        .with_context(|| "failed to read magic bytes")?;
    if n == 2 && magic == [0x1f, 0x8b] {
        Ok(InputKind::Gzip)
    } else {
        Ok(InputKind::Plain)
    }
}

/// Reads a whole report into memory as text.
///
/// Files over `max_size` bytes, whether on disk or once decompressed, and
/// files that look binary are refused rather than parsed.
pub fn read_report(path: &Path, max_size: u64) -> Result<String> {
    let size = std::fs::metadata(path)
        .with_context(|| format!("failed to stat {}", path.display()))?
        .len();
    if size > max_size {
        bail!(
            "{} is {} bytes, over the {} byte limit",
            path.display(),
            size,
            max_size
        );
    }
    if size == 0 {
        return Ok(String::new());
    }

    let bytes = match detect_input_kind(path)? {
        InputKind::Plain => {
            let src = MmapSource::open(path)?;
            src.bytes().to_vec()
        }
        InputKind::Gzip => {
            let file = File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            let mut decoder =
                MultiGzDecoder::new(BufReader::new(file)).take(max_size.saturating_add(1));
            let mut out = Vec::new();
            decoder
                .read_to_end(&mut out)
                .with_context(|| format!("failed to decompress {}", path.display()))?;
            if out.len() as u64 > max_size {
                bail!(
                    "{} decompresses to over the {} byte limit",
                    path.display(),
                    max_size
                );
            }
            out
        }
    };

    if looks_binary(&bytes) {
        bail!("{} does not look like a text report", path.display());
    }
    String::from_utf8(bytes).with_context(|| format!("{} is not valid UTF-8", path.display()))
}

pub fn looks_binary(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(SNIFF_LEN)];
    memchr::memchr(0, head).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    const REPORT: &str = "0,isomiR_sum,s1,30\n1,ref_miRNA_sum,s1,70\n";

    #[test]
    fn reads_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a_mirtop_stats.log");
        std::fs::write(&path, REPORT).unwrap();
        assert_eq!(detect_input_kind(&path).unwrap(), InputKind::Plain);
        assert_eq!(read_report(&path, DEFAULT_MAX_FILE_SIZE).unwrap(), REPORT);
    }

    #[test]
    fn reads_gzip_by_magic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a_mirtop_stats.log");
        let mut enc = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        enc.write_all(REPORT.as_bytes()).unwrap();
        enc.finish().unwrap();
        assert_eq!(detect_input_kind(&path).unwrap(), InputKind::Gzip);
        assert_eq!(read_report(&path, DEFAULT_MAX_FILE_SIZE).unwrap(), REPORT);
    }

    #[test]
    fn refuses_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.log");
        std::fs::write(&path, REPORT).unwrap();
        assert!(read_report(&path, 4).is_err());
    }

    #[test]
    fn refuses_gzip_that_inflates_past_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big_mirtop_stats.log.gz");
        let mut enc = GzEncoder::new(File::create(&path).unwrap(), Compression::best());
        for _ in 0..1000 {
            enc.write_all(REPORT.as_bytes()).unwrap();
        }
        enc.finish().unwrap();

        let limit = 10_000;
        assert!(std::fs::metadata(&path).unwrap().len() < limit);
        let err = read_report(&path, limit).unwrap_err();
        assert!(err.to_string().contains("decompresses to over"));
    }

    #[test]
    fn gzip_exactly_at_limit_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a_mirtop_stats.log.gz");
        let text = REPORT.repeat(100);
        let mut enc = GzEncoder::new(File::create(&path).unwrap(), Compression::best());
        enc.write_all(text.as_bytes()).unwrap();
        enc.finish().unwrap();
        let limit = text.len() as u64;
        assert_eq!(read_report(&path, limit).unwrap(), text);
        assert!(read_report(&path, limit - 1).is_err());
    }

    #[test]
    fn refuses_binary_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bin.log");
        std::fs::write(&path, b"0,isomiR_sum\0\0\x01").unwrap();
        assert!(read_report(&path, DEFAULT_MAX_FILE_SIZE).is_err());
    }

    #[test]
    fn empty_file_is_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.log");
        std::fs::write(&path, "").unwrap();
        assert_eq!(read_report(&path, DEFAULT_MAX_FILE_SIZE).unwrap(), "");
    }
}
