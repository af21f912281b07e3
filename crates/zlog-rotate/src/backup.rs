//! Naming, discovery, and compression of rotated log files

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";
const GZ_SUFFIX: &str = ".gz";

/// A rotated sibling of an active log file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupFile {
    pub path: PathBuf,
    /// When the file was rotated out
    pub rotated_at: DateTime<Utc>,
    pub compressed: bool,
}

/// Splits `dir/name.ext` into the pieces backups are named from
pub(crate) struct BackupNaming {
    dir: PathBuf,
    prefix: String,
    ext: String,
}

impl BackupNaming {
    pub(crate) fn new(active: &Path) -> Self {
        let dir = match active.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let stem = active
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = active
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        Self {
            dir,
            prefix: format!("{}-", stem),
            ext,
        }
    }

    /// Path a file rotated at `at` is moved to
    pub(crate) fn path_for(&self, at: DateTime<Utc>) -> PathBuf {
        self.dir.join(format!(
            "{}{}{}",
            self.prefix,
            at.format(TIMESTAMP_FORMAT),
            self.ext
        ))
    }

    /// Pick a backup path for `at` that is not taken yet, in either compressed or plain form
    pub(crate) fn free_path_for(&self, mut at: DateTime<Utc>) -> PathBuf {
        loop {
            let candidate = self.path_for(at);
            if !candidate.exists() && !with_gz_suffix(&candidate).exists() {
                return candidate;
            }
            at += chrono::Duration::milliseconds(1);
        }
    }

    /// Parse a directory entry name back into its rotation time
    fn parse(&self, file_name: &str) -> Option<(DateTime<Utc>, bool)> {
        let (name, compressed) = match file_name.strip_suffix(GZ_SUFFIX) {
            Some(n) => (n, true),
            None => (file_name, false),
        };
        let stamp = name.strip_prefix(&self.prefix)?.strip_suffix(&self.ext)?;
        let naive = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()?;
        Some((Utc.from_utc_datetime(&naive), compressed))
    }

    /// Every backup in the directory, newest first
    pub(crate) fn list(&self) -> io::Result<Vec<BackupFile>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut backups = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if let Some((rotated_at, compressed)) = self.parse(file_name) {
                backups.push(BackupFile {
                    path: entry.path(),
                    rotated_at,
                    compressed,
                });
            }
        }

        backups.sort_by(|a, b| b.rotated_at.cmp(&a.rotated_at));
        Ok(backups)
    }
}

fn with_gz_suffix(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(GZ_SUFFIX);
    PathBuf::from(name)
}

/// Gzip `src` next to itself and remove the original
pub(crate) fn compress(src: &Path) -> io::Result<PathBuf> {
    let dst = with_gz_suffix(src);
    let mut reader = BufReader::new(File::open(src)?);
    let mut encoder = GzEncoder::new(BufWriter::new(File::create(&dst)?), Compression::default());
    io::copy(&mut reader, &mut encoder)?;
    encoder.finish()?.flush()?;
    fs::remove_file(src)?;
    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;
    use tempfile::TempDir;

    fn at(s: &str) -> DateTime<Utc> {
        let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.3f").unwrap();
        Utc.from_utc_datetime(&naive)
    }

    #[test]
    fn test_backup_path() {
        let naming = BackupNaming::new(Path::new("/var/log/app.log"));
        assert_eq!(
            naming.path_for(at("2024-03-01 12:30:05.042")),
            PathBuf::from("/var/log/app-2024-03-01T12-30-05.042.log")
        );
    }

    #[test]
    fn test_parse_ignores_foreign_files() {
        let naming = BackupNaming::new(Path::new("log/debug.log"));
        assert!(naming.parse("debug.log").is_none());
        assert!(naming.parse("debug-extra.log").is_none());
        assert!(naming.parse("error-2024-03-01T12-30-05.042.log").is_none());

        let (when, compressed) = naming.parse("debug-2024-03-01T12-30-05.042.log.gz").unwrap();
        assert_eq!(when, at("2024-03-01 12:30:05.042"));
        assert!(compressed);
    }

    #[test]
    fn test_list_newest_first() {
        let dir = TempDir::new().unwrap();
        let active = dir.path().join("app.log");
        let naming = BackupNaming::new(&active);

        let old = naming.path_for(at("2024-01-01 00:00:00.000"));
        let new = naming.path_for(at("2024-02-01 00:00:00.000"));
        fs::write(&old, "old").unwrap();
        fs::write(&new, "new").unwrap();
        fs::write(&active, "active").unwrap();
        fs::write(dir.path().join("other.log"), "x").unwrap();

        let backups = naming.list().unwrap();
        assert_eq!(backups.len(), 2);
        assert_eq!(backups[0].path, new);
        assert_eq!(backups[1].path, old);
    }

    #[test]
    fn test_free_path_skips_taken() {
        let dir = TempDir::new().unwrap();
        let naming = BackupNaming::new(&dir.path().join("app.log"));
        let when = at("2024-01-01 00:00:00.000");

        fs::write(naming.path_for(when), "taken").unwrap();
        let free = naming.free_path_for(when);
        assert_eq!(free, naming.path_for(at("2024-01-01 00:00:00.001")));
    }

    #[test]
    fn test_compress() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("app-2024-01-01T00-00-00.000.log");
        fs::write(&src, "hello gzip").unwrap();

        let dst = compress(&src).unwrap();
        assert!(!src.exists());
        assert!(dst.to_string_lossy().ends_with(".log.gz"));

        let mut content = String::new();
        GzDecoder::new(File::open(&dst).unwrap())
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "hello gzip");
    }
}
