//! Rotating file writer

use chrono::Utc;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::backup::{self, BackupFile, BackupNaming};
use crate::rotation::RotationConfig;

/// File writer that rotates by size and prunes backups by count and age.
///
/// Nothing touches the disk until the first write, so a writer for an
/// unwritable location can be built freely and reports the failure from
/// `write`. `&RotatingWriter` implements [`Write`] as well, which lets one
/// writer be shared behind an `Arc`.
pub struct RotatingWriter {
    path: PathBuf,
    config: RotationConfig,
    naming: BackupNaming,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    writer: Option<BufWriter<File>>,
    current_size: u64,
}

impl RotatingWriter {
    /// Create a new rotating writer
    pub fn new(path: impl Into<PathBuf>, config: RotationConfig) -> Self {
        let path = path.into();
        let naming = BackupNaming::new(&path);
        Self {
            path,
            config,
            naming,
            state: Mutex::new(State::default()),
        }
    }

    /// Get the log file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &RotationConfig {
        &self.config
    }

    /// Get current file size, 0 before the first write
    pub fn current_size(&self) -> u64 {
        self.state.lock().current_size
    }

    /// Rotated siblings of this file, newest first
    pub fn backups(&self) -> io::Result<Vec<BackupFile>> {
        self.naming.list()
    }

    /// Rotate now regardless of size
    pub fn rotate(&self) -> io::Result<()> {
        let mut state = self.state.lock();
        self.rotate_locked(&mut state)
    }

    fn write_locked(&self, state: &mut State, buf: &[u8]) -> io::Result<usize> {
        if state.writer.is_none() {
            self.open_existing(state)?;
        }
        if self.config.exceeds(state.current_size, buf.len() as u64) {
            self.rotate_locked(state)?;
        }

        let writer = match state.writer.as_mut() {
            Some(w) => w,
            None => return Err(io::Error::new(io::ErrorKind::Other, "log file not open")),
        };
        writer.write_all(buf)?;
        writer.flush()?;
        state.current_size += buf.len() as u64;
        Ok(buf.len())
    }

    fn open_existing(&self, state: &mut State) -> io::Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        state.current_size = file.metadata()?.len();
        state.writer = Some(BufWriter::new(file));
        Ok(())
    }

    fn rotate_locked(&self, state: &mut State) -> io::Result<()> {
        debug!("Rotating log file: {}", self.path.display());

        // Flush and close current file
        if let Some(mut writer) = state.writer.take() {
            writer.flush()?;
        }

        if self.path.exists() {
            let backup = self.naming.free_path_for(Utc::now());
            fs::rename(&self.path, &backup)?;
        } else if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;

        state.writer = Some(BufWriter::new(file));
        state.current_size = 0;

        // The new file is already in place; a failed prune must not fail the write
        if let Err(e) = self.naming.list().and_then(|backups| self.prune(backups)) {
            warn!("Failed to prune backups of {}: {}", self.path.display(), e);
        }
        Ok(())
    }

    /// Drop backups past the count and age limits, then compress what is left.
    /// Keeps going past a failed removal and reports the first one.
    fn prune(&self, backups: Vec<BackupFile>) -> io::Result<()> {
        let mut result = Ok(());
        let cutoff = if self.config.max_age.is_zero() {
            None
        } else {
            chrono::Duration::from_std(self.config.max_age)
                .ok()
                .map(|age| Utc::now() - age)
        };

        for (index, backup) in backups.into_iter().enumerate() {
            let over_count = self.config.max_backups > 0 && index >= self.config.max_backups;
            let too_old = cutoff.map_or(false, |c| backup.rotated_at < c);

            if over_count || too_old {
                debug!("Removing old log file: {}", backup.path.display());
                match fs::remove_file(&backup.path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => {
                        if result.is_ok() {
                            result = Err(e);
                        }
                    }
                }
            } else if self.config.compress && !backup.compressed {
                if let Err(e) = backup::compress(&backup.path) {
                    warn!("Failed to compress {}: {}", backup.path.display(), e);
                }
            }
        }

        result
    }
}

impl Write for &RotatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.state.lock();
        self.write_locked(&mut state, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.state.lock().writer.as_mut() {
            Some(w) => w.flush(),
            None => Ok(()),
        }
    }
}

impl Write for RotatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (&*self).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        (&*self).flush()
    }
}

impl std::fmt::Debug for RotatingWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingWriter")
            .field("path", &self.path)
            .field("config", &self.config)
            .finish()
    }
}
