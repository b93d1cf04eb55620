//! RotatingFileSink - size-bounded log file with numbered backups

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use contracts::{FileSinkConfig, LineSink, LogError};
use tracing::{debug, instrument};

/// Path of the `index`-th rotated file: `logs/app.log` -> `logs/app.2.log`.
pub fn rotated_path(base: &Path, index: usize) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match base.extension() {
        Some(ext) => format!("{stem}.{index}.{}", ext.to_string_lossy()),
        None => format!("{stem}.{index}"),
    };
    base.with_file_name(name)
}

/// Sink that appends lines to a file and rotates it once it grows past the size limit.
///
/// The active file is always `config.path`; backups are `.1` (newest) up to
/// `.max_rotated_files` (oldest). Anything older is deleted.
pub struct RotatingFileSink {
    config: FileSinkConfig,
    max_bytes: u64,
    writer: Option<BufWriter<File>>,
    current_size: u64,
}

impl RotatingFileSink {
    /// Open (or create) the log file right away.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    /// [`LogError::SinkOpen`] when the file cannot be created or opened for appending.
    #[instrument(name = "file_sink_open", skip(config), fields(path = %config.path.display()))]
    pub fn open(config: FileSinkConfig) -> Result<Self, LogError> {
        if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| LogError::sink_open(&config.path, e))?;
        }

        let mut sink = Self {
            max_bytes: config.max_bytes(),
            config,
            writer: None,
            current_size: 0,
        };

        if sink.config.rotate_on_open && file_len(&sink.config.path) > 0 {
            sink.shift_backups()
                .map_err(|e| LogError::sink_open(&sink.config.path, e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&sink.config.path)
            .map_err(|e| LogError::sink_open(&sink.config.path, e))?;
        sink.current_size = file.metadata().map(|m| m.len()).unwrap_or(0);
        sink.writer = Some(BufWriter::new(file));

        debug!(size = sink.current_size, "File sink opened");
        Ok(sink)
    }

    pub fn config(&self) -> &FileSinkConfig {
        &self.config
    }

    /// Bytes in the active file, including buffered lines
    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    #[cfg(test)]
    fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    fn rotate(&mut self) -> io::Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        self.shift_backups()?;

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.config.path)?;
        self.writer = Some(BufWriter::new(file));
        self.current_size = 0;

        debug!(path = %self.config.path.display(), "Log file rotated");
        Ok(())
    }

    /// Move `app.log` to `app.1.log`, `app.1.log` to `app.2.log`, ... dropping the oldest.
    fn shift_backups(&self) -> io::Result<()> {
        let base = &self.config.path;
        let keep = self.config.max_rotated_files;

        if keep == 0 {
            return remove_if_exists(base);
        }

        remove_if_exists(&rotated_path(base, keep))?;
        for index in (1..keep).rev() {
            let src = rotated_path(base, index);
            if src.exists() {
                fs::rename(&src, rotated_path(base, index + 1))?;
            }
        }
        if base.exists() {
            fs::rename(base, rotated_path(base, 1))?;
        }
        Ok(())
    }
}

impl LineSink for RotatingFileSink {
    fn describe(&self) -> String {
        format!("file:{}", self.config.path.display())
    }

    fn write_line(&mut self, line: &str) -> Result<(), LogError> {
        let name = self.describe();
        let len = line.len() as u64 + 1;

        if self.current_size > 0 && self.current_size + len > self.max_bytes {
            self.rotate()
                .map_err(|e| LogError::sink_write(&name, format!("rotation failed: {e}")))?;
        }

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| LogError::sink_closed(&name))?;
        writer
            .write_all(line.as_bytes())
            .and_then(|()| writer.write_all(b"\n"))
            .map_err(|e| LogError::sink_write(&name, e.to_string()))?;

        self.current_size += len;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), LogError> {
        match self.writer.as_mut() {
            Some(writer) => writer
                .flush()
                .map_err(|e| LogError::sink_write(self.describe(), e.to_string())),
            None => Ok(()),
        }
    }

    fn close(&mut self) -> Result<(), LogError> {
        let result = self.flush();
        self.writer = None;
        debug!(path = %self.config.path.display(), "File sink closed");
        result
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.config.path)
    }
}

fn file_len(path: &Path) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
