use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;

/// Size after which the next record starts a fresh segment.
pub const DEFAULT_SEGMENT_BYTES: u64 = 512 * 1024;

/// File name prefix of every log segment.
pub const SEGMENT_PREFIX: &str = "log_";

/// Append-only log sink that rolls over to a new timestamped segment once the
/// current one has reached `max_bytes`.
///
/// The size check runs before each append and only at line boundaries, so a
/// record written in several pieces never straddles two segments.
#[derive(Debug)]
pub struct RotatingLogFile {
    dir: PathBuf,
    max_bytes: u64,
    path: PathBuf,
    file: File,
    written: u64,
    at_line_start: bool,
}

impl RotatingLogFile {
    /// Creates `dir` if needed and opens a new segment in it.
    pub fn open(dir: impl Into<PathBuf>, max_bytes: u64) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let (path, file) = open_segment(&dir)?;
        Ok(Self {
            dir,
            max_bytes,
            path,
            file,
            written: 0,
            at_line_start: true,
        })
    }

    /// Path of the segment currently being appended to.
    pub fn current_path(&self) -> &Path {
        &self.path
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        let (path, file) = open_segment(&self.dir)?;
        self.path = path;
        self.file = file;
        self.written = 0;
        Ok(())
    }
}

impl Write for RotatingLogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.at_line_start && self.written >= self.max_bytes {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        if n > 0 {
            self.at_line_start = buf[n - 1] == b'\n';
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn open_segment(dir: &Path) -> io::Result<(PathBuf, File)> {
    let stamp = Local::now().format("%Y-%m-%dT%H-%M-%S%.3f").to_string();
    let mut suffix = 0u32;
    loop {
        let name = if suffix == 0 {
            format!("{SEGMENT_PREFIX}{stamp}")
        } else {
            format!("{SEGMENT_PREFIX}{stamp}_{suffix}")
        };
        let path = dir.join(name);
        match OpenOptions::new().append(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => suffix += 1,
            Err(err) => return Err(err),
        }
    }
}
