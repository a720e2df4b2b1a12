//! Shared logging setup for the scandeck binary.
//!
//! Two sinks: human-readable stderr, and a size-capped log file under the
//! scandeck home directory. Filtering is `RUST_LOG` driven with a service
//! default.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "scandeck=info,scandeck_protocol=info";
const MAX_LOG_FILE_SIZE: u64 = 8 * 1024 * 1024;

/// Resolve the scandeck home directory.
///
/// Priority:
/// 1) SCANDECK_HOME
/// 2) platform home dir
/// 3) ./.scandeck
pub fn scandeck_home() -> PathBuf {
    if let Ok(override_path) = std::env::var("SCANDECK_HOME") {
        return PathBuf::from(override_path);
    }
    dirs::home_dir()
        .map(|home| home.join(".scandeck"))
        .unwrap_or_else(|| PathBuf::from(".").join(".scandeck"))
}

/// Logs directory: `<home>/logs`.
pub fn logs_dir() -> PathBuf {
    scandeck_home().join("logs")
}

/// Initialize tracing with a capped file writer and stderr output.
///
/// `verbose` widens the stderr filter to match the file filter; otherwise the
/// console only shows warnings and errors while the file keeps the full feed.
pub fn init_logging(app_name: &str, verbose: bool) -> Result<()> {
    let dir = logs_dir();
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create logs directory: {}", dir.display()))?;

    let file_writer = CappedFileWriter::open(dir.join(format!("{}.log", app_name)))
        .context("Failed to open log file")?;

    let file_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let console_filter = if verbose {
        file_filter.clone()
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .init();

    Ok(())
}

/// Append-only log file that keeps one `.old` generation.
///
/// When the active file would exceed the cap it is renamed to `<path>.old`
/// (replacing any previous generation) and a fresh file is started.
#[derive(Clone)]
pub struct CappedFileWriter {
    inner: Arc<Mutex<CappedFile>>,
}

struct CappedFile {
    path: PathBuf,
    file: File,
    written: u64,
}

impl CappedFileWriter {
    pub fn open(path: PathBuf) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let written = file.metadata().map(|m| m.len()).unwrap_or(0);
        Ok(Self {
            inner: Arc::new(Mutex::new(CappedFile {
                path,
                file,
                written,
            })),
        })
    }
}

impl CappedFile {
    fn roll_over(&mut self) -> io::Result<()> {
        let _ = self.file.flush();
        let old = self.path.with_extension("log.old");
        if old.exists() {
            fs::remove_file(&old)?;
        }
        fs::rename(&self.path, &old)?;
        self.file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        self.written = 0;
        Ok(())
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written + buf.len() as u64 > MAX_LOG_FILE_SIZE {
            self.roll_over()?;
        }
        let bytes = self.file.write(buf)?;
        self.written += bytes as u64;
        Ok(bytes)
    }
}

pub struct CappedFileGuard {
    inner: Arc<Mutex<CappedFile>>,
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CappedFileWriter {
    type Writer = CappedFileGuard;

    fn make_writer(&'a self) -> Self::Writer {
        CappedFileGuard {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Write for CappedFileGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        guard.file.flush()
    }
}
