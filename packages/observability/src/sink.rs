//! JSONL file sink and subscriber installation.

use crate::json_layer::JsonLayer;
use crate::{InitError, LogConfig};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, LineWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// `~/.practice-sync/logs/dev.jsonl`, or the same layout under the temp dir
/// when the host has no home directory.
pub(crate) fn default_log_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".practice-sync")
        .join("logs")
        .join("dev.jsonl")
}

/// Shared append handle on the log file.
///
/// Writes go through a [`LineWriter`], so each complete JSON line reaches
/// the file as soon as its newline is written.
#[derive(Clone)]
pub struct LogFile {
    path: Arc<PathBuf>,
    file: Arc<Mutex<LineWriter<File>>>,
}

impl LogFile {
    pub fn open(path: &Path) -> Result<Self, InitError> {
        let open = || -> io::Result<File> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            OpenOptions::new().create(true).append(true).open(path)
        };

        let file = open().map_err(|source| InitError::OpenLog {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            path: Arc::new(path.to_path_buf()),
            file: Arc::new(Mutex::new(LineWriter::new(file))),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Write for LogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.lock().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.lock().flush()
    }
}

impl<'a> MakeWriter<'a> for LogFile {
    type Writer = LogFile;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// `RUST_LOG` when set, otherwise `fallback`.
fn filter_or(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Install the global subscriber: JSON lines to the log file, plus a compact
/// stderr echo when `also_stderr` is set. Returns the file in use.
pub(crate) fn install(config: &LogConfig) -> Result<PathBuf, InitError> {
    let log_path = config.log_path.clone().unwrap_or_else(default_log_path);
    let file = LogFile::open(&log_path)?;

    let json = JsonLayer::new(config.service_name.clone(), file)
        .with_filter(filter_or(&config.default_level));

    let stderr = config.also_stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .compact()
            .with_writer(io::stderr)
            .with_filter(filter_or(&config.default_level))
    });

    tracing_subscriber::registry()
        .with(json)
        .with(stderr)
        .try_init()?;

    tracing::debug!(
        log_path = %log_path.display(),
        service = %config.service_name,
        "logging installed"
    );
    Ok(log_path)
}
