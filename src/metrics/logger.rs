// JSONL metrics logger

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use super::types::RequestMetric;

/// Appends one JSON line per reply to `<dir>/metrics-YYYY-MM-DD.jsonl`
pub struct MetricsLogger {
    metrics_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl MetricsLogger {
    pub fn new(metrics_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&metrics_dir).with_context(|| {
            format!(
                "Failed to create metrics directory: {}",
                metrics_dir.display()
            )
        })?;

        Ok(Self {
            metrics_dir,
            write_lock: Mutex::new(()),
        })
    }

    /// SHA-256 of a message, hex encoded
    pub fn hash_query(text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn log(&self, metric: &RequestMetric) -> Result<()> {
        let path = self.file_for(metric);
        let line = serde_json::to_string(metric).context("Failed to serialize metric")?;

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("Metrics write lock poisoned"))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open metrics file: {}", path.display()))?;

        writeln!(file, "{}", line)
            .with_context(|| format!("Failed to write metrics file: {}", path.display()))?;

        Ok(())
    }

    pub fn metrics_dir(&self) -> &PathBuf {
        &self.metrics_dir
    }

    fn file_for(&self, metric: &RequestMetric) -> PathBuf {
        self.metrics_dir.join(format!(
            "metrics-{}.jsonl",
            metric.timestamp.format("%Y-%m-%d")
        ))
    }
}
