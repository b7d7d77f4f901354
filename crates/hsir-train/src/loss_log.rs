//! Per-iteration loss record with plain-text export.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;

/// Loss values in iteration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LossLog {
    values: Vec<f64>,
}

impl LossLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: f64) {
        self.values.push(value);
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Append one value per line to `path`, creating it if needed.
    pub fn save_txt(&self, path: impl AsRef<Path>) -> Result<()> {
        self.write(path.as_ref(), true)
    }

    /// Replace `path` with one value per line.
    pub fn overwrite_txt(&self, path: impl AsRef<Path>) -> Result<()> {
        self.write(path.as_ref(), false)
    }

    fn write(&self, path: &Path, append: bool) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(path)?;
        let mut writer = BufWriter::new(file);
        for value in &self.values {
            writeln!(writer, "{}", value)?;
        }
        writer.flush()?;
        tracing::debug!("wrote {} loss values to {}", self.values.len(), path.display());
        Ok(())
    }
}

impl Extend<f64> for LossLog {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        self.values.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_txt_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("loss.txt");

        let mut log = LossLog::new();
        log.extend([0.5, 0.25]);
        log.save_txt(&path).unwrap();
        log.save_txt(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "0.5\n0.25\n0.5\n0.25\n");
    }

    #[test]
    fn test_overwrite_txt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loss.txt");

        let mut log = LossLog::new();
        log.push(1.0);
        log.save_txt(&path).unwrap();
        log.push(2.0);
        log.overwrite_txt(&path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "1\n2\n");
        assert_eq!(log.last(), Some(2.0));
    }
}
