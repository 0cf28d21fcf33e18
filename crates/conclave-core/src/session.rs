//! Session record and transcript persistence.
//!
//! A [`SessionRecord`] accumulates per-stage outputs while a pipeline runs;
//! the [`TranscriptWriter`] serializes the finished record to a timestamped
//! plain-text file under the log directory.

use chrono::Local;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// One pipeline run: the operator's task, each stage's transcript in pipeline
/// order, and the elapsed wall-clock time.
#[derive(Debug, Clone, Default)]
pub struct SessionRecord {
    /// Verbatim task text as entered by the operator.
    pub task: String,
    /// Group name -> stage transcript, in pipeline order.
    pub stage_outputs: Vec<(String, String)>,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

impl SessionRecord {
    /// Creates an empty record for `task`.
    #[must_use]
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            stage_outputs: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    /// Appends one stage's transcript. Stages are recorded in execution order.
    pub fn record_stage(&mut self, group: impl Into<String>, output: impl Into<String>) {
        self.stage_outputs.push((group.into(), output.into()));
    }

    /// Returns the transcript recorded for `group`, if any.
    #[must_use]
    pub fn stage_output(&self, group: &str) -> Option<&str> {
        self.stage_outputs
            .iter()
            .find(|(name, _)| name == group)
            .map(|(_, output)| output.as_str())
    }
}

/// Writes session records to timestamped files under a log directory.
#[derive(Debug, Clone)]
pub struct TranscriptWriter {
    dir: PathBuf,
}

impl TranscriptWriter {
    /// Creates a writer targeting `dir`. The directory is created lazily on
    /// the first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory this writer targets.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `record` to a new file named from the current local time at
    /// second resolution (`YYYYmmdd_HHMMSS.txt`), creating the log directory
    /// if absent. Returns the path written.
    ///
    /// # Errors
    /// Returns any I/O error from directory creation or the write itself.
    /// Callers treat this as non-fatal: a run that fails to persist its log
    /// still returns its in-memory result.
    pub fn write(&self, record: &SessionRecord) -> std::io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let filename = Local::now().format("%Y%m%d_%H%M%S.txt").to_string();
        let path = self.dir.join(filename);

        let mut contents = String::new();
        let _ = write!(contents, "=== Task ===\n\n{}\n\n", record.task);
        for (group, output) in &record.stage_outputs {
            let _ = write!(contents, "=== {} ===\n\n{}\n\n", group.to_uppercase(), output);
        }
        let _ = write!(
            contents,
            "=== Elapsed Time ===\n\n{:.2} seconds\n",
            record.elapsed.as_secs_f64()
        );

        fs::write(&path, contents)?;
        debug!(path = %path.display(), stages = record.stage_outputs.len(), "transcript written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_record() -> SessionRecord {
        let mut record = SessionRecord::new("Should we launch?");
        record.record_stage("plan", "Source: Planner\nContent: Yes, with caveats.");
        record.record_stage(
            "discuss",
            "Source: ExpertA\nContent: Upside is real.\n\nSource: ExpertB\nContent: Risk is low.",
        );
        record.elapsed = Duration::from_millis(12_340);
        record
    }

    #[test]
    fn test_write_round_trips_sections_verbatim() {
        let dir = TempDir::new().unwrap();
        let writer = TranscriptWriter::new(dir.path());
        let record = sample_record();

        let path = writer.write(&record).unwrap();
        let contents = fs::read_to_string(&path).unwrap();

        assert!(contents.starts_with("=== Task ===\n\nShould we launch?\n\n"));
        assert!(contents.contains("=== PLAN ===\n\nSource: Planner\nContent: Yes, with caveats.\n\n"));
        assert!(contents.contains(
            "=== DISCUSS ===\n\nSource: ExpertA\nContent: Upside is real.\n\n\
             Source: ExpertB\nContent: Risk is low.\n\n"
        ));
        assert!(contents.ends_with("=== Elapsed Time ===\n\n12.34 seconds\n"));
    }

    #[test]
    fn test_write_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("logs").join("council");
        let writer = TranscriptWriter::new(&nested);

        let path = writer.write(&sample_record()).unwrap();
        assert!(path.starts_with(&nested));
        assert!(path.exists());
    }

    #[test]
    fn test_filename_is_timestamped_txt() {
        let dir = TempDir::new().unwrap();
        let writer = TranscriptWriter::new(dir.path());

        let path = writer.write(&sample_record()).unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert_eq!(name.len(), "YYYYmmdd_HHMMSS.txt".len());
        assert!(name.ends_with(".txt"));
        assert!(name[..8].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_stage_output_lookup() {
        let record = sample_record();
        assert!(record.stage_output("plan").unwrap().contains("Planner"));
        assert!(record.stage_output("decide").is_none());
    }
}
