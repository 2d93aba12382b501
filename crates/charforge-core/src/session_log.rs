//! Append-only session log (`error_log.txt`).
//!
//! One [`SessionLog`] is created at startup and cloned into every consumer.
//! Each session appends a header followed by timestamped lines. If the file
//! cannot be opened or a write fails, the log keeps going in memory only.
//! Only the most recent [`MAX_SESSION_LINES`] lines are kept in memory.

use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Local;

/// In-memory line limit. The file on disk is never truncated.
pub const MAX_SESSION_LINES: usize = 2000;

#[derive(Debug, Default)]
struct LogInner {
    file: Option<File>,
    path: Option<PathBuf>,
    lines: VecDeque<String>,
}

/// Shared handle to the session log.
#[derive(Debug, Clone, Default)]
pub struct SessionLog {
    inner: Arc<Mutex<LogInner>>,
}

impl SessionLog {
    /// Opens `path` for appending and writes the session header.
    pub fn open(path: &Path) -> Self {
        let file = path
            .parent()
            .map_or(Ok(()), std::fs::create_dir_all)
            .and_then(|_| OpenOptions::new().create(true).append(true).open(path));

        let inner = match file {
            Ok(file) => LogInner {
                file: Some(file),
                path: Some(path.to_path_buf()),
                lines: VecDeque::new(),
            },
            Err(e) => {
                tracing::warn!(
                    "Session log {} unavailable, keeping it in memory: {}",
                    path.display(),
                    e
                );
                LogInner::default()
            }
        };

        let log = Self {
            inner: Arc::new(Mutex::new(inner)),
        };
        log.write_header();
        log
    }

    /// A log that never touches the filesystem.
    pub fn in_memory() -> Self {
        let log = Self::default();
        log.write_header();
        log
    }

    fn write_header(&self) {
        let header = format!(
            "========== Session: {} ==========",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        self.append(&format!("\n{}", header), header);
    }

    /// Path of the backing file, or `None` when memory-only.
    pub fn path(&self) -> Option<PathBuf> {
        self.lock().path.clone()
    }

    pub fn is_persistent(&self) -> bool {
        self.lock().file.is_some()
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.line(message.as_ref());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.line(&format!("ERROR: {}", message.as_ref()));
    }

    /// Logs `context: err` followed by every cause in the source chain.
    pub fn log_error(&self, context: &str, err: &dyn std::error::Error) {
        self.error(format!("{}: {}", context, err));
        let mut source = err.source();
        while let Some(cause) = source {
            self.raw(format!("    caused by: {}", cause));
            source = cause.source();
        }
    }

    pub fn step_ok(&self, step: usize, name: &str, detail: Option<&str>) {
        match detail {
            Some(detail) => self.line(&format!("Step {}: {} OK ({})", step, name, detail)),
            None => self.line(&format!("Step {}: {} OK", step, name)),
        }
    }

    pub fn step_fail(&self, step: usize, name: &str, reason: &str, fix: Option<&str>) {
        self.line(&format!("Step {}: {} FAIL - {}", step, name, reason));
        if let Some(fix) = fix {
            self.raw(format!("    -> {}", fix));
        }
    }

    pub fn step_warn(&self, step: usize, name: &str, message: &str) {
        self.line(&format!("Step {}: {} WARN - {}", step, name, message));
    }

    pub fn step_skip(&self, step: usize, name: &str, reason: &str) {
        self.line(&format!("Step {}: {} SKIP - {}", step, name, reason));
    }

    /// Appends a line without a timestamp.
    pub fn raw(&self, line: impl Into<String>) {
        let line = line.into();
        self.append(&line, line.clone());
    }

    /// The most recent lines of this session, oldest first.
    pub fn session_lines(&self) -> Vec<String> {
        self.lock().lines.iter().cloned().collect()
    }

    fn line(&self, message: &str) {
        self.raw(format!("[{}] {}", Local::now().format("%H:%M:%S"), message));
    }

    fn append(&self, on_disk: &str, remembered: String) {
        let mut inner = self.lock();
        if let Some(file) = inner.file.as_mut() {
            if let Err(e) = writeln!(file, "{}", on_disk).and_then(|_| file.flush()) {
                tracing::warn!("Session log write failed, keeping it in memory: {}", e);
                inner.file = None;
            }
        }
        if inner.lines.len() == MAX_SESSION_LINES {
            inner.lines.pop_front();
        }
        inner.lines.push_back(remembered);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LogInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, thiserror::Error)]
    #[error("outer failure")]
    struct Outer(#[source] std::io::Error);

    fn is_timestamped(line: &str, rest: &str) -> bool {
        // "[HH:MM:SS] "
        line.len() == rest.len() + 11 && line.starts_with('[') && &line[9..11] == "] " && line.ends_with(rest)
    }

    #[test]
    fn test_session_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("error_log.txt");

        let first = SessionLog::open(&path);
        first.info("first session");
        drop(first);

        let second = SessionLog::open(&path);
        assert!(second.is_persistent());
        second.error("boom");

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("========== Session: ").count(), 2);
        assert!(content.contains("] first session"));
        assert!(content.contains("] ERROR: boom"));
    }

    #[test]
    fn test_line_shapes() {
        let log = SessionLog::in_memory();
        log.step_ok(1, "Runtime", Some("linux"));
        log.step_fail(5, "Project assets", "missing skin.png", Some("Reinstall assets"));
        log.step_warn(7, "Access permissions", "read-only");

        let lines = log.session_lines();
        assert!(lines[0].starts_with("========== Session: "));
        assert!(is_timestamped(&lines[1], "Step 1: Runtime OK (linux)"));
        assert!(is_timestamped(&lines[2], "Step 5: Project assets FAIL - missing skin.png"));
        assert_eq!(lines[3], "    -> Reinstall assets");
        assert!(is_timestamped(&lines[4], "Step 7: Access permissions WARN - read-only"));
    }

    #[test]
    fn test_error_chain() {
        let log = SessionLog::in_memory();
        let err = Outer(std::io::Error::new(std::io::ErrorKind::Other, "disk gone"));
        log.log_error("Saving preset", &err);

        let lines = log.session_lines();
        assert!(lines[1].ends_with("ERROR: Saving preset: outer failure"));
        assert_eq!(lines[2], "    caused by: disk gone");
    }

    #[test]
    fn test_memory_keeps_only_recent_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("error_log.txt");
        let log = SessionLog::open(&path);
        for i in 0..MAX_SESSION_LINES + 25 {
            log.raw(format!("[blender] line {}", i));
        }

        let lines = log.session_lines();
        assert_eq!(lines.len(), MAX_SESSION_LINES);
        assert_eq!(lines[0], "[blender] line 25");
        assert_eq!(
            lines.last().map(String::as_str),
            Some(format!("[blender] line {}", MAX_SESSION_LINES + 24).as_str())
        );

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("========== Session: "));
        assert!(content.contains("[blender] line 0\n"));
    }

    #[test]
    fn test_unwritable_path_degrades_to_memory() {
        let dir = tempfile::tempdir().unwrap();
        // a directory cannot be opened for appending
        let log = SessionLog::open(dir.path());
        assert!(!log.is_persistent());
        assert_eq!(log.path(), None);
        log.info("still recorded");
        assert_eq!(log.session_lines().len(), 2);
    }
}
