//! Operation log for backend tracing
//!
//! Backends record every primitive call while at least one label is active.
//! `log_end` hands back the entries recorded under that label.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Primitive operation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Text,
    Bytes,
    Json,
    Write,
    CreateDirectory,
    CopyFile,
    CopyTree,
    MoveFile,
    MoveTree,
    DeleteFile,
    DeleteTree,
    IsFile,
    IsDirectory,
    Size,
    LastModified,
    List,
    Walk,
}

/// One recorded backend call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub kind: OperationKind,
    pub path: String,
    /// Destination for copy and move operations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Label-scoped recorder shared by the bundled backends
#[derive(Debug, Default)]
pub struct OperationLog {
    sessions: Mutex<HashMap<String, Vec<LogEntry>>>,
}

impl OperationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) recording under `label`.
    pub fn start(&self, label: &str) {
        self.sessions.lock().insert(label.to_string(), Vec::new());
    }

    /// Stop recording under `label`; unknown labels yield nothing.
    pub fn end(&self, label: &str) -> Vec<LogEntry> {
        self.sessions.lock().remove(label).unwrap_or_default()
    }

    pub fn is_active(&self) -> bool {
        !self.sessions.lock().is_empty()
    }

    pub fn record(&self, kind: OperationKind, path: &str) {
        self.push(kind, path, None);
    }

    pub fn record_transfer(&self, kind: OperationKind, source: &str, destination: &str) {
        self.push(kind, source, Some(destination));
    }

    fn push(&self, kind: OperationKind, path: &str, destination: Option<&str>) {
        let mut sessions = self.sessions.lock();
        if sessions.is_empty() {
            return;
        }
        let entry = LogEntry {
            kind,
            path: path.to_string(),
            destination: destination.map(str::to_string),
            timestamp: Utc::now(),
        };
        for entries in sessions.values_mut() {
            entries.push(entry.clone());
        }
    }
}
