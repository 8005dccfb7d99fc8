use std::fmt;
use std::time::Duration;

use chrono::{DateTime, FixedOffset};

/// Fixed period between job list / log refreshes.
pub const POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Backend job identifier (a UUID string on the wire; kept opaque here).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Job types the portal offers a button for. Anything else is passed through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobKind {
    SankhyaDemo,
    FullLoadDemo,
    Other(String),
}

impl JobKind {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "sankhya_demo" => JobKind::SankhyaDemo,
            "full_load_demo" => JobKind::FullLoadDemo,
            other => JobKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobKind::SankhyaDemo => "sankhya_demo",
            JobKind::FullLoadDemo => "full_load_demo",
            JobKind::Other(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    Running,
    Success,
    Error,
    Unknown(String),
}

impl JobStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "queued" => JobStatus::Queued,
            "running" => JobStatus::Running,
            "success" => JobStatus::Success,
            "error" => JobStatus::Error,
            other => JobStatus::Unknown(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Success => "success",
            JobStatus::Error => "error",
            JobStatus::Unknown(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    pub name: String,
    pub kind: String,
    pub status: JobStatus,
    /// 0..=100, clamped on ingest.
    pub progress: u8,
    pub started_at: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub ts: DateTime<FixedOffset>,
    pub level: String,
    pub message: String,
}

/// Status indicator shown next to the job buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobsBadge {
    #[default]
    Idle,
    Running,
    Ready,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogPanel {
    #[default]
    Empty,
    Loading,
    Entries(Vec<LogEntry>),
}

/// Per-view state of the jobs page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobsState {
    pub(crate) jobs: Vec<Job>,
    pub(crate) selected: Option<JobId>,
    pub(crate) logs: LogPanel,
    pub(crate) badge: JobsBadge,
    /// Consecutive failed job-list polls.
    pub(crate) job_failures: u32,
    /// Consecutive failed log polls for the current selection.
    pub(crate) log_failures: u32,
}

impl JobsState {
    pub fn selected(&self) -> Option<&JobId> {
        self.selected.as_ref()
    }

    pub(crate) fn select(&mut self, job_id: JobId) {
        self.selected = Some(job_id);
        self.logs = LogPanel::Loading;
        self.log_failures = 0;
    }

    pub(crate) fn replace_jobs(&mut self, jobs: Vec<Job>) {
        self.jobs = jobs;
        self.job_failures = 0;
    }

    /// Stores the log window newest-first. Ties keep the server order.
    pub(crate) fn replace_logs(&mut self, mut entries: Vec<LogEntry>) {
        entries.sort_by(|a, b| b.ts.cmp(&a.ts));
        self.logs = LogPanel::Entries(entries);
        self.log_failures = 0;
    }

    pub(crate) fn record_job_failure(&mut self) -> u32 {
        self.job_failures = self.job_failures.saturating_add(1);
        self.job_failures
    }

    pub(crate) fn record_log_failure(&mut self) -> u32 {
        self.log_failures = self.log_failures.saturating_add(1);
        self.log_failures
    }
}
