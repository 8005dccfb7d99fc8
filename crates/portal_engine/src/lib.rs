//! Portal engine: HTTP API access, token storage and effect execution.
mod backend;
mod client;
mod engine;
mod export;
mod persist;
mod poll;
mod token_store;
mod types;
mod wire;

pub use backend::{
    job_logs_path, HttpBackend, LookupOutcome, PortalBackend, JOBS_PATH, LOOKUP_PATH,
    RUN_JOB_PATH,
};
pub use client::{ApiClient, ClientSettings};
pub use engine::{
    ChannelEventSink, EngineCommand, EngineEvent, EngineHandle, EventSink, ReportPayload,
    ReportSource,
};
pub use export::{ExportError, ExportWriter};
pub use persist::{ensure_dir, AtomicFileWriter, PersistError};
pub use poll::PollTimer;
pub use token_store::{
    is_logged_in, token_or_empty, FileTokenStore, MemoryTokenStore, StorageUnavailable,
    TokenStore, SESSION_FILENAME,
};
pub use types::{ApiError, Method};
pub use wire::{
    CompanyRecord, CustomerRecord, ItemRecord, ItemsReport, JobRecord, LogRecord, RunAck,
    SalesSummary, SummaryTotals,
};
