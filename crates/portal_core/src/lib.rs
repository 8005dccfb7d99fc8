//! Portal core: pure state machine and view-model helpers.
mod effect;
mod jobs;
mod lookup;
mod msg;
mod notice;
mod report;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use jobs::{Job, JobId, JobKind, JobStatus, JobsBadge, JobsState, LogEntry, POLL_INTERVAL};
pub use lookup::{
    clean_identifier, Cnpj, CompanyData, FormField, InvalidIdentifier, LookupFailure, LookupForm,
    LookupState, IDENTIFIER_LEN, INVALID_IDENTIFIER_MSG, LOOKUP_FAILED_MSG, LOOKUP_SUCCESS_MSG,
    SEARCHING_LABEL, TRIGGER_LABEL,
};
pub use msg::Msg;
pub use notice::{Notice, NoticeId, Severity, NOTICE_TTL};
pub use report::{
    export_url, month_bounds, query_url, ChartInstance, ChartKind, ChartSpec, CustomerRow,
    ExportFormat, FilterField, ItemRow, ReportData, ReportFilters, ReportKind, ReportState,
    ReportStatus, SalesTotals, DEFAULT_TOP, SUMMARY_CHART_LIMIT,
};
pub use state::{AppState, Page};
pub use update::update;
pub use view_model::{AppViewModel, JobRowView, JobsView, LogPanelView, LookupView, ReportView};
