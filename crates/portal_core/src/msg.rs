use chrono::NaiveDate;

use crate::{
    CompanyData, ExportFormat, FilterField, FormField, Job, JobId, JobKind, LogEntry,
    LookupFailure, NoticeId, Page, ReportData, ReportKind,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Page chosen at load. `today` seeds the default report range.
    Activated {
        page: Page,
        today: NaiveDate,
        logged_in: bool,
    },
    /// Poll timer fired.
    PollTick,
    /// User clicked one of the job run buttons.
    RunJobClicked(JobKind),
    /// The run request finished (the job itself keeps running server-side).
    JobSubmitted(Result<(), String>),
    /// Job list response, carrying the tag of the fetch that produced it.
    JobsLoaded {
        after_submit: bool,
        result: Result<Vec<Job>, String>,
    },
    /// User clicked "view logs" on a job row.
    ViewLogsClicked(JobId),
    LogsLoaded {
        job_id: JobId,
        result: Result<Vec<LogEntry>, String>,
    },
    /// User edited a report filter input.
    FilterChanged {
        kind: ReportKind,
        field: FilterField,
        value: String,
    },
    SearchClicked(ReportKind),
    ReportLoaded {
        kind: ReportKind,
        url: String,
        result: Result<ReportData, String>,
    },
    ExportClicked {
        kind: ReportKind,
        format: ExportFormat,
    },
    ExportFinished {
        kind: ReportKind,
        result: Result<String, String>,
    },
    /// User edited the identifier input box.
    IdentifierChanged(String),
    /// User edited a registration form field directly.
    FormFieldEdited { field: FormField, value: String },
    LookupClicked,
    LookupCompleted(Result<CompanyData, LookupFailure>),
    NoticeExpired(NoticeId),
    /// Token state changed (login/logout).
    AuthChanged { logged_in: bool },
    /// User acknowledged the open alert.
    AlertDismissed,
    /// Fallback for placeholder wiring.
    NoOp,
}

impl Msg {
    /// Messages that originate from user input rather than from I/O.
    pub(crate) fn is_user_action(&self) -> bool {
        matches!(
            self,
            Msg::RunJobClicked(_)
                | Msg::ViewLogsClicked(_)
                | Msg::FilterChanged { .. }
                | Msg::SearchClicked(_)
                | Msg::ExportClicked { .. }
                | Msg::IdentifierChanged(_)
                | Msg::FormFieldEdited { .. }
                | Msg::LookupClicked
        )
    }
}
