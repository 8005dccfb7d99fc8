use std::time::Duration;

use crate::{Cnpj, ExportFormat, JobId, JobKind, NoticeId, ReportKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Cancel any running poll timer and start a fresh one.
    StartPolling { period: Duration },
    /// `after_submit` tags the refresh that follows a job submission.
    FetchJobs { after_submit: bool },
    FetchLogs { job_id: JobId },
    SubmitJob { kind: JobKind },
    FetchReport { kind: ReportKind, url: String },
    DownloadExport {
        kind: ReportKind,
        format: ExportFormat,
        url: String,
    },
    LookupCompany { cnpj: Cnpj },
    DismissNoticeAfter { id: NoticeId, delay: Duration },
}
