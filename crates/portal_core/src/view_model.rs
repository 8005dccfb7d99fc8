use chrono::{DateTime, FixedOffset};

use crate::jobs::{JobsBadge, LogPanel};
use crate::report::{
    ChartInstance, CustomerRow, ExportFormat, ItemRow, ReportData, ReportFilters, ReportKind,
    ReportState, ReportStatus, SalesTotals,
};
use crate::{AppState, FormField, JobId, LogEntry, Notice, Page};

#[derive(Debug, Clone, PartialEq)]
pub struct AppViewModel {
    pub page: Page,
    pub logged_in: bool,
    pub alert: Option<String>,
    pub notices: Vec<Notice>,
    pub jobs: JobsView,
    pub items: ReportView,
    pub summary: ReportView,
    pub lookup: LookupView,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobsView {
    pub rows: Vec<JobRowView>,
    pub selected: Option<JobId>,
    pub logs: LogPanelView,
    pub badge: JobsBadge,
    /// Set while job-list polls keep failing and the table may be out of date.
    pub stale: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRowView {
    pub job_id: JobId,
    pub name: String,
    pub kind: String,
    pub status: String,
    pub progress: u8,
    pub started_at: Option<DateTime<FixedOffset>>,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogPanelView {
    pub placeholder: Option<&'static str>,
    /// Newest first.
    pub entries: Vec<LogEntry>,
    pub scroll_to_end: bool,
    /// Set while log polls for the selected job keep failing.
    pub stale: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportView {
    pub kind: ReportKind,
    pub filters: ReportFilters,
    pub items: Vec<ItemRow>,
    pub customers: Vec<CustomerRow>,
    pub totals: Option<SalesTotals>,
    pub chart: Option<ChartInstance>,
    /// Export actions available; empty until the first successful load.
    pub exports: Vec<ExportFormat>,
    pub status: ReportStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupView {
    pub input: String,
    pub trigger_label: &'static str,
    pub trigger_enabled: bool,
    pub fields: Vec<(FormField, String)>,
}

pub(crate) fn build(state: &AppState, dirty: bool) -> AppViewModel {
    AppViewModel {
        page: state.page,
        logged_in: state.logged_in,
        alert: state.alert.clone(),
        notices: state.notices.notices().to_vec(),
        jobs: jobs_view(state),
        items: report_view(&state.items),
        summary: report_view(&state.summary),
        lookup: LookupView {
            input: state.lookup.input.clone(),
            trigger_label: state.lookup.trigger_label(),
            trigger_enabled: !state.lookup.in_flight,
            fields: state
                .lookup
                .form
                .fields()
                .map(|(field, value)| (field, value.to_string()))
                .collect(),
        },
        dirty,
    }
}

fn jobs_view(state: &AppState) -> JobsView {
    let jobs = &state.jobs;
    let rows = jobs
        .jobs
        .iter()
        .map(|job| JobRowView {
            job_id: job.id.clone(),
            name: job.name.clone(),
            kind: job.kind.clone(),
            status: job.status.label().to_string(),
            progress: job.progress,
            started_at: job.started_at,
            selected: jobs.selected.as_ref() == Some(&job.id),
        })
        .collect();

    let logs = match &jobs.logs {
        LogPanel::Empty => LogPanelView {
            placeholder: None,
            entries: Vec::new(),
            scroll_to_end: false,
            stale: false,
        },
        LogPanel::Loading => LogPanelView {
            placeholder: Some("(loading logs...)"),
            entries: Vec::new(),
            scroll_to_end: false,
            stale: jobs.log_failures > 0,
        },
        LogPanel::Entries(entries) => LogPanelView {
            placeholder: None,
            entries: entries.clone(),
            scroll_to_end: true,
            stale: jobs.log_failures > 0,
        },
    };

    JobsView {
        rows,
        selected: jobs.selected.clone(),
        logs,
        badge: jobs.badge,
        stale: jobs.job_failures > 0,
    }
}

fn report_view(report: &ReportState) -> ReportView {
    let (items, customers, totals) = match &report.data {
        Some(ReportData::Items(rows)) => (rows.clone(), Vec::new(), None),
        Some(ReportData::Summary { totals, customers }) => {
            (Vec::new(), customers.clone(), Some(totals.clone()))
        }
        None => (Vec::new(), Vec::new(), None),
    };
    let exports = if report.export_base.is_some() {
        report.kind.export_formats().to_vec()
    } else {
        Vec::new()
    };
    ReportView {
        kind: report.kind,
        filters: report.filters.clone(),
        items,
        customers,
        totals,
        chart: report.chart.clone(),
        exports,
        status: report.status.clone(),
    }
}
