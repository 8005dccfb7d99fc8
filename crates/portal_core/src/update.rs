use chrono::NaiveDate;
use portal_logging::{portal_debug, portal_error, portal_info, portal_warn};

use crate::jobs::{JobsBadge, POLL_INTERVAL};
use crate::lookup::{Cnpj, INVALID_IDENTIFIER_MSG, LOOKUP_SUCCESS_MSG};
use crate::notice::{Severity, NOTICE_TTL};
use crate::report::{export_url, query_url, ReportFilters, ReportKind, ReportStatus};
use crate::{AppState, Effect, Msg, Page};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    if state.alert.is_some() && msg.is_user_action() {
        portal_debug!("Alert open; ignoring {:?}", msg);
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::Activated {
            page,
            today,
            logged_in,
        } => activate(&mut state, page, today, logged_in),
        Msg::PollTick => {
            if state.page != Page::Jobs {
                return (state, Vec::new());
            }
            refresh_effects(&state)
        }
        Msg::RunJobClicked(kind) => {
            state.jobs.badge = JobsBadge::Running;
            state.mark_dirty();
            vec![Effect::SubmitJob { kind }]
        }
        Msg::JobSubmitted(Ok(())) => vec![Effect::FetchJobs { after_submit: true }],
        Msg::JobSubmitted(Err(reason)) => {
            state.jobs.badge = JobsBadge::Failed;
            raise_alert(&mut state, format!("Could not start job: {reason}"));
            Vec::new()
        }
        Msg::JobsLoaded {
            after_submit,
            result: Ok(jobs),
        } => {
            state.jobs.replace_jobs(jobs);
            if after_submit {
                state.jobs.badge = JobsBadge::Ready;
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::JobsLoaded {
            after_submit: true,
            result: Err(reason),
        } => {
            state.jobs.badge = JobsBadge::Failed;
            raise_alert(&mut state, format!("Could not refresh jobs: {reason}"));
            Vec::new()
        }
        Msg::JobsLoaded {
            after_submit: false,
            result: Err(reason),
        } => {
            let failures = state.jobs.record_job_failure();
            portal_warn!("Job list refresh failed ({failures} in a row): {reason}");
            if failures == 1 {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ViewLogsClicked(job_id) => {
            portal_debug!("Selected job {job_id} for log viewing");
            state.jobs.select(job_id.clone());
            state.mark_dirty();
            vec![Effect::FetchLogs { job_id }]
        }
        Msg::LogsLoaded { job_id, result } => {
            if state.jobs.selected() != Some(&job_id) {
                portal_debug!("Discarding logs for job {job_id}; selection moved on");
                return (state, Vec::new());
            }
            match result {
                Ok(entries) => {
                    state.jobs.replace_logs(entries);
                    state.mark_dirty();
                }
                Err(reason) => {
                    let failures = state.jobs.record_log_failure();
                    portal_warn!("Log refresh for job {job_id} failed ({failures} in a row): {reason}");
                    if failures == 1 {
                        state.mark_dirty();
                    }
                }
            }
            Vec::new()
        }
        Msg::FilterChanged { kind, field, value } => {
            state.report_mut(kind).filters.set(field, &value);
            state.mark_dirty();
            Vec::new()
        }
        Msg::SearchClicked(kind) => load_report(&mut state, kind),
        Msg::ReportLoaded { kind, url, result } => {
            match result {
                Ok(data) if data.kind() == kind => {
                    state.report_mut(kind).apply_data(url, data);
                }
                Ok(data) => {
                    portal_warn!("Ignoring {:?} payload delivered for {:?}", data.kind(), kind);
                }
                Err(reason) => {
                    portal_warn!("Loading {:?} from {url} failed: {reason}", kind);
                    state.report_mut(kind).status = ReportStatus::Failed(reason);
                }
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::ExportClicked { kind, format } => {
            let base = state.report(kind).export_base().map(str::to_string);
            match base {
                Some(_) if !kind.export_formats().contains(&format) => {
                    let text = format!("{} export is not offered for this report", format.as_str());
                    vec![notify(&mut state, Severity::Error, text)]
                }
                Some(base) => vec![Effect::DownloadExport {
                    kind,
                    format,
                    url: export_url(&base, format),
                }],
                None => vec![notify(
                    &mut state,
                    Severity::Error,
                    "Load the report before exporting",
                )],
            }
        }
        Msg::ExportFinished { kind, result } => match result {
            Ok(location) => {
                portal_info!("{:?} export saved to {location}", kind);
                vec![notify(&mut state, Severity::Info, format!("Export saved to {location}"))]
            }
            Err(reason) => vec![notify(
                &mut state,
                Severity::Error,
                format!("Export failed: {reason}"),
            )],
        },
        Msg::IdentifierChanged(input) => {
            state.lookup.input = input;
            state.mark_dirty();
            Vec::new()
        }
        Msg::FormFieldEdited { field, value } => {
            if state.lookup.form.set(field, value) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::LookupClicked => {
            if state.lookup.in_flight {
                return (state, Vec::new());
            }
            match Cnpj::parse(&state.lookup.input) {
                Ok(cnpj) => {
                    state.lookup.in_flight = true;
                    state.mark_dirty();
                    vec![Effect::LookupCompany { cnpj }]
                }
                Err(err) => {
                    portal_debug!("Rejected lookup input: {err}");
                    vec![notify(&mut state, Severity::Error, INVALID_IDENTIFIER_MSG)]
                }
            }
        }
        Msg::LookupCompleted(result) => {
            state.lookup.in_flight = false;
            state.mark_dirty();
            match result {
                Ok(data) => {
                    let filled = state.lookup.form.fill(&data);
                    portal_debug!("Lookup filled {} field(s)", filled.len());
                    vec![notify(&mut state, Severity::Info, LOOKUP_SUCCESS_MSG)]
                }
                Err(failure) => {
                    let text = failure.display_text().to_string();
                    vec![notify(&mut state, Severity::Error, text)]
                }
            }
        }
        Msg::NoticeExpired(id) => {
            if state.notices.dismiss(id) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::AuthChanged { logged_in } => {
            state.logged_in = logged_in;
            state.mark_dirty();
            Vec::new()
        }
        Msg::AlertDismissed => {
            if state.alert.take().is_some() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn activate(state: &mut AppState, page: Page, today: NaiveDate, logged_in: bool) -> Vec<Effect> {
    portal_info!("Activating {:?} page", page);
    state.page = page;
    state.logged_in = logged_in;
    state.mark_dirty();

    match page {
        Page::Jobs => {
            let mut effects = refresh_effects(state);
            effects.push(Effect::StartPolling {
                period: POLL_INTERVAL,
            });
            effects
        }
        Page::ItemsReport | Page::SalesSummary => {
            let Some(kind) = page.report_kind() else {
                return Vec::new();
            };
            state.report_mut(kind).filters = ReportFilters::current_month(today);
            load_report(state, kind)
        }
        Page::Lookup | Page::Dashboard => Vec::new(),
    }
}

/// Job list always; logs only when a job is selected.
fn refresh_effects(state: &AppState) -> Vec<Effect> {
    let mut effects = vec![Effect::FetchJobs {
        after_submit: false,
    }];
    if let Some(job_id) = state.jobs.selected() {
        effects.push(Effect::FetchLogs {
            job_id: job_id.clone(),
        });
    }
    effects
}

fn load_report(state: &mut AppState, kind: ReportKind) -> Vec<Effect> {
    let report = state.report_mut(kind);
    let url = query_url(kind, &report.filters);
    report.status = ReportStatus::Loading;
    state.mark_dirty();
    vec![Effect::FetchReport { kind, url }]
}

/// Newest alert replaces any open one.
fn raise_alert(state: &mut AppState, message: String) {
    portal_error!("{message}");
    state.alert = Some(message);
    state.mark_dirty();
}

fn notify(state: &mut AppState, severity: Severity, text: impl Into<String>) -> Effect {
    let id = state.notices.push(severity, text);
    state.mark_dirty();
    Effect::DismissNoticeAfter {
        id,
        delay: NOTICE_TTL,
    }
}
