use crate::jobs::JobsState;
use crate::lookup::{LookupForm, LookupState};
use crate::notice::NoticeBoard;
use crate::report::{ReportKind, ReportState};
use crate::view_model::{self, AppViewModel};

/// Which view the app was opened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Dashboard,
    ItemsReport,
    SalesSummary,
    Jobs,
    Lookup,
}

impl Page {
    /// Maps a page-identity flag to a page. Unknown flags fall back to the dashboard.
    pub fn from_flag(flag: &str) -> Self {
        match flag.trim() {
            "itens" => Page::ItemsReport,
            "resumo" => Page::SalesSummary,
            "jobs" => Page::Jobs,
            "lookup" | "cnpj" => Page::Lookup,
            _ => Page::Dashboard,
        }
    }

    pub fn report_kind(self) -> Option<ReportKind> {
        match self {
            Page::ItemsReport => Some(ReportKind::ItemsSold),
            Page::SalesSummary => Some(ReportKind::SalesSummary),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub(crate) page: Page,
    pub(crate) logged_in: bool,
    pub(crate) jobs: JobsState,
    pub(crate) items: ReportState,
    pub(crate) summary: ReportState,
    pub(crate) lookup: LookupState,
    pub(crate) notices: NoticeBoard,
    /// Open blocking error. User actions are ignored until dismissed.
    pub(crate) alert: Option<String>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            page: Page::default(),
            logged_in: false,
            jobs: JobsState::default(),
            items: ReportState::new(ReportKind::ItemsSold),
            summary: ReportState::new(ReportKind::SalesSummary),
            lookup: LookupState::default(),
            notices: NoticeBoard::default(),
            alert: None,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State whose registration form only has the given fields.
    pub fn with_lookup_form(form: LookupForm) -> Self {
        Self {
            lookup: LookupState::with_form(form),
            ..Self::default()
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn jobs(&self) -> &JobsState {
        &self.jobs
    }

    pub fn lookup(&self) -> &LookupState {
        &self.lookup
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn report(&self, kind: ReportKind) -> &ReportState {
        match kind {
            ReportKind::ItemsSold => &self.items,
            ReportKind::SalesSummary => &self.summary,
        }
    }

    pub(crate) fn report_mut(&mut self, kind: ReportKind) -> &mut ReportState {
        match kind {
            ReportKind::ItemsSold => &mut self.items,
            ReportKind::SalesSummary => &mut self.summary,
        }
    }

    pub fn view(&self) -> AppViewModel {
        view_model::build(self, self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
