use chrono::{Datelike, NaiveDate};
use portal_logging::portal_debug;
use url::form_urlencoded;

/// Row limit for the items report when the filter is blank.
pub const DEFAULT_TOP: u32 = 20;

/// Customers plotted on the sales summary chart.
pub const SUMMARY_CHART_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReportKind {
    ItemsSold,
    SalesSummary,
}

impl ReportKind {
    pub fn path(self) -> &'static str {
        match self {
            ReportKind::ItemsSold => "/api/relatorios/itens-mais-vendidos/",
            ReportKind::SalesSummary => "/api/relatorios/vendas-resumo/",
        }
    }

    pub fn export_formats(self) -> &'static [ExportFormat] {
        match self {
            ReportKind::ItemsSold => &[ExportFormat::Csv, ExportFormat::Xlsx],
            ReportKind::SalesSummary => &[ExportFormat::Csv, ExportFormat::Xlsx, ExportFormat::Pdf],
        }
    }

    /// Base name used for downloaded exports.
    pub fn file_stem(self) -> &'static str {
        match self {
            ReportKind::ItemsSold => "itens_mais_vendidos",
            ReportKind::SalesSummary => "vendas_resumo",
        }
    }

    pub fn chart_kind(self) -> ChartKind {
        match self {
            ReportKind::ItemsSold => ChartKind::Bar,
            ReportKind::SalesSummary => ChartKind::Doughnut,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Csv,
    Xlsx,
    Pdf,
}

impl ExportFormat {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "xlsx" => Some(ExportFormat::Xlsx),
            "pdf" => Some(ExportFormat::Pdf),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Pdf => "pdf",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    From,
    To,
    Top,
}

/// Report filters as typed by the user. Empty dates mean "unbounded".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFilters {
    pub from: String,
    pub to: String,
    pub top: u32,
}

impl Default for ReportFilters {
    fn default() -> Self {
        Self {
            from: String::new(),
            to: String::new(),
            top: DEFAULT_TOP,
        }
    }
}

impl ReportFilters {
    /// Filters spanning the calendar month that contains `today`.
    pub fn current_month(today: NaiveDate) -> Self {
        let (first, last) = month_bounds(today);
        Self {
            from: first.format("%Y-%m-%d").to_string(),
            to: last.format("%Y-%m-%d").to_string(),
            top: DEFAULT_TOP,
        }
    }

    pub(crate) fn set(&mut self, field: FilterField, value: &str) {
        let value = value.trim();
        match field {
            FilterField::From => self.from = value.to_string(),
            FilterField::To => self.to = value.to_string(),
            FilterField::Top => {
                self.top = match value.parse::<u32>() {
                    Ok(top) if top > 0 => top,
                    _ => {
                        portal_debug!("top filter {:?} not usable, using {}", value, DEFAULT_TOP);
                        DEFAULT_TOP
                    }
                }
            }
        }
    }
}

/// First and last day of the month containing `today`.
pub fn month_bounds(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = today.with_day(1).unwrap_or(today);
    let (year, month) = if today.month() == 12 {
        (today.year() + 1, 1)
    } else {
        (today.year(), today.month() + 1)
    };
    let last = NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .unwrap_or(today);
    (first, last)
}

/// Relative URL (path + query) for a report request.
pub fn query_url(kind: ReportKind, filters: &ReportFilters) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("de", &filters.from);
    query.append_pair("ate", &filters.to);
    if kind == ReportKind::ItemsSold {
        query.append_pair("top", &filters.top.to_string());
    }
    format!("{}?{}", kind.path(), query.finish())
}

/// The same request with `format=` appended; existing parameters are untouched.
pub fn export_url(query_url: &str, format: ExportFormat) -> String {
    let separator = if query_url.contains('?') { '&' } else { '?' };
    format!("{query_url}{separator}format={}", format.as_str())
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemRow {
    pub sku: String,
    pub description: String,
    pub quantity: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRow {
    pub customer: String,
    pub orders: u64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SalesTotals {
    pub orders: u64,
    pub total_sold: f64,
    pub average_ticket: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportData {
    Items(Vec<ItemRow>),
    Summary {
        totals: SalesTotals,
        customers: Vec<CustomerRow>,
    },
}

impl ReportData {
    pub fn kind(&self) -> ReportKind {
        match self {
            ReportData::Items(_) => ReportKind::ItemsSold,
            ReportData::Summary { .. } => ReportKind::SalesSummary,
        }
    }

    pub fn chart(&self) -> ChartSpec {
        match self {
            ReportData::Items(rows) => ChartSpec {
                kind: ChartKind::Bar,
                labels: rows.iter().map(|row| row.sku.clone()).collect(),
                values: rows.iter().map(|row| row.quantity).collect(),
            },
            ReportData::Summary { customers, .. } => {
                let top = customers.iter().take(SUMMARY_CHART_LIMIT);
                ChartSpec {
                    kind: ChartKind::Doughnut,
                    labels: top.clone().map(|row| row.customer.clone()).collect(),
                    values: top.map(|row| row.total).collect(),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Doughnut,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartSpec {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// The chart currently drawn for a view. `generation` changes every redraw.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartInstance {
    pub generation: u64,
    pub spec: ChartSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReportStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportState {
    pub(crate) kind: ReportKind,
    pub(crate) filters: ReportFilters,
    pub(crate) data: Option<ReportData>,
    pub(crate) chart: Option<ChartInstance>,
    pub(crate) export_base: Option<String>,
    pub(crate) status: ReportStatus,
    next_generation: u64,
}

impl ReportState {
    pub fn new(kind: ReportKind) -> Self {
        Self {
            kind,
            filters: ReportFilters::default(),
            data: None,
            chart: None,
            export_base: None,
            status: ReportStatus::Idle,
            next_generation: 1,
        }
    }

    pub fn filters(&self) -> &ReportFilters {
        &self.filters
    }

    pub fn chart(&self) -> Option<&ChartInstance> {
        self.chart.as_ref()
    }

    /// Query URL the export actions are currently bound to.
    pub fn export_base(&self) -> Option<&str> {
        self.export_base.as_deref()
    }

    pub(crate) fn apply_data(&mut self, url: String, data: ReportData) {
        let spec = data.chart();
        if let Some(previous) = self.chart.take() {
            portal_debug!(
                "{:?}: dropping chart #{} before redraw",
                self.kind,
                previous.generation
            );
        }
        self.chart = Some(ChartInstance {
            generation: self.next_generation,
            spec,
        });
        self.next_generation += 1;
        self.data = Some(data);
        self.export_base = Some(url);
        self.status = ReportStatus::Loaded;
    }
}
