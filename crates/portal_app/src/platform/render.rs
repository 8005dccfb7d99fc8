//! Plain-text rendering of the view model.

use std::fmt::Write as _;

use chrono::{DateTime, FixedOffset, NaiveDate};
use portal_core::{
    AppViewModel, ChartKind, ChartSpec, JobRowView, JobsBadge, JobsView, LookupView, Page,
    ReportKind, ReportStatus, ReportView, Severity,
};

const BAR_WIDTH: usize = 30;
const PROGRESS_WIDTH: usize = 10;

pub fn render(view: &AppViewModel) -> String {
    let mut out = String::new();
    let auth = if view.logged_in {
        "logged in"
    } else {
        "logged out"
    };
    let _ = writeln!(out, "=== Sales Portal | {} | [{}] ===", page_title(view.page), auth);
    if let Some(alert) = &view.alert {
        let _ = writeln!(out, "!! ALERT: {alert} (type 'ok' to dismiss)");
    }

    for notice in &view.notices {
        let marker = match notice.severity {
            Severity::Info => "*",
            Severity::Error => "!",
        };
        let _ = writeln!(out, "{marker} {}", notice.text);
    }

    match view.page {
        Page::Dashboard => {
            let _ = writeln!(out, "Open a page with --page itens|resumo|jobs|lookup.");
        }
        Page::ItemsReport => render_report(&mut out, &view.items),
        Page::SalesSummary => render_report(&mut out, &view.summary),
        Page::Jobs => render_jobs(&mut out, &view.jobs),
        Page::Lookup => render_lookup(&mut out, &view.lookup),
    }
    out
}

fn page_title(page: Page) -> &'static str {
    match page {
        Page::Dashboard => "Dashboard",
        Page::ItemsReport => "Itens mais vendidos",
        Page::SalesSummary => "Resumo de vendas",
        Page::Jobs => "Jobs",
        Page::Lookup => "Consulta CNPJ",
    }
}

fn render_jobs(out: &mut String, jobs: &JobsView) {
    let badge = match jobs.badge {
        JobsBadge::Idle => "",
        JobsBadge::Running => " [running]",
        JobsBadge::Ready => " [ready]",
        JobsBadge::Failed => " [failed]",
    };
    let stale = if jobs.stale { " (stale)" } else { "" };
    let _ = writeln!(out, "Jobs{badge}{stale}");

    if jobs.rows.is_empty() {
        let _ = writeln!(out, "  (no jobs)");
    }
    for row in &jobs.rows {
        let _ = writeln!(out, "{}", format_job_row(row));
    }

    let Some(selected) = &jobs.selected else {
        return;
    };
    let stale = if jobs.logs.stale { " (stale)" } else { "" };
    let _ = writeln!(out, "--- Logs for {selected}{stale} ---");
    if let Some(placeholder) = jobs.logs.placeholder {
        let _ = writeln!(out, "{placeholder}");
    }
    for entry in &jobs.logs.entries {
        let _ = writeln!(
            out,
            "[{}] {:<7} {}",
            format_timestamp(&entry.ts),
            entry.level,
            entry.message
        );
    }
}

fn format_job_row(job: &JobRowView) -> String {
    let marker = if job.selected { ">" } else { " " };
    let started = job
        .started_at
        .as_ref()
        .map(format_timestamp)
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{marker} {id} | {name} | {kind} | {status} | {bar} | {started}",
        id = job.job_id,
        name = job.name,
        kind = job.kind,
        status = job.status,
        bar = progress_bar(job.progress),
    )
}

fn progress_bar(progress: u8) -> String {
    let percent = usize::from(progress.min(100));
    let filled = percent * PROGRESS_WIDTH / 100;
    format!(
        "[{}{}] {percent:>3}%",
        "#".repeat(filled),
        "-".repeat(PROGRESS_WIDTH - filled)
    )
}

fn render_report(out: &mut String, report: &ReportView) {
    let range = format!(
        "de {} ate {}",
        format_filter_date(&report.filters.from),
        format_filter_date(&report.filters.to)
    );
    match report.kind {
        ReportKind::ItemsSold => {
            let _ = writeln!(out, "Periodo: {range} | top {}", report.filters.top);
        }
        ReportKind::SalesSummary => {
            let _ = writeln!(out, "Periodo: {range}");
        }
    }

    match &report.status {
        ReportStatus::Idle => {}
        ReportStatus::Loading => {
            let _ = writeln!(out, "(carregando...)");
        }
        ReportStatus::Loaded => {}
        ReportStatus::Failed(reason) => {
            let _ = writeln!(out, "! Falha ao carregar: {reason}");
        }
    }

    match report.kind {
        ReportKind::ItemsSold => {
            if report.items.is_empty() && report.status == ReportStatus::Loaded {
                let _ = writeln!(out, "  (sem dados)");
            }
            for row in &report.items {
                let _ = writeln!(
                    out,
                    "  {:<12} {:<30} {:>10} {:>16}",
                    row.sku,
                    row.description,
                    format_decimal(row.quantity, 0),
                    format_brl(row.value)
                );
            }
        }
        ReportKind::SalesSummary => {
            if let Some(totals) = &report.totals {
                let _ = writeln!(
                    out,
                    "Pedidos: {} | Total vendido: {} | Ticket medio: {}",
                    format_thousands(totals.orders),
                    format_brl(totals.total_sold),
                    format_brl(totals.average_ticket)
                );
            }
            if report.customers.is_empty() && report.status == ReportStatus::Loaded {
                let _ = writeln!(out, "  (sem dados)");
            }
            for row in &report.customers {
                let _ = writeln!(
                    out,
                    "  {:<30} {:>8} {:>16}",
                    row.customer,
                    format_thousands(row.orders),
                    format_brl(row.total)
                );
            }
        }
    }

    if let Some(chart) = &report.chart {
        out.push_str(&render_chart(&chart.spec));
    }

    if !report.exports.is_empty() {
        let formats: Vec<&str> = report.exports.iter().map(|format| format.as_str()).collect();
        let _ = writeln!(out, "Exportar: {}", formats.join(" | "));
    }
}

fn render_chart(spec: &ChartSpec) -> String {
    let mut out = String::new();
    if spec.is_empty() {
        return out;
    }
    let label_width = spec
        .labels
        .iter()
        .map(|label| label.chars().count())
        .max()
        .unwrap_or(0)
        .min(24);
    match spec.kind {
        ChartKind::Bar => {
            let max = spec.values.iter().cloned().fold(0.0_f64, f64::max);
            for (label, value) in spec.labels.iter().zip(&spec.values) {
                let width = scaled(*value, max);
                let _ = writeln!(
                    out,
                    "  {:<label_width$} |{} {}",
                    truncate(label, label_width),
                    "#".repeat(width),
                    format_decimal(*value, 0)
                );
            }
        }
        ChartKind::Doughnut => {
            let sum: f64 = spec.values.iter().filter(|value| **value > 0.0).sum();
            for (label, value) in spec.labels.iter().zip(&spec.values) {
                let share = if sum > 0.0 { value.max(0.0) / sum } else { 0.0 };
                let _ = writeln!(
                    out,
                    "  {:<label_width$} ({:>5}%) {}",
                    truncate(label, label_width),
                    format_decimal(share * 100.0, 1),
                    "*".repeat(scaled(share, 1.0))
                );
            }
        }
    }
    out
}

fn scaled(value: f64, max: f64) -> usize {
    if max <= 0.0 || !value.is_finite() || value <= 0.0 {
        return 0;
    }
    ((value / max) * BAR_WIDTH as f64).round() as usize
}

fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

fn render_lookup(out: &mut String, lookup: &LookupView) {
    let trigger = if lookup.trigger_enabled {
        format!("[{}]", lookup.trigger_label)
    } else {
        format!("({})", lookup.trigger_label)
    };
    let _ = writeln!(out, "CNPJ: {} {trigger}", lookup.input);
    for (field, value) in &lookup.fields {
        let _ = writeln!(out, "  {:<12} {}", field.label(), value);
    }
}

fn format_timestamp(ts: &DateTime<FixedOffset>) -> String {
    ts.format("%d/%m/%Y %H:%M:%S").to_string()
}

/// `2024-01-31` is shown as `31/01/2024`; blank means unbounded.
fn format_filter_date(raw: &str) -> String {
    if raw.is_empty() {
        return "-".to_string();
    }
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => date.format("%d/%m/%Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

fn format_thousands(value: u64) -> String {
    group_digits(&value.to_string())
}

/// Inserts `.` every three digits from the right.
fn group_digits(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i != 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// pt-BR number: `.` groups thousands, `,` separates decimals.
fn format_decimal(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed.as_str(), None),
    };
    let grouped = group_digits(int_part);
    let sign = if value < 0.0 && fixed.chars().any(|ch| ch != '0' && ch != '.') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(frac) => format!("{sign}{grouped},{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

fn format_brl(value: f64) -> String {
    format!("R$ {}", format_decimal(value, 2))
}
