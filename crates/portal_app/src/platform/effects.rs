use std::sync::mpsc;
use std::thread;

use portal_core::{
    CompanyData, CustomerRow, Effect, ItemRow, Job, JobId, JobStatus, LogEntry, LookupFailure,
    Msg, ReportData, ReportKind, SalesTotals,
};
use portal_engine::{
    CompanyRecord, EngineCommand, EngineEvent, EngineHandle, EventSink, JobRecord, LogRecord,
    LookupOutcome, ReportPayload, ReportSource,
};
use portal_logging::{portal_debug, portal_info, portal_warn};

/// Turns core effects into engine commands.
pub struct EffectRunner {
    engine: EngineHandle,
    msg_tx: mpsc::Sender<Msg>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, msg_tx: mpsc::Sender<Msg>) -> Self {
        Self { engine, msg_tx }
    }

    /// Cancels the poll timer before the app exits.
    pub fn shutdown(&self) {
        portal_debug!("Stopping the poll timer");
        self.engine.send(EngineCommand::StopPolling);
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartPolling { period } => {
                    self.engine.send(EngineCommand::StartPolling { period });
                }
                Effect::FetchJobs { after_submit } => {
                    self.engine.send(EngineCommand::FetchJobs { after_submit });
                }
                Effect::FetchLogs { job_id } => self.engine.send(EngineCommand::FetchLogs {
                    job_id: job_id.as_str().to_string(),
                }),
                Effect::SubmitJob { kind } => {
                    portal_info!("Submitting job {}", kind.as_str());
                    self.engine.send(EngineCommand::SubmitJob {
                        job_type: kind.as_str().to_string(),
                    });
                }
                Effect::FetchReport { kind, url } => {
                    portal_debug!("FetchReport {:?} url={}", kind, url);
                    self.engine.send(EngineCommand::FetchReport {
                        source: source_for(kind),
                        url,
                    });
                }
                Effect::DownloadExport { kind, format, url } => {
                    let file_name = format!("{}.{}", kind.file_stem(), format.as_str());
                    portal_info!("Downloading {} from {}", file_name, url);
                    self.engine.send(EngineCommand::Download {
                        source: source_for(kind),
                        url,
                        file_name,
                    });
                }
                Effect::LookupCompany { cnpj } => self.engine.send(EngineCommand::Lookup {
                    cnpj: cnpj.as_str().to_string(),
                }),
                Effect::DismissNoticeAfter { id, delay } => {
                    let msg_tx = self.msg_tx.clone();
                    thread::spawn(move || {
                        thread::sleep(delay);
                        let _ = msg_tx.send(Msg::NoticeExpired(id));
                    });
                }
            }
        }
    }
}

/// Forwards engine events into the app loop as messages.
pub struct MsgSink {
    msg_tx: mpsc::Sender<Msg>,
}

impl MsgSink {
    pub fn new(msg_tx: mpsc::Sender<Msg>) -> Self {
        Self { msg_tx }
    }
}

impl EventSink for MsgSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.msg_tx.send(event_to_msg(event));
    }
}

fn event_to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::PollTick => Msg::PollTick,
        EngineEvent::JobsLoaded {
            after_submit,
            result,
        } => Msg::JobsLoaded {
            after_submit,
            result: result
                .map(|records| records.into_iter().map(job_from_record).collect())
                .map_err(|err| err.to_string()),
        },
        EngineEvent::LogsLoaded { job_id, result } => Msg::LogsLoaded {
            job_id: JobId::new(job_id),
            result: result
                .map(|records| records.into_iter().map(log_from_record).collect())
                .map_err(|err| err.to_string()),
        },
        EngineEvent::JobSubmitted(result) => Msg::JobSubmitted(
            result
                .inspect(|ack| {
                    portal_debug!("Job accepted id={:?} status={:?}", ack.id, ack.status);
                })
                .map(|_| ())
                .map_err(|err| err.to_string()),
        ),
        EngineEvent::ReportLoaded {
            source,
            url,
            result,
        } => Msg::ReportLoaded {
            kind: kind_for(source),
            url,
            result: result.map(report_from_payload).map_err(|err| err.to_string()),
        },
        EngineEvent::ExportSaved {
            source,
            file_name,
            result,
        } => Msg::ExportFinished {
            kind: kind_for(source),
            result: match result {
                Ok(path) => Ok(path.display().to_string()),
                Err(err) => {
                    portal_warn!("Export {} failed: {}", file_name, err);
                    Err(err.to_string())
                }
            },
        },
        EngineEvent::LookupFinished(result) => Msg::LookupCompleted(match result {
            Ok(LookupOutcome::Found(record)) => Ok(company_from_record(record)),
            Ok(LookupOutcome::Rejected { message }) => Err(LookupFailure { message }),
            Err(err) => {
                portal_warn!("Lookup request failed: {err}");
                Err(LookupFailure { message: None })
            }
        }),
    }
}

fn source_for(kind: ReportKind) -> ReportSource {
    match kind {
        ReportKind::ItemsSold => ReportSource::ItemsSold,
        ReportKind::SalesSummary => ReportSource::SalesSummary,
    }
}

fn kind_for(source: ReportSource) -> ReportKind {
    match source {
        ReportSource::ItemsSold => ReportKind::ItemsSold,
        ReportSource::SalesSummary => ReportKind::SalesSummary,
    }
}

fn job_from_record(record: JobRecord) -> Job {
    Job {
        id: JobId::new(record.id),
        name: record.name,
        kind: record.job_type,
        status: JobStatus::parse(&record.status),
        progress: record.progress.clamp(0.0, 100.0).round() as u8,
        started_at: record.started_at,
    }
}

fn log_from_record(record: LogRecord) -> LogEntry {
    LogEntry {
        ts: record.ts,
        level: record.level,
        message: record.message,
    }
}

fn count(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

fn report_from_payload(payload: ReportPayload) -> ReportData {
    match payload {
        ReportPayload::Items(report) => ReportData::Items(
            report
                .items
                .into_iter()
                .map(|item| ItemRow {
                    sku: item.sku,
                    description: item.description,
                    quantity: item.quantity,
                    value: item.value,
                })
                .collect(),
        ),
        ReportPayload::Summary(summary) => ReportData::Summary {
            totals: SalesTotals {
                orders: count(summary.totals.orders),
                total_sold: summary.totals.total_sold,
                average_ticket: summary.totals.average_ticket,
            },
            customers: summary
                .customers
                .into_iter()
                .map(|row| CustomerRow {
                    customer: row.customer,
                    orders: count(row.orders),
                    total: row.total,
                })
                .collect(),
        },
    }
}

fn company_from_record(record: CompanyRecord) -> CompanyData {
    CompanyData {
        trade_name: record.nome_fantasia,
        legal_name: record.razao_social,
        city: record.municipio,
        region: record.uf,
        postal_code: record.cep,
        street: record.logradouro,
        number: record.numero,
        complement: record.complemento,
        district: record.bairro,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_engine::{
        ApiError, CustomerRecord, ItemRecord, ItemsReport, Method, RunAck, SalesSummary,
        SummaryTotals,
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn job_progress_is_clamped() {
        let job = job_from_record(JobRecord {
            id: "j".into(),
            name: "n".into(),
            job_type: "sankhya_demo".into(),
            status: "weird".into(),
            progress: 140.0,
            started_at: None,
        });
        assert_eq!(job.progress, 100);
        assert_eq!(job.status, JobStatus::Unknown("weird".into()));
    }

    #[test]
    fn transport_failure_becomes_generic_lookup_failure() {
        let msg = event_to_msg(EngineEvent::LookupFinished(Err(ApiError::Timeout {
            method: Method::Get,
            url: "/api/cnpj/lookup/".into(),
        })));
        assert_eq!(msg, Msg::LookupCompleted(Err(LookupFailure { message: None })));
    }

    #[test]
    fn rejected_lookup_keeps_server_text() {
        let msg = event_to_msg(EngineEvent::LookupFinished(Ok(LookupOutcome::Rejected {
            message: Some("CNPJ não encontrado".into()),
        })));
        assert_eq!(
            msg,
            Msg::LookupCompleted(Err(LookupFailure {
                message: Some("CNPJ não encontrado".into())
            }))
        );
    }

    #[test]
    fn report_payloads_map_to_rows() {
        let items = report_from_payload(ReportPayload::Items(ItemsReport {
            items: vec![ItemRecord {
                sku: "SKU-1".into(),
                description: "Parafuso".into(),
                quantity: 3.0,
                value: 10.5,
            }],
        }));
        assert_eq!(
            items,
            ReportData::Items(vec![ItemRow {
                sku: "SKU-1".into(),
                description: "Parafuso".into(),
                quantity: 3.0,
                value: 10.5,
            }])
        );

        let summary = report_from_payload(ReportPayload::Summary(SalesSummary {
            totals: SummaryTotals {
                orders: 2.0,
                total_sold: 300.0,
                average_ticket: 150.0,
            },
            customers: vec![CustomerRecord {
                customer: "ACME".into(),
                orders: 2.0,
                total: 300.0,
            }],
        }));
        let ReportData::Summary { totals, customers } = summary else {
            panic!("expected summary");
        };
        assert_eq!(totals.orders, 2);
        assert_eq!(customers[0].customer, "ACME");
    }

    #[test]
    fn http_failure_text_reaches_the_view() {
        let msg = event_to_msg(EngineEvent::JobsLoaded {
            after_submit: false,
            result: Err(ApiError::HttpStatus {
                method: Method::Get,
                status: 500,
                url: "/api/jobs/".into(),
                body: None,
            }),
        });
        assert_eq!(
            msg,
            Msg::JobsLoaded {
                after_submit: false,
                result: Err("GET /api/jobs/: 500".into()),
            }
        );
    }

    #[test]
    fn submission_tag_survives_the_round_trip() {
        let msg = event_to_msg(EngineEvent::JobsLoaded {
            after_submit: true,
            result: Ok(Vec::new()),
        });
        assert_eq!(
            msg,
            Msg::JobsLoaded {
                after_submit: true,
                result: Ok(Vec::new()),
            }
        );
    }

    #[test]
    fn accepted_submission_becomes_unit_success() {
        let msg = event_to_msg(EngineEvent::JobSubmitted(Ok(RunAck {
            id: Some("abc".into()),
            status: Some("queued".into()),
        })));
        assert_eq!(msg, Msg::JobSubmitted(Ok(())));
    }
}
