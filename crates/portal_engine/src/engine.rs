use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use portal_logging::{portal_debug, portal_info};

use crate::backend::{LookupOutcome, PortalBackend};
use crate::export::{ExportError, ExportWriter};
use crate::poll::PollTimer;
use crate::types::ApiError;
use crate::wire::{ItemsReport, JobRecord, LogRecord, RunAck, SalesSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportSource {
    ItemsSold,
    SalesSummary,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportPayload {
    Items(ItemsReport),
    Summary(SalesSummary),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    StartPolling { period: Duration },
    StopPolling,
    /// `after_submit` is echoed back on the matching `JobsLoaded`.
    FetchJobs { after_submit: bool },
    FetchLogs { job_id: String },
    SubmitJob { job_type: String },
    FetchReport { source: ReportSource, url: String },
    Download {
        source: ReportSource,
        url: String,
        file_name: String,
    },
    Lookup { cnpj: String },
}

#[derive(Debug)]
pub enum EngineEvent {
    PollTick,
    JobsLoaded {
        after_submit: bool,
        result: Result<Vec<JobRecord>, ApiError>,
    },
    LogsLoaded {
        job_id: String,
        result: Result<Vec<LogRecord>, ApiError>,
    },
    JobSubmitted(Result<RunAck, ApiError>),
    ReportLoaded {
        source: ReportSource,
        url: String,
        result: Result<ReportPayload, ApiError>,
    },
    ExportSaved {
        source: ReportSource,
        file_name: String,
        result: Result<PathBuf, ExportError>,
    },
    LookupFinished(Result<LookupOutcome, ApiError>),
}

/// Receives engine events on the engine thread.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Runs requests on a background tokio runtime.
///
/// Every request is spawned independently, so responses arrive in completion
/// order. Dropping the handle stops the poll timer and the runtime.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn new(
        backend: Arc<dyn PortalBackend>,
        exports: ExportWriter,
        sink: Arc<dyn EventSink>,
    ) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .thread_name("portal-engine")
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();

        thread::spawn(move || {
            let _guard = runtime.enter();
            let mut timer = PollTimer::new();
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::StartPolling { period } => {
                        let sink = sink.clone();
                        portal_info!("Polling every {:?}", period);
                        timer.start(period, move || sink.emit(EngineEvent::PollTick));
                    }
                    EngineCommand::StopPolling => {
                        timer.cancel();
                    }
                    command => {
                        let backend = backend.clone();
                        let exports = exports.clone();
                        let sink = sink.clone();
                        runtime.spawn(async move {
                            let event = handle_command(backend.as_ref(), &exports, command).await;
                            if let Some(event) = event {
                                sink.emit(event);
                            }
                        });
                    }
                }
            }
            portal_debug!("Engine command channel closed");
            timer.cancel();
        });

        Ok(Self { cmd_tx })
    }

    pub fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }
}

async fn handle_command(
    backend: &dyn PortalBackend,
    exports: &ExportWriter,
    command: EngineCommand,
) -> Option<EngineEvent> {
    let event = match command {
        EngineCommand::FetchJobs { after_submit } => EngineEvent::JobsLoaded {
            after_submit,
            result: backend.list_jobs().await,
        },
        EngineCommand::FetchLogs { job_id } => {
            let result = backend.job_logs(&job_id).await;
            EngineEvent::LogsLoaded { job_id, result }
        }
        EngineCommand::SubmitJob { job_type } => {
            EngineEvent::JobSubmitted(backend.run_job(&job_type).await)
        }
        EngineCommand::FetchReport { source, url } => {
            let result = match source {
                ReportSource::ItemsSold => backend.items_report(&url).await.map(ReportPayload::Items),
                ReportSource::SalesSummary => {
                    backend.sales_summary(&url).await.map(ReportPayload::Summary)
                }
            };
            EngineEvent::ReportLoaded {
                source,
                url,
                result,
            }
        }
        EngineCommand::Download {
            source,
            url,
            file_name,
        } => {
            let result = match backend.download(&url).await {
                Ok(bytes) => exports.save(&file_name, &bytes),
                Err(err) => Err(ExportError::from(err)),
            };
            EngineEvent::ExportSaved {
                source,
                file_name,
                result,
            }
        }
        EngineCommand::Lookup { cnpj } => {
            EngineEvent::LookupFinished(backend.lookup_company(&cnpj).await)
        }
        EngineCommand::StartPolling { .. } | EngineCommand::StopPolling => return None,
    };
    Some(event)
}
