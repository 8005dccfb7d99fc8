use std::sync::{mpsc, Arc};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use portal_engine::{
    ApiError, ChannelEventSink, CompanyRecord, EngineCommand, EngineEvent, EngineHandle,
    ExportError, ExportWriter, ItemsReport, JobRecord, LogRecord, LookupOutcome, Method,
    PortalBackend, ReportPayload, ReportSource, RunAck, SalesSummary,
};

const WAIT: Duration = Duration::from_secs(5);

struct FakeBackend;

fn job(id: &str) -> JobRecord {
    JobRecord {
        id: id.to_string(),
        name: format!("Job {id}"),
        job_type: "sankhya_demo".to_string(),
        status: "running".to_string(),
        progress: 10.0,
        started_at: None,
    }
}

#[async_trait]
impl PortalBackend for FakeBackend {
    async fn list_jobs(&self) -> Result<Vec<JobRecord>, ApiError> {
        Ok(vec![job("a"), job("b")])
    }

    async fn job_logs(&self, job_id: &str) -> Result<Vec<LogRecord>, ApiError> {
        Err(ApiError::HttpStatus {
            method: Method::Get,
            status: 404,
            url: format!("/api/jobs/{job_id}/logs/"),
            body: None,
        })
    }

    async fn run_job(&self, job_type: &str) -> Result<RunAck, ApiError> {
        Ok(RunAck {
            id: Some(format!("{job_type}-1")),
            status: Some("queued".to_string()),
        })
    }

    async fn items_report(&self, _url: &str) -> Result<ItemsReport, ApiError> {
        Ok(ItemsReport::default())
    }

    async fn sales_summary(&self, _url: &str) -> Result<SalesSummary, ApiError> {
        Ok(SalesSummary::default())
    }

    async fn lookup_company(&self, _cnpj: &str) -> Result<LookupOutcome, ApiError> {
        Ok(LookupOutcome::Found(CompanyRecord {
            uf: "SP".to_string(),
            ..CompanyRecord::default()
        }))
    }

    async fn download(&self, url: &str) -> Result<Bytes, ApiError> {
        if url.contains("format=pdf") {
            return Err(ApiError::Timeout {
                method: Method::Get,
                url: url.to_string(),
            });
        }
        Ok(Bytes::from_static(b"sku;qtd\nSKU-1;3\n"))
    }
}

fn start(exports: &TempDir) -> (EngineHandle, mpsc::Receiver<EngineEvent>) {
    let (tx, rx) = mpsc::channel();
    let engine = EngineHandle::new(
        Arc::new(FakeBackend),
        ExportWriter::new(exports.path()),
        Arc::new(ChannelEventSink::new(tx)),
    )
    .expect("engine runtime");
    (engine, rx)
}

#[test]
fn fetch_jobs_emits_loaded_list() {
    let dir = TempDir::new().unwrap();
    let (engine, rx) = start(&dir);
    engine.send(EngineCommand::FetchJobs { after_submit: true });

    match rx.recv_timeout(WAIT).expect("event") {
        EngineEvent::JobsLoaded {
            after_submit: true,
            result: Ok(jobs),
        } => {
            let ids: Vec<_> = jobs.iter().map(|job| job.id.as_str()).collect();
            assert_eq!(ids, vec!["a", "b"]);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn log_failure_keeps_job_id() {
    let dir = TempDir::new().unwrap();
    let (engine, rx) = start(&dir);
    engine.send(EngineCommand::FetchLogs {
        job_id: "zz".to_string(),
    });

    match rx.recv_timeout(WAIT).expect("event") {
        EngineEvent::LogsLoaded { job_id, result } => {
            assert_eq!(job_id, "zz");
            assert_eq!(result.unwrap_err().status(), Some(404));
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn submit_report_and_lookup_round_trip() {
    let dir = TempDir::new().unwrap();
    let (engine, rx) = start(&dir);

    engine.send(EngineCommand::SubmitJob {
        job_type: "full_load_demo".to_string(),
    });
    match rx.recv_timeout(WAIT).expect("event") {
        EngineEvent::JobSubmitted(Ok(ack)) => {
            assert_eq!(ack.id.as_deref(), Some("full_load_demo-1"))
        }
        other => panic!("unexpected event {other:?}"),
    }

    engine.send(EngineCommand::FetchReport {
        source: ReportSource::SalesSummary,
        url: "/api/relatorios/vendas-resumo/?de=&ate=".to_string(),
    });
    match rx.recv_timeout(WAIT).expect("event") {
        EngineEvent::ReportLoaded {
            source,
            url,
            result,
        } => {
            assert_eq!(source, ReportSource::SalesSummary);
            assert_eq!(url, "/api/relatorios/vendas-resumo/?de=&ate=");
            assert_eq!(
                result.unwrap(),
                ReportPayload::Summary(SalesSummary::default())
            );
        }
        other => panic!("unexpected event {other:?}"),
    }

    engine.send(EngineCommand::Lookup {
        cnpj: "12345678000195".to_string(),
    });
    match rx.recv_timeout(WAIT).expect("event") {
        EngineEvent::LookupFinished(Ok(LookupOutcome::Found(company))) => {
            assert_eq!(company.uf, "SP")
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn download_is_saved_to_export_dir() {
    let dir = TempDir::new().unwrap();
    let (engine, rx) = start(&dir);
    engine.send(EngineCommand::Download {
        source: ReportSource::ItemsSold,
        url: "/api/relatorios/itens-mais-vendidos/?de=&ate=&top=20&format=csv".to_string(),
        file_name: "itens_mais_vendidos.csv".to_string(),
    });

    match rx.recv_timeout(WAIT).expect("event") {
        EngineEvent::ExportSaved {
            source,
            file_name,
            result,
        } => {
            assert_eq!(source, ReportSource::ItemsSold);
            assert_eq!(file_name, "itens_mais_vendidos.csv");
            let path = result.expect("saved");
            assert_eq!(path, dir.path().join("itens_mais_vendidos.csv"));
            assert_eq!(std::fs::read_to_string(path).unwrap(), "sku;qtd\nSKU-1;3\n");
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn failed_download_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let (engine, rx) = start(&dir);
    engine.send(EngineCommand::Download {
        source: ReportSource::SalesSummary,
        url: "/api/relatorios/vendas-resumo/?de=&ate=&format=pdf".to_string(),
        file_name: "vendas_resumo.pdf".to_string(),
    });

    match rx.recv_timeout(WAIT).expect("event") {
        EngineEvent::ExportSaved { result, .. } => {
            assert!(matches!(result, Err(ExportError::Download(ApiError::Timeout { .. }))));
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(!dir.path().join("vendas_resumo.pdf").exists());
}

#[test]
fn export_names_cannot_escape_the_directory() {
    let dir = TempDir::new().unwrap();
    let writer = ExportWriter::new(dir.path());
    let path = writer.save("../../etc/report.csv", b"x").unwrap();
    assert_eq!(path, dir.path().join("report.csv"));
    assert!(matches!(writer.save("..", b"x"), Err(ExportError::EmptyName)));
    assert!(matches!(writer.save("dir/", b"x"), Err(ExportError::EmptyName)));
}

#[test]
fn polling_emits_ticks_until_stopped() {
    let dir = TempDir::new().unwrap();
    let (engine, rx) = start(&dir);
    engine.send(EngineCommand::StartPolling {
        period: Duration::from_millis(50),
    });

    for _ in 0..2 {
        match rx.recv_timeout(WAIT).expect("tick") {
            EngineEvent::PollTick => {}
            other => panic!("unexpected event {other:?}"),
        }
    }

    engine.send(EngineCommand::StopPolling);
    std::thread::sleep(Duration::from_millis(100));
    while rx.try_recv().is_ok() {}
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
}
