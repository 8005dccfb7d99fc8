use bytes::Bytes;
use portal_logging::portal_debug;
use url::{form_urlencoded, Url};

use crate::client::ApiClient;
use crate::types::ApiError;
use crate::wire::{
    CompanyRecord, ItemsReport, JobRecord, LogRecord, LookupResponse, ResultsPage, RunAck,
    RunJobRequest, SalesSummary,
};

pub const JOBS_PATH: &str = "/api/jobs/";
pub const RUN_JOB_PATH: &str = "/api/jobs/run/";
pub const LOOKUP_PATH: &str = "/api/cnpj/lookup/";

/// Host-less origin used only to percent-encode path segments.
const SEGMENT_ORIGIN: &str = "http://portal.invalid/";

/// Path of a job's log endpoint with `job_id` encoded as a single path segment.
pub fn job_logs_path(job_id: &str) -> Result<String, ApiError> {
    let invalid = |reason: &str| ApiError::InvalidUrl {
        url: format!("{JOBS_PATH}{job_id}/logs/"),
        reason: reason.to_string(),
    };
    if matches!(job_id, "" | "." | "..") {
        return Err(invalid("job id is not a usable path segment"));
    }
    let mut url = Url::parse(SEGMENT_ORIGIN).map_err(|err| invalid(&err.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| invalid("cannot hold path segments"))?
        .clear()
        .extend(["api", "jobs", job_id, "logs", ""]);
    Ok(url.path().to_string())
}

/// Result of a company lookup that reached the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(CompanyRecord),
    /// `ok: false` or an error status; carries the server's text when present.
    Rejected { message: Option<String> },
}

/// Typed portal endpoints.
#[async_trait::async_trait]
pub trait PortalBackend: Send + Sync {
    async fn list_jobs(&self) -> Result<Vec<JobRecord>, ApiError>;
    async fn job_logs(&self, job_id: &str) -> Result<Vec<LogRecord>, ApiError>;
    async fn run_job(&self, job_type: &str) -> Result<RunAck, ApiError>;
    /// `url` is a full report query (path + query string).
    async fn items_report(&self, url: &str) -> Result<ItemsReport, ApiError>;
    async fn sales_summary(&self, url: &str) -> Result<SalesSummary, ApiError>;
    /// `cnpj` must already be the cleaned 14-digit identifier.
    async fn lookup_company(&self, cnpj: &str) -> Result<LookupOutcome, ApiError>;
    async fn download(&self, url: &str) -> Result<Bytes, ApiError>;
}

#[derive(Clone)]
pub struct HttpBackend {
    client: ApiClient,
}

impl HttpBackend {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl PortalBackend for HttpBackend {
    async fn list_jobs(&self) -> Result<Vec<JobRecord>, ApiError> {
        let page: ResultsPage<JobRecord> = self.client.get_json(JOBS_PATH).await?;
        Ok(page.results)
    }

    async fn job_logs(&self, job_id: &str) -> Result<Vec<LogRecord>, ApiError> {
        let page: ResultsPage<LogRecord> = self.client.get_json(&job_logs_path(job_id)?).await?;
        Ok(page.results)
    }

    async fn run_job(&self, job_type: &str) -> Result<RunAck, ApiError> {
        let ack: RunAck = self
            .client
            .post_json(RUN_JOB_PATH, &RunJobRequest { job_type })
            .await?;
        portal_debug!("Run request for {job_type} accepted: {:?}", ack.id);
        Ok(ack)
    }

    async fn items_report(&self, url: &str) -> Result<ItemsReport, ApiError> {
        self.client.get_json(url).await
    }

    async fn sales_summary(&self, url: &str) -> Result<SalesSummary, ApiError> {
        self.client.get_json(url).await
    }

    async fn lookup_company(&self, cnpj: &str) -> Result<LookupOutcome, ApiError> {
        let query: String = form_urlencoded::Serializer::new(String::new())
            .append_pair("cnpj", cnpj)
            .finish();
        let path = format!("{LOOKUP_PATH}?{query}");

        match self.client.get_json::<LookupResponse>(&path).await {
            Ok(response) if response.ok => Ok(LookupOutcome::Found(response.data.unwrap_or_default())),
            Ok(response) => Ok(LookupOutcome::Rejected {
                message: response.failure_message(),
            }),
            Err(err @ ApiError::HttpStatus { .. }) => {
                // Error bodies use the same envelope; anything else gets the generic text.
                let message = err
                    .body()
                    .and_then(|body| serde_json::from_str::<LookupResponse>(body).ok())
                    .and_then(LookupResponse::failure_message);
                portal_debug!("Lookup rejected with {err}");
                Ok(LookupOutcome::Rejected { message })
            }
            Err(err) => Err(err),
        }
    }

    async fn download(&self, url: &str) -> Result<Bytes, ApiError> {
        self.client.get_bytes(url).await
    }
}
