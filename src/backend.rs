//! Client side of the execution backend's HTTP contract.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::debug;

use crate::config::{
    CLEAR_RESULTS_PATH, EXECUTE_BATCH_PATH, EXECUTE_CURL_PATH, GET_RESULTS_PATH, GET_RESULT_PATH,
    UPLOAD_EXCEL_PATH,
};
use crate::error::BenchError;
use crate::model::{
    check_envelope, BatchResult, ExecuteOutcome, ExecutionRequest, HistoryEntry, HistoryList,
    ResultDetail, UploadResponse,
};

/// The endpoints the controller consumes. Every method resolves to
/// `BenchError::Backend` when the backend answers `success: false`.
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    async fn upload_excel(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadResponse, BenchError>;

    async fn execute_curl(&self, request: &ExecutionRequest) -> Result<ExecuteOutcome, BenchError>;

    async fn execute_batch(&self, request: &ExecutionRequest) -> Result<BatchResult, BenchError>;

    async fn clear_results(&self) -> Result<(), BenchError>;

    async fn get_results(&self) -> Result<Vec<HistoryEntry>, BenchError>;

    /// Stored single or batch result, undecoded.
    async fn get_result(&self, id: &str) -> Result<Value, BenchError>;
}

pub struct HttpBackend {
    client: reqwest::Client,
    base_url: url::Url,
}

impl HttpBackend {
    /// No request timeout is configured; a slow curl run simply keeps the
    /// triggering control busy.
    pub fn new(base_url: url::Url) -> Result<Self, BenchError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &url::Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<url::Url, BenchError> {
        self.base_url
            .join(path)
            .map_err(|e| BenchError::Config(format!("invalid endpoint {}: {}", path, e)))
    }

    /// Decode a JSON body whatever the HTTP status: the backend reports
    /// errors as `{error}` bodies with 4xx/5xx codes.
    async fn decode(resp: reqwest::Response) -> Result<Value, BenchError> {
        let status = resp.status();
        let bytes = resp.bytes().await?;
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(value) => check_envelope(value, &format!("HTTP {}", status)),
            Err(_) if !status.is_success() => Err(BenchError::Backend(format!("HTTP {}", status))),
            Err(e) => Err(BenchError::Decode(e)),
        }
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn upload_excel(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadResponse, BenchError> {
        let url = self.endpoint(UPLOAD_EXCEL_PATH)?;
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new().part("file", part);
        debug!("POST {}", url);
        let resp = self.client.post(url).multipart(form).send().await?;
        let value = Self::decode(resp).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn execute_curl(&self, request: &ExecutionRequest) -> Result<ExecuteOutcome, BenchError> {
        let url = self.endpoint(EXECUTE_CURL_PATH)?;
        debug!("POST {}", url);
        let resp = self.client.post(url).json(request).send().await?;
        let value = Self::decode(resp).await?;
        ExecuteOutcome::from_value(value)
    }

    async fn execute_batch(&self, request: &ExecutionRequest) -> Result<BatchResult, BenchError> {
        let url = self.endpoint(EXECUTE_BATCH_PATH)?;
        debug!("POST {}", url);
        let resp = self.client.post(url).json(request).send().await?;
        let value = Self::decode(resp).await?;
        BatchResult::from_value(value)
    }

    async fn clear_results(&self) -> Result<(), BenchError> {
        let url = self.endpoint(CLEAR_RESULTS_PATH)?;
        debug!("POST {}", url);
        let resp = self.client.post(url).send().await?;
        Self::decode(resp).await.map(|_| ())
    }

    async fn get_results(&self) -> Result<Vec<HistoryEntry>, BenchError> {
        let url = self.endpoint(GET_RESULTS_PATH)?;
        let resp = self.client.get(url).send().await?;
        let value = Self::decode(resp).await?;
        let list: HistoryList = serde_json::from_value(value)?;
        Ok(list.results)
    }

    async fn get_result(&self, id: &str) -> Result<Value, BenchError> {
        let mut url = self.endpoint(GET_RESULT_PATH)?;
        url.path_segments_mut()
            .map_err(|_| BenchError::Config(format!("cannot append to {}", self.base_url)))?
            .push(id);
        debug!("GET {}", url);
        let resp = self.client.get(url).send().await?;
        let value = Self::decode(resp).await?;
        let detail: ResultDetail = serde_json::from_value(value)?;
        Ok(detail.data)
    }
}
