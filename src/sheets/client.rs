//! HTTP client for the Sheets API v4.

use crate::sheets::auth::{ServiceAccountKey, ServiceAccountTokenSource, TokenSource};
use crate::sheets::models::{
    AppendValuesResponse, BatchUpdateValuesRequest, BatchUpdateValuesResponse, ErrorEnvelope,
    InsertDataOption, Spreadsheet, UpdateValuesResponse, ValueInputOption, ValueRange,
};
use crate::sheets::SheetsBackend;
use crate::types::{A1Range, BackendConfig, Config, Error, Result, SpreadsheetId};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Authenticated Sheets API client.
#[derive(Clone)]
pub struct SheetsClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenSource>,
}

impl fmt::Debug for SheetsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetsClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl SheetsClient {
    pub fn new(config: &BackendConfig, tokens: Arc<dyn TokenSource>) -> Result<Self> {
        let http = build_http_client(config)?;
        Ok(Self::with_http_client(http, &config.base_url, tokens))
    }

    pub fn with_http_client(
        http: reqwest::Client,
        base_url: &str,
        tokens: Arc<dyn TokenSource>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    /// Build a client from the service-account file named in `config`.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let path = config
            .credentials
            .service_account_file
            .as_deref()
            .ok_or_else(|| {
                Error::credentials("no service account file configured (GOOGLE_SERVICE_ACCOUNT_FILE)")
            })?;

        let key = ServiceAccountKey::from_file(path).await?;
        tracing::debug!(client_email = %key.client_email, "loaded service account key");

        let http = build_http_client(&config.backend)?;
        let tokens = ServiceAccountTokenSource::new(key, http.clone())?;
        Ok(Self::with_http_client(
            http,
            &config.backend.base_url,
            Arc::new(tokens),
        ))
    }

    fn spreadsheet_url(&self, spreadsheet_id: &SpreadsheetId) -> String {
        format!(
            "{}/spreadsheets/{}",
            self.base_url,
            urlencoding::encode(spreadsheet_id.as_str())
        )
    }

    fn values_url(&self, spreadsheet_id: &SpreadsheetId, range: &A1Range, suffix: &str) -> String {
        format!(
            "{}/values/{}{}",
            self.spreadsheet_url(spreadsheet_id),
            urlencoding::encode(range.as_str()),
            suffix
        )
    }

    async fn execute<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let token = self.tokens.access_token().await?;
        let response = request.bearer_auth(token).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(api_error(response).await);
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

fn build_http_client(config: &BackendConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.request_timeout)
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(Error::from)
}

/// Decode a non-success response into an API error.
async fn api_error(response: reqwest::Response) -> Error {
    let status = response.status();
    let reason = status.canonical_reason().unwrap_or("Unknown Status").to_string();
    let body = response.text().await.unwrap_or_default();

    match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => Error::api(
            status.as_u16(),
            envelope.error.status.unwrap_or(reason),
            envelope.error.message,
        ),
        Err(_) => Error::api(status.as_u16(), reason, body.trim()),
    }
}

#[async_trait]
impl SheetsBackend for SheetsClient {
    async fn get_values(&self, spreadsheet_id: &SpreadsheetId, range: &A1Range) -> Result<ValueRange> {
        tracing::debug!(%spreadsheet_id, %range, "values.get");
        let url = self.values_url(spreadsheet_id, range, "");
        self.execute(self.http.get(url)).await
    }

    async fn update_values(
        &self,
        spreadsheet_id: &SpreadsheetId,
        range: &A1Range,
        values: Vec<Vec<Value>>,
        input: ValueInputOption,
    ) -> Result<UpdateValuesResponse> {
        tracing::debug!(%spreadsheet_id, %range, rows = values.len(), "values.update");
        let url = self.values_url(spreadsheet_id, range, "");
        let body = ValueRange {
            range: Some(range.to_string()),
            major_dimension: Some("ROWS".to_string()),
            values,
        };
        let request = self
            .http
            .put(url)
            .query(&[("valueInputOption", input.as_str())])
            .json(&body);
        self.execute(request).await
    }

    async fn append_values(
        &self,
        spreadsheet_id: &SpreadsheetId,
        range: &A1Range,
        values: Vec<Vec<Value>>,
        input: ValueInputOption,
        insert: InsertDataOption,
    ) -> Result<AppendValuesResponse> {
        tracing::debug!(%spreadsheet_id, %range, rows = values.len(), "values.append");
        let url = self.values_url(spreadsheet_id, range, ":append");
        let body = ValueRange {
            range: Some(range.to_string()),
            major_dimension: Some("ROWS".to_string()),
            values,
        };
        let request = self
            .http
            .post(url)
            .query(&[
                ("valueInputOption", input.as_str()),
                ("insertDataOption", insert.as_str()),
            ])
            .json(&body);
        self.execute(request).await
    }

    async fn get_spreadsheet(&self, spreadsheet_id: &SpreadsheetId) -> Result<Spreadsheet> {
        tracing::debug!(%spreadsheet_id, "spreadsheets.get");
        let url = self.spreadsheet_url(spreadsheet_id);
        self.execute(self.http.get(url)).await
    }

    async fn batch_update_values(
        &self,
        spreadsheet_id: &SpreadsheetId,
        request: BatchUpdateValuesRequest,
    ) -> Result<BatchUpdateValuesResponse> {
        tracing::debug!(%spreadsheet_id, ranges = request.data.len(), "values.batchUpdate");
        let url = format!("{}/values:batchUpdate", self.spreadsheet_url(spreadsheet_id));
        self.execute(self.http.post(url).json(&request)).await
    }
}
