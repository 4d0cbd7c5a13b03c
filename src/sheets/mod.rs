//! Sheets backend: the single seam between the tool adapter and the API.
//!
//! `SheetsBackend` is one method per API call the tools make. `BackendProvider`
//! hands the adapter a shared backend per invocation; `LazyBackend` builds the
//! HTTP client from configuration on first use and retries construction on the
//! next call if it failed.

pub mod auth;
pub mod client;
pub mod models;

pub use auth::{ServiceAccountKey, ServiceAccountTokenSource, StaticToken, TokenSource, SCOPES};
pub use client::SheetsClient;
pub use models::{
    AppendValuesResponse, BatchUpdateValuesRequest, BatchUpdateValuesResponse, InsertDataOption,
    Sheet, SheetProperties, Spreadsheet, SpreadsheetProperties, UpdateValuesResponse,
    ValueInputOption, ValueRange,
};

use crate::types::{A1Range, Config, Result, SpreadsheetId};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Spreadsheet API operations used by the tools.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SheetsBackend: Send + Sync {
    /// Read the cell values of `range`.
    async fn get_values(&self, spreadsheet_id: &SpreadsheetId, range: &A1Range) -> Result<ValueRange>;

    /// Overwrite `range` with `values`.
    async fn update_values(
        &self,
        spreadsheet_id: &SpreadsheetId,
        range: &A1Range,
        values: Vec<Vec<Value>>,
        input: ValueInputOption,
    ) -> Result<UpdateValuesResponse>;

    /// Append `values` after the last row of the table found in `range`.
    async fn append_values(
        &self,
        spreadsheet_id: &SpreadsheetId,
        range: &A1Range,
        values: Vec<Vec<Value>>,
        input: ValueInputOption,
        insert: InsertDataOption,
    ) -> Result<AppendValuesResponse>;

    /// Spreadsheet title and sheet list.
    async fn get_spreadsheet(&self, spreadsheet_id: &SpreadsheetId) -> Result<Spreadsheet>;

    /// Write several ranges in one call.
    async fn batch_update_values(
        &self,
        spreadsheet_id: &SpreadsheetId,
        request: BatchUpdateValuesRequest,
    ) -> Result<BatchUpdateValuesResponse>;
}

/// Source of backend handles.
#[async_trait]
pub trait BackendProvider: Send + Sync {
    async fn backend(&self) -> Result<Arc<dyn SheetsBackend>>;
}

/// Provider that always returns the same, already-built backend.
#[derive(Clone)]
pub struct SharedBackend(Arc<dyn SheetsBackend>);

impl SharedBackend {
    pub fn new(backend: Arc<dyn SheetsBackend>) -> Self {
        Self(backend)
    }
}

impl std::fmt::Debug for SharedBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedBackend(..)")
    }
}

#[async_trait]
impl BackendProvider for SharedBackend {
    async fn backend(&self) -> Result<Arc<dyn SheetsBackend>> {
        Ok(self.0.clone())
    }
}

/// Provider that builds a `SheetsClient` from configuration on first use.
#[derive(Debug)]
pub struct LazyBackend {
    config: Config,
    client: OnceCell<Arc<SheetsClient>>,
}

impl LazyBackend {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            client: OnceCell::new(),
        }
    }
}

#[async_trait]
impl BackendProvider for LazyBackend {
    async fn backend(&self) -> Result<Arc<dyn SheetsBackend>> {
        let client = self
            .client
            .get_or_try_init(|| async {
                let client = SheetsClient::from_config(&self.config).await?;
                tracing::info!(base_url = %self.config.backend.base_url, "sheets backend ready");
                Ok::<_, crate::types::Error>(Arc::new(client))
            })
            .await?;
        Ok(client.clone() as Arc<dyn SheetsBackend>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Error;

    #[tokio::test]
    async fn test_lazy_backend_reports_missing_credentials_every_call() {
        let provider = LazyBackend::new(Config::default());
        for _ in 0..2 {
            let err = provider.backend().await.err().unwrap();
            assert!(matches!(err, Error::Credentials(_)));
        }
    }

    #[tokio::test]
    async fn test_lazy_backend_reports_unreadable_file() {
        let provider =
            LazyBackend::new(Config::default().with_service_account_file("/nonexistent/key.json"));
        let err = provider.backend().await.err().unwrap();
        assert!(err.to_string().contains("/nonexistent/key.json"));
    }

    #[tokio::test]
    async fn test_shared_backend_returns_same_handle() {
        let backend: Arc<dyn SheetsBackend> = Arc::new(MockSheetsBackend::new());
        let provider = SharedBackend::new(backend.clone());
        let handle = provider.backend().await.unwrap();
        assert!(Arc::ptr_eq(&handle, &backend));
    }
}
