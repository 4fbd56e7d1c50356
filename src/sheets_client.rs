use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::fetch_error::SourceError;
use crate::normalizer::RawRow;
use crate::period::ConfigError;

/// Something that can read a bounded cell range from a named sheet.
pub trait SheetSource {
    fn read_range(
        &self,
        sheet: &str,
        range: &str,
    ) -> impl Future<Output = Result<Vec<RawRow>, SourceError>> + Send;
}

/// Body of a `values` response. `values` is omitted for an empty region.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange {
    #[serde(default)]
    range: Option<String>,
    #[serde(default)]
    values: Vec<RawRow>,
}

/// Credentials attached to each request.
#[derive(Debug, Clone, Default)]
pub enum SheetsAuth {
    #[default]
    None,
    ApiKey(String),
    Bearer(String),
}

/// HTTP client for a spreadsheet document behind a Sheets-v4 style API.
#[derive(Clone)]
pub struct SheetsApiClient {
    client: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    auth: SheetsAuth,
}

impl SheetsApiClient {
    pub fn new(
        base_url: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        auth: SheetsAuth,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let spreadsheet_id = spreadsheet_id.into();
        if spreadsheet_id.trim().is_empty() {
            return Err(ConfigError::Missing("SPREADSHEET_ID"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            spreadsheet_id,
            auth,
        })
    }

    fn values_url(&self, sheet: &str, range: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}!{}",
            self.base_url, self.spreadsheet_id, sheet, range
        )
    }

    #[instrument(skip(self), fields(spreadsheet_id = %self.spreadsheet_id))]
    async fn get_values(&self, sheet: &str, range: &str) -> Result<Vec<RawRow>, SourceError> {
        let url = self.values_url(sheet, range);
        debug!("Requesting {}", url);

        let mut request = self
            .client
            .get(&url)
            .query(&[("majorDimension", "ROWS"), ("valueRenderOption", "FORMATTED_VALUE")]);
        request = match &self.auth {
            SheetsAuth::None => request,
            SheetsAuth::ApiKey(key) => request.query(&[("key", key.as_str())]),
            SheetsAuth::Bearer(token) => request.bearer_auth(token),
        };

        let response = request.send().await?;
        let status = response.status();
        debug!("Received HTTP response with status: {}", status);

        let body = response.text().await?;

        if !status.is_success() {
            warn!("Sheet '{}' request failed with {}", sheet, status);
            return Err(classify_status(status, body));
        }

        let parsed: ValueRange =
            serde_json::from_str(&body).map_err(|e| SourceError::InvalidBody(e.to_string()))?;
        debug!(
            "Decoded {} rows for range {}",
            parsed.values.len(),
            parsed.range.as_deref().unwrap_or(range)
        );

        Ok(parsed.values)
    }
}

impl SheetSource for SheetsApiClient {
    fn read_range(
        &self,
        sheet: &str,
        range: &str,
    ) -> impl Future<Output = Result<Vec<RawRow>, SourceError>> + Send {
        self.get_values(sheet, range)
    }
}

/// Map a non-success status to a transport error.
///
/// A missing sheet shows up as 400 ("Unable to parse range") as often as 404.
fn classify_status(status: StatusCode, body: String) -> SourceError {
    let code = status.as_u16();
    let message = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or("no message").to_string()
    } else {
        body.chars().take(300).collect()
    };

    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        SourceError::Server {
            status: code,
            message,
        }
    } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        SourceError::Denied {
            status: code,
            message,
        }
    } else {
        SourceError::NotFound {
            status: code,
            message,
        }
    }
}
