//! Transport speaking a spreadsheet "values" REST API over HTTPS.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use super::Rows;
use super::credentials::{StoreCredentials, load_credentials};
use super::error::StoreError;
use super::transport::{Connector, SheetTransport};

pub struct HttpSheetTransport {
    client: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    access_token: String,
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

fn cell_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        other => other.to_string(),
    }
}

impl HttpSheetTransport {
    pub fn new(credentials: StoreCredentials, default_base: &str, timeout: Duration) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::NotInitialized(format!("failed to build HTTP client: {e}")))?;
        let base_url = credentials
            .api_base
            .unwrap_or_else(|| default_base.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            base_url,
            spreadsheet_id: credentials.spreadsheet_id,
            access_token: credentials.access_token,
        })
    }

    fn spreadsheet_url(&self) -> String {
        format!("{}/v4/spreadsheets/{}", self.base_url, self.spreadsheet_id)
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/values/{}",
            self.spreadsheet_url(),
            urlencoding::encode(range)
        )
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, StoreError> {
        let response = request.bearer_auth(&self.access_token).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Transport(format!("HTTP {status}: {body}")));
        }
        Ok(response)
    }
}

#[async_trait]
impl SheetTransport for HttpSheetTransport {
    async fn sheet_titles(&self) -> Result<Vec<String>, StoreError> {
        let response = self
            .send(
                self.client
                    .get(self.spreadsheet_url())
                    .query(&[("fields", "sheets.properties.title")]),
            )
            .await?;
        let meta: SpreadsheetMeta = response
            .json()
            .await
            .map_err(|e| StoreError::Malformed(e.to_string()))?;
        Ok(meta.sheets.into_iter().map(|s| s.properties.title).collect())
    }

    async fn add_sheet(&self, title: &str) -> Result<(), StoreError> {
        let body = json!({ "requests": [{ "addSheet": { "properties": { "title": title } } }] });
        self.send(
            self.client
                .post(format!("{}:batchUpdate", self.spreadsheet_url()))
                .json(&body),
        )
        .await?;
        Ok(())
    }

    async fn read_range(&self, range: &str) -> Result<Rows, StoreError> {
        let response = self.send(self.client.get(self.values_url(range))).await?;
        let values: ValueRange = response
            .json()
            .await
            .map_err(|e| StoreError::Malformed(e.to_string()))?;
        Ok(values
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    async fn append_rows(&self, range: &str, rows: Rows) -> Result<(), StoreError> {
        self.send(
            self.client
                .post(format!("{}:append", self.values_url(range)))
                .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
                .json(&json!({ "values": rows })),
        )
        .await?;
        Ok(())
    }

    async fn write_range(&self, range: &str, rows: Rows) -> Result<(), StoreError> {
        self.send(
            self.client
                .put(self.values_url(range))
                .query(&[("valueInputOption", "RAW")])
                .json(&json!({ "values": rows })),
        )
        .await?;
        Ok(())
    }

    async fn clear_range(&self, range: &str) -> Result<(), StoreError> {
        self.send(
            self.client
                .post(format!("{}:clear", self.values_url(range)))
                .json(&json!({})),
        )
        .await?;
        Ok(())
    }
}

/// Loads credentials on each attempt, so fixing the environment or the file
/// takes effect without a restart.
pub struct HttpConnector {
    pub env_credentials: Option<String>,
    pub credentials_file: String,
    pub api_base: String,
    pub timeout: Duration,
}

#[async_trait]
impl Connector for HttpConnector {
    async fn connect(&self) -> Result<Arc<dyn SheetTransport>, StoreError> {
        let credentials =
            load_credentials(self.env_credentials.as_deref(), &self.credentials_file)?;
        let transport = HttpSheetTransport::new(credentials, &self.api_base, self.timeout)?;
        Ok(Arc::new(transport))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_render_as_sheet_strings() {
        assert_eq!(cell_to_string(json!("Ada")), "Ada");
        assert_eq!(cell_to_string(json!(12)), "12");
        assert_eq!(cell_to_string(json!(true)), "TRUE");
        assert_eq!(cell_to_string(Value::Null), "");
    }

    #[test]
    fn ranges_are_url_encoded() {
        let transport = HttpSheetTransport::new(
            StoreCredentials {
                spreadsheet_id: "abc".to_string(),
                access_token: "t".to_string(),
                api_base: None,
            },
            "https://sheets.example.com/",
            Duration::from_secs(10),
        )
        .unwrap();

        assert_eq!(
            transport.values_url("Students!A2:Z"),
            "https://sheets.example.com/v4/spreadsheets/abc/values/Students%21A2%3AZ"
        );
    }
}
