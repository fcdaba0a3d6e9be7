use base64::{Engine as _, engine::general_purpose};
use serde::Deserialize;

use super::error::StoreError;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreCredentials {
    #[serde(alias = "spreadsheet_id")]
    pub spreadsheet_id: String,

    #[serde(alias = "access_token")]
    pub access_token: String,

    #[serde(default, alias = "api_base")]
    pub api_base: Option<String>,
}

/// Accepts the credentials as raw JSON or as base64-encoded JSON.
pub fn parse_credentials(raw: &str) -> Result<StoreCredentials, StoreError> {
    let raw = raw.trim();
    if let Ok(credentials) = serde_json::from_str::<StoreCredentials>(raw) {
        return Ok(credentials);
    }

    let decoded = general_purpose::STANDARD
        .decode(raw)
        .map_err(|e| StoreError::NotInitialized(format!("credentials are not JSON or base64: {e}")))?;
    serde_json::from_slice::<StoreCredentials>(&decoded)
        .map_err(|e| StoreError::NotInitialized(format!("malformed credentials: {e}")))
}

/// Environment value first, then the credentials file.
pub fn load_credentials(
    env_value: Option<&str>,
    file_path: &str,
) -> Result<StoreCredentials, StoreError> {
    if let Some(raw) = env_value.filter(|v| !v.trim().is_empty()) {
        match parse_credentials(raw) {
            Ok(credentials) => return Ok(credentials),
            Err(e) => tracing::warn!("Ignoring credentials from environment: {}", e),
        }
    }

    let contents = std::fs::read_to_string(file_path).map_err(|e| {
        StoreError::NotInitialized(format!("no credentials in environment or {file_path}: {e}"))
    })?;
    parse_credentials(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = r#"{"spreadsheetId":"sheet-1","accessToken":"tok"}"#;

    #[test]
    fn parses_raw_and_base64_json() {
        let raw = parse_credentials(RAW).unwrap();
        assert_eq!(raw.spreadsheet_id, "sheet-1");

        let encoded = general_purpose::STANDARD.encode(RAW);
        let decoded = parse_credentials(&encoded).unwrap();
        assert_eq!(decoded.access_token, "tok");
    }

    #[test]
    fn snake_case_keys_are_accepted() {
        let creds =
            parse_credentials(r#"{"spreadsheet_id":"s","access_token":"t","api_base":"http://x"}"#)
                .unwrap();
        assert_eq!(creds.api_base.as_deref(), Some("http://x"));
    }

    #[test]
    fn missing_everything_is_not_initialized() {
        let err = load_credentials(None, "/nonexistent/credentials.json").unwrap_err();
        assert!(err.is_unavailable());

        let err = load_credentials(Some("garbage"), "/nonexistent/credentials.json").unwrap_err();
        assert!(err.is_unavailable());
    }
}
