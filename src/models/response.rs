//! Send API responses

use serde::{Deserialize, Serialize};

/// Response body of the Send API
///
/// On failure only `error` is populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::models::string_id::option"
    )]
    pub recipient_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

/// Structured error reported by the platform
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub code: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_subcode: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fbtrace_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_success_body() {
        let body = r#"{
            "recipient_id": "1008372609250235",
            "message_id": "mid.1456970487936:c34767dfe57ee6e339"
        }"#;
        let response: ApiResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.recipient_id, Some(1_008_372_609_250_235));
        assert_eq!(
            response.message_id.as_deref(),
            Some("mid.1456970487936:c34767dfe57ee6e339")
        );
        assert!(response.error.is_none());
    }

    #[test]
    fn decodes_error_body() {
        let body = r#"{
            "error": {
                "message": "Invalid OAuth access token.",
                "type": "OAuthException",
                "code": 190,
                "error_data": "",
                "fbtrace_id": "BLBz/WZt8dN"
            }
        }"#;
        let response: ApiResponse = serde_json::from_str(body).unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.kind, "OAuthException");
        assert_eq!(error.code, 190);
        assert_eq!(error.fbtrace_id.as_deref(), Some("BLBz/WZt8dN"));
        assert!(response.recipient_id.is_none());
    }
}
