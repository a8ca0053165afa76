//! Wire types for the KabuStation `/token` endpoint
//!
//! Field names follow the API's PascalCase JSON.

use serde::{Deserialize, Serialize};

/// POST /token request body
#[derive(Serialize)]
pub struct ReqPostAuthToken<'a> {
    #[serde(rename = "APIPassword")]
    pub api_password: &'a str,
}

/// POST /token success body
#[derive(Debug, Deserialize)]
pub struct RespPostAuthToken {
    #[serde(rename = "ResultCode", default)]
    pub result_code: i64,
    #[serde(rename = "Token", default)]
    pub token: String,
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Deserialize)]
pub struct RespError {
    #[serde(rename = "Code", default)]
    pub code: i64,
    #[serde(rename = "Message", default)]
    pub message: String,
}
