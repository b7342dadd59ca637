//! Fabric CLI reply types and the `api` passthrough envelope decoder.
//!
//! Pure data in, data out. The CLI wraps every REST call result as
//! `{"status_code": <int>, "text": <object-or-string>}`; anything else is
//! decoded into a sentinel response with status `0`.

use serde_json::Value;

/// Captured result of one Fabric CLI invocation.
///
/// Both streams are decoded as UTF-8 with lossy replacement of invalid bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CliReply {
    /// Process exit code, `None` when terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CliReply {
    /// Build a reply from raw captured bytes.
    #[must_use]
    pub fn from_bytes(code: Option<i32>, stdout: &[u8], stderr: &[u8]) -> Self {
        Self {
            code,
            stdout: String::from_utf8_lossy(stdout).into_owned(),
            stderr: String::from_utf8_lossy(stderr).into_owned(),
        }
    }

    /// `true` when the process exited with code 0.
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// `true` when stdout holds nothing but whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.stdout.trim().is_empty()
    }

    /// Decode stdout as an `api` envelope.
    #[must_use]
    pub fn api(&self) -> ApiResponse {
        ApiResponse::decode(&self.stdout)
    }
}

// ── Requests ─────────────────────────────────────────────────────────────────

/// HTTP verb forwarded to `fab api -X`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

impl HttpMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
        }
    }
}

/// Which REST authority the call goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// The Fabric REST API (the CLI default).
    Fabric,
    /// Azure Resource Manager, selected with `-A azure`.
    Azure,
}

/// One REST call routed through `fab api`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub audience: Audience,
    pub body: Option<Value>,
}

impl ApiRequest {
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            audience: Audience::Fabric,
            body: None,
        }
    }

    #[must_use]
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            audience: Audience::Fabric,
            body: Some(body),
        }
    }

    #[must_use]
    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: HttpMethod::Put,
            path: path.into(),
            audience: Audience::Fabric,
            body: Some(body),
        }
    }

    /// Route the request to Azure Resource Manager instead of Fabric.
    #[must_use]
    pub fn azure(mut self) -> Self {
        self.audience = Audience::Azure;
        self
    }
}

// ── Responses ────────────────────────────────────────────────────────────────

/// Coarse classification of an envelope status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 200 or 201.
    Success,
    /// 202: the operation continues asynchronously.
    Accepted,
    /// 400: the body usually carries an `errorCode`.
    ClientError,
    /// Anything else, including the decode sentinel `0`.
    Unknown,
}

/// Decoded `api` envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status, `0` when the envelope could not be decoded.
    pub status: u16,
    /// The `text` payload; `Value::Null` for the sentinel.
    pub body: Value,
}

impl ApiResponse {
    /// Sentinel returned for empty or malformed envelopes.
    #[must_use]
    pub fn sentinel() -> Self {
        Self {
            status: 0,
            body: Value::Null,
        }
    }

    /// Decode a CLI stdout string. Never fails.
    #[must_use]
    pub fn decode(stdout: &str) -> Self {
        let trimmed = stdout.trim();
        if trimmed.is_empty() {
            return Self::sentinel();
        }
        let Ok(Value::Object(mut envelope)) = serde_json::from_str::<Value>(trimmed) else {
            return Self::sentinel();
        };
        let status = envelope
            .get("status_code")
            .and_then(Value::as_u64)
            .and_then(|s| u16::try_from(s).ok())
            .unwrap_or(0);
        let body = match envelope.remove("text") {
            Some(Value::String(text)) => match serde_json::from_str::<Value>(&text) {
                Ok(parsed @ (Value::Object(_) | Value::Array(_))) => parsed,
                _ => Value::String(text),
            },
            Some(other) => other,
            None => Value::Null,
        };
        Self { status, body }
    }

    #[must_use]
    pub fn class(&self) -> StatusClass {
        match self.status {
            200 | 201 => StatusClass::Success,
            202 => StatusClass::Accepted,
            400 => StatusClass::ClientError,
            _ => StatusClass::Unknown,
        }
    }

    /// `true` for success and accepted statuses.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self.class(), StatusClass::Success | StatusClass::Accepted)
    }

    /// `true` when the status is one of `codes`.
    #[must_use]
    pub fn is_any(&self, codes: &[u16]) -> bool {
        codes.contains(&self.status)
    }

    /// The `errorCode` field of an error body, if present.
    #[must_use]
    pub fn error_code(&self) -> Option<&str> {
        self.str_field("errorCode")
    }

    /// A top-level string field of the body, treating `""` as absent.
    #[must_use]
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.body
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Elements of the `value` array of a list response.
    #[must_use]
    pub fn items(&self) -> &[Value] {
        self.body
            .get("value")
            .and_then(Value::as_array)
            .map_or(&[], Vec::as_slice)
    }

    /// Short single-line rendering of the body for log messages.
    #[must_use]
    pub fn summary(&self) -> String {
        const MAX: usize = 300;
        let text = match &self.body {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        if text.chars().count() > MAX {
            let cut: String = text.chars().take(MAX).collect();
            format!("{cut}…")
        } else {
            text
        }
    }
}
