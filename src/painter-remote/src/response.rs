//! Interpretation of `/run.json` response bodies.
//!
//! The painter server does not always answer with JSON: empty bodies, plain
//! text and bare JSON scalars all show up on successful runs. Only an object
//! carrying an `"error"` entry means the script failed.

use crate::error::{PainterError, PainterResult};
use crate::payload::{decode_javascript_body, ScriptKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Error,
}

/// What the host sent back for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptOutput {
    Text(String),
    Json(Value),
}

impl fmt::Display for ScriptOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptOutput::Text(text) => f.write_str(text),
            ScriptOutput::Json(value) => write!(f, "{value}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub status: ExecutionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<ScriptOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResult {
    pub fn success(output: Option<ScriptOutput>) -> Self {
        Self {
            status: ExecutionStatus::Success,
            output,
            error: None,
        }
    }

    pub fn failure(message: String) -> Self {
        Self {
            status: ExecutionStatus::Error,
            output: Some(ScriptOutput::Text(message.clone())),
            error: Some(message),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }

    /// The JSON object payload, when the host answered with one.
    pub fn payload(&self) -> Option<&Value> {
        match &self.output {
            Some(ScriptOutput::Json(value)) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self.status {
            ExecutionStatus::Success => "success",
            ExecutionStatus::Error => "error",
        };
        match &self.output {
            Some(output) => write!(f, "{status}: {output}"),
            None => f.write_str(status),
        }
    }
}

/// Applies the response decision list to a raw body.
///
/// `request_body` and `kind` are only consulted when the host reports an
/// error, to log the submitted JavaScript source.
pub fn interpret_response(
    body: &[u8],
    request_body: &[u8],
    kind: ScriptKind,
) -> PainterResult<ExecutionResult> {
    tracing::debug!(raw = %String::from_utf8_lossy(body), "raw response");

    if body.is_empty() {
        tracing::debug!("empty response received");
        return Ok(ExecutionResult::success(None));
    }

    let text = match std::str::from_utf8(body) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "error decoding response");
            return Ok(ExecutionResult::failure(format!(
                "Unicode decoding error: {e}"
            )));
        }
    };

    let parsed: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(_) => {
            tracing::debug!(response = text, "response is not JSON");
            return Ok(ExecutionResult::success(Some(ScriptOutput::Text(
                text.to_string(),
            ))));
        }
    };

    match parsed {
        Value::Null => {
            tracing::debug!("null response, treating as success");
            Ok(ExecutionResult::success(None))
        }
        Value::Object(object) => {
            if let Some(detail) = object.get("error") {
                if kind == ScriptKind::JavaScript {
                    log_submitted_script(request_body);
                }
                return Err(PainterError::ExecuteScript {
                    detail: textual_form(detail),
                });
            }
            tracing::debug!("no error found in response");
            Ok(ExecutionResult::success(Some(ScriptOutput::Json(
                Value::Object(object),
            ))))
        }
        other => {
            tracing::debug!(value = %other, "non-object response, treating as success");
            let output = (!is_falsy(&other)).then(|| ScriptOutput::Text(textual_form(&other)));
            Ok(ExecutionResult::success(output))
        }
    }
}

/// Logs the JavaScript source of a failed request. Never fails.
pub fn log_submitted_script(request_body: &[u8]) {
    match decode_javascript_body(request_body) {
        Ok(script) => tracing::warn!(script = %script, "javascript rejected by the painter"),
        Err(e) => tracing::warn!(error = %e, "could not decode submitted javascript"),
    }
}

fn textual_form(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}
