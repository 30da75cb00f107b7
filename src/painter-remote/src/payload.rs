//! Request bodies for the `/run.json` route.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Which embedded interpreter the host should run a script with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptKind {
    #[default]
    Python,
    JavaScript,
}

impl ScriptKind {
    /// Resolves a user-supplied kind name.
    ///
    /// `js` and `javascript` select JavaScript. Anything else, including
    /// names the host has never heard of, runs as Python; the host has
    /// always treated an unrecognised kind that way and callers rely on it.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "js" | "javascript" => ScriptKind::JavaScript,
            "python" | "py" => ScriptKind::Python,
            other => {
                tracing::warn!(kind = other, "unrecognised script kind, running as python");
                ScriptKind::Python
            }
        }
    }

    /// JSON key carrying the encoded script.
    pub fn body_key(&self) -> &'static str {
        match self {
            ScriptKind::Python => "python",
            ScriptKind::JavaScript => "js",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScriptKind::Python => "python",
            ScriptKind::JavaScript => "javascript",
        }
    }
}

impl fmt::Display for ScriptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A script and the interpreter it targets. Built per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptPayload<'a> {
    pub script: &'a str,
    pub kind: ScriptKind,
}

impl<'a> ScriptPayload<'a> {
    pub fn new(script: &'a str, kind: ScriptKind) -> Self {
        Self { script, kind }
    }

    /// Single-key object: `{"python": "<base64>"}` or `{"js": "<base64>"}`.
    pub fn encode(&self) -> Value {
        let mut body = Map::with_capacity(1);
        body.insert(
            self.kind.body_key().to_string(),
            Value::String(STANDARD.encode(self.script.as_bytes())),
        );
        Value::Object(body)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.encode())
    }
}

/// Recovers the script text from an encoded JavaScript request body.
pub(crate) fn decode_javascript_body(body: &[u8]) -> Result<String, String> {
    let value: Value = serde_json::from_slice(body).map_err(|e| e.to_string())?;
    let encoded = value
        .get(ScriptKind::JavaScript.body_key())
        .and_then(Value::as_str)
        .ok_or_else(|| "request body has no \"js\" entry".to_string())?;
    let raw = STANDARD.decode(encoded).map_err(|e| e.to_string())?;
    String::from_utf8(raw).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_entry(body: &Value, key: &str) -> String {
        let encoded = body[key].as_str().expect("entry should be a string");
        String::from_utf8(STANDARD.decode(encoded).expect("valid base64")).expect("utf-8")
    }

    #[test]
    fn python_body_uses_python_key() {
        let body = ScriptPayload::new("print('hi')", ScriptKind::Python).encode();
        let object = body.as_object().expect("object");
        assert_eq!(object.len(), 1);
        assert_eq!(decode_entry(&body, "python"), "print('hi')");
    }

    #[test]
    fn javascript_body_uses_js_key() {
        let script = "alg.log.info(\"layers\")\n// ünïcode";
        let body = ScriptPayload::new(script, ScriptKind::JavaScript).encode();
        let object = body.as_object().expect("object");
        assert_eq!(object.len(), 1);
        assert!(object.get("python").is_none());
        assert_eq!(decode_entry(&body, "js"), script);
    }

    #[test]
    fn empty_script_is_encoded() {
        let body = ScriptPayload::new("", ScriptKind::Python).encode();
        assert_eq!(body, serde_json::json!({ "python": "" }));
    }

    #[test]
    fn unknown_kind_falls_back_to_python() {
        assert_eq!(ScriptKind::from_name("ruby"), ScriptKind::Python);
        assert_eq!(ScriptKind::from_name(""), ScriptKind::Python);
        let body = ScriptPayload::new("puts 1", ScriptKind::from_name("ruby")).encode();
        assert_eq!(decode_entry(&body, "python"), "puts 1");
    }

    #[test]
    fn javascript_aliases_are_recognised() {
        assert_eq!(ScriptKind::from_name("js"), ScriptKind::JavaScript);
        assert_eq!(ScriptKind::from_name("JavaScript"), ScriptKind::JavaScript);
        assert_eq!(ScriptKind::from_name(" Python "), ScriptKind::Python);
    }

    #[test]
    fn javascript_body_decodes_back() {
        let bytes = ScriptPayload::new("var x = 1;", ScriptKind::JavaScript)
            .to_bytes()
            .expect("serialize");
        assert_eq!(decode_javascript_body(&bytes).as_deref(), Ok("var x = 1;"));
        assert!(decode_javascript_body(b"{\"python\":\"eA==\"}").is_err());
        assert!(decode_javascript_body(b"{\"js\":\"***\"}").is_err());
        assert!(decode_javascript_body(b"not json").is_err());
    }
}
