//! Call request envelope (controller -> worker).
//!
//! Wire shape: `[id, payload]` or `[id, payload, type]`.
//!
//! Parsing rules:
//! - Never index (`items[0]`); walk the array with an iterator.
//! - Any array with a first element is a request. A missing payload is `null`.
//! - Only a missing third slot selects the default handler. A present type
//!   slot that is not a string is used by its JSON text (`null` -> `"null"`,
//!   `3` -> `"3"`).
//! - Elements after the third are ignored.

use serde_json::Value;

use crate::error::{Result, WireCallError};

/// Decoded call request.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Correlation id, echoed back verbatim in the reply.
    pub id: Value,
    /// Argument handed to the handler.
    pub payload: Value,
    /// Handler label; `None` selects the default handler.
    pub label: Option<String>,
}

impl Request {
    pub fn new(id: Value, payload: Value, label: Option<String>) -> Self {
        Self { id, payload, label }
    }

    /// Decode a request from transport text.
    pub fn decode(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| WireCallError::Decode(format!("invalid request json: {e}")))?;

        let Value::Array(items) = value else {
            return Err(WireCallError::Decode("request must be a json array".into()));
        };

        let mut it = items.into_iter();
        let Some(id) = it.next() else {
            return Err(WireCallError::Decode("request must not be empty".into()));
        };
        let payload = it.next().unwrap_or(Value::Null);
        let label = it.next().map(|slot| match slot {
            Value::String(s) => s,
            other => other.to_string(),
        });

        Ok(Self { id, payload, label })
    }

    /// Encode to transport text. The type slot is omitted when unset.
    pub fn encode(&self) -> Result<String> {
        let mut items = Vec::with_capacity(3);
        items.push(self.id.clone());
        items.push(self.payload.clone());
        if let Some(label) = &self.label {
            items.push(Value::String(label.clone()));
        }
        serde_json::to_string(&Value::Array(items))
            .map_err(|e| WireCallError::Encode(format!("request encode failed: {e}")))
    }
}
