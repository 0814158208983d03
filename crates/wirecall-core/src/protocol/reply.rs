//! Reply envelope (worker -> controller).
//!
//! Wire shape:
//! - success: `[id, null, result]`
//! - failure: `[id, {"message": "..."}]` (result slot omitted)

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, WireCallError};

/// Minimal serializable error. Only the message crosses the channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDescriptor {
    pub message: String,
}

impl ErrorDescriptor {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Reply for exactly one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// Correlation id copied from the request.
    pub id: Value,
    /// Handler result or error descriptor.
    pub outcome: std::result::Result<Value, ErrorDescriptor>,
}

impl Reply {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            id,
            outcome: Ok(result),
        }
    }

    pub fn failure(id: Value, message: impl Into<String>) -> Self {
        Self {
            id,
            outcome: Err(ErrorDescriptor::new(message)),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Encode to transport text.
    pub fn encode(&self) -> Result<String> {
        let items = match &self.outcome {
            Ok(result) => vec![self.id.clone(), Value::Null, result.clone()],
            Err(desc) => {
                let desc = serde_json::to_value(desc)
                    .map_err(|e| WireCallError::Encode(format!("error descriptor: {e}")))?;
                vec![self.id.clone(), desc]
            }
        };
        serde_json::to_string(&Value::Array(items))
            .map_err(|e| WireCallError::Encode(format!("reply encode failed: {e}")))
    }

    /// Decode a reply from transport text (controller side).
    ///
    /// A non-null second slot always means failure, whatever follows it.
    pub fn decode(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| WireCallError::Decode(format!("invalid reply json: {e}")))?;

        let Value::Array(items) = value else {
            return Err(WireCallError::Decode("reply must be a json array".into()));
        };

        let len = items.len();
        if !(2..=3).contains(&len) {
            return Err(WireCallError::Decode(format!(
                "reply must have 2 or 3 elements, got {len}"
            )));
        }

        let mut it = items.into_iter();
        let id = it.next().unwrap_or(Value::Null);
        let error = it.next().unwrap_or(Value::Null);

        if error.is_null() {
            let result = it.next().unwrap_or(Value::Null);
            return Ok(Self::success(id, result));
        }

        let desc: ErrorDescriptor = serde_json::from_value(error)
            .map_err(|e| WireCallError::Decode(format!("invalid error descriptor: {e}")))?;
        Ok(Self {
            id,
            outcome: Err(desc),
        })
    }
}
