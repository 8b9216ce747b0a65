//! Wire format: one JSON object per line

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::RpcError;

/// A request or notification sent to us by the editor
#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    Request {
        id: u64,
        method: String,
        params: Value,
    },
    Notification {
        method: String,
        params: Value,
    },
}

impl Incoming {
    pub fn method(&self) -> &str {
        match self {
            Incoming::Request { method, .. } | Incoming::Notification { method, .. } => method,
        }
    }

    pub fn params(&self) -> &Value {
        match self {
            Incoming::Request { params, .. } | Incoming::Notification { params, .. } => params,
        }
    }

    /// Id to answer, if the sender expects a response
    pub fn id(&self) -> Option<u64> {
        match self {
            Incoming::Request { id, .. } => Some(*id),
            Incoming::Notification { .. } => None,
        }
    }
}

/// Any decoded inbound line
#[derive(Debug)]
pub(crate) enum Message {
    Response {
        id: u64,
        result: Result<Value, RpcError>,
    },
    Incoming(Incoming),
}

#[derive(Deserialize)]
struct RawMessage {
    id: Option<u64>,
    method: Option<String>,
    #[serde(default)]
    params: Value,
    // `"result": null` deserializes as None; a response is anything with an
    // id and no method.
    result: Option<Value>,
    error: Option<Value>,
}

pub(crate) fn decode(line: &str) -> Result<Message, RpcError> {
    let raw: RawMessage = serde_json::from_str(line)?;
    match (raw.id, raw.method) {
        (id, Some(method)) => {
            let incoming = match id {
                Some(id) => Incoming::Request {
                    id,
                    method,
                    params: raw.params,
                },
                None => Incoming::Notification {
                    method,
                    params: raw.params,
                },
            };
            Ok(Message::Incoming(incoming))
        }
        (Some(id), None) => {
            let result = match raw.error {
                Some(error) => Err(RpcError::Remote(error)),
                None => Ok(raw.result.unwrap_or(Value::Null)),
            };
            Ok(Message::Response { id, result })
        }
        (None, None) => Err(RpcError::Protocol(
            "message has neither an id nor a method".to_string(),
        )),
    }
}

#[derive(Serialize)]
pub(crate) struct OutboundRequest<'a> {
    pub id: u64,
    pub method: &'a str,
    pub params: &'a Value,
}

#[derive(Serialize)]
pub(crate) struct OutboundNotification<'a> {
    pub method: &'a str,
    pub params: &'a Value,
}

#[derive(Serialize)]
pub(crate) struct OutboundResponse<'a> {
    pub id: u64,
    pub result: &'a Value,
}
