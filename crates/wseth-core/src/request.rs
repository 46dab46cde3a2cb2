//! JSON-RPC 2.0 wire types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC request ID (string, number or null).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcId {
    Number(u64),
    String(String),
    Null,
}

impl RpcId {
    /// The numeric id, if this is one. Only numeric ids are ever issued by
    /// the client, so anything else cannot correlate with a pending call.
    pub fn as_number(&self) -> Option<u64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl std::fmt::Display for RpcId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Null => write!(f, "null"),
        }
    }
}

/// A single JSON-RPC parameter value.
pub type RpcParam = Value;

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Vec<RpcParam>,
    pub id: RpcId,
}

impl JsonRpcRequest {
    /// Create a new JSON-RPC 2.0 request.
    pub fn new(id: u64, method: impl Into<String>, params: Vec<RpcParam>) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            method: method.into(),
            params,
            id: RpcId::Number(id),
        }
    }
}

/// Build the positional params array for a call.
///
/// An array is spread into the envelope, any other truthy value becomes the
/// single element. The trailing parameter (e.g. a default block tag) is
/// appended only when truthy: a falsy trailing value is omitted, never sent
/// as `null`.
pub fn flatten_params(params: Value, trailing: Option<Value>) -> Vec<RpcParam> {
    let mut out = match params {
        Value::Array(items) => items,
        other if is_truthy(&other) => vec![other],
        _ => Vec::new(),
    };
    if let Some(extra) = trailing.filter(is_truthy) {
        out.push(extra);
    }
    out
}

/// Loose truthiness used for optional positional params:
/// `null`, `false`, `0` and `""` are falsy, everything else is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// Interpret an arbitrary `error` member. Nodes that do not follow the
    /// `{code, message}` shape still reject the call, with the raw payload
    /// kept in `data`.
    pub fn from_value(value: Value) -> Self {
        match serde_json::from_value::<JsonRpcError>(value.clone()) {
            Ok(err) => err,
            Err(_) => Self {
                code: 0,
                message: match &value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                },
                data: Some(value),
            },
        }
    }
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JSON-RPC error {}: {}", self.code, self.message)
    }
}

/// A JSON-RPC 2.0 response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: RpcId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// The call outcome. A response with neither member resolves to `null`.
    pub fn into_result(self) -> Result<Value, JsonRpcError> {
        if let Some(err) = self.error {
            Err(err)
        } else {
            Ok(self.result.unwrap_or(Value::Null))
        }
    }
}

/// A server-pushed subscription event
/// (`{"method": "eth_subscription", "params": {"subscription", "result"}}`).
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionNotification {
    pub method: String,
    pub subscription: String,
    pub result: Value,
}

/// A classified inbound frame.
#[derive(Debug, Clone)]
pub enum Inbound {
    Notification(SubscriptionNotification),
    Response(JsonRpcResponse),
}

impl Inbound {
    /// Classify a text frame. Returns `None` for anything that is not a
    /// JSON-RPC 2.0 envelope; such frames are noise, not errors.
    pub fn parse(text: &str) -> Option<Self> {
        if !text.trim_start().starts_with('{') {
            return None;
        }
        let Ok(Value::Object(mut obj)) = serde_json::from_str::<Value>(text) else {
            return None;
        };
        if obj.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
            return None;
        }

        if let Some(method) = obj.get("method").and_then(Value::as_str) {
            // Node-to-client requests other than subscription pushes are not
            // part of the protocol this client speaks.
            if !method.contains("_subscription") {
                return None;
            }
            let method = method.to_string();
            let mut params = obj.remove("params")?;
            let subscription = match params.get("subscription")? {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => return None,
            };
            let result = params
                .get_mut("result")
                .map(Value::take)
                .unwrap_or(Value::Null);
            return Some(Self::Notification(SubscriptionNotification {
                method,
                subscription,
                result,
            }));
        }

        let id = obj
            .remove("id")
            .and_then(|v| serde_json::from_value::<RpcId>(v).ok())
            .unwrap_or(RpcId::Null);
        let error = obj
            .remove("error")
            .filter(|e| !e.is_null())
            .map(JsonRpcError::from_value);
        Some(Self::Response(JsonRpcResponse {
            jsonrpc: "2.0".into(),
            id,
            result: obj.remove("result"),
            error,
        }))
    }
}
