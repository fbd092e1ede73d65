//! Wire types of the `/trpc` HTTP link, shared by the server and the console client.
//!
//! One call maps to one [`Envelope`]: `{"result":{"data":…}}` on success or
//! `{"error":{"message":…,"code":…,"data":{…}}}` on failure. Batched calls
//! answer with a JSON array of envelopes in call order.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Whether a procedure reads (GET) or writes (POST).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcedureKind {
    Query,
    Mutation,
}

/// Every procedure the proxy exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Procedure {
    Keys,
    Get,
    Set,
    Delete,
    FlushAll,
}

impl Procedure {
    pub const ALL: [Procedure; 5] = [
        Procedure::Keys,
        Procedure::Get,
        Procedure::Set,
        Procedure::Delete,
        Procedure::FlushAll,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Procedure::Keys => "keys",
            Procedure::Get => "get",
            Procedure::Set => "set",
            Procedure::Delete => "delete",
            Procedure::FlushAll => "flushAll",
        }
    }

    pub fn kind(self) -> ProcedureKind {
        match self {
            Procedure::Keys | Procedure::Get => ProcedureKind::Query,
            Procedure::Set | Procedure::Delete | Procedure::FlushAll => ProcedureKind::Mutation,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }
}

impl std::fmt::Display for Procedure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Error classes carried in `error.data.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    BadRequest,
    NotFound,
    MethodNotSupported,
    InternalServerError,
}

impl ErrorCode {
    /// JSON-RPC 2.0 style numeric code.
    pub fn json_rpc_code(self) -> i32 {
        match self {
            ErrorCode::BadRequest => -32600,
            ErrorCode::NotFound => -32004,
            ErrorCode::MethodNotSupported => -32005,
            ErrorCode::InternalServerError => -32603,
        }
    }

    pub fn http_status(self) -> u16 {
        match self {
            ErrorCode::BadRequest => 400,
            ErrorCode::NotFound => 404,
            ErrorCode::MethodNotSupported => 405,
            ErrorCode::InternalServerError => 500,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::MethodNotSupported => "METHOD_NOT_SUPPORTED",
            ErrorCode::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultBody {
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorData {
    pub code: ErrorCode,
    pub http_status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    pub code: i32,
    pub data: ErrorData,
}

/// Response of a single call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Envelope {
    Result { result: ResultBody },
    Error { error: ErrorBody },
}

impl Envelope {
    pub fn ok(data: Value) -> Self {
        Envelope::Result { result: ResultBody { data } }
    }

    pub fn err(code: ErrorCode, message: impl Into<String>, path: Option<&str>) -> Self {
        Envelope::Error {
            error: ErrorBody {
                message: message.into(),
                code: code.json_rpc_code(),
                data: ErrorData {
                    code,
                    http_status: code.http_status(),
                    path: path.map(str::to_string),
                },
            },
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Envelope::Result { .. } => 200,
            Envelope::Error { error } => error.data.http_status,
        }
    }

    pub fn into_result(self) -> Result<Value, ErrorBody> {
        match self {
            Envelope::Result { result } => Ok(result.data),
            Envelope::Error { error } => Err(error),
        }
    }
}

/// Overall HTTP status of a batch: the shared status if every envelope agrees, else 207.
pub fn batch_status(envelopes: &[Envelope]) -> u16 {
    let mut statuses = envelopes.iter().map(Envelope::http_status);
    match statuses.next() {
        None => 200,
        Some(first) if statuses.all(|s| s == first) => first,
        Some(_) => 207,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn procedure_names_resolve() {
        for p in Procedure::ALL {
            assert_eq!(Procedure::from_name(p.name()), Some(p));
        }
        assert_eq!(Procedure::from_name("flushall"), None);
        assert_eq!(Procedure::Get.kind(), ProcedureKind::Query);
        assert_eq!(Procedure::FlushAll.kind(), ProcedureKind::Mutation);
    }

    #[test]
    fn error_envelope_shape() {
        let env = Envelope::err(ErrorCode::BadRequest, "key must not be empty", Some("get"));
        let v = serde_json::to_value(&env).unwrap();
        assert_eq!(
            v,
            json!({"error": {
                "message": "key must not be empty",
                "code": -32600,
                "data": {"code": "BAD_REQUEST", "httpStatus": 400, "path": "get"}
            }})
        );
        let back: Envelope = serde_json::from_value(v).unwrap();
        assert_eq!(back, env);
    }

    #[test]
    fn result_envelope_parses() {
        let env: Envelope = serde_json::from_value(json!({"result": {"data": ["a", "b"]}})).unwrap();
        assert_eq!(env.into_result().unwrap(), json!(["a", "b"]));
    }

    #[test]
    fn batch_status_mixed_is_multi_status() {
        let ok = Envelope::ok(json!(1));
        let bad = Envelope::err(ErrorCode::BadRequest, "x", None);
        assert_eq!(batch_status(&[ok.clone(), ok.clone()]), 200);
        assert_eq!(batch_status(&[bad.clone(), bad.clone()]), 400);
        assert_eq!(batch_status(&[ok, bad]), 207);
        assert_eq!(batch_status(&[]), 200);
    }
}
