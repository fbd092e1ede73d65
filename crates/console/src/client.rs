use common::rpc::{Envelope, ErrorCode, Procedure, ProcedureKind};
use common::types::SetInput;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::output::Output;
use crate::panels::Call;

pub const DEFAULT_RPC_URL: &str = "http://localhost:5555/trpc";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The server answered with an error envelope.
    #[error("{message}")]
    Remote { code: ErrorCode, message: String },
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("{0} cannot be called as a {1}")]
    WrongKind(Procedure, &'static str),
}

/// Client for the `/trpc` HTTP link.
#[derive(Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    base_url: String,
}

impl RpcClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run one query (`GET /<name>?input=<json>`).
    pub async fn query(&self, procedure: Procedure, input: Option<Value>) -> Result<Value, ClientError> {
        if procedure.kind() != ProcedureKind::Query {
            return Err(ClientError::WrongKind(procedure, "query"));
        }
        let mut req = self.http.get(format!("{}/{}", self.base_url, procedure.name()));
        if let Some(input) = input {
            req = req.query(&[("input", input.to_string())]);
        }
        debug!(%procedure, "rpc query");
        let envelope: Envelope = decode(req.send().await?).await?;
        envelope.into_result().map_err(remote)
    }

    /// Run one mutation (`POST /<name>` with the JSON input as body).
    pub async fn mutate(&self, procedure: Procedure, input: Option<Value>) -> Result<Value, ClientError> {
        if procedure.kind() != ProcedureKind::Mutation {
            return Err(ClientError::WrongKind(procedure, "mutation"));
        }
        let mut req = self.http.post(format!("{}/{}", self.base_url, procedure.name()));
        if let Some(input) = input {
            req = req.json(&input);
        }
        debug!(%procedure, "rpc mutation");
        let envelope: Envelope = decode(req.send().await?).await?;
        envelope.into_result().map_err(remote)
    }

    /// Send several queries in one HTTP request; results come back in call order.
    pub async fn batch_query(
        &self,
        calls: &[(Procedure, Value)],
    ) -> Result<Vec<Result<Value, ClientError>>, ClientError> {
        if let Some((p, _)) = calls.iter().find(|(p, _)| p.kind() != ProcedureKind::Query) {
            return Err(ClientError::WrongKind(*p, "query"));
        }
        let path = calls.iter().map(|(p, _)| p.name()).collect::<Vec<_>>().join(",");
        let inputs: Map<String, Value> =
            calls.iter().enumerate().map(|(i, (_, input))| (i.to_string(), input.clone())).collect();

        let req = self
            .http
            .get(format!("{}/{}", self.base_url, path))
            .query(&[("batch", "1".to_string()), ("input", Value::Object(inputs).to_string())]);
        let envelopes: Vec<Envelope> = decode(req.send().await?).await?;
        if envelopes.len() != calls.len() {
            return Err(ClientError::Decode(format!(
                "expected {} results, got {}",
                calls.len(),
                envelopes.len()
            )));
        }
        Ok(envelopes.into_iter().map(|e| e.into_result().map_err(remote)).collect())
    }

    pub async fn keys(&self, pattern: &str) -> Result<Vec<String>, ClientError> {
        typed(self.query(Procedure::Keys, Some(json!(pattern))).await?)
    }

    pub async fn get(&self, key: &str) -> Result<String, ClientError> {
        typed(self.query(Procedure::Get, Some(json!(key))).await?)
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<String, ClientError> {
        let input = SetInput { key: key.to_string(), value: value.to_string() };
        let input = serde_json::to_value(input).map_err(|e| ClientError::Decode(e.to_string()))?;
        typed(self.mutate(Procedure::Set, Some(input)).await?)
    }

    pub async fn delete(&self, key: &str) -> Result<i64, ClientError> {
        typed(self.mutate(Procedure::Delete, Some(json!(key))).await?)
    }

    pub async fn flush_all(&self) -> Result<String, ClientError> {
        typed(self.mutate(Procedure::FlushAll, None).await?)
    }

    /// Issue a panel's call and wrap the reply for display.
    pub async fn execute(&self, call: &Call) -> Result<Output, ClientError> {
        Ok(match call {
            Call::Keys(pattern) => Output::Keys(self.keys(pattern).await?),
            Call::Get(key) => Output::Value(self.get(key).await?),
            Call::Set { key, value } => Output::Ack(self.set(key, value).await?),
            Call::Delete(key) => Output::Deleted(self.delete(key).await?),
            Call::FlushAll => Output::Ack(self.flush_all().await?),
        })
    }
}

fn remote(e: common::rpc::ErrorBody) -> ClientError {
    ClientError::Remote { code: e.data.code, message: e.message }
}

fn typed<T: DeserializeOwned>(v: Value) -> Result<T, ClientError> {
    serde_json::from_value(v).map_err(|e| ClientError::Decode(e.to_string()))
}

/// Error statuses still carry envelopes; only fall back to the status when the body is not one.
async fn decode<T: DeserializeOwned>(res: reqwest::Response) -> Result<T, ClientError> {
    let status = res.status();
    let body = res.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        if status.is_success() {
            ClientError::Decode(e.to_string())
        } else {
            ClientError::Decode(format!("HTTP {status}: {body}"))
        }
    })
}
