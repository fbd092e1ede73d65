//! `/trpc` HTTP link.
//!
//! `GET /trpc/keys?input="user:*"` runs one query, `POST /trpc/delete` with a
//! JSON body runs one mutation. With `?batch=1` the path may name several
//! procedures separated by commas; their inputs arrive as an object keyed by
//! call index and the reply is an array of envelopes in call order. Calls of
//! one batch run concurrently.

pub mod procedures;

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::rpc::{batch_status, Envelope, ErrorCode, Procedure, ProcedureKind};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::errors::RpcError;
use crate::routes::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RpcParams {
    pub batch: Option<String>,
    pub input: Option<String>,
}

impl RpcParams {
    fn is_batch(&self) -> bool {
        matches!(self.batch.as_deref(), Some("1") | Some("true"))
    }
}

pub async fn handle_query(
    State(state): State<AppState>,
    Path(procs): Path<String>,
    Query(params): Query<RpcParams>,
) -> Response {
    let batch = params.is_batch();
    handle(state, ProcedureKind::Query, &procs, batch, params.input.as_deref()).await
}

pub async fn handle_mutation(
    State(state): State<AppState>,
    Path(procs): Path<String>,
    Query(params): Query<RpcParams>,
    body: String,
) -> Response {
    let raw = if body.trim().is_empty() { None } else { Some(body.as_str()) };
    handle(state, ProcedureKind::Mutation, &procs, params.is_batch(), raw).await
}

async fn handle(
    state: AppState,
    kind: ProcedureKind,
    procs: &str,
    batch: bool,
    raw_input: Option<&str>,
) -> Response {
    let names: Vec<String> = procs.split(',').map(str::to_string).collect();

    if !batch {
        if names.len() > 1 {
            return RpcError::bad_request("calling several procedures requires batch=1").into_response();
        }
        let input = match parse_json(raw_input) {
            Ok(v) => v,
            Err(e) => return e.with_path(procs).into_response(),
        };
        let env = call(state, names[0].clone(), kind, input).await;
        return envelope_response(env);
    }

    let mut inputs = match parse_batch_inputs(raw_input) {
        Ok(map) => map,
        Err(e) => {
            let envs: Vec<Envelope> =
                names.iter().map(|n| e.to_envelope_at(n)).collect();
            return batch_response(envs);
        }
    };

    let handles: Vec<_> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let input = inputs.remove(&i.to_string()).filter(|v| !v.is_null());
            tokio::spawn(call(state.clone(), name.clone(), kind, input))
        })
        .collect();

    let mut envs = Vec::with_capacity(handles.len());
    for (handle, name) in handles.into_iter().zip(&names) {
        match handle.await {
            Ok(env) => envs.push(env),
            Err(e) => {
                error!(procedure = %name, error = %e, "rpc task failed");
                envs.push(Envelope::err(ErrorCode::InternalServerError, "procedure task failed", Some(name)));
            }
        }
    }
    batch_response(envs)
}

/// Resolve, kind-check and run one call; every failure becomes an error envelope.
async fn call(state: AppState, name: String, kind: ProcedureKind, input: Option<Value>) -> Envelope {
    let Some(procedure) = Procedure::from_name(&name) else {
        return Envelope::err(ErrorCode::NotFound, format!("no procedure on path \"{name}\""), Some(&name));
    };
    if procedure.kind() != kind {
        let (verb, wanted) = match kind {
            ProcedureKind::Query => ("GET", "mutation"),
            ProcedureKind::Mutation => ("POST", "query"),
        };
        return Envelope::err(
            ErrorCode::MethodNotSupported,
            format!("unsupported {verb} request to {wanted} procedure at path \"{name}\""),
            Some(&name),
        );
    }

    debug!(procedure = %procedure, "rpc call");
    match procedures::dispatch(state.store.as_ref(), procedure, input).await {
        Ok(data) => Envelope::ok(data),
        Err(e) => {
            if e.code == ErrorCode::InternalServerError {
                error!(procedure = %procedure, error = %e, "store call failed");
            } else {
                warn!(procedure = %procedure, error = %e, "rejected rpc input");
            }
            e.with_path(&name).to_envelope()
        }
    }
}

fn parse_json(raw: Option<&str>) -> Result<Option<Value>, RpcError> {
    match raw {
        None => Ok(None),
        Some(s) => {
            let v: Value = serde_json::from_str(s)
                .map_err(|e| RpcError::bad_request(format!("input is not valid JSON: {e}")))?;
            Ok(if v.is_null() { None } else { Some(v) })
        }
    }
}

fn parse_batch_inputs(raw: Option<&str>) -> Result<HashMap<String, Value>, RpcError> {
    match parse_json(raw)? {
        None => Ok(HashMap::new()),
        Some(Value::Object(map)) => Ok(map.into_iter().collect()),
        Some(_) => Err(RpcError::bad_request("batch input must be an object keyed by call index")),
    }
}

impl RpcError {
    fn to_envelope_at(&self, path: &str) -> Envelope {
        Envelope::err(self.code, self.message.clone(), Some(path))
    }
}

fn status_of(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn envelope_response(env: Envelope) -> Response {
    (status_of(env.http_status()), Json(env)).into_response()
}

fn batch_response(envs: Vec<Envelope>) -> Response {
    (status_of(batch_status(&envs)), Json(envs)).into_response()
}
