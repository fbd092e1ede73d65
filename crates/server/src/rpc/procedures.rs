//! Procedure bodies: validate the input shape, forward to the store, return the reply verbatim.

use common::rpc::Procedure;
use common::types::SetInput;
use serde_json::{json, Value};
use service::KvStore;
use tracing::info;

use crate::errors::RpcError;

pub async fn dispatch(
    store: &dyn KvStore,
    procedure: Procedure,
    input: Option<Value>,
) -> Result<Value, RpcError> {
    match procedure {
        Procedure::Keys => {
            let pattern = non_empty_string(input, "pattern")?;
            Ok(json!(store.keys(&pattern).await?))
        }
        Procedure::Get => {
            let key = non_empty_string(input, "key")?;
            Ok(json!(store.get(&key).await?))
        }
        Procedure::Set => {
            let SetInput { key, value } = set_input(input)?;
            info!(procedure = %procedure, %key, "set key");
            Ok(json!(store.set(&key, &value).await?))
        }
        Procedure::Delete => {
            let key = non_empty_string(input, "key")?;
            info!(procedure = %procedure, %key, "delete key");
            Ok(json!(store.delete(&key).await?))
        }
        Procedure::FlushAll => {
            info!(procedure = %procedure, "flushing all databases");
            Ok(json!(store.flush_all().await?))
        }
    }
}

fn non_empty_string(input: Option<Value>, field: &str) -> Result<String, RpcError> {
    match input {
        Some(Value::String(s)) if !s.is_empty() => Ok(s),
        Some(Value::String(_)) => Err(RpcError::bad_request(format!("{field} must not be empty"))),
        None | Some(Value::Null) => Err(RpcError::bad_request(format!("{field} is required"))),
        Some(other) => Err(RpcError::bad_request(format!(
            "{field} must be a string, got {}",
            type_name(&other)
        ))),
    }
}

fn set_input(input: Option<Value>) -> Result<SetInput, RpcError> {
    let value = input.ok_or_else(|| RpcError::bad_request("set requires {\"key\", \"value\"}"))?;
    let parsed: SetInput = serde_json::from_value(value)
        .map_err(|e| RpcError::bad_request(format!("invalid set input: {e}")))?;
    if parsed.key.is_empty() {
        return Err(RpcError::bad_request("key must not be empty"));
    }
    Ok(parsed)
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::rpc::ErrorCode;
    use service::store::MemoryStore;

    #[tokio::test]
    async fn keys_get_delete_scenario() {
        let store = MemoryStore::with_entries([("a", "1"), ("b", "2")]);

        let keys = dispatch(&store, Procedure::Keys, Some(json!("*"))).await.unwrap();
        assert_eq!(keys, json!(["a", "b"]));
        let v = dispatch(&store, Procedure::Get, Some(json!("a"))).await.unwrap();
        assert_eq!(v, json!("1"));
        let n = dispatch(&store, Procedure::Delete, Some(json!("a"))).await.unwrap();
        assert_eq!(n, json!(1));
        let v = dispatch(&store, Procedure::Get, Some(json!("a"))).await.unwrap();
        assert_eq!(v, json!(""));
        let keys = dispatch(&store, Procedure::Keys, Some(json!("*"))).await.unwrap();
        assert_eq!(keys, json!(["b"]));
    }

    #[tokio::test]
    async fn empty_or_missing_key_is_bad_request() {
        let store = MemoryStore::new();
        for input in [Some(json!("")), None, Some(Value::Null), Some(json!(42))] {
            let err = dispatch(&store, Procedure::Get, input).await.unwrap_err();
            assert_eq!(err.code, ErrorCode::BadRequest);
        }
    }

    #[tokio::test]
    async fn set_takes_key_and_value() {
        let store = MemoryStore::new();
        let ack = dispatch(&store, Procedure::Set, Some(json!({"key": "cfg", "value": "{\"a\":1}"})))
            .await
            .unwrap();
        assert_eq!(ack, json!("OK"));
        assert_eq!(store.get("cfg").await.unwrap(), "{\"a\":1}");

        let err = dispatch(&store, Procedure::Set, Some(json!({"key": "", "value": "x"})))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BadRequest);
        let err = dispatch(&store, Procedure::Set, Some(json!("cfg"))).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BadRequest);
    }

    #[tokio::test]
    async fn flush_all_ignores_input() {
        let store = MemoryStore::with_entries([("a", "1")]);
        let ack = dispatch(&store, Procedure::FlushAll, Some(json!("whatever"))).await.unwrap();
        assert_eq!(ack, json!("OK"));
        assert!(store.is_empty().await);
    }
}
