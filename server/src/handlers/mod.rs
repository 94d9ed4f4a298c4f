pub mod actions;
pub mod batch;
pub mod clipboard;
pub mod find;
pub mod list;
pub mod observe;
pub mod open;
pub mod read;
pub mod screenshot;
pub mod wait;

use serde::Serialize;
use serde_json::json;

use crate::error::BridgeError;

/// Wraps a handler's typed result into the shared `{ok, action, error?,
/// …payload}` response schema (spec §4.6).
///
/// A payload may already carry its own `ok` field (e.g. `click`'s
/// `VerifyFailed` case, spec §7: a verified click that exhausts its retries
/// without an observed change still completes cleanly, but must report
/// `ok:false`) — that value is preserved rather than overwritten.
pub fn envelope<T: Serialize>(action: &str, result: Result<T, BridgeError>) -> serde_json::Value {
    match result {
        Ok(payload) => {
            let mut value = serde_json::to_value(payload).unwrap_or_else(|_| json!({}));
            if let serde_json::Value::Object(ref mut map) = value {
                map.entry("ok".to_string()).or_insert_with(|| json!(true));
                map.insert("action".to_string(), json!(action));
            }
            value
        }
        Err(err) => json!({
            "ok": false,
            "action": action,
            "error": err.to_string(),
            "kind": err.kind(),
        }),
    }
}
