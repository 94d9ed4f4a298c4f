//! Supplemental clipboard handlers: `clipboard_get`, `clipboard_set`,
//! `clipboard_clear`, `clipboard_grab` (an optional focus then a get, for
//! "select this field and read back what's in it" scripting).

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;
use crate::handlers::actions::{focus, FocusRequest};
use crate::server::Server;

#[derive(Clone, Debug, Serialize)]
pub struct ClipboardTextResponse {
    pub text: String,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ClipboardUnitResponse {}

pub fn clipboard_get(server: &Server) -> Result<ClipboardTextResponse, BridgeError> {
    let text = server.with_backend(|b| b.get_text()).map_err(BridgeError::from)?;
    Ok(ClipboardTextResponse { text })
}

#[derive(Clone, Debug, Deserialize)]
pub struct ClipboardSetRequest {
    pub text: String,
}

pub fn clipboard_set(server: &Server, req: &ClipboardSetRequest) -> Result<ClipboardUnitResponse, BridgeError> {
    server.with_backend(|b| b.set_text(&req.text)).map_err(BridgeError::from)?;
    Ok(ClipboardUnitResponse {})
}

pub fn clipboard_clear(server: &Server) -> Result<ClipboardUnitResponse, BridgeError> {
    server.with_backend(|b| b.clear()).map_err(BridgeError::from)?;
    Ok(ClipboardUnitResponse {})
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ClipboardGrabRequest {
    #[serde(default)]
    pub app: Option<String>,
    #[serde(default)]
    pub window: Option<String>,
    #[serde(default)]
    pub window_id: Option<i64>,
    #[serde(default)]
    pub pid: Option<i32>,
}

pub fn clipboard_grab(server: &Server, req: &ClipboardGrabRequest) -> Result<ClipboardTextResponse, BridgeError> {
    if req.app.is_some() || req.window.is_some() || req.window_id.is_some() || req.pid.is_some() {
        focus(
            server,
            &FocusRequest {
                app: req.app.clone(),
                window: req.window.clone(),
                window_id: req.window_id,
                pid: req.pid,
            },
        )?;
    }
    clipboard_get(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_backend::mock::MockBackend;
    use std::sync::Arc;

    fn server() -> Server {
        let backend = MockBackend::new();
        Server::new(Arc::new(backend), crate::config::BridgeConfig::default())
    }

    #[test]
    fn set_then_get_roundtrips() {
        let server = server();
        clipboard_set(
            &server,
            &ClipboardSetRequest {
                text: "hello".to_string(),
            },
        )
        .unwrap();
        assert_eq!(clipboard_get(&server).unwrap().text, "hello");
    }

    #[test]
    fn clear_empties_the_clipboard() {
        let server = server();
        clipboard_set(
            &server,
            &ClipboardSetRequest {
                text: "hello".to_string(),
            },
        )
        .unwrap();
        clipboard_clear(&server).unwrap();
        assert_eq!(clipboard_get(&server).unwrap().text, "");
    }
}
