//! `list` handler (spec §4.6).

use std::collections::BTreeSet;

use bridge_types::Window;
use serde::{Deserialize, Serialize};

use crate::error::BridgeError;
use crate::server::Server;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ListRequest {
    #[serde(default)]
    pub apps: bool,
    #[serde(default)]
    pub app_filter: Option<String>,
    #[serde(default)]
    pub pid: Option<i32>,
}

#[derive(Clone, Debug, Serialize)]
pub struct AppEntry {
    pub app: String,
    pub pid: i32,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ListResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub windows: Option<Vec<Window>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apps: Option<Vec<AppEntry>>,
}

pub fn list(server: &Server, req: &ListRequest) -> Result<ListResponse, BridgeError> {
    let mut windows = server
        .with_backend(|b| b.list_windows(req.app_filter.as_deref(), req.pid))
        .map_err(BridgeError::from)?;

    let frontmost_app = server.with_backend(|b| b.frontmost_app()).ok().map(|(app, _)| app);
    for (i, window) in windows.iter_mut().enumerate() {
        window.focused = i == 0 && frontmost_app.as_deref() == Some(window.app.as_str());
    }

    windows.sort_by(|a, b| match (a.focused, b.focused) {
        (true, false) => std::cmp::Ordering::Less,
        (false, true) => std::cmp::Ordering::Greater,
        _ => a.app.to_lowercase().cmp(&b.app.to_lowercase()),
    });

    if req.apps {
        let mut seen = BTreeSet::new();
        let apps = windows
            .iter()
            .filter(|w| seen.insert((w.app.clone(), w.pid)))
            .map(|w| AppEntry {
                app: w.app.clone(),
                pid: w.pid,
            })
            .collect();
        Ok(ListResponse {
            windows: None,
            apps: Some(apps),
        })
    } else {
        Ok(ListResponse {
            windows: Some(windows),
            apps: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_backend::mock::MockBackend;
    use bridge_types::{Bounds, Element, Role};
    use std::sync::Arc;

    fn make_server() -> Server {
        let backend = MockBackend::new();
        backend.add_window(
            Window {
                app: "Alpha".to_string(),
                pid: 1,
                title: "A".to_string(),
                id: 1,
                bounds: Bounds::new(0, 0, 10, 10),
                focused: false,
            },
            Element::new(0, Role::Window),
        );
        backend.add_window(
            Window {
                app: "Zebra".to_string(),
                pid: 2,
                title: "Z".to_string(),
                id: 2,
                bounds: Bounds::new(0, 0, 10, 10),
                focused: false,
            },
            Element::new(0, Role::Window),
        );
        Server::new(Arc::new(backend), crate::config::BridgeConfig::default())
    }

    #[test]
    fn sorts_focused_first_then_alphabetically() {
        let server = make_server();
        let resp = list(&server, &ListRequest::default()).unwrap();
        let windows = resp.windows.unwrap();
        assert_eq!(windows[0].app, "Alpha");
        assert!(windows[0].focused);
    }

    #[test]
    fn apps_flag_deduplicates() {
        let server = make_server();
        let resp = list(
            &server,
            &ListRequest {
                apps: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(resp.apps.unwrap().len(), 2);
    }
}
