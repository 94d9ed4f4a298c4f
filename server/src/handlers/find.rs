//! Supplemental `find` handler: the read-only counterpart to `click`'s text
//! resolution, returning every match instead of erroring on zero-or-many.

use bridge_types::{Direction, ReadScope, Role};
use serde::{Deserialize, Serialize};

use crate::error::BridgeError;
use crate::resolve::collect_text_matches;
use crate::server::Server;

#[derive(Clone, Debug, Deserialize)]
pub struct FindRequest {
    pub text: String,
    #[serde(default)]
    pub roles: Option<Vec<String>>,
    #[serde(default)]
    pub exact: bool,
    #[serde(default)]
    pub app: Option<String>,
    #[serde(default)]
    pub window: Option<String>,
    #[serde(default)]
    pub pid: Option<i32>,
    #[serde(default)]
    pub near: Option<Direction>,
}

#[derive(Clone, Debug, Serialize)]
pub struct FindMatch {
    pub id: i32,
    pub role: String,
    pub title: Option<String>,
    pub bounds: bridge_types::Bounds,
}

#[derive(Clone, Debug, Serialize)]
pub struct FindResponse {
    pub matches: Vec<FindMatch>,
}

pub fn find(server: &Server, req: &FindRequest) -> Result<FindResponse, BridgeError> {
    if req.text.is_empty() {
        return Err(BridgeError::ValidationError("`find` requires a non-empty `text`".to_string()));
    }
    let scope = ReadScope {
        app: req.app.clone(),
        window: req.window.clone(),
        window_id: None,
        pid: req.pid,
        depth: None,
    };
    let now = server.now_ms();
    let tree = server.with_backend(|b| server.cache.read_elements(b, &scope, now)).map_err(BridgeError::from)?;

    let role_list: Vec<Role> = req
        .roles
        .as_ref()
        .map(|rs| rs.iter().filter_map(|r| Role::from_code(r)).collect())
        .unwrap_or_default();
    let needle = req.text.to_ascii_lowercase();
    let mut found = Vec::new();
    collect_text_matches(&tree, &needle, req.exact, &role_list, &mut found);

    if let Some(direction) = req.near {
        found.retain(|el| {
            crate::resolve::find_nearest_interactive(&tree, &el.bounds, direction).is_some()
        });
    }

    let matches = found
        .into_iter()
        .map(|el| FindMatch {
            id: el.id,
            role: el.role.code().to_string(),
            title: el.title.clone(),
            bounds: el.bounds,
        })
        .collect();

    Ok(FindResponse { matches })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_backend::mock::MockBackend;
    use bridge_types::{Bounds, Element, Window};
    use std::sync::Arc;

    fn server() -> Server {
        let backend = MockBackend::new();
        let mut a = Element::new(1, Role::Btn);
        a.title = Some("Save".to_string());
        a.bounds = Bounds::new(0, 0, 40, 20);
        let mut b = Element::new(2, Role::Btn);
        b.title = Some("Save As".to_string());
        b.bounds = Bounds::new(50, 0, 60, 20);
        let root = Element {
            role: Role::Window,
            children: vec![a, b],
            ..Element::new(0, Role::Window)
        };
        backend.add_window(
            Window {
                app: "App".to_string(),
                pid: 1,
                title: "Main".to_string(),
                id: 1,
                bounds: Bounds::new(0, 0, 800, 600),
                focused: true,
            },
            root,
        );
        Server::new(Arc::new(backend), crate::config::BridgeConfig::default())
    }

    #[test]
    fn substring_match_returns_both_candidates() {
        let server = server();
        let req = FindRequest {
            text: "Save".to_string(),
            roles: None,
            exact: false,
            app: Some("App".to_string()),
            window: None,
            pid: None,
            near: None,
        };
        let resp = find(&server, &req).unwrap();
        assert_eq!(resp.matches.len(), 2);
    }

    #[test]
    fn exact_match_returns_one_candidate() {
        let server = server();
        let req = FindRequest {
            text: "Save".to_string(),
            roles: None,
            exact: true,
            app: Some("App".to_string()),
            window: None,
            pid: None,
            near: None,
        };
        let resp = find(&server, &req).unwrap();
        assert_eq!(resp.matches.len(), 1);
        assert_eq!(resp.matches[0].id, 1);
    }

    #[test]
    fn empty_text_is_a_validation_error() {
        let server = server();
        let req = FindRequest {
            text: String::new(),
            roles: None,
            exact: false,
            app: Some("App".to_string()),
            window: None,
            pid: None,
            near: None,
        };
        assert!(matches!(find(&server, &req), Err(BridgeError::ValidationError(_))));
    }

    #[test]
    fn zero_matches_is_not_an_error() {
        let server = server();
        let req = FindRequest {
            text: "Nonexistent".to_string(),
            roles: None,
            exact: false,
            app: Some("App".to_string()),
            window: None,
            pid: None,
            near: None,
        };
        assert_eq!(find(&server, &req).unwrap().matches.len(), 0);
    }
}
