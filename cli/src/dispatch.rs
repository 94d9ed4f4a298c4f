//! Maps a parsed [`Command`] onto the request-engine handlers and prints the
//! shared `{ok, action, …}` envelope (spec §4.6) to stdout.

use std::io::IsTerminal;

use bridge_server::handlers::{actions, batch, clipboard, find, list, observe, open, read, screenshot, wait};
use bridge_server::{envelope, Server};
use bridge_types::Bounds;
use serde::Serialize;

use crate::args::Command;

#[derive(Serialize)]
struct ObserveDone {}

/// Spec §4.8's "structured on a terminal, agent format when piped" rule,
/// resolved here rather than in the request engine (the core takes no
/// dependency on terminal detection).
fn default_read_format() -> Option<String> {
    if std::io::stdout().is_terminal() {
        None
    } else {
        Some("agent".to_string())
    }
}

pub fn run(server: &Server, command: Command) -> anyhow::Result<serde_json::Value> {
    let value = match command {
        Command::List { apps, app_filter, pid } => {
            let req = list::ListRequest { apps, app_filter, pid };
            envelope("list", list::list(server, &req))
        }
        Command::Read {
            scope,
            window_id,
            depth,
            roles,
            text,
            bbox,
            focused,
            scope_id,
            children,
            flat,
            prune,
            format,
            with_refs,
            since,
            raw,
        } => {
            let used_default_format = format.is_none();
            let format = format.or_else(default_read_format);
            let bbox = bbox.map(|s| parse_bbox(&s)).transpose()?;
            let req = read::ReadRequest {
                app: scope.app,
                window: scope.window,
                window_id,
                pid: scope.pid,
                depth,
                roles,
                bbox,
                text,
                focused,
                scope_id,
                children,
                flat,
                prune,
                format,
                used_default_format,
                with_refs,
                since,
                raw,
            };
            envelope("read", read::read(server, &req))
        }
        Command::Click {
            scope,
            target,
            button,
            count,
            near,
            verify,
            post_read,
        } => {
            let req = actions::ClickRequest {
                target: target.resolve()?,
                app: scope.app,
                window: scope.window,
                pid: scope.pid,
                button,
                count,
                near: near.map(Into::into),
                verify,
                post_read,
            };
            envelope("click", actions::click(server, &req))
        }
        Command::Type { scope, target, text, key, delay_ms } => {
            let req = actions::TypeRequest {
                text,
                key,
                target: target.resolve_opt(),
                app: scope.app,
                window: scope.window,
                pid: scope.pid,
                delay_ms,
            };
            envelope("type", actions::type_text(server, &req))
        }
        Command::Action { scope, target, name, post_read } => {
            let req = actions::ActionRequest {
                target: target.resolve()?,
                app: scope.app,
                window: scope.window,
                pid: scope.pid,
                name,
                post_read,
            };
            envelope("action", actions::action(server, &req))
        }
        Command::SetValue { scope, target, value, attribute } => {
            let req = actions::SetValueRequest {
                target: target.resolve()?,
                value,
                app: scope.app,
                window: scope.window,
                pid: scope.pid,
                attribute,
            };
            envelope("set_value", actions::set_value(server, &req))
        }
        Command::Scroll { scope, target, direction, amount } => {
            let req = actions::ScrollRequest {
                target: target.resolve_opt(),
                x: target.x,
                y: target.y,
                direction: direction.into(),
                amount,
                app: scope.app,
                window: scope.window,
                pid: scope.pid,
            };
            envelope("scroll", actions::scroll(server, &req))
        }
        Command::Hover { scope, target, post_read } => {
            let req = actions::HoverRequest {
                target: target.resolve_opt(),
                x: target.x,
                y: target.y,
                app: scope.app,
                window: scope.window,
                pid: scope.pid,
                post_read,
            };
            envelope("hover", actions::hover(server, &req))
        }
        Command::Drag {
            scope,
            from_id,
            from_ref,
            from_text,
            from_x,
            from_y,
            to_id,
            to_ref,
            to_text,
            to_x,
            to_y,
        } => {
            let from = target_spec_from(from_id, from_ref, from_text, from_x, from_y)
                .ok_or_else(|| anyhow::anyhow!("--from-id, --from-ref, --from-text, or --from-x/--from-y is required"))?;
            let to = target_spec_from(to_id, to_ref, to_text, to_x, to_y)
                .ok_or_else(|| anyhow::anyhow!("--to-id, --to-ref, --to-text, or --to-x/--to-y is required"))?;
            let req = actions::DragRequest {
                from,
                to,
                app: scope.app,
                window: scope.window,
                pid: scope.pid,
            };
            envelope("drag", actions::drag(server, &req))
        }
        Command::Focus { scope, window_id } => {
            let req = actions::FocusRequest {
                app: scope.app,
                window: scope.window,
                window_id,
                pid: scope.pid,
            };
            envelope("focus", actions::focus(server, &req))
        }
        Command::Wait {
            scope,
            for_text,
            for_role,
            for_id,
            gone,
            timeout_sec,
            interval_ms,
        } => {
            let req = wait::WaitRequest {
                app: scope.app,
                window: scope.window,
                pid: scope.pid,
                for_text,
                for_role,
                for_id,
                gone,
                timeout_sec,
                interval_ms,
            };
            envelope("wait", wait::wait(server, &req))
        }
        Command::Observe {
            scope,
            interval_ms,
            duration_sec,
            ignore_bounds,
            ignore_focus,
        } => {
            let req = observe::ObserveRequest {
                app: scope.app,
                window: scope.window,
                pid: scope.pid,
                interval_ms,
                duration_sec,
                ignore_bounds,
                ignore_focus,
            };
            // No OS signal wiring at this layer yet: an unbound, never-sent
            // channel means the loop only ends via `duration_sec` or the
            // process being killed.
            let (_tx, rx) = crossbeam_channel::unbounded();
            let result = observe::observe(server, &req, &rx, |event| {
                if let Ok(line) = serde_json::to_string(&event) {
                    println!("{line}");
                }
            });
            envelope("observe", result.map(|_| ObserveDone {}))
        }
        Command::Screenshot {
            scope,
            full_screen,
            include_menubar,
            format,
            quality,
            scale,
            out_file,
        } => {
            let req = screenshot::ScreenshotRequest {
                app: scope.app,
                window: scope.window,
                pid: scope.pid,
                full_screen,
                include_menubar,
                format,
                quality,
                scale,
                out_file,
            };
            envelope("screenshot", screenshot::screenshot(server, &req))
        }
        Command::Open { target, wait_for_app, wait_timeout_sec } => {
            let req = open::OpenRequest { target, wait_for_app, wait_timeout_sec };
            envelope("open", open::open(server, &req))
        }
        Command::Batch { file, json } => {
            let raw = match (file, json) {
                (Some(path), _) => std::fs::read_to_string(path)?,
                (None, Some(json)) => json,
                (None, None) => anyhow::bail!("`batch` requires --file or --json"),
            };
            let req: batch::BatchRequest = serde_json::from_str(&raw)?;
            envelope("batch", batch::batch(server, &req))
        }
        Command::Find { scope, text, roles, exact, near } => {
            let req = find::FindRequest {
                text,
                roles,
                exact,
                app: scope.app,
                window: scope.window,
                pid: scope.pid,
                near: near.map(Into::into),
            };
            envelope("find", find::find(server, &req))
        }
        Command::ClipboardGet => envelope("clipboard_get", clipboard::clipboard_get(server)),
        Command::ClipboardSet { text } => envelope(
            "clipboard_set",
            clipboard::clipboard_set(server, &clipboard::ClipboardSetRequest { text }),
        ),
        Command::ClipboardClear => envelope("clipboard_clear", clipboard::clipboard_clear(server)),
        Command::ClipboardGrab { scope, window_id } => {
            let req = clipboard::ClipboardGrabRequest {
                app: scope.app,
                window: scope.window,
                window_id,
                pid: scope.pid,
            };
            envelope("clipboard_grab", clipboard::clipboard_grab(server, &req))
        }
    };

    Ok(value)
}

fn parse_bbox(s: &str) -> anyhow::Result<Bounds> {
    let parts: Vec<i32> = s.split(',').map(|p| p.trim().parse()).collect::<Result<_, _>>()?;
    match parts[..] {
        [x, y, w, h] => Ok(Bounds::new(x, y, w, h)),
        _ => anyhow::bail!("--bbox expects \"x,y,w,h\""),
    }
}

fn target_spec_from(
    id: Option<i32>,
    ref_: Option<String>,
    text: Option<String>,
    x: Option<i32>,
    y: Option<i32>,
) -> Option<bridge_types::TargetSpec> {
    if let Some(id) = id {
        return Some(bridge_types::TargetSpec::Id { id });
    }
    if let Some(ref_) = ref_ {
        return Some(bridge_types::TargetSpec::Ref { ref_ });
    }
    if let Some(text) = text {
        return Some(bridge_types::TargetSpec::Text {
            text,
            roles: None,
            scope_id: None,
            exact: false,
        });
    }
    if let (Some(x), Some(y)) = (x, y) {
        return Some(bridge_types::TargetSpec::Point { x, y });
    }
    None
}
