//! `observe` handler (spec §4.6): streams newline-delimited JSON diff events
//! until the caller cancels or a duration elapses. Always bypasses the tree
//! cache so every poll reflects live state.

use std::thread::sleep;
use std::time::{Duration, Instant};

use bridge_consumer::{diff as diff_engine, ops};
use bridge_types::{Element, FlatElement, ObserveEvent, ReadScope};
use crossbeam_channel::Receiver;
use serde::Deserialize;

use crate::error::BridgeError;
use crate::server::Server;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ObserveRequest {
    #[serde(default)]
    pub app: Option<String>,
    #[serde(default)]
    pub window: Option<String>,
    #[serde(default)]
    pub pid: Option<i32>,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default)]
    pub duration_sec: Option<f64>,
    #[serde(default)]
    pub ignore_bounds: bool,
    #[serde(default)]
    pub ignore_focus: bool,
}

fn default_interval_ms() -> u64 {
    500
}

fn normalize(mut flat: Vec<FlatElement>, req: &ObserveRequest) -> Vec<FlatElement> {
    if req.ignore_bounds || req.ignore_focus {
        for el in &mut flat {
            if req.ignore_bounds {
                el.bounds = bridge_types::Bounds::ZERO;
            }
            if req.ignore_focus {
                el.focused = false;
            }
        }
    }
    flat
}

/// Runs the poll loop, pushing one [`ObserveEvent`] per transition to
/// `emit`. `cancel` fires (or is dropped) to end the stream early; an
/// absent `duration_sec` means "until cancelled".
pub fn observe(
    server: &Server,
    req: &ObserveRequest,
    cancel: &Receiver<()>,
    mut emit: impl FnMut(ObserveEvent),
) -> Result<(), BridgeError> {
    let scope = ReadScope {
        app: req.app.clone(),
        window: req.window.clone(),
        window_id: None,
        pid: req.pid,
        depth: None,
    };

    let root = server.with_backend(|b| b.read_elements(&scope)).map_err(BridgeError::from)?;
    let mut prev = normalize(ops::flatten(&root), req);
    emit(ObserveEvent::Snapshot { count: prev.len() });

    let deadline = req.duration_sec.map(|secs| Instant::now() + Duration::from_secs_f64(secs.max(0.0)));

    let mut total_added = 0usize;
    let mut total_removed = 0usize;
    let mut total_changed = 0usize;

    loop {
        if cancel.try_recv().is_ok() {
            emit(ObserveEvent::Done {
                added: total_added,
                removed: total_removed,
                changed: total_changed,
            });
            return Ok(());
        }
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                emit(ObserveEvent::Done {
                    added: total_added,
                    removed: total_removed,
                    changed: total_changed,
                });
                return Ok(());
            }
        }

        match cancel.recv_timeout(Duration::from_millis(req.interval_ms.max(1))) {
            Ok(()) | Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                emit(ObserveEvent::Done {
                    added: total_added,
                    removed: total_removed,
                    changed: total_changed,
                });
                return Ok(());
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
        }

        let root: Element = match server.with_backend(|b| b.read_elements(&scope)) {
            Ok(root) => root,
            Err(err) => {
                emit(ObserveEvent::Done {
                    added: total_added,
                    removed: total_removed,
                    changed: total_changed,
                });
                return Err(BridgeError::from(err));
            }
        };
        let curr = normalize(ops::flatten(&root), req);
        let delta = diff_engine::diff_elements(&prev, &curr);

        for el in &delta.added {
            total_added += 1;
            emit(ObserveEvent::Added { element: el.clone() });
        }
        for (id, role, title) in &delta.removed {
            total_removed += 1;
            emit(ObserveEvent::Removed {
                id: *id,
                role: role.clone(),
                title: title.clone(),
            });
        }
        for change in &delta.changed {
            total_changed += 1;
            emit(ObserveEvent::Changed {
                id: change.id,
                role: change.role.clone(),
                title: change.title.clone(),
                changes: change.changes.clone(),
            });
        }

        prev = curr;
    }
}
