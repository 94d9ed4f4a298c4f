//! Clap argument definitions for every tool in the registry (spec §6.2).

use std::path::PathBuf;

use bridge_types::{Direction, TargetSpec};
use clap::{Parser, Subcommand};

/// Command-line surface over the desktop accessibility bridge.
#[derive(Parser, Debug)]
#[command(name = "bridge-cli", version, about = "Desktop accessibility bridge")]
pub struct Cli {
    /// Run against the in-memory mock backend instead of a real platform
    /// adapter. This build ships no platform adapter, so this flag is
    /// required for now.
    #[arg(long, global = true)]
    pub mock: bool,
    /// Pretty-print the JSON response instead of emitting it on one line.
    #[arg(long, global = true)]
    pub pretty: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Args, Clone, Debug, Default)]
pub struct ScopeArgs {
    #[arg(long)]
    pub app: Option<String>,
    #[arg(long)]
    pub window: Option<String>,
    #[arg(long)]
    pub pid: Option<i32>,
}

/// Flattened target specification: the caller picks exactly one of
/// `--id`, `--ref`, `--text`, or `--x`/`--y` (spec §4.5).
#[derive(clap::Args, Clone, Debug, Default)]
pub struct TargetArgs {
    #[arg(long)]
    pub id: Option<i32>,
    #[arg(long = "ref")]
    pub ref_: Option<String>,
    #[arg(long)]
    pub text: Option<String>,
    #[arg(long, value_delimiter = ',')]
    pub roles: Option<Vec<String>>,
    #[arg(long)]
    pub scope_id: Option<i32>,
    #[arg(long)]
    pub exact: bool,
    #[arg(long, allow_hyphen_values = true)]
    pub x: Option<i32>,
    #[arg(long, allow_hyphen_values = true)]
    pub y: Option<i32>,
}

impl TargetArgs {
    pub fn resolve(&self) -> anyhow::Result<TargetSpec> {
        self.resolve_opt()
            .ok_or_else(|| anyhow::anyhow!("one of --id, --ref, --text, or --x/--y is required"))
    }

    pub fn resolve_opt(&self) -> Option<TargetSpec> {
        if let Some(id) = self.id {
            return Some(TargetSpec::Id { id });
        }
        if let Some(ref_) = &self.ref_ {
            return Some(TargetSpec::Ref { ref_: ref_.clone() });
        }
        if let Some(text) = &self.text {
            return Some(TargetSpec::Text {
                text: text.clone(),
                roles: self.roles.clone(),
                scope_id: self.scope_id,
                exact: self.exact,
            });
        }
        if let (Some(x), Some(y)) = (self.x, self.y) {
            return Some(TargetSpec::Point { x, y });
        }
        None
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum DirectionArg {
    Left,
    Right,
    Above,
    Below,
    Any,
}

impl From<DirectionArg> for Direction {
    fn from(d: DirectionArg) -> Self {
        match d {
            DirectionArg::Left => Direction::Left,
            DirectionArg::Right => Direction::Right,
            DirectionArg::Above => Direction::Above,
            DirectionArg::Below => Direction::Below,
            DirectionArg::Any => Direction::Any,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List running apps or their windows.
    List {
        #[arg(long)]
        apps: bool,
        #[arg(long)]
        app_filter: Option<String>,
        #[arg(long)]
        pid: Option<i32>,
    },
    /// Read the accessibility tree of a window, optionally filtered.
    Read {
        #[command(flatten)]
        scope: ScopeArgs,
        #[arg(long)]
        window_id: Option<i64>,
        #[arg(long)]
        depth: Option<u32>,
        #[arg(long, value_delimiter = ',')]
        roles: Vec<String>,
        #[arg(long)]
        text: Option<String>,
        /// "x,y,w,h" screen-space rectangle to intersect elements against.
        #[arg(long)]
        bbox: Option<String>,
        #[arg(long)]
        focused: bool,
        #[arg(long)]
        scope_id: Option<i32>,
        #[arg(long)]
        children: bool,
        #[arg(long)]
        flat: bool,
        #[arg(long)]
        prune: Option<bool>,
        /// "tree" | "flat" | "agent"; defaults to terminal-vs-piped detection.
        #[arg(long)]
        format: Option<String>,
        #[arg(long)]
        with_refs: bool,
        #[arg(long)]
        since: Option<i64>,
        #[arg(long)]
        raw: bool,
    },
    /// Click an element or a point, optionally verifying the click landed.
    Click {
        #[command(flatten)]
        scope: ScopeArgs,
        #[command(flatten)]
        target: TargetArgs,
        #[arg(long, default_value = "left")]
        button: String,
        #[arg(long, default_value_t = 1)]
        count: u8,
        #[arg(long, value_enum)]
        near: Option<DirectionArg>,
        #[arg(long)]
        verify: bool,
        #[arg(long)]
        post_read: bool,
    },
    /// Type text and/or send a key combo, optionally focusing a target first.
    Type {
        #[command(flatten)]
        scope: ScopeArgs,
        #[command(flatten)]
        target: TargetArgs,
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        key: Option<String>,
        #[arg(long, default_value_t = 5)]
        delay_ms: u64,
    },
    /// Perform a named accessibility action on an element (default: press).
    Action {
        #[command(flatten)]
        scope: ScopeArgs,
        #[command(flatten)]
        target: TargetArgs,
        #[arg(long, default_value = "press")]
        name: String,
        #[arg(long)]
        post_read: bool,
    },
    /// Set a value (or other attribute) on an element.
    SetValue {
        #[command(flatten)]
        scope: ScopeArgs,
        #[command(flatten)]
        target: TargetArgs,
        #[arg(long)]
        value: String,
        #[arg(long, default_value = "value")]
        attribute: String,
    },
    /// Scroll at an element or a point in a compass direction.
    Scroll {
        #[command(flatten)]
        scope: ScopeArgs,
        #[command(flatten)]
        target: TargetArgs,
        #[arg(long, value_enum)]
        direction: DirectionArg,
        #[arg(long, default_value_t = 3)]
        amount: i32,
    },
    /// Move the mouse to an element or a point without clicking.
    Hover {
        #[command(flatten)]
        scope: ScopeArgs,
        #[command(flatten)]
        target: TargetArgs,
        #[arg(long)]
        post_read: bool,
    },
    /// Drag the mouse from one target to another.
    Drag {
        #[command(flatten)]
        scope: ScopeArgs,
        #[arg(long)]
        from_id: Option<i32>,
        #[arg(long)]
        from_ref: Option<String>,
        #[arg(long)]
        from_text: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        from_x: Option<i32>,
        #[arg(long, allow_hyphen_values = true)]
        from_y: Option<i32>,
        #[arg(long)]
        to_id: Option<i32>,
        #[arg(long)]
        to_ref: Option<String>,
        #[arg(long)]
        to_text: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        to_x: Option<i32>,
        #[arg(long, allow_hyphen_values = true)]
        to_y: Option<i32>,
    },
    /// Bring a window to the front.
    Focus {
        #[command(flatten)]
        scope: ScopeArgs,
        #[arg(long)]
        window_id: Option<i64>,
    },
    /// Poll until an element appears (or disappears, with --gone).
    Wait {
        #[command(flatten)]
        scope: ScopeArgs,
        #[arg(long)]
        for_text: Option<String>,
        #[arg(long)]
        for_role: Option<String>,
        #[arg(long)]
        for_id: Option<i32>,
        #[arg(long)]
        gone: bool,
        #[arg(long, default_value_t = 5.0)]
        timeout_sec: f64,
        #[arg(long, default_value_t = 200)]
        interval_ms: u64,
    },
    /// Stream newline-delimited JSON diff events until cancelled or a
    /// duration elapses.
    Observe {
        #[command(flatten)]
        scope: ScopeArgs,
        #[arg(long, default_value_t = 500)]
        interval_ms: u64,
        #[arg(long)]
        duration_sec: Option<f64>,
        #[arg(long)]
        ignore_bounds: bool,
        #[arg(long)]
        ignore_focus: bool,
    },
    /// Capture a window, the full screen, or a window with its menu bar.
    Screenshot {
        #[command(flatten)]
        scope: ScopeArgs,
        #[arg(long)]
        full_screen: bool,
        #[arg(long)]
        include_menubar: bool,
        #[arg(long, default_value = "png")]
        format: String,
        #[arg(long, default_value_t = 80)]
        quality: u8,
        #[arg(long, default_value_t = 0.5)]
        scale: f64,
        #[arg(long)]
        out_file: Option<PathBuf>,
    },
    /// Launch a URL, file, or app, optionally waiting for its window.
    Open {
        target: String,
        #[arg(long)]
        wait_for_app: Option<String>,
        #[arg(long, default_value_t = 10.0)]
        wait_timeout_sec: f64,
    },
    /// Run a sequence of steps described as a JSON file or inline string.
    Batch {
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        json: Option<String>,
    },
    /// Find every element matching a text query without resolving to one.
    Find {
        #[command(flatten)]
        scope: ScopeArgs,
        #[arg(long)]
        text: String,
        #[arg(long, value_delimiter = ',')]
        roles: Option<Vec<String>>,
        #[arg(long)]
        exact: bool,
        #[arg(long, value_enum)]
        near: Option<DirectionArg>,
    },
    /// Read the system clipboard.
    ClipboardGet,
    /// Write the system clipboard.
    ClipboardSet { text: String },
    /// Clear the system clipboard.
    ClipboardClear,
    /// Focus a target app/window, then read the clipboard.
    ClipboardGrab {
        #[command(flatten)]
        scope: ScopeArgs,
        #[arg(long)]
        window_id: Option<i64>,
    },
}
