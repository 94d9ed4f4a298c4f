//! The fixed, platform-independent role vocabulary (spec §4.1).

use core::fmt;

use serde::{Deserialize, Serialize};

/// A short interned role code. Never empty on a live [`crate::Element`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Btn,
    Txt,
    Lnk,
    Img,
    Input,
    Chk,
    Toggle,
    Radio,
    Menu,
    MenuItem,
    Tab,
    List,
    Row,
    Cell,
    Group,
    Scroll,
    Toolbar,
    Web,
    Window,
    Other,
}

impl Role {
    /// The short code used in flat paths, refs, and the agent-format renderer.
    pub const fn code(self) -> &'static str {
        match self {
            Role::Btn => "btn",
            Role::Txt => "txt",
            Role::Lnk => "lnk",
            Role::Img => "img",
            Role::Input => "input",
            Role::Chk => "chk",
            Role::Toggle => "toggle",
            Role::Radio => "radio",
            Role::Menu => "menu",
            Role::MenuItem => "menuitem",
            Role::Tab => "tab",
            Role::List => "list",
            Role::Row => "row",
            Role::Cell => "cell",
            Role::Group => "group",
            Role::Scroll => "scroll",
            Role::Toolbar => "toolbar",
            Role::Web => "web",
            Role::Window => "window",
            Role::Other => "other",
        }
    }

    pub fn from_code(code: &str) -> Option<Role> {
        Some(match code {
            "btn" => Role::Btn,
            "txt" => Role::Txt,
            "lnk" => Role::Lnk,
            "img" => Role::Img,
            "input" => Role::Input,
            "chk" => Role::Chk,
            "toggle" => Role::Toggle,
            "radio" => Role::Radio,
            "menu" => Role::Menu,
            "menuitem" => Role::MenuItem,
            "tab" => Role::Tab,
            "list" => Role::List,
            "row" => Role::Row,
            "cell" => Role::Cell,
            "group" => Role::Group,
            "scroll" => Role::Scroll,
            "toolbar" => Role::Toolbar,
            "web" => Role::Web,
            "window" => Role::Window,
            "other" => Role::Other,
            _ => return None,
        })
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The `interactive` meta-role, expanded against a concrete role set by
/// callers that need it (see `bridge_consumer::roles::expand_interactive`).
pub const INTERACTIVE_ROLES: &[Role] = &[
    Role::Input,
    Role::Other,
    Role::Chk,
    Role::Toggle,
    Role::Radio,
    Role::List,
];

/// Maps a native platform role string to the fixed short vocabulary.
/// Total: unrecognized native roles map to [`Role::Other`].
pub fn map_role(native: &str) -> Role {
    match native {
        "AXButton" | "button" | "push button" | "Button" => Role::Btn,
        "AXStaticText" | "text" | "label" | "StaticText" | "Text" => Role::Txt,
        "AXLink" | "link" | "Hyperlink" => Role::Lnk,
        "AXImage" | "image" | "graphic" | "Image" => Role::Img,
        "AXTextField" | "AXTextArea" | "edit" | "combo box" | "Edit" | "ComboBox" => Role::Input,
        "AXCheckBox" | "checkbox" | "check box" | "CheckBox" => Role::Chk,
        "AXSwitch" | "toggle button" | "Toggle" => Role::Toggle,
        "AXRadioButton" | "radio button" | "RadioButton" => Role::Radio,
        "AXMenu" | "menu" | "Menu" => Role::Menu,
        "AXMenuItem" | "menu item" | "MenuItem" => Role::MenuItem,
        "AXTab" | "page tab" | "TabItem" => Role::Tab,
        "AXList" | "list box" | "List" => Role::List,
        "AXRow" | "row" | "table row" | "Row" => Role::Row,
        "AXCell" | "cell" | "table cell" | "Cell" | "DataItem" => Role::Cell,
        "AXGroup" | "grouping" | "panel" | "Group" | "Pane" => Role::Group,
        "AXScrollArea" | "scroll bar" | "ScrollBar" => Role::Scroll,
        "AXToolbar" | "tool bar" | "ToolBar" => Role::Toolbar,
        "AXWebArea" | "document" | "Document" => Role::Web,
        "AXWindow" | "window" | "Window" => Role::Window,
        _ => Role::Other,
    }
}

/// Lowercases a native accessibility action name and strips a leading
/// platform prefix (`AX`, `UIA_`, …) when the result is a known short action;
/// otherwise passes the lowercased name through unchanged.
pub fn map_action(native: &str) -> String {
    let stripped = native.strip_prefix("AX").unwrap_or(native);
    let lower = stripped.to_ascii_lowercase();
    const KNOWN: &[&str] = &[
        "press", "cancel", "pick", "increment", "decrement", "confirm", "showmenu", "raise",
    ];
    if KNOWN.contains(&lower.as_str()) {
        lower
    } else {
        native.to_ascii_lowercase()
    }
}
