//! Concrete [`Formatter`]s, selectable by name.
//!
//! | Name       | Output                                                   |
//! |------------|----------------------------------------------------------|
//! | `tree`     | Indented dump of attributes and children, for humans     |
//! | `lemonbar` | One clickable segment per child, for a lemonbar status   |
//! | `json`     | A single-line JSON document of the whole subtree         |

use crate::config::{FormatConfig, LemonbarConfig, TreeConfig};
use crate::traits::Formatter;
use crate::tree::Desktop;
use log::warn;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Look up a formatter by name.
pub fn formatter_by_name(name: &str, config: &FormatConfig) -> Option<Box<dyn Formatter>> {
    match name {
        "tree" => Some(Box::new(TreeFormatter::new(config.tree.clone()))),
        "lemonbar" => Some(Box::new(LemonbarFormatter::new(config.lemonbar.clone()))),
        "json" => Some(Box::new(JsonFormatter)),
        _ => None,
    }
}

//  tree

/// Recursive, indented dump of a subtree.
///
/// ```text
/// "name": main
/// Focused child: 1
/// Child 0
///     "name": web
/// Child 1
/// ```
pub struct TreeFormatter {
    config: TreeConfig,
}

impl TreeFormatter {
    pub fn new(config: TreeConfig) -> Self {
        Self { config }
    }

    fn write(&self, out: &mut String, desktop: Desktop<'_>, level: usize) {
        let indent = self.config.indent.repeat(level);

        for (key, value) in desktop.sorted_attrs() {
            let _ = writeln!(out, "{}\"{}\": {}", indent, key, value);
        }

        if let Some(focused) = desktop.focused_child() {
            let _ = writeln!(out, "{}Focused child: {}", indent, focused);
            for (i, child) in desktop.children().enumerate() {
                let _ = writeln!(out, "{}Child {}", indent, i);
                self.write(out, child, level + 1);
            }
        }
    }
}

impl Formatter for TreeFormatter {
    fn format(&self, desktop: Desktop<'_>) -> String {
        let mut out = String::new();
        self.write(&mut out, desktop, 0);
        if out.ends_with('\n') {
            out.pop();
        }
        out
    }
}

//  lemonbar

/// Renders the children of a desktop as lemonbar segments.
///
/// Each child shows its `name` attribute and is wrapped in a click area
/// whose command is the child's index; the focused child gets a background
/// color.
pub struct LemonbarFormatter {
    config: LemonbarConfig,
}

impl LemonbarFormatter {
    pub fn new(config: LemonbarConfig) -> Self {
        Self { config }
    }
}

impl Formatter for LemonbarFormatter {
    fn format(&self, desktop: Desktop<'_>) -> String {
        let focused = desktop.focused_child();
        let pad = &self.config.padding;
        let mut out = String::new();

        for (i, child) in desktop.children().enumerate() {
            let is_focused = focused == Some(i);
            if is_focused {
                let _ = write!(out, "%{{B{}}}", self.config.focus_color);
            }
            let name = child.attr("name").unwrap_or_default();
            let _ = write!(out, "%{{A:{}:}}{}{}{}%{{A}}", i, pad, name, pad);
            if is_focused {
                out.push_str("%{B-}");
            }
        }
        out
    }
}

//  json

/// Serializes the subtree with `serde_json`.
pub struct JsonFormatter;

#[derive(Serialize)]
struct Snapshot<'a> {
    id: &'a str,
    attributes: BTreeMap<&'a str, &'a str>,
    focused_child: Option<usize>,
    children: Vec<Snapshot<'a>>,
}

impl<'a> Snapshot<'a> {
    fn of(desktop: Desktop<'a>) -> Self {
        Self {
            id: desktop.desktop_id(),
            attributes: desktop.sorted_attrs().into_iter().collect(),
            focused_child: desktop.focused_child(),
            children: desktop.children().map(Snapshot::of).collect(),
        }
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, desktop: Desktop<'_>) -> String {
        serde_json::to_string(&Snapshot::of(desktop)).unwrap_or_else(|e| {
            warn!("json formatter failed: {}", e);
            String::new()
        })
    }
}

//  Tests
