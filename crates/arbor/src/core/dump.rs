use std::io::Write;

use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use termcolor::{Buffer, Color, ColorSpec, WriteColor};

use super::{focus::FocusManager, hittest::HitTester, popup::PopupManager};
use crate::{
    NodeId,
    core::Core,
    error::{Error, Result},
    geom::Rect,
};

/// Format a rectangle compactly.
fn fmt_rect(r: Rect) -> String {
    format!("({}, {}) {}x{}", r.x, r.y, r.w, r.h)
}

/// Traverses a subtree and returns an indented, colored listing of node names, bounds and
/// status flags. This is a debug function.
pub fn dump(core: &Core, root: NodeId) -> Result<String> {
    let mut buffer = Buffer::ansi();
    dump_node(&mut buffer, core, root, 0)?;
    Ok(String::from_utf8_lossy(buffer.as_slice()).into_owned())
}

/// Like [`dump`] but without color escapes, for logs and snapshots.
pub fn dump_plain(core: &Core, root: NodeId) -> Result<String> {
    let mut buffer = Buffer::no_color();
    dump_node(&mut buffer, core, root, 0)?;
    Ok(String::from_utf8_lossy(buffer.as_slice()).into_owned())
}

/// Write a colored word.
fn write_colored(buffer: &mut Buffer, color: Color, bold: bool, text: &str) -> Result<()> {
    buffer.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(bold))?;
    write!(buffer, "{text}")?;
    buffer.reset()?;
    Ok(())
}

/// Walk a node subtree and emit formatted debug output.
fn dump_node(buffer: &mut Buffer, core: &Core, id: NodeId, level: usize) -> Result<()> {
    let node = core.node(id).ok_or(Error::NodeNotFound(id))?;
    let indent = "  ".repeat(level);

    write!(buffer, "{indent}")?;
    write_colored(buffer, Color::Cyan, true, node.name().as_str())?;
    write!(buffer, " {}", fmt_rect(node.bounds()))?;

    let mut flags = Vec::new();
    if core.is_focused(id) {
        flags.push(("focused", Color::Magenta));
    }
    if !node.visible() {
        flags.push(("hidden", Color::Yellow));
    }
    if !node.enabled() {
        flags.push(("disabled", Color::Red));
    }
    if core.pointer_capture() == Some(id) {
        flags.push(("capture", Color::Blue));
    }
    if core.popup_rect(id).is_some() {
        flags.push(("popup", Color::Green));
    }
    for (flag, color) in flags {
        write!(buffer, " ")?;
        write_colored(buffer, color, false, flag)?;
    }
    writeln!(buffer)?;

    for child in node.children() {
        dump_node(buffer, core, *child, level + 1)?;
    }
    Ok(())
}

/// A table of every node in a subtree with its desired size and local and window bounds.
pub fn layout_table(core: &Core, root: NodeId) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["node", "desired", "bounds", "screen", "state"]);
    for id in core.pre_order(root) {
        let Some(node) = core.node(id) else {
            continue;
        };
        let depth = core.ancestors_inclusive(id).len().saturating_sub(1);
        let desired = node.desired();
        table.add_row(vec![
            format!("{}{}", "  ".repeat(depth), node.name()),
            format!("{}x{}", desired.w, desired.h),
            fmt_rect(node.bounds()),
            core.screen_bounds(id).map(fmt_rect).unwrap_or_default(),
            node.visual_state().to_string(),
        ]);
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{geom::Size, testing::Fixed};

    #[test]
    fn dump_lists_nested_nodes() -> Result<()> {
        let mut core = Core::new();
        core.set_viewport(Size::new(40.0, 40.0));
        let a = core.add_child(core.root(), Fixed::new(10.0, 10.0))?;
        core.add_child(a, Fixed::new(5.0, 5.0))?;
        core.set_visible(a, false)?;
        core.update_layout();
        let out = dump_plain(&core, core.root())?;
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("root"));
        assert!(lines[1].starts_with("  fixed") && lines[1].contains("hidden"));
        assert!(lines[2].starts_with("    fixed"));
        let table = layout_table(&core, core.root());
        assert!(table.contains("desired"));
        assert!(table.contains("fixed"));
        Ok(())
    }
}
