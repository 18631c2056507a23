use std::cell::RefCell;

use super::{
    config::Config,
    focus::FocusManager,
    hittest::HitTester,
    id::NodeId,
    invalidate::Invalidator,
    popup::{Placement, PopupManager},
    render::TextMeasurer,
    visual_state::VisualState,
    world::Core,
};
use crate::{
    error::{Error, Result},
    geom::{Point, Rect, Size},
    layout::Layout,
    widget::Widget,
};

/// Read-only view of the window from the perspective of one node.
///
/// Everything here is derived from [`ViewContext::core`] and [`ViewContext::node_id`], so
/// implementors only provide those two.
pub trait ViewContext {
    /// The window core.
    fn core(&self) -> &Core;

    /// The node this context is bound to.
    fn node_id(&self) -> NodeId;

    /// The root node.
    fn root_id(&self) -> NodeId {
        self.core().root()
    }

    /// This node's bounds in its parent's local space.
    fn bounds(&self) -> Rect {
        self.core().bounds(self.node_id()).unwrap_or_default()
    }

    /// This node's size.
    fn size(&self) -> Size {
        self.bounds().size()
    }

    /// This node's bounds in window coordinates.
    fn screen_bounds(&self) -> Rect {
        self.core().screen_bounds(self.node_id()).unwrap_or_default()
    }

    /// Window size.
    fn viewport(&self) -> Size {
        self.core().viewport()
    }

    /// Behaviour knobs.
    fn config(&self) -> &Config {
        self.core().config()
    }

    /// Text measurement backend.
    fn text(&self) -> &dyn TextMeasurer {
        self.core().text()
    }

    /// A node's parent.
    fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.core().parent(node)
    }

    /// A node's children in tree order.
    fn children_of(&self, node: NodeId) -> Vec<NodeId> {
        self.core().children(node).to_vec()
    }

    /// This node's children in tree order.
    fn children(&self) -> Vec<NodeId> {
        self.children_of(self.node_id())
    }

    /// Does this node hold focus?
    fn is_focused(&self) -> bool {
        self.core().is_focused(self.node_id())
    }

    /// The focused node.
    fn focused(&self) -> Option<NodeId> {
        self.core().focused()
    }

    /// Is this node, and every ancestor, enabled?
    fn is_enabled(&self) -> bool {
        self.core().is_enabled(self.node_id())
    }

    /// Does this node hold pointer capture?
    fn has_pointer_capture(&self) -> bool {
        self.core().pointer_capture() == Some(self.node_id())
    }

    /// The visual state the core computed for this node.
    fn visual_state(&self) -> VisualState {
        self.core()
            .node(self.node_id())
            .map(|n| n.visual_state())
            .unwrap_or_default()
    }

    /// Scroll offset applied to this node's children.
    fn scroll_offset(&self) -> Point {
        self.core()
            .node(self.node_id())
            .map(|n| n.scroll())
            .unwrap_or_default()
    }

    /// Scrollable content size.
    fn extent(&self) -> Size {
        self.core()
            .node(self.node_id())
            .map(|n| n.extent())
            .unwrap_or_default()
    }

    /// The largest scroll offset this node allows.
    fn max_scroll(&self) -> Point {
        self.core().max_scroll(self.node_id())
    }

    /// Window rectangle of this node's open popup.
    fn popup_rect(&self) -> Option<Rect> {
        self.core().popup_rect(self.node_id())
    }

    /// Is this node's popup open?
    fn is_popup_open(&self) -> bool {
        self.popup_rect().is_some()
    }

    /// Per-window clipboard.
    fn clipboard(&self) -> &str {
        self.core().clipboard()
    }
}

/// Mutable context passed to event handlers and lifecycle hooks.
///
/// The trait is object safe; widgets receive it as `&mut dyn Context`.
pub trait Context: ViewContext {
    /// Focus a node.
    fn set_focus(&mut self, node: NodeId) -> Result<bool>;

    /// Focus this node.
    fn focus_self(&mut self) -> Result<bool> {
        let id = self.node_id();
        self.set_focus(id)
    }

    /// Clear focus.
    fn blur(&mut self) -> bool;

    /// Move focus to the next focusable node.
    fn focus_next(&mut self) -> bool;

    /// Move focus to the previous focusable node.
    fn focus_prev(&mut self) -> bool;

    /// Route all pointer events to this node until the next release.
    fn capture_pointer(&mut self);

    /// Release pointer capture if this node holds it.
    fn release_pointer(&mut self);

    /// Request a redraw of this node.
    fn invalidate(&mut self);

    /// Request a re-measure of this node.
    fn invalidate_measure(&mut self);

    /// Request a re-measure of another node.
    fn invalidate_node(&mut self, node: NodeId);

    /// A handle for invalidating from outside the call stack.
    fn invalidator(&self) -> Invalidator;

    /// Scroll this node's content, clamped to its extent. Returns `true` if it moved.
    fn scroll_to(&mut self, offset: Point) -> bool;

    /// Scroll this node's content by a delta.
    fn scroll_by(&mut self, delta: Point) -> bool {
        let offset = self.scroll_offset() + delta;
        self.scroll_to(offset)
    }

    /// Open or resize this node's popup.
    fn open_popup(&mut self, size: Size, placement: Placement) -> Result<Rect>;

    /// Close this node's popup. Returns `true` if it was open.
    fn close_popup(&mut self) -> bool;

    /// Replace the clipboard contents.
    fn set_clipboard(&mut self, text: String);

    /// Create a detached node.
    fn add(&mut self, widget: Box<dyn Widget>) -> NodeId;

    /// Create a node and append it to `parent`.
    fn add_child(&mut self, parent: NodeId, widget: Box<dyn Widget>) -> Result<NodeId>;

    /// Append a detached node to `parent`.
    fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<()>;

    /// Detach a node from its parent.
    fn detach(&mut self, node: NodeId) -> Result<()>;

    /// Remove a subtree.
    fn remove_subtree(&mut self, node: NodeId) -> Result<()>;

    /// Show or hide a node.
    fn set_visible(&mut self, node: NodeId, visible: bool) -> Result<bool>;

    /// Enable or disable a node.
    fn set_enabled(&mut self, node: NodeId, enabled: bool) -> Result<bool>;

    /// Modify a node's layout properties.
    fn with_layout_of(&mut self, node: NodeId, f: &mut dyn FnMut(&mut Layout)) -> Result<()>;
}

/// The [`Context`] implementation handed to widgets by the core.
pub struct CoreContext<'a> {
    /// The window core.
    core: &'a mut Core,
    /// Bound node.
    node: NodeId,
}

impl<'a> CoreContext<'a> {
    /// Bind a context to a node.
    pub(crate) fn new(core: &'a mut Core, node: NodeId) -> Self {
        Self { core, node }
    }
}

impl ViewContext for CoreContext<'_> {
    fn core(&self) -> &Core {
        self.core
    }

    fn node_id(&self) -> NodeId {
        self.node
    }
}

impl Context for CoreContext<'_> {
    fn set_focus(&mut self, node: NodeId) -> Result<bool> {
        self.core.set_focus(node)
    }

    fn blur(&mut self) -> bool {
        self.core.blur()
    }

    fn focus_next(&mut self) -> bool {
        self.core.focus_next()
    }

    fn focus_prev(&mut self) -> bool {
        self.core.focus_prev()
    }

    fn capture_pointer(&mut self) {
        self.core.capture_pointer(self.node);
    }

    fn release_pointer(&mut self) {
        if self.core.pointer_capture() == Some(self.node) {
            self.core.release_pointer();
        }
    }

    fn invalidate(&mut self) {
        self.core.invalidate(self.node);
    }

    fn invalidate_measure(&mut self) {
        self.core.invalidate_measure(self.node);
    }

    fn invalidate_node(&mut self, node: NodeId) {
        self.core.invalidate_measure(node);
    }

    fn invalidator(&self) -> Invalidator {
        self.core.invalidator()
    }

    fn scroll_to(&mut self, offset: Point) -> bool {
        self.core.scroll_to(self.node, offset)
    }

    fn open_popup(&mut self, size: Size, placement: Placement) -> Result<Rect> {
        self.core.open_popup(self.node, size, placement)
    }

    fn close_popup(&mut self) -> bool {
        self.core.close_popup(self.node)
    }

    fn set_clipboard(&mut self, text: String) {
        self.core.set_clipboard(text);
    }

    fn add(&mut self, widget: Box<dyn Widget>) -> NodeId {
        self.core.add_boxed(widget)
    }

    fn add_child(&mut self, parent: NodeId, widget: Box<dyn Widget>) -> Result<NodeId> {
        self.core.add_child_boxed(parent, widget)
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.core.attach(parent, child)
    }

    fn detach(&mut self, node: NodeId) -> Result<()> {
        self.core.detach(node)
    }

    fn remove_subtree(&mut self, node: NodeId) -> Result<()> {
        if node == self.node {
            return Err(Error::InvalidOperation(
                "a widget cannot remove itself from its own handler".into(),
            ));
        }
        self.core.remove_subtree(node)
    }

    fn set_visible(&mut self, node: NodeId, visible: bool) -> Result<bool> {
        self.core.set_visible(node, visible)
    }

    fn set_enabled(&mut self, node: NodeId, enabled: bool) -> Result<bool> {
        self.core.set_enabled(node, enabled)
    }

    fn with_layout_of(&mut self, node: NodeId, f: &mut dyn FnMut(&mut Layout)) -> Result<()> {
        self.core.with_layout_of(node, f)
    }
}

/// Context for `Widget::measure` and `Widget::arrange`.
///
/// Panels use it to measure and arrange their children; the core applies margins, requests and
/// numeric repair around each call.
pub struct LayoutContext<'a> {
    /// The window core.
    core: &'a mut Core,
    /// Node being laid out.
    node: NodeId,
}

impl<'a> LayoutContext<'a> {
    /// Bind a context to a node.
    pub(crate) fn new(core: &'a mut Core, node: NodeId) -> Self {
        Self { core, node }
    }

    /// Visible children in tree order.
    pub fn visible_children(&self) -> Vec<NodeId> {
        self.core.visible_children(self.node)
    }

    /// Measure a child and return its desired size, margin included.
    pub fn measure(&mut self, child: NodeId, available: Size) -> Size {
        self.core.measure(child, available)
    }

    /// Arrange a child into a slot in this node's local space.
    pub fn arrange(&mut self, child: NodeId, slot: Rect) {
        self.core.arrange(child, slot);
    }

    /// A child's desired size from its last measure.
    pub fn desired(&self, child: NodeId) -> Size {
        self.core.desired(child).unwrap_or_default()
    }

    /// A child's layout properties.
    pub fn layout_of(&self, child: NodeId) -> Layout {
        self.core.layout_of(child).unwrap_or_default()
    }

    /// Record the size of this node's scrollable content.
    pub fn set_extent(&mut self, extent: Size) {
        self.core.set_extent(self.node, extent);
    }

    /// Measure every child against the full availability and report the largest.
    pub fn measure_overlay(&mut self, available: Size) -> Size {
        self.children().into_iter().fold(Size::ZERO, |acc, child| {
            acc.max(self.core.measure(child, available))
        })
    }

    /// Arrange every child into the full content rectangle.
    pub fn arrange_overlay(&mut self, content: Rect) {
        for child in self.children() {
            self.core.arrange(child, content);
        }
    }
}

impl ViewContext for LayoutContext<'_> {
    fn core(&self) -> &Core {
        self.core
    }

    fn node_id(&self) -> NodeId {
        self.node
    }
}

/// Context for `Widget::draw`. Drawing cannot change layout; it can only ask for one.
pub struct DrawContext<'a> {
    /// The window core.
    core: &'a Core,
    /// Node being drawn.
    node: NodeId,
    /// Nodes that asked for a follow-up layout during this pass.
    requests: &'a RefCell<Vec<NodeId>>,
}

impl<'a> DrawContext<'a> {
    /// Bind a context to a node.
    pub(crate) fn new(core: &'a Core, node: NodeId, requests: &'a RefCell<Vec<NodeId>>) -> Self {
        Self {
            core,
            node,
            requests,
        }
    }

    /// Ask for another layout pass because this node's measurement is stale. The frame driver
    /// schedules one after the current draw completes.
    pub fn request_layout(&self) {
        self.requests.borrow_mut().push(self.node);
    }
}

impl ViewContext for DrawContext<'_> {
    fn core(&self) -> &Core {
        self.core
    }

    fn node_id(&self) -> NodeId {
        self.node
    }
}
