use super::{id::NodeId, name::NodeName, visual_state::VisualState};
use crate::{
    geom::{Point, Rect, Size},
    layout::Layout,
    widget::Widget,
};

/// A view in the Core arena.
pub struct Node {
    /// Widget behaviour and state. `None` while the widget is borrowed out for a call.
    pub(crate) widget: Option<Box<dyn Widget>>,

    /// Parent in the tree.
    pub(crate) parent: Option<NodeId>,
    /// Children in insertion order. Drawn first to last, hit-tested last to first.
    pub(crate) children: Vec<NodeId>,

    /// Layout properties.
    pub(crate) layout: Layout,
    /// Diagnostic name.
    pub(crate) name: NodeName,

    /// Visibility. Invisible nodes take no space, draw nothing and are never hit.
    pub(crate) visible: bool,
    /// Enabled flag. A disabled node disables its whole subtree.
    pub(crate) enabled: bool,
    /// Can this node hold focus?
    pub(crate) focusable: bool,
    /// Is the node itself a hit target when none of its children claim the point?
    pub(crate) hit_self: bool,

    /// Desired size from the last measure, margin included.
    pub(crate) desired: Size,
    /// Availability passed to the last measure.
    pub(crate) measured_for: Option<Size>,
    /// The node or a descendant changed since the last measure.
    pub(crate) measure_dirty: bool,

    /// Box rectangle from the last arrange, in the parent's local space.
    pub(crate) bounds: Rect,
    /// Scroll offset applied to children.
    pub(crate) scroll: Point,
    /// Size of the scrollable content, zero for nodes that do not scroll.
    pub(crate) extent: Size,

    /// Has `on_mount` run for the current attachment?
    pub(crate) mounted: bool,
    /// Visual state last pushed to the widget.
    pub(crate) visual_state: VisualState,
    /// Consecutive frames in which this node requested layout from `draw`.
    pub(crate) relayout_streak: u32,
}

impl Node {
    /// Build a detached node around a widget.
    pub(crate) fn new(widget: Box<dyn Widget>) -> Self {
        let layout = widget.layout();
        let name = widget.name();
        let focusable = widget.accept_focus();
        let hit_self = widget.hit_self();
        Self {
            widget: Some(widget),
            parent: None,
            children: Vec::new(),
            layout,
            name,
            visible: true,
            enabled: true,
            focusable,
            hit_self,
            desired: Size::ZERO,
            measured_for: None,
            measure_dirty: true,
            bounds: Rect::ZERO,
            scroll: Point::zero(),
            extent: Size::ZERO,
            mounted: false,
            visual_state: VisualState::Normal,
            relayout_streak: 0,
        }
    }

    /// The node's diagnostic name.
    pub fn name(&self) -> &NodeName {
        &self.name
    }

    /// The parent, if attached.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in insertion order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Layout properties.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Is the node itself visible? Ancestors may still hide it.
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Is the node itself enabled? A disabled ancestor still disables it.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Can the node hold focus?
    pub fn focusable(&self) -> bool {
        self.focusable
    }

    /// Desired size from the last measure, margin included.
    pub fn desired(&self) -> Size {
        self.desired
    }

    /// Box rectangle in the parent's local space.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Scroll offset applied to children.
    pub fn scroll(&self) -> Point {
        self.scroll
    }

    /// Scrollable content size.
    pub fn extent(&self) -> Size {
        self.extent
    }

    /// Has the widget been mounted?
    pub fn mounted(&self) -> bool {
        self.mounted
    }

    /// Visual state last pushed to the widget.
    pub fn visual_state(&self) -> VisualState {
        self.visual_state
    }
}
