use std::{
    any::{Any, type_name},
    cell::RefCell,
    collections::{HashSet, VecDeque},
    mem,
    sync::mpsc,
};

use scopeguard::guard;
use slotmap::SlotMap;
use tracing::{debug, trace, warn};

use super::{
    config::Config,
    context::{CoreContext, DrawContext, LayoutContext},
    focus::FocusManager,
    hittest::HitTester,
    id::NodeId,
    invalidate::{Invalidation, Invalidator},
    measure::{
        content_available, content_rect, desired_from_content, resolve_arrange, sanitize_available,
        sanitize_measured, sanitize_slot,
    },
    name::NodeName,
    node::Node,
    popup::{Overlay, PopupManager},
    property::{Affects, Property, SubscriptionId},
    render::{Canvas, MonospaceMeasurer, TextMeasurer},
    visual_state::VisualState,
};
use crate::{
    error::{Error, Result},
    event::{Event, HitRegion},
    geom::{Point, Rect, Size},
    layout::Layout,
    widget::{EventOutcome, Widget},
};

/// Work that targets a widget and must wait until that widget is not borrowed.
///
/// Focus notifications raised from inside a handler, visual state changes and child-detached
/// notices all go through this queue. Items are delivered strictly in order: a busy target
/// blocks everything behind it.
#[derive(Debug)]
pub(crate) enum Deferred {
    /// Deliver an event to one node without bubbling.
    Event(NodeId, Event),
    /// Push the node's current visual state to its widget.
    VisualState(NodeId),
    /// Tell a parent that a direct child left.
    ChildDetached {
        /// Parent to notify.
        parent: NodeId,
        /// Child that left.
        child: NodeId,
    },
}

impl Deferred {
    /// Node whose widget receives this item.
    fn target(&self) -> NodeId {
        match self {
            Self::Event(id, _) | Self::VisualState(id) => *id,
            Self::ChildDetached { parent, .. } => *parent,
        }
    }
}

/// Core state for the arena, layout engine, focus and pointer tracking of one window.
pub struct Core {
    /// Node storage arena.
    pub(crate) nodes: SlotMap<NodeId, Node>,
    /// Root node ID.
    pub(crate) root: NodeId,
    /// Currently focused node.
    pub(crate) focus: Option<NodeId>,
    /// Focus generation counter, bumped on every focus change.
    pub(crate) focus_gen: u64,
    /// Node that receives pointer events regardless of position.
    pub(crate) pointer_capture: Option<NodeId>,
    /// Deepest node under the pointer.
    pub(crate) hovered: Option<NodeId>,
    /// Node a primary press started on, until release.
    pub(crate) pressed: Option<NodeId>,
    /// Open popups in registration order.
    pub(crate) overlays: Vec<Overlay>,
    /// Window size.
    pub(crate) viewport: Size,
    /// A measure or arrange is pending.
    pub(crate) needs_layout: bool,
    /// A redraw is pending.
    pub(crate) needs_draw: bool,
    /// Text measurement backend.
    pub(crate) text: Box<dyn TextMeasurer>,
    /// Per-window clipboard.
    pub(crate) clipboard: String,
    /// Behaviour knobs.
    pub(crate) config: Config,
    /// Sending half of the invalidation channel, cloned into invalidators.
    invalidation_tx: mpsc::Sender<Invalidation>,
    /// Receiving half of the invalidation channel.
    invalidation_rx: mpsc::Receiver<Invalidation>,
    /// Pending deliveries to borrowed widgets.
    deferred: VecDeque<Deferred>,
    /// A flush of the deferred queue is in progress.
    flushing: bool,
}

impl Core {
    /// Create a core with a default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a core with an implicit root container.
    pub fn with_config(config: Config) -> Self {
        let mut nodes = SlotMap::with_key();
        let mut root_node = Node::new(Box::new(RootContainer));
        root_node.mounted = true;
        let root = nodes.insert(root_node);
        let (invalidation_tx, invalidation_rx) = mpsc::channel();
        Self {
            nodes,
            root,
            focus: None,
            focus_gen: 1,
            pointer_capture: None,
            hovered: None,
            pressed: None,
            overlays: Vec::new(),
            viewport: Size::ZERO,
            needs_layout: true,
            needs_draw: true,
            text: Box::new(MonospaceMeasurer),
            clipboard: String::new(),
            config,
            invalidation_tx,
            invalidation_rx,
            deferred: VecDeque::new(),
            flushing: false,
        }
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Behaviour knobs.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replace the configuration. Layout is redone on the next frame.
    pub fn set_config(&mut self, config: Config) {
        self.config = config;
        let root = self.root;
        self.invalidate_measure(root);
    }

    /// Window size.
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Resize the window.
    pub fn set_viewport(&mut self, size: Size) {
        let size = Size::new(
            if size.w.is_finite() { size.w.max(0.0) } else { 0.0 },
            if size.h.is_finite() { size.h.max(0.0) } else { 0.0 },
        );
        if size != self.viewport {
            debug!(w = size.w, h = size.h, "viewport resized");
            self.viewport = size;
            let root = self.root;
            self.invalidate_measure(root);
        }
    }

    /// The text measurement backend.
    pub fn text(&self) -> &dyn TextMeasurer {
        self.text.as_ref()
    }

    /// Swap the text measurement backend. Every node is re-measured.
    pub fn set_text_measurer(&mut self, text: Box<dyn TextMeasurer>) {
        self.text = text;
        for node in self.nodes.values_mut() {
            node.measure_dirty = true;
        }
        self.needs_layout = true;
        self.needs_draw = true;
    }

    /// The per-window clipboard.
    pub fn clipboard(&self) -> &str {
        &self.clipboard
    }

    /// Replace the clipboard contents.
    pub fn set_clipboard(&mut self, text: impl Into<String>) {
        self.clipboard = text.into();
    }

    /// Look up a node.
    pub fn node(&self, id: impl Into<NodeId>) -> Option<&Node> {
        self.nodes.get(id.into())
    }

    /// Does the node exist?
    pub fn contains(&self, id: impl Into<NodeId>) -> bool {
        self.nodes.contains_key(id.into())
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if only the root exists.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// A node's parent.
    pub fn parent(&self, id: impl Into<NodeId>) -> Option<NodeId> {
        self.nodes.get(id.into()).and_then(|n| n.parent)
    }

    /// A node's children in insertion order. Empty for unknown nodes.
    pub fn children(&self, id: impl Into<NodeId>) -> &[NodeId] {
        self.nodes
            .get(id.into())
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// A node's visible children in insertion order.
    pub fn visible_children(&self, id: impl Into<NodeId>) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| self.nodes.get(*c).is_some_and(|n| n.visible))
            .collect()
    }

    /// A node's bounds in its parent's local space.
    pub fn bounds(&self, id: impl Into<NodeId>) -> Option<Rect> {
        self.nodes.get(id.into()).map(|n| n.bounds)
    }

    /// A node's desired size from the last measure, margin included.
    pub fn desired(&self, id: impl Into<NodeId>) -> Option<Size> {
        self.nodes.get(id.into()).map(|n| n.desired)
    }

    /// A node's diagnostic name.
    pub fn name(&self, id: impl Into<NodeId>) -> Option<&NodeName> {
        self.nodes.get(id.into()).map(|n| &n.name)
    }

    /// Override a node's diagnostic name.
    pub fn set_name(&mut self, id: impl Into<NodeId>, name: NodeName) -> Result<()> {
        let id = id.into();
        self.nodes.get_mut(id).ok_or(Error::NodeNotFound(id))?.name = name;
        Ok(())
    }

    /// Is `ancestor` a strict ancestor of `node`?
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.nodes.get(node).and_then(|n| n.parent);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id).and_then(|n| n.parent);
        }
        false
    }

    /// The node followed by its ancestors up to the root.
    pub fn ancestors_inclusive(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.nodes.contains_key(node).then_some(node);
        while let Some(id) = current {
            out.push(id);
            current = self.nodes.get(id).and_then(|n| n.parent);
        }
        out
    }

    /// Is the node reachable from the root?
    pub fn is_attached(&self, node: impl Into<NodeId>) -> bool {
        let node = node.into();
        node == self.root || (self.nodes.contains_key(node) && self.is_ancestor(self.root, node))
    }

    /// Is the node and every ancestor visible?
    pub fn is_visible(&self, node: impl Into<NodeId>) -> bool {
        let node = node.into();
        let chain = self.ancestors_inclusive(node);
        !chain.is_empty() && chain.iter().all(|id| self.nodes[*id].visible)
    }

    /// Is the node and every ancestor enabled?
    pub fn is_enabled(&self, node: impl Into<NodeId>) -> bool {
        let node = node.into();
        let chain = self.ancestors_inclusive(node);
        !chain.is_empty() && chain.iter().all(|id| self.nodes[*id].enabled)
    }

    /// Is the node attached, visible and enabled, so it can receive input?
    pub(crate) fn is_live(&self, node: NodeId) -> bool {
        self.is_attached(node) && self.is_visible(node) && self.is_enabled(node)
    }

    /// Create a detached node.
    pub fn add<W>(&mut self, widget: W) -> NodeId
    where
        W: Widget + 'static,
    {
        self.add_boxed(Box::new(widget))
    }

    /// Create a detached node from a boxed widget.
    pub fn add_boxed(&mut self, widget: Box<dyn Widget>) -> NodeId {
        let id = self.nodes.insert(Node::new(widget));
        trace!(?id, "node created");
        id
    }

    /// Create a node and append it to a parent.
    pub fn add_child<W>(&mut self, parent: impl Into<NodeId>, widget: W) -> Result<NodeId>
    where
        W: Widget + 'static,
    {
        self.add_child_boxed(parent, Box::new(widget))
    }

    /// Create a node from a boxed widget and append it to a parent.
    pub fn add_child_boxed(
        &mut self,
        parent: impl Into<NodeId>,
        widget: Box<dyn Widget>,
    ) -> Result<NodeId> {
        let parent = parent.into();
        if !self.nodes.contains_key(parent) {
            return Err(Error::NodeNotFound(parent));
        }
        let child = self.add_boxed(widget);
        if let Err(e) = self.attach(parent, child) {
            self.nodes.remove(child);
            return Err(e);
        }
        Ok(child)
    }

    /// Append a detached node to a parent's children.
    pub fn attach(&mut self, parent: impl Into<NodeId>, child: impl Into<NodeId>) -> Result<()> {
        let parent = parent.into();
        let index = self.children(parent).len();
        self.insert_child(parent, index, child)
    }

    /// Insert a detached node into a parent's children at `index`. Indices past the end append.
    pub fn insert_child(
        &mut self,
        parent: impl Into<NodeId>,
        index: usize,
        child: impl Into<NodeId>,
    ) -> Result<()> {
        let parent = parent.into();
        let child = child.into();
        self.check_attachable(parent, child)?;
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            let index = index.min(node.children.len());
            node.children.insert(index, child);
        }
        trace!(?parent, ?child, "attached");
        self.after_attach(parent, child)
    }

    /// Validate that `child` may become a child of `parent`.
    fn check_attachable(&self, parent: NodeId, child: NodeId) -> Result<()> {
        if !self.nodes.contains_key(parent) {
            return Err(Error::NodeNotFound(parent));
        }
        let Some(node) = self.nodes.get(child) else {
            return Err(Error::NodeNotFound(child));
        };
        if node.parent.is_some() || child == self.root {
            return Err(Error::AlreadyAttached(child));
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(Error::WouldCreateCycle { parent, child });
        }
        Ok(())
    }

    /// Mount a newly linked subtree if it became reachable, and refresh layout state.
    fn after_attach(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.invalidate_measure(child);
        if self.is_attached(parent) {
            self.mount_subtree(child)?;
            for id in self.pre_order(child) {
                self.refresh_visual_state(id);
            }
        }
        Ok(())
    }

    /// Detach a node from its parent. The node and its subtree stay in the arena.
    ///
    /// Focus, pointer capture, hover, press state and popups inside the subtree are cleared,
    /// mounted widgets are unmounted and the former parent is notified.
    pub fn detach(&mut self, child: impl Into<NodeId>) -> Result<()> {
        let child = child.into();
        let Some(node) = self.nodes.get(child) else {
            return Err(Error::NodeNotFound(child));
        };
        let Some(parent) = node.parent else {
            return Ok(());
        };
        self.unlink(parent, child);
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.retain(|id| *id != child);
        }
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = None;
        }
        trace!(?parent, ?child, "detached");
        Ok(())
    }

    /// Release per-window state held by a subtree that is about to leave `parent`, unmount it
    /// and notify the parent. The caller removes the link itself.
    fn unlink(&mut self, parent: NodeId, child: NodeId) {
        let was_attached = self.is_attached(child);
        self.release_subtree_state(child);
        if was_attached {
            self.unmount_subtree(child);
        }
        self.post(Deferred::ChildDetached { parent, child });
        self.invalidate_measure(parent);
    }

    /// Replace a parent's children.
    ///
    /// Every listed node must either be detached or already a child of `parent`. Former
    /// children that are not listed are detached.
    pub fn set_children(&mut self, parent: impl Into<NodeId>, children: Vec<NodeId>) -> Result<()> {
        let parent = parent.into();
        if !self.nodes.contains_key(parent) {
            return Err(Error::NodeNotFound(parent));
        }
        let mut seen = HashSet::with_capacity(children.len());
        for child in &children {
            if !seen.insert(*child) {
                return Err(Error::DuplicateChild {
                    parent,
                    child: *child,
                });
            }
            let Some(node) = self.nodes.get(*child) else {
                return Err(Error::NodeNotFound(*child));
            };
            if node.parent == Some(parent) {
                continue;
            }
            self.check_attachable(parent, *child)?;
        }

        let old = self.nodes[parent].children.clone();
        for child in old.iter().filter(|c| !seen.contains(c)) {
            self.detach(*child)?;
        }
        let fresh: Vec<NodeId> = children
            .iter()
            .copied()
            .filter(|c| !old.contains(c))
            .collect();
        for child in &fresh {
            if let Some(node) = self.nodes.get_mut(*child) {
                node.parent = Some(parent);
            }
        }
        self.nodes[parent].children = children;
        self.invalidate_measure(parent);
        for child in fresh {
            self.after_attach(parent, child)?;
        }
        Ok(())
    }

    /// Remove a node and all of its descendants from the arena.
    pub fn remove_subtree(&mut self, id: impl Into<NodeId>) -> Result<()> {
        let id = id.into();
        if id == self.root {
            return Err(Error::InvalidOperation("cannot remove the root".into()));
        }
        if !self.nodes.contains_key(id) {
            return Err(Error::NodeNotFound(id));
        }
        self.detach(id)?;
        for node in self.post_order(id) {
            self.nodes.remove(node);
        }
        debug!(?id, "subtree removed");
        Ok(())
    }

    /// Replace a node's widget, keeping its children. Flags and layout are re-read.
    pub fn set_widget<W>(&mut self, id: impl Into<NodeId>, widget: W) -> Result<()>
    where
        W: Widget + 'static,
    {
        let id = id.into();
        let mounted = self.nodes.get(id).ok_or(Error::NodeNotFound(id))?.mounted;
        if mounted {
            self.with_widget_mut(id, |w, core| w.on_unmount(&mut CoreContext::new(core, id)))?;
        }
        let fresh = Node::new(Box::new(widget));
        if let Some(node) = self.nodes.get_mut(id) {
            node.widget = fresh.widget;
            node.layout = fresh.layout;
            node.name = fresh.name;
            node.focusable = fresh.focusable;
            node.hit_self = fresh.hit_self;
        }
        if mounted {
            self.with_widget_mut(id, |w, core| w.on_mount(&mut CoreContext::new(core, id)))??;
        }
        self.invalidate_measure(id);
        self.ensure_invariants();
        Ok(())
    }

    /// Show or hide a node. Returns true if visibility changed.
    pub fn set_visible(&mut self, id: impl Into<NodeId>, visible: bool) -> Result<bool> {
        let id = id.into();
        let node = self.nodes.get_mut(id).ok_or(Error::NodeNotFound(id))?;
        if node.visible == visible {
            return Ok(false);
        }
        node.visible = visible;
        self.invalidate_measure(id);
        self.ensure_invariants();
        Ok(true)
    }

    /// Enable or disable a node and, implicitly, its subtree. Returns true if it changed.
    pub fn set_enabled(&mut self, id: impl Into<NodeId>, enabled: bool) -> Result<bool> {
        let id = id.into();
        let node = self.nodes.get_mut(id).ok_or(Error::NodeNotFound(id))?;
        if node.enabled == enabled {
            return Ok(false);
        }
        node.enabled = enabled;
        self.ensure_invariants();
        for node in self.pre_order(id) {
            self.refresh_visual_state(node);
        }
        self.invalidate(id);
        Ok(true)
    }

    /// Allow or forbid focus on a node. Returns true if it changed.
    pub fn set_focusable(&mut self, id: impl Into<NodeId>, focusable: bool) -> Result<bool> {
        let id = id.into();
        let node = self.nodes.get_mut(id).ok_or(Error::NodeNotFound(id))?;
        if node.focusable == focusable {
            return Ok(false);
        }
        node.focusable = focusable;
        self.ensure_focus_valid();
        Ok(true)
    }

    /// A node's layout properties.
    pub fn layout_of(&self, id: impl Into<NodeId>) -> Result<Layout> {
        let id = id.into();
        Ok(self.nodes.get(id).ok_or(Error::NodeNotFound(id))?.layout)
    }

    /// Modify a node's layout properties in place.
    pub fn with_layout_of(
        &mut self,
        id: impl Into<NodeId>,
        f: impl FnOnce(&mut Layout),
    ) -> Result<()> {
        let id = id.into();
        let node = self.nodes.get_mut(id).ok_or(Error::NodeNotFound(id))?;
        let before = node.layout;
        f(&mut node.layout);
        if node.layout != before {
            self.invalidate_measure(id);
        }
        Ok(())
    }

    /// Replace a node's layout properties.
    pub fn set_layout_of(&mut self, id: impl Into<NodeId>, layout: Layout) -> Result<()> {
        self.with_layout_of(id, |l| *l = layout)
    }

    /// Borrow a node's widget for a single call. The widget is out of its slot for the
    /// duration, so re-entrant access to the same node fails with `ReentrantWidgetBorrow`.
    pub(crate) fn with_widget_mut<R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut dyn Widget, &mut Self) -> R,
    ) -> Result<R> {
        let node = self.nodes.get_mut(id).ok_or(Error::NodeNotFound(id))?;
        let Some(mut widget) = node.widget.take() else {
            warn!(?id, "re-entrant widget access");
            return Err(Error::ReentrantWidgetBorrow(id));
        };
        let out = f(widget.as_mut(), self);
        if let Some(node) = self.nodes.get_mut(id) {
            node.widget = Some(widget);
        }
        if !self.deferred.is_empty() {
            self.flush_deferred();
        }
        Ok(out)
    }

    /// Run a closure against a node's widget, downcast to its concrete type.
    pub fn with_widget<W, R>(
        &mut self,
        id: impl Into<NodeId>,
        f: impl FnOnce(&mut W, &mut Self) -> R,
    ) -> Result<R>
    where
        W: Widget,
    {
        let id = id.into();
        self.with_widget_mut(id, |w, core| {
            let any: &mut dyn Any = w;
            any.downcast_mut::<W>().map(|w| f(w, core))
        })?
        .ok_or(Error::WidgetType {
            node: id,
            expected: type_name::<W>(),
        })
    }

    /// Borrow a node's widget, downcast to its concrete type.
    pub fn widget<W>(&self, id: impl Into<NodeId>) -> Result<&W>
    where
        W: Widget,
    {
        let id = id.into();
        let node = self.nodes.get(id).ok_or(Error::NodeNotFound(id))?;
        let widget = node
            .widget
            .as_deref()
            .ok_or(Error::ReentrantWidgetBorrow(id))?;
        let any: &dyn Any = widget;
        any.downcast_ref::<W>().ok_or(Error::WidgetType {
            node: id,
            expected: type_name::<W>(),
        })
    }

    /// Read a property through its descriptor.
    pub fn get_property<W, T>(&mut self, id: impl Into<NodeId>, prop: &Property<W, T>) -> Result<T>
    where
        W: Widget,
        T: Clone,
    {
        self.with_widget(id, |w: &mut W, _| prop.cell(w).get().clone())
    }

    /// Write a property through its descriptor, invalidating as the property declares.
    /// Returns true if the value changed.
    pub fn set_property<W, T>(
        &mut self,
        id: impl Into<NodeId>,
        prop: &Property<W, T>,
        value: T,
    ) -> Result<bool>
    where
        W: Widget,
        T: PartialEq,
    {
        let id = id.into();
        let changed = self.with_widget(id, |w: &mut W, _| prop.cell(w).set(value))?;
        if changed {
            trace!(?id, property = prop.name(), "property changed");
            match prop.info.affects {
                Affects::Draw => self.invalidate(id),
                Affects::Measure => self.invalidate_measure(id),
            }
        }
        Ok(changed)
    }

    /// Subscribe to a property through its descriptor.
    pub fn subscribe<W, T>(
        &mut self,
        id: impl Into<NodeId>,
        prop: &Property<W, T>,
        f: impl FnMut(&T) + Send + 'static,
    ) -> Result<SubscriptionId>
    where
        W: Widget,
    {
        self.with_widget(id, |w: &mut W, _| prop.cell(w).subscribe(f))
    }

    /// Remove a property subscription.
    pub fn unsubscribe<W, T>(
        &mut self,
        id: impl Into<NodeId>,
        prop: &Property<W, T>,
        sub: SubscriptionId,
    ) -> Result<bool>
    where
        W: Widget,
    {
        self.with_widget(id, |w: &mut W, _| prop.cell(w).unsubscribe(sub))
    }

    /// Names of the properties a node's widget publishes.
    pub fn property_names(&self, id: impl Into<NodeId>) -> Vec<&'static str> {
        self.nodes
            .get(id.into())
            .and_then(|n| n.widget.as_deref())
            .map(|w| w.properties().iter().map(|p| p.name).collect())
            .unwrap_or_default()
    }

    /// Mark a node for redraw.
    pub fn invalidate(&mut self, id: impl Into<NodeId>) {
        let id = id.into();
        trace!(?id, "invalidate");
        self.needs_draw = true;
    }

    /// Mark a node and its ancestors for re-measure.
    pub fn invalidate_measure(&mut self, id: impl Into<NodeId>) {
        let mut current = Some(id.into());
        while let Some(id) = current {
            let Some(node) = self.nodes.get_mut(id) else {
                break;
            };
            node.measure_dirty = true;
            current = node.parent;
        }
        self.needs_layout = true;
        self.needs_draw = true;
    }

    /// A handle for requesting invalidation from outside the dispatch call stack.
    pub fn invalidator(&self) -> Invalidator {
        Invalidator::new(self.invalidation_tx.clone())
    }

    /// Apply queued requests from invalidators.
    pub fn drain_invalidations(&mut self) {
        while let Ok(inv) = self.invalidation_rx.try_recv() {
            match inv {
                Invalidation::Draw(id) => self.invalidate(id),
                Invalidation::Measure(id) => self.invalidate_measure(id),
            }
        }
    }

    /// Is a layout pass pending?
    pub fn needs_layout(&self) -> bool {
        self.needs_layout
    }

    /// Is a redraw pending?
    pub fn needs_draw(&self) -> bool {
        self.needs_draw || self.needs_layout
    }

    /// The node holding pointer capture.
    pub fn pointer_capture(&self) -> Option<NodeId> {
        self.pointer_capture
    }

    /// Route all pointer events to a node until released.
    pub fn capture_pointer(&mut self, id: NodeId) {
        trace!(?id, "pointer captured");
        self.pointer_capture = Some(id);
    }

    /// Release pointer capture.
    pub fn release_pointer(&mut self) {
        if self.pointer_capture.take().is_some() {
            trace!("pointer released");
        }
    }

    /// Deepest node under the pointer.
    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    /// Node a press started on, until release.
    pub fn pressed(&self) -> Option<NodeId> {
        self.pressed
    }

    /// Measure a node against an availability and return its desired size, margin included.
    ///
    /// Results are cached per node by input: a node is only re-measured when the availability
    /// differs from the previous call or the node was invalidated. Invisible nodes measure as
    /// zero.
    pub fn measure(&mut self, id: impl Into<NodeId>, available: Size) -> Size {
        let id = id.into();
        let Some(node) = self.nodes.get_mut(id) else {
            return Size::ZERO;
        };
        if !node.visible {
            node.desired = Size::ZERO;
            return Size::ZERO;
        }
        let available = sanitize_available(available);
        if !node.measure_dirty && node.measured_for == Some(available) {
            return node.desired;
        }
        let layout = node.layout;
        let previous = node.desired;
        let inner = content_available(available, &layout);
        let measured = self.with_widget_mut(id, |w, core| {
            let mut ctx = LayoutContext::new(core, id);
            w.measure(&mut ctx, inner)
        });
        let content = match measured {
            Ok(size) => size,
            Err(e) => {
                warn!(?id, "measure skipped: {e}");
                return previous;
            }
        };
        let desired = desired_from_content(sanitize_measured(content, inner), &layout);
        if let Some(node) = self.nodes.get_mut(id) {
            node.desired = desired;
            node.measured_for = Some(available);
            node.measure_dirty = false;
        }
        trace!(?id, w = desired.w, h = desired.h, "measured");
        desired
    }

    /// Commit a node's bounds within the slot its parent grants, then arrange its children.
    pub fn arrange(&mut self, id: impl Into<NodeId>, slot: Rect) {
        let id = id.into();
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let slot = sanitize_slot(slot, node.desired);
        if !node.visible {
            node.bounds = Rect::new(slot.x, slot.y, 0.0, 0.0);
            return;
        }
        let layout = node.layout;
        let bounds = resolve_arrange(slot, node.desired, &layout);
        node.bounds = bounds;
        let content = content_rect(bounds, &layout);
        if let Err(e) = self.with_widget_mut(id, |w, core| {
            let mut ctx = LayoutContext::new(core, id);
            w.arrange(&mut ctx, content);
        }) {
            warn!(?id, "arrange skipped: {e}");
        }
        self.clamp_scroll(id);
    }

    /// Measure and arrange the whole tree against the viewport.
    pub fn update_layout(&mut self) {
        let root = self.root;
        let viewport = self.viewport;
        self.measure(root, viewport);
        self.arrange(root, viewport.rect());
        self.reposition_popups();
        self.needs_layout = false;
        self.needs_draw = true;
        debug!(w = viewport.w, h = viewport.h, "layout updated");
    }

    /// Run a layout pass if one is pending. Returns true if it ran.
    pub fn layout_if_needed(&mut self) -> bool {
        if self.needs_layout {
            self.update_layout();
            true
        } else {
            false
        }
    }

    /// Set a node's scrollable content size.
    pub(crate) fn set_extent(&mut self, id: NodeId, extent: Size) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.extent = Size::new(extent.w.max(0.0), extent.h.max(0.0));
        }
    }

    /// The largest scroll offset a node allows.
    pub fn max_scroll(&self, id: impl Into<NodeId>) -> Point {
        self.nodes
            .get(id.into())
            .map(|n| {
                Point::new(
                    (n.extent.w - n.bounds.w).max(0.0),
                    (n.extent.h - n.bounds.h).max(0.0),
                )
            })
            .unwrap_or_default()
    }

    /// Scroll a node's content, clamped to its extent. Returns true if the offset changed.
    pub fn scroll_to(&mut self, id: impl Into<NodeId>, offset: Point) -> bool {
        let id = id.into();
        let max = self.max_scroll(id);
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        let fix = |v: f32, max: f32| if v.is_finite() { v.clamp(0.0, max) } else { 0.0 };
        let next = Point::new(fix(offset.x, max.x), fix(offset.y, max.y));
        if next == node.scroll {
            return false;
        }
        node.scroll = next;
        self.needs_draw = true;
        self.reposition_popups();
        true
    }

    /// Keep a node's scroll offset inside its extent after a layout change.
    fn clamp_scroll(&mut self, id: NodeId) {
        let max = self.max_scroll(id);
        if let Some(node) = self.nodes.get_mut(id) {
            node.scroll.x = node.scroll.x.clamp(0.0, max.x);
            node.scroll.y = node.scroll.y.clamp(0.0, max.y);
        }
    }

    /// Dispatch an event to a node, bubbling to ancestors until a handler stops it.
    ///
    /// Pointer and scroll positions are re-expressed in each receiver's local space.
    pub fn dispatch_event(&mut self, start: impl Into<NodeId>, event: &Event) -> Result<EventOutcome> {
        let mut target = Some(start.into());
        while let Some(id) = target {
            if !self.nodes.contains_key(id) {
                break;
            }
            let local = self.localize(id, event);
            trace!(?id, kind = local.kind(), "dispatch");
            let outcome = self.with_widget_mut(id, |w, core| {
                let mut ctx = CoreContext::new(core, id);
                w.on_event(&local, &mut ctx)
            })??;
            if outcome.is_handled() {
                return Ok(outcome);
            }
            target = self.nodes.get(id).and_then(|n| n.parent);
        }
        Ok(EventOutcome::Ignore)
    }

    /// Deliver an event to exactly one node, without bubbling. Delivery waits if the node's
    /// widget is currently borrowed.
    pub(crate) fn deliver(&mut self, id: NodeId, event: Event) {
        let event = self.localize(id, &event);
        self.post(Deferred::Event(id, event));
    }

    /// Express an event's positions in a node's local space.
    fn localize(&self, id: NodeId, event: &Event) -> Event {
        match event {
            Event::Pointer(p) => {
                let mut p = *p;
                match self.popup_rect(id).filter(|r| r.contains_point(p.screen)) {
                    Some(rect) => {
                        p.region = HitRegion::Popup;
                        p.position = p.screen - rect.origin();
                    }
                    None => {
                        p.region = HitRegion::Content;
                        p.position = self.to_local(id, p.screen);
                    }
                }
                Event::Pointer(p)
            }
            Event::Scroll(s) => {
                let mut s = *s;
                s.position = self.to_local(id, s.screen);
                Event::Scroll(s)
            }
            other => other.clone(),
        }
    }

    /// Queue a deferred item and deliver whatever is deliverable.
    pub(crate) fn post(&mut self, item: Deferred) {
        self.deferred.push_back(item);
        self.flush_deferred();
    }

    /// Deliver queued items in order, stopping at the first whose widget is borrowed.
    pub(crate) fn flush_deferred(&mut self) {
        if self.flushing {
            return;
        }
        let mut core = guard(self, |c| c.flushing = false);
        core.flushing = true;
        while let Some(target) = core.deferred.front().map(Deferred::target) {
            if core.nodes.get(target).is_some_and(|n| n.widget.is_none()) {
                break;
            }
            let Some(item) = core.deferred.pop_front() else {
                break;
            };
            if core.nodes.contains_key(target) {
                core.deliver_now(item);
            }
        }
    }

    /// Deliver one deferred item to an available widget.
    fn deliver_now(&mut self, item: Deferred) {
        let result = match item {
            Deferred::Event(id, event) => self
                .with_widget_mut(id, |w, core| {
                    w.on_event(&event, &mut CoreContext::new(core, id))
                })
                .and_then(|r| r.map(|_| ())),
            Deferred::VisualState(id) => {
                let state = self.nodes.get(id).map(|n| n.visual_state).unwrap_or_default();
                match self.with_widget_mut(id, |w, _| w.on_visual_state(state)) {
                    Ok(true) => {
                        self.needs_draw = true;
                        Ok(())
                    }
                    Ok(false) => Ok(()),
                    Err(e) => Err(e),
                }
            }
            Deferred::ChildDetached { parent, child } => {
                self.with_widget_mut(parent, |w, _| w.on_child_detached(child))
            }
        };
        if let Err(e) = result {
            warn!("deferred delivery failed: {e}");
        }
    }

    /// Compute the visual state a node should currently show.
    pub(crate) fn compute_visual_state(&self, id: NodeId) -> VisualState {
        let enabled = self.is_enabled(id);
        let pressed = self.pressed == Some(id);
        let over = self
            .hovered
            .is_some_and(|h| h == id || self.is_ancestor(id, h));
        let focused = self.focus == Some(id);
        VisualState::resolve(enabled, pressed, over, focused)
    }

    /// Recompute a node's visual state and notify its widget on change.
    pub(crate) fn refresh_visual_state(&mut self, id: NodeId) {
        let state = self.compute_visual_state(id);
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if node.visual_state == state {
            return;
        }
        trace!(?id, %state, "visual state");
        node.visual_state = state;
        self.post(Deferred::VisualState(id));
    }

    /// Move hover to a new node, sending `Exited`/`Entered` and refreshing visual states.
    pub(crate) fn set_hovered(&mut self, new: Option<NodeId>) {
        let old = self.hovered;
        if old == new {
            return;
        }
        self.hovered = new;
        let mut touched = Vec::new();
        if let Some(old) = old.filter(|o| self.nodes.contains_key(*o)) {
            self.deliver(old, Event::Exited);
            touched.extend(self.ancestors_inclusive(old));
        }
        if let Some(new) = new {
            self.deliver(new, Event::Entered);
            touched.extend(self.ancestors_inclusive(new));
        }
        for id in touched {
            self.refresh_visual_state(id);
        }
    }

    /// Record the node a press started on.
    pub(crate) fn set_pressed(&mut self, new: Option<NodeId>) {
        let old = mem::replace(&mut self.pressed, new);
        if old == new {
            return;
        }
        for id in old.into_iter().chain(new) {
            self.refresh_visual_state(id);
        }
    }

    /// Clear focus, capture, hover, press state and popups that point into a subtree.
    fn release_subtree_state(&mut self, root: NodeId) {
        let inside = |core: &Self, id: Option<NodeId>| {
            id.is_some_and(|id| id == root || core.is_ancestor(root, id))
        };
        if inside(self, self.focus) {
            self.blur();
        }
        if inside(self, self.pointer_capture) {
            self.release_pointer();
        }
        if inside(self, self.hovered) {
            self.set_hovered(None);
        }
        if inside(self, self.pressed) {
            self.set_pressed(None);
        }
        let subtree: HashSet<NodeId> = self.pre_order(root).into_iter().collect();
        let before = self.overlays.len();
        self.overlays.retain(|o| !subtree.contains(&o.owner));
        if self.overlays.len() != before {
            self.needs_draw = true;
        }
    }

    /// Restore focus, capture, hover, press and popup invariants after the tree changed.
    pub(crate) fn ensure_invariants(&mut self) {
        self.ensure_focus_valid();
        if self.pointer_capture.is_some_and(|id| !self.is_live(id)) {
            self.release_pointer();
        }
        if self.hovered.is_some_and(|id| !self.is_live(id)) {
            self.set_hovered(None);
        }
        if self.pressed.is_some_and(|id| !self.is_live(id)) {
            self.set_pressed(None);
        }
        let dead: Vec<NodeId> = self
            .overlays
            .iter()
            .map(|o| o.owner)
            .filter(|owner| !(self.is_attached(*owner) && self.is_visible(*owner)))
            .collect();
        if !dead.is_empty() {
            self.overlays.retain(|o| !dead.contains(&o.owner));
            self.needs_draw = true;
        }
    }

    /// Run `on_mount` for every unmounted node in a subtree, parents first.
    fn mount_subtree(&mut self, root: NodeId) -> Result<()> {
        for id in self.pre_order(root) {
            let Some(node) = self.nodes.get_mut(id) else {
                continue;
            };
            if node.mounted {
                continue;
            }
            node.mounted = true;
            trace!(?id, "mount");
            self.with_widget_mut(id, |w, core| w.on_mount(&mut CoreContext::new(core, id)))??;
        }
        Ok(())
    }

    /// Run `on_unmount` for every mounted node in a subtree, children first.
    fn unmount_subtree(&mut self, root: NodeId) {
        for id in self.post_order(root) {
            let Some(node) = self.nodes.get_mut(id) else {
                continue;
            };
            if !node.mounted {
                continue;
            }
            node.mounted = false;
            trace!(?id, "unmount");
            if let Err(e) =
                self.with_widget_mut(id, |w, core| w.on_unmount(&mut CoreContext::new(core, id)))
            {
                warn!(?id, "unmount skipped: {e}");
            }
        }
    }

    /// A subtree in pre-order, root included.
    pub fn pre_order(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            out.push(id);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// A subtree in post-order, root included.
    pub fn post_order(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![(root, false)];
        while let Some((id, visited)) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            if visited {
                out.push(id);
                continue;
            }
            stack.push((id, true));
            stack.extend(node.children.iter().rev().map(|c| (*c, false)));
        }
        out
    }

    /// Draw the tree, then open popups. Returns the nodes that requested a layout while
    /// drawing.
    pub(crate) fn draw(&mut self, canvas: &mut dyn Canvas) -> Result<Vec<NodeId>> {
        let requests = RefCell::new(Vec::new());
        let root = self.root;
        self.draw_node(root, canvas, &requests)?;
        let popups: Vec<(NodeId, Rect)> = self.overlays.iter().map(|o| (o.owner, o.rect)).collect();
        for (owner, rect) in popups {
            canvas.save();
            canvas.translate(rect.origin());
            canvas.clip_rect(rect.size().rect());
            let drawn = self.with_widget_mut(owner, |w, core| {
                let ctx = DrawContext::new(core, owner, &requests);
                w.draw_popup(&mut *canvas, &ctx, rect.size())
            });
            canvas.restore();
            drawn??;
        }
        self.needs_draw = false;
        let mut out = requests.into_inner();
        out.sort();
        out.dedup();
        Ok(out)
    }

    /// Draw one node and its visible children.
    fn draw_node(
        &mut self,
        id: NodeId,
        canvas: &mut dyn Canvas,
        requests: &RefCell<Vec<NodeId>>,
    ) -> Result<()> {
        let Some(node) = self.nodes.get(id) else {
            return Ok(());
        };
        if !node.visible {
            return Ok(());
        }
        let bounds = node.bounds;
        let scroll = node.scroll;
        let clip = node.layout.clip;
        let children = node.children.clone();
        canvas.save();
        canvas.translate(bounds.origin());
        if clip {
            canvas.clip_rect(bounds.size().rect());
        }
        let drawn = self.with_widget_mut(id, |w, core| {
            let ctx = DrawContext::new(core, id, requests);
            w.draw(&mut *canvas, &ctx)
        });
        if let Err(e) = drawn.and_then(|r| r) {
            canvas.restore();
            return Err(e);
        }
        canvas.translate(-scroll);
        for child in children {
            if let Err(e) = self.draw_node(child, canvas, requests) {
                canvas.restore();
                return Err(e);
            }
        }
        canvas.restore();
        Ok(())
    }

    /// Bump a node's relayout streak, returning the new value.
    pub(crate) fn bump_relayout_streak(&mut self, id: NodeId) -> u32 {
        self.nodes.get_mut(id).map_or(0, |n| {
            n.relayout_streak += 1;
            n.relayout_streak
        })
    }

    /// Reset relayout streaks for every node not in `keep`.
    pub(crate) fn reset_relayout_streaks(&mut self, keep: &[NodeId]) {
        for (id, node) in self.nodes.iter_mut() {
            if !keep.contains(&id) {
                node.relayout_streak = 0;
            }
        }
    }
}

impl Default for Core {
    fn default() -> Self {
        Self::new()
    }
}

/// The implicit root. Lays children out as an overlay and never claims a hit itself.
struct RootContainer;

impl Widget for RootContainer {
    fn hit_self(&self) -> bool {
        false
    }

    fn name(&self) -> NodeName {
        NodeName::convert("root")
    }
}
