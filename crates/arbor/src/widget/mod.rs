//! Widget trait and event outcome types.

use std::any::Any;

use crate::{
    Context,
    core::{
        context::{DrawContext, LayoutContext},
        property::PropertyInfo,
        render::Canvas,
        visual_state::VisualState,
    },
    error::Result,
    event::Event,
    geom::{Rect, Size},
    layout::Layout,
    name::NodeName,
    NodeId,
};

/// The result of an event handler.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum EventOutcome {
    /// The event was processed and propagation stops.
    Handle,
    /// The event was processed without a state change and propagation stops.
    Consume,
    /// The event was not handled and bubbles to the parent.
    Ignore,
}

impl EventOutcome {
    /// Did a handler stop propagation?
    pub fn is_handled(&self) -> bool {
        !matches!(self, Self::Ignore)
    }
}

/// Widgets are the behaviour attached to views in the Core arena.
///
/// Every method has a default, so a widget only overrides what it needs. The defaults make a
/// widget behave as an overlay container: each child is measured against the full content
/// availability and arranged into the full content box.
pub trait Widget: Any + Send {
    /// Initial layout properties, read once when the node is created.
    fn layout(&self) -> Layout {
        Layout::default()
    }

    /// Report the content size this widget wants given the content-box availability.
    ///
    /// Either dimension of `available` may be infinite. Margin and padding have already been
    /// removed and are added back by the core. NaN, negative and infinite results are repaired
    /// by the caller.
    fn measure(&mut self, ctx: &mut LayoutContext<'_>, available: Size) -> Size {
        ctx.measure_overlay(available)
    }

    /// Place children inside `content`, the padded content box in this node's local space.
    fn arrange(&mut self, ctx: &mut LayoutContext<'_>, content: Rect) {
        ctx.arrange_overlay(content);
    }

    /// Draw this widget's own content in local coordinates. Children are drawn afterwards.
    ///
    /// Drawing may not change layout. A widget that discovers its measurement is stale calls
    /// `ctx.request_layout()` and the frame driver schedules a follow-up layout.
    fn draw(&mut self, _canvas: &mut dyn Canvas, _ctx: &DrawContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Draw the content of this widget's open popup. The canvas origin is the popup's top-left
    /// corner in screen space and drawing is clipped to `size`.
    fn draw_popup(
        &mut self,
        _canvas: &mut dyn Canvas,
        _ctx: &DrawContext<'_>,
        _size: Size,
    ) -> Result<()> {
        Ok(())
    }

    /// Handle an event.
    fn on_event(&mut self, _event: &Event, _ctx: &mut dyn Context) -> Result<EventOutcome> {
        Ok(EventOutcome::Ignore)
    }

    /// Can this widget hold focus? Read once when the node is created.
    fn accept_focus(&self) -> bool {
        false
    }

    /// Is the node itself a hit target when none of its children claim a point? Read once
    /// when the node is created.
    fn hit_self(&self) -> bool {
        true
    }

    /// Called when the node becomes reachable from the root.
    fn on_mount(&mut self, _ctx: &mut dyn Context) -> Result<()> {
        Ok(())
    }

    /// Called when the node stops being reachable from the root, before it is detached or
    /// removed. Widgets release subscriptions here.
    fn on_unmount(&mut self, _ctx: &mut dyn Context) {}

    /// A direct child was detached or removed. Side tables keyed by child id are pruned here.
    fn on_child_detached(&mut self, _child: NodeId) {}

    /// The node's visual state changed. Return true if the widget needs a redraw.
    fn on_visual_state(&mut self, _state: VisualState) -> bool {
        false
    }

    /// Descriptor table for this widget's observable properties.
    fn properties(&self) -> &'static [PropertyInfo] {
        &[]
    }

    /// Diagnostic name.
    fn name(&self) -> NodeName {
        NodeName::of::<Self>()
    }
}

/// Convert widgets into boxed trait objects.
impl<W> From<W> for Box<dyn Widget>
where
    W: Widget + 'static,
{
    fn from(widget: W) -> Self {
        Box::new(widget)
    }
}
