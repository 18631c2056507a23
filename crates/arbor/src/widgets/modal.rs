//! Full-window dialog host.

use crate::{
    Context, Core, FocusManager, NodeId,
    core::{
        context::{DrawContext, LayoutContext, ViewContext},
        render::{Canvas, Color, Paint},
    },
    error::Result,
    event::{Event, KeyCode},
    geom::{Point, Rect, Size},
    widget::{EventOutcome, Widget},
};

/// Default scrim tint.
const SCRIM: Color = Color::rgba(0, 0, 0, 0x60);

/// Covers its whole slot with a scrim and centers its content on top.
///
/// Every pointer and scroll event that reaches the modal stops there, so nothing beneath it
/// reacts while it is shown. A press on the scrim itself lands on the modal because it
/// hit-tests as its own background. Tab and Shift+Tab cycle focus among the modal's
/// descendants, and Escape hides it unless that is turned off.
pub struct Modal {
    /// Scrim color.
    scrim: Color,
    /// Hide on Escape.
    close_on_escape: bool,
    /// Hide on a press outside the content.
    close_on_scrim: bool,
}

impl Default for Modal {
    fn default() -> Self {
        Self {
            scrim: SCRIM,
            close_on_escape: true,
            close_on_scrim: false,
        }
    }
}

impl Modal {
    /// A modal host that closes on Escape.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scrim color.
    pub fn with_scrim(mut self, color: Color) -> Self {
        self.scrim = color;
        self
    }

    /// Choose whether Escape hides the modal.
    pub fn with_close_on_escape(mut self, close: bool) -> Self {
        self.close_on_escape = close;
        self
    }

    /// Choose whether a press on the scrim hides the modal.
    pub fn with_close_on_scrim(mut self, close: bool) -> Self {
        self.close_on_scrim = close;
        self
    }

    /// Show a modal node and focus the first focusable node inside it.
    pub fn show(core: &mut Core, modal: NodeId) -> Result<()> {
        core.set_visible(modal, true)?;
        let first = core
            .focusable_nodes()
            .into_iter()
            .find(|n| core.is_ancestor(modal, *n));
        if let Some(n) = first {
            core.set_focus(n)?;
        }
        Ok(())
    }

    /// Hide a modal node.
    pub fn hide(core: &mut Core, modal: NodeId) -> Result<()> {
        core.set_visible(modal, false)?;
        Ok(())
    }

    /// Move focus to the next or previous focusable descendant, wrapping.
    fn cycle_focus(ctx: &mut dyn Context, back: bool) -> Result<bool> {
        let me = ctx.node_id();
        let core = ctx.core();
        let inside: Vec<NodeId> = core
            .focusable_nodes()
            .into_iter()
            .filter(|n| core.is_ancestor(me, *n))
            .collect();
        if inside.is_empty() {
            return Ok(false);
        }
        let n = inside.len();
        let target = match ctx.focused().and_then(|f| inside.iter().position(|i| *i == f)) {
            Some(i) if back => inside[(i + n - 1) % n],
            Some(i) => inside[(i + 1) % n],
            None if back => inside[n - 1],
            None => inside[0],
        };
        ctx.set_focus(target)
    }

    /// Is a local point over one of the content children?
    fn over_content(ctx: &dyn Context, p: Point) -> bool {
        ctx.children().iter().any(|c| {
            ctx.core()
                .node(*c)
                .is_some_and(|n| n.visible() && n.bounds().contains_point(p))
        })
    }
}

impl Widget for Modal {
    fn measure(&mut self, ctx: &mut LayoutContext<'_>, available: Size) -> Size {
        let content = ctx.measure_overlay(available);
        Size::new(
            if available.w.is_finite() { available.w } else { content.w },
            if available.h.is_finite() { available.h } else { content.h },
        )
    }

    fn arrange(&mut self, ctx: &mut LayoutContext<'_>, content: Rect) {
        for child in ctx.visible_children() {
            let d = ctx.desired(child);
            let (w, h) = (d.w.min(content.w), d.h.min(content.h));
            let x = content.x + (content.w - w) / 2.0;
            let y = content.y + (content.h - h) / 2.0;
            ctx.arrange(child, Rect::new(x, y, w, h));
        }
    }

    fn draw(&mut self, canvas: &mut dyn Canvas, ctx: &DrawContext<'_>) -> Result<()> {
        canvas.draw_rect(ctx.size().rect(), &Paint::fill(self.scrim));
        Ok(())
    }

    fn on_event(&mut self, event: &Event, ctx: &mut dyn Context) -> Result<EventOutcome> {
        let me = ctx.node_id();
        match event {
            Event::Pointer(p) if event.is_press() => {
                if self.close_on_scrim && !Self::over_content(ctx, p.position) {
                    ctx.set_visible(me, false)?;
                }
                Ok(EventOutcome::Consume)
            }
            Event::Pointer(_) | Event::Scroll(_) => Ok(EventOutcome::Consume),
            Event::KeyDown(k) if *k == KeyCode::Esc && self.close_on_escape => {
                ctx.set_visible(me, false)?;
                Ok(EventOutcome::Handle)
            }
            Event::KeyDown(k) if k.is_tab() || k.is_back_tab() => {
                Ok(if Self::cycle_focus(ctx, k.is_back_tab())? {
                    EventOutcome::Handle
                } else {
                    EventOutcome::Consume
                })
            }
            _ => Ok(EventOutcome::Ignore),
        }
    }
}
