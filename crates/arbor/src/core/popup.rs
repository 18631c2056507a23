//! Floating panels that draw and take input outside their owner's bounds.
//!
//! The window keeps one registry of open popups, in registration order. Each entry is keyed by
//! its owner node and carries a rectangle in window coordinates. Hit-testing consults the
//! registry before the tree, and popups are drawn after the tree, so the most recently opened
//! popup is on top for both.

use tracing::{debug, trace};

use super::{hittest::HitTester, id::NodeId, world::Core};
use crate::{
    Context,
    error::{Error, Result},
    geom::{Rect, Size},
};

/// Which side of its anchor a popup prefers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Placement {
    /// Below the anchor, left edges aligned.
    #[default]
    Below,
    /// Above the anchor, left edges aligned.
    Above,
}

/// An open popup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlay {
    /// Node that owns the popup and receives its input.
    pub owner: NodeId,
    /// Requested popup size.
    pub size: Size,
    /// Preferred side.
    pub placement: Placement,
    /// Resolved rectangle in window coordinates.
    pub rect: Rect,
}

/// Position a popup of `size` next to `anchor`, both in window coordinates.
///
/// The popup goes on the preferred side when it fits there. Otherwise it flips to the other
/// side if that fits. Whatever side wins, the result is then shifted to stay inside the
/// viewport; a popup larger than the viewport is pinned to the viewport's top-left edge on that
/// axis.
pub fn place_popup(anchor: Rect, size: Size, viewport: Size, placement: Placement, gap: f32) -> Rect {
    let below = anchor.bottom() + gap;
    let above = anchor.y - gap - size.h;
    let fits_below = below + size.h <= viewport.h;
    let fits_above = above >= 0.0;
    let y = match placement {
        Placement::Below if !fits_below && fits_above => above,
        Placement::Below => below,
        Placement::Above if !fits_above && fits_below => below,
        Placement::Above => above,
    };
    Rect::new(anchor.x, y, size.w, size.h).clamp_within(&viewport.rect())
}

/// Registry operations for popups.
pub trait PopupManager {
    /// Open or resize the popup owned by `owner`, moving it to the top. Returns its rectangle.
    fn open_popup(&mut self, owner: NodeId, size: Size, placement: Placement) -> Result<Rect>;

    /// Close the popup owned by `owner`. Returns `true` if one was open.
    fn close_popup(&mut self, owner: NodeId) -> bool;

    /// The window rectangle of `owner`'s open popup.
    fn popup_rect(&self, owner: NodeId) -> Option<Rect>;

    /// Every open popup, bottom to top.
    fn popups(&self) -> &[Overlay];

    /// Recompute popup rectangles after layout, scrolling or a resize moved their anchors.
    fn reposition_popups(&mut self);
}

impl PopupManager for Core {
    fn open_popup(&mut self, owner: NodeId, size: Size, placement: Placement) -> Result<Rect> {
        if !self.contains(owner) {
            return Err(Error::NodeNotFound(owner));
        }
        if !self.is_attached(owner) {
            return Err(Error::InvalidOperation("popup owner is not attached".into()));
        }
        let size = Size::new(
            if size.w.is_finite() { size.w.max(0.0) } else { 0.0 },
            if size.h.is_finite() { size.h.max(0.0) } else { 0.0 },
        );
        let anchor = self.screen_bounds(owner).unwrap_or_default();
        let rect = place_popup(anchor, size, self.viewport, placement, self.config.popup_gap);
        self.overlays.retain(|o| o.owner != owner);
        self.overlays.push(Overlay {
            owner,
            size,
            placement,
            rect,
        });
        self.needs_draw = true;
        debug!(?owner, x = rect.x, y = rect.y, w = rect.w, h = rect.h, "popup opened");
        Ok(rect)
    }

    fn close_popup(&mut self, owner: NodeId) -> bool {
        let before = self.overlays.len();
        self.overlays.retain(|o| o.owner != owner);
        let closed = self.overlays.len() != before;
        if closed {
            self.needs_draw = true;
            debug!(?owner, "popup closed");
        }
        closed
    }

    fn popup_rect(&self, owner: NodeId) -> Option<Rect> {
        self.overlays
            .iter()
            .find(|o| o.owner == owner)
            .map(|o| o.rect)
    }

    fn popups(&self) -> &[Overlay] {
        &self.overlays
    }

    fn reposition_popups(&mut self) {
        let viewport = self.viewport;
        let gap = self.config.popup_gap;
        let anchors: Vec<Option<Rect>> = self
            .overlays
            .iter()
            .map(|o| self.screen_bounds(o.owner))
            .collect();
        for (overlay, anchor) in self.overlays.iter_mut().zip(anchors) {
            if let Some(anchor) = anchor {
                let rect = place_popup(anchor, overlay.size, viewport, overlay.placement, gap);
                if rect != overlay.rect {
                    trace!(owner = ?overlay.owner, "popup moved");
                    overlay.rect = rect;
                }
            }
        }
    }
}

/// Popup capability for widgets that own a floating panel.
///
/// A widget holds one of these and calls it from its event handlers; the anchor performs
/// registration and placement against the widget's current window bounds. The widget draws the
/// panel in `Widget::draw_popup` and receives input there with `HitRegion::Popup`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PopupAnchor {
    /// Preferred side.
    pub placement: Placement,
}

impl PopupAnchor {
    /// An anchor with a placement preference.
    pub fn new(placement: Placement) -> Self {
        Self { placement }
    }

    /// Open the panel at `size`. Returns the resolved window rectangle.
    pub fn open(&self, ctx: &mut dyn Context, size: Size) -> Result<Rect> {
        ctx.open_popup(size, self.placement)
    }

    /// Close the panel. Returns `true` if it was open.
    pub fn close(&self, ctx: &mut dyn Context) -> bool {
        ctx.close_popup()
    }

    /// Open the panel if closed, close it if open. Returns whether it is now open.
    pub fn toggle(&self, ctx: &mut dyn Context, size: Size) -> Result<bool> {
        if self.close(ctx) {
            Ok(false)
        } else {
            self.open(ctx, size)?;
            Ok(true)
        }
    }

    /// Is the panel open?
    pub fn is_open(&self, ctx: &dyn Context) -> bool {
        ctx.popup_rect().is_some()
    }

    /// The panel's window rectangle, if open.
    pub fn rect(&self, ctx: &dyn Context) -> Option<Rect> {
        ctx.popup_rect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{event::HitRegion, geom::Point, testing::Fixed};

    const VIEW: Size = Size::new(200.0, 100.0);

    #[test]
    fn below_when_it_fits() {
        let anchor = Rect::new(10.0, 10.0, 50.0, 20.0);
        let r = place_popup(anchor, Size::new(50.0, 30.0), VIEW, Placement::Below, 2.0);
        assert_eq!(r, Rect::new(10.0, 32.0, 50.0, 30.0));
    }

    #[test]
    fn flips_above_near_the_bottom() {
        let anchor = Rect::new(10.0, 70.0, 50.0, 20.0);
        let r = place_popup(anchor, Size::new(50.0, 30.0), VIEW, Placement::Below, 2.0);
        assert_eq!(r, Rect::new(10.0, 38.0, 50.0, 30.0));
    }

    #[test]
    fn clamps_when_neither_side_fits() {
        let anchor = Rect::new(180.0, 40.0, 20.0, 20.0);
        let r = place_popup(anchor, Size::new(60.0, 60.0), VIEW, Placement::Above, 0.0);
        assert!(VIEW.rect().contains_rect(&r));
        assert_eq!(r.x, 140.0);
    }

    #[test]
    fn popup_hits_outside_owner_bounds() -> Result<()> {
        let mut core = Core::new();
        core.set_viewport(VIEW);
        let owner = core.add_child(core.root(), Fixed::new(40.0, 10.0).at(0.0, 0.0))?;
        core.update_layout();
        let rect = core.open_popup(owner, Size::new(40.0, 40.0), Placement::Below)?;
        let inside = Point::new(5.0, rect.y + 5.0);
        let hit = core.locate(inside);
        assert_eq!(hit.map(|h| (h.node, h.region)), Some((owner, HitRegion::Popup)));
        assert_eq!(hit.map(|h| h.position), Some(Point::new(5.0, 5.0)));
        assert!(core.close_popup(owner));
        assert_eq!(core.locate(inside), None);
        Ok(())
    }

    #[test]
    fn detach_clears_popups() -> Result<()> {
        let mut core = Core::new();
        core.set_viewport(VIEW);
        let owner = core.add_child(core.root(), Fixed::new(40.0, 10.0))?;
        core.update_layout();
        core.open_popup(owner, Size::new(10.0, 10.0), Placement::Below)?;
        core.detach(owner)?;
        assert!(core.popups().is_empty());
        Ok(())
    }
}
