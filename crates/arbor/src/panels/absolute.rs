use std::collections::HashMap;

use bitflags::bitflags;

use crate::{
    Core, NodeId,
    core::context::LayoutContext,
    error::Result,
    geom::{Rect, Size},
    widget::Widget,
};

bitflags! {
    /// Which components of an [`AbsolutePlacement`] are fractions of the panel's content size.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AbsoluteFlags: u8 {
        /// X is proportional.
        const X = 1;
        /// Y is proportional.
        const Y = 1 << 1;
        /// Width is proportional.
        const WIDTH = 1 << 2;
        /// Height is proportional.
        const HEIGHT = 1 << 3;
        /// X and Y are proportional.
        const POSITION = Self::X.bits() | Self::Y.bits();
        /// Width and height are proportional.
        const SIZE = Self::WIDTH.bits() | Self::HEIGHT.bits();
        /// Everything is proportional.
        const ALL = Self::POSITION.bits() | Self::SIZE.bits();
    }
}

/// Where a child sits inside an [`AbsoluteLayout`].
///
/// A negative width or height means "use the child's desired size".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbsolutePlacement {
    /// Position and size, absolute or proportional per `flags`.
    pub rect: Rect,
    /// Proportional components.
    pub flags: AbsoluteFlags,
}

impl Default for AbsolutePlacement {
    fn default() -> Self {
        Self {
            rect: Rect::new(0.0, 0.0, -1.0, -1.0),
            flags: AbsoluteFlags::empty(),
        }
    }
}

impl AbsolutePlacement {
    /// A fixed position at the child's desired size.
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            rect: Rect::new(x, y, -1.0, -1.0),
            flags: AbsoluteFlags::empty(),
        }
    }

    /// A placement with explicit flags.
    pub fn new(rect: Rect, flags: AbsoluteFlags) -> Self {
        Self { rect, flags }
    }

    /// Resolve against the panel's content size and the child's desired size.
    pub fn resolve(&self, content: Size, desired: Size) -> Rect {
        let f = self.flags;
        let pick = |v: f32, proportional: bool, extent: f32| {
            let v = if v.is_finite() { v } else { 0.0 };
            if proportional { v * extent } else { v }
        };
        let size = |v: f32, proportional: bool, extent: f32, desired: f32| {
            if v < 0.0 || v.is_nan() {
                desired
            } else {
                pick(v, proportional, extent)
            }
        };
        Rect::new(
            pick(self.rect.x, f.contains(AbsoluteFlags::X), content.w),
            pick(self.rect.y, f.contains(AbsoluteFlags::Y), content.h),
            size(self.rect.w, f.contains(AbsoluteFlags::WIDTH), content.w, desired.w),
            size(self.rect.h, f.contains(AbsoluteFlags::HEIGHT), content.h, desired.h),
        )
    }
}

/// Positions children at explicit rectangles. There is no flow and overlap is allowed.
#[derive(Debug, Default)]
pub struct AbsoluteLayout {
    /// Per-child placements.
    placements: HashMap<NodeId, AbsolutePlacement>,
}

impl AbsoluteLayout {
    /// An empty panel.
    pub fn new() -> Self {
        Self::default()
    }

    /// A child's placement.
    pub fn placement(&self, child: NodeId) -> AbsolutePlacement {
        self.placements.get(&child).copied().unwrap_or_default()
    }

    /// Set the placement of a child of `panel`.
    pub fn place(
        core: &mut Core,
        panel: NodeId,
        child: NodeId,
        placement: AbsolutePlacement,
    ) -> Result<()> {
        core.with_widget(panel, |p: &mut Self, _| {
            p.placements.insert(child, placement);
        })?;
        core.invalidate_measure(panel);
        Ok(())
    }

    /// Append a widget to `panel` at a placement.
    pub fn add<W: Widget + 'static>(
        core: &mut Core,
        panel: NodeId,
        widget: W,
        placement: AbsolutePlacement,
    ) -> Result<NodeId> {
        let child = core.add_child(panel, widget)?;
        Self::place(core, panel, child, placement)?;
        Ok(child)
    }

    /// Number of children with a stored placement.
    pub fn placed(&self) -> usize {
        self.placements.len()
    }
}

impl Widget for AbsoluteLayout {
    fn measure(&mut self, ctx: &mut LayoutContext<'_>, available: Size) -> Size {
        let mut extent = Size::ZERO;
        for child in ctx.visible_children() {
            let p = self.placement(child);
            let desired = ctx.measure(child, available);
            // Proportional components depend on the final size and do not contribute.
            let r = p.resolve(Size::ZERO, desired);
            if !p.flags.intersects(AbsoluteFlags::X | AbsoluteFlags::WIDTH) {
                extent.w = extent.w.max(r.x + r.w);
            }
            if !p.flags.intersects(AbsoluteFlags::Y | AbsoluteFlags::HEIGHT) {
                extent.h = extent.h.max(r.y + r.h);
            }
        }
        extent
    }

    fn arrange(&mut self, ctx: &mut LayoutContext<'_>, content: Rect) {
        for child in ctx.visible_children() {
            let r = self
                .placement(child)
                .resolve(content.size(), ctx.desired(child));
            ctx.arrange(child, r.translate(content.origin()));
        }
    }

    fn on_child_detached(&mut self, child: NodeId) {
        self.placements.remove(&child);
    }
}
