use crate::{
    NodeId,
    core::{
        context::LayoutContext,
        property::{Affects, Observable, Property, PropertyInfo},
    },
    geom::{Rect, Size},
    layout::Orientation,
    widget::Widget,
};

/// Lays children out one after another along a single axis.
///
/// Children are measured unbounded along the flow axis and bounded by the available cross
/// size. Children whose layout sets `expand` share whatever flow space the others leave, so a
/// nested scroll view gets the remainder instead of its full content length. Cross-axis
/// alignment is each child's own.
pub struct Stack {
    /// Flow direction.
    orientation: Orientation,
    /// Gap between adjacent visible children.
    spacing: Observable<f32>,
}

/// Accessor for [`Stack::SPACING`].
fn spacing_cell(s: &mut Stack) -> &mut Observable<f32> {
    &mut s.spacing
}

/// Published properties.
const PROPERTIES: &[PropertyInfo] = &[Stack::SPACING.info];

/// Flow and cross components of a size.
fn split(orientation: Orientation, s: Size) -> (f32, f32) {
    match orientation {
        Orientation::Vertical => (s.h, s.w),
        Orientation::Horizontal => (s.w, s.h),
    }
}

/// Build a size from flow and cross components.
fn join(orientation: Orientation, flow: f32, cross: f32) -> Size {
    match orientation {
        Orientation::Vertical => Size::new(cross, flow),
        Orientation::Horizontal => Size::new(flow, cross),
    }
}

impl Stack {
    /// Gap between children.
    pub const SPACING: Property<Self, f32> = Property::new("spacing", Affects::Measure, spacing_cell);

    /// A stack flowing in `orientation`.
    pub fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            spacing: Observable::new(0.0),
        }
    }

    /// A top-to-bottom stack.
    pub fn vertical() -> Self {
        Self::new(Orientation::Vertical)
    }

    /// A left-to-right stack.
    pub fn horizontal() -> Self {
        Self::new(Orientation::Horizontal)
    }

    /// Set the gap between children.
    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing.set(spacing.max(0.0));
        self
    }

    /// Flow direction.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Gap between children.
    pub fn spacing(&self) -> f32 {
        self.spacing.get().max(0.0)
    }

    /// Total spacing for `n` visible children.
    fn gaps(&self, n: usize) -> f32 {
        self.spacing() * n.saturating_sub(1) as f32
    }
}

impl Widget for Stack {
    fn measure(&mut self, ctx: &mut LayoutContext<'_>, available: Size) -> Size {
        let o = self.orientation;
        let children = ctx.visible_children();
        let (avail_flow, avail_cross) = split(o, available);
        let gaps = self.gaps(children.len());
        let (expanding, fixed): (Vec<NodeId>, Vec<NodeId>) = children
            .iter()
            .partition(|c| ctx.layout_of(**c).expand);

        let mut flow = 0.0f32;
        let mut cross = 0.0f32;
        for child in &fixed {
            let d = ctx.measure(*child, join(o, f32::INFINITY, avail_cross));
            let (f, c) = split(o, d);
            flow += f;
            cross = cross.max(c);
        }
        if !expanding.is_empty() {
            let share = if avail_flow.is_finite() {
                (avail_flow - flow - gaps).max(0.0) / expanding.len() as f32
            } else {
                f32::INFINITY
            };
            for child in &expanding {
                let d = ctx.measure(*child, join(o, share, avail_cross));
                let (f, c) = split(o, d);
                flow += f;
                cross = cross.max(c);
            }
        }
        join(o, flow + gaps, cross)
    }

    fn arrange(&mut self, ctx: &mut LayoutContext<'_>, content: Rect) {
        let o = self.orientation;
        let children = ctx.visible_children();
        let spacing = self.spacing();
        let (content_flow, content_cross) = split(o, content.size());
        let expand: Vec<bool> = children.iter().map(|c| ctx.layout_of(*c).expand).collect();
        let fixed_flow: f32 = children
            .iter()
            .zip(&expand)
            .filter(|(_, e)| !**e)
            .map(|(c, _)| split(o, ctx.desired(*c)).0)
            .sum();
        let n_expand = expand.iter().filter(|e| **e).count();
        let share = if n_expand > 0 {
            (content_flow - fixed_flow - self.gaps(children.len())).max(0.0) / n_expand as f32
        } else {
            0.0
        };

        let mut offset = 0.0;
        for (child, expands) in children.into_iter().zip(expand) {
            let len = if expands {
                share
            } else {
                split(o, ctx.desired(child)).0
            };
            let slot = match o {
                Orientation::Vertical => Rect::new(content.x, content.y + offset, content_cross, len),
                Orientation::Horizontal => {
                    Rect::new(content.x + offset, content.y, len, content_cross)
                }
            };
            ctx.arrange(child, slot);
            offset += len + spacing;
        }
    }

    fn properties(&self) -> &'static [PropertyInfo] {
        PROPERTIES
    }
}
