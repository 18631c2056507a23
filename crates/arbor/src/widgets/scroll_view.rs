//! Vertically scrolling viewport.

use super::palette;
use crate::{
    Context,
    core::{
        context::{DrawContext, LayoutContext, ViewContext},
        render::{Canvas, Paint},
    },
    error::Result,
    event::{Event, KeyCode, PointerAction},
    geom::{Point, Rect, Size},
    layout::Layout,
    widget::{EventOutcome, Widget},
};

/// Width of the scroll bar gutter.
pub const BAR: f32 = 8.0;
/// Shortest thumb.
const MIN_THUMB: f32 = 16.0;

/// An in-progress thumb drag.
#[derive(Debug, Clone, Copy)]
struct Drag {
    /// Pointer y where the drag started, local.
    start_y: f32,
    /// Scroll offset when the drag started.
    start_offset: f32,
}

/// Shows its children through a viewport, scrolling vertically.
///
/// Children are measured with unbounded height and arranged at their full natural height; the
/// core applies the scroll offset when drawing and hit-testing them. The view asks linear
/// panels for the remaining space and clips its content.
#[derive(Debug, Default)]
pub struct ScrollView {
    /// Active thumb drag.
    drag: Option<Drag>,
}

/// Thumb rectangle for a viewport of `view` over content of height `extent` at `offset`.
fn thumb_rect(view: Size, extent: f32, offset: f32) -> Option<Rect> {
    if extent <= view.h || view.h <= 0.0 {
        return None;
    }
    let h = (view.h * view.h / extent).clamp(MIN_THUMB.min(view.h), view.h);
    let travel = view.h - h;
    let max = extent - view.h;
    let y = if max > 0.0 { travel * offset / max } else { 0.0 };
    Some(Rect::new(view.w - BAR, y, BAR, h))
}

impl ScrollView {
    /// An empty scroll view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scroll offset per pixel of thumb travel.
    fn drag_ratio(view: Size, extent: f32) -> f32 {
        match thumb_rect(view, extent, 0.0) {
            Some(t) if view.h > t.h => (extent - view.h) / (view.h - t.h),
            _ => 0.0,
        }
    }
}

impl Widget for ScrollView {
    fn layout(&self) -> Layout {
        Layout::new().expand().clip()
    }

    fn measure(&mut self, ctx: &mut LayoutContext<'_>, available: Size) -> Size {
        let inner_w = (available.w - BAR).max(0.0);
        let content = ctx.measure_overlay(Size::new(inner_w, f32::INFINITY));
        let h = if available.h.is_finite() {
            content.h.min(available.h)
        } else {
            content.h
        };
        Size::new(content.w + BAR, h)
    }

    fn arrange(&mut self, ctx: &mut LayoutContext<'_>, content: Rect) {
        let inner_w = (content.w - BAR).max(0.0);
        let mut extent = content.h;
        for child in ctx.children() {
            let h = ctx.desired(child).h.max(content.h);
            ctx.arrange(child, Rect::new(content.x, content.y, inner_w, h));
            extent = extent.max(h + content.y);
        }
        ctx.set_extent(Size::new(0.0, extent));
    }

    fn draw(&mut self, canvas: &mut dyn Canvas, ctx: &DrawContext<'_>) -> Result<()> {
        let size = ctx.size();
        if let Some(thumb) = thumb_rect(size, ctx.extent().h, ctx.scroll_offset().y) {
            canvas.draw_rect(
                Rect::new(size.w - BAR, 0.0, BAR, size.h),
                &Paint::fill(palette::SURFACE),
            );
            let color = if self.drag.is_some() {
                palette::ACCENT
            } else {
                palette::BORDER
            };
            canvas.draw_round_rect(thumb, BAR / 2.0, &Paint::fill(color));
        }
        Ok(())
    }

    fn on_event(&mut self, event: &Event, ctx: &mut dyn Context) -> Result<EventOutcome> {
        let size = ctx.size();
        let extent = ctx.extent().h;
        match event {
            Event::Scroll(s) => {
                let step = ctx.config().scroll_step;
                let moved = ctx.scroll_by(Point::new(0.0, s.delta.y * step));
                Ok(if moved {
                    EventOutcome::Handle
                } else {
                    EventOutcome::Ignore
                })
            }
            Event::Pointer(p) if event.is_press() && p.position.x >= size.w - BAR => {
                let Some(thumb) = thumb_rect(size, extent, ctx.scroll_offset().y) else {
                    return Ok(EventOutcome::Ignore);
                };
                if !thumb.contains_point(p.position) {
                    // Jump so the thumb centers under the pointer.
                    let target = (p.position.y - thumb.h / 2.0) * Self::drag_ratio(size, extent);
                    ctx.scroll_to(Point::new(0.0, target));
                }
                self.drag = Some(Drag {
                    start_y: p.position.y,
                    start_offset: ctx.scroll_offset().y,
                });
                ctx.capture_pointer();
                ctx.invalidate();
                Ok(EventOutcome::Handle)
            }
            Event::Pointer(p) if p.action == PointerAction::Moved => match self.drag {
                Some(d) if ctx.has_pointer_capture() => {
                    let offset =
                        d.start_offset + (p.position.y - d.start_y) * Self::drag_ratio(size, extent);
                    ctx.scroll_to(Point::new(0.0, offset));
                    Ok(EventOutcome::Handle)
                }
                _ => Ok(EventOutcome::Ignore),
            },
            Event::Pointer(_) if event.is_release() && self.drag.is_some() => {
                self.drag = None;
                ctx.invalidate();
                Ok(EventOutcome::Handle)
            }
            Event::KeyDown(k) => {
                let page = (size.h - ctx.config().scroll_step).max(size.h / 2.0);
                let offset = ctx.scroll_offset().y;
                let target = if *k == KeyCode::PageDown {
                    offset + page
                } else if *k == KeyCode::PageUp {
                    offset - page
                } else if *k == KeyCode::Home {
                    0.0
                } else if *k == KeyCode::End {
                    f32::MAX
                } else {
                    return Ok(EventOutcome::Ignore);
                };
                Ok(if ctx.scroll_to(Point::new(0.0, target)) {
                    EventOutcome::Handle
                } else {
                    EventOutcome::Ignore
                })
            }
            _ => Ok(EventOutcome::Ignore),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        HitTester, NodeId,
        panels::Stack,
        testing::{DrawOp, Fixed, Harness},
    };

    /// A 100x100 window holding a scroll view over ten 20px rows.
    fn rows(h: &mut Harness) -> Result<(NodeId, Vec<NodeId>)> {
        let view = h.add(ScrollView::new())?;
        let stack = h.add_to(view, Stack::vertical())?;
        let rows = (0..10)
            .map(|_| h.add_to(stack, Fixed::new(50.0, 20.0)))
            .collect::<Result<Vec<_>>>()?;
        h.frame()?;
        Ok((view, rows))
    }

    #[test]
    fn wheel_scrolls_and_hits_follow() -> Result<()> {
        let mut h = Harness::new(100.0, 100.0);
        let (view, rows) = rows(&mut h)?;
        assert_eq!(h.window.core.max_scroll(view), Point::new(0.0, 100.0));
        assert_eq!(h.window.core.locate(Point::new(10.0, 5.0)).map(|hit| hit.node), Some(rows[0]));
        // One notch is 40px.
        h.scroll(10.0, 5.0, 1.0)?;
        assert_eq!(h.window.core.node(view).map(|n| n.scroll().y), Some(40.0));
        assert_eq!(h.window.core.locate(Point::new(10.0, 5.0)).map(|hit| hit.node), Some(rows[2]));
        assert_eq!(h.window.core.to_local(rows[2], Point::new(10.0, 5.0)), Point::new(10.0, 5.0));
        // Clamped at the end, then the event bubbles.
        h.scroll(10.0, 5.0, 5.0)?;
        assert_eq!(h.window.core.node(view).map(|n| n.scroll().y), Some(100.0));
        assert_eq!(h.scroll(10.0, 5.0, 1.0)?, EventOutcome::Ignore);
        Ok(())
    }

    #[test]
    fn thumb_drag_scrolls_proportionally() -> Result<()> {
        let mut h = Harness::new(100.0, 100.0);
        let (view, _) = rows(&mut h)?;
        // 100px view over 200px content: a 50px thumb with 50px of travel for 100px of scroll.
        h.press(96.0, 10.0)?;
        h.move_to(96.0, 35.0)?;
        assert_eq!(h.window.core.node(view).map(|n| n.scroll().y), Some(50.0));
        h.move_to(0.0, 500.0)?;
        assert_eq!(h.window.core.node(view).map(|n| n.scroll().y), Some(100.0));
        h.release(0.0, 500.0)?;
        assert_eq!(h.window.core.pointer_capture(), None);
        Ok(())
    }

    #[test]
    fn content_draws_shifted_and_clipped() -> Result<()> {
        let mut h = Harness::new(100.0, 100.0);
        let (view, _) = rows(&mut h)?;
        h.window.core.scroll_to(view, Point::new(0.0, 30.0));
        h.frame()?;
        let rects = h.canvas.rects();
        // The first row's outline lands 30px above the viewport.
        assert!(rects.contains(&Rect::new(0.0, -30.0, 92.0, 20.0)));
        assert!(h.canvas.ops().iter().all(|op| match op {
            DrawOp::Rect { clip, .. } => clip.is_some(),
            _ => true,
        }));
        Ok(())
    }
}
