use super::palette;
use crate::{
    Context, Core, NodeId,
    core::{
        context::{DrawContext, LayoutContext, ViewContext},
        property::{Affects, Observable, Property, PropertyInfo},
        render::{Canvas, Paint},
    },
    error::Result,
    event::{Event, KeyCode, PointerAction},
    geom::{Point, Rect, Size},
    widget::{EventOutcome, Widget},
};

/// Thumb radius. The track is inset by this much on both ends.
const THUMB: f32 = 8.0;
/// Natural track length.
const LENGTH: f32 = 120.0;

/// A horizontal slider over `min..=max`.
///
/// Pressing on the track jumps the thumb there and captures the pointer, so dragging keeps
/// working outside the slider's bounds. Arrow keys move by `step`, Home and End jump to the
/// ends.
pub struct Slider {
    /// Lower bound.
    min: f32,
    /// Upper bound.
    max: f32,
    /// Keyboard increment and snap interval. Zero disables snapping.
    step: f32,
    /// Current value.
    value: Observable<f32>,
}

/// Accessor for [`Slider::VALUE`].
fn value_cell(s: &mut Slider) -> &mut Observable<f32> {
    &mut s.value
}

/// Published properties.
const PROPERTIES: &[PropertyInfo] = &[Slider::VALUE.info];

impl Slider {
    /// Current value.
    pub const VALUE: Property<Self, f32> = Property::new("value", Affects::Draw, value_cell);

    /// A slider over a range, starting at `min`. Reversed bounds are swapped.
    pub fn new(min: f32, max: f32) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            min,
            max,
            step: (max - min) / 10.0,
            value: Observable::new(min),
        }
    }

    /// Set the keyboard increment and snap interval.
    pub fn with_step(mut self, step: f32) -> Self {
        self.step = if step.is_finite() { step.max(0.0) } else { 0.0 };
        self
    }

    /// Set the initial value.
    pub fn with_value(mut self, value: f32) -> Self {
        self.set_value(value);
        self
    }

    /// Current value.
    pub fn value(&self) -> f32 {
        *self.value.get()
    }

    /// Read the value of a slider node.
    pub fn value_of(core: &mut Core, slider: NodeId) -> Result<f32> {
        core.get_property(slider, &Self::VALUE)
    }

    /// Set the value, snapped and clamped. NaN is ignored. Returns true if it changed.
    pub fn set_value(&mut self, value: f32) -> bool {
        if value.is_nan() {
            return false;
        }
        let mut v = value.clamp(self.min, self.max);
        if self.step > 0.0 {
            let steps = ((v - self.min) / self.step).round();
            v = (self.min + steps * self.step).clamp(self.min, self.max);
        }
        self.value.set(v)
    }

    /// Value under a local x coordinate for a slider of `width`.
    fn value_at(&self, x: f32, width: f32) -> f32 {
        let usable = (width - 2.0 * THUMB).max(1.0);
        let frac = ((x - THUMB) / usable).clamp(0.0, 1.0);
        self.min + frac * (self.max - self.min)
    }

    /// Thumb center for a slider of `size`.
    fn thumb_center(&self, size: Size) -> Point {
        let span = self.max - self.min;
        let frac = if span > 0.0 { (self.value() - self.min) / span } else { 0.0 };
        Point::new(THUMB + frac * (size.w - 2.0 * THUMB).max(0.0), size.h / 2.0)
    }
}

impl Widget for Slider {
    fn measure(&mut self, _ctx: &mut LayoutContext<'_>, available: Size) -> Size {
        let w = if available.w.is_finite() {
            available.w.min(LENGTH)
        } else {
            LENGTH
        };
        Size::new(w, THUMB * 2.0)
    }

    fn draw(&mut self, canvas: &mut dyn Canvas, ctx: &DrawContext<'_>) -> Result<()> {
        let size = ctx.size();
        let track = Rect::new(THUMB, size.h / 2.0 - 1.0, (size.w - 2.0 * THUMB).max(0.0), 2.0);
        canvas.draw_rect(track, &Paint::fill(palette::BORDER));
        let color = if ctx.is_enabled() {
            palette::ACCENT
        } else {
            palette::TEXT_DISABLED
        };
        canvas.draw_circle(self.thumb_center(size), THUMB, &Paint::fill(color));
        if ctx.is_focused() {
            canvas.draw_circle(self.thumb_center(size), THUMB + 2.0, &Paint::stroke(color, 1.0));
        }
        Ok(())
    }

    fn on_event(&mut self, event: &Event, ctx: &mut dyn Context) -> Result<EventOutcome> {
        let width = ctx.size().w;
        match event {
            Event::Pointer(p) if event.is_press() => {
                ctx.capture_pointer();
                if self.set_value(self.value_at(p.position.x, width)) {
                    ctx.invalidate();
                }
                Ok(EventOutcome::Handle)
            }
            Event::Pointer(p) if p.action == PointerAction::Moved && ctx.has_pointer_capture() => {
                if self.set_value(self.value_at(p.position.x, width)) {
                    ctx.invalidate();
                }
                Ok(EventOutcome::Handle)
            }
            Event::Pointer(_) if event.is_release() => Ok(EventOutcome::Handle),
            Event::KeyDown(k) => {
                let step = if self.step > 0.0 {
                    self.step
                } else {
                    (self.max - self.min) / 10.0
                };
                let target = if *k == KeyCode::Left || *k == KeyCode::Down {
                    self.value() - step
                } else if *k == KeyCode::Right || *k == KeyCode::Up {
                    self.value() + step
                } else if *k == KeyCode::Home {
                    self.min
                } else if *k == KeyCode::End {
                    self.max
                } else {
                    return Ok(EventOutcome::Ignore);
                };
                if self.set_value(target) {
                    ctx.invalidate();
                    Ok(EventOutcome::Handle)
                } else {
                    Ok(EventOutcome::Consume)
                }
            }
            _ => Ok(EventOutcome::Ignore),
        }
    }

    fn accept_focus(&self) -> bool {
        true
    }

    fn properties(&self) -> &'static [PropertyInfo] {
        PROPERTIES
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geom::Thickness,
        layout::{Align, Layout},
        testing::Harness,
    };

    #[test]
    fn values_snap_and_clamp() {
        let mut s = Slider::new(10.0, 0.0).with_step(2.5);
        assert!(s.set_value(3.9));
        assert_eq!(s.value(), 5.0);
        s.set_value(99.0);
        assert_eq!(s.value(), 10.0);
        assert!(!s.set_value(f32::NAN));
        assert_eq!(s.value(), 10.0);
    }

    #[test]
    fn drag_continues_outside_bounds() -> Result<()> {
        let mut h = Harness::new(300.0, 100.0);
        let layout = Layout::new()
            .margin(Thickness::new(50.0, 10.0, 0.0, 0.0))
            .width(116.0)
            .align(Align::Start, Align::Start);
        let slider = h.add(Slider::new(0.0, 100.0).with_step(0.0))?;
        h.window.core.set_layout_of(slider, layout)?;
        h.frame()?;
        // Track runs from x = 58 to 158 in window space.
        h.press(108.0, 18.0)?;
        assert_eq!(Slider::value_of(&mut h.window.core, slider)?, 50.0);
        h.move_to(133.0, 90.0)?;
        assert_eq!(Slider::value_of(&mut h.window.core, slider)?, 75.0);
        h.move_to(290.0, 90.0)?;
        assert_eq!(Slider::value_of(&mut h.window.core, slider)?, 100.0);
        h.release(290.0, 90.0)?;
        h.move_to(60.0, 18.0)?;
        assert_eq!(Slider::value_of(&mut h.window.core, slider)?, 100.0);
        Ok(())
    }

    #[test]
    fn keys_step() -> Result<()> {
        let mut h = Harness::new(300.0, 100.0);
        let slider = h.add(Slider::new(0.0, 1.0).with_step(0.25))?;
        h.frame()?;
        h.click(150.0, 8.0)?;
        h.key(KeyCode::Right)?;
        h.key(KeyCode::Right)?;
        assert_eq!(Slider::value_of(&mut h.window.core, slider)?, 1.0);
        h.key(KeyCode::Home)?;
        assert_eq!(Slider::value_of(&mut h.window.core, slider)?, 0.0);
        Ok(())
    }
}
