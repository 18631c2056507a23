use super::{line_height, palette, text_color};
use crate::{
    Context, Core, NodeId,
    core::{
        context::{DrawContext, LayoutContext, ViewContext},
        property::{Affects, Observable, Property, PropertyInfo},
        render::{Canvas, Font, Paint},
        visual_state::VisualState,
    },
    error::Result,
    event::{Event, KeyCode},
    geom::{Point, Rect, Size},
    widget::{EventOutcome, Widget},
};

/// Side of the check box square.
const BOX: f32 = 14.0;
/// Gap between the square and the label.
const GAP: f32 = 6.0;

/// A two-state toggle with a text label. Clicking anywhere on it, or Space, toggles.
pub struct CheckBox {
    /// Label text.
    label: String,
    /// Label font.
    font: Font,
    /// Checked state.
    checked: Observable<bool>,
    /// Current visual state.
    state: VisualState,
}

/// Accessor for [`CheckBox::CHECKED`].
fn checked_cell(c: &mut CheckBox) -> &mut Observable<bool> {
    &mut c.checked
}

/// Published properties.
const PROPERTIES: &[PropertyInfo] = &[CheckBox::CHECKED.info];

impl CheckBox {
    /// Checked state.
    pub const CHECKED: Property<Self, bool> = Property::new("checked", Affects::Draw, checked_cell);

    /// An unchecked box.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            font: Font::default(),
            checked: Observable::new(false),
            state: VisualState::Normal,
        }
    }

    /// Start checked or unchecked.
    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked.set(checked);
        self
    }

    /// Is the box checked?
    pub fn is_checked(&self) -> bool {
        *self.checked.get()
    }

    /// Read the checked state of a check box node.
    pub fn checked(core: &mut Core, node: NodeId) -> Result<bool> {
        core.get_property(node, &Self::CHECKED)
    }

    /// Flip the state.
    fn toggle(&mut self, ctx: &mut dyn Context) {
        let next = !self.is_checked();
        self.checked.set(next);
        ctx.invalidate();
    }
}

impl Widget for CheckBox {
    fn measure(&mut self, ctx: &mut LayoutContext<'_>, _available: Size) -> Size {
        let text = ctx.text().measure(&self.label, &self.font);
        Size::new(BOX + GAP + text.w, text.h.max(BOX))
    }

    fn draw(&mut self, canvas: &mut dyn Canvas, ctx: &DrawContext<'_>) -> Result<()> {
        let h = ctx.size().h;
        let square = Rect::new(0.0, ((h - BOX) / 2.0).max(0.0), BOX, BOX);
        let border = match self.state {
            VisualState::Focused | VisualState::Pressed => palette::ACCENT,
            _ => palette::BORDER,
        };
        canvas.draw_rect(square, &Paint::fill(palette::PANEL));
        canvas.draw_rect(square, &Paint::stroke(border, 1.0));
        if self.is_checked() {
            let inner = Rect::new(square.x + 3.0, square.y + 3.0, BOX - 6.0, BOX - 6.0);
            canvas.draw_rect(inner, &Paint::fill(palette::ACCENT));
        }
        let text_y = ((h - line_height(ctx.text(), &self.font)) / 2.0).max(0.0);
        canvas.draw_text(
            &self.label,
            Point::new(BOX + GAP, text_y),
            &self.font,
            &Paint::fill(text_color(ctx.is_enabled())),
        );
        Ok(())
    }

    fn on_event(&mut self, event: &Event, ctx: &mut dyn Context) -> Result<EventOutcome> {
        match event {
            Event::Pointer(_) if event.is_press() => {
                ctx.capture_pointer();
                Ok(EventOutcome::Handle)
            }
            Event::Pointer(p) if event.is_release() => {
                if ctx.has_pointer_capture() && ctx.size().rect().contains_point(p.position) {
                    self.toggle(ctx);
                }
                Ok(EventOutcome::Handle)
            }
            Event::KeyDown(k) if *k == ' ' || *k == KeyCode::Enter => {
                self.toggle(ctx);
                Ok(EventOutcome::Handle)
            }
            _ => Ok(EventOutcome::Ignore),
        }
    }

    fn accept_focus(&self) -> bool {
        true
    }

    fn on_visual_state(&mut self, state: VisualState) -> bool {
        let changed = self.state != state;
        self.state = state;
        changed
    }

    fn properties(&self) -> &'static [PropertyInfo] {
        PROPERTIES
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::testing::Harness;

    #[test]
    fn click_and_space_toggle() -> Result<()> {
        let mut h = Harness::new(200.0, 40.0);
        let cb = h.add(CheckBox::new("remember me"))?;
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        h.window.core.subscribe(cb, &CheckBox::CHECKED, move |v| {
            s.lock().unwrap().push(*v);
        })?;
        h.frame()?;
        h.click(3.0, 3.0)?;
        assert!(CheckBox::checked(&mut h.window.core, cb)?);
        h.key(' ')?;
        assert!(!CheckBox::checked(&mut h.window.core, cb)?);
        assert_eq!(*seen.lock().unwrap(), vec![true, false]);
        Ok(())
    }
}
