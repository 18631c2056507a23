//! Push button.

use super::palette;
use crate::{
    Context,
    core::{
        context::{DrawContext, LayoutContext, ViewContext},
        render::{Canvas, Color, Font, Paint},
        visual_state::{Setter, VisualState, VisualStateTable},
    },
    error::Result,
    event::{Event, KeyCode},
    geom::{Point, Size, Thickness},
    layout::Layout,
    widget::{EventOutcome, Widget},
};

/// Space between the button's edge and its label.
const PADDING: Thickness = Thickness::symmetric(8.0, 4.0);
/// Corner radius.
const RADIUS: f32 = 3.0;

/// Colors a button is drawn with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonStyle {
    /// Background.
    pub fill: Color,
    /// Outline.
    pub border: Color,
    /// Label color.
    pub text: Color,
}

impl Default for ButtonStyle {
    fn default() -> Self {
        Self {
            fill: palette::SURFACE,
            border: palette::BORDER,
            text: palette::TEXT,
        }
    }
}

/// A typed assignment on a [`ButtonStyle`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ButtonSetter {
    /// Set the background.
    Fill(Color),
    /// Set the outline.
    Border(Color),
    /// Set the label color.
    Text(Color),
}

impl Setter<ButtonStyle> for ButtonSetter {
    fn apply(&self, target: &mut ButtonStyle) {
        match *self {
            Self::Fill(c) => target.fill = c,
            Self::Border(c) => target.border = c,
            Self::Text(c) => target.text = c,
        }
    }
}

/// The state table buttons use unless told otherwise.
pub fn default_states() -> VisualStateTable<ButtonStyle, ButtonSetter> {
    VisualStateTable::new()
        .with(VisualState::PointerOver, vec![ButtonSetter::Fill(palette::SURFACE_HOVER)])
        .with(VisualState::Pressed, vec![
            ButtonSetter::Fill(palette::SURFACE_PRESSED),
            ButtonSetter::Border(palette::ACCENT),
        ])
        .with(VisualState::Focused, vec![ButtonSetter::Border(palette::ACCENT)])
        .with(VisualState::Disabled, vec![ButtonSetter::Text(palette::TEXT_DISABLED)])
}

/// Click callback.
type ClickHandler = Box<dyn FnMut(&mut dyn Context) + Send>;

/// A push button.
///
/// A click is a press and release both inside the button. The button captures the pointer on
/// press, so dragging out and releasing elsewhere cancels. Enter and Space click a focused
/// button.
pub struct Button {
    /// Label text.
    label: String,
    /// Label font.
    font: Font,
    /// Base style.
    style: ButtonStyle,
    /// Styling per visual state.
    states: VisualStateTable<ButtonStyle, ButtonSetter>,
    /// Current visual state.
    state: VisualState,
    /// Number of clicks so far.
    clicks: usize,
    /// Click callback.
    on_click: Option<ClickHandler>,
}

impl Button {
    /// A button with a label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            font: Font::default(),
            style: ButtonStyle::default(),
            states: default_states(),
            state: VisualState::Normal,
            clicks: 0,
            on_click: None,
        }
    }

    /// Run a callback on every click.
    pub fn with_on_click(mut self, f: impl FnMut(&mut dyn Context) + Send + 'static) -> Self {
        self.on_click = Some(Box::new(f));
        self
    }

    /// Replace the base style.
    pub fn with_style(mut self, style: ButtonStyle) -> Self {
        self.style = style;
        self
    }

    /// Replace the visual state table.
    pub fn with_states(mut self, states: VisualStateTable<ButtonStyle, ButtonSetter>) -> Self {
        self.states = states;
        self
    }

    /// Label text.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of clicks so far.
    pub fn clicks(&self) -> usize {
        self.clicks
    }

    /// The style for the current visual state.
    pub fn current_style(&self) -> ButtonStyle {
        self.states.resolve(&self.style, self.state)
    }

    /// Click the button.
    pub fn click(&mut self, ctx: &mut dyn Context) {
        self.clicks += 1;
        if let Some(f) = self.on_click.as_mut() {
            f(ctx);
        }
        ctx.invalidate();
    }
}

impl Widget for Button {
    fn layout(&self) -> Layout {
        Layout::new().padding(PADDING)
    }

    fn measure(&mut self, ctx: &mut LayoutContext<'_>, _available: Size) -> Size {
        ctx.text().measure(&self.label, &self.font)
    }

    fn draw(&mut self, canvas: &mut dyn Canvas, ctx: &DrawContext<'_>) -> Result<()> {
        let style = self.current_style();
        let r = ctx.size().rect();
        canvas.draw_round_rect(r, RADIUS, &Paint::fill(style.fill));
        canvas.draw_round_rect(r, RADIUS, &Paint::stroke(style.border, 1.0));
        let text = ctx.text().measure(&self.label, &self.font);
        let origin = Point::new(
            ((r.w - text.w) / 2.0).max(PADDING.left),
            ((r.h - text.h) / 2.0).max(0.0),
        );
        canvas.draw_text(&self.label, origin, &self.font, &Paint::fill(style.text));
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
                    self.click(ctx);
                }
                Ok(EventOutcome::Handle)
            }
            Event::KeyDown(k) if *k == KeyCode::Enter || *k == ' ' => {
                self.click(ctx);
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
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;
    use crate::{FocusManager, layout::Align, testing::Harness};

    #[test]
    fn click_requires_release_inside() -> Result<()> {
        let mut h = Harness::new(200.0, 100.0);
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let b = h.add(Button::new("ok").with_on_click(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }))?;
        let layout = Layout::new()
            .padding(PADDING)
            .size(60.0, 20.0)
            .align(Align::Start, Align::Start);
        h.window.core.set_layout_of(b, layout)?;
        h.frame()?;
        h.click(10.0, 10.0)?;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(h.window.core.is_focused(b));
        // Dragging off before release cancels.
        h.press(10.0, 10.0)?;
        h.move_to(150.0, 80.0)?;
        h.release(150.0, 80.0)?;
        assert_eq!(h.window.core.widget::<Button>(b)?.clicks(), 1);
        assert_eq!(h.window.core.pointer_capture(), None);
        Ok(())
    }

    #[test]
    fn keys_click_and_states_restyle() -> Result<()> {
        let mut h = Harness::new(200.0, 100.0);
        let b = h.add(Button::new("go"))?;
        h.frame()?;
        h.window.core.set_focus(b)?;
        h.key(KeyCode::Enter)?;
        h.key(' ')?;
        let button = h.window.core.widget::<Button>(b)?;
        assert_eq!(button.clicks(), 2);
        assert_eq!(button.current_style().border, palette::ACCENT);
        h.press(5.0, 5.0)?;
        assert_eq!(
            h.window.core.widget::<Button>(b)?.current_style().fill,
            palette::SURFACE_PRESSED
        );
        h.release(5.0, 5.0)?;
        h.window.core.set_enabled(b, false)?;
        assert_eq!(
            h.window.core.widget::<Button>(b)?.current_style().text,
            palette::TEXT_DISABLED
        );
        Ok(())
    }
}
