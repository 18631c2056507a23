use std::{
    mem,
    sync::{Arc, Mutex, PoisonError},
};

use crate::{
    Context,
    core::{
        context::{DrawContext, LayoutContext, ViewContext},
        render::{Canvas, Color, Font, Paint},
        visual_state::VisualState,
    },
    error::Result,
    event::Event,
    geom::{Point, Size, Thickness},
    layout::{Align, Layout},
    name::NodeName,
    widget::{EventOutcome, Widget},
};

/// A shared transcript of `label:event` lines.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    /// An empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line.
    pub fn push(&self, line: impl Into<String>) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.into());
    }

    /// Copy of every line so far.
    pub fn lines(&self) -> Vec<String> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Remove and return every line so far.
    pub fn take(&self) -> Vec<String> {
        mem::take(&mut *self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// A leaf widget with a fixed natural size.
///
/// Records every event it receives into an optional [`EventLog`] and answers pointer and key
/// events with a configurable outcome, so tests can observe routing and bubbling.
pub struct Fixed {
    /// Natural content size.
    size: Size,
    /// Initial layout.
    layout: Layout,
    /// Accepts focus.
    focusable: bool,
    /// Name used in logs.
    label: Option<String>,
    /// Event transcript.
    log: Option<EventLog>,
    /// Outcome for pointer, scroll, key and text events.
    outcome: EventOutcome,
    /// Capture the pointer on press.
    capture: bool,
    /// Visual state most recently pushed by the core.
    state: VisualState,
    /// Position of the last pointer event, in the space it was delivered in.
    last_position: Option<Point>,
}

impl Fixed {
    /// A widget with a natural content size.
    pub fn new(w: f32, h: f32) -> Self {
        Self {
            size: Size::new(w, h),
            layout: Layout::default(),
            focusable: false,
            label: None,
            log: None,
            outcome: EventOutcome::Ignore,
            capture: false,
            state: VisualState::Normal,
            last_position: None,
        }
    }

    /// Accept focus.
    pub fn focusable(mut self) -> Self {
        self.focusable = true;
        self
    }

    /// Pin the widget at a local offset inside its slot, at its natural size.
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.layout = self
            .layout
            .margin(Thickness::new(x, y, 0.0, 0.0))
            .align(Align::Start, Align::Start);
        self
    }

    /// Replace the initial layout.
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Name the widget and log its events.
    pub fn logged(mut self, label: &str, log: &EventLog) -> Self {
        self.label = Some(label.to_string());
        self.log = Some(log.clone());
        self
    }

    /// Outcome returned for input events.
    pub fn answer(mut self, outcome: EventOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    /// Capture the pointer on press.
    pub fn capturing(mut self) -> Self {
        self.capture = true;
        self
    }

    /// Natural content size.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Change the natural content size. The caller invalidates.
    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// Visual state most recently pushed by the core.
    pub fn state(&self) -> VisualState {
        self.state
    }

    /// Position of the last pointer event received.
    pub fn last_position(&self) -> Option<Point> {
        self.last_position
    }
}

impl Widget for Fixed {
    fn layout(&self) -> Layout {
        self.layout
    }

    fn measure(&mut self, ctx: &mut LayoutContext<'_>, available: Size) -> Size {
        self.size.max(ctx.measure_overlay(available))
    }

    fn draw(&mut self, canvas: &mut dyn Canvas, ctx: &DrawContext<'_>) -> Result<()> {
        canvas.draw_rect(ctx.size().rect(), &Paint::stroke(Color::BLACK, 1.0));
        if let Some(label) = &self.label {
            canvas.draw_text(label, Point::zero(), &Font::default(), &Paint::fill(Color::BLACK));
        }
        Ok(())
    }

    fn on_event(&mut self, event: &Event, ctx: &mut dyn Context) -> Result<EventOutcome> {
        if let (Some(log), Some(label)) = (&self.log, &self.label) {
            log.push(format!("{label}:{}", event.kind()));
        }
        match event {
            Event::Pointer(p) => {
                self.last_position = Some(p.position);
                if self.capture && event.is_press() {
                    ctx.capture_pointer();
                }
                Ok(self.outcome)
            }
            Event::Scroll(_) | Event::KeyDown(_) | Event::KeyUp(_) | Event::Text(_) => {
                Ok(self.outcome)
            }
            _ => Ok(EventOutcome::Ignore),
        }
    }

    fn accept_focus(&self) -> bool {
        self.focusable
    }

    fn on_visual_state(&mut self, state: VisualState) -> bool {
        self.state = state;
        true
    }

    fn name(&self) -> NodeName {
        self.label
            .as_deref()
            .map_or_else(NodeName::of::<Self>, NodeName::convert)
    }
}
