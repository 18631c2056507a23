use super::canvas::RecordingCanvas;
use crate::{
    NodeId,
    core::{config::Config, window::{FrameReport, Window}},
    error::Result,
    event::{InputEvent, Key, Mods},
    geom::{Point, Size},
    widget::{EventOutcome, Widget},
};

/// A window, a recording canvas and convenience drivers for both.
///
/// Tests build a tree under [`Harness::root`], call [`Harness::frame`], then drive input
/// with screen coordinates and inspect `canvas` or the core.
pub struct Harness {
    /// Window under test.
    pub window: Window,
    /// Canvas receiving every frame.
    pub canvas: RecordingCanvas,
}

/// Builder for a [`Harness`].
pub struct HarnessBuilder {
    /// Window size.
    size: Size,
    /// Window configuration.
    config: Config,
}

impl HarnessBuilder {
    /// Set the window size.
    pub fn size(mut self, w: f32, h: f32) -> Self {
        self.size = Size::new(w, h);
        self
    }

    /// Set the window configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Build the harness.
    pub fn build(self) -> Harness {
        let mut window = Window::with_config(self.config);
        window.core.set_viewport(self.size);
        Harness {
            window,
            canvas: RecordingCanvas::new(),
        }
    }
}

impl Harness {
    /// A builder with a 200x100 window and default configuration.
    pub fn builder() -> HarnessBuilder {
        HarnessBuilder {
            size: Size::new(200.0, 100.0),
            config: Config::default(),
        }
    }

    /// A harness with a given window size.
    pub fn new(w: f32, h: f32) -> Self {
        Self::builder().size(w, h).build()
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        self.window.core.root()
    }

    /// Append a widget under the root.
    pub fn add<W: Widget + 'static>(&mut self, widget: W) -> Result<NodeId> {
        let root = self.root();
        self.window.core.add_child(root, widget)
    }

    /// Append a widget under a parent.
    pub fn add_to<W: Widget + 'static>(&mut self, parent: NodeId, widget: W) -> Result<NodeId> {
        self.window.core.add_child(parent, widget)
    }

    /// Clear the canvas and run one frame.
    pub fn frame(&mut self) -> Result<FrameReport> {
        self.canvas.clear();
        self.window.frame(&mut self.canvas)
    }

    /// Send a raw input event.
    pub fn send(&mut self, input: InputEvent) -> Result<EventOutcome> {
        self.window.handle(input)
    }

    /// Press the primary button.
    pub fn press(&mut self, x: f32, y: f32) -> Result<EventOutcome> {
        self.send(InputEvent::press(x, y))
    }

    /// Release the primary button.
    pub fn release(&mut self, x: f32, y: f32) -> Result<EventOutcome> {
        self.send(InputEvent::release(x, y))
    }

    /// Press and release the primary button at one point.
    pub fn click(&mut self, x: f32, y: f32) -> Result<EventOutcome> {
        self.press(x, y)?;
        self.release(x, y)
    }

    /// Move the pointer.
    pub fn move_to(&mut self, x: f32, y: f32) -> Result<EventOutcome> {
        self.send(InputEvent::moved(x, y))
    }

    /// Press a key.
    pub fn key(&mut self, key: impl Into<Key>) -> Result<EventOutcome> {
        self.send(InputEvent::key(key))
    }

    /// Press a key with modifiers.
    pub fn chord(&mut self, mods: Mods, key: impl Into<Key>) -> Result<EventOutcome> {
        let key = key.into();
        self.send(InputEvent::KeyDown(Key::new(mods + key.mods, key.key)))
    }

    /// Type committed text.
    pub fn text(&mut self, text: &str) -> Result<EventOutcome> {
        self.send(InputEvent::Text(text.to_string()))
    }

    /// Scroll vertically by notches at a point.
    pub fn scroll(&mut self, x: f32, y: f32, dy: f32) -> Result<EventOutcome> {
        self.send(InputEvent::scroll(x, y, dy))
    }

    /// Resize the window.
    pub fn resize(&mut self, w: f32, h: f32) -> Result<EventOutcome> {
        self.send(InputEvent::Resize(Size::new(w, h)))
    }

    /// Text whose origin is exactly `p` in the last frame.
    pub fn text_at(&self, p: Point) -> Option<&str> {
        self.canvas.ops().iter().find_map(|op| match op {
            super::DrawOp::Text { text, origin, .. } if *origin == p => Some(text.as_str()),
            _ => None,
        })
    }
}
