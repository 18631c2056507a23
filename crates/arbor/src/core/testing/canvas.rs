use crate::{
    core::render::{Canvas, Font, Paint},
    geom::{Point, Rect},
};

/// One recorded draw call, in window coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// A filled or stroked rectangle.
    Rect {
        /// Rectangle.
        rect: Rect,
        /// Paint used.
        paint: Paint,
        /// Active clip.
        clip: Option<Rect>,
    },
    /// A rounded rectangle.
    RoundRect {
        /// Rectangle.
        rect: Rect,
        /// Corner radius.
        radius: f32,
        /// Paint used.
        paint: Paint,
        /// Active clip.
        clip: Option<Rect>,
    },
    /// A circle.
    Circle {
        /// Center.
        center: Point,
        /// Radius.
        radius: f32,
        /// Paint used.
        paint: Paint,
        /// Active clip.
        clip: Option<Rect>,
    },
    /// A run of text.
    Text {
        /// Text drawn.
        text: String,
        /// Top-left of the text box.
        origin: Point,
        /// Font size.
        size: f32,
        /// Paint used.
        paint: Paint,
        /// Active clip.
        clip: Option<Rect>,
    },
}

/// Saved canvas state.
#[derive(Debug, Clone, Copy, Default)]
struct State {
    /// Accumulated translation.
    offset: Point,
    /// Active clip in window coordinates.
    clip: Option<Rect>,
}

/// A [`Canvas`] that records operations with every transform already applied.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    /// Recorded operations in call order.
    ops: Vec<DrawOp>,
    /// Current state.
    state: State,
    /// Saved states.
    stack: Vec<State>,
}

impl RecordingCanvas {
    /// An empty canvas.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded operations.
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Forget recorded operations.
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// Every text run, in draw order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Window position of the first text run equal to `needle`.
    pub fn find_text(&self, needle: &str) -> Option<Point> {
        self.ops.iter().find_map(|op| match op {
            DrawOp::Text { text, origin, .. } if text == needle => Some(*origin),
            _ => None,
        })
    }

    /// Every plain rectangle, in draw order.
    pub fn rects(&self) -> Vec<Rect> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Rect { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect()
    }

    /// Is the save/restore stack balanced?
    pub fn is_balanced(&self) -> bool {
        self.stack.is_empty()
    }

    /// Map a local rectangle to window coordinates.
    fn abs(&self, r: Rect) -> Rect {
        r.translate(self.state.offset)
    }
}

impl Canvas for RecordingCanvas {
    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(s) = self.stack.pop() {
            self.state = s;
        }
    }

    fn translate(&mut self, by: Point) {
        self.state.offset = self.state.offset + by;
    }

    fn clip_rect(&mut self, rect: Rect) {
        let rect = self.abs(rect);
        self.state.clip = Some(match self.state.clip {
            Some(c) => c
                .intersect(&rect)
                .unwrap_or_else(|| Rect::new(rect.x, rect.y, 0.0, 0.0)),
            None => rect,
        });
    }

    fn draw_rect(&mut self, rect: Rect, paint: &Paint) {
        self.ops.push(DrawOp::Rect {
            rect: self.abs(rect),
            paint: *paint,
            clip: self.state.clip,
        });
    }

    fn draw_round_rect(&mut self, rect: Rect, radius: f32, paint: &Paint) {
        self.ops.push(DrawOp::RoundRect {
            rect: self.abs(rect),
            radius,
            paint: *paint,
            clip: self.state.clip,
        });
    }

    fn draw_circle(&mut self, center: Point, radius: f32, paint: &Paint) {
        self.ops.push(DrawOp::Circle {
            center: center + self.state.offset,
            radius,
            paint: *paint,
            clip: self.state.clip,
        });
    }

    fn draw_text(&mut self, text: &str, origin: Point, font: &Font, paint: &Paint) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            origin: origin + self.state.offset,
            size: font.size,
            paint: *paint,
            clip: self.state.clip,
        });
    }
}
