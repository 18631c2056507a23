//! Single-line text entry.

use unicode_segmentation::UnicodeSegmentation;

use super::{line_height, palette, text_color};
use crate::{
    Context, Core, NodeId,
    core::{
        context::{DrawContext, LayoutContext, ViewContext},
        property::{Affects, Observable, Property, PropertyInfo},
        render::{Canvas, Font, Paint, TextMeasurer},
    },
    error::Result,
    event::{Event, Key, KeyCode},
    geom::{Point, Rect, Size, Thickness},
    layout::Layout,
    widget::{EventOutcome, Widget},
};

/// Inner padding.
const PADDING: Thickness = Thickness::symmetric(4.0, 3.0);

/// A single-line text editor.
///
/// The cursor is a grapheme index, so combined characters and emoji sequences move and delete
/// as one unit. Ctrl+C, Ctrl+X and Ctrl+V copy, cut and paste the whole text through the
/// window clipboard.
pub struct Entry {
    /// Current text.
    text: Observable<String>,
    /// Cursor position in graphemes.
    cursor: usize,
    /// Text shown while empty.
    placeholder: String,
    /// Natural width in "0" characters.
    width_chars: usize,
    /// Font.
    font: Font,
}

/// Accessor for [`Entry::TEXT`].
fn text_cell(e: &mut Entry) -> &mut Observable<String> {
    &mut e.text
}

/// Published properties.
const PROPERTIES: &[PropertyInfo] = &[Entry::TEXT.info];

impl Entry {
    /// Current text.
    pub const TEXT: Property<Self, String> = Property::new("text", Affects::Draw, text_cell);

    /// An empty entry.
    pub fn new() -> Self {
        Self {
            text: Observable::new(String::new()),
            cursor: 0,
            placeholder: String::new(),
            width_chars: 16,
            font: Font::default(),
        }
    }

    /// Start with text, cursor at the end.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text.set(text.into());
        self.cursor = self.len();
        self
    }

    /// Show a hint while empty.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Natural width in characters.
    pub fn with_width_chars(mut self, chars: usize) -> Self {
        self.width_chars = chars.max(1);
        self
    }

    /// Current text.
    pub fn text(&self) -> &str {
        self.text.get()
    }

    /// Read the text of an entry node.
    pub fn text_of(core: &mut Core, entry: NodeId) -> Result<String> {
        core.get_property(entry, &Self::TEXT)
    }

    /// Cursor position in graphemes.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Length in graphemes.
    pub fn len(&self) -> usize {
        self.text.get().graphemes(true).count()
    }

    /// Is the text empty?
    pub fn is_empty(&self) -> bool {
        self.text.get().is_empty()
    }

    /// Byte offset of a grapheme index.
    fn byte_offset(&self, index: usize) -> usize {
        let text = self.text.get();
        text.grapheme_indices(true)
            .nth(index)
            .map_or(text.len(), |(i, _)| i)
    }

    /// Insert text at the cursor.
    pub fn insert(&mut self, s: &str) {
        let at = self.byte_offset(self.cursor);
        let added = s.graphemes(true).count();
        self.text.update(|t| t.insert_str(at, s));
        // Insertion can merge with a neighbouring grapheme, so re-clamp.
        self.cursor = (self.cursor + added).min(self.len());
    }

    /// Delete the grapheme before the cursor.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let (start, end) = (self.byte_offset(self.cursor - 1), self.byte_offset(self.cursor));
        self.text.update(|t| t.replace_range(start..end, ""));
        self.cursor -= 1;
        true
    }

    /// Delete the grapheme after the cursor.
    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.len() {
            return false;
        }
        let (start, end) = (self.byte_offset(self.cursor), self.byte_offset(self.cursor + 1));
        self.text.update(|t| t.replace_range(start..end, ""));
        true
    }

    /// Move the cursor to a grapheme index, clamped to the text.
    pub fn set_cursor(&mut self, index: usize) {
        self.cursor = index.min(self.len());
    }

    /// Replace the whole text, cursor at the end.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text.set(text.into());
        self.cursor = self.len();
    }

    /// Grapheme index nearest to a local x coordinate.
    fn index_at(&self, text: &dyn TextMeasurer, x: f32) -> usize {
        let x = x - PADDING.left;
        let mut prev = 0.0;
        let s = self.text.get();
        for (i, (offset, g)) in s.grapheme_indices(true).enumerate() {
            let next = text.measure(&s[..offset + g.len()], &self.font).w;
            if x < (prev + next) / 2.0 {
                return i;
            }
            prev = next;
        }
        self.len()
    }

    /// Apply a key. Returns true if anything changed.
    fn key(&mut self, k: &Key, ctx: &mut dyn Context) -> Option<bool> {
        let chord = k.mods.chord();
        if chord.ctrl && !chord.alt {
            return match k.key {
                KeyCode::Char('c') => {
                    ctx.set_clipboard(self.text.get().clone());
                    Some(false)
                }
                KeyCode::Char('x') => {
                    ctx.set_clipboard(self.text.get().clone());
                    self.set_text(String::new());
                    Some(true)
                }
                KeyCode::Char('v') => {
                    let paste: String = ctx.clipboard().lines().next().unwrap_or("").to_string();
                    self.insert(&paste);
                    Some(true)
                }
                _ => None,
            };
        }
        match k.key {
            KeyCode::Backspace => Some(self.backspace()),
            KeyCode::Delete => Some(self.delete()),
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                Some(true)
            }
            KeyCode::Right => {
                self.set_cursor(self.cursor + 1);
                Some(true)
            }
            KeyCode::Home => {
                self.cursor = 0;
                Some(true)
            }
            KeyCode::End => {
                self.cursor = self.len();
                Some(true)
            }
            _ => None,
        }
    }
}

impl Default for Entry {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for Entry {
    fn layout(&self) -> Layout {
        Layout::new().padding(PADDING).clip()
    }

    fn measure(&mut self, ctx: &mut LayoutContext<'_>, _available: Size) -> Size {
        let sample = "0".repeat(self.width_chars);
        let w = ctx.text().measure(&sample, &self.font).w;
        Size::new(w, line_height(ctx.text(), &self.font))
    }

    fn draw(&mut self, canvas: &mut dyn Canvas, ctx: &DrawContext<'_>) -> Result<()> {
        let r = ctx.size().rect();
        let focused = ctx.is_focused();
        canvas.draw_rect(r, &Paint::fill(palette::PANEL));
        let border = if focused { palette::ACCENT } else { palette::BORDER };
        canvas.draw_rect(r, &Paint::stroke(border, 1.0));
        let origin = Point::new(PADDING.left, PADDING.top);
        if self.is_empty() && !self.placeholder.is_empty() {
            canvas.draw_text(
                &self.placeholder,
                origin,
                &self.font,
                &Paint::fill(palette::TEXT_DISABLED),
            );
        } else {
            canvas.draw_text(
                self.text.get(),
                origin,
                &self.font,
                &Paint::fill(text_color(ctx.is_enabled())),
            );
        }
        if focused {
            let prefix = &self.text.get()[..self.byte_offset(self.cursor)];
            let x = PADDING.left + ctx.text().measure(prefix, &self.font).w;
            let h = line_height(ctx.text(), &self.font);
            canvas.draw_rect(Rect::new(x, PADDING.top, 1.0, h), &Paint::fill(palette::TEXT));
        }
        Ok(())
    }

    fn on_event(&mut self, event: &Event, ctx: &mut dyn Context) -> Result<EventOutcome> {
        match event {
            Event::Pointer(p) if event.is_press() => {
                let index = self.index_at(ctx.text(), p.position.x);
                self.set_cursor(index);
                ctx.invalidate();
                Ok(EventOutcome::Handle)
            }
            Event::Text(s) => {
                let line: String = s.chars().filter(|c| !c.is_control()).collect();
                if line.is_empty() {
                    return Ok(EventOutcome::Ignore);
                }
                self.insert(&line);
                ctx.invalidate();
                Ok(EventOutcome::Handle)
            }
            Event::KeyDown(k) => Ok(match self.key(k, ctx) {
                Some(true) => {
                    ctx.invalidate();
                    EventOutcome::Handle
                }
                Some(false) => EventOutcome::Consume,
                None => EventOutcome::Ignore,
            }),
            Event::FocusGained | Event::FocusLost => {
                ctx.invalidate();
                Ok(EventOutcome::Handle)
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
