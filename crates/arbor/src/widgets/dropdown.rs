//! Single selection from a popup list.

use super::{line_height, palette, text_color};
use crate::{
    Context, Core, NodeId,
    core::{
        context::{DrawContext, LayoutContext, ViewContext},
        popup::{Placement, PopupAnchor},
        property::{Affects, Observable, Property, PropertyInfo},
        render::{Canvas, Font, Paint, TextMeasurer},
    },
    error::Result,
    event::{Event, HitRegion, KeyCode, PointerAction},
    geom::{Point, Rect, Size, Thickness},
    layout::Layout,
    widget::{EventOutcome, Widget},
};

/// Inner padding of the closed box.
const PADDING: Thickness = Thickness::symmetric(6.0, 3.0);
/// Space reserved for the arrow.
const ARROW: f32 = 14.0;
/// Vertical padding of each list row.
const ROW_PAD: f32 = 2.0;

/// Selection callback.
type ChangeHandler = Box<dyn FnMut(usize, &mut dyn Context) + Send>;

/// A closed box showing the current choice that opens a list of choices below itself.
///
/// The list lives in a popup, so it may extend past the dropdown's parent. Clicking a row
/// selects it and closes the list; clicking elsewhere closes it without a change. With the
/// list closed, Up and Down change the selection directly.
pub struct Dropdown {
    /// Choices.
    items: Vec<String>,
    /// Selected index.
    selected: Observable<Option<usize>>,
    /// Row under the pointer or keyboard cursor while open.
    highlighted: usize,
    /// Popup placement and registration.
    anchor: PopupAnchor,
    /// Font.
    font: Font,
    /// Selection callback.
    on_change: Option<ChangeHandler>,
}

/// Accessor for [`Dropdown::SELECTED`].
fn selected_cell(d: &mut Dropdown) -> &mut Observable<Option<usize>> {
    &mut d.selected
}

/// Published properties.
const PROPERTIES: &[PropertyInfo] = &[Dropdown::SELECTED.info];

impl Dropdown {
    /// Selected index.
    pub const SELECTED: Property<Self, Option<usize>> =
        Property::new("selected", Affects::Draw, selected_cell);

    /// A dropdown over some choices, nothing selected.
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            selected: Observable::new(None),
            highlighted: 0,
            anchor: PopupAnchor::new(Placement::Below),
            font: Font::default(),
            on_change: None,
        }
    }

    /// Start with a selection. Out-of-range indices select nothing.
    pub fn with_selected(mut self, index: usize) -> Self {
        self.selected.set((index < self.items.len()).then_some(index));
        self
    }

    /// Prefer opening above.
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.anchor = PopupAnchor::new(placement);
        self
    }

    /// Run a callback whenever the user picks a different item.
    pub fn with_on_change(
        mut self,
        f: impl FnMut(usize, &mut dyn Context) + Send + 'static,
    ) -> Self {
        self.on_change = Some(Box::new(f));
        self
    }

    /// Choices.
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Selected index.
    pub fn selected(&self) -> Option<usize> {
        *self.selected.get()
    }

    /// Selected text.
    pub fn selected_text(&self) -> Option<&str> {
        self.selected().and_then(|i| self.items.get(i)).map(String::as_str)
    }

    /// Read the selection of a dropdown node.
    pub fn selected_of(core: &mut Core, node: NodeId) -> Result<Option<usize>> {
        core.get_property(node, &Self::SELECTED)
    }

    /// Height of one list row.
    fn row_height(&self, text: &dyn TextMeasurer) -> f32 {
        line_height(text, &self.font) + 2.0 * ROW_PAD
    }

    /// Row index under a popup-local y coordinate.
    fn row_at(&self, text: &dyn TextMeasurer, y: f32) -> Option<usize> {
        if y < 0.0 {
            return None;
        }
        let row = (y / self.row_height(text)) as usize;
        (row < self.items.len()).then_some(row)
    }

    /// Select an item, notifying the callback if it changed.
    fn select(&mut self, index: usize, ctx: &mut dyn Context) {
        if index >= self.items.len() || !self.selected.set(Some(index)) {
            return;
        }
        if let Some(f) = self.on_change.as_mut() {
            f(index, ctx);
        }
        ctx.invalidate();
    }

    /// Open the list with the selection highlighted.
    fn open(&mut self, ctx: &mut dyn Context) -> Result<()> {
        self.highlighted = self.selected().unwrap_or(0);
        let size = Size::new(
            ctx.size().w,
            self.row_height(ctx.text()) * self.items.len() as f32,
        );
        self.anchor.open(ctx, size)?;
        Ok(())
    }

    /// Keyboard handling while the list is open.
    fn key_open(&mut self, key: KeyCode, ctx: &mut dyn Context) -> EventOutcome {
        let last = self.items.len().saturating_sub(1);
        match key {
            KeyCode::Up => self.highlighted = self.highlighted.saturating_sub(1),
            KeyCode::Down => self.highlighted = (self.highlighted + 1).min(last),
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.select(self.highlighted, ctx);
                self.anchor.close(ctx);
            }
            KeyCode::Esc => {
                self.anchor.close(ctx);
            }
            _ => return EventOutcome::Ignore,
        }
        ctx.invalidate();
        EventOutcome::Handle
    }

    /// Keyboard handling while the list is closed.
    fn key_closed(&mut self, key: KeyCode, ctx: &mut dyn Context) -> Result<EventOutcome> {
        match key {
            KeyCode::Enter | KeyCode::Char(' ') if !self.items.is_empty() => self.open(ctx)?,
            KeyCode::Up => match self.selected() {
                Some(i) if i > 0 => self.select(i - 1, ctx),
                _ => return Ok(EventOutcome::Consume),
            },
            KeyCode::Down => {
                let next = self.selected().map_or(0, |i| i + 1);
                if next >= self.items.len() {
                    return Ok(EventOutcome::Consume);
                }
                self.select(next, ctx);
            }
            _ => return Ok(EventOutcome::Ignore),
        }
        Ok(EventOutcome::Handle)
    }
}

impl Widget for Dropdown {
    fn layout(&self) -> Layout {
        Layout::new().padding(PADDING)
    }

    fn measure(&mut self, ctx: &mut LayoutContext<'_>, _available: Size) -> Size {
        let text = ctx.text();
        let widest = self
            .items
            .iter()
            .map(|s| text.measure(s, &self.font).w)
            .fold(0.0, f32::max);
        Size::new(widest + ARROW, line_height(text, &self.font))
    }

    fn draw(&mut self, canvas: &mut dyn Canvas, ctx: &DrawContext<'_>) -> Result<()> {
        let r = ctx.size().rect();
        canvas.draw_rect(r, &Paint::fill(palette::PANEL));
        let border = if ctx.is_focused() { palette::ACCENT } else { palette::BORDER };
        canvas.draw_rect(r, &Paint::stroke(border, 1.0));
        let color = text_color(ctx.is_enabled());
        if let Some(text) = self.selected_text() {
            let origin = Point::new(PADDING.left, PADDING.top);
            canvas.draw_text(text, origin, &self.font, &Paint::fill(color));
        }
        let arrow = Point::new((r.w - PADDING.right - ARROW / 2.0).max(0.0), r.h / 2.0);
        canvas.draw_circle(arrow, 3.0, &Paint::fill(color));
        Ok(())
    }

    fn draw_popup(
        &mut self,
        canvas: &mut dyn Canvas,
        ctx: &DrawContext<'_>,
        size: Size,
    ) -> Result<()> {
        canvas.draw_rect(size.rect(), &Paint::fill(palette::PANEL));
        let row = self.row_height(ctx.text());
        for (i, item) in self.items.iter().enumerate() {
            let y = i as f32 * row;
            let paint = if i == self.highlighted {
                canvas.draw_rect(Rect::new(0.0, y, size.w, row), &Paint::fill(palette::ACCENT));
                Paint::fill(palette::PANEL)
            } else {
                Paint::fill(palette::TEXT)
            };
            canvas.draw_text(item, Point::new(PADDING.left, y + ROW_PAD), &self.font, &paint);
        }
        canvas.draw_rect(size.rect(), &Paint::stroke(palette::BORDER, 1.0));
        Ok(())
    }

    fn on_event(&mut self, event: &Event, ctx: &mut dyn Context) -> Result<EventOutcome> {
        match event {
            Event::Pointer(p) if event.is_press() && p.region == HitRegion::Popup => {
                if let Some(row) = self.row_at(ctx.text(), p.position.y) {
                    self.select(row, ctx);
                }
                self.anchor.close(ctx);
                Ok(EventOutcome::Handle)
            }
            Event::Pointer(_) if event.is_press() => {
                if self.anchor.is_open(ctx) {
                    self.anchor.close(ctx);
                } else if !self.items.is_empty() {
                    self.open(ctx)?;
                }
                Ok(EventOutcome::Handle)
            }
            Event::Pointer(p) if p.action == PointerAction::Moved && p.region == HitRegion::Popup => {
                if let Some(row) = self.row_at(ctx.text(), p.position.y)
                    && row != self.highlighted
                {
                    self.highlighted = row;
                    ctx.invalidate();
                }
                Ok(EventOutcome::Handle)
            }
            Event::Pointer(_) if event.is_release() => Ok(EventOutcome::Handle),
            Event::KeyDown(k) if k.mods.is_plain() => {
                if self.anchor.is_open(ctx) {
                    Ok(self.key_open(k.key, ctx))
                } else {
                    self.key_closed(k.key, ctx)
                }
            }
            Event::DismissPopup | Event::FocusLost => {
                self.anchor.close(ctx);
                ctx.invalidate();
                Ok(EventOutcome::Handle)
            }
            Event::FocusGained => {
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

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::{FocusManager, PopupManager, panels::Stack, testing::Harness};

    /// A dropdown at the top of a 200x200 window.
    fn colors(h: &mut Harness, log: &Arc<Mutex<Vec<usize>>>) -> Result<NodeId> {
        let stack = h.add(Stack::vertical())?;
        let seen = Arc::clone(log);
        let dd = h.add_to(
            stack,
            Dropdown::new(["red", "green", "blue"]).with_on_change(move |i, _| {
                seen.lock().unwrap().push(i);
            }),
        )?;
        h.frame()?;
        Ok(dd)
    }

    #[test]
    fn rows_outside_the_owner_select() -> Result<()> {
        let mut h = Harness::new(200.0, 200.0);
        let log = Arc::new(Mutex::new(Vec::new()));
        let dd = colors(&mut h, &log)?;
        h.click(5.0, 5.0)?;
        let rect = h.window.core.popup_rect(dd).unwrap();
        let bounds = h.window.core.node(dd).unwrap().bounds();
        assert!(rect.y >= bounds.bottom());
        assert_eq!(rect.w, bounds.w);
        // Second row, well outside the dropdown's own bounds.
        let row = rect.h / 3.0;
        h.click(5.0, rect.y + row * 1.5)?;
        assert_eq!(Dropdown::selected_of(&mut h.window.core, dd)?, Some(1));
        assert_eq!(h.window.core.popup_rect(dd), None);
        assert_eq!(*log.lock().unwrap(), vec![1]);
        h.frame()?;
        assert!(h.canvas.texts().contains(&"green"));
        Ok(())
    }

    #[test]
    fn outside_press_dismisses_without_change() -> Result<()> {
        let mut h = Harness::new(200.0, 200.0);
        let log = Arc::new(Mutex::new(Vec::new()));
        let dd = colors(&mut h, &log)?;
        h.click(5.0, 5.0)?;
        assert!(h.window.core.popup_rect(dd).is_some());
        h.click(150.0, 190.0)?;
        assert_eq!(h.window.core.popup_rect(dd), None);
        assert_eq!(Dropdown::selected_of(&mut h.window.core, dd)?, None);
        assert!(log.lock().unwrap().is_empty());
        Ok(())
    }

    #[test]
    fn keyboard_selection() -> Result<()> {
        let mut h = Harness::new(200.0, 200.0);
        let log = Arc::new(Mutex::new(Vec::new()));
        let dd = colors(&mut h, &log)?;
        h.window.core.set_focus(dd)?;
        h.key(KeyCode::Down)?;
        h.key(KeyCode::Down)?;
        h.key(KeyCode::Down)?;
        h.key(KeyCode::Down)?;
        assert_eq!(Dropdown::selected_of(&mut h.window.core, dd)?, Some(2));
        h.key(KeyCode::Enter)?;
        assert!(h.window.core.popup_rect(dd).is_some());
        h.key(KeyCode::Up)?;
        h.key(KeyCode::Enter)?;
        assert_eq!(h.window.core.popup_rect(dd), None);
        assert_eq!(Dropdown::selected_of(&mut h.window.core, dd)?, Some(1));
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2, 1]);
        Ok(())
    }
}
