//! Collection view over an item source.

use std::fmt::Display;

use super::{line_height, palette, text_color};
use crate::{
    Context, Core, NodeId,
    core::{
        context::{DrawContext, LayoutContext, ViewContext},
        property::{Affects, ItemSource, Observable, Property, PropertyInfo, SubscriptionId},
        render::{Canvas, Font, Paint, TextMeasurer},
    },
    error::Result,
    event::{Event, KeyCode},
    geom::{Point, Rect, Size},
    widget::{EventOutcome, Widget},
};

/// Vertical padding of each row.
const ROW_PAD: f32 = 2.0;
/// Horizontal text inset.
const INSET: f32 = 4.0;

/// A vertical list of rows, one per item of an [`ItemSource`].
///
/// The view subscribes to its source while mounted and re-measures whenever the source
/// changes; the subscription is dropped on unmount so the source does not keep the view's
/// callback alive. Rows show each item's `Display` text. Clicking a row or using Up, Down,
/// Home and End moves the selection.
pub struct ItemsView<T> {
    /// Data source.
    source: ItemSource<T>,
    /// Live subscription while mounted.
    subscription: Option<SubscriptionId>,
    /// Selected row.
    selected: Observable<Option<usize>>,
    /// Font.
    font: Font,
}

/// Accessor for [`ItemsView::SELECTED`].
fn selected_cell<T>(v: &mut ItemsView<T>) -> &mut Observable<Option<usize>> {
    &mut v.selected
}

impl<T: Display + Send + 'static> ItemsView<T> {
    /// Selected row.
    pub const SELECTED: Property<Self, Option<usize>> =
        Property::new("selected", Affects::Draw, selected_cell::<T>);

    /// Published properties.
    const PROPERTIES: &'static [PropertyInfo] = &[Self::SELECTED.info];

    /// A view over a source. The source may be shared with other views.
    pub fn new(source: ItemSource<T>) -> Self {
        Self {
            source,
            subscription: None,
            selected: Observable::new(None),
            font: Font::default(),
        }
    }

    /// The data source.
    pub fn source(&self) -> &ItemSource<T> {
        &self.source
    }

    /// Selected row.
    pub fn selected(&self) -> Option<usize> {
        *self.selected.get()
    }

    /// Read the selection of a view node.
    pub fn selected_of(core: &mut Core, node: NodeId) -> Result<Option<usize>> {
        core.get_property(node, &Self::SELECTED)
    }

    /// Is the view subscribed to its source?
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Height of one row.
    fn row_height(&self, text: &dyn TextMeasurer) -> f32 {
        line_height(text, &self.font) + 2.0 * ROW_PAD
    }

    /// Keep the selection inside the current item range.
    fn clamp_selection(&mut self) {
        let len = self.source.len();
        if let Some(i) = self.selected()
            && i >= len
        {
            self.selected.set(len.checked_sub(1));
        }
    }

    /// Select a row if it exists.
    fn select(&mut self, row: usize, ctx: &mut dyn Context) -> bool {
        if row >= self.source.len() || !self.selected.set(Some(row)) {
            return false;
        }
        ctx.invalidate();
        true
    }
}

impl<T: Display + Send + 'static> Widget for ItemsView<T> {
    fn measure(&mut self, ctx: &mut LayoutContext<'_>, _available: Size) -> Size {
        self.clamp_selection();
        let text = ctx.text();
        let font = &self.font;
        let widest = self
            .source
            .map(|item| text.measure(&item.to_string(), font).w)
            .into_iter()
            .fold(0.0, f32::max);
        let rows = self.source.len() as f32;
        Size::new(widest + 2.0 * INSET, rows * self.row_height(text))
    }

    fn draw(&mut self, canvas: &mut dyn Canvas, ctx: &DrawContext<'_>) -> Result<()> {
        let size = ctx.size();
        let row = self.row_height(ctx.text());
        let selected = self.selected();
        let normal = Paint::fill(text_color(ctx.is_enabled()));
        for (i, label) in self.source.map(ToString::to_string).iter().enumerate() {
            let y = i as f32 * row;
            let paint = if selected == Some(i) {
                canvas.draw_rect(Rect::new(0.0, y, size.w, row), &Paint::fill(palette::ACCENT));
                Paint::fill(palette::PANEL)
            } else {
                normal
            };
            canvas.draw_text(label, Point::new(INSET, y + ROW_PAD), &self.font, &paint);
        }
        Ok(())
    }

    fn on_event(&mut self, event: &Event, ctx: &mut dyn Context) -> Result<EventOutcome> {
        match event {
            Event::Pointer(p) if event.is_press() => {
                let row = (p.position.y.max(0.0) / self.row_height(ctx.text())) as usize;
                self.select(row, ctx);
                Ok(EventOutcome::Handle)
            }
            Event::KeyDown(k) => {
                let len = self.source.len();
                if len == 0 {
                    return Ok(EventOutcome::Ignore);
                }
                let current = self.selected();
                let target = if *k == KeyCode::Up {
                    current.map_or(0, |i| i.saturating_sub(1))
                } else if *k == KeyCode::Down {
                    current.map_or(0, |i| (i + 1).min(len - 1))
                } else if *k == KeyCode::Home {
                    0
                } else if *k == KeyCode::End {
                    len - 1
                } else {
                    return Ok(EventOutcome::Ignore);
                };
                Ok(if self.select(target, ctx) {
                    EventOutcome::Handle
                } else {
                    EventOutcome::Consume
                })
            }
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

    fn on_mount(&mut self, ctx: &mut dyn Context) -> Result<()> {
        if self.subscription.is_none() {
            let invalidator = ctx.invalidator();
            let me = ctx.node_id();
            let id = self
                .source
                .subscribe(move |_| invalidator.invalidate_measure(me));
            self.subscription = Some(id);
        }
        Ok(())
    }

    fn on_unmount(&mut self, _ctx: &mut dyn Context) {
        if let Some(id) = self.subscription.take() {
            self.source.unsubscribe(id);
        }
    }

    fn properties(&self) -> &'static [PropertyInfo] {
        Self::PROPERTIES
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::render::MonospaceMeasurer,
        panels::Stack,
        testing::Harness,
    };

    fn row() -> f32 {
        line_height(&MonospaceMeasurer, &Font::default()) + 2.0 * ROW_PAD
    }

    fn fruit(h: &mut Harness) -> Result<(ItemSource<&'static str>, NodeId)> {
        let source = ItemSource::new(vec!["apple", "banana", "cherry"]);
        let stack = h.add(Stack::vertical())?;
        let view = h.add_to(stack, ItemsView::new(source.clone()))?;
        h.frame()?;
        Ok((source, view))
    }

    #[test]
    fn source_changes_remeasure() -> Result<()> {
        let mut h = Harness::new(200.0, 200.0);
        let (source, view) = fruit(&mut h)?;
        let height = |h: &Harness| h.window.core.node(view).map(|n| n.bounds().h);
        assert_eq!(height(&h), Some(3.0 * row()));
        source.push("damson");
        assert!(h.window.needs_frame());
        h.frame()?;
        assert_eq!(height(&h), Some(4.0 * row()));
        assert!(h.canvas.texts().contains(&"damson"));
        Ok(())
    }

    #[test]
    fn unmount_unsubscribes() -> Result<()> {
        let mut h = Harness::new(200.0, 200.0);
        let (source, view) = fruit(&mut h)?;
        assert_eq!(source.subscriber_count(), 1);
        h.window.core.remove_subtree(view)?;
        assert_eq!(source.subscriber_count(), 0);
        // The source outlives the view.
        source.push("elder");
        h.frame()?;
        assert_eq!(source.len(), 4);
        Ok(())
    }

    #[test]
    fn selection_follows_clicks_keys_and_removals() -> Result<()> {
        let mut h = Harness::new(200.0, 200.0);
        let (source, view) = fruit(&mut h)?;
        h.click(5.0, row() * 2.0 + 5.0)?;
        assert_eq!(ItemsView::<&str>::selected_of(&mut h.window.core, view)?, Some(2));
        h.key(KeyCode::Up)?;
        h.key(KeyCode::Up)?;
        assert_eq!(ItemsView::<&str>::selected_of(&mut h.window.core, view)?, Some(0));
        h.key(KeyCode::End)?;
        source.remove(2);
        source.remove(1);
        h.frame()?;
        assert_eq!(ItemsView::<&str>::selected_of(&mut h.window.core, view)?, Some(0));
        Ok(())
    }
}
