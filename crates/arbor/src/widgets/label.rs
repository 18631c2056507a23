use super::{palette, text_color};
use crate::{
    Core, NodeId,
    core::{
        context::{DrawContext, LayoutContext, ViewContext},
        property::{Affects, Observable, Property, PropertyInfo},
        render::{Canvas, Color, Font, Paint},
    },
    error::Result,
    geom::{Point, Size},
    widget::Widget,
};

/// A run of static text. Multi-line text breaks on `\n` only.
pub struct Label {
    /// Displayed text.
    text: Observable<String>,
    /// Font.
    font: Font,
    /// Text color.
    color: Observable<Color>,
}

/// Accessor for [`Label::TEXT`].
fn text_cell(l: &mut Label) -> &mut Observable<String> {
    &mut l.text
}

/// Accessor for [`Label::COLOR`].
fn color_cell(l: &mut Label) -> &mut Observable<Color> {
    &mut l.color
}

/// Published properties.
const PROPERTIES: &[PropertyInfo] = &[Label::TEXT.info, Label::COLOR.info];

impl Label {
    /// Displayed text.
    pub const TEXT: Property<Self, String> = Property::new("text", Affects::Measure, text_cell);
    /// Text color.
    pub const COLOR: Property<Self, Color> = Property::new("color", Affects::Draw, color_cell);

    /// A label in the default font.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Observable::new(text.into()),
            font: Font::default(),
            color: Observable::new(palette::TEXT),
        }
    }

    /// Use a different font.
    pub fn with_font(mut self, font: Font) -> Self {
        self.font = font;
        self
    }

    /// The displayed text.
    pub fn text(&self) -> &str {
        self.text.get()
    }

    /// Replace the text of a label node.
    pub fn set_text(core: &mut Core, label: NodeId, text: impl Into<String>) -> Result<bool> {
        core.set_property(label, &Self::TEXT, text.into())
    }
}

impl Widget for Label {
    fn measure(&mut self, ctx: &mut LayoutContext<'_>, _available: Size) -> Size {
        ctx.text().measure(self.text.get(), &self.font)
    }

    fn draw(&mut self, canvas: &mut dyn Canvas, ctx: &DrawContext<'_>) -> Result<()> {
        let color = if ctx.is_enabled() {
            *self.color.get()
        } else {
            text_color(false)
        };
        canvas.draw_text(self.text.get(), Point::zero(), &self.font, &Paint::fill(color));
        Ok(())
    }

    fn properties(&self) -> &'static [PropertyInfo] {
        PROPERTIES
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::render::{MonospaceMeasurer, TextMeasurer},
        testing::Harness,
    };

    #[test]
    fn natural_size_ignores_bad_availability() -> Result<()> {
        let mut core = Core::new();
        let label = core.add_child(core.root(), Label::new("hello").with_font(Font::sized(10.0)))?;
        let natural = core.measure(label, Size::new(f32::NAN, 100.0));
        assert_eq!(natural, Size::new(30.0, 12.0));
        assert!(!natural.has_nan());
        assert_eq!(core.measure(label, Size::new(f32::NAN, 100.0)), natural);
        Ok(())
    }

    #[test]
    fn text_changes_remeasure() -> Result<()> {
        let mut h = Harness::new(200.0, 50.0);
        let font = Font::sized(10.0);
        let label = h.add(Label::new("ab").with_font(font.clone()))?;
        h.frame()?;
        assert!(Label::set_text(&mut h.window.core, label, "abcdef")?);
        assert!(h.window.core.needs_layout());
        h.frame()?;
        assert_eq!(
            h.window.core.desired(label).map(|d| d.w),
            Some(MonospaceMeasurer.measure("abcdef", &font).w)
        );
        assert_eq!(h.canvas.texts(), vec!["abcdef"]);
        Ok(())
    }
}
