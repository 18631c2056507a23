//! Date selection through a calendar popup.

use chrono::{Datelike, Days, Months, NaiveDate};

use super::{line_height, palette, text_color};
use crate::{
    Context, Core, NodeId,
    core::{
        context::{DrawContext, LayoutContext, ViewContext},
        popup::{Placement, PopupAnchor},
        property::{Affects, Observable, Property, PropertyInfo},
        render::{Canvas, Font, Paint},
    },
    error::Result,
    event::{Event, HitRegion, KeyCode},
    geom::{Point, Rect, Size, Thickness},
    layout::Layout,
    widget::{EventOutcome, Widget},
};

/// Inner padding of the closed box.
const PADDING: Thickness = Thickness::symmetric(6.0, 3.0);
/// Side of one calendar cell.
pub const CELL: f32 = 28.0;
/// Calendar rows: header, weekday names, six weeks.
const ROWS: usize = 8;
/// Rows before the day grid.
const GRID_TOP: usize = 2;
/// Date format of the closed box.
const FORMAT: &str = "%Y-%m-%d";
/// Weekday column headers, Monday first.
const WEEKDAYS: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];

/// First day of a date's month.
fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// The Monday on or before the first of `month`, where the day grid starts.
fn grid_start(month: NaiveDate) -> NaiveDate {
    let first = first_of_month(month);
    let back = u64::from(first.weekday().num_days_from_monday());
    first.checked_sub_days(Days::new(back)).unwrap_or(first)
}

/// What a popup-local point lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CalendarHit {
    /// Previous month button.
    Prev,
    /// Next month button.
    Next,
    /// A day in the grid.
    Day(NaiveDate),
    /// Title or weekday names.
    Nothing,
}

/// A date field with a month calendar in a popup.
///
/// The calendar is a fixed grid of six weeks starting on Monday, with previous and next
/// buttons in its header. Clicking a day picks it and closes the calendar. With the calendar
/// open, arrow keys move by a day or a week and Page Up and Page Down move by a month.
pub struct DatePicker {
    /// Chosen date.
    date: Observable<NaiveDate>,
    /// First day of the month shown in the calendar.
    month: NaiveDate,
    /// Popup placement and registration.
    anchor: PopupAnchor,
    /// Font.
    font: Font,
}

/// Accessor for [`DatePicker::DATE`].
fn date_cell(d: &mut DatePicker) -> &mut Observable<NaiveDate> {
    &mut d.date
}

/// Published properties.
const PROPERTIES: &[PropertyInfo] = &[DatePicker::DATE.info];

impl DatePicker {
    /// Chosen date.
    pub const DATE: Property<Self, NaiveDate> = Property::new("date", Affects::Draw, date_cell);

    /// A picker showing `date`.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date: Observable::new(date),
            month: first_of_month(date),
            anchor: PopupAnchor::new(Placement::Below),
            font: Font::default(),
        }
    }

    /// Chosen date.
    pub fn date(&self) -> NaiveDate {
        *self.date.get()
    }

    /// First day of the month the calendar shows.
    pub fn shown_month(&self) -> NaiveDate {
        self.month
    }

    /// Read the date of a picker node.
    pub fn date_of(core: &mut Core, node: NodeId) -> Result<NaiveDate> {
        core.get_property(node, &Self::DATE)
    }

    /// Set the date and show its month.
    fn set_date(&mut self, date: NaiveDate, ctx: &mut dyn Context) {
        self.date.set(date);
        self.month = first_of_month(date);
        ctx.invalidate();
    }

    /// Classify a popup-local point.
    fn hit(&self, p: Point) -> CalendarHit {
        if p.x < 0.0 || p.y < 0.0 {
            return CalendarHit::Nothing;
        }
        let (col, row) = ((p.x / CELL) as usize, (p.y / CELL) as usize);
        if col >= 7 || row >= ROWS {
            return CalendarHit::Nothing;
        }
        match (row, col) {
            (0, 0) => CalendarHit::Prev,
            (0, 6) => CalendarHit::Next,
            (r, c) if r >= GRID_TOP => {
                let offset = ((r - GRID_TOP) * 7 + c) as u64;
                grid_start(self.month)
                    .checked_add_days(Days::new(offset))
                    .map_or(CalendarHit::Nothing, CalendarHit::Day)
            }
            _ => CalendarHit::Nothing,
        }
    }

    /// Show the previous or next month.
    fn flip(&mut self, forward: bool) {
        let months = Months::new(1);
        let next = if forward {
            self.month.checked_add_months(months)
        } else {
            self.month.checked_sub_months(months)
        };
        if let Some(m) = next {
            self.month = m;
        }
    }

    /// Move the chosen date by a number of days.
    fn step_days(&mut self, days: i64, ctx: &mut dyn Context) {
        let d = self.date();
        let next = if days >= 0 {
            d.checked_add_days(Days::new(days.unsigned_abs()))
        } else {
            d.checked_sub_days(Days::new(days.unsigned_abs()))
        };
        if let Some(n) = next {
            self.set_date(n, ctx);
        }
    }

    /// Move the chosen date by a month, clamping the day.
    fn step_month(&mut self, forward: bool, ctx: &mut dyn Context) {
        let d = self.date();
        let next = if forward {
            d.checked_add_months(Months::new(1))
        } else {
            d.checked_sub_months(Months::new(1))
        };
        if let Some(n) = next {
            self.set_date(n, ctx);
        }
    }

    /// Open the calendar on the chosen date's month.
    fn open(&mut self, ctx: &mut dyn Context) -> Result<()> {
        self.month = first_of_month(self.date());
        self.anchor.open(ctx, Size::new(7.0 * CELL, ROWS as f32 * CELL))?;
        Ok(())
    }

    /// Draw a label centered in the cell at `(row, col)`.
    fn cell_text(
        &self,
        canvas: &mut dyn Canvas,
        ctx: &DrawContext<'_>,
        (row, col): (usize, usize),
        text: &str,
        paint: &Paint,
    ) {
        let size = ctx.text().measure(text, &self.font);
        let origin = Point::new(
            col as f32 * CELL + (CELL - size.w) / 2.0,
            row as f32 * CELL + (CELL - size.h) / 2.0,
        );
        canvas.draw_text(text, origin, &self.font, paint);
    }
}

impl Widget for DatePicker {
    fn layout(&self) -> Layout {
        Layout::new().padding(PADDING)
    }

    fn measure(&mut self, ctx: &mut LayoutContext<'_>, _available: Size) -> Size {
        let w = ctx.text().measure("0000-00-00", &self.font).w;
        Size::new(w, line_height(ctx.text(), &self.font))
    }

    fn draw(&mut self, canvas: &mut dyn Canvas, ctx: &DrawContext<'_>) -> Result<()> {
        let r = ctx.size().rect();
        canvas.draw_rect(r, &Paint::fill(palette::PANEL));
        let border = if ctx.is_focused() { palette::ACCENT } else { palette::BORDER };
        canvas.draw_rect(r, &Paint::stroke(border, 1.0));
        let text = self.date().format(FORMAT).to_string();
        canvas.draw_text(
            &text,
            Point::new(PADDING.left, PADDING.top),
            &self.font,
            &Paint::fill(text_color(ctx.is_enabled())),
        );
        Ok(())
    }

    fn draw_popup(
        &mut self,
        canvas: &mut dyn Canvas,
        ctx: &DrawContext<'_>,
        size: Size,
    ) -> Result<()> {
        canvas.draw_rect(size.rect(), &Paint::fill(palette::PANEL));
        let text = Paint::fill(palette::TEXT);
        let muted = Paint::fill(palette::TEXT_DISABLED);
        self.cell_text(canvas, ctx, (0, 0), "<", &text);
        self.cell_text(canvas, ctx, (0, 6), ">", &text);
        let title = self.month.format("%B %Y").to_string();
        let title_w = ctx.text().measure(&title, &self.font).w;
        let title_y = (CELL - line_height(ctx.text(), &self.font)) / 2.0;
        canvas.draw_text(&title, Point::new((size.w - title_w) / 2.0, title_y), &self.font, &text);
        for (col, name) in WEEKDAYS.iter().enumerate() {
            self.cell_text(canvas, ctx, (1, col), name, &muted);
        }
        let chosen = self.date();
        let mut day = grid_start(self.month);
        for i in 0..42 {
            let (row, col) = (GRID_TOP + i / 7, i % 7);
            let paint = if day == chosen {
                let cell = Rect::new(col as f32 * CELL, row as f32 * CELL, CELL, CELL);
                canvas.draw_round_rect(cell, CELL / 2.0, &Paint::fill(palette::ACCENT));
                Paint::fill(palette::PANEL)
            } else if day.month() == self.month.month() {
                text
            } else {
                muted
            };
            self.cell_text(canvas, ctx, (row, col), &day.day().to_string(), &paint);
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
        canvas.draw_rect(size.rect(), &Paint::stroke(palette::BORDER, 1.0));
        Ok(())
    }

    fn on_event(&mut self, event: &Event, ctx: &mut dyn Context) -> Result<EventOutcome> {
        match event {
            Event::Pointer(p) if event.is_press() && p.region == HitRegion::Popup => {
                match self.hit(p.position) {
                    CalendarHit::Prev => self.flip(false),
                    CalendarHit::Next => self.flip(true),
                    CalendarHit::Day(d) => {
                        self.set_date(d, ctx);
                        self.anchor.close(ctx);
                    }
                    CalendarHit::Nothing => {}
                }
                ctx.invalidate();
                Ok(EventOutcome::Handle)
            }
            Event::Pointer(_) if event.is_press() => {
                if !self.anchor.close(ctx) {
                    self.open(ctx)?;
                }
                Ok(EventOutcome::Handle)
            }
            Event::Pointer(_) if event.is_release() => Ok(EventOutcome::Handle),
            Event::KeyDown(k) if k.mods.is_plain() => {
                let open = self.anchor.is_open(ctx);
                match k.key {
                    KeyCode::Enter | KeyCode::Char(' ') if !open => self.open(ctx)?,
                    KeyCode::Enter | KeyCode::Esc if open => {
                        self.anchor.close(ctx);
                    }
                    KeyCode::Left if open => self.step_days(-1, ctx),
                    KeyCode::Right if open => self.step_days(1, ctx),
                    KeyCode::Up if open => self.step_days(-7, ctx),
                    KeyCode::Down if open => self.step_days(7, ctx),
                    KeyCode::PageUp if open => self.step_month(false, ctx),
                    KeyCode::PageDown if open => self.step_month(true, ctx),
                    _ => return Ok(EventOutcome::Ignore),
                }
                ctx.invalidate();
                Ok(EventOutcome::Handle)
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
    use super::*;
    use crate::{FocusManager, PopupManager, panels::Stack, testing::Harness};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// A picker at the top of a 300x300 window.
    fn picker(h: &mut Harness, date: NaiveDate) -> Result<NodeId> {
        let stack = h.add(Stack::vertical())?;
        let dp = h.add_to(stack, DatePicker::new(date))?;
        h.frame()?;
        Ok(dp)
    }

    /// Popup-relative center of a calendar cell, in window coordinates.
    fn cell(h: &Harness, dp: NodeId, row: usize, col: usize) -> (f32, f32) {
        let r = h.window.core.popup_rect(dp).unwrap();
        (
            r.x + col as f32 * CELL + CELL / 2.0,
            r.y + row as f32 * CELL + CELL / 2.0,
        )
    }

    #[test]
    fn grid_starts_on_monday() {
        // 2024-03-01 is a Friday.
        assert_eq!(grid_start(ymd(2024, 3, 15)), ymd(2024, 2, 26));
        // 2024-04-01 is a Monday.
        assert_eq!(grid_start(ymd(2024, 4, 30)), ymd(2024, 4, 1));
    }

    #[test]
    fn clicking_a_day_picks_it() -> Result<()> {
        let mut h = Harness::new(300.0, 300.0);
        let dp = picker(&mut h, ymd(2024, 3, 15))?;
        h.click(5.0, 5.0)?;
        assert!(h.window.core.popup_rect(dp).is_some());
        h.frame()?;
        assert!(h.canvas.texts().contains(&"March 2024"));
        // Wednesday of the fourth grid week.
        let (x, y) = cell(&h, dp, GRID_TOP + 3, 2);
        h.click(x, y)?;
        assert_eq!(DatePicker::date_of(&mut h.window.core, dp)?, ymd(2024, 3, 20));
        assert_eq!(h.window.core.popup_rect(dp), None);
        Ok(())
    }

    #[test]
    fn header_buttons_flip_months() -> Result<()> {
        let mut h = Harness::new(300.0, 300.0);
        let dp = picker(&mut h, ymd(2024, 3, 15))?;
        h.click(5.0, 5.0)?;
        let (x, y) = cell(&h, dp, 0, 6);
        h.click(x, y)?;
        assert_eq!(h.window.core.widget::<DatePicker>(dp)?.shown_month(), ymd(2024, 4, 1));
        assert!(h.window.core.popup_rect(dp).is_some());
        let (x, y) = cell(&h, dp, GRID_TOP, 0);
        h.click(x, y)?;
        assert_eq!(DatePicker::date_of(&mut h.window.core, dp)?, ymd(2024, 4, 1));
        Ok(())
    }

    #[test]
    fn keys_move_by_day_week_and_month() -> Result<()> {
        let mut h = Harness::new(300.0, 300.0);
        let dp = picker(&mut h, ymd(2024, 1, 31))?;
        h.window.core.set_focus(dp)?;
        // Arrows do nothing while closed.
        assert_eq!(h.key(KeyCode::Right)?, EventOutcome::Ignore);
        h.key(KeyCode::Enter)?;
        h.key(KeyCode::Right)?;
        assert_eq!(DatePicker::date_of(&mut h.window.core, dp)?, ymd(2024, 2, 1));
        h.key(KeyCode::Up)?;
        assert_eq!(DatePicker::date_of(&mut h.window.core, dp)?, ymd(2024, 1, 25));
        h.key(KeyCode::PageDown)?;
        h.key(KeyCode::PageDown)?;
        assert_eq!(DatePicker::date_of(&mut h.window.core, dp)?, ymd(2024, 3, 25));
        h.key(KeyCode::Esc)?;
        assert_eq!(h.window.core.popup_rect(dp), None);
        Ok(())
    }
}
