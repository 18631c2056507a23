use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use arbor::{
    Context, NodeId,
    error::Result,
    geom::Thickness,
    layout::Layout,
    panels::{Cell, Grid, TrackSize},
    property::ItemSource,
    testing::Harness,
    widgets::{
        Button, CheckBox, DatePicker, Dropdown, Entry, ItemsView, Label, ScrollView, Slider,
    },
};
use chrono::NaiveDate;

/// Field captions, one per control row.
const CAPTIONS: [&str; 6] = ["Name", "Newsletter", "Volume", "Color", "Start", ""];

/// Colors offered by the dropdown.
pub const COLORS: [&str; 4] = ["red", "green", "blue", "violet"];

/// A two-column form: captions on the left, controls on the right, a status line and a
/// scrolling history of submissions underneath.
pub struct FormGym {
    /// Name entry.
    pub name: NodeId,
    /// Newsletter checkbox.
    pub newsletter: NodeId,
    /// Volume slider.
    pub volume: NodeId,
    /// Color dropdown.
    pub color: NodeId,
    /// Start date picker.
    pub start: NodeId,
    /// Submit button.
    pub submit: NodeId,
    /// Status line.
    pub status: NodeId,
    /// Submission history.
    pub history: NodeId,
    /// Rows shown by the history view.
    entries: ItemSource<String>,
    /// Submissions seen so far.
    submissions: Arc<AtomicUsize>,
}

impl FormGym {
    /// Build the form under the harness root.
    pub fn build(h: &mut Harness, start: NaiveDate) -> Result<Self> {
        let rows: Vec<TrackSize> = CAPTIONS
            .iter()
            .map(|_| TrackSize::Auto)
            .chain([TrackSize::Auto, TrackSize::Star(1.0)])
            .collect();
        let grid = h.add(
            Grid::new()
                .with_rows(rows)
                .with_columns([TrackSize::Auto, TrackSize::Star(1.0)])
                .with_spacing(4.0, 8.0),
        )?;
        h.window.core.set_layout_of(
            grid,
            Layout::new().padding(Thickness::new(8.0, 8.0, 8.0, 8.0)),
        )?;
        let core = &mut h.window.core;
        for (row, caption) in CAPTIONS.iter().enumerate() {
            Grid::add(core, grid, Label::new(*caption), Cell::new(row, 0))?;
        }

        let entries = ItemSource::new(Vec::new());
        let submissions = Arc::new(AtomicUsize::new(0));
        let on_click = {
            let entries = entries.clone();
            let submissions = Arc::clone(&submissions);
            move |_: &mut dyn Context| {
                let n = submissions.fetch_add(1, Ordering::SeqCst) + 1;
                entries.push(format!("submission {n}"));
            }
        };

        let name = Entry::new().with_placeholder("your name");
        let name = Grid::add(core, grid, name, Cell::new(0, 1))?;
        let newsletter = Grid::add(core, grid, CheckBox::new("subscribe"), Cell::new(1, 1))?;
        let volume = Slider::new(0.0, 100.0).with_value(50.0);
        let volume = Grid::add(core, grid, volume, Cell::new(2, 1))?;
        let color = Grid::add(core, grid, Dropdown::new(COLORS), Cell::new(3, 1))?;
        let start = Grid::add(core, grid, DatePicker::new(start), Cell::new(4, 1))?;
        let submit = Button::new("Submit").with_on_click(on_click);
        let submit = Grid::add(core, grid, submit, Cell::new(5, 1))?;
        let status = Grid::add(core, grid, Label::new("ready"), Cell::new(6, 0).span(1, 2))?;
        let scroll = Grid::add(core, grid, ScrollView::new(), Cell::new(7, 0).span(1, 2))?;
        let history = core.add_child(scroll, ItemsView::new(entries.clone()))?;
        h.frame()?;
        Ok(Self {
            name,
            newsletter,
            volume,
            color,
            start,
            submit,
            status,
            history,
            entries,
            submissions,
        })
    }

    /// Number of submissions so far.
    pub fn submissions(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }

    /// Rows in the history view.
    pub fn history_len(&self) -> usize {
        self.entries.len()
    }

    /// One line describing the current form values.
    pub fn summary(&self, h: &mut Harness) -> Result<String> {
        let core = &mut h.window.core;
        let name = Entry::text_of(core, self.name)?;
        let newsletter = CheckBox::checked(core, self.newsletter)?;
        let volume = Slider::value_of(core, self.volume)?;
        let color = Dropdown::selected_of(core, self.color)?
            .and_then(|i| COLORS.get(i))
            .copied()
            .unwrap_or("none");
        let start = DatePicker::date_of(core, self.start)?;
        Ok(format!(
            "name={name:?} newsletter={newsletter} volume={volume} color={color} start={start}"
        ))
    }

    /// Copy the current summary into the status line.
    pub fn refresh_status(&self, h: &mut Harness) -> Result<()> {
        let summary = self.summary(h)?;
        let text = format!("{} submitted, {summary}", self.submissions());
        Label::set_text(&mut h.window.core, self.status, text)?;
        h.frame()?;
        Ok(())
    }
}
