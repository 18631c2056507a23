use arbor::{
    NodeId, Placement, PopupManager,
    error::Result,
    panels::{AbsoluteLayout, AbsolutePlacement},
    testing::Harness,
    widgets::{DatePicker, Dropdown},
};
use chrono::NaiveDate;
use comfy_table::{Table, presets::UTF8_FULL};

/// Sizes offered by the dropdowns.
const SIZES: [&str; 5] = ["tiny", "small", "medium", "large", "huge"];

/// Two dropdowns and a date picker pinned at fixed positions, one near the bottom edge so its
/// popup flips above the anchor.
pub struct PopupGym {
    /// Dropdown near the top.
    pub top: NodeId,
    /// Dropdown near the bottom.
    pub bottom: NodeId,
    /// Date picker.
    pub date: NodeId,
}

impl PopupGym {
    /// Build the scene under the harness root. The harness should be at least 320x240.
    pub fn build(h: &mut Harness, date: NaiveDate) -> Result<Self> {
        let panel = h.add(AbsoluteLayout::new())?;
        let height = h.window.core.viewport().h;
        let core = &mut h.window.core;
        let top = AbsoluteLayout::add(
            core,
            panel,
            Dropdown::new(SIZES),
            AbsolutePlacement::at(10.0, 10.0),
        )?;
        let bottom = AbsoluteLayout::add(
            core,
            panel,
            Dropdown::new(SIZES).with_placement(Placement::Below),
            AbsolutePlacement::at(10.0, height - 30.0),
        )?;
        let date = AbsoluteLayout::add(
            core,
            panel,
            DatePicker::new(date),
            AbsolutePlacement::at(150.0, 10.0),
        )?;
        h.frame()?;
        Ok(Self { top, bottom, date })
    }

    /// Name the owner of a popup for display.
    fn owner_name(&self, owner: NodeId) -> &'static str {
        if owner == self.top {
            "top"
        } else if owner == self.bottom {
            "bottom"
        } else if owner == self.date {
            "date"
        } else {
            "other"
        }
    }

    /// A table of the open popups in stacking order.
    pub fn popup_table(&self, h: &Harness) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_header(vec!["owner", "x", "y", "w", "h"]);
        for overlay in h.window.core.popups() {
            let r = overlay.rect;
            table.add_row(vec![
                self.owner_name(overlay.owner).to_string(),
                r.x.to_string(),
                r.y.to_string(),
                r.w.to_string(),
                r.h.to_string(),
            ]);
        }
        table.to_string()
    }

    /// Current selections, one line.
    pub fn summary(&self, h: &mut Harness) -> Result<String> {
        let core = &mut h.window.core;
        let pick = |i: Option<usize>| i.and_then(|i| SIZES.get(i)).copied().unwrap_or("none");
        let top = pick(Dropdown::selected_of(core, self.top)?);
        let bottom = pick(Dropdown::selected_of(core, self.bottom)?);
        let date = DatePicker::date_of(core, self.date)?;
        Ok(format!("top={top} bottom={bottom} date={date}"))
    }
}
