use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    Core, NodeId,
    core::context::{LayoutContext, ViewContext},
    error::Result,
    geom::{Rect, Size},
    widget::Widget,
};

/// How a row or column is sized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TrackSize {
    /// A fixed size in pixels.
    Absolute(f32),
    /// The natural size of the largest single-span child in the track.
    Auto,
    /// A weighted share of the space left after Absolute and Auto tracks.
    Star(f32),
}

impl Default for TrackSize {
    fn default() -> Self {
        Self::Star(1.0)
    }
}

impl TrackSize {
    /// Star weight, or zero for other kinds.
    fn weight(&self) -> f32 {
        match self {
            Self::Star(w) if w.is_finite() && *w > 0.0 => *w,
            _ => 0.0,
        }
    }
}

/// A child's cell assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// First row.
    pub row: usize,
    /// First column.
    pub column: usize,
    /// Number of rows covered, at least one.
    pub row_span: usize,
    /// Number of columns covered, at least one.
    pub column_span: usize,
}

impl Default for Cell {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl Cell {
    /// A single-track cell.
    pub fn new(row: usize, column: usize) -> Self {
        Self {
            row,
            column,
            row_span: 1,
            column_span: 1,
        }
    }

    /// Cover more rows and columns.
    pub fn span(mut self, rows: usize, columns: usize) -> Self {
        self.row_span = rows.max(1);
        self.column_span = columns.max(1);
        self
    }

    /// Clamp the cell into a grid of `rows` by `columns` tracks.
    fn clamp(self, rows: usize, columns: usize) -> Self {
        let row = self.row.min(rows.saturating_sub(1));
        let column = self.column.min(columns.saturating_sub(1));
        Self {
            row,
            column,
            row_span: self.row_span.clamp(1, rows - row),
            column_span: self.column_span.clamp(1, columns - column),
        }
    }
}

/// Size a run of tracks.
///
/// Absolute tracks take their value and Auto tracks their natural size. Star tracks split
/// what remains of `available` after those and the spacing, by weight. If `available` is
/// infinite or at least `unbounded_at`, Star tracks take their natural size instead, so an
/// unconstrained grid sizes each track to its content rather than to zero.
pub fn size_tracks(
    defs: &[TrackSize],
    available: f32,
    spacing: f32,
    natural: &[f32],
    unbounded_at: f32,
) -> Vec<f32> {
    let natural_of = |i: usize| natural.get(i).copied().unwrap_or(0.0).max(0.0);
    let unbounded = !available.is_finite() || available >= unbounded_at;
    let mut sizes: Vec<f32> = defs
        .iter()
        .enumerate()
        .map(|(i, d)| match d {
            TrackSize::Absolute(v) if v.is_finite() => v.max(0.0),
            TrackSize::Absolute(_) => 0.0,
            TrackSize::Auto => natural_of(i),
            TrackSize::Star(_) if unbounded => natural_of(i),
            TrackSize::Star(_) => 0.0,
        })
        .collect();
    if unbounded {
        return sizes;
    }
    let total_weight: f32 = defs.iter().map(TrackSize::weight).sum();
    if total_weight <= 0.0 {
        return sizes;
    }
    let fixed: f32 = defs
        .iter()
        .zip(&sizes)
        .filter(|(d, _)| !matches!(d, TrackSize::Star(_)))
        .map(|(_, s)| *s)
        .sum();
    let gaps = spacing.max(0.0) * defs.len().saturating_sub(1) as f32;
    let per_weight = (available - fixed - gaps).max(0.0) / total_weight;
    for (d, s) in defs.iter().zip(sizes.iter_mut()) {
        if matches!(d, TrackSize::Star(_)) {
            *s = d.weight() * per_weight;
        }
    }
    sizes
}

/// Spread `delta` across Star tracks by weight, never taking a track below zero.
fn redistribute(defs: &[TrackSize], sizes: &mut [f32], delta: f32) {
    let total_weight: f32 = defs.iter().map(TrackSize::weight).sum();
    if total_weight <= 0.0 || delta == 0.0 || !delta.is_finite() {
        return;
    }
    for (d, s) in defs.iter().zip(sizes.iter_mut()) {
        let w = d.weight();
        if w > 0.0 {
            *s = (*s + delta * w / total_weight).max(0.0);
        }
    }
}

/// Total length of a run of tracks plus the spacing between them.
fn total(sizes: &[f32], spacing: f32) -> f32 {
    sizes.iter().sum::<f32>() + spacing * sizes.len().saturating_sub(1) as f32
}

/// Start offset of each track.
fn offsets(sizes: &[f32], spacing: f32) -> Vec<f32> {
    let mut out = Vec::with_capacity(sizes.len());
    let mut at = 0.0;
    for s in sizes {
        out.push(at);
        at += s + spacing;
    }
    out
}

/// Length covered by `span` tracks starting at `start`, spacing included.
fn span_length(sizes: &[f32], spacing: f32, start: usize, span: usize) -> f32 {
    let end = (start + span).min(sizes.len());
    if start >= end {
        return 0.0;
    }
    total(&sizes[start..end], spacing)
}

/// Places children in a table of rows and columns.
///
/// Cell assignments live in a side table keyed by child id, set with [`Grid::place`].
/// Children without an assignment sit in the first cell. With no track definitions an axis
/// has a single Star track.
#[derive(Debug, Default)]
pub struct Grid {
    /// Row definitions.
    rows: Vec<TrackSize>,
    /// Column definitions.
    columns: Vec<TrackSize>,
    /// Gap between rows.
    row_spacing: f32,
    /// Gap between columns.
    column_spacing: f32,
    /// Cell assignments.
    cells: HashMap<NodeId, Cell>,
    /// Row heights from the last measure.
    measured_rows: Vec<f32>,
    /// Column widths from the last measure.
    measured_columns: Vec<f32>,
}

impl Grid {
    /// An empty grid with one implicit Star track per axis.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the row definitions.
    pub fn with_rows(mut self, rows: impl Into<Vec<TrackSize>>) -> Self {
        self.rows = rows.into();
        self
    }

    /// Set the column definitions.
    pub fn with_columns(mut self, columns: impl Into<Vec<TrackSize>>) -> Self {
        self.columns = columns.into();
        self
    }

    /// Set the row and column spacing.
    pub fn with_spacing(mut self, row: f32, column: f32) -> Self {
        self.row_spacing = row.max(0.0);
        self.column_spacing = column.max(0.0);
        self
    }

    /// Effective row definitions.
    pub fn rows(&self) -> Vec<TrackSize> {
        effective(&self.rows)
    }

    /// Effective column definitions.
    pub fn columns(&self) -> Vec<TrackSize> {
        effective(&self.columns)
    }

    /// Row heights and column widths from the most recent layout pass.
    pub fn track_sizes(&self) -> (&[f32], &[f32]) {
        (&self.measured_rows, &self.measured_columns)
    }

    /// A child's cell assignment.
    pub fn cell(&self, child: NodeId) -> Cell {
        self.cells.get(&child).copied().unwrap_or_default()
    }

    /// Assign a child of `grid` to a cell.
    pub fn place(core: &mut Core, grid: NodeId, child: NodeId, cell: Cell) -> Result<()> {
        core.with_widget(grid, |g: &mut Self, _| {
            g.cells.insert(child, cell);
        })?;
        core.invalidate_measure(grid);
        Ok(())
    }

    /// Append a widget to `grid` in a cell.
    pub fn add<W: Widget + 'static>(
        core: &mut Core,
        grid: NodeId,
        widget: W,
        cell: Cell,
    ) -> Result<NodeId> {
        let child = core.add_child(grid, widget)?;
        Self::place(core, grid, child, cell)?;
        Ok(child)
    }

    /// Number of children with a stored assignment.
    pub fn assigned(&self) -> usize {
        self.cells.len()
    }

    /// Visible children with their clamped cells.
    fn placed(&self, ctx: &LayoutContext<'_>, rows: usize, columns: usize) -> Vec<(NodeId, Cell)> {
        ctx.visible_children()
            .into_iter()
            .map(|c| (c, self.cell(c).clamp(rows, columns)))
            .collect()
    }
}

/// Definitions with the implicit single Star track filled in.
fn effective(defs: &[TrackSize]) -> Vec<TrackSize> {
    if defs.is_empty() {
        vec![TrackSize::default()]
    } else {
        defs.to_vec()
    }
}

impl Widget for Grid {
    fn measure(&mut self, ctx: &mut LayoutContext<'_>, available: Size) -> Size {
        let rows = self.rows();
        let columns = self.columns();
        let threshold = ctx.config().unbounded_threshold;
        let placed = self.placed(ctx, rows.len(), columns.len());
        if placed.is_empty() {
            self.measured_rows = vec![0.0; rows.len()];
            self.measured_columns = vec![0.0; columns.len()];
            return Size::ZERO;
        }

        // Natural column widths from single-column children, unconstrained.
        let mut natural_columns = vec![0.0f32; columns.len()];
        for (child, cell) in &placed {
            let d = ctx.measure(*child, Size::INFINITY);
            if cell.column_span == 1 {
                natural_columns[cell.column] = natural_columns[cell.column].max(d.w);
            }
        }
        let widths = size_tracks(
            &columns,
            available.w,
            self.column_spacing,
            &natural_columns,
            threshold,
        );

        // Natural row heights at the resolved widths.
        let mut natural_rows = vec![0.0f32; rows.len()];
        for (child, cell) in &placed {
            let w = span_length(&widths, self.column_spacing, cell.column, cell.column_span);
            let d = ctx.measure(*child, Size::new(w, f32::INFINITY));
            if cell.row_span == 1 {
                natural_rows[cell.row] = natural_rows[cell.row].max(d.h);
            }
        }
        let heights = size_tracks(&rows, available.h, self.row_spacing, &natural_rows, threshold);

        for (child, cell) in &placed {
            let w = span_length(&widths, self.column_spacing, cell.column, cell.column_span);
            let h = span_length(&heights, self.row_spacing, cell.row, cell.row_span);
            ctx.measure(*child, Size::new(w, h));
        }

        let size = Size::new(
            total(&widths, self.column_spacing),
            total(&heights, self.row_spacing),
        );
        self.measured_rows = heights;
        self.measured_columns = widths;
        size
    }

    fn arrange(&mut self, ctx: &mut LayoutContext<'_>, content: Rect) {
        let rows = self.rows();
        let columns = self.columns();
        let mut widths = self.measured_columns.clone();
        let mut heights = self.measured_rows.clone();
        widths.resize(columns.len(), 0.0);
        heights.resize(rows.len(), 0.0);
        let dw = content.w - total(&widths, self.column_spacing);
        let dh = content.h - total(&heights, self.row_spacing);
        redistribute(&columns, &mut widths, dw);
        redistribute(&rows, &mut heights, dh);

        let xs = offsets(&widths, self.column_spacing);
        let ys = offsets(&heights, self.row_spacing);
        for (child, cell) in self.placed(ctx, rows.len(), columns.len()) {
            let slot = Rect::new(
                content.x + xs[cell.column],
                content.y + ys[cell.row],
                span_length(&widths, self.column_spacing, cell.column, cell.column_span),
                span_length(&heights, self.row_spacing, cell.row, cell.row_span),
            );
            ctx.arrange(child, slot);
        }
        self.measured_rows = heights;
        self.measured_columns = widths;
    }

    fn on_child_detached(&mut self, child: NodeId) {
        self.cells.remove(&child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixed;

    const LIMIT: f32 = 1.0e6;

    #[test]
    fn star_splits_the_remainder_by_weight() {
        let defs = [TrackSize::Absolute(50.0), TrackSize::Star(1.0), TrackSize::Star(2.0)];
        assert_eq!(size_tracks(&defs, 350.0, 0.0, &[], LIMIT), vec![50.0, 100.0, 200.0]);
        // Spacing comes out of the Star share.
        assert_eq!(size_tracks(&defs, 360.0, 5.0, &[], LIMIT), vec![50.0, 100.0, 200.0]);
        // Overconstrained: Star tracks collapse to zero, never negative.
        assert_eq!(size_tracks(&defs, 20.0, 0.0, &[], LIMIT), vec![50.0, 0.0, 0.0]);
    }

    #[test]
    fn unbounded_star_uses_natural_size() {
        let defs = [TrackSize::Star(1.0), TrackSize::Star(3.0)];
        let natural = [12.0, 7.0];
        assert_eq!(size_tracks(&defs, f32::INFINITY, 0.0, &natural, LIMIT), vec![12.0, 7.0]);
        assert_eq!(size_tracks(&defs, 1.0e9, 0.0, &natural, LIMIT), vec![12.0, 7.0]);
    }

    #[test]
    fn auto_column_matches_its_child() -> Result<()> {
        let mut core = Core::new();
        let grid = core.add_child(
            core.root(),
            Grid::new().with_columns([TrackSize::Auto, TrackSize::Star(1.0)]),
        )?;
        Grid::add(&mut core, grid, Fixed::new(80.0, 10.0), Cell::new(0, 0))?;
        Grid::add(&mut core, grid, Fixed::new(5.0, 10.0), Cell::new(0, 1))?;
        for width in [100.0, 300.0, f32::INFINITY] {
            core.measure(grid, Size::new(width, 50.0));
            let columns = core.widget::<Grid>(grid)?.track_sizes().1.to_vec();
            assert_eq!(columns[0], 80.0);
        }
        Ok(())
    }

    #[test]
    fn unbounded_height_sizes_rows_to_content() -> Result<()> {
        let mut core = Core::new();
        let grid = core.add_child(
            core.root(),
            Grid::new().with_rows([TrackSize::Star(1.0), TrackSize::Star(1.0)]),
        )?;
        Grid::add(&mut core, grid, Fixed::new(10.0, 15.0), Cell::new(0, 0))?;
        Grid::add(&mut core, grid, Fixed::new(10.0, 25.0), Cell::new(1, 0))?;
        let size = core.measure(grid, Size::new(100.0, f32::INFINITY));
        assert_eq!(size.h, 40.0);
        Ok(())
    }

    #[test]
    fn arrange_grows_star_rows_by_weight() -> Result<()> {
        let mut core = Core::new();
        core.set_viewport(Size::new(100.0, 100.0));
        let grid = core.add_child(
            core.root(),
            Grid::new().with_rows([
                TrackSize::Absolute(10.0),
                TrackSize::Star(1.0),
                TrackSize::Star(3.0),
            ]),
        )?;
        let a = Grid::add(&mut core, grid, Fixed::new(10.0, 5.0), Cell::new(1, 0))?;
        let b = Grid::add(&mut core, grid, Fixed::new(10.0, 5.0), Cell::new(2, 0))?;
        // Measured unbounded, then granted the full viewport.
        core.measure(grid, Size::new(100.0, f32::INFINITY));
        core.arrange(grid, Rect::new(0.0, 0.0, 100.0, 100.0));
        // Natural heights 5 and 5, plus 80 spare split 1:3.
        assert_eq!(core.bounds(a).map(|r| (r.y, r.h)), Some((10.0, 25.0)));
        assert_eq!(core.bounds(b).map(|r| (r.y, r.h)), Some((35.0, 65.0)));
        Ok(())
    }

    #[test]
    fn spans_include_spacing() -> Result<()> {
        let mut core = Core::new();
        core.set_viewport(Size::new(210.0, 100.0));
        let grid = core.add_child(
            core.root(),
            Grid::new()
                .with_columns([TrackSize::Absolute(100.0), TrackSize::Absolute(100.0)])
                .with_spacing(0.0, 10.0),
        )?;
        let wide = Grid::add(&mut core, grid, Fixed::new(1.0, 1.0), Cell::new(0, 0).span(1, 2))?;
        let right = Grid::add(&mut core, grid, Fixed::new(1.0, 1.0), Cell::new(0, 1))?;
        core.update_layout();
        assert_eq!(core.bounds(wide).map(|r| r.w), Some(210.0));
        assert_eq!(core.bounds(right).map(|r| r.x), Some(110.0));
        Ok(())
    }

    #[test]
    fn out_of_range_cells_are_clamped() -> Result<()> {
        let mut core = Core::new();
        core.set_viewport(Size::new(100.0, 100.0));
        let grid = core.add_child(
            core.root(),
            Grid::new().with_columns([TrackSize::Star(1.0), TrackSize::Star(1.0)]),
        )?;
        let c = Grid::add(&mut core, grid, Fixed::new(1.0, 1.0), Cell::new(9, 9).span(4, 4))?;
        core.update_layout();
        assert_eq!(core.bounds(c).map(|r| (r.x, r.w)), Some((50.0, 50.0)));
        Ok(())
    }

    #[test]
    fn empty_grid_measures_zero_and_detach_prunes() -> Result<()> {
        let mut core = Core::new();
        let grid = core.add_child(core.root(), Grid::new())?;
        assert_eq!(core.measure(grid, Size::new(100.0, 100.0)), Size::ZERO);
        let c = Grid::add(&mut core, grid, Fixed::new(1.0, 1.0), Cell::new(0, 0))?;
        assert_eq!(core.widget::<Grid>(grid)?.assigned(), 1);
        core.detach(c)?;
        assert_eq!(core.widget::<Grid>(grid)?.assigned(), 0);
        Ok(())
    }
}
