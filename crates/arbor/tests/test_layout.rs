//! Integration tests for measure/arrange across panels.

#[cfg(test)]
mod tests {
    use arbor::{
        Core, HitTester,
        dump::{dump_plain, layout_table},
        error::Result,
        geom::{Rect, Size, Thickness},
        layout::{Align, Layout},
        panels::{AbsoluteLayout, AbsolutePlacement, Cell, Grid, Stack, TrackSize},
        testing::Fixed,
        widgets::Label,
    };

    /// A core with a viewport.
    fn core(w: f32, h: f32) -> Core {
        let mut core = Core::new();
        core.set_viewport(Size::new(w, h));
        core
    }

    #[test]
    fn stack_of_three_with_spacing() -> Result<()> {
        let mut core = core(200.0, 200.0);
        let stack = core.add_child(core.root(), Stack::vertical().with_spacing(5.0))?;
        for h in [20.0, 30.0, 40.0] {
            core.add_child(stack, Fixed::new(10.0, h))?;
        }
        assert_eq!(core.measure(stack, Size::new(200.0, f32::INFINITY)).h, 100.0);
        Ok(())
    }

    #[test]
    fn grid_splits_stars_after_absolute() -> Result<()> {
        let mut core = core(350.0, 100.0);
        let grid = core.add_child(
            core.root(),
            Grid::new().with_columns([
                TrackSize::Absolute(50.0),
                TrackSize::Star(1.0),
                TrackSize::Star(2.0),
            ]),
        )?;
        let cells: Vec<_> = (0..3)
            .map(|c| Grid::add(&mut core, grid, Fixed::new(1.0, 1.0), Cell::new(0, c)))
            .collect::<Result<_>>()?;
        core.update_layout();
        let widths: Vec<f32> = cells
            .iter()
            .map(|c| core.bounds(*c).map_or(0.0, |b| b.w))
            .collect();
        assert_eq!(widths, vec![50.0, 100.0, 200.0]);
        assert_eq!(core.bounds(cells[2]).map(|b| b.x), Some(150.0));
        Ok(())
    }

    #[test]
    fn auto_column_ignores_available_width() -> Result<()> {
        for width in [100.0, 500.0, 5000.0] {
            let mut core = core(width, 100.0);
            let grid = core.add_child(
                core.root(),
                Grid::new().with_columns([TrackSize::Auto, TrackSize::Star(1.0)]),
            )?;
            let child = Grid::add(&mut core, grid, Fixed::new(80.0, 10.0), Cell::new(0, 0))?;
            core.update_layout();
            assert_eq!(core.bounds(child).map(|b| b.w), Some(80.0));
        }
        Ok(())
    }

    #[test]
    fn measure_is_idempotent() -> Result<()> {
        let mut core = core(300.0, 300.0);
        let stack = core.add_child(core.root(), Stack::horizontal().with_spacing(3.0))?;
        core.add_child(stack, Label::new("hello"))?;
        core.add_child(stack, Fixed::new(25.0, 40.0))?;
        let available = Size::new(300.0, 300.0);
        let first = core.measure(stack, available);
        let second = core.measure(stack, available);
        assert_eq!(first, second);
        core.invalidate_measure(stack);
        assert_eq!(core.measure(stack, available), first);
        Ok(())
    }

    #[test]
    fn nan_availability_never_leaks() -> Result<()> {
        let mut core = core(300.0, 300.0);
        let label = core.add_child(core.root(), Label::new("abcde"))?;
        let size = core.measure(label, Size::new(f32::NAN, 100.0));
        assert!(size.w.is_finite() && size.h.is_finite());
        // Natural single-line width: five monospace columns at 14px.
        assert!((size.w - 5.0 * 14.0 * 0.6).abs() < 1e-4);
        core.arrange(label, Rect::new(f32::NAN, 0.0, f32::INFINITY, f32::NAN));
        let b = core.bounds(label).unwrap();
        assert!(b.x.is_finite() && b.y.is_finite() && b.w.is_finite() && b.h.is_finite());
        Ok(())
    }

    #[test]
    fn unusable_size_requests_are_ignored() -> Result<()> {
        let mut core = core(200.0, 200.0);
        let stack = core.add_child(core.root(), Stack::vertical())?;
        let tall = Layout::new().height(f32::INFINITY);
        let first = core.add_child(stack, Fixed::new(10.0, 10.0).with_layout(tall))?;
        let second = core.add_child(stack, Fixed::new(10.0, 10.0))?;
        let label = core.add_child(stack, Label::new("abcde"))?;
        core.set_layout_of(
            label,
            Layout::new()
                .width(f32::NAN)
                .height_range(Some(f32::INFINITY), Some(-3.0)),
        )?;
        core.update_layout();
        let desired = |core: &Core, id| core.node(id).map(|n| n.desired());
        assert_eq!(desired(&core, first), Some(Size::new(10.0, 10.0)));
        assert_eq!(core.bounds(first), Some(Rect::new(0.0, 0.0, 200.0, 10.0)));
        // The sibling lands below, not on top.
        assert_eq!(core.bounds(second), Some(Rect::new(0.0, 10.0, 200.0, 10.0)));
        let d = desired(&core, label).unwrap_or_default();
        assert!((d.w - 5.0 * 14.0 * 0.6).abs() < 1e-4);
        assert!(d.h.is_finite() && d.h > 0.0);
        let b = core.bounds(label).unwrap_or_default();
        assert!(b.w.is_finite() && b.h.is_finite());
        assert_eq!(b.y, 20.0);
        Ok(())
    }

    #[test]
    fn arrange_is_deterministic() -> Result<()> {
        let mut core = core(200.0, 100.0);
        let layout = Layout::new()
            .margin(Thickness::new(5.0, 5.0, 5.0, 5.0))
            .width(40.0)
            .align(Align::End, Align::Center);
        let leaf = core.add_child(core.root(), Fixed::new(10.0, 10.0).with_layout(layout))?;
        core.update_layout();
        let first = core.bounds(leaf);
        assert_eq!(first, Some(Rect::new(155.0, 45.0, 40.0, 10.0)));
        let slot = Rect::new(0.0, 0.0, 200.0, 100.0);
        core.arrange(leaf, slot);
        core.arrange(leaf, slot);
        assert_eq!(core.bounds(leaf), first);
        Ok(())
    }

    #[test]
    fn nested_panels_compose() -> Result<()> {
        let mut core = core(400.0, 300.0);
        let grid = core.add_child(
            core.root(),
            Grid::new()
                .with_rows([TrackSize::Auto, TrackSize::Star(1.0)])
                .with_columns([TrackSize::Star(1.0), TrackSize::Star(1.0)]),
        )?;
        let header = Grid::add(
            &mut core,
            grid,
            Fixed::new(10.0, 30.0),
            Cell::new(0, 0).span(1, 2),
        )?;
        let stack = Grid::add(&mut core, grid, Stack::vertical(), Cell::new(1, 0))?;
        let a = core.add_child(stack, Fixed::new(50.0, 20.0))?;
        let canvas = Grid::add(&mut core, grid, AbsoluteLayout::new(), Cell::new(1, 1))?;
        let pinned = AbsoluteLayout::add(
            &mut core,
            canvas,
            Fixed::new(10.0, 10.0),
            AbsolutePlacement::at(15.0, 25.0),
        )?;
        core.update_layout();
        assert_eq!(core.bounds(header), Some(Rect::new(0.0, 0.0, 400.0, 30.0)));
        assert_eq!(core.screen_bounds(a), Some(Rect::new(0.0, 30.0, 200.0, 20.0)));
        assert_eq!(
            core.screen_bounds(pinned),
            Some(Rect::new(215.0, 55.0, 10.0, 10.0))
        );
        let table = layout_table(&core, core.root());
        assert!(table.contains("stack"));
        let dump = dump_plain(&core, core.root())?;
        assert!(dump.contains("grid"));
        assert!(dump.contains("absolute_layout"));
        Ok(())
    }
}
