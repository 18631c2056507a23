//! Integration tests for hit-testing through the window.

#[cfg(test)]
mod tests {
    use arbor::{
        HitTester, PopupManager,
        error::Result,
        event::HitRegion,
        geom::{Point, Rect},
        panels::{AbsoluteLayout, AbsolutePlacement, Stack},
        testing::{Fixed, Harness},
        widgets::Dropdown,
    };

    /// Node under a window point.
    fn node_at(h: &Harness, x: f32, y: f32) -> Option<arbor::NodeId> {
        h.window.core.locate(Point::new(x, y)).map(|hit| hit.node)
    }

    #[test]
    fn last_added_sibling_wins_overlap() -> Result<()> {
        let mut h = Harness::new(100.0, 100.0);
        let panel = h.add(AbsoluteLayout::new())?;
        let core = &mut h.window.core;
        let square = || Fixed::new(50.0, 50.0);
        let below = AbsoluteLayout::add(core, panel, square(), AbsolutePlacement::at(0.0, 0.0))?;
        let above = AbsoluteLayout::add(core, panel, square(), AbsolutePlacement::at(25.0, 25.0))?;
        h.frame()?;
        assert_eq!(node_at(&h, 10.0, 10.0), Some(below));
        assert_eq!(node_at(&h, 30.0, 30.0), Some(above));
        assert_eq!(node_at(&h, 60.0, 60.0), Some(above));
        // Uncovered panel background belongs to the panel.
        assert_eq!(node_at(&h, 90.0, 10.0), Some(panel));
        Ok(())
    }

    #[test]
    fn container_background_is_a_target() -> Result<()> {
        let mut h = Harness::new(100.0, 100.0);
        let outer = h.add(Fixed::new(80.0, 80.0).at(0.0, 0.0))?;
        let inner = h.add_to(outer, Fixed::new(20.0, 20.0).at(10.0, 10.0))?;
        h.frame()?;
        let hit = h.window.core.locate(Point::new(15.0, 12.0));
        assert_eq!(hit.map(|h| h.node), Some(inner));
        assert_eq!(hit.map(|h| h.position), Some(Point::new(5.0, 2.0)));
        assert_eq!(node_at(&h, 50.0, 50.0), Some(outer));
        assert_eq!(node_at(&h, 90.0, 90.0), None);
        Ok(())
    }

    #[test]
    fn panel_claims_points_its_children_miss() -> Result<()> {
        let mut h = Harness::new(100.0, 100.0);
        let stack = h.add(Stack::vertical())?;
        let row = h.add_to(stack, Fixed::new(10.0, 10.0))?;
        h.frame()?;
        assert_eq!(h.window.core.screen_bounds(stack), Some(Rect::new(0.0, 0.0, 100.0, 100.0)));
        assert_eq!(node_at(&h, 5.0, 5.0), Some(row));
        let hit = h.window.core.locate(Point::new(50.0, 50.0)).expect("stack hit");
        assert_eq!(hit.node, stack);
        assert_eq!(hit.region, HitRegion::Content);
        assert_eq!(hit.position, Point::new(50.0, 50.0));
        Ok(())
    }

    #[test]
    fn hidden_and_disabled_subtrees_are_transparent() -> Result<()> {
        let mut h = Harness::new(100.0, 100.0);
        let back = h.add(Fixed::new(100.0, 100.0))?;
        let front = h.add(Fixed::new(100.0, 100.0))?;
        let leaf = h.add_to(front, Fixed::new(10.0, 10.0).at(0.0, 0.0))?;
        h.frame()?;
        assert_eq!(node_at(&h, 5.0, 5.0), Some(leaf));
        h.window.core.set_enabled(front, false)?;
        assert_eq!(node_at(&h, 5.0, 5.0), Some(back));
        h.window.core.set_enabled(front, true)?;
        h.window.core.set_visible(front, false)?;
        h.frame()?;
        assert_eq!(node_at(&h, 5.0, 5.0), Some(back));
        Ok(())
    }

    #[test]
    fn popups_hit_before_the_tree() -> Result<()> {
        let mut h = Harness::new(200.0, 200.0);
        let stack = h.add(Stack::vertical())?;
        let dropdown = h.add_to(stack, Dropdown::new(["one", "two", "three"]))?;
        let filler = h.add_to(stack, Fixed::new(10.0, 150.0))?;
        h.frame()?;
        let owner = h.window.core.screen_bounds(dropdown).unwrap_or_default();
        h.click(owner.x + 5.0, owner.y + 5.0)?;
        let popup = h.window.core.popup_rect(dropdown).expect("popup open");
        assert!(popup.y >= owner.bottom());
        let inside = Point::new(popup.x + 5.0, popup.y + 5.0);
        let hit = h.window.core.locate(inside).expect("popup hit");
        assert_eq!(hit.node, dropdown);
        assert_eq!(hit.region, HitRegion::Popup);
        assert!((hit.position.x - 5.0).abs() < 1e-4 && (hit.position.y - 5.0).abs() < 1e-4);
        // The popup covers the filler beneath it until it closes.
        h.window.core.close_popup(dropdown);
        assert_eq!(h.window.core.locate(inside).map(|h| h.node), Some(filler));
        assert!(h.window.core.popups().is_empty());
        assert_eq!(h.window.core.popup_rect(dropdown), None::<Rect>);
        Ok(())
    }
}
