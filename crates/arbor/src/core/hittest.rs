use super::{id::NodeId, world::Core};
use crate::{
    event::HitRegion,
    geom::{Point, Rect},
};

/// The result of locating a screen point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Deepest node under the point.
    pub node: NodeId,
    /// Whether the point struck the node's tree bounds or its popup.
    pub region: HitRegion,
    /// The point in the hit node's local space, or the popup's space for popup hits.
    pub position: Point,
}

/// Spatial queries over the laid-out tree.
pub trait HitTester {
    /// Find the deepest node under `point`, starting at `node`.
    ///
    /// `point` is in the space of `node`'s bounds, i.e. its parent's local space. Hidden and
    /// disabled nodes are never hit, and neither is anything under them. Children are tested
    /// last to first so the topmost drawn child wins.
    fn hit_test(&self, node: NodeId, point: Point) -> Option<NodeId>;

    /// Locate a window point: open popups first, most recently opened first, then the tree.
    fn locate(&self, screen: Point) -> Option<Hit>;

    /// A node's top-left corner in window coordinates.
    fn screen_origin(&self, node: NodeId) -> Option<Point>;

    /// A node's bounds in window coordinates.
    fn screen_bounds(&self, node: NodeId) -> Option<Rect>;

    /// Convert a window point into a node's local space.
    fn to_local(&self, node: NodeId, screen: Point) -> Point;
}

impl HitTester for Core {
    fn hit_test(&self, node: NodeId, point: Point) -> Option<NodeId> {
        let n = self.nodes.get(node)?;
        if !n.visible || !n.enabled || !n.bounds.contains_point(point) {
            return None;
        }
        let local = point - n.bounds.origin() + n.scroll;
        n.children
            .iter()
            .rev()
            .find_map(|child| self.hit_test(*child, local))
            .or_else(|| n.hit_self.then_some(node))
    }

    fn locate(&self, screen: Point) -> Option<Hit> {
        for overlay in self.overlays.iter().rev() {
            if overlay.rect.contains_point(screen) && self.is_live(overlay.owner) {
                return Some(Hit {
                    node: overlay.owner,
                    region: HitRegion::Popup,
                    position: screen - overlay.rect.origin(),
                });
            }
        }
        let root = self.root();
        let node = self.hit_test(root, screen)?;
        Some(Hit {
            node,
            region: HitRegion::Content,
            position: self.to_local(node, screen),
        })
    }

    fn screen_origin(&self, node: NodeId) -> Option<Point> {
        let n = self.nodes.get(node)?;
        let mut origin = n.bounds.origin();
        let mut current = n.parent;
        while let Some(id) = current {
            let p = self.nodes.get(id)?;
            origin = origin + p.bounds.origin() - p.scroll;
            current = p.parent;
        }
        Some(origin)
    }

    fn screen_bounds(&self, node: NodeId) -> Option<Rect> {
        let origin = self.screen_origin(node)?;
        let size = self.nodes.get(node)?.bounds.size();
        Some(Rect::from_parts(origin, size))
    }

    fn to_local(&self, node: NodeId, screen: Point) -> Point {
        self.screen_origin(node)
            .map_or(screen, |origin| screen - origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::Result, geom::Size, testing::Fixed};

    #[test]
    fn topmost_child_wins() -> Result<()> {
        let mut core = Core::new();
        core.set_viewport(Size::new(100.0, 100.0));
        let root = core.root();
        let under = core.add_child(root, Fixed::new(50.0, 50.0).at(0.0, 0.0))?;
        let over = core.add_child(root, Fixed::new(50.0, 50.0).at(25.0, 25.0))?;
        core.update_layout();
        assert_eq!(core.hit_test(root, Point::new(30.0, 30.0)), Some(over));
        assert_eq!(core.hit_test(root, Point::new(10.0, 10.0)), Some(under));
        assert_eq!(core.hit_test(root, Point::new(90.0, 90.0)), None);
        Ok(())
    }

    #[test]
    fn edges_are_half_open() -> Result<()> {
        let mut core = Core::new();
        core.set_viewport(Size::new(100.0, 100.0));
        let a = core.add_child(core.root(), Fixed::new(10.0, 10.0).at(0.0, 0.0))?;
        core.update_layout();
        assert_eq!(core.hit_test(core.root(), Point::new(0.0, 0.0)), Some(a));
        assert_eq!(core.hit_test(core.root(), Point::new(10.0, 5.0)), None);
        Ok(())
    }

    #[test]
    fn transforms_account_for_nesting() -> Result<()> {
        let mut core = Core::new();
        core.set_viewport(Size::new(200.0, 200.0));
        let outer = core.add_child(core.root(), Fixed::new(100.0, 100.0).at(10.0, 20.0))?;
        let inner = core.add_child(outer, Fixed::new(10.0, 10.0).at(5.0, 5.0))?;
        core.update_layout();
        assert_eq!(core.screen_origin(inner), Some(Point::new(15.0, 25.0)));
        assert_eq!(
            core.to_local(inner, Point::new(16.0, 27.0)),
            Point::new(1.0, 2.0)
        );
        let hit = core.locate(Point::new(16.0, 27.0));
        assert_eq!(hit.map(|h| h.node), Some(inner));
        assert_eq!(hit.map(|h| h.position), Some(Point::new(1.0, 2.0)));
        Ok(())
    }

    #[test]
    fn disabled_blocks_subtree() -> Result<()> {
        let mut core = Core::new();
        core.set_viewport(Size::new(100.0, 100.0));
        let outer = core.add_child(core.root(), Fixed::new(50.0, 50.0).at(0.0, 0.0))?;
        core.add_child(outer, Fixed::new(10.0, 10.0).at(0.0, 0.0))?;
        core.update_layout();
        core.set_enabled(outer, false)?;
        assert_eq!(core.locate(Point::new(5.0, 5.0)), None);
        Ok(())
    }
}
