use tracing::debug;

use super::{hittest::HitTester, id::NodeId, world::Core};
use crate::{
    error::{Error, Result},
    event::Event,
    geom::{Direction, Rect},
};

/// Focus management for the Core arena.
pub trait FocusManager {
    /// The focused node, if any.
    fn focused(&self) -> Option<NodeId>;

    /// Does the node hold focus?
    fn is_focused(&self, node: NodeId) -> bool;

    /// A counter bumped on every focus change.
    fn focus_generation(&self) -> u64;

    /// Can the node take focus right now? It must be attached, focusable, and effectively
    /// visible and enabled.
    fn can_focus(&self, node: NodeId) -> bool;

    /// Focus a node, sending `FocusLost` to the previous holder before `FocusGained` to the
    /// new one. Returns `true` if focus changed.
    fn set_focus(&mut self, node: NodeId) -> Result<bool>;

    /// Clear focus. Returns `true` if a node lost focus.
    fn blur(&mut self) -> bool;

    /// Every node that can take focus, in pre-order. Hidden and disabled subtrees are skipped.
    fn focusable_nodes(&self) -> Vec<NodeId>;

    /// Focus the first focusable node. Returns `true` if focus changed.
    fn focus_first(&mut self) -> bool;

    /// Focus the next focusable node in pre-order, wrapping at the end.
    fn focus_next(&mut self) -> bool;

    /// Focus the previous focusable node in pre-order, wrapping at the start.
    fn focus_prev(&mut self) -> bool;

    /// Move focus to the nearest focusable node in a screen direction.
    fn focus_dir(&mut self, dir: Direction) -> bool;

    /// The node itself if it can take focus, else its nearest ancestor that can.
    fn nearest_focusable(&self, node: NodeId) -> Option<NodeId>;

    /// Clear focus that no longer satisfies `can_focus`.
    fn ensure_focus_valid(&mut self);
}

impl FocusManager for Core {
    fn focused(&self) -> Option<NodeId> {
        self.focus
    }

    fn is_focused(&self, node: NodeId) -> bool {
        self.focus == Some(node)
    }

    fn focus_generation(&self) -> u64 {
        self.focus_gen
    }

    fn can_focus(&self, node: NodeId) -> bool {
        self.nodes.get(node).is_some_and(|n| n.focusable) && self.is_live(node)
    }

    fn set_focus(&mut self, node: NodeId) -> Result<bool> {
        if !self.contains(node) {
            return Err(Error::NodeNotFound(node));
        }
        if !self.can_focus(node) {
            return Err(Error::NotFocusable(node));
        }
        if self.focus == Some(node) {
            return Ok(false);
        }
        let prev = self.focus.replace(node);
        self.focus_gen = self.focus_gen.saturating_add(1);
        debug!(?prev, ?node, "focus changed");
        if let Some(prev) = prev.filter(|p| self.contains(*p)) {
            self.deliver(prev, Event::FocusLost);
            self.refresh_visual_state(prev);
        }
        self.deliver(node, Event::FocusGained);
        self.refresh_visual_state(node);
        self.needs_draw = true;
        Ok(true)
    }

    fn blur(&mut self) -> bool {
        let Some(prev) = self.focus.take() else {
            return false;
        };
        self.focus_gen = self.focus_gen.saturating_add(1);
        debug!(?prev, "focus cleared");
        if self.contains(prev) {
            self.deliver(prev, Event::FocusLost);
            self.refresh_visual_state(prev);
        }
        self.needs_draw = true;
        true
    }

    fn focusable_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            if !node.visible || !node.enabled {
                continue;
            }
            if node.focusable {
                out.push(id);
            }
            stack.extend(node.children.iter().rev());
        }
        out
    }

    fn focus_first(&mut self) -> bool {
        self.focusable_nodes()
            .first()
            .is_some_and(|id| self.set_focus(*id).unwrap_or(false))
    }

    fn focus_next(&mut self) -> bool {
        let order = self.focusable_nodes();
        let target = step(&order, self.focus, |i, n| (i + 1) % n, 0);
        target.is_some_and(|id| self.set_focus(id).unwrap_or(false))
    }

    fn focus_prev(&mut self) -> bool {
        let order = self.focusable_nodes();
        let last = order.len().saturating_sub(1);
        let target = step(&order, self.focus, |i, n| (i + n - 1) % n, last);
        target.is_some_and(|id| self.set_focus(id).unwrap_or(false))
    }

    fn focus_dir(&mut self, dir: Direction) -> bool {
        let order = self.focusable_nodes();
        let Some(current) = self.focus.filter(|f| order.contains(f)) else {
            return self.focus_first();
        };
        let Some(from) = self.screen_bounds(current) else {
            return false;
        };
        let best = order
            .into_iter()
            .filter(|id| *id != current)
            .filter_map(|id| self.screen_bounds(id).map(|r| (id, r)))
            .filter_map(|(id, r)| directional_score(from, r, dir).map(|s| (id, s)))
            .min_by(|a, b| a.1.total_cmp(&b.1));
        best.is_some_and(|(id, _)| self.set_focus(id).unwrap_or(false))
    }

    fn nearest_focusable(&self, node: NodeId) -> Option<NodeId> {
        self.ancestors_inclusive(node)
            .into_iter()
            .find(|id| self.can_focus(*id))
    }

    fn ensure_focus_valid(&mut self) {
        if self.focus.is_some_and(|f| !self.can_focus(f)) {
            self.blur();
        }
    }
}

/// Pick the neighbour of `current` in `order` using `advance`, or `fallback` when nothing in
/// `order` holds focus.
fn step(
    order: &[NodeId],
    current: Option<NodeId>,
    advance: impl Fn(usize, usize) -> usize,
    fallback: usize,
) -> Option<NodeId> {
    if order.is_empty() {
        return None;
    }
    let index = current
        .and_then(|c| order.iter().position(|id| *id == c))
        .map_or(fallback, |i| advance(i, order.len()));
    order.get(index).copied()
}

/// Score a candidate for directional navigation. Lower is better; `None` means the candidate
/// is not in that direction or does not overlap on the cross axis.
fn directional_score(from: Rect, to: Rect, dir: Direction) -> Option<f32> {
    let center = |r: Rect| (r.x + r.w / 2.0, r.y + r.h / 2.0);
    let (fx, fy) = center(from);
    let (tx, ty) = center(to);
    let overlaps_v = to.y < from.bottom() && from.y < to.bottom();
    let overlaps_h = to.x < from.right() && from.x < to.right();
    let (ahead, overlap, edge, cross) = match dir {
        Direction::Right => (tx > fx, overlaps_v, to.x - from.right(), (ty - fy).abs()),
        Direction::Left => (tx < fx, overlaps_v, from.x - to.right(), (ty - fy).abs()),
        Direction::Down => (ty > fy, overlaps_h, to.y - from.bottom(), (tx - fx).abs()),
        Direction::Up => (ty < fy, overlaps_h, from.y - to.bottom(), (tx - fx).abs()),
    };
    (ahead && overlap).then(|| edge.max(0.0) * 10_000.0 + cross)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{geom::Size, testing::Fixed};

    fn row(core: &mut Core, n: usize) -> Result<Vec<NodeId>> {
        let root = core.root();
        (0..n)
            .map(|_| core.add_child(root, Fixed::new(10.0, 10.0).focusable()))
            .collect()
    }

    #[test]
    fn next_and_prev_wrap() -> Result<()> {
        let mut core = Core::new();
        let ids = row(&mut core, 3)?;
        assert!(core.focus_next());
        assert_eq!(core.focused(), Some(ids[0]));
        core.focus_next();
        core.focus_next();
        assert_eq!(core.focused(), Some(ids[2]));
        core.focus_next();
        assert_eq!(core.focused(), Some(ids[0]));
        core.focus_prev();
        assert_eq!(core.focused(), Some(ids[2]));
        Ok(())
    }

    #[test]
    fn hidden_and_disabled_are_skipped() -> Result<()> {
        let mut core = Core::new();
        let ids = row(&mut core, 3)?;
        core.set_visible(ids[1], false)?;
        assert_eq!(core.focusable_nodes(), vec![ids[0], ids[2]]);
        assert_eq!(core.set_focus(ids[1]), Err(Error::NotFocusable(ids[1])));
        core.set_visible(ids[1], true)?;
        core.set_focus(ids[1])?;
        core.set_enabled(core.root(), false)?;
        assert_eq!(core.focused(), None);
        assert!(core.focusable_nodes().is_empty());
        Ok(())
    }

    #[test]
    fn detached_nodes_cannot_focus() -> Result<()> {
        let mut core = Core::new();
        let loose = core.add(Fixed::new(1.0, 1.0).focusable());
        assert_eq!(core.set_focus(loose), Err(Error::NotFocusable(loose)));
        let plain = core.add_child(core.root(), Fixed::new(1.0, 1.0))?;
        assert_eq!(core.set_focus(plain), Err(Error::NotFocusable(plain)));
        Ok(())
    }

    #[test]
    fn focus_moves_in_a_direction() -> Result<()> {
        let mut core = Core::new();
        core.set_viewport(Size::new(100.0, 100.0));
        let root = core.root();
        let tl = core.add_child(root, Fixed::new(10.0, 10.0).focusable().at(0.0, 0.0))?;
        let tr = core.add_child(root, Fixed::new(10.0, 10.0).focusable().at(50.0, 0.0))?;
        let bl = core.add_child(root, Fixed::new(10.0, 10.0).focusable().at(0.0, 50.0))?;
        core.update_layout();
        core.set_focus(tl)?;
        assert!(core.focus_dir(Direction::Right));
        assert_eq!(core.focused(), Some(tr));
        assert!(!core.focus_dir(Direction::Up));
        core.set_focus(tl)?;
        assert!(core.focus_dir(Direction::Down));
        assert_eq!(core.focused(), Some(bl));
        Ok(())
    }

    #[test]
    fn nearest_focusable_walks_up() -> Result<()> {
        let mut core = Core::new();
        let outer = core.add_child(core.root(), Fixed::new(20.0, 20.0).focusable())?;
        let inner = core.add_child(outer, Fixed::new(5.0, 5.0))?;
        assert_eq!(core.nearest_focusable(inner), Some(outer));
        assert_eq!(core.nearest_focusable(core.root()), None);
        Ok(())
    }
}
