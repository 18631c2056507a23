use tracing::{debug, trace, warn};

use super::{
    config::Config, focus::FocusManager, hittest::HitTester, id::NodeId, popup::PopupManager,
    render::Canvas, world::Core,
};
use crate::{
    error::Result,
    event::{Button, Event, HitRegion, InputEvent, Key, Mods, PointerAction, PointerEvent, ScrollEvent},
    geom::Point,
    widget::EventOutcome,
};

/// What a call to [`Window::frame`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// A measure/arrange pass ran.
    pub laid_out: bool,
    /// The tree was drawn.
    pub drawn: bool,
    /// Some node asked for layout while drawing and a follow-up pass is pending.
    pub relayout_scheduled: bool,
    /// Nodes that kept asking for layout past the configured limit. Their latest measurement
    /// was accepted and no follow-up was scheduled for them.
    pub unstable: Vec<NodeId>,
}

/// One window: the tree plus the input and frame drivers around it.
pub struct Window {
    /// Core state.
    pub core: Core,
}

impl Default for Window {
    fn default() -> Self {
        Self::new()
    }
}

impl Window {
    /// A window with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// A window with an explicit configuration.
    pub fn with_config(config: Config) -> Self {
        Self {
            core: Core::with_config(config),
        }
    }

    /// Is a layout or draw pending?
    pub fn needs_frame(&mut self) -> bool {
        self.core.drain_invalidations();
        self.core.needs_draw()
    }

    /// Route one host input event.
    ///
    /// Layout is brought up to date first so that hit-testing sees current bounds.
    pub fn handle(&mut self, input: InputEvent) -> Result<EventOutcome> {
        if let InputEvent::Resize(size) = input {
            self.core.set_viewport(size);
            return Ok(EventOutcome::Handle);
        }
        self.core.drain_invalidations();
        self.core.layout_if_needed();
        match input {
            InputEvent::PointerPressed {
                position,
                button,
                mods,
            } => self.pointer_pressed(position, button, mods),
            InputEvent::PointerMoved { position, mods } => self.pointer_moved(position, mods),
            InputEvent::PointerReleased {
                position,
                button,
                mods,
            } => self.pointer_released(position, button, mods),
            InputEvent::Scroll {
                position,
                delta,
                mods,
            } => self.scroll(position, delta, mods),
            InputEvent::KeyDown(key) => self.key_down(key),
            InputEvent::KeyUp(key) => self.dispatch_to_focus(&Event::KeyUp(key)),
            InputEvent::Text(text) => self.dispatch_to_focus(&Event::Text(text)),
            InputEvent::Resize(_) => Ok(EventOutcome::Handle),
        }
    }

    /// Lay out if needed, then draw the tree and its popups.
    ///
    /// Drawing may request another layout. The driver re-measures the requesting nodes on the
    /// next frame; a node that requests on more than `max_relayout_passes` consecutive frames
    /// is left as it is and reported in [`FrameReport::unstable`].
    pub fn frame(&mut self, canvas: &mut dyn Canvas) -> Result<FrameReport> {
        self.core.drain_invalidations();
        let laid_out = self.core.layout_if_needed();
        let mut report = FrameReport {
            laid_out,
            ..FrameReport::default()
        };
        if !laid_out && !self.core.needs_draw() {
            trace!("frame skipped: nothing dirty");
            return Ok(report);
        }
        let requests = self.core.draw(canvas)?;
        report.drawn = true;
        let limit = self.core.config().max_relayout_passes;
        for id in &requests {
            let streak = self.core.bump_relayout_streak(*id);
            if streak > limit {
                warn!(?id, streak, "layout did not converge; accepting last measurement");
                report.unstable.push(*id);
            } else {
                debug!(?id, streak, "follow-up layout requested from draw");
                self.core.invalidate_measure(*id);
                report.relayout_scheduled = true;
            }
        }
        self.core.reset_relayout_streaks(&requests);
        Ok(report)
    }

    /// Target for pointer events: the capturing node while it is live, else the hit node.
    fn pointer_target(&self, hit: Option<NodeId>) -> Option<NodeId> {
        self.core
            .pointer_capture()
            .filter(|id| self.core.is_live(*id))
            .or(hit)
    }

    /// Build a pointer event. The core localizes it for each receiver.
    fn pointer_event(action: PointerAction, button: Button, screen: Point, mods: Mods) -> Event {
        Event::Pointer(PointerEvent {
            action,
            button,
            position: screen,
            screen,
            region: HitRegion::Content,
            mods,
        })
    }

    /// Ask every popup not owned by the hit node or one of its ancestors to close.
    fn light_dismiss(&mut self, hit: Option<NodeId>) {
        let owners: Vec<NodeId> = self.core.popups().iter().map(|o| o.owner).collect();
        for owner in owners {
            let keeps = hit.is_some_and(|h| h == owner || self.core.is_ancestor(owner, h));
            if !keeps {
                trace!(?owner, "light dismiss");
                self.core.deliver(owner, Event::DismissPopup);
            }
        }
    }

    /// Handle a button press.
    fn pointer_pressed(&mut self, screen: Point, button: Button, mods: Mods) -> Result<EventOutcome> {
        let hit = self.core.locate(screen).map(|h| h.node);
        if self.core.config().dismiss_popups_on_outside_press {
            self.light_dismiss(hit);
        }
        if button == Button::Left {
            match hit.and_then(|h| self.core.nearest_focusable(h)) {
                Some(target) => {
                    self.core.set_focus(target)?;
                }
                None => {
                    self.core.blur();
                }
            }
            self.core.set_pressed(hit);
        }
        let Some(target) = self.pointer_target(hit) else {
            return Ok(EventOutcome::Ignore);
        };
        let event = Self::pointer_event(PointerAction::Pressed, button, screen, mods);
        self.core.dispatch_event(target, &event)
    }

    /// Handle pointer motion.
    fn pointer_moved(&mut self, screen: Point, mods: Mods) -> Result<EventOutcome> {
        let hit = self.core.locate(screen).map(|h| h.node);
        self.core.set_hovered(hit);
        let Some(target) = self.pointer_target(hit) else {
            return Ok(EventOutcome::Ignore);
        };
        let event = Self::pointer_event(PointerAction::Moved, Button::None, screen, mods);
        self.core.dispatch_event(target, &event)
    }

    /// Handle a button release. Capture and press state end here.
    fn pointer_released(
        &mut self,
        screen: Point,
        button: Button,
        mods: Mods,
    ) -> Result<EventOutcome> {
        let hit = self.core.locate(screen).map(|h| h.node);
        let outcome = match self.pointer_target(hit) {
            Some(target) => {
                let event = Self::pointer_event(PointerAction::Released, button, screen, mods);
                self.core.dispatch_event(target, &event)
            }
            None => Ok(EventOutcome::Ignore),
        };
        if button == Button::Left {
            self.core.set_pressed(None);
        }
        self.core.release_pointer();
        outcome
    }

    /// Handle a wheel or touchpad scroll.
    fn scroll(&mut self, screen: Point, delta: Point, mods: Mods) -> Result<EventOutcome> {
        let Some(target) = self.core.locate(screen).map(|h| h.node) else {
            return Ok(EventOutcome::Ignore);
        };
        let event = Event::Scroll(ScrollEvent {
            delta,
            position: screen,
            screen,
            mods,
        });
        self.core.dispatch_event(target, &event)
    }

    /// Handle a key press: focused node first, then Tab navigation.
    fn key_down(&mut self, key: Key) -> Result<EventOutcome> {
        let outcome = self.dispatch_to_focus(&Event::KeyDown(key))?;
        if outcome.is_handled() || !self.core.config().tab_navigation {
            return Ok(outcome);
        }
        let moved = if key.is_back_tab() {
            self.core.focus_prev()
        } else if key.is_tab() {
            self.core.focus_next()
        } else {
            return Ok(outcome);
        };
        Ok(if moved {
            EventOutcome::Handle
        } else {
            EventOutcome::Consume
        })
    }

    /// Deliver a keyboard or text event to the focused node, or the root, and bubble.
    fn dispatch_to_focus(&mut self, event: &Event) -> Result<EventOutcome> {
        let target = self
            .core
            .focused()
            .filter(|id| self.core.is_live(*id))
            .unwrap_or_else(|| self.core.root());
        self.core.dispatch_event(target, event)
    }
}
