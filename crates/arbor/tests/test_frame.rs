//! Integration tests for frame scheduling and layout convergence.

#[cfg(test)]
mod tests {
    use std::thread;

    use arbor::{
        DrawContext, LayoutContext, NodeId, Widget,
        config::Config,
        error::Result,
        geom::Size,
        render::Canvas,
        testing::{Fixed, Harness},
    };

    /// Grows once on its first draw, then settles.
    struct GrowOnce {
        /// Current natural width.
        width: f32,
        /// Width after the first draw.
        target: f32,
    }

    impl Widget for GrowOnce {
        fn measure(&mut self, _ctx: &mut LayoutContext<'_>, _available: Size) -> Size {
            Size::new(self.width, 10.0)
        }

        fn draw(&mut self, _canvas: &mut dyn Canvas, ctx: &DrawContext<'_>) -> Result<()> {
            if self.width < self.target {
                self.width = self.target;
                ctx.request_layout();
            }
            Ok(())
        }
    }

    /// Never satisfied: asks for another layout on every draw.
    struct Restless {
        /// Draw count.
        draws: u32,
    }

    impl Widget for Restless {
        fn measure(&mut self, _ctx: &mut LayoutContext<'_>, _available: Size) -> Size {
            Size::new(10.0 + self.draws as f32, 10.0)
        }

        fn draw(&mut self, _canvas: &mut dyn Canvas, ctx: &DrawContext<'_>) -> Result<()> {
            self.draws += 1;
            ctx.request_layout();
            Ok(())
        }
    }

    /// Width a node was arranged at.
    fn width(h: &Harness, id: NodeId) -> Option<f32> {
        h.window.core.bounds(id).map(|b| b.w)
    }

    #[test]
    fn a_draw_time_request_gets_one_follow_up() -> Result<()> {
        let mut h = Harness::new(200.0, 100.0);
        let panel = h.add(Fixed::new(0.0, 0.0).at(0.0, 0.0))?;
        let grow = h.add_to(panel, GrowOnce { width: 20.0, target: 50.0 })?;
        let first = h.frame()?;
        assert!(first.laid_out && first.drawn && first.relayout_scheduled);
        assert_eq!(width(&h, grow), Some(20.0));
        let second = h.frame()?;
        assert!(second.laid_out && !second.relayout_scheduled);
        assert!(second.unstable.is_empty());
        assert_eq!(width(&h, grow), Some(50.0));
        let third = h.frame()?;
        assert!(!third.laid_out && !third.drawn);
        Ok(())
    }

    #[test]
    fn endless_requests_are_cut_off() -> Result<()> {
        let mut h = Harness::new(200.0, 100.0);
        let node = h.add(Restless { draws: 0 })?;
        let mut reports = Vec::new();
        for _ in 0..5 {
            reports.push(h.frame()?);
        }
        // Three follow-ups are honoured, the fourth request is refused.
        let scheduled: Vec<bool> = reports.iter().map(|r| r.relayout_scheduled).collect();
        assert_eq!(scheduled, vec![true, true, true, false, false]);
        assert_eq!(reports[3].unstable, vec![node]);
        assert!(!reports[4].drawn);
        assert!(!h.window.needs_frame());
        Ok(())
    }

    #[test]
    fn relayout_limit_is_configurable() -> Result<()> {
        let config = Config {
            max_relayout_passes: 1,
            ..Config::default()
        };
        let mut h = Harness::builder().size(100.0, 100.0).config(config).build();
        let node = h.add(Restless { draws: 0 })?;
        assert!(h.frame()?.relayout_scheduled);
        assert_eq!(h.frame()?.unstable, vec![node]);
        Ok(())
    }

    #[test]
    fn invalidators_work_across_threads() -> Result<()> {
        let mut h = Harness::new(100.0, 100.0);
        let node = h.add(Fixed::new(10.0, 10.0))?;
        h.frame()?;
        assert!(!h.window.needs_frame());
        let invalidator = h.window.core.invalidator();
        thread::spawn(move || invalidator.invalidate(node))
            .join()
            .expect("sender thread");
        assert!(h.window.needs_frame());
        let report = h.frame()?;
        assert!(report.drawn && !report.laid_out);

        let invalidator = h.window.core.invalidator();
        invalidator.invalidate_measure(node);
        let report = h.frame()?;
        assert!(report.drawn && report.laid_out);
        Ok(())
    }

    #[test]
    fn resize_relayouts_against_the_new_viewport() -> Result<()> {
        let mut h = Harness::new(100.0, 100.0);
        let node = h.add(Fixed::new(10.0, 10.0))?;
        h.frame()?;
        assert_eq!(width(&h, node), Some(100.0));
        h.resize(300.0, 50.0)?;
        assert!(h.frame()?.laid_out);
        assert_eq!(width(&h, node), Some(300.0));
        Ok(())
    }
}
