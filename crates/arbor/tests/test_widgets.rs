//! Integration tests driving a small form built from the widget catalog.

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    use arbor::{
        FocusManager, HitTester, NodeId,
        error::Result,
        event::KeyCode,
        panels::Stack,
        property::ItemSource,
        testing::Harness,
        widgets::{Button, CheckBox, Entry, ItemsView, Label, Slider},
    };

    /// Nodes of the form.
    struct Form {
        /// Name entry.
        name: NodeId,
        /// Subscribe checkbox.
        subscribe: NodeId,
        /// Volume slider.
        volume: NodeId,
        /// Submit button.
        submit: NodeId,
        /// Status line.
        status: NodeId,
    }

    fn form(h: &mut Harness, clicks: &Arc<AtomicUsize>) -> Result<Form> {
        let stack = h.add(Stack::vertical().with_spacing(4.0))?;
        let clicks = Arc::clone(clicks);
        let form = Form {
            name: h.add_to(stack, Entry::new().with_placeholder("name"))?,
            subscribe: h.add_to(stack, CheckBox::new("subscribe"))?,
            volume: h.add_to(stack, Slider::new(0.0, 100.0))?,
            submit: h.add_to(
                stack,
                Button::new("submit").with_on_click(move |_| {
                    clicks.fetch_add(1, Ordering::SeqCst);
                }),
            )?,
            status: h.add_to(stack, Label::new("idle"))?,
        };
        h.frame()?;
        Ok(form)
    }

    #[test]
    fn keyboard_only_form_fill() -> Result<()> {
        let mut h = Harness::new(300.0, 300.0);
        let clicks = Arc::new(AtomicUsize::new(0));
        let f = form(&mut h, &clicks)?;
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        h.window.core.subscribe(f.name, &Entry::TEXT, move |t: &String| {
            sink.lock().unwrap().push(t.clone());
        })?;

        h.key(KeyCode::Tab)?;
        assert_eq!(h.window.core.focused(), Some(f.name));
        h.text("ada")?;
        h.key(KeyCode::Backspace)?;
        assert_eq!(Entry::text_of(&mut h.window.core, f.name)?, "ad");
        assert_eq!(*seen.lock().unwrap(), vec!["ada", "ad"]);

        h.key(KeyCode::Tab)?;
        h.key(' ')?;
        assert!(CheckBox::checked(&mut h.window.core, f.subscribe)?);

        h.key(KeyCode::Tab)?;
        h.key(KeyCode::Right)?;
        h.key(KeyCode::Right)?;
        assert_eq!(Slider::value_of(&mut h.window.core, f.volume)?, 20.0);

        h.key(KeyCode::Tab)?;
        assert_eq!(h.window.core.focused(), Some(f.submit));
        h.key(KeyCode::Enter)?;
        assert_eq!(clicks.load(Ordering::SeqCst), 1);

        // Labels are not focusable, so Tab wraps to the entry.
        h.key(KeyCode::Tab)?;
        assert_eq!(h.window.core.focused(), Some(f.name));
        Ok(())
    }

    #[test]
    fn measure_properties_relayout_and_draw_properties_redraw() -> Result<()> {
        let mut h = Harness::new(300.0, 300.0);
        let clicks = Arc::new(AtomicUsize::new(0));
        let f = form(&mut h, &clicks)?;
        let before = h.window.core.desired(f.status).unwrap_or_default();

        assert!(Label::set_text(&mut h.window.core, f.status, "submitted")?);
        let report = h.frame()?;
        assert!(report.laid_out && report.drawn);
        assert!(h.window.core.desired(f.status).unwrap_or_default().w > before.w);
        assert!(h.canvas.texts().contains(&"submitted"));

        h.window.core.set_property(f.subscribe, &CheckBox::CHECKED, true)?;
        let report = h.frame()?;
        assert!(report.drawn && !report.laid_out);
        // Setting the same value again is not a change.
        assert!(!h.window.core.set_property(f.subscribe, &CheckBox::CHECKED, true)?);
        assert!(!h.frame()?.drawn);
        Ok(())
    }

    #[test]
    fn clicking_controls_focuses_them() -> Result<()> {
        let mut h = Harness::new(300.0, 300.0);
        let clicks = Arc::new(AtomicUsize::new(0));
        let f = form(&mut h, &clicks)?;
        let center = |h: &Harness, id| {
            let b = h.window.core.screen_bounds(id).unwrap_or_default();
            (b.x + b.w / 2.0, b.y + b.h / 2.0)
        };
        let (x, y) = center(&h, f.submit);
        h.click(x, y)?;
        assert_eq!(clicks.load(Ordering::SeqCst), 1);
        assert_eq!(h.window.core.focused(), Some(f.submit));
        let (x, y) = center(&h, f.subscribe);
        h.click(x, y)?;
        assert!(CheckBox::checked(&mut h.window.core, f.subscribe)?);
        assert_eq!(h.window.core.focused(), Some(f.subscribe));
        // A disabled control ignores clicks and loses focus.
        h.window.core.set_enabled(f.subscribe, false)?;
        assert_eq!(h.window.core.focused(), None);
        h.click(x, y)?;
        assert!(CheckBox::checked(&mut h.window.core, f.subscribe)?);
        Ok(())
    }

    #[test]
    fn list_subscribers_can_read_the_source_they_watch() -> Result<()> {
        let mut h = Harness::new(200.0, 200.0);
        let source = ItemSource::new(vec!["ant", "bee", "cat"]);
        let stack = h.add(Stack::vertical())?;
        h.add_to(stack, ItemsView::new(source.clone()))?;
        h.frame()?;
        let counts = Arc::new(Mutex::new(Vec::new()));
        let (reader, seen) = (source.clone(), Arc::clone(&counts));
        source.subscribe(move |_| {
            let names = reader.map(|s| s.len());
            seen.lock().unwrap().push((reader.len(), names.len()));
        });
        source.push("dog");
        assert_eq!(source.remove(0), Some("ant"));
        assert_eq!(*counts.lock().unwrap(), vec![(4, 4), (3, 3)]);
        h.frame()?;
        assert!(h.canvas.texts().contains(&"dog"));
        assert!(!h.canvas.texts().contains(&"ant"));
        Ok(())
    }
}
