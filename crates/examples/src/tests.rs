use arbor::{
    FocusManager, PopupManager,
    error::Result,
    event::{Key, KeyCode, Mods},
    testing::Harness,
};
use chrono::NaiveDate;

use crate::{
    formgym::FormGym,
    popupgym::PopupGym,
    script::{self, Step, parse_key},
};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid date")
}

#[test]
fn script_steps_parse() -> Result<()> {
    let steps = script::parse("click:1,2 key:shift-tab text:hey scroll:3,4,-1 frame")?;
    assert_eq!(
        steps,
        vec![
            Step::Click(1.0, 2.0),
            Step::Key(Key::new(Mods::SHIFT, KeyCode::Tab)),
            Step::Text("hey".into()),
            Step::Scroll(3.0, 4.0, -1.0),
            Step::Frame,
        ]
    );
    assert_eq!(parse_key("ctrl-c")?, Key::new(Mods::CTRL, KeyCode::Char('c')));
    assert!(script::parse("click:1").is_err());
    assert!(script::parse("jump").is_err());
    assert!(parse_key("nosuchkey").is_err());
    Ok(())
}

#[test]
fn formgym_keyboard_fill() -> Result<()> {
    let mut h = Harness::new(360.0, 420.0);
    let form = FormGym::build(&mut h, start())?;
    let steps = script::parse(
        "key:tab text:ada key:tab key:space key:tab key:right key:tab key:down \
         key:tab key:tab key:enter",
    )?;
    script::run(&mut h, &steps)?;
    assert_eq!(h.window.core.focused(), Some(form.submit));
    assert_eq!(form.submissions(), 1);
    assert_eq!(form.history_len(), 1);
    assert_eq!(
        form.summary(&mut h)?,
        "name=\"ada\" newsletter=true volume=60 color=red start=2024-03-15"
    );
    form.refresh_status(&mut h)?;
    assert!(h.canvas.find_text("submission 1").is_some());
    Ok(())
}

#[test]
fn popupgym_bottom_dropdown_flips_above() -> Result<()> {
    let mut h = Harness::new(400.0, 260.0);
    let gym = PopupGym::build(&mut h, start())?;
    let steps = script::parse("click:20,240")?;
    script::run(&mut h, &steps)?;
    let rect = h.window.core.popup_rect(gym.bottom).expect("bottom popup open");
    assert!(rect.bottom() <= 230.0);
    assert!(gym.popup_table(&h).contains("bottom"));
    // Opening another popup light-dismisses the first.
    script::run(&mut h, &script::parse("click:20,20")?)?;
    assert_eq!(h.window.core.popup_rect(gym.bottom), None);
    assert!(h.window.core.popup_rect(gym.top).is_some());
    Ok(())
}
