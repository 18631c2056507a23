use std::{num::ParseFloatError, result::Result as StdResult};

use arbor::{
    EventOutcome,
    error::{Error, Result},
    event::{Key, KeyCode, Mods},
    testing::Harness,
};

/// One scripted input.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Press and release at a window point.
    Click(f32, f32),
    /// Move the pointer.
    Move(f32, f32),
    /// Scroll by notches at a point.
    Scroll(f32, f32, f32),
    /// A key press.
    Key(Key),
    /// Committed text.
    Text(String),
    /// Run a frame.
    Frame,
}

/// Parse a list of numbers separated by commas.
fn numbers<const N: usize>(arg: &str) -> Result<[f32; N]> {
    let parsed: Vec<f32> = arg
        .split(',')
        .map(|v| v.trim().parse::<f32>())
        .collect::<StdResult<_, ParseFloatError>>()
        .map_err(|e| Error::Invalid(format!("{arg:?}: {e}")))?;
    parsed
        .try_into()
        .map_err(|_| Error::Invalid(format!("{arg:?}: expected {N} numbers")))
}

/// Parse a key name: a single character, or one of the named keys, with optional `ctrl-`,
/// `alt-` and `shift-` prefixes.
pub fn parse_key(spec: &str) -> Result<Key> {
    let mut mods = Mods::NONE;
    let mut rest = spec;
    loop {
        if let Some(r) = rest.strip_prefix("ctrl-") {
            mods = mods + Mods::CTRL;
            rest = r;
        } else if let Some(r) = rest.strip_prefix("alt-") {
            mods = mods + Mods::ALT;
            rest = r;
        } else if let Some(r) = rest.strip_prefix("shift-") {
            mods = mods + Mods::SHIFT;
            rest = r;
        } else {
            break;
        }
    }
    let code = match rest {
        "enter" => KeyCode::Enter,
        "esc" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "space" => KeyCode::Char(' '),
        "backspace" => KeyCode::Backspace,
        "delete" => KeyCode::Delete,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => return Err(Error::Invalid(format!("unknown key {spec:?}"))),
            }
        }
    };
    Ok(Key::new(mods, code))
}

impl Step {
    /// Parse one step, e.g. `click:10,20`, `key:shift-tab`, `text:hello` or `frame`.
    pub fn parse(s: &str) -> Result<Self> {
        let (verb, arg) = s.split_once(':').unwrap_or((s, ""));
        Ok(match verb {
            "click" => {
                let [x, y] = numbers(arg)?;
                Self::Click(x, y)
            }
            "move" => {
                let [x, y] = numbers(arg)?;
                Self::Move(x, y)
            }
            "scroll" => {
                let [x, y, dy] = numbers(arg)?;
                Self::Scroll(x, y, dy)
            }
            "key" => Self::Key(parse_key(arg)?),
            "text" => Self::Text(arg.to_string()),
            "frame" => Self::Frame,
            _ => return Err(Error::Invalid(format!("unknown step {s:?}"))),
        })
    }

    /// Apply this step to a harness.
    pub fn apply(&self, h: &mut Harness) -> Result<EventOutcome> {
        match self {
            Self::Click(x, y) => h.click(*x, *y),
            Self::Move(x, y) => h.move_to(*x, *y),
            Self::Scroll(x, y, dy) => h.scroll(*x, *y, *dy),
            Self::Key(k) => h.key(*k),
            Self::Text(t) => h.text(t),
            Self::Frame => h.frame().map(|_| EventOutcome::Handle),
        }
    }
}

/// Parse a whole script of whitespace-separated steps.
pub fn parse(script: &str) -> Result<Vec<Step>> {
    script.split_whitespace().map(Step::parse).collect()
}

/// Run a script, framing after every step the way a host event loop would.
pub fn run(h: &mut Harness, steps: &[Step]) -> Result<Vec<EventOutcome>> {
    let mut outcomes = Vec::with_capacity(steps.len());
    for step in steps {
        outcomes.push(step.apply(h)?);
        h.frame()?;
    }
    Ok(outcomes)
}
