use egui::{Key, Modifiers};

/// A key accelerator: one key plus modifier flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hotkey {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl std::fmt::Display for Hotkey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.modifiers.ctrl {
            write!(f, "Ctrl+")?;
        }
        if self.modifiers.shift {
            write!(f, "Shift+")?;
        }
        if self.modifiers.alt {
            write!(f, "Alt+")?;
        }
        if self.modifiers.mac_cmd || self.modifiers.command && !self.modifiers.ctrl {
            write!(f, "Cmd+")?;
        }
        write!(f, "{}", self.key.name())
    }
}

/// Parse a hotkey string like "Ctrl+Shift+Space" into a [`Hotkey`].
pub fn parse_hotkey(s: &str) -> Option<Hotkey> {
    let mut modifiers = Modifiers::NONE;
    let mut key: Option<Key> = None;

    for part in s.split('+') {
        let part = part.trim();
        match part.to_ascii_uppercase().as_str() {
            "CTRL" | "CONTROL" => modifiers = modifiers | Modifiers::CTRL,
            "SHIFT" => modifiers = modifiers | Modifiers::SHIFT,
            "ALT" => modifiers = modifiers | Modifiers::ALT,
            "CMD" | "COMMAND" | "SUPER" => modifiers = modifiers | Modifiers::COMMAND,
            "" => {}
            _ => match parse_key(part) {
                Some(k) => key = Some(k),
                None => return None,
            },
        }
    }

    key.map(|key| Hotkey { key, modifiers })
}

fn parse_key(part: &str) -> Option<Key> {
    // egui key names are mixed-case ("ArrowDown", "F1", "A"); accept a few
    // common aliases on top of the canonical names.
    match part.to_ascii_uppercase().as_str() {
        "ESC" => return Some(Key::Escape),
        "RETURN" => return Some(Key::Enter),
        "DEL" => return Some(Key::Delete),
        "LEFT" => return Some(Key::ArrowLeft),
        "RIGHT" => return Some(Key::ArrowRight),
        "UP" => return Some(Key::ArrowUp),
        "DOWN" => return Some(Key::ArrowDown),
        _ => {}
    }
    if part.len() == 1 {
        return Key::from_name(&part.to_ascii_uppercase());
    }
    Key::from_name(part).or_else(|| {
        // "PAGEUP" etc. -- retry with the canonical capitalisation.
        let mut canonical = String::new();
        for (i, c) in part.chars().enumerate() {
            if i == 0 {
                canonical.extend(c.to_uppercase());
            } else {
                canonical.extend(c.to_lowercase());
            }
        }
        Key::from_name(&canonical)
    })
}

/// One connected accelerator. Views and overlay modules hand the manager a
/// complete list of these on every view enter; the lists are dropped wholesale
/// on leave and never patched incrementally.
pub struct AccelBinding {
    /// Stable path used for lookup and display, e.g. "views/browser/zoom in".
    pub path: String,
    pub hotkey: Option<Hotkey>,
    pub action: Box<dyn Fn()>,
}

impl AccelBinding {
    pub fn new(
        path: impl Into<String>,
        hotkey: Option<Hotkey>,
        action: impl Fn() + 'static,
    ) -> Self {
        Self {
            path: path.into(),
            hotkey,
            action: Box::new(action),
        }
    }
}

impl std::fmt::Debug for AccelBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccelBinding")
            .field("path", &self.path)
            .field("hotkey", &self.hotkey)
            .finish()
    }
}
