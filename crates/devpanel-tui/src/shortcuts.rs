use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// A key combination parsed from a config string like `"ctrl+shift+d"`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyCombo {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    /// Parse a `+`-separated combination; the last segment is the key
    pub fn parse(s: &str) -> Option<Self> {
        let mut modifiers = KeyModifiers::NONE;
        let mut code = None;

        let segments: Vec<&str> = s.split('+').map(str::trim).collect();
        let (mods, key) = segments.split_at(segments.len().checked_sub(1)?);

        for m in mods {
            match m.to_lowercase().as_str() {
                "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                "alt" => modifiers |= KeyModifiers::ALT,
                _ => return None,
            }
        }

        match key.first()?.to_lowercase().as_str() {
            "" => return None,
            "esc" | "escape" => code = Some(KeyCode::Esc),
            "enter" | "return" => code = Some(KeyCode::Enter),
            "space" => code = Some(KeyCode::Char(' ')),
            "tab" => code = Some(KeyCode::Tab),
            k if k.chars().count() == 1 => {
                code = Some(KeyCode::Char(k.chars().next()?));
            }
            _ => {}
        }

        code.map(|code| Self { code, modifiers })
    }

    /// Check a key event against this combination
    ///
    /// Terminals report shifted characters with the SHIFT modifier already
    /// applied to the char, so the modifier comparison masks SHIFT out for
    /// character keys.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        let relevant = match self.code {
            KeyCode::Char(_) => KeyModifiers::CONTROL | KeyModifiers::ALT,
            _ => KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SHIFT,
        };
        self.code == event.code && (self.modifiers & relevant) == (event.modifiers & relevant)
    }
}

/// Panel-level actions bound to shortcuts
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelAction {
    Toggle,
    Clear,
}

/// Configured shortcut set for the panel
#[derive(Clone, Copy, Debug)]
pub struct Shortcuts {
    pub toggle: KeyCombo,
    pub clear: KeyCombo,
}

impl Default for Shortcuts {
    fn default() -> Self {
        Self {
            toggle: KeyCombo {
                code: KeyCode::Char('d'),
                modifiers: KeyModifiers::CONTROL | KeyModifiers::SHIFT,
            },
            clear: KeyCombo::ctrl(KeyCode::Char('l')),
        }
    }
}

impl Shortcuts {
    /// Map a key event to a panel action, if bound
    pub fn action(&self, event: &KeyEvent) -> Option<PanelAction> {
        if self.toggle.matches(event) {
            Some(PanelAction::Toggle)
        } else if self.clear.matches(event) {
            Some(PanelAction::Clear)
        } else {
            None
        }
    }
}
