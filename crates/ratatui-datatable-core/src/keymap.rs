use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::input::KeyModifiers;

/// A named group of keys, shown in help bars as `help_key help_desc`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    pub keys: Vec<KeyEvent>,
    pub help_key: String,
    pub help_desc: String,
}

impl Binding {
    pub fn new(
        help_key: impl Into<String>,
        help_desc: impl Into<String>,
        keys: Vec<KeyEvent>,
    ) -> Self {
        Self {
            keys,
            help_key: help_key.into(),
            help_desc: help_desc.into(),
        }
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.keys.iter().any(|k| key_event_matches(k, event))
    }
}

pub fn key_event_matches(pattern: &KeyEvent, event: &KeyEvent) -> bool {
    pattern.code == event.code && modifiers_match(pattern, event)
}

// Terminals report shifted characters (`G`, `>`) with SHIFT set, so shift is only compared for
// non-character keys.
fn modifiers_match(pattern: &KeyEvent, event: &KeyEvent) -> bool {
    let (p, e) = (pattern.modifiers, event.modifiers);
    let shift_ok = matches!(pattern.code, KeyCode::Char(_)) || p.shift == e.shift;
    shift_ok && p.ctrl == e.ctrl && p.alt == e.alt
}

pub fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code)
}

pub fn key_char(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c))
}

pub fn key_ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c)).with_modifiers(KeyModifiers {
        shift: false,
        ctrl: true,
        alt: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_matches_exact_modifiers() {
        let b = Binding::new("s", "sort", vec![key_char('s')]);
        assert!(b.matches(&key_char('s')));
        assert!(!b.matches(&key_ctrl('s')));
    }

    #[test]
    fn shifted_chars_match_plain_patterns() {
        let b = Binding::new("G", "last page", vec![key_char('G')]);
        let shifted = key_char('G').with_modifiers(KeyModifiers {
            shift: true,
            ctrl: false,
            alt: false,
        });
        assert!(b.matches(&shifted));
        assert!(!Binding::new("end", "last", vec![key(KeyCode::End)]).matches(
            &key(KeyCode::End).with_modifiers(KeyModifiers {
                shift: true,
                ctrl: false,
                alt: false,
            })
        ));
    }
}
