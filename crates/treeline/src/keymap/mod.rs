//! Key decoding and chord matching.
//!
//! Raw terminal bytes are decoded into crossterm `KeyEvent`s (decode.rs).
//! Chord strings like "f1" or "ctrl+h" from config are parsed here and
//! matched against those events for configurable bindings.

mod decode;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub use decode::KeyDecoder;

pub const DEFAULT_HELP_KEY: &str = "f1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyChord {
    pub key: KeyCode,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

pub fn parse_key_chord(input: &str) -> Option<KeyChord> {
    let trimmed = input.trim().to_lowercase();
    if trimmed.is_empty() {
        return None;
    }

    let parts: Vec<&str> = trimmed
        .split('+')
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect();
    if parts.is_empty() {
        return None;
    }

    let mut chord = KeyChord {
        key: KeyCode::Null,
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    for part in parts {
        match part {
            "ctrl" | "control" => chord.ctrl = true,
            "alt" | "option" => chord.alt = true,
            "shift" => chord.shift = true,
            "meta" | "cmd" | "super" => chord.meta = true,
            key => {
                if chord.key != KeyCode::Null {
                    return None;
                }
                chord.key = parse_key(key)?;
            }
        }
    }

    if chord.key == KeyCode::Null {
        return None;
    }

    Some(chord)
}

fn parse_key(key: &str) -> Option<KeyCode> {
    match key {
        "esc" | "escape" => Some(KeyCode::Esc),
        "enter" | "return" => Some(KeyCode::Enter),
        "tab" => Some(KeyCode::Tab),
        "space" | "spacebar" => Some(KeyCode::Char(' ')),
        "insert" | "ins" => Some(KeyCode::Insert),
        "pageup" | "pgup" => Some(KeyCode::PageUp),
        "pagedown" | "pgdn" => Some(KeyCode::PageDown),
        _ => {
            if let Some(number) = key.strip_prefix('f') {
                if let Ok(number) = number.parse::<u8>() {
                    return (1..=12).contains(&number).then_some(KeyCode::F(number));
                }
            }
            let mut chars = key.chars();
            let first = chars.next()?;
            if chars.next().is_none() {
                Some(KeyCode::Char(first))
            } else {
                None
            }
        }
    }
}

pub fn matches_chord(event: KeyEvent, chord: &KeyChord) -> bool {
    if event.code != chord.key {
        return false;
    }

    let modifiers = event.modifiers;
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    let alt = modifiers.contains(KeyModifiers::ALT);
    let shift = modifiers.contains(KeyModifiers::SHIFT);
    let meta = modifiers.contains(KeyModifiers::SUPER) || modifiers.contains(KeyModifiers::META);

    ctrl == chord.ctrl && alt == chord.alt && shift == chord.shift && meta == chord.meta
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_function_keys() {
        let chord = parse_key_chord("F1").unwrap();
        assert_eq!(chord.key, KeyCode::F(1));
        assert!(!chord.ctrl);
        assert_eq!(parse_key_chord("shift+f12").unwrap().key, KeyCode::F(12));
        assert_eq!(parse_key_chord("f13"), None);
    }

    #[test]
    fn parses_modifier_chords() {
        let chord = parse_key_chord("ctrl + h").unwrap();
        assert_eq!(chord.key, KeyCode::Char('h'));
        assert!(chord.ctrl);
        assert_eq!(parse_key_chord("ctrl+a+b"), None);
        assert_eq!(parse_key_chord("ctrl"), None);
        assert_eq!(parse_key_chord(""), None);
    }

    #[test]
    fn chords_match_decoded_events() {
        let chord = parse_key_chord("alt+h").unwrap();
        assert!(matches_chord(
            KeyEvent::new(KeyCode::Char('h'), KeyModifiers::ALT),
            &chord
        ));
        assert!(!matches_chord(
            KeyEvent::new(KeyCode::Char('h'), KeyModifiers::CONTROL),
            &chord
        ));
        let help = parse_key_chord(DEFAULT_HELP_KEY).unwrap();
        assert!(matches_chord(
            KeyEvent::new(KeyCode::F(1), KeyModifiers::NONE),
            &help
        ));
    }
}
