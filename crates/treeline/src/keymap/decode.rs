//! Raw byte decoding into key events.
//!
//! Handles control bytes, Alt-prefixed keys and the CSI/SS3 escape
//! sequences xterm-like terminals send for arrows, editing keys and
//! function keys, including `;m` modifier parameters.

use std::io;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::trace;

use crate::terminal::Input;

const ESC: u8 = 0x1b;

#[derive(Debug, Default)]
pub struct KeyDecoder {
    raw: Vec<u8>,
}

impl KeyDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and decode one key. `None` means the input is exhausted.
    ///
    /// Unrecognised input decodes to `KeyCode::Null`.
    pub fn next_key(&mut self, input: &mut dyn Input) -> io::Result<Option<KeyEvent>> {
        self.raw.clear();
        let Some(byte) = self.read(input)? else {
            return Ok(None);
        };
        let event = match byte {
            ESC => self.escape(input)?,
            _ => plain(byte),
        };
        trace!(target: "input", raw = ?self.raw, event = ?event, "key");
        Ok(Some(event))
    }

    fn read(&mut self, input: &mut dyn Input) -> io::Result<Option<u8>> {
        let byte = input.read_byte()?;
        if let Some(byte) = byte {
            self.raw.push(byte);
        }
        Ok(byte)
    }

    fn escape(&mut self, input: &mut dyn Input) -> io::Result<KeyEvent> {
        let Some(next) = self.read(input)? else {
            return Ok(key(KeyCode::Esc));
        };
        match next {
            b'[' => self.csi(input),
            b'O' => {
                let Some(last) = self.read(input)? else {
                    return Ok(null());
                };
                Ok(ss3(last).map(key).unwrap_or_else(null))
            }
            ESC => Ok(key(KeyCode::Esc)),
            byte => {
                let mut event = plain(byte);
                if event.code == KeyCode::Null {
                    return Ok(event);
                }
                event.modifiers |= KeyModifiers::ALT;
                Ok(event)
            }
        }
    }

    fn csi(&mut self, input: &mut dyn Input) -> io::Result<KeyEvent> {
        let mut params = String::new();
        let final_byte = loop {
            let Some(byte) = self.read(input)? else {
                return Ok(null());
            };
            match byte {
                0x30..=0x3f => params.push(char::from(byte)),
                0x40..=0x7e => break byte,
                _ => return Ok(null()),
            }
        };

        let mut fields = params.split(';');
        let first = fields.next().and_then(|field| field.parse::<u16>().ok());
        let modifiers = fields
            .next()
            .and_then(|field| field.parse::<u8>().ok())
            .map(modifier_param)
            .unwrap_or_else(KeyModifiers::empty);

        let code = match final_byte {
            b'~' => first.and_then(tilde_code),
            b'Z' => Some(KeyCode::BackTab),
            other => ss3(other),
        };
        Ok(code
            .map(|code| KeyEvent::new(code, modifiers))
            .unwrap_or_else(null))
    }
}

fn plain(byte: u8) -> KeyEvent {
    match byte {
        b'\t' => key(KeyCode::Tab),
        b'\r' | b'\n' => key(KeyCode::Enter),
        0x08 | 0x7f => key(KeyCode::Backspace),
        0x01..=0x1a => KeyEvent::new(
            KeyCode::Char(char::from(b'a' + byte - 1)),
            KeyModifiers::CONTROL,
        ),
        0x20..=0x7e => key(KeyCode::Char(char::from(byte))),
        _ => null(),
    }
}

/// Final bytes shared by SS3 and unparameterised CSI sequences.
fn ss3(byte: u8) -> Option<KeyCode> {
    let code = match byte {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        _ => return None,
    };
    Some(code)
}

fn tilde_code(number: u16) -> Option<KeyCode> {
    let code = match number {
        1 | 7 => KeyCode::Home,
        2 => KeyCode::Insert,
        3 => KeyCode::Delete,
        4 | 8 => KeyCode::End,
        5 => KeyCode::PageUp,
        6 => KeyCode::PageDown,
        11..=15 => KeyCode::F((number - 10) as u8),
        17..=21 => KeyCode::F((number - 11) as u8),
        23 | 24 => KeyCode::F((number - 12) as u8),
        _ => return None,
    };
    Some(code)
}

/// xterm encodes modifiers as `1 + bits` with shift=1, alt=2, ctrl=4.
fn modifier_param(param: u8) -> KeyModifiers {
    let bits = param.saturating_sub(1);
    let mut modifiers = KeyModifiers::empty();
    if bits & 1 != 0 {
        modifiers |= KeyModifiers::SHIFT;
    }
    if bits & 2 != 0 {
        modifiers |= KeyModifiers::ALT;
    }
    if bits & 4 != 0 {
        modifiers |= KeyModifiers::CONTROL;
    }
    if bits & 8 != 0 {
        modifiers |= KeyModifiers::META;
    }
    modifiers
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn null() -> KeyEvent {
    key(KeyCode::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::Replay;

    struct Nothing;

    impl Input for Nothing {
        fn read_byte(&mut self) -> io::Result<Option<u8>> {
            Ok(None)
        }
    }

    fn decode_all(bytes: &str) -> Vec<KeyEvent> {
        let mut input: Replay<Nothing> = Replay::new(bytes, None);
        let mut decoder = KeyDecoder::new();
        let mut events = Vec::new();
        while let Some(event) = decoder.next_key(&mut input).unwrap() {
            events.push(event);
        }
        events
    }

    fn one(bytes: &str) -> KeyEvent {
        let events = decode_all(bytes);
        assert_eq!(events.len(), 1, "{bytes:?} decoded to {events:?}");
        events[0]
    }

    #[test]
    fn control_bytes() {
        assert_eq!(one("\x01"), KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL));
        assert_eq!(one("\x04"), KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL));
        assert_eq!(one("\t"), key(KeyCode::Tab));
        assert_eq!(one("\r"), key(KeyCode::Enter));
        assert_eq!(one("\n"), key(KeyCode::Enter));
        assert_eq!(one("\x7f"), key(KeyCode::Backspace));
        assert_eq!(one("\x08"), key(KeyCode::Backspace));
        assert_eq!(one("q"), key(KeyCode::Char('q')));
    }

    #[test]
    fn arrows_in_both_cursor_modes() {
        assert_eq!(one("\x1b[A"), key(KeyCode::Up));
        assert_eq!(one("\x1b[D"), key(KeyCode::Left));
        assert_eq!(one("\x1bOB"), key(KeyCode::Down));
        assert_eq!(one("\x1bOH"), key(KeyCode::Home));
        assert_eq!(one("\x1b[F"), key(KeyCode::End));
    }

    #[test]
    fn tilde_sequences() {
        assert_eq!(one("\x1b[1~"), key(KeyCode::Home));
        assert_eq!(one("\x1b[3~"), key(KeyCode::Delete));
        assert_eq!(one("\x1b[4~"), key(KeyCode::End));
        assert_eq!(one("\x1b[6~"), key(KeyCode::PageDown));
        assert_eq!(one("\x1b[11~"), key(KeyCode::F(1)));
        assert_eq!(one("\x1b[15~"), key(KeyCode::F(5)));
        assert_eq!(one("\x1b[17~"), key(KeyCode::F(6)));
        assert_eq!(one("\x1b[24~"), key(KeyCode::F(12)));
        assert_eq!(one("\x1bOP"), key(KeyCode::F(1)));
    }

    #[test]
    fn modifier_parameters() {
        assert_eq!(
            one("\x1b[1;5C"),
            KeyEvent::new(KeyCode::Right, KeyModifiers::CONTROL)
        );
        assert_eq!(one("\x1b[1;3D"), KeyEvent::new(KeyCode::Left, KeyModifiers::ALT));
        assert_eq!(
            one("\x1b[3;2~"),
            KeyEvent::new(KeyCode::Delete, KeyModifiers::SHIFT)
        );
    }

    #[test]
    fn alt_prefix() {
        assert_eq!(one("\x1bb"), KeyEvent::new(KeyCode::Char('b'), KeyModifiers::ALT));
        assert_eq!(one("\x1bf"), KeyEvent::new(KeyCode::Char('f'), KeyModifiers::ALT));
    }

    #[test]
    fn unknown_sequences_decode_to_null() {
        assert_eq!(one("\x1b[99~"), null());
        assert_eq!(one("\x1b[1;5X"), null());
        assert_eq!(one("\u{7}").code, KeyCode::Char('g'));
        assert_eq!(decode_all("\x1b[").len(), 1);
    }

    #[test]
    fn keys_decode_in_sequence() {
        let events = decode_all("ab\x1b[Cc");
        let codes: Vec<KeyCode> = events.iter().map(|event| event.code).collect();
        assert_eq!(
            codes,
            vec![
                KeyCode::Char('a'),
                KeyCode::Char('b'),
                KeyCode::Right,
                KeyCode::Char('c')
            ]
        );
    }
}
