//! Prompt and line rendering.
//!
//! The screen remembers where the cursor is and how many bytes of the
//! line are displayed, so each edit only rewrites the cells from the
//! first changed byte on. All cursor math is done in cells relative to
//! the start of the prompt and wraps at the terminal width.

use std::io::{self, Write};

use crossterm::cursor::{MoveDown, MoveLeft, MoveRight, MoveToColumn, MoveUp};
use crossterm::style::{ContentStyle, Print, PrintStyledContent};
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;

use crate::commands::{EntryKind, ListLayout, Listing};
use crate::terminal::{styled, Output, Palette};

use super::line::LineBuffer;

pub const CONTINUATION_PROMPT: &str = "> ";

pub struct Screen {
    out: Box<dyn Output>,
    pub(crate) line: LineBuffer,
    shown_cursor: usize,
    shown_len: usize,
    pub(crate) prompt: String,
    pub(crate) prompt_style: ContentStyle,
    pub(crate) palette: Palette,
    pub(crate) mask: bool,
    pub(crate) continuation: bool,
    /// A prompt is on screen and owns the current terminal line.
    pub(crate) prompt_visible: bool,
}

impl Screen {
    pub fn new(out: Box<dyn Output>, prompt: &str, prompt_style: ContentStyle, palette: Palette) -> Self {
        Self {
            out,
            line: LineBuffer::new(),
            shown_cursor: 0,
            shown_len: 0,
            prompt: prompt.to_string(),
            prompt_style,
            palette,
            mask: false,
            continuation: false,
            prompt_visible: false,
        }
    }

    /// Cells taken by the displayed prompt, including its trailing space.
    pub fn prompt_width(&self) -> usize {
        if self.continuation {
            CONTINUATION_PROMPT.len()
        } else {
            self.prompt.len() + 1
        }
    }

    fn columns(&self) -> usize {
        self.out.columns().max(1)
    }

    pub fn print_prompt(&mut self) -> io::Result<()> {
        if self.continuation {
            self.out.queue(Print(CONTINUATION_PROMPT))?;
        } else {
            self.out
                .queue(PrintStyledContent(styled(self.prompt_style, self.prompt.as_str())))?;
            self.out.queue(Print(" "))?;
        }
        self.shown_cursor = 0;
        self.shown_len = 0;
        self.prompt_visible = true;
        Ok(())
    }

    /// Bring the display in line with the buffer.
    ///
    /// With `changed`, bytes from that offset on are rewritten and any
    /// cells left over from a longer line are blanked. Without it only
    /// the cursor moves.
    pub fn refresh(&mut self, changed: Option<usize>) -> io::Result<()> {
        let cols = self.columns();
        let width = self.prompt_width();
        let target = self.line.cursor();
        let len = self.line.len();

        match changed {
            Some(from) => {
                let from = from.min(len);
                self.move_cursor(self.shown_cursor + width, from + width, cols)?;
                let mut at = from;
                for index in from..len {
                    let byte = if self.mask {
                        b'*'
                    } else {
                        self.line.as_bytes()[index]
                    };
                    self.out.write_all(&[byte])?;
                    at += 1;
                    self.wrap_if_needed(at + width, cols)?;
                }
                for _ in len..self.shown_len {
                    self.out.write_all(b" ")?;
                    at += 1;
                    self.wrap_if_needed(at + width, cols)?;
                }
                self.move_cursor(at + width, target + width, cols)?;
            }
            None => self.move_cursor(self.shown_cursor + width, target + width, cols)?,
        }

        self.shown_cursor = target;
        self.shown_len = len;
        self.out.flush()
    }

    fn wrap_if_needed(&mut self, cell: usize, cols: usize) -> io::Result<()> {
        if cell % cols == 0 {
            self.out.write_all(b"\r\n")?;
        }
        Ok(())
    }

    fn move_cursor(&mut self, from: usize, to: usize, cols: usize) -> io::Result<()> {
        let (from_row, from_col) = (from / cols, from % cols);
        let (to_row, to_col) = (to / cols, to % cols);
        if to_row > from_row {
            self.out.queue(MoveDown(cells(to_row - from_row)))?;
        } else if to_row < from_row {
            self.out.queue(MoveUp(cells(from_row - to_row)))?;
        }
        if to_col > from_col {
            self.out.queue(MoveRight(cells(to_col - from_col)))?;
        } else if to_col < from_col {
            self.out.queue(MoveLeft(cells(from_col - to_col)))?;
        }
        Ok(())
    }

    /// Print a prompt on the current line and the whole buffer after it.
    pub fn fresh_prompt(&mut self) -> io::Result<()> {
        self.print_prompt()?;
        self.refresh(Some(0))
    }

    pub fn write_raw(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }

    /// Print completion words under the line, then the prompt again with
    /// the cursor at the end of the line.
    pub fn print_listing(&mut self, listing: &Listing) -> io::Result<()> {
        self.out.write_all(b"\n")?;
        let palette = self.palette;
        let style = |kind: EntryKind| match kind {
            EntryKind::Candidate => palette.candidate,
            EntryKind::Hint => palette.hint,
        };
        let cols = self.columns();
        match listing.layout(cols) {
            ListLayout::Described { width } => {
                for entry in &listing.entries {
                    self.out
                        .queue(PrintStyledContent(styled(style(entry.kind), entry.word.as_str())))?;
                    match &entry.help {
                        Some(help) => {
                            let pad = width.saturating_sub(entry.word.len());
                            writeln!(self.out, "{:pad$}\t {help}", "")?;
                        }
                        None => self.out.write_all(b"\n")?,
                    }
                }
            }
            ListLayout::Inline => {
                for (index, entry) in listing.entries.iter().enumerate() {
                    if index > 0 {
                        self.out.write_all(b"  ")?;
                    }
                    self.out
                        .queue(PrintStyledContent(styled(style(entry.kind), entry.word.as_str())))?;
                }
                if !listing.entries.is_empty() {
                    self.out.write_all(b"\n")?;
                }
            }
            ListLayout::Table { width, per_row } => {
                for (index, entry) in listing.entries.iter().enumerate() {
                    if index % per_row == 0 {
                        if index > 0 {
                            self.out.write_all(b"\n")?;
                        }
                    } else {
                        self.out.write_all(b"  ")?;
                    }
                    self.out
                        .queue(PrintStyledContent(styled(style(entry.kind), entry.word.as_str())))?;
                    let pad = width.saturating_sub(entry.word.len());
                    write!(self.out, "{:pad$}", "")?;
                }
                if !listing.entries.is_empty() {
                    self.out.write_all(b"\n")?;
                }
            }
        }
        if listing.executable {
            self.out.write_all(b"<CR>\n")?;
        }
        self.line.end();
        self.fresh_prompt()
    }

    /// Print `text` above the prompt without disturbing the line being
    /// edited.
    ///
    /// Other threads call this while the input side may hold the terminal
    /// in raw mode, where a bare `\n` does not return the carriage, so
    /// every line break is written as `\r\n`.
    pub fn interject(&mut self, text: &str) -> io::Result<()> {
        let rows_up = (self.shown_cursor + self.prompt_width()) / self.columns();
        self.out.queue(MoveToColumn(0))?;
        if rows_up > 0 {
            self.out.queue(MoveUp(cells(rows_up)))?;
        }
        self.out.queue(Clear(ClearType::FromCursorDown))?;
        let text = text.strip_suffix('\n').unwrap_or(text);
        for (index, row) in text.split('\n').enumerate() {
            if index > 0 {
                self.out.write_all(b"\r\n")?;
            }
            self.out
                .write_all(row.strip_suffix('\r').unwrap_or(row).as_bytes())?;
        }
        self.out.write_all(b"\r\n")?;
        self.out.queue(MoveToColumn(0))?;
        self.fresh_prompt()
    }
}

fn cells(count: usize) -> u16 {
    u16::try_from(count).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::ListEntry;
    use crate::test_utils::SharedOutput;

    fn screen(cols: usize, prompt: &str) -> (Screen, SharedOutput) {
        let out = SharedOutput::new(cols);
        let screen = Screen::new(
            Box::new(out.clone()),
            prompt,
            ContentStyle::new(),
            Palette {
                candidate: ContentStyle::new(),
                hint: ContentStyle::new(),
            },
        );
        (screen, out)
    }

    fn type_text(screen: &mut Screen, text: &str) {
        for byte in text.bytes() {
            let changed = screen.line.insert(byte);
            screen.refresh(Some(changed)).unwrap();
        }
    }

    #[test]
    fn typing_echoes_bytes() {
        let (mut screen, out) = screen(80, ">");
        screen.print_prompt().unwrap();
        type_text(&mut screen, "hi");
        assert_eq!(out.take(), "> hi");
    }

    #[test]
    fn insert_in_middle_rewrites_tail_and_moves_back() {
        let (mut screen, out) = screen(80, ">");
        screen.print_prompt().unwrap();
        type_text(&mut screen, "ac");
        screen.line.left();
        screen.refresh(None).unwrap();
        out.take();
        type_text(&mut screen, "b");
        assert_eq!(out.take(), "bc\x1b[1D");
    }

    #[test]
    fn backspace_blanks_the_old_tail() {
        let (mut screen, out) = screen(80, ">");
        screen.print_prompt().unwrap();
        type_text(&mut screen, "abc");
        out.take();
        let changed = screen.line.backspace().unwrap();
        screen.refresh(Some(changed)).unwrap();
        assert_eq!(out.take(), "\x1b[1D \x1b[1D");
    }

    #[test]
    fn wraps_at_the_right_border() {
        let (mut screen, out) = screen(5, ">");
        screen.print_prompt().unwrap();
        type_text(&mut screen, "abcd");
        assert_eq!(out.take(), "> abc\r\nd");
        screen.line.home();
        screen.refresh(None).unwrap();
        assert_eq!(out.take(), "\x1b[1A\x1b[1C");
    }

    #[test]
    fn mask_hides_content() {
        let (mut screen, out) = screen(80, "pw:");
        screen.mask = true;
        screen.print_prompt().unwrap();
        type_text(&mut screen, "123");
        assert_eq!(out.take(), "pw: ***");
        assert_eq!(screen.line.text(), "123");
    }

    #[test]
    fn continuation_prompt_width() {
        let (mut screen, out) = screen(80, "long-prompt");
        assert_eq!(screen.prompt_width(), 12);
        screen.continuation = true;
        assert_eq!(screen.prompt_width(), 2);
        screen.print_prompt().unwrap();
        assert_eq!(out.take(), "> ");
    }

    #[test]
    fn listing_reprints_prompt_and_line() {
        let (mut screen, out) = screen(80, ">");
        screen.print_prompt().unwrap();
        type_text(&mut screen, "s");
        out.take();
        let listing = Listing {
            entries: vec![
                ListEntry {
                    word: "set".to_string(),
                    help: None,
                    kind: EntryKind::Candidate,
                },
                ListEntry {
                    word: "show".to_string(),
                    help: None,
                    kind: EntryKind::Candidate,
                },
            ],
            executable: true,
        };
        screen.print_listing(&listing).unwrap();
        assert_eq!(out.take(), "\nset  show\n<CR>\n> s");
    }

    #[test]
    fn interject_restores_line() {
        let (mut screen, out) = screen(80, ">");
        screen.print_prompt().unwrap();
        type_text(&mut screen, "ab");
        screen.line.left();
        screen.refresh(None).unwrap();
        out.take();
        screen.interject("tick").unwrap();
        assert_eq!(out.take(), "\x1b[1G\x1b[Jtick\r\n\x1b[1G> ab\x1b[1D");
    }

    #[test]
    fn interject_returns_carriage_on_every_line() {
        let (mut screen, out) = screen(80, ">");
        screen.print_prompt().unwrap();
        out.take();
        screen.interject("one\ntwo\r\n").unwrap();
        let written = out.take();
        assert_eq!(written, "\x1b[1G\x1b[Jone\r\ntwo\r\n\x1b[1G> ");
        assert!(!written.replace("\r\n", "").contains('\n'));
    }
}
