//! Key dispatch for the main loop.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::commands::{carry_prefix, plan_completion, tokenize, walk, CompletionPlan, WalkMode};
use crate::error::TermError;
use crate::keymap::matches_chord;
use crate::terminal::suspend;

use super::line::LineBuffer;
use super::printer::lock;
use super::runner::{is_printable, ExitReason, Terminal};

impl Terminal {
    /// Apply one key. Returns a reason when the loop has to end.
    pub(super) fn handle_key(&mut self, key: KeyEvent) -> Result<Option<ExitReason>, TermError> {
        if self
            .help_key
            .as_ref()
            .is_some_and(|chord| matches_chord(key, chord))
        {
            self.complete(WalkMode::Help)?;
            return Ok(None);
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        match key.code {
            KeyCode::Left if ctrl || alt => self.move_cursor(LineBuffer::word_left)?,
            KeyCode::Right if ctrl || alt => self.move_cursor(LineBuffer::word_right)?,
            KeyCode::Char('b' | 'B') if alt => self.move_cursor(LineBuffer::word_left)?,
            KeyCode::Char('f' | 'F') if alt => self.move_cursor(LineBuffer::word_right)?,
            KeyCode::Left => self.move_cursor(LineBuffer::left)?,
            KeyCode::Char('b') if ctrl => self.move_cursor(LineBuffer::left)?,
            KeyCode::Right => self.move_cursor(LineBuffer::right)?,
            KeyCode::Char('f') if ctrl => self.move_cursor(LineBuffer::right)?,
            KeyCode::Home => self.move_cursor(LineBuffer::home)?,
            KeyCode::Char('a') if ctrl => self.move_cursor(LineBuffer::home)?,
            KeyCode::End => self.move_cursor(LineBuffer::end)?,
            KeyCode::Char('e') if ctrl => self.move_cursor(LineBuffer::end)?,
            KeyCode::Up => self.recall(true)?,
            KeyCode::Down => self.recall(false)?,
            KeyCode::Tab => self.complete(WalkMode::Complete)?,
            KeyCode::Backspace => {
                let mut screen = self.screen();
                if let Some(changed) = screen.line.backspace() {
                    screen.refresh(Some(changed))?;
                }
            }
            KeyCode::Char('d') if ctrl => {
                let mut screen = self.screen();
                if screen.line.is_empty() {
                    screen.write_raw("exit because Ctrl+D\n")?;
                    return Ok(Some(ExitReason::EndOfInput));
                }
                if let Some(changed) = screen.line.delete() {
                    screen.refresh(Some(changed))?;
                }
            }
            KeyCode::Delete => {
                let mut screen = self.screen();
                if let Some(changed) = screen.line.delete() {
                    screen.refresh(Some(changed))?;
                }
            }
            KeyCode::Enter => self.on_enter()?,
            KeyCode::Char(letter @ ('c' | 'g')) if ctrl => {
                return self.cancel(letter.to_ascii_uppercase());
            }
            KeyCode::Char('z') if ctrl => {
                if !suspend() {
                    self.screen().write_raw("exit because Ctrl+Z\n")?;
                    return Ok(Some(ExitReason::Suspended));
                }
            }
            KeyCode::Char(ch) if !ctrl && !alt && is_printable(ch) => {
                let mut screen = self.screen();
                let changed = screen.line.insert(ch as u8);
                screen.refresh(Some(changed))?;
            }
            _ => {}
        }
        Ok(None)
    }

    fn move_cursor(&mut self, motion: impl FnOnce(&mut LineBuffer) -> bool) -> Result<(), TermError> {
        let mut screen = self.screen();
        if motion(&mut screen.line) {
            screen.refresh(None)?;
        }
        Ok(())
    }

    fn recall(&mut self, older: bool) -> Result<(), TermError> {
        let mut screen = lock(&self.screen);
        let entry = if older {
            let live = screen.line.text();
            self.history.older(&live)
        } else {
            self.history.newer()
        };
        if let Some(entry) = entry {
            screen.line.replace(&entry);
            screen.refresh(Some(0))?;
        }
        Ok(())
    }

    /// Ctrl-C / Ctrl-G: drop a pending continuation or the typed line,
    /// and end the loop when there is neither.
    fn cancel(&mut self, letter: char) -> Result<Option<ExitReason>, TermError> {
        self.history.reset_cursor();
        let mut screen = lock(&self.screen);
        if self.carried.take().is_some() {
            screen.continuation = false;
        } else if screen.line.is_empty() {
            screen.write_raw(&format!("exit because Ctrl+{letter}\n"))?;
            return Ok(Some(ExitReason::Cancelled));
        }
        screen.write_raw(&format!("^{letter}\n"))?;
        screen.line.clear();
        screen.fresh_prompt()?;
        Ok(None)
    }

    fn on_enter(&mut self) -> Result<(), TermError> {
        self.history.reset_cursor();
        let text = {
            let mut screen = self.screen();
            screen.write_raw("\n")?;
            screen.prompt_visible = false;
            let text = screen.line.text();
            screen.line.clear();
            text
        };

        let carried = self.carried.take();
        if text.is_empty() && carried.is_none() {
            self.screen().fresh_prompt()?;
            return Ok(());
        }

        let prefix = carried.unwrap_or_default();
        let tokenized = tokenize(&prefix, &text);
        if let Some(continuation) = tokenized.continuation {
            debug!(target: "editor", ?continuation, "line continues");
            self.carried = Some(carry_prefix(&prefix, &text, continuation));
            let mut screen = self.screen();
            screen.continuation = true;
            screen.fresh_prompt()?;
            return Ok(());
        }
        self.screen().continuation = false;

        if tokenized.tokens.is_empty() {
            self.screen().fresh_prompt()?;
            return Ok(());
        }

        let count = self.execute_tokens(&tokenized.tokens);
        let mut screen = self.screen();
        match count {
            0 => screen.write_raw("command not found.\n")?,
            1 => {}
            count => screen.write_raw(&format!("WARN: {count} commands executed.\n"))?,
        }
        if !self.exit_requested() {
            screen.fresh_prompt()?;
        }
        Ok(())
    }

    /// Tab and the help key: extend the line in place or list what can
    /// follow it.
    fn complete(&mut self, mode: WalkMode) -> Result<(), TermError> {
        let text = self.screen().line.text();
        let prefix = self.carried.clone().unwrap_or_default();
        self.tree.refresh_dynamic_options();
        let tokenized = tokenize(&prefix, &text);
        let outcome = walk(&self.tree, &tokenized.tokens, mode);
        let plan = plan_completion(mode, &text, prefix.len(), &tokenized, &outcome);
        debug!(target: "editor", ?mode, ?plan, "completion");

        let mut screen = self.screen();
        match plan {
            CompletionPlan::Splice { start, text } => {
                let changed = screen.line.splice(start, &text);
                screen.refresh(Some(changed))?;
            }
            CompletionPlan::Listing(listing) => screen.print_listing(&listing)?,
            CompletionPlan::Nothing => {}
        }
        Ok(())
    }
}
