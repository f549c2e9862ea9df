//! Editor construction and the blocking read loop.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use crossterm::event::{KeyCode, KeyModifiers};
use crossterm::style::ContentStyle;
use tracing::{debug, info, warn};

use crate::commands::{format_history_entry, tokenize, walk, CommandTree, Token, WalkMode};
use crate::config::Config;
use crate::error::TermError;
use crate::history::History;
use crate::keymap::{parse_key_chord, KeyChord, KeyDecoder, DEFAULT_HELP_KEY};
use crate::terminal::{
    check_support, default_prompt_style, parse_color, Input, Output, Palette, Replay, StdinInput,
    StdoutOutput,
};

use super::line::LineBuffer;
use super::printer::{lock, Printer};
use super::screen::Screen;

/// Why [`Terminal::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// A callback called [`Terminal::exit`].
    Requested,
    /// Ctrl-D on an empty line, or the input ran out.
    EndOfInput,
    /// Ctrl-C or Ctrl-G on an empty line.
    Cancelled,
    /// Ctrl-Z where the process cannot be stopped.
    Suspended,
}

pub struct TerminalBuilder {
    prompt: String,
    tree: CommandTree,
    init_content: Option<String>,
    config: Option<Config>,
    io: Option<(Box<dyn Input>, Box<dyn Output>)>,
}

impl TerminalBuilder {
    /// Bytes replayed as if typed before real input is read.
    pub fn init_content(mut self, content: &str) -> Self {
        self.init_content = Some(content.to_string());
        self
    }

    pub fn config(mut self, config: &Config) -> Self {
        self.config = Some(config.clone());
        self
    }

    /// Use the given streams instead of the process's stdin and stdout.
    pub fn io<I, O>(mut self, input: I, output: O) -> Self
    where
        I: Input + 'static,
        O: Output + 'static,
    {
        self.io = Some((Box::new(input), Box::new(output)));
        self
    }

    pub fn build(self) -> Result<Terminal, TermError> {
        let (input, output) = match self.io {
            Some(io) => io,
            None => {
                if let Err(err) = check_support() {
                    println!("not supported");
                    warn!(target: "editor", error = %err, "interactive editing unavailable");
                    return Err(err);
                }
                let input: Box<dyn Input> = Box::new(StdinInput);
                let output: Box<dyn Output> = Box::new(StdoutOutput::new());
                (input, output)
            }
        };
        let input: Box<dyn Input> = Box::new(Replay::new(
            self.init_content.as_deref().unwrap_or(""),
            Some(input),
        ));

        let config = self.config.unwrap_or_default();
        let history = History::new(config.history.capacity);
        let prompt_style = prompt_style(&config);
        let palette = Palette::from_colors(
            parse_color(&config.completion.candidate_color),
            parse_color(&config.completion.hint_color),
        );
        let help_key = parse_key_chord(&config.keymap.help).or_else(|| {
            warn!(target: "editor", chord = %config.keymap.help, "invalid help key, using default");
            parse_key_chord(DEFAULT_HELP_KEY)
        });

        let screen = Screen::new(output, &self.prompt, prompt_style, palette);
        Ok(Terminal {
            tree: self.tree,
            screen: Arc::new(Mutex::new(screen)),
            input,
            decoder: KeyDecoder::new(),
            history,
            default_prompt: self.prompt,
            carried: None,
            exit_requested: false,
            help_key,
        })
    }
}

fn prompt_style(config: &Config) -> ContentStyle {
    let mut style = default_prompt_style();
    if let Some(color) = parse_color(&config.prompt.color) {
        style.foreground_color = Some(color);
    } else {
        warn!(target: "editor", color = %config.prompt.color, "unknown prompt colour");
    }
    if !config.prompt.bold {
        style.attributes = Default::default();
    }
    style
}

/// Interactive line editor bound to a command tree.
pub struct Terminal {
    pub(super) tree: CommandTree,
    pub(super) screen: Arc<Mutex<Screen>>,
    pub(super) input: Box<dyn Input>,
    pub(super) decoder: KeyDecoder,
    pub(super) history: History,
    default_prompt: String,
    /// Text kept from lines that ended inside quotes or with a backslash.
    pub(super) carried: Option<String>,
    exit_requested: bool,
    pub(super) help_key: Option<KeyChord>,
}

impl Terminal {
    pub fn builder(prompt: &str, tree: CommandTree) -> TerminalBuilder {
        TerminalBuilder {
            prompt: prompt.to_string(),
            tree,
            init_content: None,
            config: None,
            io: None,
        }
    }

    /// Read and handle keys until the user or a callback ends the loop.
    pub fn run(&mut self) -> Result<ExitReason, TermError> {
        self.exit_requested = false;
        info!(target: "editor", "loop started");
        self.screen().fresh_prompt()?;
        let reason = loop {
            let Some(key) = self.decoder.next_key(self.input.as_mut())? else {
                self.screen().write_raw("\n")?;
                break ExitReason::EndOfInput;
            };
            if let Some(reason) = self.handle_key(key)? {
                break reason;
            }
            if self.exit_requested {
                break ExitReason::Requested;
            }
        };
        self.screen().prompt_visible = false;
        info!(target: "editor", ?reason, "loop finished");
        Ok(reason)
    }

    /// Ask the running loop to return after the current line.
    pub fn exit(&mut self) {
        self.exit_requested = true;
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Change the prompt shown from the next line on. `None` restores the
    /// prompt the editor was built with.
    pub fn set_prompt(&mut self, prompt: Option<&str>) {
        let prompt = prompt.unwrap_or(self.default_prompt.as_str()).to_string();
        self.screen().prompt = prompt;
    }

    pub fn prompt(&self) -> String {
        self.screen().prompt.clone()
    }

    pub fn set_prompt_style(&mut self, style: ContentStyle) {
        self.screen().prompt_style = style;
    }

    /// Prompt for one line. `None` means the user cancelled.
    pub fn getline(&mut self, prompt: &str) -> Result<Option<String>, TermError> {
        self.read_nested(prompt, false)
    }

    /// Like [`Terminal::getline`] but echoes `*` for every byte.
    pub fn password(&mut self, prompt: &str) -> Result<Option<String>, TermError> {
        self.read_nested(prompt, true)
    }

    fn read_nested(&mut self, prompt: &str, mask: bool) -> Result<Option<String>, TermError> {
        let (saved, shown) = {
            let mut screen = self.screen();
            let saved = SavedPrompt {
                prompt: std::mem::replace(&mut screen.prompt, prompt.to_string()),
                style: std::mem::replace(&mut screen.prompt_style, ContentStyle::new()),
                line: std::mem::take(&mut screen.line),
                continuation: std::mem::replace(&mut screen.continuation, false),
            };
            screen.mask = mask;
            (saved, screen.fresh_prompt())
        };

        let result = match shown {
            Ok(()) => self.nested_loop(),
            Err(err) => Err(err.into()),
        };

        let mut screen = self.screen();
        screen.prompt = saved.prompt;
        screen.prompt_style = saved.style;
        screen.line = saved.line;
        screen.continuation = saved.continuation;
        screen.mask = false;
        screen.prompt_visible = false;
        result
    }

    fn nested_loop(&mut self) -> Result<Option<String>, TermError> {
        loop {
            let Some(key) = self.decoder.next_key(self.input.as_mut())? else {
                self.screen().write_raw("\n")?;
                return Ok(None);
            };
            let mut screen = self.screen();
            let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
            let alt = key.modifiers.contains(KeyModifiers::ALT);
            match key.code {
                KeyCode::Left if !ctrl && !alt => {
                    if screen.line.left() {
                        screen.refresh(None)?;
                    }
                }
                KeyCode::Char('b') if ctrl => {
                    if screen.line.left() {
                        screen.refresh(None)?;
                    }
                }
                KeyCode::Right if !ctrl && !alt => {
                    if screen.line.right() {
                        screen.refresh(None)?;
                    }
                }
                KeyCode::Char('f') if ctrl => {
                    if screen.line.right() {
                        screen.refresh(None)?;
                    }
                }
                KeyCode::Backspace => {
                    if let Some(changed) = screen.line.backspace() {
                        screen.refresh(Some(changed))?;
                    }
                }
                KeyCode::Delete => {
                    if let Some(changed) = screen.line.delete() {
                        screen.refresh(Some(changed))?;
                    }
                }
                KeyCode::Char('d') if ctrl => {
                    if let Some(changed) = screen.line.delete() {
                        screen.refresh(Some(changed))?;
                    }
                }
                KeyCode::Enter => {
                    screen.write_raw("\n")?;
                    screen.prompt_visible = false;
                    return Ok(Some(screen.line.text()));
                }
                KeyCode::Char('c') if ctrl => {
                    if screen.line.is_empty() {
                        screen.write_raw("\n")?;
                        screen.prompt_visible = false;
                        return Ok(None);
                    }
                    screen.write_raw("^C\n")?;
                    screen.line.clear();
                    screen.fresh_prompt()?;
                }
                KeyCode::Char(ch) if !ctrl && !alt && is_printable(ch) => {
                    let changed = screen.line.insert(ch as u8);
                    screen.refresh(Some(changed))?;
                }
                _ => {}
            }
        }
    }

    /// Run one command line without the interactive loop.
    ///
    /// Returns how many callbacks ran. Any line with tokens is added to
    /// history, matched or not.
    pub fn dispatch(&mut self, line: &str) -> Result<usize, TermError> {
        let tokenized = tokenize("", line);
        if tokenized.needs_continuation() {
            return Err(TermError::Incomplete);
        }
        if tokenized.tokens.is_empty() {
            return Ok(0);
        }
        match self.execute_tokens(&tokenized.tokens) {
            0 => Err(TermError::NoMatch),
            count => Ok(count),
        }
    }

    /// Record `tokens` in history, walk the tree and run every callback
    /// reached.
    pub(super) fn execute_tokens(&mut self, tokens: &[Token]) -> usize {
        self.tree.refresh_dynamic_options();
        let outcome = walk(&self.tree, tokens, WalkMode::Exec);
        let count = outcome.executions.len();
        debug!(target: "editor", tokens = tokens.len(), count, "dispatch");
        self.history.push(format_history_entry(tokens));
        if count == 0 {
            return 0;
        }
        if count > 1 {
            warn!(target: "editor", count, "ambiguous command tree, running every match");
        }
        for execution in outcome.executions {
            (execution.exec)(self, &execution.argv);
        }
        count
    }

    /// Print above the prompt. See [`Printer`].
    pub fn print(&self, text: &str) -> io::Result<()> {
        self.printer().print(text)
    }

    /// A `Send` handle for printing from other threads.
    pub fn printer(&self) -> Printer {
        Printer::new(self.screen.clone())
    }

    pub fn tree(&self) -> &CommandTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut CommandTree {
        &mut self.tree
    }

    pub fn set_tree(&mut self, tree: CommandTree) -> CommandTree {
        std::mem::replace(&mut self.tree, tree)
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Current content of the line being edited.
    pub fn line(&self) -> String {
        self.screen().line.text()
    }

    pub(super) fn screen(&self) -> MutexGuard<'_, Screen> {
        lock(&self.screen)
    }
}

struct SavedPrompt {
    prompt: String,
    style: ContentStyle,
    line: LineBuffer,
    continuation: bool,
}

pub(super) fn is_printable(ch: char) -> bool {
    (' '..='~').contains(&ch)
}
