//! The interactive editor.
//!
//! A `Terminal` owns the command tree, the history and a shared `Screen`.
//! Keys are decoded one at a time and applied by `input.rs`; Enter walks
//! the tree and runs the callbacks reached, Tab and the help key walk it
//! to complete or list. Callbacks get the `Terminal` back so they can
//! prompt for more input, print, change the prompt or end the loop.
//!
//! Output from other threads goes through a `Printer`, which shares the
//! screen behind a mutex and reprints the prompt under the new text.

mod input;
mod line;
mod printer;
mod runner;
mod screen;

pub use line::LineBuffer;
pub use printer::Printer;
pub use runner::{ExitReason, Terminal, TerminalBuilder};
pub use screen::CONTINUATION_PROMPT;
