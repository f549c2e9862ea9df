//! Embeddable terminal line editor driven by a command tree.
//!
//! Build a [`CommandTree`] of keywords, free-text arguments and select
//! groups, bind callbacks to its nodes and hand it to a [`Terminal`]:
//!
//! ```no_run
//! use treeline::{Branch, CommandTree, Terminal};
//!
//! let mut tree = CommandTree::new();
//! tree.add_keyword("exit", Some("leave"))?
//!     .set_exec(|term, _| term.exit());
//! let mut term = Terminal::builder("demo", tree).build()?;
//! term.run()?;
//! # Ok::<(), treeline::TermError>(())
//! ```

pub mod commands;
pub mod config;
pub mod editor;
pub mod error;
pub mod history;
pub mod keymap;
pub mod logging;
pub mod terminal;

#[cfg(test)]
mod test_utils;

pub use commands::{Branch, CommandTree, Node, NodeKind, OptionEntry};
pub use config::{load_config, Config};
pub use editor::{ExitReason, Printer, Terminal, TerminalBuilder};
pub use error::{TermError, TreeError};
pub use history::History;
