//! Error types shared by the tree builder and the editor.

use std::io;

use thiserror::Error;

/// Errors raised while building a command tree.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("node word must not be empty")]
    EmptyWord,
    #[error("node `{0}` does not take options")]
    NotSelectable(String),
}

/// Errors raised by the editor and the dispatcher.
#[derive(Debug, Error)]
pub enum TermError {
    /// Interactive editing cannot run on this terminal.
    #[error("not supported: {0}")]
    UnsupportedTerminal(String),
    /// An exec walk reached no command.
    #[error("command not found.")]
    NoMatch,
    /// The line ends inside quotes or with a trailing backslash.
    #[error("incomplete command line")]
    Incomplete,
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Io(#[from] io::Error),
}
