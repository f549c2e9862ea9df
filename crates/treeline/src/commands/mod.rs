//! Command tree, tokenizer and matcher.
//!
//! This module holds everything that does not touch the terminal:
//! - Tree: node kinds, builder trait, dynamic options (tree.rs)
//! - Parsing: tokenizing with quotes, escapes and continuation (parse.rs)
//! - Walking: matching tokens against the tree (walk.rs)
//! - Completion: deciding between auto-extend and a listing (complete.rs)
//!
//! The editor feeds each line through `tokenize`, `walk` and either
//! `plan_completion` (Tab, help key) or the collected executions (Enter).

mod complete;
mod parse;
mod tree;
mod walk;

pub use complete::{
    common_prefix_len, plan_completion, CompletionPlan, EntryKind, ListEntry, ListLayout, Listing,
};
pub use parse::{
    carry_prefix, escape_token, format_history_entry, tokenize, Continuation, Token, Tokenized,
};
pub use tree::{Branch, CommandTree, Exec, Node, NodeKind, OptionEntry, OptionProvider, Options};
pub use walk::{compare_keyword, walk, Execution, MatchKind, WalkMode, WalkOutcome, WordHelp};
