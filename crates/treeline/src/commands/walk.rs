//! Matching a token sequence against the command tree.
//!
//! The walk is the same for completion, help and execution: it collects
//! every callback reachable with the typed tokens and, except when
//! executing, the completion candidates and free-text hints on the way.
//! The caller decides what to do with them.

use std::collections::BTreeSet;
use std::fmt;

use tracing::debug;

use super::parse::Token;
use super::tree::{CommandTree, Exec, Node, NodeKind, OptionEntry, Options};

/// What a walk is run for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkMode {
    /// Tab: auto-extend the line or list candidates.
    Complete,
    /// Help key: list candidates without touching the line.
    Help,
    /// Enter: run the reachable callbacks.
    Exec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    None,
    /// The typed text is a proper prefix of the word.
    Part,
    /// The typed text equals the word.
    Entire,
}

/// Compare a node word with typed text, ignoring ASCII case.
pub fn compare_keyword(word: &str, typed: &str) -> MatchKind {
    if word.eq_ignore_ascii_case(typed) {
        return MatchKind::Entire;
    }
    let prefix = word.as_bytes().get(..typed.len());
    match prefix {
        Some(prefix) if prefix.eq_ignore_ascii_case(typed.as_bytes()) => MatchKind::Part,
        _ => MatchKind::None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordHelp {
    pub word: String,
    pub help: Option<String>,
}

impl WordHelp {
    fn new(word: &str, help: Option<&str>) -> Self {
        Self {
            word: word.to_string(),
            help: help.map(str::to_string),
        }
    }
}

/// A callback reached by the walk, with the arguments of its path.
#[derive(Clone)]
pub struct Execution {
    pub exec: Exec,
    pub argv: Vec<String>,
}

impl fmt::Debug for Execution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Execution").field("argv", &self.argv).finish()
    }
}

#[derive(Debug, Default)]
pub struct WalkOutcome {
    pub candidates: Vec<WordHelp>,
    pub hints: Vec<WordHelp>,
    pub executions: Vec<Execution>,
}

impl WalkOutcome {
    pub fn candidate_words(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.word.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty() && self.hints.is_empty() && self.executions.is_empty()
    }
}

/// Walk `tree` with `tokens`. Does not refresh dynamic options; callers
/// do that once beforehand with [`CommandTree::refresh_dynamic_options`].
///
/// An `Exec` walk only collects executions.
pub fn walk(tree: &CommandTree, tokens: &[Token], mode: WalkMode) -> WalkOutcome {
    let mut walker = Walker {
        collect: mode != WalkMode::Exec,
        spacetail: tokens.last().map(|token| token.spacetail).unwrap_or(false),
        argv: Vec::new(),
        outcome: WalkOutcome::default(),
    };
    walker.siblings(tree.roots(), tokens);
    debug!(
        target: "walk",
        ?mode,
        tokens = tokens.len(),
        candidates = walker.outcome.candidates.len(),
        hints = walker.outcome.hints.len(),
        executions = walker.outcome.executions.len(),
        "walk finished"
    );
    walker.outcome
}

struct Walker {
    /// Gather candidates and hints as well as executions.
    collect: bool,
    spacetail: bool,
    argv: Vec<String>,
    outcome: WalkOutcome,
}

impl Walker {
    fn siblings(&mut self, nodes: &[Node], tokens: &[Token]) {
        for node in nodes {
            match node.kind() {
                NodeKind::Keyword => self.keyword(node, tokens),
                NodeKind::Text => self.text(node, tokens),
                NodeKind::Select(options) => self.select(node, options, tokens),
                NodeKind::MultiSelect { options, optional } => {
                    self.multi_select(node, options, *optional, tokens)
                }
            }
        }
    }

    fn keyword(&mut self, node: &Node, tokens: &[Token]) {
        let Some((token, rest)) = tokens.split_first() else {
            self.candidate(node.word(), node.help());
            return;
        };
        let matched = compare_keyword(node.word(), &token.content);
        if matched == MatchKind::None {
            return;
        }
        if self.completing(rest) {
            self.candidate(node.word(), node.help());
        }
        if matched == MatchKind::Entire {
            self.advance(node, node.word().to_string(), rest);
        }
    }

    fn text(&mut self, node: &Node, tokens: &[Token]) {
        let Some((token, rest)) = tokens.split_first() else {
            self.hint(node.word(), node.help());
            return;
        };
        if self.completing(rest) {
            self.hint(node.word(), node.help());
        }
        self.advance(node, token.content.clone(), rest);
    }

    fn select(&mut self, node: &Node, options: &Options, tokens: &[Token]) {
        let Some((token, rest)) = tokens.split_first() else {
            for entry in options.entries() {
                self.option_candidate(entry);
            }
            return;
        };
        for entry in options.entries() {
            let matched = compare_keyword(&entry.word, &token.content);
            if matched == MatchKind::None {
                continue;
            }
            if self.completing(rest) {
                self.option_candidate(entry);
            }
            if matched == MatchKind::Entire {
                self.advance(node, entry.word.clone(), rest);
            }
        }
    }

    fn multi_select(&mut self, node: &Node, options: &Options, optional: bool, tokens: &[Token]) {
        if options.is_empty() {
            return;
        }
        self.consume_options(node, options.entries(), &BTreeSet::new(), tokens);
        if optional {
            self.argv.push(String::new());
            if tokens.is_empty() {
                self.reached(node);
            }
            self.siblings(node.children(), tokens);
            self.argv.pop();
        }
    }

    /// Consume one more distinct option per token, greedily. `chosen`
    /// holds the option indices already taken on this path.
    fn consume_options(
        &mut self,
        node: &Node,
        entries: &[OptionEntry],
        chosen: &BTreeSet<usize>,
        tokens: &[Token],
    ) {
        let Some((token, rest)) = tokens.split_first() else {
            for (index, entry) in entries.iter().enumerate() {
                if !chosen.contains(&index) {
                    self.option_candidate(entry);
                }
            }
            return;
        };
        for (index, entry) in entries.iter().enumerate() {
            if chosen.contains(&index) {
                continue;
            }
            let matched = compare_keyword(&entry.word, &token.content);
            if matched == MatchKind::None {
                continue;
            }
            if self.completing(rest) {
                self.option_candidate(entry);
            }
            if matched != MatchKind::Entire {
                continue;
            }
            let mut taken = chosen.clone();
            taken.insert(index);
            let joined = taken
                .iter()
                .map(|&i| entries[i].word.as_str())
                .collect::<Vec<_>>()
                .join("+");
            self.advance(node, joined, rest);
            if !rest.is_empty() || self.spacetail {
                self.consume_options(node, entries, &taken, rest);
            }
        }
    }

    /// Accept `arg` for `node` and continue below it.
    fn advance(&mut self, node: &Node, arg: String, rest: &[Token]) {
        self.argv.push(arg);
        if rest.is_empty() {
            self.reached(node);
        }
        if !rest.is_empty() || self.spacetail {
            self.siblings(node.children(), rest);
        }
        self.argv.pop();
    }

    fn reached(&mut self, node: &Node) {
        if let Some(exec) = node.exec() {
            self.outcome.executions.push(Execution {
                exec: exec.clone(),
                argv: self.argv.clone(),
            });
        }
    }

    /// The token being matched is the one still under the cursor.
    fn completing(&self, rest: &[Token]) -> bool {
        rest.is_empty() && !self.spacetail
    }

    fn candidate(&mut self, word: &str, help: Option<&str>) {
        if !self.collect || self.outcome.candidates.iter().any(|c| c.word == word) {
            return;
        }
        self.outcome.candidates.push(WordHelp::new(word, help));
    }

    fn option_candidate(&mut self, entry: &OptionEntry) {
        self.candidate(&entry.word, entry.help.as_deref());
    }

    fn hint(&mut self, word: &str, help: Option<&str>) {
        if !self.collect || self.outcome.hints.iter().any(|h| h.word == word) {
            return;
        }
        self.outcome.hints.push(WordHelp::new(word, help));
    }
}
