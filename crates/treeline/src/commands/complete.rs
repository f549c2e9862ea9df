//! Turning a walk outcome into a line edit or a listing.

use super::parse::{escape_token, Tokenized};
use super::walk::{WalkMode, WalkOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionPlan {
    /// Replace the line from byte `start` to its end with `text`.
    Splice { start: usize, text: String },
    Listing(Listing),
    Nothing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Candidate,
    Hint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub word: String,
    pub help: Option<String>,
    pub kind: EntryKind,
}

/// Words to print under the prompt, candidates first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub entries: Vec<ListEntry>,
    /// Exactly one callback is reachable with the current line.
    pub executable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListLayout {
    /// One entry per line, word padded to `width`, then its help.
    Described { width: usize },
    /// Every word on a single line, two spaces apart.
    Inline,
    /// Padded words, `per_row` on each line.
    Table { width: usize, per_row: usize },
}

impl Listing {
    pub fn layout(&self, columns: usize) -> ListLayout {
        let width = self
            .entries
            .iter()
            .map(|entry| entry.word.len())
            .max()
            .unwrap_or(0);
        let described = self
            .entries
            .iter()
            .any(|entry| entry.help.as_deref().is_some_and(|help| !help.is_empty()));
        if described {
            return ListLayout::Described { width };
        }
        let inline_len = self
            .entries
            .iter()
            .map(|entry| entry.word.len())
            .sum::<usize>()
            + 2 * self.entries.len().saturating_sub(1);
        if inline_len <= columns {
            return ListLayout::Inline;
        }
        let per_row = columns.saturating_sub(width) / (width + 2) + 1;
        ListLayout::Table { width, per_row }
    }
}

/// Decide what Tab or the help key does with the walked line.
///
/// `line` is the current physical line and `carried_len` the length of
/// the continuation prefix the tokens were computed over.
pub fn plan_completion(
    mode: WalkMode,
    line: &str,
    carried_len: usize,
    tokenized: &Tokenized,
    outcome: &WalkOutcome,
) -> CompletionPlan {
    if mode == WalkMode::Complete {
        if let Some(splice) = splice(line, carried_len, tokenized, outcome) {
            return splice;
        }
    }

    let executable = outcome.executions.len() == 1;
    let candidates = outcome.candidates.iter().map(|c| ListEntry {
        word: c.word.clone(),
        help: c.help.clone(),
        kind: EntryKind::Candidate,
    });
    let hints = outcome.hints.iter().map(|h| ListEntry {
        word: h.word.clone(),
        help: h.help.clone(),
        kind: EntryKind::Hint,
    });
    let entries: Vec<ListEntry> = candidates.chain(hints).collect();
    if entries.is_empty() && !executable {
        return CompletionPlan::Nothing;
    }
    CompletionPlan::Listing(Listing {
        entries,
        executable,
    })
}

fn splice(
    line: &str,
    carried_len: usize,
    tokenized: &Tokenized,
    outcome: &WalkOutcome,
) -> Option<CompletionPlan> {
    if tokenized.needs_continuation() {
        return None;
    }
    let last = tokenized.tokens.last()?;
    if last.spacetail || last.start < carried_len {
        return None;
    }
    let first = outcome.candidates.first()?;
    let common = common_prefix_len(outcome.candidates.iter().map(|c| c.word.as_str()));
    if common == 0 {
        return None;
    }
    let start = last.start - carried_len;
    let typed = line.get(start..)?;
    let mut text = escape_token(first.word.get(..common)?);
    if outcome.candidates.len() == 1 {
        text.push(' ');
    }
    if text == typed {
        return None;
    }
    Some(CompletionPlan::Splice { start, text })
}

/// Length in bytes of the prefix shared by all words, ignoring ASCII case.
pub fn common_prefix_len<'a>(mut words: impl Iterator<Item = &'a str>) -> usize {
    let Some(first) = words.next() else {
        return 0;
    };
    let mut len = first.len();
    for word in words {
        len = first
            .bytes()
            .zip(word.bytes())
            .take(len)
            .take_while(|(a, b)| a.eq_ignore_ascii_case(b))
            .count();
    }
    while !first.is_char_boundary(len) {
        len -= 1;
    }
    len
}
