//! Command line tokenizing.
//!
//! Splits a raw line into argument tokens, honoring quotes and
//! backslash escapes, and reports when the line needs another
//! physical line before it can be tokenized completely.

/// One argument of the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Unescaped content.
    pub content: String,
    /// Byte offset of the token's first raw character in the tokenized text.
    pub start: usize,
    /// The token was followed by an unquoted space.
    pub spacetail: bool,
}

/// Why a line cannot be tokenized yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// The line ended inside a quote opened with the given character.
    Quote(char),
    /// The line ended with a lone backslash.
    Backslash,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokenized {
    pub tokens: Vec<Token>,
    pub continuation: Option<Continuation>,
}

impl Tokenized {
    pub fn needs_continuation(&self) -> bool {
        self.continuation.is_some()
    }

    /// Whether the last token is followed by a space.
    pub fn spacetail(&self) -> bool {
        self.tokens.last().map(|token| token.spacetail).unwrap_or(false)
    }
}

/// Tokenize `carried` followed by `line`.
///
/// `carried` is the prefix saved by [`carry_prefix`] while a previous
/// line was waiting for continuation; it is empty otherwise.
pub fn tokenize(carried: &str, line: &str) -> Tokenized {
    let text = format!("{carried}{line}");
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut start: Option<usize> = None;
    let mut quote: Option<char> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((offset, ch)) = chars.next() {
        if ch == '\\' {
            let Some(&(_, next)) = chars.peek() else {
                return Tokenized {
                    tokens,
                    continuation: Some(Continuation::Backslash),
                };
            };
            start.get_or_insert(offset);
            match next {
                'n' => {
                    chars.next();
                    current.push('\n');
                }
                ' ' | '\\' | '\'' | '"' => {
                    chars.next();
                    current.push(next);
                }
                _ => current.push('\\'),
            }
            continue;
        }

        match quote {
            Some(open) if ch == open => {
                quote = None;
            }
            Some(_) => {
                current.push(ch);
            }
            None if ch == '"' || ch == '\'' => {
                start.get_or_insert(offset);
                quote = Some(ch);
            }
            None if ch == ' ' => {
                if let Some(token_start) = start.take() {
                    if !current.is_empty() {
                        tokens.push(Token {
                            content: std::mem::take(&mut current),
                            start: token_start,
                            spacetail: true,
                        });
                    }
                }
            }
            None => {
                start.get_or_insert(offset);
                current.push(ch);
            }
        }
    }

    if let Some(open) = quote {
        return Tokenized {
            tokens,
            continuation: Some(Continuation::Quote(open)),
        };
    }
    if let Some(token_start) = start {
        if !current.is_empty() {
            tokens.push(Token {
                content: current,
                start: token_start,
                spacetail: false,
            });
        }
    }
    Tokenized {
        tokens,
        continuation: None,
    }
}

/// Build the prefix carried into the next physical line.
pub fn carry_prefix(carried: &str, line: &str, continuation: Continuation) -> String {
    let mut prefix = String::with_capacity(carried.len() + line.len() + 1);
    prefix.push_str(carried);
    match continuation {
        Continuation::Backslash => {
            prefix.push_str(line.strip_suffix('\\').unwrap_or(line));
        }
        Continuation::Quote(_) => {
            prefix.push_str(line);
            prefix.push('\n');
        }
    }
    prefix
}

/// Escape a token so that tokenizing the result yields it back.
pub fn escape_token(content: &str) -> String {
    let mut escaped = String::with_capacity(content.len());
    for ch in content.chars() {
        match ch {
            '\n' => escaped.push_str("\\n"),
            ' ' | '\\' | '\'' | '"' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Render tokens as a history line.
pub fn format_history_entry(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|token| escape_token(&token.content))
        .collect::<Vec<_>>()
        .join(" ")
}
