//! Command tree model and builder.
//!
//! A tree is a list of root nodes. Every node is one of four kinds:
//! - `Keyword`: a literal word the user must type (prefix completion)
//! - `Text`: a free-text argument, matches any token
//! - `Select`: exactly one of a list of option words
//! - `MultiSelect`: one or more distinct option words, in any order
//!
//! Select groups may take their options from a provider closure that is
//! re-run before every walk.

use std::fmt;
use std::rc::Rc;

use tracing::warn;

use crate::editor::Terminal;
use crate::error::TreeError;

/// Callback bound to a node. Receives the assembled argument vector.
pub type Exec = Rc<dyn Fn(&mut Terminal, &[String])>;

/// Produces a fresh option list for a select group.
pub type OptionProvider = Box<dyn FnMut() -> Vec<OptionEntry>>;

/// One choice inside a select group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionEntry {
    pub word: String,
    pub help: Option<String>,
}

impl OptionEntry {
    pub fn new(word: impl Into<String>, help: Option<&str>) -> Self {
        Self {
            word: word.into(),
            help: help.map(str::to_string),
        }
    }
}

/// Options of a select group, optionally backed by a provider.
#[derive(Default)]
pub struct Options {
    entries: Vec<OptionEntry>,
    provider: Option<OptionProvider>,
}

impl Options {
    pub fn entries(&self) -> &[OptionEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_dynamic(&self) -> bool {
        self.provider.is_some()
    }

    fn refresh(&mut self) {
        let Some(provider) = self.provider.as_mut() else {
            return;
        };
        self.entries = provider()
            .into_iter()
            .filter(|entry| {
                if entry.word.is_empty() {
                    warn!(target: "tree", "dropping empty dynamic option");
                    return false;
                }
                true
            })
            .collect();
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("entries", &self.entries)
            .field("dynamic", &self.provider.is_some())
            .finish()
    }
}

/// Kind-specific payload of a node.
#[derive(Debug)]
pub enum NodeKind {
    Keyword,
    Text,
    Select(Options),
    MultiSelect { options: Options, optional: bool },
}

impl NodeKind {
    fn options_mut(&mut self) -> Option<&mut Options> {
        match self {
            NodeKind::Select(options) | NodeKind::MultiSelect { options, .. } => Some(options),
            NodeKind::Keyword | NodeKind::Text => None,
        }
    }
}

/// One element of the command tree.
pub struct Node {
    word: String,
    help: Option<String>,
    kind: NodeKind,
    children: Vec<Node>,
    exec: Option<Exec>,
}

impl Node {
    fn new(kind: NodeKind, word: &str, help: Option<&str>) -> Result<Self, TreeError> {
        if word.is_empty() {
            return Err(TreeError::EmptyWord);
        }
        Ok(Self {
            word: word.to_string(),
            help: help.map(str::to_string),
            kind,
            children: Vec::new(),
            exec: None,
        })
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn exec(&self) -> Option<&Exec> {
        self.exec.as_ref()
    }

    /// Bind the callback run when a line ends on this node.
    pub fn set_exec<F>(&mut self, exec: F) -> &mut Self
    where
        F: Fn(&mut Terminal, &[String]) + 'static,
    {
        self.exec = Some(Rc::new(exec));
        self
    }

    pub fn clear_exec(&mut self) -> &mut Self {
        self.exec = None;
        self
    }

    /// Append an option to a select group.
    pub fn add_option(&mut self, word: &str, help: Option<&str>) -> Result<&mut Self, TreeError> {
        if word.is_empty() {
            return Err(TreeError::EmptyWord);
        }
        let name = self.word.clone();
        let options = self
            .kind
            .options_mut()
            .ok_or(TreeError::NotSelectable(name))?;
        options.entries.push(OptionEntry::new(word, help));
        Ok(self)
    }

    /// Remove the first option named `word`. Returns whether one was found.
    pub fn remove_option(&mut self, word: &str) -> bool {
        let Some(options) = self.kind.options_mut() else {
            return false;
        };
        match options.entries.iter().position(|entry| entry.word == word) {
            Some(index) => {
                options.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Replace the option list before every walk with the provider's output.
    pub fn set_option_provider<F>(&mut self, provider: F) -> Result<&mut Self, TreeError>
    where
        F: FnMut() -> Vec<OptionEntry> + 'static,
    {
        let name = self.word.clone();
        let options = self
            .kind
            .options_mut()
            .ok_or(TreeError::NotSelectable(name))?;
        options.provider = Some(Box::new(provider));
        Ok(self)
    }

    fn refresh_dynamic_options(&mut self) {
        if let Some(options) = self.kind.options_mut() {
            options.refresh();
        }
        for child in &mut self.children {
            child.refresh_dynamic_options();
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("word", &self.word)
            .field("kind", &self.kind)
            .field("children", &self.children)
            .field("exec", &self.exec.is_some())
            .finish()
    }
}

/// Shared builder operations for anything that owns child nodes.
pub trait Branch {
    fn child_nodes(&self) -> &[Node];
    fn child_nodes_mut(&mut self) -> &mut Vec<Node>;

    fn add_node(&mut self, kind: NodeKind, word: &str, help: Option<&str>) -> Result<&mut Node, TreeError> {
        let node = Node::new(kind, word, help)?;
        let children = self.child_nodes_mut();
        children.push(node);
        let last = children.len() - 1;
        Ok(&mut children[last])
    }

    fn add_keyword(&mut self, word: &str, help: Option<&str>) -> Result<&mut Node, TreeError> {
        self.add_node(NodeKind::Keyword, word, help)
    }

    fn add_text(&mut self, name: &str, help: Option<&str>) -> Result<&mut Node, TreeError> {
        self.add_node(NodeKind::Text, name, help)
    }

    fn add_select(&mut self, word: &str) -> Result<&mut Node, TreeError> {
        self.add_node(NodeKind::Select(Options::default()), word, None)
    }

    fn add_multi_select(&mut self, word: &str, optional: bool) -> Result<&mut Node, TreeError> {
        self.add_node(
            NodeKind::MultiSelect {
                options: Options::default(),
                optional,
            },
            word,
            None,
        )
    }

    /// Remove the first child named `word`. Returns whether one was found.
    fn remove_child(&mut self, word: &str) -> bool {
        let children = self.child_nodes_mut();
        match children.iter().position(|node| node.word == word) {
            Some(index) => {
                children.remove(index);
                true
            }
            None => false,
        }
    }

    fn child(&self, word: &str) -> Option<&Node> {
        self.child_nodes().iter().find(|node| node.word == word)
    }

    fn child_mut(&mut self, word: &str) -> Option<&mut Node> {
        self.child_nodes_mut()
            .iter_mut()
            .find(|node| node.word == word)
    }
}

impl Branch for Node {
    fn child_nodes(&self) -> &[Node] {
        &self.children
    }

    fn child_nodes_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }
}

/// Root of a command tree.
#[derive(Debug, Default)]
pub struct CommandTree {
    roots: Vec<Node>,
}

impl CommandTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn roots(&self) -> &[Node] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Rebuild every provider-backed option list.
    pub fn refresh_dynamic_options(&mut self) {
        for node in &mut self.roots {
            node.refresh_dynamic_options();
        }
    }
}

impl Branch for CommandTree {
    fn child_nodes(&self) -> &[Node] {
        &self.roots
    }

    fn child_nodes_mut(&mut self) -> &mut Vec<Node> {
        &mut self.roots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn builder_preserves_insertion_order() {
        let mut tree = CommandTree::new();
        tree.add_keyword("show", None).unwrap();
        tree.add_keyword("set", Some("set things")).unwrap();
        tree.add_text("name", None).unwrap();
        let words: Vec<&str> = tree.roots().iter().map(Node::word).collect();
        assert_eq!(words, vec!["show", "set", "name"]);
        assert_eq!(tree.roots()[1].help(), Some("set things"));
    }

    #[test]
    fn empty_words_are_rejected() {
        let mut tree = CommandTree::new();
        assert_eq!(tree.add_keyword("", None).unwrap_err(), TreeError::EmptyWord);
        let select = tree.add_select("pick").unwrap();
        assert_eq!(select.add_option("", None).unwrap_err(), TreeError::EmptyWord);
    }

    #[test]
    fn options_only_attach_to_select_groups() {
        let mut tree = CommandTree::new();
        let keyword = tree.add_keyword("show", None).unwrap();
        assert_eq!(
            keyword.add_option("a", None).unwrap_err(),
            TreeError::NotSelectable("show".to_string())
        );
        let multi = tree.add_multi_select("flags", true).unwrap();
        multi.add_option("a", None).unwrap().add_option("b", None).unwrap();
        match multi.kind() {
            NodeKind::MultiSelect { options, optional } => {
                assert!(*optional);
                assert_eq!(options.entries().len(), 2);
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn remove_child_and_option() {
        let mut tree = CommandTree::new();
        tree.add_keyword("a", None).unwrap();
        tree.add_keyword("b", None).unwrap();
        assert!(tree.remove_child("a"));
        assert!(!tree.remove_child("a"));
        assert_eq!(tree.roots().len(), 1);

        let select = tree.add_select("color").unwrap();
        select.add_option("red", None).unwrap();
        select.add_option("blue", None).unwrap();
        assert!(select.remove_option("red"));
        assert!(!select.remove_option("green"));
        match select.kind() {
            NodeKind::Select(options) => assert_eq!(options.entries()[0].word, "blue"),
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn provider_replaces_options_on_refresh() {
        let mut tree = CommandTree::new();
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let select = tree.add_select("device").unwrap();
        select.add_option("stale", None).unwrap();
        select
            .set_option_provider(move || {
                counter.set(counter.get() + 1);
                vec![
                    OptionEntry::new(format!("dev{}", counter.get()), Some("device")),
                    OptionEntry::new("", None),
                ]
            })
            .unwrap();

        tree.refresh_dynamic_options();
        tree.refresh_dynamic_options();

        assert_eq!(calls.get(), 2);
        match tree.roots()[0].kind() {
            NodeKind::Select(options) => {
                assert!(options.is_dynamic());
                assert_eq!(options.entries(), &[OptionEntry::new("dev2", Some("device"))]);
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn child_lookup_is_exact() {
        let mut tree = CommandTree::new();
        tree.add_keyword("show", None)
            .unwrap()
            .add_keyword("camera", None)
            .unwrap();
        assert!(tree.child("Show").is_none());
        let show = tree.child_mut("show").unwrap();
        assert!(show.child("camera").is_some());
    }
}
