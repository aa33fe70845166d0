//! Prefix tree used to complete abbreviated answers.

use std::collections::BTreeMap;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrieError {
    #[error("`{}` is not a prefix of any candidate", .0)]
    NotAPrefix(String),

    #[error("`{}` is a prefix of several candidates", .prefix)]
    NotAUniquePrefix {
        prefix: String,
        completions: Vec<String>,
    },
}

#[derive(Debug, Clone, Default)]
struct Node {
    children: BTreeMap<char, Node>,
    terminal: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Trie {
    root: Node,
    len: usize,
}

impl Trie {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, word: &str) {
        let mut node = &mut self.root;
        for c in word.chars() {
            node = node.children.entry(c).or_default();
        }
        if !node.terminal {
            node.terminal = true;
            self.len += 1;
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.find(word).is_some_and(|node| node.terminal)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The single word `prefix` stands for: an exact match, or the only completion.
    pub fn complete(&self, prefix: &str) -> Result<String, TrieError> {
        if self.contains(prefix) {
            return Ok(prefix.to_string());
        }

        let mut completions = self.completions(prefix)?;
        match completions.len() {
            0 => Err(TrieError::NotAPrefix(prefix.to_string())),
            1 => Ok(completions.remove(0)),
            _ => Err(TrieError::NotAUniquePrefix {
                prefix: prefix.to_string(),
                completions,
            }),
        }
    }

    /// Every word starting with `prefix`, sorted.
    pub fn completions(&self, prefix: &str) -> Result<Vec<String>, TrieError> {
        let node = self
            .find(prefix)
            .ok_or_else(|| TrieError::NotAPrefix(prefix.to_string()))?;

        let mut words = Vec::new();
        collect(node, &mut prefix.to_string(), &mut words);
        Ok(words)
    }

    fn find(&self, prefix: &str) -> Option<&Node> {
        prefix
            .chars()
            .try_fold(&self.root, |node, c| node.children.get(&c))
    }
}

fn collect(node: &Node, word: &mut String, words: &mut Vec<String>) {
    if node.terminal {
        words.push(word.clone());
    }
    for (c, child) in &node.children {
        word.push(*c);
        collect(child, word, words);
        word.pop();
    }
}

impl<S: AsRef<str>> FromIterator<S> for Trie {
    fn from_iter<I: IntoIterator<Item = S>>(words: I) -> Self {
        let mut trie = Trie::new();
        for word in words {
            trie.insert(word.as_ref());
        }
        trie
    }
}
