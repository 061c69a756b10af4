use crate::Result;
use std::path::Path;

/// Fallback surface form for ids outside the vocabulary.
pub const UNK: &str = "<unk>";

/// Maps decoder token ids back to their surface form.
pub trait TokenLookup {
    /// The token for `id`, or `None` when the id is out of vocabulary.
    fn token(&self, id: u32) -> Option<String>;
}

/// Plain-text vocabulary indexed by line number: one token per line, first
/// whitespace-separated field.
#[derive(Debug, Clone)]
pub struct Vocab {
    tokens: Vec<String>,
}

impl Vocab {
    pub fn new(tokens: Vec<String>) -> Self {
        Self { tokens }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let tokens = raw
            .lines()
            .filter_map(|line| line.split_whitespace().next())
            .map(str::to_string)
            .collect();
        Ok(Self { tokens })
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl TokenLookup for Vocab {
    fn token(&self, id: u32) -> Option<String> {
        self.tokens.get(id as usize).cloned()
    }
}
