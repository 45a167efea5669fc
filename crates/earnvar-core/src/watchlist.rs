//! Watch-lists of tickers, loaded from plain-text files.
//!
//! One ticker per line; blank lines and `#` comments are ignored. Each list
//! carries a label (typically the broker or platform the tickers trade on).

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

use crate::Symbol;

#[derive(Debug, Error)]
pub enum WatchlistError {
    #[error("failed to read watch-list {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedList {
    pub label: String,
    pub symbols: BTreeSet<Symbol>,
}

impl NamedList {
    /// Invalid tickers are skipped with a warning.
    pub fn from_lines(label: impl Into<String>, text: &str) -> Self {
        let label = label.into();
        let symbols = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| match Symbol::parse(line) {
                Ok(symbol) => Some(symbol),
                Err(error) => {
                    warn!(list = %label, line, %error, "skipping watch-list entry");
                    None
                }
            })
            .collect();
        Self { label, symbols }
    }

    pub fn load(path: &Path, label: impl Into<String>) -> Result<Self, WatchlistError> {
        let text = std::fs::read_to_string(path).map_err(|source| WatchlistError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_lines(label, &text))
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.symbols.contains(symbol)
    }
}

/// Union of named lists. An empty watch-list admits every symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Watchlist {
    lists: Vec<NamedList>,
}

impl Watchlist {
    pub fn new(lists: Vec<NamedList>) -> Self {
        Self { lists }
    }

    pub fn unrestricted() -> Self {
        Self::default()
    }

    pub fn push(&mut self, list: NamedList) {
        self.lists.push(list);
    }

    pub fn is_unrestricted(&self) -> bool {
        self.lists.is_empty()
    }

    pub fn admits(&self, symbol: &Symbol) -> bool {
        self.is_unrestricted() || self.lists.iter().any(|list| list.contains(symbol))
    }

    /// Labels of every list containing `symbol`, in insertion order.
    pub fn platforms_for(&self, symbol: &Symbol) -> Vec<String> {
        self.lists
            .iter()
            .filter(|list| list.contains(symbol))
            .map(|list| list.label.clone())
            .collect()
    }
}
