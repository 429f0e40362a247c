//! Symbol universe: the fixed, ordered set of tickers the engine sweeps.
//! Loaded once at startup from an optional file, falling back to a
//! built-in default list. Immutable for the process lifetime.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

/// Default universe used when no symbol file is configured.
pub const DEFAULT_UNIVERSE: &[&str] = &[
    "RELIANCE.NS",
    "TCS.NS",
    "INFY.NS",
    "HDFCBANK.NS",
    "ICICIBANK.NS",
    "SBIN.NS",
];

/// Maximum number of results returned by a symbol search.
pub const SEARCH_LIMIT: usize = 50;

/// Case-normalized ticker identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(raw: &str) -> Self {
        Symbol(raw.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Symbol with the exchange suffix stripped, e.g. "TCS.NS" -> "TCS".
    /// Used as the news query topic and for suffix-stripped search matching.
    pub fn topic(&self) -> &str {
        self.0.split('.').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(raw: &str) -> Self {
        Symbol::new(raw)
    }
}

/// A search hit: symbol plus display name. The universe carries no
/// company-name metadata, so the name mirrors the symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolMatch {
    pub symbol: Symbol,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Universe {
    symbols: Vec<Symbol>,
}

impl Universe {
    /// Load the universe from a file with one symbol per line. A missing or
    /// unreadable file falls back to the built-in default list.
    pub fn load(file: Option<&Path>) -> Self {
        if let Some(path) = file {
            match std::fs::read_to_string(path) {
                Ok(contents) => {
                    let symbols: Vec<Symbol> = contents
                        .lines()
                        .map(str::trim)
                        .filter(|line| !line.is_empty())
                        .map(Symbol::new)
                        .collect();
                    if !symbols.is_empty() {
                        info!(count = symbols.len(), file = %path.display(), "Loaded symbol universe");
                        return Universe { symbols };
                    }
                    warn!(file = %path.display(), "Symbol file is empty, using default universe");
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Failed to read symbol file, using default universe");
                }
            }
        }
        Universe::default()
    }

    pub fn from_symbols(symbols: Vec<Symbol>) -> Self {
        Universe { symbols }
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Slice of at most `size` symbols starting at `start`, clamped to the
    /// end of the universe. Empty once the cursor runs past the end.
    pub fn batch(&self, start: usize, size: usize) -> &[Symbol] {
        if start >= self.symbols.len() {
            return &[];
        }
        let end = (start + size).min(self.symbols.len());
        &self.symbols[start..end]
    }

    /// Case-insensitive substring search over both the raw symbol and its
    /// suffix-stripped form, capped at SEARCH_LIMIT, universe order preserved.
    pub fn search(&self, query: &str) -> Vec<SymbolMatch> {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return Vec::new();
        }
        self.symbols
            .iter()
            .filter(|s| {
                s.as_str().to_lowercase().contains(&q) || s.topic().to_lowercase().contains(&q)
            })
            .take(SEARCH_LIMIT)
            .map(|s| SymbolMatch {
                symbol: s.clone(),
                name: s.as_str().to_string(),
            })
            .collect()
    }
}

impl Default for Universe {
    fn default() -> Self {
        Universe {
            symbols: DEFAULT_UNIVERSE.iter().map(|s| Symbol::new(s)).collect(),
        }
    }
}
