//! Selector Cache
//!
//! Memoizes parsed selector lists by source text. Parse failures are cached
//! too so a malformed selector used in a loop is only reported once.

use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use crate::{CssError, SelectorList};

type CachedResult = Result<Rc<SelectorList>, CssError>;

/// Parsed-selector cache with FIFO eviction
#[derive(Debug)]
pub struct SelectorCache {
    cache: HashMap<String, CachedResult>,
    /// Insertion order, oldest first
    order: VecDeque<String>,
    /// Maximum cache entries
    max_entries: usize,
    hits: u64,
    misses: u64,
}

impl SelectorCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            cache: HashMap::new(),
            order: VecDeque::new(),
            max_entries,
            hits: 0,
            misses: 0,
        }
    }

    /// Parse `selector`, reusing an earlier result when present
    pub fn get_or_parse(&mut self, selector: &str) -> CachedResult {
        if let Some(cached) = self.cache.get(selector) {
            self.hits += 1;
            return cached.clone();
        }
        self.misses += 1;

        let parsed = SelectorList::parse(selector).map(Rc::new);
        if self.max_entries == 0 {
            return parsed;
        }
        if self.cache.len() >= self.max_entries {
            self.evict_oldest();
        }
        self.cache.insert(selector.to_string(), parsed.clone());
        self.order.push_back(selector.to_string());
        parsed
    }

    /// Clear all cached entries
    pub fn clear(&mut self) {
        self.cache.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Stats
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.cache.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }

    fn evict_oldest(&mut self) {
        if let Some(oldest) = self.order.pop_front() {
            self.cache.remove(&oldest);
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}
