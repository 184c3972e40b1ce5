//! Crawl frontier: the FIFO queue of pending visits and the visited set
//!
//! A URL's canonical key enters the visited set at the moment the URL is
//! accepted into the queue, so a page linked from several siblings is queued
//! only once.

use std::collections::{HashSet, VecDeque};
use url::Url;

/// One pending visit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// Canonical key the entry was accepted under
    pub key: String,

    /// The URL to fetch
    pub url: Url,

    /// Link hops from the seed (the seed is depth 0)
    pub depth: u32,
}

/// FIFO frontier with enqueue-time deduplication
///
/// Popping from the front while pushing children at `depth + 1` to the back
/// yields breadth-first order: every depth-`d` entry is dequeued before any
/// depth-`d + 1` entry.
#[derive(Debug, Default)]
pub struct Frontier {
    /// Pending visits, oldest first
    queue: VecDeque<FrontierEntry>,

    /// Canonical keys of every URL ever accepted
    visited: HashSet<String>,

    /// Keys of pages already handed out or reached through a redirect
    fetched: HashSet<String>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `url` at `depth` unless `key` was accepted before
    ///
    /// # Returns
    ///
    /// * `true` - The URL was queued
    /// * `false` - The key was already visited; nothing changed
    pub fn push(&mut self, key: String, url: Url, depth: u32) -> bool {
        if !self.visited.insert(key.clone()) {
            return false;
        }
        self.queue.push_back(FrontierEntry { key, url, depth });
        true
    }

    /// Records that the page under `key` has been fetched
    ///
    /// Used for redirect targets: a later push of `key` is rejected, and an
    /// entry for `key` that is still queued is dropped when it reaches the
    /// front. Returns true if the key was not fetched before.
    pub fn mark_fetched(&mut self, key: String) -> bool {
        self.visited.insert(key.clone());
        self.fetched.insert(key)
    }

    /// Removes and returns the oldest entry whose page was not fetched yet
    pub fn pop(&mut self) -> Option<FrontierEntry> {
        while let Some(entry) = self.queue.pop_front() {
            if self.fetched.insert(entry.key.clone()) {
                return Some(entry);
            }
            tracing::debug!("Already fetched through a redirect: {}", entry.url);
        }
        None
    }

    /// Returns true if `key` was ever accepted
    pub fn is_visited(&self, key: &str) -> bool {
        self.visited.contains(key)
    }

    /// Number of entries waiting to be fetched
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true if nothing is waiting to be fetched
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
