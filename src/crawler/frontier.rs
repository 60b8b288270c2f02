//! Frontier queue and visited set for one crawl
//!
//! This module handles:
//! - FIFO ordering of URLs waiting to be fetched (breadth-first by construction)
//! - Duplicate suppression against both the queue and the visited set
//! - Recording which URLs have been attempted

use crate::url::NormalizedUrl;
use std::collections::{HashSet, VecDeque};

/// Crawl state owned by a single engine
///
/// Invariants: a URL is never queued twice at the same time, and a URL that
/// has been marked visited is never queued again.
#[derive(Debug, Default)]
pub struct Frontier {
    /// URLs waiting to be fetched, in discovery order
    queue: VecDeque<NormalizedUrl>,

    /// Membership index for `queue`
    queued: HashSet<NormalizedUrl>,

    /// URLs already dequeued and attempted, whatever the outcome
    visited: HashSet<NormalizedUrl>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a URL to the tail of the queue
    ///
    /// # Returns
    ///
    /// `true` if the URL was queued, `false` if it was already queued or
    /// already visited
    pub fn push(&mut self, url: NormalizedUrl) -> bool {
        if self.visited.contains(&url) || self.queued.contains(&url) {
            return false;
        }
        self.queued.insert(url.clone());
        self.queue.push_back(url);
        true
    }

    /// Removes and returns the head of the queue
    pub fn pop(&mut self) -> Option<NormalizedUrl> {
        let url = self.queue.pop_front()?;
        self.queued.remove(&url);
        Some(url)
    }

    /// Records that a URL has been attempted
    pub fn mark_visited(&mut self, url: NormalizedUrl) {
        self.visited.insert(url);
    }

    pub fn is_visited(&self, url: &NormalizedUrl) -> bool {
        self.visited.contains(url)
    }

    /// Number of URLs waiting in the queue
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Consumes the frontier, returning the URLs never dequeued
    pub fn into_remaining(self) -> Vec<NormalizedUrl> {
        self.queue.into_iter().collect()
    }
}
