//! The frontier: a prioritized queue of not-yet-visited links.
//!
//! Ordering key is `relevance_score * (1 + confidence)`, descending. Ties
//! keep insertion order, so among equal scores the first-in link dequeues
//! first. Insertion is O(n); per-question frontiers stay in the tens of
//! nodes, so a sorted `Vec` beats a heap that cannot keep ties stable.

use answerscout_shared::UrlNode;

/// Priority queue over discovered links.
#[derive(Debug, Default)]
pub struct Frontier {
    items: Vec<UrlNode>,
}

impl Frontier {
    /// Construct an empty frontier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node before the first strictly-lower-priority entry.
    pub fn enqueue(&mut self, node: UrlNode) {
        let priority = node.priority();
        let position = self
            .items
            .iter()
            .position(|existing| priority > existing.priority());

        match position {
            Some(index) => self.items.insert(index, node),
            None => self.items.push(node),
        }
    }

    /// Remove and return the highest-priority node, if any.
    pub fn dequeue(&mut self) -> Option<UrlNode> {
        if self.items.is_empty() {
            None
        } else {
            Some(self.items.remove(0))
        }
    }

    /// Whether the frontier holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of queued nodes.
    pub fn len(&self) -> usize {
        self.items.len()
    }
}
