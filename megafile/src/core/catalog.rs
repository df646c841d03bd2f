//! Topic catalog and the per-round topic draw.

use anyhow::{Result, bail};
use rand::Rng;

const DEFAULT_TOPICS: &[&str] = &[
    "binary search tree",
    "red-black tree",
    "trie",
    "LRU cache",
    "bloom filter",
    "union-find",
    "Dijkstra shortest path",
    "A* search",
    "topological sort",
    "Knuth-Morris-Pratt string search",
    "Huffman coding",
    "run-length encoding",
    "matrix multiplication",
    "fast Fourier transform",
    "quicksort",
    "merge sort",
    "heap sort",
    "consistent hashing",
    "rate limiter",
    "finite state machine",
    "tokenizer",
    "recursive descent parser",
    "Conway's Game of Life",
    "Mandelbrot set renderer",
    "linear regression",
    "k-means clustering",
    "priority queue",
    "skip list",
];

/// Fixed, non-empty, ordered set of candidate topics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicCatalog {
    topics: Vec<String>,
}

impl TopicCatalog {
    pub fn new(topics: Vec<String>) -> Result<Self> {
        if topics.is_empty() {
            bail!("topic catalog must not be empty");
        }
        if let Some(idx) = topics.iter().position(|t| t.trim().is_empty()) {
            bail!("topic catalog entry {idx} is blank");
        }
        Ok(Self { topics })
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Draw one topic uniformly at random. Draws are independent, so repeats
    /// (including back-to-back repeats) are expected.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        let idx = rng.gen_range(0..self.topics.len());
        &self.topics[idx]
    }
}

impl Default for TopicCatalog {
    fn default() -> Self {
        Self {
            topics: default_topics(),
        }
    }
}

/// Built-in catalog used when the config does not override `topics`.
pub fn default_topics() -> Vec<String> {
    DEFAULT_TOPICS.iter().map(|t| (*t).to_string()).collect()
}
