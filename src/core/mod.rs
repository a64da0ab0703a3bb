/// Core search functionality
///
/// Nearest, farthest and analogy queries over the vocabulary.

pub mod searcher;

pub use searcher::{Neighbor, Searcher};
