/// Vector space model
///
/// Embedding values, the immutable vocabulary, and the loader that builds it
/// from raw vector dumps.

pub mod embedding;
pub mod loader;
pub mod vocabulary;

pub use embedding::{Embedding, DEFAULT_DIMENSION};
pub use vocabulary::Vocabulary;
