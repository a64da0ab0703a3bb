/// word-arith library
///
/// Word-vector arithmetic, nearest-neighbor and analogy queries, driven by
/// chained command lines.

pub mod config;
pub mod core;
pub mod error;
pub mod interpreter;
pub mod model;
pub mod repl;

// Re-exports for convenience
pub use config::Config;
pub use error::{Result, Severity, WordArithError};
pub use interpreter::{Flow, Session};
pub use model::{Embedding, Vocabulary};
