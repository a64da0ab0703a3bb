/// Error types for word-arith
///
/// This module defines all possible errors that can occur in the application.
/// Uses thiserror for ergonomic error handling.
///
/// Interpreter errors come in two tiers, see [`Severity`].

use thiserror::Error;

/// How the interpreter reacts to an error raised by a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Reported, state untouched, the next queued command still runs
    Warning,
    /// Reported once, the rest of the pending queue is discarded
    Abort,
}

/// Main error type for word-arith operations
#[derive(Error, Debug)]
pub enum WordArithError {
    /// I/O errors (model shards, config file, terminal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// No shard produced a single usable entry
    #[error("No vectors could be loaded from {0}")]
    EmptyVocabulary(String),

    /// Wrong number of tokens for a command
    #[error("Too many/few arguments for '{command}', should be {expected}")]
    ArgumentCount { command: String, expected: String },

    /// No command matches the first token
    #[error("Command {command} is not recognized")]
    UnknownCommand {
        command: String,
        hint: Option<String>,
    },

    /// The command needs a current result and there is none
    #[error("No current result for '{0}'")]
    Precondition(String),

    /// Unparsable scalar or malformed word list
    #[error("{0}")]
    Format(String),

    /// Normalization of a zero-norm vector
    #[error("Cannot normalize a zero-norm vector: {0}")]
    DegenerateVector(String),

    /// Cosine requested with a zero-norm operand
    #[error("{0}")]
    ZeroNormOperand(String),

    /// Neighbor search produced no candidate
    #[error("No similar vector found")]
    NoMatch,

    /// Invalid argument passed to a library call
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Result type alias for word-arith operations
pub type Result<T> = std::result::Result<T, WordArithError>;

impl WordArithError {
    /// Tier of this error when it escapes a command handler
    pub fn severity(&self) -> Severity {
        match self {
            WordArithError::Format(_)
            | WordArithError::ZeroNormOperand(_)
            | WordArithError::NoMatch => Severity::Warning,
            _ => Severity::Abort,
        }
    }

    /// Convert WordArithError to a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            WordArithError::Io(e) => {
                format!("File system error. Check permissions. Details: {}", e)
            }
            WordArithError::Serialization(e) => {
                format!("Data format error: {}", e)
            }
            WordArithError::Config(msg) => {
                format!("Configuration issue: {}", msg)
            }
            WordArithError::EmptyVocabulary(path) => {
                format!("No word vectors found under {}", path)
            }
            WordArithError::UnknownCommand { command, hint } => match hint {
                Some(hint) => format!(
                    "Command {} is not recognized, did you mean '{}'?",
                    command, hint
                ),
                None => format!("Command {} is not recognized", command),
            },
            WordArithError::Precondition(command) => {
                format!("No current result, '{}' needs one", command)
            }
            other => other.to_string(),
        }
    }
}
