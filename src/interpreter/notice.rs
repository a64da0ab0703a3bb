/// User-visible messages produced while running commands
///
/// The library never prints. Callers drain notices from the session and
/// decide where they go.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// A command ran and changed (or deliberately kept) state
    Executed(String),
    /// A recoverable problem; state was left untouched
    Warning(String),
    /// Plain output requested by the user (res, vars)
    Output(String),
}

impl Notice {
    pub fn is_warning(&self) -> bool {
        matches!(self, Notice::Warning(_))
    }

    pub fn message(&self) -> &str {
        match self {
            Notice::Executed(msg) | Notice::Warning(msg) | Notice::Output(msg) => msg,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Executed(msg) => write!(f, "Executed: {}", msg),
            Notice::Warning(msg) => write!(f, "Error: {}", msg),
            Notice::Output(msg) => write!(f, "{}", msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_display() {
        assert_eq!(
            Notice::Executed("Result negated".into()).to_string(),
            "Executed: Result negated"
        );
        assert_eq!(
            Notice::Warning("Invalid list of words".into()).to_string(),
            "Error: Invalid list of words"
        );
        assert_eq!(Notice::Output("Variables:".into()).to_string(), "Variables:");
    }
}
