// Typed commands
//
// A queued string becomes a Command by an exact match on its first token,
// then an argument count check. Argument *contents* (numbers, word lists,
// variable names) are validated later by the handlers, since a bad value is
// only a warning while a bad shape aborts the line.

use crate::error::{Result, WordArithError};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

/// Every command name the interpreter understands
pub const COMMAND_NAMES: &[&str] = &[
    "get", "add", "sub", "mul", "div", "mean", "neg", "norm", "cos", "sim", "saveto", "res",
    "reset", "vars", "exit",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// register := resolve(name)
    Get(String),
    /// register += resolve(name)
    Add(String),
    /// register -= resolve(name)
    Sub(String),
    /// register *= scalar
    Mul(String),
    /// register /= scalar
    Div(String),
    /// register := mean of a comma separated word list
    Mean(String),
    Neg,
    Norm,
    /// Report cosine(register, resolve(name))
    Cos(String),
    /// Nearest neighbor of the register, or an analogy over a signed word list
    Sim(Option<String>),
    SaveTo(String),
    Res,
    Reset,
    Vars,
    Exit,
}

impl Command {
    /// Parse one queued command string
    ///
    /// # Returns
    /// * `Err(WordArithError::UnknownCommand)` - First token is not a command
    /// * `Err(WordArithError::ArgumentCount)` - Wrong number of tokens
    pub fn parse(raw: &str) -> Result<Command> {
        let tokens: Vec<&str> = raw.split_whitespace().collect();
        let Some(&name) = tokens.first() else {
            return Err(unknown(raw));
        };

        let command = match name {
            "get" => Command::Get(single_arg(&tokens)?),
            "add" => Command::Add(single_arg(&tokens)?),
            "sub" => Command::Sub(single_arg(&tokens)?),
            "mul" => Command::Mul(single_arg(&tokens)?),
            "div" => Command::Div(single_arg(&tokens)?),
            "mean" => Command::Mean(single_arg(&tokens)?),
            "cos" => Command::Cos(single_arg(&tokens)?),
            "saveto" => Command::SaveTo(single_arg(&tokens)?),
            "sim" => match tokens.len() {
                1 => Command::Sim(None),
                2 => Command::Sim(Some(tokens[1].to_string())),
                _ => return Err(arg_count("sim", "1 or 2")),
            },
            "neg" => no_args(&tokens, Command::Neg)?,
            "norm" => no_args(&tokens, Command::Norm)?,
            "res" => no_args(&tokens, Command::Res)?,
            "reset" => no_args(&tokens, Command::Reset)?,
            "vars" => no_args(&tokens, Command::Vars)?,
            "exit" => no_args(&tokens, Command::Exit)?,
            _ => return Err(unknown(raw)),
        };

        Ok(command)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Get(_) => "get",
            Command::Add(_) => "add",
            Command::Sub(_) => "sub",
            Command::Mul(_) => "mul",
            Command::Div(_) => "div",
            Command::Mean(_) => "mean",
            Command::Neg => "neg",
            Command::Norm => "norm",
            Command::Cos(_) => "cos",
            Command::Sim(_) => "sim",
            Command::SaveTo(_) => "saveto",
            Command::Res => "res",
            Command::Reset => "reset",
            Command::Vars => "vars",
            Command::Exit => "exit",
        }
    }
}

fn single_arg(tokens: &[&str]) -> Result<String> {
    if tokens.len() != 2 {
        return Err(arg_count(tokens[0], "2"));
    }
    Ok(tokens[1].to_string())
}

fn no_args(tokens: &[&str], command: Command) -> Result<Command> {
    if tokens.len() != 1 {
        return Err(arg_count(tokens[0], "1"));
    }
    Ok(command)
}

fn arg_count(command: &str, expected: &str) -> WordArithError {
    WordArithError::ArgumentCount {
        command: command.to_string(),
        expected: expected.to_string(),
    }
}

fn unknown(raw: &str) -> WordArithError {
    WordArithError::UnknownCommand {
        command: raw.to_string(),
        hint: closest_command(raw.split_whitespace().next().unwrap_or("")),
    }
}

/// Best fuzzy match among the known command names
fn closest_command(name: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }

    let matcher = SkimMatcherV2::default();
    COMMAND_NAMES
        .iter()
        .filter_map(|candidate| {
            matcher
                .fuzzy_match(candidate, name)
                .map(|score| (score, *candidate))
        })
        .max_by_key(|(score, _)| *score)
        .map(|(_, candidate)| candidate.to_string())
}
