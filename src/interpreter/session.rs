// One interactive session: a command queue, a current result register and
// a set of named variables, all owned here and threaded through every
// handler. The vocabulary is shared read-only.
//
// Errors from handlers come in two tiers (see error::Severity). Warnings are
// reported and the queue keeps going. Anything else empties the queue and
// goes back to the caller.

use crate::core::{Neighbor, Searcher};
use crate::error::{Result, Severity, WordArithError};
use crate::interpreter::{Command, Notice};
use crate::model::{Embedding, Vocabulary};
use regex::Regex;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, LazyLock};
use tracing::debug;

/// Separates chained commands within one input line
pub const DEFAULT_DELIMITER: &str = ">>";

static VARIABLE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("variable name pattern"));

// mean takes plain words only
static WORD_LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w+(\s*,\s*\w+)*$").expect("word list pattern"));

// sim also accepts a leading '-' on a term to subtract it
static SIGNED_WORD_LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\w+(\s*,\s*-?\w+)*$").expect("signed word list pattern"));

/// What the caller should do after `run` returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Terminate,
}

pub struct Session {
    searcher: Searcher,
    delimiter: String,
    queue: VecDeque<String>,
    register: Option<Embedding>,
    environment: HashMap<String, Embedding>,
    notices: Vec<Notice>,
}

impl Session {
    pub fn new(vocab: Arc<Vocabulary>) -> Self {
        Self::with_delimiter(vocab, DEFAULT_DELIMITER)
    }

    pub fn with_delimiter(vocab: Arc<Vocabulary>, delimiter: &str) -> Self {
        Self {
            searcher: Searcher::new(vocab),
            delimiter: delimiter.to_string(),
            queue: VecDeque::new(),
            register: None,
            environment: HashMap::new(),
            notices: Vec::new(),
        }
    }

    /// Current result, if any
    pub fn register(&self) -> Option<&Embedding> {
        self.register.as_ref()
    }

    pub fn environment(&self) -> &HashMap<String, Embedding> {
        &self.environment
    }

    pub fn variable(&self, name: &str) -> Option<&Embedding> {
        self.environment.get(name)
    }

    /// Commands still waiting to run, front first
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.queue.iter().map(String::as_str)
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        self.searcher.vocabulary()
    }

    /// Drain the notices produced since the last call
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Queue the commands of one input line
    ///
    /// The line is lowercased and split on the delimiter; blank pieces are
    /// dropped.
    pub fn parse(&mut self, line: &str) {
        let line = line.to_lowercase();
        let commands = line
            .split(self.delimiter.as_str())
            .map(str::trim)
            .filter(|cmd| !cmd.is_empty())
            .map(str::to_string);

        self.queue.extend(commands);
    }

    /// Run queued commands until the queue is empty
    ///
    /// # Returns
    /// * `Ok(Flow::Continue)` - Queue drained, ask for more input
    /// * `Ok(Flow::Terminate)` - `exit` was reached
    /// * `Err(_)` - A command aborted; the remaining queue was discarded
    pub fn run(&mut self) -> Result<Flow> {
        while let Some(raw) = self.queue.front().cloned() {
            debug!(command = %raw, "dispatching");

            match Command::parse(&raw).and_then(|command| self.execute(command)) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Terminate) => {
                    self.queue.clear();
                    return Ok(Flow::Terminate);
                }
                Err(e) if e.severity() == Severity::Warning => {
                    debug!(command = %raw, error = %e, "command warning");
                    self.notices.push(Notice::Warning(e.user_message()));
                }
                Err(e) => {
                    debug!(
                        command = %raw,
                        error = %e,
                        discarded = self.queue.len(),
                        "command aborted, clearing queue"
                    );
                    self.queue.clear();
                    return Err(e);
                }
            }

            self.queue.pop_front();
        }

        Ok(Flow::Continue)
    }

    fn execute(&mut self, command: Command) -> Result<Flow> {
        match command {
            Command::Get(name) => {
                self.register = Some(self.resolve(&name));
                self.executed(format!("Result set to the value of: {}", name));
            }
            Command::Add(name) => {
                let updated = self.require_register("add")?.add(&self.resolve(&name));
                self.register = Some(updated);
                self.executed(format!("Result added with the value of: {}", name));
            }
            Command::Sub(name) => {
                let updated = self.require_register("sub")?.sub(&self.resolve(&name));
                self.register = Some(updated);
                self.executed(format!("Result subtracted with the value of: {}", name));
            }
            Command::Mul(arg) => {
                let factor = parse_scalar(&arg)?;
                let updated = self.require_register("mul")?.scale(factor);
                self.register = Some(updated);
                self.executed(format!("Result multiplied by {}", format_scalar(factor)));
            }
            Command::Div(arg) => {
                let denominator = parse_scalar(&arg)?;
                if denominator == 0.0 {
                    return Err(WordArithError::Format(
                        "Cannot divide by zero, result not changed".to_string(),
                    ));
                }
                let updated = self.require_register("div")?.divide(denominator);
                self.register = Some(updated);
                self.executed(format!("Result divided by {}", format_scalar(denominator)));
            }
            Command::Mean(list) => self.mean(&list)?,
            Command::Neg => {
                let updated = self.require_register("neg")?.negate();
                self.register = Some(updated);
                self.executed("Result negated".to_string());
            }
            Command::Norm => {
                let updated = self.require_register("norm")?.unit()?;
                self.register = Some(updated);
                self.executed("Result normalized".to_string());
            }
            Command::Cos(name) => self.cosine(&name)?,
            Command::Sim(list) => self.similar(list.as_deref())?,
            Command::SaveTo(name) => self.save(&name)?,
            Command::Res => {
                let line = match &self.register {
                    Some(v) => format!("Current result: {}", v),
                    None => "No current result".to_string(),
                };
                self.notices.push(Notice::Output(line));
            }
            Command::Reset => {
                self.environment.clear();
                self.register = None;
                self.executed("Memory cleared".to_string());
            }
            Command::Vars => self.vars(),
            Command::Exit => return Ok(Flow::Terminate),
        }

        Ok(Flow::Continue)
    }

    /// Variable first, then the vocabulary
    fn resolve(&self, name: &str) -> Embedding {
        if let Some(v) = self.environment.get(name) {
            debug!(name, "retrieved from local variables");
            return v.clone();
        }

        debug!(name, "retrieved from model");
        self.searcher.vocabulary().lookup_word(name)
    }

    fn require_register(&self, command: &str) -> Result<&Embedding> {
        self.register
            .as_ref()
            .ok_or_else(|| WordArithError::Precondition(command.to_string()))
    }

    fn executed(&mut self, message: String) {
        self.notices.push(Notice::Executed(message));
    }

    fn mean(&mut self, list: &str) -> Result<()> {
        if !WORD_LIST.is_match(list) {
            return Err(invalid_list());
        }

        let words: Vec<&str> = list.split(',').map(str::trim).collect();
        let vectors: Vec<Embedding> = words.iter().map(|w| self.resolve(w)).collect();
        let mean = Embedding::sum(self.vocabulary().dimension(), &vectors)
            .divide(vectors.len() as f64);

        self.register = Some(mean);
        self.executed(format!("Result changed to mean for words: {:?}", words));
        Ok(())
    }

    fn cosine(&mut self, name: &str) -> Result<()> {
        let other = self.resolve(name);
        let similarity = self.require_register("cos")?.cosine(&other).ok_or_else(|| {
            WordArithError::ZeroNormOperand(
                "Could not calculate cosine similarity, result not changed".to_string(),
            )
        })?;

        self.executed(format!(
            "Cosine similarity is: {}, result not changed",
            similarity
        ));
        Ok(())
    }

    fn similar(&mut self, list: Option<&str>) -> Result<()> {
        let found: Option<Neighbor> = match list {
            None => {
                let current = self.require_register("sim")?;
                self.searcher.most_similar(current)
            }
            Some(list) => {
                if !SIGNED_WORD_LIST.is_match(list) {
                    return Err(invalid_list());
                }

                let mut positive = Vec::new();
                let mut negative = Vec::new();
                for term in list.split(',').map(str::trim) {
                    match term.strip_prefix('-') {
                        Some(word) => negative.push(self.resolve(word)),
                        None => positive.push(self.resolve(term)),
                    }
                }
                self.searcher.analogy(&positive, &negative, false)?
            }
        };

        let neighbor = found.ok_or(WordArithError::NoMatch)?;
        self.executed(format!(
            "The most similar word is: {}, result changed",
            neighbor.word
        ));
        self.register = Some(neighbor.vector);
        Ok(())
    }

    fn save(&mut self, name: &str) -> Result<()> {
        let current = self.require_register("saveto")?.clone();

        if !VARIABLE_NAME.is_match(name) {
            return Err(WordArithError::Format(
                "variable name can only contain alphanumeric and underscores".to_string(),
            ));
        }

        self.environment.insert(name.to_string(), current);
        self.executed(format!("Current result saved to variable {}", name));
        Ok(())
    }

    fn vars(&mut self) {
        let mut names: Vec<&String> = self.environment.keys().collect();
        names.sort();

        let mut lines = vec!["Variables:".to_string()];
        for name in names {
            lines.push(format!("{}:  {}", name, self.environment[name]));
        }

        self.notices.push(Notice::Output(lines.join("\n")));
    }
}

fn parse_scalar(arg: &str) -> Result<f64> {
    match arg.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(WordArithError::Format(
            "Could not parse this number, result not changed".to_string(),
        )),
    }
}

// Plain decimal for everyday magnitudes, scientific otherwise
fn format_scalar(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude == 0.0 || (1e-4..1e6).contains(&magnitude) {
        format!("{}", value)
    } else {
        format!("{:e}", value)
    }
}

fn invalid_list() -> WordArithError {
    WordArithError::Format("Invalid list of words".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Arc<Vocabulary> {
        Arc::new(Vocabulary::from_entries(
            3,
            vec![
                ("king", Embedding::from_vec(vec![1.0, 0.0, 0.0])),
                ("man", Embedding::from_vec(vec![0.0, 1.0, 0.0])),
                ("woman", Embedding::from_vec(vec![0.0, 1.0, 1.0])),
                ("queen", Embedding::from_vec(vec![1.0, 0.0, 1.0])),
            ],
        ))
    }

    fn session() -> Session {
        Session::new(vocab())
    }

    fn run_line(session: &mut Session, line: &str) -> Result<Flow> {
        session.parse(line);
        session.run()
    }

    fn word(session: &Session, w: &str) -> Embedding {
        session.vocabulary().lookup_word(w)
    }

    #[test]
    fn test_parse_splits_and_lowercases() {
        let mut s = session();
        s.parse("GET King >>  >> add  man>>");

        let pending: Vec<&str> = s.pending().collect();
        assert_eq!(pending, vec!["get king", "add  man"]);
    }

    #[test]
    fn test_king_minus_man_plus_woman() {
        let mut s = session();
        let flow = run_line(&mut s, "get king >> sub man >> add woman").unwrap();

        assert_eq!(flow, Flow::Continue);
        let expected = &(&word(&s, "king") - &word(&s, "man")) + &word(&s, "woman");
        assert_eq!(s.register(), Some(&expected));
        assert_eq!(s.pending().count(), 0);
    }

    #[test]
    fn test_add_without_register_aborts() {
        let mut s = session();
        let result = run_line(&mut s, "add king >> get man");

        assert!(matches!(result, Err(WordArithError::Precondition(_))));
        assert!(s.register().is_none());
        assert_eq!(s.pending().count(), 0);
    }

    #[test]
    fn test_unknown_command_aborts_before_save() {
        let mut s = session();
        run_line(&mut s, "get king").unwrap();

        let result = run_line(&mut s, "badcmd >> saveto x");

        assert!(matches!(result, Err(WordArithError::UnknownCommand { .. })));
        assert!(s.environment().is_empty());
        assert_eq!(s.pending().count(), 0);
    }

    #[test]
    fn test_commands_before_abort_still_apply() {
        let mut s = session();
        let result = run_line(&mut s, "get king >> get >> get man");

        assert!(matches!(result, Err(WordArithError::ArgumentCount { .. })));
        assert_eq!(s.register(), Some(&word(&s, "king")));
    }

    #[test]
    fn test_mul_and_div() {
        let mut s = session();
        run_line(&mut s, "get king >> mul 2 >> div 4").unwrap();

        let expected = word(&s, "king").scale(2.0).divide(4.0);
        assert_eq!(s.register(), Some(&expected));
    }

    #[test]
    fn test_bad_scalar_is_warning() {
        let mut s = session();
        run_line(&mut s, "get king >> mul two >> div 0 >> neg").unwrap();

        let warnings = s.take_notices().into_iter().filter(Notice::is_warning).count();
        assert_eq!(warnings, 2);
        // neg still ran after the warnings
        assert_eq!(s.register(), Some(&word(&s, "king").negate()));
    }

    #[test]
    fn test_mul_without_register_aborts() {
        let mut s = session();
        assert!(matches!(
            run_line(&mut s, "mul 2"),
            Err(WordArithError::Precondition(_))
        ));
    }

    #[test]
    fn test_div_without_register_aborts_after_warning() {
        let mut s = session();
        let result = run_line(&mut s, "div x >> div 2 >> get man");

        assert!(matches!(result, Err(WordArithError::Precondition(_))));
        assert!(s.register().is_none());
        assert_eq!(s.pending().count(), 0);
        let notices = s.take_notices();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].is_warning());
    }

    #[test]
    fn test_sub_without_register_aborts() {
        let mut s = session();
        let result = run_line(&mut s, "sub man >> get king");

        assert!(matches!(result, Err(WordArithError::Precondition(_))));
        assert!(s.register().is_none());
        assert_eq!(s.pending().count(), 0);
    }

    #[test]
    fn test_cos_without_register_aborts() {
        let mut s = session();
        let result = run_line(&mut s, "cos king >> get man");

        assert!(matches!(result, Err(WordArithError::Precondition(_))));
        assert!(s.register().is_none());
        assert_eq!(s.pending().count(), 0);
    }

    #[test]
    fn test_scalar_notices_stay_short() {
        let mut s = session();
        run_line(&mut s, "get king >> mul 1e308 >> div 2.5").unwrap();

        let messages: Vec<String> = s
            .take_notices()
            .into_iter()
            .map(|n| n.message().to_string())
            .collect();
        assert!(messages.contains(&"Result multiplied by 1e308".to_string()));
        assert!(messages.contains(&"Result divided by 2.5".to_string()));
    }

    #[test]
    fn test_sim_of_overflowed_register_no_match() {
        let mut s = session();
        run_line(&mut s, "get king >> mul 1e308 >> mul 1e308 >> sim").unwrap();

        let overflowed = s.register().unwrap().clone();
        assert!(!overflowed.is_finite());
        assert_eq!(
            s.take_notices().last(),
            Some(&Notice::Warning("No similar vector found".to_string()))
        );
    }

    #[test]
    fn test_mean() {
        let mut s = session();
        run_line(&mut s, "mean king,man,woman").unwrap();

        let expected = Embedding::sum(
            3,
            &[word(&s, "king"), word(&s, "man"), word(&s, "woman")],
        )
        .divide(3.0);
        assert_eq!(s.register(), Some(&expected));
    }

    #[test]
    fn test_mean_malformed_list() {
        let mut s = session();
        run_line(&mut s, "get king >> mean king,,man >> mean -king,man").unwrap();

        assert_eq!(s.register(), Some(&word(&s, "king")));
        let notices = s.take_notices();
        assert_eq!(notices.iter().filter(|n| n.is_warning()).count(), 2);
    }

    #[test]
    fn test_norm() {
        let mut s = session();
        run_line(&mut s, "get king >> norm").unwrap();
        let norm = s.register().unwrap().norm();
        assert!((norm - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_norm_of_zero_register_faults() {
        let mut s = session();
        let result = run_line(&mut s, "get nothing >> norm >> saveto z");

        assert!(matches!(result, Err(WordArithError::DegenerateVector(_))));
        assert!(s.variable("z").is_none());
        assert!(s.register().unwrap().is_zero());
    }

    #[test]
    fn test_cosine_reports_without_change() {
        let mut s = session();
        run_line(&mut s, "get king >> cos king").unwrap();

        assert_eq!(s.register(), Some(&word(&s, "king")));
        let notices = s.take_notices();
        assert!(notices
            .last()
            .unwrap()
            .message()
            .starts_with("Cosine similarity is: 1"));
    }

    #[test]
    fn test_cosine_zero_operand_is_warning() {
        let mut s = session();
        run_line(&mut s, "get king >> cos unknownword >> saveto k").unwrap();

        assert!(s.take_notices().iter().any(Notice::is_warning));
        assert_eq!(s.variable("k"), Some(&word(&s, "king")));
    }

    #[test]
    fn test_sim_nearest_of_register() {
        let mut s = session();
        run_line(&mut s, "get king >> sim").unwrap();

        assert_eq!(s.register(), Some(&word(&s, "queen")));
    }

    #[test]
    fn test_sim_analogy() {
        let mut s = session();
        run_line(&mut s, "sim king,-man,woman").unwrap();

        assert_eq!(s.register(), Some(&word(&s, "queen")));
    }

    #[test]
    fn test_sim_zero_register_no_match() {
        let mut s = session();
        run_line(&mut s, "get nothing >> sim").unwrap();

        assert!(s.register().unwrap().is_zero());
        let notices = s.take_notices();
        assert_eq!(
            notices.last(),
            Some(&Notice::Warning("No similar vector found".to_string()))
        );
    }

    #[test]
    fn test_sim_without_register_aborts() {
        let mut s = session();
        assert!(matches!(
            run_line(&mut s, "sim"),
            Err(WordArithError::Precondition(_))
        ));
    }

    #[test]
    fn test_sim_malformed_list_is_warning() {
        let mut s = session();
        run_line(&mut s, "sim king,,man").unwrap();

        assert!(s.register().is_none());
        assert!(s.take_notices().iter().any(Notice::is_warning));
    }

    #[test]
    fn test_saveto_and_variables_shadow_words() {
        let mut s = session();
        run_line(&mut s, "get woman >> saveto king >> get king").unwrap();

        assert_eq!(s.register(), Some(&word(&s, "woman")));
        assert_eq!(s.variable("king"), Some(&word(&s, "woman")));
    }

    #[test]
    fn test_saveto_invalid_name_is_warning() {
        let mut s = session();
        run_line(&mut s, "get king >> saveto bad-name >> saveto good_name").unwrap();

        assert!(s.variable("bad-name").is_none());
        assert!(s.variable("good_name").is_some());
    }

    #[test]
    fn test_saveto_without_register_aborts() {
        let mut s = session();
        assert!(matches!(
            run_line(&mut s, "saveto x"),
            Err(WordArithError::Precondition(_))
        ));
    }

    #[test]
    fn test_reset_clears_state_not_queue() {
        let mut s = session();
        run_line(&mut s, "get king >> saveto a").unwrap();

        s.parse("reset >> get man");
        s.run().unwrap();

        assert!(s.environment().is_empty());
        assert_eq!(s.register(), Some(&word(&s, "man")));
    }

    #[test]
    fn test_res_and_vars_output() {
        let mut s = session();
        run_line(&mut s, "res >> get king >> saveto b >> saveto a >> vars").unwrap();

        let outputs: Vec<String> = s
            .take_notices()
            .into_iter()
            .filter_map(|n| match n {
                Notice::Output(msg) => Some(msg),
                _ => None,
            })
            .collect();

        assert_eq!(outputs[0], "No current result");
        let vars: Vec<&str> = outputs[1].lines().collect();
        assert_eq!(vars[0], "Variables:");
        assert!(vars[1].starts_with("a:"));
        assert!(vars[2].starts_with("b:"));
    }

    #[test]
    fn test_exit_terminates() {
        let mut s = session();
        let flow = run_line(&mut s, "get king >> exit >> get man").unwrap();

        assert_eq!(flow, Flow::Terminate);
        assert_eq!(s.register(), Some(&word(&s, "king")));
        assert_eq!(s.pending().count(), 0);
    }

    #[test]
    fn test_custom_delimiter() {
        let mut s = Session::with_delimiter(vocab(), ";");
        run_line(&mut s, "get king; neg").unwrap();

        assert_eq!(s.register(), Some(&word(&s, "king").negate()));
    }
}
