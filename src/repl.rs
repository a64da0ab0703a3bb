// Outer read loop
//
// Reads one line at a time, hands it to the session, prints whatever the
// session reports. Works on any reader/writer pair so it can be driven from
// tests as well as a terminal.

use crate::error::Result;
use crate::interpreter::{Flow, Session};
use std::io::{BufRead, Write};
use tracing::{debug, info};

pub struct Repl {
    session: Session,
    prompt: String,
}

impl Repl {
    pub fn new(session: Session, prompt: &str) -> Self {
        Self {
            session,
            prompt: prompt.to_string(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run until end of input or `exit`
    ///
    /// Aborted command lines are reported and the loop carries on; only I/O
    /// failures on `input`/`output` end it with an error.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut output: W) -> Result<()> {
        let mut line = String::new();

        loop {
            write!(output, "{}", self.prompt)?;
            output.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                debug!("end of input");
                writeln!(output)?;
                break;
            }

            if self.execute_line(&line, &mut output)? == Flow::Terminate {
                info!("session terminated by exit");
                break;
            }
        }

        Ok(())
    }

    /// Execute one line and print its notices
    pub fn execute_line<W: Write>(&mut self, line: &str, output: &mut W) -> Result<Flow> {
        self.session.parse(line);
        let outcome = self.session.run();

        for notice in self.session.take_notices() {
            writeln!(output, "{}", notice)?;
        }

        match outcome {
            Ok(flow) => Ok(flow),
            Err(e) => {
                writeln!(
                    output,
                    "Invalid command: {} (commands cleared)",
                    e.user_message()
                )?;
                Ok(Flow::Continue)
            }
        }
    }
}
