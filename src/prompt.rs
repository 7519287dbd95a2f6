use is_terminal::IsTerminal;
use std::io::{self, BufRead, StdinLock, Stdout, Write};

use crate::error::{EnvconfError, Result};
use crate::reconcile::{Answer, AnswerValue, PromptKind, PromptRequest};

/// Something that can answer prompt requests, usually a person at a terminal.
pub trait Prompter {
    fn ask(&mut self, request: &PromptRequest) -> Result<AnswerValue>;

    /// Ask every request in order, collecting the answers.
    fn ask_all(&mut self, requests: &[PromptRequest]) -> Result<Vec<Answer>> {
        requests
            .iter()
            .map(|request| {
                self.ask(request).map(|value| Answer {
                    variable: request.variable.clone(),
                    value,
                })
            })
            .collect()
    }
}

/// Interactive prompter for a person at a terminal, rendered with cliclack.
///
/// Input prompts prefill the default, if any; an empty reply means the
/// default or an empty string. Confirms default to "no".
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for TerminalPrompter {
    fn ask(&mut self, request: &PromptRequest) -> Result<AnswerValue> {
        let failure = |err: io::Error| EnvconfError::PromptFailure {
            variable: request.variable.clone(),
            message: err.to_string(),
        };

        match request.kind {
            PromptKind::Input => {
                let mut input = cliclack::input(request.message()).required(false);
                if let Some(default) = &request.default_value {
                    input = input.default_input(default);
                }
                let value: String = input.interact().map_err(failure)?;
                Ok(AnswerValue::Text(value))
            }
            PromptKind::Confirm => {
                let value = cliclack::confirm(request.message())
                    .initial_value(false)
                    .interact()
                    .map_err(failure)?;
                Ok(AnswerValue::Flag(value))
            }
        }
    }
}

/// Prompter reading one answer per line, for answers piped into stdin.
///
/// Replies follow the terminal rules: an empty line takes the default, and
/// confirms accept `y`/`yes`.
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl LinePrompter<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_reply(&mut self, request: &PromptRequest) -> Result<String> {
        let failure = |message: String| EnvconfError::PromptFailure {
            variable: request.variable.clone(),
            message,
        };

        self.output
            .flush()
            .map_err(|err| failure(err.to_string()))?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(|err| failure(err.to_string()))?;
        if read == 0 {
            return Err(failure("input closed".to_string()));
        }

        let reply = line.strip_suffix('\n').unwrap_or(&line);
        Ok(reply.strip_suffix('\r').unwrap_or(reply).to_string())
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn ask(&mut self, request: &PromptRequest) -> Result<AnswerValue> {
        let written = match (request.kind, &request.default_value) {
            (PromptKind::Input, Some(default)) => {
                write!(self.output, "? {} [{default}] ", request.message())
            }
            (PromptKind::Input, None) => write!(self.output, "? {} ", request.message()),
            (PromptKind::Confirm, _) => write!(self.output, "? {} [y/N] ", request.message()),
        };
        written.map_err(|err| EnvconfError::PromptFailure {
            variable: request.variable.clone(),
            message: err.to_string(),
        })?;

        let reply = self.read_reply(request)?;
        let value = match request.kind {
            PromptKind::Input => match (&request.default_value, reply.is_empty()) {
                (Some(default), true) => AnswerValue::Text(default.clone()),
                _ => AnswerValue::Text(reply),
            },
            PromptKind::Confirm => {
                let reply = reply.trim().to_ascii_lowercase();
                AnswerValue::Flag(reply == "y" || reply == "yes")
            }
        };

        Ok(value)
    }
}

/// Prompter for the process: cliclack on a terminal, line answers otherwise.
pub fn stdio() -> Box<dyn Prompter> {
    if io::stdin().is_terminal() {
        Box::new(TerminalPrompter::new())
    } else {
        Box::new(LinePrompter::stdio())
    }
}

impl<P: Prompter + ?Sized> Prompter for Box<P> {
    fn ask(&mut self, request: &PromptRequest) -> Result<AnswerValue> {
        (**self).ask(request)
    }
}
