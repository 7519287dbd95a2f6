//! Decides which variables an output file still needs and renders the
//! answers back into dotenv text.
//!
//! Create mode works from the template: blank or forced variables are asked
//! for, and answers are written over the matching template lines. Update mode
//! only looks at which template keys the output lacks and appends answers to
//! the end of the output, never touching existing lines.

use std::collections::HashMap;

use crate::config::FileEntry;
use crate::envfile::EnvMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Free-form value.
    Input,
    /// Yes/no: fill the variable with an empty string?
    Confirm,
}

/// A question for the user about a single variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub variable: String,
    pub kind: PromptKind,
    pub default_value: Option<String>,
}

impl PromptRequest {
    pub fn input(variable: impl Into<String>, default_value: Option<String>) -> Self {
        Self {
            variable: variable.into(),
            kind: PromptKind::Input,
            default_value,
        }
    }

    pub fn confirm(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            kind: PromptKind::Confirm,
            default_value: None,
        }
    }

    pub fn message(&self) -> String {
        match self.kind {
            PromptKind::Input => format!("Enter the value for {}:", self.variable),
            PromptKind::Confirm => format!(
                "Populate {} with the default value (empty string)?",
                self.variable
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerValue {
    Text(String),
    Flag(bool),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub variable: String,
    pub value: AnswerValue,
}

impl Answer {
    pub fn text(variable: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            value: AnswerValue::Text(value.into()),
        }
    }

    pub fn flag(variable: impl Into<String>, value: bool) -> Self {
        Self {
            variable: variable.into(),
            value: AnswerValue::Flag(value),
        }
    }

    /// The value to write, or `None` when a confirm was declined.
    fn rendered_value(&self) -> Option<&str> {
        match &self.value {
            AnswerValue::Text(value) => Some(value),
            AnswerValue::Flag(true) => Some(""),
            AnswerValue::Flag(false) => None,
        }
    }
}

/// Requests for a brand new output built from `template`.
///
/// A variable is asked for when it is blank or forced, unless it is allowed
/// to stay empty. Forced variables suggest the template value as default.
pub fn plan_create(entry: &FileEntry, template: &EnvMap) -> Vec<PromptRequest> {
    template
        .iter()
        .filter(|(key, value)| {
            (value.is_empty() || entry.force_prompt.contains(*key))
                && !entry.allow_empty.contains(*key)
        })
        .map(|(key, value)| {
            let default_value = entry
                .force_prompt
                .contains(key)
                .then(|| value.to_string());
            PromptRequest::input(key, default_value)
        })
        .collect()
}

/// Template keys absent from `output`, in template order.
pub fn missing_keys<'a>(template: &'a EnvMap, output: &EnvMap) -> Vec<&'a str> {
    template
        .keys()
        .filter(|key| !output.contains_key(key))
        .collect()
}

/// Requests for an existing output. Empty when the output is synced.
pub fn plan_update(entry: &FileEntry, template: &EnvMap, output: &EnvMap) -> Vec<PromptRequest> {
    missing_keys(template, output)
        .into_iter()
        .map(|key| {
            if entry.allow_empty.contains(key) {
                PromptRequest::confirm(key)
            } else {
                PromptRequest::input(key, None)
            }
        })
        .collect()
}

/// Substitute answers into the template text.
///
/// For each answer the first line assigning exactly that key is rewritten;
/// comments, ordering and every other line are kept verbatim. Lines inside a
/// multi-line quoted value are never treated as assignments, and a replaced
/// assignment drops the rest of its quoted value.
pub fn render_create(template: &str, answers: &[Answer]) -> String {
    let mut pending: HashMap<&str, &Answer> = answers
        .iter()
        .map(|answer| (answer.variable.as_str(), answer))
        .collect();
    let mut sink = String::with_capacity(template.len());
    let mut open: Option<OpenQuote> = None;

    for line in template.split_inclusive('\n') {
        let (body, terminator) = split_terminator(line);

        if let Some(quote) = open {
            if !still_open(body, quote.mark) {
                open = None;
            }
            if !quote.dropped {
                sink.push_str(line);
            }
            continue;
        }

        let Some((prefix, key, value)) = split_assignment(body) else {
            sink.push_str(line);
            continue;
        };
        let opens = opening_quote(value);

        let replacement = pending
            .remove(key)
            .and_then(|answer| Some((answer, answer.rendered_value()?)));

        match replacement {
            Some((answer, rendered)) => {
                sink.push_str(prefix);
                sink.push_str(&answer.variable);
                sink.push('=');
                sink.push_str(rendered);
                sink.push_str(terminator);
                open = opens.map(|mark| OpenQuote { mark, dropped: true });
            }
            None => {
                sink.push_str(line);
                open = opens.map(|mark| OpenQuote {
                    mark,
                    dropped: false,
                });
            }
        }
    }

    sink
}

/// A quoted value that continues onto following lines.
#[derive(Debug, Clone, Copy)]
struct OpenQuote {
    mark: char,
    /// Continuation lines belong to a replaced assignment.
    dropped: bool,
}

/// Quote character of a value that is left unterminated on its first line.
fn opening_quote(value: &str) -> Option<char> {
    let value = value.trim_start();
    let mark = value.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    still_open(&value[1..], mark).then_some(mark)
}

/// Whether `mark` is still unterminated after scanning `text`. Backslash
/// escapes only apply inside double quotes.
fn still_open(text: &str, mark: char) -> bool {
    let mut escaped = false;
    for ch in text.chars() {
        if escaped {
            escaped = false;
        } else if ch == '\\' && mark == '"' {
            escaped = true;
        } else if ch == mark {
            return false;
        }
    }
    true
}

/// Append answers to the existing output text.
///
/// The output is trimmed to end in exactly one newline first; a declined
/// confirm adds nothing.
pub fn render_update(output: &str, answers: &[Answer]) -> String {
    let mut sink = output.trim().to_string();
    sink.push('\n');
    for answer in answers {
        if let Some(value) = answer.rendered_value() {
            sink.push_str(&answer.variable);
            sink.push('=');
            sink.push_str(value);
            sink.push('\n');
        }
    }
    sink
}

fn split_terminator(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

/// Split an assignment line into its prefix (indentation and an optional
/// `export `), its key and its raw value. Comments and non-assignments yield
/// `None`.
fn split_assignment(line: &str) -> Option<(&str, &str, &str)> {
    let mut rest = line.trim_start();
    if let Some(after) = rest.strip_prefix("export ") {
        rest = after.trim_start();
    }
    if rest.starts_with('#') {
        return None;
    }

    let eq = rest.find('=')?;
    let key = rest[..eq].trim_end();
    if key.is_empty() || key.contains(char::is_whitespace) {
        return None;
    }

    let prefix = &line[..line.len() - rest.len()];
    Some((prefix, key, &rest[eq + 1..]))
}
