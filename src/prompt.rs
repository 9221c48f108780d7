#[cfg(test)]
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Source of interactive answers.
pub trait Prompter {
    /// Shows `label` and reads one line. `Ok(None)` means input is exhausted.
    fn read_line(&mut self, label: &str) -> io::Result<Option<String>>;

    /// Like [`Prompter::read_line`], but end of input is an error.
    fn ask(&mut self, label: &str) -> io::Result<String> {
        match self.read_line(label)? {
            Some(answer) => Ok(answer),
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed while waiting for an answer",
            )),
        }
    }

    /// Pre-fills the prompt with `current`; an empty answer keeps it.
    fn ask_with_default(&mut self, label: &str, current: &str) -> io::Result<String> {
        let answer = self.ask(&format!("{}[{}] ", label, current))?;
        if answer.is_empty() {
            Ok(current.to_string())
        } else {
            Ok(answer)
        }
    }

    /// Only `y` confirms; closed input counts as no.
    fn confirm(&mut self, label: &str) -> io::Result<bool> {
        Ok(self
            .read_line(label)?
            .is_some_and(|answer| answer.eq_ignore_ascii_case("y")))
    }
}

#[derive(Debug, Default)]
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn read_line(&mut self, label: &str) -> io::Result<Option<String>> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", label)?;
        stdout.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

/// Replays canned answers.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    pub asked: Vec<String>,
}

#[cfg(test)]
impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }
}

#[cfg(test)]
impl Prompter for ScriptedPrompter {
    fn read_line(&mut self, label: &str) -> io::Result<Option<String>> {
        self.asked.push(label.to_string());
        Ok(self.answers.pop_front())
    }
}
