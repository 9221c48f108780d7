use crate::error::AliasError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Connect,
    Add,
    Edit,
    Delete,
    List,
    Help,
    Quit,
}

impl Action {
    pub fn from_token(token: &str) -> Option<Self> {
        let action = match token.to_lowercase().as_str() {
            "c" | "conn" | "connect" => Action::Connect,
            "a" | "add" => Action::Add,
            "e" | "edit" => Action::Edit,
            "d" | "del" | "delete" | "rm" => Action::Delete,
            "l" | "ls" | "list" => Action::List,
            "h" | "help" | "?" => Action::Help,
            "exit" | "quit" | "q" => Action::Quit,
            _ => return None,
        };
        Some(action)
    }

    /// Verb used in the "you need to enter an alias" hint.
    fn verb(&self) -> Option<&'static str> {
        match self {
            Action::Connect => Some("connect to"),
            Action::Add => Some("add"),
            Action::Edit => Some("edit"),
            Action::Delete => Some("delete"),
            Action::List | Action::Help | Action::Quit => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Connect(String),
    Add(String),
    Edit(String),
    Delete(String),
    List,
    Help,
    Quit,
}

/// Where the prompt loop goes after a line has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Idle,
    Terminated,
}

/// Splits a command line on whitespace and routes on its first token.
///
/// Blank lines parse to `Ok(None)`. Extra tokens after the alias are ignored.
pub fn parse(line: &str) -> Result<Option<Command>, AliasError> {
    let mut tokens = line.split_whitespace();
    let first = match tokens.next() {
        Some(first) => first,
        None => return Ok(None),
    };

    let action =
        Action::from_token(first).ok_or_else(|| AliasError::InvalidCommand(first.to_string()))?;

    let command = match action.verb() {
        Some(verb) => {
            let alias = tokens
                .next()
                .ok_or(AliasError::MissingArgument(verb))?
                .to_lowercase();
            match action {
                Action::Connect => Command::Connect(alias),
                Action::Add => Command::Add(alias),
                Action::Edit => Command::Edit(alias),
                _ => Command::Delete(alias),
            }
        }
        None => match action {
            Action::List => Command::List,
            Action::Help => Command::Help,
            _ => Command::Quit,
        },
    };

    tracing::debug!("Parsed {:?} from {:?}", command, line);
    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_alias_token_routes() {
        let table = [
            (&["c", "conn", "connect"][..], Action::Connect),
            (&["a", "add"][..], Action::Add),
            (&["e", "edit"][..], Action::Edit),
            (&["d", "del", "delete", "rm"][..], Action::Delete),
            (&["l", "ls", "list"][..], Action::List),
            (&["h", "help", "?"][..], Action::Help),
            (&["exit", "quit", "q"][..], Action::Quit),
        ];
        for (tokens, action) in table {
            for token in tokens {
                assert_eq!(Action::from_token(token), Some(action), "{token}");
                assert_eq!(Action::from_token(&token.to_uppercase()), Some(action));
            }
        }
        assert_eq!(Action::from_token("ssha.py"), None);
    }

    #[test]
    fn parses_alias_argument_lowercased() {
        assert_eq!(
            parse("CONN  Web1  extra").unwrap(),
            Some(Command::Connect("web1".to_string()))
        );
        assert_eq!(parse("rm db").unwrap(), Some(Command::Delete("db".to_string())));
        assert_eq!(parse("  ls ").unwrap(), Some(Command::List));
        assert_eq!(parse("?").unwrap(), Some(Command::Help));
        assert_eq!(parse("Q").unwrap(), Some(Command::Quit));
    }

    #[test]
    fn blank_line_is_ignored() {
        assert_eq!(parse("").unwrap(), None);
        assert_eq!(parse(" \t ").unwrap(), None);
    }

    #[test]
    fn missing_alias_is_recoverable() {
        for line in ["c", "add", "edit", "del"] {
            assert!(matches!(
                parse(line).unwrap_err(),
                AliasError::MissingArgument(_)
            ));
        }
        assert_eq!(
            parse("connect").unwrap_err().to_string(),
            "You need to enter an alias that you want to connect to"
        );
    }

    #[test]
    fn unknown_command_is_reported() {
        assert!(matches!(
            parse("launch web1").unwrap_err(),
            AliasError::InvalidCommand(cmd) if cmd == "launch"
        ));
    }
}
