use thiserror::Error;

/// Failures an action can report back to the prompt.
///
/// Every variant is recoverable: the dispatcher prints it as a single line
/// and returns to the prompt.
#[derive(Debug, Error)]
pub enum AliasError {
    #[error("The alias {0} already exists...")]
    DuplicateAlias(String),

    #[error("The alias {alias} does not exist{}", suggestion_hint(.suggestion))]
    NotFound {
        alias: String,
        suggestion: Option<String>,
    },

    #[error("You need to enter an alias that you want to {0}")]
    MissingArgument(&'static str),

    #[error("Invalid command. Type h or help for command line usage")]
    InvalidCommand(String),

    #[error("{0} is not installed on your system...")]
    MissingDependency(&'static str),

    #[error("The key {0} does not exist... Please double check your path to this file")]
    KeyNotFound(String),

    #[error("Cannot make a successful connection to {0}. Please check your network connection and the SSH server.")]
    ProbeUnreachable(String),

    #[error("Alias {alias} seems to have some connection errors ({reason})")]
    ProbeInvalidTarget { alias: String, reason: String },

    #[error("Could not start the session: {0}")]
    Session(String),

    #[error("Failed to update the alias store: {0:#}")]
    Storage(#[from] anyhow::Error),

    #[error("Terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn suggestion_hint(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(alias) => format!(" (did you mean {}?)", alias.to_uppercase()),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_mentions_suggestion() {
        let err = AliasError::NotFound {
            alias: "WEB".to_string(),
            suggestion: Some("web1".to_string()),
        };
        assert_eq!(err.to_string(), "The alias WEB does not exist (did you mean WEB1?)");
        let err = AliasError::NotFound {
            alias: "WEB".to_string(),
            suggestion: None,
        };
        assert_eq!(err.to_string(), "The alias WEB does not exist");
    }
}
