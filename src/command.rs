use std::path::Path;

use crate::error::AliasError;
use crate::models::AliasRecord;

/// What the builder needs to know about the machine it runs on.
pub trait ToolEnvironment {
    fn has_executable(&self, name: &str) -> bool;
    fn path_exists(&self, path: &str) -> bool;
}

/// Looks executables up on `PATH` and paths on the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemEnvironment;

impl ToolEnvironment for SystemEnvironment {
    fn has_executable(&self, name: &str) -> bool {
        which::which(name).is_ok()
    }

    fn path_exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }
}

/// A shell command line ready to hand to the session launcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectCommand {
    pub program: &'static str,
    pub line: String,
}

/// Turns a record into the `ssh` (or `mosh --ssh="ssh ..."`) command line.
///
/// `ssh` must always be installed, `mosh` too when the record asks for it, and
/// a configured key must exist on disk.
pub fn build(record: &AliasRecord, env: &dyn ToolEnvironment) -> Result<ConnectCommand, AliasError> {
    if !env.has_executable("ssh") {
        return Err(AliasError::MissingDependency("SSH"));
    }
    if record.mosh && !env.has_executable("mosh") {
        return Err(AliasError::MissingDependency("Mosh"));
    }

    // Flags for the underlying ssh invocation
    let mut ssh_flags = vec!["-p".to_string(), shell_quote(&record.port)];
    if !record.key.is_empty() {
        if !env.path_exists(&record.key) {
            return Err(AliasError::KeyNotFound(record.key.clone()));
        }
        ssh_flags.push("-i".to_string());
        ssh_flags.push(shell_quote(&record.key));
    }
    if !record.options.trim().is_empty() {
        ssh_flags.push(record.options.trim().to_string());
    }

    let destination = shell_quote(&record.destination());
    let command = if record.mosh {
        // mosh takes the whole ssh invocation as one --ssh argument
        ConnectCommand {
            program: "mosh",
            line: format!(
                "mosh {} --ssh=\"ssh {}\"",
                destination,
                ssh_flags.join(" ").replace('"', "\\\"")
            ),
        }
    } else {
        ConnectCommand {
            program: "ssh",
            line: format!("ssh {} {}", destination, ssh_flags.join(" ")),
        }
    };

    tracing::debug!("Built command for {}: {}", record.alias, command.line);
    Ok(command)
}

fn shell_quote(value: &str) -> String {
    let safe = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "@%+=:,./_-~".contains(c));
    if safe {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct FakeEnv {
        executables: HashSet<&'static str>,
        paths: HashSet<&'static str>,
    }

    impl FakeEnv {
        fn with(executables: &[&'static str], paths: &[&'static str]) -> Self {
            Self {
                executables: executables.iter().copied().collect(),
                paths: paths.iter().copied().collect(),
            }
        }
    }

    impl ToolEnvironment for FakeEnv {
        fn has_executable(&self, name: &str) -> bool {
            self.executables.contains(name)
        }

        fn path_exists(&self, path: &str) -> bool {
            self.paths.contains(path)
        }
    }

    fn web1() -> AliasRecord {
        AliasRecord::new("web1", "root", "10.0.0.5", "22")
    }

    #[test]
    fn plain_ssh_command() {
        let env = FakeEnv::with(&["ssh"], &[]);
        let cmd = build(&web1(), &env).unwrap();
        assert_eq!(cmd.program, "ssh");
        assert_eq!(cmd.line, "ssh root@10.0.0.5 -p 22");
    }

    #[test]
    fn key_and_options_are_appended() {
        let env = FakeEnv::with(&["ssh"], &["/home/me/.ssh/id_ed25519"]);
        let mut record = web1();
        record.key = "/home/me/.ssh/id_ed25519".to_string();
        record.options = "-c aes128-ctr -C".to_string();

        let cmd = build(&record, &env).unwrap();
        assert_eq!(
            cmd.line,
            "ssh root@10.0.0.5 -p 22 -i /home/me/.ssh/id_ed25519 -c aes128-ctr -C"
        );
    }

    #[test]
    fn mosh_wraps_the_ssh_flags() {
        let env = FakeEnv::with(&["ssh", "mosh"], &["/k"]);
        let mut record = web1();
        record.mosh = true;
        assert_eq!(
            build(&record, &env).unwrap().line,
            "mosh root@10.0.0.5 --ssh=\"ssh -p 22\""
        );

        record.key = "/k".to_string();
        record.options = "-C".to_string();
        let cmd = build(&record, &env).unwrap();
        assert_eq!(cmd.program, "mosh");
        assert_eq!(cmd.line, "mosh root@10.0.0.5 --ssh=\"ssh -p 22 -i /k -C\"");
    }

    #[test]
    fn missing_tools_are_reported_before_anything_else() {
        let mut record = web1();
        record.key = "/missing".to_string();

        let err = build(&record, &FakeEnv::with(&["mosh"], &[])).unwrap_err();
        assert!(matches!(err, AliasError::MissingDependency("SSH")));

        record.mosh = true;
        let err = build(&record, &FakeEnv::with(&["ssh"], &[])).unwrap_err();
        assert!(matches!(err, AliasError::MissingDependency("Mosh")));
    }

    #[test]
    fn missing_key_is_rejected() {
        let mut record = web1();
        record.key = "/nope/id_rsa".to_string();
        let err = build(&record, &FakeEnv::with(&["ssh"], &[])).unwrap_err();
        assert!(matches!(err, AliasError::KeyNotFound(path) if path == "/nope/id_rsa"));
    }

    #[test]
    fn odd_values_are_quoted() {
        let env = FakeEnv::with(&["ssh"], &["/keys/my key"]);
        let mut record = AliasRecord::new("box", "", "box.lan", "22");
        record.key = "/keys/my key".to_string();
        assert_eq!(
            build(&record, &env).unwrap().line,
            "ssh box.lan -p 22 -i '/keys/my key'"
        );
    }
}
