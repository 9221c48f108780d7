use std::io::Write;
use std::time::Duration;
use tokio::runtime::Handle;

use crate::command::{self, ToolEnvironment};
use crate::dispatcher::{self, Command, Flow};
use crate::error::AliasError;
use crate::models::AliasRecord;
use crate::probe::{self, LatencyGrade, ProbeOutcome};
use crate::prompt::Prompter;
use crate::render::Renderer;
use crate::ssh_service::SessionLauncher;
use crate::store::AliasStore;

const OPTIONS_EXAMPLE: &str = "Example options: -c aes128 -C";

pub struct App<W: Write> {
    pub store: AliasStore,
    renderer: Renderer,
    env: Box<dyn ToolEnvironment>,
    prompter: Box<dyn Prompter>,
    launcher: Box<dyn SessionLauncher>,
    runtime: Handle,
    probe_timeout: Duration,
    program: String,
    out: W,
}

impl<W: Write> App<W> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: AliasStore,
        renderer: Renderer,
        env: Box<dyn ToolEnvironment>,
        prompter: Box<dyn Prompter>,
        launcher: Box<dyn SessionLauncher>,
        runtime: Handle,
        probe_timeout: Duration,
        program: String,
        out: W,
    ) -> Self {
        Self {
            store,
            renderer,
            env,
            prompter,
            launcher,
            runtime,
            probe_timeout,
            program,
            out,
        }
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn run_interactive(&mut self, version: &str) -> Result<(), AliasError> {
        let banner = self.renderer.banner(version);
        write!(self.out, "{}", banner)?;
        self.print_list()?;
        writeln!(self.out, "Type your command below (enter h or help)")?;
        self.out.flush()?;

        loop {
            let line = match self.prompter.read_line(&self.renderer.prompt())? {
                Some(line) => line,
                None => {
                    // End of input behaves like quit
                    writeln!(self.out)?;
                    self.handle_line("quit");
                    break;
                }
            };

            if self.handle_line(&line) == Flow::Terminated {
                break;
            }
        }

        tracing::info!("Interactive session finished");
        Ok(())
    }

    /// Handles one command line. Failures are printed, never propagated.
    pub fn handle_line(&mut self, line: &str) -> Flow {
        let result = match dispatcher::parse(line) {
            Ok(Some(command)) => self.dispatch(command),
            Ok(None) => Ok(Flow::Idle),
            Err(e) => Err(e),
        };

        let flow = match result {
            Ok(flow) => flow,
            Err(e) => {
                tracing::warn!("Command {:?} failed: {}", line, e);
                let message = self.renderer.error(&e.to_string());
                let _ = writeln!(self.out, "{}", message);
                Flow::Idle
            }
        };
        let _ = self.out.flush();
        flow
    }

    fn dispatch(&mut self, command: Command) -> Result<Flow, AliasError> {
        tracing::info!("Dispatching {:?}", command);
        match command {
            Command::Connect(alias) => self.connect(&alias)?,
            Command::Add(alias) => self.add(&alias)?,
            Command::Edit(alias) => self.edit(&alias)?,
            Command::Delete(alias) => self.delete(&alias)?,
            Command::List => self.print_list()?,
            Command::Help => self.print_help()?,
            Command::Quit => {
                writeln!(self.out, "{}", self.renderer.farewell())?;
                return Ok(Flow::Terminated);
            }
        }
        Ok(Flow::Idle)
    }

    /// Connects straight to `alias`, as invoked from the command line.
    pub fn quick_connect(&mut self, alias: &str) {
        if let Err(e) = self.connect(&alias.to_lowercase()) {
            tracing::warn!("Quick connect to {} failed: {}", alias, e);
            let message = self.renderer.error(&e.to_string());
            let _ = writeln!(self.out, "{}", message);
        }
        let _ = self.out.flush();
    }

    pub fn connect(&mut self, alias: &str) -> Result<(), AliasError> {
        let record = self.store.get(alias)?;
        let label = record.alias.to_uppercase();

        let progress = format!(
            "<< Connecting to alias {} using {} {}:{}...",
            label,
            record.kind(),
            record.destination(),
            record.port
        );
        write!(self.out, "{}", self.renderer.notice(&progress))?;
        self.out.flush()?;

        let cmd = match command::build(&record, self.env.as_ref()) {
            Ok(cmd) => cmd,
            Err(e) => {
                writeln!(self.out, "{}", self.renderer.error("ERROR"))?;
                return Err(e);
            }
        };

        let outcome = self.runtime.block_on(probe::probe(
            &record.hostname,
            &record.port,
            self.probe_timeout,
        ));

        match outcome {
            ProbeOutcome::Reachable { latency_ms } => {
                writeln!(self.out, "{}", self.renderer.success("SUCCESS"))?;
                let grade = LatencyGrade::from_millis(latency_ms);
                let latency = format!(
                    "Current latency for {} is {} at {} ms",
                    record.hostname, grade, latency_ms
                );
                writeln!(self.out, "{}", self.renderer.success(&latency))?;
                self.out.flush()?;

                self.launcher
                    .launch(&cmd)
                    .map_err(|e| AliasError::Session(format!("{:#}", e)))?;

                let message = format!("\n<< Disconnected from alias {}", label);
                writeln!(self.out, "{}", self.renderer.notice(&message))?;
                Ok(())
            }
            ProbeOutcome::Unreachable { latency_ms, reason } => {
                tracing::warn!(
                    "{} is unreachable after {} ms: {}",
                    record.alias,
                    latency_ms,
                    reason
                );
                writeln!(self.out, "{}", self.renderer.error("FAILURE"))?;
                Err(AliasError::ProbeUnreachable(record.alias))
            }
            ProbeOutcome::Invalid { reason } => {
                writeln!(self.out, "{}", self.renderer.error("FAILURE"))?;
                Err(AliasError::ProbeInvalidTarget {
                    alias: record.alias,
                    reason,
                })
            }
        }
    }

    pub fn add(&mut self, alias: &str) -> Result<(), AliasError> {
        if self.store.exists(alias)? {
            return Err(AliasError::DuplicateAlias(alias.to_uppercase()));
        }

        let heading = format!("Alias Name: {}", alias);
        writeln!(self.out, "{}", self.renderer.notice(&heading))?;
        self.out.flush()?;

        let p = self.prompter.as_mut();
        let user = p.ask("SSH User: ")?;
        let mut hostname = p.ask("SSH Hostname/IP: ")?;
        while hostname.is_empty() {
            hostname = p.ask("SSH Hostname/IP: ")?;
        }
        let port = p.ask("SSH Port: ")?;

        let mut record = AliasRecord::new(alias, &user, &hostname, &port);
        record.mosh = p.confirm("Use Mosh? (y/n): ")?;
        if p.confirm("Key-based authentication? (y/n): ")? {
            record.key = p.ask("SSH Key Location: ")?;
        }
        if p.confirm("Other options to use? (y/n): ")? {
            writeln!(self.out, "{}", OPTIONS_EXAMPLE)?;
            self.out.flush()?;
            record.options = self.prompter.ask("SSH Options: ")?;
        }

        self.store.insert(record)?;

        let message = format!("<< Alias {} has been added successfully!", alias);
        writeln!(self.out, "{}", self.renderer.notice(&message))?;
        self.print_list()
    }

    pub fn edit(&mut self, alias: &str) -> Result<(), AliasError> {
        let current = self.store.get(alias)?;

        let p = self.prompter.as_mut();
        let new_alias = p.ask_with_default("Alias Name: ", &current.alias)?;
        let user = p.ask_with_default("SSH User: ", &current.user)?;
        let hostname = p.ask_with_default("SSH Hostname/IP: ", &current.hostname)?;
        let port = p.ask_with_default("SSH Port: ", &current.port)?;

        let mut record = AliasRecord::new(&new_alias, &user, &hostname, &port);
        record.mosh = p
            .ask_with_default("Use Mosh? (y/n): ", yes_no(current.mosh))?
            .eq_ignore_ascii_case("y");

        let use_key = p
            .ask_with_default(
                "Key-based authentication? (y/n): ",
                yes_no(!current.key.is_empty()),
            )?
            .eq_ignore_ascii_case("y");
        if use_key {
            record.key = p.ask_with_default("SSH Key Location: ", &current.key)?;
        }

        let use_options = p
            .ask_with_default(
                "Other options to use? (y/n): ",
                yes_no(!current.options.is_empty()),
            )?
            .eq_ignore_ascii_case("y");
        if use_options {
            writeln!(self.out, "{}", OPTIONS_EXAMPLE)?;
            self.out.flush()?;
            record.options = self
                .prompter
                .ask_with_default("SSH Options: ", &current.options)?;
        }

        let updated = record.alias.clone();
        self.store.update(&current.alias, record)?;

        let message = format!("<< Alias {} has been updated successfully!", updated);
        writeln!(self.out, "{}", self.renderer.notice(&message))?;
        self.print_list()
    }

    pub fn delete(&mut self, alias: &str) -> Result<(), AliasError> {
        // Resolve first so a missing alias is reported before asking
        let record = self.store.get(alias)?;
        let label = record.alias.to_uppercase();

        let question = self
            .renderer
            .notice(&format!("Delete the alias {}? (y/n): ", label));
        if !self.prompter.confirm(&question)? {
            tracing::info!("Deletion of {} not confirmed", record.alias);
            return Ok(());
        }

        self.store.delete(&record.alias)?;
        let message = format!("<< Alias {} has been deleted successfully!", label);
        writeln!(self.out, "{}", self.renderer.notice(&message))?;
        self.print_list()
    }

    /// Shows the alias table, or the help screen while the store is empty.
    pub fn print_list(&mut self) -> Result<(), AliasError> {
        let records = self.store.list()?;
        match self.renderer.alias_table(&records) {
            Some(table) => writeln!(self.out, "{}", table)?,
            None => self.print_help()?,
        }
        Ok(())
    }

    pub fn print_help(&mut self) -> Result<(), AliasError> {
        let help = self.renderer.help(&self.program);
        writeln!(self.out, "{}", help)?;
        Ok(())
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "y"
    } else {
        "n"
    }
}
