use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};
use std::io::Write;
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::output::{help_table, host_table, settings_table};
use crate::process::{take_interrupt, Toolchain};
use crate::prompt::{confirm, Input, LineSource};
use crate::settings::{SettingKey, Settings, SettingsStore};
use crate::sshconfig;
use crate::wizard::Wizard;

const PROMPT: &str = ">>> ";
const BANNER: &str = "SSH Wizard - type help to list all commands";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Running,
    Terminated,
}

/// A parsed command line. Only the first word selects the command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    Ssh(Vec<&'a str>),
    Remove(Option<&'a str>),
    Add,
    List,
    Help,
    Exit,
    Configure(Vec<&'a str>),
    Clear,
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    /// `None` for a blank line.
    pub fn parse(line: &'a str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let command = match words.next()? {
            "ssh" => Command::Ssh(words.collect()),
            "remove" => Command::Remove(words.next()),
            "add" => Command::Add,
            "list" => Command::List,
            "help" => Command::Help,
            "exit" => Command::Exit,
            "configure" => Command::Configure(words.collect()),
            "clear" => Command::Clear,
            _ => Command::Unknown(line.trim()),
        };
        Some(command)
    }
}

/// The interactive loop: one command line per iteration.
pub struct Shell<L, T, W, E> {
    input: L,
    tools: T,
    out: W,
    err: E,
    settings: Settings,
    store: Option<SettingsStore>,
    state: State,
    /// Last config load failure seen while refreshing completions.
    load_error: Option<String>,
}

impl<L, T, W, E> Shell<L, T, W, E>
where
    L: LineSource,
    T: Toolchain,
    W: Write,
    E: Write,
{
    pub fn new(input: L, tools: T, settings: Settings, out: W, err: E) -> Self {
        Self {
            input,
            tools,
            out,
            err,
            settings,
            store: None,
            state: State::Running,
            load_error: None,
        }
    }

    /// Persist `configure set` changes to `store`.
    pub fn with_store(mut self, store: SettingsStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn input(&self) -> &L {
        &self.input
    }

    pub fn tools(&self) -> &T {
        &self.tools
    }

    pub fn out(&self) -> &W {
        &self.out
    }

    pub fn err(&self) -> &E {
        &self.err
    }

    pub fn run(&mut self) -> Result<()> {
        writeln!(self.out, "{BANNER}")?;
        while self.state == State::Running {
            self.step()?;
        }
        Ok(())
    }

    /// Reads and executes one line. Only failures of the terminal itself are
    /// returned; a failing command is reported and the shell keeps going.
    pub fn step(&mut self) -> Result<()> {
        // refresh completion candidates, the file may have changed on disk
        match sshconfig::parse(&self.settings.config_file) {
            Ok(hosts) => {
                self.load_error = None;
                self.input
                    .set_aliases(hosts.into_iter().map(|h| h.id).collect());
            }
            Err(e) => {
                let message = e.to_string();
                if self.load_error.as_deref() != Some(message.as_str()) {
                    warn!("could not load hosts for completion: {}", message);
                    writeln!(self.err, "error: {message}")?;
                } else {
                    debug!("config still broken: {}", message);
                }
                self.load_error = Some(message);
                self.input.set_aliases(Vec::new());
            }
        }

        match self.input.read_line(PROMPT)? {
            Input::Interrupted => {
                writeln!(self.err, "Enter exit to exit the shell or press CTRL-D.")?;
            }
            Input::Eof => {
                writeln!(self.err, "... exiting")?;
                self.state = State::Terminated;
            }
            Input::Line(line) => {
                if !line.trim().is_empty() {
                    self.input.add_history(&line);
                }
                if let Err(e) = self.dispatch(&line) {
                    error!("command failed: {}", e);
                    writeln!(self.err, "error: {e}")?;
                }
            }
        }
        Ok(())
    }

    pub fn dispatch(&mut self, line: &str) -> Result<()> {
        let Some(command) = Command::parse(line) else {
            return Ok(());
        };
        debug!(?command, "dispatch");

        match command {
            Command::Ssh(args) => self.ssh(&args),
            Command::Remove(alias) => self.remove(alias),
            Command::Add => {
                Wizard::new(&mut self.input, &self.tools, &self.settings)
                    .run(&mut self.out, &mut self.err)?;
                Ok(())
            }
            Command::List => self.list(),
            Command::Help => {
                writeln!(self.out, "{}", help_table())?;
                Ok(())
            }
            Command::Exit => {
                self.state = State::Terminated;
                Ok(())
            }
            Command::Configure(args) => self.configure(&args),
            Command::Clear => {
                execute!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
                Ok(())
            }
            Command::Unknown(text) => {
                writeln!(
                    self.out,
                    "Unknown Command: {text}\nEnter help for a list of all commands."
                )?;
                Ok(())
            }
        }
    }

    fn ssh(&mut self, args: &[&str]) -> Result<()> {
        if args.is_empty() {
            writeln!(self.err, "usage: ssh <alias>")?;
            return Ok(());
        }

        // drop a Ctrl-C left over from an earlier child
        take_interrupt();
        let output = self.tools.ssh(args)?;
        if !output.stdout.is_empty() {
            write!(self.out, "{}", output.stdout)?;
        }
        if !output.stderr.is_empty() {
            write!(self.err, "{}", output.stderr)?;
        }
        if take_interrupt() {
            writeln!(self.err, " Keyboard Interrupt!")?;
        }
        Ok(())
    }

    fn list(&mut self) -> Result<()> {
        let hosts = sshconfig::parse(&self.settings.config_file)?;
        match host_table(&hosts) {
            Some(table) => writeln!(self.out, "{table}")?,
            None => writeln!(self.out, "no hosts configured")?,
        }
        Ok(())
    }

    fn remove(&mut self, alias: Option<&str>) -> Result<()> {
        let Some(alias) = alias else {
            writeln!(self.err, "usage: remove <alias>")?;
            return Ok(());
        };

        let hosts = sshconfig::parse(&self.settings.config_file)?;
        let Some(host) = hosts.iter().find(|h| h.id == alias).cloned() else {
            writeln!(self.err, "There is no host with the alias '{alias}'")?;
            return Ok(());
        };

        let question = format!(
            "Remove '{}' ({})? [Y/n] ",
            host.id,
            host.destination()
        );
        if !confirm(&mut self.input, &question)? {
            writeln!(self.err, "... aborting")?;
            return Ok(());
        }

        if let Some(remaining) = sshconfig::remove_host(hosts, alias) {
            sshconfig::write(&self.settings.config_file, &remaining)?;
            info!(alias, "removed host");
            writeln!(
                self.out,
                "removed '{}', the key {} was left in place",
                alias,
                host.key_file.display()
            )?;
        }
        Ok(())
    }

    fn configure(&mut self, args: &[&str]) -> Result<()> {
        match args {
            ["show"] => writeln!(self.out, "{}", settings_table(&self.settings))?,
            ["set", key, value] => {
                let key: SettingKey = key.parse()?;
                let mut updated = self.settings.clone();
                updated.set(key, value)?;
                if let Some(store) = &self.store {
                    store.save(&updated)?;
                }
                self.settings = updated;
                writeln!(self.out, "{key} : {}", self.settings.get(key))?;
            }
            _ => writeln!(self.err, "Invalid cmd for 'configure': {}", args.join(" "))?,
        }
        Ok(())
    }
}
