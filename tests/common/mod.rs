//! Scripted stand-ins for the terminal and the external programs.

#![allow(dead_code)]

use std::{
    cell::RefCell,
    collections::VecDeque,
    fs,
    path::{Path, PathBuf},
};

use sshwiz::{keys, CommandOutput, HostRecord, Input, LineSource, Result, Settings, Shell, Toolchain};

pub const PUBLIC_KEY: &str = "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIFake";

/// Answers prompts from a queue; an empty queue behaves like Ctrl-D.
#[derive(Default)]
pub struct ScriptedInput {
    pub lines: VecDeque<Input>,
    pub prompts: Vec<String>,
    pub aliases: Vec<String>,
    pub history: Vec<String>,
}

impl ScriptedInput {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|l| Input::Line(l.to_string())).collect(),
            ..Default::default()
        }
    }
}

impl LineSource for ScriptedInput {
    fn read_line(&mut self, prompt: &str) -> Result<Input> {
        self.prompts.push(prompt.to_string());
        Ok(self.lines.pop_front().unwrap_or(Input::Eof))
    }

    fn set_aliases(&mut self, aliases: Vec<String>) {
        self.aliases = aliases;
    }

    fn add_history(&mut self, line: &str) {
        self.history.push(line.to_string());
    }
}

pub struct FakeToolchain {
    pub reachable: bool,
    pub keygen_ok: bool,
    pub ssh_output: CommandOutput,
    pub calls: RefCell<Vec<String>>,
}

impl Default for FakeToolchain {
    fn default() -> Self {
        Self {
            reachable: true,
            keygen_ok: true,
            ssh_output: CommandOutput {
                success: true,
                ..Default::default()
            },
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl Toolchain for FakeToolchain {
    fn ping(&self, hostname: &str) -> Result<bool> {
        self.calls.borrow_mut().push(format!("ping {hostname}"));
        Ok(self.reachable)
    }

    fn keygen(&self, key_file: &Path, comment: &str) -> Result<CommandOutput> {
        self.calls
            .borrow_mut()
            .push(format!("ssh-keygen {} {comment}", key_file.display()));
        if !self.keygen_ok {
            return Ok(CommandOutput {
                success: false,
                stdout: String::new(),
                stderr: "Saving key failed: permission denied\n".to_string(),
            });
        }

        fs::write(key_file, "PRIVATE KEY").unwrap();
        fs::write(
            keys::public_key_path(key_file),
            format!("{PUBLIC_KEY} {comment}\n"),
        )
        .unwrap();
        Ok(CommandOutput {
            success: true,
            ..Default::default()
        })
    }

    fn ssh(&self, args: &[&str]) -> Result<CommandOutput> {
        self.calls.borrow_mut().push(format!("ssh {}", args.join(" ")));
        Ok(self.ssh_output.clone())
    }
}

pub type TestShell = Shell<ScriptedInput, FakeToolchain, Vec<u8>, Vec<u8>>;

pub fn shell(home: &Path, lines: &[&str]) -> TestShell {
    shell_with(home, lines, FakeToolchain::default())
}

pub fn shell_with(home: &Path, lines: &[&str], tools: FakeToolchain) -> TestShell {
    Shell::new(
        ScriptedInput::new(lines),
        tools,
        Settings::with_home(home),
        Vec::new(),
        Vec::new(),
    )
}

pub fn config_path(home: &Path) -> PathBuf {
    Settings::with_home(home).config_file
}

pub fn record(id: &str, hostname: &str) -> HostRecord {
    HostRecord {
        id: id.to_string(),
        hostname: hostname.to_string(),
        user: "admin".to_string(),
        port: 22,
        key_file: PathBuf::from(format!("/k/{id}")),
    }
}

pub fn text(buf: &[u8]) -> String {
    String::from_utf8_lossy(buf).into_owned()
}
