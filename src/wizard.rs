//! Interactive flow behind the `add` command.
//!
//! The wizard asks for the host, checks that it answers a ping, generates a
//! fresh ed25519 key pair for it and appends a `Host` block to the ssh config.
//! Declining any question leaves the config and the key directory untouched.

use crossterm::style::Stylize;
use std::io::Write;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::keys;
use crate::process::Toolchain;
use crate::prompt::{confirm, Input, LineSource};
use crate::settings::Settings;
use crate::sshconfig::{self, parse_port, HostRecord};

/// Values written into a `Host` block must be a single word to be read back.
fn is_token(value: &str) -> bool {
    !value.is_empty() && !value.contains(char::is_whitespace)
}

pub struct Wizard<'a, L: ?Sized, T: ?Sized> {
    input: &'a mut L,
    tools: &'a T,
    settings: &'a Settings,
}

impl<'a, L, T> Wizard<'a, L, T>
where
    L: LineSource + ?Sized,
    T: Toolchain + ?Sized,
{
    pub fn new(input: &'a mut L, tools: &'a T, settings: &'a Settings) -> Self {
        Self {
            input,
            tools,
            settings,
        }
    }

    /// `None` means the user backed out.
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.input.read_line(prompt)? {
            Input::Line(line) => Ok(Some(line.trim().to_string())),
            Input::Interrupted | Input::Eof => Ok(None),
        }
    }

    fn abort(err: &mut impl Write) -> Result<Option<HostRecord>> {
        writeln!(err, "... aborting")?;
        Ok(None)
    }

    /// Runs the wizard and returns the record it added.
    pub fn run(&mut self, out: &mut impl Write, err: &mut impl Write) -> Result<Option<HostRecord>> {
        let settings = self.settings;

        let Some(hostname) = self.ask("Enter the domain name. (e.g. host.example.com): ")? else {
            return Self::abort(err);
        };
        let hostname = hostname.to_lowercase();
        if !is_token(&hostname) {
            writeln!(err, "{hostname:?} is not a domain name")?;
            return Self::abort(err);
        }

        let derived = hostname
            .split_once('.')
            .map_or(hostname.as_str(), |(head, _)| head)
            .to_string();
        let Some(alias) =
            self.ask(&format!("Enter an alias of the host (usage: ssh <alias>) [{derived}]: "))?
        else {
            return Self::abort(err);
        };
        let alias = if alias.is_empty() { derived } else { alias };
        if !is_token(&alias) {
            writeln!(err, "{alias:?} is not a valid alias")?;
            return Self::abort(err);
        }

        let reachable = self.tools.ping(&hostname).unwrap_or_else(|e| {
            warn!(%hostname, "could not run ping: {}", e);
            false
        });
        if !reachable {
            warn!(%hostname, "host did not answer ping");
            let question =
                format!("{hostname} can't be reached, do want to continue anyway? [Y/n] ");
            if !confirm(&mut *self.input, &question)? {
                return Self::abort(err);
            }
        }

        let default_user = &settings.default_user;
        let Some(user) = self.ask(&format!("please enter the user [{default_user}]: "))? else {
            return Self::abort(err);
        };
        let user = if user.is_empty() {
            default_user.clone()
        } else {
            user
        };
        if !is_token(&user) {
            writeln!(err, "{user:?} is not a valid user name")?;
            return Self::abort(err);
        }

        let default_port = settings.default_port;
        let Some(port) = self.ask(&format!("please enter the port [{default_port}]: "))? else {
            return Self::abort(err);
        };
        let port = if port.is_empty() {
            default_port
        } else {
            match parse_port(&port) {
                Ok(port) => port,
                Err(e) => {
                    writeln!(err, "{e}")?;
                    return Self::abort(err);
                }
            }
        };

        let record = HostRecord {
            id: alias,
            key_file: keys::key_path(&settings.key_dir, &hostname),
            hostname,
            user,
            port,
        };

        let key_path = record.key_file.display().to_string();
        if !is_token(&key_path) {
            writeln!(
                err,
                "the key path {key_path:?} contains whitespace, change SSH-KEY-DIR first"
            )?;
            return Self::abort(err);
        }

        let existing = sshconfig::parse(&settings.config_file)?;
        if let Some(other) = existing
            .iter()
            .find(|h| h.id == record.id && h.hostname != record.hostname)
        {
            warn!(alias = %record.id, "alias already in use");
            writeln!(
                err,
                "warning: the alias '{}' is already used for {}, the new entry will shadow it",
                record.id, other.hostname
            )?;
        }

        let input = &mut *self.input;
        let hosts = sshconfig::add_host(existing, record.clone(), |current| {
            confirm(
                input,
                &format!(
                    "There is already a configuration for the host {}, do you want to overwrite it? [Y/n] ",
                    current.hostname
                ),
            )
        })?;
        let Some(hosts) = hosts else {
            return Self::abort(err);
        };

        writeln!(out, "generating keys ...")?;
        keys::ensure_key_dir(&settings.key_dir)?;
        keys::remove_key_pair(&record.key_file)?;

        let comment = format!("key for {}", record.hostname);
        let output = self.tools.keygen(&record.key_file, &comment)?;
        if !output.success {
            if !output.stderr.is_empty() {
                write!(err, "{}", output.stderr)?;
            }
            return Err(Error::Process {
                program: "ssh-keygen".to_string(),
                message: format!("could not create {}", record.key_file.display()),
            });
        }
        let public_key = keys::read_public_key(&record.key_file)?;

        sshconfig::write(&settings.config_file, &hosts)?;
        info!(alias = %record.id, hostname = %record.hostname, "added host");

        writeln!(out, "... wizard done.")?;
        writeln!(out)?;
        writeln!(out, "PUBLIC KEY: {}", public_key.reverse())?;
        writeln!(out)?;
        writeln!(out, "To connect to the host follow these steps:")?;
        writeln!(
            out,
            "\t1. copy the public key to the host, e.g. into its authorized_keys\n\t   or the cloud-init drive of the VM"
        )?;
        writeln!(
            out,
            "\t2. run {} to connect to the host",
            format!("ssh {}", record.id).reverse()
        )?;

        Ok(Some(record))
    }
}
