use std::{
    fmt::Write as _,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use regex::Regex;
use tracing::debug;

use crate::error::{Error, Result};

// Only the five-line blocks written by `render` are recognised. Anything else
// in the file is skipped.
const BLOCK_PATTERN: &str = r"Host +(?P<id>.+)\n\tHostname +(?P<hostname>\S+)\n\tUser +(?P<user>\S+)\n\tPort +(?P<port>\d+)\n\tIdentityFile +(?P<key_file>\S+)\n?";

fn block_regex() -> &'static Regex {
    static BLOCK: OnceLock<Regex> = OnceLock::new();
    BLOCK.get_or_init(|| Regex::new(BLOCK_PATTERN).expect("block pattern is a valid regex"))
}

/// One managed host, i.e. one `Host` block in the ssh config file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostRecord {
    /// Alias used as `ssh <id>`.
    pub id: String,
    pub hostname: String,
    pub user: String,
    pub port: u16,
    /// Private key; the public half lives next to it with a `.pub` suffix.
    pub key_file: PathBuf,
}

impl HostRecord {
    /// `user@hostname`, as shown by `list`.
    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.hostname)
    }
}

/// Parses a port number, rejecting `0` and anything above `u16::MAX`.
pub fn parse_port(value: &str) -> Result<u16> {
    match value.trim().parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(Error::InvalidPort(value.to_string())),
    }
}

/// Extracts every well-formed block from `content`, in file order.
pub fn parse_str(content: &str) -> Result<Vec<HostRecord>> {
    block_regex()
        .captures_iter(content)
        .map(|caps| {
            Ok(HostRecord {
                id: caps["id"].to_string(),
                hostname: caps["hostname"].to_string(),
                user: caps["user"].to_string(),
                port: parse_port(&caps["port"])?,
                key_file: PathBuf::from(&caps["key_file"]),
            })
        })
        .collect()
}

/// Reads the config file at `path`. A file that does not exist yet is
/// treated as empty.
pub fn parse<P: AsRef<Path>>(path: P) -> Result<Vec<HostRecord>> {
    let path = path.as_ref();
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file does not exist yet");
            return Ok(Vec::new());
        }
        Err(e) => return Err(Error::io(path, e)),
    };

    let hosts = parse_str(&content)?;
    debug!(path = %path.display(), count = hosts.len(), "loaded hosts");
    Ok(hosts)
}

/// Renders `records` in the block layout understood by [`parse_str`].
pub fn render(records: &[HostRecord]) -> String {
    let mut out = String::new();
    for record in records {
        // writing into a String cannot fail
        let _ = write!(
            out,
            "Host {}\n\tHostname {}\n\tUser {}\n\tPort {}\n\tIdentityFile {}\n\n",
            record.id,
            record.hostname,
            record.user,
            record.port,
            record.key_file.display()
        );
    }
    out
}

/// Overwrites the file at `path` with `records`.
pub fn write<P: AsRef<Path>>(path: P, records: &[HostRecord]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    fs::write(path, render(records)).map_err(|e| Error::io(path, e))?;
    debug!(path = %path.display(), count = records.len(), "wrote hosts");
    Ok(())
}

/// Appends `new` to `existing`.
///
/// Records pointing at the same hostname as `new` are replaced, but only after
/// `confirm_overwrite` agrees. Returns `None` when it declines.
pub fn add_host<F>(
    existing: Vec<HostRecord>,
    new: HostRecord,
    confirm_overwrite: F,
) -> Result<Option<Vec<HostRecord>>>
where
    F: FnOnce(&HostRecord) -> Result<bool>,
{
    let mut hosts = existing;
    if let Some(current) = hosts.iter().find(|h| h.hostname == new.hostname) {
        if !confirm_overwrite(current)? {
            return Ok(None);
        }
        hosts.retain(|h| h.hostname != new.hostname);
    }

    hosts.push(new);
    Ok(Some(hosts))
}

/// Drops every record with alias `id`. Returns `None` if there was none.
pub fn remove_host(existing: Vec<HostRecord>, id: &str) -> Option<Vec<HostRecord>> {
    let before = existing.len();
    let hosts: Vec<_> = existing.into_iter().filter(|h| h.id != id).collect();
    (hosts.len() != before).then_some(hosts)
}
