use unicode_width::UnicodeWidthStr;

use crate::settings::{SettingKey, Settings};
use crate::sshconfig::HostRecord;

const ID_HEADER: &str = "IDENTIFIER";
const HOST_HEADER: &str = "HOST";

pub const HELP: [(&str, &str); 8] = [
    ("ssh <alias>", "Connect to a ssh host by it's alias."),
    ("remove <alias>", "Remove an ssh host from the config."),
    ("add", "Run wizard to add a new ssh host."),
    ("list", "List all ssh hosts."),
    ("help", "Print this help."),
    ("exit", "Exit the shell."),
    ("clear", "Clears the screen."),
    (
        "configure [show | set ..]",
        "Show and change the default values of the wizard.",
    ),
];

/// Left-justifies `s` to `width` display columns using `fill`.
fn ljust(s: &str, width: usize, fill: char) -> String {
    let len = UnicodeWidthStr::width(s);
    let mut out = String::from(s);
    out.extend(std::iter::repeat(fill).take(width.saturating_sub(len)));
    out
}

/// The `list` table, or `None` when there is nothing to show.
pub fn host_table(hosts: &[HostRecord]) -> Option<String> {
    let first = hosts.first()?;

    let i = hosts
        .iter()
        .map(|h| UnicodeWidthStr::width(h.id.as_str()))
        .max()
        .unwrap_or(0);
    let j = hosts
        .iter()
        .map(|h| UnicodeWidthStr::width(h.destination().as_str()))
        .max()
        .unwrap_or(0);

    let mut lines = vec![
        format!("{} | {}", ljust(ID_HEADER, i, ' '), HOST_HEADER),
        "=".repeat(i + j + 3),
    ];
    lines.extend(
        hosts
            .iter()
            .map(|h| format!("{} | {}", ljust(&h.id, i, '.'), ljust(&h.destination(), j, '.'))),
    );
    lines.push(String::new());
    lines.push(format!("Usage: 'ssh <identifier>' (eg: ssh {})", first.id));

    Some(lines.join("\n"))
}

pub fn help_table() -> String {
    let width = HELP.iter().map(|(cmd, _)| cmd.len()).max().unwrap_or(0);
    HELP.iter()
        .map(|(cmd, text)| format!("{} : {}", ljust(cmd, width, ' '), text))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn settings_table(settings: &Settings) -> String {
    let width = SettingKey::ALL
        .iter()
        .map(|k| k.as_str().len())
        .max()
        .unwrap_or(0);

    let mut lines = vec!["Configured values:".to_string()];
    lines.extend(
        SettingKey::ALL
            .iter()
            .map(|k| format!("  {} : {}", ljust(k.as_str(), width, ' '), settings.get(*k))),
    );
    lines.join("\n")
}
