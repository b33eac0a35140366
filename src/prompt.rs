use std::collections::HashSet;

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    history::DefaultHistory,
    Context, Editor, Helper, Highlighter, Hinter, Validator,
};

use crate::error::Result;
use crate::settings::SettingKey;

/// Commands offered by tab completion, in the order `help` lists them.
pub const COMMANDS: [&str; 8] = [
    "ssh",
    "remove",
    "add",
    "list",
    "help",
    "exit",
    "clear",
    "configure",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Line(String),
    /// Ctrl-C while typing.
    Interrupted,
    /// Ctrl-D or closed stdin.
    Eof,
}

/// Where the shell and the wizard read their answers from.
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> Result<Input>;

    /// Replaces the aliases offered after `ssh ` and `remove `.
    fn set_aliases(&mut self, _aliases: Vec<String>) {}

    fn add_history(&mut self, _line: &str) {}
}

/// Asks a yes/no question until it gets an answer. Yes is the default;
/// Ctrl-C and end of input count as no.
pub fn confirm<L: LineSource + ?Sized>(input: &mut L, prompt: &str) -> Result<bool> {
    loop {
        match input.read_line(prompt)? {
            Input::Line(answer) => match answer.trim().to_lowercase().as_str() {
                "" | "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => continue,
            },
            Input::Interrupted | Input::Eof => return Ok(false),
        }
    }
}

/// Candidates for the word ending at the cursor, with the byte offset where
/// that word starts.
pub fn completions(line: &str, aliases: &[String]) -> (usize, Vec<String>) {
    let word_len: usize = line
        .chars()
        .rev()
        .take_while(|c| !c.is_whitespace())
        .map(char::len_utf8)
        .sum();
    let start = line.len() - word_len;
    let word = &line[start..];
    let previous: Vec<&str> = line[..start].split_whitespace().collect();

    let pool: Vec<String> = match previous.as_slice() {
        [] => COMMANDS.iter().map(|c| c.to_string()).collect(),
        ["ssh"] | ["remove"] => aliases.to_vec(),
        ["configure"] => vec!["show".to_string(), "set".to_string()],
        ["configure", "set"] => SettingKey::ALL
            .iter()
            .map(|k| k.as_str().to_string())
            .collect(),
        _ => Vec::new(),
    };

    let mut seen = HashSet::new();
    let candidates: Vec<String> = pool
        .into_iter()
        .filter(|c| c.starts_with(word) && seen.insert(c.clone()))
        .collect();
    (start, candidates)
}

#[derive(Default, Helper, Hinter, Highlighter, Validator)]
pub struct ShellHelper {
    aliases: Vec<String>,
}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, candidates) = completions(&line[..pos], &self.aliases);
        let pairs = candidates
            .into_iter()
            .map(|c| Pair {
                display: c.clone(),
                replacement: c,
            })
            .collect();
        Ok((start, pairs))
    }
}

/// Line editor for the interactive terminal.
pub struct Repl {
    editor: Editor<ShellHelper, DefaultHistory>,
}

impl Repl {
    pub fn new() -> Result<Self> {
        let mut editor = Editor::new()?;
        editor.set_helper(Some(ShellHelper::default()));
        Ok(Self { editor })
    }
}

impl LineSource for Repl {
    fn read_line(&mut self, prompt: &str) -> Result<Input> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Input::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(Input::Interrupted),
            Err(ReadlineError::Eof) => Ok(Input::Eof),
            Err(e) => Err(e.into()),
        }
    }

    fn set_aliases(&mut self, aliases: Vec<String>) {
        if let Some(helper) = self.editor.helper_mut() {
            helper.aliases = aliases;
        }
    }

    fn add_history(&mut self, line: &str) {
        // a full history is not worth failing a command over
        let _ = self.editor.add_history_entry(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct Answers(VecDeque<Input>);

    impl LineSource for Answers {
        fn read_line(&mut self, _prompt: &str) -> Result<Input> {
            Ok(self.0.pop_front().unwrap_or(Input::Eof))
        }
    }

    fn answers(lines: &[&str]) -> Answers {
        Answers(lines.iter().map(|l| Input::Line(l.to_string())).collect())
    }

    #[test]
    fn test_confirm_defaults_to_yes() {
        assert!(confirm(&mut answers(&[""]), "").unwrap());
        assert!(confirm(&mut answers(&[" YES "]), "").unwrap());
        assert!(!confirm(&mut answers(&["n"]), "").unwrap());
    }

    #[test]
    fn test_confirm_asks_again_on_garbage() {
        let mut input = answers(&["maybe", "later", "no", "y"]);
        assert!(!confirm(&mut input, "").unwrap());
        assert_eq!(input.0.len(), 1);
    }

    #[test]
    fn test_confirm_interrupt_is_no() {
        let mut input = Answers(VecDeque::from([Input::Interrupted]));
        assert!(!confirm(&mut input, "").unwrap());
        assert!(!confirm(&mut answers(&[]), "").unwrap());
    }

    #[test]
    fn test_complete_commands() {
        let (start, candidates) = completions("c", &[]);
        assert_eq!(start, 0);
        assert_eq!(candidates, vec!["clear", "configure"]);

        let (_, candidates) = completions("", &[]);
        assert_eq!(candidates.len(), COMMANDS.len());
    }

    #[test]
    fn test_complete_aliases() {
        let aliases = vec!["web".to_string(), "db".to_string(), "web2".to_string()];
        assert_eq!(completions("ssh w", &aliases), (4, vec!["web".into(), "web2".into()]));
        assert_eq!(completions("remove ", &aliases).1.len(), 3);
        assert!(completions("list w", &aliases).1.is_empty());
        assert!(completions("ssh web w", &aliases).1.is_empty());
    }

    #[test]
    fn test_complete_skips_duplicate_aliases() {
        let aliases = vec!["web".to_string(), "db".to_string(), "web".to_string()];
        assert_eq!(completions("ssh ", &aliases).1, vec!["web", "db"]);
    }

    #[test]
    fn test_complete_configure() {
        assert_eq!(completions("configure s", &[]).1, vec!["show", "set"]);
        assert_eq!(
            completions("configure set DEFAULT-", &[]).1,
            vec!["DEFAULT-USER", "DEFAULT-PORT"]
        );
    }
}
