use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::grid::GridPoint;

/// Delegate command line materialized at one grid point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobInvocation {
    /// Position of the job in enumeration order.
    pub index: usize,
    /// Delegate interpreter.
    pub program: String,
    /// Arguments after `program`, fixed flags first, then `key=value` assignments.
    pub args: Vec<String>,
    /// Rendered named arguments in declaration order.
    pub assignments: IndexMap<String, String>,
    /// Resolved output directory of the job.
    pub output_dir: PathBuf,
    /// Grid point the job was rendered at.
    pub point: GridPoint,
}

impl JobInvocation {
    /// Program followed by its arguments.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.len() + 1);
        argv.push(self.program.clone());
        argv.extend(self.args.iter().cloned());
        argv
    }

    /// Shell-quoted single line, suitable for logs and copy-paste.
    pub fn command_line(&self) -> String {
        shell_join(&self.argv())
    }
}

/// Joins words into a POSIX shell command line, quoting where needed.
pub fn shell_join<S: AsRef<str>>(words: &[S]) -> String {
    words
        .iter()
        .map(|word| shell_quote(word.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Quotes `word` with single quotes unless it only contains safe characters.
pub fn shell_quote(word: &str) -> String {
    let safe = !word.is_empty()
        && word.chars().all(|ch| {
            ch.is_ascii_alphanumeric()
                || matches!(ch, '_' | '-' | '.' | '/' | ':' | '=' | '+' | '@' | '%' | '{' | '}')
        });
    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}
