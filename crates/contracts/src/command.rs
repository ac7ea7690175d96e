//! External command description and captured output.
//!
//! Commands are a program plus an argument vector. Nothing is ever passed
//! through a shell; [`CommandSpec::display`] exists for logs only.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::Path;

/// A single external invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: OsString,
    args: Vec<OsString>,
}

impl CommandSpec {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Append `--flag value`
    pub fn flag(self, name: &str, value: impl AsRef<OsStr>) -> Self {
        self.arg(name).arg(value)
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// First argument, i.e. the COLMAP subcommand
    pub fn subcommand(&self) -> Option<&str> {
        self.args.first().and_then(|a| a.to_str())
    }

    /// Value following `name` in the argument list
    pub fn flag_value(&self, name: &str) -> Option<&Path> {
        self.args
            .iter()
            .position(|a| a == name)
            .and_then(|idx| self.args.get(idx + 1))
            .map(Path::new)
    }

    /// Shell-like rendering for logs
    pub fn display(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|part| quote(&part.to_string_lossy()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

fn quote(part: &str) -> String {
    let needs_quotes = part.is_empty()
        || part
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '\'' | '"' | '>' | '<' | '&' | '|' | ';'));
    if needs_quotes {
        format!("'{}'", part.replace('\'', r"'\''"))
    } else {
        part.to_string()
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_argument_vector() {
        let spec = CommandSpec::new("colmap")
            .arg("mapper")
            .flag("--database_path", "/ws/database.db")
            .flag("--output_path", "/ws/sparse");
        assert_eq!(spec.subcommand(), Some("mapper"));
        assert_eq!(spec.args().len(), 5);
        assert_eq!(spec.flag_value("--output_path"), Some(Path::new("/ws/sparse")));
        assert_eq!(spec.flag_value("--image_path"), None);
    }

    #[test]
    fn display_quotes_awkward_arguments() {
        let spec = CommandSpec::new("convert")
            .arg("/my photos/a.jpg")
            .arg("-resize")
            .arg("1600x1600>")
            .arg("/out/a.jpg");
        assert_eq!(
            spec.display(),
            "convert '/my photos/a.jpg' -resize '1600x1600>' /out/a.jpg"
        );
    }

    #[test]
    fn success_requires_zero_exit() {
        let mut out = CommandOutput::default();
        assert!(!out.success());
        out.exit_code = Some(0);
        assert!(out.success());
        out.exit_code = Some(1);
        assert!(!out.success());
    }
}
