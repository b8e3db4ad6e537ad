//! Local execution environment
//!
//! Runs snippets through a POSIX-compatible shell (`sh` by default) and
//! captures their standard output. A `LocalRepl` owns a persistent variable
//! namespace: every entry is exported into the snippet's environment, and
//! whatever the snippet `export`s is read back afterwards, so later snippets
//! see it. The namespace is read back from a NUL-separated `env -0` dump,
//! so values may hold newlines or `=`.
//!
//! There is no sandboxing, isolation or resource limit of any kind. Snippets
//! run with the privileges of the current process.

use std::collections::BTreeMap;
use std::fmt;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// Separates the snippet's own output from the namespace dump that follows it
const NAMESPACE_MARKER: &str = "__RLM_NAMESPACE_DUMP__";

/// Variables provided by the interpreter itself, never kept in the namespace
const INTERPRETER_VARS: &[&str] = &[
    "PATH",
    "HOME",
    "PWD",
    "OLDPWD",
    "SHLVL",
    "_",
    "__rlm_status",
];

/// Interpreters that accept the POSIX shell wrapper `execute` appends
pub const POSIX_SHELLS: &[&str] = &["sh", "bash", "dash", "ash", "ksh", "mksh", "zsh", "yash"];

/// True when `interpreter` (a name or a path) is one of [`POSIX_SHELLS`]
pub fn is_posix_shell(interpreter: &str) -> bool {
    std::path::Path::new(interpreter)
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| POSIX_SHELLS.contains(&name))
}

/// Category of a failed execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The interpreter could not be started
    SpawnError,

    /// The snippet exited with a non-zero status
    ExitStatus,

    /// The snippet was killed by a signal
    Terminated,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::SpawnError => "SpawnError",
            FailureKind::ExitStatus => "ExitStatus",
            FailureKind::Terminated => "Terminated",
        };
        f.write_str(name)
    }
}

/// Result of one `execute` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecOutcome {
    /// Standard output written by the snippet
    Output(String),

    Failure { kind: FailureKind, message: String },
}

impl ExecOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecOutcome::Output(_))
    }
}

impl fmt::Display for ExecOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecOutcome::Output(out) => f.write_str(out),
            ExecOutcome::Failure { kind, message } => write!(f, "[ERROR] {}: {}", kind, message),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LocalRepl {
    interpreter: String,
    namespace: BTreeMap<String, String>,
    transcript: String,
}

impl Default for LocalRepl {
    fn default() -> Self {
        Self::new("sh")
    }
}

impl LocalRepl {
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
            namespace: BTreeMap::new(),
            transcript: String::new(),
        }
    }

    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }

    pub fn namespace(&self) -> &BTreeMap<String, String> {
        &self.namespace
    }

    pub fn get_var(&self, name: &str) -> Option<&str> {
        self.namespace.get(name).map(String::as_str)
    }

    pub fn set_var(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.namespace.insert(name.into(), value.into());
    }

    /// Everything successful executions have printed since the last `clear`
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Reset the output transcript; the namespace is kept
    pub fn clear(&mut self) {
        self.transcript.clear();
    }

    /// Execute `code` and return what it printed.
    ///
    /// A failing snippet leaves the namespace untouched.
    pub async fn execute(&mut self, code: &str) -> ExecOutcome {
        let script = format!(
            "{code}\n__rlm_status=$?\n\
             printf '\\n%s\\n' '{NAMESPACE_MARKER}'\n\
             env -0\n\
             exit $__rlm_status\n"
        );

        let mut command = Command::new(&self.interpreter);
        command
            .arg("-c")
            .arg(&script)
            .env_clear()
            .envs(&self.namespace)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for inherited in ["PATH", "HOME"] {
            if let Ok(value) = std::env::var(inherited) {
                command.env(inherited, value);
            }
        }

        let output = match command.output().await {
            Ok(output) => output,
            Err(e) => {
                warn!("Failed to start {}: {}", self.interpreter, e);
                return ExecOutcome::Failure {
                    kind: FailureKind::SpawnError,
                    message: e.to_string(),
                };
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let (printed, dump) = split_namespace_dump(&stdout);

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return match output.status.code() {
                Some(code) => ExecOutcome::Failure {
                    kind: FailureKind::ExitStatus,
                    message: if stderr.is_empty() {
                        format!("exit status {}", code)
                    } else {
                        stderr
                    },
                },
                None => ExecOutcome::Failure {
                    kind: FailureKind::Terminated,
                    message: "terminated by signal".to_string(),
                },
            };
        }

        if let Some(dump) = dump {
            self.namespace = parse_env_dump(dump);
            debug!("Namespace now holds {} variable(s)", self.namespace.len());
        }

        self.transcript.push_str(printed);
        ExecOutcome::Output(printed.to_string())
    }
}

/// Split captured stdout into the snippet's output and the trailing env dump.
fn split_namespace_dump(stdout: &str) -> (&str, Option<&str>) {
    let needle = format!("\n{}\n", NAMESPACE_MARKER);
    match stdout.rfind(&needle) {
        Some(idx) => (&stdout[..idx], Some(&stdout[idx + needle.len()..])),
        None => (stdout, None),
    }
}

/// Parse `env -0` output: `NAME=value` entries separated by NUL
fn parse_env_dump(dump: &str) -> BTreeMap<String, String> {
    dump.split('\0')
        .filter_map(|line| line.split_once('='))
        .filter(|(name, _)| !INTERPRETER_VARS.contains(name) && is_identifier(name))
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_display() {
        let outcome = ExecOutcome::Failure {
            kind: FailureKind::ExitStatus,
            message: "boom".to_string(),
        };
        assert_eq!(outcome.to_string(), "[ERROR] ExitStatus: boom");
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_split_namespace_dump() {
        let stdout = format!("hello\n\n{}\nA=1\0", NAMESPACE_MARKER);
        let (printed, dump) = split_namespace_dump(&stdout);
        assert_eq!(printed, "hello\n");
        assert_eq!(dump, Some("A=1\0"));

        assert_eq!(split_namespace_dump("no marker"), ("no marker", None));
    }

    #[test]
    fn test_parse_env_dump_filters_interpreter_vars() {
        let vars = parse_env_dump("PATH=/bin\0GREETING=hi\0SHLVL=1\0not a var\0EQ=a=b\0");
        assert_eq!(vars.len(), 2);
        assert_eq!(vars["GREETING"], "hi");
        assert_eq!(vars["EQ"], "a=b");
    }

    #[test]
    fn test_parse_env_dump_keeps_newlines_in_values() {
        let vars = parse_env_dump("NOTE=line one\nFAKE=oops\0OTHER=2\0");
        assert_eq!(vars.len(), 2);
        assert_eq!(vars["NOTE"], "line one\nFAKE=oops");
        assert_eq!(vars["OTHER"], "2");
        assert!(!vars.contains_key("FAKE"));
    }

    #[test]
    fn test_is_posix_shell() {
        assert!(is_posix_shell("sh"));
        assert!(is_posix_shell("/usr/bin/bash"));
        assert!(!is_posix_shell("python3"));
        assert!(!is_posix_shell("/usr/bin/node"));
        assert!(!is_posix_shell(""));
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("_x1"));
        assert!(!is_identifier("1x"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("a-b"));
    }
}
