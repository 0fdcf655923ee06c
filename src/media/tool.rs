use std::collections::VecDeque;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::Path;
use std::process::Command;

use crate::foundation::error::{TalkcutError, TalkcutResult};

/// A single external program invocation (`ffmpeg`, `ffprobe`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    /// Program name looked up on `PATH`.
    pub program: String,
    /// Arguments, in order.
    pub args: Vec<OsString>,
}

impl Invocation {
    /// Start an invocation of `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// `ffmpeg -hide_banner -y` (overwrite outputs).
    pub fn ffmpeg() -> Self {
        Self::new("ffmpeg").args(["-hide_banner", "-y"])
    }

    /// `ffprobe -v error`.
    pub fn ffprobe() -> Self {
        Self::new("ffprobe").args(["-v", "error"])
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Append `-i <path>`.
    pub fn input(self, path: &Path) -> Self {
        self.arg("-i").arg(path)
    }
}

#[cfg(test)]
impl Invocation {
    /// Return `true` if any argument equals `needle`.
    pub fn has_arg(&self, needle: &str) -> bool {
        self.args.iter().any(|a| a == needle)
    }

    /// Value following the first occurrence of `flag`, if any.
    pub fn arg_after(&self, flag: &str) -> Option<String> {
        let idx = self.args.iter().position(|a| a == flag)?;
        self.args
            .get(idx + 1)
            .map(|a| a.to_string_lossy().into_owned())
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            let arg = arg.to_string_lossy();
            if arg.is_empty() || arg.contains(|c: char| c.is_whitespace() || c == '\'') {
                write!(f, " '{}'", arg.replace('\'', "'\\''"))?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Captured result of an invocation.
#[derive(Clone, Debug, Default)]
pub struct ToolOutput {
    /// Exit code; `None` when terminated by a signal.
    pub code: Option<i32>,
    /// Raw standard output.
    pub stdout: Vec<u8>,
    /// Standard error, lossily decoded.
    pub stderr: String,
}

impl ToolOutput {
    /// Successful output with the given stdout.
    pub fn ok(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Return `true` when the program exited with status 0.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    fn status_text(&self) -> String {
        match self.code {
            Some(c) => format!("exit status {c}"),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Blocking executor for external tools.
///
/// The pipeline is strictly sequential: one invocation runs to completion before the next starts.
pub trait ToolRunner {
    /// Run the invocation and capture its output regardless of exit status.
    fn run(&mut self, inv: &Invocation) -> TalkcutResult<ToolOutput>;

    /// Run the invocation and turn a non-zero exit into [`TalkcutError::ExternalToolFailure`].
    fn run_checked(&mut self, inv: &Invocation) -> TalkcutResult<ToolOutput> {
        let out = self.run(inv)?;
        if !out.success() {
            return Err(TalkcutError::external(
                inv.program.clone(),
                out.status_text(),
                &out.stderr,
            ));
        }
        Ok(out)
    }
}

/// Runs programs from `PATH` through `std::process::Command`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&mut self, inv: &Invocation) -> TalkcutResult<ToolOutput> {
        tracing::debug!(command = %inv, "running external tool");
        let out = Command::new(&inv.program)
            .args(&inv.args)
            .output()
            .map_err(|e| {
                TalkcutError::external(
                    inv.program.clone(),
                    "failed to spawn",
                    &format!("{e} (is '{}' installed and on PATH?)", inv.program),
                )
            })?;
        Ok(ToolOutput {
            code: out.status.code(),
            stdout: out.stdout,
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
        })
    }
}

/// Return `true` when `program -version` can be invoked from `PATH`.
pub fn is_on_path(program: &str) -> bool {
    Command::new(program)
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// In-memory runner that records invocations and replays scripted outputs.
///
/// Invocations without a scripted output succeed with empty output.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: Vec<Invocation>,
    scripted: VecDeque<ToolOutput>,
}

impl RecordingRunner {
    /// Create an empty runner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an output to be returned by the next otherwise unscripted call.
    pub fn push_output(&mut self, out: ToolOutput) {
        self.scripted.push_back(out);
    }

    /// Recorded invocations, in execution order.
    pub fn calls(&self) -> &[Invocation] {
        &self.calls
    }
}

impl ToolRunner for RecordingRunner {
    fn run(&mut self, inv: &Invocation) -> TalkcutResult<ToolOutput> {
        self.calls.push(inv.clone());
        Ok(self
            .scripted
            .pop_front()
            .unwrap_or_else(|| ToolOutput::ok(Vec::new())))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/tool.rs"]
mod tests;
