//! Subprocess execution with captured output.

use std::env;
use std::path::Path;
use std::process::{Child, Command, Stdio};

use crate::error::{RegionError, Result};

/// Maximum number of characters of stdout/stderr kept in log messages.
const MAX_OUTPUT_LEN: usize = 2000;

/// A running external command with piped stdout and stderr.
pub struct Process {
    command: Vec<String>,
    child: Child,
}

impl Process {
    /// Start `command` (program followed by arguments).
    pub fn spawn<I, S>(command: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        let command: Vec<String> = command.into_iter().map(|s| s.to_string()).collect();
        let (program, args) = command
            .split_first()
            .ok_or_else(|| RegionError::Process("Empty command".to_string()))?;
        let child = Command::new(program)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| RegionError::Process(format!("Cannot start {}: {}", program, e)))?;
        log::debug!("Started {}", command_string(&command));
        Ok(Self { command, child })
    }

    /// The command line, quoting arguments that contain spaces.
    pub fn command_str(&self) -> String {
        command_string(&self.command)
    }

    /// Wait for the process. Returns `Ok(true)` on a zero exit code.
    ///
    /// A non-zero exit is logged with truncated stdout/stderr; with
    /// `zero_code_stderr`, a successful run that wrote to stderr is logged too.
    pub fn finish(self, zero_code_stderr: bool) -> Result<bool> {
        let command = self.command_str();
        let output = self.child.wait_with_output()?;

        if !output.status.success() {
            let code = output
                .status
                .code()
                .map_or_else(|| "signal".to_string(), |c| c.to_string());
            log::error!("{} returned code {}", command, code);
            if !output.stdout.is_empty() {
                log::error!("    Stdout: {}", normalize_output(&output.stdout, MAX_OUTPUT_LEN));
            }
            if !output.stderr.is_empty() {
                log::error!("    Stderr: {}", normalize_output(&output.stderr, MAX_OUTPUT_LEN));
            }
            return Ok(false);
        }

        if zero_code_stderr && !output.stderr.is_empty() {
            log::warn!(
                "Process {} finished with code 0, but has non empty stderr: {}",
                command,
                normalize_output(&output.stderr, MAX_OUTPUT_LEN)
            );
        }
        Ok(true)
    }

    /// Kill the process: SIGKILL on Unix, not SIGTERM.
    pub fn terminate(&mut self) -> Result<()> {
        self.child.kill()?;
        Ok(())
    }
}

fn command_string(command: &[String]) -> String {
    command
        .iter()
        .map(|arg| {
            if arg.contains(' ') {
                format!("\"{}\"", arg)
            } else {
                arg.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decode lossily, trim, and keep only the head and tail of long output.
pub fn normalize_output(bytes: &[u8], max_len: usize) -> String {
    let text = String::from_utf8_lossy(bytes);
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_len {
        return text.trim().to_string();
    }
    let half = max_len / 2;
    let head: String = chars[..half].iter().collect();
    let tail: String = chars[chars.len() - half..].iter().collect();
    format!("{}\n...\n{}", head.trim(), tail.trim())
}

/// Fail unless every program is found (as a path or on `PATH`).
pub fn check_executable<I, S>(programs: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for program in programs {
        let program = program.as_ref();
        if !is_executable(program) {
            return Err(RegionError::Process(format!(
                "Cannot find path \"{}\"",
                program
            )));
        }
    }
    Ok(())
}

fn is_executable(program: &str) -> bool {
    let path = Path::new(program);
    if path.components().count() > 1 {
        return path.is_file();
    }
    env::var_os("PATH")
        .map(|paths| env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
        .unwrap_or(false)
}
