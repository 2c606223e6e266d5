//! Provisioning-tool subprocess execution.
//!
//! Runs a program in argument-list form with a bounded timeout and captures
//! stdout/stderr as text. No shell is involved at any point.

use std::collections::BTreeMap;
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use thiserror::Error;

/// How long to keep draining pipes after the child exits.
///
/// A grandchild that inherited the pipes can keep them open after the child
/// is gone; whatever was read by then is returned.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// A fully resolved command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Extra environment variables for the child.
    pub env: BTreeMap<String, String>,
}

impl Invocation {
    /// Render as a copy-pasteable command line (for logs only, never executed).
    pub fn display(&self) -> String {
        shell_words::join(std::iter::once(&self.program).chain(self.args.iter()))
    }
}

/// Captured result of a process that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code (None if terminated by a signal).
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Failures that prevented a process from running to completion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error("'{program}' command not found")]
    NotFound { program: String },

    #[error("'{program}' timed out after {}s", .timeout.as_secs_f64())]
    Timeout { program: String, timeout: Duration },

    #[error("{0}")]
    Io(String),
}

/// Executes invocations. Implemented by [`SystemRunner`] and by test fakes.
pub trait ProcessRunner {
    fn run(&self, invocation: &Invocation, timeout: Duration) -> Result<ProcessOutput, RunError>;
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for &R {
    fn run(&self, invocation: &Invocation, timeout: Duration) -> Result<ProcessOutput, RunError> {
        (**self).run(invocation, timeout)
    }
}

/// Runs invocations as real child processes.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    poll_interval: Duration,
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &Invocation, timeout: Duration) -> Result<ProcessOutput, RunError> {
        let program = &invocation.program;

        let mut command = Command::new(program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        for (key, value) in &invocation.env {
            command.env(key, value);
        }

        let mut child = command.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RunError::NotFound {
                    program: program.clone(),
                }
            } else {
                RunError::Io(format!("failed to execute '{}': {}", program, e))
            }
        })?;

        let stdout_rx = drain(child.stdout.take());
        let stderr_rx = drain(child.stderr.take());

        let Some(status) = wait_with_timeout(&mut child, timeout, self.poll_interval)? else {
            return Err(RunError::Timeout {
                program: program.clone(),
                timeout,
            });
        };

        let deadline = Instant::now() + DRAIN_GRACE;
        Ok(ProcessOutput {
            exit_code: status.code(),
            stdout: stdout_rx.collect(deadline),
            stderr: stderr_rx.collect(deadline),
        })
    }
}

/// Output of one pipe, filled in by a background reader.
struct Drained {
    buf: Arc<Mutex<Vec<u8>>>,
    done: Receiver<()>,
}

impl Drained {
    /// Wait until the pipe closes or `deadline` passes, then take what was read.
    fn collect(self, deadline: Instant) -> String {
        let wait = deadline.saturating_duration_since(Instant::now());
        let _ = self.done.recv_timeout(wait);

        let buf = self.buf.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        String::from_utf8_lossy(&buf).into_owned()
    }
}

/// Read a pipe on a background thread, appending each chunk as it arrives.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Drained {
    let buf = Arc::new(Mutex::new(Vec::new()));
    let (tx, done) = mpsc::channel();

    let shared = Arc::clone(&buf);
    std::thread::spawn(move || {
        if let Some(mut pipe) = pipe {
            let mut chunk = [0u8; 8192];
            loop {
                match pipe.read(&mut chunk) {
                    Ok(0) => break,
                    Ok(n) => shared
                        .lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner())
                        .extend_from_slice(&chunk[..n]),
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(_) => break,
                }
            }
        }
        let _ = tx.send(());
    });

    Drained { buf, done }
}

/// Wait for a child process with timeout.
///
/// Returns `None` if the timeout elapsed; the child has been killed and reaped.
fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<Option<ExitStatus>, RunError> {
    let start = Instant::now();

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(Some(status)),
            Ok(None) => {
                if start.elapsed() >= timeout {
                    kill_process(child);
                    return Ok(None);
                }
                std::thread::sleep(poll_interval.min(timeout.saturating_sub(start.elapsed())));
            }
            Err(e) => {
                kill_process(child);
                return Err(RunError::Io(format!("failed to check process status: {}", e)));
            }
        }
    }
}

/// Kill a process and wait for it to terminate.
fn kill_process(child: &mut Child) {
    // On Unix this is SIGKILL; on Windows it is TerminateProcess.
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Invocation {
        Invocation {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            env: BTreeMap::new(),
        }
    }

    #[test]
    fn test_captures_stdout_and_exit_code() {
        let output = SystemRunner::default()
            .run(&sh("echo hello"), Duration::from_secs(10))
            .unwrap();

        assert!(output.is_success());
        assert_eq!(output.exit_code, Some(0));
        assert_eq!(output.stdout, "hello\n");
        assert!(output.stderr.is_empty());
    }

    #[test]
    fn test_captures_stderr_on_failure() {
        let output = SystemRunner::default()
            .run(&sh("echo oops >&2; exit 3"), Duration::from_secs(10))
            .unwrap();

        assert!(!output.is_success());
        assert_eq!(output.exit_code, Some(3));
        assert_eq!(output.stderr.trim(), "oops");
    }

    #[test]
    fn test_timeout_kills_process() {
        let start = Instant::now();
        let err = SystemRunner::default()
            .run(&sh("sleep 10"), Duration::from_millis(300))
            .unwrap_err();

        assert!(matches!(err, RunError::Timeout { .. }));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_timeout_with_grandchild_holding_pipes() {
        // The backgrounded sleep keeps stdout open after sh is killed.
        let start = Instant::now();
        let err = SystemRunner::default()
            .run(&sh("sleep 10 & sleep 10"), Duration::from_millis(300))
            .unwrap_err();

        assert!(matches!(err, RunError::Timeout { .. }));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_output_kept_when_grandchild_holds_pipes() {
        let start = Instant::now();
        let output = SystemRunner::default()
            .run(
                &sh("echo partial; echo 'quota exceeded' >&2; sleep 5 & exit 1"),
                Duration::from_secs(10),
            )
            .unwrap();

        assert_eq!(output.exit_code, Some(1));
        assert_eq!(output.stdout.trim(), "partial");
        assert_eq!(output.stderr.trim(), "quota exceeded");
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_missing_program_is_not_found() {
        let invocation = Invocation {
            program: "nonexistent_command_xyz_123".to_string(),
            ..Default::default()
        };
        let err = SystemRunner::default()
            .run(&invocation, Duration::from_secs(1))
            .unwrap_err();

        assert_eq!(
            err,
            RunError::NotFound {
                program: "nonexistent_command_xyz_123".to_string()
            }
        );
    }

    #[test]
    fn test_environment_is_passed() {
        let mut invocation = sh("echo $GCEVM_TEST_VAR");
        invocation
            .env
            .insert("GCEVM_TEST_VAR".to_string(), "test_value".to_string());

        let output = SystemRunner::default()
            .run(&invocation, Duration::from_secs(10))
            .unwrap();
        assert!(output.stdout.contains("test_value"));
    }

    #[test]
    fn test_arguments_are_not_shell_interpreted() {
        let invocation = Invocation {
            program: "echo".to_string(),
            args: vec!["vm1; echo injected".to_string()],
            env: BTreeMap::new(),
        };
        let output = SystemRunner::default()
            .run(&invocation, Duration::from_secs(10))
            .unwrap();

        assert_eq!(output.stdout, "vm1; echo injected\n");
    }

    #[test]
    fn test_display_quotes_arguments() {
        let invocation = Invocation {
            program: "gcloud".to_string(),
            args: vec!["compute".to_string(), "a b".to_string()],
            env: BTreeMap::new(),
        };
        assert_eq!(invocation.display(), "gcloud compute 'a b'");
    }
}
