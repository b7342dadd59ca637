//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` is the production implementation that uses tokio
//! for async process execution with guaranteed timeout and kill on all platforms.

use std::process::{Output, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::application::ports::CommandRunner;

/// Default timeout for a single `fab` invocation.
///
/// Capacity creation through the ARM passthrough can take minutes; the limit
/// only guards against a hung process.
pub const DEFAULT_CMD_TIMEOUT: Duration = Duration::from_secs(600);

/// Flags whose following value is never written to logs.
const REDACTED_FLAGS: &[&str] = &["-p", "-i"];

/// Production `CommandRunner`. Uses tokio for async process execution
/// with guaranteed timeout and kill on all platforms.
///
/// `tokio::time::timeout` around `.output().await` does not kill the child on
/// Windows when the timeout fires. This implementation uses `tokio::select!`
/// with an explicit `child.kill()` instead.
pub struct TokioCommandRunner {
    timeout: Duration,
}

impl TokioCommandRunner {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TokioCommandRunner {
    fn default() -> Self {
        Self::new(DEFAULT_CMD_TIMEOUT)
    }
}

/// Render `args` for logging with secret values replaced.
#[must_use]
pub fn redact_args(args: &[&str]) -> String {
    let mut out = Vec::with_capacity(args.len());
    let mut hide_next = false;
    for arg in args {
        if hide_next {
            out.push("<redacted>");
            hide_next = false;
        } else {
            out.push(arg);
            hide_next = REDACTED_FLAGS.contains(arg);
        }
    }
    out.join(" ")
}

/// Read a pipe to its end, keeping whatever arrived before a read error.
async fn drain(reader: Option<impl AsyncRead + Unpin>, program: &str, stream: &str) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut reader) = reader
        && let Err(e) = reader.read_to_end(&mut buf).await
    {
        tracing::debug!(
            program,
            stream,
            error = %e,
            read = buf.len(),
            "pipe read failed; output truncated"
        );
    }
    buf
}

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.run_with_timeout(program, args, self.timeout).await
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output> {
        tracing::debug!(program, args = %redact_args(args), "running");

        let mut child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;

        let mut stdout_handle = child.stdout.take();
        let mut stderr_handle = child.stderr.take();

        // Drain both pipes while waiting; a child that fills a pipe buffer
        // blocks until it is read.
        let output = tokio::select! {
            result = async {
                let (status, stdout, stderr) = tokio::join!(
                    child.wait(),
                    drain(stdout_handle.as_mut(), program, "stdout"),
                    drain(stderr_handle.as_mut(), program, "stderr"),
                );
                Ok::<_, anyhow::Error>(Output {
                    status: status.with_context(|| format!("waiting for {program}"))?,
                    stdout,
                    stderr,
                })
            } => result?,
            () = tokio::time::sleep(timeout) => {
                let _ = child.kill().await;
                anyhow::bail!("{program} timed out after {}s", timeout.as_secs())
            }
        };

        tracing::debug!(
            program,
            code = ?output.status.code(),
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            "finished"
        );
        Ok(output)
    }
}
