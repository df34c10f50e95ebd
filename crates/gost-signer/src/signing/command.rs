use std::process::Stdio;

use futures::future::BoxFuture;
use tokio::process::Command;

/// Failure to run an external provider utility.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with code {code}: {output}")]
    Failed {
        program: String,
        /// Exit code, `-1` when the process was killed by a signal.
        code: i32,
        /// Stdout when the process printed anything there, stderr otherwise.
        output: String,
    },
}

/// Executes provider command-line utilities.
///
/// Arguments are passed as an argv vector, never through a shell.
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` to completion and return its stdout.
    fn run<'a>(
        &'a self,
        program: &'a str,
        args: &'a [String],
    ) -> BoxFuture<'a, Result<String, CommandError>>;
}

/// [`CommandRunner`] backed by `tokio::process`.
///
/// The child is killed if the returned future is dropped, so a cancelled
/// signing call cannot write output after its temp files are gone.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run<'a>(
        &'a self,
        program: &'a str,
        args: &'a [String],
    ) -> BoxFuture<'a, Result<String, CommandError>> {
        Box::pin(async move {
            let output = Command::new(program)
                .args(args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .output()
                .await
                .map_err(|source| CommandError::Spawn {
                    program: program.to_string(),
                    source,
                })?;

            if !output.status.success() {
                // CryptoPro utilities report most diagnostics on stdout.
                let stdout = String::from_utf8_lossy(&output.stdout);
                let diagnostics = if stdout.trim().is_empty() {
                    String::from_utf8_lossy(&output.stderr)
                } else {
                    stdout
                };
                return Err(CommandError::Failed {
                    program: program.to_string(),
                    code: output.status.code().unwrap_or(-1),
                    output: diagnostics.trim().to_string(),
                });
            }

            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        })
    }
}
