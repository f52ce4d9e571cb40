use std::io::ErrorKind;
use std::process::Stdio;

use compio::{
    io::{AsyncWriteExt, compat::AsyncStream},
    process::{ChildStderr, ChildStdout, Command},
    runtime::{JoinHandle, spawn},
};
use futures::{AsyncBufReadExt, AsyncRead, StreamExt, io::BufReader};
use snafu::{ResultExt, Snafu};
use tracing::{debug, info};

use crate::discovery::FileRecord;
use crate::runner::output::{OutputStream, print_from_contract};

pub const DEFAULT_EXECUTOR: &str = "slangroom-exec";

/// Forwards contract content to an external execution engine.
///
/// The content is opaque text: it is written to the executor's stdin as-is,
/// and whatever the executor prints is streamed back line by line.
#[derive(Debug, Clone)]
pub struct ContractRunner {
    executor: String,
}

impl ContractRunner {
    pub fn new(executor: impl Into<String>) -> Self {
        Self {
            executor: executor.into(),
        }
    }

    pub async fn run(&self, record: &FileRecord) -> Result<(), RunError> {
        let contract = record.path.clone();
        let mut cmd = self.create_command();

        let mut handle = cmd.spawn().context(SpawnSnafu {
            executor: self.executor.clone(),
            contract: contract.clone(),
        })?;

        // Drain output before feeding stdin so a chatty executor cannot block on a full pipe.
        let stdout_handler = handle
            .stdout
            .take()
            .map(|stdout| Self::spawn_stdout_handler(stdout, contract.clone()));
        let stderr_handler = handle
            .stderr
            .take()
            .map(|stderr| Self::spawn_stderr_handler(stderr, contract.clone()));

        if let Some(mut stdin) = handle.stdin.take() {
            let written = stdin.write_all(record.content.clone().into_bytes()).await;
            match written.0 {
                Ok(()) => debug!(
                    "Sent {} byte(s) of '{}' to executor",
                    record.content.len(),
                    contract
                ),
                // The executor may exit without reading its whole input.
                Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                    debug!("Executor closed stdin early for '{}'", contract)
                }
                Err(e) => {
                    return Err(e).context(StdinSnafu {
                        contract: contract.clone(),
                    });
                }
            }
        }

        let status = handle.wait().await.context(WaitSnafu {
            contract: contract.clone(),
        })?;

        for (handler, kind) in [
            (stdout_handler, OutputStream::Stdout),
            (stderr_handler, OutputStream::Stderr),
        ] {
            if let Some(handler) = handler {
                Self::join_printer(handler, &contract, kind).await;
            }
        }

        if status.success() {
            info!("Contract '{}' completed successfully", contract);
            Ok(())
        } else {
            Err(RunError::UnsuccessfulExecutionError {
                executor: self.executor.clone(),
                contract,
                status: status.code().unwrap_or(-1),
            })
        }
    }

    /// Returns the shell and its arguments for the configured executor.
    fn full_command(&self) -> (&'static str, Vec<&str>) {
        #[cfg(target_family = "windows")]
        {
            ("cmd", vec!["/C", &self.executor])
        }
        #[cfg(target_family = "unix")]
        {
            ("sh", vec!["-c", &self.executor])
        }
    }

    fn create_command(&self) -> Command {
        let (command, args) = self.full_command();
        let mut cmd = Command::new(command);
        cmd.args(args);
        let _ = cmd.stdin(Stdio::piped());
        let _ = cmd.stdout(Stdio::piped());
        let _ = cmd.stderr(Stdio::piped());
        cmd
    }

    fn spawn_stdout_handler(stdout: ChildStdout, contract: String) -> JoinHandle<()> {
        Self::spawn_line_printer(AsyncStream::new(stdout), contract, OutputStream::Stdout)
    }

    fn spawn_stderr_handler(stderr: ChildStderr, contract: String) -> JoinHandle<()> {
        Self::spawn_line_printer(AsyncStream::new(stderr), contract, OutputStream::Stderr)
    }

    /// Prints every non-blank line of `stream` until it closes.
    fn spawn_line_printer<R>(stream: R, contract: String, kind: OutputStream) -> JoinHandle<()>
    where
        R: AsyncRead + 'static,
    {
        spawn(async move {
            let lines = BufReader::new(stream).lines();
            futures::pin_mut!(lines);

            while let Some(line_result) = lines.next().await {
                match line_result {
                    Ok(line) => {
                        if !line.trim().is_empty() {
                            print_from_contract(&contract, kind, line.trim_end());
                        }
                    }
                    Err(e) => debug!("Error reading {} of '{}': {}", kind, contract, e),
                }
            }
        })
    }

    /// Waits for an output printer, logging it if the printer panicked.
    async fn join_printer(handler: JoinHandle<()>, contract: &str, kind: OutputStream) {
        if let Err(panic) = handler.await {
            debug!("Printer for {} of '{}' panicked: {:?}", kind, contract, panic);
        }
    }
}

#[derive(Debug, Snafu)]
pub enum RunError {
    #[snafu(display("Failed to spawn executor '{}' for contract '{}'", executor, contract))]
    SpawnError {
        executor: String,
        contract: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to send contract '{}' to the executor", contract))]
    StdinError {
        contract: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to wait for the executor of contract '{}'", contract))]
    WaitError {
        contract: String,
        source: std::io::Error,
    },
    #[snafu(display(
        "Executor '{}' failed on contract '{}' with exit code {}",
        executor,
        contract,
        status
    ))]
    UnsuccessfulExecutionError {
        executor: String,
        contract: String,
        status: i32,
    },
}
