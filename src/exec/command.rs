// src/exec/command.rs

use std::process::Stdio;

use anyhow::{anyhow, Context};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::task::{Task, TaskContext};

/// A task that runs a shell command.
///
/// The command is spawned in its own Tokio task; the exit status decides
/// success or failure, and the success payload carries the exit code.
#[derive(Debug, Clone)]
pub struct CommandTask {
    cmd: String,
}

impl CommandTask {
    pub fn new(cmd: impl Into<String>) -> Self {
        Self { cmd: cmd.into() }
    }
}

impl Task for CommandTask {
    fn start(&mut self, ctx: TaskContext) {
        let cmd = self.cmd.clone();
        tokio::spawn(async move {
            let vertex = ctx.vertex().to_string();
            match run_command(&vertex, &cmd).await {
                Ok(payload) => ctx.succeed(payload),
                Err(err) => {
                    error!(vertex = %vertex, error = %err, "command execution error");
                    ctx.fail(err.to_string());
                }
            }
        });
    }
}

/// Run a single command process, logging its output and mapping the exit
/// status to an outcome.
async fn run_command(vertex: &str, cmd: &str) -> anyhow::Result<Value> {
    info!(vertex = %vertex, cmd = %cmd, "starting command process");

    // Build a shell command appropriate for the platform.
    let mut command = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    };

    command
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command
        .spawn()
        .with_context(|| format!("spawning process for vertex '{vertex}'"))?;

    if let Some(stdout) = child.stdout.take() {
        let vertex = vertex.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(vertex = %vertex, "stdout: {}", line);
            }
        });
    }

    // Always consume stderr so buffers don't fill.
    if let Some(stderr) = child.stderr.take() {
        let vertex = vertex.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(vertex = %vertex, "stderr: {}", line);
            }
        });
    }

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for process of vertex '{vertex}'"))?;

    let code = status.code().unwrap_or(-1);
    info!(
        vertex = %vertex,
        exit_code = code,
        success = status.success(),
        "command process exited"
    );

    if status.success() {
        Ok(json!({ "exit_code": code }))
    } else {
        Err(anyhow!("command exited with status {code}"))
    }
}
