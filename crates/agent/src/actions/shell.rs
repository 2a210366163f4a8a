//! Shell command action

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use super::required;
use crate::action::{Action, ActionFeedback, ActionParameter, Parameters};

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Runs `sh -c <command>` with the workspace as working directory
pub struct ExecuteShellCommandAction {
    workspace: PathBuf,
    timeout: Duration,
    parameters: Vec<ActionParameter>,
}

impl ExecuteShellCommandAction {
    pub fn new(workspace: PathBuf) -> Self {
        Self::with_timeout(workspace, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(workspace: PathBuf, timeout: Duration) -> Self {
        Self {
            workspace,
            timeout,
            parameters: vec![ActionParameter::new("command", "command to execute")],
        }
    }
}

#[async_trait]
impl Action for ExecuteShellCommandAction {
    fn name(&self) -> &str {
        "executeShellCommand"
    }

    fn usage(&self) -> &str {
        "execute a shell command"
    }

    fn parameters(&self) -> &[ActionParameter] {
        &self.parameters
    }

    async fn execute(&self, parameters: &Parameters) -> ActionFeedback {
        let command = match required(parameters, "command") {
            Ok(command) => command,
            Err(message) => return ActionFeedback::error(message),
        };

        debug!("$ {}", command);
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .current_dir(&self.workspace)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return ActionFeedback::error(format!("$ {}\n{}", command, e)),
            Err(_) => {
                return ActionFeedback::error(format!(
                    "$ {}\ntimed out after {} seconds",
                    command,
                    self.timeout.as_secs()
                ))
            }
        };

        let mut message = format!("$ {}\n{}", command, String::from_utf8_lossy(&output.stdout));
        if !output.stderr.is_empty() {
            message.push_str(&String::from_utf8_lossy(&output.stderr));
        }

        if output.status.success() {
            ActionFeedback::success(message)
        } else {
            let code = output.status.code().unwrap_or(-1);
            ActionFeedback::error(message).with_metadata("exit_code", code.to_string())
        }
    }
}
