//! Workspace file actions

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

use super::path_utils::resolve_workspace_path;
use super::required;
use crate::action::{Action, ActionFeedback, ActionParameter, Format, Parameters};

/// Resolve a parameter to a workspace path or bail out with error feedback
macro_rules! workspace_path {
    ($parameters:expr, $name:expr, $workspace:expr) => {{
        let raw = match required($parameters, $name) {
            Ok(raw) => raw,
            Err(message) => return ActionFeedback::error(message),
        };
        match resolve_workspace_path(raw, $workspace).await {
            Ok(path) => (raw, path),
            Err(e) => return ActionFeedback::error(e.to_string()),
        }
    }};
}

pub struct ListFilesAction {
    workspace: PathBuf,
    parameters: Vec<ActionParameter>,
}

impl ListFilesAction {
    pub fn new(workspace: PathBuf) -> Self {
        Self {
            workspace,
            parameters: vec![ActionParameter::new(
                "directory",
                "path of the directory to list",
            )],
        }
    }
}

#[async_trait]
impl Action for ListFilesAction {
    fn name(&self) -> &str {
        "listFiles"
    }

    fn usage(&self) -> &str {
        "list all files in a directory"
    }

    fn parameters(&self) -> &[ActionParameter] {
        &self.parameters
    }

    async fn execute(&self, parameters: &Parameters) -> ActionFeedback {
        let (directory, path) = workspace_path!(parameters, "directory", &self.workspace);

        debug!("listing {:?}", path);
        let mut entries = match tokio::fs::read_dir(&path).await {
            Ok(entries) => entries,
            Err(e) => return ActionFeedback::error(format!("cannot list {}: {}", directory, e)),
        };

        let mut items = Vec::new();
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    let name = entry.file_name().to_string_lossy().to_string();
                    let is_dir = entry
                        .file_type()
                        .await
                        .map(|t| t.is_dir())
                        .unwrap_or(false);
                    items.push(if is_dir {
                        format!("[DIR] {}", name)
                    } else {
                        format!("[FILE] {}", name)
                    });
                }
                Ok(None) => break,
                Err(e) => {
                    return ActionFeedback::error(format!("cannot list {}: {}", directory, e))
                }
            }
        }
        items.sort();

        if items.is_empty() {
            ActionFeedback::success(format!("Directory {} is empty", directory))
        } else {
            ActionFeedback::success(format!("Files in {}:\n{}", directory, items.join("\n")))
        }
    }
}

pub struct ReadFileAction {
    workspace: PathBuf,
    parameters: Vec<ActionParameter>,
}

impl ReadFileAction {
    pub fn new(workspace: PathBuf) -> Self {
        Self {
            workspace,
            parameters: vec![ActionParameter::new("path", "path of the file to read")],
        }
    }
}

#[async_trait]
impl Action for ReadFileAction {
    fn name(&self) -> &str {
        "readFile"
    }

    fn usage(&self) -> &str {
        "read the content of a file"
    }

    fn parameters(&self) -> &[ActionParameter] {
        &self.parameters
    }

    async fn execute(&self, parameters: &Parameters) -> ActionFeedback {
        let (raw, path) = workspace_path!(parameters, "path", &self.workspace);

        debug!("reading {:?}", path);
        if !path.is_file() {
            return ActionFeedback::error(format!("{} is not a file", raw));
        }
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => ActionFeedback::success(content),
            Err(e) => ActionFeedback::error(format!("cannot read {}: {}", raw, e)),
        }
    }
}

pub struct WriteFileAction {
    workspace: PathBuf,
    parameters: Vec<ActionParameter>,
}

impl WriteFileAction {
    pub fn new(workspace: PathBuf) -> Self {
        Self {
            workspace,
            parameters: vec![
                ActionParameter::new("path", "path of the file to write"),
                ActionParameter::new("content", "full content of the file"),
            ],
        }
    }
}

#[async_trait]
impl Action for WriteFileAction {
    fn name(&self) -> &str {
        "writeFile"
    }

    fn usage(&self) -> &str {
        "write content to a file, creating parent directories when needed"
    }

    fn parameters(&self) -> &[ActionParameter] {
        &self.parameters
    }

    fn format(&self) -> Format {
        Format::Multiline
    }

    async fn execute(&self, parameters: &Parameters) -> ActionFeedback {
        let (raw, path) = workspace_path!(parameters, "path", &self.workspace);
        let content = match required(parameters, "content") {
            Ok(content) => content,
            Err(message) => return ActionFeedback::error(message),
        };

        debug!("writing {:?}", path);
        if let Some(parent) = path.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                return ActionFeedback::error(format!("cannot create {}: {}", parent.display(), e));
            }
        }
        match tokio::fs::write(&path, content).await {
            Ok(()) => ActionFeedback::success(format!("{} bytes written to {}", content.len(), raw))
                .with_metadata("path", path.display().to_string()),
            Err(e) => ActionFeedback::error(format!("cannot write {}: {}", raw, e)),
        }
    }
}

pub struct CopyFileAction {
    workspace: PathBuf,
    parameters: Vec<ActionParameter>,
}

impl CopyFileAction {
    pub fn new(workspace: PathBuf) -> Self {
        Self {
            workspace,
            parameters: vec![
                ActionParameter::new("source", "path of the file to copy"),
                ActionParameter::new("destination", "path of the destination file"),
            ],
        }
    }
}

#[async_trait]
impl Action for CopyFileAction {
    fn name(&self) -> &str {
        "copyFile"
    }

    fn usage(&self) -> &str {
        "copy a file from one place to another"
    }

    fn parameters(&self) -> &[ActionParameter] {
        &self.parameters
    }

    async fn execute(&self, parameters: &Parameters) -> ActionFeedback {
        let (source, from) = workspace_path!(parameters, "source", &self.workspace);
        let (destination, to) = workspace_path!(parameters, "destination", &self.workspace);

        debug!("copying {:?} to {:?}", from, to);
        match tokio::fs::copy(&from, &to).await {
            Ok(_) => ActionFeedback::success(format!(
                "File copied from {} to {}",
                source, destination
            )),
            Err(e) => ActionFeedback::error(format!(
                "cannot copy {} to {}: {}",
                source, destination, e
            )),
        }
    }
}

pub struct CreateDirectoryAction {
    workspace: PathBuf,
    parameters: Vec<ActionParameter>,
}

impl CreateDirectoryAction {
    pub fn new(workspace: PathBuf) -> Self {
        Self {
            workspace,
            parameters: vec![ActionParameter::new(
                "path",
                "path of the directory to create",
            )],
        }
    }
}

#[async_trait]
impl Action for CreateDirectoryAction {
    fn name(&self) -> &str {
        "createDirectory"
    }

    fn usage(&self) -> &str {
        "create a directory"
    }

    fn parameters(&self) -> &[ActionParameter] {
        &self.parameters
    }

    async fn execute(&self, parameters: &Parameters) -> ActionFeedback {
        let (raw, path) = workspace_path!(parameters, "path", &self.workspace);

        debug!("creating {:?}", path);
        match tokio::fs::create_dir_all(&path).await {
            Ok(()) => ActionFeedback::success(format!("Created directory {}", raw)),
            Err(e) => ActionFeedback::error(format!("cannot create {}: {}", raw, e)),
        }
    }
}
