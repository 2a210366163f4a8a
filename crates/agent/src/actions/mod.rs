//! Built-in actions
//!
//! Everything except `done` works inside a workspace directory; paths that
//! resolve outside of it are refused with `error` feedback.

pub mod done;
pub mod filesystem;
pub mod path_utils;
pub mod shell;

pub use done::{DoneAction, DONE_ACTION_NAME};
pub use filesystem::{
    CopyFileAction, CreateDirectoryAction, ListFilesAction, ReadFileAction, WriteFileAction,
};
pub use shell::ExecuteShellCommandAction;

use std::path::Path;

use crate::action::{Instruction, Parameters};

/// Workspace actions for a looping agent (`done` is added by the agent)
pub fn workspace_actions(workspace: &Path) -> Vec<Instruction> {
    let workspace = workspace.to_path_buf();
    vec![
        Instruction::action(ListFilesAction::new(workspace.clone())),
        Instruction::action(ReadFileAction::new(workspace.clone())),
        Instruction::action(WriteFileAction::new(workspace.clone())),
        Instruction::action(CopyFileAction::new(workspace.clone())),
        Instruction::action(CreateDirectoryAction::new(workspace.clone())),
        Instruction::action(ExecuteShellCommandAction::new(workspace)),
    ]
}

/// Value of a required parameter, or the error message to report
fn required<'a>(parameters: &'a Parameters, name: &str) -> Result<&'a str, String> {
    parameters
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| format!("missing parameter \"{}\"", name))
}
