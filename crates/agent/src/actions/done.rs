//! Terminal action

use async_trait::async_trait;

use crate::action::{Action, ActionFeedback, ActionParameter, Parameters};

pub const DONE_ACTION_NAME: &str = "done";

/// Signals that the task is complete
#[derive(Debug, Clone, Copy, Default)]
pub struct DoneAction;

#[async_trait]
impl Action for DoneAction {
    fn name(&self) -> &str {
        DONE_ACTION_NAME
    }

    fn usage(&self) -> &str {
        "indicate that your task is done"
    }

    fn parameters(&self) -> &[ActionParameter] {
        &[]
    }

    async fn execute(&self, _parameters: &Parameters) -> ActionFeedback {
        ActionFeedback::success("task is done")
    }
}
