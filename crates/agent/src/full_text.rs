//! Agent returning the raw completion text

use crate::client::{AgentContext, CompletionClient};
use crate::template::PromptFormatter;
use crate::Result;

pub struct AgentFullText {
    client: CompletionClient,
    formatter: Box<dyn PromptFormatter>,
}

impl AgentFullText {
    pub fn new(
        name: impl Into<String>,
        context: AgentContext,
        formatter: impl PromptFormatter + 'static,
    ) -> Self {
        Self {
            client: CompletionClient::new(name, context),
            formatter: Box::new(formatter),
        }
    }

    pub fn name(&self) -> &str {
        self.client.agent_name()
    }

    pub async fn run(&mut self) -> Result<String> {
        let prompt = self.formatter.format_prompt("", &[])?;
        let completion = self.client.complete(&prompt).await?;
        Ok(completion.answer)
    }
}
