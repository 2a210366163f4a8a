//! Single-pass agent
//!
//! One prompt, one parsed answer. Invocations naming a registered action
//! are executed; structured answers are only returned.

use tracing::{debug, warn};

use crate::action::Instruction;
use crate::client::{AgentContext, CompletionClient};
use crate::parser::{self, ParsedInvocation};
use crate::registry::InstructionRegistry;
use crate::template::PromptFormatter;
use crate::{AgentParseError, Result};

pub struct AgentOneShot {
    client: CompletionClient,
    registry: InstructionRegistry,
    formatter: Box<dyn PromptFormatter>,
    actions_count: usize,
    actions_error_count: usize,
}

impl AgentOneShot {
    pub fn new(
        name: impl Into<String>,
        context: AgentContext,
        formatter: impl PromptFormatter + 'static,
        instructions: Vec<Instruction>,
    ) -> Result<Self> {
        Ok(Self {
            client: CompletionClient::new(name, context),
            registry: InstructionRegistry::from_instructions(instructions)?,
            formatter: Box::new(formatter),
            actions_count: 0,
            actions_error_count: 0,
        })
    }

    pub fn name(&self) -> &str {
        self.client.agent_name()
    }

    pub fn registry(&self) -> &InstructionRegistry {
        &self.registry
    }

    pub fn actions_count(&self) -> usize {
        self.actions_count
    }

    pub fn actions_error_count(&self) -> usize {
        self.actions_error_count
    }

    pub fn calls(&self) -> usize {
        self.client.calls()
    }

    /// Parsed invocations of the first answer that parses
    ///
    /// The tries budget bounds the total number of attempts.
    pub async fn run(&mut self) -> Result<Vec<ParsedInvocation>> {
        let options = self.client.options().clone();
        let mut tries_remaining = options.tries;
        let prompt = self.formatter.format_prompt(&self.registry.describe(), &[])?;

        loop {
            let completion = self.client.complete(&prompt).await?;

            match parser::parse(&completion.answer, &self.registry) {
                Ok(invocations) => {
                    self.execute_actions(&invocations, options.feedback_size_limit)
                        .await;
                    return Ok(invocations);
                }
                Err(source) => {
                    if tries_remaining == 0 {
                        let (prompt_key, answer_key) = self.client.keys(completion.index, &prompt);
                        return Err(AgentParseError {
                            source,
                            prompt_key,
                            answer_key,
                        }
                        .into());
                    }

                    tries_remaining -= 1;
                    warn!(
                        "{}: {}, retrying ({} tries left)",
                        self.name(),
                        source,
                        tries_remaining
                    );
                }
            }
        }
    }

    async fn execute_actions(&mut self, invocations: &[ParsedInvocation], limit: usize) {
        for invocation in invocations {
            let is_action = self
                .registry
                .get(&invocation.name)
                .is_some_and(Instruction::is_action);
            if !is_action {
                continue;
            }

            let feedback = self.registry.execute(invocation, limit).await;
            debug!(
                "{}: {} -> {}",
                self.client.agent_name(),
                invocation.name,
                feedback.feedback_type
            );
            if feedback.is_error() {
                self.actions_error_count += 1;
            } else {
                self.actions_count += 1;
            }
        }
    }
}
