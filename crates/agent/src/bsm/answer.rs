//! Candidate answer generation

use crate::client::AgentContext;
use crate::full_text::AgentFullText;
use crate::template::PromptTemplate;
use crate::Result;

const TEMPLATE: &str = "You are an expert in question and answer analysis.

You will be given a question and you need to answer it as best as you can.

Here is the question:
{question}";

/// Sampling temperature for candidate answers
pub const ANSWER_TEMPERATURE: f32 = 0.8;

pub struct AnswerAgent {
    agent: AgentFullText,
}

impl AnswerAgent {
    /// `index` tells concurrent answer agents apart in the cache
    pub fn new(context: AgentContext, question: &str, index: usize) -> Self {
        let mut context = context;
        context.options = context.options.with_temperature(ANSWER_TEMPERATURE);

        let template = PromptTemplate::new(TEMPLATE).with_variable("question", question);
        Self {
            agent: AgentFullText::new(format!("answer-agent-{}", index), context, template),
        }
    }

    pub async fn run(&mut self) -> Result<String> {
        self.agent.run().await
    }
}
