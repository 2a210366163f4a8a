//! Criteria proposal

use tracing::info;

use crate::action::{AnswerSpec, Instruction};
use crate::client::AgentContext;
use crate::one_shot::AgentOneShot;
use crate::template::PromptTemplate;
use crate::Result;

use super::EXPERT_PREAMBLE;

pub const CRITERIA_INSTRUCTION: &str = "criteria";

/// An evaluation criterion and its definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Criterion {
    pub name: String,
    pub definition: String,
}

const TEMPLATE: &str = "{preamble}

You will be given a question and you need to take an analytical approach to determine {criteria_count} criteria
in order to verify quality of potential answers.

{existing_criteria}

The question is the following:
# BEGIN QUESTION
{question}
# END QUESTION

Answer with the following actions:
{instructions}

{existing_criteria_emphasis}
";

pub struct BranchAgent {
    agent: AgentOneShot,
}

impl BranchAgent {
    /// With `existing` criteria the agent only defines those
    pub fn new(
        context: AgentContext,
        question: &str,
        criteria_count: usize,
        existing: &[String],
    ) -> Result<Self> {
        let (count, existing_text, emphasis) = if existing.is_empty() {
            (criteria_count, String::new(), String::new())
        } else {
            let names = existing.join(", ");
            (
                existing.len(),
                format!(
                    "Create a detailed description of those criteria regarding the question to evaluate: {}",
                    names
                ),
                format!(
                    "ONLY ANSWER DESCRIPTION FOR THE {} CRITERIA I GAVE TO YOU: {}",
                    existing.len(),
                    names
                ),
            )
        };

        let template = PromptTemplate::new(TEMPLATE)
            .with_variable("preamble", EXPERT_PREAMBLE)
            .with_variable("question", question)
            .with_variable("criteria_count", count.to_string())
            .with_variable("existing_criteria", existing_text)
            .with_variable("existing_criteria_emphasis", emphasis);

        let instruction = AnswerSpec::new(
            CRITERIA_INSTRUCTION,
            "describe one of the criteria to evaluate the answer. you can use this action multiple times to describe multiple criteria",
        )
        .parameter("criteria", "name of the criteria")
        .parameter("definition", "definition of the criteria");

        Ok(Self {
            agent: AgentOneShot::new(
                "branch-agent",
                context,
                template,
                vec![Instruction::from(instruction)],
            )?,
        })
    }

    pub async fn run(&mut self) -> Result<Vec<Criterion>> {
        let criteria: Vec<Criterion> = self
            .agent
            .run()
            .await?
            .into_iter()
            .filter(|i| i.name == CRITERIA_INSTRUCTION)
            .map(|i| Criterion {
                name: i.parameter("criteria").unwrap_or_default().to_string(),
                definition: i.parameter("definition").unwrap_or_default().to_string(),
            })
            .filter(|c| !c.name.is_empty())
            .collect();

        info!(
            "branch: answers will be analyzed with criteria: {}",
            criteria
                .iter()
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(criteria)
    }
}
