//! Merge of the graded answers

use crate::action::{AnswerSpec, Instruction};
use crate::client::AgentContext;
use crate::one_shot::AgentOneShot;
use crate::template::PromptTemplate;
use crate::{AgentError, Result};

use super::executor::AnswerAnalyses;
use super::solve::parse_note;
use super::EXPERT_PREAMBLE;

pub const BEST_ANSWER_INSTRUCTION: &str = "bestAnswer";
pub const MERGED_ANSWER_INSTRUCTION: &str = "mergedAnswer";

const TEMPLATE: &str = "{preamble}

A question was asked to you:
# BEGIN QUESTION
{question}
# END QUESTION

Other experts have examinated the pertinence of answers regarding a particular question.
You need to merge their analysis into a single analysis.

# BEGIN ANALYSIS
{analyses}
# END ANALYSIS

Answer with the following actions:
{instructions}
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeResult {
    pub best_answer: usize,
    pub merged_answer: String,
}

pub struct MergeAgent {
    agent: AgentOneShot,
}

impl MergeAgent {
    pub fn new(context: AgentContext, question: &str, analyses: &[AnswerAnalyses]) -> Result<Self> {
        let template = PromptTemplate::new(TEMPLATE)
            .with_variable("preamble", EXPERT_PREAMBLE)
            .with_variable("question", question)
            .with_variable("analyses", describe_analyses(analyses));

        let instructions = vec![
            Instruction::from(
                AnswerSpec::new(BEST_ANSWER_INSTRUCTION, "best answer number based on the analysis")
                    .parameter("index", "number of the answer")
                    .multiline(),
            ),
            Instruction::from(
                AnswerSpec::new(
                    MERGED_ANSWER_INSTRUCTION,
                    "use the analyses and the answer content to create a new answer to the question",
                )
                .parameter("answer", "content of the answer"),
            ),
        ];

        Ok(Self {
            agent: AgentOneShot::new("merge-agent", context, template, instructions)?,
        })
    }

    pub async fn run(&mut self) -> Result<MergeResult> {
        let invocations = self.agent.run().await?;

        let best = invocations
            .iter()
            .find(|i| i.name == BEST_ANSWER_INSTRUCTION)
            .ok_or_else(|| AgentError::MissingAnswer(BEST_ANSWER_INSTRUCTION.to_string()))?;
        let merged = invocations
            .iter()
            .find(|i| i.name == MERGED_ANSWER_INSTRUCTION)
            .ok_or_else(|| AgentError::MissingAnswer(MERGED_ANSWER_INSTRUCTION.to_string()))?;

        let raw_index = best.parameter("index").unwrap_or_default();
        let best_answer = parse_note(raw_index).map(|n| n as usize).ok_or_else(|| {
            AgentError::InvalidAnswer(format!("answer index \"{}\" is not a number", raw_index))
        })?;

        Ok(MergeResult {
            best_answer,
            merged_answer: merged.parameter("answer").unwrap_or_default().to_string(),
        })
    }
}

/// Markdown summary of every answer and its analyses
pub fn describe_analyses(analyses: &[AnswerAnalyses]) -> String {
    let mut description = String::new();

    for answer in analyses {
        description.push_str(&format!("## Answer {}\n", answer.answer_index));
        description.push_str(&format!("{}\n\n", answer.answer));

        for analysis in &answer.analyses {
            description.push_str(&format!("### Criteria {}\n", analysis.criterion));
            description.push_str(&format!("#### Analysis (note: {})\n", analysis.note));
            description.push_str(&format!("{}\n\n", analysis.analysis));
        }
    }

    description
}
