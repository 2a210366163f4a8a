//! Grading of one answer against one criterion

use tracing::info;

use crate::action::{AnswerSpec, Instruction};
use crate::client::AgentContext;
use crate::one_shot::AgentOneShot;
use crate::template::PromptTemplate;
use crate::{AgentError, Result};

use super::branch::Criterion;
use super::EXPERT_PREAMBLE;

pub const ANALYSIS_INSTRUCTION: &str = "analysis";

const TEMPLATE: &str = "{preamble}

A question was asked to you:
# BEGIN QUESTION
{question}
# END QUESTION


You need to evaluate the pertinence of an answer based on the following criteria:
# BEGIN CRITERIA
{criteria}
# END CRITERIA

This criteria is used to evaluate the answer.

The answer is:
# BEGIN ANSWER
{answer}
# END ANSWER

Write an extensive analysis on the answer to the question based on the criteria.
Also give a note on 10 to the answer based on the criteria.

Answer with the following actions:
{instructions}
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub criterion: String,
    pub answer_index: usize,
    pub answer: String,
    pub analysis: String,
    pub note: u32,
}

pub struct SolveAgent {
    agent: AgentOneShot,
    criterion: String,
    answer_index: usize,
    answer: String,
}

impl SolveAgent {
    pub fn new(
        context: AgentContext,
        question: &str,
        criterion_index: usize,
        criterion: &Criterion,
        answer_index: usize,
        answer: &str,
    ) -> Result<Self> {
        let criteria_text = if criterion.definition.is_empty() {
            criterion.name.clone()
        } else {
            format!("{}: {}", criterion.name, criterion.definition)
        };

        let template = PromptTemplate::new(TEMPLATE)
            .with_variable("preamble", EXPERT_PREAMBLE)
            .with_variable("question", question)
            .with_variable("criteria", criteria_text)
            .with_variable("answer", answer);

        let instruction = AnswerSpec::new(
            ANALYSIS_INSTRUCTION,
            "analysis of the answer to the question based on the criteria",
        )
        .parameter("analysis", "content of the analysis")
        .parameter("note", "note on 10 of the answer based on the criteria");

        Ok(Self {
            agent: AgentOneShot::new(
                format!("solve-agent-{}-{}", criterion_index, answer_index),
                context,
                template,
                vec![Instruction::from(instruction)],
            )?,
            criterion: criterion.name.clone(),
            answer_index,
            answer: answer.to_string(),
        })
    }

    pub async fn run(&mut self) -> Result<Analysis> {
        let invocations = self.agent.run().await?;
        let analysis = invocations
            .iter()
            .find(|i| i.name == ANALYSIS_INSTRUCTION)
            .ok_or_else(|| AgentError::MissingAnswer(ANALYSIS_INSTRUCTION.to_string()))?;

        let raw_note = analysis.parameter("note").unwrap_or_default();
        let note = parse_note(raw_note).ok_or_else(|| {
            AgentError::InvalidAnswer(format!("note \"{}\" is not a number", raw_note))
        })?;

        info!(
            "solve: answer {} graded {} on criteria {}",
            self.answer_index, note, self.criterion
        );

        Ok(Analysis {
            criterion: self.criterion.clone(),
            answer_index: self.answer_index,
            answer: self.answer.clone(),
            analysis: analysis.parameter("analysis").unwrap_or_default().to_string(),
            note,
        })
    }
}

/// Leading integer of a note such as `7`, `7/10` or ` 8 out of 10`
pub fn parse_note(raw: &str) -> Option<u32> {
    let digits: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_note() {
        assert_eq!(parse_note("7"), Some(7));
        assert_eq!(parse_note(" 8/10"), Some(8));
        assert_eq!(parse_note("10 out of 10"), Some(10));
        assert_eq!(parse_note("seven"), None);
        assert_eq!(parse_note(""), None);
    }
}
