//! Branch-solve-merge pipeline

use futures::future::try_join_all;
use std::collections::BTreeMap;
use tracing::info;

use crate::client::AgentContext;
use crate::{AgentError, Result};

use super::answer::AnswerAgent;
use super::branch::{BranchAgent, Criterion};
use super::merge::MergeAgent;
use super::solve::{Analysis, SolveAgent};

/// One criterion's grade of an answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriterionAnalysis {
    pub criterion: String,
    pub analysis: String,
    pub note: u32,
}

/// Every analysis of one answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerAnalyses {
    pub answer_index: usize,
    pub answer: String,
    pub analyses: Vec<CriterionAnalysis>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BsmOutcome {
    pub criteria: Vec<Criterion>,
    pub answers: Vec<String>,
    pub analyses: Vec<AnswerAnalyses>,
    /// Sum of notes per answer index
    pub notes: BTreeMap<usize, u32>,
    pub best_answer_index: usize,
    pub best_answer: String,
    pub merged_answer: String,
}

pub struct BsmExecutor {
    context: AgentContext,
    question: String,
    answers: Option<Vec<String>>,
    answer_count: usize,
    criteria_count: usize,
    criteria: Vec<String>,
}

impl BsmExecutor {
    pub fn new(context: AgentContext, question: impl Into<String>) -> Self {
        Self {
            context,
            question: question.into(),
            answers: None,
            answer_count: 2,
            criteria_count: 3,
            criteria: Vec::new(),
        }
    }

    /// Grade these answers instead of generating candidates
    pub fn with_answers(mut self, answers: Vec<String>) -> Self {
        self.answers = Some(answers);
        self
    }

    pub fn with_answer_count(mut self, count: usize) -> Self {
        self.answer_count = count;
        self
    }

    pub fn with_criteria_count(mut self, count: usize) -> Self {
        self.criteria_count = count;
        self
    }

    /// Criteria names to define instead of letting the branch agent pick
    pub fn with_criteria(mut self, criteria: Vec<String>) -> Self {
        self.criteria = criteria;
        self
    }

    pub async fn execute(&self) -> Result<BsmOutcome> {
        info!("branch: generating {} criteria", self.criteria_count);
        let criteria = self.branch().await?;

        let answers = match &self.answers {
            Some(answers) => answers.clone(),
            None => self.generate_answers().await?,
        };

        let analyses = self.solve(&criteria, &answers).await?;
        let (notes, answer_analyses) = classic_merge(&analyses);

        info!("merge: merging {} analyses", answer_analyses.len());
        let merge = MergeAgent::new(self.context.clone(), &self.question, &answer_analyses)?
            .run()
            .await?;

        let best_answer = answers.get(merge.best_answer).cloned().ok_or_else(|| {
            AgentError::InvalidAnswer(format!(
                "best answer {} out of {} answers",
                merge.best_answer,
                answers.len()
            ))
        })?;

        Ok(BsmOutcome {
            criteria,
            answers,
            analyses: answer_analyses,
            notes,
            best_answer_index: merge.best_answer,
            best_answer,
            merged_answer: merge.merged_answer,
        })
    }

    /// Requested criteria first, in order, then any new ones the agent proposed
    async fn branch(&self) -> Result<Vec<Criterion>> {
        let mut criteria: Vec<Criterion> = self
            .criteria
            .iter()
            .map(|name| Criterion {
                name: name.clone(),
                definition: String::new(),
            })
            .collect();

        let proposed = BranchAgent::new(
            self.context.clone(),
            &self.question,
            self.criteria_count,
            &self.criteria,
        )?
        .run()
        .await?;

        for criterion in proposed {
            match criteria.iter_mut().find(|c| c.name == criterion.name) {
                Some(existing) => existing.definition = criterion.definition,
                None => criteria.push(criterion),
            }
        }

        Ok(criteria)
    }

    async fn generate_answers(&self) -> Result<Vec<String>> {
        info!("generating {} answers", self.answer_count);
        let runs = (0..self.answer_count).map(|i| {
            let mut agent = AnswerAgent::new(self.context.clone(), &self.question, i);
            async move { agent.run().await }
        });
        try_join_all(runs).await
    }

    async fn solve(&self, criteria: &[Criterion], answers: &[String]) -> Result<Vec<Analysis>> {
        let mut agents = Vec::new();
        for (criterion_index, criterion) in criteria.iter().enumerate() {
            for (answer_index, answer) in answers.iter().enumerate() {
                info!(
                    "solve: evaluating answer {} with criteria {}",
                    answer_index, criterion.name
                );
                agents.push(SolveAgent::new(
                    self.context.clone(),
                    &self.question,
                    criterion_index,
                    criterion,
                    answer_index,
                    answer,
                )?);
            }
        }

        try_join_all(agents.iter_mut().map(|agent| agent.run())).await
    }
}

/// Sum notes per answer and group analyses by answer, in first-seen order
pub fn classic_merge(analyses: &[Analysis]) -> (BTreeMap<usize, u32>, Vec<AnswerAnalyses>) {
    let mut notes = BTreeMap::new();
    let mut grouped: Vec<AnswerAnalyses> = Vec::new();

    for analysis in analyses {
        *notes.entry(analysis.answer_index).or_insert(0) += analysis.note;

        let entry = CriterionAnalysis {
            criterion: analysis.criterion.clone(),
            analysis: analysis.analysis.clone(),
            note: analysis.note,
        };
        match grouped
            .iter_mut()
            .find(|a| a.answer_index == analysis.answer_index)
        {
            Some(existing) => existing.analyses.push(entry),
            None => grouped.push(AnswerAnalyses {
                answer_index: analysis.answer_index,
                answer: analysis.answer.clone(),
                analyses: vec![entry],
            }),
        }
    }

    (notes, grouped)
}
