//! Branch-solve-merge
//!
//! A branch agent proposes evaluation criteria, solve agents grade every
//! candidate answer against every criterion concurrently, notes are summed
//! per answer and a merge agent picks the best answer and writes a merged
//! one.

pub mod answer;
pub mod branch;
pub mod executor;
pub mod merge;
pub mod solve;

pub use answer::AnswerAgent;
pub use branch::{BranchAgent, Criterion};
pub use executor::{AnswerAnalyses, BsmExecutor, BsmOutcome, CriterionAnalysis};
pub use merge::{MergeAgent, MergeResult};
pub use solve::{Analysis, SolveAgent};

const EXPERT_PREAMBLE: &str = "You are an expert in question and answer analysis.\n\
You have a lot of experience in every field.";
