//! Instruction registry

use std::collections::HashMap;
use tracing::debug;

use crate::action::{ActionFeedback, Instruction};
use crate::parser::ParsedInvocation;
use crate::{AgentError, Result};

/// Instructions of one agent, in registration order
///
/// Built once when the agent is constructed and only read afterwards.
#[derive(Debug, Default)]
pub struct InstructionRegistry {
    instructions: Vec<Instruction>,
    index: HashMap<String, usize>,
}

impl InstructionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list, rejecting duplicate names
    pub fn from_instructions(instructions: Vec<Instruction>) -> Result<Self> {
        let mut registry = Self::new();
        for instruction in instructions {
            registry.register(instruction)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, instruction: Instruction) -> Result<()> {
        let name = instruction.name().to_string();
        if self.index.contains_key(&name) {
            return Err(AgentError::DuplicateInstruction(name));
        }
        self.index.insert(name, self.instructions.len());
        self.instructions.push(instruction);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Instruction> {
        self.index.get(name).map(|&i| &self.instructions[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.instructions.iter().map(|i| i.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions.iter()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Descriptions of every instruction, for the prompt
    pub fn describe(&self) -> String {
        self.instructions
            .iter()
            .map(|i| i.describe())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Execute an invocation and cap its feedback at `feedback_size_limit` characters
    ///
    /// A name that is unknown or not executable yields `error` feedback.
    pub async fn execute(
        &self,
        invocation: &ParsedInvocation,
        feedback_size_limit: usize,
    ) -> ActionFeedback {
        let Some(action) = self.get(&invocation.name).and_then(|i| i.as_action()) else {
            return ActionFeedback::error(format!("Action \"{}\" not found", invocation.name));
        };

        debug!("executing {} {:?}", invocation.name, invocation.parameters);
        action
            .execute(&invocation.parameters)
            .await
            .truncate(feedback_size_limit)
    }

    /// History line for an executed invocation
    pub fn describe_feedback(
        &self,
        invocation: &ParsedInvocation,
        feedback: &ActionFeedback,
    ) -> String {
        match self.get(&invocation.name) {
            Some(instruction) => instruction.describe_feedback(&invocation.parameters, feedback),
            None => format!(
                "<Action name=\"{}\" feedback:type=\"{}\" feedback:message=\"{}\" />",
                invocation.name, feedback.feedback_type, feedback.message
            ),
        }
    }
}

/// `<Step number="N">` blocks, numbered from 1
pub fn render_steps(steps: &[Vec<String>]) -> Vec<String> {
    steps
        .iter()
        .enumerate()
        .map(|(i, lines)| {
            format!(
                "<Step number=\"{}\">\n  {}\n</Step>",
                i + 1,
                lines.join("\n  ")
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{AnswerSpec, FnAction};

    fn echo_action(name: &str) -> Instruction {
        Instruction::action(FnAction::new(
            AnswerSpec::new(name, "echo").parameter("value", "the value"),
            |params| ActionFeedback::success(params.get("value").cloned().unwrap_or_default()),
        ))
    }

    fn invocation(name: &str, pairs: &[(&str, &str)]) -> ParsedInvocation {
        ParsedInvocation {
            name: name.to_string(),
            parameters: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_registration_order_preserved() {
        let registry = InstructionRegistry::from_instructions(vec![
            echo_action("zeta"),
            AnswerSpec::new("alpha", "u").into(),
            echo_action("mid"),
        ])
        .unwrap();

        assert_eq!(registry.names(), vec!["zeta", "alpha", "mid"]);
        assert_eq!(registry.len(), 3);
        assert!(registry.contains("alpha"));
        assert!(!registry.contains("missing"));
    }

    #[test]
    fn test_duplicate_rejected() {
        let result =
            InstructionRegistry::from_instructions(vec![echo_action("echo"), echo_action("echo")]);
        assert!(matches!(result, Err(AgentError::DuplicateInstruction(name)) if name == "echo"));
    }

    #[test]
    fn test_describe_joins_with_newline() {
        let registry = InstructionRegistry::from_instructions(vec![
            AnswerSpec::new("a", "first").into(),
            AnswerSpec::new("b", "second").into(),
        ])
        .unwrap();

        assert_eq!(
            registry.describe(),
            "Use this action to: first\n<Action name=\"a\" />\nUse this action to: second\n<Action name=\"b\" />"
        );
    }

    #[tokio::test]
    async fn test_execute_truncates() {
        let registry = InstructionRegistry::from_instructions(vec![echo_action("echo")]).unwrap();
        let feedback = registry
            .execute(&invocation("echo", &[("value", "0123456789")]), 5)
            .await;
        assert!(feedback.message.starts_with("01234["));
    }

    #[tokio::test]
    async fn test_execute_unknown_is_error_feedback() {
        let registry = InstructionRegistry::new();
        let feedback = registry.execute(&invocation("ghost", &[]), 100).await;
        assert!(feedback.is_error());
        assert_eq!(feedback.message, "Action \"ghost\" not found");
    }

    #[tokio::test]
    async fn test_execute_answer_is_error_feedback() {
        let registry =
            InstructionRegistry::from_instructions(vec![AnswerSpec::new("note", "u").into()]).unwrap();
        let feedback = registry.execute(&invocation("note", &[]), 100).await;
        assert!(feedback.is_error());
    }

    #[test]
    fn test_render_steps() {
        let steps = vec![
            vec!["line a".to_string(), "line b".to_string()],
            vec!["line c".to_string()],
        ];
        assert_eq!(
            render_steps(&steps),
            vec![
                "<Step number=\"1\">\n  line a\n  line b\n</Step>".to_string(),
                "<Step number=\"2\">\n  line c\n</Step>".to_string(),
            ]
        );
    }
}
