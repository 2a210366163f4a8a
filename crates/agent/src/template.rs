//! Prompt templates
//!
//! `{name}` placeholders are replaced from a variable map; `{{` and `}}`
//! produce literal braces.

use std::collections::HashMap;
use thiserror::Error;

/// Variable filled with the registry descriptions
pub const INSTRUCTIONS_VARIABLE: &str = "instructions";

/// Variable filled with the rendered step history
pub const FEEDBACK_STEPS_VARIABLE: &str = "feedback_steps";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("missing template variable: {0}")]
    MissingVariable(String),

    #[error("unclosed placeholder at byte {0}")]
    UnclosedPlaceholder(usize),

    #[error("unmatched '}}' at byte {0}")]
    UnmatchedBrace(usize),
}

/// Builds the prompt of one agent call
pub trait PromptFormatter: Send + Sync {
    fn format_prompt(
        &self,
        instructions: &str,
        feedback_steps: &[String],
    ) -> Result<String, TemplateError>;
}

impl<F> PromptFormatter for F
where
    F: Fn(&str, &[String]) -> Result<String, TemplateError> + Send + Sync,
{
    fn format_prompt(
        &self,
        instructions: &str,
        feedback_steps: &[String],
    ) -> Result<String, TemplateError> {
        self(instructions, feedback_steps)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
    variables: HashMap<String, String>,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            variables: HashMap::new(),
        }
    }

    /// Bind a variable that stays the same for every call
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Render with the bound variables, overridden by `extra`
    pub fn format(&self, extra: &HashMap<String, String>) -> Result<String, TemplateError> {
        let mut output = String::with_capacity(self.template.len());
        let mut chars = self.template.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            match c {
                '{' if matches!(chars.peek(), Some((_, '{'))) => {
                    chars.next();
                    output.push('{');
                }
                '}' if matches!(chars.peek(), Some((_, '}'))) => {
                    chars.next();
                    output.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        name.push(c);
                    }
                    if !closed {
                        return Err(TemplateError::UnclosedPlaceholder(pos));
                    }

                    let name = name.trim();
                    let value = extra
                        .get(name)
                        .or_else(|| self.variables.get(name))
                        .ok_or_else(|| TemplateError::MissingVariable(name.to_string()))?;
                    output.push_str(value);
                }
                '}' => return Err(TemplateError::UnmatchedBrace(pos)),
                c => output.push(c),
            }
        }

        Ok(output)
    }
}

impl PromptFormatter for PromptTemplate {
    fn format_prompt(
        &self,
        instructions: &str,
        feedback_steps: &[String],
    ) -> Result<String, TemplateError> {
        let mut variables = HashMap::new();
        variables.insert(INSTRUCTIONS_VARIABLE.to_string(), instructions.to_string());
        variables.insert(
            FEEDBACK_STEPS_VARIABLE.to_string(),
            feedback_steps.join("\n"),
        );
        self.format(&variables)
    }
}
