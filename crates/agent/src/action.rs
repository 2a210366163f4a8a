//! Operations and their textual rendering
//!
//! Every instruction renders in the form it was declared with, for its
//! description in the prompt, for a single invocation and for the feedback
//! echoed into the step history.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;

/// Parameter values of one invocation, keyed by parameter name
pub type Parameters = HashMap<String, String>;

/// Appended to a feedback message cut at the size limit
pub const TRUNCATION_MARKER: &str =
    "[action feedback was truncated because it exceeded the size limit]";

/// Rendering form of an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Singleline,
    Multiline,
}

/// Declared parameter: name plus a usage hint shown to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionParameter {
    pub name: String,
    pub usage: String,
}

impl ActionParameter {
    pub fn new(name: impl Into<String>, usage: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            usage: usage.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackType {
    Success,
    Error,
}

impl fmt::Display for FeedbackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedbackType::Success => write!(f, "success"),
            FeedbackType::Error => write!(f, "error"),
        }
    }
}

/// Outcome of executing an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionFeedback {
    pub message: String,
    pub feedback_type: FeedbackType,
    pub metadata: HashMap<String, String>,
}

impl ActionFeedback {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            feedback_type: FeedbackType::Success,
            metadata: HashMap::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            feedback_type: FeedbackType::Error,
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.feedback_type == FeedbackType::Error
    }

    /// Keep at most `limit` characters, then append [`TRUNCATION_MARKER`]
    pub fn truncate(mut self, limit: usize) -> Self {
        if self.message.chars().count() > limit {
            let mut message: String = self.message.chars().take(limit).collect();
            message.push_str(TRUNCATION_MARKER);
            self.message = message;
        }
        self
    }
}

/// An executable operation
///
/// Failures are reported through an `error`-typed [`ActionFeedback`], never
/// by panicking.
#[async_trait]
pub trait Action: Send + Sync {
    fn name(&self) -> &str;
    fn usage(&self) -> &str;
    fn parameters(&self) -> &[ActionParameter];

    fn format(&self) -> Format {
        Format::Singleline
    }

    async fn execute(&self, parameters: &Parameters) -> ActionFeedback;
}

/// A structured answer the model may give; never executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSpec {
    pub name: String,
    pub usage: String,
    pub parameters: Vec<ActionParameter>,
    pub format: Format,
}

impl AnswerSpec {
    pub fn new(name: impl Into<String>, usage: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            usage: usage.into(),
            parameters: Vec::new(),
            format: Format::Singleline,
        }
    }

    pub fn parameter(mut self, name: impl Into<String>, usage: impl Into<String>) -> Self {
        self.parameters.push(ActionParameter::new(name, usage));
        self
    }

    pub fn multiline(mut self) -> Self {
        self.format = Format::Multiline;
        self
    }
}

type Handler = Box<dyn Fn(&Parameters) -> ActionFeedback + Send + Sync>;

/// Action backed by a closure
pub struct FnAction {
    spec: AnswerSpec,
    handler: Handler,
}

impl FnAction {
    pub fn new<F>(spec: AnswerSpec, handler: F) -> Self
    where
        F: Fn(&Parameters) -> ActionFeedback + Send + Sync + 'static,
    {
        Self {
            spec,
            handler: Box::new(handler),
        }
    }
}

#[async_trait]
impl Action for FnAction {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn usage(&self) -> &str {
        &self.spec.usage
    }

    fn parameters(&self) -> &[ActionParameter] {
        &self.spec.parameters
    }

    fn format(&self) -> Format {
        self.spec.format
    }

    async fn execute(&self, parameters: &Parameters) -> ActionFeedback {
        (self.handler)(parameters)
    }
}

/// Anything an agent can ask the model for
pub enum Instruction {
    Answer(AnswerSpec),
    Action(Box<dyn Action>),
}

impl Instruction {
    pub fn action(action: impl Action + 'static) -> Self {
        Instruction::Action(Box::new(action))
    }

    pub fn name(&self) -> &str {
        match self {
            Instruction::Answer(spec) => &spec.name,
            Instruction::Action(action) => action.name(),
        }
    }

    pub fn usage(&self) -> &str {
        match self {
            Instruction::Answer(spec) => &spec.usage,
            Instruction::Action(action) => action.usage(),
        }
    }

    pub fn parameters(&self) -> &[ActionParameter] {
        match self {
            Instruction::Answer(spec) => &spec.parameters,
            Instruction::Action(action) => action.parameters(),
        }
    }

    pub fn format(&self) -> Format {
        match self {
            Instruction::Answer(spec) => spec.format,
            Instruction::Action(action) => action.format(),
        }
    }

    pub fn is_action(&self) -> bool {
        matches!(self, Instruction::Action(_))
    }

    pub fn as_action(&self) -> Option<&dyn Action> {
        match self {
            Instruction::Action(action) => Some(action.as_ref()),
            Instruction::Answer(_) => None,
        }
    }

    /// Description shown to the model in the prompt
    pub fn describe(&self) -> String {
        let mut result = format!(
            "Use this action to: {}\n<Action name=\"{}\"",
            self.usage(),
            self.name()
        );

        match self.format() {
            Format::Singleline => {
                for param in self.parameters() {
                    result.push_str(&format!(" parameter:{}=\"{}\"", param.name, param.usage));
                }
                result.push_str(" />");
            }
            Format::Multiline => {
                result.push('>');
                for param in self.parameters() {
                    result.push_str(&format!(
                        "\n  <Parameter name=\"{}\">\n    // {}\n  </Parameter>",
                        param.name, param.usage
                    ));
                }
                result.push_str("\n</Action>");
            }
        }

        result
    }

    /// One invocation in wire form, as the model is expected to write it
    ///
    /// Singleline values must not contain line breaks: the tag would be split
    /// across lines and read back as an unterminated block.
    pub fn render_invocation(&self, values: &Parameters) -> String {
        match self.format() {
            Format::Singleline => {
                let mut result = format!("<Action name=\"{}\"", self.name());
                for param in self.parameters() {
                    result.push_str(&format!(
                        " parameter:{}=\"{}\"",
                        param.name,
                        value_of(values, &param.name)
                    ));
                }
                result.push_str(" />");
                result
            }
            Format::Multiline => {
                let mut result = format!("<Action name=\"{}\">", self.name());
                for param in self.parameters() {
                    result.push_str(&format!(
                        "\n  <Parameter name=\"{}\">\n    {}\n  </Parameter>",
                        param.name,
                        value_of(values, &param.name)
                    ));
                }
                result.push_str("\n</Action>");
                result
            }
        }
    }

    /// Invocation echoed with its feedback, for the step history
    pub fn describe_feedback(&self, values: &Parameters, feedback: &ActionFeedback) -> String {
        match self.format() {
            Format::Singleline => {
                let mut result = format!("<Action name=\"{}\" ", self.name());
                for param in self.parameters() {
                    result.push_str(&format!(
                        "parameter:{}=\"{}\" ",
                        param.name,
                        value_of(values, &param.name)
                    ));
                }
                result.push_str(&format!(
                    "feedback:type=\"{}\" feedback:message=\"{}\" />",
                    feedback.feedback_type, feedback.message
                ));
                result
            }
            Format::Multiline => {
                let mut result = format!("  <Action name=\"{}\">", self.name());
                for param in self.parameters() {
                    result.push_str(&format!(
                        "\n    <Parameter name=\"{}\">\n      {}\n    </Parameter>",
                        param.name,
                        value_of(values, &param.name)
                    ));
                }
                result.push_str(&format!(
                    "\n    <Feedback type=\"{}\">\n      {}\n    </Feedback>\n  </Action>",
                    feedback.feedback_type, feedback.message
                ));
                result
            }
        }
    }
}

impl From<AnswerSpec> for Instruction {
    fn from(spec: AnswerSpec) -> Self {
        Instruction::Answer(spec)
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_action() { "Action" } else { "Answer" };
        f.debug_struct(kind)
            .field("name", &self.name())
            .field("format", &self.format())
            .finish()
    }
}

fn value_of<'a>(values: &'a Parameters, name: &str) -> &'a str {
    values.get(name).map(String::as_str).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Parameters {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_describe_singleline() {
        let instruction: Instruction = AnswerSpec::new("listFiles", "list all files in a directory")
            .parameter("directory", "path of the directory to list")
            .into();

        assert_eq!(
            instruction.describe(),
            "Use this action to: list all files in a directory\n\
             <Action name=\"listFiles\" parameter:directory=\"path of the directory to list\" />"
        );
    }

    #[test]
    fn test_describe_multiline() {
        let instruction: Instruction = AnswerSpec::new("bestAnswer", "best answer number")
            .parameter("index", "number of the answer")
            .multiline()
            .into();

        assert_eq!(
            instruction.describe(),
            "Use this action to: best answer number\n\
             <Action name=\"bestAnswer\">\n  \
             <Parameter name=\"index\">\n    // number of the answer\n  </Parameter>\n\
             </Action>"
        );
    }

    #[test]
    fn test_describe_without_parameters() {
        let instruction: Instruction = AnswerSpec::new("done", "indicate that your task is done").into();
        assert_eq!(
            instruction.describe(),
            "Use this action to: indicate that your task is done\n<Action name=\"done\" />"
        );
    }

    #[test]
    fn test_describe_feedback_singleline() {
        let instruction: Instruction = AnswerSpec::new("listFiles", "list")
            .parameter("directory", "dir")
            .into();
        let feedback = ActionFeedback::success("a.txt");

        assert_eq!(
            instruction.describe_feedback(&params(&[("directory", "/a")]), &feedback),
            "<Action name=\"listFiles\" parameter:directory=\"/a\" feedback:type=\"success\" feedback:message=\"a.txt\" />"
        );
    }

    #[test]
    fn test_describe_feedback_multiline() {
        let instruction: Instruction = AnswerSpec::new("writeFile", "write")
            .parameter("path", "p")
            .multiline()
            .into();
        let feedback = ActionFeedback::error("denied");

        assert_eq!(
            instruction.describe_feedback(&params(&[("path", "x.txt")]), &feedback),
            "  <Action name=\"writeFile\">\n    <Parameter name=\"path\">\n      x.txt\n    </Parameter>\n    <Feedback type=\"error\">\n      denied\n    </Feedback>\n  </Action>"
        );
    }

    #[test]
    fn test_feedback_missing_value_renders_empty() {
        let instruction: Instruction = AnswerSpec::new("a", "u").parameter("p", "x").into();
        let rendered =
            instruction.describe_feedback(&Parameters::new(), &ActionFeedback::success("ok"));
        assert!(rendered.contains("parameter:p=\"\""));
    }

    #[test]
    fn test_truncate_keeps_type() {
        let feedback = ActionFeedback::error("abcdefghij").truncate(4);
        assert_eq!(feedback.message, format!("abcd{}", TRUNCATION_MARKER));
        assert!(feedback.is_error());

        let untouched = ActionFeedback::success("abc").truncate(3);
        assert_eq!(untouched.message, "abc");
    }

    #[test]
    fn test_truncate_counts_characters() {
        let feedback = ActionFeedback::success("éééé").truncate(2);
        assert_eq!(feedback.message, format!("éé{}", TRUNCATION_MARKER));
    }

    #[test]
    fn test_feedback_metadata() {
        let feedback = ActionFeedback::success("ok").with_metadata("path", "/tmp/a");
        assert_eq!(feedback.metadata.get("path").map(String::as_str), Some("/tmp/a"));
    }

    #[tokio::test]
    async fn test_fn_action() {
        let action = FnAction::new(
            AnswerSpec::new("echo", "echo a value").parameter("value", "the value"),
            |params| ActionFeedback::success(params.get("value").cloned().unwrap_or_default()),
        );

        assert_eq!(action.name(), "echo");
        assert_eq!(action.format(), Format::Singleline);
        let feedback = action.execute(&params(&[("value", "hi")])).await;
        assert_eq!(feedback.message, "hi");
    }

    #[test]
    fn test_instruction_kind() {
        let answer: Instruction = AnswerSpec::new("a", "u").into();
        assert!(!answer.is_action());
        assert!(answer.as_action().is_none());

        let action = Instruction::action(FnAction::new(AnswerSpec::new("b", "u"), |_| {
            ActionFeedback::success("")
        }));
        assert!(action.is_action());
        assert_eq!(action.as_action().map(|a| a.name()), Some("b"));
    }
}
