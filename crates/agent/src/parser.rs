//! Action-protocol parser
//!
//! Line oriented. Each line is trimmed before inspection and lines outside
//! an `<Action>` block are ignored, so commentary around the tags is
//! harmless. Recognized forms:
//!
//! ```text
//! <Action name="listFiles" parameter:directory="/a" />
//!
//! <Action name="writeFile">
//!   <Parameter name="path">notes.txt</Parameter>
//!   <Parameter name="content">
//!     first line
//!     second line
//!   </Parameter>
//! </Action>
//! ```
//!
//! A block still open at the end of the answer is dropped.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

use crate::action::Parameters;
use crate::registry::InstructionRegistry;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?:^|\s)name="([^"]*)""#).unwrap());

static INLINE_PARAMETER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"parameter:([^=\s"]+)="([^"]*)""#).unwrap());

static PARAMETER_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^<Parameter\s+name="([^"]*)"\s*>(.*?)</Parameter>$"#).unwrap());

static PARAMETER_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^<Parameter\s+name="([^"]*)"\s*>(.*)$"#).unwrap());

const PARAMETER_CLOSE: &str = "</Parameter>";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("incorrect answer format, cannot parse answers")]
    NoInstructions,

    #[error("hallucinated instruction \"{name}\"")]
    HallucinatedInstruction { name: String },
}

/// One operation call recovered from an answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInvocation {
    pub name: String,
    pub parameters: Parameters,
}

impl ParsedInvocation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Parameters::new(),
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }
}

struct OpenBlock {
    invocation: ParsedInvocation,
    parameter: Option<(String, Vec<String>)>,
}

impl OpenBlock {
    fn close_parameter(&mut self, last_line: Option<&str>) {
        if let Some((name, mut lines)) = self.parameter.take() {
            if let Some(line) = last_line {
                lines.push(line.to_string());
            }
            let value = lines.join("\n").trim().to_string();
            self.invocation.parameters.insert(name, value);
        }
    }
}

/// Parse an answer and check every name against the registry
pub fn parse(
    answer: &str,
    registry: &InstructionRegistry,
) -> Result<Vec<ParsedInvocation>, ParseError> {
    let invocations = extract_invocations(answer);

    if invocations.is_empty() {
        return Err(ParseError::NoInstructions);
    }

    if let Some(unknown) = invocations.iter().find(|i| !registry.contains(&i.name)) {
        return Err(ParseError::HallucinatedInstruction {
            name: unknown.name.clone(),
        });
    }

    Ok(invocations)
}

/// Every complete invocation in `answer`, in order of appearance
///
/// Invocations with an empty name are dropped.
pub fn extract_invocations(answer: &str) -> Vec<ParsedInvocation> {
    let mut invocations = Vec::new();
    let mut current: Option<OpenBlock> = None;

    for line in answer.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with("<Action") {
            let invocation = parse_action_line(trimmed);

            if trimmed.ends_with("/>") {
                current = None;
                if !invocation.name.is_empty() {
                    invocations.push(invocation);
                }
            } else {
                current = Some(OpenBlock {
                    invocation,
                    parameter: None,
                });
            }
        } else if trimmed.starts_with("</Action>") {
            if let Some(block) = current.take() {
                if !block.invocation.name.is_empty() {
                    invocations.push(block.invocation);
                }
            }
        } else if let Some(block) = current.as_mut() {
            if block.parameter.is_some() {
                if trimmed.starts_with(PARAMETER_CLOSE) {
                    block.close_parameter(None);
                } else if let Some(content) = line.trim_end().strip_suffix(PARAMETER_CLOSE) {
                    block.close_parameter(Some(content));
                } else if let Some((_, lines)) = block.parameter.as_mut() {
                    lines.push(line.to_string());
                }
            } else if let Some(caps) = PARAMETER_LINE_RE.captures(trimmed) {
                block
                    .invocation
                    .parameters
                    .insert(caps[1].to_string(), caps[2].trim().to_string());
            } else if let Some(caps) = PARAMETER_OPEN_RE.captures(trimmed) {
                let rest = caps[2].trim();
                let lines = if rest.is_empty() {
                    Vec::new()
                } else {
                    vec![rest.to_string()]
                };
                block.parameter = Some((caps[1].to_string(), lines));
            }
        }
    }

    invocations
}

fn parse_action_line(line: &str) -> ParsedInvocation {
    let name = NAME_RE
        .captures(line)
        .map(|caps| caps[1].to_string())
        .unwrap_or_default();

    let mut invocation = ParsedInvocation::new(name);
    for caps in INLINE_PARAMETER_RE.captures_iter(line) {
        invocation
            .parameters
            .insert(caps[1].to_string(), caps[2].to_string());
    }
    invocation
}
