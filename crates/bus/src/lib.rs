//! Prompt/answer telemetry
//!
//! Agents publish an event before and after every live completion call.
//! Delivery goes through an explicit channel handed to the agent at
//! construction; a disabled bus drops everything.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// A prompt about to be sent to the completion service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptEvent {
    /// Call id shared with the matching [`AnswerEvent`]
    pub id: String,
    pub agent: String,
    pub model: String,
    /// Cache key of the prompt
    pub key: String,
    pub prompt: String,
    pub timestamp: DateTime<Local>,
}

impl PromptEvent {
    pub fn new(
        agent: impl Into<String>,
        model: impl Into<String>,
        key: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            id: new_call_id(),
            agent: agent.into(),
            model: model.into(),
            key: key.into(),
            prompt: prompt.into(),
            timestamp: Local::now(),
        }
    }
}

/// An answer received from the completion service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerEvent {
    pub id: String,
    pub agent: String,
    pub model: String,
    /// Cache key of the answer
    pub key: String,
    pub answer: String,
    pub timestamp: DateTime<Local>,
}

impl AnswerEvent {
    /// Answer to the call announced by `prompt`
    pub fn reply(prompt: &PromptEvent, key: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            id: prompt.id.clone(),
            agent: prompt.agent.clone(),
            model: prompt.model.clone(),
            key: key.into(),
            answer: answer.into(),
            timestamp: Local::now(),
        }
    }
}

fn new_call_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    Prompt(PromptEvent),
    Answer(AnswerEvent),
}

impl AgentEvent {
    pub fn agent(&self) -> &str {
        match self {
            AgentEvent::Prompt(e) => &e.agent,
            AgentEvent::Answer(e) => &e.agent,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            AgentEvent::Prompt(e) => &e.id,
            AgentEvent::Answer(e) => &e.id,
        }
    }
}

pub type EventSender = mpsc::UnboundedSender<AgentEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<AgentEvent>;

/// Publishing side of the telemetry channel
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    sender: Option<EventSender>,
}

impl EventBus {
    pub fn new(sender: EventSender) -> Self {
        Self {
            sender: Some(sender),
        }
    }

    /// A bus together with the receiver its events arrive on
    pub fn channel() -> (Self, EventReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// A bus that drops every event
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    /// Publish an event; a closed receiver is not an error for the agent
    pub fn publish(&self, event: AgentEvent) {
        let Some(sender) = &self.sender else {
            return;
        };

        trace!("event {} from {}", event.id(), event.agent());
        if sender.send(event).is_err() {
            trace!("event receiver closed, event dropped");
        }
    }

    pub fn prompt(&self, event: PromptEvent) {
        self.publish(AgentEvent::Prompt(event));
    }

    pub fn answer(&self, event: AnswerEvent) {
        self.publish(AgentEvent::Answer(event));
    }
}

type PromptHandler = Box<dyn Fn(&PromptEvent) + Send + Sync>;
type AnswerHandler = Box<dyn Fn(&AnswerEvent) + Send + Sync>;

/// Routes events from a receiver to registered callbacks
pub struct EventDispatcher {
    receiver: EventReceiver,
    prompt_handlers: Vec<PromptHandler>,
    answer_handlers: Vec<AnswerHandler>,
}

impl EventDispatcher {
    pub fn new(receiver: EventReceiver) -> Self {
        Self {
            receiver,
            prompt_handlers: Vec::new(),
            answer_handlers: Vec::new(),
        }
    }

    pub fn on_prompt<F>(&mut self, handler: F)
    where
        F: Fn(&PromptEvent) + Send + Sync + 'static,
    {
        self.prompt_handlers.push(Box::new(handler));
    }

    pub fn on_answer<F>(&mut self, handler: F)
    where
        F: Fn(&AnswerEvent) + Send + Sync + 'static,
    {
        self.answer_handlers.push(Box::new(handler));
    }

    fn dispatch(&self, event: &AgentEvent) {
        match event {
            AgentEvent::Prompt(e) => self.prompt_handlers.iter().for_each(|h| h(e)),
            AgentEvent::Answer(e) => self.answer_handlers.iter().for_each(|h| h(e)),
        }
    }

    /// Dispatch until every [`EventBus`] clone has been dropped
    pub async fn run(mut self) -> usize {
        debug!("event dispatcher started");

        let mut dispatched = 0;
        while let Some(event) = self.receiver.recv().await {
            self.dispatch(&event);
            dispatched += 1;
        }

        debug!("event dispatcher stopped after {} events", dispatched);
        dispatched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_event_new() {
        let event = PromptEvent::new("writer", "gpt-4", "writer/0-abc-prompt.txt", "Hello");

        assert_eq!(event.agent, "writer");
        assert_eq!(event.model, "gpt-4");
        assert_eq!(event.key, "writer/0-abc-prompt.txt");
        assert_eq!(event.prompt, "Hello");
        assert!(uuid::Uuid::parse_str(&event.id).is_ok());
    }

    #[test]
    fn test_prompt_events_have_distinct_ids() {
        let a = PromptEvent::new("a", "m", "k", "p");
        let b = PromptEvent::new("a", "m", "k", "p");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_answer_reply_shares_id() {
        let prompt = PromptEvent::new("writer", "gpt-4", "pk", "Hello");
        let answer = AnswerEvent::reply(&prompt, "ak", "World");

        assert_eq!(answer.id, prompt.id);
        assert_eq!(answer.agent, "writer");
        assert_eq!(answer.model, "gpt-4");
        assert_eq!(answer.key, "ak");
        assert_eq!(answer.answer, "World");
    }

    #[test]
    fn test_agent_event_serialization_tag() {
        let event = AgentEvent::Prompt(PromptEvent::new("a", "m", "k", "p"));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "prompt");
        assert_eq!(json["agent"], "a");

        let back: AgentEvent = serde_json::from_value(json).unwrap();
        assert!(matches!(back, AgentEvent::Prompt(_)));
    }

    #[test]
    fn test_disabled_bus_drops_events() {
        let bus = EventBus::disabled();
        assert!(!bus.is_enabled());
        bus.prompt(PromptEvent::new("a", "m", "k", "p"));
    }

    #[tokio::test]
    async fn test_publish_after_receiver_dropped() {
        let (bus, rx) = EventBus::channel();
        drop(rx);
        bus.prompt(PromptEvent::new("a", "m", "k", "p"));
    }

    #[tokio::test]
    async fn test_channel_delivers_in_order() {
        let (bus, mut rx) = EventBus::channel();
        let prompt = PromptEvent::new("a", "m", "pk", "p");
        bus.prompt(prompt.clone());
        bus.answer(AnswerEvent::reply(&prompt, "ak", "answer"));

        assert!(matches!(rx.recv().await, Some(AgentEvent::Prompt(_))));
        match rx.recv().await {
            Some(AgentEvent::Answer(e)) => assert_eq!(e.answer, "answer"),
            other => panic!("Expected answer event, got {:?}", other),
        }
    }
}
