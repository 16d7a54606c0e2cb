use super::attachment::Attachment;
use super::message::{ExchangeTarget, Message};

/// A user turn handed to the gateway after it was echoed locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundTurn {
    pub target: ExchangeTarget,
    /// Conversation before the new message, oldest first.
    pub history: Vec<Message>,
    pub text: String,
    pub attachment: Option<Attachment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delivery {
    Generated,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeReply {
    pub text: String,
    pub delivery: Delivery,
}

impl ExchangeReply {
    /// Creates a reply produced by the model.
    pub fn generated(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            delivery: Delivery::Generated,
        }
    }

    /// Creates the canned reply used after a failure.
    pub fn fallback(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            delivery: Delivery::Fallback,
        }
    }
}

/// Emitted once per outbound turn when the gateway call has finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeOutcome {
    pub target: ExchangeTarget,
    pub reply: ExchangeReply,
}
