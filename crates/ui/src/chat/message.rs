use chrono::{DateTime, Local};

use super::attachment::Attachment;

/// Identifier for one opened chat; changes every time a room is entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChatSessionId(pub u64);

impl ChatSessionId {
    /// Creates a typed chat session identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Identifier for one message, unique within its conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub u64);

impl MessageId {
    /// The seeded welcome message.
    pub const WELCOME: Self = Self(0);

    /// Creates a typed message identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Routing key for one exchange: the chat it belongs to and the self message that started it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExchangeTarget {
    pub chat_id: ChatSessionId,
    pub turn_id: MessageId,
}

impl ExchangeTarget {
    /// Creates a target for the given chat and turn.
    pub const fn new(chat_id: ChatSessionId, turn_id: MessageId) -> Self {
        Self { chat_id, turn_id }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sender {
    /// The logged-in user.
    Me,
    /// The assistant answering in the room.
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub body: String,
    pub sender: Sender,
    pub sender_name: String,
    pub sent_at: DateTime<Local>,
    pub attachment: Option<Attachment>,
}

impl Message {
    /// Creates a message stamped with the local time.
    pub fn new(
        id: MessageId,
        sender: Sender,
        sender_name: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id,
            body: body.into(),
            sender,
            sender_name: sender_name.into(),
            sent_at: Local::now(),
            attachment: None,
        }
    }

    /// Attaches the file sent with this message, if any.
    pub fn with_attachment(mut self, attachment: Option<Attachment>) -> Self {
        self.attachment = attachment;
        self
    }
}

/// Exchange lifecycle of one chat. At most one call is in flight at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExchangeState {
    #[default]
    Idle,
    Pending(ExchangeTarget),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeTransition {
    Start(ExchangeTarget),
    Resolve(ExchangeTarget),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeRejection {
    /// Neither text nor an attachment was supplied.
    EmptyTurn,
    AlreadyPending {
        active: ExchangeTarget,
    },
    NoPendingExchange,
    TargetMismatch {
        active: ExchangeTarget,
        attempted: ExchangeTarget,
    },
}

/// Result of one exchange transition.
pub type ExchangeTransitionResult = Result<ExchangeState, ExchangeRejection>;

impl ExchangeState {
    /// Returns the in-flight target, if any.
    pub fn pending_target(&self) -> Option<ExchangeTarget> {
        match self {
            Self::Pending(target) => Some(*target),
            Self::Idle => None,
        }
    }

    /// True while a reply is outstanding.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// A new exchange may only start from idle; resolution must name the active target.
    pub fn apply(&self, transition: ExchangeTransition) -> ExchangeTransitionResult {
        match (self, transition) {
            (Self::Idle, ExchangeTransition::Start(target)) => Ok(Self::Pending(target)),
            (Self::Pending(active), ExchangeTransition::Start(_)) => {
                Err(ExchangeRejection::AlreadyPending { active: *active })
            }
            (Self::Pending(active), ExchangeTransition::Resolve(target)) if *active == target => {
                Ok(Self::Idle)
            }
            (Self::Pending(active), ExchangeTransition::Resolve(target)) => {
                Err(ExchangeRejection::TargetMismatch {
                    active: *active,
                    attempted: target,
                })
            }
            (Self::Idle, ExchangeTransition::Resolve(_)) => {
                Err(ExchangeRejection::NoPendingExchange)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(chat: u64, turn: u64) -> ExchangeTarget {
        ExchangeTarget::new(ChatSessionId::new(chat), MessageId::new(turn))
    }

    #[test]
    fn idle_starts_and_matching_resolve_returns_to_idle() {
        let pending = ExchangeState::Idle
            .apply(ExchangeTransition::Start(target(1, 1)))
            .expect("start");
        assert_eq!(pending.pending_target(), Some(target(1, 1)));

        let idle = pending
            .apply(ExchangeTransition::Resolve(target(1, 1)))
            .expect("resolve");
        assert_eq!(idle, ExchangeState::Idle);
    }

    #[test]
    fn second_start_while_pending_is_rejected() {
        let pending = ExchangeState::Pending(target(1, 1));

        assert_eq!(
            pending.apply(ExchangeTransition::Start(target(1, 2))),
            Err(ExchangeRejection::AlreadyPending {
                active: target(1, 1)
            })
        );
    }

    #[test]
    fn stale_resolution_is_rejected() {
        let pending = ExchangeState::Pending(target(2, 3));

        assert_eq!(
            pending.apply(ExchangeTransition::Resolve(target(1, 3))),
            Err(ExchangeRejection::TargetMismatch {
                active: target(2, 3),
                attempted: target(1, 3),
            })
        );
        assert_eq!(
            ExchangeState::Idle.apply(ExchangeTransition::Resolve(target(2, 3))),
            Err(ExchangeRejection::NoPendingExchange)
        );
    }
}
