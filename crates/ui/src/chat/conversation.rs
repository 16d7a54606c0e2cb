use crate::session::{Room, User};

use super::attachment::Attachment;
use super::events::{ExchangeOutcome, OutboundTurn};
use super::message::{
    ChatSessionId, ExchangeRejection, ExchangeState, ExchangeTarget, ExchangeTransition, Message,
    MessageId, Sender,
};

/// Sender name shown on every assistant message.
pub const ASSISTANT_NAME: &str = "AI Assistant";

/// Greeting seeded as the first message of every chat.
pub fn welcome_text(room_name: &str) -> String {
    format!("Welcome to \"{room_name}\"! I'm this room's AI assistant.")
}

/// One solo session against the assistant inside a room.
///
/// Messages are append-only and ordered oldest first. The draft and the staged
/// attachment are private to the session and discarded with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSession {
    pub id: ChatSessionId,
    pub room: Room,
    pub messages: Vec<Message>,
    pub draft: String,
    pub staged: Option<Attachment>,
    pub exchange: ExchangeState,
    next_message_id: u64,
}

impl ChatSession {
    /// Opens a chat whose only message is the welcome.
    pub fn open(id: ChatSessionId, room: Room) -> Self {
        let welcome = Message::new(
            MessageId::WELCOME,
            Sender::Other,
            ASSISTANT_NAME,
            welcome_text(&room.name),
        );

        Self {
            id,
            room,
            messages: vec![welcome],
            draft: String::new(),
            staged: None,
            exchange: ExchangeState::Idle,
            next_message_id: MessageId::WELCOME.0 + 1,
        }
    }

    fn has_content(&self) -> bool {
        !self.draft.trim().is_empty() || self.staged.is_some()
    }

    /// Appends the user's message immediately and returns the turn to hand to the gateway.
    pub fn begin_send(&mut self, user: &User) -> Result<OutboundTurn, ExchangeRejection> {
        if let Some(active) = self.exchange.pending_target() {
            return Err(ExchangeRejection::AlreadyPending { active });
        }
        if !self.has_content() {
            return Err(ExchangeRejection::EmptyTurn);
        }

        let turn_id = self.alloc_message_id();
        let target = ExchangeTarget::new(self.id, turn_id);
        self.exchange = self.exchange.apply(ExchangeTransition::Start(target))?;

        let history = self.messages.clone();
        let text = std::mem::take(&mut self.draft);
        let attachment = self.staged.take();

        self.messages.push(
            Message::new(turn_id, Sender::Me, user.first_name.clone(), text.clone())
                .with_attachment(attachment.clone()),
        );

        Ok(OutboundTurn {
            target,
            history,
            text,
            attachment,
        })
    }

    /// Appends the assistant reply for the pending exchange and returns to idle.
    pub fn resolve(&mut self, outcome: ExchangeOutcome) -> Result<&Message, ExchangeRejection> {
        self.exchange = self
            .exchange
            .apply(ExchangeTransition::Resolve(outcome.target))?;

        let id = self.alloc_message_id();
        self.messages.push(Message::new(
            id,
            Sender::Other,
            ASSISTANT_NAME,
            outcome.reply.text,
        ));

        Ok(&self.messages[self.messages.len() - 1])
    }

    fn alloc_message_id(&mut self) -> MessageId {
        let id = MessageId::new(self.next_message_id);
        self.next_message_id = self.next_message_id.saturating_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::events::{Delivery, ExchangeReply};

    fn session() -> ChatSession {
        ChatSession::open(ChatSessionId::new(1), Room::new("Test", None))
    }

    fn ada() -> User {
        User::new("Ada", "Lovelace")
    }

    #[test]
    fn opening_seeds_one_welcome_from_the_assistant() {
        let chat = session();

        assert_eq!(chat.messages.len(), 1);
        assert_eq!(chat.messages[0].id, MessageId::WELCOME);
        assert_eq!(chat.messages[0].sender, Sender::Other);
        assert!(chat.messages[0].body.contains("\"Test\""));
        assert!(chat.draft.is_empty());
        assert!(!chat.exchange.is_pending());
    }

    #[test]
    fn begin_send_echoes_immediately_and_clears_inputs() {
        let mut chat = session();
        chat.draft = "hello".to_string();
        chat.staged = Some(Attachment::from_bytes("a.txt", "text/plain", b"hi"));

        let turn = chat.begin_send(&ada()).expect("send");

        assert_eq!(turn.text, "hello");
        assert_eq!(turn.history.len(), 1);
        assert_eq!(chat.messages.len(), 2);
        assert_eq!(chat.messages[1].sender, Sender::Me);
        assert_eq!(chat.messages[1].sender_name, "Ada");
        assert!(chat.messages[1].attachment.is_some());
        assert!(chat.draft.is_empty());
        assert!(chat.staged.is_none());
        assert_eq!(chat.exchange.pending_target(), Some(turn.target));
    }

    #[test]
    fn attachment_alone_is_enough_to_send() {
        let mut chat = session();
        chat.staged = Some(Attachment::from_bytes("cat.png", "image/png", b"png"));

        let turn = chat.begin_send(&ada()).expect("send");

        assert!(turn.text.is_empty());
        assert!(turn.attachment.is_some());
    }

    #[test]
    fn blank_draft_is_an_empty_turn() {
        let mut chat = session();
        chat.draft = "  \n".to_string();

        assert_eq!(chat.begin_send(&ada()), Err(ExchangeRejection::EmptyTurn));
        assert_eq!(chat.messages.len(), 1);
    }

    #[test]
    fn second_send_while_pending_adds_nothing() {
        let mut chat = session();
        chat.draft = "first".to_string();
        let first = chat.begin_send(&ada()).expect("send");

        chat.draft = "second".to_string();
        let rejected = chat.begin_send(&ada());

        assert_eq!(
            rejected,
            Err(ExchangeRejection::AlreadyPending {
                active: first.target
            })
        );
        assert_eq!(chat.messages.len(), 2);
        assert_eq!(chat.draft, "second");
    }

    #[test]
    fn resolve_appends_reply_and_unlocks_send() {
        let mut chat = session();
        chat.draft = "hello".to_string();
        let turn = chat.begin_send(&ada()).expect("send");

        let reply = chat
            .resolve(ExchangeOutcome {
                target: turn.target,
                reply: ExchangeReply::generated("hi there"),
            })
            .expect("resolve");
        assert_eq!(reply.sender, Sender::Other);
        assert_eq!(reply.body, "hi there");

        assert_eq!(chat.messages.len(), 3);
        assert_eq!(chat.exchange, ExchangeState::Idle);

        let ids = chat.messages.iter().map(|m| m.id).collect::<Vec<_>>();
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn outcome_for_another_chat_is_ignored() {
        let mut chat = session();
        chat.draft = "hello".to_string();
        let turn = chat.begin_send(&ada()).expect("send");

        let stale = ExchangeTarget::new(ChatSessionId::new(99), turn.target.turn_id);
        let result = chat.resolve(ExchangeOutcome {
            target: stale,
            reply: ExchangeReply {
                text: "late".to_string(),
                delivery: Delivery::Generated,
            },
        });

        assert!(matches!(
            result,
            Err(ExchangeRejection::TargetMismatch { .. })
        ));
        assert_eq!(chat.messages.len(), 2);
        assert!(chat.exchange.is_pending());
    }
}
