/// Files staged next to a message.
pub mod attachment;
/// Conversation inside an entered room.
pub mod conversation;
/// Event contracts between the conversation and the gateway.
pub mod events;
pub mod gateway;
/// Domain entities and the deterministic exchange state.
pub mod message;

pub use attachment::{Attachment, AttachmentError, AttachmentResult};
pub use conversation::{ASSISTANT_NAME, ChatSession, welcome_text};
pub use events::{Delivery, ExchangeOutcome, ExchangeReply, OutboundTurn};
pub use gateway::{EMPTY_REPLY, FALLBACK_REPLY, MessageGateway, SYSTEM_INSTRUCTION};
pub use message::{
    ChatSessionId, ExchangeRejection, ExchangeState, ExchangeTarget, ExchangeTransition,
    ExchangeTransitionResult, Message, MessageId, Sender,
};
