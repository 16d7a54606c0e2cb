use crate::chat::{Attachment, ExchangeOutcome, ExchangeRejection, OutboundTurn};

use super::forms::{LoginForm, RoomEntry, RoomFormMode, RoomRequest, RoomTicket};
use super::state::{SessionState, View};

/// Everything that can drive the session: user actions and completions of async work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SubmitLogin(LoginForm),
    OpenRoomForm(RoomFormMode),
    SetRoomName(String),
    SetRoomPassword(String),
    SubmitRoomForm,
    /// The fixed room entry delay elapsed for a submitted form.
    RoomEntered(RoomEntry),
    Back,
    SetDraft(String),
    StageAttachment(Attachment),
    ClearAttachment,
    SendMessage,
    /// The gateway finished the exchange started by a send.
    ReplyReceived(ExchangeOutcome),
}

impl SessionEvent {
    /// Stable name of the event, used in logs and rejections.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SubmitLogin(_) => "submit-login",
            Self::OpenRoomForm(_) => "open-room-form",
            Self::SetRoomName(_) => "set-room-name",
            Self::SetRoomPassword(_) => "set-room-password",
            Self::SubmitRoomForm => "submit-room-form",
            Self::RoomEntered(_) => "room-entered",
            Self::Back => "back",
            Self::SetDraft(_) => "set-draft",
            Self::StageAttachment(_) => "stage-attachment",
            Self::ClearAttachment => "clear-attachment",
            Self::SendMessage => "send-message",
            Self::ReplyReceived(_) => "reply-received",
        }
    }

    /// Completions of async work, as opposed to user actions.
    pub fn is_completion(&self) -> bool {
        matches!(self, Self::RoomEntered(_) | Self::ReplyReceived(_))
    }
}

/// Async work requested by a transition. The controller runs it and feeds the
/// completion back as a [`SessionEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEffect {
    EnterRoom(RoomRequest),
    Exchange(OutboundTurn),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: SessionState,
    pub effect: Option<SessionEffect>,
}

/// Reason an event left the session untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionRejection {
    NotAvailable {
        view: View,
        event: &'static str,
    },
    EmptyRoomName,
    RoomEntryPending {
        ticket: RoomTicket,
    },
    StaleRoomEntry {
        ticket: RoomTicket,
    },
    Exchange(ExchangeRejection),
}

impl From<ExchangeRejection> for SessionRejection {
    fn from(rejection: ExchangeRejection) -> Self {
        Self::Exchange(rejection)
    }
}

/// Result of one session transition.
pub type SessionTransitionResult = Result<Transition, SessionRejection>;
