use crate::chat::{ChatSession, ChatSessionId};

use super::events::{
    SessionEffect, SessionEvent, SessionRejection, SessionTransitionResult, Transition,
};
use super::forms::{LoginError, RoomForm, RoomFormMode, RoomTicket};
use super::identity::User;

/// The five screens of the app. Exactly one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Auth,
    Dashboard,
    CreateRoom,
    JoinRoom,
    Chat,
}

/// Per-view state. A chat always carries its room, so Chat cannot exist without one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Auth { error: Option<LoginError> },
    Dashboard,
    RoomForm(RoomForm),
    Chat(ChatSession),
}

impl Screen {
    /// Returns the view this screen renders.
    pub fn view(&self) -> View {
        match self {
            Self::Auth { .. } => View::Auth,
            Self::Dashboard => View::Dashboard,
            Self::RoomForm(form) => match form.mode {
                RoomFormMode::Create => View::CreateRoom,
                RoomFormMode::Join => View::JoinRoom,
            },
            Self::Chat(_) => View::Chat,
        }
    }
}

/// Explicit session value owned by the controller.
///
/// Transitions are pure: [`SessionState::apply`] returns the next state and leaves
/// the receiver untouched, including when the event is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    user: Option<User>,
    screen: Screen,
    next_serial: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// Creates a session on the login screen.
    pub fn new() -> Self {
        Self {
            user: None,
            screen: Screen::Auth { error: None },
            next_serial: 1,
        }
    }

    /// Rebuilds a state from parts, applying the same corrective fallback as transitions.
    pub fn from_parts(user: Option<User>, screen: Screen) -> Self {
        Self {
            user,
            screen,
            next_serial: 1,
        }
        .settle()
    }

    /// Returns the active view.
    pub fn view(&self) -> View {
        self.screen.view()
    }

    /// Returns the logged-in user, if any.
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Returns the per-view state.
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Returns the login error shown on the Auth screen.
    pub fn auth_error(&self) -> Option<LoginError> {
        match &self.screen {
            Screen::Auth { error } => *error,
            _ => None,
        }
    }

    /// Returns the room form when a form view is active.
    pub fn room_form(&self) -> Option<&RoomForm> {
        match &self.screen {
            Screen::RoomForm(form) => Some(form),
            _ => None,
        }
    }

    /// Returns the open chat when the Chat view is active.
    pub fn chat(&self) -> Option<&ChatSession> {
        match &self.screen {
            Screen::Chat(chat) => Some(chat),
            _ => None,
        }
    }

    /// True while a room entry or a reply is still on its way.
    pub fn has_pending_work(&self) -> bool {
        match &self.screen {
            Screen::RoomForm(form) => form.pending.is_some(),
            Screen::Chat(chat) => chat.exchange.is_pending(),
            Screen::Auth { .. } | Screen::Dashboard => false,
        }
    }

    /// Applies one event and returns the next state with any async work to run.
    pub fn apply(&self, event: SessionEvent) -> SessionTransitionResult {
        let mut next = self.clone();
        let effect = next.reduce(event)?;
        Ok(Transition {
            state: next.settle(),
            effect,
        })
    }

    fn reduce(&mut self, event: SessionEvent) -> Result<Option<SessionEffect>, SessionRejection> {
        let not_available = SessionRejection::NotAvailable {
            view: self.view(),
            event: event.kind(),
        };

        match event {
            SessionEvent::SubmitLogin(form) => {
                let Screen::Auth { error } = &mut self.screen else {
                    return Err(not_available);
                };
                match form.validate() {
                    Ok(user) => {
                        self.user = Some(user);
                        self.screen = Screen::Dashboard;
                    }
                    Err(login_error) => *error = Some(login_error),
                }
                Ok(None)
            }
            SessionEvent::OpenRoomForm(mode) => {
                if !matches!(self.screen, Screen::Dashboard) {
                    return Err(not_available);
                }
                self.screen = Screen::RoomForm(RoomForm::new(mode));
                Ok(None)
            }
            SessionEvent::SetRoomName(name) => {
                let Screen::RoomForm(form) = &mut self.screen else {
                    return Err(not_available);
                };
                form.name = name;
                Ok(None)
            }
            SessionEvent::SetRoomPassword(password) => {
                let Screen::RoomForm(form) = &mut self.screen else {
                    return Err(not_available);
                };
                form.password = password;
                Ok(None)
            }
            SessionEvent::SubmitRoomForm => {
                let Screen::RoomForm(form) = &mut self.screen else {
                    return Err(not_available);
                };
                if let Some(ticket) = form.pending {
                    return Err(SessionRejection::RoomEntryPending { ticket });
                }
                if form.name.trim().is_empty() {
                    return Err(SessionRejection::EmptyRoomName);
                }

                let ticket = RoomTicket::new(self.next_serial);
                self.next_serial = self.next_serial.saturating_add(1);
                form.pending = Some(ticket);
                Ok(Some(SessionEffect::EnterRoom(form.request(ticket))))
            }
            SessionEvent::RoomEntered(entry) => {
                let awaiting = self
                    .room_form()
                    .is_some_and(|form| form.pending == Some(entry.ticket));
                if !awaiting {
                    return Err(SessionRejection::StaleRoomEntry {
                        ticket: entry.ticket,
                    });
                }

                let chat_id = ChatSessionId::new(self.next_serial);
                self.next_serial = self.next_serial.saturating_add(1);
                self.screen = Screen::Chat(ChatSession::open(chat_id, entry.room));
                Ok(None)
            }
            SessionEvent::Back => match self.screen {
                Screen::RoomForm(_) | Screen::Chat(_) => {
                    self.screen = Screen::Dashboard;
                    Ok(None)
                }
                Screen::Auth { .. } | Screen::Dashboard => Err(not_available),
            },
            SessionEvent::SetDraft(text) => {
                let Screen::Chat(chat) = &mut self.screen else {
                    return Err(not_available);
                };
                chat.draft = text;
                Ok(None)
            }
            SessionEvent::StageAttachment(attachment) => {
                let Screen::Chat(chat) = &mut self.screen else {
                    return Err(not_available);
                };
                chat.staged = Some(attachment);
                Ok(None)
            }
            SessionEvent::ClearAttachment => {
                let Screen::Chat(chat) = &mut self.screen else {
                    return Err(not_available);
                };
                chat.staged = None;
                Ok(None)
            }
            SessionEvent::SendMessage => {
                let (Screen::Chat(chat), Some(user)) = (&mut self.screen, &self.user) else {
                    return Err(not_available);
                };
                let turn = chat.begin_send(user)?;
                Ok(Some(SessionEffect::Exchange(turn)))
            }
            SessionEvent::ReplyReceived(outcome) => {
                let Screen::Chat(chat) = &mut self.screen else {
                    return Err(not_available);
                };
                chat.resolve(outcome)?;
                Ok(None)
            }
        }
    }

    /// Protected views fall back to Auth when no user is logged in.
    fn settle(mut self) -> Self {
        if self.user.is_none() && !matches!(self.screen, Screen::Auth { .. }) {
            self.screen = Screen::Auth { error: None };
        }
        self
    }
}
