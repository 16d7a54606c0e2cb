use std::fmt::Write as _;

use crate::chat::{ChatSessionId, ExchangeRejection, Message, Sender};
use crate::session::{LoginError, Screen, SessionRejection, SessionState, View};

const TIME_FORMAT: &str = "%H:%M";

/// Remembers what is already on the terminal so each refresh prints only what changed.
#[derive(Debug, Default)]
pub struct ScreenTracker {
    view: Option<View>,
    chat_id: Option<ChatSessionId>,
    printed: usize,
    pending: bool,
    entering: bool,
    auth_error: Option<LoginError>,
}

impl ScreenTracker {
    /// Forgets the shown login error so a repeated failure is printed again.
    pub fn input_received(&mut self) {
        self.auth_error = None;
    }

    /// Returns the text to print since the previous refresh; empty when nothing changed.
    pub fn refresh(&mut self, state: &SessionState) -> String {
        let mut out = String::new();
        let view = state.view();
        let chat_id = state.chat().map(|chat| chat.id);

        if self.view != Some(view) || self.chat_id != chat_id {
            *self = Self {
                view: Some(view),
                chat_id,
                ..Self::default()
            };
            out.push('\n');
            out.push_str(&header(state));
        }

        match state.screen() {
            Screen::Auth { error } => {
                if *error != self.auth_error {
                    if let Some(error) = error {
                        let _ = writeln!(out, "! {error}");
                    }
                    self.auth_error = *error;
                }
            }
            Screen::Dashboard => {}
            Screen::RoomForm(form) => {
                let entering = form.pending.is_some();
                if entering && !self.entering {
                    out.push_str("Entering the room...\n");
                }
                self.entering = entering;
            }
            Screen::Chat(chat) => {
                for message in chat.messages.iter().skip(self.printed) {
                    out.push_str(&message_line(message));
                }
                self.printed = chat.messages.len();

                let pending = chat.exchange.is_pending();
                if pending && !self.pending {
                    out.push_str("  ... the assistant is typing\n");
                }
                self.pending = pending;
            }
        }

        out
    }
}

/// Banner printed when a view is entered.
pub fn header(state: &SessionState) -> String {
    match state.screen() {
        Screen::Auth { .. } => {
            "=== TeleChat ===\nSign up to start chatting. Type /quit to exit.\n".to_string()
        }
        Screen::Dashboard => {
            let name = state
                .user()
                .map(|user| user.display_name())
                .unwrap_or_default();
            format!(
                "=== Dashboard ===\nWelcome, {name}!\n  1) Create a room\n  2) Join a room\n"
            )
        }
        Screen::RoomForm(form) => format!(
            "=== {} ===\nEnter a room name, then a password to {}. Type /back to return.\n",
            form.mode.title(),
            form.mode.submit_label().to_lowercase()
        ),
        Screen::Chat(chat) => format!(
            "=== {} ({}) ===\nType a message, /attach <path>, /detach, /back or /quit.\n",
            chat.room.name, chat.room.id
        ),
    }
}

/// Formats one message as `[HH:MM] name: body`, with its attachment below.
pub fn message_line(message: &Message) -> String {
    let mut line = format!(
        "[{}] {}: {}\n",
        message.sent_at.format(TIME_FORMAT),
        message.sender_name,
        message.body
    );

    if let Some(attachment) = &message.attachment {
        let indent = match message.sender {
            Sender::Me => "  ",
            Sender::Other => "    ",
        };
        let _ = writeln!(
            line,
            "{indent}[attachment: {} ({})]",
            attachment.name, attachment.mime_type
        );
    }

    line
}

/// User-facing text for a rejected action. Stale completions are silent.
pub fn rejection_notice(rejection: &SessionRejection) -> Option<&'static str> {
    match rejection {
        SessionRejection::NotAvailable { .. } => Some("That is not available here."),
        SessionRejection::EmptyRoomName => Some("Room name cannot be empty."),
        SessionRejection::RoomEntryPending { .. } => Some("Entering the room, please wait..."),
        SessionRejection::StaleRoomEntry { .. } => None,
        SessionRejection::Exchange(ExchangeRejection::EmptyTurn) => {
            Some("Type a message or attach a file first.")
        }
        SessionRejection::Exchange(ExchangeRejection::AlreadyPending { .. }) => {
            Some("Waiting for the assistant to reply...")
        }
        SessionRejection::Exchange(_) => None,
    }
}
