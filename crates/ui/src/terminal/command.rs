use std::path::PathBuf;

use crate::session::{LoginForm, RoomFormMode, SessionEvent, SessionState, View};

/// Exits from any view.
pub const QUIT: &str = "/quit";
/// Returns to the dashboard from a room form or a chat.
pub const BACK: &str = "/back";
/// Stages a file for the next message.
pub const ATTACH: &str = "/attach";
/// Drops the staged file.
pub const DETACH: &str = "/detach";

/// What one input line asks the terminal loop to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Dispatch in order; stop at the first rejection.
    Events(Vec<SessionEvent>),
    Attach(PathBuf),
    Notice(&'static str),
    /// The line only advanced a multi-line form.
    Continue,
    Quit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum LoginField {
    #[default]
    FirstName,
    LastName,
    Password,
    ConfirmPassword,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum RoomField {
    #[default]
    Name,
    Password,
}

/// Turns raw input lines into session events.
///
/// Forms are collected one field per line; the partially typed form lives here
/// and is dropped whenever the active view changes.
#[derive(Debug, Default)]
pub struct Console {
    view: Option<View>,
    login: LoginForm,
    login_field: LoginField,
    room_field: RoomField,
}

impl Console {
    /// Returns the prompt for the next expected line.
    pub fn prompt(&mut self, state: &SessionState) -> &'static str {
        self.sync(state.view());
        match state.view() {
            View::Auth => match self.login_field {
                LoginField::FirstName => "First name: ",
                LoginField::LastName => "Last name: ",
                LoginField::Password => "Password: ",
                LoginField::ConfirmPassword => "Confirm password: ",
            },
            View::CreateRoom | View::JoinRoom => {
                if state.room_form().is_some_and(|form| form.pending.is_some()) {
                    ""
                } else {
                    match self.room_field {
                        RoomField::Name => "Room name: ",
                        RoomField::Password => "Room password (optional): ",
                    }
                }
            }
            View::Dashboard | View::Chat => "> ",
        }
    }

    /// Interprets one input line against the current view.
    pub fn interpret(&mut self, state: &SessionState, line: &str) -> Command {
        let view = state.view();
        self.sync(view);

        if line.trim() == QUIT {
            return Command::Quit;
        }

        match view {
            View::Auth => self.login_line(line),
            View::Dashboard => match line.trim().to_lowercase().as_str() {
                "1" | "create" => Command::Events(vec![SessionEvent::OpenRoomForm(
                    RoomFormMode::Create,
                )]),
                "2" | "join" => {
                    Command::Events(vec![SessionEvent::OpenRoomForm(RoomFormMode::Join)])
                }
                _ => Command::Notice("Choose 1 to create a room or 2 to join one."),
            },
            View::CreateRoom | View::JoinRoom => self.room_line(state, line),
            View::Chat => chat_line(state, line),
        }
    }

    fn sync(&mut self, view: View) {
        if self.view != Some(view) {
            *self = Self {
                view: Some(view),
                ..Self::default()
            };
        }
    }

    fn login_line(&mut self, line: &str) -> Command {
        let value = line.to_string();
        match self.login_field {
            LoginField::FirstName => {
                self.login.first_name = value;
                self.login_field = LoginField::LastName;
            }
            LoginField::LastName => {
                self.login.last_name = value;
                self.login_field = LoginField::Password;
            }
            LoginField::Password => {
                self.login.password = value;
                self.login_field = LoginField::ConfirmPassword;
            }
            LoginField::ConfirmPassword => {
                self.login.confirm_password = value;
                let form = std::mem::take(&mut self.login);
                self.login_field = LoginField::FirstName;
                return Command::Events(vec![SessionEvent::SubmitLogin(form)]);
            }
        }
        Command::Continue
    }

    fn room_line(&mut self, state: &SessionState, line: &str) -> Command {
        if line.trim() == BACK {
            return Command::Events(vec![SessionEvent::Back]);
        }
        if state.room_form().is_some_and(|form| form.pending.is_some()) {
            return Command::Notice("Entering the room, please wait...");
        }

        match self.room_field {
            RoomField::Name => {
                if line.trim().is_empty() {
                    return Command::Notice("Room name cannot be empty.");
                }
                self.room_field = RoomField::Password;
                Command::Events(vec![SessionEvent::SetRoomName(line.to_string())])
            }
            RoomField::Password => {
                self.room_field = RoomField::Name;
                Command::Events(vec![
                    SessionEvent::SetRoomPassword(line.to_string()),
                    SessionEvent::SubmitRoomForm,
                ])
            }
        }
    }
}

fn chat_line(state: &SessionState, line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed == BACK {
        return Command::Events(vec![SessionEvent::Back]);
    }
    if trimmed == DETACH {
        return Command::Events(vec![SessionEvent::ClearAttachment]);
    }
    if let Some(path) = trimmed.strip_prefix(ATTACH) {
        let path = path.trim();
        if path.is_empty() {
            return Command::Notice("Usage: /attach <path>");
        }
        return Command::Attach(PathBuf::from(path));
    }

    if state.chat().is_some_and(|chat| chat.exchange.is_pending()) {
        return Command::Notice("Waiting for the assistant to reply...");
    }

    Command::Events(vec![
        SessionEvent::SetDraft(line.to_string()),
        SessionEvent::SendMessage,
    ])
}
