use std::fmt;
use std::future::Future;
use std::time::Duration;

use super::identity::{Room, User};

/// Cosmetic latency applied before a submitted room form opens the chat.
pub const DEFAULT_ROOM_ENTRY_DELAY: Duration = Duration::from_millis(800);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub confirm_password: String,
}

impl LoginForm {
    /// Creates a login form from its four fields.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            password: password.into(),
            confirm_password: confirm_password.into(),
        }
    }

    /// Credentials are accepted unconditionally once the form is complete and consistent.
    pub fn validate(&self) -> Result<User, LoginError> {
        let fields = [
            &self.first_name,
            &self.last_name,
            &self.password,
            &self.confirm_password,
        ];
        if fields.iter().any(|field| field.is_empty()) {
            return Err(LoginError::MissingFields);
        }

        if self.password != self.confirm_password {
            return Err(LoginError::PasswordMismatch);
        }

        Ok(User::new(self.first_name.clone(), self.last_name.clone()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoginError {
    MissingFields,
    PasswordMismatch,
}

impl fmt::Display for LoginError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFields => formatter.write_str("Please fill in all fields."),
            Self::PasswordMismatch => formatter.write_str("Passwords do not match."),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoomFormMode {
    Create,
    Join,
}

impl RoomFormMode {
    /// Heading of the room form.
    pub fn title(self) -> &'static str {
        match self {
            Self::Create => "Create a new room",
            Self::Join => "Join a room",
        }
    }

    /// Label of the submitting action.
    pub fn submit_label(self) -> &'static str {
        match self {
            Self::Create => "Create and enter",
            Self::Join => "Enter",
        }
    }
}

/// Tags one room submission so a late completion can be matched to its form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomTicket(pub u64);

impl RoomTicket {
    /// Creates a typed room submission ticket.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomForm {
    pub mode: RoomFormMode,
    pub name: String,
    pub password: String,
    pub pending: Option<RoomTicket>,
}

impl RoomForm {
    /// Creates an empty form for the given mode.
    pub fn new(mode: RoomFormMode) -> Self {
        Self {
            mode,
            name: String::new(),
            password: String::new(),
            pending: None,
        }
    }

    /// Captures the current fields as a room request tagged with `ticket`.
    pub fn request(&self, ticket: RoomTicket) -> RoomRequest {
        RoomRequest {
            ticket,
            name: self.name.clone(),
            password: self.password.clone(),
        }
    }
}

/// A submitted room form waiting for its entry delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomRequest {
    pub ticket: RoomTicket,
    pub name: String,
    pub password: String,
}

impl RoomRequest {
    /// Resolves the request into the entered room.
    pub fn into_entry(self) -> RoomEntry {
        RoomEntry {
            ticket: self.ticket,
            room: Room::new(self.name, Some(self.password)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomEntry {
    pub ticket: RoomTicket,
    pub room: Room,
}

/// Completes exactly once after `delay` and always succeeds. There is no
/// cancellation; a caller that no longer wants the room drops the result.
pub fn enter_room(request: RoomRequest, delay: Duration) -> impl Future<Output = RoomEntry> {
    async move {
        tokio::time::sleep(delay).await;
        request.into_entry()
    }
}
