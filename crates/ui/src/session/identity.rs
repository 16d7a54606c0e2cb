use std::fmt;

/// Simulated account created by the login form. Immutable for the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub first_name: String,
    pub last_name: String,
}

impl User {
    /// Creates a user from the login form names.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// Returns `first last`.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Slug identifying a room, derived from its display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomId(String);

impl RoomId {
    /// Returns the slug.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    /// Captured from the form, never verified.
    pub password: Option<String>,
}

impl Room {
    /// Creates a room; the name is trimmed and an empty password is dropped.
    pub fn new(name: impl Into<String>, password: Option<String>) -> Self {
        let name = name.into().trim().to_string();
        Self {
            id: derive_room_id(&name),
            name,
            password: password.filter(|password| !password.is_empty()),
        }
    }
}

/// Trims, lowercases with full Unicode case mapping and collapses every whitespace
/// run into a single hyphen. Locale independent: `I` maps to `i`, `ı` is kept.
pub fn derive_room_id(name: &str) -> RoomId {
    let lowered = name.trim().to_lowercase();
    RoomId(lowered.split_whitespace().collect::<Vec<_>>().join("-"))
}
