#![deny(unsafe_code)]

//! TeleChat: sign up, open a room and chat with an AI assistant from the terminal.

/// Controller that owns the session and runs async effects.
pub mod app;
/// Conversation, attachments and the reply gateway.
pub mod chat;
/// Navigation state machine across the five screens.
pub mod session;
/// Layered settings loaded at startup.
pub mod settings;
/// Line-oriented front end.
pub mod terminal;
