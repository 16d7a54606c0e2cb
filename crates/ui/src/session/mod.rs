/// Events, effects and rejections of the session state machine.
pub mod events;
/// Login and room form values.
pub mod forms;
pub mod identity;
/// The single session value and its transitions.
pub mod state;

pub use events::{
    SessionEffect, SessionEvent, SessionRejection, SessionTransitionResult, Transition,
};
pub use forms::{
    DEFAULT_ROOM_ENTRY_DELAY, LoginError, LoginForm, RoomEntry, RoomForm, RoomFormMode,
    RoomRequest, RoomTicket, enter_room,
};
pub use identity::{Room, RoomId, User, derive_room_id};
pub use state::{Screen, SessionState, View};
