use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::chat::{ExchangeOutcome, MessageGateway, OutboundTurn};
use crate::session::{
    RoomRequest, SessionEffect, SessionEvent, SessionRejection, SessionState, Transition, View,
    enter_room,
};
use crate::settings::Settings;

/// Single owner of the session state.
///
/// Events are applied in order on the caller's task. Effects run as tokio tasks
/// and report back through the channel returned by [`ChatApp::new`]; the caller
/// feeds those events into [`ChatApp::dispatch`] like any user action.
pub struct ChatApp {
    state: SessionState,
    gateway: Arc<MessageGateway>,
    room_entry_delay: Duration,
    events: UnboundedSender<SessionEvent>,
}

impl ChatApp {
    /// Creates the controller and the receiver its async work reports to.
    pub fn new(
        gateway: MessageGateway,
        settings: &Settings,
    ) -> (Self, UnboundedReceiver<SessionEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let app = Self {
            state: SessionState::new(),
            gateway: Arc::new(gateway),
            room_entry_delay: settings.room_entry_delay(),
            events,
        };
        (app, receiver)
    }

    /// Returns the current session state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Returns the active view.
    pub fn view(&self) -> View {
        self.state.view()
    }

    /// Returns the gateway used for replies.
    pub fn gateway(&self) -> &MessageGateway {
        &self.gateway
    }

    /// Applies one event, then spawns the effect it requests, if any.
    pub fn dispatch(&mut self, event: SessionEvent) -> Result<(), SessionRejection> {
        let kind = event.kind();
        let completion = event.is_completion();

        let Transition { state, effect } = match self.state.apply(event) {
            Ok(transition) => transition,
            Err(rejection) => {
                if completion {
                    // Completions routinely outlive the screen that started them.
                    tracing::debug!(event = kind, ?rejection, "dropping stale completion");
                } else {
                    tracing::warn!(event = kind, view = ?self.state.view(), ?rejection, "event rejected");
                }
                return Err(rejection);
            }
        };

        let previous = self.state.view();
        self.state = state;
        self.log_view_change(previous);

        if let Some(effect) = effect {
            self.run(effect);
        }
        Ok(())
    }

    fn log_view_change(&self, previous: View) {
        let current = self.state.view();
        if previous == current {
            return;
        }

        match current {
            View::Dashboard => tracing::info!(
                user = ?self.state.user().map(|user| user.display_name()),
                from = ?previous,
                "entered dashboard"
            ),
            View::Chat => {
                if let Some(chat) = self.state.chat() {
                    tracing::info!(
                        room_id = %chat.room.id,
                        room_name = %chat.room.name,
                        chat_id = chat.id.0,
                        "entered chat room"
                    );
                }
            }
            _ => tracing::debug!(from = ?previous, to = ?current, "view changed"),
        }
    }

    fn run(&self, effect: SessionEffect) {
        match effect {
            SessionEffect::EnterRoom(request) => self.spawn_room_entry(request),
            SessionEffect::Exchange(turn) => self.spawn_exchange(turn),
        }
    }

    fn spawn_room_entry(&self, request: RoomRequest) {
        tracing::debug!(
            ticket = request.ticket.0,
            delay_ms = self.room_entry_delay.as_millis() as u64,
            "scheduling room entry"
        );

        let events = self.events.clone();
        let delay = self.room_entry_delay;
        tokio::spawn(async move {
            let entry = enter_room(request, delay).await;
            // The receiver is gone only when the app is shutting down.
            let _ = events.send(SessionEvent::RoomEntered(entry));
        });
    }

    fn spawn_exchange(&self, turn: OutboundTurn) {
        tracing::debug!(
            chat_id = turn.target.chat_id.0,
            turn_id = turn.target.turn_id.0,
            has_attachment = turn.attachment.is_some(),
            "starting exchange"
        );

        let events = self.events.clone();
        let gateway = Arc::clone(&self.gateway);
        tokio::spawn(async move {
            let reply = gateway.exchange(&turn).await;
            let _ = events.send(SessionEvent::ReplyReceived(ExchangeOutcome {
                target: turn.target,
                reply,
            }));
        });
    }
}
