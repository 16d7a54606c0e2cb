use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;
use telechat::app::ChatApp;
use telechat::chat::{FALLBACK_REPLY, MessageGateway, Sender};
use telechat::session::{LoginForm, RoomFormMode, SessionEvent, SessionRejection, View};
use telechat::settings::Settings;
use telechat_llm::{LlmProvider, ProviderError, ProviderResult, ReplyRequest};
use tokio::sync::mpsc::UnboundedReceiver;

/// Answers from a fixed script and records every request it receives.
struct ScriptedProvider {
    replies: Mutex<Vec<ProviderResult<String>>>,
    requests: Mutex<Vec<ReplyRequest>>,
}

impl ScriptedProvider {
    fn new(replies: Vec<ProviderResult<String>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().rev().collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<ReplyRequest> {
        self.requests.lock().expect("lock").clone()
    }
}

impl LlmProvider for ScriptedProvider {
    fn id(&self) -> &str {
        "scripted"
    }

    fn default_model(&self) -> &str {
        "scripted-model"
    }

    fn generate_reply(&self, request: ReplyRequest) -> BoxFuture<'_, ProviderResult<String>> {
        self.requests.lock().expect("lock").push(request);
        let reply = self.replies.lock().expect("lock").pop().unwrap_or_else(|| {
            Err(ProviderError::EmptyContent {
                stage: "scripted-provider",
                model_id: "scripted-model".to_string(),
            })
        });
        Box::pin(async move { reply })
    }
}

fn start(provider: &Arc<ScriptedProvider>) -> (ChatApp, UnboundedReceiver<SessionEvent>) {
    let shared: Arc<dyn LlmProvider> = provider.clone();
    let gateway = MessageGateway::new(Some(shared), "scripted-model");
    ChatApp::new(gateway, &Settings::default())
}

async fn next_completion(receiver: &mut UnboundedReceiver<SessionEvent>) -> SessionEvent {
    receiver.recv().await.expect("completion")
}

async fn enter_test_room(app: &mut ChatApp, receiver: &mut UnboundedReceiver<SessionEvent>) {
    app.dispatch(SessionEvent::SubmitLogin(LoginForm::new(
        "Ada", "Lovelace", "x", "x",
    )))
    .expect("login");
    assert_eq!(app.view(), View::Dashboard);

    app.dispatch(SessionEvent::OpenRoomForm(RoomFormMode::Create))
        .expect("open create form");
    app.dispatch(SessionEvent::SetRoomName("Test".to_string()))
        .expect("room name");
    app.dispatch(SessionEvent::SubmitRoomForm)
        .expect("submit room");
    assert_eq!(app.view(), View::CreateRoom);

    let entered = next_completion(receiver).await;
    app.dispatch(entered).expect("room entered");
    assert_eq!(app.view(), View::Chat);
}

async fn send(app: &mut ChatApp, text: &str) {
    app.dispatch(SessionEvent::SetDraft(text.to_string()))
        .expect("draft");
    app.dispatch(SessionEvent::SendMessage).expect("send");
}

#[tokio::test(start_paused = true)]
async fn login_room_and_successful_exchange() {
    let provider = ScriptedProvider::new(vec![Ok("Hi Ada!".to_string())]);
    let (mut app, mut receiver) = start(&provider);

    let started = tokio::time::Instant::now();
    enter_test_room(&mut app, &mut receiver).await;
    assert!(started.elapsed() >= Duration::from_millis(800));

    let chat = app.state().chat().expect("chat");
    assert_eq!(chat.room.id.as_str(), "test");
    assert_eq!(chat.messages.len(), 1);

    send(&mut app, "hello").await;
    assert_eq!(app.state().chat().map(|chat| chat.messages.len()), Some(2));

    let reply = next_completion(&mut receiver).await;
    app.dispatch(reply).expect("reply");

    let chat = app.state().chat().expect("chat");
    assert_eq!(chat.messages.len(), 3);
    assert_eq!(chat.messages[1].sender, Sender::Me);
    assert_eq!(chat.messages[1].body, "hello");
    assert_eq!(chat.messages[2].sender, Sender::Other);
    assert_eq!(chat.messages[2].body, "Hi Ada!");

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].text, "hello");
    assert_eq!(requests[0].model_id, "scripted-model");
}

#[tokio::test(start_paused = true)]
async fn provider_failure_is_answered_with_fallback() {
    let provider = ScriptedProvider::new(Vec::new());
    let (mut app, mut receiver) = start(&provider);
    enter_test_room(&mut app, &mut receiver).await;

    send(&mut app, "hello").await;
    let reply = next_completion(&mut receiver).await;
    app.dispatch(reply).expect("reply");

    let chat = app.state().chat().expect("chat");
    assert_eq!(chat.messages.len(), 3);
    assert_eq!(chat.messages[2].body, FALLBACK_REPLY);
    assert!(!chat.exchange.is_pending());
}

#[tokio::test(start_paused = true)]
async fn at_most_one_exchange_in_flight() {
    let provider = ScriptedProvider::new(vec![
        Ok("first".to_string()),
        Ok("second".to_string()),
    ]);
    let (mut app, mut receiver) = start(&provider);
    enter_test_room(&mut app, &mut receiver).await;

    send(&mut app, "one").await;
    app.dispatch(SessionEvent::SetDraft("two".to_string()))
        .expect("draft while pending");
    let rejected = app.dispatch(SessionEvent::SendMessage);
    assert!(matches!(rejected, Err(SessionRejection::Exchange(_))));
    assert_eq!(app.state().chat().map(|chat| chat.messages.len()), Some(2));

    let reply = next_completion(&mut receiver).await;
    app.dispatch(reply).expect("first reply");

    app.dispatch(SessionEvent::SendMessage).expect("send after reply");
    let reply = next_completion(&mut receiver).await;
    app.dispatch(reply).expect("second reply");

    let bodies = app
        .state()
        .chat()
        .expect("chat")
        .messages
        .iter()
        .skip(1)
        .map(|message| message.body.clone())
        .collect::<Vec<_>>();
    assert_eq!(bodies, ["one", "first", "two", "second"]);
    assert_eq!(provider.requests().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn back_during_room_entry_never_opens_the_chat() {
    let provider = ScriptedProvider::new(Vec::new());
    let (mut app, mut receiver) = start(&provider);

    app.dispatch(SessionEvent::SubmitLogin(LoginForm::new(
        "Ada", "Lovelace", "x", "x",
    )))
    .expect("login");
    app.dispatch(SessionEvent::OpenRoomForm(RoomFormMode::Join))
        .expect("open join form");
    app.dispatch(SessionEvent::SetRoomName("Lobby".to_string()))
        .expect("room name");
    app.dispatch(SessionEvent::SubmitRoomForm)
        .expect("submit room");
    app.dispatch(SessionEvent::Back).expect("back");

    let late = next_completion(&mut receiver).await;
    assert!(matches!(
        app.dispatch(late),
        Err(SessionRejection::StaleRoomEntry { .. })
    ));
    assert_eq!(app.view(), View::Dashboard);
}
