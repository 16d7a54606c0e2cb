/// Line parsing per view.
pub mod command;
/// Text rendering of screens and messages.
pub mod render;

use snafu::{ResultExt, Snafu};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::app::ChatApp;
use crate::chat::Attachment;
use crate::session::SessionEvent;

pub use command::{Command, Console};
pub use render::ScreenTracker;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TerminalError {
    #[snafu(display("failed to read input on `{stage}`: {source}"))]
    ReadInput {
        stage: &'static str,
        source: std::io::Error,
    },
    #[snafu(display("failed to write output on `{stage}`: {source}"))]
    WriteOutput {
        stage: &'static str,
        source: std::io::Error,
    },
}

/// Result type of the terminal loop.
pub type TerminalResult<T> = Result<T, TerminalError>;

/// Drives the app from input lines until `/quit`, or until input ends and no
/// room entry or reply is outstanding.
///
/// User lines and completions of async work are handled on this one task, so
/// the session is never touched concurrently. Input is not read while a room
/// entry is pending.
pub async fn run<R, W>(
    mut app: ChatApp,
    mut completions: UnboundedReceiver<SessionEvent>,
    input: R,
    mut output: W,
) -> TerminalResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut console = Console::default();
    let mut tracker = ScreenTracker::default();

    if !app.gateway().is_configured() {
        write(
            &mut output,
            "(no API key configured: the assistant will only answer with its fallback)\n",
        )
        .await?;
    }
    refresh(&app, &mut console, &mut tracker, &mut output, true).await?;

    let mut input_open = true;
    loop {
        if !input_open && !app.state().has_pending_work() {
            break;
        }
        let entering = app
            .state()
            .room_form()
            .is_some_and(|form| form.pending.is_some());

        let from_input = tokio::select! {
            line = lines.next_line(), if input_open && !entering => {
                let line = line.context(ReadInputSnafu { stage: "read-input-line" })?;
                let Some(line) = line else {
                    tracing::debug!("input closed, waiting for outstanding work");
                    input_open = false;
                    continue;
                };

                match console.interpret(app.state(), &line) {
                    Command::Quit => break,
                    Command::Continue => {}
                    Command::Notice(text) => notice(&mut output, text).await?,
                    Command::Events(events) => {
                        tracker.input_received();
                        for event in events {
                            if let Err(rejection) = app.dispatch(event) {
                                if let Some(text) = render::rejection_notice(&rejection) {
                                    notice(&mut output, text).await?;
                                }
                                break;
                            }
                        }
                    }
                    Command::Attach(path) => match Attachment::read(&path).await {
                        Ok(attachment) => {
                            let staged = format!(
                                "Attached {} ({}). Send a message or an empty line.",
                                attachment.name, attachment.mime_type
                            );
                            if app.dispatch(SessionEvent::StageAttachment(attachment)).is_ok() {
                                write(&mut output, &format!("{staged}\n")).await?;
                            }
                        }
                        Err(error) => {
                            tracing::warn!(path = %path.display(), error = %error, "attachment not staged");
                            notice(&mut output, "Could not read that file.").await?;
                        }
                    },
                }
                true
            }
            Some(event) = completions.recv() => {
                let _ = app.dispatch(event);
                false
            }
            else => break,
        };

        refresh(&app, &mut console, &mut tracker, &mut output, from_input).await?;
    }

    write(&mut output, "Bye!\n").await
}

async fn refresh<W>(
    app: &ChatApp,
    console: &mut Console,
    tracker: &mut ScreenTracker,
    output: &mut W,
    always_prompt: bool,
) -> TerminalResult<()>
where
    W: AsyncWrite + Unpin,
{
    let screen = tracker.refresh(app.state());
    if screen.is_empty() && !always_prompt {
        return Ok(());
    }

    let prompt = console.prompt(app.state());
    write(output, &format!("{screen}{prompt}")).await
}

async fn notice<W>(output: &mut W, text: &str) -> TerminalResult<()>
where
    W: AsyncWrite + Unpin,
{
    write(output, &format!("! {text}\n")).await
}

async fn write<W>(output: &mut W, text: &str) -> TerminalResult<()>
where
    W: AsyncWrite + Unpin,
{
    output
        .write_all(text.as_bytes())
        .await
        .context(WriteOutputSnafu {
            stage: "write-terminal-output",
        })?;
    output.flush().await.context(WriteOutputSnafu {
        stage: "flush-terminal-output",
    })
}
