//! Terminal front-end
//!
//! A blocking reader thread forwards terminal events into the async loop,
//! which interleaves them with backend completions and redraws after each.

mod draw;
mod markup;

use crate::backend::ChatBackend;
use crate::runtime::ConversationController;
use crate::view::InputAction;
use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

const INPUT_POLL: Duration = Duration::from_millis(200);
const SCROLL_STEP: u16 = 5;

/// What the loop should do after a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    Quit,
}

pub fn setup_terminal() -> io::Result<Tui> {
    install_panic_hook();
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

pub fn restore_terminal(terminal: &mut Tui) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

/// Leave raw mode and the alternate screen before the panic message prints
fn install_panic_hook() {
    let orig_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        orig_hook(info);
    }));
}

fn spawn_input_reader() -> mpsc::UnboundedReceiver<TermEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || loop {
        match event::poll(INPUT_POLL) {
            Ok(true) => match event::read() {
                Ok(ev @ (TermEvent::Key(_) | TermEvent::Resize(..))) => {
                    if tx.send(ev).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(error = %e, "Terminal read failed");
                    break;
                }
            },
            Ok(false) => {
                if tx.is_closed() {
                    break;
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Terminal poll failed");
                break;
            }
        }
    });
    rx
}

/// Run the UI until the user quits. Loads the directory on entry.
pub async fn run<B>(terminal: &mut Tui, controller: &mut ConversationController<B>) -> io::Result<()>
where
    B: ChatBackend + 'static,
{
    let terminal_events = spawn_input_reader();
    event_loop(terminal, controller, terminal_events).await
}

/// Errors out if the input reader goes away, since no key could quit after
/// that.
async fn event_loop<T, B>(
    terminal: &mut Terminal<T>,
    controller: &mut ConversationController<B>,
    mut terminal_events: mpsc::UnboundedReceiver<TermEvent>,
) -> io::Result<()>
where
    T: Backend,
    B: ChatBackend + 'static,
{
    controller.refresh_sessions();

    loop {
        terminal.draw(|frame| draw::draw(frame, controller))?;

        tokio::select! {
            ev = terminal_events.recv() => {
                let Some(ev) = ev else {
                    tracing::error!("Terminal input closed");
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "terminal input reader stopped",
                    ));
                };
                if let TermEvent::Key(key) = ev {
                    if handle_key(controller, key) == KeyOutcome::Quit {
                        break;
                    }
                }
            }
            completion = controller.next_completion() => {
                controller.dispatch(completion);
            }
        }
    }

    tracing::info!(in_flight = controller.in_flight(), "Leaving terminal UI");
    Ok(())
}

/// Route one key press. Global shortcuts first, then the focused pane.
pub fn handle_key<B>(controller: &mut ConversationController<B>, key: KeyEvent) -> KeyOutcome
where
    B: ChatBackend + 'static,
{
    if key.kind == KeyEventKind::Release {
        return KeyOutcome::Continue;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Esc => return KeyOutcome::Quit,
        KeyCode::Char('c') if ctrl => return KeyOutcome::Quit,
        KeyCode::Char('n') if ctrl => controller.start_new(),
        KeyCode::Char('r') if ctrl => controller.refresh_sessions(),
        KeyCode::Tab | KeyCode::BackTab => {
            if controller.input().is_focused() {
                controller.input_mut().blur();
            } else {
                controller.input_mut().focus();
            }
        }
        KeyCode::PageUp => controller.transcript_mut().scroll_up(SCROLL_STEP),
        KeyCode::PageDown => controller.transcript_mut().scroll_down(SCROLL_STEP),
        _ if controller.input().is_focused() => {
            if let InputAction::Submit(text) = controller.input_mut().handle_key(key) {
                controller.send(&text);
            }
        }
        KeyCode::Up => controller.directory_mut().select_prev(),
        KeyCode::Down => controller.directory_mut().select_next(),
        KeyCode::Enter => {
            if let Some(session_id) = controller.directory().cursor_session_id().map(str::to_string)
            {
                controller.select_session(&session_id);
                controller.input_mut().focus();
            }
        }
        _ => {}
    }

    KeyOutcome::Continue
}
