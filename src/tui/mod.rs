pub mod render;
pub mod state;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use state::AppState;
use std::io::stdout;
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};

/// Commands the TUI sends to the refresh loop. Navigation stays local.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TuiCommand {
    Quit,
    Refresh,
    Export,
}

/// What a key press does.
#[derive(Debug, Clone)]
enum KeyAction {
    Send(TuiCommand),
    View(fn(&mut AppState)),
    None,
}

fn map_key(key: KeyEvent, log_focus: bool) -> KeyAction {
    match key.code {
        KeyCode::Char('q') => KeyAction::Send(TuiCommand::Quit),
        KeyCode::Char('r') => KeyAction::Send(TuiCommand::Refresh),
        KeyCode::Char('e') => KeyAction::Send(TuiCommand::Export),
        KeyCode::Char('l') => KeyAction::View(AppState::toggle_logs),
        KeyCode::Esc if log_focus => KeyAction::View(AppState::toggle_logs),
        KeyCode::Tab | KeyCode::BackTab => KeyAction::View(AppState::switch_tab),
        KeyCode::Left => KeyAction::View(|s| s.select_tab(state::TAB_TODAY)),
        KeyCode::Right => KeyAction::View(|s| s.select_tab(state::TAB_TOMORROW)),
        KeyCode::Char('j') | KeyCode::Down => KeyAction::View(AppState::scroll_down),
        KeyCode::Char('k') | KeyCode::Up => KeyAction::View(AppState::scroll_up),
        _ => KeyAction::None,
    }
}

/// Run the TUI until `q`. Renders from `state_tx`'s current value, applies
/// navigation to it directly, and forwards everything else on `cmd_tx`.
pub async fn run_tui(state_tx: watch::Sender<AppState>, cmd_tx: mpsc::Sender<TuiCommand>) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = tui_loop(&mut terminal, &state_tx, cmd_tx).await;

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn tui_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state_tx: &watch::Sender<AppState>,
    cmd_tx: mpsc::Sender<TuiCommand>,
) -> Result<()> {
    let mut spinner_frame: u8 = 0;
    loop {
        let state = state_tx.borrow().clone();
        terminal.draw(|f| render::draw(f, &state, spinner_frame))?;
        spinner_frame = spinner_frame.wrapping_add(1);

        // Poll with a short timeout so the clock and spinner keep moving
        if !event::poll(Duration::from_millis(100))? {
            tokio::task::yield_now().await;
            continue;
        }
        let Event::Key(key) = event::read()? else { continue };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match map_key(key, state.log_focus) {
            KeyAction::Send(cmd) => {
                if !forward(&cmd_tx, state_tx, cmd) {
                    return Ok(());
                }
            }
            KeyAction::View(apply) => state_tx.send_modify(apply),
            KeyAction::None => {}
        }
    }
}

/// Hand a command to the refresh loop without waiting on it. Returns false
/// when the TUI should exit.
fn forward(cmd_tx: &mpsc::Sender<TuiCommand>, state_tx: &watch::Sender<AppState>, cmd: TuiCommand) -> bool {
    if cmd == TuiCommand::Quit {
        // The caller aborts the loop anyway, so a full queue is fine here
        let _ = cmd_tx.try_send(TuiCommand::Quit);
        return false;
    }
    match cmd_tx.try_send(cmd) {
        Ok(()) => true,
        Err(TrySendError::Full(cmd)) => {
            tracing::warn!(?cmd, "refresh loop busy, command dropped");
            state_tx.send_modify(|s| s.push_log("WARN", format!("busy, {:?} dropped", cmd)));
            true
        }
        Err(TrySendError::Closed(_)) => {
            tracing::warn!("refresh loop is gone, exiting");
            false
        }
    }
}
