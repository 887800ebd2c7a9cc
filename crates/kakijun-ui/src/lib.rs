//! Terminal front end: search box, result cards and animated stroke diagrams.

use std::sync::Arc;
use std::time::Duration;

use kakijun_config::Config;
use kakijun_core::types::{AppEvent, UiEvent};
use kakijun_strokes::StrokeStyle;
use kanal::{AsyncReceiver, AsyncSender};
use tokio::sync::RwLock;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

pub mod draw;
pub mod input;
pub mod state;
pub mod terminal;

use self::draw::{DrawOptions, draw};
use self::input::{InputEvent, spawn_input_watcher};
use self::state::UiState;
use self::terminal::TerminalSession;

pub async fn ui_loop(
    app_to_ui_rx: AsyncReceiver<AppEvent>,
    ui_to_app_tx: AsyncSender<AppEvent>,
    config: Arc<RwLock<Config>>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let (delta_time, options) = {
        let config = config.read().await;
        (
            Duration::from_millis(config.delta_time),
            DrawOptions {
                ui: config.ui.clone(),
                stroke: StrokeStyle::from_config(&config.animation),
            },
        )
    };

    let mut terminal = TerminalSession::new()?;
    let (input_tx, input_rx) = kanal::bounded_async::<InputEvent>(64);
    let input_cancel = cancel.child_token();
    let watcher = spawn_input_watcher(input_tx, input_cancel.clone());

    let mut state = UiState::new();
    let mut redraw = tokio::time::interval(delta_time);
    redraw.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut dirty = true;

    tracing::info!("[UI] Terminal UI started");
    while !state.should_quit {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = redraw.tick() => {
                if dirty {
                    terminal.draw(|frame| draw(frame, &state, &options))?;
                    dirty = false;
                }
            }
            event = app_to_ui_rx.recv() => match event {
                Ok(event) => dirty |= state.apply(event),
                Err(_) => {
                    tracing::warn!("[UI] App channel closed");
                    break;
                }
            },
            input = input_rx.recv() => match input {
                Ok(InputEvent::Key(key)) => {
                    if let Some(request) = state.handle_key(key) {
                        send_request(&ui_to_app_tx, request).await;
                    }
                    dirty = true;
                }
                Ok(InputEvent::Resize) => dirty = true,
                Err(_) => {
                    tracing::warn!("[UI] Input watcher stopped");
                    break;
                }
            },
        }
    }

    input_cancel.cancel();
    if let Err(e) = watcher.await {
        tracing::error!("[UI] Input watcher panicked: {}", e);
    }
    drop(terminal);
    tracing::info!("[UI] Terminal UI closed");

    Ok(())
}

async fn send_request(ui_to_app_tx: &AsyncSender<AppEvent>, request: UiEvent) {
    tracing::debug!("[UI] Sending {:?}", request);
    if let Err(e) = ui_to_app_tx.send(AppEvent::UiEvent(request)).await {
        tracing::error!("[UI] Failed to reach app: {}", e);
    }
}
