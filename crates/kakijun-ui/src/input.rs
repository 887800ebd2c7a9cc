use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use kanal::AsyncSender;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Terminal input relevant to the UI
#[derive(Debug, Clone)]
pub enum InputEvent {
    Key(crossterm::event::KeyEvent),
    Resize,
}

/// Poll crossterm on a blocking thread and forward key presses and resizes
pub fn spawn_input_watcher(
    tx: AsyncSender<InputEvent>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let tx = tx.to_sync();

    tokio::task::spawn_blocking(move || {
        tracing::debug!("[INPUT] Watcher started");

        while !cancel.is_cancelled() {
            let ready = match event::poll(POLL_INTERVAL) {
                Ok(ready) => ready,
                Err(e) => {
                    tracing::error!("[INPUT] Failed to poll terminal: {}", e);
                    break;
                }
            };
            if !ready {
                continue;
            }

            let input = match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => InputEvent::Key(key),
                Ok(Event::Resize(..)) => InputEvent::Resize,
                Ok(_) => continue,
                Err(e) => {
                    tracing::error!("[INPUT] Failed to read terminal event: {}", e);
                    break;
                }
            };

            if tx.send(input).is_err() {
                break;
            }
        }

        tracing::debug!("[INPUT] Watcher stopped");
    })
}
