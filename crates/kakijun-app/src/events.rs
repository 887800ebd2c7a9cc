use std::sync::Arc;

use kakijun_core::types::{AppEvent, UiEvent};
use kakijun_core::view::ResultsView;
use kanal::{AsyncReceiver, AsyncSender};
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

pub mod diagram;
pub mod search;

use search::{handle_search, handle_show_view};

enum Flow {
    Continue,
    Quit,
}

/// App's main loop.
///
/// Owns the results view-model. Search tasks report back through
/// `loopback_tx`, so every view change goes through this loop.
pub async fn event_loop(
    state: Arc<AppState>,
    ui_to_app_rx: AsyncReceiver<AppEvent>,
    loopback_tx: AsyncSender<AppEvent>,
    app_to_ui_tx: AsyncSender<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let results_token = cancel.child_token();
    let mut view = ResultsView::new(results_token.clone());

    tracing::info!("[EVENT_LOOP] Starting main loop, waiting for events");
    let result = loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break Ok(()),
            event = ui_to_app_rx.recv() => match event {
                Ok(event) => event,
                Err(e) => break Err(e.into()),
            },
        };

        tracing::debug!(
            "[EVENT_LOOP] Event received: {:?}",
            std::mem::discriminant(&event)
        );
        match handle_events(&state, &mut view, &loopback_tx, &app_to_ui_tx, event).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break Ok(()),
            Err(e) => break Err(e),
        }
    };

    // Stop searches and animations still running
    results_token.cancel();
    tracing::info!("[EVENT_LOOP] Stopped");
    result
}

async fn handle_events(
    state: &Arc<AppState>,
    view: &mut ResultsView,
    loopback_tx: &AsyncSender<AppEvent>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
    event: AppEvent,
) -> anyhow::Result<Flow> {
    match event {
        AppEvent::UiEvent(UiEvent::SearchText(text)) => {
            tracing::info!("Search requested: '{}'", text);
            handle_search(state, view, loopback_tx, app_to_ui_tx, text).await?;
        }
        AppEvent::UiEvent(UiEvent::Close) => {
            tracing::info!("UI closed");
            return Ok(Flow::Quit);
        }
        AppEvent::ShowView { generation, view: rendered } => {
            handle_show_view(state, view, app_to_ui_tx, generation, rendered).await?;
        }
        AppEvent::DiagramLoaded { .. }
        | AppEvent::DiagramUnavailable { .. }
        | AppEvent::Animation { .. } => {
            // UI-only events, ignore in backend
        }
    }

    Ok(Flow::Continue)
}
