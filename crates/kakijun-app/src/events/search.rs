use std::sync::Arc;

use kakijun_core::query::Query;
use kakijun_core::render::{RenderedView, ViewMessage};
use kakijun_core::types::AppEvent;
use kakijun_core::view::{Generation, ResultsView};
use kanal::AsyncSender;

use crate::events::diagram::mount_diagram;
use crate::state::AppState;

/// Start a new generation and dispatch the query in the background.
///
/// The result comes back as [`AppEvent::ShowView`] on `loopback_tx`.
pub async fn handle_search(
    state: &Arc<AppState>,
    view: &mut ResultsView,
    loopback_tx: &AsyncSender<AppEvent>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
    text: String,
) -> anyhow::Result<()> {
    let generation = view.begin();

    if Query::parse(&text).is_none() {
        let empty = RenderedView::Message(ViewMessage::EmptyQuery);
        view.show(generation, empty.clone());
        app_to_ui_tx
            .send(AppEvent::ShowView {
                generation,
                view: empty,
            })
            .await?;
        return Ok(());
    }

    app_to_ui_tx
        .send(AppEvent::ShowView {
            generation,
            view: view.content().clone(),
        })
        .await?;

    let dispatcher = state.dispatcher();
    let token = view.token();
    let loopback_tx = loopback_tx.clone();

    tokio::spawn(async move {
        let outcome = tokio::select! {
            _ = token.cancelled() => {
                tracing::debug!("Search '{}' superseded", text);
                return;
            }
            outcome = dispatcher.dispatch(&text) => outcome,
        };

        let rendered = outcome.render(generation);
        if let Err(e) = loopback_tx
            .send(AppEvent::ShowView {
                generation,
                view: rendered,
            })
            .await
        {
            tracing::error!("Failed to deliver results for '{}': {}", text, e);
        }
    });

    Ok(())
}

/// Show rendered results if they are still current and mount their diagrams
pub async fn handle_show_view(
    state: &Arc<AppState>,
    view: &mut ResultsView,
    app_to_ui_tx: &AsyncSender<AppEvent>,
    generation: Generation,
    rendered: RenderedView,
) -> anyhow::Result<()> {
    if !view.show(generation, rendered.clone()) {
        return Ok(());
    }

    app_to_ui_tx
        .send(AppEvent::ShowView {
            generation,
            view: rendered.clone(),
        })
        .await?;

    let timing = state.animation_timing().await;
    for mount in rendered.mounts() {
        let Some(token) = view.mount_token(mount.id) else {
            continue;
        };

        tracing::debug!("Mounting diagram {} for {}", mount.filename, mount.id);
        tokio::spawn(mount_diagram(
            state.api.clone(),
            mount.clone(),
            timing.clone(),
            app_to_ui_tx.clone(),
            token,
        ));
    }

    Ok(())
}
