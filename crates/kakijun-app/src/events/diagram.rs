use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use kakijun_client::KanjiApi;
use kakijun_core::render::DiagramMount;
use kakijun_core::types::AppEvent;
use kakijun_core::view::MountId;
use kakijun_strokes::{
    AnimationEvent, AnimationSink, AnimationTiming, SinkClosed, StrokeDiagram, spawn_animation,
};
use kanal::AsyncSender;
use tokio_util::sync::CancellationToken;

/// Forwards animation events of one mount to the UI
pub struct ChannelSink {
    mount: MountId,
    tx: AsyncSender<AppEvent>,
}

impl ChannelSink {
    pub fn new(mount: MountId, tx: AsyncSender<AppEvent>) -> Self {
        Self { mount, tx }
    }
}

#[async_trait]
impl AnimationSink for ChannelSink {
    async fn emit(&self, event: AnimationEvent) -> Result<(), SinkClosed> {
        self.tx
            .send(AppEvent::Animation {
                mount: self.mount,
                event,
            })
            .await
            .map_err(|_| SinkClosed)
    }
}

/// Fetch and parse a stroke diagram asset
pub async fn load_diagram(api: &dyn KanjiApi, filename: &str) -> anyhow::Result<StrokeDiagram> {
    let svg = api
        .fetch_svg(filename)
        .await
        .with_context(|| format!("Failed to fetch {filename}"))?;

    StrokeDiagram::parse(&svg).with_context(|| format!("Failed to parse {filename}"))
}

/// Load the diagram of one mount and animate it until `cancel` fires
pub async fn mount_diagram(
    api: Arc<dyn KanjiApi>,
    mount: DiagramMount,
    timing: AnimationTiming,
    app_to_ui_tx: AsyncSender<AppEvent>,
    cancel: CancellationToken,
) {
    let loaded = tokio::select! {
        _ = cancel.cancelled() => return,
        loaded = load_diagram(api.as_ref(), &mount.filename) => loaded,
    };

    let diagram = match loaded {
        Ok(diagram) => Arc::new(diagram),
        Err(e) => {
            tracing::warn!("Diagram for {} unavailable: {:#}", mount.id, e);
            if let Err(e) = app_to_ui_tx
                .send(AppEvent::DiagramUnavailable { mount: mount.id })
                .await
            {
                tracing::debug!("UI gone before diagram {} failed: {}", mount.id, e);
            }
            return;
        }
    };

    if cancel.is_cancelled() {
        return;
    }

    tracing::debug!(
        "Diagram {} loaded: {} strokes, total length {:.1}",
        mount.filename,
        diagram.len(),
        diagram.total_length()
    );
    if app_to_ui_tx
        .send(AppEvent::DiagramLoaded {
            mount: mount.id,
            diagram: diagram.clone(),
        })
        .await
        .is_err()
    {
        return;
    }

    let handle = spawn_animation(
        diagram,
        timing,
        ChannelSink::new(mount.id, app_to_ui_tx),
        cancel,
    );
    match handle.join().await {
        Ok(outcome) => tracing::debug!("Animation for {} ended: {:?}", mount.id, outcome),
        Err(e) => tracing::error!("Animation task for {} failed: {}", mount.id, e),
    }
}
