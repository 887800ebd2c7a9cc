use std::io::Write;
use std::sync::Mutex;

use async_trait::async_trait;
use kakijun_client::DispatchOutcome;
use kakijun_core::render::{DIAGRAM_UNAVAILABLE, DiagramMount, RenderedView};
use kakijun_core::view::Generation;
use kakijun_strokes::{
    AnimationEvent, AnimationOutcome, AnimationSink, AnimationTiming, SinkClosed, StrokeDiagram,
    run_animation,
};
use tokio_util::sync::CancellationToken;

use crate::events::diagram::load_diagram;
use crate::state::AppState;

/// Print animation progress as text lines
struct PrintSink<'a, W> {
    out: Mutex<&'a mut W>,
    strokes: usize,
}

#[async_trait]
impl<'a, W: Write + Send> AnimationSink for PrintSink<'a, W> {
    async fn emit(&self, event: AnimationEvent) -> Result<(), SinkClosed> {
        let line = match event {
            AnimationEvent::StrokeCompleted { stroke } => {
                format!("  trazo {}/{} dibujado", stroke + 1, self.strokes)
            }
            AnimationEvent::LoopPause { iteration } => format!("  ciclo {} completo", iteration + 1),
            _ => return Ok(()),
        };

        let mut out = self.out.lock().map_err(|_| SinkClosed)?;
        writeln!(out, "{line}").map_err(|_| SinkClosed)
    }
}

/// Dispatch `query`, print the rendered results and summarize each diagram.
///
/// Returns `false` when the lookup failed.
pub async fn run_once<W: Write + Send>(
    state: &AppState,
    query: &str,
    out: &mut W,
    cancel: &CancellationToken,
) -> anyhow::Result<bool> {
    let outcome = state.dispatcher().dispatch(query).await;
    let view = outcome.render(Generation::default());
    let timing = state.animation_timing().await;

    match &view {
        RenderedView::Empty | RenderedView::Message(_) => {
            for line in view.text_lines() {
                writeln!(out, "{line}")?;
            }
        }
        RenderedView::Cards(cards) => {
            for (index, card) in cards.iter().enumerate() {
                if index > 0 {
                    writeln!(out)?;
                }
                for line in card.text_lines() {
                    writeln!(out, "{line}")?;
                }
                if let Some(mount) = &card.diagram {
                    write_diagram(state, mount, &timing, out, cancel).await?;
                }
            }
        }
    }

    out.flush()?;
    Ok(!matches!(outcome, DispatchOutcome::Failed { .. }))
}

async fn write_diagram<W: Write + Send>(
    state: &AppState,
    mount: &DiagramMount,
    timing: &AnimationTiming,
    out: &mut W,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    writeln!(out, "{}:", mount.alt)?;

    let diagram = match load_diagram(state.api.as_ref(), &mount.filename).await {
        Ok(diagram) => diagram,
        Err(e) => {
            tracing::warn!("{:#}", e);
            writeln!(out, "  {DIAGRAM_UNAVAILABLE}")?;
            return Ok(());
        }
    };

    write_summary(&diagram, out)?;

    if timing.max_loops.is_some() {
        let sink = PrintSink {
            out: Mutex::new(out),
            strokes: diagram.len(),
        };
        match run_animation(&diagram, timing, &sink, cancel).await {
            AnimationOutcome::Finished { loops } => tracing::debug!("Played {} loops", loops),
            other => tracing::info!("Animation stopped early: {:?}", other),
        }
    }

    Ok(())
}

fn write_summary<W: Write>(diagram: &StrokeDiagram, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "  {} trazos", diagram.len())?;
    for stroke in diagram.strokes() {
        writeln!(out, "  {:>2}. longitud {:.1}", stroke.index() + 1, stroke.length())?;
    }
    Ok(())
}
