use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kakijun_config::animation::AnimationConfig;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::diagram::{Stroke, StrokeDiagram};

/// Pacing of one animation session
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationTiming {
    pub stroke_duration: Duration,
    pub stroke_pause: Duration,
    pub loop_pause: Duration,
    pub frame_interval: Duration,
    /// Stop after this many loops, run forever when `None`
    pub max_loops: Option<u32>,
}

impl AnimationTiming {
    pub fn from_config(config: &AnimationConfig, max_loops: Option<u32>) -> Self {
        Self {
            stroke_duration: config.stroke_duration(),
            stroke_pause: config.stroke_pause(),
            loop_pause: config.loop_pause(),
            frame_interval: config.frame_interval(),
            max_loops,
        }
    }
}

impl Default for AnimationTiming {
    fn default() -> Self {
        Self::from_config(&AnimationConfig::default(), None)
    }
}

/// How a stroke is painted: black, fixed width, never filled
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub width: f64,
}

impl StrokeStyle {
    pub fn from_config(config: &AnimationConfig) -> Self {
        Self {
            width: config.stroke_width,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnimationEvent {
    /// Every stroke is hidden again (dash offset = stroke length)
    Reset { iteration: u32 },
    StrokeStarted { stroke: usize },
    /// New dash offset for a stroke, from its length down to zero
    Frame { stroke: usize, dash_offset: f64 },
    StrokeCompleted { stroke: usize },
    /// Last stroke drawn, waiting before the next reset
    LoopPause { iteration: u32 },
}

#[derive(Debug, thiserror::Error)]
#[error("animation sink closed")]
pub struct SinkClosed;

/// Receiver of animation events, typically a channel to the UI
#[async_trait]
pub trait AnimationSink: Send + Sync {
    async fn emit(&self, event: AnimationEvent) -> Result<(), SinkClosed>;
}

#[async_trait]
impl<T: AnimationSink + ?Sized> AnimationSink for Arc<T> {
    async fn emit(&self, event: AnimationEvent) -> Result<(), SinkClosed> {
        self.as_ref().emit(event).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationOutcome {
    Cancelled,
    SinkClosed,
    Finished { loops: u32 },
}

enum Stop {
    Cancelled,
    SinkClosed,
}

impl From<SinkClosed> for Stop {
    fn from(_: SinkClosed) -> Self {
        Stop::SinkClosed
    }
}

/// Handle to a running animation task
pub struct AnimationHandle {
    cancel: CancellationToken,
    task: JoinHandle<AnimationOutcome>,
}

impl AnimationHandle {
    /// Ask the task to stop before its next frame, stroke or pause
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub async fn join(self) -> Result<AnimationOutcome, JoinError> {
        self.task.await
    }
}

/// Spawn the looping animation of `diagram` on the current runtime.
///
/// The task stops when `cancel` fires, when the sink closes or after
/// `timing.max_loops` loops.
pub fn spawn_animation<S>(
    diagram: Arc<StrokeDiagram>,
    timing: AnimationTiming,
    sink: S,
    cancel: CancellationToken,
) -> AnimationHandle
where
    S: AnimationSink + 'static,
{
    let task_cancel = cancel.clone();
    let task = tokio::spawn(async move {
        let outcome = run_animation(&diagram, &timing, &sink, &task_cancel).await;
        tracing::debug!("Stroke animation ended: {:?}", outcome);
        outcome
    });

    AnimationHandle { cancel, task }
}

/// Play the animation on the current task
pub async fn run_animation(
    diagram: &StrokeDiagram,
    timing: &AnimationTiming,
    sink: &dyn AnimationSink,
    cancel: &CancellationToken,
) -> AnimationOutcome {
    match play(diagram, timing, sink, cancel).await {
        Ok(loops) => AnimationOutcome::Finished { loops },
        Err(Stop::Cancelled) => AnimationOutcome::Cancelled,
        Err(Stop::SinkClosed) => AnimationOutcome::SinkClosed,
    }
}

async fn play(
    diagram: &StrokeDiagram,
    timing: &AnimationTiming,
    sink: &dyn AnimationSink,
    cancel: &CancellationToken,
) -> Result<u32, Stop> {
    let mut iteration = 0u32;

    loop {
        ensure_running(cancel)?;
        sink.emit(AnimationEvent::Reset { iteration }).await?;

        for stroke in diagram.strokes() {
            ensure_running(cancel)?;
            sink.emit(AnimationEvent::StrokeStarted {
                stroke: stroke.index(),
            })
            .await?;

            draw_stroke(stroke, timing, sink, cancel).await?;

            sink.emit(AnimationEvent::StrokeCompleted {
                stroke: stroke.index(),
            })
            .await?;
            pause(timing.stroke_pause, cancel).await?;
        }

        sink.emit(AnimationEvent::LoopPause { iteration }).await?;
        pause(timing.loop_pause, cancel).await?;

        iteration += 1;
        if timing.max_loops.is_some_and(|max| iteration >= max) {
            return Ok(iteration);
        }
    }
}

/// Move the dash offset from the stroke length down to zero, linearly
async fn draw_stroke(
    stroke: &Stroke,
    timing: &AnimationTiming,
    sink: &dyn AnimationSink,
    cancel: &CancellationToken,
) -> Result<(), Stop> {
    let start = Instant::now();

    loop {
        let elapsed = start.elapsed();
        let t = progress(elapsed, timing.stroke_duration);
        sink.emit(AnimationEvent::Frame {
            stroke: stroke.index(),
            dash_offset: stroke.length() * (1.0 - t),
        })
        .await?;

        if t >= 1.0 {
            return Ok(());
        }

        let remaining = timing.stroke_duration.saturating_sub(elapsed);
        pause(timing.frame_interval.min(remaining), cancel).await?;
    }
}

/// Linear easing
fn progress(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
}

async fn pause(duration: Duration, cancel: &CancellationToken) -> Result<(), Stop> {
    if duration.is_zero() {
        return ensure_running(cancel);
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Stop::Cancelled),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}

fn ensure_running(cancel: &CancellationToken) -> Result<(), Stop> {
    if cancel.is_cancelled() {
        Err(Stop::Cancelled)
    } else {
        Ok(())
    }
}
