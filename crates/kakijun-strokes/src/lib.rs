//! Stroke-order diagrams: SVG stroke extraction and the draw-on animation.

pub mod animator;
pub mod diagram;
pub mod error;

pub use animator::{
    AnimationEvent, AnimationHandle, AnimationOutcome, AnimationSink, AnimationTiming, SinkClosed,
    StrokeStyle, run_animation, spawn_animation,
};
pub use diagram::{Stroke, StrokeDiagram, ViewBox};
pub use error::DiagramError;
