use std::sync::Arc;

use kakijun_strokes::{AnimationEvent, StrokeDiagram};

use crate::render::RenderedView;
use crate::view::{Generation, MountId};

#[derive(Debug, Clone)]
pub enum AppEvent {
    UiEvent(UiEvent),
    /// Replace the results area
    ShowView {
        generation: Generation,
        view: RenderedView,
    },
    DiagramLoaded {
        mount: MountId,
        diagram: Arc<StrokeDiagram>,
    },
    DiagramUnavailable {
        mount: MountId,
    },
    Animation {
        mount: MountId,
        event: AnimationEvent,
    },
}

impl AppEvent {
    /// Generation the event belongs to, `None` for events not tied to results
    pub fn generation(&self) -> Option<Generation> {
        match self {
            AppEvent::UiEvent(_) => None,
            AppEvent::ShowView { generation, .. } => Some(*generation),
            AppEvent::DiagramLoaded { mount, .. }
            | AppEvent::DiagramUnavailable { mount }
            | AppEvent::Animation { mount, .. } => Some(mount.generation),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    SearchText(String),
    Close,
}
