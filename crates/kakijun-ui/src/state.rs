use std::collections::HashMap;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use kakijun_core::render::RenderedView;
use kakijun_core::types::{AppEvent, UiEvent};
use kakijun_core::view::{Generation, MountId};
use kakijun_strokes::{AnimationEvent, StrokeDiagram};

/// Diagram area of one result card
#[derive(Debug, Clone)]
pub enum DiagramPane {
    Loading,
    Unavailable,
    Ready {
        diagram: Arc<StrokeDiagram>,
        /// Current dash offset per stroke
        offsets: Vec<f64>,
    },
}

impl DiagramPane {
    fn ready(diagram: Arc<StrokeDiagram>) -> Self {
        let offsets = diagram.strokes().iter().map(|s| s.length()).collect();
        DiagramPane::Ready { diagram, offsets }
    }

    fn animate(&mut self, event: &AnimationEvent) {
        let DiagramPane::Ready { diagram, offsets } = self else {
            return;
        };

        let hidden = |stroke: usize| diagram.strokes().get(stroke).map(|s| s.length());
        match *event {
            AnimationEvent::Reset { .. } => {
                for (offset, stroke) in offsets.iter_mut().zip(diagram.strokes()) {
                    *offset = stroke.length();
                }
            }
            AnimationEvent::StrokeStarted { stroke } => {
                if let (Some(offset), Some(length)) = (offsets.get_mut(stroke), hidden(stroke)) {
                    *offset = length;
                }
            }
            AnimationEvent::Frame { stroke, dash_offset } => {
                if let Some(offset) = offsets.get_mut(stroke) {
                    *offset = dash_offset.max(0.0);
                }
            }
            AnimationEvent::StrokeCompleted { stroke } => {
                if let Some(offset) = offsets.get_mut(stroke) {
                    *offset = 0.0;
                }
            }
            AnimationEvent::LoopPause { .. } => {}
        }
    }
}

/// UI-side state (separate from the app's view-model)
pub struct UiState {
    pub input: String,
    pub generation: Generation,
    pub view: RenderedView,
    pub panes: HashMap<usize, DiagramPane>,
    /// Index of the first visible card
    pub scroll: usize,
    pub should_quit: bool,
}

impl UiState {
    pub fn new() -> Self {
        Self {
            input: String::new(),
            generation: Generation::default(),
            view: RenderedView::Empty,
            panes: HashMap::new(),
            scroll: 0,
            should_quit: false,
        }
    }

    /// Apply an event from the app. Returns whether anything visible changed
    pub fn apply(&mut self, event: AppEvent) -> bool {
        match event {
            AppEvent::UiEvent(UiEvent::Close) => {
                self.should_quit = true;
                true
            }
            AppEvent::UiEvent(UiEvent::SearchText(_)) => false,
            AppEvent::ShowView { generation, view } => {
                if generation < self.generation {
                    tracing::debug!("[UI] Dropping view of stale generation {}", generation);
                    return false;
                }

                if generation > self.generation {
                    self.scroll = 0;
                }
                self.generation = generation;
                self.panes = view
                    .mounts()
                    .map(|mount| (mount.id.index, DiagramPane::Loading))
                    .collect();
                self.view = view;
                true
            }
            AppEvent::DiagramLoaded { mount, diagram } => {
                self.update_pane(mount, |pane| *pane = DiagramPane::ready(diagram))
            }
            AppEvent::DiagramUnavailable { mount } => {
                self.update_pane(mount, |pane| *pane = DiagramPane::Unavailable)
            }
            AppEvent::Animation { mount, event } => {
                self.update_pane(mount, |pane| pane.animate(&event))
            }
        }
    }

    fn update_pane(&mut self, mount: MountId, update: impl FnOnce(&mut DiagramPane)) -> bool {
        if mount.generation != self.generation {
            return false;
        }

        match self.panes.get_mut(&mount.index) {
            Some(pane) => {
                update(pane);
                true
            }
            None => false,
        }
    }

    /// Handle a key press, returning the request to forward to the app
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<UiEvent> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if matches!(key.code, KeyCode::Char('c')) {
                self.should_quit = true;
                return Some(UiEvent::Close);
            }
            return None;
        }

        match key.code {
            KeyCode::Esc => {
                self.should_quit = true;
                Some(UiEvent::Close)
            }
            KeyCode::Enter => Some(UiEvent::SearchText(self.input.clone())),
            KeyCode::Backspace => {
                self.input.pop();
                None
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                None
            }
            KeyCode::PageDown | KeyCode::Down => {
                self.scroll = (self.scroll + 1).min(self.card_count().saturating_sub(1));
                None
            }
            KeyCode::PageUp | KeyCode::Up => {
                self.scroll = self.scroll.saturating_sub(1);
                None
            }
            _ => None,
        }
    }

    pub fn card_count(&self) -> usize {
        match &self.view {
            RenderedView::Cards(cards) => cards.len(),
            RenderedView::Empty | RenderedView::Message(_) => 0,
        }
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}
