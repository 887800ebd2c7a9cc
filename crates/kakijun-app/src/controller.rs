use std::sync::Arc;

use kakijun_core::types::AppEvent;
use kakijun_ui::ui_loop;
use kanal::{AsyncReceiver, AsyncSender};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::events::event_loop;
use crate::state::AppState;

pub type Channel = (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>);

/// Both directions between the event loop and the terminal UI
pub struct ChannelSet {
    /// Views, diagrams and animation frames for every mounted diagram
    pub app_to_ui: Channel,
    /// UI requests, plus search results looping back into the event loop
    pub ui_to_app: Channel,
}

impl ChannelSet {
    pub fn new() -> Self {
        Self {
            app_to_ui: kanal::bounded_async(256),
            ui_to_app: kanal::bounded_async(64),
        }
    }

    /// Sender search tasks use to hand results back to the event loop
    pub fn loopback(&self) -> AsyncSender<AppEvent> {
        self.ui_to_app.0.clone()
    }
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the channels and the shutdown token of the interactive session
pub struct AppController {
    channels: ChannelSet,
    state: Arc<AppState>,
    shutdown: CancellationToken,
}

impl AppController {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            channels: ChannelSet::new(),
            state,
            shutdown: CancellationToken::new(),
        }
    }

    /// Start the event loop and the terminal UI
    pub fn spawn_tasks(&self) -> JoinSet<anyhow::Result<()>> {
        let (to_ui, from_app) = &self.channels.app_to_ui;
        let (to_app, from_ui) = &self.channels.ui_to_app;
        let mut tasks = JoinSet::new();

        tasks.spawn(event_loop(
            self.state.clone(),
            from_ui.clone(),
            self.channels.loopback(),
            to_ui.clone(),
            self.shutdown.child_token(),
        ));

        tasks.spawn(ui_loop(
            from_app.clone(),
            to_app.clone(),
            self.state.config.clone(),
            self.shutdown.child_token(),
        ));

        tasks
    }

    /// Cancel both loops along with every search and animation they started
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}
