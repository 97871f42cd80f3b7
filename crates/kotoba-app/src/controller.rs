use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use kotoba_core::types::AppEvent;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::events::event_loop;
use crate::output::output_loop;
use crate::state::AppState;

/// Centralized channel management
pub struct ChannelSet {
    pub input: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
    pub output: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
}

impl ChannelSet {
    pub fn new() -> Self {
        Self {
            input: kanal::bounded_async(64),    // user input
            output: kanal::bounded_async(256),  // result batches
        }
    }
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    state: Arc<AppState>,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            channels: ChannelSet::new(),
            state,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Sender for user input events
    pub fn input(&self) -> AsyncSender<AppEvent> {
        self.channels.input.0.clone()
    }

    pub fn spawn_tasks(&self) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = JoinSet::new();

        // Event loop
        tasks.spawn(event_loop(
            self.state.clone(),
            self.channels.input.1.clone(),
            self.channels.output.0.clone(),
            self.cancel_token.child_token(),
        ));

        // Output loop
        tasks.spawn(output_loop(
            self.channels.output.1.clone(),
            self.state.options.json,
        ));

        tasks
    }

    /// Cancel running searches and stop the event loop
    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}
