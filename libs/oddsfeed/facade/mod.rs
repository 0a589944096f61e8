//! Public facade: one subscribed match, its command inlet and its read side.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::config::EngineConfig;
use crate::dispatch::{FeedCommand, FeedDispatcher, FeedError};
use crate::domain::models::{Event, Market, Outcome};
use crate::live::{LiveEventReader, SlotKind};

const COMMAND_BUFFER: usize = 256;

/// A running engine for one match: feed commands in, snapshots and change
/// streams out. Reads never block on the writer; they only ever see fully
/// applied mutations.
pub struct LiveEventFeed {
    commands: mpsc::Sender<FeedCommand>,
    reader: LiveEventReader,
    worker: JoinHandle<()>,
}

impl LiveEventFeed {
    /// Spawn the dispatcher task for `match_id` and hand back the facade.
    pub fn start(config: EngineConfig, match_id: impl Into<String>) -> Self {
        let dispatcher = FeedDispatcher::new(config, match_id);
        let reader = dispatcher.reader();
        let (commands, inbox) = mpsc::channel(COMMAND_BUFFER);
        let worker = tokio::spawn(dispatcher.run(inbox));
        Self {
            commands,
            reader,
            worker,
        }
    }

    /// Queue one command for the single-writer task. Commands are applied in
    /// submission order.
    pub async fn submit(&self, command: FeedCommand) -> Result<(), FeedError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| FeedError::Closed)
    }

    /// Point-in-time snapshot of the resident tree.
    pub fn current_event(&self) -> Option<Event> {
        self.reader.current_event()
    }

    pub fn subscribe_event(&self) -> watch::Receiver<Option<Event>> {
        self.reader.subscribe_event()
    }

    pub fn subscribe_market(&self, id: &str) -> Option<watch::Receiver<Market>> {
        self.reader.subscribe_market(id)
    }

    pub fn subscribe_outcome(&self, id: &str) -> Option<watch::Receiver<Outcome>> {
        self.reader.subscribe_outcome(id)
    }

    pub fn contains(&self, kind: SlotKind, id: &str) -> bool {
        self.reader.contains(kind, id)
    }

    /// A standalone read handle, cheap to clone and hand to consumers.
    pub fn reader(&self) -> LiveEventReader {
        self.reader.clone()
    }

    /// Drain and stop the dispatcher task.
    pub async fn shutdown(self) {
        if self.commands.send(FeedCommand::Shutdown).await.is_err() {
            warn!("feed dispatcher already gone at shutdown");
        }
        let _ = self.worker.await;
    }
}
